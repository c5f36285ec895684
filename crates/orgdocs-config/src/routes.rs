//! Route resolution for docs and internal links.

use std::path::PathBuf;

use crate::site::SiteConfig;

/// Turns doc slugs and internal `to` links into site routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResolver {
    /// Base URL of the whole site (output paths are relative to it)
    site_base_url: String,
    /// Base URL of the locale being built
    base_url: String,
    /// Docs route segment without surrounding slashes (empty for `/`)
    route_base_path: String,
    trailing_slash: Option<bool>,
}

impl RouteResolver {
    /// Create a resolver. `base_url` is normalized to have a leading and trailing slash.
    pub fn new(base_url: &str, route_base_path: &str, trailing_slash: Option<bool>) -> Self {
        let base_url = normalize_base_url(base_url);
        Self {
            site_base_url: base_url.clone(),
            base_url,
            route_base_path: route_base_path.trim_matches('/').to_string(),
            trailing_slash,
        }
    }

    /// Resolver for the site's default locale.
    pub fn from_config(site: &SiteConfig) -> Self {
        Self::new(
            &site.base_url,
            &site.docs().route_base_path,
            site.trailing_slash,
        )
    }

    /// Resolver for a locale. Non-default locales live under `<base_url><locale>/`.
    pub fn for_locale(&self, locale: &str, default_locale: &str) -> Self {
        let base_url = if locale == default_locale {
            self.site_base_url.clone()
        } else {
            format!("{}{}/", self.site_base_url, locale)
        };
        Self {
            base_url,
            ..self.clone()
        }
    }

    /// Base URL of the current locale.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL of the whole site.
    pub fn site_base_url(&self) -> &str {
        &self.site_base_url
    }

    pub fn trailing_slash(&self) -> Option<bool> {
        self.trailing_slash
    }

    /// Route of a doc with the given slug.
    ///
    /// The docs root (empty route base and `/` slug) resolves to the base URL itself.
    pub fn doc_route(&self, slug: &str) -> String {
        let path = [self.route_base_path.as_str(), slug.trim_matches('/')]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/");

        if path.is_empty() {
            return self.base_url.clone();
        }

        self.apply_trailing_slash(&format!("{}{}", self.base_url, collapse_slashes(&path)))
    }

    /// Route of the docs root.
    pub fn docs_root(&self) -> String {
        self.doc_route("/")
    }

    /// Resolve an internal `to` link (e.g. `/` or `/intro#setup`) against the base URL.
    pub fn internal(&self, to: &str) -> String {
        let (path, suffix) = split_suffix(to);
        let bare_base = self.base_url.trim_end_matches('/');
        if !bare_base.is_empty() && path == bare_base {
            return format!("{}{}", self.base_url, suffix);
        }
        if path.starts_with(&self.base_url) {
            return format!("{}{}", self.apply_trailing_slash(path), suffix);
        }

        let joined = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        format!("{}{}", self.apply_trailing_slash(&joined), suffix)
    }

    /// Apply the trailing slash policy. The base URL itself and file paths
    /// (`/img/logo.svg`) are left untouched.
    pub fn apply_trailing_slash(&self, route: &str) -> String {
        let (path, suffix) = split_suffix(route);
        if path == self.base_url || path == self.site_base_url || path.is_empty() {
            return route.to_string();
        }
        if path
            .rsplit('/')
            .next()
            .is_some_and(|segment| segment.contains('.'))
        {
            return route.to_string();
        }

        let path = match self.trailing_slash {
            Some(true) if !path.ends_with('/') => format!("{}/", path),
            Some(false) => path.trim_end_matches('/').to_string(),
            _ => path.to_string(),
        };
        format!("{}{}", path, suffix)
    }

    /// Output file for a route, relative to the output directory.
    ///
    /// Routes ending in `/` become `<route>/index.html`. Otherwise
    /// `trailing_slash = false` writes `<route>.html` and anything else
    /// writes `<route>/index.html`.
    pub fn output_file(&self, route: &str) -> PathBuf {
        let (path, _) = split_suffix(route);
        let relative = path
            .strip_prefix(self.site_base_url.as_str())
            .unwrap_or(path)
            .trim_matches('/');

        if relative.is_empty() {
            return PathBuf::from("index.html");
        }

        if path.ends_with('/') || self.trailing_slash != Some(false) {
            PathBuf::from(relative).join("index.html")
        } else {
            PathBuf::from(format!("{}.html", relative))
        }
    }

    /// Normalize a route for comparison: drop fragment/query and trailing slash.
    pub fn canonical(route: &str) -> String {
        let (path, _) = split_suffix(route);
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Split a link into its path and `?query`/`#fragment` suffix.
fn split_suffix(link: &str) -> (&str, &str) {
    match link.find(['?', '#']) {
        Some(idx) => link.split_at(idx),
        None => (link, ""),
    }
}

fn collapse_slashes(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "/StarCitizen-Discord-OrgBot/";

    #[test]
    fn intro_at_docs_root_resolves_to_base_url() {
        let routes = RouteResolver::new(BASE, "/", Some(false));

        assert_eq!(routes.doc_route("/"), "/StarCitizen-Discord-OrgBot/");
        assert_eq!(routes.docs_root(), "/StarCitizen-Discord-OrgBot/");
    }

    #[test]
    fn strips_trailing_slash_when_disabled() {
        let routes = RouteResolver::new(BASE, "/", Some(false));

        assert_eq!(
            routes.doc_route("setup-commands"),
            "/StarCitizen-Discord-OrgBot/setup-commands"
        );
        assert_eq!(
            routes.internal("/command-index/"),
            "/StarCitizen-Discord-OrgBot/command-index"
        );
    }

    #[test]
    fn adds_trailing_slash_when_enabled() {
        let routes = RouteResolver::new(BASE, "docs", Some(true));

        assert_eq!(
            routes.doc_route("intro"),
            "/StarCitizen-Discord-OrgBot/docs/intro/"
        );
        assert_eq!(routes.docs_root(), "/StarCitizen-Discord-OrgBot/docs/");
    }

    #[test]
    fn file_links_keep_their_extension() {
        let routes = RouteResolver::new(BASE, "docs", Some(true));

        assert_eq!(
            routes.internal("/img/logo.svg"),
            "/StarCitizen-Discord-OrgBot/img/logo.svg"
        );
    }

    #[test]
    fn leaves_routes_alone_when_unset() {
        let routes = RouteResolver::new("/", "docs", None);

        assert_eq!(routes.doc_route("intro"), "/docs/intro");
        assert_eq!(routes.internal("/docs/intro/"), "/docs/intro/");
    }

    #[test]
    fn internal_links_get_base_url() {
        let routes = RouteResolver::new(BASE, "/", Some(false));

        assert_eq!(routes.internal("/"), BASE);
        assert_eq!(
            routes.internal("/jobs-commands#posting"),
            "/StarCitizen-Discord-OrgBot/jobs-commands#posting"
        );
        assert_eq!(
            routes.internal("/StarCitizen-Discord-OrgBot/changelog"),
            "/StarCitizen-Discord-OrgBot/changelog"
        );
    }

    #[test]
    fn base_url_without_slash_is_not_prefixed_twice() {
        let routes = RouteResolver::new(BASE, "/", Some(false));

        assert_eq!(routes.internal("/StarCitizen-Discord-OrgBot"), BASE);
        assert_eq!(
            routes.internal("/StarCitizen-Discord-OrgBot#setup"),
            "/StarCitizen-Discord-OrgBot/#setup"
        );
        assert_eq!(
            routes.internal("/StarCitizen-Discord-OrgBotics"),
            "/StarCitizen-Discord-OrgBot/StarCitizen-Discord-OrgBotics"
        );
    }

    #[test]
    fn normalizes_base_url() {
        let routes = RouteResolver::new("manual", "", None);
        assert_eq!(routes.base_url(), "/manual/");

        let routes = RouteResolver::new("", "", None);
        assert_eq!(routes.base_url(), "/");
    }

    #[test]
    fn nested_slugs_collapse_slashes() {
        let routes = RouteResolver::new("/", "docs", Some(false));
        assert_eq!(routes.doc_route("//guides//jobs/"), "/docs/guides/jobs");
    }

    #[test]
    fn output_files_follow_trailing_slash_policy() {
        let without = RouteResolver::new(BASE, "/", Some(false));
        assert_eq!(without.output_file(BASE), PathBuf::from("index.html"));
        assert_eq!(
            without.output_file("/StarCitizen-Discord-OrgBot/setup-commands"),
            PathBuf::from("setup-commands.html")
        );

        let with = RouteResolver::new(BASE, "/", Some(true));
        assert_eq!(
            with.output_file("/StarCitizen-Discord-OrgBot/setup-commands/"),
            PathBuf::from("setup-commands/index.html")
        );

        let unset = RouteResolver::new("/", "docs", None);
        assert_eq!(
            unset.output_file("/docs/intro"),
            PathBuf::from("docs/intro/index.html")
        );
    }

    #[test]
    fn locales_get_their_own_prefix() {
        let routes = RouteResolver::new(BASE, "/", Some(false));
        let fr = routes.for_locale("fr", "en");

        assert_eq!(fr.base_url(), "/StarCitizen-Discord-OrgBot/fr/");
        assert_eq!(fr.docs_root(), "/StarCitizen-Discord-OrgBot/fr/");
        assert_eq!(
            fr.doc_route("intro"),
            "/StarCitizen-Discord-OrgBot/fr/intro"
        );
        assert_eq!(fr.output_file(fr.base_url()), PathBuf::from("fr/index.html"));
        assert_eq!(
            fr.output_file("/StarCitizen-Discord-OrgBot/fr/intro"),
            PathBuf::from("fr/intro.html")
        );
        assert_eq!(routes.for_locale("en", "en"), routes);
    }

    #[test]
    fn canonical_ignores_slash_and_fragment() {
        assert_eq!(RouteResolver::canonical("/a/b/#x"), "/a/b");
        assert_eq!(RouteResolver::canonical("/a/b?q=1"), "/a/b");
        assert_eq!(RouteResolver::canonical("/"), "/");
    }
}

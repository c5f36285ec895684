//! Static site builder.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use pulldown_cmark::{html, CowStr, Event, Parser, Tag};
use rayon::prelude::*;
use walkdir::WalkDir;

use orgdocs_config::{
    Link, LinkTarget, LoadedConfig, NavbarItem, Position, RouteResolver, SiteConfig,
};
use orgdocs_mdx::{is_external_url, markdown_options, parse_doc, ParsedDoc};

use crate::assets::AssetPipeline;
use crate::links::{self, BrokenLink, LinkChecker};
use crate::nav::{build_sidebar, pagination, DocMap, DocRef};
use crate::templates::{
    color_mode_script, FooterContext, FooterGroupContext, LinkItem, LocaleLink, LogoContext,
    NavbarContext, PageContext, SiteContext, TemplateEngine, TocEntry,
};

/// Options for a single build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,

    /// Build docs marked `draft: true`
    pub include_drafts: bool,

    /// Locales to build (all configured locales when `None`)
    pub locales: Option<Vec<String>>,

    /// Inline scripts appended to every page
    pub scripts: Vec<String>,

    /// Resolve and check everything without writing output
    pub dry_run: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("build"),
            minify: true,
            include_drafts: false,
            locales: None,
            scripts: vec![],
            dry_run: false,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of doc pages generated, across locales
    pub pages: usize,

    /// Locales that were built
    pub locales: Vec<String>,

    /// Broken links that were reported without failing the build
    pub broken_links: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// A doc id referenced by the configuration without a matching doc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDoc {
    /// Where the id is referenced (e.g. `sidebar tutorialSidebar`)
    pub referenced_by: String,
    pub id: String,
}

impl fmt::Display for MissingDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} references `{}`", self.referenced_by, self.id)
    }
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read docs: {0}")]
    ReadError(String),

    #[error("Failed to parse doc: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Duplicate doc id `{id}`: {first} and {second}")]
    DuplicateDoc {
        id: String,
        first: String,
        second: String,
    },

    #[error("Duplicate route `{route}`: {first} and {second}")]
    DuplicateRoute {
        route: String,
        first: String,
        second: String,
    },

    #[error("Docs not found:\n{}", format_list(.0))]
    MissingDoc(Vec<MissingDoc>),

    #[error("Unknown locale `{0}`")]
    UnknownLocale(String),

    #[error("Broken {kind}s found:\n{}", format_list(.links))]
    BrokenLinks { kind: String, links: Vec<BrokenLink> },

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

fn format_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A doc discovered in a locale's docs directory.
#[derive(Debug)]
struct DocPage {
    id: String,
    slug: String,
    route: String,
    /// Path relative to the docs directory, `/`-separated
    relative_path: String,
    /// Path relative to the config root, used in messages and edit links
    site_path: String,
    title: String,
    doc: ParsedDoc,
}

impl DocPage {
    fn relative_dir(&self) -> &str {
        self.relative_path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("")
    }
}

/// Everything shared by the pages of one locale.
struct LocaleBuild {
    locale: String,
    routes: RouteResolver,
    docs: Vec<DocPage>,
    doc_map: DocMap,
    /// Doc routes keyed by relative source path
    by_path: HashMap<String, String>,
    checker: LinkChecker,
    site: SiteContext,
}

/// A rendered doc page.
struct RenderedPage {
    route: String,
    title: String,
    description: Option<String>,
    excerpt: String,
    html: String,
    broken: Vec<BrokenLink>,
    broken_markdown: Vec<BrokenLink>,
}

/// A page listed in the search index and sitemap.
struct IndexedPage {
    route: String,
    title: String,
    description: Option<String>,
    excerpt: String,
}

/// Static site builder.
pub struct StaticBuilder {
    config: LoadedConfig,
    options: BuildOptions,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: LoadedConfig, options: BuildOptions) -> Self {
        Self {
            config,
            options,
            templates: TemplateEngine::new(),
        }
    }

    fn site(&self) -> &SiteConfig {
        &self.config.site
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let locales = self.selected_locales()?;

        if !self.options.dry_run {
            fs::create_dir_all(&self.options.output_dir)
                .map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        let mut indexed = Vec::new();
        let mut broken_links = 0;
        let mut not_found_site = None;

        for locale in &locales {
            let build = self.prepare_locale(locale)?;

            // Render pages in parallel; results keep discovery order
            let results: Vec<Result<RenderedPage, BuildError>> = build
                .docs
                .par_iter()
                .map(|page| self.render_doc(page, &build, &locales))
                .collect();

            let mut rendered = Vec::with_capacity(results.len());
            for result in results {
                rendered.push(result?);
            }

            let mut broken = self.check_theme_links(&build);
            let mut broken_markdown = Vec::new();
            for page in &mut rendered {
                broken.append(&mut page.broken);
                broken_markdown.append(&mut page.broken_markdown);
            }
            broken_links += links::report(self.site().on_broken_links, "link", broken)?;
            broken_links += links::report(
                self.site().on_broken_markdown_links,
                "markdown link",
                broken_markdown,
            )?;

            for page in rendered {
                if !self.options.dry_run {
                    let output = self
                        .options
                        .output_dir
                        .join(build.routes.output_file(&page.route));
                    write_file(&output, &page.html)?;
                }
                indexed.push(IndexedPage {
                    route: page.route,
                    title: page.title,
                    description: page.description,
                    excerpt: page.excerpt,
                });
            }

            tracing::debug!("Built {} docs for locale {}", build.docs.len(), locale);

            if not_found_site.is_none() || *locale == self.site().i18n.default_locale {
                not_found_site = Some(build.site);
            }
        }

        if !self.options.dry_run {
            self.generate_assets()?;
            self.copy_static_dirs()?;
            if let Some(site) = &not_found_site {
                self.generate_not_found(site)?;
            }
            self.generate_search_index(&indexed)?;
            self.generate_sitemap(&indexed)?;
        }

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: indexed.len(),
            locales,
            broken_links,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.options.output_dir.clone(),
        })
    }

    /// Locales to build, in configured order.
    fn selected_locales(&self) -> Result<Vec<String>, BuildError> {
        let configured = &self.site().i18n.locales;
        match &self.options.locales {
            None => Ok(configured.clone()),
            Some(requested) => {
                if let Some(unknown) = requested.iter().find(|l| !configured.contains(l)) {
                    return Err(BuildError::UnknownLocale(unknown.clone()));
                }
                Ok(configured
                    .iter()
                    .filter(|l| requested.contains(l))
                    .cloned()
                    .collect())
            }
        }
    }

    /// Discover docs, resolve routes and check configured doc ids for a locale.
    fn prepare_locale(&self, locale: &str) -> Result<LocaleBuild, BuildError> {
        let default_locale = self.site().i18n.default_locale.as_str();
        let routes = self.config.routes().for_locale(locale, default_locale);
        let docs_dir = self.config.docs_dir_for_locale(locale);

        let docs = self.discover_docs(&docs_dir, &routes)?;
        check_unique(&docs)?;

        let doc_map: DocMap = docs
            .iter()
            .map(|d| {
                (
                    d.id.clone(),
                    DocRef {
                        title: d.title.clone(),
                        sidebar_label: d
                            .doc
                            .frontmatter
                            .as_ref()
                            .and_then(|f| f.sidebar_label.clone()),
                        route: d.route.clone(),
                    },
                )
            })
            .collect();

        let missing = self.missing_docs(&doc_map);
        if !missing.is_empty() {
            return Err(BuildError::MissingDoc(missing));
        }

        let by_path = docs
            .iter()
            .map(|d| (d.relative_path.clone(), d.route.clone()))
            .collect();

        let mut checker = LinkChecker::new(routes.site_base_url(), self.config.static_dirs());
        for doc in &docs {
            checker.add_route(&doc.route);
        }

        let site = self.site_context(locale, &routes, &doc_map);

        Ok(LocaleBuild {
            locale: locale.to_string(),
            routes,
            docs,
            doc_map,
            by_path,
            checker,
            site,
        })
    }

    /// Discover all Markdown docs in a docs directory, sorted by path.
    fn discover_docs(
        &self,
        docs_dir: &Path,
        routes: &RouteResolver,
    ) -> Result<Vec<DocPage>, BuildError> {
        if !docs_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Docs directory not found: {}",
                docs_dir.display()
            )));
        }

        let mut docs = Vec::new();

        for entry in WalkDir::new(docs_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "mdx" && ext != "md" {
                continue;
            }

            let content = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

            let site_path = to_slash_path(path.strip_prefix(&self.config.root).unwrap_or(path));

            let doc = parse_doc(&content).map_err(|e| BuildError::ParseError {
                path: site_path.clone(),
                message: e.to_string(),
            })?;

            let fm = doc.frontmatter.clone().unwrap_or_default();
            if fm.draft && !self.options.include_drafts {
                tracing::debug!("Skipping draft {}", site_path);
                continue;
            }

            let relative_path = to_slash_path(path.strip_prefix(docs_dir).unwrap_or(path));
            let (dir, file) = relative_path
                .rsplit_once('/')
                .unwrap_or(("", relative_path.as_str()));
            let stem = file.rsplit_once('.').map(|(s, _)| s).unwrap_or(file);

            let base_id = fm.id.clone().unwrap_or_else(|| stem.to_string());
            let id = join_segments(dir, &base_id);

            let slug = match &fm.slug {
                Some(slug) if slug.starts_with('/') => slug.clone(),
                Some(slug) => join_segments(dir, slug),
                None if is_index_stem(stem) && fm.id.is_none() => dir.to_string(),
                None => id.clone(),
            };

            let route = routes.doc_route(&slug);
            let title = doc.title().map(str::to_string).unwrap_or_else(|| id.clone());

            docs.push(DocPage {
                id,
                slug,
                route,
                relative_path,
                site_path,
                title,
                doc,
            });
        }

        Ok(docs)
    }

    /// Doc ids referenced by sidebars or the navbar that no doc provides.
    fn missing_docs(&self, docs: &DocMap) -> Vec<MissingDoc> {
        let mut missing = Vec::new();

        for (sidebar_id, _) in self.config.sidebars.iter() {
            for id in self.config.sidebars.doc_ids(sidebar_id) {
                if !docs.contains_key(id) {
                    missing.push(MissingDoc {
                        referenced_by: format!("sidebar {}", sidebar_id),
                        id: id.to_string(),
                    });
                }
            }
        }

        for item in &self.site().theme_config.navbar.items {
            if let NavbarItem::Doc { doc_id, .. } = item {
                if !docs.contains_key(doc_id) {
                    missing.push(MissingDoc {
                        referenced_by: "navbar".to_string(),
                        id: doc_id.clone(),
                    });
                }
            }
        }

        missing
    }

    /// Site-wide template context for a locale.
    fn site_context(
        &self,
        locale: &str,
        routes: &RouteResolver,
        docs: &DocMap,
    ) -> SiteContext {
        let site = self.site();
        let theme = &site.theme_config;
        let site_base_url = routes.site_base_url();
        let color_mode = &theme.color_mode;

        let mut navbar = NavbarContext {
            title: theme.navbar.title.clone(),
            logo: theme.navbar.logo.as_ref().map(|logo| LogoContext {
                alt: logo.alt.clone(),
                src: asset_url(site_base_url, &logo.src),
                src_dark: logo.src_dark.as_deref().map(|s| asset_url(site_base_url, s)),
                href: logo
                    .href
                    .as_deref()
                    .map(|h| link_href(routes, h))
                    .unwrap_or_else(|| routes.base_url().to_string()),
            }),
            hide_on_scroll: theme.navbar.hide_on_scroll,
            ..Default::default()
        };

        for item in &theme.navbar.items {
            let Some(link) = self.navbar_link(item, routes, docs) else {
                continue;
            };
            match item.position() {
                Position::Left => navbar.left.push(link),
                Position::Right => navbar.right.push(link),
            }
        }

        let footer = &theme.footer;
        let footer = (!footer.links.is_empty() || footer.copyright.is_some()).then(|| {
            FooterContext {
                style: footer.style.as_str().to_string(),
                groups: footer
                    .links
                    .iter()
                    .map(|group| FooterGroupContext {
                        title: group.title.clone(),
                        items: group
                            .items
                            .iter()
                            .filter_map(|l| link_item(l, routes))
                            .collect(),
                    })
                    .collect(),
                copyright: site.copyright(),
            }
        });

        let styles = self
            .config
            .custom_css()
            .iter()
            .enumerate()
            .map(|(index, path)| format!("{}{}", site_base_url, custom_css_file(index, path)))
            .collect();

        SiteContext {
            title: site.title.clone(),
            tagline: site.tagline.clone(),
            base_url: routes.base_url().to_string(),
            site_base_url: site_base_url.to_string(),
            lang: site.i18n.html_lang(locale).to_string(),
            dir: site.i18n.direction(locale).as_str().to_string(),
            favicon: site.favicon.as_deref().map(|f| asset_url(site_base_url, f)),
            image: theme.image.as_deref().map(|image| {
                if is_external_url(image) {
                    image.to_string()
                } else {
                    format!(
                        "{}{}",
                        site.url.trim_end_matches('/'),
                        asset_url(site_base_url, image)
                    )
                }
            }),
            default_mode: color_mode.default_mode.as_str().to_string(),
            color_mode_script: color_mode_script(color_mode),
            show_color_toggle: !color_mode.disable_switch,
            styles,
            scripts: self.options.scripts.clone(),
            navbar,
            footer,
        }
    }

    fn navbar_link(
        &self,
        item: &NavbarItem,
        routes: &RouteResolver,
        docs: &DocMap,
    ) -> Option<LinkItem> {
        match item {
            NavbarItem::DocSidebar {
                sidebar_id, label, ..
            } => {
                let first = self.config.sidebars.first_doc(sidebar_id)?;
                let doc = docs.get(first)?;
                Some(LinkItem {
                    label: label.clone(),
                    href: doc.route.clone(),
                    external: false,
                })
            }
            NavbarItem::Doc { doc_id, label, .. } => {
                let doc = docs.get(doc_id)?;
                Some(LinkItem {
                    label: label.clone().unwrap_or_else(|| doc.label().to_string()),
                    href: doc.route.clone(),
                    external: false,
                })
            }
            NavbarItem::Link { link, .. } => link_item(link, routes),
        }
    }

    /// Internal `to` links of the navbar and footer that resolve to nothing.
    fn check_theme_links(&self, build: &LocaleBuild) -> Vec<BrokenLink> {
        let theme = &self.site().theme_config;

        let navbar = theme.navbar.items.iter().filter_map(|item| match item {
            NavbarItem::Link { link, .. } => Some(("navbar", link)),
            _ => None,
        });
        let footer = theme
            .footer
            .links
            .iter()
            .flat_map(|group| group.items.iter().map(|link| ("footer", link)));

        navbar
            .chain(footer)
            .filter_map(|(source, link)| match link.target()? {
                LinkTarget::Internal(to) => {
                    let target = build.routes.internal(to);
                    (!build.checker.resolves(&target)).then(|| BrokenLink {
                        source: format!("{} ({})", source, link.label),
                        target,
                    })
                }
                LinkTarget::External(_) => None,
            })
            .collect()
    }

    /// Render a single doc page.
    fn render_doc(
        &self,
        page: &DocPage,
        build: &LocaleBuild,
        locales: &[String],
    ) -> Result<RenderedPage, BuildError> {
        let (content, broken, broken_markdown) = render_markdown(page, build);

        let fm = page.doc.frontmatter.clone().unwrap_or_default();

        let toc = if fm.hide_table_of_contents {
            vec![]
        } else {
            page.doc
                .toc
                .iter()
                .filter(|e| (2..=4).contains(&e.level))
                .map(|e| TocEntry {
                    title: e.title.clone(),
                    id: e.id.clone(),
                    level: e.level,
                })
                .collect()
        };

        let sidebar_id = self.config.sidebars.sidebar_of(&page.id);
        let (nav, (prev, next)) = match sidebar_id {
            Some(sidebar_id) => {
                let items = self.config.sidebars.get(sidebar_id).unwrap_or_default();
                let ids = self.config.sidebars.doc_ids(sidebar_id);
                (
                    build_sidebar(items, &build.doc_map, Some(&page.id)),
                    pagination(&ids, &build.doc_map, &page.id),
                )
            }
            None => (vec![], (None, None)),
        };

        let edit_url = self
            .site()
            .docs()
            .edit_url
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), page.site_path));

        let locale_links = if locales.len() > 1 {
            let default_locale = &self.site().i18n.default_locale;
            let site_routes = self.config.routes();
            locales
                .iter()
                .map(|locale| LocaleLink {
                    locale: locale.clone(),
                    label: self.site().i18n.label(locale).to_string(),
                    href: site_routes
                        .for_locale(locale, default_locale)
                        .doc_route(&page.slug),
                    active: *locale == build.locale,
                })
                .collect()
        } else {
            vec![]
        };

        let context = PageContext {
            title: page.title.clone(),
            description: fm.description.clone(),
            keywords: fm.keywords.clone(),
            content,
            nav,
            toc,
            edit_url,
            prev,
            next,
            locales: locale_links,
            permalink: Some(format!(
                "{}{}",
                self.site().url.trim_end_matches('/'),
                page.route
            )),
        };

        let html = self
            .templates
            .render_page("doc.html", &build.site, &context)
            .map_err(|e: minijinja::Error| BuildError::TemplateError(e.to_string()))?;

        Ok(RenderedPage {
            route: page.route.clone(),
            title: page.title.clone(),
            description: fm.description,
            excerpt: excerpt(&page.doc.content),
            html,
            broken,
            broken_markdown,
        })
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.options.output_dir.join("assets");

        // Generate main CSS
        let css = AssetPipeline::generate_css();
        let css = if self.options.minify {
            AssetPipeline::minify_css(&css).unwrap_or(css)
        } else {
            css
        };
        write_file(&assets_dir.join("main.css"), &css)?;

        write_file(&assets_dir.join("main.js"), &AssetPipeline::generate_js())?;

        let prism = &self.site().theme_config.prism;
        write_file(
            &assets_dir.join("prism.css"),
            &AssetPipeline::prism_css(prism.theme, prism.dark_theme),
        )?;

        // Copy custom stylesheets
        for (index, source_path) in self.config.custom_css().iter().enumerate() {
            if source_path.exists() {
                let content = fs::read_to_string(source_path).map_err(|e| {
                    BuildError::ReadError(format!("Failed to read stylesheet: {}", e))
                })?;
                write_file(
                    &self
                        .options
                        .output_dir
                        .join(custom_css_file(index, source_path)),
                    &content,
                )?;
                tracing::debug!("Copied stylesheet from {}", source_path.display());
            } else {
                tracing::warn!("Stylesheet not found: {}", source_path.display());
            }
        }

        Ok(())
    }

    /// Copy static directories into the output root.
    fn copy_static_dirs(&self) -> Result<(), BuildError> {
        for dir in self.config.static_dirs() {
            if !dir.is_dir() {
                continue;
            }

            for entry in WalkDir::new(&dir).into_iter().filter_map(|e| e.ok()) {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let relative = path.strip_prefix(&dir).unwrap_or(path);
                let target = self.options.output_dir.join(relative);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| BuildError::WriteError(e.to_string()))?;
                }
                fs::copy(path, &target).map_err(|e| {
                    BuildError::WriteError(format!("{}: {}", target.display(), e))
                })?;
            }
        }

        Ok(())
    }

    fn generate_not_found(&self, site: &SiteContext) -> Result<(), BuildError> {
        let page = PageContext {
            title: "Page Not Found".to_string(),
            ..Default::default()
        };
        let html = self
            .templates
            .render_page("404.html", site, &page)
            .map_err(|e: minijinja::Error| BuildError::TemplateError(e.to_string()))?;
        write_file(&self.options.output_dir.join("404.html"), &html)
    }

    /// Generate search index.
    fn generate_search_index(&self, pages: &[IndexedPage]) -> Result<(), BuildError> {
        let index: Vec<serde_json::Value> = pages
            .iter()
            .map(|page| {
                serde_json::json!({
                    "title": page.title,
                    "description": page.description.clone().unwrap_or_default(),
                    "url": page.route,
                    "content": page.excerpt,
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&index)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        write_file(&self.options.output_dir.join("search-index.json"), &json)
    }

    /// Generate sitemap and robots.txt.
    fn generate_sitemap(&self, pages: &[IndexedPage]) -> Result<(), BuildError> {
        let origin = self.site().url.trim_end_matches('/');

        let urls: Vec<String> = pages
            .iter()
            .map(|page| {
                format!(
                    "  <url>\n    <loc>{}</loc>\n  </url>",
                    escape_xml(&format!("{}{}", origin, page.route))
                )
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );

        write_file(&self.options.output_dir.join("sitemap.xml"), &sitemap)?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}{}sitemap.xml",
            origin,
            self.config.routes().site_base_url()
        );
        write_file(&self.options.output_dir.join("robots.txt"), &robots)
    }
}

/// Fail on two docs with the same id or the same route.
fn check_unique(docs: &[DocPage]) -> Result<(), BuildError> {
    let mut ids: HashMap<&str, &str> = HashMap::new();
    let mut routes: HashMap<String, &str> = HashMap::new();

    for doc in docs {
        if let Some(first) = ids.insert(&doc.id, &doc.site_path) {
            return Err(BuildError::DuplicateDoc {
                id: doc.id.clone(),
                first: first.to_string(),
                second: doc.site_path.clone(),
            });
        }
        if let Some(first) = routes.insert(RouteResolver::canonical(&doc.route), &doc.site_path) {
            return Err(BuildError::DuplicateRoute {
                route: doc.route.clone(),
                first: first.to_string(),
                second: doc.site_path.clone(),
            });
        }
    }

    Ok(())
}

/// How a link in a doc resolves.
#[derive(Debug, PartialEq)]
enum LinkResolution {
    /// External, same-page, or otherwise left as written
    Keep,
    Rewrite(String),
    /// Internal link to a route the build does not produce
    Broken(String),
    /// Relative `.md` link to a file that is not a doc
    BrokenMarkdown,
}

fn resolve_link(dest: &str, page: &DocPage, build: &LocaleBuild) -> LinkResolution {
    if dest.is_empty() || dest.starts_with('#') || is_external_url(dest) {
        return LinkResolution::Keep;
    }

    let (path, suffix) = dest.split_at(dest.find(['?', '#']).unwrap_or(dest.len()));

    if path.ends_with(".md") || path.ends_with(".mdx") {
        let dir = if path.starts_with('/') {
            ""
        } else {
            page.relative_dir()
        };
        return match normalize_path(dir, path).and_then(|p| build.by_path.get(&p)) {
            Some(route) => LinkResolution::Rewrite(format!("{}{}", route, suffix)),
            None => LinkResolution::BrokenMarkdown,
        };
    }

    let target = if path.starts_with('/') {
        build.routes.internal(dest)
    } else {
        let dir = &page.route[..page.route.rfind('/').map(|i| i + 1).unwrap_or(0)];
        match normalize_path(dir, path) {
            Some(joined) => build
                .routes
                .apply_trailing_slash(&format!("/{}{}", joined, suffix)),
            None => return LinkResolution::Broken(dest.to_string()),
        }
    };

    if build.checker.resolves(&target) {
        LinkResolution::Rewrite(target)
    } else {
        LinkResolution::Broken(target)
    }
}

/// Images are served from the static directories at the site root.
fn resolve_image(dest: &str, page: &DocPage, build: &LocaleBuild) -> LinkResolution {
    if dest.is_empty() || is_external_url(dest) {
        return LinkResolution::Keep;
    }

    let (path, suffix) = dest.split_at(dest.find(['?', '#']).unwrap_or(dest.len()));

    let target = if path.starts_with('/') {
        format!("{}{}", asset_url(build.routes.site_base_url(), path), suffix)
    } else {
        let dir = &page.route[..page.route.rfind('/').map(|i| i + 1).unwrap_or(0)];
        match normalize_path(dir, path) {
            Some(joined) => format!("/{}{}", joined, suffix),
            None => return LinkResolution::Broken(dest.to_string()),
        }
    };

    if build.checker.resolves(&target) {
        LinkResolution::Rewrite(target)
    } else {
        LinkResolution::Broken(target)
    }
}

/// Render Markdown to HTML, assigning heading ids and resolving links.
///
/// Returns the HTML with broken internal links and broken Markdown links.
fn render_markdown(
    page: &DocPage,
    build: &LocaleBuild,
) -> (String, Vec<BrokenLink>, Vec<BrokenLink>) {
    let mut headings = page.doc.toc.iter();
    let mut doc_links = page.doc.links.iter();
    let mut doc_images = page.doc.images.iter();
    let mut broken = Vec::new();
    let mut broken_markdown = Vec::new();

    let parser = Parser::new_ext(&page.doc.content, markdown_options()).map(|event| match event {
        Event::Start(Tag::Heading {
            level,
            id,
            classes,
            attrs,
        }) => {
            let id = headings
                .next()
                .map(|entry| CowStr::from(entry.id.clone()))
                .or(id);
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            })
        }
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let line = doc_links.next().map(|l| l.line).unwrap_or_default();
            let source = format!("{}:{}", page.site_path, line);

            let dest_url = match resolve_link(&dest_url, page, build) {
                LinkResolution::Keep => dest_url,
                LinkResolution::Rewrite(url) => CowStr::from(url),
                LinkResolution::Broken(target) => {
                    broken.push(BrokenLink {
                        source,
                        target: target.clone(),
                    });
                    CowStr::from(target)
                }
                LinkResolution::BrokenMarkdown => {
                    broken_markdown.push(BrokenLink {
                        source,
                        target: dest_url.to_string(),
                    });
                    dest_url
                }
            };

            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let line = doc_images.next().map(|l| l.line).unwrap_or_default();

            let dest_url = match resolve_image(&dest_url, page, build) {
                LinkResolution::Rewrite(url) => CowStr::from(url),
                LinkResolution::Broken(target) => {
                    broken.push(BrokenLink {
                        source: format!("{}:{}", page.site_path, line),
                        target: target.clone(),
                    });
                    CowStr::from(target)
                }
                _ => dest_url,
            };

            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    (html_output, broken, broken_markdown)
}

/// Resolve `path` against `dir`, both `/`-separated. `None` when `..` escapes the root.
fn normalize_path(dir: &str, path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in dir.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

fn join_segments(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// `index.md` and `README.md` stand for their directory.
fn is_index_stem(stem: &str) -> bool {
    stem.eq_ignore_ascii_case("index") || stem.eq_ignore_ascii_case("readme")
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("style.css")
}

/// Output path of a custom stylesheet, kept apart from the theme assets.
fn custom_css_file(index: usize, path: &Path) -> String {
    format!("assets/custom/{}-{}", index, file_name(path))
}

/// URL of a file served from the site root (static directories).
fn asset_url(site_base_url: &str, path: &str) -> String {
    if is_external_url(path) || (site_base_url != "/" && path.starts_with(site_base_url)) {
        path.to_string()
    } else {
        format!("{}{}", site_base_url, path.trim_start_matches('/'))
    }
}

fn link_href(routes: &RouteResolver, href: &str) -> String {
    if is_external_url(href) {
        href.to_string()
    } else {
        routes.internal(href)
    }
}

fn link_item(link: &Link, routes: &RouteResolver) -> Option<LinkItem> {
    let (href, external) = match link.target()? {
        LinkTarget::Internal(to) => (routes.internal(to), false),
        LinkTarget::External(href) => (href.to_string(), true),
    };
    Some(LinkItem {
        label: link.label.clone(),
        href,
        external,
    })
}

/// Plain text excerpt for the search index.
fn excerpt(content: &str) -> String {
    content
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#') && !l.starts_with("```"))
        .take(10)
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }
    fs::write(path, contents)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}

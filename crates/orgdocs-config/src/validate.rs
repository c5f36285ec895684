//! Configuration validation.
//!
//! Collects every problem instead of stopping at the first, so a single
//! `orgdocs check` run reports everything that needs fixing.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::sidebar::Sidebars;
use crate::site::{Link, LinkTarget, NavbarItem, SiteConfig, CLASSIC_PRESET};
use crate::ConfigError;

static LOCALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("valid regex"));

static DOC_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_\-./]*$").expect("valid regex"));

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path of the offending field
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a site config together with its sidebars.
pub fn validate(site: &SiteConfig, sidebars: &Sidebars) -> Result<(), ConfigError> {
    let issues = collect_issues(site, sidebars);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(issues))
    }
}

/// Every problem found in the configuration.
pub fn collect_issues(site: &SiteConfig, sidebars: &Sidebars) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_metadata(site, &mut issues);
    check_i18n(site, &mut issues);
    check_presets(site, &mut issues);
    check_navbar(site, sidebars, &mut issues);
    check_footer(site, &mut issues);
    check_sidebars(sidebars, &mut issues);

    issues
}

fn check_metadata(site: &SiteConfig, issues: &mut Vec<ValidationIssue>) {
    if site.title.trim().is_empty() {
        issues.push(ValidationIssue::new("title", "must not be empty"));
    }

    match Url::parse(&site.url) {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            issues.push(ValidationIssue::new("url", "must use http or https"));
        }
        Ok(url) if url.path() != "/" => {
            issues.push(ValidationIssue::new(
                "url",
                format!(
                    "must not contain a path (`{}`); put it in base_url instead",
                    url.path()
                ),
            ));
        }
        Ok(_) => {}
        Err(e) => issues.push(ValidationIssue::new("url", format!("invalid URL: {}", e))),
    }

    if !site.base_url.starts_with('/') || !site.base_url.ends_with('/') {
        issues.push(ValidationIssue::new(
            "base_url",
            "must start and end with `/`",
        ));
    }

    for (field, value) in [
        ("organization_name", &site.organization_name),
        ("project_name", &site.project_name),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            issues.push(ValidationIssue::new(field, "must not be empty when set"));
        }
    }
}

fn check_i18n(site: &SiteConfig, issues: &mut Vec<ValidationIssue>) {
    let i18n = &site.i18n;

    if i18n.locales.is_empty() {
        issues.push(ValidationIssue::new("i18n.locales", "must not be empty"));
    } else if !i18n.locales.contains(&i18n.default_locale) {
        issues.push(ValidationIssue::new(
            "i18n.locales",
            format!("must contain the default locale `{}`", i18n.default_locale),
        ));
    }

    let mut seen = HashSet::new();
    for locale in &i18n.locales {
        if !LOCALE_RE.is_match(locale) {
            issues.push(ValidationIssue::new(
                "i18n.locales",
                format!("`{}` is not a valid locale code", locale),
            ));
        }
        if !seen.insert(locale) {
            issues.push(ValidationIssue::new(
                "i18n.locales",
                format!("`{}` is listed more than once", locale),
            ));
        }
    }

    for locale in i18n.locale_configs.keys() {
        if !i18n.locales.contains(locale) {
            issues.push(ValidationIssue::new(
                format!("i18n.locale_configs.{}", locale),
                "configures a locale that is not in i18n.locales",
            ));
        }
    }
}

fn check_presets(site: &SiteConfig, issues: &mut Vec<ValidationIssue>) {
    let classic: Vec<_> = site
        .presets
        .iter()
        .filter(|p| p.name == CLASSIC_PRESET)
        .collect();

    for (i, preset) in site.presets.iter().enumerate() {
        if preset.name != CLASSIC_PRESET {
            issues.push(ValidationIssue::new(
                format!("presets[{}].name", i),
                format!("unknown preset `{}`", preset.name),
            ));
        }
        if preset.blog {
            issues.push(ValidationIssue::new(
                format!("presets[{}].blog", i),
                "the blog plugin is not supported; set `blog = false`",
            ));
        }
    }

    match classic.as_slice() {
        [] => issues.push(ValidationIssue::new(
            "presets",
            "a `classic` preset is required",
        )),
        [preset] => {
            if preset.docs.sidebar_path.is_none() {
                issues.push(ValidationIssue::new(
                    "presets.docs.sidebar_path",
                    "must be set",
                ));
            }
            if preset.docs.path.trim().is_empty() {
                issues.push(ValidationIssue::new("presets.docs.path", "must not be empty"));
            }
            if let Some(edit_url) = &preset.docs.edit_url {
                if Url::parse(edit_url).is_err() {
                    issues.push(ValidationIssue::new(
                        "presets.docs.edit_url",
                        format!("`{}` is not an absolute URL", edit_url),
                    ));
                }
            }
        }
        _ => issues.push(ValidationIssue::new(
            "presets",
            "only one `classic` preset may be configured",
        )),
    }
}

fn check_navbar(site: &SiteConfig, sidebars: &Sidebars, issues: &mut Vec<ValidationIssue>) {
    for (i, item) in site.theme_config.navbar.items.iter().enumerate() {
        let field = format!("theme_config.navbar.items[{}]", i);
        match item {
            NavbarItem::DocSidebar {
                sidebar_id, label, ..
            } => {
                if label.trim().is_empty() {
                    issues.push(ValidationIssue::new(&field, "label must not be empty"));
                }
                if sidebars.get(sidebar_id).is_none() {
                    issues.push(ValidationIssue::new(
                        &field,
                        format!("unknown sidebar `{}`", sidebar_id),
                    ));
                } else if sidebars.first_doc(sidebar_id).is_none() {
                    issues.push(ValidationIssue::new(
                        &field,
                        format!("sidebar `{}` contains no docs", sidebar_id),
                    ));
                }
            }
            NavbarItem::Doc { doc_id, label, .. } => {
                if doc_id.trim().is_empty() {
                    issues.push(ValidationIssue::new(&field, "doc_id must not be empty"));
                }
                if label.as_deref().is_some_and(|l| l.trim().is_empty()) {
                    issues.push(ValidationIssue::new(&field, "label must not be empty"));
                }
            }
            NavbarItem::Link { link, .. } => check_link(link, &field, issues),
        }
    }
}

fn check_footer(site: &SiteConfig, issues: &mut Vec<ValidationIssue>) {
    for (g, group) in site.theme_config.footer.links.iter().enumerate() {
        if group.items.is_empty() {
            issues.push(ValidationIssue::new(
                format!("theme_config.footer.links[{}]", g),
                "link group has no items",
            ));
        }
        for (i, link) in group.items.iter().enumerate() {
            let field = format!("theme_config.footer.links[{}].items[{}]", g, i);
            check_link(link, &field, issues);
        }
    }
}

fn check_link(link: &Link, field: &str, issues: &mut Vec<ValidationIssue>) {
    if link.label.trim().is_empty() {
        issues.push(ValidationIssue::new(field, "label must not be empty"));
    }

    match link.target() {
        None => issues.push(ValidationIssue::new(
            field,
            "exactly one of `to` or `href` must be set",
        )),
        Some(LinkTarget::Internal(to)) => {
            if to.trim().is_empty() {
                issues.push(ValidationIssue::new(field, "`to` must not be empty"));
            } else if !to.starts_with('/') {
                issues.push(ValidationIssue::new(
                    field,
                    format!("internal route `{}` must start with `/`", to),
                ));
            }
        }
        Some(LinkTarget::External(href)) => {
            if href.trim().is_empty() {
                issues.push(ValidationIssue::new(field, "`href` must not be empty"));
            } else if Url::parse(href).is_err() {
                issues.push(ValidationIssue::new(
                    field,
                    format!("`{}` is not an absolute URL", href),
                ));
            }
        }
    }
}

/// Doc ids name the doc, not its source file.
fn has_doc_extension(id: &str) -> bool {
    id.ends_with(".md") || id.ends_with(".mdx")
}

fn check_sidebars(sidebars: &Sidebars, issues: &mut Vec<ValidationIssue>) {
    for sidebar_id in sidebars.sidebar_ids() {
        let field = format!("sidebars.{}", sidebar_id);

        for id in sidebars.doc_ids(sidebar_id) {
            if !DOC_ID_RE.is_match(id) || id.contains("..") || has_doc_extension(id) {
                issues.push(ValidationIssue::new(
                    &field,
                    format!("`{}` is not a valid doc id", id),
                ));
            }
        }

        for id in sidebars.duplicate_doc_ids(sidebar_id) {
            issues.push(ValidationIssue::new(
                &field,
                format!("`{}` is listed more than once", id),
            ));
        }
    }
}

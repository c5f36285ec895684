//! Site configuration records (orgdocs.toml).

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Global site configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SiteConfig {
    /// Site title, shown in the browser tab and the navbar fallback
    pub title: String,

    /// Short description shown under the title
    #[serde(default)]
    pub tagline: String,

    /// Favicon path, relative to the static directories
    #[serde(default)]
    pub favicon: Option<String>,

    /// Deployment origin (e.g. `https://example.github.io`)
    pub url: String,

    /// Path the site is served under, with leading and trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deployment organization (GitHub user or org)
    #[serde(default)]
    pub organization_name: Option<String>,

    /// Deployment project (repository name)
    #[serde(default)]
    pub project_name: Option<String>,

    /// Trailing slash policy for generated routes
    #[serde(default)]
    pub trailing_slash: Option<bool>,

    /// What to do with links that point at routes the build did not produce
    #[serde(default)]
    pub on_broken_links: ReportingSeverity,

    /// What to do with relative `.md` links that do not resolve to a doc
    #[serde(default = "default_markdown_link_severity")]
    pub on_broken_markdown_links: ReportingSeverity,

    #[serde(default)]
    pub i18n: I18nConfig,

    #[serde(default)]
    pub presets: Vec<Preset>,

    #[serde(default)]
    pub theme_config: ThemeConfig,

    /// Directories copied verbatim into the output root
    #[serde(default = "default_static_directories")]
    pub static_directories: Vec<String>,
}

fn default_base_url() -> String {
    "/".to_string()
}

fn default_markdown_link_severity() -> ReportingSeverity {
    ReportingSeverity::Warn
}

fn default_static_directories() -> Vec<String> {
    vec!["static".to_string()]
}

impl SiteConfig {
    /// The classic preset, if configured.
    pub fn classic_preset(&self) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == CLASSIC_PRESET)
    }

    /// Docs options of the classic preset, or the defaults.
    pub fn docs(&self) -> DocsOptions {
        self.classic_preset()
            .map(|p| p.docs.clone())
            .unwrap_or_default()
    }

    /// Footer copyright with `{year}` replaced by the given year.
    pub fn copyright_for_year(&self, year: i32) -> Option<String> {
        self.theme_config
            .footer
            .copyright
            .as_ref()
            .map(|c| c.replace("{year}", &year.to_string()))
    }

    /// Footer copyright for the current year.
    pub fn copyright(&self) -> Option<String> {
        use chrono::Datelike;
        self.copyright_for_year(chrono::Local::now().year())
    }
}

/// Name of the only recognised preset.
pub const CLASSIC_PRESET: &str = "classic";

/// Severity for reporting problems found during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingSeverity {
    Ignore,
    Log,
    Warn,
    /// Fail the build
    #[default]
    Throw,
}

/// Internationalization settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct I18nConfig {
    pub default_locale: String,
    /// Ordered list of locales to build
    pub locales: Vec<String>,
    pub locale_configs: BTreeMap<String, LocaleConfig>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            locales: vec!["en".to_string()],
            locale_configs: BTreeMap::new(),
        }
    }
}

impl I18nConfig {
    /// Value for the `<html lang>` attribute of a locale.
    pub fn html_lang<'a>(&'a self, locale: &'a str) -> &'a str {
        self.locale_configs
            .get(locale)
            .and_then(|c| c.html_lang.as_deref())
            .unwrap_or(locale)
    }

    /// Text direction of a locale.
    pub fn direction(&self, locale: &str) -> Direction {
        self.locale_configs
            .get(locale)
            .map(|c| c.direction)
            .unwrap_or_default()
    }

    /// Display label of a locale (falls back to the code).
    pub fn label<'a>(&'a self, locale: &'a str) -> &'a str {
        self.locale_configs
            .get(locale)
            .and_then(|c| c.label.as_deref())
            .unwrap_or(locale)
    }
}

/// Per-locale overrides.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocaleConfig {
    pub label: Option<String>,
    pub direction: Direction,
    pub html_lang: Option<String>,
}

/// Text direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

/// A preset bundles docs, blog and theme options.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Preset {
    pub name: String,

    #[serde(default)]
    pub docs: DocsOptions,

    /// Blog plugin toggle; only `false` is supported
    #[serde(default)]
    pub blog: bool,

    #[serde(default)]
    pub theme: PresetTheme,
}

/// Options for the docs plugin.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocsOptions {
    /// Content directory, relative to the config file
    pub path: String,

    /// Sidebar file, relative to the config file
    pub sidebar_path: Option<String>,

    /// Route segment docs are served under (`/` serves them at the site root)
    pub route_base_path: String,

    /// Base URL for "Edit this page" links
    pub edit_url: Option<String>,
}

impl Default for DocsOptions {
    fn default() -> Self {
        Self {
            path: "docs".to_string(),
            sidebar_path: None,
            route_base_path: "docs".to_string(),
            edit_url: None,
        }
    }
}

/// Theme options of a preset.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PresetTheme {
    /// Custom stylesheets, relative to the config file
    #[serde(deserialize_with = "string_or_list")]
    pub custom_css: Vec<String>,
}

/// Accept either `"a.css"` or `["a.css", "b.css"]`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// Theme configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: ColorModeConfig,
    pub navbar: NavbarConfig,
    pub footer: FooterConfig,
    pub prism: PrismConfig,
    /// Social card image, relative to the static directories
    pub image: Option<String>,
}

/// Light/dark mode behaviour.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorModeConfig {
    pub default_mode: ColorMode,
    /// Hide the toggle and always use the default mode
    pub disable_switch: bool,
    /// Follow the operating system's `prefers-color-scheme`
    pub respect_prefers_color_scheme: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Top navigation bar.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavbarConfig {
    pub title: Option<String>,
    pub logo: Option<NavbarLogo>,
    pub items: Vec<NavbarItem>,
    pub hide_on_scroll: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NavbarLogo {
    #[serde(default)]
    pub alt: String,
    pub src: String,
    #[serde(default)]
    pub src_dark: Option<String>,
    /// Link target of the logo (defaults to the site root)
    #[serde(default)]
    pub href: Option<String>,
}

/// Which side of the navbar an item sits on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Left,
    Right,
}

/// A navbar entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNavbarItem")]
pub enum NavbarItem {
    /// Link to the first doc of a sidebar
    DocSidebar {
        sidebar_id: String,
        label: String,
        position: Position,
    },
    /// Link to a single doc
    Doc {
        doc_id: String,
        label: Option<String>,
        position: Position,
    },
    /// Plain link to an internal route or an external URL
    Link { link: Link, position: Position },
}

impl NavbarItem {
    pub fn position(&self) -> Position {
        match self {
            Self::DocSidebar { position, .. }
            | Self::Doc { position, .. }
            | Self::Link { position, .. } => *position,
        }
    }
}

#[derive(Deserialize)]
struct RawNavbarItem {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    sidebar_id: Option<String>,
    #[serde(default)]
    doc_id: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    position: Position,
}

impl TryFrom<RawNavbarItem> for NavbarItem {
    type Error = String;

    fn try_from(raw: RawNavbarItem) -> Result<Self, Self::Error> {
        match raw.kind.as_deref().unwrap_or("default") {
            "doc_sidebar" | "docSidebar" => Ok(Self::DocSidebar {
                sidebar_id: raw
                    .sidebar_id
                    .ok_or("doc_sidebar navbar item requires `sidebar_id`")?,
                label: raw.label.unwrap_or_default(),
                position: raw.position,
            }),
            "doc" => Ok(Self::Doc {
                doc_id: raw.doc_id.ok_or("doc navbar item requires `doc_id`")?,
                label: raw.label,
                position: raw.position,
            }),
            "default" | "link" => Ok(Self::Link {
                link: Link {
                    label: raw.label.unwrap_or_default(),
                    to: raw.to,
                    href: raw.href,
                },
                position: raw.position,
            }),
            other => Err(format!("unknown navbar item type `{}`", other)),
        }
    }
}

/// A labelled link to an internal route (`to`) or external URL (`href`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Link {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

/// Resolved target of a [`Link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget<'a> {
    Internal(&'a str),
    External(&'a str),
}

impl Link {
    /// The link target, if exactly one of `to`/`href` is set.
    pub fn target(&self) -> Option<LinkTarget<'_>> {
        match (self.to.as_deref(), self.href.as_deref()) {
            (Some(to), None) => Some(LinkTarget::Internal(to)),
            (None, Some(href)) => Some(LinkTarget::External(href)),
            _ => None,
        }
    }
}

/// Site footer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FooterConfig {
    pub style: FooterStyle,
    pub links: Vec<FooterLinkGroup>,
    /// Copyright line; `{year}` is replaced at build time
    pub copyright: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterStyle {
    Dark,
    #[default]
    Light,
}

impl FooterStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

/// A titled column of footer links.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FooterLinkGroup {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<Link>,
}

/// Syntax highlighting theme pair.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrismConfig {
    pub theme: PrismTheme,
    pub dark_theme: PrismTheme,
}

impl Default for PrismConfig {
    fn default() -> Self {
        Self {
            theme: PrismTheme::Github,
            dark_theme: PrismTheme::Dracula,
        }
    }
}

/// Known syntax highlighting themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrismTheme {
    Github,
    Dracula,
    VsLight,
    VsDark,
    NightOwl,
    NightOwlLight,
    OceanicNext,
    Okaidia,
    Palenight,
    DuotoneDark,
    DuotoneLight,
    OneDark,
    OneLight,
}

impl PrismTheme {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Dracula => "dracula",
            Self::VsLight => "vsLight",
            Self::VsDark => "vsDark",
            Self::NightOwl => "nightOwl",
            Self::NightOwlLight => "nightOwlLight",
            Self::OceanicNext => "oceanicNext",
            Self::Okaidia => "okaidia",
            Self::Palenight => "palenight",
            Self::DuotoneDark => "duotoneDark",
            Self::DuotoneLight => "duotoneLight",
            Self::OneDark => "oneDark",
            Self::OneLight => "oneLight",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(toml_src: &str) -> SiteConfig {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn applies_defaults() {
        let site = parse("title = \"Docs\"\nurl = \"https://example.com\"\n");

        assert_eq!(site.base_url, "/");
        assert_eq!(site.on_broken_links, ReportingSeverity::Throw);
        assert_eq!(site.on_broken_markdown_links, ReportingSeverity::Warn);
        assert_eq!(site.i18n.default_locale, "en");
        assert_eq!(site.i18n.locales, vec!["en".to_string()]);
        assert_eq!(site.static_directories, vec!["static".to_string()]);
        assert_eq!(site.theme_config.prism.theme, PrismTheme::Github);
        assert!(!site.theme_config.color_mode.respect_prefers_color_scheme);
        assert_eq!(site.docs().route_base_path, "docs");
    }

    #[test]
    fn parses_navbar_items() {
        let site = parse(
            r#"
title = "Docs"
url = "https://example.com"

[[theme_config.navbar.items]]
type = "doc_sidebar"
sidebar_id = "tutorialSidebar"
label = "Docs"

[[theme_config.navbar.items]]
href = "https://github.com/example"
label = "GitHub"
position = "right"
"#,
        );

        let items = &site.theme_config.navbar.items;
        assert_eq!(
            items[0],
            NavbarItem::DocSidebar {
                sidebar_id: "tutorialSidebar".to_string(),
                label: "Docs".to_string(),
                position: Position::Left,
            }
        );
        assert_eq!(items[1].position(), Position::Right);
        match &items[1] {
            NavbarItem::Link { link, .. } => {
                assert_eq!(
                    link.target(),
                    Some(LinkTarget::External("https://github.com/example"))
                );
            }
            other => panic!("expected link, got {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_navbar_type() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
title = "Docs"
url = "https://example.com"

[[theme_config.navbar.items]]
type = "dropdown"
label = "More"
"#,
        );

        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown navbar item type"), "{}", err);
    }

    #[test]
    fn rejects_unknown_prism_theme() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
title = "Docs"
url = "https://example.com"

[theme_config.prism]
theme = "solarized"
"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn custom_css_accepts_string_or_list() {
        let site = parse(
            r#"
title = "Docs"
url = "https://example.com"

[[presets]]
name = "classic"
theme = { custom_css = "src/css/custom.css" }

[[presets]]
name = "other"
theme = { custom_css = ["a.css", "b.css"] }
"#,
        );

        assert_eq!(site.presets[0].theme.custom_css, vec!["src/css/custom.css"]);
        assert_eq!(site.presets[1].theme.custom_css, vec!["a.css", "b.css"]);
    }

    #[test]
    fn link_target_requires_exactly_one() {
        let both = Link {
            label: "x".to_string(),
            to: Some("/".to_string()),
            href: Some("https://example.com".to_string()),
        };
        assert_eq!(both.target(), None);
        assert_eq!(Link::default().target(), None);
    }

    #[test]
    fn substitutes_copyright_year() {
        let site = parse(
            r#"
title = "Docs"
url = "https://example.com"

[theme_config.footer]
copyright = "Copyright © {year} Contributors."
"#,
        );

        assert_eq!(
            site.copyright_for_year(2026).as_deref(),
            Some("Copyright © 2026 Contributors.")
        );
    }

    #[test]
    fn locale_overrides() {
        let site = parse(
            r#"
title = "Docs"
url = "https://example.com"

[i18n]
default_locale = "en"
locales = ["en", "ar"]

[i18n.locale_configs.ar]
label = "العربية"
direction = "rtl"
"#,
        );

        assert_eq!(site.i18n.direction("ar"), Direction::Rtl);
        assert_eq!(site.i18n.direction("en"), Direction::Ltr);
        assert_eq!(site.i18n.html_lang("en"), "en");
        assert_eq!(site.i18n.label("ar"), "العربية");
    }
}

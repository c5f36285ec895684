//! Template engine for rendering documentation pages.

use minijinja::{context, Environment};
use orgdocs_config::ColorModeConfig;
use serde::Serialize;

use crate::nav::{NavItem, PageLink};

/// A table of contents entry.
#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// A rendered link in the navbar, footer or locale menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkItem {
    pub label: String,
    pub href: String,
    /// Opens in a new tab
    pub external: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoContext {
    pub alt: String,
    pub src: String,
    pub src_dark: Option<String>,
    pub href: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NavbarContext {
    pub title: Option<String>,
    pub logo: Option<LogoContext>,
    pub left: Vec<LinkItem>,
    pub right: Vec<LinkItem>,
    pub hide_on_scroll: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterGroupContext {
    pub title: Option<String>,
    pub items: Vec<LinkItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterContext {
    /// `dark` or `light`
    pub style: String,
    pub groups: Vec<FooterGroupContext>,
    pub copyright: Option<String>,
}

/// A link to the current page in another locale.
#[derive(Debug, Clone, Serialize)]
pub struct LocaleLink {
    pub locale: String,
    pub label: String,
    pub href: String,
    pub active: bool,
}

/// Values shared by every page of a locale.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub title: String,
    pub tagline: String,
    pub base_url: String,
    /// Base URL of the whole site (assets live here)
    pub site_base_url: String,
    /// `<html lang>`
    pub lang: String,
    /// `ltr` or `rtl`
    pub dir: String,
    pub favicon: Option<String>,
    /// Absolute URL of the social card
    pub image: Option<String>,
    /// `light` or `dark`
    pub default_mode: String,
    pub color_mode_script: String,
    pub show_color_toggle: bool,
    pub styles: Vec<String>,
    /// Inline scripts appended to every page
    pub scripts: Vec<String>,
    pub navbar: NavbarContext,
    pub footer: Option<FooterContext>,
}

/// Values specific to one page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageContext {
    /// Page title
    pub title: String,
    pub description: Option<String>,
    /// Front matter keywords
    pub keywords: Vec<String>,
    /// Rendered content HTML
    pub content: String,
    /// Sidebar navigation items
    pub nav: Vec<NavItem>,
    /// Table of contents
    pub toc: Vec<TocEntry>,
    pub edit_url: Option<String>,
    pub prev: Option<PageLink>,
    pub next: Option<PageLink>,
    /// Same page in every configured locale (empty for single-locale sites)
    pub locales: Vec<LocaleLink>,
    /// Absolute URL of the page
    pub permalink: Option<String>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with default templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("doc.html", DOC_TEMPLATE),
            ("nav.html", NAV_TEMPLATE),
            ("navbar.html", NAVBAR_TEMPLATE),
            ("footer.html", FOOTER_TEMPLATE),
            ("404.html", NOT_FOUND_TEMPLATE),
        ] {
            env.add_template(name, source)
                .expect("Failed to add built-in template");
        }

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(
        &self,
        template: &str,
        site: &SiteContext,
        page: &PageContext,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            site => site,
            page => page,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Inline script that sets `data-theme` before first paint.
///
/// The stored choice wins unless the switch is disabled. With
/// `respect_prefers_color_scheme` the operating system preference is used
/// when nothing is stored; otherwise the configured default applies.
pub fn color_mode_script(config: &ColorModeConfig) -> String {
    let mut script = String::from("(function() {\n");
    script.push_str(&format!(
        "  var mode = '{}';\n",
        config.default_mode.as_str()
    ));

    if !config.disable_switch {
        script.push_str("  var stored = null;\n");
        script.push_str("  try { stored = localStorage.getItem('theme'); } catch (e) {}\n");
        script.push_str("  if (stored === 'light' || stored === 'dark') {\n    mode = stored;\n  }");
        if config.respect_prefers_color_scheme {
            script.push_str(
                " else if (window.matchMedia && window.matchMedia('(prefers-color-scheme: dark)').matches) {\n    mode = 'dark';\n  } else if (window.matchMedia && window.matchMedia('(prefers-color-scheme: light)').matches) {\n    mode = 'light';\n  }",
            );
        }
        script.push('\n');
    } else if config.respect_prefers_color_scheme {
        script.push_str(
            "  if (window.matchMedia && window.matchMedia('(prefers-color-scheme: dark)').matches) {\n    mode = 'dark';\n  }\n",
        );
    }

    script.push_str("  document.documentElement.setAttribute('data-theme', mode);\n");
    script.push_str("})();");
    script
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ site.lang }}" dir="{{ site.dir }}" data-theme="{{ site.default_mode }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if page.title and page.title != site.title %}{{ page.title }} | {% endif %}{{ site.title }}</title>
  <meta name="description" content="{{ page.description or site.tagline }}">
  {% if page.keywords %}<meta name="keywords" content="{{ page.keywords | join(", ") }}">
  {% endif %}  <meta property="og:title" content="{{ page.title or site.title }}">
  {% if page.permalink %}<link rel="canonical" href="{{ page.permalink }}">
  <meta property="og:url" content="{{ page.permalink }}">
  {% endif %}{% if site.image %}<meta property="og:image" content="{{ site.image }}">
  {% endif %}{% if site.favicon %}<link rel="icon" href="{{ site.favicon }}">
  {% endif %}{% for alt in page.locales %}<link rel="alternate" hreflang="{{ alt.locale }}" href="{{ alt.href }}">
  {% endfor %}<script>{{ site.color_mode_script | safe }}</script>
  <link rel="stylesheet" href="{{ site.site_base_url }}assets/main.css">
  <link rel="stylesheet" href="{{ site.site_base_url }}assets/prism.css">
  {% for style in site.styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}
</head>
<body>
  {% include "navbar.html" %}
  {% block layout %}
  <div class="layout">
    <nav class="sidebar" aria-label="Docs sidebar">
      {% include "nav.html" %}
    </nav>
    <main class="main">
      {% block content %}{% endblock %}
    </main>
  </div>
  {% endblock %}
  {% include "footer.html" %}
  <script src="{{ site.site_base_url }}assets/main.js"></script>
  {% for script in site.scripts %}
  <script>{{ script | safe }}</script>
  {% endfor %}
</body>
</html>"##;

const DOC_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="doc">
  <div class="content">
    {{ page.content | safe }}
  </div>
  {% if page.edit_url %}
  <a class="edit-link" href="{{ page.edit_url }}" target="_blank" rel="noopener noreferrer">Edit this page</a>
  {% endif %}
  {% if page.prev or page.next %}
  <nav class="pagination" aria-label="Docs pages">
    {% if page.prev %}<a class="prev" href="{{ page.prev.path }}">« {{ page.prev.title }}</a>{% endif %}
    {% if page.next %}<a class="next" href="{{ page.next.path }}">{{ page.next.title }} »</a>{% endif %}
  </nav>
  {% endif %}
</article>

{% if page.toc %}
<aside class="toc">
  <h2>On this page</h2>
  <ul>
  {% for entry in page.toc %}
    <li class="toc-level-{{ entry.level }}">
      <a href="#{{ entry.id }}">{{ entry.title }}</a>
    </li>
  {% endfor %}
  </ul>
</aside>
{% endif %}
{% endblock %}"##;

const NAV_TEMPLATE: &str = r##"<ul class="nav-list">
{% for item in page.nav recursive %}
  <li class="nav-item nav-{{ item.kind }}{% if item.active %} active{% endif %}">
    {% if item.kind == "category" %}
    <details{% if not item.collapsed %} open{% endif %}>
      <summary>{{ item.title }}</summary>
      <ul class="nav-children">{{ loop(item.children) }}</ul>
    </details>
    {% elif item.kind == "link" %}
    <a href="{{ item.path }}" target="_blank" rel="noopener noreferrer">{{ item.title }}</a>
    {% else %}
    <a href="{{ item.path }}"{% if item.active %} aria-current="page"{% endif %}>{{ item.title }}</a>
    {% endif %}
  </li>
{% endfor %}
</ul>"##;

const NAVBAR_TEMPLATE: &str = r##"<header class="navbar"{% if site.navbar.hide_on_scroll %} data-hide-on-scroll{% endif %}>
  <button class="menu-btn" type="button" aria-label="Toggle navigation">☰</button>
  {% set logo = site.navbar.logo %}
  <a class="navbar-brand" href="{{ logo.href if logo else site.base_url }}">
    {% if logo %}<img src="{{ logo.src }}" alt="{{ logo.alt }}"{% if logo.src_dark %} data-src-dark="{{ logo.src_dark }}"{% endif %}>{% endif %}
    {% if site.navbar.title %}<span class="navbar-title">{{ site.navbar.title }}</span>{% endif %}
  </a>
  <ul class="navbar-items navbar-items-left">
  {% for item in site.navbar.left %}
    <li><a href="{{ item.href }}"{% if item.external %} target="_blank" rel="noopener noreferrer"{% endif %}>{{ item.label }}</a></li>
  {% endfor %}
  </ul>
  <ul class="navbar-items navbar-items-right">
  {% for item in site.navbar.right %}
    <li><a href="{{ item.href }}"{% if item.external %} target="_blank" rel="noopener noreferrer"{% endif %}>{{ item.label }}</a></li>
  {% endfor %}
  {% if page.locales %}
    <li class="locale-menu">
    {% for alt in page.locales %}<a href="{{ alt.href }}" lang="{{ alt.locale }}"{% if alt.active %} aria-current="true"{% endif %}>{{ alt.label }}</a> {% endfor %}
    </li>
  {% endif %}
  {% if site.show_color_toggle %}
    <li><button class="color-mode-toggle" type="button" aria-label="Switch between dark and light mode">◐</button></li>
  {% endif %}
  </ul>
</header>"##;

const FOOTER_TEMPLATE: &str = r##"{% if site.footer %}
<footer class="footer footer-{{ site.footer.style }}">
  {% if site.footer.groups %}
  <div class="footer-links">
  {% for group in site.footer.groups %}
    <div class="footer-col">
      {% if group.title %}<div class="footer-title">{{ group.title }}</div>{% endif %}
      <ul>
      {% for item in group.items %}
        <li><a href="{{ item.href }}"{% if item.external %} target="_blank" rel="noopener noreferrer"{% endif %}>{{ item.label }}</a></li>
      {% endfor %}
      </ul>
    </div>
  {% endfor %}
  </div>
  {% endif %}
  {% if site.footer.copyright %}<div class="footer-copyright">{{ site.footer.copyright }}</div>{% endif %}
</footer>
{% endif %}"##;

const NOT_FOUND_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block layout %}
<main class="main not-found">
  <article class="doc">
    <div class="content">
      <h1>Page Not Found</h1>
      <p>We could not find what you were looking for.</p>
      <p><a href="{{ site.base_url }}">Back to {{ site.title }}</a></p>
    </div>
  </article>
</main>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::NavKind;
    use orgdocs_config::ColorMode;

    fn site() -> SiteContext {
        SiteContext {
            title: "StarCitizen OrgBot Manual".to_string(),
            tagline: "Operator and tester documentation".to_string(),
            base_url: "/manual/".to_string(),
            site_base_url: "/manual/".to_string(),
            lang: "en".to_string(),
            dir: "ltr".to_string(),
            favicon: Some("/manual/img/favicon.ico".to_string()),
            image: None,
            default_mode: "light".to_string(),
            color_mode_script: color_mode_script(&ColorModeConfig::default()),
            show_color_toggle: true,
            styles: vec![],
            scripts: vec![],
            navbar: NavbarContext {
                title: Some("StarCitizen OrgBot Manual".to_string()),
                left: vec![LinkItem {
                    label: "Docs".to_string(),
                    href: "/manual/".to_string(),
                    external: false,
                }],
                right: vec![LinkItem {
                    label: "GitHub".to_string(),
                    href: "https://github.com/sielski666/StarCitizen-Discord-OrgBot".to_string(),
                    external: true,
                }],
                ..Default::default()
            },
            footer: Some(FooterContext {
                style: "dark".to_string(),
                groups: vec![FooterGroupContext {
                    title: Some("Community".to_string()),
                    items: vec![LinkItem {
                        label: "Discord".to_string(),
                        href: "https://discord.com".to_string(),
                        external: true,
                    }],
                }],
                copyright: Some("Copyright © 2026 StarCitizen OrgBot contributors.".to_string()),
            }),
        }
    }

    /// minijinja escapes `/` inside attribute values.
    fn unescape(html: String) -> String {
        html.replace("&#x2f;", "/")
    }

    fn nav_item(title: &str, path: &str, active: bool) -> NavItem {
        NavItem {
            title: title.to_string(),
            path: path.to_string(),
            kind: NavKind::Doc,
            children: vec![],
            active,
            collapsed: false,
        }
    }

    #[test]
    fn renders_basic_page() {
        let engine = TemplateEngine::new();
        let page = PageContext {
            title: "Setup Commands".to_string(),
            content: "<p>Hello world</p>".to_string(),
            ..Default::default()
        };

        let html = unescape(engine.render_page("doc.html", &site(), &page).unwrap());

        assert!(html.contains("<title>Setup Commands | StarCitizen OrgBot Manual</title>"));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(html.contains(r#"<html lang="en" dir="ltr" data-theme="light">"#));
        assert!(html.contains(r#"<link rel="icon" href="/manual/img/favicon.ico">"#));
    }

    #[test]
    fn renders_keywords_meta() {
        let engine = TemplateEngine::new();
        let page = PageContext {
            title: "Jobs Commands".to_string(),
            keywords: vec!["jobs".to_string(), "payout".to_string()],
            ..Default::default()
        };

        let html = engine.render_page("doc.html", &site(), &page).unwrap();
        assert!(html.contains(r#"<meta name="keywords" content="jobs, payout">"#));

        let html = engine
            .render_page("doc.html", &site(), &PageContext::default())
            .unwrap();
        assert!(!html.contains(r#"name="keywords""#));
    }

    #[test]
    fn renders_navigation_in_order() {
        let engine = TemplateEngine::new();
        let page = PageContext {
            title: "Home".to_string(),
            nav: vec![
                nav_item("Quick Start", "/manual/", true),
                nav_item("Setup Commands", "/manual/setup-commands", false),
                NavItem {
                    title: "Finance".to_string(),
                    path: String::new(),
                    kind: NavKind::Category,
                    children: vec![nav_item("Treasury", "/manual/treasury", false)],
                    active: false,
                    collapsed: true,
                },
            ],
            ..Default::default()
        };

        let html = engine.render_page("doc.html", &site(), &page).unwrap();

        let quick = html.find("Quick Start").unwrap();
        let setup = html.find("Setup Commands").unwrap();
        let treasury = html.find("Treasury").unwrap();
        assert!(quick < setup && setup < treasury);
        assert!(html.contains(r#"aria-current="page""#));
        assert!(html.contains("<details>"));
    }

    #[test]
    fn renders_navbar_and_footer() {
        let engine = TemplateEngine::new();
        let html = engine
            .render_page("doc.html", &site(), &PageContext::default())
            .unwrap();

        assert!(html.contains(">GitHub</a>"));
        assert!(html.contains(r#"class="footer footer-dark""#));
        assert!(html.contains("Copyright © 2026 StarCitizen OrgBot contributors."));
        assert!(html.contains("color-mode-toggle"));
    }

    #[test]
    fn escapes_titles() {
        let engine = TemplateEngine::new();
        let page = PageContext {
            title: "<script>alert(1)</script>".to_string(),
            ..Default::default()
        };

        let html = engine.render_page("doc.html", &site(), &page).unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn renders_not_found_page() {
        let engine = TemplateEngine::new();
        let page = PageContext {
            title: "Page Not Found".to_string(),
            ..Default::default()
        };

        let html = engine.render_page("404.html", &site(), &page).unwrap();

        assert!(html.contains("Back to StarCitizen OrgBot Manual"));
        assert!(!html.contains("class=\"sidebar\""));
    }

    #[test]
    fn color_script_follows_os_when_respected() {
        let config = ColorModeConfig {
            respect_prefers_color_scheme: true,
            ..Default::default()
        };

        let script = color_mode_script(&config);

        assert!(script.contains("prefers-color-scheme: dark"));
        assert!(script.contains("localStorage"));
    }

    #[test]
    fn color_script_ignores_os_when_not_respected() {
        let config = ColorModeConfig {
            default_mode: ColorMode::Dark,
            respect_prefers_color_scheme: false,
            disable_switch: false,
        };

        let script = color_mode_script(&config);

        assert!(!script.contains("prefers-color-scheme"));
        assert!(script.contains("var mode = 'dark';"));
    }

    #[test]
    fn disabled_switch_ignores_stored_choice() {
        let config = ColorModeConfig {
            disable_switch: true,
            ..Default::default()
        };

        let script = color_mode_script(&config);

        assert!(!script.contains("localStorage"));
        assert!(!script.contains("prefers-color-scheme"));
        assert!(script.contains("var mode = 'light';"));
    }
}

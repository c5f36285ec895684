//! Asset pipeline for CSS and JavaScript processing.

use orgdocs_config::PrismTheme;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the main JavaScript file.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Code block colors for the light and dark syntax themes.
    pub fn prism_css(light: PrismTheme, dark: PrismTheme) -> String {
        let block = |mode: &str, theme: PrismTheme| {
            let p = palette(theme);
            format!(
                "[data-theme='{mode}'] {{\n  --prism-theme: '{name}';\n  --prism-background: {bg};\n  --prism-color: {fg};\n  --prism-comment: {comment};\n  --prism-keyword: {keyword};\n  --prism-string: {string};\n}}\n",
                mode = mode,
                name = theme.name(),
                bg = p.background,
                fg = p.foreground,
                comment = p.comment,
                keyword = p.keyword,
                string = p.string,
            )
        };

        let mut css = block("light", light);
        css.push_str(&block("dark", dark));
        css
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

/// Base colors of a syntax theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub foreground: &'static str,
    pub comment: &'static str,
    pub keyword: &'static str,
    pub string: &'static str,
}

/// Colors of a known syntax theme.
pub fn palette(theme: PrismTheme) -> Palette {
    let (background, foreground, comment, keyword, string) = match theme {
        PrismTheme::Github => ("#f6f8fa", "#393a34", "#999988", "#00009f", "#e3116c"),
        PrismTheme::Dracula => ("#282a36", "#f8f8f2", "#6272a4", "#bd93f9", "#ff79c6"),
        PrismTheme::VsLight => ("#ffffff", "#000000", "#008000", "#0000ff", "#a31515"),
        PrismTheme::VsDark => ("#1e1e1e", "#9cdcfe", "#6a9955", "#569cd6", "#ce9178"),
        PrismTheme::NightOwl => ("#011627", "#d6deeb", "#637777", "#c792ea", "#addb67"),
        PrismTheme::NightOwlLight => ("#fbfbfb", "#403f53", "#989fb1", "#994cc3", "#c96765"),
        PrismTheme::OceanicNext => ("#1b2b34", "#cdd3de", "#65737e", "#c594c5", "#99c794"),
        PrismTheme::Okaidia => ("#272822", "#f8f8f2", "#8292a2", "#66d9ef", "#a6e22e"),
        PrismTheme::Palenight => ("#292d3e", "#bfc7d5", "#697098", "#c792ea", "#c3e88d"),
        PrismTheme::DuotoneDark => ("#2a2734", "#9a86fd", "#6c6783", "#ffcc99", "#ffb870"),
        PrismTheme::DuotoneLight => ("#faf8f5", "#728fcb", "#b6ad9a", "#063289", "#1659df"),
        PrismTheme::OneDark => ("#282c34", "#abb2bf", "#5c6370", "#c678dd", "#98c379"),
        PrismTheme::OneLight => ("#fafafa", "#383a42", "#a0a1a7", "#a626a4", "#50a14f"),
    };

    Palette {
        background,
        foreground,
        comment,
        keyword,
        string,
    }
}

const DEFAULT_CSS: &str = r#"/* OrgBot Manual theme */

:root,
[data-theme='light'] {
  --background: #ffffff;
  --foreground: #1c1e21;
  --muted: #f5f6f7;
  --muted-foreground: #525860;
  --border: #dadde1;
  --primary: #2e8555;
  --primary-foreground: #ffffff;
  --navbar-height: 3.75rem;
  --sidebar-width: 280px;
  --toc-width: 220px;
  --content-max-width: 800px;
  --radius: 0.375rem;
}

[data-theme='dark'] {
  --background: #1b1b1d;
  --foreground: #e3e3e3;
  --muted: #242526;
  --muted-foreground: #a8adb4;
  --border: #444950;
  --primary: #25c2a0;
  --primary-foreground: #1b1b1d;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

/* Navbar */
.navbar {
  position: sticky;
  top: 0;
  z-index: 40;
  display: flex;
  align-items: center;
  gap: 1rem;
  height: var(--navbar-height);
  padding: 0 1rem;
  background: var(--background);
  border-bottom: 1px solid var(--border);
}

.navbar-brand {
  display: flex;
  align-items: center;
  gap: 0.5rem;
  font-weight: 700;
  color: var(--foreground);
  text-decoration: none;
}

.navbar-brand img {
  height: 2rem;
}

.navbar-items {
  display: flex;
  align-items: center;
  gap: 0.75rem;
  list-style: none;
}

.navbar-items-right {
  margin-left: auto;
}

.navbar-items a {
  color: var(--foreground);
  text-decoration: none;
  font-weight: 500;
}

.navbar-items a:hover {
  color: var(--primary);
}

.color-mode-toggle {
  background: none;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  color: var(--foreground);
  padding: 0.25rem 0.5rem;
  cursor: pointer;
}

.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  min-height: calc(100vh - var(--navbar-height));
}

/* Sidebar */
.sidebar {
  background: var(--muted);
  border-right: 1px solid var(--border);
  padding: 1.5rem;
  position: sticky;
  top: var(--navbar-height);
  height: calc(100vh - var(--navbar-height));
  overflow-y: auto;
}

.nav-list,
.nav-children {
  list-style: none;
}

.nav-children {
  margin-left: 1rem;
  margin-top: 0.25rem;
}

.nav-item {
  margin-bottom: 0.25rem;
}

.nav-item a,
.nav-item summary {
  display: block;
  padding: 0.5rem 0.75rem;
  color: var(--muted-foreground);
  text-decoration: none;
  border-radius: var(--radius);
  cursor: pointer;
}

.nav-item a:hover {
  background: var(--border);
  color: var(--foreground);
}

.nav-item.active > a {
  background: var(--primary);
  color: var(--primary-foreground);
}

/* Main content */
.main {
  display: grid;
  grid-template-columns: 1fr var(--toc-width);
  gap: 2rem;
  padding: 2rem;
  max-width: calc(var(--content-max-width) + var(--toc-width) + 4rem);
}

.doc {
  max-width: var(--content-max-width);
}

.content h1 {
  font-size: 2.5rem;
  margin-bottom: 1.5rem;
}

.content h2 {
  font-size: 1.5rem;
  margin: 2rem 0 1rem;
  padding-bottom: 0.5rem;
  border-bottom: 1px solid var(--border);
}

.content h3 {
  font-size: 1.25rem;
  margin: 1.5rem 0 0.75rem;
}

.content p,
.content ul,
.content ol,
.content table {
  margin-bottom: 1rem;
}

.content ul,
.content ol {
  padding-left: 1.5rem;
}

.content a {
  color: var(--primary);
  text-underline-offset: 4px;
}

.content table {
  border-collapse: collapse;
}

.content th,
.content td {
  border: 1px solid var(--border);
  padding: 0.5rem 0.75rem;
}

/* Code blocks */
.content pre {
  background: var(--prism-background);
  color: var(--prism-color);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
  font-family: ui-monospace, monospace;
  font-size: 0.875rem;
  margin-bottom: 1rem;
  position: relative;
}

.content code {
  font-family: ui-monospace, monospace;
  font-size: 0.875em;
  background: var(--muted);
  padding: 0.125rem 0.375rem;
  border-radius: 0.25rem;
}

.content pre code {
  background: none;
  padding: 0;
  color: inherit;
}

.copy-btn {
  position: absolute;
  top: 0.5rem;
  right: 0.5rem;
  padding: 0.25rem 0.75rem;
  font-size: 0.75rem;
  background: var(--muted);
  color: var(--foreground);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  cursor: pointer;
}

.edit-link {
  display: inline-block;
  margin-top: 2rem;
  color: var(--primary);
}

.pagination {
  display: flex;
  justify-content: space-between;
  gap: 1rem;
  margin-top: 2rem;
}

.pagination a {
  flex: 1;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 0.75rem 1rem;
  color: var(--foreground);
  text-decoration: none;
}

.pagination .next {
  text-align: right;
}

/* Table of contents */
.toc {
  position: sticky;
  top: calc(var(--navbar-height) + 2rem);
  align-self: start;
}

.toc h2 {
  font-size: 0.75rem;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
  margin-bottom: 0.75rem;
}

.toc ul {
  list-style: none;
}

.toc a {
  font-size: 0.875rem;
  color: var(--muted-foreground);
  text-decoration: none;
}

.toc-level-3 {
  padding-left: 1rem;
}

.toc-level-4 {
  padding-left: 2rem;
}

/* Footer */
.footer {
  padding: 2rem;
  border-top: 1px solid var(--border);
}

.footer-dark {
  background: #303846;
  color: #ebedf0;
}

.footer-dark a {
  color: #ebedf0;
}

.footer-links {
  display: flex;
  gap: 3rem;
  margin-bottom: 1.5rem;
}

.footer-links ul {
  list-style: none;
}

.footer-title {
  font-weight: 700;
  margin-bottom: 0.5rem;
}

.footer-copyright {
  text-align: center;
  font-size: 0.875rem;
}

/* Responsive */
@media (max-width: 996px) {
  .layout,
  .main {
    grid-template-columns: 1fr;
  }

  .sidebar {
    position: fixed;
    left: -100%;
    z-index: 50;
    transition: left 0.3s;
    width: var(--sidebar-width);
  }

  .sidebar.open {
    left: 0;
  }

  .toc {
    display: none;
  }

  .menu-btn {
    display: block;
  }
}

.menu-btn {
  display: none;
  background: none;
  border: none;
  color: var(--foreground);
  font-size: 1.25rem;
  cursor: pointer;
}
"#;

const DEFAULT_JS: &str = r#"// OrgBot Manual - runtime JavaScript
(function() {
  'use strict';

  // Mobile menu toggle
  const menuBtn = document.querySelector('.menu-btn');
  const sidebar = document.querySelector('.sidebar');

  if (menuBtn && sidebar) {
    menuBtn.addEventListener('click', () => {
      sidebar.classList.toggle('open');
    });
  }

  // Color mode toggle
  const toggle = document.querySelector('.color-mode-toggle');
  if (toggle) {
    toggle.addEventListener('click', () => {
      const root = document.documentElement;
      const next = root.getAttribute('data-theme') === 'dark' ? 'light' : 'dark';
      root.setAttribute('data-theme', next);
      try {
        localStorage.setItem('theme', next);
      } catch (err) {
        // Storage unavailable (private mode); keep the in-page choice.
      }
    });
  }

  // Hide navbar on scroll down
  const navbar = document.querySelector('.navbar[data-hide-on-scroll]');
  if (navbar) {
    let lastY = window.scrollY;
    window.addEventListener('scroll', () => {
      navbar.style.transform = window.scrollY > lastY ? 'translateY(-100%)' : '';
      lastY = window.scrollY;
    });
  }

  // Copy code button for pre blocks
  document.querySelectorAll('.content pre').forEach(pre => {
    if (pre.querySelector('.copy-btn')) return;

    const btn = document.createElement('button');
    btn.className = 'copy-btn';
    btn.textContent = 'Copy';
    btn.setAttribute('type', 'button');

    btn.addEventListener('click', async () => {
      const code = pre.querySelector('code');
      const text = code ? code.textContent : pre.textContent;

      try {
        await navigator.clipboard.writeText(text || '');
        btn.textContent = 'Copied!';
      } catch (err) {
        btn.textContent = 'Error';
      }
      setTimeout(() => { btn.textContent = 'Copy'; }, 2000);
    });

    pre.appendChild(btn);
  });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains("[data-theme='dark']"));
        assert!(css.contains(".footer-dark"));
        assert!(css.contains("--prism-background"));
    }

    #[test]
    fn generates_js() {
        let js = AssetPipeline::generate_js();
        assert!(js.contains("color-mode-toggle"));
        assert!(js.contains("clipboard"));
    }

    #[test]
    fn prism_css_scopes_both_themes() {
        let css = AssetPipeline::prism_css(PrismTheme::Github, PrismTheme::Dracula);

        assert!(css.contains("[data-theme='light']"));
        assert!(css.contains("--prism-theme: 'github'"));
        assert!(css.contains("[data-theme='dark']"));
        assert!(css.contains("--prism-background: #282a36"));
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.navbar {
    background-color: blue;
    padding: 10px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".navbar"));
    }

    #[test]
    fn minifies_default_css() {
        let css = AssetPipeline::generate_css();
        assert!(AssetPipeline::minify_css(&css).is_ok());
    }
}

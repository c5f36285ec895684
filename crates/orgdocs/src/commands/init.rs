//! Scaffold a new manual.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
///
/// Writes the site config at `config_path` and the sidebar file and first doc
/// next to it. Existing files are kept unless `yes` is set.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing orgdocs...");

    let root = config_path.parent().unwrap_or(Path::new(""));
    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).context("Failed to create docs directory")?;

    let files = [
        (config_path.to_path_buf(), DEFAULT_CONFIG),
        (root.join("sidebars.toml"), DEFAULT_SIDEBARS),
        (docs_dir.join("intro.md"), DEFAULT_INTRO),
    ];

    for (path, contents) in files {
        if path.exists() && !yes {
            tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
            continue;
        }
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Created {}", path.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'orgdocs dev' to start the development server.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# orgdocs site configuration

title = "My Org Manual"
tagline = "Operator and tester documentation"
url = "https://example.github.io"
base_url = "/"
trailing_slash = false
on_broken_links = "throw"

[i18n]
default_locale = "en"
locales = ["en"]

[[presets]]
name = "classic"
blog = false

[presets.docs]
sidebar_path = "sidebars.toml"
route_base_path = "/"

[theme_config.color_mode]
default_mode = "light"
respect_prefers_color_scheme = true

[theme_config.navbar]
title = "My Org Manual"
items = [
  { type = "doc_sidebar", sidebar_id = "tutorialSidebar", label = "Docs", position = "left" },
]

[theme_config.footer]
style = "dark"
copyright = "Copyright © {year} My Org."
"#;

const DEFAULT_SIDEBARS: &str = r#"tutorialSidebar = ["intro"]
"#;

const DEFAULT_INTRO: &str = r#"---
slug: /
title: Quick Start
---

# Quick Start

Welcome to the manual. Add pages under `docs/` and list their ids in
`sidebars.toml` to put them in the sidebar.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use orgdocs_config::LoadedConfig;
    use tempfile::tempdir;

    #[test]
    fn scaffolds_a_valid_site() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("orgdocs.toml");

        run(&config_path, false).unwrap();

        let loaded = LoadedConfig::load(&config_path).unwrap();
        assert_eq!(loaded.sidebars.doc_ids("tutorialSidebar"), vec!["intro"]);
        assert!(temp.path().join("docs/intro.md").exists());
    }

    #[test]
    fn keeps_existing_files_without_yes() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("orgdocs.toml");
        fs::write(&config_path, "title = \"Mine\"").unwrap();

        run(&config_path, false).unwrap();
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "title = \"Mine\"");

        run(&config_path, true).unwrap();
        assert_eq!(fs::read_to_string(&config_path).unwrap(), DEFAULT_CONFIG);
    }
}

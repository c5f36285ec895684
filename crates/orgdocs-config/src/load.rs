//! Loading configuration files from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::routes::RouteResolver;
use crate::sidebar::Sidebars;
use crate::site::SiteConfig;
use crate::validate::validate;
use crate::ConfigError;

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "orgdocs.toml";

/// A site config and its sidebars, loaded and validated.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub site: SiteConfig,
    pub sidebars: Sidebars,
    /// Directory containing the config file; relative paths resolve against it
    pub root: PathBuf,
    /// Path of the config file itself
    pub config_path: PathBuf,
    /// Path of the sidebar file
    pub sidebar_path: PathBuf,
}

impl SiteConfig {
    /// Parse a site config from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

impl LoadedConfig {
    /// Load `path`, the sidebar file it references, and validate both.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let site: SiteConfig = parse_file(path, SiteConfig::from_toml_str)?;

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let sidebar_file = site
            .docs()
            .sidebar_path
            .ok_or(ConfigError::MissingSidebarPath)?;
        let sidebar_path = root.join(sidebar_file);
        let sidebars = parse_file(&sidebar_path, Sidebars::from_toml_str)?;

        validate(&site, &sidebars)?;

        tracing::debug!(
            "Loaded {} with {} sidebar(s) from {}",
            path.display(),
            sidebars.sidebar_ids().count(),
            sidebar_path.display()
        );

        Ok(Self {
            site,
            sidebars,
            root,
            config_path: path.to_path_buf(),
            sidebar_path,
        })
    }

    /// Build from in-memory values rooted at `root` (validated).
    pub fn from_parts(
        site: SiteConfig,
        sidebars: Sidebars,
        root: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        validate(&site, &sidebars)?;
        let root = root.into();
        let sidebar_path = root.join(site.docs().sidebar_path.unwrap_or_default());
        Ok(Self {
            config_path: root.join(CONFIG_FILENAME),
            sidebar_path,
            site,
            sidebars,
            root,
        })
    }

    /// Docs content directory for the default locale.
    pub fn docs_dir(&self) -> PathBuf {
        self.root.join(self.site.docs().path)
    }

    /// Docs content directory for a locale. Non-default locales read
    /// `i18n/<locale>/docs` when it exists.
    pub fn docs_dir_for_locale(&self, locale: &str) -> PathBuf {
        if locale != self.site.i18n.default_locale {
            let translated = self.root.join("i18n").join(locale).join("docs");
            if translated.is_dir() {
                return translated;
            }
        }
        self.docs_dir()
    }

    /// Custom stylesheets from the classic preset.
    pub fn custom_css(&self) -> Vec<PathBuf> {
        self.site
            .classic_preset()
            .map(|p| p.theme.custom_css.iter().map(|c| self.root.join(c)).collect())
            .unwrap_or_default()
    }

    /// Static directories copied into the output root.
    pub fn static_dirs(&self) -> Vec<PathBuf> {
        self.site
            .static_directories
            .iter()
            .map(|d| self.root.join(d))
            .collect()
    }

    /// Files whose change should trigger a rebuild.
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![
            self.config_path.clone(),
            self.sidebar_path.clone(),
            self.docs_dir(),
            self.root.join("i18n"),
        ];
        paths.extend(self.custom_css());
        paths.extend(self.static_dirs());
        paths
    }

    /// Route resolver for the default locale.
    pub fn routes(&self) -> RouteResolver {
        RouteResolver::from_config(&self.site)
    }
}

fn parse_file<T>(
    path: &Path,
    parse: impl FnOnce(&str) -> Result<T, toml::de::Error>,
) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

//! Typed site and sidebar configuration for the OrgBot manual.
//!
//! `orgdocs.toml` declares site metadata, the docs preset and theme structure;
//! the sidebar file it references lists doc ids in navigation order. Both are
//! loaded once, validated, and treated as immutable afterwards.

pub mod load;
pub mod routes;
pub mod sidebar;
pub mod site;
pub mod validate;

use std::path::PathBuf;

pub use load::{LoadedConfig, CONFIG_FILENAME};
pub use routes::RouteResolver;
pub use sidebar::{SidebarItem, Sidebars};
pub use site::{
    ColorMode, ColorModeConfig, Direction, DocsOptions, FooterConfig, FooterLinkGroup,
    FooterStyle, I18nConfig, Link, LinkTarget, NavbarConfig, NavbarItem, NavbarLogo, Position,
    Preset, PrismConfig, PrismTheme, ReportingSeverity, SiteConfig, ThemeConfig,
};
pub use validate::{collect_issues, validate, ValidationIssue};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("The classic preset must set docs.sidebar_path")]
    MissingSidebarPath,

    #[error("Invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ValidationIssue>),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

//! Static site generator for the OrgBot manual.
//!
//! Builds the documentation site from Markdown docs, the sidebar order and the
//! site's theme configuration.

pub mod assets;
pub mod builder;
pub mod links;
pub mod nav;
pub mod templates;

pub use builder::{BuildError, BuildOptions, BuildResult, MissingDoc, StaticBuilder};
pub use links::BrokenLink;

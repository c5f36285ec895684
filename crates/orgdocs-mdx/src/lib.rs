//! Markdown doc parser with front matter, headings and link extraction.
//!
//! This crate parses the manual's `.md`/`.mdx` pages, extracts YAML front matter,
//! builds a table of contents, and collects link destinations so the site
//! builder can check them.

pub mod frontmatter;
pub mod parser;

pub use frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
pub use parser::{
    is_external_url, markdown_options, parse_doc, slugify, DocLink, ParseError, ParsedDoc, TocEntry,
};

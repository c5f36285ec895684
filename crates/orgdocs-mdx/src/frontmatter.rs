//! Front matter extraction and parsing.

use serde::Deserialize;

/// Parsed front matter of a doc.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Overrides the file stem in the doc id
    #[serde(default)]
    pub id: Option<String>,

    /// Page title (falls back to the first `#` heading)
    #[serde(default)]
    pub title: Option<String>,

    /// Label shown in the sidebar instead of the title
    #[serde(default)]
    pub sidebar_label: Option<String>,

    /// Page description for SEO and the search index
    #[serde(default)]
    pub description: Option<String>,

    /// Custom route; absolute when it starts with `/`
    #[serde(default)]
    pub slug: Option<String>,

    /// Drafts are only built by the dev server
    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub hide_table_of_contents: bool,

    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Extract front matter from doc content.
///
/// Returns the parsed front matter and the remaining content after the front matter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((None, source));
    }

    // Find the closing ---
    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    let frontmatter: Frontmatter = if yaml_content.is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?
    };

    Ok((Some(frontmatter), remaining.trim_start()))
}

/// Errors that can occur when parsing front matter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed front matter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in front matter: {0}")]
    InvalidYaml(String),
}

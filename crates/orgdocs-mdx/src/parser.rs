//! Doc parser.

use std::collections::HashMap;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};

/// A parsed doc.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed front matter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown content (without front matter)
    pub content: String,

    /// Text of the first level-1 heading
    pub heading: Option<String>,

    /// Every heading in document order, with unique anchor ids
    pub toc: Vec<TocEntry>,

    /// Link destinations found in the content
    pub links: Vec<DocLink>,

    /// Image sources found in the content
    pub images: Vec<DocLink>,
}

impl ParsedDoc {
    /// Title from front matter, then the first `#` heading.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .and_then(|f| f.title.as_deref())
            .or(self.heading.as_deref())
    }
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// A link found in a doc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLink {
    /// Destination as written
    pub destination: String,
    /// Line in the source file (1-indexed, front matter included)
    pub line: usize,
}

impl DocLink {
    /// Links with a scheme (`https:`, `mailto:`) or protocol-relative links.
    pub fn is_external(&self) -> bool {
        is_external_url(&self.destination)
    }

    /// Same-page anchors (`#section`).
    pub fn is_anchor(&self) -> bool {
        self.destination.starts_with('#')
    }
}

/// Whether a link destination carries a scheme or is protocol-relative.
pub fn is_external_url(destination: &str) -> bool {
    destination.starts_with("//")
        || destination.split_once(':').is_some_and(|(scheme, _)| {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "+.-".contains(c))
        })
}

/// Errors that can occur when parsing a doc.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Front matter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Markdown extensions enabled for every doc.
pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Parse a doc.
///
/// Extracts front matter, headings and links.
pub fn parse_doc(source: &str) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let mut heading = None;
    let mut toc = Vec::new();
    let mut links = Vec::new();
    let mut images = Vec::new();

    // Lines consumed by the front matter block
    let content_start = source.len() - content.len();
    let line_offset = source[..content_start].matches('\n').count();

    let mut current_heading: Option<(u8, String)> = None;
    let mut seen_ids: HashMap<String, usize> = HashMap::new();

    for (event, range) in Parser::new_ext(content, markdown_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current_heading = Some((level as u8, String::new()));
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some((_, ref mut heading_text)) = current_heading {
                    heading_text.push_str(&text);
                }
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, title)) = current_heading.take() {
                    let title = title.trim().to_string();
                    if level == 1 && heading.is_none() {
                        heading = Some(title.clone());
                    }
                    let id = unique_id(slugify(&title), &mut seen_ids);
                    toc.push(TocEntry { title, id, level });
                }
            }

            Event::Start(Tag::Link { dest_url, .. }) => {
                links.push(DocLink {
                    destination: dest_url.to_string(),
                    line: line_offset + content[..range.start].matches('\n').count() + 1,
                });
            }

            Event::Start(Tag::Image { dest_url, .. }) => {
                images.push(DocLink {
                    destination: dest_url.to_string(),
                    line: line_offset + content[..range.start].matches('\n').count() + 1,
                });
            }

            _ => {}
        }
    }

    Ok(ParsedDoc {
        frontmatter,
        content: content.to_string(),
        heading,
        toc,
        links,
        images,
    })
}

/// Suffix repeated anchor ids with `-1`, `-2`, ...
fn unique_id(slug: String, seen: &mut HashMap<String, usize>) -> String {
    let count = seen.entry(slug.clone()).or_insert(0);
    let id = if *count == 0 {
        slug
    } else {
        format!("{}-{}", slug, count)
    };
    *count += 1;
    id
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_complete_doc() {
        let source = r#"---
title: Jobs Commands
description: Posting and completing jobs
---

# Jobs

Use `/jobs post` to create a job. See [setup](./setup-commands.md).

## Posting a job

Details.

### The `/jobs complete` command

More details, and the [Discord docs](https://discord.com/developers/docs).
"#;

        let doc = parse_doc(source).unwrap();

        let fm = doc.frontmatter.clone().unwrap();
        assert_eq!(fm.title.as_deref(), Some("Jobs Commands"));
        assert_eq!(doc.title(), Some("Jobs Commands"));
        assert_eq!(doc.heading.as_deref(), Some("Jobs"));

        assert_eq!(doc.toc.len(), 3);
        assert_eq!(doc.toc[1].title, "Posting a job");
        assert_eq!(doc.toc[1].id, "posting-a-job");
        assert_eq!(doc.toc[1].level, 2);
        assert_eq!(doc.toc[2].title, "The /jobs complete command");
        assert_eq!(doc.toc[2].id, "the-jobs-complete-command");

        assert_eq!(
            doc.links,
            vec![
                DocLink {
                    destination: "./setup-commands.md".to_string(),
                    line: 8,
                },
                DocLink {
                    destination: "https://discord.com/developers/docs".to_string(),
                    line: 16,
                },
            ]
        );
    }

    #[test]
    fn collects_images_apart_from_links() {
        let source = "# Setup\n\n![Channels](/img/channels.png)\n\nSee [jobs](./jobs-commands.md).\n";

        let doc = parse_doc(source).unwrap();

        assert_eq!(
            doc.images,
            vec![DocLink {
                destination: "/img/channels.png".to_string(),
                line: 3,
            }]
        );
        assert_eq!(doc.links.len(), 1);
        assert_eq!(doc.links[0].line, 5);
    }

    #[test]
    fn title_falls_back_to_heading() {
        let doc = parse_doc("# Troubleshooting\n\nText.").unwrap();

        assert!(doc.frontmatter.is_none());
        assert_eq!(doc.title(), Some("Troubleshooting"));
    }

    #[test]
    fn classifies_links() {
        let link = |d: &str| DocLink {
            destination: d.to_string(),
            line: 1,
        };

        assert!(link("https://discord.com").is_external());
        assert!(link("mailto:ops@example.com").is_external());
        assert!(link("//cdn.example.com/x.js").is_external());
        assert!(!link("/intro").is_external());
        assert!(!link("./intro.md").is_external());
        assert!(!link("intro.md#setup:step").is_external());
        assert!(link("#setup").is_anchor());
    }

    #[test]
    fn repeated_headings_get_unique_ids() {
        let doc = parse_doc("## Usage\n\n## Usage\n\n## Usage").unwrap();

        let ids: Vec<_> = doc.toc.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["usage", "usage-1", "usage-2"]);
    }

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("Button (Primary)"), "button-primary");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
    }
}

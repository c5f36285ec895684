//! Sidebar configuration (sidebars.toml).
//!
//! Each top-level key names a sidebar; its value is the ordered list of items
//! shown in that sidebar. Items are usually bare doc ids:
//!
//! ```toml
//! tutorialSidebar = ["intro", "setup-commands", "command-index"]
//! ```
//!
//! Categories and external links use inline tables:
//!
//! ```toml
//! guides = [
//!   "intro",
//!   { type = "category", label = "Jobs", items = ["jobs-commands", "event-jobs"] },
//!   { type = "link", label = "Discord", href = "https://discord.com" },
//! ]
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

/// Named, ordered sidebars.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Sidebars {
    sidebars: BTreeMap<String, Vec<SidebarItem>>,
}

/// A single sidebar entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSidebarItem")]
pub enum SidebarItem {
    /// A doc, optionally with a label overriding its title
    Doc { id: String, label: Option<String> },
    /// A collapsible group of items
    Category {
        label: String,
        items: Vec<SidebarItem>,
        collapsed: bool,
    },
    /// An external link
    Link { label: String, href: String },
}

impl SidebarItem {
    /// Shorthand for a doc item without a label.
    pub fn doc(id: impl Into<String>) -> Self {
        Self::Doc {
            id: id.into(),
            label: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSidebarItem {
    Id(String),
    Tagged(TaggedSidebarItem),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedSidebarItem {
    Doc {
        id: String,
        #[serde(default)]
        label: Option<String>,
    },
    Category {
        label: String,
        #[serde(default)]
        items: Vec<SidebarItem>,
        #[serde(default = "default_collapsed")]
        collapsed: bool,
    },
    Link {
        label: String,
        href: String,
    },
}

fn default_collapsed() -> bool {
    true
}

impl From<RawSidebarItem> for SidebarItem {
    fn from(raw: RawSidebarItem) -> Self {
        match raw {
            RawSidebarItem::Id(id) => Self::doc(id),
            RawSidebarItem::Tagged(TaggedSidebarItem::Doc { id, label }) => {
                Self::Doc { id, label }
            }
            RawSidebarItem::Tagged(TaggedSidebarItem::Category {
                label,
                items,
                collapsed,
            }) => Self::Category {
                label,
                items,
                collapsed,
            },
            RawSidebarItem::Tagged(TaggedSidebarItem::Link { label, href }) => {
                Self::Link { label, href }
            }
        }
    }
}

impl Sidebars {
    /// Build sidebars from `(sidebar_id, items)` pairs.
    pub fn new<I, S>(sidebars: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<SidebarItem>)>,
        S: Into<String>,
    {
        Self {
            sidebars: sidebars
                .into_iter()
                .map(|(id, items)| (id.into(), items))
                .collect(),
        }
    }

    /// Parse sidebars from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Items of a sidebar, in configured order.
    pub fn get(&self, sidebar_id: &str) -> Option<&[SidebarItem]> {
        self.sidebars.get(sidebar_id).map(Vec::as_slice)
    }

    /// All sidebar ids, sorted.
    pub fn sidebar_ids(&self) -> impl Iterator<Item = &str> {
        self.sidebars.keys().map(String::as_str)
    }

    /// Iterate `(sidebar_id, items)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SidebarItem])> {
        self.sidebars
            .iter()
            .map(|(id, items)| (id.as_str(), items.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.sidebars.is_empty()
    }

    /// Doc ids of a sidebar in display order (categories flattened depth-first).
    pub fn doc_ids(&self, sidebar_id: &str) -> Vec<&str> {
        let mut ids = Vec::new();
        if let Some(items) = self.sidebars.get(sidebar_id) {
            collect_doc_ids(items, &mut ids);
        }
        ids
    }

    /// First doc of a sidebar, used as its landing page.
    pub fn first_doc(&self, sidebar_id: &str) -> Option<&str> {
        self.doc_ids(sidebar_id).into_iter().next()
    }

    /// Doc ids listed more than once within the same sidebar.
    pub fn duplicate_doc_ids(&self, sidebar_id: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        for id in self.doc_ids(sidebar_id) {
            if !seen.insert(id) && !dupes.contains(&id) {
                dupes.push(id);
            }
        }
        dupes
    }

    /// Sidebar containing a doc, if any.
    pub fn sidebar_of(&self, doc_id: &str) -> Option<&str> {
        self.sidebars
            .keys()
            .find(|sidebar| self.doc_ids(sidebar).contains(&doc_id))
            .map(String::as_str)
    }
}

fn collect_doc_ids<'a>(items: &'a [SidebarItem], out: &mut Vec<&'a str>) {
    for item in items {
        match item {
            SidebarItem::Doc { id, .. } => out.push(id),
            SidebarItem::Category { items, .. } => collect_doc_ids(items, out),
            SidebarItem::Link { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_ordered_doc_ids() {
        let sidebars = Sidebars::from_toml_str(
            r#"tutorialSidebar = ["intro", "setup-commands", "command-index"]"#,
        )
        .unwrap();

        assert_eq!(
            sidebars.doc_ids("tutorialSidebar"),
            vec!["intro", "setup-commands", "command-index"]
        );
        assert_eq!(sidebars.first_doc("tutorialSidebar"), Some("intro"));
        assert_eq!(sidebars.sidebar_ids().collect::<Vec<_>>(), vec!["tutorialSidebar"]);
    }

    #[test]
    fn parses_categories_and_links() {
        let sidebars = Sidebars::from_toml_str(
            r#"
guides = [
  "intro",
  { type = "category", label = "Jobs", items = ["jobs-commands", { type = "doc", id = "event-jobs", label = "Events" }] },
  { type = "link", label = "Discord", href = "https://discord.com" },
]
"#,
        )
        .unwrap();

        let items = sidebars.get("guides").unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[1],
            SidebarItem::Category {
                label: "Jobs".to_string(),
                items: vec![
                    SidebarItem::doc("jobs-commands"),
                    SidebarItem::Doc {
                        id: "event-jobs".to_string(),
                        label: Some("Events".to_string()),
                    },
                ],
                collapsed: true,
            }
        );
        assert_eq!(
            sidebars.doc_ids("guides"),
            vec!["intro", "jobs-commands", "event-jobs"]
        );
    }

    #[test]
    fn reports_duplicates_once() {
        let sidebars = Sidebars::new([(
            "s",
            vec![
                SidebarItem::doc("a"),
                SidebarItem::doc("b"),
                SidebarItem::doc("a"),
                SidebarItem::doc("a"),
            ],
        )]);

        assert_eq!(sidebars.duplicate_doc_ids("s"), vec!["a"]);
    }

    #[test]
    fn unknown_sidebar_is_empty() {
        let sidebars = Sidebars::default();
        assert!(sidebars.doc_ids("missing").is_empty());
        assert_eq!(sidebars.first_doc("missing"), None);
    }

    #[test]
    fn finds_sidebar_of_doc() {
        let sidebars = Sidebars::new([
            ("one", vec![SidebarItem::doc("a")]),
            ("two", vec![SidebarItem::doc("b")]),
        ]);

        assert_eq!(sidebars.sidebar_of("b"), Some("two"));
        assert_eq!(sidebars.sidebar_of("c"), None);
    }

    #[test]
    fn order_is_stable_across_parses() {
        let source = r#"s = ["c", "a", "b"]"#;
        let first = Sidebars::from_toml_str(source).unwrap();
        let second = Sidebars::from_toml_str(source).unwrap();

        assert_eq!(first.doc_ids("s"), second.doc_ids("s"));
        assert_eq!(first.doc_ids("s"), vec!["c", "a", "b"]);
    }
}

//! Sidebar navigation trees and previous/next pagination.

use std::collections::BTreeMap;

use orgdocs_config::SidebarItem;
use serde::Serialize;

/// What the builder knows about a doc when building navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct DocRef {
    pub title: String,
    pub sidebar_label: Option<String>,
    pub route: String,
}

impl DocRef {
    /// Label shown in the sidebar.
    pub fn label(&self) -> &str {
        self.sidebar_label.as_deref().unwrap_or(&self.title)
    }
}

/// Docs keyed by id.
pub type DocMap = BTreeMap<String, DocRef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavKind {
    Doc,
    Category,
    Link,
}

/// A navigation item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    /// Display title
    pub title: String,
    /// URL path (empty for categories)
    pub path: String,
    pub kind: NavKind,
    /// Child items
    pub children: Vec<NavItem>,
    /// Whether this is the active page, or a category containing it
    pub active: bool,
    /// Categories render closed unless they contain the active page
    pub collapsed: bool,
}

/// A previous/next link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLink {
    pub title: String,
    pub path: String,
}

/// Build the navigation tree of a sidebar, preserving configured order.
///
/// Ids missing from `docs` are skipped; the builder reports them before
/// navigation is built.
pub fn build_sidebar(items: &[SidebarItem], docs: &DocMap, active_id: Option<&str>) -> Vec<NavItem> {
    items
        .iter()
        .filter_map(|item| build_item(item, docs, active_id))
        .collect()
}

fn build_item(item: &SidebarItem, docs: &DocMap, active_id: Option<&str>) -> Option<NavItem> {
    match item {
        SidebarItem::Doc { id, label } => {
            let doc = docs.get(id)?;
            Some(NavItem {
                title: label.clone().unwrap_or_else(|| doc.label().to_string()),
                path: doc.route.clone(),
                kind: NavKind::Doc,
                children: Vec::new(),
                active: active_id == Some(id.as_str()),
                collapsed: false,
            })
        }
        SidebarItem::Category {
            label,
            items,
            collapsed,
        } => {
            let children = build_sidebar(items, docs, active_id);
            let active = children.iter().any(|c| c.active);
            Some(NavItem {
                title: label.clone(),
                path: String::new(),
                kind: NavKind::Category,
                children,
                active,
                collapsed: *collapsed && !active,
            })
        }
        SidebarItem::Link { label, href } => Some(NavItem {
            title: label.clone(),
            path: href.clone(),
            kind: NavKind::Link,
            children: Vec::new(),
            active: false,
            collapsed: false,
        }),
    }
}

/// Previous and next docs around `active_id` in sidebar order.
pub fn pagination(
    doc_ids: &[&str],
    docs: &DocMap,
    active_id: &str,
) -> (Option<PageLink>, Option<PageLink>) {
    let ordered: Vec<(&str, &DocRef)> = doc_ids
        .iter()
        .filter_map(|id| docs.get(*id).map(|d| (*id, d)))
        .collect();

    let Some(pos) = ordered.iter().position(|(id, _)| *id == active_id) else {
        return (None, None);
    };

    let link = |(_, doc): &(&str, &DocRef)| PageLink {
        title: doc.label().to_string(),
        path: doc.route.clone(),
    };

    let prev = pos.checked_sub(1).and_then(|i| ordered.get(i)).map(link);
    let next = ordered.get(pos + 1).map(link);
    (prev, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn docs() -> DocMap {
        let mut docs = DocMap::new();
        for (id, title, route) in [
            ("intro", "Quick Start", "/manual/"),
            ("setup-commands", "Setup Commands", "/manual/setup-commands"),
            ("command-index", "Command Index", "/manual/command-index"),
        ] {
            docs.insert(
                id.to_string(),
                DocRef {
                    title: title.to_string(),
                    sidebar_label: None,
                    route: route.to_string(),
                },
            );
        }
        docs
    }

    #[test]
    fn renders_entries_in_sidebar_order() {
        let items = vec![
            SidebarItem::doc("intro"),
            SidebarItem::doc("setup-commands"),
            SidebarItem::doc("command-index"),
        ];

        let nav = build_sidebar(&items, &docs(), Some("setup-commands"));

        let titles: Vec<_> = nav.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Quick Start", "Setup Commands", "Command Index"]);
        let paths: Vec<_> = nav.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/manual/", "/manual/setup-commands", "/manual/command-index"]
        );
        assert!(nav[1].active);
        assert!(!nav[0].active);
    }

    #[test]
    fn reversed_sidebar_reverses_navigation() {
        let items = vec![SidebarItem::doc("command-index"), SidebarItem::doc("intro")];

        let nav = build_sidebar(&items, &docs(), None);

        assert_eq!(nav[0].title, "Command Index");
        assert_eq!(nav[1].title, "Quick Start");
    }

    #[test]
    fn sidebar_labels_override_titles() {
        let mut docs = docs();
        docs.get_mut("intro").unwrap().sidebar_label = Some("Intro".to_string());
        let items = vec![
            SidebarItem::doc("intro"),
            SidebarItem::Doc {
                id: "command-index".to_string(),
                label: Some("All commands".to_string()),
            },
        ];

        let nav = build_sidebar(&items, &docs, None);

        assert_eq!(nav[0].title, "Intro");
        assert_eq!(nav[1].title, "All commands");
    }

    #[test]
    fn categories_expand_around_active_doc() {
        let items = vec![
            SidebarItem::doc("intro"),
            SidebarItem::Category {
                label: "Commands".to_string(),
                items: vec![
                    SidebarItem::doc("setup-commands"),
                    SidebarItem::doc("command-index"),
                ],
                collapsed: true,
            },
            SidebarItem::Link {
                label: "Discord".to_string(),
                href: "https://discord.com".to_string(),
            },
        ];

        let closed = build_sidebar(&items, &docs(), Some("intro"));
        assert_eq!(closed[1].kind, NavKind::Category);
        assert!(closed[1].collapsed);
        assert_eq!(closed[2].kind, NavKind::Link);

        let open = build_sidebar(&items, &docs(), Some("command-index"));
        assert!(open[1].active);
        assert!(!open[1].collapsed);
        assert!(open[1].children[1].active);
    }

    #[test]
    fn paginates_along_sidebar() {
        let ids = ["intro", "setup-commands", "command-index"];
        let docs = docs();

        let (prev, next) = pagination(&ids, &docs, "intro");
        assert_eq!(prev, None);
        assert_eq!(next.unwrap().title, "Setup Commands");

        let (prev, next) = pagination(&ids, &docs, "command-index");
        assert_eq!(prev.unwrap().path, "/manual/setup-commands");
        assert_eq!(next, None);

        assert_eq!(pagination(&ids, &docs, "unknown"), (None, None));
    }
}

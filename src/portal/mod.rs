use std::path::PathBuf;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::page::PageNode;
use crate::select::HEADER_CLASS;

const SNAPSHOT_FILE: &str = "portal_snapshot.json";

/// Structural path from the page root to the container whose
/// second-to-last child anchors the shortcut bar. The portal exposes no
/// stable ids, so the region is addressed positionally.
const ACTIONS_REGION_PATH: &[usize] = &[0, 1];

/// Serialized menu structure scraped from the live portal by the
/// fetching collaborator. The companion only consumes this contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSnapshot {
    pub cards: Vec<CardSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub label: String,
    /// Absent for expanded section headers; those get a synthetic
    /// group identity when pinned.
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub links: Vec<LinkSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSnapshot {
    pub name: String,
    pub href: String,
}

/// The materialized page: an abstract element tree shaped like the
/// portal's menu page.
pub struct PortalPage {
    root: Rc<PageNode>,
}

impl PortalPage {
    pub fn from_snapshot(snapshot: &PortalSnapshot) -> Self {
        let mut cards_region = PageNode::new("div").class("menu-cards");
        for card in &snapshot.cards {
            cards_region = cards_region.child(build_card(card));
        }

        let actions_region = PageNode::new("div")
            .class("actions")
            .child(PageNode::new("div").class("notices"))
            .child(PageNode::new("div").class("shortcut-slot"))
            .child(PageNode::new("div").class("footer"));

        let root = PageNode::new("body").child(
            PageNode::new("form")
                .child(cards_region)
                .child(actions_region),
        );

        Self { root }
    }

    pub fn root(&self) -> &Rc<PageNode> {
        &self.root
    }

    pub fn headers(&self) -> Vec<Rc<PageNode>> {
        self.root
            .descendants_where(&|node| node.has_class(HEADER_CLASS))
    }

    pub fn cards(&self) -> Vec<Rc<PageNode>> {
        self.root.descendants_where(&|node| node.has_class("card"))
    }

    /// Anchor for the in-page shortcut bar: the second-to-last child of
    /// the structurally-located actions region. A missing anchor is
    /// logged and the bar mount silently no-ops.
    pub fn bar_anchor(&self) -> Option<Rc<PageNode>> {
        let region = self.root.child_at_path(ACTIONS_REGION_PATH)?;
        let children = region.children();
        if children.len() < 2 {
            tracing::warn!(
                children = children.len(),
                "actions region too small; shortcut bar anchor missing"
            );
            return None;
        }
        Some(children[children.len() - 2].clone())
    }
}

fn build_card(card: &CardSnapshot) -> Rc<PageNode> {
    let label_column = PageNode::new("div")
        .class("col-9")
        .child(PageNode::new("span").text(&card.label));

    let header = match &card.href {
        Some(href) => PageNode::new("a")
            .class(HEADER_CLASS)
            .attr("href", href)
            .child(label_column),
        None => PageNode::new("div").class(HEADER_CLASS).child(label_column),
    };

    let mut node = PageNode::new("div").class("card").child(header);
    if !card.links.is_empty() {
        let mut list = PageNode::new("ul").class("list-group");
        for link in &card.links {
            list = list.child(
                PageNode::new("li").class("list-group-item").child(
                    PageNode::new("a").attr("href", &link.href).text(&link.name),
                ),
            );
        }
        node = node.child(list);
    }
    node
}

fn snapshot_path() -> Option<PathBuf> {
    let mut path = config::app_data_dir().ok()?;
    path.push(SNAPSHOT_FILE);
    Some(path)
}

/// Loads the scraped snapshot from the data directory, falling back to
/// the built-in sample on first run or parse failure.
pub fn load_snapshot() -> PortalSnapshot {
    let Some(path) = snapshot_path() else {
        return sample_snapshot();
    };
    if !path.exists() {
        tracing::info!(?path, "no portal snapshot; using built-in sample");
        return sample_snapshot();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse portal snapshot; using sample");
            sample_snapshot()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read portal snapshot; using sample");
            sample_snapshot()
        }
    }
}

pub fn sample_snapshot() -> PortalSnapshot {
    PortalSnapshot {
        cards: vec![
            CardSnapshot {
                label: "成績查詢".to_string(),
                href: Some("https://admin.tcu.edu.tw/TCUstweb/ScoreQry.php".to_string()),
                links: Vec::new(),
            },
            CardSnapshot {
                label: "電子錢包選單".to_string(),
                href: None,
                links: vec![
                    LinkSnapshot {
                        name: "錢包儲值".to_string(),
                        href: "https://admin.tcu.edu.tw/TCUstweb/acc/TopUp.php".to_string(),
                    },
                    LinkSnapshot {
                        name: "交易明細".to_string(),
                        href: "https://admin.tcu.edu.tw/TCUstweb/acc/stMscQry.php".to_string(),
                    },
                ],
            },
            CardSnapshot {
                label: "選課選單".to_string(),
                href: Some("https://admin.tcu.edu.tw/TCUstweb/Stmain.php?menu=course".to_string()),
                links: vec![LinkSnapshot {
                    name: "加退選".to_string(),
                    href: "https://admin.tcu.edu.tw/TCUstweb/course/AddDrop.php".to_string(),
                }],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::{classify_header, resolve_group_links};

    #[test]
    fn sample_page_exposes_one_header_per_card() {
        let page = PortalPage::from_snapshot(&sample_snapshot());
        assert_eq!(page.headers().len(), 3);
        assert_eq!(page.cards().len(), 3);
    }

    #[test]
    fn bar_anchor_is_second_to_last_actions_child() {
        let page = PortalPage::from_snapshot(&sample_snapshot());
        let anchor = page.bar_anchor().expect("anchor should resolve");
        assert!(anchor.has_class("shortcut-slot"));
    }

    #[test]
    fn expanded_card_headers_resolve_group_links_from_sibling_list() {
        let page = PortalPage::from_snapshot(&sample_snapshot());
        let headers = page.headers();
        let wallet = &headers[1];
        assert!(wallet.attr_value("href").is_none());

        let items = resolve_group_links(wallet);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "錢包儲值");
    }

    #[test]
    fn menu_toggle_card_classifies_as_group_with_real_href() {
        let page = PortalPage::from_snapshot(&sample_snapshot());
        let headers = page.headers();
        let pin = classify_header(&headers[2], "Stmain.php").unwrap();
        assert!(pin.href.contains("Stmain.php"));
        assert_eq!(pin.items.len(), 1);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = sample_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: PortalSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.cards.len(), snapshot.cards.len());
        assert_eq!(parsed.cards[1].links.len(), 2);
    }
}

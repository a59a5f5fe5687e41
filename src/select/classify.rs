use std::rc::Rc;

use crate::page::{is_list, PageNode};
use crate::pins::{GroupItem, Pin};

pub const HEADER_CLASS: &str = "card-header";
const CARD_CLASS: &str = "card";
const COLLAPSE_CLASS: &str = "collapse";
const LABEL_COLUMN_CLASS: &str = "col-9";
const FALLBACK_NAME: &str = "Unknown Function";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyRejection {
    /// A group candidate with no reachable submenu links. Covers the
    /// collapsed menu-toggle link too; that element is never pinnable
    /// on its own.
    NoSubmenu { name: String },
}

/// Display label for a header: the `col-9` column's span, the column
/// itself, or a fixed fallback.
pub fn header_label(header: &Rc<PageNode>) -> String {
    let column = header.find_descendant(&|node| node.has_class(LABEL_COLUMN_CLASS));
    let Some(column) = column else {
        return FALLBACK_NAME.to_string();
    };
    let label_node = column
        .find_descendant(&|node| node.tag() == "span")
        .unwrap_or(column);
    label_node.text_content().trim().to_string()
}

/// Pure submenu lookup behind group pins. Strategies, in order: an
/// immediate sibling list, a sibling collapsible wrapper containing a
/// list, the nearest ancestor card's list. The first strategy that
/// selects a container wins even when it holds no links.
pub fn resolve_group_links(header: &Rc<PageNode>) -> Vec<GroupItem> {
    let sibling = header.next_sibling();

    let submenu = match sibling {
        Some(sibling) if is_list(&sibling) => Some(sibling),
        Some(sibling) if sibling.has_class(COLLAPSE_CLASS) => {
            sibling.find_descendant(&|node| is_list(node))
        }
        _ => header
            .closest(|node| node.has_class(CARD_CLASS))
            .and_then(|card| card.find_descendant(&|node| is_list(node))),
    };

    let Some(submenu) = submenu else {
        return Vec::new();
    };

    submenu
        .descendants_where(&|node| node.tag() == "a")
        .into_iter()
        .filter_map(|anchor| {
            let href = anchor.attr_value("href")?;
            Some(GroupItem {
                name: anchor.text_content().trim().to_string(),
                href,
            })
        })
        .collect()
}

/// Classifies a clicked header into a pin, or a rejection when the
/// element is a group candidate without submenu links.
pub fn classify_header(
    header: &Rc<PageNode>,
    menu_page_marker: &str,
) -> Result<Pin, ClassifyRejection> {
    let name = header_label(header);
    let href = header.attr_value("href");

    let (is_group, href) = match href {
        None => (true, Pin::synthetic_group_href(&name)),
        Some(href) if href.contains(menu_page_marker) => (true, href),
        Some(href) => (false, href),
    };

    if !is_group {
        return Ok(Pin::link(name, href));
    }

    let items = resolve_group_links(header);
    if items.is_empty() {
        return Err(ClassifyRejection::NoSubmenu { name });
    }
    Ok(Pin::group(name, href, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::PinKind;

    const MARKER: &str = "Stmain.php";

    fn labeled_header(tag: &str, label: &str) -> Rc<PageNode> {
        PageNode::new(tag).class(HEADER_CLASS).child(
            PageNode::new("div")
                .class(LABEL_COLUMN_CLASS)
                .child(PageNode::new("span").text(label)),
        )
    }

    fn list_with(links: &[(&str, &str)]) -> Rc<PageNode> {
        let mut list = PageNode::new("ul").class("list-group");
        for (name, href) in links {
            list = list.child(
                PageNode::new("li")
                    .child(PageNode::new("a").attr("href", href).text(name)),
            );
        }
        list
    }

    #[test]
    fn header_label_prefers_span_then_column_then_fallback() {
        let with_span = labeled_header("a", "電子錢包選單");
        assert_eq!(header_label(&with_span), "電子錢包選單");

        let column_only = PageNode::new("div")
            .class(HEADER_CLASS)
            .child(PageNode::new("div").class(LABEL_COLUMN_CLASS).text(" 選單 "));
        assert_eq!(header_label(&column_only), "選單");

        let bare = PageNode::new("div").class(HEADER_CLASS);
        assert_eq!(header_label(&bare), FALLBACK_NAME);
    }

    #[test]
    fn plain_href_classifies_as_link_pin() {
        let header =
            labeled_header("a", "Transcript").attr("href", "https://example.test/transcript");
        let _card = PageNode::new("div").class("card").child(header.clone());

        let pin = classify_header(&header, MARKER).unwrap();
        assert_eq!(pin.kind, PinKind::Link);
        assert_eq!(pin.name, "Transcript");
        assert_eq!(pin.href, "https://example.test/transcript");
        assert!(pin.items.is_empty());
    }

    #[test]
    fn headerless_div_gets_synthetic_group_href() {
        let header = labeled_header("div", "Wallet");
        let _card = PageNode::new("div")
            .class("card")
            .child(header.clone())
            .child(list_with(&[("Top up", "u1")]));

        let pin = classify_header(&header, MARKER).unwrap();
        assert_eq!(pin.kind, PinKind::Group);
        assert_eq!(pin.href, "group:Wallet");
        assert_eq!(pin.items, vec![GroupItem {
            name: "Top up".to_string(),
            href: "u1".to_string(),
        }]);
    }

    #[test]
    fn menu_toggle_href_classifies_as_group() {
        let header = labeled_header("a", "Wallet").attr("href", "https://x/Stmain.php?m=3");
        let _card = PageNode::new("div")
            .class("card")
            .child(header.clone())
            .child(list_with(&[("Top up", "u1"), ("History", "u2")]));

        let pin = classify_header(&header, MARKER).unwrap();
        assert_eq!(pin.kind, PinKind::Group);
        assert_eq!(pin.href, "https://x/Stmain.php?m=3");
        assert_eq!(pin.items.len(), 2);
    }

    #[test]
    fn group_without_any_submenu_is_rejected() {
        let header = labeled_header("a", "Wallet").attr("href", "https://x/Stmain.php");
        let _card = PageNode::new("div").class("card").child(header.clone());

        let rejection = classify_header(&header, MARKER).unwrap_err();
        assert_eq!(
            rejection,
            ClassifyRejection::NoSubmenu {
                name: "Wallet".to_string()
            }
        );
    }

    #[test]
    fn sibling_list_beats_ancestor_card_list() {
        let header = labeled_header("div", "Wallet");
        let _card = PageNode::new("div")
            .class("card")
            .child(PageNode::new("div").child(list_with(&[("Decoy", "d1")])))
            .child(header.clone())
            .child(list_with(&[("Sibling", "s1")]));

        let items = resolve_group_links(&header);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Sibling");
    }

    #[test]
    fn collapse_wrapper_is_second_strategy() {
        let header = labeled_header("a", "Wallet");
        let _card = PageNode::new("div")
            .class("card")
            .child(header.clone())
            .child(
                PageNode::new("div")
                    .class("collapse")
                    .child(list_with(&[("Wrapped", "w1")])),
            );

        let items = resolve_group_links(&header);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Wrapped");
    }

    #[test]
    fn ancestor_card_list_is_last_resort() {
        let header = labeled_header("div", "Wallet");
        let _card = PageNode::new("div")
            .class("card")
            .child(PageNode::new("div").class("card-body").child(header.clone()))
            .child(list_with(&[("Card level", "c1")]));

        let items = resolve_group_links(&header);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Card level");
    }

    #[test]
    fn empty_collapse_wrapper_does_not_fall_through_to_card() {
        // The wrapper is selected by strategy order even though it holds
        // nothing, so the lookup fails rather than scanning the card.
        let header = labeled_header("a", "Wallet");
        let _card = PageNode::new("div")
            .class("card")
            .child(header.clone())
            .child(PageNode::new("div").class("collapse"))
            .child(list_with(&[("Card level", "c1")]));

        assert!(resolve_group_links(&header).is_empty());
    }
}

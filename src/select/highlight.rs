use std::collections::HashMap;
use std::rc::Rc;

use crate::page::PageNode;

const OUTLINE_STYLE: &str = "3px solid red";
const HOVER_TRANSFORM: &str = "scale(1.02)";

/// Hover-highlight bookkeeping. The prior inline transform is captured
/// once per node before the first mutation, so repeated enters never
/// clobber the original value.
#[derive(Debug, Default)]
pub struct HighlightLedger {
    saved_transforms: HashMap<u64, Option<String>>,
}

impl HighlightLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlight(&mut self, node: &Rc<PageNode>) {
        self.saved_transforms
            .entry(node.id())
            .or_insert_with(|| node.style_value("transform"));
        node.set_style("outline", OUTLINE_STYLE);
        node.set_style("transform", HOVER_TRANSFORM);
    }

    pub fn restore(&mut self, node: &Rc<PageNode>) {
        node.clear_style("outline");
        match self.saved_transforms.remove(&node.id()).flatten() {
            Some(original) => node.set_style("transform", &original),
            None => node.clear_style("transform"),
        }
    }

    /// Exit action of Selecting: restores every header on the page, not
    /// just the last-hovered one.
    pub fn sweep(&mut self, headers: &[Rc<PageNode>]) {
        for header in headers {
            header.clear_style("outline");
            match self.saved_transforms.remove(&header.id()).flatten() {
                Some(original) => header.set_style("transform", &original),
                None => header.clear_style("transform"),
            }
        }
        self.saved_transforms.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.saved_transforms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Rc<PageNode> {
        PageNode::new("a").class("card-header")
    }

    #[test]
    fn highlight_and_restore_round_trip_preserves_original_transform() {
        let mut ledger = HighlightLedger::new();
        let node = header();
        node.set_style("transform", "translateY(2px)");

        ledger.highlight(&node);
        assert_eq!(node.style_value("outline").as_deref(), Some(OUTLINE_STYLE));
        assert_eq!(
            node.style_value("transform").as_deref(),
            Some(HOVER_TRANSFORM)
        );

        ledger.restore(&node);
        assert!(node.style_value("outline").is_none());
        assert_eq!(
            node.style_value("transform").as_deref(),
            Some("translateY(2px)")
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn repeated_highlight_keeps_first_captured_transform() {
        let mut ledger = HighlightLedger::new();
        let node = header();
        node.set_style("transform", "translateY(2px)");

        ledger.highlight(&node);
        ledger.highlight(&node);
        ledger.restore(&node);

        assert_eq!(
            node.style_value("transform").as_deref(),
            Some("translateY(2px)")
        );
    }

    #[test]
    fn sweep_clears_every_header_even_without_ledger_entries() {
        let mut ledger = HighlightLedger::new();
        let hovered = header();
        let stray = header();
        stray.set_style("outline", OUTLINE_STYLE);
        stray.set_style("transform", HOVER_TRANSFORM);

        ledger.highlight(&hovered);
        ledger.sweep(&[hovered.clone(), stray.clone()]);

        for node in [hovered, stray] {
            assert!(node.style_value("outline").is_none());
            assert!(node.style_value("transform").is_none());
        }
        assert!(ledger.is_empty());
    }
}

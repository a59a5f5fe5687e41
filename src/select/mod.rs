pub mod classify;
pub mod error;
pub mod highlight;
pub mod machine;

use std::rc::Rc;

use crate::page::PageNode;
use crate::pins::Pin;

pub use classify::{classify_header, header_label, resolve_group_links, ClassifyRejection};
pub use classify::HEADER_CLASS;
pub use error::{StateError, StateResult};
pub use highlight::HighlightLedger;
pub use machine::{SelectionEvent, SelectionMachine, SelectionState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not in Selecting state; the click belongs to the page.
    NotSelecting,
    /// In Selecting state but the click missed every pinnable header.
    NotAHeader,
    /// A pin candidate; the engine stays in Selecting for continuous
    /// multi-pin selection.
    Candidate(Pin),
    Rejected(ClassifyRejection),
}

/// Page-scraping picker: the selection machine plus hover bookkeeping
/// and click classification, independent of any UI toolkit.
pub struct SelectionEngine {
    machine: SelectionMachine,
    ledger: HighlightLedger,
    menu_page_marker: String,
}

impl SelectionEngine {
    pub fn new(menu_page_marker: impl Into<String>) -> Self {
        Self {
            machine: SelectionMachine::new(),
            ledger: HighlightLedger::new(),
            menu_page_marker: menu_page_marker.into(),
        }
    }

    pub fn state(&self) -> SelectionState {
        self.machine.state()
    }

    pub fn is_selecting(&self) -> bool {
        self.machine.is_selecting()
    }

    /// Toggle between Idle and Selecting. Leaving Selecting sweeps
    /// residual highlight styling from every header on the page.
    pub fn toggle(&mut self, headers: &[Rc<PageNode>]) -> StateResult<SelectionState> {
        let state = self.machine.transition(SelectionEvent::Toggle)?;
        if state == SelectionState::Idle {
            self.ledger.sweep(headers);
        }
        Ok(state)
    }

    /// Cancellation key. Invalid while Idle.
    pub fn cancel(&mut self, headers: &[Rc<PageNode>]) -> StateResult<SelectionState> {
        let state = self.machine.transition(SelectionEvent::Cancel)?;
        self.ledger.sweep(headers);
        Ok(state)
    }

    pub fn hover_enter(&mut self, node: &Rc<PageNode>) {
        if !self.is_selecting() {
            return;
        }
        if let Some(header) = node.closest(|n| n.has_class(HEADER_CLASS)) {
            self.ledger.highlight(&header);
        }
    }

    pub fn hover_leave(&mut self, node: &Rc<PageNode>) {
        if !self.is_selecting() {
            return;
        }
        if let Some(header) = node.closest(|n| n.has_class(HEADER_CLASS)) {
            self.ledger.restore(&header);
        }
    }

    pub fn click(&mut self, node: &Rc<PageNode>) -> ClickOutcome {
        if !self.is_selecting() {
            return ClickOutcome::NotSelecting;
        }
        let Some(header) = node.closest(|n| n.has_class(HEADER_CLASS)) else {
            return ClickOutcome::NotAHeader;
        };
        match classify_header(&header, &self.menu_page_marker) {
            Ok(pin) => ClickOutcome::Candidate(pin),
            Err(rejection) => ClickOutcome::Rejected(rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::PinKind;

    fn page() -> (Rc<PageNode>, Vec<Rc<PageNode>>) {
        let header_a = PageNode::new("a")
            .class(HEADER_CLASS)
            .attr("href", "https://example.test/a")
            .child(
                PageNode::new("div")
                    .class("col-9")
                    .child(PageNode::new("span").text("A")),
            );
        let header_b = PageNode::new("div").class(HEADER_CLASS).child(
            PageNode::new("div")
                .class("col-9")
                .child(PageNode::new("span").text("B")),
        );
        let root = PageNode::new("body")
            .child(PageNode::new("div").class("card").child(header_a.clone()))
            .child(
                PageNode::new("div")
                    .class("card")
                    .child(header_b.clone())
                    .child(PageNode::new("ul").child(
                        PageNode::new("li").child(
                            PageNode::new("a").attr("href", "u1").text("Sub"),
                        ),
                    )),
            );
        (root, vec![header_a, header_b])
    }

    #[test]
    fn click_while_idle_belongs_to_the_page() {
        let (_root, headers) = page();
        let mut engine = SelectionEngine::new("Stmain.php");
        assert_eq!(engine.click(&headers[0]), ClickOutcome::NotSelecting);
    }

    #[test]
    fn continuous_selection_stays_active_after_candidates() {
        let (_root, headers) = page();
        let mut engine = SelectionEngine::new("Stmain.php");
        engine.toggle(&headers).unwrap();

        let outcome = engine.click(&headers[0]);
        let ClickOutcome::Candidate(pin) = outcome else {
            panic!("expected candidate, got {outcome:?}");
        };
        assert_eq!(pin.kind, PinKind::Link);
        assert!(engine.is_selecting());

        let outcome = engine.click(&headers[1]);
        let ClickOutcome::Candidate(pin) = outcome else {
            panic!("expected candidate, got {outcome:?}");
        };
        assert_eq!(pin.kind, PinKind::Group);
        assert!(engine.is_selecting());
    }

    #[test]
    fn click_resolves_through_descendants_of_the_header() {
        let (_root, headers) = page();
        let label_span = headers[0]
            .find_descendant(&|node| node.tag() == "span")
            .unwrap();

        let mut engine = SelectionEngine::new("Stmain.php");
        engine.toggle(&headers).unwrap();
        assert!(matches!(
            engine.click(&label_span),
            ClickOutcome::Candidate(_)
        ));
    }

    #[test]
    fn exiting_selection_clears_all_hover_residue() {
        let (_root, headers) = page();
        let mut engine = SelectionEngine::new("Stmain.php");
        engine.toggle(&headers).unwrap();

        engine.hover_enter(&headers[0]);
        engine.hover_enter(&headers[1]);
        engine.toggle(&headers).unwrap();

        for header in &headers {
            assert!(header.style_value("outline").is_none());
            assert!(header.style_value("transform").is_none());
        }
        assert!(!engine.is_selecting());
    }

    #[test]
    fn cancel_sweeps_and_returns_to_idle() {
        let (_root, headers) = page();
        let mut engine = SelectionEngine::new("Stmain.php");
        engine.toggle(&headers).unwrap();
        engine.hover_enter(&headers[1]);

        let state = engine.cancel(&headers).unwrap();
        assert_eq!(state, SelectionState::Idle);
        assert!(headers[1].style_value("outline").is_none());
    }

    #[test]
    fn hover_is_ignored_while_idle() {
        let (_root, headers) = page();
        let mut engine = SelectionEngine::new("Stmain.php");
        engine.hover_enter(&headers[0]);
        assert!(headers[0].style_value("outline").is_none());
    }
}

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Abstract page element: the slice of the portal DOM the pinning
/// subsystem reasons about. The collaborator that scrapes the live page
/// materializes this tree; tests build it directly.
#[derive(Debug)]
pub struct PageNode {
    id: u64,
    tag: String,
    classes: RefCell<Vec<String>>,
    attrs: RefCell<BTreeMap<String, String>>,
    style: RefCell<BTreeMap<String, String>>,
    text: RefCell<String>,
    children: RefCell<Vec<Rc<PageNode>>>,
    parent: RefCell<Weak<PageNode>>,
}

impl PageNode {
    pub fn new(tag: &str) -> Rc<Self> {
        Rc::new(Self {
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            tag: tag.to_ascii_lowercase(),
            classes: RefCell::new(Vec::new()),
            attrs: RefCell::new(BTreeMap::new()),
            style: RefCell::new(BTreeMap::new()),
            text: RefCell::new(String::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
        })
    }

    pub fn class(self: Rc<Self>, name: &str) -> Rc<Self> {
        self.classes.borrow_mut().push(name.to_string());
        self
    }

    pub fn attr(self: Rc<Self>, name: &str, value: &str) -> Rc<Self> {
        self.attrs
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(self: Rc<Self>, content: &str) -> Rc<Self> {
        *self.text.borrow_mut() = content.to_string();
        self
    }

    pub fn child(self: Rc<Self>, child: Rc<PageNode>) -> Rc<Self> {
        *child.parent.borrow_mut() = Rc::downgrade(&self);
        self.children.borrow_mut().push(child);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.borrow().iter().any(|class| class == name)
    }

    pub fn attr_value(&self, name: &str) -> Option<String> {
        self.attrs.borrow().get(name).cloned()
    }

    pub fn style_value(&self, property: &str) -> Option<String> {
        self.style.borrow().get(property).cloned()
    }

    pub fn set_style(&self, property: &str, value: &str) {
        self.style
            .borrow_mut()
            .insert(property.to_string(), value.to_string());
    }

    pub fn clear_style(&self, property: &str) {
        self.style.borrow_mut().remove(property);
    }

    pub fn own_text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Concatenated text of this node and all descendants, in document
    /// order.
    pub fn text_content(&self) -> String {
        let mut out = self.own_text();
        for child in self.children.borrow().iter() {
            out.push_str(&child.text_content());
        }
        out
    }

    pub fn children(&self) -> Vec<Rc<PageNode>> {
        self.children.borrow().clone()
    }

    pub fn parent(&self) -> Option<Rc<PageNode>> {
        self.parent.borrow().upgrade()
    }

    pub fn next_sibling(&self) -> Option<Rc<PageNode>> {
        let parent = self.parent()?;
        let siblings = parent.children.borrow();
        let position = siblings.iter().position(|node| node.id == self.id)?;
        siblings.get(position + 1).cloned()
    }

    /// Nearest node, starting from `self`, whose predicate holds.
    pub fn closest(self: &Rc<Self>, predicate: impl Fn(&PageNode) -> bool) -> Option<Rc<Self>> {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if predicate(&node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// First descendant (preorder, excluding `self`) matching the
    /// predicate.
    pub fn find_descendant(
        self: &Rc<Self>,
        predicate: &impl Fn(&PageNode) -> bool,
    ) -> Option<Rc<Self>> {
        for child in self.children.borrow().iter() {
            if predicate(child) {
                return Some(child.clone());
            }
            if let Some(found) = child.find_descendant(predicate) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants (preorder, excluding `self`) matching the
    /// predicate.
    pub fn descendants_where(
        self: &Rc<Self>,
        predicate: &impl Fn(&PageNode) -> bool,
    ) -> Vec<Rc<Self>> {
        let mut out = Vec::new();
        self.collect_descendants(predicate, &mut out);
        out
    }

    fn collect_descendants(
        self: &Rc<Self>,
        predicate: &impl Fn(&PageNode) -> bool,
        out: &mut Vec<Rc<Self>>,
    ) {
        for child in self.children.borrow().iter() {
            if predicate(child) {
                out.push(child.clone());
            }
            child.collect_descendants(predicate, out);
        }
    }

    /// Positional lookup used for structurally-located anchors: the page
    /// exposes no stable ids, so collaborators address children by
    /// index path.
    pub fn child_at_path(self: &Rc<Self>, path: &[usize]) -> Option<Rc<Self>> {
        let mut current = self.clone();
        for &index in path {
            let next = current.children.borrow().get(index).cloned()?;
            current = next;
        }
        Some(current)
    }
}

pub fn is_list(node: &PageNode) -> bool {
    matches!(node.tag(), "ul" | "ol")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> Rc<PageNode> {
        PageNode::new("div")
            .class("card")
            .child(
                PageNode::new("a")
                    .class("card-header")
                    .attr("href", "https://example.test/fn1"),
            )
            .child(
                PageNode::new("ul").child(PageNode::new("li").child(
                    PageNode::new("a").attr("href", "https://example.test/sub").text("Sub"),
                )),
            )
    }

    #[test]
    fn next_sibling_walks_parent_children_in_order() {
        let card = small_tree();
        let header = card.children()[0].clone();
        let sibling = header.next_sibling().expect("header has a sibling");
        assert_eq!(sibling.tag(), "ul");
        assert!(sibling.next_sibling().is_none());
    }

    #[test]
    fn closest_includes_self_and_ancestors() {
        let card = small_tree();
        let header = card.children()[0].clone();
        assert!(header
            .closest(|node| node.has_class("card-header"))
            .is_some());
        let found = header.closest(|node| node.has_class("card")).unwrap();
        assert_eq!(found.id(), card.id());
        assert!(header.closest(|node| node.has_class("missing")).is_none());
    }

    #[test]
    fn descendants_and_text_content_cover_nested_nodes() {
        let card = small_tree();
        let anchors = card.descendants_where(&|node| node.tag() == "a");
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[1].text_content(), "Sub");
    }

    #[test]
    fn child_at_path_resolves_positional_anchors() {
        let root = PageNode::new("body").child(
            PageNode::new("form")
                .child(PageNode::new("div"))
                .child(PageNode::new("div").class("anchor")),
        );
        let anchor = root.child_at_path(&[0, 1]).unwrap();
        assert!(anchor.has_class("anchor"));
        assert!(root.child_at_path(&[0, 5]).is_none());
    }

    #[test]
    fn style_slots_set_and_clear() {
        let node = PageNode::new("div");
        assert!(node.style_value("transform").is_none());
        node.set_style("transform", "scale(1.02)");
        assert_eq!(
            node.style_value("transform").as_deref(),
            Some("scale(1.02)")
        );
        node.clear_style("transform");
        assert!(node.style_value("transform").is_none());
    }
}

//! In-process document tree.
//!
//! `Document` stands in for the browser DOM: an arena of nodes with roles,
//! parent/child links, per-node viewport rectangles, a single focused node,
//! a vertical page scroll offset and the document-level listener table.
//! Portal layers (nodes with [`Role::Layer`] directly under the root) are hit
//! tested before page content, which is how overlays stay above the page.

use std::collections::BTreeMap;

use crossterm::event::KeyEvent;
use thiserror::Error;

use crate::dismissal::{self, DismissRequest};
use crate::geometry::{Rect, Viewport};
use crate::listeners::ListenerRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Root,
    Layer,
    Region,
    Button,
    TextInput,
    Dialog,
    Menu,
    MenuItem,
    ListBox,
    Option,
    Generic,
}

impl Role {
    pub const fn accepts_text(self) -> bool {
        matches!(self, Role::TextInput)
    }

    const fn focusable_by_default(self) -> bool {
        matches!(
            self,
            Role::Button | Role::TextInput | Role::MenuItem | Role::Option
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {0:?} is not attached to the document")]
    Detached(NodeId),
    #[error("node {0:?} has no layout")]
    NoLayout(NodeId),
    #[error("node {0:?} cannot take focus")]
    NotFocusable(NodeId),
    #[error("appending {child:?} under {parent:?} would create a cycle")]
    CycleRejected { parent: NodeId, child: NodeId },
    #[error("the document root cannot be removed")]
    RootRemoval,
}

#[derive(Debug, Clone)]
struct Node {
    role: Role,
    label: String,
    marker: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Option<Rect>,
    focusable: bool,
}

impl Node {
    fn new(role: Role, label: String) -> Self {
        Self {
            role,
            label,
            marker: None,
            parent: None,
            children: Vec::new(),
            rect: None,
            focusable: role.focusable_by_default(),
        }
    }
}

/// Input delivered to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocEvent {
    PointerDown { x: i32, y: i32 },
    PointerMove { x: i32, y: i32 },
    KeyDown(KeyEvent),
    /// Scroll the page by `delta` rows (positive scrolls down).
    Scroll { delta: i32 },
}

/// Result of delivering one event: the resolved target and the dismissals
/// requested by attached listeners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatched {
    pub target: Option<NodeId>,
    pub dismissals: Vec<DismissRequest>,
}

#[derive(Debug)]
pub struct Document {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u32,
    root: NodeId,
    focused: Option<NodeId>,
    scroll_y: i32,
    max_scroll: i32,
    viewport: Viewport,
    listeners: ListenerRegistry,
}

impl Document {
    pub fn new(viewport: Viewport) -> Self {
        let root = NodeId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(root, Node::new(Role::Root, "body".to_string()));
        Self {
            nodes,
            next_id: 1,
            root,
            focused: None,
            scroll_y: 0,
            max_scroll: i32::MAX,
            viewport,
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Create a detached element.
    pub fn create_element(&mut self, role: Role, label: impl Into<String>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(role, label.into()));
        id
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_new(
        &mut self,
        parent: NodeId,
        role: Role,
        label: impl Into<String>,
        rect: Option<Rect>,
    ) -> Result<NodeId, DocumentError> {
        let id = self.create_element(role, label);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.rect = rect;
        }
        if let Err(err) = self.append_child(parent, id) {
            self.nodes.remove(&id);
            return Err(err);
        }
        Ok(id)
    }

    /// Create a marked layer directly under the root.
    pub(crate) fn create_layer(&mut self, marker: &str) -> NodeId {
        let id = self.create_element(Role::Layer, marker);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.marker = Some(marker.to_string());
            node.parent = Some(self.root);
        }
        if let Some(root) = self.nodes.get_mut(&self.root) {
            root.children.push(id);
        }
        id
    }

    /// Move `child` (and its subtree) under `parent`, after any existing
    /// children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        if !self.nodes.contains_key(&parent) {
            return Err(DocumentError::UnknownNode(parent));
        }
        if !self.nodes.contains_key(&child) {
            return Err(DocumentError::UnknownNode(child));
        }
        if self.contains(child, parent) {
            return Err(DocumentError::CycleRejected { parent, child });
        }
        self.unlink(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        Ok(())
    }

    fn unlink(&mut self, id: NodeId) {
        let parent = self.nodes.get_mut(&id).and_then(|node| node.parent.take());
        if let Some(parent) = parent
            && let Some(node) = self.nodes.get_mut(&parent)
        {
            node.children.retain(|c| *c != id);
        }
    }

    /// Remove `id` and its whole subtree from the document. Focus inside the
    /// removed subtree is dropped.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DocumentError> {
        if id == self.root {
            return Err(DocumentError::RootRemoval);
        }
        if !self.nodes.contains_key(&id) {
            return Err(DocumentError::UnknownNode(id));
        }
        if let Some(focused) = self.focused
            && self.contains(id, focused)
        {
            self.focused = None;
        }
        self.unlink(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    pub fn exists(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// True when the ancestor chain of `id` reaches the root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == self.root {
                return true;
            }
            current = self.nodes.get(&cur).and_then(|node| node.parent);
        }
        false
    }

    /// Inclusive descendant test.
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.nodes.get(&cur).and_then(|node| node.parent);
        }
        false
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn role(&self, id: NodeId) -> Option<Role> {
        self.nodes.get(&id).map(|node| node.role)
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|node| node.label.as_str())
    }

    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.label = label.into();
        }
    }

    /// First connected node carrying `marker`.
    pub fn find_by_marker(&self, marker: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.marker.as_deref() == Some(marker))
            .map(|(id, _)| *id)
            .find(|id| self.is_connected(*id))
    }

    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.rect = Some(rect);
        }
    }

    /// Viewport rectangle of a mounted node.
    pub fn bounding_rect(&self, id: NodeId) -> Result<Rect, DocumentError> {
        let node = self.nodes.get(&id).ok_or(DocumentError::UnknownNode(id))?;
        if !self.is_connected(id) {
            return Err(DocumentError::Detached(id));
        }
        node.rect.ok_or(DocumentError::NoLayout(id))
    }

    pub fn set_focusable(&mut self, id: NodeId, focusable: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.focusable = focusable;
        }
    }

    pub fn is_focusable(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.focusable)
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|id| self.is_connected(*id))
    }

    pub fn focus(&mut self, id: NodeId) -> Result<(), DocumentError> {
        let node = self.nodes.get(&id).ok_or(DocumentError::UnknownNode(id))?;
        if !node.focusable {
            return Err(DocumentError::NotFocusable(id));
        }
        if !self.is_connected(id) {
            return Err(DocumentError::Detached(id));
        }
        self.focused = Some(id);
        Ok(())
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn focus_in_text_input(&self) -> bool {
        self.focused()
            .and_then(|id| self.role(id))
            .is_some_and(Role::accepts_text)
    }

    /// Preorder search below `id`, excluding `id` itself.
    pub fn first_focusable_descendant(&self, id: NodeId) -> Option<NodeId> {
        let node = self.nodes.get(&id)?;
        for child in &node.children {
            if self.nodes.get(child).is_some_and(|n| n.focusable) {
                return Some(*child);
            }
            if let Some(found) = self.first_focusable_descendant(*child) {
                return Some(found);
            }
        }
        None
    }

    pub fn scroll_y(&self) -> i32 {
        self.scroll_y
    }

    pub fn set_scroll_extent(&mut self, max_scroll: i32) {
        self.max_scroll = max_scroll.max(0);
        self.scroll_y = self.scroll_y.min(self.max_scroll);
    }

    /// Scroll by `delta`, clamped to `[0, extent]`. Returns the new offset.
    pub fn scroll_by(&mut self, delta: i32) -> i32 {
        self.scroll_y = self.scroll_y.saturating_add(delta).clamp(0, self.max_scroll);
        self.scroll_y
    }

    /// Topmost node under the point. Portal layers win over page content and
    /// later siblings win over earlier ones.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<NodeId> {
        let root = self.nodes.get(&self.root)?;
        let (layers, page): (Vec<NodeId>, Vec<NodeId>) = root
            .children
            .iter()
            .partition(|id| self.role(**id) == Some(Role::Layer));
        layers
            .iter()
            .rev()
            .chain(page.iter().rev())
            .find_map(|id| self.hit_node(*id, x, y))
    }

    fn hit_node(&self, id: NodeId, x: i32, y: i32) -> Option<NodeId> {
        let node = self.nodes.get(&id)?;
        if let Some(hit) = node
            .children
            .iter()
            .rev()
            .find_map(|child| self.hit_node(*child, x, y))
        {
            return Some(hit);
        }
        node.rect.filter(|r| r.contains(x, y)).map(|_| id)
    }

    /// Resolve the event target, apply page scroll, and collect the
    /// dismissals requested by attached listeners.
    pub fn dispatch(&mut self, event: &DocEvent) -> Dispatched {
        let target = match *event {
            DocEvent::PointerDown { x, y } | DocEvent::PointerMove { x, y } => {
                self.hit_test(x, y)
            }
            DocEvent::KeyDown(_) => self.focused(),
            DocEvent::Scroll { delta } => {
                self.scroll_by(delta);
                None
            }
        };
        let dismissals = dismissal::evaluate(self, event, target);
        Dispatched { target, dismissals }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(Viewport::new(80, 24))
    }

    #[test]
    fn append_and_remove_subtree() {
        let mut d = doc();
        let root = d.root();
        let menu = d.append_new(root, Role::Menu, "menu", None).unwrap();
        let item = d.append_new(menu, Role::MenuItem, "a", None).unwrap();
        assert!(d.is_connected(item));
        assert!(d.contains(menu, item));
        d.remove(menu).unwrap();
        assert!(!d.exists(item));
        assert!(d.children(root).is_empty());
    }

    #[test]
    fn append_rejects_cycles() {
        let mut d = doc();
        let root = d.root();
        let a = d.append_new(root, Role::Region, "a", None).unwrap();
        let b = d.append_new(a, Role::Region, "b", None).unwrap();
        assert_eq!(
            d.append_child(b, a),
            Err(DocumentError::CycleRejected {
                parent: b,
                child: a
            })
        );
    }

    #[test]
    fn removing_focused_subtree_drops_focus() {
        let mut d = doc();
        let root = d.root();
        let menu = d.append_new(root, Role::Menu, "menu", None).unwrap();
        let item = d.append_new(menu, Role::MenuItem, "a", None).unwrap();
        d.focus(item).unwrap();
        d.remove(menu).unwrap();
        assert_eq!(d.focused(), None);
    }

    #[test]
    fn bounding_rect_reports_detached_and_missing_layout() {
        let mut d = doc();
        let root = d.root();
        let loose = d.create_element(Role::Button, "loose");
        assert_eq!(d.bounding_rect(loose), Err(DocumentError::Detached(loose)));
        let unlaid = d.append_new(root, Role::Button, "b", None).unwrap();
        assert_eq!(d.bounding_rect(unlaid), Err(DocumentError::NoLayout(unlaid)));
    }

    #[test]
    fn hit_test_prefers_layers() {
        let mut d = doc();
        let root = d.root();
        let layer = d.create_layer("layer");
        let page = d
            .append_new(root, Role::Region, "page", Some(Rect::new(0, 0, 80, 24)))
            .unwrap();
        let popup = d
            .append_new(layer, Role::Menu, "popup", Some(Rect::new(10, 5, 10, 5)))
            .unwrap();
        assert_eq!(d.hit_test(12, 6), Some(popup));
        assert_eq!(d.hit_test(1, 1), Some(page));
        assert_eq!(d.hit_test(100, 100), None);
    }

    #[test]
    fn focus_requires_focusable_connected_node() {
        let mut d = doc();
        let root = d.root();
        let region = d.append_new(root, Role::Region, "r", None).unwrap();
        assert_eq!(d.focus(region), Err(DocumentError::NotFocusable(region)));
        let input = d.append_new(root, Role::TextInput, "search", None).unwrap();
        d.focus(input).unwrap();
        assert!(d.focus_in_text_input());
    }

    #[test]
    fn scroll_is_clamped_to_extent() {
        let mut d = doc();
        d.set_scroll_extent(30);
        assert_eq!(d.scroll_by(-5), 0);
        assert_eq!(d.scroll_by(50), 30);
    }
}

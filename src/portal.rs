//! Shared top-level layer for overlay content.
//!
//! All overlays mount their root node into one container directly under the
//! document root. The container is created lazily, reused when one is
//! already mounted (duplicate host, hot reload), recreated when another
//! teardown removed it, and torn down only once it has no children.

use crate::constants::PORTAL_MARKER;
use crate::document::{Document, DocumentError, NodeId};

#[derive(Debug, Default)]
pub struct PortalHost {
    container: Option<NodeId>,
}

impl PortalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Return the mounted container, creating it on first use.
    pub fn acquire(&mut self, doc: &mut Document) -> NodeId {
        if let Some(id) = self.container
            && doc.is_connected(id)
        {
            return id;
        }
        if let Some(existing) = doc.find_by_marker(PORTAL_MARKER) {
            tracing::debug!(node = existing.raw(), "reusing mounted portal container");
            self.container = Some(existing);
            return existing;
        }
        let id = doc.create_layer(PORTAL_MARKER);
        tracing::debug!(node = id.raw(), "created portal container");
        self.container = Some(id);
        id
    }

    /// Append `node` to the container.
    pub fn mount(&mut self, doc: &mut Document, node: NodeId) -> Result<NodeId, DocumentError> {
        let container = self.acquire(doc);
        doc.append_child(container, node)?;
        Ok(container)
    }

    /// Remove `node` from the document and release the container.
    pub fn unmount(&mut self, doc: &mut Document, node: NodeId) {
        if let Err(err) = doc.remove(node) {
            tracing::debug!(%err, "overlay node already gone");
        }
        self.release(doc);
    }

    /// Tear the container down if nothing is mounted in it. Returns whether
    /// it was removed.
    pub fn release(&mut self, doc: &mut Document) -> bool {
        let Some(id) = self.container else {
            return false;
        };
        if !doc.exists(id) {
            self.container = None;
            return false;
        }
        if !doc.children(id).is_empty() {
            return false;
        }
        self.container = None;
        match doc.remove(id) {
            Ok(()) => {
                tracing::debug!(node = id.raw(), "removed empty portal container");
                true
            }
            Err(err) => {
                tracing::warn!(%err, "failed to remove portal container");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Role;
    use crate::geometry::Viewport;

    fn doc() -> Document {
        Document::new(Viewport::new(80, 24))
    }

    #[test]
    fn acquire_returns_singleton() {
        let mut d = doc();
        let mut portal = PortalHost::new();
        let a = portal.acquire(&mut d);
        let b = portal.acquire(&mut d);
        assert_eq!(a, b);
        assert_eq!(d.children(d.root()), &[a]);
    }

    #[test]
    fn second_host_reuses_existing_container() {
        let mut d = doc();
        let mut first = PortalHost::new();
        let mut second = PortalHost::new();
        let a = first.acquire(&mut d);
        let b = second.acquire(&mut d);
        assert_eq!(a, b);
        assert_eq!(d.children(d.root()).len(), 1);
    }

    #[test]
    fn release_keeps_container_while_occupied() {
        let mut d = doc();
        let mut portal = PortalHost::new();
        let one = d.create_element(Role::Menu, "one");
        let two = d.create_element(Role::Menu, "two");
        let container = portal.mount(&mut d, one).unwrap();
        portal.mount(&mut d, two).unwrap();
        portal.unmount(&mut d, one);
        assert!(d.exists(container));
        portal.unmount(&mut d, two);
        assert!(!d.exists(container));
        assert_eq!(portal.container(), None);
    }

    #[test]
    fn acquire_recreates_after_external_removal() {
        let mut d = doc();
        let mut portal = PortalHost::new();
        let first = portal.acquire(&mut d);
        d.remove(first).unwrap();
        let second = portal.acquire(&mut d);
        assert_ne!(first, second);
        assert!(d.is_connected(second));
        assert!(portal.release(&mut d));
    }
}

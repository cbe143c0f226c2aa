//! Document-level listener table.
//!
//! Dismissal registrations live here for as long as their overlay is open.
//! The table is shared behind `Rc<RefCell<..>>` so that a [`DismissGuard`]
//! can remove its own entry when dropped, without the owner having to reach
//! the document again.
//!
//! [`DismissGuard`]: crate::dismissal::DismissGuard

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::constants::LISTENERS_PER_REGISTRATION;
use crate::coordinator::OverlayId;
use crate::document::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(u64);

/// One pointer-down + key-down + scroll listener set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub owner: OverlayId,
    pub overlay: NodeId,
    pub trigger: Option<NodeId>,
    /// Page scroll offset captured at attach time.
    pub scroll_origin: i32,
    /// `None` disables scroll dismissal; the scroll listener is still held.
    pub scroll_threshold: Option<i32>,
}

#[derive(Debug, Default)]
pub(crate) struct ListenerTable {
    next_id: u64,
    entries: BTreeMap<RegistrationId, Registration>,
}

impl ListenerTable {
    pub(crate) fn remove(&mut self, id: RegistrationId) -> bool {
        self.entries.remove(&id).is_some()
    }
}

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    table: Rc<RefCell<ListenerTable>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached document-level listeners. Used as the leak probe.
    pub fn listener_count(&self) -> usize {
        self.registration_count() * LISTENERS_PER_REGISTRATION
    }

    pub fn registration_count(&self) -> usize {
        self.table.borrow().entries.len()
    }

    pub fn is_registered(&self, owner: OverlayId) -> bool {
        self.table
            .borrow()
            .entries
            .values()
            .any(|reg| reg.owner == owner)
    }

    pub(crate) fn insert(&self, registration: Registration) -> RegistrationId {
        let mut table = self.table.borrow_mut();
        let id = RegistrationId(table.next_id);
        table.next_id += 1;
        table.entries.insert(id, registration);
        id
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<ListenerTable>> {
        Rc::downgrade(&self.table)
    }

    /// Registrations in attach order.
    pub(crate) fn snapshot(&self) -> Vec<Registration> {
        self.table.borrow().entries.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Role};
    use crate::geometry::Viewport;

    #[test]
    fn counts_three_listeners_per_registration() {
        let mut doc = Document::new(Viewport::new(10, 10));
        let node = doc.create_element(Role::Menu, "m");
        let registry = ListenerRegistry::new();
        assert_eq!(registry.listener_count(), 0);
        let id = registry.insert(Registration {
            owner: OverlayId::AccountMenu,
            overlay: node,
            trigger: None,
            scroll_origin: 0,
            scroll_threshold: Some(24),
        });
        assert_eq!(registry.listener_count(), 3);
        assert!(registry.is_registered(OverlayId::AccountMenu));
        let table = registry.downgrade().upgrade().unwrap();
        assert!(table.borrow_mut().remove(id));
        assert!(!table.borrow_mut().remove(id));
        assert_eq!(registry.listener_count(), 0);
    }
}

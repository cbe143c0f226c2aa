//! Mutual exclusion between overlays.
//!
//! The coordinator only records which overlay is open. Opening asks it for
//! the sibling that has to close first; the caller performs that close before
//! opening the new overlay, so two overlays never hold listeners at once.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverlayId {
    Search,
    AccountMenu,
    Notifications,
    Shortcuts,
    Filter,
}

impl OverlayId {
    pub const ALL: [OverlayId; 5] = [
        OverlayId::Search,
        OverlayId::AccountMenu,
        OverlayId::Notifications,
        OverlayId::Shortcuts,
        OverlayId::Filter,
    ];
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverlayId::Search => "search",
            OverlayId::AccountMenu => "account menu",
            OverlayId::Notifications => "notifications",
            OverlayId::Shortcuts => "keyboard shortcuts",
            OverlayId::Filter => "filter",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayCoordinator {
    open: Option<OverlayId>,
}

impl OverlayCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) -> Option<OverlayId> {
        self.open
    }

    pub fn is_open(&self, id: OverlayId) -> bool {
        self.open == Some(id)
    }

    /// Record `id` as open. Returns the sibling the caller must close first.
    pub fn request_open(&mut self, id: OverlayId) -> Option<OverlayId> {
        let previous = self.open.replace(id);
        previous.filter(|prev| *prev != id)
    }

    /// Record that `id` closed. Closing an overlay that is not the open one
    /// leaves the record untouched.
    pub fn closed(&mut self, id: OverlayId) -> bool {
        if self.open == Some(id) {
            self.open = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_second_overlay_names_first_for_closing() {
        let mut c = OverlayCoordinator::new();
        assert_eq!(c.request_open(OverlayId::Search), None);
        assert_eq!(
            c.request_open(OverlayId::AccountMenu),
            Some(OverlayId::Search)
        );
        assert!(c.is_open(OverlayId::AccountMenu));
        assert!(!c.is_open(OverlayId::Search));
    }

    #[test]
    fn reopening_same_overlay_closes_nothing() {
        let mut c = OverlayCoordinator::new();
        c.request_open(OverlayId::Filter);
        assert_eq!(c.request_open(OverlayId::Filter), None);
    }

    #[test]
    fn stale_close_is_ignored() {
        let mut c = OverlayCoordinator::new();
        c.request_open(OverlayId::Notifications);
        assert!(!c.closed(OverlayId::Search));
        assert!(c.closed(OverlayId::Notifications));
        assert_eq!(c.open(), None);
    }
}

//! Outside-pointer / Escape / scroll dismissal.
//!
//! `attach` registers the listener set synchronously, inside the caller's open
//! path, so the pointer-down that opened an overlay (whose target is the
//! trigger) can never satisfy the outside test. Listeners do not call back
//! into overlays; `Document::dispatch` returns the requested dismissals and
//! the host closes the owners.

use std::cell::RefCell;
use std::rc::Weak;

use crossterm::event::{KeyCode, KeyEventKind};

use crate::config::EngineConfig;
use crate::constants::DEFAULT_SCROLL_THRESHOLD;
use crate::coordinator::OverlayId;
use crate::document::{DocEvent, Document, NodeId};
use crate::listeners::{ListenerTable, Registration, RegistrationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    OutsidePointer,
    Escape,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissRequest {
    pub owner: OverlayId,
    pub reason: DismissReason,
}

/// What a registration guards: the overlay subtree and its trigger. Pointer
/// targets inside either are not "outside".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissTarget {
    pub owner: OverlayId,
    pub overlay: NodeId,
    pub trigger: Option<NodeId>,
    pub dismiss_on_scroll: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissalController {
    scroll_threshold: i32,
}

impl DismissalController {
    pub const fn new(scroll_threshold: u16) -> Self {
        Self {
            scroll_threshold: scroll_threshold as i32,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.scroll_threshold)
    }

    /// Register the listener set for `target`, capturing the current page
    /// scroll offset as the threshold origin.
    pub fn attach(&self, doc: &Document, target: DismissTarget) -> DismissGuard {
        let registry = doc.listeners();
        let id = registry.insert(Registration {
            owner: target.owner,
            overlay: target.overlay,
            trigger: target.trigger,
            scroll_origin: doc.scroll_y(),
            scroll_threshold: target.dismiss_on_scroll.then_some(self.scroll_threshold),
        });
        tracing::debug!(overlay = ?target.owner, listeners = registry.listener_count(), "attached dismissal listeners");
        DismissGuard {
            owner: target.owner,
            id: Some(id),
            table: registry.downgrade(),
        }
    }
}

impl Default for DismissalController {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THRESHOLD)
    }
}

/// Owned listener registration. Detaches exactly once: explicitly through
/// [`DismissGuard::detach`] or implicitly on drop.
#[derive(Debug)]
pub struct DismissGuard {
    owner: OverlayId,
    id: Option<RegistrationId>,
    table: Weak<RefCell<ListenerTable>>,
}

impl DismissGuard {
    /// Remove all three listeners. Returns `false` when already detached.
    pub fn detach(&mut self) -> bool {
        let Some(id) = self.id.take() else {
            return false;
        };
        let Some(table) = self.table.upgrade() else {
            return false;
        };
        let removed = table.borrow_mut().remove(id);
        if removed {
            tracing::debug!(overlay = ?self.owner, "detached dismissal listeners");
        }
        removed
    }

    pub fn is_attached(&self) -> bool {
        self.id.is_some() && self.table.strong_count() > 0
    }
}

impl Drop for DismissGuard {
    fn drop(&mut self) {
        self.detach();
    }
}

fn is_outside(doc: &Document, reg: &Registration, target: Option<NodeId>) -> bool {
    let Some(target) = target else {
        return true;
    };
    if doc.contains(reg.overlay, target) {
        return false;
    }
    !reg.trigger.is_some_and(|trigger| doc.contains(trigger, target))
}

/// Dismissals requested by the attached listeners for one event, at most one
/// per owner, in attach order.
pub(crate) fn evaluate(
    doc: &Document,
    event: &DocEvent,
    target: Option<NodeId>,
) -> Vec<DismissRequest> {
    let mut out: Vec<DismissRequest> = Vec::new();
    for reg in doc.listeners().snapshot() {
        let reason = match event {
            DocEvent::PointerDown { .. } if is_outside(doc, &reg, target) => {
                Some(DismissReason::OutsidePointer)
            }
            DocEvent::KeyDown(key)
                if key.code == KeyCode::Esc && key.kind != KeyEventKind::Release =>
            {
                Some(DismissReason::Escape)
            }
            DocEvent::Scroll { .. } => reg
                .scroll_threshold
                .filter(|threshold| (doc.scroll_y() - reg.scroll_origin).abs() > *threshold)
                .map(|_| DismissReason::Scroll),
            _ => None,
        };
        if let Some(reason) = reason
            && !out.iter().any(|req| req.owner == reg.owner)
        {
            out.push(DismissRequest {
                owner: reg.owner,
                reason,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Role;
    use crate::geometry::{Rect, Viewport};
    use crossterm::event::{KeyEvent, KeyModifiers};

    struct Fixture {
        doc: Document,
        trigger: NodeId,
        overlay: NodeId,
        item: NodeId,
        page: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new(Viewport::new(80, 24));
        let root = doc.root();
        let page = doc
            .append_new(root, Role::Region, "page", Some(Rect::new(0, 0, 80, 24)))
            .unwrap();
        let trigger = doc
            .append_new(page, Role::Button, "avatar", Some(Rect::new(70, 0, 6, 1)))
            .unwrap();
        let layer = doc.create_layer("portal");
        let overlay = doc
            .append_new(layer, Role::Menu, "menu", Some(Rect::new(50, 2, 20, 6)))
            .unwrap();
        let item = doc
            .append_new(overlay, Role::MenuItem, "Profile", Some(Rect::new(51, 3, 18, 1)))
            .unwrap();
        Fixture {
            doc,
            trigger,
            overlay,
            item,
            page,
        }
    }

    fn target(f: &Fixture, scroll: bool) -> DismissTarget {
        DismissTarget {
            owner: OverlayId::AccountMenu,
            overlay: f.overlay,
            trigger: Some(f.trigger),
            dismiss_on_scroll: scroll,
        }
    }

    fn esc() -> DocEvent {
        DocEvent::KeyDown(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
    }

    #[test]
    fn detach_is_idempotent_and_restores_baseline() {
        let f = fixture();
        let baseline = f.doc.listeners().listener_count();
        let mut guard = DismissalController::default().attach(&f.doc, target(&f, true));
        assert_eq!(f.doc.listeners().listener_count(), baseline + 3);
        assert!(guard.detach());
        assert!(!guard.detach());
        assert!(!guard.is_attached());
        assert_eq!(f.doc.listeners().listener_count(), baseline);
    }

    #[test]
    fn drop_detaches() {
        let f = fixture();
        {
            let _guard = DismissalController::default().attach(&f.doc, target(&f, true));
            assert_eq!(f.doc.listeners().listener_count(), 3);
        }
        assert_eq!(f.doc.listeners().listener_count(), 0);
    }

    #[test]
    fn pointer_inside_overlay_or_trigger_is_ignored() {
        let mut f = fixture();
        let _guard = DismissalController::default().attach(&f.doc, target(&f, true));
        let on_item = f.doc.dispatch(&DocEvent::PointerDown { x: 52, y: 3 });
        assert_eq!(on_item.target, Some(f.item));
        assert!(on_item.dismissals.is_empty());
        let on_trigger = f.doc.dispatch(&DocEvent::PointerDown { x: 71, y: 0 });
        assert_eq!(on_trigger.target, Some(f.trigger));
        assert!(on_trigger.dismissals.is_empty());
    }

    #[test]
    fn pointer_outside_requests_dismissal() {
        let mut f = fixture();
        let _guard = DismissalController::default().attach(&f.doc, target(&f, true));
        let out = f.doc.dispatch(&DocEvent::PointerDown { x: 2, y: 10 });
        assert_eq!(out.target, Some(f.page));
        assert_eq!(
            out.dismissals,
            vec![DismissRequest {
                owner: OverlayId::AccountMenu,
                reason: DismissReason::OutsidePointer
            }]
        );
    }

    #[test]
    fn escape_requests_dismissal() {
        let mut f = fixture();
        let _guard = DismissalController::default().attach(&f.doc, target(&f, true));
        let out = f.doc.dispatch(&esc());
        assert_eq!(out.dismissals[0].reason, DismissReason::Escape);
    }

    #[test]
    fn scroll_dismisses_only_past_threshold() {
        let mut f = fixture();
        let _guard = DismissalController::new(24).attach(&f.doc, target(&f, true));
        let small = f.doc.dispatch(&DocEvent::Scroll { delta: 10 });
        assert!(small.dismissals.is_empty());
        let large = f.doc.dispatch(&DocEvent::Scroll { delta: 30 });
        assert_eq!(large.dismissals[0].reason, DismissReason::Scroll);
    }

    #[test]
    fn scroll_dismissal_can_be_disabled() {
        let mut f = fixture();
        let _guard = DismissalController::new(2).attach(&f.doc, target(&f, false));
        let out = f.doc.dispatch(&DocEvent::Scroll { delta: 40 });
        assert!(out.dismissals.is_empty());
        assert_eq!(f.doc.listeners().listener_count(), 3);
    }

    #[test]
    fn detached_guard_no_longer_dismisses() {
        let mut f = fixture();
        let mut guard = DismissalController::default().attach(&f.doc, target(&f, true));
        guard.detach();
        assert!(f.doc.dispatch(&esc()).dismissals.is_empty());
    }
}

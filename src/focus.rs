//! Focus hand-off between triggers and overlays.
//!
//! Restoration is deferred: `on_close` only records the trigger and `flush`
//! focuses it once the overlay subtree has left the document. Opening
//! another overlay before the flush cancels the pending restoration, so two
//! overlays never race over focus.

use crate::document::{Document, NodeId};

#[derive(Debug, Default)]
pub struct FocusManager {
    pending_restore: Option<NodeId>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move focus to the first focusable descendant of `overlay_root` when
    /// `autofocus` is set, or to the root itself if it is focusable and has
    /// no focusable content. Any pending restoration is cancelled.
    pub fn on_open(
        &mut self,
        doc: &mut Document,
        overlay_root: NodeId,
        autofocus: bool,
    ) -> Option<NodeId> {
        self.cancel_pending();
        if !autofocus {
            return None;
        }
        let target = doc
            .first_focusable_descendant(overlay_root)
            .or_else(|| doc.is_focusable(overlay_root).then_some(overlay_root))?;
        match doc.focus(target) {
            Ok(()) => Some(target),
            Err(err) => {
                tracing::warn!(%err, "could not focus overlay content");
                None
            }
        }
    }

    /// Schedule focus to return to `trigger`.
    pub fn on_close(&mut self, trigger: Option<NodeId>) {
        self.pending_restore = trigger;
    }

    pub fn pending(&self) -> Option<NodeId> {
        self.pending_restore
    }

    pub fn cancel_pending(&mut self) -> Option<NodeId> {
        self.pending_restore.take()
    }

    /// Perform the pending restoration. Unmounted triggers are skipped.
    pub fn flush(&mut self, doc: &mut Document) -> Option<NodeId> {
        let trigger = self.pending_restore.take()?;
        match doc.focus(trigger) {
            Ok(()) => {
                tracing::debug!(node = trigger.raw(), "restored focus to trigger");
                Some(trigger)
            }
            Err(err) => {
                tracing::debug!(%err, "skipped focus restoration");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Role;
    use crate::geometry::Viewport;

    fn setup() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new(Viewport::new(80, 24));
        let root = doc.root();
        let trigger = doc.append_new(root, Role::Button, "avatar", None).unwrap();
        let menu = doc.append_new(root, Role::Menu, "menu", None).unwrap();
        let group = doc.append_new(menu, Role::Generic, "group", None).unwrap();
        let item = doc.append_new(group, Role::MenuItem, "Profile", None).unwrap();
        (doc, trigger, menu, item)
    }

    #[test]
    fn open_focuses_first_focusable_descendant() {
        let (mut doc, _, menu, item) = setup();
        let mut fm = FocusManager::new();
        assert_eq!(fm.on_open(&mut doc, menu, true), Some(item));
        assert_eq!(doc.focused(), Some(item));
    }

    #[test]
    fn open_without_autofocus_leaves_focus() {
        let (mut doc, trigger, menu, _) = setup();
        doc.focus(trigger).unwrap();
        let mut fm = FocusManager::new();
        assert_eq!(fm.on_open(&mut doc, menu, false), None);
        assert_eq!(doc.focused(), Some(trigger));
    }

    #[test]
    fn restoration_waits_for_flush() {
        let (mut doc, trigger, menu, _) = setup();
        let mut fm = FocusManager::new();
        fm.on_open(&mut doc, menu, true);
        fm.on_close(Some(trigger));
        doc.remove(menu).unwrap();
        assert_eq!(doc.focused(), None);
        assert_eq!(fm.flush(&mut doc), Some(trigger));
        assert_eq!(doc.focused(), Some(trigger));
    }

    #[test]
    fn opening_cancels_pending_restoration() {
        let (mut doc, trigger, menu, item) = setup();
        let mut fm = FocusManager::new();
        fm.on_close(Some(trigger));
        fm.on_open(&mut doc, menu, true);
        assert_eq!(fm.flush(&mut doc), None);
        assert_eq!(doc.focused(), Some(item));
    }

    #[test]
    fn empty_overlay_focuses_its_root() {
        let (mut doc, _, _, _) = setup();
        let root = doc.root();
        let dialog = doc.append_new(root, Role::Dialog, "empty", None).unwrap();
        doc.set_focusable(dialog, true);
        let mut fm = FocusManager::new();
        assert_eq!(fm.on_open(&mut doc, dialog, true), Some(dialog));
    }

    #[test]
    fn unmounted_trigger_is_skipped() {
        let (mut doc, trigger, _, _) = setup();
        let mut fm = FocusManager::new();
        fm.on_close(Some(trigger));
        doc.remove(trigger).unwrap();
        assert_eq!(fm.flush(&mut doc), None);
    }
}

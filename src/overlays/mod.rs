//! Overlay instances and their shared anchored-surface lifecycle.
//!
//! Every instance is a thin composition over [`AnchoredSurface`]: open
//! captures the trigger rectangle, places the surface, mounts its node into
//! the portal, attaches dismissal listeners and hands focus over. Close
//! undoes the same steps in reverse. Instances only add content, rendering
//! and what "activate item `i`" means.

use crossterm::event::KeyEvent;
use ratatui::layout::Rect as CellRect;
use ratatui::widgets::{Block, Borders};

use crate::config::EngineConfig;
use crate::coordinator::OverlayId;
use crate::dismissal::{DismissGuard, DismissTarget, DismissalController};
use crate::document::{Document, DocumentError, NodeId, Role};
use crate::focus::FocusManager;
use crate::geometry::{Anchor, Position, Rect, Size, Viewport};
use crate::keybindings::KeyBindings;
use crate::navigator::{NavOutcome, RovingListNavigator};
use crate::portal::PortalHost;
use crate::position::PositionCalculator;
use crate::theme;
use crate::ui::UiFrame;

pub mod account_menu;
pub mod filter_dropdown;
pub mod notifications;
pub mod search;
pub mod shortcuts_modal;

pub use account_menu::AccountMenu;
pub use filter_dropdown::FilterDropdown;
pub use notifications::NotificationDropdown;
pub use search::SearchOverlay;
pub use shortcuts_modal::KeyboardShortcutsModal;

/// Everything an overlay touches while opening, closing or handling input.
pub struct OverlayContext<'a> {
    pub doc: &'a mut Document,
    pub portal: &'a mut PortalHost,
    pub focus: &'a mut FocusManager,
    pub config: &'a EngineConfig,
    pub bindings: &'a KeyBindings,
}

/// Result of routing input into an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Handled,
    /// An item was selected; the overlay asks to be dismissed.
    Commit(String),
    /// A checkable option changed; the overlay stays open.
    Toggled { id: String, selected: bool },
}

/// One selectable row inside the surface, relative to its inner area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpec {
    pub label: String,
    pub line: u16,
    pub height: u16,
}

impl RowSpec {
    pub fn new(label: impl Into<String>, line: u16, height: u16) -> Self {
        Self {
            label: label.into(),
            line,
            height,
        }
    }
}

/// Open/closed state, placement, portal node, listener guard and roving
/// index of one overlay.
#[derive(Debug)]
pub struct AnchoredSurface {
    id: OverlayId,
    role: Role,
    row_role: Role,
    anchor: Anchor,
    dismiss_on_scroll: bool,
    trigger: Option<NodeId>,
    root: Option<NodeId>,
    rows: Vec<NodeId>,
    size: Size,
    position: Option<Position>,
    guard: Option<DismissGuard>,
    navigator: RovingListNavigator,
}

impl AnchoredSurface {
    pub fn new(id: OverlayId, role: Role, row_role: Role) -> Self {
        Self {
            id,
            role,
            row_role,
            anchor: Anchor::BelowLeft,
            dismiss_on_scroll: true,
            trigger: None,
            root: None,
            rows: Vec::new(),
            size: Size::default(),
            position: None,
            guard: None,
            navigator: RovingListNavigator::default(),
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_scroll_dismissal(mut self, enabled: bool) -> Self {
        self.dismiss_on_scroll = enabled;
        self
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn trigger(&self) -> Option<NodeId> {
        self.trigger
    }

    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Placed rectangle while open.
    pub fn rect(&self, viewport: Viewport) -> Option<Rect> {
        self.position.map(|p| p.to_rect(self.size, viewport))
    }

    pub fn navigator(&self) -> &RovingListNavigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut RovingListNavigator {
        &mut self.navigator
    }

    pub fn active(&self) -> Option<usize> {
        self.navigator.active()
    }

    pub fn has_listeners(&self) -> bool {
        self.guard.as_ref().is_some_and(DismissGuard::is_attached)
    }

    /// Row index of the row containing `node`.
    pub fn row_of(&self, doc: &Document, node: NodeId) -> Option<usize> {
        self.rows.iter().position(|row| doc.contains(*row, node))
    }

    /// Open anchored to `trigger`. Returns `Ok(false)` when already open.
    ///
    /// Listeners are attached before this returns, so the pointer-down that
    /// triggered the open has already been evaluated against the old state.
    pub fn open(
        &mut self,
        ctx: &mut OverlayContext<'_>,
        trigger: Option<NodeId>,
        desired: Size,
        rows: &[RowSpec],
    ) -> Result<bool, DocumentError> {
        if self.is_open() {
            return Ok(false);
        }
        let root = ctx.doc.create_element(self.role, self.id.to_string());
        ctx.doc.set_focusable(root, true);
        if let Err(err) = ctx.portal.mount(ctx.doc, root) {
            if let Err(cleanup) = ctx.doc.remove(root) {
                tracing::debug!(%cleanup, "overlay root already gone");
            }
            return Err(err);
        }
        self.root = Some(root);
        self.trigger = trigger;
        self.navigator.set_policy(ctx.config.navigation(self.id));
        self.place(ctx.doc, ctx.config, desired);
        self.build_rows(ctx.doc, rows);
        self.navigator.set_len(rows.len());
        self.guard = Some(DismissalController::from_config(ctx.config).attach(
            ctx.doc,
            DismissTarget {
                owner: self.id,
                overlay: root,
                trigger,
                dismiss_on_scroll: self.dismiss_on_scroll,
            },
        ));
        ctx.focus
            .on_open(ctx.doc, root, ctx.config.autofocus(self.id));
        tracing::debug!(overlay = %self.id, position = ?self.position, "overlay opened");
        Ok(true)
    }

    /// Detach listeners, unmount, and schedule focus to return to the
    /// trigger. Returns `false` when already closed.
    pub fn close(&mut self, ctx: &mut OverlayContext<'_>) -> bool {
        let Some(root) = self.root.take() else {
            return false;
        };
        if let Some(mut guard) = self.guard.take() {
            guard.detach();
        }
        ctx.portal.unmount(ctx.doc, root);
        ctx.focus.on_close(self.trigger);
        self.rows.clear();
        self.position = None;
        self.navigator.set_len(0);
        tracing::debug!(overlay = %self.id, "overlay closed");
        true
    }

    /// The list content changed: rebuild rows and reset the roving index.
    /// Focus that sat on a removed row moves to the surface root.
    pub fn set_rows(&mut self, ctx: &mut OverlayContext<'_>, desired: Size, rows: &[RowSpec]) {
        let Some(root) = self.root else {
            return;
        };
        let had_focus = ctx
            .doc
            .focused()
            .is_some_and(|focused| ctx.doc.contains(root, focused));
        self.place(ctx.doc, ctx.config, desired);
        self.build_rows(ctx.doc, rows);
        self.navigator.set_len(rows.len());
        if had_focus
            && ctx.doc.focused().is_none()
            && let Err(err) = ctx.doc.focus(root)
        {
            tracing::debug!(overlay = %self.id, %err, "surface root refused focus");
        }
    }

    /// Recompute placement (viewport resize, trigger moved) keeping the
    /// roving index and, when the row count is unchanged, the row nodes.
    pub fn relayout(&mut self, ctx: &mut OverlayContext<'_>, desired: Size, rows: &[RowSpec]) {
        if !self.is_open() {
            return;
        }
        self.place(ctx.doc, ctx.config, desired);
        if rows.len() != self.rows.len() {
            self.build_rows(ctx.doc, rows);
            self.navigator.set_len(rows.len());
            return;
        }
        let Some(inner) = self.rect(ctx.doc.viewport()).map(inner_rect) else {
            return;
        };
        for (node, spec) in self.rows.iter().zip(rows) {
            ctx.doc.set_rect(*node, row_rect(inner, spec));
        }
    }

    fn place(&mut self, doc: &mut Document, config: &EngineConfig, desired: Size) {
        let viewport = doc.viewport();
        let size = viewport.fit(desired, config.margin);
        let calc = PositionCalculator::from_config(config);
        let position = if self.anchor == Anchor::Centered {
            calc.compute(Rect::default(), size, viewport, Anchor::Centered)
        } else {
            match self.trigger.map(|t| doc.bounding_rect(t)) {
                Some(Ok(trigger)) => calc.compute(trigger, size, viewport, self.anchor),
                Some(Err(err)) => {
                    tracing::debug!(overlay = %self.id, %err, "trigger unavailable, using fallback position");
                    calc.fallback(size, viewport)
                }
                None => calc.fallback(size, viewport),
            }
        };
        self.size = size;
        self.position = Some(position);
        if let Some(root) = self.root {
            doc.set_rect(root, position.to_rect(size, viewport));
        }
    }

    fn build_rows(&mut self, doc: &mut Document, rows: &[RowSpec]) {
        for row in self.rows.drain(..) {
            if let Err(err) = doc.remove(row) {
                tracing::debug!(%err, "row node already gone");
            }
        }
        let (Some(root), Some(rect)) = (self.root, self.rect(doc.viewport())) else {
            return;
        };
        let inner = inner_rect(rect);
        for spec in rows {
            let rect = row_rect(inner, spec);
            match doc.append_new(root, self.row_role, spec.label.clone(), Some(rect)) {
                Ok(id) => {
                    // The surface root holds focus; rows are only roved.
                    doc.set_focusable(id, false);
                    self.rows.push(id);
                }
                Err(err) => tracing::warn!(%err, "failed to mount overlay row"),
            }
        }
    }
}

/// Rows that fall below the inner area get zero height and never hit-test.
fn row_rect(inner: Rect, spec: &RowSpec) -> Rect {
    let top = inner.y + spec.line as i32;
    let height = (inner.bottom() - top).clamp(0, spec.height as i32) as u16;
    Rect::new(inner.x, top, inner.width, height)
}

/// Area inside the one-cell border.
pub fn inner_rect(rect: Rect) -> Rect {
    Rect::new(
        rect.x + 1,
        rect.y + 1,
        rect.width.saturating_sub(2),
        rect.height.saturating_sub(2),
    )
}

/// Common behavior of the overlay instances.
pub trait Overlay {
    fn surface(&self) -> &AnchoredSurface;
    fn surface_mut(&mut self) -> &mut AnchoredSurface;

    /// Preferred outer size before fitting into the viewport.
    fn desired_size(&self, viewport: Viewport) -> Size;

    /// Selectable rows in display order.
    fn row_specs(&self) -> Vec<RowSpec>;

    /// Commit the item at `index`.
    fn activate(&mut self, index: usize) -> Outcome;

    fn render(&self, frame: &mut UiFrame<'_>, viewport: Viewport);

    fn id(&self) -> OverlayId {
        self.surface().id()
    }

    fn is_open(&self) -> bool {
        self.surface().is_open()
    }

    fn open(
        &mut self,
        ctx: &mut OverlayContext<'_>,
        trigger: Option<NodeId>,
    ) -> Result<bool, DocumentError> {
        let size = self.desired_size(ctx.doc.viewport());
        let rows = self.row_specs();
        self.surface_mut().open(ctx, trigger, size, &rows)
    }

    fn close(&mut self, ctx: &mut OverlayContext<'_>) -> bool {
        self.surface_mut().close(ctx)
    }

    /// Content changed while open.
    fn refresh(&mut self, ctx: &mut OverlayContext<'_>) {
        let size = self.desired_size(ctx.doc.viewport());
        let rows = self.row_specs();
        self.surface_mut().set_rows(ctx, size, &rows);
    }

    fn reposition(&mut self, ctx: &mut OverlayContext<'_>) {
        let size = self.desired_size(ctx.doc.viewport());
        let rows = self.row_specs();
        self.surface_mut().relayout(ctx, size, &rows);
    }

    fn handle_key(&mut self, ctx: &mut OverlayContext<'_>, key: &KeyEvent) -> Outcome {
        match self.surface_mut().navigator_mut().handle_key(key, ctx.bindings) {
            NavOutcome::Ignored => Outcome::Ignored,
            NavOutcome::Unchanged | NavOutcome::Moved(_) => Outcome::Handled,
            NavOutcome::Commit(index) => self.activate(index),
        }
    }

    /// Pointer-down inside the surface.
    fn pointer_down(&mut self, doc: &Document, target: NodeId) -> Outcome {
        let Some(index) = self.surface().row_of(doc, target) else {
            return Outcome::Handled;
        };
        match self.surface_mut().navigator_mut().commit_at(index) {
            Some(index) => self.activate(index),
            None => Outcome::Handled,
        }
    }

    /// Pointer moved over the surface.
    fn pointer_move(&mut self, doc: &Document, target: NodeId) -> bool {
        match self.surface().row_of(doc, target) {
            Some(index) => self.surface_mut().navigator_mut().hover(index),
            None => false,
        }
    }
}

/// Clear the surface and draw its border. Returns the inner cell area.
pub(crate) fn draw_frame(
    frame: &mut UiFrame<'_>,
    rect: Rect,
    title: &str,
) -> Option<CellRect> {
    let outer = rect.to_cells();
    frame.clear_signed(rect)?;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .style(theme::overlay_style())
        .border_style(ratatui::style::Style::default().fg(theme::overlay_border()));
    let inner = block.inner(outer);
    frame.render_widget(block, outer);
    (inner.width > 0 && inner.height > 0).then_some(inner)
}

/// Cell row for `line` inside `inner`, if visible.
/// Item or character count as cells, saturating at `u16::MAX`.
pub(crate) fn cell_count(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

pub(crate) fn line_y(inner: CellRect, line: u16) -> Option<u16> {
    (line < inner.height).then(|| inner.y + line)
}

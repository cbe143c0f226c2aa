use crossterm::event::KeyEvent;
use ratatui::style::{Modifier, Style};

use crate::content::{Notification, SelectHandler};
use crate::coordinator::OverlayId;
use crate::document::Role;
use crate::geometry::{Size, Viewport};
use crate::keybindings::Action;
use crate::navigator::NavOutcome;
use crate::overlays::{
    AnchoredSurface, Outcome, Overlay, OverlayContext, RowSpec, cell_count, draw_frame, line_y,
};
use crate::theme;
use crate::ui::UiFrame;

pub const EMPTY_TEXT: &str = "No notifications";

const WIDTH: u16 = 44;
const LINES_PER_ITEM: u16 = 2;

pub struct NotificationDropdown {
    surface: AnchoredSurface,
    items: Vec<Notification>,
    on_select: Option<SelectHandler<Notification>>,
}

impl NotificationDropdown {
    pub fn new(items: Vec<Notification>) -> Self {
        Self {
            surface: AnchoredSurface::new(OverlayId::Notifications, Role::ListBox, Role::Option),
            items,
            on_select: None,
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.items
    }

    /// Replace the list. Rows are rebuilt and the roving index resets when
    /// the dropdown is open.
    pub fn set_notifications(&mut self, ctx: &mut OverlayContext<'_>, items: Vec<Notification>) {
        self.items = items;
        self.refresh(ctx);
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                true
            }
            _ => false,
        }
    }

    /// Returns how many notifications changed.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for n in self.items.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }
        changed
    }

    pub fn set_on_select(&mut self, handler: impl FnMut(&Notification) + 'static) {
        self.on_select = Some(Box::new(handler));
    }

    fn title(&self) -> String {
        match self.unread_count() {
            0 => "Notifications".to_string(),
            n => format!("Notifications ({n} unread)"),
        }
    }
}

impl Overlay for NotificationDropdown {
    fn surface(&self) -> &AnchoredSurface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut AnchoredSurface {
        &mut self.surface
    }

    fn desired_size(&self, _viewport: Viewport) -> Size {
        let lines = cell_count(self.items.len()).saturating_mul(LINES_PER_ITEM).max(1);
        Size::new(WIDTH, lines.saturating_add(2))
    }

    fn row_specs(&self) -> Vec<RowSpec> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let line = cell_count(i).saturating_mul(LINES_PER_ITEM);
                RowSpec::new(n.title.clone(), line, LINES_PER_ITEM)
            })
            .collect()
    }

    fn handle_key(&mut self, ctx: &mut OverlayContext<'_>, key: &KeyEvent) -> Outcome {
        if ctx.bindings.matches(Action::MarkAllRead, key) {
            let changed = self.mark_all_read();
            tracing::debug!(changed, "marked all notifications read");
            return Outcome::Handled;
        }
        match self.surface.navigator_mut().handle_key(key, ctx.bindings) {
            NavOutcome::Ignored => Outcome::Ignored,
            NavOutcome::Commit(index) => self.activate(index),
            _ => Outcome::Handled,
        }
    }

    fn activate(&mut self, index: usize) -> Outcome {
        let Some(item) = self.items.get_mut(index) else {
            return Outcome::Ignored;
        };
        item.read = true;
        let item = item.clone();
        if let Some(handler) = self.on_select.as_mut() {
            handler(&item);
        }
        Outcome::Commit(item.id)
    }

    fn render(&self, frame: &mut UiFrame<'_>, viewport: Viewport) {
        let Some(rect) = self.surface.rect(viewport) else {
            return;
        };
        let Some(inner) = draw_frame(frame, rect, &self.title()) else {
            return;
        };
        if self.items.is_empty() {
            frame.set_string(
                inner,
                inner.x + 1,
                inner.y,
                EMPTY_TEXT,
                Style::default().fg(theme::muted_fg()),
            );
            return;
        }
        let active = self.surface.active();
        let width = inner.width as usize;
        for (i, n) in self.items.iter().enumerate() {
            let line = cell_count(i).saturating_mul(LINES_PER_ITEM);
            let Some(y) = line_y(inner, line) else {
                break;
            };
            let mut style = if active == Some(i) {
                theme::active_row()
            } else {
                theme::overlay_style()
            };
            if !n.read {
                style = style.fg(theme::unread_fg()).add_modifier(Modifier::BOLD);
            }
            let head = format!("{} {}", n.kind.glyph(), n.title);
            let pad = width.saturating_sub(head.chars().count() + n.time.chars().count() + 1);
            let text = format!("{head}{}{} ", " ".repeat(pad), n.time);
            frame.set_string(inner, inner.x, y, &text, style);
            if let Some(y) = line_y(inner, line + 1) {
                frame.set_string(
                    inner,
                    inner.x + 2,
                    y,
                    &n.message,
                    Style::default().fg(theme::muted_fg()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::NotificationKind;

    fn sample() -> Vec<Notification> {
        vec![
            Notification::new("n1", NotificationKind::Info, "Deploy done", "api v2", "2m"),
            Notification::new("n2", NotificationKind::Warning, "Disk 91%", "db-1", "1h"),
        ]
    }

    #[test]
    fn huge_lists_saturate_instead_of_overflowing() {
        let items = (0..40_000)
            .map(|i| Notification::new(format!("n{i}"), NotificationKind::Info, "t", "b", "now"))
            .collect();
        let d = NotificationDropdown::new(items);
        assert_eq!(d.desired_size(Viewport::new(80, 24)).height, u16::MAX);
        assert_eq!(d.row_specs().last().map(|r| r.line), Some(u16::MAX));
    }

    #[test]
    fn activate_marks_read() {
        let mut d = NotificationDropdown::new(sample());
        assert_eq!(d.unread_count(), 2);
        assert_eq!(d.activate(1), Outcome::Commit("n2".into()));
        assert_eq!(d.unread_count(), 1);
        assert!(d.notifications()[1].read);
    }

    #[test]
    fn mark_all_read_counts_changes() {
        let mut d = NotificationDropdown::new(sample());
        assert!(d.mark_read("n1"));
        assert!(!d.mark_read("n1"));
        assert_eq!(d.mark_all_read(), 1);
        assert_eq!(d.mark_all_read(), 0);
        assert_eq!(d.title(), "Notifications");
    }

    #[test]
    fn empty_list_has_no_rows_but_keeps_a_line() {
        let d = NotificationDropdown::new(Vec::new());
        assert!(d.row_specs().is_empty());
        assert_eq!(d.desired_size(Viewport::new(80, 24)), Size::new(44, 3));
    }
}

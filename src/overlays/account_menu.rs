use ratatui::style::Style;

use crate::content::{MenuEntry, SelectHandler};
use crate::coordinator::OverlayId;
use crate::document::Role;
use crate::geometry::{Size, Viewport};
use crate::overlays::{AnchoredSurface, Outcome, Overlay, RowSpec, cell_count, draw_frame, line_y};
use crate::theme;
use crate::ui::UiFrame;

const MIN_WIDTH: u16 = 24;
/// The signed-in user occupies the first line; entries follow.
const HEADER_LINES: u16 = 1;

/// Avatar menu with wraparound navigation.
pub struct AccountMenu {
    surface: AnchoredSurface,
    user: String,
    entries: Vec<MenuEntry>,
    on_select: Option<SelectHandler<MenuEntry>>,
}

impl AccountMenu {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            surface: AnchoredSurface::new(OverlayId::AccountMenu, Role::Menu, Role::MenuItem),
            user: user.into(),
            entries: vec![
                MenuEntry::new("profile", "Profile"),
                MenuEntry::new("settings", "Settings"),
                MenuEntry::new("billing", "Billing"),
                MenuEntry::new("sign-out", "Sign out"),
            ],
            on_select: None,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Replace the entries. Takes effect on the next open.
    pub fn set_entries(&mut self, entries: Vec<MenuEntry>) {
        self.entries = entries;
    }

    pub fn set_on_select(&mut self, handler: impl FnMut(&MenuEntry) + 'static) {
        self.on_select = Some(Box::new(handler));
    }
}

impl Overlay for AccountMenu {
    fn surface(&self) -> &AnchoredSurface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut AnchoredSurface {
        &mut self.surface
    }

    fn desired_size(&self, _viewport: Viewport) -> Size {
        let widest = self
            .entries
            .iter()
            .map(|e| e.label.chars().count())
            .chain(std::iter::once(self.user.chars().count()))
            .max()
            .map_or(0, cell_count);
        Size::new(
            widest.saturating_add(6).max(MIN_WIDTH),
            cell_count(self.entries.len()).saturating_add(HEADER_LINES + 2),
        )
    }

    fn row_specs(&self) -> Vec<RowSpec> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| RowSpec::new(e.label.clone(), HEADER_LINES.saturating_add(cell_count(i)), 1))
            .collect()
    }

    fn activate(&mut self, index: usize) -> Outcome {
        let Some(entry) = self.entries.get(index).cloned() else {
            return Outcome::Ignored;
        };
        if let Some(handler) = self.on_select.as_mut() {
            handler(&entry);
        }
        Outcome::Commit(entry.id)
    }

    fn render(&self, frame: &mut UiFrame<'_>, viewport: Viewport) {
        let Some(rect) = self.surface.rect(viewport) else {
            return;
        };
        let Some(inner) = draw_frame(frame, rect, "Account") else {
            return;
        };
        if let Some(y) = line_y(inner, 0) {
            frame.set_string(
                inner,
                inner.x + 1,
                y,
                &self.user,
                Style::default().fg(theme::muted_fg()),
            );
        }
        let active = self.surface.active();
        for (i, entry) in self.entries.iter().enumerate() {
            let Some(y) = line_y(inner, HEADER_LINES.saturating_add(cell_count(i))) else {
                break;
            };
            let style = if active == Some(i) {
                theme::active_row()
            } else {
                theme::overlay_style()
            };
            let text = format!(" {:<width$}", entry.label, width = inner.width as usize);
            frame.set_string(inner, inner.x, y, &text, style);
        }
    }
}

use ratatui::style::Style;

use crate::content::ShortcutEntry;
use crate::coordinator::OverlayId;
use crate::document::Role;
use crate::geometry::{Anchor, Size, Viewport};
use crate::overlays::{AnchoredSurface, Outcome, Overlay, RowSpec, cell_count, draw_frame, line_y};
use crate::theme;
use crate::ui::UiFrame;

const WIDTH: u16 = 60;
const KEYS_COLUMN: usize = 26;

/// Centered help listing every binding. Not anchored, so page scroll does
/// not dismiss it.
pub struct KeyboardShortcutsModal {
    surface: AnchoredSurface,
    entries: Vec<ShortcutEntry>,
}

enum Line<'a> {
    Section(&'a str),
    Entry(&'a ShortcutEntry),
    Blank,
}

impl KeyboardShortcutsModal {
    pub fn new(entries: Vec<ShortcutEntry>) -> Self {
        Self {
            surface: AnchoredSurface::new(OverlayId::Shortcuts, Role::Dialog, Role::Generic)
                .with_anchor(Anchor::Centered)
                .with_scroll_dismissal(false),
            entries,
        }
    }

    pub fn entries(&self) -> &[ShortcutEntry] {
        &self.entries
    }

    pub fn set_entries(&mut self, entries: Vec<ShortcutEntry>) {
        self.entries = entries;
    }

    /// Entries grouped by section in first-encountered order, with a blank
    /// line between sections.
    fn lines(&self) -> Vec<Line<'_>> {
        let mut sections: Vec<&str> = Vec::new();
        for e in &self.entries {
            if !sections.contains(&e.section.as_str()) {
                sections.push(&e.section);
            }
        }
        let mut out = Vec::new();
        for (i, section) in sections.iter().enumerate() {
            if i > 0 {
                out.push(Line::Blank);
            }
            out.push(Line::Section(section));
            out.extend(
                self.entries
                    .iter()
                    .filter(|e| e.section == *section)
                    .map(Line::Entry),
            );
        }
        out
    }
}

impl Overlay for KeyboardShortcutsModal {
    fn surface(&self) -> &AnchoredSurface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut AnchoredSurface {
        &mut self.surface
    }

    fn desired_size(&self, _viewport: Viewport) -> Size {
        Size::new(WIDTH, cell_count(self.lines().len()).max(1).saturating_add(2))
    }

    fn row_specs(&self) -> Vec<RowSpec> {
        Vec::new()
    }

    fn activate(&mut self, _index: usize) -> Outcome {
        Outcome::Ignored
    }

    fn render(&self, frame: &mut UiFrame<'_>, viewport: Viewport) {
        let Some(rect) = self.surface.rect(viewport) else {
            return;
        };
        let Some(inner) = draw_frame(frame, rect, "Keyboard shortcuts") else {
            return;
        };
        for (i, line) in self.lines().into_iter().enumerate() {
            let Some(y) = line_y(inner, cell_count(i)) else {
                break;
            };
            match line {
                Line::Section(name) => {
                    frame.set_string(inner, inner.x + 1, y, name, theme::group_header())
                }
                Line::Entry(e) => {
                    let text = format!("  {:<KEYS_COLUMN$}{}", e.keys, e.description);
                    frame.set_string(inner, inner.x, y, &text, theme::overlay_style());
                }
                Line::Blank => {}
            }
        }
        if self.entries.is_empty() {
            frame.set_string(
                inner,
                inner.x + 1,
                inner.y,
                "No shortcuts",
                Style::default().fg(theme::muted_fg()),
            );
        }
    }
}

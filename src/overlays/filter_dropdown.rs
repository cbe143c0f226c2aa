use crossterm::event::KeyEvent;

use crate::content::FilterOption;
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

const MIN_WIDTH: u16 = 20;

/// Checkable options. Toggling keeps the dropdown open.
pub struct FilterDropdown {
    surface: AnchoredSurface,
    title: String,
    options: Vec<FilterOption>,
}

impl FilterDropdown {
    pub fn new(title: impl Into<String>, options: Vec<FilterOption>) -> Self {
        Self {
            surface: AnchoredSurface::new(OverlayId::Filter, Role::ListBox, Role::Option),
            title: title.into(),
            options,
        }
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }

    pub fn selected_ids(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.id.as_str())
            .collect()
    }

    pub fn set_options(&mut self, ctx: &mut OverlayContext<'_>, options: Vec<FilterOption>) {
        self.options = options;
        self.refresh(ctx);
    }

    fn toggle(&mut self, index: usize) -> Outcome {
        let Some(option) = self.options.get_mut(index) else {
            return Outcome::Ignored;
        };
        option.selected = !option.selected;
        tracing::debug!(option = %option.id, selected = option.selected, "filter toggled");
        Outcome::Toggled {
            id: option.id.clone(),
            selected: option.selected,
        }
    }
}

impl Overlay for FilterDropdown {
    fn surface(&self) -> &AnchoredSurface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut AnchoredSurface {
        &mut self.surface
    }

    fn desired_size(&self, _viewport: Viewport) -> Size {
        let widest = self
            .options
            .iter()
            .map(|o| cell_count(o.label.chars().count()).saturating_add(6))
            .max()
            .unwrap_or(0);
        Size::new(
            widest.max(MIN_WIDTH),
            cell_count(self.options.len()).max(1).saturating_add(2),
        )
    }

    fn row_specs(&self) -> Vec<RowSpec> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, o)| RowSpec::new(o.label.clone(), cell_count(i), 1))
            .collect()
    }

    fn handle_key(&mut self, ctx: &mut OverlayContext<'_>, key: &KeyEvent) -> Outcome {
        if ctx.bindings.matches(Action::ToggleOption, key) {
            return match self.surface.active() {
                Some(index) => self.toggle(index),
                None => Outcome::Handled,
            };
        }
        match self.surface.navigator_mut().handle_key(key, ctx.bindings) {
            NavOutcome::Ignored => Outcome::Ignored,
            NavOutcome::Commit(index) => self.activate(index),
            _ => Outcome::Handled,
        }
    }

    fn activate(&mut self, index: usize) -> Outcome {
        self.toggle(index)
    }

    fn render(&self, frame: &mut UiFrame<'_>, viewport: Viewport) {
        let Some(rect) = self.surface.rect(viewport) else {
            return;
        };
        let Some(inner) = draw_frame(frame, rect, &self.title) else {
            return;
        };
        let active = self.surface.active();
        for (i, option) in self.options.iter().enumerate() {
            let Some(y) = line_y(inner, cell_count(i)) else {
                break;
            };
            let style = if active == Some(i) {
                theme::active_row()
            } else {
                theme::overlay_style()
            };
            let text = format!(" {:<width$}", option.to_string(), width = inner.width as usize);
            frame.set_string(inner, inner.x, y, &text, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropdown() -> FilterDropdown {
        FilterDropdown::new(
            "Status",
            vec![FilterOption::new("open", "Open"), FilterOption::new("closed", "Closed")],
        )
    }

    #[test]
    fn huge_option_lists_saturate() {
        let options = (0..70_000)
            .map(|i| FilterOption::new(format!("o{i}"), "x"))
            .collect();
        let f = FilterDropdown::new("Status", options);
        assert_eq!(f.desired_size(Viewport::new(80, 24)).height, u16::MAX);
    }

    #[test]
    fn activate_toggles() {
        let mut f = dropdown();
        assert_eq!(
            f.activate(1),
            Outcome::Toggled {
                id: "closed".into(),
                selected: true
            }
        );
        assert_eq!(f.selected_ids(), vec!["closed"]);
        f.activate(1);
        assert!(f.selected_ids().is_empty());
        assert_eq!(f.activate(5), Outcome::Ignored);
    }

    #[test]
    fn size_covers_labels() {
        assert_eq!(dropdown().desired_size(Viewport::new(80, 24)), Size::new(20, 4));
    }
}

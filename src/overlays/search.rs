//! Live search results anchored to the header search input.
//!
//! The input keeps focus while the overlay is open; the host forwards typed
//! characters here and arrow/Enter keys to the roving navigator. Each edit
//! re-arms the debounce, and only a fired debounce refilters.

use std::time::{Duration, Instant};

use ratatui::style::Style;

use crate::content::{
    ResultItem, SearchSource, SelectHandler, group_in_display_order, group_starts,
};
use crate::coordinator::OverlayId;
use crate::document::{DocumentError, NodeId, Role};
use crate::geometry::{Size, Viewport};
use crate::overlays::{
    AnchoredSurface, Outcome, Overlay, OverlayContext, RowSpec, draw_frame, line_y,
};
use crate::theme;
use crate::timers::Debounce;
use crate::ui::UiFrame;

const WIDTH: u16 = 48;
const MAX_HEIGHT: u16 = 16;

pub struct SearchOverlay {
    surface: AnchoredSurface,
    source: Box<dyn SearchSource>,
    query: String,
    /// Query the current results were computed for.
    searched: String,
    results: Vec<ResultItem>,
    debounce: Debounce<String>,
    preselect_first: bool,
    on_select: Option<SelectHandler<ResultItem>>,
}

impl SearchOverlay {
    pub fn new(source: Box<dyn SearchSource>, debounce: Duration) -> Self {
        Self {
            surface: AnchoredSurface::new(OverlayId::Search, Role::ListBox, Role::Option),
            source,
            query: String::new(),
            searched: String::new(),
            results: Vec::new(),
            debounce: Debounce::new(debounce),
            preselect_first: true,
            on_select: None,
        }
    }

    /// Whether a fresh result set starts with its first item active.
    pub fn set_preselect_first(&mut self, enabled: bool) {
        self.preselect_first = enabled;
    }

    pub fn set_on_select(&mut self, handler: impl FnMut(&ResultItem) + 'static) {
        self.on_select = Some(Box::new(handler));
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[ResultItem] {
        &self.results
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn debounce_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn input_char(&mut self, c: char, now: Instant) {
        self.query.push(c);
        self.rearm(now);
    }

    pub fn backspace(&mut self, now: Instant) -> bool {
        let removed = self.query.pop().is_some();
        if removed {
            self.rearm(now);
        }
        removed
    }

    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        self.query = query.into();
        self.rearm(now);
    }

    fn rearm(&mut self, now: Instant) {
        if self.has_query() {
            self.debounce.arm(now, self.query.clone());
        } else {
            self.debounce.cancel();
            self.results.clear();
            self.searched.clear();
        }
    }

    /// Whether the stored results were computed for the current query.
    pub fn results_current(&self) -> bool {
        self.has_query() && self.searched == self.query
    }

    /// Drop any pending debounce and search for the current query now.
    pub fn search_now(&mut self, ctx: &mut OverlayContext<'_>) {
        self.debounce.cancel();
        let query = self.query.clone();
        self.apply_query(ctx, &query);
    }

    pub fn cancel_debounce(&mut self) -> bool {
        self.debounce.cancel().is_some()
    }

    /// Query whose debounce has elapsed.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<String> {
        let fired = self.debounce.poll(now)?;
        tracing::debug!(query = %fired, "search debounce fired");
        Some(fired)
    }

    /// Run the source for `query` and store grouped results. When open, the
    /// rows are rebuilt and the roving index starts over.
    pub fn apply_query(&mut self, ctx: &mut OverlayContext<'_>, query: &str) {
        self.results = group_in_display_order(self.source.search(query));
        self.searched = query.to_string();
        if self.is_open() {
            self.refresh(ctx);
            self.preselect();
        }
    }

    fn preselect(&mut self) {
        if self.preselect_first {
            self.surface.navigator_mut().move_first();
        }
    }

    /// Display line of each result, accounting for group headers.
    fn result_lines(&self) -> Vec<u16> {
        let starts = group_starts(&self.results);
        let mut line = 0u16;
        let mut out = Vec::with_capacity(self.results.len());
        for i in 0..self.results.len() {
            if starts.contains(&i) {
                line += 1;
            }
            out.push(line);
            line += 1;
        }
        out
    }

    pub fn empty_text(&self) -> String {
        format!("No results for \"{}\"", self.searched)
    }
}

impl Overlay for SearchOverlay {
    fn surface(&self) -> &AnchoredSurface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut AnchoredSurface {
        &mut self.surface
    }

    fn desired_size(&self, _viewport: Viewport) -> Size {
        let lines = self
            .result_lines()
            .last()
            .map_or(1, |last| last.saturating_add(1));
        Size::new(WIDTH, lines.saturating_add(2).min(MAX_HEIGHT))
    }

    fn row_specs(&self) -> Vec<RowSpec> {
        self.results
            .iter()
            .zip(self.result_lines())
            .map(|(item, line)| RowSpec::new(item.label.clone(), line, 1))
            .collect()
    }

    fn open(
        &mut self,
        ctx: &mut OverlayContext<'_>,
        trigger: Option<NodeId>,
    ) -> Result<bool, DocumentError> {
        let size = self.desired_size(ctx.doc.viewport());
        let rows = self.row_specs();
        let opened = self.surface.open(ctx, trigger, size, &rows)?;
        if opened {
            self.preselect();
        }
        Ok(opened)
    }

    fn close(&mut self, ctx: &mut OverlayContext<'_>) -> bool {
        self.debounce.cancel();
        self.surface.close(ctx)
    }

    fn activate(&mut self, index: usize) -> Outcome {
        let Some(item) = self.results.get(index).cloned() else {
            return Outcome::Ignored;
        };
        if let Some(handler) = self.on_select.as_mut() {
            handler(&item);
        }
        Outcome::Commit(item.id)
    }

    fn render(&self, frame: &mut UiFrame<'_>, viewport: Viewport) {
        let Some(rect) = self.surface.rect(viewport) else {
            return;
        };
        let Some(inner) = draw_frame(frame, rect, "Search") else {
            return;
        };
        if self.results.is_empty() {
            frame.set_string(
                inner,
                inner.x + 1,
                inner.y,
                &self.empty_text(),
                Style::default().fg(theme::muted_fg()),
            );
            return;
        }
        let active = self.surface.active();
        let starts = group_starts(&self.results);
        for ((i, item), line) in self.results.iter().enumerate().zip(self.result_lines()) {
            if starts.contains(&i)
                && let Some(y) = line.checked_sub(1).and_then(|l| line_y(inner, l))
            {
                frame.set_string(inner, inner.x, y, &item.group, theme::group_header());
            }
            let Some(y) = line_y(inner, line) else {
                break;
            };
            let style = if active == Some(i) {
                theme::active_row()
            } else {
                theme::overlay_style()
            };
            let label = if item.icon.is_empty() {
                format!("  {}", item.label)
            } else {
                format!("  {} {}", item.icon, item.label)
            };
            let text = format!("{label:<width$}", width = inner.width as usize);
            frame.set_string(inner, inner.x, y, &text, style);
        }
    }
}

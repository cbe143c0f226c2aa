//! The page the overlays are anchored to.
//!
//! `Dashboard` is the trigger collaborator: it creates the header controls
//! (search input, filter button, notification bell, avatar), the collapsible
//! sidebar, the scrollable body and the log-tail panel as document nodes,
//! binds the triggers on the host and lays them out for the current
//! viewport. It also reacts to [`HostEvent`]s and draws the page chrome
//! underneath the portal layer.

use ratatui::layout::Rect as CellRect;
use ratatui::style::{Modifier, Style};

use crate::coordinator::OverlayId;
use crate::document::{DocumentError, NodeId, Role};
use crate::event_loop::ControlFlow;
use crate::geometry::Rect;
use crate::host::{HostEvent, OverlayHost};
use crate::log_buffer::LogHandle;
use crate::overlays::Overlay;
use crate::theme;
use crate::ui::UiFrame;

const SIDEBAR_WIDTH: u16 = 18;
const SIDEBAR_COLLAPSED_WIDTH: u16 = 3;
const LOG_PANEL_HEIGHT: u16 = 6;
const SEARCH_WIDTH: u16 = 28;
const BODY_ROWS: usize = 80;
const SIDEBAR_ITEMS: [&str; 4] = ["Overview", "Projects", "Team", "Settings"];

pub struct Dashboard {
    search_input: NodeId,
    filter_button: NodeId,
    bell: NodeId,
    avatar: NodeId,
    sidebar: NodeId,
    body: NodeId,
    log_panel: NodeId,
    log: LogHandle,
    log_lines: Vec<String>,
    body_lines: Vec<String>,
    status: String,
}

impl Dashboard {
    /// Create the page nodes under the document root and bind the triggers.
    pub fn mount(host: &mut OverlayHost, log: LogHandle) -> Result<Self, DocumentError> {
        let doc = host.document_mut();
        let root = doc.root();
        let header = doc.append_new(root, Role::Region, "header", None)?;
        let search_input = doc.append_new(header, Role::TextInput, "search", None)?;
        let filter_button = doc.append_new(header, Role::Button, "[Filter]", None)?;
        let bell = doc.append_new(header, Role::Button, "notifications", None)?;
        let avatar = doc.append_new(header, Role::Button, "account", None)?;
        let sidebar = doc.append_new(root, Role::Region, "sidebar", None)?;
        let body = doc.append_new(root, Role::Region, "body", None)?;
        let log_panel = doc.append_new(root, Role::Region, "log", None)?;

        host.bind_trigger(OverlayId::Search, search_input);
        host.bind_trigger(OverlayId::Filter, filter_button);
        host.bind_trigger(OverlayId::Notifications, bell);
        host.bind_trigger(OverlayId::AccountMenu, avatar);

        let body_lines = (1..=BODY_ROWS)
            .map(|i| format!("Activity item {i:>3}"))
            .collect();
        let mut dashboard = Self {
            search_input,
            filter_button,
            bell,
            avatar,
            sidebar,
            body,
            log_panel,
            log,
            log_lines: Vec::new(),
            body_lines,
            status: String::new(),
        };
        dashboard.layout(host);
        Ok(dashboard)
    }

    pub fn search_input(&self) -> NodeId {
        self.search_input
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn bell_label(host: &OverlayHost) -> String {
        match host.overlays().notifications.unread_count() {
            0 => "[!]".to_string(),
            n => format!("[! {n}]"),
        }
    }

    fn avatar_label(host: &OverlayHost) -> String {
        format!("[@{}]", host.overlays().account.user())
    }

    /// Place every page node for the current viewport and sidebar state,
    /// then move the open overlay after its trigger.
    pub fn layout(&mut self, host: &mut OverlayHost) {
        let vp = host.document().viewport();
        let collapsed = host.state().sidebar_collapsed();
        let bell_label = Self::bell_label(host);
        let avatar_label = Self::avatar_label(host);
        let width = i32::from(vp.width);
        let height = vp.height;

        let avatar_w = avatar_label.chars().count() as u16;
        let bell_w = bell_label.chars().count() as u16;
        let avatar_x = width - i32::from(avatar_w) - 1;
        let bell_x = avatar_x - i32::from(bell_w) - 1;
        let search_w = SEARCH_WIDTH.min(vp.width / 3);

        let sidebar_w = if collapsed {
            SIDEBAR_COLLAPSED_WIDTH
        } else {
            SIDEBAR_WIDTH
        }
        .min(vp.width);
        let log_h = LOG_PANEL_HEIGHT.min(height.saturating_sub(2));
        let main_h = height.saturating_sub(1).saturating_sub(log_h);

        let doc = host.document_mut();
        doc.set_label(self.bell, bell_label);
        doc.set_label(self.avatar, avatar_label);
        doc.set_rect(self.search_input, Rect::new(1, 0, search_w, 1));
        doc.set_rect(
            self.filter_button,
            Rect::new(i32::from(search_w) + 2, 0, 8, 1),
        );
        doc.set_rect(self.bell, Rect::new(bell_x, 0, bell_w, 1));
        doc.set_rect(self.avatar, Rect::new(avatar_x, 0, avatar_w, 1));
        doc.set_rect(self.sidebar, Rect::new(0, 1, sidebar_w, main_h));
        doc.set_rect(
            self.body,
            Rect::new(
                i32::from(sidebar_w),
                1,
                vp.width.saturating_sub(sidebar_w),
                main_h,
            ),
        );
        doc.set_rect(
            self.log_panel,
            Rect::new(0, i32::from(1 + main_h), vp.width, log_h),
        );
        let extent = self.body_lines.len() as i32 - i32::from(main_h);
        doc.set_scroll_extent(extent.max(0));
        host.reposition();
    }

    /// React to what the host reported.
    pub fn apply(&mut self, host: &mut OverlayHost, events: &[HostEvent]) -> ControlFlow {
        let mut flow = ControlFlow::Continue;
        for event in events {
            match event {
                HostEvent::Selected { overlay, item_id } => {
                    self.status = format!("{overlay}: {item_id}");
                }
                HostEvent::FilterChanged {
                    option_id,
                    selected,
                } => {
                    let verb = if *selected { "on" } else { "off" };
                    self.status = format!("filter {option_id} {verb}");
                }
                HostEvent::LogTailDue => self.refresh_log(),
                HostEvent::Quit => flow = ControlFlow::Quit,
                HostEvent::SidebarToggled { .. }
                | HostEvent::Opened(_)
                | HostEvent::Closed { .. } => {}
            }
        }
        if host.state_mut().take_sidebar_change().is_some()
            || host.document().label(self.bell) != Some(Self::bell_label(host).as_str())
        {
            self.layout(host);
        }
        flow
    }

    pub fn refresh_log(&mut self) {
        self.log_lines = self.log.tail(usize::from(LOG_PANEL_HEIGHT));
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log_lines
    }

    fn cells(host: &OverlayHost, node: NodeId) -> Option<CellRect> {
        let rect = host.document().bounding_rect(node).ok()?;
        (!rect.is_empty()).then(|| rect.to_cells())
    }

    fn control_style(host: &OverlayHost, node: NodeId) -> Style {
        let style = Style::default().fg(theme::header_fg()).bg(theme::header_bg());
        if host.document().focused() == Some(node) {
            style
                .fg(theme::focus_border())
                .add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Draw the page, then the open overlay on top.
    pub fn render(&self, host: &OverlayHost, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        let header = CellRect::new(area.x, area.y, area.width, 1.min(area.height));
        let header_style = Style::default().fg(theme::header_fg()).bg(theme::header_bg());
        frame.set_string(
            header,
            header.x,
            header.y,
            &" ".repeat(usize::from(header.width)),
            header_style,
        );

        if let Some(rect) = Self::cells(host, self.search_input) {
            let query = host.overlays().search.query();
            let (text, fg) = if query.is_empty() {
                ("/ Search".to_string(), theme::muted_fg())
            } else {
                (query.to_string(), theme::header_fg())
            };
            let mut style = Self::control_style(host, self.search_input).bg(theme::input_bg());
            if query.is_empty() {
                style = style.fg(fg);
            }
            let text = format!("{text:<width$}", width = usize::from(rect.width));
            frame.set_string(rect, rect.x, rect.y, &text, style);
        }
        for node in [self.filter_button, self.avatar] {
            if let (Some(rect), Some(label)) =
                (Self::cells(host, node), host.document().label(node))
            {
                frame.set_string(rect, rect.x, rect.y, label, Self::control_style(host, node));
            }
        }
        if let (Some(rect), Some(label)) =
            (Self::cells(host, self.bell), host.document().label(self.bell))
        {
            let mut style = Self::control_style(host, self.bell);
            if host.overlays().notifications.unread_count() > 0 {
                style = style.fg(theme::badge_fg()).bg(theme::badge_bg());
            }
            frame.set_string(rect, rect.x, rect.y, label, style);
        }

        self.render_sidebar(host, frame);
        self.render_body(host, frame);
        self.render_log(host, frame);
        host.render(frame);
    }

    fn render_sidebar(&self, host: &OverlayHost, frame: &mut UiFrame<'_>) {
        let Some(rect) = Self::cells(host, self.sidebar) else {
            return;
        };
        let collapsed = host.state().sidebar_collapsed();
        let style = Style::default().fg(theme::sidebar_fg());
        for (i, item) in SIDEBAR_ITEMS.iter().enumerate() {
            let y = rect.y + 1 + i as u16;
            if y >= rect.bottom() {
                break;
            }
            let text = if collapsed {
                item.chars().take(1).collect::<String>()
            } else {
                (*item).to_string()
            };
            frame.set_string(rect, rect.x + 1, y, &text, style);
        }
    }

    fn render_body(&self, host: &OverlayHost, frame: &mut UiFrame<'_>) {
        let Some(rect) = Self::cells(host, self.body) else {
            return;
        };
        let filters = host.overlays().filter.selected_ids();
        let heading = if filters.is_empty() {
            "All activity".to_string()
        } else {
            format!("Activity ({})", filters.join(", "))
        };
        frame.set_string(
            rect,
            rect.x + 1,
            rect.y,
            &heading,
            Style::default().fg(theme::accent()).add_modifier(Modifier::BOLD),
        );
        let skip = usize::try_from(host.document().scroll_y()).unwrap_or(0);
        let rows = rect.height.saturating_sub(2);
        for (i, line) in self.body_lines.iter().skip(skip).take(usize::from(rows)).enumerate() {
            frame.set_string(rect, rect.x + 1, rect.y + 1 + i as u16, line, Style::default());
        }
        if !self.status.is_empty() && rect.height > 1 {
            frame.set_string(
                rect,
                rect.x + 1,
                rect.bottom() - 1,
                &self.status,
                Style::default().fg(theme::accent_alt()),
            );
        }
    }

    fn render_log(&self, host: &OverlayHost, frame: &mut UiFrame<'_>) {
        let Some(rect) = Self::cells(host, self.log_panel) else {
            return;
        };
        let polling = if host.state().polling() { "tail" } else { "paused" };
        frame.set_string(
            rect,
            rect.x,
            rect.y,
            &format!("-- log ({polling}) "),
            Style::default().fg(theme::muted_fg()),
        );
        let last = self.log_lines.len().saturating_sub(1);
        for (i, line) in self.log_lines.iter().enumerate() {
            let y = rect.y + 1 + i as u16;
            if y >= rect.bottom() {
                break;
            }
            let fg = if i == last {
                theme::log_highlight()
            } else {
                theme::muted_fg()
            };
            frame.set_string(rect, rect.x, y, line, Style::default().fg(fg));
        }
    }

    /// Whether the open overlay, if any, is the one anchored to `node`.
    pub fn is_anchor_of_open(&self, host: &OverlayHost, node: NodeId) -> bool {
        host.open_overlay()
            .is_some_and(|id| host.overlays().get(id).surface().trigger() == Some(node))
    }
}

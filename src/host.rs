//! The overlay engine.
//!
//! `OverlayHost` owns the document, the portal, focus hand-off, the
//! mutual-exclusion coordinator and every overlay instance. Input arrives as
//! [`DocEvent`]s; the host dispatches them to the document (which evaluates
//! dismissal listeners), closes whatever was dismissed, then routes the
//! event to the open overlay, the global keyboard surface or the search
//! input. Each entry point ends by flushing deferred focus restoration.

use std::collections::BTreeMap;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::EngineConfig;
use crate::content::{FilterOption, Notification, SearchSource};
use crate::coordinator::{OverlayCoordinator, OverlayId};
use crate::dismissal::DismissReason;
use crate::document::{DocEvent, Document, NodeId};
use crate::focus::FocusManager;
use crate::geometry::Viewport;
use crate::keybindings::{Action, KeyBindings};
use crate::overlays::{
    AccountMenu, FilterDropdown, KeyboardShortcutsModal, NotificationDropdown, Outcome, Overlay,
    OverlayContext, SearchOverlay,
};
use crate::portal::PortalHost;
use crate::state::DashboardState;
use crate::timers::Interval;
use crate::ui::UiFrame;

/// Why an overlay closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Dismissed(DismissReason),
    /// An item was selected.
    Committed,
    /// Another overlay opened.
    Replaced,
    /// Programmatic close, toggle, or the global Escape binding.
    Requested,
}

/// Notifications for the embedding application (routing collaborator,
/// page layout, log tail).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Opened(OverlayId),
    Closed {
        overlay: OverlayId,
        reason: CloseReason,
    },
    Selected {
        overlay: OverlayId,
        item_id: String,
    },
    FilterChanged {
        option_id: String,
        selected: bool,
    },
    SidebarToggled {
        collapsed: bool,
    },
    LogTailDue,
    Quit,
}

pub struct Overlays {
    pub search: SearchOverlay,
    pub account: AccountMenu,
    pub notifications: NotificationDropdown,
    pub shortcuts: KeyboardShortcutsModal,
    pub filter: FilterDropdown,
}

impl Overlays {
    pub fn new(
        config: &EngineConfig,
        bindings: &KeyBindings,
        source: Box<dyn SearchSource>,
    ) -> Self {
        let mut search = SearchOverlay::new(source, config.debounce);
        search.set_preselect_first(config.search_preselect_first);
        Self {
            search,
            account: AccountMenu::new("you"),
            notifications: NotificationDropdown::new(Vec::new()),
            shortcuts: KeyboardShortcutsModal::new(bindings.shortcut_entries()),
            filter: FilterDropdown::new("Filter", Vec::new()),
        }
    }

    pub fn get(&self, id: OverlayId) -> &dyn Overlay {
        match id {
            OverlayId::Search => &self.search,
            OverlayId::AccountMenu => &self.account,
            OverlayId::Notifications => &self.notifications,
            OverlayId::Shortcuts => &self.shortcuts,
            OverlayId::Filter => &self.filter,
        }
    }

    pub fn get_mut(&mut self, id: OverlayId) -> &mut dyn Overlay {
        match id {
            OverlayId::Search => &mut self.search,
            OverlayId::AccountMenu => &mut self.account,
            OverlayId::Notifications => &mut self.notifications,
            OverlayId::Shortcuts => &mut self.shortcuts,
            OverlayId::Filter => &mut self.filter,
        }
    }
}

pub struct OverlayHost {
    doc: Document,
    portal: PortalHost,
    focus: FocusManager,
    coordinator: OverlayCoordinator,
    config: EngineConfig,
    bindings: KeyBindings,
    overlays: Overlays,
    triggers: BTreeMap<OverlayId, NodeId>,
    state: DashboardState,
    log_tail: Interval,
}

impl OverlayHost {
    pub fn new(config: EngineConfig, viewport: Viewport, source: Box<dyn SearchSource>) -> Self {
        let bindings = KeyBindings::default();
        let overlays = Overlays::new(&config, &bindings, source);
        let log_tail = Interval::new(config.poll_interval);
        Self {
            doc: Document::new(viewport),
            portal: PortalHost::new(),
            focus: FocusManager::new(),
            coordinator: OverlayCoordinator::new(),
            config,
            bindings,
            overlays,
            triggers: BTreeMap::new(),
            state: DashboardState::new(),
            log_tail,
        }
    }

    fn parts(&mut self) -> (OverlayContext<'_>, &mut Overlays) {
        (
            OverlayContext {
                doc: &mut self.doc,
                portal: &mut self.portal,
                focus: &mut self.focus,
                config: &self.config,
                bindings: &self.bindings,
            },
            &mut self.overlays,
        )
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Trigger collaborators create and lay out their nodes through this.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.overlays
            .shortcuts
            .set_entries(bindings.shortcut_entries());
        self.bindings = bindings;
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DashboardState {
        &mut self.state
    }

    pub fn portal(&self) -> &PortalHost {
        &self.portal
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut Overlays {
        &mut self.overlays
    }

    pub fn listener_count(&self) -> usize {
        self.doc.listeners().listener_count()
    }

    pub fn open_overlay(&self) -> Option<OverlayId> {
        self.coordinator.open()
    }

    pub fn is_open(&self, id: OverlayId) -> bool {
        self.overlays.get(id).is_open()
    }

    /// Register `node` as the trigger of `id`. The search trigger is the
    /// search input itself.
    pub fn bind_trigger(&mut self, id: OverlayId, node: NodeId) {
        self.triggers.insert(id, node);
    }

    pub fn trigger(&self, id: OverlayId) -> Option<NodeId> {
        self.triggers.get(&id).copied()
    }

    pub fn set_notifications(&mut self, items: Vec<Notification>) {
        let (mut ctx, overlays) = self.parts();
        overlays.notifications.set_notifications(&mut ctx, items);
    }

    pub fn set_filter_options(&mut self, options: Vec<FilterOption>) {
        let (mut ctx, overlays) = self.parts();
        overlays.filter.set_options(&mut ctx, options);
    }

    pub fn open(&mut self, id: OverlayId) -> Vec<HostEvent> {
        let mut events = Vec::new();
        self.open_inner(id, &mut events);
        self.flush_focus();
        events
    }

    pub fn close(&mut self, id: OverlayId) -> Vec<HostEvent> {
        let mut events = Vec::new();
        self.close_inner(id, CloseReason::Requested, &mut events);
        self.flush_focus();
        events
    }

    pub fn toggle(&mut self, id: OverlayId) -> Vec<HostEvent> {
        let mut events = Vec::new();
        self.toggle_inner(id, &mut events);
        self.flush_focus();
        events
    }

    /// Start the periodic log-tail refresh if polling is enabled.
    pub fn start(&mut self, now: Instant) {
        if self.state.polling() {
            self.log_tail.start(now);
        }
    }

    pub fn set_polling(&mut self, enabled: bool, now: Instant) {
        self.state.set_polling(enabled);
        if enabled {
            self.log_tail.start(now);
        } else {
            self.log_tail.stop();
        }
        tracing::debug!(enabled, "log tail polling");
    }

    pub fn log_tail_running(&self) -> bool {
        self.log_tail.is_running()
    }

    pub fn handle_event(&mut self, event: DocEvent, now: Instant) -> Vec<HostEvent> {
        let mut events = Vec::new();
        let dispatched = self.doc.dispatch(&event);
        for request in &dispatched.dismissals {
            tracing::debug!(overlay = %request.owner, reason = ?request.reason, "dismissing overlay");
            self.close_inner(
                request.owner,
                CloseReason::Dismissed(request.reason),
                &mut events,
            );
        }
        match event {
            DocEvent::PointerDown { .. } => self.pointer_down(dispatched.target, &mut events),
            DocEvent::PointerMove { .. } => self.pointer_move(dispatched.target),
            DocEvent::KeyDown(key) => self.key_down(key, now, &mut events),
            DocEvent::Scroll { .. } => {}
        }
        self.flush_focus();
        events
    }

    /// Fire due timers: the search debounce and the log-tail interval.
    pub fn tick(&mut self, now: Instant) -> Vec<HostEvent> {
        let mut events = Vec::new();
        if let Some(query) = self.overlays.search.poll_debounce(now) {
            let (mut ctx, overlays) = self.parts();
            overlays.search.apply_query(&mut ctx, &query);
            if !self.overlays.search.is_open() && self.search_input_focused() {
                self.open_inner(OverlayId::Search, &mut events);
            }
        }
        if self.log_tail.poll(now) {
            events.push(HostEvent::LogTailDue);
        }
        self.flush_focus();
        events
    }

    /// The viewport changed size. The open overlay is placed again against
    /// the new bounds; collaborators that move triggers afterwards call
    /// [`Self::reposition`] once their own layout is done.
    pub fn resize(&mut self, viewport: Viewport) {
        self.doc.set_viewport(viewport);
        self.reposition();
    }

    pub fn reposition(&mut self) {
        if let Some(open) = self.coordinator.open() {
            let (mut ctx, overlays) = self.parts();
            overlays.get_mut(open).reposition(&mut ctx);
        }
    }

    pub fn render(&self, frame: &mut UiFrame<'_>) {
        if let Some(open) = self.coordinator.open() {
            self.overlays.get(open).render(frame, self.doc.viewport());
        }
    }

    /// Tear down: close everything, cancel timers and release the portal.
    pub fn unmount(&mut self) -> Vec<HostEvent> {
        let mut events = Vec::new();
        for id in OverlayId::ALL {
            self.close_inner(id, CloseReason::Requested, &mut events);
        }
        self.overlays.search.cancel_debounce();
        self.log_tail.stop();
        self.focus.cancel_pending();
        self.portal.release(&mut self.doc);
        tracing::debug!("overlay host unmounted");
        events
    }

    fn flush_focus(&mut self) {
        self.focus.flush(&mut self.doc);
    }

    fn search_input_focused(&self) -> bool {
        self.trigger(OverlayId::Search)
            .is_some_and(|input| self.doc.focused() == Some(input))
    }

    fn open_inner(&mut self, id: OverlayId, events: &mut Vec<HostEvent>) {
        if self.overlays.get(id).is_open() {
            return;
        }
        if let Some(previous) = self.coordinator.request_open(id) {
            self.close_inner(previous, CloseReason::Replaced, events);
        }
        let trigger = self.trigger(id).or_else(|| self.doc.focused());
        let (mut ctx, overlays) = self.parts();
        match overlays.get_mut(id).open(&mut ctx, trigger) {
            Ok(true) => events.push(HostEvent::Opened(id)),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(overlay = %id, %err, "overlay failed to open");
                self.coordinator.closed(id);
            }
        }
    }

    fn close_inner(&mut self, id: OverlayId, reason: CloseReason, events: &mut Vec<HostEvent>) {
        let (mut ctx, overlays) = self.parts();
        if overlays.get_mut(id).close(&mut ctx) {
            self.coordinator.closed(id);
            events.push(HostEvent::Closed {
                overlay: id,
                reason,
            });
        }
    }

    fn toggle_inner(&mut self, id: OverlayId, events: &mut Vec<HostEvent>) {
        if self.overlays.get(id).is_open() {
            self.close_inner(id, CloseReason::Requested, events);
        } else {
            self.open_inner(id, events);
        }
    }

    fn apply_outcome(&mut self, id: OverlayId, outcome: Outcome, events: &mut Vec<HostEvent>) {
        match outcome {
            Outcome::Commit(item_id) => {
                events.push(HostEvent::Selected {
                    overlay: id,
                    item_id,
                });
                self.close_inner(id, CloseReason::Committed, events);
            }
            Outcome::Toggled {
                id: option_id,
                selected,
            } => events.push(HostEvent::FilterChanged {
                option_id,
                selected,
            }),
            Outcome::Handled | Outcome::Ignored => {}
        }
    }

    /// The open overlay whose subtree contains `target`.
    fn overlay_containing(&self, target: NodeId) -> Option<OverlayId> {
        let open = self.coordinator.open()?;
        let root = self.overlays.get(open).surface().root()?;
        self.doc.contains(root, target).then_some(open)
    }

    fn pointer_down(&mut self, target: Option<NodeId>, events: &mut Vec<HostEvent>) {
        let Some(target) = target else {
            return;
        };
        if let Some(open) = self.overlay_containing(target) {
            let outcome = self.overlays.get_mut(open).pointer_down(&self.doc, target);
            self.apply_outcome(open, outcome, events);
            return;
        }
        if self.doc.is_focusable(target)
            && let Err(err) = self.doc.focus(target)
        {
            tracing::debug!(%err, "clicked node did not take focus");
        }
        let owner = self
            .triggers
            .iter()
            .find(|(_, node)| self.doc.contains(**node, target))
            .map(|(id, _)| *id);
        match owner {
            Some(OverlayId::Search) => {
                if !self.overlays.search.has_query() {
                    return;
                }
                if !self.overlays.search.results_current() {
                    let (mut ctx, overlays) = self.parts();
                    overlays.search.search_now(&mut ctx);
                }
                self.open_inner(OverlayId::Search, events);
            }
            Some(id) => self.toggle_inner(id, events),
            None => {}
        }
    }

    fn pointer_move(&mut self, target: Option<NodeId>) {
        if let Some(target) = target
            && let Some(open) = self.overlay_containing(target)
        {
            self.overlays.get_mut(open).pointer_move(&self.doc, target);
        }
    }

    fn key_down(&mut self, key: KeyEvent, now: Instant, events: &mut Vec<HostEvent>) {
        if let Some(open) = self.coordinator.open() {
            let (mut ctx, overlays) = self.parts();
            let outcome = overlays.get_mut(open).handle_key(&mut ctx, &key);
            if outcome != Outcome::Ignored {
                self.apply_outcome(open, outcome, events);
                return;
            }
        }
        let in_text_input = self.doc.focus_in_text_input();
        let typing_in_search = self.search_input_focused();
        if typing_in_search
            && self.bindings.matches(Action::DismissOverlay, &key)
            && self.overlays.search.cancel_debounce()
        {
            tracing::debug!("pending search cancelled");
        }
        if let Some(action) = self.bindings.global_action(&key, in_text_input)
            && !(typing_in_search && action == Action::FocusSearch)
        {
            self.run_global(action, now, events);
            return;
        }
        if typing_in_search {
            self.edit_query(&key, now, events);
        }
    }

    fn run_global(&mut self, action: Action, now: Instant, events: &mut Vec<HostEvent>) {
        tracing::debug!(%action, "global shortcut");
        match action {
            Action::FocusSearch => {
                if let Some(open) = self.coordinator.open()
                    && open != OverlayId::Search
                {
                    self.close_inner(open, CloseReason::Requested, events);
                }
                self.focus.cancel_pending();
                if let Some(input) = self.trigger(OverlayId::Search)
                    && let Err(err) = self.doc.focus(input)
                {
                    tracing::warn!(%err, "search input cannot take focus");
                }
            }
            Action::DismissOverlay => {
                if let Some(open) = self.coordinator.open() {
                    self.close_inner(open, CloseReason::Requested, events);
                }
            }
            Action::ToggleShortcuts => self.toggle_inner(OverlayId::Shortcuts, events),
            Action::ToggleSidebar => {
                let collapsed = self.state.toggle_sidebar();
                events.push(HostEvent::SidebarToggled { collapsed });
            }
            Action::TogglePolling => {
                let enabled = !self.state.polling();
                self.set_polling(enabled, now);
            }
            Action::Quit => events.push(HostEvent::Quit),
            _ => {}
        }
    }

    fn edit_query(&mut self, key: &KeyEvent, now: Instant, events: &mut Vec<HostEvent>) {
        let search = &mut self.overlays.search;
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER) =>
            {
                search.input_char(c, now);
            }
            KeyCode::Backspace => {
                search.backspace(now);
            }
            _ => return,
        }
        if !self.overlays.search.has_query() {
            self.close_inner(OverlayId::Search, CloseReason::Requested, events);
        }
    }
}

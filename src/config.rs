//! Engine configuration.
//!
//! `EngineConfig::default()` carries the browser-pixel constants the overlay
//! contract is written against. Terminal front-ends use
//! [`EngineConfig::terminal`], which scales the same contract down to cells.

use std::time::Duration;

use crate::constants::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_GAP, DEFAULT_MARGIN, DEFAULT_POLL_MS, DEFAULT_SCROLL_THRESHOLD,
};
use crate::coordinator::OverlayId;
use crate::navigator::NavigationPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub margin: u16,
    pub gap: u16,
    pub scroll_threshold: u16,
    pub debounce: Duration,
    pub poll_interval: Duration,
    pub search_navigation: NavigationPolicy,
    pub menu_navigation: NavigationPolicy,
    pub list_navigation: NavigationPolicy,
    /// Move focus into menus (account menu, filter dropdown) when they open.
    pub autofocus_menus: bool,
    /// Start each fresh search result set with its first item active.
    pub search_preselect_first: bool,
}

impl EngineConfig {
    /// Preset for terminal cells: one cell of inset, no gap, and a scroll
    /// threshold of a few rows.
    pub fn terminal() -> Self {
        Self {
            margin: 1,
            gap: 0,
            scroll_threshold: 3,
            ..Self::default()
        }
    }

    /// Roving navigation policy used by the given overlay.
    pub fn navigation(&self, id: OverlayId) -> NavigationPolicy {
        match id {
            OverlayId::Search => self.search_navigation,
            OverlayId::AccountMenu => self.menu_navigation,
            OverlayId::Notifications | OverlayId::Filter | OverlayId::Shortcuts => {
                self.list_navigation
            }
        }
    }

    /// Whether opening the overlay should move focus into it.
    ///
    /// The search overlay never steals focus: its trigger is the input the
    /// user keeps typing into.
    pub fn autofocus(&self, id: OverlayId) -> bool {
        match id {
            OverlayId::Search => false,
            OverlayId::AccountMenu | OverlayId::Filter => self.autofocus_menus,
            OverlayId::Notifications | OverlayId::Shortcuts => true,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            gap: DEFAULT_GAP,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            search_navigation: NavigationPolicy::Clamp,
            menu_navigation: NavigationPolicy::Wrap,
            list_navigation: NavigationPolicy::Clamp,
            autofocus_menus: true,
            search_preselect_first: true,
        }
    }
}

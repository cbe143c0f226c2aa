use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::content::ShortcutEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    // Global keyboard surface
    FocusSearch,
    DismissOverlay,
    ToggleShortcuts,
    ToggleSidebar,
    TogglePolling,
    // Roving list navigation
    NavUp,
    NavDown,
    NavFirst,
    NavLast,
    Select,
    // Overlay specific
    ToggleOption,
    MarkAllRead,
}

impl Action {
    pub const ALL: [Action; 13] = [
        Action::FocusSearch,
        Action::DismissOverlay,
        Action::ToggleShortcuts,
        Action::ToggleSidebar,
        Action::TogglePolling,
        Action::Quit,
        Action::NavUp,
        Action::NavDown,
        Action::NavFirst,
        Action::NavLast,
        Action::Select,
        Action::ToggleOption,
        Action::MarkAllRead,
    ];

    /// Document-level bindings, checked in this order.
    pub const GLOBAL: [Action; 6] = [
        Action::DismissOverlay,
        Action::FocusSearch,
        Action::ToggleShortcuts,
        Action::ToggleSidebar,
        Action::TogglePolling,
        Action::Quit,
    ];

    /// Global bindings that still fire while a text input has focus.
    pub const fn allowed_in_text_input(self) -> bool {
        matches!(
            self,
            Action::FocusSearch | Action::DismissOverlay | Action::Quit
        )
    }

    pub const fn section(self) -> &'static str {
        match self {
            Action::Quit
            | Action::FocusSearch
            | Action::DismissOverlay
            | Action::ToggleShortcuts
            | Action::ToggleSidebar
            | Action::TogglePolling => "Global",
            Action::NavUp
            | Action::NavDown
            | Action::NavFirst
            | Action::NavLast
            | Action::Select => "Lists",
            Action::ToggleOption | Action::MarkAllRead => "Menus",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::FocusSearch => "Focus search",
            Action::DismissOverlay => "Close the open overlay",
            Action::ToggleShortcuts => "Show keyboard shortcuts",
            Action::ToggleSidebar => "Collapse / expand sidebar",
            Action::TogglePolling => "Pause / resume the log tail",
            Action::NavUp => "Previous item",
            Action::NavDown => "Next item",
            Action::NavFirst => "First item",
            Action::NavLast => "Last item",
            Action::Select => "Open selected item",
            Action::ToggleOption => "Toggle filter option",
            Action::MarkAllRead => "Mark all notifications read",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::SUPER) {
            parts.push("Cmd".to_string());
        }
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    /// Resolve a document-level shortcut. Bindings other than `/`, `Escape`
    /// and quit are suppressed while a text input has focus.
    pub fn global_action(&self, key: &KeyEvent, in_text_input: bool) -> Option<Action> {
        Action::GLOBAL
            .into_iter()
            .filter(|action| !in_text_input || action.allowed_in_text_input())
            .find(|action| self.matches(*action, key))
    }

    /// Return the display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }

    /// Return the first `KeyCombo` mapped to `action`, if any.
    pub fn first_combo(&self, action: Action) -> Option<KeyCombo> {
        self.map.get(&action).and_then(|list| list.first().cloned())
    }

    /// Rows for the keyboard shortcuts modal, in `Action::ALL` order.
    pub fn shortcut_entries(&self) -> Vec<ShortcutEntry> {
        Action::ALL
            .into_iter()
            .filter_map(|action| {
                let combos = self.combos_for(action);
                (!combos.is_empty()).then(|| ShortcutEntry {
                    keys: combos.join(" / "),
                    description: action.to_string(),
                    section: action.section().to_string(),
                })
            })
            .collect()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let none = KeyModifiers::NONE;
        let mut kb = Self::new();
        kb.add(
            Quit,
            KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        kb.add(FocusSearch, KeyCombo::new(KeyCode::Char('/'), none));
        kb.add(DismissOverlay, KeyCombo::new(KeyCode::Esc, none));
        // The normalizer folds Shift+/ into '?' and keeps the modifiers.
        kb.add(
            ToggleShortcuts,
            KeyCombo::new(
                KeyCode::Char('?'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT,
            ),
        );
        kb.add(
            ToggleShortcuts,
            KeyCombo::new(
                KeyCode::Char('?'),
                KeyModifiers::SUPER | KeyModifiers::SHIFT,
            ),
        );
        kb.add(ToggleSidebar, KeyCombo::new(KeyCode::Char('c'), none));
        kb.add(
            ToggleSidebar,
            KeyCombo::new(KeyCode::Char('C'), KeyModifiers::SHIFT),
        );
        kb.add(TogglePolling, KeyCombo::new(KeyCode::Char('p'), none));
        kb.add(
            TogglePolling,
            KeyCombo::new(KeyCode::Char('P'), KeyModifiers::SHIFT),
        );
        kb.add(NavUp, KeyCombo::new(KeyCode::Up, none));
        kb.add(NavDown, KeyCombo::new(KeyCode::Down, none));
        kb.add(NavFirst, KeyCombo::new(KeyCode::Home, none));
        kb.add(NavLast, KeyCombo::new(KeyCode::End, none));
        kb.add(Select, KeyCombo::new(KeyCode::Enter, none));
        kb.add(ToggleOption, KeyCombo::new(KeyCode::Char(' '), none));
        kb.add(MarkAllRead, KeyCombo::new(KeyCode::Char('m'), none));
        kb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn defaults_match_quit() {
        let kb = KeyBindings::default();
        let ev = key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(kb.matches(Action::Quit, &ev));
    }

    #[test]
    fn sidebar_toggle_is_suppressed_in_text_input() {
        let kb = KeyBindings::default();
        let c = key(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(kb.global_action(&c, false), Some(Action::ToggleSidebar));
        assert_eq!(kb.global_action(&c, true), None);
    }

    #[test]
    fn slash_and_escape_work_inside_text_input() {
        let kb = KeyBindings::default();
        let slash = key(KeyCode::Char('/'), KeyModifiers::NONE);
        let esc = key(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(kb.global_action(&slash, true), Some(Action::FocusSearch));
        assert_eq!(kb.global_action(&esc, true), Some(Action::DismissOverlay));
    }

    #[test]
    fn shortcuts_toggle_needs_modifier_and_is_blocked_in_input() {
        let kb = KeyBindings::default();
        let plain = key(KeyCode::Char('?'), KeyModifiers::SHIFT);
        let ctrl = key(
            KeyCode::Char('?'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );
        let cmd = key(
            KeyCode::Char('?'),
            KeyModifiers::SUPER | KeyModifiers::SHIFT,
        );
        assert_eq!(kb.global_action(&plain, false), None);
        assert_eq!(kb.global_action(&ctrl, false), Some(Action::ToggleShortcuts));
        assert_eq!(kb.global_action(&cmd, false), Some(Action::ToggleShortcuts));
        assert_eq!(kb.global_action(&ctrl, true), None);
    }

    #[test]
    fn shortcut_entries_follow_action_order() {
        let entries = KeyBindings::default().shortcut_entries();
        assert_eq!(entries[0].keys, "/");
        assert_eq!(entries[0].section, "Global");
        assert!(entries.iter().any(|e| e.keys == "Ctrl+Shift+? / Cmd+Shift+?"));
    }
}

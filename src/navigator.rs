//! Roving active index for keyboard selection inside a list overlay.
//!
//! The navigator never holds an index outside `0..len`: every list change
//! resets it to `Idle`, and an empty list can only be `Idle`.

use crossterm::event::KeyEvent;

use crate::keybindings::{Action, KeyBindings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationPolicy {
    /// Stop at the first and last item.
    #[default]
    Clamp,
    /// Step from the last item to the first and back.
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Idle,
    Navigating(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Not a navigation key.
    Ignored,
    /// A navigation key with nothing to move (empty list, already at the end).
    Unchanged,
    Moved(usize),
    Commit(usize),
}

#[derive(Debug, Clone, Default)]
pub struct RovingListNavigator {
    len: usize,
    state: NavState,
    policy: NavigationPolicy,
}

impl RovingListNavigator {
    pub fn new(policy: NavigationPolicy) -> Self {
        Self {
            len: 0,
            state: NavState::Idle,
            policy,
        }
    }

    pub fn policy(&self) -> NavigationPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: NavigationPolicy) {
        self.policy = policy;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn active(&self) -> Option<usize> {
        match self.state {
            NavState::Navigating(i) if i < self.len => Some(i),
            _ => None,
        }
    }

    /// Active index, or `-1` while idle.
    pub fn active_index(&self) -> isize {
        self.active().map_or(-1, |i| i as isize)
    }

    /// The underlying list changed; always back to `Idle`.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.state = NavState::Idle;
    }

    pub fn reset(&mut self) {
        self.state = NavState::Idle;
    }

    fn last(&self) -> usize {
        self.len.saturating_sub(1)
    }

    pub fn move_next(&mut self) -> Option<usize> {
        if self.len == 0 {
            self.state = NavState::Idle;
            return None;
        }
        let next = match (self.active(), self.policy) {
            (None, _) => 0,
            (Some(i), NavigationPolicy::Clamp) => (i + 1).min(self.last()),
            (Some(i), NavigationPolicy::Wrap) => (i + 1) % self.len,
        };
        self.state = NavState::Navigating(next);
        Some(next)
    }

    pub fn move_prev(&mut self) -> Option<usize> {
        if self.len == 0 {
            self.state = NavState::Idle;
            return None;
        }
        let prev = match (self.active(), self.policy) {
            (None, _) => self.last(),
            (Some(i), NavigationPolicy::Clamp) => i.saturating_sub(1),
            (Some(0), NavigationPolicy::Wrap) => self.last(),
            (Some(i), NavigationPolicy::Wrap) => i - 1,
        };
        self.state = NavState::Navigating(prev);
        Some(prev)
    }

    pub fn move_first(&mut self) -> Option<usize> {
        self.jump(0)
    }

    pub fn move_last(&mut self) -> Option<usize> {
        self.jump(self.last())
    }

    fn jump(&mut self, index: usize) -> Option<usize> {
        if index >= self.len {
            self.state = NavState::Idle;
            return None;
        }
        self.state = NavState::Navigating(index);
        Some(index)
    }

    /// Pointer moved over row `index`.
    pub fn hover(&mut self, index: usize) -> bool {
        self.jump(index).is_some()
    }

    /// Enter: the active index, if navigating.
    pub fn commit(&self) -> Option<usize> {
        self.active()
    }

    /// Click on row `index`.
    pub fn commit_at(&mut self, index: usize) -> Option<usize> {
        self.jump(index)
    }

    pub fn handle_key(&mut self, key: &KeyEvent, bindings: &KeyBindings) -> NavOutcome {
        let before = self.active();
        let moved = |after: Option<usize>| match after {
            Some(i) if after != before => NavOutcome::Moved(i),
            _ => NavOutcome::Unchanged,
        };
        if bindings.matches(Action::NavDown, key) {
            moved(self.move_next())
        } else if bindings.matches(Action::NavUp, key) {
            moved(self.move_prev())
        } else if bindings.matches(Action::NavFirst, key) {
            moved(self.move_first())
        } else if bindings.matches(Action::NavLast, key) {
            moved(self.move_last())
        } else if bindings.matches(Action::Select, key) {
            self.commit().map_or(NavOutcome::Unchanged, NavOutcome::Commit)
        } else {
            NavOutcome::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn nav(policy: NavigationPolicy, len: usize) -> RovingListNavigator {
        let mut n = RovingListNavigator::new(policy);
        n.set_len(len);
        n
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn clamp_policy_stops_at_ends() {
        let mut n = nav(NavigationPolicy::Clamp, 3);
        assert_eq!(n.active_index(), -1);
        assert_eq!(n.move_next(), Some(0));
        n.move_next();
        n.move_next();
        assert_eq!(n.move_next(), Some(2));
        n.move_prev();
        n.move_prev();
        assert_eq!(n.move_prev(), Some(0));
    }

    #[test]
    fn wrap_policy_cycles() {
        let mut n = nav(NavigationPolicy::Wrap, 3);
        assert_eq!(n.move_prev(), Some(2));
        assert_eq!(n.move_next(), Some(0));
        assert_eq!(n.move_prev(), Some(2));
    }

    #[test]
    fn idle_up_goes_to_last() {
        let mut n = nav(NavigationPolicy::Clamp, 4);
        assert_eq!(n.move_prev(), Some(3));
    }

    #[test]
    fn list_change_resets_to_idle() {
        let mut n = nav(NavigationPolicy::Clamp, 5);
        n.move_last();
        n.set_len(2);
        assert_eq!(n.state(), NavState::Idle);
        assert_eq!(n.active(), None);
        n.set_len(0);
        assert_eq!(n.move_next(), None);
        assert_eq!(n.state(), NavState::Idle);
    }

    #[test]
    fn active_never_reaches_len() {
        let mut n = nav(NavigationPolicy::Wrap, 3);
        for step in 0..20 {
            if step % 3 == 0 {
                n.move_prev();
            } else {
                n.move_next();
            }
            assert!(n.active().is_some_and(|i| i < n.len()));
        }
        assert!(!n.hover(3));
        assert_eq!(n.commit_at(7), None);
        assert_eq!(n.active(), None);
    }

    #[test]
    fn keys_drive_navigation_and_commit() {
        let kb = KeyBindings::default();
        let mut n = nav(NavigationPolicy::Clamp, 3);
        assert_eq!(n.handle_key(&key(KeyCode::Enter), &kb), NavOutcome::Unchanged);
        assert_eq!(n.handle_key(&key(KeyCode::Down), &kb), NavOutcome::Moved(0));
        assert_eq!(n.handle_key(&key(KeyCode::Down), &kb), NavOutcome::Moved(1));
        assert_eq!(n.handle_key(&key(KeyCode::End), &kb), NavOutcome::Moved(2));
        assert_eq!(n.handle_key(&key(KeyCode::Down), &kb), NavOutcome::Unchanged);
        assert_eq!(n.handle_key(&key(KeyCode::Enter), &kb), NavOutcome::Commit(2));
        assert_eq!(n.handle_key(&key(KeyCode::Char('x')), &kb), NavOutcome::Ignored);
    }

    #[test]
    fn empty_list_keys_are_noops() {
        let kb = KeyBindings::default();
        let mut n = nav(NavigationPolicy::Clamp, 0);
        assert_eq!(n.handle_key(&key(KeyCode::Down), &kb), NavOutcome::Unchanged);
        assert_eq!(n.handle_key(&key(KeyCode::Enter), &kb), NavOutcome::Unchanged);
        assert_eq!(n.active_index(), -1);
    }
}

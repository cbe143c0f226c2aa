/// Page-level state that global shortcuts mutate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DashboardState {
    sidebar_collapsed: bool,
    sidebar_dirty: bool,
    polling: bool,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            sidebar_collapsed: false,
            sidebar_dirty: false,
            polling: true,
        }
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) {
        if self.sidebar_collapsed == collapsed {
            return;
        }
        self.sidebar_collapsed = collapsed;
        self.sidebar_dirty = true;
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        let collapsed = !self.sidebar_collapsed;
        self.set_sidebar_collapsed(collapsed);
        collapsed
    }

    /// Pending sidebar change for the page layout, consumed once.
    pub fn take_sidebar_change(&mut self) -> Option<bool> {
        if self.sidebar_dirty {
            self.sidebar_dirty = false;
            Some(self.sidebar_collapsed)
        } else {
            None
        }
    }

    pub fn polling(&self) -> bool {
        self.polling
    }

    pub fn set_polling(&mut self, polling: bool) {
        self.polling = polling;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_toggle_and_take_change() {
        let mut s = DashboardState::new();
        assert!(!s.sidebar_collapsed());
        s.set_sidebar_collapsed(false);
        // no change -> None
        assert!(s.take_sidebar_change().is_none());
        assert!(s.toggle_sidebar());
        assert_eq!(s.take_sidebar_change(), Some(true));
        // consumed
        assert!(s.take_sidebar_change().is_none());
        assert!(!s.toggle_sidebar());
    }

    #[test]
    fn polling_defaults_on() {
        let mut s = DashboardState::new();
        assert!(s.polling());
        s.set_polling(false);
        assert!(!s.polling());
    }
}

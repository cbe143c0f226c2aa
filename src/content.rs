//! Content supplied by the outside world and rendered verbatim by overlays.
//!
//! The engine only interprets grouping and selection; everything else about
//! an item is opaque text.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub id: String,
    pub label: String,
    pub group: String,
    pub icon: String,
}

impl ResultItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            group: group.into(),
            icon: String::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }
}

/// Reorder `items` so that groups appear in first-encountered order while
/// items keep their insertion order inside each group.
pub fn group_in_display_order(items: Vec<ResultItem>) -> Vec<ResultItem> {
    let mut groups: Vec<(String, Vec<ResultItem>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(name, _)| *name == item.group) {
            Some((_, members)) => members.push(item),
            None => groups.push((item.group.clone(), vec![item])),
        }
    }
    groups.into_iter().flat_map(|(_, members)| members).collect()
}

/// Indices at which a new group starts in an already grouped slice.
pub fn group_starts(items: &[ResultItem]) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(i, item)| *i == 0 || items[i - 1].group != item.group)
        .map(|(i, _)| i)
        .collect()
}

/// Selection callback supplied by the content collaborator. Called once per
/// Enter or click, before the overlay closes.
pub type SelectHandler<T> = Box<dyn FnMut(&T)>;

/// Content collaborator for the search overlay.
pub trait SearchSource {
    fn search(&self, query: &str) -> Vec<ResultItem>;
}

/// In-memory source: case-insensitive substring match on label and group.
/// A blank query matches nothing.
#[derive(Debug, Clone, Default)]
pub struct StaticSearchSource {
    items: Vec<ResultItem>,
}

impl StaticSearchSource {
    pub fn new(items: Vec<ResultItem>) -> Self {
        Self { items }
    }
}

impl SearchSource for StaticSearchSource {
    fn search(&self, query: &str) -> Vec<ResultItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|item| {
                item.label.to_lowercase().contains(&needle)
                    || item.group.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub const fn glyph(self) -> &'static str {
        match self {
            NotificationKind::Info => "i",
            NotificationKind::Success => "+",
            NotificationKind::Warning => "!",
            NotificationKind::Error => "x",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub time: String,
    pub read: bool,
}

impl Notification {
    pub fn new(
        id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            time: time.into(),
            read: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: String,
    pub label: String,
}

impl MenuEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutEntry {
    pub keys: String,
    pub description: String,
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

impl FilterOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            selected: false,
        }
    }
}

impl fmt::Display for FilterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.selected { "[x]" } else { "[ ]" };
        write!(f, "{marker} {}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<ResultItem> {
        vec![
            ResultItem::new("u1", "Ada", "Users"),
            ResultItem::new("p1", "Apollo", "Projects"),
            ResultItem::new("u2", "Grace", "Users"),
            ResultItem::new("t1", "Ops team", "Teams"),
            ResultItem::new("p2", "Gemini", "Projects"),
        ]
    }

    #[test]
    fn groups_follow_first_encounter_and_insertion_order() {
        let ids: Vec<String> = group_in_display_order(items())
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, ["u1", "u2", "p1", "p2", "t1"]);
    }

    #[test]
    fn group_starts_marks_boundaries() {
        let grouped = group_in_display_order(items());
        assert_eq!(group_starts(&grouped), vec![0, 2, 4]);
        assert!(group_starts(&[]).is_empty());
    }

    #[test]
    fn static_source_matches_label_or_group_case_insensitively() {
        let source = StaticSearchSource::new(items());
        let hits: Vec<String> = source.search("TEAM").into_iter().map(|i| i.id).collect();
        assert_eq!(hits, ["t1"]);
        assert_eq!(source.search("users").len(), 2);
        assert!(source.search("   ").is_empty());
    }

    #[test]
    fn filter_option_display_marks_selection() {
        let mut opt = FilterOption::new("open", "Open");
        assert_eq!(opt.to_string(), "[ ] Open");
        opt.selected = true;
        assert_eq!(opt.to_string(), "[x] Open");
    }
}

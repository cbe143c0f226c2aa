//! Shared crate-wide constants.

/// Fixed inset kept between an overlay and every viewport edge.
///
/// Overlays are never rendered flush against the edge of the viewport; the
/// position calculator clamps both axes into `[margin, extent - size - margin]`.
pub const DEFAULT_MARGIN: u16 = 16;

/// Gap between the trigger's edge and the overlay it anchors.
pub const DEFAULT_GAP: u16 = 8;

/// Page scroll distance (since the overlay opened) after which an anchored
/// overlay dismisses itself. Anchors point into the pre-scroll layout, so an
/// overlay left open across a larger scroll would float detached from its
/// trigger.
pub const DEFAULT_SCROLL_THRESHOLD: u16 = 24;

/// Delay between the last keystroke in the search input and the refilter.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Period of the log-tail refresh.
pub const DEFAULT_POLL_MS: u64 = 1000;

/// Every dismissal registration owns exactly this many document-level
/// listeners: pointer-down, key-down and scroll.
pub const LISTENERS_PER_REGISTRATION: usize = 3;

/// Marker used to find an already mounted portal container.
pub const PORTAL_MARKER: &str = "overlay-portal";

/// Page rows scrolled per mouse-wheel notch.
pub const WHEEL_SCROLL_ROWS: i32 = 1;

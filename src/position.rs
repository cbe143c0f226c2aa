//! Anchored overlay placement.
//!
//! The calculator is pure: it reads no document state, so callers capture the
//! trigger rectangle first and tests feed synthetic rectangles directly.

use crate::config::EngineConfig;
use crate::constants::{DEFAULT_GAP, DEFAULT_MARGIN};
use crate::geometry::{Anchor, Position, Rect, Size, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCalculator {
    margin: i32,
    gap: i32,
}

impl PositionCalculator {
    pub const fn new(margin: u16, gap: u16) -> Self {
        Self {
            margin: margin as i32,
            gap: gap as i32,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.margin, config.gap)
    }

    pub const fn margin(&self) -> i32 {
        self.margin
    }

    /// Place an overlay of `size` relative to `trigger`.
    ///
    /// Below-left is preferred. When the overlay would cross the right inset
    /// it is right-aligned against that inset instead; when it would cross the
    /// bottom inset it flips above the trigger if there is room, and is
    /// clamped otherwise. Overlays larger than the inset viewport are pinned
    /// to the margin on the overflowing axis.
    pub fn compute(&self, trigger: Rect, size: Size, viewport: Viewport, anchor: Anchor) -> Position {
        let vw = viewport.width as i32;
        let vh = viewport.height as i32;
        let w = size.width as i32;
        let h = size.height as i32;
        let m = self.margin;
        let max_left = vw - w - m;
        let max_top = vh - h - m;

        if anchor == Anchor::Centered {
            return Position::TopLeft {
                top: clamp_axis((vh - h) / 2, m, max_top),
                left: clamp_axis((vw - w) / 2, m, max_left),
            };
        }

        let below = trigger.bottom() + self.gap;
        let above = trigger.y - self.gap - h;
        let top = match anchor {
            Anchor::AboveLeft if above < m && below <= max_top => below,
            Anchor::AboveLeft => above,
            _ if below > max_top && above >= m => above,
            _ => below,
        };
        let top = clamp_axis(top, m, max_top);

        match anchor {
            Anchor::BelowRight => Position::TopLeft {
                top,
                left: clamp_axis(trigger.right() - w, m, max_left),
            },
            _ if trigger.x + w > vw - m && max_left >= m => Position::TopRight { top, right: m },
            _ => Position::TopLeft {
                top,
                left: clamp_axis(trigger.x, m, max_left),
            },
        }
    }

    /// Safe placement used when the trigger is missing or unmounted: the
    /// top-right corner of the inset viewport.
    pub fn fallback(&self, size: Size, viewport: Viewport) -> Position {
        let m = self.margin;
        if viewport.width as i32 - size.width as i32 - m >= m {
            Position::TopRight { top: m, right: m }
        } else {
            Position::TopLeft { top: m, left: m }
        }
    }
}

impl Default for PositionCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN, DEFAULT_GAP)
    }
}

/// Compute with the default margin and gap.
pub fn compute(trigger: Rect, size: Size, viewport: Viewport, anchor: Anchor) -> Position {
    PositionCalculator::default().compute(trigger, size, viewport, anchor)
}

fn clamp_axis(value: i32, lo: i32, hi: i32) -> i32 {
    if hi < lo { lo } else { value.clamp(lo, hi) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport::new(1024, 768);

    #[test]
    fn right_edge_trigger_right_aligns_to_inset() {
        let trigger = Rect::new(900, 10, 40, 40);
        let size = Size::new(320, 400);
        let pos = compute(trigger, size, VIEWPORT, Anchor::BelowLeft);
        assert_eq!(pos.left(size, VIEWPORT), 1024 - 320 - 16);
        assert_eq!(pos.top(), 10 + 40 + 8);
    }

    #[test]
    fn below_left_when_room() {
        let trigger = Rect::new(100, 20, 80, 30);
        let pos = compute(trigger, Size::new(200, 100), VIEWPORT, Anchor::BelowLeft);
        assert_eq!(pos, Position::TopLeft { top: 58, left: 100 });
    }

    #[test]
    fn left_edge_trigger_is_clamped_to_margin() {
        let trigger = Rect::new(2, 20, 10, 10);
        let pos = compute(trigger, Size::new(200, 100), VIEWPORT, Anchor::BelowLeft);
        assert_eq!(pos.left(Size::new(200, 100), VIEWPORT), 16);
    }

    #[test]
    fn flips_above_near_bottom() {
        let trigger = Rect::new(100, 700, 80, 30);
        let size = Size::new(200, 300);
        let pos = compute(trigger, size, VIEWPORT, Anchor::BelowLeft);
        assert_eq!(pos.top(), 700 - 8 - 300);
    }

    #[test]
    fn clamps_when_neither_side_fits() {
        let trigger = Rect::new(100, 300, 80, 30);
        let size = Size::new(200, 600);
        let pos = compute(trigger, size, VIEWPORT, Anchor::BelowLeft);
        assert_eq!(pos.top(), 768 - 600 - 16);
    }

    #[test]
    fn below_right_aligns_right_edges() {
        let trigger = Rect::new(500, 10, 40, 40);
        let size = Size::new(200, 100);
        let pos = compute(trigger, size, VIEWPORT, Anchor::BelowRight);
        assert_eq!(pos.left(size, VIEWPORT), 540 - 200);
    }

    #[test]
    fn above_left_falls_back_below_when_no_room() {
        let trigger = Rect::new(100, 20, 40, 20);
        let size = Size::new(200, 100);
        let pos = compute(trigger, size, VIEWPORT, Anchor::AboveLeft);
        assert_eq!(pos.top(), 48);
    }

    #[test]
    fn centered_ignores_trigger() {
        let size = Size::new(400, 200);
        let pos = compute(Rect::default(), size, VIEWPORT, Anchor::Centered);
        assert_eq!(pos, Position::TopLeft { top: 284, left: 312 });
    }

    #[test]
    fn fallback_is_top_right_inside_margin() {
        let calc = PositionCalculator::default();
        let size = Size::new(320, 400);
        let rect = calc.fallback(size, VIEWPORT).to_rect(size, VIEWPORT);
        assert_eq!(rect.x, 688);
        assert_eq!(rect.y, 16);
    }

    #[test]
    fn result_always_inside_inset_viewport() {
        let calc = PositionCalculator::default();
        let viewports = [Viewport::new(1024, 768), Viewport::new(400, 300)];
        let sizes = [Size::new(320, 400), Size::new(40, 20), Size::new(360, 260)];
        let anchors = [
            Anchor::BelowLeft,
            Anchor::BelowRight,
            Anchor::AboveLeft,
            Anchor::Centered,
        ];
        for viewport in viewports {
            for size in sizes {
                let size = viewport.fit(size, 16);
                for anchor in anchors {
                    for x in (-60..1100).step_by(37) {
                        for y in (-60..800).step_by(41) {
                            let trigger = Rect::new(x, y, 40, 24);
                            let rect = calc
                                .compute(trigger, size, viewport, anchor)
                                .to_rect(size, viewport);
                            assert!(rect.x >= 16, "{rect:?} {anchor:?}");
                            assert!(rect.right() <= viewport.width as i32 - 16, "{rect:?}");
                            assert!(rect.y >= 16, "{rect:?} {anchor:?}");
                            assert!(rect.bottom() <= viewport.height as i32 - 16, "{rect:?}");
                        }
                    }
                }
            }
        }
    }
}

//! Viewport geometry shared by the document model and the position
//! calculator.
//!
//! Rectangles carry a signed origin so that triggers scrolled partly out of
//! view, or overlays computed against a stale layout, are still representable.
//! Drawing converts to `ratatui::layout::Rect` through [`Rect::to_cells`],
//! which saturates at the buffer origin.

use ratatui::layout::Rect as CellRect;

/// Signed rectangle origin with unsigned size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Half-open containment test; empty rectangles contain nothing.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        if self.is_empty() {
            return false;
        }
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Clip into the unsigned cell space used by `ratatui`.
    pub fn to_cells(self) -> CellRect {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().max(x0);
        let y1 = self.bottom().max(y0);
        let clamp = |v: i32| v.clamp(0, u16::MAX as i32) as u16;
        let x = clamp(x0);
        let y = clamp(y0);
        CellRect {
            x,
            y,
            width: clamp(x1).saturating_sub(x),
            height: clamp(y1).saturating_sub(y),
        }
    }

    pub fn from_cells(rect: CellRect) -> Self {
        Self::new(rect.x as i32, rect.y as i32, rect.width, rect.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Largest overlay that fits with `margin` on every side.
    pub fn max_overlay_size(&self, margin: u16) -> Size {
        let inset = margin.saturating_mul(2);
        Size::new(
            self.width.saturating_sub(inset),
            self.height.saturating_sub(inset),
        )
    }

    /// Shrink `size` so that it fits inside the inset viewport.
    pub fn fit(&self, size: Size, margin: u16) -> Size {
        let max = self.max_overlay_size(margin);
        Size::new(size.width.min(max.width), size.height.min(max.height))
    }
}

/// Preferred placement relative to the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Below the trigger, left edges aligned.
    #[default]
    BelowLeft,
    /// Below the trigger, right edges aligned.
    BelowRight,
    /// Above the trigger, left edges aligned.
    AboveLeft,
    /// Centered in the viewport; the trigger only receives focus back.
    Centered,
}

/// Resolved overlay placement.
///
/// `TopRight::right` is the distance between the overlay's right edge and the
/// viewport's right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    TopLeft { top: i32, left: i32 },
    TopRight { top: i32, right: i32 },
}

impl Position {
    pub const fn top(&self) -> i32 {
        match *self {
            Position::TopLeft { top, .. } | Position::TopRight { top, .. } => top,
        }
    }

    pub fn left(&self, size: Size, viewport: Viewport) -> i32 {
        match *self {
            Position::TopLeft { left, .. } => left,
            Position::TopRight { right, .. } => {
                viewport.width as i32 - right - size.width as i32
            }
        }
    }

    pub fn to_rect(&self, size: Size, viewport: Viewport) -> Rect {
        Rect::new(
            self.left(size, viewport),
            self.top(),
            size.width,
            size.height,
        )
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::TopLeft { top: 0, left: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open_and_rejects_empty() {
        let r = Rect::new(1, 1, 3, 3);
        assert!(r.contains(1, 1));
        assert!(r.contains(3, 3));
        assert!(!r.contains(4, 1));
        assert!(!Rect::new(0, 0, 0, 5).contains(0, 0));
    }

    #[test]
    fn to_cells_clips_negative_origin() {
        let r = Rect::new(-2, 1, 5, 2).to_cells();
        assert_eq!(r, CellRect::new(0, 1, 3, 2));
        let gone = Rect::new(-10, -10, 4, 4).to_cells();
        assert_eq!(gone.width, 0);
        assert_eq!(gone.height, 0);
    }

    #[test]
    fn top_right_resolves_against_viewport() {
        let viewport = Viewport::new(1024, 768);
        let size = Size::new(320, 400);
        let pos = Position::TopRight { top: 58, right: 16 };
        assert_eq!(pos.left(size, viewport), 688);
        assert_eq!(pos.to_rect(size, viewport), Rect::new(688, 58, 320, 400));
    }

    #[test]
    fn fit_shrinks_to_inset() {
        let viewport = Viewport::new(40, 10);
        assert_eq!(viewport.fit(Size::new(80, 4), 2), Size::new(36, 4));
    }
}

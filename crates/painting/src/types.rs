use serde::{Deserialize, Serialize};

/// Blend modes for painting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum BlendMode {
    /// Straight alpha composite of the paint color over the pixel
    #[default]
    Normal = 0,
    /// Destination-out: reduce the pixel toward transparent
    Erase = 1,
}

/// Axis-aligned pixel rectangle (x, y, width, height), always inside the
/// buffer it was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        PixelRect::new(x, y, right - x, bottom - y)
    }

    /// Grow to include a single pixel
    pub fn include(&mut self, x: u32, y: u32) {
        *self = self.union(&PixelRect::new(x, y, 1, 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_union() {
        let a = PixelRect::new(0, 0, 2, 2);
        let b = PixelRect::new(5, 1, 1, 4);
        assert_eq!(a.union(&b), PixelRect::new(0, 0, 6, 5));
    }

    #[test]
    fn test_rect_include() {
        let mut rect = PixelRect::new(3, 3, 1, 1);
        rect.include(1, 4);
        assert_eq!(rect, PixelRect::new(1, 3, 3, 2));
        assert_eq!(rect.right(), 4);
        assert_eq!(rect.bottom(), 5);
    }
}

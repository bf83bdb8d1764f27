//! Tile grid and dirty tracking for incremental texture re-upload

mod data_access;
mod dirty_tracking;

use std::collections::HashSet;

use crate::constants::DEFAULT_TILE_SIZE;
use crate::types::PixelRect;

/// Tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// Tile grid over a `width` x `height` texture with a set of dirty tiles
///
/// The grid does not own pixels; a [`crate::Layer`] pairs one with its
/// buffer and marks regions as paint operations touch them.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: u32,
    height: u32,
    pub(crate) tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
}

impl TileGrid {
    /// Create a new grid with the given dimensions and tile size
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        Self {
            width,
            height,
            tile_size,
            tiles_x: width.div_ceil(tile_size),
            tiles_y: height.div_ceil(tile_size),
            dirty_tiles: HashSet::new(),
        }
    }

    /// Create a new grid with the default tile size
    pub fn with_default_tile_size(width: u32, height: u32) -> Self {
        Self::new(width, height, DEFAULT_TILE_SIZE)
    }

    /// Rebuild the grid for new texture dimensions; every tile becomes dirty
    pub fn reset(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height, self.tile_size);
        self.mark_all_dirty();
    }

    /// Get the tile size
    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Get the number of tiles in x direction
    #[inline]
    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    /// Get the number of tiles in y direction
    #[inline]
    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    /// Tiles overlapping a pixel rectangle, row-major
    pub fn tiles_in_rect(&self, rect: PixelRect) -> Vec<TileCoord> {
        let Some(rect) = self.clip(rect) else {
            return Vec::new();
        };
        let tile_x_end = (rect.right() - 1) / self.tile_size;
        let tile_y_end = (rect.bottom() - 1) / self.tile_size;

        let mut tiles = Vec::new();
        for ty in rect.y / self.tile_size..=tile_y_end {
            for tx in rect.x / self.tile_size..=tile_x_end {
                tiles.push(TileCoord { x: tx, y: ty });
            }
        }
        tiles
    }

    /// Every tile in the grid, row-major
    pub fn all_tiles(&self) -> Vec<TileCoord> {
        self.tiles_in_rect(PixelRect::new(0, 0, self.width, self.height))
    }

    /// Get tile bounds in pixel coordinates (edge tiles may be smaller)
    pub fn tile_bounds(&self, coord: TileCoord) -> PixelRect {
        let tile_start_x = coord.x * self.tile_size;
        let tile_start_y = coord.y * self.tile_size;

        let tile_width = self.tile_size.min(self.width.saturating_sub(tile_start_x));
        let tile_height = self.tile_size.min(self.height.saturating_sub(tile_start_y));

        PixelRect::new(tile_start_x, tile_start_y, tile_width, tile_height)
    }

    fn clip(&self, rect: PixelRect) -> Option<PixelRect> {
        if rect.is_empty() || rect.x >= self.width || rect.y >= self.height {
            return None;
        }
        let right = rect.right().min(self.width);
        let bottom = rect.bottom().min(self.height);
        Some(PixelRect::new(rect.x, rect.y, right - rect.x, bottom - rect.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelBuffer;

    #[test]
    fn test_tile_grid_creation() {
        let grid = TileGrid::new(256, 256, 128);
        assert_eq!(grid.tiles_x(), 2);
        assert_eq!(grid.tiles_y(), 2);
        assert_eq!(grid.tile_size(), 128);
    }

    #[test]
    fn test_tile_grid_non_aligned() {
        // 300x300 with 128 tile size should give 3x3 tiles
        let grid = TileGrid::new(300, 300, 128);
        assert_eq!(grid.tiles_x(), 3);
        assert_eq!(grid.tiles_y(), 3);
        assert_eq!(grid.all_tiles().len(), 9);
    }

    #[test]
    fn test_mark_dirty() {
        let mut grid = TileGrid::new(256, 256, 128);

        grid.mark_dirty(0, 0);
        assert!(grid.has_dirty_tiles());
        assert_eq!(grid.dirty_tile_count(), 1);

        grid.mark_dirty(130, 130);
        assert_eq!(grid.dirty_tile_count(), 2);

        // Outside the texture
        grid.mark_dirty(300, 0);
        assert_eq!(grid.dirty_tile_count(), 2);

        let tiles = grid.take_dirty_tiles();
        assert_eq!(tiles, vec![TileCoord { x: 0, y: 0 }, TileCoord { x: 1, y: 1 }]);
        assert!(!grid.has_dirty_tiles());
    }

    #[test]
    fn test_mark_region_dirty() {
        let mut grid = TileGrid::new(256, 256, 128);

        // Mark a region that spans all 4 tiles
        grid.mark_region_dirty(PixelRect::new(100, 100, 56, 56));
        assert_eq!(grid.dirty_tile_count(), 4);
    }

    #[test]
    fn test_reset_marks_everything() {
        let mut grid = TileGrid::new(256, 256, 128);
        grid.reset(300, 100);
        assert_eq!(grid.tiles_x(), 3);
        assert_eq!(grid.tiles_y(), 1);
        assert_eq!(grid.dirty_tile_count(), 3);
    }

    #[test]
    fn test_get_tile_bounds() {
        let grid = TileGrid::new(150, 150, 128);

        assert_eq!(
            grid.tile_bounds(TileCoord { x: 0, y: 0 }),
            PixelRect::new(0, 0, 128, 128)
        );
        assert_eq!(
            grid.tile_bounds(TileCoord { x: 1, y: 1 }),
            PixelRect::new(128, 128, 22, 22)
        );
    }

    #[test]
    fn test_edge_region_data() {
        // Create a buffer where edge tiles are partial
        let buffer = PixelBuffer::new(150, 150).unwrap();
        let grid = TileGrid::new(150, 150, 128);

        // The edge tile should be 22x22 pixels
        let tile_data = buffer.read_region(grid.tile_bounds(TileCoord { x: 1, y: 1 }));
        assert_eq!(tile_data.len(), 22 * 22);
    }

    #[test]
    fn test_region_bytes_and_write_back() {
        let mut buffer = PixelBuffer::new(8, 8).unwrap();
        buffer.set(5, 6, [1.0, 0.0, 0.0, 1.0]);
        let rect = PixelRect::new(4, 4, 4, 4);

        let bytes = buffer.region_bytes(rect);
        assert_eq!(bytes.len(), 4 * 4 * 4);
        // (5, 6) is column 1, row 2 of the region
        let offset = (2 * 4 + 1) * 4;
        assert_eq!(&bytes[offset..offset + 4], &[255, 0, 0, 255]);

        let saved = buffer.read_region(rect);
        buffer.clear([0.0, 1.0, 0.0, 1.0]);
        buffer.write_region(rect, &saved);
        assert_eq!(buffer.get_rgba8(5, 6), [255, 0, 0, 255]);
        assert_eq!(buffer.get_rgba8(4, 4), [0, 0, 0, 0]);
        assert_eq!(buffer.get_rgba8(0, 0), [0, 255, 0, 255]);
    }
}

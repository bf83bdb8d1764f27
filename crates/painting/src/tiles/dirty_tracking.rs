//! Dirty tile tracking for incremental updates

use tracing::debug;

use super::{TileCoord, TileGrid};
use crate::types::PixelRect;

impl TileGrid {
    /// Mark a pixel as modified (marks containing tile dirty)
    #[inline]
    pub fn mark_dirty(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let tile_x = x / self.tile_size;
        let tile_y = y / self.tile_size;
        self.dirty_tiles.insert(TileCoord { x: tile_x, y: tile_y });
    }

    /// Mark a rectangular region as dirty
    pub fn mark_region_dirty(&mut self, rect: PixelRect) {
        let tiles_before = self.dirty_tiles.len();
        let tiles = self.tiles_in_rect(rect);
        self.dirty_tiles.extend(tiles);

        let tiles_after = self.dirty_tiles.len();
        debug!(
            "mark_region_dirty: ({}, {}) {}x{} -> {} new tiles (total {})",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            tiles_after - tiles_before,
            tiles_after
        );
    }

    /// Mark every tile dirty
    pub fn mark_all_dirty(&mut self) {
        let tiles = self.all_tiles();
        self.dirty_tiles.extend(tiles);
    }

    /// Get all dirty tiles (row-major) and clear the dirty set
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        let mut tiles: Vec<TileCoord> = self.dirty_tiles.drain().collect();
        tiles.sort_unstable_by_key(|coord| (coord.y, coord.x));
        tiles
    }

    /// Check if any tiles are dirty
    #[inline]
    pub fn has_dirty_tiles(&self) -> bool {
        !self.dirty_tiles.is_empty()
    }

    /// Get the number of dirty tiles
    #[inline]
    pub fn dirty_tile_count(&self) -> usize {
        self.dirty_tiles.len()
    }
}

//! Undo history for the paint session

use std::collections::HashMap;

use tracing::debug;

use crate::tiles::TileCoord;

use super::PaintSession;

/// An undo entry containing tile data captured before a stroke
#[derive(Debug, Clone)]
pub struct UndoEntry {
    /// Stroke ID this entry corresponds to
    pub stroke_id: u64,
    /// Stable id of the painted layer
    pub layer_id: u64,
    /// Layer dimensions when the tiles were captured
    pub width: u32,
    pub height: u32,
    /// Captured tile data (tile coord -> RGBA8 pixels)
    pub tiles: HashMap<TileCoord, Vec<[u8; 4]>>,
}

impl PaintSession {
    /// Push an entry, dropping the oldest beyond the configured depth
    pub(crate) fn push_undo(&mut self, entry: UndoEntry) {
        self.undo_stack.push(entry);
        if self.undo_stack.len() > self.max_undo_levels {
            let excess = self.undo_stack.len() - self.max_undo_levels;
            self.undo_stack.drain(..excess);
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn max_undo_levels(&self) -> usize {
        self.max_undo_levels
    }

    /// Undo the most recent stroke
    ///
    /// Entries whose layer was removed or resized since capture are
    /// discarded and the next one is tried. Returns true if a stroke was
    /// reverted.
    pub fn undo(&mut self) -> bool {
        if self.current_stroke.is_some() {
            self.end_stroke();
        }

        while let Some(entry) = self.undo_stack.pop() {
            let Some(layer) = self
                .stack
                .index_of(entry.layer_id)
                .and_then(|index| self.stack.get_mut(index))
            else {
                debug!("Undo: layer for stroke {} is gone, skipping", entry.stroke_id);
                continue;
            };
            if (layer.width(), layer.height()) != (entry.width, entry.height) {
                debug!(
                    "Undo: layer '{}' was resized since stroke {}, skipping",
                    layer.name(),
                    entry.stroke_id
                );
                continue;
            }

            debug!(
                "Undoing stroke {} ({} tiles)",
                entry.stroke_id,
                entry.tiles.len()
            );
            for (coord, tile_data) in &entry.tiles {
                layer.write_tile(*coord, tile_data);
            }
            return true;
        }

        debug!("Undo: no entries available");
        false
    }

    /// Drop all history
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
    }
}

//! Surface operations for the paint session

use tracing::debug;

use crate::error::TextureError;
use crate::surface::PixelBuffer;
use crate::tiles::TileCoord;

use super::{PaintSession, UndoEntry};

impl PaintSession {
    /// Take dirty tiles of every layer for GPU upload
    ///
    /// Returns `(layer index, tiles)` for each layer with modified tiles
    /// since the last call. The dirty flags are cleared.
    pub fn take_dirty_tiles(&mut self) -> Vec<(usize, Vec<TileCoord>)> {
        self.stack
            .iter_mut()
            .enumerate()
            .filter(|(_, layer)| layer.has_dirty_tiles())
            .map(|(index, layer)| (index, layer.take_dirty_tiles()))
            .collect()
    }

    /// Check if any layer has dirty tiles
    pub fn has_dirty_tiles(&self) -> bool {
        self.stack.iter().any(|layer| layer.has_dirty_tiles())
    }

    /// Flatten the visible layers
    pub fn composite(&self) -> PixelBuffer {
        self.stack.composite()
    }

    /// Read a pixel of the current layer (transparent without a layer)
    pub fn get_pixel(&self, x: i32, y: i32) -> [f32; 4] {
        self.stack
            .current_layer()
            .map(|layer| layer.get_pixel(x, y))
            .unwrap_or_default()
    }

    /// Clear the current layer to a solid color as one undoable step
    pub fn clear_current_layer(&mut self, color: [f32; 4]) -> bool {
        if self.current_stroke.is_some() {
            self.end_stroke();
        }
        let Some(layer) = self.stack.current_layer_mut() else {
            return false;
        };

        let tiles = layer
            .tiles()
            .all_tiles()
            .into_iter()
            .map(|coord| (coord, layer.read_tile(coord)))
            .collect();
        let entry = UndoEntry {
            stroke_id: self.next_stroke_id,
            layer_id: layer.id(),
            width: layer.width(),
            height: layer.height(),
            tiles,
        };
        layer.clear(color);

        self.next_stroke_id += 1;
        self.push_undo(entry);
        true
    }

    /// Resize every layer; history is dropped since it no longer fits
    pub fn resize_textures(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        self.cancel_stroke();
        self.stack.resize_textures(width, height)?;
        self.undo_stack.clear();
        debug!("PaintSession: textures resized to {}x{}", width, height);
        Ok(())
    }
}

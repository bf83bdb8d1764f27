//! A named paint layer owning one pixel buffer

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::brush;
use crate::color::TRANSPARENT;
use crate::error::TextureError;
use crate::fill::flood_fill;
use crate::surface::PixelBuffer;
use crate::tiles::{TileCoord, TileGrid};
use crate::types::PixelRect;

/// Layer metadata as persisted by project files and shown by layer panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
}

/// A paint layer: name, visibility and opacity over an exclusively owned
/// RGBA buffer
///
/// Opacity is applied only when compositing; painting always writes
/// full-strength pixels. Every mutation marks the touched tiles dirty so
/// a renderer can re-upload just those regions.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Stable identifier assigned by the owning [`crate::LayerStack`]
    id: u64,
    name: String,
    visible: bool,
    opacity: f32,
    buffer: PixelBuffer,
    tiles: TileGrid,
}

impl Layer {
    /// Create a transparent layer
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Result<Self, TextureError> {
        Ok(Self::from_buffer(name, PixelBuffer::new(width, height)?))
    }

    /// Wrap an existing buffer
    pub fn from_buffer(name: impl Into<String>, buffer: PixelBuffer) -> Self {
        let mut tiles = TileGrid::with_default_tile_size(buffer.width(), buffer.height());
        tiles.mark_all_dirty();
        Self {
            id: 0,
            name: name.into(),
            visible: true,
            opacity: 1.0,
            buffer,
            tiles,
        }
    }

    /// Create a layer from an encoded image
    ///
    /// A decode failure yields a 1x1 white layer plus the error.
    pub fn from_image(name: impl Into<String>, bytes: &[u8]) -> (Self, Option<TextureError>) {
        let (buffer, err) = PixelBuffer::load_from_image(bytes);
        (Self::from_buffer(name, buffer), err)
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set compositing opacity, clamped to [0, 1] (NaN becomes 0)
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Metadata snapshot
    pub fn info(&self) -> LayerInfo {
        LayerInfo {
            name: self.name.clone(),
            visible: self.visible,
            opacity: self.opacity,
        }
    }

    /// Apply persisted metadata (opacity is clamped)
    pub fn apply_info(&mut self, info: &LayerInfo) {
        self.set_name(info.name.clone());
        self.set_visible(info.visible);
        self.set_opacity(info.opacity);
    }

    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Read a pixel (transparent when out of range)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> [f32; 4] {
        self.buffer.get(x, y)
    }

    /// Paint a brush dab
    pub fn paint(&mut self, x: i32, y: i32, color: [f32; 4], radius: f32, hardness: f32) {
        if let Some(rect) = brush::stamp(&mut self.buffer, x, y, color, radius, hardness) {
            self.tiles.mark_region_dirty(rect);
        }
    }

    /// Erase with a brush dab
    pub fn erase(&mut self, x: i32, y: i32, radius: f32, hardness: f32) {
        if let Some(rect) = brush::erase(&mut self.buffer, x, y, radius, hardness) {
            self.tiles.mark_region_dirty(rect);
        }
    }

    /// Flood fill from a seed; returns the number of pixels filled
    pub fn fill(&mut self, x: i32, y: i32, color: [f32; 4], tolerance: f32) -> usize {
        let stats = flood_fill(&mut self.buffer, x, y, color, tolerance);
        if let Some(rect) = stats.bounds {
            self.tiles.mark_region_dirty(rect);
        }
        stats.filled
    }

    /// Clear every pixel to `color`
    pub fn clear(&mut self, color: [f32; 4]) {
        self.buffer.clear(color);
        self.tiles.mark_all_dirty();
    }

    /// Clear to transparent
    pub fn clear_transparent(&mut self) {
        self.clear(TRANSPARENT);
    }

    /// Crop/pad the buffer to new dimensions, keeping the top-left overlap
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        self.buffer.resize(width, height)?;
        self.tiles.reset(width, height);
        debug!("Layer '{}' resized to {}x{}", self.name, width, height);
        Ok(())
    }

    /// Run a custom operation on the buffer; the returned rectangle is
    /// marked dirty
    pub(crate) fn modify<F>(&mut self, op: F) -> Option<PixelRect>
    where
        F: FnOnce(&mut PixelBuffer) -> Option<PixelRect>,
    {
        let rect = op(&mut self.buffer);
        if let Some(rect) = rect {
            self.tiles.mark_region_dirty(rect);
        }
        rect
    }

    /// Tile grid used for dirty tracking
    #[inline]
    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    /// Dirty tiles since the last call, for GPU re-upload
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.tiles.take_dirty_tiles()
    }

    #[inline]
    pub fn has_dirty_tiles(&self) -> bool {
        self.tiles.has_dirty_tiles()
    }

    /// Pixel bounds of a tile
    pub fn tile_bounds(&self, coord: TileCoord) -> PixelRect {
        self.tiles.tile_bounds(coord)
    }

    /// Packed RGBA8 bytes of a tile for partial upload
    pub fn tile_bytes(&self, coord: TileCoord) -> Vec<u8> {
        self.buffer.region_bytes(self.tiles.tile_bounds(coord))
    }

    pub(crate) fn read_tile(&self, coord: TileCoord) -> Vec<[u8; 4]> {
        self.buffer.read_region(self.tiles.tile_bounds(coord))
    }

    pub(crate) fn write_tile(&mut self, coord: TileCoord, data: &[[u8; 4]]) {
        let bounds = self.tiles.tile_bounds(coord);
        self.buffer.write_region(bounds, data);
        self.tiles.mark_region_dirty(bounds);
    }
}

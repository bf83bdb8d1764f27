//! Shared configuration for texpaint
//!
//! This crate provides the single source of truth for texture dimensions,
//! brush defaults, fill tolerance and history depth shared by the painting
//! engine and whatever front-end drives it.

use serde::{Deserialize, Serialize};

/// Default texture width and height in pixels
pub const DEFAULT_TEXTURE_SIZE: u32 = 1024;

/// Default brush radius in pixels
pub const DEFAULT_BRUSH_RADIUS: f32 = 10.0;

/// Default brush hardness (0.0 = soft, 1.0 = hard)
pub const DEFAULT_BRUSH_HARDNESS: f32 = 0.8;

/// Default paint color (opaque black)
pub const DEFAULT_BRUSH_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Default dab spacing as a fraction of the brush diameter
pub const DEFAULT_BRUSH_SPACING: f32 = 0.25;

/// Default flood fill tolerance (normalized RGBA distance)
pub const DEFAULT_FILL_TOLERANCE: f32 = 0.1;

/// Default number of undo levels kept by a paint session
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 20;

/// Dimensions used for every layer texture in a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureConfig {
    /// Texture width in pixels
    pub width: u32,
    /// Texture height in pixels
    pub height: u32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_TEXTURE_SIZE,
            height: DEFAULT_TEXTURE_SIZE,
        }
    }
}

impl TextureConfig {
    /// Create a texture config with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels in one layer texture
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// Initial brush settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushConfig {
    pub radius: f32,
    pub hardness: f32,
    /// Normalized RGBA
    pub color: [f32; 4],
    /// Dab spacing as a fraction of the diameter
    pub spacing: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BRUSH_RADIUS,
            hardness: DEFAULT_BRUSH_HARDNESS,
            color: DEFAULT_BRUSH_COLOR,
            spacing: DEFAULT_BRUSH_SPACING,
        }
    }
}

/// Flood fill settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillConfig {
    pub tolerance: f32,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_FILL_TOLERANCE,
        }
    }
}

/// Top-level configuration for a paint session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintConfig {
    #[serde(default)]
    pub texture: TextureConfig,
    #[serde(default)]
    pub brush: BrushConfig,
    #[serde(default)]
    pub fill: FillConfig,
    #[serde(default = "default_max_undo_levels")]
    pub max_undo_levels: usize,
}

fn default_max_undo_levels() -> usize {
    DEFAULT_MAX_UNDO_LEVELS
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            texture: TextureConfig::default(),
            brush: BrushConfig::default(),
            fill: FillConfig::default(),
            max_undo_levels: DEFAULT_MAX_UNDO_LEVELS,
        }
    }
}

impl PaintConfig {
    /// Create a config with the given texture dimensions and default tools
    pub fn with_texture_size(width: u32, height: u32) -> Self {
        Self {
            texture: TextureConfig::new(width, height),
            ..Default::default()
        }
    }
}

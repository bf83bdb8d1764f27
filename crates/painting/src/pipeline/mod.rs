//! Paint session: the single-threaded facade front-ends drive
//!
//! This module connects:
//! - Input handling (pointer down/drag/up from any UI)
//! - Brush engine (dab interpolation along a drag)
//! - Tool dispatch onto the current layer
//! - Tile capture for undo
//!
//! Everything runs to completion on the caller's thread; pacing of input
//! events is entirely up to the caller.

mod stroke;
mod surface_ops;
mod undo;

use std::collections::HashMap;

use texpaint_config::PaintConfig;

use crate::brush::{BrushEngine, BrushPreset};
use crate::error::TextureError;
use crate::stack::LayerStack;
use crate::tiles::TileCoord;
use crate::tools::{Tool, ToolSettings};

pub use undo::UndoEntry;

/// State of a stroke between `begin_stroke` and `end_stroke`
#[derive(Debug)]
pub(crate) struct ActiveStroke {
    pub(crate) stroke_id: u64,
    /// Stable id of the layer the stroke started on
    pub(crate) layer_id: u64,
    /// Layer dimensions the captured tiles belong to
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Tiles captured before their first modification this stroke
    pub(crate) captured: HashMap<TileCoord, Vec<[u8; 4]>>,
}

/// Paint session over a layer stack
///
/// Typical flow:
/// 1. Select a tool and settings
/// 2. Input comes in via `begin_stroke`, `stroke_to`, `end_stroke`
/// 3. Continuous tools turn the drag into dabs; click tools act once
/// 4. Touched tiles are captured for undo and marked dirty for upload
pub struct PaintSession {
    pub(crate) stack: LayerStack,
    pub(crate) brush: BrushEngine,
    pub(crate) tool: Tool,
    pub(crate) settings: ToolSettings,
    /// Dab spacing as a fraction of the brush diameter
    pub(crate) spacing: f32,
    pub(crate) current_stroke: Option<ActiveStroke>,
    pub(crate) next_stroke_id: u64,
    /// Undo stack (most recent at end)
    pub(crate) undo_stack: Vec<UndoEntry>,
    pub(crate) max_undo_levels: usize,
}

impl PaintSession {
    /// Create a session with an empty stack of the given texture size
    pub fn new(width: u32, height: u32) -> Result<Self, TextureError> {
        Self::from_config(&PaintConfig::with_texture_size(width, height))
    }

    /// Create a session from configuration
    pub fn from_config(config: &PaintConfig) -> Result<Self, TextureError> {
        Ok(Self::with_stack(LayerStack::from_config(&config.texture)?, config))
    }

    /// Wrap an existing stack (e.g. a loaded project)
    pub fn with_stack(stack: LayerStack, config: &PaintConfig) -> Self {
        let settings = ToolSettings::from_config(config);
        let spacing = config.brush.spacing;
        Self {
            stack,
            brush: BrushEngine::new(BrushPreset::new(
                "Session",
                settings.radius,
                settings.hardness,
                spacing,
            )),
            tool: Tool::default(),
            settings,
            spacing,
            current_stroke: None,
            next_stroke_id: 1,
            undo_stack: Vec::new(),
            max_undo_levels: config.max_undo_levels,
        }
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut LayerStack {
        &mut self.stack
    }

    /// Give up the stack (e.g. to save it)
    pub fn into_stack(self) -> LayerStack {
        self.stack
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools; an active stroke is finished first
    pub fn set_tool(&mut self, tool: Tool) {
        if self.current_stroke.is_some() {
            self.end_stroke();
        }
        self.tool = tool;
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ToolSettings) {
        self.settings = settings;
    }

    /// Set the paint color (normalized RGBA)
    pub fn set_color(&mut self, color: [f32; 4]) {
        self.settings.color = color;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.settings.radius = radius.max(0.0);
    }

    pub fn set_hardness(&mut self, hardness: f32) {
        self.settings.hardness = hardness.clamp(0.0, 1.0);
    }

    pub fn set_tolerance(&mut self, tolerance: f32) {
        self.settings.tolerance = tolerance.max(0.0);
    }

    /// Get the current brush preset used for dab spacing
    pub fn brush_preset(&self) -> &BrushPreset {
        self.brush.preset()
    }
}

//! Paint tools and the single dispatch point that applies them to a layer

use std::f32::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};
use texpaint_config::PaintConfig;

use crate::brush::{apply_footprint, hardness_falloff, squared_distance};
use crate::layer::Layer;
use crate::types::{BlendMode, PixelRect};

/// Hard-edged shapes for the stamp tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StampShape {
    #[default]
    Circle,
    Square,
    Diamond,
    /// Five-pointed star, one tip pointing up
    Star,
}

impl StampShape {
    /// Whether offset `(dx, dy)` from the center lies inside the shape with
    /// half-extent `radius`
    pub fn contains(self, dx: i32, dy: i32, radius: f32) -> bool {
        let (fx, fy) = (dx as f32, dy as f32);
        match self {
            Self::Circle => fx * fx + fy * fy <= radius * radius,
            Self::Square => fx.abs() <= radius && fy.abs() <= radius,
            Self::Diamond => fx.abs() + fy.abs() <= radius,
            Self::Star => {
                let distance = (fx * fx + fy * fy).sqrt();
                if distance == 0.0 {
                    return true;
                }
                // Phase 0 at each tip, 0.5 halfway between tips
                let phase = ((fy.atan2(fx) + FRAC_PI_2) / (TAU / 5.0)).rem_euclid(1.0);
                let tip = (phase * 2.0 - 1.0).abs();
                distance <= radius * (STAR_INNER_RATIO + (1.0 - STAR_INNER_RATIO) * tip)
            }
        }
    }
}

const STAR_INNER_RATIO: f32 = 0.4;

/// Repeating masks for the pattern brush, laid out in texture space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatternKind {
    #[default]
    Checker,
    /// Diagonal stripes
    Stripes,
    Dots,
}

impl PatternKind {
    /// Whether the pattern paints the texture pixel `(x, y)`
    pub fn covers(self, x: i32, y: i32, cell: i32) -> bool {
        let cell = cell.max(1);
        match self {
            Self::Checker => (x.div_euclid(cell) + y.div_euclid(cell)).rem_euclid(2) == 0,
            Self::Stripes => (x + y).div_euclid(cell).rem_euclid(2) == 0,
            Self::Dots => {
                let center = (cell - 1) as f32 / 2.0;
                let lx = x.rem_euclid(cell) as f32 - center;
                let ly = y.rem_euclid(cell) as f32 - center;
                let dot_radius = (cell as f32 / 3.0).max(0.5);
                lx * lx + ly * ly <= dot_radius * dot_radius
            }
        }
    }

    /// Pattern cell size for a brush radius
    pub fn cell_size(radius: f32) -> i32 {
        ((radius / 4.0) as i32).max(1)
    }
}

/// The active paint tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    Fill,
    Stamp(StampShape),
    Pattern(PatternKind),
}

impl Tool {
    /// Tools that lay down dabs along a drag; the rest act once per click
    pub fn is_continuous(self) -> bool {
        matches!(self, Self::Brush | Self::Eraser | Self::Pattern(_))
    }
}

/// Parameters shared by every tool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Normalized RGBA paint color
    pub color: [f32; 4],
    pub radius: f32,
    pub hardness: f32,
    /// Flood fill tolerance
    pub tolerance: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_config(&PaintConfig::default())
    }
}

impl ToolSettings {
    pub fn from_config(config: &PaintConfig) -> Self {
        Self {
            color: config.brush.color,
            radius: config.brush.radius,
            hardness: config.brush.hardness,
            tolerance: config.fill.tolerance,
        }
    }
}

/// Apply `tool` once at pixel `(x, y)` of `layer`
pub fn apply_tool(tool: Tool, settings: &ToolSettings, layer: &mut Layer, x: i32, y: i32) {
    let ToolSettings {
        color,
        radius,
        hardness,
        tolerance,
    } = *settings;

    match tool {
        Tool::Brush => layer.paint(x, y, color, radius, hardness),
        Tool::Eraser => layer.erase(x, y, radius, hardness),
        Tool::Fill => {
            layer.fill(x, y, color, tolerance);
        }
        Tool::Stamp(shape) => {
            stamp_shape(layer, x, y, color, radius, shape);
        }
        Tool::Pattern(kind) => {
            pattern_dab(layer, x, y, color, radius, hardness, kind);
        }
    }
}

/// Composite a hard-edged shape of `color` centered on `(x, y)`
pub fn stamp_shape(
    layer: &mut Layer,
    x: i32,
    y: i32,
    color: [f32; 4],
    radius: f32,
    shape: StampShape,
) -> Option<PixelRect> {
    layer.modify(|buffer| {
        apply_footprint(buffer, x, y, radius, color, BlendMode::Normal, |dx, dy| {
            if shape.contains(dx, dy, radius) { 1.0 } else { 0.0 }
        })
    })
}

/// Brush dab whose coverage is masked by a repeating pattern
pub fn pattern_dab(
    layer: &mut Layer,
    x: i32,
    y: i32,
    color: [f32; 4],
    radius: f32,
    hardness: f32,
    kind: PatternKind,
) -> Option<PixelRect> {
    let radius_sq = radius * radius;
    let cell = PatternKind::cell_size(radius);
    layer.modify(|buffer| {
        apply_footprint(buffer, x, y, radius, color, BlendMode::Normal, |dx, dy| {
            let dist_sq = squared_distance(dx, dy);
            if dist_sq > radius_sq || !kind.covers(x + dx, y + dy, cell) {
                0.0
            } else {
                hardness_falloff(dist_sq / radius_sq, hardness)
            }
        })
    })
}

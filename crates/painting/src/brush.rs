//! Brush stamping and stroke interpolation
//!
//! [`stamp`] composites one circular dab into a pixel buffer. The
//! [`BrushEngine`] turns a drag path into evenly spaced dab positions.

use tracing::debug;

use crate::color::TRANSPARENT;
use crate::surface::PixelBuffer;
use crate::types::{BlendMode, PixelRect};

/// Falloff for a normalized squared distance `t` (0 at center, 1 at edge)
///
/// Hardness 1.0 (or more) yields a hard disc. Below that the curve is
/// `1 - t^((1 - hardness) * 2)`; lower hardness gives a broader, softer edge.
#[inline]
pub fn hardness_falloff(t: f32, hardness: f32) -> f32 {
    if hardness >= 1.0 {
        return 1.0;
    }
    let hardness = hardness.max(0.0);
    let t = t.clamp(0.0, 1.0);
    1.0 - t.powf((1.0 - hardness) * 2.0)
}

/// Clipped bounding box `[cx - r, cx + r]` on both axes
///
/// Returns None for a non-positive radius or a box entirely off the buffer.
pub fn dab_bounds(
    buffer: &PixelBuffer,
    center_x: i32,
    center_y: i32,
    radius: f32,
) -> Option<PixelRect> {
    if radius.is_nan() || radius <= 0.0 {
        return None;
    }

    let x_min = ((center_x as f32 - radius).floor() as i64).max(0);
    let y_min = ((center_y as f32 - radius).floor() as i64).max(0);
    let x_max = ((center_x as f32 + radius).ceil() as i64).min(buffer.width() as i64 - 1);
    let y_max = ((center_y as f32 + radius).ceil() as i64).min(buffer.height() as i64 - 1);

    if x_min > x_max || y_min > y_max {
        return None;
    }

    Some(PixelRect::new(
        x_min as u32,
        y_min as u32,
        (x_max - x_min + 1) as u32,
        (y_max - y_min + 1) as u32,
    ))
}

/// Squared length of a pixel offset, in float so far-off centers cannot
/// overflow
#[inline]
pub(crate) fn squared_distance(dx: i32, dy: i32) -> f32 {
    let (dx, dy) = (dx as f32, dy as f32);
    dx * dx + dy * dy
}

/// Apply a footprint around a center
///
/// `coverage(dx, dy)` returns the intensity (0-1) for the pixel at offset
/// `(dx, dy)` from the center; 0 leaves the pixel untouched. Each pixel is
/// read and written once, so every blend sees the pre-stamp value.
/// Returns the clipped bounding box that was visited.
pub(crate) fn apply_footprint<F>(
    buffer: &mut PixelBuffer,
    center_x: i32,
    center_y: i32,
    radius: f32,
    color: [f32; 4],
    blend_mode: BlendMode,
    mut coverage: F,
) -> Option<PixelRect>
where
    F: FnMut(i32, i32) -> f32,
{
    let rect = dab_bounds(buffer, center_x, center_y, radius)?;

    for py in rect.y..rect.bottom() {
        for px in rect.x..rect.right() {
            let (px, py) = (px as i32, py as i32);
            let intensity = coverage(px - center_x, py - center_y);
            if intensity <= 0.0 {
                continue;
            }
            match blend_mode {
                BlendMode::Normal => {
                    let src_alpha = color[3] * intensity;
                    if src_alpha > 0.0 {
                        buffer.blend_pixel(px, py, color, src_alpha);
                    }
                }
                BlendMode::Erase => buffer.erase_pixel(px, py, intensity),
            }
        }
    }

    Some(rect)
}

/// Stamp a circular dab of `color` centered on a pixel
///
/// Pixels with `d² > r²` are untouched. Inside the circle the intensity is
/// [`hardness_falloff`] of `d² / r²` and the color is composited with
/// `src_alpha = color.a * intensity`. A non-positive radius is a no-op.
/// Returns the clipped bounding box of the dab.
pub fn stamp(
    buffer: &mut PixelBuffer,
    center_x: i32,
    center_y: i32,
    color: [f32; 4],
    radius: f32,
    hardness: f32,
) -> Option<PixelRect> {
    stamp_with_mode(
        buffer,
        center_x,
        center_y,
        color,
        radius,
        hardness,
        BlendMode::Normal,
    )
}

/// Erase a circular dab: transparent ink applied destination-out with the
/// same footprint and falloff as [`stamp`]
pub fn erase(
    buffer: &mut PixelBuffer,
    center_x: i32,
    center_y: i32,
    radius: f32,
    hardness: f32,
) -> Option<PixelRect> {
    stamp_with_mode(
        buffer,
        center_x,
        center_y,
        TRANSPARENT,
        radius,
        hardness,
        BlendMode::Erase,
    )
}

/// Circular dab with an explicit blend mode
pub fn stamp_with_mode(
    buffer: &mut PixelBuffer,
    center_x: i32,
    center_y: i32,
    color: [f32; 4],
    radius: f32,
    hardness: f32,
    blend_mode: BlendMode,
) -> Option<PixelRect> {
    debug!(
        "stamp: center=({}, {}), radius={:.1}, hardness={:.2}, mode={:?}",
        center_x, center_y, radius, hardness, blend_mode
    );

    let radius_sq = radius * radius;
    apply_footprint(
        buffer,
        center_x,
        center_y,
        radius,
        color,
        blend_mode,
        |dx, dy| {
            let dist_sq = squared_distance(dx, dy);
            if dist_sq > radius_sq {
                0.0
            } else {
                hardness_falloff(dist_sq / radius_sq, hardness)
            }
        },
    )
}

/// Brush preset configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BrushPreset {
    /// Human-readable name
    pub name: String,
    /// Radius in pixels
    pub radius: f32,
    /// Hardness: 0.0 = soft, 1.0 = hard
    pub hardness: f32,
    /// Spacing as fraction of the diameter (e.g., 0.25 = 25% of diameter)
    pub spacing: f32,
}

impl Default for BrushPreset {
    fn default() -> Self {
        let config = texpaint_config::BrushConfig::default();
        Self::new("Default", config.radius, config.hardness, config.spacing)
    }
}

impl BrushPreset {
    /// Create a new brush preset with the given parameters
    pub fn new(name: impl Into<String>, radius: f32, hardness: f32, spacing: f32) -> Self {
        Self {
            name: name.into(),
            radius: radius.max(0.0),
            hardness: hardness.clamp(0.0, 1.0),
            spacing: spacing.max(0.01), // Prevent zero spacing
        }
    }

    /// Distance between consecutive dabs along a stroke
    pub fn spacing_distance(&self) -> f32 {
        self.radius * 2.0 * self.spacing
    }
}

/// Output from brush engine for a single dab
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dab {
    /// X position in texture coordinates
    pub x: f32,
    /// Y position in texture coordinates
    pub y: f32,
}

impl Dab {
    /// Nearest pixel center
    pub fn pixel(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// Brush engine that generates dabs from input
///
/// The brush engine interpolates between input points based on the
/// spacing setting so that fast drags still leave a continuous line.
#[derive(Debug, Clone)]
pub struct BrushEngine {
    /// Current brush preset
    preset: BrushPreset,
    /// Last position (None if stroke not started)
    last_pos: Option<(f32, f32)>,
    /// Path length travelled since the last emitted dab
    distance_since_dab: f32,
}

impl BrushEngine {
    /// Create a new brush engine with the given preset
    pub fn new(preset: BrushPreset) -> Self {
        Self {
            preset,
            last_pos: None,
            distance_since_dab: 0.0,
        }
    }

    /// Create a brush engine with default preset
    pub fn with_default_preset() -> Self {
        Self::new(BrushPreset::default())
    }

    /// Get the current preset
    pub fn preset(&self) -> &BrushPreset {
        &self.preset
    }

    /// Set a new brush preset
    pub fn set_preset(&mut self, preset: BrushPreset) {
        self.preset = preset;
    }

    /// Whether a stroke is in progress
    pub fn is_stroking(&self) -> bool {
        self.last_pos.is_some()
    }

    /// Start a new stroke
    pub fn begin_stroke(&mut self) {
        self.last_pos = None;
        self.distance_since_dab = 0.0;
    }

    /// Process input and generate dabs
    ///
    /// The first point of a stroke always yields a dab. Later points yield
    /// dabs every `spacing_distance` pixels along the path from the last
    /// point, carrying leftover distance into the next segment.
    pub fn stroke_to(&mut self, x: f32, y: f32) -> Vec<Dab> {
        let mut dabs = Vec::new();

        // First point in stroke - generate initial dab
        let Some((last_x, last_y)) = self.last_pos else {
            self.last_pos = Some((x, y));
            self.distance_since_dab = 0.0;
            debug!("BrushEngine::stroke_to: FIRST dab at ({:.1}, {:.1})", x, y);
            dabs.push(Dab { x, y });
            return dabs;
        };

        let dx = x - last_x;
        let dy = y - last_y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance < 0.001 {
            // No significant movement
            return dabs;
        }

        let spacing = self.preset.spacing_distance();
        if spacing < 0.001 {
            // Prevent infinite loop with zero spacing
            self.last_pos = Some((x, y));
            return dabs;
        }

        let mut offset = (spacing - self.distance_since_dab).max(0.0);
        let mut last_offset = None;
        while offset <= distance {
            let t = offset / distance;
            dabs.push(Dab {
                x: last_x + dx * t,
                y: last_y + dy * t,
            });
            last_offset = Some(offset);
            offset += spacing;
        }

        self.distance_since_dab = match last_offset {
            Some(last) => distance - last,
            None => self.distance_since_dab + distance,
        };
        self.last_pos = Some((x, y));

        if !dabs.is_empty() {
            debug!(
                "BrushEngine::stroke_to: generated {} dabs along path from ({:.1}, {:.1}) to ({:.1}, {:.1})",
                dabs.len(),
                last_x,
                last_y,
                x,
                y
            );
        }

        dabs
    }

    /// End the current stroke
    pub fn end_stroke(&mut self) {
        self.last_pos = None;
        self.distance_since_dab = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{WHITE, blend_over, from_rgba8, to_rgba8};

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_hardness_falloff() {
        // Hard brush (hardness = 1.0)
        assert_eq!(hardness_falloff(0.0, 1.0), 1.0);
        assert_eq!(hardness_falloff(0.5, 1.0), 1.0);
        assert_eq!(hardness_falloff(1.0, 1.0), 1.0);

        // Soft brush (hardness = 0.0): 1 - t^2
        assert_eq!(hardness_falloff(0.0, 0.0), 1.0);
        assert!((hardness_falloff(0.5, 0.0) - 0.75).abs() < 1e-6);
        assert_eq!(hardness_falloff(1.0, 0.0), 0.0);

        // hardness = 0.5: 1 - t
        assert!((hardness_falloff(0.25, 0.5) - 0.75).abs() < 1e-6);

        // Softer brushes fall off faster near the center
        assert!(hardness_falloff(0.25, 0.9) < hardness_falloff(0.25, 0.1));
    }

    #[test]
    fn test_end_to_end_small_disc() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        stamp(&mut buffer, 2, 2, RED, 1.0, 1.0);

        for (x, y) in [(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)] {
            assert_eq!(buffer.get(x, y), RED, "({x}, {y}) should be red");
        }
        for (x, y) in [(1, 1), (3, 1), (1, 3), (3, 3), (0, 0), (0, 2)] {
            assert_eq!(buffer.get_rgba8(x, y), [0, 0, 0, 0], "({x}, {y}) should be untouched");
        }
    }

    #[test]
    fn test_hard_brush_is_exact_disc() {
        let mut buffer = PixelBuffer::new(32, 32).unwrap();
        buffer.clear([0.2, 0.4, 0.6, 0.8]);
        let before = buffer.clone();
        let color = [0.0, 1.0, 0.0, 0.5];
        let radius = 5.5_f32;

        stamp(&mut buffer, 10, 12, color, radius, 1.0);

        for y in 0..32 {
            for x in 0..32 {
                let d2 = ((x - 10) * (x - 10) + (y - 12) * (y - 12)) as f32;
                let prior = before.get(x, y);
                if d2 <= radius * radius {
                    let expected = to_rgba8(blend_over(prior, color, color[3]));
                    assert_eq!(buffer.get_rgba8(x, y), expected);
                } else {
                    assert_eq!(buffer.get(x, y), prior);
                }
            }
        }
    }

    #[test]
    fn test_stamp_clips_at_edges() {
        let mut buffer = PixelBuffer::new(8, 8).unwrap();
        let rect = stamp(&mut buffer, 0, 0, RED, 3.0, 1.0).unwrap();
        assert_eq!(rect, PixelRect::new(0, 0, 4, 4));
        assert_eq!(buffer.get(0, 0), RED);
        assert_eq!(buffer.get(3, 0), RED);

        // Entirely off the buffer
        assert!(stamp(&mut buffer, -20, -20, RED, 3.0, 1.0).is_none());
    }

    #[test]
    fn test_far_off_canvas_center_reaching_back() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        let rect = stamp(&mut buffer, -50_000, 0, RED, 50_010.0, 1.0).unwrap();
        assert_eq!(rect, PixelRect::new(0, 0, 4, 4));
        assert_eq!(buffer.get(3, 3), RED);

        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        buffer.clear(WHITE);
        erase(&mut buffer, 2, -60_000, 60_000.0, 1.0);
        assert_eq!(buffer.get(2, 0), TRANSPARENT);
        assert_eq!(buffer.get(2, 1), WHITE);
    }

    #[test]
    fn test_non_positive_radius_is_noop() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        let before = buffer.clone();
        assert!(stamp(&mut buffer, 2, 2, RED, 0.0, 1.0).is_none());
        assert!(stamp(&mut buffer, 2, 2, RED, -3.0, 1.0).is_none());
        assert!(stamp(&mut buffer, 2, 2, RED, f32::NAN, 1.0).is_none());
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_soft_brush_fades_toward_edge() {
        let mut buffer = PixelBuffer::new(41, 41).unwrap();
        stamp(&mut buffer, 20, 20, RED, 20.0, 0.0);

        let center = buffer.get(20, 20)[3];
        let mid = buffer.get(30, 20)[3];
        let edge = buffer.get(39, 20)[3];
        assert_eq!(center, 1.0);
        assert!(mid < center && mid > edge);
        // Exactly on the rim the intensity reaches zero
        assert_eq!(buffer.get(40, 20)[3], 0.0);
    }

    #[test]
    fn test_erase_reduces_alpha() {
        let mut buffer = PixelBuffer::new(16, 16).unwrap();
        buffer.clear(RED);

        erase(&mut buffer, 8, 8, 4.0, 1.0);
        assert_eq!(buffer.get_rgba8(8, 8), [0, 0, 0, 0]);
        assert_eq!(buffer.get(0, 0), RED);

        // Soft eraser only partially removes paint away from the center
        let mut buffer = PixelBuffer::new(16, 16).unwrap();
        buffer.clear(WHITE);
        erase(&mut buffer, 8, 8, 6.0, 0.0);
        let alpha = from_rgba8(buffer.get_rgba8(12, 8))[3];
        assert!(alpha > 0.0 && alpha < 1.0);
    }

    #[test]
    fn test_brush_preset_default() {
        let preset = BrushPreset::default();
        assert_eq!(preset.name, "Default");
        assert_eq!(preset.radius, texpaint_config::DEFAULT_BRUSH_RADIUS);
        assert!(preset.spacing > 0.0);
    }

    #[test]
    fn test_brush_engine_first_dab() {
        let mut engine = BrushEngine::with_default_preset();
        engine.begin_stroke();

        let dabs = engine.stroke_to(100.0, 100.0);

        assert_eq!(dabs, vec![Dab { x: 100.0, y: 100.0 }]);
        assert!(engine.is_stroking());
    }

    #[test]
    fn test_brush_engine_interpolation() {
        // 50% of a 20px diameter = 10 pixels between dabs
        let mut engine = BrushEngine::new(BrushPreset::new("test", 10.0, 1.0, 0.5));
        engine.begin_stroke();

        let dabs = engine.stroke_to(0.0, 0.0);
        assert_eq!(dabs.len(), 1);

        let dabs = engine.stroke_to(50.0, 0.0);
        assert_eq!(dabs.len(), 5);
        for (dab, expected) in dabs.iter().zip([10.0, 20.0, 30.0, 40.0, 50.0]) {
            assert!((dab.x - expected).abs() < 1e-4);
            assert_eq!(dab.y, 0.0);
        }
    }

    #[test]
    fn test_brush_engine_carries_leftover_distance() {
        let mut engine = BrushEngine::new(BrushPreset::new("test", 10.0, 1.0, 0.5));
        engine.begin_stroke();
        engine.stroke_to(0.0, 0.0);

        // Move less than spacing distance - should generate no new dabs
        assert!(engine.stroke_to(6.0, 0.0).is_empty());

        // The next dab lands 10px from the first one, not 10px from x=6
        let dabs = engine.stroke_to(12.0, 0.0);
        assert_eq!(dabs.len(), 1);
        assert!((dabs[0].x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_brush_engine_end_stroke() {
        let mut engine = BrushEngine::with_default_preset();
        engine.begin_stroke();
        engine.stroke_to(0.0, 0.0);
        engine.stroke_to(50.0, 0.0);
        engine.end_stroke();
        assert!(!engine.is_stroking());

        // After ending, next stroke_to should generate first dab again
        engine.begin_stroke();
        let dabs = engine.stroke_to(100.0, 100.0);
        assert_eq!(dabs.len(), 1);
    }

    #[test]
    fn test_dab_pixel_rounding() {
        assert_eq!(Dab { x: 2.4, y: 2.6 }.pixel(), (2, 3));
    }
}

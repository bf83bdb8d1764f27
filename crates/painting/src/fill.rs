//! Tolerance-based 4-connected flood fill

use std::collections::VecDeque;

use tracing::debug;

use crate::color::{color_distance, to_rgba8};
use crate::constants::SAME_COLOR_EPSILON;
use crate::surface::PixelBuffer;
use crate::types::PixelRect;

/// Result of a flood fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillStats {
    /// Number of pixels written
    pub filled: usize,
    /// Bounding box of the written pixels
    pub bounds: Option<PixelRect>,
}

/// Breadth-first flood fill from a seed pixel
///
/// A pixel joins the region when it is 4-connected (no diagonals) to the
/// region and its distance to the seed's original color is within
/// `tolerance`. Matching is always against the original seed color, never
/// against pixels already filled, so the filled set does not depend on
/// traversal order. Each pixel is visited at most once.
///
/// An out-of-range seed, or a seed already within [`SAME_COLOR_EPSILON`] of
/// `fill_color`, leaves the buffer unchanged. Negative tolerance counts as 0.
pub fn flood_fill(
    buffer: &mut PixelBuffer,
    seed_x: i32,
    seed_y: i32,
    fill_color: [f32; 4],
    tolerance: f32,
) -> FillStats {
    if !buffer.contains(seed_x, seed_y) {
        return FillStats::default();
    }

    let target = buffer.get(seed_x, seed_y);
    if color_distance(target, fill_color) < SAME_COLOR_EPSILON {
        debug!(
            "flood_fill: seed ({}, {}) already matches fill color",
            seed_x, seed_y
        );
        return FillStats::default();
    }

    let tolerance = tolerance.max(0.0);
    let fill = to_rgba8(fill_color);
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;

    let mut visited = vec![false; width * height];
    let mut queue = VecDeque::new();
    let mut stats = FillStats::default();

    visited[seed_y as usize * width + seed_x as usize] = true;
    queue.push_back((seed_x, seed_y));

    while let Some((x, y)) = queue.pop_front() {
        buffer.set_rgba8(x, y, fill);
        stats.filled += 1;
        match stats.bounds.as_mut() {
            Some(bounds) => bounds.include(x as u32, y as u32),
            None => stats.bounds = Some(PixelRect::new(x as u32, y as u32, 1, 1)),
        }

        for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
            if !buffer.contains(nx, ny) {
                continue;
            }
            let index = ny as usize * width + nx as usize;
            if visited[index] {
                continue;
            }
            visited[index] = true;

            // Unvisited pixels still hold their original color
            if color_distance(buffer.get(nx, ny), target) <= tolerance {
                queue.push_back((nx, ny));
            }
        }
    }

    debug!(
        "flood_fill: seed ({}, {}) filled {} pixels (tolerance {:.3})",
        seed_x, seed_y, stats.filled, tolerance
    );
    stats
}

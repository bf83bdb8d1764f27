/// Default tile size used for dirty tracking.
pub const DEFAULT_TILE_SIZE: u32 = 128;

/// Colors closer than this (normalized RGBA distance) count as identical
/// when deciding whether a flood fill has anything to do.
pub const SAME_COLOR_EPSILON: f32 = 0.01;

/// Default flood fill tolerance.
pub const DEFAULT_FILL_TOLERANCE: f32 = texpaint_config::DEFAULT_FILL_TOLERANCE;

/// Channels per pixel (RGBA).
pub const CHANNELS: usize = 4;

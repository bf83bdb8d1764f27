//! Normalized RGBA color helpers and the straight-alpha blend used by every
//! painting and compositing operation.

/// Fully transparent black
pub const TRANSPARENT: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

/// Opaque white
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Opaque black
pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Quantize a normalized color to 8-bit samples (clamped, rounded)
#[inline]
pub fn to_rgba8(color: [f32; 4]) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Expand 8-bit samples to a normalized color
#[inline]
pub fn from_rgba8(pixel: [u8; 4]) -> [f32; 4] {
    pixel.map(|c| c as f32 / 255.0)
}

/// Euclidean distance between two normalized RGBA colors
///
/// Ranges from 0.0 (identical) to 2.0 (transparent black vs opaque white).
#[inline]
pub fn color_distance(a: [f32; 4], b: [f32; 4]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Straight (non-premultiplied) alpha composite of `src` over `dst`
///
/// `src_alpha` is the mixing weight for the color channels; the output
/// alpha accumulates as `src_alpha + dst_alpha * (1 - src_alpha)`.
#[inline]
pub fn blend_over(dst: [f32; 4], src: [f32; 4], src_alpha: f32) -> [f32; 4] {
    let src_alpha = src_alpha.clamp(0.0, 1.0);
    let inv_src_alpha = 1.0 - src_alpha;
    [
        src[0] * src_alpha + dst[0] * inv_src_alpha,
        src[1] * src_alpha + dst[1] * inv_src_alpha,
        src[2] * src_alpha + dst[2] * inv_src_alpha,
        src_alpha + dst[3] * inv_src_alpha,
    ]
}

/// Destination-out: scale every channel of `dst` by `1 - amount`
#[inline]
pub fn erase_from(dst: [f32; 4], amount: f32) -> [f32; 4] {
    let remaining = (1.0 - amount).clamp(0.0, 1.0);
    dst.map(|c| c * remaining)
}

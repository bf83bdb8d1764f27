//! CPU pixel buffer for painting - 8-bit RGBA storage

use crate::color::{blend_over, erase_from, from_rgba8, to_rgba8};
use crate::constants::CHANNELS;
use crate::error::TextureError;

/// An 8-bit RGBA CPU pixel buffer
///
/// Pixels are stored row-major as `[r, g, b, a]`. All color arguments and
/// return values are normalized `[f32; 4]`; quantization happens on write.
/// Coordinates are signed so that brush footprints may straddle the edges:
/// reads outside the buffer return transparent and writes are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl PixelBuffer {
    /// Create a new buffer with the given dimensions, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimension { width, height });
        }
        Ok(Self::zeroed(width, height))
    }

    /// Allocate without validating; callers guarantee non-zero dimensions
    pub(crate) fn zeroed(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0]; pixel_count],
        }
    }

    /// Wrap tightly packed RGBA8 bytes (`width * height * 4` of them)
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, TextureError> {
        let mut buffer = Self::new(width, height)?;
        let expected = buffer.pixels.len() * CHANNELS;
        if bytes.len() != expected {
            return Err(TextureError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        for (pixel, chunk) in buffer.pixels.iter_mut().zip(bytes.chunks_exact(CHANNELS)) {
            pixel.copy_from_slice(chunk);
        }
        Ok(buffer)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check whether a coordinate lies inside the buffer
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Get a pixel as a normalized color
    /// Returns transparent black if coordinates are out of bounds
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> [f32; 4] {
        from_rgba8(self.get_rgba8(x, y))
    }

    /// Get a pixel's raw samples
    /// Returns `[0, 0, 0, 0]` if coordinates are out of bounds
    #[inline]
    pub fn get_rgba8(&self, x: i32, y: i32) -> [u8; 4] {
        self.index(x, y).map_or([0, 0, 0, 0], |i| self.pixels[i])
    }

    /// Set a pixel from a normalized color
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: [f32; 4]) {
        self.set_rgba8(x, y, to_rgba8(color));
    }

    /// Set a pixel's raw samples
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_rgba8(&mut self, x: i32, y: i32, pixel: [u8; 4]) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = pixel;
        }
    }

    /// Blend a color onto an existing pixel using straight alpha compositing
    /// Formula: out = src * alpha + dst * (1 - alpha)
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: [f32; 4], src_alpha: f32) {
        if let Some(i) = self.index(x, y) {
            let dst = from_rgba8(self.pixels[i]);
            self.pixels[i] = to_rgba8(blend_over(dst, color, src_alpha));
        }
    }

    /// Erase a pixel toward transparent
    /// The erase_amount (0-1) determines how much of every channel is removed
    #[inline]
    pub fn erase_pixel(&mut self, x: i32, y: i32, erase_amount: f32) {
        if let Some(i) = self.index(x, y) {
            let dst = from_rgba8(self.pixels[i]);
            self.pixels[i] = to_rgba8(erase_from(dst, erase_amount));
        }
    }

    /// Clear the buffer to a solid color
    pub fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(to_rgba8(color));
    }

    /// Reallocate at a new size, keeping the overlapping top-left region
    ///
    /// This is a crop/pad, not a scale: pixels keep their absolute position
    /// and anything outside the old bounds is transparent. Zero dimensions
    /// are rejected and leave the buffer untouched.
    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<(), TextureError> {
        let mut resized = Self::new(new_width, new_height)?;

        let copy_width = self.width.min(new_width) as usize;
        let copy_height = self.height.min(new_height) as usize;
        let old_stride = self.width as usize;
        let new_stride = new_width as usize;

        for row in 0..copy_height {
            let src = row * old_stride;
            let dst = row * new_stride;
            resized.pixels[dst..dst + copy_width]
                .copy_from_slice(&self.pixels[src..src + copy_width]);
        }

        *self = resized;
        Ok(())
    }

    /// Get raw pixel data for GPU upload
    /// Returns tightly packed RGBA8 bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Get direct access to pixel data
    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Get mutable access to pixel data
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{TRANSPARENT, WHITE};

    #[test]
    fn test_new_buffer() {
        let buffer = PixelBuffer::new(100, 50).unwrap();
        assert_eq!(buffer.width(), 100);
        assert_eq!(buffer.height(), 50);
        assert_eq!(buffer.pixel_count(), 5000);
        assert!(buffer.pixels().iter().all(|p| *p == [0, 0, 0, 0]));
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert!(matches!(
            PixelBuffer::new(0, 10),
            Err(TextureError::InvalidDimension { width: 0, height: 10 })
        ));
        assert!(PixelBuffer::new(10, 0).is_err());
    }

    #[test]
    fn test_get_set_pixel() {
        let mut buffer = PixelBuffer::new(10, 10).unwrap();
        let color = [1.0, 0.0, 0.2, 1.0];

        buffer.set(5, 5, color);
        assert_eq!(buffer.get_rgba8(5, 5), [255, 0, 51, 255]);
        assert_eq!(buffer.get(5, 5), color);
        assert_eq!(buffer.get(4, 5), TRANSPARENT);
    }

    #[test]
    fn test_out_of_bounds_access_is_silent() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        buffer.clear(WHITE);
        let before = buffer.clone();

        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 4), (i32::MIN, i32::MAX), (100, 100)] {
            assert_eq!(buffer.get(x, y), TRANSPARENT);
            buffer.set(x, y, [1.0, 0.0, 0.0, 1.0]);
            buffer.blend_pixel(x, y, [1.0, 0.0, 0.0, 1.0], 1.0);
            buffer.erase_pixel(x, y, 1.0);
        }

        assert_eq!(buffer, before);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut once = PixelBuffer::new(6, 3).unwrap();
        once.set(1, 1, [0.0, 1.0, 0.0, 1.0]);
        let mut twice = once.clone();
        let color = [0.2, 0.4, 0.6, 0.8];

        once.clear(color);
        twice.clear(color);
        twice.clear(color);

        assert_eq!(once, twice);
        for y in 0..3 {
            for x in 0..6 {
                assert_eq!(once.get_rgba8(x, y), to_rgba8(color));
            }
        }
    }

    #[test]
    fn test_resize_preserves_overlap() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        let red = [1.0, 0.0, 0.0, 1.0];
        buffer.set(3, 2, red);

        buffer.resize(8, 3).unwrap();
        assert_eq!(buffer.width(), 8);
        assert_eq!(buffer.height(), 3);
        assert_eq!(buffer.get(3, 2), red);

        // Everything outside the old 4x4 region is transparent
        for y in 0..3 {
            for x in 4..8 {
                assert_eq!(buffer.get(x, y), TRANSPARENT);
            }
        }
    }

    #[test]
    fn test_resize_crops() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        buffer.clear(WHITE);
        buffer.resize(2, 2).unwrap();
        assert_eq!(buffer.pixel_count(), 4);
        assert!(buffer.pixels().iter().all(|p| *p == [255, 255, 255, 255]));
        assert_eq!(buffer.get(2, 2), TRANSPARENT);
    }

    #[test]
    fn test_resize_rejects_zero_and_keeps_buffer() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        buffer.clear(WHITE);
        let before = buffer.clone();
        assert!(buffer.resize(0, 4).is_err());
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_blend_pixel() {
        let mut buffer = PixelBuffer::new(10, 10).unwrap();

        // Start with white background
        buffer.clear(WHITE);

        // Blend 50% opaque red
        buffer.blend_pixel(5, 5, [1.0, 0.0, 0.0, 1.0], 0.5);

        let result = buffer.get(5, 5);
        assert!((result[0] - 1.0).abs() < 0.01);
        assert!((result[1] - 0.5).abs() < 0.01);
        assert!((result[2] - 0.5).abs() < 0.01);
        assert!((result[3] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_erase_pixel() {
        let mut buffer = PixelBuffer::new(2, 2).unwrap();
        buffer.clear(WHITE);
        buffer.erase_pixel(0, 0, 1.0);
        buffer.erase_pixel(1, 0, 0.5);
        assert_eq!(buffer.get_rgba8(0, 0), [0, 0, 0, 0]);
        assert_eq!(buffer.get_rgba8(1, 0), [128, 128, 128, 128]);
    }

    #[test]
    fn test_as_bytes() {
        let buffer = PixelBuffer::new(2, 2).unwrap();
        // 4 pixels * 4 samples
        assert_eq!(buffer.as_bytes().len(), 16);
    }

    #[test]
    fn test_from_rgba8() {
        let bytes: Vec<u8> = (0..16).collect();
        let buffer = PixelBuffer::from_rgba8(2, 2, &bytes).unwrap();
        assert_eq!(buffer.get_rgba8(1, 1), [12, 13, 14, 15]);
        assert_eq!(buffer.as_bytes(), bytes.as_slice());

        assert!(matches!(
            PixelBuffer::from_rgba8(2, 2, &bytes[..15]),
            Err(TextureError::BufferSize { expected: 16, actual: 15 })
        ));
    }
}

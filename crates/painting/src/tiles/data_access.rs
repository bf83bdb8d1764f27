//! Region reads and writes used for partial uploads and undo capture

use crate::surface::PixelBuffer;
use crate::types::PixelRect;

impl PixelBuffer {
    /// Get pixel data for a rectangular region
    /// Returns pixels in row-major order; the region is clamped to the buffer
    pub fn read_region(&self, rect: PixelRect) -> Vec<[u8; 4]> {
        let x_end = rect.right().min(self.width());
        let y_end = rect.bottom().min(self.height());
        let actual_width = x_end.saturating_sub(rect.x);
        let actual_height = y_end.saturating_sub(rect.y);

        if actual_width == 0 || actual_height == 0 {
            return Vec::new();
        }

        let stride = self.width() as usize;
        let mut data = Vec::with_capacity((actual_width * actual_height) as usize);
        for row in rect.y..y_end {
            let start = row as usize * stride + rect.x as usize;
            data.extend_from_slice(&self.pixels()[start..start + actual_width as usize]);
        }
        data
    }

    /// Same as [`PixelBuffer::read_region`] but as packed RGBA8 bytes
    pub fn region_bytes(&self, rect: PixelRect) -> Vec<u8> {
        bytemuck::cast_slice(&self.read_region(rect)).to_vec()
    }

    /// Write back data previously produced by [`PixelBuffer::read_region`]
    /// for the same rectangle; pixels beyond the data or the buffer are skipped
    pub fn write_region(&mut self, rect: PixelRect, data: &[[u8; 4]]) {
        let x_end = rect.right().min(self.width());
        let y_end = rect.bottom().min(self.height());
        let actual_width = x_end.saturating_sub(rect.x) as usize;
        if actual_width == 0 {
            return;
        }

        let stride = self.width() as usize;
        let rows = data.chunks(actual_width);
        for (row, chunk) in (rect.y..y_end).zip(rows) {
            let start = row as usize * stride + rect.x as usize;
            self.pixels_mut()[start..start + chunk.len()].copy_from_slice(chunk);
        }
    }
}

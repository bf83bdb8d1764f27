//! Image decode/encode boundary for pixel buffers
//!
//! Formats are chosen by file extension. Decode failures while loading are
//! recovered with a 1x1 opaque-white placeholder so callers can keep
//! working; save failures never leave a partial file at the destination.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::WHITE;
use crate::error::TextureError;
use crate::surface::PixelBuffer;

/// Image file formats supported for layer textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFormat {
    Png,
    Jpeg,
    Bmp,
    Tga,
}

impl TextureFormat {
    /// Map a file extension (case-insensitive, without the dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            "tga" => Some(Self::Tga),
            _ => None,
        }
    }

    /// Determine the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self, TextureError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
            .ok_or_else(|| TextureError::UnsupportedFormat(path.display().to_string()))
    }

    /// Canonical file extension
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Tga => "tga",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tga => ImageFormat::Tga,
        }
    }
}

impl PixelBuffer {
    /// 1x1 opaque-white placeholder used when a decode fails
    pub fn fallback() -> Self {
        let mut buffer = Self::zeroed(1, 1);
        buffer.clear(WHITE);
        buffer
    }

    /// Decode an encoded image, guessing the format from its contents
    pub fn decode(bytes: &[u8]) -> Result<Self, TextureError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| TextureError::Decode(e.to_string()))?;
        Self::from_image(image)
    }

    /// Decode an encoded image of a known format
    pub fn decode_with_format(bytes: &[u8], format: TextureFormat) -> Result<Self, TextureError> {
        let image = image::load_from_memory_with_format(bytes, format.image_format())
            .map_err(|e| TextureError::Decode(e.to_string()))?;
        Self::from_image(image)
    }

    /// Decode an encoded image, degrading to [`PixelBuffer::fallback`]
    ///
    /// The decode error, if any, is returned alongside the buffer so the
    /// caller can surface it.
    pub fn load_from_image(bytes: &[u8]) -> (Self, Option<TextureError>) {
        Self::or_fallback(Self::decode(bytes))
    }

    /// Read and decode an image file
    ///
    /// Unknown extensions and read failures are hard errors; a file that
    /// cannot be decoded degrades to the placeholder like
    /// [`PixelBuffer::load_from_image`].
    pub fn load_from_path(
        path: impl AsRef<Path>,
    ) -> Result<(Self, Option<TextureError>), TextureError> {
        let path = path.as_ref();
        let format = TextureFormat::from_path(path)?;
        let bytes = fs::read(path)?;
        debug!("Loading {:?} texture from {}", format, path.display());
        Ok(Self::or_fallback(Self::decode_with_format(&bytes, format)))
    }

    fn or_fallback(result: Result<Self, TextureError>) -> (Self, Option<TextureError>) {
        match result {
            Ok(buffer) => (buffer, None),
            Err(err) => {
                warn!("Texture decode failed, using placeholder: {}", err);
                (Self::fallback(), Some(err))
            }
        }
    }

    fn from_image(image: DynamicImage) -> Result<Self, TextureError> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.as_raw())
    }

    /// Copy into an `image` crate buffer
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width(), self.height());
        image.copy_from_slice(self.as_bytes());
        image
    }

    /// Encode into memory. JPEG output drops the alpha channel.
    pub fn encode(&self, format: TextureFormat) -> Result<Vec<u8>, TextureError> {
        let image = DynamicImage::ImageRgba8(self.to_rgba_image());
        let image = match format {
            TextureFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
            _ => image,
        };

        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, format.image_format())
            .map_err(|e| TextureError::Encode(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    /// Encode and write to `path`, format chosen by extension
    ///
    /// The image is encoded fully in memory and written to a sibling temp
    /// file that is renamed into place, so a failure never leaves a partial
    /// file at `path`.
    pub fn save_to_image(&self, path: impl AsRef<Path>) -> Result<(), TextureError> {
        let path = path.as_ref();
        let format = TextureFormat::from_path(path)?;
        let encoded = self.encode(format)?;

        let temp_path = temp_path_for(path);
        if let Err(err) = fs::write(&temp_path, &encoded).and_then(|()| fs::rename(&temp_path, path))
        {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }

        debug!(
            "Saved {}x{} {:?} texture to {} ({} bytes)",
            self.width(),
            self.height(),
            format,
            path.display(),
            encoded.len()
        );
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.partial"))
}

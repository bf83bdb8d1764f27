//! Saving and loading a layer stack as a project directory
//!
//! A project is a directory holding `project.json` (the manifest) and one
//! PNG per layer. The manifest references textures by bare file name, so a
//! project directory can be moved or copied as a whole.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ProjectError, TextureError};
use crate::layer::{Layer, LayerInfo};
use crate::stack::LayerStack;
use crate::surface::PixelBuffer;

/// Manifest file name inside a project directory
pub const MANIFEST_FILE: &str = "project.json";

/// Manifest format version written by this crate
pub const PROJECT_VERSION: u32 = 1;

/// One layer entry in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    #[serde(flatten)]
    pub info: LayerInfo,
    /// Texture file name relative to the project directory
    pub texture: String,
}

/// Contents of `project.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub version: u32,
    pub texture_width: u32,
    pub texture_height: u32,
    /// Selected layer, None for an empty stack
    pub current_layer: Option<usize>,
    /// Next auto-naming number, so names are not reused after reload
    #[serde(default = "default_layer_counter")]
    pub layer_counter: u32,
    /// Layers bottom to top
    pub layers: Vec<LayerRecord>,
}

fn default_layer_counter() -> u32 {
    1
}

impl ProjectManifest {
    fn validate(&self) -> Result<(), ProjectError> {
        if self.version != PROJECT_VERSION {
            return Err(ProjectError::InvalidManifest(format!(
                "unsupported version {} (expected {})",
                self.version, PROJECT_VERSION
            )));
        }
        if self.texture_width == 0 || self.texture_height == 0 {
            return Err(ProjectError::InvalidManifest(format!(
                "texture size {}x{}",
                self.texture_width, self.texture_height
            )));
        }
        match self.current_layer {
            Some(index) if index >= self.layers.len() => {
                return Err(ProjectError::InvalidManifest(format!(
                    "current layer {} out of range ({} layers)",
                    index,
                    self.layers.len()
                )));
            }
            None if !self.layers.is_empty() => {
                return Err(ProjectError::InvalidManifest(
                    "no current layer in a non-empty project".to_string(),
                ));
            }
            _ => {}
        }
        for record in &self.layers {
            let mut components = Path::new(&record.texture).components();
            let plain = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !plain {
                return Err(ProjectError::InvalidManifest(format!(
                    "texture path '{}' is not a plain file name",
                    record.texture
                )));
            }
        }
        Ok(())
    }
}

fn texture_file_name(index: usize) -> String {
    format!("layer_{index:03}.png")
}

/// Write every layer and the manifest into `dir` (created if missing)
pub fn save_project(
    stack: &LayerStack,
    dir: impl AsRef<Path>,
) -> Result<ProjectManifest, ProjectError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut layers = Vec::with_capacity(stack.len());
    for (index, layer) in stack.iter().enumerate() {
        let texture = texture_file_name(index);
        layer.buffer().save_to_image(dir.join(&texture))?;
        layers.push(LayerRecord {
            info: layer.info(),
            texture,
        });
    }

    let manifest = ProjectManifest {
        version: PROJECT_VERSION,
        texture_width: stack.width(),
        texture_height: stack.height(),
        current_layer: stack.current_layer_index(),
        layer_counter: stack.layer_counter(),
        layers,
    };

    let json = serde_json::to_string_pretty(&manifest)?;
    let path = dir.join(MANIFEST_FILE);
    let temp_path = dir.join(format!(".{MANIFEST_FILE}.partial"));
    if let Err(err) = fs::write(&temp_path, json).and_then(|()| fs::rename(&temp_path, &path)) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    remove_stale_textures(dir, &manifest)?;

    info!(
        "Saved project with {} layers to {}",
        manifest.layers.len(),
        dir.display()
    );
    Ok(manifest)
}

/// Delete `layer_*.png` files left by an earlier save with more layers
fn remove_stale_textures(dir: &Path, manifest: &ProjectManifest) -> Result<(), ProjectError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let is_texture = name.starts_with("layer_") && name.ends_with(".png");
        if !is_texture || manifest.layers.iter().any(|record| record.texture == name) {
            continue;
        }
        if let Err(err) = fs::remove_file(entry.path()) {
            warn!("Cannot remove stale texture {}: {}", name, err);
        }
    }
    Ok(())
}

/// Read a project directory back into a layer stack
///
/// Layer textures that are missing or cannot be decoded do not fail the
/// load: a missing file becomes a transparent layer, an undecodable one the
/// 1x1 placeholder, and each problem is returned alongside the stack.
pub fn load_project(
    dir: impl AsRef<Path>,
) -> Result<(LayerStack, Vec<TextureError>), ProjectError> {
    let dir = dir.as_ref();
    let reader = BufReader::new(File::open(dir.join(MANIFEST_FILE))?);
    let manifest: ProjectManifest = serde_json::from_reader(reader)?;
    manifest.validate()?;

    let mut stack = LayerStack::new(manifest.texture_width, manifest.texture_height)?;
    let mut warnings = Vec::new();

    for record in &manifest.layers {
        let buffer = match PixelBuffer::load_from_path(dir.join(&record.texture)) {
            Ok((buffer, decode_err)) => {
                warnings.extend(decode_err);
                buffer
            }
            Err(err) => {
                warn!(
                    "Layer '{}': cannot read {} ({}), using a blank layer",
                    record.info.name, record.texture, err
                );
                warnings.push(err);
                PixelBuffer::new(manifest.texture_width, manifest.texture_height)?
            }
        };

        let mut layer = Layer::from_buffer(record.info.name.clone(), buffer);
        layer.apply_info(&record.info);
        stack.push_layer(layer);
    }

    if let Some(index) = manifest.current_layer {
        stack.set_current_layer_index(index);
    }
    stack.set_layer_counter(manifest.layer_counter);

    info!(
        "Loaded project with {} layers from {} ({} warnings)",
        stack.len(),
        dir.display(),
        warnings.len()
    );
    Ok((stack, warnings))
}

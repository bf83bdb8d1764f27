//! Ordered layer collection with a current-layer selection and compositing

use texpaint_config::TextureConfig;
use tracing::debug;

use crate::color::{blend_over, from_rgba8, to_rgba8};
use crate::error::TextureError;
use crate::layer::Layer;
use crate::surface::PixelBuffer;

/// Ordered stack of layers; index 0 is the bottom
///
/// Owns every layer exclusively. Whenever the stack is non-empty the
/// current index is a valid layer index.
#[derive(Debug, Clone)]
pub struct LayerStack {
    layers: Vec<Layer>,
    current: usize,
    width: u32,
    height: u32,
    /// Next number used for "Layer N" names; never reused
    layer_counter: u32,
    next_layer_id: u64,
}

impl LayerStack {
    /// Create an empty stack whose new layers are `width` x `height`
    pub fn new(width: u32, height: u32) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimension { width, height });
        }
        Ok(Self {
            layers: Vec::new(),
            current: 0,
            width,
            height,
            layer_counter: 1,
            next_layer_id: 1,
        })
    }

    /// Create an empty stack from texture configuration
    pub fn from_config(config: &TextureConfig) -> Result<Self, TextureError> {
        Self::new(config.width, config.height)
    }

    /// Configured texture width
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Configured texture height
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number that the next auto-named layer will get
    #[inline]
    pub fn layer_counter(&self) -> u32 {
        self.layer_counter
    }

    pub(crate) fn set_layer_counter(&mut self, counter: u32) {
        self.layer_counter = counter.max(1);
    }

    /// Append an auto-named ("Layer N") blank layer and select it
    pub fn add_layer(&mut self) -> Result<usize, TextureError> {
        let name = format!("Layer {}", self.layer_counter);
        let index = self.add_named_layer(name)?;
        self.layer_counter += 1;
        Ok(index)
    }

    /// Append a blank layer with the given name and select it
    pub fn add_named_layer(&mut self, name: impl Into<String>) -> Result<usize, TextureError> {
        let layer = Layer::new(name, self.width, self.height)?;
        Ok(self.push_layer(layer))
    }

    /// Append a layer decoded from an image and select it
    ///
    /// The layer keeps the image's own dimensions. A decode failure still
    /// adds the 1x1 placeholder layer and returns the error alongside.
    pub fn add_layer_from_image(
        &mut self,
        name: impl Into<String>,
        bytes: &[u8],
    ) -> (usize, Option<TextureError>) {
        let (layer, err) = Layer::from_image(name, bytes);
        (self.push_layer(layer), err)
    }

    /// Append an existing layer and select it; returns its index
    pub fn push_layer(&mut self, mut layer: Layer) -> usize {
        layer.set_id(self.next_layer_id);
        self.next_layer_id += 1;
        debug!("Adding layer '{}' (id {})", layer.name(), layer.id());
        self.layers.push(layer);
        self.current = self.layers.len() - 1;
        self.current
    }

    /// Remove a layer; returns false if the index is out of range
    ///
    /// The current index is re-clamped to `min(current, len - 1)`.
    pub fn remove_layer(&mut self, index: usize) -> bool {
        if index >= self.layers.len() {
            return false;
        }
        let layer = self.layers.remove(index);
        debug!("Removed layer '{}' at index {}", layer.name(), index);
        self.current = self.current.min(self.layers.len().saturating_sub(1));
        true
    }

    /// Remove every layer (the naming counter keeps counting)
    pub fn clear_layers(&mut self) {
        self.layers.clear();
        self.current = 0;
    }

    /// Index of the current layer, None when the stack is empty
    pub fn current_layer_index(&self) -> Option<usize> {
        (!self.layers.is_empty()).then_some(self.current)
    }

    /// Select a layer; out-of-range indices are ignored
    pub fn set_current_layer_index(&mut self, index: usize) {
        if index < self.layers.len() {
            self.current = index;
        }
    }

    pub fn current_layer(&self) -> Option<&Layer> {
        self.layers.get(self.current)
    }

    pub fn current_layer_mut(&mut self) -> Option<&mut Layer> {
        self.layers.get_mut(self.current)
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Index of the layer with the given stable id
    pub fn index_of(&self, id: u64) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id() == id)
    }

    /// Layers bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.iter_mut()
    }

    /// Flip a layer's visibility; returns false if the index is out of range
    pub fn toggle_visibility(&mut self, index: usize) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.set_visible(!layer.is_visible());
                true
            }
            None => false,
        }
    }

    /// Move a layer to a new position; the selection follows the layer it
    /// pointed at. Returns false if either index is out of range.
    pub fn move_layer(&mut self, from: usize, to: usize) -> bool {
        let len = self.layers.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }

        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);

        if self.current == from {
            self.current = to;
        } else if from < self.current && to >= self.current {
            self.current -= 1;
        } else if from > self.current && to <= self.current {
            self.current += 1;
        }
        true
    }

    /// Move a layer one step toward the top
    pub fn move_up(&mut self, index: usize) -> bool {
        self.move_layer(index, index + 1)
    }

    /// Move a layer one step toward the bottom
    pub fn move_down(&mut self, index: usize) -> bool {
        index > 0 && self.move_layer(index, index - 1)
    }

    /// Change the texture size for new layers and crop/pad every existing one
    pub fn resize_textures(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimension { width, height });
        }
        for layer in &mut self.layers {
            layer.resize(width, height)?;
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Flatten visible layers bottom to top into one buffer
    ///
    /// Each layer pixel is composited over the accumulator with
    /// `src_alpha = pixel.a * layer.opacity`, the same straight-alpha blend
    /// the brush uses. Hidden layers contribute nothing; layers smaller or
    /// larger than the stack are clipped to the top-left overlap.
    pub fn composite(&self) -> PixelBuffer {
        let width = self.width as usize;
        let height = self.height as usize;
        let mut accumulator = vec![[0.0_f32; 4]; width * height];

        for layer in self.layers.iter().filter(|layer| layer.is_visible()) {
            let opacity = layer.opacity();
            if opacity <= 0.0 {
                continue;
            }

            let source = layer.buffer();
            let src_stride = source.width() as usize;
            let overlap_width = width.min(src_stride);
            let overlap_height = height.min(source.height() as usize);

            for row in 0..overlap_height {
                let src_row = &source.pixels()[row * src_stride..row * src_stride + overlap_width];
                let dst_row = &mut accumulator[row * width..row * width + overlap_width];
                for (dst, src) in dst_row.iter_mut().zip(src_row) {
                    if src[3] == 0 {
                        continue;
                    }
                    let src = from_rgba8(*src);
                    *dst = blend_over(*dst, src, src[3] * opacity);
                }
            }
        }

        let mut output = PixelBuffer::zeroed(self.width, self.height);
        for (pixel, color) in output.pixels_mut().iter_mut().zip(&accumulator) {
            *pixel = to_rgba8(*color);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{TRANSPARENT, WHITE};

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

    fn stack_with(count: usize) -> LayerStack {
        let mut stack = LayerStack::new(4, 4).unwrap();
        for _ in 0..count {
            stack.add_layer().unwrap();
        }
        stack
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert!(LayerStack::new(0, 4).is_err());
        let stack = LayerStack::from_config(&TextureConfig::new(8, 2)).unwrap();
        assert_eq!((stack.width(), stack.height()), (8, 2));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_add_layer_appends_and_selects() {
        let mut stack = stack_with(2);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.current_layer_index(), Some(1));
        assert_eq!(stack.current_layer().unwrap().name(), "Layer 2");

        let index = stack.add_named_layer("Details").unwrap();
        assert_eq!(index, 2);
        assert_eq!(stack.current_layer().unwrap().name(), "Details");
        assert_eq!((stack.get(2).unwrap().width(), stack.get(2).unwrap().height()), (4, 4));
    }

    #[test]
    fn test_auto_names_are_never_reused() {
        let mut stack = stack_with(2);
        assert!(stack.remove_layer(1));
        stack.add_layer().unwrap();
        let names: Vec<&str> = stack.iter().map(|layer| layer.name()).collect();
        assert_eq!(names, vec!["Layer 1", "Layer 3"]);

        // Named layers do not consume a number
        stack.add_named_layer("Custom").unwrap();
        stack.clear_layers();
        stack.add_layer().unwrap();
        assert_eq!(stack.current_layer().unwrap().name(), "Layer 4");
    }

    #[test]
    fn test_remove_clamps_current_index() {
        let mut stack = stack_with(3);
        assert_eq!(stack.current_layer_index(), Some(2));

        assert!(stack.remove_layer(2));
        assert_eq!(stack.current_layer_index(), Some(1));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_remove_out_of_range_and_from_empty() {
        let mut stack = stack_with(1);
        assert!(!stack.remove_layer(5));
        assert_eq!(stack.len(), 1);

        assert!(stack.remove_layer(0));
        assert!(stack.is_empty());
        assert_eq!(stack.current_layer_index(), None);
        assert!(stack.current_layer().is_none());

        assert!(!stack.remove_layer(0));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_set_current_ignores_out_of_range() {
        let mut stack = stack_with(3);
        stack.set_current_layer_index(0);
        assert_eq!(stack.current_layer_index(), Some(0));
        stack.set_current_layer_index(3);
        assert_eq!(stack.current_layer_index(), Some(0));
    }

    #[test]
    fn test_toggle_visibility() {
        let mut stack = stack_with(1);
        assert!(stack.toggle_visibility(0));
        assert!(!stack.get(0).unwrap().is_visible());
        assert!(stack.toggle_visibility(0));
        assert!(stack.get(0).unwrap().is_visible());
        assert!(!stack.toggle_visibility(1));
    }

    #[test]
    fn test_move_layer_keeps_selection() {
        let mut stack = stack_with(3);
        stack.set_current_layer_index(0);

        // Move the selected layer to the top
        assert!(stack.move_layer(0, 2));
        assert_eq!(stack.current_layer().unwrap().name(), "Layer 1");
        assert_eq!(stack.current_layer_index(), Some(2));

        // Move another layer across the selection
        stack.set_current_layer_index(1);
        assert!(stack.move_layer(0, 2));
        assert_eq!(stack.current_layer().unwrap().name(), "Layer 3");
        assert_eq!(stack.current_layer_index(), Some(0));

        assert!(!stack.move_layer(0, 3));
        assert!(!stack.move_down(0));
        assert!(stack.move_up(0));
        assert!(!stack.move_up(2));
    }

    #[test]
    fn test_layer_ids_are_stable() {
        let mut stack = stack_with(3);
        let id = stack.get(2).unwrap().id();
        stack.move_layer(2, 0);
        assert_eq!(stack.index_of(id), Some(0));
        stack.remove_layer(0);
        assert_eq!(stack.index_of(id), None);
    }

    #[test]
    fn test_resize_textures() {
        let mut stack = stack_with(2);
        stack.current_layer_mut().unwrap().paint(1, 1, RED, 0.5, 1.0);
        stack.resize_textures(8, 2).unwrap();
        assert_eq!((stack.width(), stack.height()), (8, 2));
        for layer in stack.iter() {
            assert_eq!((layer.width(), layer.height()), (8, 2));
        }
        assert_eq!(stack.get(1).unwrap().get_pixel(1, 1), RED);
        assert!(stack.resize_textures(0, 2).is_err());

        stack.add_layer().unwrap();
        assert_eq!(stack.current_layer().unwrap().width(), 8);
    }

    #[test]
    fn test_composite_empty_is_transparent() {
        let stack = stack_with(0);
        let out = stack.composite();
        assert_eq!((out.width(), out.height()), (4, 4));
        assert!(out.pixels().iter().all(|p| *p == [0, 0, 0, 0]));
    }

    #[test]
    fn test_composite_order_and_visibility() {
        let mut stack = stack_with(2);
        stack.get_mut(0).unwrap().clear(RED);
        stack.get_mut(1).unwrap().paint(0, 0, BLUE, 0.5, 1.0);

        let out = stack.composite();
        assert_eq!(out.get(0, 0), BLUE);
        assert_eq!(out.get(1, 1), RED);

        stack.toggle_visibility(1);
        assert_eq!(stack.composite().get(0, 0), RED);

        stack.toggle_visibility(0);
        assert_eq!(stack.composite().get(0, 0), TRANSPARENT);
    }

    #[test]
    fn test_composite_applies_opacity() {
        let mut stack = stack_with(2);
        stack.get_mut(0).unwrap().clear(WHITE);
        let top = stack.get_mut(1).unwrap();
        top.clear(RED);
        top.set_opacity(0.5);

        let out = stack.composite();
        let pixel = out.get(2, 2);
        assert!((pixel[0] - 1.0).abs() < 0.01);
        assert!((pixel[1] - 0.5).abs() < 0.01);
        assert!((pixel[2] - 0.5).abs() < 0.01);
        assert!((pixel[3] - 1.0).abs() < 0.01);

        // Layer pixels keep full strength
        assert_eq!(stack.get(1).unwrap().get_pixel(2, 2), RED);
    }

    #[test]
    fn test_composite_clips_mismatched_layers() {
        let mut stack = stack_with(0);
        let mut big = PixelBuffer::new(6, 6).unwrap();
        big.clear(RED);
        stack.push_layer(Layer::from_buffer("Big", big));
        let mut small = PixelBuffer::new(1, 1).unwrap();
        small.clear(BLUE);
        stack.push_layer(Layer::from_buffer("Small", small));

        let out = stack.composite();
        assert_eq!((out.width(), out.height()), (4, 4));
        assert_eq!(out.get(0, 0), BLUE);
        assert_eq!(out.get(3, 3), RED);
    }

    #[test]
    fn test_add_layer_from_image() {
        let mut stack = stack_with(0);
        let mut buffer = PixelBuffer::new(2, 3).unwrap();
        buffer.clear(BLUE);
        let png = buffer.encode(crate::codec::TextureFormat::Png).unwrap();

        let (index, err) = stack.add_layer_from_image("Decal", &png);
        assert!(err.is_none());
        assert_eq!(stack.current_layer_index(), Some(index));
        assert_eq!(stack.get(index).unwrap().buffer(), &buffer);

        let (index, err) = stack.add_layer_from_image("Broken", b"nope");
        assert!(err.is_some());
        assert_eq!(stack.get(index).unwrap().get_pixel(0, 0), WHITE);
    }
}

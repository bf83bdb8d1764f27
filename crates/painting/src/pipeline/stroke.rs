//! Stroke handling for the paint session

use std::collections::HashMap;

use tracing::debug;

use crate::brush::{BrushPreset, dab_bounds};
use crate::tools::{Tool, apply_tool};

use super::{ActiveStroke, PaintSession, UndoEntry};

impl PaintSession {
    /// Begin a stroke on the current layer at surface position `(x, y)`
    ///
    /// Continuous tools lay down their first dab here; click tools (fill,
    /// stamp) act here and ignore the rest of the drag. Returns false when
    /// there is no layer to paint on.
    pub fn begin_stroke(&mut self, x: f32, y: f32) -> bool {
        if self.current_stroke.is_some() {
            debug!("begin_stroke: previous stroke still active, ending it");
            self.end_stroke();
        }

        let Some(layer) = self.stack.current_layer() else {
            debug!("begin_stroke: no current layer, ignoring");
            return false;
        };

        let stroke_id = self.next_stroke_id;
        self.next_stroke_id += 1;
        self.current_stroke = Some(ActiveStroke {
            stroke_id,
            layer_id: layer.id(),
            width: layer.width(),
            height: layer.height(),
            captured: HashMap::new(),
        });
        debug!(
            "begin_stroke: stroke {} with {:?} on layer '{}'",
            stroke_id,
            self.tool,
            layer.name()
        );

        if self.tool.is_continuous() {
            self.brush.set_preset(BrushPreset::new(
                "Session",
                self.settings.radius,
                self.settings.hardness,
                self.spacing,
            ));
            self.brush.begin_stroke();
            self.stroke_to(x, y);
        } else {
            self.apply_dab(x.round() as i32, y.round() as i32);
        }
        true
    }

    /// Continue the stroke to `(x, y)`
    ///
    /// Dabs are interpolated along the path at the preset's spacing.
    pub fn stroke_to(&mut self, x: f32, y: f32) {
        if self.current_stroke.is_none() {
            debug!("stroke_to: no active stroke, ignoring");
            return;
        }
        if !self.tool.is_continuous() {
            return;
        }

        for dab in self.brush.stroke_to(x, y) {
            let (px, py) = dab.pixel();
            self.apply_dab(px, py);
        }
    }

    /// Apply the tool once, capturing the tiles it may touch first
    fn apply_dab(&mut self, x: i32, y: i32) {
        let Some(stroke) = self.current_stroke.as_mut() else {
            return;
        };
        // The layer may have been removed mid-stroke
        let Some(index) = self.stack.index_of(stroke.layer_id) else {
            return;
        };
        let Some(layer) = self.stack.get_mut(index) else {
            return;
        };

        // Tiles captured before a resize no longer line up with the layer
        if (layer.width(), layer.height()) != (stroke.width, stroke.height) {
            debug!(
                "apply_dab: layer '{}' resized during stroke {}, dropping {} captured tiles",
                layer.name(),
                stroke.stroke_id,
                stroke.captured.len()
            );
            stroke.captured.clear();
            stroke.width = layer.width();
            stroke.height = layer.height();
        }

        let coords = match self.tool {
            Tool::Fill => layer.tiles().all_tiles(),
            _ => match dab_bounds(layer.buffer(), x, y, self.settings.radius) {
                Some(rect) => layer.tiles().tiles_in_rect(rect),
                None => return,
            },
        };
        for coord in coords {
            stroke
                .captured
                .entry(coord)
                .or_insert_with(|| layer.read_tile(coord));
        }

        apply_tool(self.tool, &self.settings, layer, x, y);
    }

    /// Finish the stroke and record it for undo
    pub fn end_stroke(&mut self) {
        self.brush.end_stroke();
        let Some(stroke) = self.current_stroke.take() else {
            return;
        };

        if stroke.captured.is_empty() {
            debug!("end_stroke: stroke {} touched nothing", stroke.stroke_id);
            return;
        }

        let Some(layer) = self
            .stack
            .index_of(stroke.layer_id)
            .and_then(|index| self.stack.get(index))
        else {
            return;
        };
        if (layer.width(), layer.height()) != (stroke.width, stroke.height) {
            debug!(
                "end_stroke: layer '{}' resized during stroke {}, not recording it",
                layer.name(),
                stroke.stroke_id
            );
            return;
        }

        debug!(
            "end_stroke: stroke {} captured {} tiles",
            stroke.stroke_id,
            stroke.captured.len()
        );
        let entry = UndoEntry {
            stroke_id: stroke.stroke_id,
            layer_id: stroke.layer_id,
            width: stroke.width,
            height: stroke.height,
            tiles: stroke.captured,
        };
        self.push_undo(entry);
    }

    /// Abandon the stroke, restoring every tile it touched
    pub fn cancel_stroke(&mut self) {
        self.brush.end_stroke();
        let Some(stroke) = self.current_stroke.take() else {
            return;
        };

        let Some(layer) = self
            .stack
            .index_of(stroke.layer_id)
            .and_then(|index| self.stack.get_mut(index))
        else {
            return;
        };
        if (layer.width(), layer.height()) != (stroke.width, stroke.height) {
            debug!(
                "cancel_stroke: layer '{}' resized during stroke {}, nothing to restore",
                layer.name(),
                stroke.stroke_id
            );
            return;
        }
        for (coord, data) in &stroke.captured {
            layer.write_tile(*coord, data);
        }
        debug!(
            "cancel_stroke: stroke {} reverted {} tiles",
            stroke.stroke_id,
            stroke.captured.len()
        );
    }

    /// Begin and immediately end a stroke at `(x, y)`
    pub fn click(&mut self, x: f32, y: f32) -> bool {
        let started = self.begin_stroke(x, y);
        self.end_stroke();
        started
    }

    /// Check if currently in a stroke
    pub fn is_stroking(&self) -> bool {
        self.current_stroke.is_some()
    }
}

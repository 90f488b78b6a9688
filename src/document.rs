//! The converted drawing: layers plus the diagnostics gathered on the way.

use crate::error::Result;
use crate::geometry::{GeometrySink, LayerTable};
use crate::notification::NotificationCollection;

/// Result of a conversion run.
///
/// Whatever geometry accumulated is always available here, even when parts
/// of the input were skipped; the skips are recorded in `notifications`.
#[derive(Debug)]
pub struct GeometryDocument {
    /// All layers, index 0 being the reserved default layer.
    pub layers: LayerTable,
    /// Non-fatal issues encountered during conversion.
    pub notifications: NotificationCollection,
}

impl GeometryDocument {
    /// Flush every non-empty layer into `sink`.
    ///
    /// Per layer: the triangle mesh (when any triangles exist), then wire
    /// chains, point markers and text fragments.  A negative color number
    /// is normalized to white (7) on the way out.
    pub fn write_to_sink(&self, sink: &mut dyn GeometrySink) -> Result<()> {
        for layer in self.layers.iter() {
            if !layer.has_geometry() {
                continue;
            }
            let color = if layer.color_number < 0 {
                7
            } else {
                layer.color_number
            };
            if !layer.triangles.is_empty() {
                sink.write_mesh(
                    &layer.name,
                    color,
                    layer.vertex_tree.points(),
                    &layer.triangles,
                )?;
            }
            if !layer.wires.is_empty() {
                sink.write_wires(&layer.name, color, &layer.wires)?;
            }
            if !layer.markers.is_empty() {
                sink.write_markers(&layer.name, color, &layer.markers)?;
            }
            if !layer.texts.is_empty() {
                sink.write_text(&layer.name, color, &layer.texts)?;
            }
        }
        Ok(())
    }
}

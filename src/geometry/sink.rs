//! Geometry sink seam.
//!
//! The converter accumulates geometry per layer; where it goes afterwards
//! (a CAD database, a renderer, a file) is the sink's business.  Payload
//! shapes mirror what a layer holds: one mesh (shared vertex array plus
//! triangle indices) and the untriangulated leftovers.

use super::{TextFragment, Triangle, Wire};
use crate::error::Result;
use crate::types::Vector3;

/// Receives converted geometry, one call per non-empty payload per layer.
pub trait GeometrySink {
    /// A triangle mesh: `triangles` index into `vertices`.
    fn write_mesh(
        &mut self,
        layer: &str,
        color: i32,
        vertices: &[Vector3],
        triangles: &[Triangle],
    ) -> Result<()>;

    /// Wire chains (tessellated curves, polylines, outlines).
    fn write_wires(&mut self, layer: &str, color: i32, wires: &[Wire]) -> Result<()>;

    /// Point markers.  Sinks that do not care can keep the default no-op.
    fn write_markers(&mut self, _layer: &str, _color: i32, _points: &[Vector3]) -> Result<()> {
        Ok(())
    }

    /// Laid-out text fragments.  Default is a no-op.
    fn write_text(&mut self, _layer: &str, _color: i32, _texts: &[TextFragment]) -> Result<()> {
        Ok(())
    }
}

/// A mesh payload captured by [`MemorySink`].
#[derive(Debug, Clone)]
pub struct MeshPayload {
    pub layer: String,
    pub color: i32,
    pub vertices: Vec<Vector3>,
    pub triangles: Vec<Triangle>,
}

/// A wire payload captured by [`MemorySink`].
#[derive(Debug, Clone)]
pub struct WirePayload {
    pub layer: String,
    pub color: i32,
    pub wires: Vec<Wire>,
}

/// An in-memory sink collecting every payload, mainly for tests and for
/// callers that post-process the geometry themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub meshes: Vec<MeshPayload>,
    pub wires: Vec<WirePayload>,
    pub markers: Vec<(String, i32, Vec<Vector3>)>,
    pub texts: Vec<(String, i32, Vec<TextFragment>)>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeometrySink for MemorySink {
    fn write_mesh(
        &mut self,
        layer: &str,
        color: i32,
        vertices: &[Vector3],
        triangles: &[Triangle],
    ) -> Result<()> {
        self.meshes.push(MeshPayload {
            layer: layer.to_string(),
            color,
            vertices: vertices.to_vec(),
            triangles: triangles.to_vec(),
        });
        Ok(())
    }

    fn write_wires(&mut self, layer: &str, color: i32, wires: &[Wire]) -> Result<()> {
        self.wires.push(WirePayload {
            layer: layer.to_string(),
            color,
            wires: wires.to_vec(),
        });
        Ok(())
    }

    fn write_markers(&mut self, layer: &str, color: i32, points: &[Vector3]) -> Result<()> {
        self.markers
            .push((layer.to_string(), color, points.to_vec()));
        Ok(())
    }

    fn write_text(&mut self, layer: &str, color: i32, texts: &[TextFragment]) -> Result<()> {
        self.texts.push((layer.to_string(), color, texts.to_vec()));
        Ok(())
    }
}

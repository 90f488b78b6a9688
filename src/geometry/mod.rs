//! Boundary geometry model: layers, the vertex dedup index, and the
//! payload types handed to a geometry sink.

pub mod curve;
pub mod layer;
pub mod sink;
pub mod vertex_tree;

pub use curve::CurveEvaluator;
pub use layer::{EntityCounts, Layer, LayerTable};
pub use sink::{GeometrySink, MemorySink};
pub use vertex_tree::VertexTree;

use crate::types::Vector3;

/// A triangle as three indices into a layer's vertex array.
///
/// Degenerate triangles (two equal indices) are never stored; see
/// [`Layer::add_triangle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub v1: u32,
    pub v2: u32,
    pub v3: u32,
}

impl Triangle {
    /// Create a new triangle.
    pub fn new(v1: u32, v2: u32, v3: u32) -> Self {
        Triangle { v1, v2, v3 }
    }

    /// True when any two corners share a vertex index.
    pub fn is_degenerate(&self) -> bool {
        self.v1 == self.v2 || self.v2 == self.v3 || self.v3 == self.v1
    }
}

/// An untriangulated chain of points (tessellated curve, polyline, outline).
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub points: Vec<Vector3>,
    /// Whether the last point connects back to the first.
    pub closed: bool,
}

impl Wire {
    /// An open chain.
    pub fn open(points: Vec<Vector3>) -> Self {
        Wire {
            points,
            closed: false,
        }
    }

    /// A closed loop.
    pub fn closed(points: Vec<Vector3>) -> Self {
        Wire {
            points,
            closed: true,
        }
    }
}

/// One laid-out line of text.
///
/// Glyph rendering is the sink's concern; the converter resolves escapes,
/// alignment and attachment into an origin, a height and a rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub origin: Vector3,
    pub height: f64,
    /// Rotation in degrees, counter-clockwise about the origin.
    pub rotation_degrees: f64,
}

//! Layers and the layer registry.
//!
//! A layer owns its own vertex dedup index, triangle list, wire chains and
//! per-entity-kind counters.  Layers are created lazily as entities (or
//! LAYER table entries) reference them, and live for the whole conversion.

use super::{TextFragment, Triangle, VertexTree, Wire};
use crate::types::Vector3;

/// The ACI color sentinel meaning "inherit from the layer".
pub const BY_LAYER_COLOR: i32 = 256;

/// Name of the reserved default layer at index 0.
pub const DEFAULT_LAYER_NAME: &str = "noname";

/// Default ACI color (white).
pub const DEFAULT_COLOR: i32 = 7;

/// Per-entity-kind counters for one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub line: usize,
    pub solid: usize,
    pub polyline: usize,
    pub lwpolyline: usize,
    pub ellipse: usize,
    pub circle: usize,
    pub spline: usize,
    pub arc: usize,
    pub text: usize,
    pub mtext: usize,
    pub attrib: usize,
    pub dimension: usize,
    pub leader: usize,
    pub face3d: usize,
    pub point: usize,
}

impl EntityCounts {
    /// Total number of finalized entities on the layer.
    pub fn total(&self) -> usize {
        self.line
            + self.solid
            + self.polyline
            + self.lwpolyline
            + self.ellipse
            + self.circle
            + self.spline
            + self.arc
            + self.text
            + self.mtext
            + self.attrib
            + self.dimension
            + self.leader
            + self.face3d
            + self.point
    }
}

/// A named, colored grouping of converted geometry.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Layer name (scrubbed of characters the sink cannot accept).
    pub name: String,
    /// ACI color number.
    pub color_number: i32,
    /// Vertex dedup index backing the triangle list.
    pub vertex_tree: VertexTree,
    /// Triangles indexing into `vertex_tree`.
    pub triangles: Vec<Triangle>,
    /// Untriangulated chains.
    pub wires: Vec<Wire>,
    /// Laid-out text.
    pub texts: Vec<TextFragment>,
    /// Point markers.
    pub markers: Vec<Vector3>,
    /// Entity counters.
    pub counts: EntityCounts,
}

impl Layer {
    /// Create an empty layer with a fresh vertex tree.
    pub fn new(name: impl Into<String>, color_number: i32, tol_sq: f64) -> Self {
        Layer {
            name: name.into(),
            color_number,
            vertex_tree: VertexTree::new(tol_sq),
            triangles: Vec::new(),
            wires: Vec::new(),
            texts: Vec::new(),
            markers: Vec::new(),
            counts: EntityCounts::default(),
        }
    }

    /// Append a triangle, silently skipping degenerate ones.
    pub fn add_triangle(&mut self, v1: u32, v2: u32, v3: u32) {
        let tri = Triangle::new(v1, v2, v3);
        if tri.is_degenerate() {
            return;
        }
        self.triangles.push(tri);
    }

    /// True when the layer holds anything worth handing to a sink.
    pub fn has_geometry(&self) -> bool {
        !self.triangles.is_empty()
            || !self.wires.is_empty()
            || !self.texts.is_empty()
            || !self.markers.is_empty()
    }
}

/// Registry of layers, keyed by (name, color) or name alone depending on
/// the matching policy in effect.
///
/// Index 0 is always the reserved default layer.  Lookup scans in creation
/// order, so layer indices are deterministic for a given input.
#[derive(Debug, Clone)]
pub struct LayerTable {
    layers: Vec<Layer>,
    tol_sq: f64,
}

impl LayerTable {
    /// Create a table containing only the default layer.
    pub fn new(tol_sq: f64) -> Self {
        Self {
            layers: vec![Layer::new(DEFAULT_LAYER_NAME, DEFAULT_COLOR, tol_sq)],
            tol_sq,
        }
    }

    /// Resolve a layer index, creating the layer on first use.
    ///
    /// Matching policy: with colors honored (`ignore_colors` and
    /// `color_by_layer` both off) and a color other than the BYLAYER
    /// sentinel, layers match on (name, color); otherwise on name alone.
    pub fn get_or_create(
        &mut self,
        name: &str,
        color: i32,
        ignore_colors: bool,
        color_by_layer: bool,
    ) -> usize {
        let split_by_color = !ignore_colors && !color_by_layer && color != BY_LAYER_COLOR;
        for (i, layer) in self.layers.iter().enumerate().skip(1) {
            let matched = if split_by_color {
                layer.name == name && layer.color_number == color
            } else {
                layer.name == name
            };
            if matched {
                return i;
            }
        }
        self.layers.push(Layer::new(name, color, self.tol_sq));
        self.layers.len() - 1
    }

    /// Layer by index.
    pub fn get(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    /// Mutable layer by index.
    pub fn get_mut(&mut self, index: usize) -> &mut Layer {
        &mut self.layers[index]
    }

    /// First layer with the given name, if any.
    pub fn find(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Number of layers, including the default layer.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false: the default layer exists from construction.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterate layers in creation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.layers.iter()
    }
}

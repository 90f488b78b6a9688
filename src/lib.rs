//! # dxf-geom
//!
//! A pure Rust library for converting DXF drawings into layered boundary
//! geometry: deduplicated vertex arrays, triangle meshes and wire chains
//! grouped by layer.
//!
//! ## Features
//!
//! - Streaming group-code record parser with permissive legacy numeric
//!   handling
//! - Section and entity state machines covering the common drawing
//!   entities (lines, polylines, polygon and polyface meshes, circles,
//!   arcs, ellipses, splines, solids, 3D faces, text, leaders, points)
//! - Block instancing with composed 4x4 transforms, replayed from
//!   materialized definitions so inputs never need to be seekable
//! - Per-layer spatial vertex deduplication under a configurable tolerance
//! - Unit conversion driven by the drawing's `$INSUNITS` header variable
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dxf_geom::{DxfConverter, MemorySink};
//!
//! // Convert a DXF file into the in-memory geometry model
//! let document = DxfConverter::from_file("sample.dxf")?.convert()?;
//!
//! // Inspect the layers
//! for layer in document.layers.iter() {
//!     println!("{}: {} triangles", layer.name, layer.triangles.len());
//! }
//!
//! // Or hand everything to a geometry sink
//! let mut sink = MemorySink::new();
//! document.write_to_sink(&mut sink)?;
//! # Ok::<(), dxf_geom::DxfError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`DxfConverter`] - the streaming parser / state machine
//! - [`GeometryDocument`] - the converted layers plus diagnostics
//! - [`GeometrySink`] - trait receiving the per-layer payloads
//! - [`CurveEvaluator`] - external collaborator sampling spline curves

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod document;
pub mod error;
pub mod geometry;
pub mod io;
pub mod notification;
pub mod types;

// Re-export commonly used types
pub use error::{DxfError, Result};
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use types::{Matrix4, TransformStack, Vector2, Vector3};

// Re-export the geometry model
pub use geometry::{
    CurveEvaluator, EntityCounts, GeometrySink, Layer, LayerTable, MemorySink, TextFragment,
    Triangle, VertexTree, Wire,
};

// Re-export the document
pub use document::GeometryDocument;

// Re-export the converter
pub use io::dxf::{CodePair, ConversionConfig, DxfConverter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

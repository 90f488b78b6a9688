//! DXF record-stream converter.
//!
//! Drives the section/entity state machines over the record stream and
//! accumulates boundary geometry per layer.  Block definitions are
//! materialized as record lists during the BLOCKS section and instanced by
//! replaying them through the same dispatcher under a composed transform,
//! so the input only needs to be `Read`, never `Seek`.

mod entities;
mod record_reader;
mod sections;
mod text_format;

pub use entities::{PolylineFlags, SplineFlags, VertexFlags};
pub use record_reader::{CodePair, RecordReader};

use crate::document::GeometryDocument;
use crate::error::Result;
use crate::geometry::curve::CurveEvaluator;
use crate::geometry::layer::{DEFAULT_COLOR, DEFAULT_LAYER_NAME};
use crate::geometry::LayerTable;
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::{TransformStack, Vector3};
use entities::{EntityBuffers, EntityState};
use indexmap::IndexMap;
use sections::{BlockCapture, HeaderVariable, Section, TableState};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;

/// Millimeter factors for the `$INSUNITS` selector codes 0..=20.
pub(crate) const UNIT_FACTORS: [f64; 21] = [
    1.0,        // 0  unitless
    25.4,       // 1  inches
    304.8,      // 2  feet
    1609344.0,  // 3  miles
    1.0,        // 4  millimeters
    10.0,       // 5  centimeters
    1000.0,     // 6  meters
    1000000.0,  // 7  kilometers
    0.0000254,  // 8  microinches
    0.0254,     // 9  mils
    914.4,      // 10 yards
    1.0e-7,     // 11 angstroms
    1.0e-6,     // 12 nanometers
    1.0e-3,     // 13 microns
    100.0,      // 14 decimeters
    10000.0,    // 15 decameters
    100000.0,   // 16 hectometers
    1.0e+12,    // 17 gigameters
    1.495979e+14, // 18 astronomical units
    9.460730e+18, // 19 light years
    3.085678e+19, // 20 parsecs
];

/// Nesting limit for block replay; a self-referential block otherwise
/// recurses forever.
pub(crate) const MAX_INSERT_DEPTH: usize = 64;

/// Configuration for the converter.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Never split layers by color.
    pub ignore_colors: bool,
    /// Treat entity colors as inherited from the layer, so layers key on
    /// name alone.  Also set by the `$CECOLOR` header variable.
    pub color_by_layer: bool,
    /// Vertex merge distance; compared squared.
    pub tolerance: f64,
    /// Post-multiplies every coordinate, on top of the unit factor.
    pub scale_factor: f64,
    /// Segment count for a full circle.
    pub segs_per_circle: usize,
    /// Segment count for spline tessellation; the `$SPLINESEGS` header
    /// variable overrides this.
    pub spline_segments: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            ignore_colors: false,
            color_by_layer: false,
            tolerance: 0.01,
            scale_factor: 1.0,
            segs_per_circle: 32,
            spline_segments: 16,
        }
    }
}

/// A block definition: recorded once in the BLOCKS section, instanced by
/// replaying its records.  Name, handle and base point are kept for
/// diagnostics even though instancing only needs the record list.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub(crate) struct Block {
    pub name: String,
    pub handle: String,
    pub base: Vector3,
    pub records: Rc<Vec<CodePair>>,
}

/// Streaming DXF to boundary-geometry converter.
pub struct DxfConverter<R: Read> {
    reader: RecordReader<R>,
    pub(crate) config: ConversionConfig,
    pub(crate) evaluator: Option<Box<dyn CurveEvaluator>>,

    // parse state
    pub(crate) section: Section,
    pub(crate) table_state: TableState,
    pub(crate) entity_state: EntityState,
    pub(crate) pending_header_var: Option<HeaderVariable>,
    pub(crate) curr_layer_name: String,
    pub(crate) curr_color: i32,
    pub(crate) color_by_layer: bool,
    pub(crate) units_factor: f64,
    pub(crate) spline_segs: usize,
    pub(crate) xform: TransformStack,

    // registries
    pub(crate) layers: LayerTable,
    pub(crate) blocks: IndexMap<String, Block>,
    pub(crate) capture: Option<BlockCapture>,
    pub(crate) pending_layer_name: Option<String>,
    pub(crate) pending_layer_color: i32,

    // entity accumulation
    pub(crate) ent: EntityBuffers,
    pub(crate) notifications: NotificationCollection,

    // precomputed full-circle step rotation
    pub(crate) sin_delta: f64,
    pub(crate) cos_delta: f64,
}

impl DxfConverter<File> {
    /// Create a converter reading from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> DxfConverter<R> {
    /// Create a converter with the default configuration.
    pub fn new(reader: R) -> Self {
        Self::with_configuration(reader, ConversionConfig::default())
    }

    /// Create a converter with an explicit configuration.
    pub fn with_configuration(reader: R, config: ConversionConfig) -> Self {
        let segs = config.segs_per_circle.max(1);
        let delta = std::f64::consts::TAU / segs as f64;
        let tol_sq = config.tolerance * config.tolerance;
        Self {
            reader: RecordReader::new(reader),
            evaluator: None,
            section: Section::Unknown,
            table_state: TableState::Unknown,
            entity_state: EntityState::Unknown,
            pending_header_var: None,
            curr_layer_name: DEFAULT_LAYER_NAME.to_string(),
            curr_color: DEFAULT_COLOR,
            color_by_layer: config.color_by_layer,
            units_factor: 1.0,
            spline_segs: config.spline_segments.max(1),
            xform: TransformStack::new(),
            layers: LayerTable::new(tol_sq),
            blocks: IndexMap::new(),
            capture: None,
            pending_layer_name: None,
            pending_layer_color: 0,
            ent: EntityBuffers::default(),
            notifications: NotificationCollection::new(),
            sin_delta: delta.sin(),
            cos_delta: delta.cos(),
            config: ConversionConfig {
                segs_per_circle: segs,
                ..config
            },
        }
    }

    /// Attach a spline curve evaluator.
    pub fn with_curve_evaluator(mut self, evaluator: Box<dyn CurveEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Set the fallback byte encoding of the input.
    pub fn with_encoding(mut self, encoding: &'static encoding_rs::Encoding) -> Self {
        self.reader.set_encoding(encoding);
        self
    }

    /// Run the conversion to completion.
    ///
    /// Only an I/O failure on the input aborts; everything else degrades to
    /// notifications on the returned document.
    pub fn convert(mut self) -> Result<GeometryDocument> {
        while let Some(pair) = self.reader.read_pair()? {
            self.dispatch(&pair);
        }

        if self.reader.truncated() {
            self.notifications.notify(
                NotificationType::Warning,
                "input ended in the middle of a record",
            );
        }
        if self.capture.is_some() {
            self.notifications.notify(
                NotificationType::Warning,
                "input ended inside a BLOCK definition",
            );
        }

        Ok(GeometryDocument {
            layers: self.layers,
            notifications: self.notifications,
        })
    }

    /// Route one record through the state machine.  Reentrant: block replay
    /// feeds recorded pairs back through here.
    pub(crate) fn dispatch(&mut self, pair: &CodePair) {
        if pair.code == 999 {
            // comment record
            return;
        }
        match self.section {
            Section::Unknown => self.unknown_code(pair),
            Section::Header => self.header_code(pair),
            Section::Classes | Section::Objects | Section::Thumbnail => {
                self.passthrough_code(pair)
            }
            Section::Tables => self.tables_code(pair),
            Section::Blocks => self.blocks_code(pair),
            Section::Entities => self.entity_code(pair),
        }
    }

    /// Factor applied to every coordinate as it is parsed.
    pub(crate) fn coord_scale(&self) -> f64 {
        self.units_factor * self.config.scale_factor
    }

    /// Resolve the current (layer, color) pair to a layer index, creating
    /// the layer on first use.
    pub(crate) fn get_layer(&mut self) -> usize {
        self.layers.get_or_create(
            &self.curr_layer_name,
            self.curr_color,
            self.config.ignore_colors,
            self.color_by_layer,
        )
    }

    pub(crate) fn notify(&mut self, nt: NotificationType, message: impl Into<String>) {
        self.notifications.notify(nt, message);
    }
}

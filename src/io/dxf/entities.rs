//! Entity-level state machine and geometry assembly.
//!
//! While the ENTITIES section (or a replayed block body) is active, each
//! record routes to the handler for the entity being accumulated.  The
//! terminating code-0 record finalizes the entity — transform, dedup,
//! tessellate, count, emit — resets the sub-state and is immediately
//! re-dispatched through the unknown handler so the next entity header is
//! never lost.

use super::record_reader::CodePair;
use super::sections::{scrub_name, Section};
use super::text_format::{
    expand_control_codes, layout_mtext, layout_text, MTextLayout, TextLayout,
};
use super::{DxfConverter, MAX_INSERT_DEPTH};
use crate::geometry::Wire;
use crate::notification::NotificationType;
use crate::types::{Matrix4, Vector3};
use bitflags::bitflags;
use std::io::Read;
use std::rc::Rc;

/// Entity sub-states, one per entity kind plus the idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum EntityState {
    #[default]
    Unknown,
    Polyline,
    PolylineVertex,
    Face3d,
    Line,
    Insert,
    Point,
    Circle,
    Arc,
    Dimension,
    Text,
    Solid,
    LwPolyline,
    MText,
    Leader,
    Attrib,
    AttDef,
    Ellipse,
    Spline,
}

bitflags! {
    /// POLYLINE flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PolylineFlags: u32 {
        const CLOSED        = 1;
        const CURVE_FIT     = 2;
        const SPLINE_FIT    = 4;
        const POLYLINE_3D   = 8;
        const MESH_3D       = 16;
        const CLOSED_N      = 32;
        const POLYFACE_MESH = 64;
        const PATTERN       = 128;
    }
}

bitflags! {
    /// POLYLINE VERTEX flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VertexFlags: u32 {
        const EXTRA          = 1;
        const CURVE_FIT      = 2;
        const SPLINE_VERTEX  = 8;
        const SPLINE_CONTROL = 16;
        const POLYLINE_3D    = 32;
        const MESH_3D        = 64;
        const FACE           = 128;
    }
}

bitflags! {
    /// SPLINE flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SplineFlags: u32 {
        const CLOSED   = 1;
        const PERIODIC = 2;
        const RATIONAL = 4;
        const PLANAR   = 8;
        const LINEAR   = 16;
    }
}

/// POLYLINE accumulation; `chain` doubles as the shared point buffer for
/// LWPOLYLINE and LEADER chains.
#[derive(Debug, Default)]
pub(crate) struct PolylineBuf {
    pub flags: PolylineFlags,
    pub mesh_m: usize,
    pub mesh_n: usize,
    pub chain: Vec<Vector3>,
    pub mesh_indices: Vec<u32>,
    /// Staged X for LWPOLYLINE (Y commits the point).
    pub lw_x: f64,
}

#[derive(Debug, Default)]
pub(crate) struct VertexBuf {
    pub pt: Vector3,
    pub flags: VertexFlags,
    pub face: [i32; 4],
}

#[derive(Debug, Default)]
pub(crate) struct LineBuf {
    pub pts: [Vector3; 2],
}

#[derive(Debug)]
pub(crate) struct SolidBuf {
    pub pts: [Vector3; 4],
    pub last_slot: i32,
}

impl Default for SolidBuf {
    fn default() -> Self {
        Self {
            pts: [Vector3::ZERO; 4],
            last_slot: -1,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Face3dBuf {
    pub pts: [Vector3; 4],
}

#[derive(Debug)]
pub(crate) struct InsertBuf {
    pub block_name: Option<String>,
    pub insert_pt: Vector3,
    pub scale: Vector3,
    pub rotation_degrees: f64,
    /// Accepted from the stream, not yet applied to the instance transform.
    #[allow(dead_code)]
    pub extrude_dir: Vector3,
}

impl Default for InsertBuf {
    fn default() -> Self {
        Self {
            block_name: None,
            insert_pt: Vector3::ZERO,
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation_degrees: 0.0,
            extrude_dir: Vector3::UNIT_Z,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CircleBuf {
    pub center: Vector3,
    pub radius: f64,
}

#[derive(Debug, Default)]
pub(crate) struct ArcBuf {
    pub center: Vector3,
    pub radius: f64,
    pub start_degrees: f64,
    pub end_degrees: f64,
}

#[derive(Debug)]
pub(crate) struct EllipseBuf {
    pub center: Vector3,
    pub major_axis: Vector3,
    pub ratio: f64,
    pub start: f64,
    pub end: f64,
}

impl Default for EllipseBuf {
    fn default() -> Self {
        Self {
            center: Vector3::ZERO,
            major_axis: Vector3::UNIT_X,
            ratio: 1.0,
            start: 0.0,
            end: std::f64::consts::TAU,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SplineBuf {
    pub flags: SplineFlags,
    pub degree: i32,
    pub knots: Vec<f64>,
    pub weights: Vec<f64>,
    pub control_points: Vec<Vector3>,
    pub fit_points: Vec<Vector3>,
    pub weight_count: usize,
    pub ctl_pending: Vector3,
    pub ctl_coords: usize,
    pub fit_pending: Vector3,
    pub fit_coords: usize,
}

#[derive(Debug, Default)]
pub(crate) struct TextBuf {
    pub text: Option<String>,
    pub first: Vector3,
    pub second: Vector3,
    pub height: f64,
    pub rotation_degrees: f64,
    pub horizontal: i32,
    pub vertical: i32,
}

#[derive(Debug, Default)]
pub(crate) struct MTextBuf {
    pub text: String,
    pub insertion: Vector3,
    pub x_axis: Vector3,
    pub text_height: f64,
    pub char_width: f64,
    pub entity_height: f64,
    pub rotation_degrees: f64,
    pub attach_point: i32,
}

#[derive(Debug, Default)]
pub(crate) struct DimensionBuf {
    pub block_name: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct PointBuf {
    pub pt: Vector3,
}

#[derive(Debug, Default)]
pub(crate) struct LeaderBuf {
    /// Tracked for diagnostics; arrow heads produce no geometry.
    #[allow(dead_code)]
    pub arrowhead: i32,
    pub pt: Vector3,
}

/// All per-entity accumulators, owned by the converter and reset as each
/// entity finalizes.
#[derive(Debug, Default)]
pub(crate) struct EntityBuffers {
    pub polyline: PolylineBuf,
    pub vertex: VertexBuf,
    pub line: LineBuf,
    pub solid: SolidBuf,
    pub face3d: Face3dBuf,
    pub insert: InsertBuf,
    pub circle: CircleBuf,
    pub arc: ArcBuf,
    pub ellipse: EllipseBuf,
    pub spline: SplineBuf,
    pub text: TextBuf,
    pub mtext: MTextBuf,
    pub dimension: DimensionBuf,
    pub point: PointBuf,
    pub leader: LeaderBuf,
}

impl<R: Read> DxfConverter<R> {
    pub(crate) fn entity_code(&mut self, pair: &CodePair) {
        match self.entity_state {
            EntityState::Unknown => self.entity_unknown(pair),
            EntityState::Polyline => self.polyline_code(pair),
            EntityState::PolylineVertex => self.polyline_vertex_code(pair),
            EntityState::Face3d => self.face3d_code(pair),
            EntityState::Line => self.line_code(pair),
            EntityState::Insert => self.insert_code(pair),
            EntityState::Point => self.point_code(pair),
            EntityState::Circle => self.circle_code(pair),
            EntityState::Arc => self.arc_code(pair),
            EntityState::Dimension => self.dimension_code(pair),
            EntityState::Solid => self.solid_code(pair),
            EntityState::LwPolyline => self.lwpolyline_code(pair),
            EntityState::MText => self.mtext_code(pair),
            EntityState::Leader => self.leader_code(pair),
            EntityState::Text | EntityState::Attrib | EntityState::AttDef => {
                self.text_code(pair)
            }
            EntityState::Ellipse => self.ellipse_code(pair),
            EntityState::Spline => self.spline_code(pair),
        }
    }

    /// Idle entity state: select the next entity kind, close sections, pop
    /// block instances.
    pub(crate) fn entity_unknown(&mut self, pair: &CodePair) {
        if pair.code != 0 {
            return;
        }
        match pair.value.as_str() {
            "SECTION" | "ENDSEC" => self.section = Section::Unknown,
            "POLYLINE" => {
                self.ent.polyline = PolylineBuf::default();
                self.entity_state = EntityState::Polyline;
            }
            "LWPOLYLINE" => {
                self.ent.polyline = PolylineBuf::default();
                self.entity_state = EntityState::LwPolyline;
            }
            "3DFACE" => {
                self.ent.face3d = Face3dBuf::default();
                self.entity_state = EntityState::Face3d;
            }
            "LINE" => {
                self.ent.line = LineBuf::default();
                self.entity_state = EntityState::Line;
            }
            "INSERT" => {
                self.ent.insert = InsertBuf::default();
                self.entity_state = EntityState::Insert;
            }
            "POINT" => {
                self.ent.point = PointBuf::default();
                self.entity_state = EntityState::Point;
            }
            "CIRCLE" => {
                self.ent.circle = CircleBuf::default();
                self.entity_state = EntityState::Circle;
            }
            "ARC" => {
                self.ent.arc = ArcBuf::default();
                self.entity_state = EntityState::Arc;
            }
            "DIMENSION" => {
                self.ent.dimension = DimensionBuf::default();
                self.entity_state = EntityState::Dimension;
            }
            "TEXT" => {
                self.ent.text = TextBuf::default();
                self.entity_state = EntityState::Text;
            }
            "ATTRIB" => {
                self.ent.text = TextBuf::default();
                self.entity_state = EntityState::Attrib;
            }
            "ATTDEF" => {
                self.ent.text = TextBuf::default();
                self.entity_state = EntityState::AttDef;
            }
            "SOLID" => {
                self.ent.solid = SolidBuf::default();
                self.entity_state = EntityState::Solid;
            }
            "MTEXT" => {
                self.ent.mtext = MTextBuf::default();
                self.entity_state = EntityState::MText;
            }
            "LEADER" => {
                self.ent.leader = LeaderBuf::default();
                self.ent.polyline.chain.clear();
                self.entity_state = EntityState::Leader;
            }
            "ELLIPSE" => {
                self.ent.ellipse = EllipseBuf::default();
                self.entity_state = EntityState::Ellipse;
            }
            "SPLINE" => {
                self.ent.spline = SplineBuf::default();
                self.entity_state = EntityState::Spline;
            }
            "VIEWPORT" => {
                // nothing useful in a viewport
            }
            "ENDBLK" => {
                // end of a replayed block instance
                if self.xform.pop().is_none() {
                    self.notify(
                        NotificationType::Warning,
                        "block terminator with no active instance, ignored",
                    );
                }
            }
            other => self.notify(
                NotificationType::Warning,
                format!("unrecognized entity type encountered (ignoring): {other}"),
            ),
        }
    }

    fn set_layer_from(&mut self, pair: &CodePair) {
        self.curr_layer_name = scrub_name(&pair.value);
    }

    // ── POLYLINE / VERTEX ──────────────────────────────────────────────

    fn polyline_code(&mut self, pair: &CodePair) {
        match pair.code {
            0 => match pair.value.as_str() {
                "SEQEND" => self.finalize_polyline(),
                "VERTEX" => {
                    self.ent.vertex = VertexBuf::default();
                    self.entity_state = EntityState::PolylineVertex;
                }
                other => self.notify(
                    NotificationType::Warning,
                    format!("unrecognized text string while in polyline entity: {other}"),
                ),
            },
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            70 => {
                self.ent.polyline.flags = PolylineFlags::from_bits_truncate(pair.as_i32() as u32)
            }
            71 => self.ent.polyline.mesh_m = pair.as_i32().max(0) as usize,
            72 => self.ent.polyline.mesh_n = pair.as_i32().max(0) as usize,
            _ => {}
        }
    }

    fn polyline_vertex_code(&mut self, pair: &CodePair) {
        match pair.code {
            0 => self.finalize_polyline_vertex(pair),
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            70 => self.ent.vertex.flags = VertexFlags::from_bits_truncate(pair.as_i32() as u32),
            71..=74 => {
                let slot = ((pair.code % 70) - 1) as usize;
                self.ent.vertex.face[slot] = pair.as_i32().abs();
            }
            10 | 20 | 30 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.vertex.pt.set_coord(axis, value);
            }
            _ => {}
        }
    }

    fn finalize_polyline_vertex(&mut self, pair: &CodePair) {
        let layer = self.get_layer();
        let flags = self.ent.vertex.flags;

        if flags == VertexFlags::FACE {
            self.emit_mesh_face(layer);
        } else if flags.contains(VertexFlags::MESH_3D) {
            let world = self.xform.current().transform_point(self.ent.vertex.pt);
            let index = self.layers.get_mut(layer).vertex_tree.add(world);
            self.ent.polyline.mesh_indices.push(index);
        } else {
            let pt = self.ent.vertex.pt;
            self.ent.polyline.chain.push(pt);
        }

        self.entity_state = EntityState::Polyline;
        self.polyline_code(pair);
    }

    /// Emit one or two triangles from a polyface face record's 1-based
    /// indices into the accumulated mesh-vertex list.
    fn emit_mesh_face(&mut self, layer: usize) {
        let face = self.ent.vertex.face;
        let mut resolved = [None; 4];
        for (slot, &v) in face.iter().enumerate() {
            if v >= 1 {
                resolved[slot] = self
                    .ent
                    .polyline
                    .mesh_indices
                    .get((v - 1) as usize)
                    .copied();
            }
        }
        let (f0, f1, f2) = match (resolved[0], resolved[1], resolved[2]) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => {
                self.notify(
                    NotificationType::Error,
                    "polyface face references a vertex outside the mesh, face skipped",
                );
                return;
            }
        };
        let target = self.layers.get_mut(layer);
        target.add_triangle(f0, f1, f2);
        if let Some(f3) = resolved[3] {
            target.add_triangle(f2, f3, f0);
        }
    }

    fn finalize_polyline(&mut self) {
        let layer = self.get_layer();
        if self.ent.polyline.flags.contains(PolylineFlags::MESH_3D) {
            self.finalize_polyline_mesh(layer);
        } else {
            let chain = std::mem::take(&mut self.ent.polyline.chain);
            if chain.len() > 1 {
                let xform = *self.xform.current();
                let points: Vec<Vector3> =
                    chain.iter().map(|p| xform.transform_point(*p)).collect();
                let closed = self.ent.polyline.flags.contains(PolylineFlags::CLOSED);
                self.layers.get_mut(layer).wires.push(Wire { points, closed });
            }
        }
        self.layers.get_mut(layer).counts.polyline += 1;
        self.ent.polyline = PolylineBuf::default();
        self.entity_state = EntityState::Unknown;
    }

    fn finalize_polyline_mesh(&mut self, layer: usize) {
        let m = self.ent.polyline.mesh_m;
        let n = self.ent.polyline.mesh_n;
        let indices = std::mem::take(&mut self.ent.polyline.mesh_indices);
        let count = indices.len();

        if count == 0 {
            return;
        }
        if count != m * n {
            self.notify(
                NotificationType::Error,
                format!("polygon mesh expects {m}x{n} vertices, got {count}, mesh skipped"),
            );
            return;
        }

        let pv = |row: usize, col: usize| indices[row * n + col];

        if m < 2 {
            if n > 4 {
                self.notify(
                    NotificationType::Error,
                    "cannot handle polygon meshes with m<2 and n>4, mesh skipped",
                );
                return;
            }
            if n < 3 {
                return;
            }
            let target = self.layers.get_mut(layer);
            target.add_triangle(pv(0, 0), pv(0, 1), pv(0, 2));
            if n == 4 {
                target.add_triangle(pv(0, 2), pv(0, 3), pv(0, 0));
            }
            return;
        }

        let target = self.layers.get_mut(layer);
        for j in 1..n {
            for i in 1..m {
                target.add_triangle(pv(i - 1, j - 1), pv(i - 1, j), pv(i, j - 1));
                target.add_triangle(pv(i - 1, j - 1), pv(i, j - 1), pv(i, j));
            }
        }
    }

    // ── LWPOLYLINE ─────────────────────────────────────────────────────

    fn lwpolyline_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            70 => {
                self.ent.polyline.flags = PolylineFlags::from_bits_truncate(pair.as_i32() as u32)
            }
            10 => self.ent.polyline.lw_x = pair.as_f64() * self.coord_scale(),
            20 => {
                // Y commits the point, Z is implicitly zero
                let x = self.ent.polyline.lw_x;
                let y = pair.as_f64() * self.coord_scale();
                self.ent.polyline.chain.push(Vector3::new(x, y, 0.0));
            }
            0 => {
                let layer = self.get_layer();
                let chain = std::mem::take(&mut self.ent.polyline.chain);
                if chain.len() > 1 {
                    let xform = *self.xform.current();
                    let points: Vec<Vector3> =
                        chain.iter().map(|p| xform.transform_point(*p)).collect();
                    let closed = self.ent.polyline.flags.contains(PolylineFlags::CLOSED);
                    self.layers.get_mut(layer).wires.push(Wire { points, closed });
                }
                self.layers.get_mut(layer).counts.lwpolyline += 1;
                self.ent.polyline = PolylineBuf::default();
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    // ── LINE ───────────────────────────────────────────────────────────

    fn line_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            10 | 20 | 30 | 11 | 21 | 31 => {
                let slot = (pair.code % 10) as usize;
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.line.pts[slot].set_coord(axis, value);
            }
            0 => {
                let layer = self.get_layer();
                let xform = *self.xform.current();
                let points = vec![
                    xform.transform_point(self.ent.line.pts[0]),
                    xform.transform_point(self.ent.line.pts[1]),
                ];
                let target = self.layers.get_mut(layer);
                target.wires.push(Wire::open(points));
                target.counts.line += 1;
                self.ent.line = LineBuf::default();
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    // ── SOLID ──────────────────────────────────────────────────────────

    fn solid_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            10..=13 | 20..=23 | 30..=33 => {
                let slot = (pair.code % 10) as usize;
                let axis = (pair.code / 10 - 1) as usize;
                self.ent.solid.last_slot = self.ent.solid.last_slot.max(slot as i32);
                let value = pair.as_f64() * self.coord_scale();
                self.ent.solid.pts[slot].set_coord(axis, value);
            }
            0 => {
                let layer = self.get_layer();
                let xform = *self.xform.current();
                let used = (self.ent.solid.last_slot + 1).max(0) as usize;
                if used > 1 {
                    let points: Vec<Vector3> = self.ent.solid.pts[..used]
                        .iter()
                        .map(|p| xform.transform_point(*p))
                        .collect();
                    self.layers.get_mut(layer).wires.push(Wire::closed(points));
                }
                self.layers.get_mut(layer).counts.solid += 1;
                self.ent.solid = SolidBuf::default();
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    // ── 3DFACE ─────────────────────────────────────────────────────────

    fn face3d_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            10..=13 | 20..=23 | 30..=33 => {
                let slot = (pair.code % 10) as usize;
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.face3d.pts[slot].set_coord(axis, value);
                if slot == 2 {
                    // a missing fourth corner degenerates to the third
                    self.ent.face3d.pts[3].set_coord(axis, value);
                }
            }
            0 => {
                let layer = self.get_layer();
                let xform = *self.xform.current();
                let mut face = [0u32; 4];
                for (slot, pt) in self.ent.face3d.pts.iter().enumerate() {
                    let world = xform.transform_point(*pt);
                    face[slot] = self.layers.get_mut(layer).vertex_tree.add(world);
                }
                let target = self.layers.get_mut(layer);
                target.add_triangle(face[0], face[1], face[2]);
                target.add_triangle(face[2], face[3], face[0]);
                target.counts.face3d += 1;
                self.ent.face3d = Face3dBuf::default();
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    // ── CIRCLE / ARC ───────────────────────────────────────────────────

    fn circle_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            10 | 20 | 30 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.circle.center.set_coord(axis, value);
            }
            40 => self.ent.circle.radius = pair.as_f64() * self.coord_scale(),
            0 => {
                let layer = self.get_layer();
                let segs = self.config.segs_per_circle;
                let center = self.ent.circle.center;
                let radius = self.ent.circle.radius;
                let xform = *self.xform.current();

                // seed on the +X axis, then rotate by the precomputed step
                let mut points = Vec::with_capacity(segs);
                points.push(Vector3::new(radius, 0.0, 0.0));
                for i in 1..segs {
                    let prev = points[i - 1];
                    points.push(Vector3::new(
                        prev.x * self.cos_delta - prev.y * self.sin_delta,
                        prev.y * self.cos_delta + prev.x * self.sin_delta,
                        0.0,
                    ));
                }
                for p in &mut points {
                    *p = xform.transform_point(*p + center);
                }

                let target = self.layers.get_mut(layer);
                target.wires.push(Wire::closed(points));
                target.counts.circle += 1;
                self.ent.circle = CircleBuf::default();
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    fn arc_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            10 | 20 | 30 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.arc.center.set_coord(axis, value);
            }
            40 => self.ent.arc.radius = pair.as_f64() * self.coord_scale(),
            50 => self.ent.arc.start_degrees = pair.as_f64(),
            51 => self.ent.arc.end_degrees = pair.as_f64(),
            0 => {
                let layer = self.get_layer();
                let center = self.ent.arc.center;
                let radius = self.ent.arc.radius;
                let start = self.ent.arc.start_degrees;
                let mut end = self.ent.arc.end_degrees;
                while end < start {
                    end += 360.0;
                }

                // intermediate points advance by the full-circle step; the
                // last point lands exactly on the end angle
                let segs = self.config.segs_per_circle;
                let num_segs =
                    (((end - start) / 360.0 * segs as f64) as usize).max(1);
                let start_rad = start.to_radians();
                let end_rad = end.to_radians();

                let mut points = Vec::with_capacity(num_segs + 1);
                points.push(Vector3::new(
                    radius * start_rad.cos(),
                    radius * start_rad.sin(),
                    0.0,
                ));
                for i in 1..num_segs {
                    let prev = points[i - 1];
                    points.push(Vector3::new(
                        prev.x * self.cos_delta - prev.y * self.sin_delta,
                        prev.y * self.cos_delta + prev.x * self.sin_delta,
                        0.0,
                    ));
                }
                points.push(Vector3::new(
                    radius * end_rad.cos(),
                    radius * end_rad.sin(),
                    0.0,
                ));

                let xform = *self.xform.current();
                for p in &mut points {
                    *p = xform.transform_point(*p + center);
                }

                let target = self.layers.get_mut(layer);
                target.wires.push(Wire::open(points));
                target.counts.arc += 1;
                self.ent.arc = ArcBuf::default();
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    // ── ELLIPSE ────────────────────────────────────────────────────────

    fn ellipse_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            10 | 20 | 30 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.ellipse.center.set_coord(axis, value);
            }
            11 | 21 | 31 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.ellipse.major_axis.set_coord(axis, value);
            }
            40 => self.ent.ellipse.ratio = pair.as_f64(),
            41 => self.ent.ellipse.start = pair.as_f64(),
            42 => self.ent.ellipse.end = pair.as_f64(),
            0 => {
                let layer = self.get_layer();
                let xform = *self.xform.current();
                let center = xform.transform_point(self.ent.ellipse.center);
                let major = xform.transform_direction(self.ent.ellipse.major_axis);

                let major_radius = major.length();
                let minor_radius = self.ent.ellipse.ratio * major_radius;
                let xdir = major.normalize();
                let ydir = Vector3::UNIT_Z.cross(&xdir);

                let start = self.ent.ellipse.start;
                let end = self.ent.ellipse.end;
                let full_circle = (end - start).abs() <= 1e-3;

                let mut delta = std::f64::consts::PI / 15.0;
                if (end - start) / delta < 4.0 {
                    delta = (end - start) / 5.0;
                }

                let mut points = Vec::new();
                let mut angle = start;
                let mut done = false;
                while !done {
                    if angle >= end {
                        angle = end;
                        done = true;
                    }
                    let p = center
                        + xdir * (major_radius * angle.cos())
                        + ydir * (minor_radius * angle.sin());
                    points.push(p);
                    angle += delta;
                }

                if points.len() > 1 {
                    self.layers.get_mut(layer).wires.push(Wire {
                        points,
                        closed: full_circle,
                    });
                }
                self.layers.get_mut(layer).counts.ellipse += 1;
                self.ent.ellipse = EllipseBuf::default();
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    // ── SPLINE ─────────────────────────────────────────────────────────

    fn spline_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            70 => self.ent.spline.flags = SplineFlags::from_bits_truncate(pair.as_i32() as u32),
            71 => self.ent.spline.degree = pair.as_i32(),
            72 => {
                let n = pair.as_i32().max(0) as usize;
                self.ent.spline.knots.reserve(n);
            }
            73 => {
                let n = pair.as_i32().max(0) as usize;
                self.ent.spline.control_points.reserve(n);
                self.ent.spline.weights = vec![1.0; n];
            }
            74 => {
                let n = pair.as_i32().max(0) as usize;
                self.ent.spline.fit_points.reserve(n);
            }
            40 => self.ent.spline.knots.push(pair.as_f64()),
            41 => {
                let i = self.ent.spline.weight_count;
                if i < self.ent.spline.weights.len() {
                    self.ent.spline.weights[i] = pair.as_f64();
                } else {
                    self.ent.spline.weights.push(pair.as_f64());
                }
                self.ent.spline.weight_count += 1;
            }
            10 | 20 | 30 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.spline.ctl_pending.set_coord(axis, value);
                self.ent.spline.ctl_coords += 1;
                if self.ent.spline.ctl_coords > 2 {
                    let pt = self.ent.spline.ctl_pending;
                    self.ent.spline.control_points.push(pt);
                    self.ent.spline.ctl_coords = 0;
                }
            }
            11 | 21 | 31 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.spline.fit_pending.set_coord(axis, value);
                self.ent.spline.fit_coords += 1;
                if self.ent.spline.fit_coords > 2 {
                    let pt = self.ent.spline.fit_pending;
                    self.ent.spline.fit_points.push(pt);
                    self.ent.spline.fit_coords = 0;
                }
            }
            0 => self.finalize_spline(pair),
            _ => {}
        }
    }

    fn finalize_spline(&mut self, pair: &CodePair) {
        let layer = self.get_layer();
        self.layers.get_mut(layer).counts.spline += 1;

        let spline = &self.ent.spline;
        if self.evaluator.is_none() {
            self.notify(
                NotificationType::NotSupported,
                "no curve evaluator configured, spline geometry skipped",
            );
        } else if spline.knots.len() < 2 || spline.control_points.is_empty() {
            self.notify(
                NotificationType::Error,
                "spline with no usable knot vector or control points, skipped",
            );
        } else {
            let evaluator = self.evaluator.as_deref().unwrap();
            let degree = spline.degree.max(0) as usize;
            let start = spline.knots[0];
            let stop = spline.knots[spline.knots.len() - 1];
            let segs = self.spline_segs.max(1);
            let dt = (stop - start) / segs as f64;

            // weights only participate for rational curves
            let weights: Vec<f64> = if spline.flags.contains(SplineFlags::RATIONAL) {
                spline.weights.clone()
            } else {
                vec![1.0; spline.control_points.len()]
            };

            let xform = *self.xform.current();
            let mut points = Vec::with_capacity(segs + 1);
            for i in 0..=segs {
                let t = if i == segs { stop } else { start + dt * i as f64 };
                let p = evaluator.eval(
                    degree,
                    &spline.knots,
                    &spline.control_points,
                    &weights,
                    t,
                );
                points.push(xform.transform_point(p));
            }
            self.layers.get_mut(layer).wires.push(Wire::open(points));
        }

        self.ent.spline = SplineBuf::default();
        self.entity_state = EntityState::Unknown;
        self.entity_unknown(pair);
    }

    // ── INSERT / DIMENSION (block instancing) ──────────────────────────

    fn insert_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            2 => self.ent.insert.block_name = Some(pair.value.clone()),
            10 | 20 | 30 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.insert.insert_pt.set_coord(axis, value);
            }
            41 | 42 | 43 => {
                let axis = ((pair.code % 40) - 1) as usize;
                self.ent.insert.scale.set_coord(axis, pair.as_f64());
            }
            50 => self.ent.insert.rotation_degrees = pair.as_f64(),
            70 | 71 => {
                if pair.as_i32() != 1 {
                    self.notify(
                        NotificationType::NotSupported,
                        "cannot insert a pattern of a block, ignoring the repeat counts",
                    );
                }
            }
            44 | 45 => {}
            210 | 220 | 230 => {
                let axis = (((pair.code / 10) % 20) - 1) as usize;
                self.ent.insert.extrude_dir.set_coord(axis, pair.as_f64());
            }
            0 => {
                let buf = std::mem::take(&mut self.ent.insert);
                if let Some(name) = buf.block_name {
                    let records = self.blocks.get(&name).map(|b| Rc::clone(&b.records));
                    match records {
                        Some(records) => {
                            let instance = Matrix4::translation(
                                buf.insert_pt.x,
                                buf.insert_pt.y,
                                buf.insert_pt.z,
                            ) * Matrix4::rotation_z_degrees(buf.rotation_degrees)
                                * Matrix4::scaling(buf.scale.x, buf.scale.y, buf.scale.z);
                            let new_transform = instance * *self.xform.current();
                            self.replay_block(&name, records, new_transform);
                        }
                        None => self.notify(
                            NotificationType::Error,
                            format!("INSERT references non-existent block ({name}), ignoring"),
                        ),
                    }
                }
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    fn dimension_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            2 => self.ent.dimension.block_name = Some(pair.value.clone()),
            0 => {
                let name = self.ent.dimension.block_name.take();
                if let Some(name) = name {
                    let layer = self.get_layer();
                    let records = self.blocks.get(&name).map(|b| Rc::clone(&b.records));
                    match records {
                        Some(records) => {
                            // the dimension's pre-rendered block draws under
                            // the unchanged current transform
                            let transform = *self.xform.current();
                            self.layers.get_mut(layer).counts.dimension += 1;
                            self.replay_block(&name, records, transform);
                        }
                        None => self.notify(
                            NotificationType::Error,
                            format!("DIMENSION references non-existent block ({name}), ignoring"),
                        ),
                    }
                }
                self.ent.dimension = DimensionBuf::default();
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    /// Replay a block's recorded body under `instanced`.  The replayed
    /// ENDBLK record pops the frame; a missing terminator is recovered.
    fn replay_block(&mut self, name: &str, records: Rc<Vec<CodePair>>, instanced: Matrix4) {
        if self.xform.depth() >= MAX_INSERT_DEPTH {
            self.notify(
                NotificationType::Error,
                format!("block instancing nested deeper than {MAX_INSERT_DEPTH} at {name}, instance skipped"),
            );
            return;
        }
        let entry_depth = self.xform.depth();
        let saved_section = self.section;
        self.xform.push(name, instanced);
        self.section = Section::Entities;
        self.entity_state = EntityState::Unknown;

        for pair in records.iter() {
            self.dispatch(pair);
            if self.xform.depth() == entry_depth {
                break;
            }
        }

        if self.xform.depth() > entry_depth {
            self.notify(
                NotificationType::Warning,
                format!("block {name} replay ended without a terminator"),
            );
            self.xform.pop();
        }
        self.section = saved_section;
        self.entity_state = EntityState::Unknown;
    }

    // ── TEXT / ATTRIB / ATTDEF ─────────────────────────────────────────

    fn text_code(&mut self, pair: &CodePair) {
        match pair.code {
            1 => self.ent.text.text = Some(pair.value.clone()),
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            10 | 20 | 30 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.text.first.set_coord(axis, value);
            }
            11 | 21 | 31 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.text.second.set_coord(axis, value);
            }
            40 => self.ent.text.height = pair.as_f64(),
            50 => self.ent.text.rotation_degrees = pair.as_f64(),
            72 => self.ent.text.horizontal = pair.as_i32(),
            73 => self.ent.text.vertical = pair.as_i32(),
            0 => {
                let state = self.entity_state;
                let buf = std::mem::take(&mut self.ent.text);
                if let Some(raw) = buf.text {
                    let layer = self.get_layer();
                    let xform = *self.xform.current();
                    let expanded = expand_control_codes(&raw);
                    let layout = layout_text(&TextLayout {
                        text: &expanded.text,
                        first: xform.transform_point(buf.first),
                        second: xform.transform_point(buf.second),
                        height: buf.height,
                        rotation_degrees: buf.rotation_degrees,
                        horizontal: buf.horizontal,
                        vertical: buf.vertical,
                    });
                    match layout {
                        Some(fragment) => self.layers.get_mut(layer).texts.push(fragment),
                        None => self.notify(
                            NotificationType::NotSupported,
                            format!(
                                "cannot handle this text alignment: horiz = {}, vert = {}",
                                buf.horizontal, buf.vertical
                            ),
                        ),
                    }
                    let counts = &mut self.layers.get_mut(layer).counts;
                    match state {
                        EntityState::Attrib | EntityState::AttDef => counts.attrib += 1,
                        _ => counts.text += 1,
                    }
                }
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    // ── MTEXT ──────────────────────────────────────────────────────────

    fn mtext_code(&mut self, pair: &CodePair) {
        match pair.code {
            1 | 3 => self.ent.mtext.text.push_str(&pair.value),
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            10 | 20 | 30 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.mtext.insertion.set_coord(axis, value);
            }
            11 | 21 | 31 => {
                let axis = (pair.code / 10 - 1) as usize;
                self.ent.mtext.x_axis.set_coord(axis, pair.as_f64());
                if pair.code == 31 {
                    self.ent.mtext.rotation_degrees = self
                        .ent
                        .mtext
                        .x_axis
                        .y
                        .atan2(self.ent.mtext.x_axis.x)
                        .to_degrees();
                }
            }
            40 => self.ent.mtext.text_height = pair.as_f64(),
            42 => self.ent.mtext.char_width = pair.as_f64(),
            43 => self.ent.mtext.entity_height = pair.as_f64(),
            50 => self.ent.mtext.rotation_degrees = pair.as_f64(),
            71 => self.ent.mtext.attach_point = pair.as_i32(),
            0 => {
                let buf = std::mem::take(&mut self.ent.mtext);
                let layer = self.get_layer();
                let xform = *self.xform.current();
                let insertion = xform.transform_point(buf.insertion);
                let text = if buf.text.is_empty() {
                    "NO_NAME".to_string()
                } else {
                    buf.text
                };
                let expanded = expand_control_codes(&text);
                let fragments = layout_mtext(&MTextLayout {
                    expanded: &expanded,
                    attach_point: buf.attach_point,
                    text_height: buf.text_height,
                    entity_height: buf.entity_height,
                    char_width: buf.char_width,
                    rotation_degrees: buf.rotation_degrees,
                    insertion,
                });
                let target = self.layers.get_mut(layer);
                target.texts.extend(fragments);
                target.counts.mtext += 1;
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    // ── POINT ──────────────────────────────────────────────────────────

    fn point_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            10 | 20 | 30 => {
                let axis = (pair.code / 10 - 1) as usize;
                let value = pair.as_f64() * self.coord_scale();
                self.ent.point.pt.set_coord(axis, value);
            }
            0 => {
                let layer = self.get_layer();
                let world = self.xform.current().transform_point(self.ent.point.pt);
                let target = self.layers.get_mut(layer);
                target.markers.push(world);
                target.counts.point += 1;
                self.ent.point = PointBuf::default();
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }

    // ── LEADER ─────────────────────────────────────────────────────────

    fn leader_code(&mut self, pair: &CodePair) {
        match pair.code {
            8 => self.set_layer_from(pair),
            62 => self.curr_color = pair.as_i32(),
            71 => self.ent.leader.arrowhead = pair.as_i32(),
            10 => {
                self.ent.leader.pt.x = pair.as_f64() * self.coord_scale();
            }
            20 => {
                self.ent.leader.pt.y = pair.as_f64() * self.coord_scale();
            }
            30 => {
                // Z commits the vertex; leader chains transform as they
                // accumulate
                self.ent.leader.pt.z = pair.as_f64() * self.coord_scale();
                let world = self.xform.current().transform_point(self.ent.leader.pt);
                self.ent.polyline.chain.push(world);
            }
            0 => {
                let layer = self.get_layer();
                let chain = std::mem::take(&mut self.ent.polyline.chain);
                if chain.len() > 1 {
                    self.layers.get_mut(layer).wires.push(Wire::open(chain));
                }
                self.layers.get_mut(layer).counts.leader += 1;
                self.ent.leader = LeaderBuf::default();
                self.entity_state = EntityState::Unknown;
                self.entity_unknown(pair);
            }
            _ => {}
        }
    }
}

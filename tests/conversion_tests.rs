//! Integration tests for DXF conversion

use dxf_geom::{
    ConversionConfig, CurveEvaluator, DxfConverter, GeometryDocument, MemorySink,
    NotificationType, Vector3,
};
use std::io::Cursor;

fn convert(dxf: &str) -> GeometryDocument {
    DxfConverter::new(Cursor::new(dxf.as_bytes().to_vec()))
        .convert()
        .unwrap()
}

fn convert_with(dxf: &str, config: ConversionConfig) -> GeometryDocument {
    DxfConverter::with_configuration(Cursor::new(dxf.as_bytes().to_vec()), config)
        .convert()
        .unwrap()
}

fn assert_near(actual: Vector3, expected: Vector3, eps: f64) {
    assert!(
        actual.distance(&expected) < eps,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_line_becomes_wire() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
LINE
  8
walls
 10
0.0
 20
0.0
 30
0.0
 11
10.0
 21
10.0
 31
0.0
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("walls").expect("layer created");
    assert_eq!(layer.counts.line, 1);
    assert_eq!(layer.wires.len(), 1);
    let wire = &layer.wires[0];
    assert!(!wire.closed);
    assert_eq!(wire.points[0], Vector3::ZERO);
    assert_eq!(wire.points[1], Vector3::new(10.0, 10.0, 0.0));
}

#[test]
fn test_circle_four_segments() {
    let config = ConversionConfig {
        segs_per_circle: 4,
        ..Default::default()
    };
    let doc = convert_with(
        "  0
SECTION
  2
ENTITIES
  0
CIRCLE
  8
round
 10
0.0
 20
0.0
 30
0.0
 40
1.0
  0
ENDSEC
  0
EOF
",
        config,
    );
    let layer = doc.layers.find("round").unwrap();
    assert_eq!(layer.counts.circle, 1);
    let wire = &layer.wires[0];
    assert!(wire.closed);
    assert_eq!(wire.points.len(), 4);
    assert_near(wire.points[0], Vector3::new(1.0, 0.0, 0.0), 1e-9);
    assert_near(wire.points[1], Vector3::new(0.0, 1.0, 0.0), 1e-9);
    assert_near(wire.points[2], Vector3::new(-1.0, 0.0, 0.0), 1e-9);
    assert_near(wire.points[3], Vector3::new(0.0, -1.0, 0.0), 1e-9);
}

#[test]
fn test_3dface_distinct_corners_two_triangles() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
3DFACE
  8
faces
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
 12
1.0
 22
1.0
 32
0.0
 13
0.0
 23
1.0
 33
0.0
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("faces").unwrap();
    assert_eq!(layer.counts.face3d, 1);
    assert_eq!(layer.triangles.len(), 2);
    assert_eq!(layer.vertex_tree.len(), 4);
    // both triangles share the v0-v2 diagonal
    let (a, b) = (layer.triangles[0], layer.triangles[1]);
    assert_eq!((a.v1, a.v2, a.v3), (0, 1, 2));
    assert_eq!((b.v1, b.v2, b.v3), (2, 3, 0));
}

#[test]
fn test_3dface_coincident_corner_single_triangle() {
    // no 13/23/33 records: the fourth corner mirrors the third
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
3DFACE
  8
faces
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
 12
1.0
 22
1.0
 32
0.0
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("faces").unwrap();
    assert_eq!(layer.triangles.len(), 1);
    assert_eq!(layer.vertex_tree.len(), 3);
}

#[test]
fn test_layer_table_color_split() {
    let tables = "  0
SECTION
  2
TABLES
  0
TABLE
  2
LAYER
  0
LAYER
  2
A
 62
1
  0
LAYER
  2
A
 62
2
  0
ENDTAB
  0
ENDSEC
  0
EOF
";
    let doc = convert(tables);
    // default layer + A/1 + A/2
    assert_eq!(doc.layers.len(), 3);

    let merged = convert_with(
        tables,
        ConversionConfig {
            ignore_colors: true,
            ..Default::default()
        },
    );
    assert_eq!(merged.layers.len(), 2);
}

#[test]
fn test_layer_table_entry_without_color_not_created() {
    let doc = convert(
        "  0
SECTION
  2
TABLES
  0
TABLE
  2
LAYER
  0
LAYER
  2
incomplete
  0
ENDTAB
  0
ENDSEC
  0
EOF
",
    );
    // name alone is not enough; only the default layer exists
    assert_eq!(doc.layers.len(), 1);
    assert!(doc.layers.find("incomplete").is_none());
}

#[test]
fn test_cecolor_header_merges_entity_colors() {
    let doc = convert(
        "  0
SECTION
  2
HEADER
  9
$CECOLOR
 62
256
  0
ENDSEC
  0
SECTION
  2
ENTITIES
  0
LINE
  8
A
 62
1
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
LINE
  8
A
 62
2
 10
0.0
 20
0.0
 30
0.0
 11
2.0
 21
0.0
 31
0.0
  0
ENDSEC
  0
EOF
",
    );
    // colors come from layers, so both lines land on the same layer
    assert_eq!(doc.layers.len(), 2);
    assert_eq!(doc.layers.find("A").unwrap().counts.line, 2);
}

#[test]
fn test_insert_missing_block_recovers() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
INSERT
  2
GHOST
 10
5.0
 20
5.0
 30
0.0
  0
LINE
  8
after
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
ENDSEC
  0
EOF
",
    );
    assert!(doc.notifications.has_type(NotificationType::Error));
    // the record after the failed insert still parses
    let layer = doc.layers.find("after").unwrap();
    assert_eq!(layer.counts.line, 1);
}

#[test]
fn test_insert_places_block_geometry() {
    let doc = convert(
        "  0
SECTION
  2
BLOCKS
  0
BLOCK
  2
B1
 10
0.0
 20
0.0
 30
0.0
  0
LINE
  8
blk
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
ENDBLK
  0
ENDSEC
  0
SECTION
  2
ENTITIES
  0
INSERT
  2
B1
 10
10.0
 20
0.0
 30
0.0
  0
LINE
  8
top
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
1.0
 31
1.0
  0
ENDSEC
  0
EOF
",
    );
    let blk = doc.layers.find("blk").unwrap();
    assert_eq!(blk.counts.line, 1);
    assert_near(blk.wires[0].points[0], Vector3::new(10.0, 0.0, 0.0), 1e-9);
    assert_near(blk.wires[0].points[1], Vector3::new(11.0, 0.0, 0.0), 1e-9);

    // the transform was restored before the following top-level entity
    let top = doc.layers.find("top").unwrap();
    assert_near(top.wires[0].points[1], Vector3::new(1.0, 1.0, 1.0), 1e-12);
}

#[test]
fn test_nested_insert_composes_and_restores() {
    let doc = convert(
        "  0
SECTION
  2
BLOCKS
  0
BLOCK
  2
INNER
  0
LINE
  8
nested
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
ENDBLK
  0
BLOCK
  2
OUTER
  0
INSERT
  2
INNER
 10
0.0
 20
5.0
 30
0.0
  0
ENDBLK
  0
ENDSEC
  0
SECTION
  2
ENTITIES
  0
INSERT
  2
OUTER
 10
10.0
 20
0.0
 30
0.0
  0
LINE
  8
plain
 10
2.0
 20
2.0
 30
2.0
 11
3.0
 21
2.0
 31
2.0
  0
ENDSEC
  0
EOF
",
    );
    let nested = doc.layers.find("nested").unwrap();
    assert_eq!(nested.counts.line, 1);
    assert_near(nested.wires[0].points[0], Vector3::new(10.0, 5.0, 0.0), 1e-9);
    assert_near(nested.wires[0].points[1], Vector3::new(11.0, 5.0, 0.0), 1e-9);

    let plain = doc.layers.find("plain").unwrap();
    assert_near(plain.wires[0].points[0], Vector3::new(2.0, 2.0, 2.0), 1e-12);
}

#[test]
fn test_insert_rotation_and_scale() {
    let doc = convert(
        "  0
SECTION
  2
BLOCKS
  0
BLOCK
  2
B
  0
LINE
  8
placed
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
ENDBLK
  0
ENDSEC
  0
SECTION
  2
ENTITIES
  0
INSERT
  2
B
 10
0.0
 20
0.0
 30
0.0
 41
2.0
 42
2.0
 43
2.0
 50
90.0
  0
ENDSEC
  0
EOF
",
    );
    // scale by 2 then rotate 90 degrees: (1,0,0) -> (0,2,0)
    let layer = doc.layers.find("placed").unwrap();
    assert_near(layer.wires[0].points[1], Vector3::new(0.0, 2.0, 0.0), 1e-9);
}

#[test]
fn test_polyline_mesh_unit_square() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
POLYLINE
  8
mesh
 70
16
 71
2
 72
2
  0
VERTEX
 70
64
 10
0.0
 20
0.0
 30
0.0
  0
VERTEX
 70
64
 10
1.0
 20
0.0
 30
0.0
  0
VERTEX
 70
64
 10
0.0
 20
1.0
 30
0.0
  0
VERTEX
 70
64
 10
1.0
 20
1.0
 30
0.0
  0
SEQEND
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("mesh").unwrap();
    assert_eq!(layer.counts.polyline, 1);
    assert_eq!(layer.triangles.len(), 2);
    assert_eq!(layer.vertex_tree.len(), 4);
}

#[test]
fn test_polyline_mesh_wrong_count_recovers() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
POLYLINE
  8
mesh
 70
16
 71
2
 72
2
  0
VERTEX
 70
64
 10
0.0
 20
0.0
 30
0.0
  0
VERTEX
 70
64
 10
1.0
 20
0.0
 30
0.0
  0
SEQEND
  0
LINE
  8
mesh
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
ENDSEC
  0
EOF
",
    );
    assert!(doc.notifications.has_type(NotificationType::Error));
    let layer = doc.layers.find("mesh").unwrap();
    assert!(layer.triangles.is_empty());
    // parsing resynchronized on the next entity
    assert_eq!(layer.counts.line, 1);
}

#[test]
fn test_polyface_mesh_face_records() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
POLYLINE
  8
pface
 70
64
  0
VERTEX
 70
192
 10
0.0
 20
0.0
 30
0.0
  0
VERTEX
 70
192
 10
1.0
 20
0.0
 30
0.0
  0
VERTEX
 70
192
 10
0.0
 20
1.0
 30
0.0
  0
VERTEX
 70
128
 71
1
 72
2
 73
3
  0
SEQEND
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("pface").unwrap();
    assert_eq!(layer.triangles.len(), 1);
    assert_eq!(layer.vertex_tree.len(), 3);
}

#[test]
fn test_open_polyline_chain() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
POLYLINE
  8
path
 70
0
  0
VERTEX
 10
0.0
 20
0.0
 30
0.0
  0
VERTEX
 10
1.0
 20
0.0
 30
0.0
  0
VERTEX
 10
1.0
 20
1.0
 30
0.0
  0
SEQEND
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("path").unwrap();
    assert_eq!(layer.counts.polyline, 1);
    assert_eq!(layer.wires.len(), 1);
    assert_eq!(layer.wires[0].points.len(), 3);
    assert!(!layer.wires[0].closed);
}

#[test]
fn test_lwpolyline_closed() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
LWPOLYLINE
  8
lw
 70
1
 10
0.0
 20
0.0
 10
2.0
 20
0.0
 10
2.0
 20
2.0
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("lw").unwrap();
    assert_eq!(layer.counts.lwpolyline, 1);
    let wire = &layer.wires[0];
    assert!(wire.closed);
    assert_eq!(wire.points.len(), 3);
    assert_eq!(wire.points[1], Vector3::new(2.0, 0.0, 0.0));
}

#[test]
fn test_arc_start_to_end() {
    let config = ConversionConfig {
        segs_per_circle: 4,
        ..Default::default()
    };
    let doc = convert_with(
        "  0
SECTION
  2
ENTITIES
  0
ARC
  8
arcs
 10
0.0
 20
0.0
 30
0.0
 40
1.0
 50
0.0
 51
90.0
  0
ENDSEC
  0
EOF
",
        config,
    );
    let layer = doc.layers.find("arcs").unwrap();
    assert_eq!(layer.counts.arc, 1);
    let wire = &layer.wires[0];
    assert!(!wire.closed);
    // a quarter of a 4-segment circle is one segment: start and end points
    assert_eq!(wire.points.len(), 2);
    assert_near(wire.points[0], Vector3::new(1.0, 0.0, 0.0), 1e-9);
    assert_near(wire.points[1], Vector3::new(0.0, 1.0, 0.0), 1e-9);
}

#[test]
fn test_ellipse_sampling() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
ELLIPSE
  8
ell
 10
0.0
 20
0.0
 30
0.0
 11
2.0
 21
0.0
 31
0.0
 40
0.5
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("ell").unwrap();
    assert_eq!(layer.counts.ellipse, 1);
    let wire = &layer.wires[0];
    assert!(wire.points.len() > 4);
    assert_near(wire.points[0], Vector3::new(2.0, 0.0, 0.0), 1e-9);
    // minor radius = ratio * major radius
    let top = wire
        .points
        .iter()
        .cloned()
        .fold(f64::MIN, |acc, p| acc.max(p.y));
    assert!((top - 1.0).abs() < 0.02);
}

#[test]
fn test_units_scale_coordinates() {
    let doc = convert(
        "  0
SECTION
  2
HEADER
  9
$INSUNITS
 70
1
  0
ENDSEC
  0
SECTION
  2
ENTITIES
  0
LINE
  8
inches
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
ENDSEC
  0
EOF
",
    );
    // one inch is 25.4 millimeters
    let layer = doc.layers.find("inches").unwrap();
    assert_near(layer.wires[0].points[1], Vector3::new(25.4, 0.0, 0.0), 1e-9);
}

#[test]
fn test_scale_factor_compounds_units() {
    let doc = convert_with(
        "  0
SECTION
  2
ENTITIES
  0
LINE
  8
scaled
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
ENDSEC
  0
EOF
",
        ConversionConfig {
            scale_factor: 2.0,
            ..Default::default()
        },
    );
    let layer = doc.layers.find("scaled").unwrap();
    assert_near(layer.wires[0].points[1], Vector3::new(2.0, 0.0, 0.0), 1e-12);
}

/// Samples the chord between the first and last control point; enough to
/// observe sampling counts and transforms without real NURBS math.
struct ChordEvaluator;

impl CurveEvaluator for ChordEvaluator {
    fn eval(
        &self,
        _degree: usize,
        knots: &[f64],
        control_points: &[Vector3],
        _weights: &[f64],
        t: f64,
    ) -> Vector3 {
        let start = knots[0];
        let stop = knots[knots.len() - 1];
        let s = if stop > start {
            (t - start) / (stop - start)
        } else {
            0.0
        };
        let a = control_points[0];
        let b = control_points[control_points.len() - 1];
        a + (b - a) * s
    }
}

const SPLINE_DXF: &str = "  0
SECTION
  2
ENTITIES
  0
SPLINE
  8
spl
 70
8
 71
3
 72
8
 73
4
 40
0.0
 40
0.0
 40
0.0
 40
0.0
 40
1.0
 40
1.0
 40
1.0
 40
1.0
 10
0.0
 20
0.0
 30
0.0
 10
1.0
 20
2.0
 30
0.0
 10
3.0
 20
2.0
 30
0.0
 10
4.0
 20
0.0
 30
0.0
  0
ENDSEC
  0
EOF
";

#[test]
fn test_spline_sampled_through_evaluator() {
    let doc = DxfConverter::new(Cursor::new(SPLINE_DXF.as_bytes().to_vec()))
        .with_curve_evaluator(Box::new(ChordEvaluator))
        .convert()
        .unwrap();
    let layer = doc.layers.find("spl").unwrap();
    assert_eq!(layer.counts.spline, 1);
    let wire = &layer.wires[0];
    // default spline_segments is 16: one point per sample plus the seed
    assert_eq!(wire.points.len(), 17);
    assert_near(wire.points[0], Vector3::new(0.0, 0.0, 0.0), 1e-9);
    assert_near(wire.points[16], Vector3::new(4.0, 0.0, 0.0), 1e-9);
}

#[test]
fn test_spline_without_evaluator_is_reported() {
    let doc = convert(SPLINE_DXF);
    let layer = doc.layers.find("spl").unwrap();
    assert_eq!(layer.counts.spline, 1);
    assert!(layer.wires.is_empty());
    assert!(doc.notifications.has_type(NotificationType::NotSupported));
}

#[test]
fn test_header_splinesegs_overrides_config() {
    let with_header = format!(
        "  0
SECTION
  2
HEADER
  9
$SPLINESEGS
 70
4
  0
ENDSEC
{SPLINE_DXF}"
    );
    let doc = DxfConverter::new(Cursor::new(with_header.into_bytes()))
        .with_curve_evaluator(Box::new(ChordEvaluator))
        .convert()
        .unwrap();
    let layer = doc.layers.find("spl").unwrap();
    assert_eq!(layer.wires[0].points.len(), 5);
}

#[test]
fn test_text_expansion_and_placement() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
TEXT
  8
notes
  1
45%%d
 10
1.0
 20
2.0
 30
0.0
 40
2.5
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("notes").unwrap();
    assert_eq!(layer.counts.text, 1);
    assert_eq!(layer.texts.len(), 1);
    let frag = &layer.texts[0];
    assert_eq!(frag.text, "45°");
    assert_eq!(frag.origin, Vector3::new(1.0, 2.0, 0.0));
    assert_eq!(frag.height, 2.5);
}

#[test]
fn test_text_unsupported_alignment_skipped() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
TEXT
  8
notes
  1
hello
 40
1.0
 72
3
 73
3
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("notes").unwrap();
    assert!(layer.texts.is_empty());
    assert_eq!(layer.counts.text, 1);
    assert!(doc.notifications.has_type(NotificationType::NotSupported));
}

#[test]
fn test_mtext_multi_line_layout() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
MTEXT
  8
mt
  1
first\\Psecond
 10
0.0
 20
0.0
 30
0.0
 40
2.0
 71
1
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("mt").unwrap();
    assert_eq!(layer.counts.mtext, 1);
    assert_eq!(layer.texts.len(), 2);
    assert_eq!(layer.texts[0].text, "first");
    assert_eq!(layer.texts[1].text, "second");
    // lines stack downward by 1.25 * height
    assert!((layer.texts[0].origin.y - layer.texts[1].origin.y - 2.5).abs() < 1e-9);
}

#[test]
fn test_point_marker() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
POINT
  8
pts
 10
3.0
 20
4.0
 30
5.0
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("pts").unwrap();
    assert_eq!(layer.counts.point, 1);
    assert_eq!(layer.markers, vec![Vector3::new(3.0, 4.0, 5.0)]);
}

#[test]
fn test_solid_closed_outline() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
SOLID
  8
sol
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
 12
1.0
 22
1.0
 32
0.0
 13
0.0
 23
1.0
 33
0.0
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("sol").unwrap();
    assert_eq!(layer.counts.solid, 1);
    let wire = &layer.wires[0];
    assert!(wire.closed);
    assert_eq!(wire.points.len(), 4);
}

#[test]
fn test_leader_vertex_chain() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
LEADER
  8
led
 71
1
 10
0.0
 20
0.0
 30
0.0
 10
5.0
 20
5.0
 30
0.0
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("led").unwrap();
    assert_eq!(layer.counts.leader, 1);
    let wire = &layer.wires[0];
    assert!(!wire.closed);
    assert_eq!(wire.points.len(), 2);
    assert_eq!(wire.points[1], Vector3::new(5.0, 5.0, 0.0));
}

#[test]
fn test_dimension_replays_block() {
    let doc = convert(
        "  0
SECTION
  2
BLOCKS
  0
BLOCK
  2
*D1
  0
LINE
  8
dim
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
ENDBLK
  0
ENDSEC
  0
SECTION
  2
ENTITIES
  0
DIMENSION
  8
dim
  2
*D1
  0
ENDSEC
  0
EOF
",
    );
    let layer = doc.layers.find("dim").unwrap();
    assert_eq!(layer.counts.dimension, 1);
    assert_eq!(layer.counts.line, 1);
    assert_eq!(layer.wires.len(), 1);
}

#[test]
fn test_stray_endblk_is_noop() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
ENDBLK
  0
LINE
  8
after
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
ENDSEC
  0
EOF
",
    );
    assert!(doc.notifications.has_type(NotificationType::Warning));
    assert_eq!(doc.layers.find("after").unwrap().counts.line, 1);
}

#[test]
fn test_eof_sentinel_stops_parsing() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
EOF
  0
CIRCLE
 10
0.0
 20
0.0
 30
0.0
 40
1.0
  0
ENDSEC
",
    );
    for layer in doc.layers.iter() {
        assert_eq!(layer.counts.circle, 0);
        assert!(layer.wires.is_empty());
    }
}

#[test]
fn test_entity_color_splits_layers() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
LINE
  8
A
 62
1
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
LINE
  8
A
 62
2
 10
0.0
 20
0.0
 30
0.0
 11
2.0
 21
0.0
 31
0.0
  0
ENDSEC
  0
EOF
",
    );
    // same name, different colors: two layers (plus the default)
    assert_eq!(doc.layers.len(), 3);
}

#[test]
fn test_write_to_sink() {
    let doc = convert(
        "  0
SECTION
  2
ENTITIES
  0
3DFACE
  8
F
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
 12
1.0
 22
1.0
 32
0.0
 13
0.0
 23
1.0
 33
0.0
  0
LINE
  8
L
 10
0.0
 20
0.0
 30
0.0
 11
1.0
 21
0.0
 31
0.0
  0
ENDSEC
  0
EOF
",
    );
    let mut sink = MemorySink::new();
    doc.write_to_sink(&mut sink).unwrap();
    assert_eq!(sink.meshes.len(), 1);
    assert_eq!(sink.meshes[0].layer, "F");
    assert_eq!(sink.meshes[0].vertices.len(), 4);
    assert_eq!(sink.meshes[0].triangles.len(), 2);
    assert_eq!(sink.wires.len(), 1);
    assert_eq!(sink.wires[0].layer, "L");
}

use std::collections::HashMap;

use glam::{Vec3, Vec4};
use once_cell::sync::Lazy;

use shading_demos::{
    flat_normals, flatten_indexed, parse_obj, ControlEvent, DemoKind, FlatMesh, GeometryError,
    InteractionController, LightingUniforms, MaterialChannel, MaterialGroup, ObjModel, Session,
    TransformComposer,
};

/// An octahedron with one face per octant, wound outwards.
static OCTAHEDRON: Lazy<ObjModel> = Lazy::new(|| {
    let source = "\
o octahedron
v 1 0 0
v -1 0 0
v 0 1 0
v 0 -1 0
v 0 0 1
v 0 0 -1
s off
f 1 3 5
f 3 2 5
f 2 4 5
f 4 1 5
f 3 1 6
f 2 3 6
f 4 2 6
f 1 4 6
";
    parse_obj(source).expect("octahedron parses")
});

static OCTAHEDRON_MESH: Lazy<FlatMesh> =
    Lazy::new(|| FlatMesh::from_model(&OCTAHEDRON).expect("octahedron flattens"));

#[test]
fn single_triangle_walkthrough() {
    let model = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
    assert_eq!(model.positions, vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
    assert_eq!(model.faces, vec![[1, 2, 3]]);

    let positions = flatten_indexed(&model.positions, &model.indices()).unwrap();
    assert_eq!(positions, model.positions);

    let expected = (Vec3::Y - Vec3::X).cross(Vec3::ZERO - Vec3::X).normalize();
    assert_eq!(flat_normals(&positions).unwrap(), vec![expected; 3]);
}

#[test]
fn flattened_stream_has_three_corners_per_face() {
    let mesh = &*OCTAHEDRON_MESH;
    assert_eq!(mesh.positions.len(), 3 * OCTAHEDRON.faces.len());
    assert_eq!(mesh.normals.len(), mesh.positions.len());
    assert_eq!(mesh.interleaved().len(), 6 * mesh.vertex_count());
}

#[test]
fn normals_are_unit_length_and_shared_per_face() {
    for corners in OCTAHEDRON_MESH.normals.chunks_exact(3) {
        assert!((corners[0].length() - 1.0).abs() < 1e-6);
        assert_eq!(corners[0], corners[1]);
        assert_eq!(corners[1], corners[2]);
    }
}

#[test]
fn normals_point_away_from_centre() {
    let mesh = &*OCTAHEDRON_MESH;
    for (corners, normals) in mesh.positions.chunks_exact(3).zip(mesh.normals.chunks_exact(3)) {
        let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
        assert!(centroid.dot(normals[0]) > 0.0, "inward normal {:?}", normals[0]);
    }
}

#[test]
fn pipeline_is_deterministic() {
    let again = FlatMesh::from_model(&OCTAHEDRON).unwrap();
    assert_eq!(again, *OCTAHEDRON_MESH);
}

#[test]
fn out_of_range_face_index_is_an_error() {
    let model = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 99\n").unwrap();
    assert_eq!(
        FlatMesh::from_model(&model),
        Err(GeometryError::IndexOutOfRange {
            position: 2,
            index: 99,
            len: 3
        })
    );
}

#[test]
fn lit_mesh_lands_in_front_of_camera() {
    let session = Session::new(DemoKind::Lit);
    let matrices = TransformComposer::new(session.projection, 1.0).compose(&session.transforms);
    for &corner in &OCTAHEDRON_MESH.positions {
        let clip = matrices.clip_position(corner * (1.0 / 7.5));
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}

#[test]
fn slider_then_shading_reflects_new_material() {
    let mut session = Session::new(DemoKind::Lit);
    let mut labels: HashMap<MaterialGroup, String> = HashMap::new();
    let controller = InteractionController::default();
    controller.handle(
        &mut session,
        ControlEvent::MaterialChanged {
            channel: MaterialChannel::DiffuseR,
            value: 1.0,
        },
        &mut labels,
    );
    assert_eq!(
        labels[&MaterialGroup::Diffuse],
        "Material Diffuse RGB (1.00, 0.25, 1.00):"
    );

    let lighting: LightingUniforms = session.lighting();
    let toward_light = Vec3::ONE.normalize();
    let color = lighting.shade_vertex(Vec3::new(0.0, 0.0, -4.0), toward_light);
    assert!(color.x > 1.0 - 1e-3);
    assert_eq!(color.w, 1.0);

    let away = lighting.shade_vertex(Vec3::new(0.0, 0.0, -4.0), -toward_light);
    assert_eq!(away, Vec4::new(0.1, 0.1, 0.1, 1.0));
}

//! Expansion of indexed mesh data into unshared, per-corner vertex streams.

use glam::{DVec3, Vec3};
use log::debug;

use crate::error::GeometryError;
use crate::obj::ObjModel;

/// Builds `flat[i] = attribute[indices[i] - 1]`.
///
/// Indices are 1-based. Any index that does not land inside `attribute`
/// (including `0`) is reported with its position in `indices`.
pub fn flatten_indexed<T: Clone>(attribute: &[T], indices: &[u32]) -> Result<Vec<T>, GeometryError> {
    indices
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            (index as usize)
                .checked_sub(1)
                .and_then(|zero_based| attribute.get(zero_based))
                .cloned()
                .ok_or(GeometryError::IndexOutOfRange {
                    position,
                    index,
                    len: attribute.len(),
                })
        })
        .collect()
}

/// Computes the flat normal of one triangle.
///
/// The edges are taken about the middle corner and crossed as `v2 x v1`,
/// which yields outward normals for the winding used by the source meshes.
/// The cross product is formed in `f64`, so neither very large nor very
/// small triangles lose their normal to overflow or underflow. Returns
/// `None` only when the cross product is exactly zero. A `NaN` corner
/// produces a `NaN` normal rather than `None`.
pub fn face_normal(p1: Vec3, p2: Vec3, p3: Vec3) -> Option<Vec3> {
    let (p1, p2, p3) = (p1.as_dvec3(), p2.as_dvec3(), p3.as_dvec3());
    let v1 = p1 - p2;
    let v2 = p3 - p2;
    let normal = v2.cross(v1);
    if normal == DVec3::ZERO {
        return None;
    }
    Some((normal / normal.length()).as_vec3())
}

/// Produces one normal per corner of a flattened position stream.
///
/// Every group of three consecutive positions is one face; its normal is
/// written three times.
pub fn flat_normals(positions: &[Vec3]) -> Result<Vec<Vec3>, GeometryError> {
    if positions.len() % 3 != 0 {
        return Err(GeometryError::IncompleteFace {
            len: positions.len(),
        });
    }

    let mut normals = Vec::with_capacity(positions.len());
    for (face, corners) in positions.chunks_exact(3).enumerate() {
        let normal = face_normal(corners[0], corners[1], corners[2])
            .ok_or(GeometryError::DegenerateFace { face })?;
        normals.extend([normal; 3]);
    }
    Ok(normals)
}

/// Non-indexed, flat-shaded vertex data ready for upload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

impl FlatMesh {
    /// Flattens the model's faces and derives their flat normals.
    pub fn from_model(model: &ObjModel) -> Result<Self, GeometryError> {
        let positions = flatten_indexed(&model.positions, &model.indices())?;
        let normals = flat_normals(&positions)?;
        debug!(
            "flattened {} positions and {} normals from {} faces",
            positions.len(),
            normals.len(),
            model.faces.len()
        );
        Ok(Self { positions, normals })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Interleaves positions and normals as `position.xyz, normal.xyz`.
    pub fn interleaved(&self) -> Vec<f32> {
        self.positions
            .iter()
            .zip(&self.normals)
            .flat_map(|(p, n)| [p.x, p.y, p.z, n.x, n.y, n.z])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::parse_obj;

    #[test]
    fn flatten_follows_indices() {
        let attribute = ['a', 'b', 'c'];
        let flat = flatten_indexed(&attribute, &[3, 1, 2, 2, 2, 3]).unwrap();
        assert_eq!(flat, vec!['c', 'a', 'b', 'b', 'b', 'c']);
    }

    #[test]
    fn flatten_reports_out_of_range_index() {
        let attribute = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let err = flatten_indexed(&attribute, &[1, 2, 99]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfRange {
                position: 2,
                index: 99,
                len: 3
            }
        );
        assert_eq!(
            err.to_string(),
            "index 99 at position 2 is out of range for 3 attributes"
        );
    }

    #[test]
    fn flatten_rejects_zero_index() {
        let err = flatten_indexed(&[1.0f32], &[0]).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::IndexOutOfRange { index: 0, .. }
        ));
    }

    #[test]
    fn unit_triangle_normal_points_up_z() {
        // cross((0,1,0)-(1,0,0), (0,0,0)-(1,0,0)) = (0,0,1)
        let normal = face_normal(Vec3::ZERO, Vec3::X, Vec3::Y).unwrap();
        assert!((normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn normal_is_repeated_per_corner() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(2.0, 1.0, 1.0),
            Vec3::new(1.0, 3.0, 5.0),
        ];
        let normals = flat_normals(&positions).unwrap();
        assert_eq!(normals.len(), 6);
        for face in normals.chunks_exact(3) {
            assert_eq!(face[0], face[1]);
            assert_eq!(face[1], face[2]);
            assert!((face[0].length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn collinear_face_is_degenerate() {
        let positions = [
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::splat(2.0),
        ];
        assert_eq!(
            flat_normals(&positions),
            Err(GeometryError::DegenerateFace { face: 1 })
        );
    }

    #[test]
    fn huge_triangle_keeps_unit_normal() {
        let normal = face_normal(
            Vec3::ZERO,
            Vec3::new(1e10, 0.0, 0.0),
            Vec3::new(0.0, 1e10, 0.0),
        )
        .unwrap();
        assert!((normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn tiny_triangle_is_not_degenerate() {
        let normal = face_normal(
            Vec3::ZERO,
            Vec3::new(1e-10, 0.0, 0.0),
            Vec3::new(0.0, 1e-10, 0.0),
        )
        .unwrap();
        assert!((normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn nan_corner_propagates() {
        let normal = face_normal(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::X, Vec3::Y).unwrap();
        assert!(normal.is_nan());
    }

    #[test]
    fn partial_face_is_rejected() {
        assert_eq!(
            flat_normals(&[Vec3::ZERO, Vec3::X]),
            Err(GeometryError::IncompleteFace { len: 2 })
        );
    }

    #[test]
    fn flat_mesh_interleaves_position_then_normal() {
        let model = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let mesh = FlatMesh::from_model(&model).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        let data = mesh.interleaved();
        assert_eq!(data.len(), 18);
        assert_eq!(&data[0..6], &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(&data[6..9], &[1.0, 0.0, 0.0]);
    }
}

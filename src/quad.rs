use glam::{Vec2, Vec3};

/// Corners of a unit quad in the XY plane, centred at the origin, as two
/// counter-clockwise triangles.
pub const QUAD_POSITIONS: [Vec3; 6] = [
    Vec3::new(-0.5, -0.5, 0.0),
    Vec3::new(0.5, -0.5, 0.0),
    Vec3::new(0.5, 0.5, 0.0),
    Vec3::new(-0.5, -0.5, 0.0),
    Vec3::new(0.5, 0.5, 0.0),
    Vec3::new(-0.5, 0.5, 0.0),
];

/// Texture coordinates matching [`QUAD_POSITIONS`] corner for corner.
pub const QUAD_UVS: [Vec2; 6] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// Interleaves the quad as `position.xyz, uv.xy` per corner.
pub fn quad_vertices() -> Vec<f32> {
    QUAD_POSITIONS
        .iter()
        .zip(QUAD_UVS.iter())
        .flat_map(|(p, uv)| [p.x, p.y, p.z, uv.x, uv.y])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uvs_track_positions() {
        for (p, uv) in QUAD_POSITIONS.iter().zip(QUAD_UVS.iter()) {
            assert_eq!(uv.x, p.x + 0.5);
            assert_eq!(uv.y, p.y + 0.5);
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise() {
        for tri in QUAD_POSITIONS.chunks_exact(3) {
            let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
            assert!(n.z > 0.0);
        }
    }

    #[test]
    fn interleaved_layout() {
        let data = quad_vertices();
        assert_eq!(data.len(), 30);
        assert_eq!(&data[10..15], &[0.5, 0.5, 0.0, 1.0, 1.0]);
    }
}

//! Procedural demo geometry.

use glam::{Vec2, Vec3};
use mocha_rhi::vertex::Vertex;

fn vertex(position: Vec3, color: Vec3, normal: Vec3, uv: Vec2) -> Vertex {
    Vertex {
        position,
        color,
        normal,
        uv,
    }
}

/// Unit cube centered at the origin, half-extent 0.5, with per-face
/// normals. 24 vertices, 36 indices.
pub fn cube(color: Vec3) -> (Vec<Vertex>, Vec<u32>) {
    // (normal, four corners in CCW order seen from outside)
    let faces: [(Vec3, [Vec3; 4]); 6] = [
        (
            Vec3::NEG_X,
            [
                Vec3::new(-0.5, -0.5, -0.5),
                Vec3::new(-0.5, -0.5, 0.5),
                Vec3::new(-0.5, 0.5, 0.5),
                Vec3::new(-0.5, 0.5, -0.5),
            ],
        ),
        (
            Vec3::X,
            [
                Vec3::new(0.5, -0.5, 0.5),
                Vec3::new(0.5, -0.5, -0.5),
                Vec3::new(0.5, 0.5, -0.5),
                Vec3::new(0.5, 0.5, 0.5),
            ],
        ),
        (
            Vec3::NEG_Y,
            [
                Vec3::new(-0.5, -0.5, -0.5),
                Vec3::new(0.5, -0.5, -0.5),
                Vec3::new(0.5, -0.5, 0.5),
                Vec3::new(-0.5, -0.5, 0.5),
            ],
        ),
        (
            Vec3::Y,
            [
                Vec3::new(-0.5, 0.5, 0.5),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(0.5, 0.5, -0.5),
                Vec3::new(-0.5, 0.5, -0.5),
            ],
        ),
        (
            Vec3::NEG_Z,
            [
                Vec3::new(0.5, -0.5, -0.5),
                Vec3::new(-0.5, -0.5, -0.5),
                Vec3::new(-0.5, 0.5, -0.5),
                Vec3::new(0.5, 0.5, -0.5),
            ],
        ),
        (
            Vec3::Z,
            [
                Vec3::new(-0.5, -0.5, 0.5),
                Vec3::new(0.5, -0.5, 0.5),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(-0.5, 0.5, 0.5),
            ],
        ),
    ];

    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(uvs) {
            vertices.push(vertex(corner, color, normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// Horizontal quad spanning [-1, 1] on X and Z at y = 0.
///
/// The normal points toward -Y, which is "up" in the engine's Y-down
/// world.
pub fn plane(color: Vec3) -> (Vec<Vertex>, Vec<u32>) {
    let normal = Vec3::NEG_Y;
    let vertices = vec![
        vertex(Vec3::new(-1.0, 0.0, -1.0), color, normal, Vec2::new(0.0, 0.0)),
        vertex(Vec3::new(1.0, 0.0, -1.0), color, normal, Vec2::new(1.0, 0.0)),
        vertex(Vec3::new(1.0, 0.0, 1.0), color, normal, Vec2::new(1.0, 1.0)),
        vertex(Vec3::new(-1.0, 0.0, 1.0), color, normal, Vec2::new(0.0, 1.0)),
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_one_vertex_per_face_corner() {
        let (vertices, indices) = cube(Vec3::splat(0.9));
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn cube_normals_are_axis_aligned_unit_vectors() {
        let (vertices, _) = cube(Vec3::ONE);
        for v in &vertices {
            assert!((v.normal.length() - 1.0).abs() < 1e-6);
            assert_eq!(v.normal.abs().max_element(), 1.0);
        }
    }

    #[test]
    fn plane_points_up_in_y_down_world() {
        let (vertices, indices) = plane(Vec3::ONE);
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
        assert!(vertices.iter().all(|v| v.normal == Vec3::NEG_Y));
        assert!(vertices.iter().all(|v| v.position.y == 0.0));
    }
}

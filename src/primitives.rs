//! Procedural primitives and the vehicle assembled from them.
//!
//! Each builder appends to an existing [`MeshData`] without clearing it, so
//! several primitives can share one vertex and index buffer. Positions are
//! offset by the `center` argument; the draw-time model matrix places the
//! whole assembly in the world.
//!
//! All triangles wind counter-clockwise when seen from outside, matching the
//! back-face culling the render pipeline uses. Texture coordinates are left at
//! `(0, 0)`.

use std::f32::consts::PI;

use crate::geometry::MeshData;
use glam::Vec3;

const NO_UV: [f32; 2] = [0.0, 0.0];

/// One face of an axis-aligned box: outward normal plus four corner signs.
struct BoxFace {
    normal: Vec3,
    corners: [Vec3; 4],
}

const fn corner(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Faces in emission order: front, back, top, bottom, right, left.
const BOX_FACES: [BoxFace; 6] = [
    BoxFace {
        normal: Vec3::Z,
        corners: [
            corner(-1.0, -1.0, 1.0),
            corner(1.0, -1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
        ],
    },
    BoxFace {
        normal: Vec3::NEG_Z,
        corners: [
            corner(1.0, -1.0, -1.0),
            corner(-1.0, -1.0, -1.0),
            corner(-1.0, 1.0, -1.0),
            corner(1.0, 1.0, -1.0),
        ],
    },
    BoxFace {
        normal: Vec3::Y,
        corners: [
            corner(-1.0, 1.0, -1.0),
            corner(-1.0, 1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(1.0, 1.0, -1.0),
        ],
    },
    BoxFace {
        normal: Vec3::NEG_Y,
        corners: [
            corner(-1.0, -1.0, 1.0),
            corner(-1.0, -1.0, -1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, -1.0, 1.0),
        ],
    },
    BoxFace {
        normal: Vec3::X,
        corners: [
            corner(1.0, -1.0, 1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, 1.0, -1.0),
            corner(1.0, 1.0, 1.0),
        ],
    },
    BoxFace {
        normal: Vec3::NEG_X,
        corners: [
            corner(-1.0, -1.0, -1.0),
            corner(-1.0, -1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
            corner(-1.0, 1.0, -1.0),
        ],
    },
];

/// Appends an axis-aligned box of the given full `size`.
///
/// Emits 24 vertices (four per face, flat normals) and 36 indices.
pub fn push_box(mesh: &mut MeshData, center: Vec3, size: Vec3) {
    let half = size * 0.5;
    for face in &BOX_FACES {
        let base = mesh.vertex_count();
        for c in face.corners {
            mesh.push_vertex(center + c * half, face.normal, NO_UV);
        }
        mesh.push_triangle(base, base + 1, base + 2);
        mesh.push_triangle(base, base + 2, base + 3);
    }
}

/// Appends a capped cylinder standing on the Y axis.
///
/// The side is a strip of `segments + 1` top/bottom vertex pairs with radial
/// normals; the seam vertex is duplicated. Each cap adds three vertices per
/// segment with a flat normal.
pub fn push_cylinder(mesh: &mut MeshData, center: Vec3, radius: f32, height: f32, segments: u32) {
    let segments = segments.max(3);
    let half_h = height * 0.5;
    let step = 2.0 * PI / segments as f32;
    let rim = |i: u32| {
        let phi = i as f32 * step;
        Vec3::new(phi.cos(), 0.0, phi.sin())
    };

    let base = mesh.vertex_count();
    for i in 0..=segments {
        let dir = rim(i);
        let offset = dir * radius;
        mesh.push_vertex(center + offset + Vec3::Y * half_h, dir, NO_UV);
        mesh.push_vertex(center + offset - Vec3::Y * half_h, dir, NO_UV);
    }
    for i in 0..segments {
        let top1 = base + 2 * i;
        let bot1 = top1 + 1;
        let top2 = top1 + 2;
        let bot2 = top1 + 3;
        mesh.push_triangle(top1, top2, bot1);
        mesh.push_triangle(bot1, top2, bot2);
    }

    for (y, normal) in [(half_h, Vec3::Y), (-half_h, Vec3::NEG_Y)] {
        let hub = center + Vec3::Y * y;
        for i in 0..segments {
            let a = hub + rim(i) * radius;
            let b = hub + rim(i + 1) * radius;
            let first = mesh.vertex_count();
            mesh.push_vertex(hub, normal, NO_UV);
            // Rim angle grows toward +Z, which is clockwise seen from above.
            if normal.y > 0.0 {
                mesh.push_vertex(b, normal, NO_UV);
                mesh.push_vertex(a, normal, NO_UV);
            } else {
                mesh.push_vertex(a, normal, NO_UV);
                mesh.push_vertex(b, normal, NO_UV);
            }
            mesh.push_triangle(first, first + 1, first + 2);
        }
    }
}

/// Appends a latitude/longitude sphere with `segments` stacks and slices.
///
/// Emits `(segments + 1)^2` vertices. The triangles touching the poles
/// collapse to zero area but are kept so every cell emits two.
pub fn push_sphere(mesh: &mut MeshData, center: Vec3, radius: f32, segments: u32) {
    let segments = segments.max(3);
    let base = mesh.vertex_count();

    for i in 0..=segments {
        let theta = PI * i as f32 / segments as f32;
        for j in 0..=segments {
            let phi = 2.0 * PI * j as f32 / segments as f32;
            let dir = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            mesh.push_vertex(center + dir * radius, dir, NO_UV);
        }
    }

    let row = segments + 1;
    for i in 0..segments {
        for j in 0..segments {
            let first = base + i * row + j;
            let second = first + row;
            mesh.push_triangle(first, first + 1, second);
            mesh.push_triangle(second, first + 1, second + 1);
        }
    }
}

/// Default vehicle paint.
pub const VEHICLE_COLOR: Vec3 = Vec3::new(0.8, 0.2, 0.2);

/// Builds the landing vehicle in object space with its base at the origin.
///
/// A long body, a nose section and cap, three fins, an engine nozzle and a
/// window, all in one buffer.
pub fn build_vehicle() -> MeshData {
    let mut mesh = MeshData::default();

    push_cylinder(&mut mesh, Vec3::new(0.0, 1.5, 0.0), 0.4, 3.0, 16);
    push_cylinder(&mut mesh, Vec3::new(0.0, 3.8, 0.0), 0.35, 0.8, 16);
    push_sphere(&mut mesh, Vec3::new(0.0, 4.5, 0.0), 0.3, 12);

    let fin = Vec3::new(0.1, 0.6, 0.4);
    push_box(&mut mesh, Vec3::new(-0.5, 0.8, 0.0), fin);
    push_box(&mut mesh, Vec3::new(0.5, 0.8, 0.0), fin);
    push_box(&mut mesh, Vec3::new(0.0, 0.8, 0.5), Vec3::new(0.4, 0.6, 0.1));

    push_cylinder(&mut mesh, Vec3::new(0.0, -0.3, 0.0), 0.5, 0.4, 16);
    push_sphere(&mut mesh, Vec3::new(0.0, 2.2, 0.4), 0.15, 8);

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Checks that every non-degenerate triangle faces the same way as its
    /// stored vertex normals.
    fn assert_outward(mesh: &MeshData) {
        assert_eq!(mesh.indices.len() % 3, 0);
        for tri in mesh.indices.chunks(3) {
            let v: Vec<_> = tri.iter().map(|&i| mesh.vertices[i as usize]).collect();
            let p0 = Vec3::from(v[0].position);
            let p1 = Vec3::from(v[1].position);
            let p2 = Vec3::from(v[2].position);
            let geometric = (p1 - p0).cross(p2 - p0);
            if geometric.length() < 1e-5 {
                continue;
            }
            for vertex in &v {
                let n = Vec3::from(vertex.normal);
                assert!(
                    geometric.dot(n) > 0.0,
                    "triangle {tri:?} winds against normal {n:?}"
                );
            }
        }
    }

    #[test]
    fn unit_box_counts_and_hull() {
        let mut mesh = MeshData::default();
        push_box(&mut mesh, Vec3::ZERO, Vec3::ONE);

        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::splat(-0.5));
        assert_eq!(bounds.max, Vec3::splat(0.5));
        assert!(mesh.vertices.iter().all(|v| v.uv == [0.0, 0.0]));
    }

    #[test]
    fn box_winds_outward() {
        let mut mesh = MeshData::default();
        push_box(&mut mesh, Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 2.0, 1.0));
        assert_outward(&mesh);
    }

    #[test]
    fn cylinder_layout() {
        let mut mesh = MeshData::default();
        push_cylinder(&mut mesh, Vec3::ZERO, 1.0, 2.0, 8);

        // Side strip, then three vertices per cap segment.
        assert_eq!(mesh.vertex_count(), 2 * 9 + 3 * 8 * 2);
        assert_eq!(mesh.index_count(), 8 * 6 + 8 * 3 * 2);

        let bounds = mesh.bounds().unwrap();
        assert!((bounds.max.y - 1.0).abs() < 1e-6);
        assert!((bounds.min.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cylinder_side_normals_are_radial() {
        let mut mesh = MeshData::default();
        push_cylinder(&mut mesh, Vec3::ZERO, 2.0, 1.0, 6);
        for v in &mesh.vertices[..14] {
            let n = Vec3::from(v.normal);
            let p = Vec3::from(v.position);
            assert!((n.length() - 1.0).abs() < 1e-6);
            assert_eq!(n.y, 0.0);
            assert!((Vec3::new(p.x, 0.0, p.z) / 2.0 - n).length() < 1e-5);
        }
    }

    #[test]
    fn cylinder_winds_outward() {
        let mut mesh = MeshData::default();
        push_cylinder(&mut mesh, Vec3::new(0.0, 1.5, 0.0), 0.4, 3.0, 16);
        assert_outward(&mesh);
    }

    #[test]
    fn sphere_layout_and_normals() {
        let mut mesh = MeshData::default();
        let center = Vec3::new(0.0, 4.5, 0.0);
        push_sphere(&mut mesh, center, 0.3, 12);

        assert_eq!(mesh.vertex_count(), 13 * 13);
        assert_eq!(mesh.index_count(), 12 * 12 * 6);
        for v in &mesh.vertices {
            let n = Vec3::from(v.normal);
            let offset = Vec3::from(v.position) - center;
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((offset - n * 0.3).length() < 1e-5);
        }
    }

    #[test]
    fn sphere_winds_outward() {
        let mut mesh = MeshData::default();
        push_sphere(&mut mesh, Vec3::ZERO, 1.0, 12);
        assert_outward(&mesh);
    }

    #[test]
    fn primitives_append_without_clearing() {
        let mut mesh = MeshData::default();
        push_box(&mut mesh, Vec3::ZERO, Vec3::ONE);
        push_box(&mut mesh, Vec3::X * 3.0, Vec3::ONE);

        assert_eq!(mesh.vertex_count(), 48);
        assert_eq!(mesh.indices[36], 24);
        assert_eq!(*mesh.indices.iter().max().unwrap(), 47);
    }

    #[test]
    fn vehicle_is_one_outward_buffer() {
        let mesh = build_vehicle();
        let cylinder = 2 * 17 + 3 * 16 * 2;
        let expected = 3 * cylinder + 13 * 13 + 3 * 24 + 9 * 9;
        assert_eq!(mesh.vertex_count() as usize, expected);
        assert!(mesh.indices.iter().all(|&i| i < mesh.vertex_count()));
        assert_outward(&mesh);

        let bounds = mesh.bounds().unwrap();
        assert!((bounds.min.y + 0.5).abs() < 1e-5);
        assert!((bounds.max.y - 4.8).abs() < 1e-5);
    }
}

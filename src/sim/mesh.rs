//! Shared collision meshes and polygon overlap
//!
//! Every entity of the same kind points at one read-only outline in the
//! [`MeshLibrary`]. Outlines are in unit local space (roughly -0.5..0.5) and are
//! scaled by the entity's `Motion::scale` at test time.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::Motion;
use crate::deg_to_rad;

/// Identifies one shared outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshId {
    /// Full-cell box: walls, doors, pickups, snipers, portals
    Square,
    /// Round bubble: portal shots, boomerangs
    Bubble,
    /// Squat rounded outline: traps, cheese, patrol cats
    Trap,
    /// The player's mouse silhouette
    Mouse,
}

impl MeshId {
    pub const ALL: [MeshId; 4] = [MeshId::Square, MeshId::Bubble, MeshId::Trap, MeshId::Mouse];

    fn slot(self) -> usize {
        match self {
            MeshId::Square => 0,
            MeshId::Bubble => 1,
            MeshId::Trap => 2,
            MeshId::Mouse => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec2>,
}

impl Mesh {
    fn from_points(points: &[[f32; 2]]) -> Self {
        Self {
            vertices: points.iter().map(|&[x, y]| Vec2::new(x, y)).collect(),
        }
    }

    /// Regular n-gon inscribed in the unit cell
    fn regular(sides: usize, radius: f32) -> Self {
        let vertices = (0..sides)
            .map(|i| {
                let a = std::f32::consts::TAU * i as f32 / sides as f32;
                Vec2::new(a.cos(), a.sin()) * radius
            })
            .collect();
        Self { vertices }
    }
}

/// Arena owning every shared outline. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct MeshLibrary {
    meshes: [Mesh; 4],
}

impl Default for MeshLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshLibrary {
    pub fn new() -> Self {
        let square = Mesh::from_points(&[[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]]);
        let bubble = Mesh::regular(8, 0.5);
        let trap = Mesh::from_points(&[
            [-0.45, -0.3],
            [-0.3, -0.45],
            [0.3, -0.45],
            [0.45, -0.3],
            [0.45, 0.3],
            [0.3, 0.45],
            [-0.3, 0.45],
            [-0.45, 0.3],
        ]);
        let mouse = Mesh::from_points(&[
            [-0.5, 0.0],
            [-0.35, -0.35],
            [0.0, -0.45],
            [0.4, -0.3],
            [0.5, 0.0],
            [0.4, 0.3],
            [0.0, 0.45],
            [-0.35, 0.35],
        ]);
        Self {
            meshes: [square, bubble, trap, mouse],
        }
    }

    pub fn get(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.slot()]
    }
}

/// Transform a mesh into world space: scale, then rotate, then translate.
///
/// Rotation follows the sprite convention (degrees, counter-clockwise on a y-down screen).
pub fn world_outline(mesh: &Mesh, motion: &Motion) -> Vec<Vec2> {
    let rotation = Vec2::from_angle(-deg_to_rad(motion.angle));
    mesh.vertices
        .iter()
        .map(|&v| rotation.rotate(v * motion.scale) + motion.position)
        .collect()
}

/// Even-odd test with a horizontal ray toward +x. Points on an edge may go either way.
pub fn point_in_polygon(p: Vec2, poly: &[Vec2]) -> bool {
    let mut inside = false;
    for (i, &a) in poly.iter().enumerate() {
        let b = poly[(i + 1) % poly.len()];
        if (a.y > p.y) != (b.y > p.y) {
            let dy = b.y - a.y;
            if dy.abs() < 1e-6 {
                continue;
            }
            let x = (b.x - a.x) * (p.y - a.y) / dy + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Vertex containment in either direction.
///
/// Two shapes crossing like a plus sign, with no vertex inside the other, are not
/// reported. At game scales that never happens between a mover and a cell-sized box.
pub fn polygons_overlap(a: &[Vec2], b: &[Vec2]) -> bool {
    a.iter().any(|&v| point_in_polygon(v, b)) || b.iter().any(|&v| point_in_polygon(v, a))
}

/// Axis-aligned box test on `|scale|` centred at each position
pub fn aabb_overlap(a: &Motion, b: &Motion) -> bool {
    let half_a = a.scale.abs() / 2.0;
    let half_b = b.scale.abs() / 2.0;
    let overlap_x = a.position.x - half_a.x < b.position.x + half_b.x
        && a.position.x + half_a.x > b.position.x - half_b.x;
    let overlap_y = a.position.y - half_a.y < b.position.y + half_b.y
        && a.position.y + half_a.y > b.position.y - half_b.y;
    overlap_x && overlap_y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion(pos: Vec2, scale: Vec2, angle: f32) -> Motion {
        Motion {
            position: pos,
            angle,
            velocity: Vec2::ZERO,
            scale,
        }
    }

    #[test]
    fn test_point_in_square() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Vec2::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Vec2::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(Vec2::new(-1.0, 5.0), &square));
        assert!(!point_in_polygon(Vec2::new(5.0, 11.0), &square));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape: notch between x=3..7 above y=4
        let u = [
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 6.0),
            Vec2::new(7.0, 6.0),
            Vec2::new(7.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        assert!(!point_in_polygon(Vec2::new(5.0, 3.0), &u));
        assert!(point_in_polygon(Vec2::new(1.0, 3.0), &u));
        assert!(point_in_polygon(Vec2::new(5.0, 8.0), &u));
    }

    #[test]
    fn test_world_outline_transform() {
        let lib = MeshLibrary::new();
        let m = motion(Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0), 90.0);
        let outline = world_outline(lib.get(MeshId::Square), &m);
        // Scaled 20x10 then rotated a quarter turn: footprint becomes 10 wide, 20 tall
        let min = outline.iter().fold(Vec2::splat(f32::MAX), |acc, v| acc.min(*v));
        let max = outline.iter().fold(Vec2::splat(f32::MIN), |acc, v| acc.max(*v));
        assert!((max.x - min.x - 10.0).abs() < 1e-3);
        assert!((max.y - min.y - 20.0).abs() < 1e-3);
        assert!(((min + max) / 2.0 - m.position).length() < 1e-3);
    }

    #[test]
    fn test_overlap_is_repeatable() {
        let lib = MeshLibrary::new();
        let a = motion(Vec2::new(0.0, 0.0), Vec2::splat(64.0), 0.0);
        let b = motion(Vec2::new(40.0, 10.0), Vec2::splat(54.0), 30.0);
        let oa = world_outline(lib.get(MeshId::Square), &a);
        let ob = world_outline(lib.get(MeshId::Mouse), &b);
        let first = polygons_overlap(&oa, &ob);
        assert!(first);
        for _ in 0..5 {
            assert_eq!(polygons_overlap(&oa, &ob), first);
        }
    }

    #[test]
    fn test_separated_shapes() {
        let lib = MeshLibrary::new();
        let a = motion(Vec2::new(0.0, 0.0), Vec2::splat(64.0), 0.0);
        let b = motion(Vec2::new(100.0, 0.0), Vec2::splat(64.0), 0.0);
        assert!(!aabb_overlap(&a, &b));
        let oa = world_outline(lib.get(MeshId::Square), &a);
        let ob = world_outline(lib.get(MeshId::Bubble), &b);
        assert!(!polygons_overlap(&oa, &ob));
    }

    #[test]
    fn test_aabb_uses_abs_scale() {
        let a = motion(Vec2::ZERO, Vec2::new(-64.0, 64.0), 0.0);
        let b = motion(Vec2::new(50.0, 0.0), Vec2::splat(40.0), 0.0);
        assert!(aabb_overlap(&a, &b));
    }
}

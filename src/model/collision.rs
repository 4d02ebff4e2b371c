use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

const RAY_EPS: f32 = 1.0e-7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.min(*p),
            max: acc.max.max(*p),
        }))
    }

    /// Touching boxes count as intersecting.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_xz(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.z >= self.min.z && p.z <= self.max.z
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }
}

/// Static triangle mesh in world space. Bounds are derived on every call;
/// the geometry never changes once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Triangle list. Empty means `positions` is already a triangle soup.
    pub indices: Vec<u32>,
}

/// Corner `i` of a box: bit 0 picks x, bit 1 y, bit 2 z.
const CUBOID_INDICES: [u32; 36] = [
    2, 6, 7, 2, 7, 3, // +y
    0, 1, 5, 0, 5, 4, // -y
    1, 3, 7, 1, 7, 5, // +x
    0, 4, 6, 0, 6, 2, // -x
    4, 5, 7, 4, 7, 6, // +z
    0, 2, 3, 0, 3, 1, // -z
];

impl Collider {
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            indices,
        }
    }

    /// Closed box with outward-facing (counter-clockwise) triangles.
    pub fn cuboid(name: impl Into<String>, bounds: Aabb) -> Self {
        let positions = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { bounds.min.x } else { bounds.max.x },
                    if i & 2 == 0 { bounds.min.y } else { bounds.max.y },
                    if i & 4 == 0 { bounds.min.z } else { bounds.max.z },
                )
            })
            .collect();
        Self::new(name, positions, CUBOID_INDICES.to_vec())
    }

    pub fn translated(mut self, offset: Vec3) -> Self {
        for p in &mut self.positions {
            *p += offset;
        }
        self
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.positions)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let soup = self.indices.is_empty();
        let count = if soup { self.positions.len() / 3 } else { self.indices.len() / 3 };
        (0..count).filter_map(move |tri| {
            let idx = |corner: usize| -> Option<Vec3> {
                let i = if soup {
                    tri * 3 + corner
                } else {
                    self.indices[tri * 3 + corner] as usize
                };
                self.positions.get(i).copied()
            };
            Some([idx(0)?, idx(1)?, idx(2)?])
        })
    }

    /// Nearest front-facing triangle straight below `origin`.
    pub fn raycast_down(&self, origin: Vec3) -> Option<RayHit> {
        let bounds = self.bounds()?;
        if !bounds.contains_xz(origin) || bounds.min.y > origin.y {
            return None;
        }
        self.triangles()
            .filter_map(|tri| intersect_down(origin, tri))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
}

/// Möller-Trumbore against a `-Y` ray, back faces culled. The hit height is
/// interpolated from the vertices so a flat floor reports its exact height.
fn intersect_down(origin: Vec3, [a, b, c]: [Vec3; 3]) -> Option<RayHit> {
    let dir = Vec3::NEG_Y;
    let e1 = b - a;
    let e2 = c - a;
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det < RAY_EPS {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let y = a.y + u * e1.y + v * e2.y;
    if y > origin.y {
        return None;
    }
    Some(RayHit {
        point: Vec3::new(origin.x, y, origin.z),
        distance: origin.y - y,
    })
}

/// Static-geometry queries used by locomotion.
pub trait CollisionProvider {
    /// Would the character's bounds at `candidate` touch any blocking collider?
    fn overlaps(&self, candidate: Vec3) -> bool;

    /// Nearest walkable surface straight below `origin`.
    fn raycast_down(&self, origin: Vec3) -> Option<RayHit>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    Blocking,
    Walkable,
}

/// Append-only registry of blocking colliders and walkable surfaces. The two
/// lists are disjoint: blocking geometry is never walked on and floors never block.
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    character_half_extents: Vec3,
    blocking: Vec<Collider>,
    walkable: Vec<Collider>,
}

impl CollisionWorld {
    pub fn new(character_half_extents: Vec3) -> Self {
        Self {
            character_half_extents,
            blocking: Vec::new(),
            walkable: Vec::new(),
        }
    }

    pub fn insert(&mut self, kind: ColliderKind, collider: Collider) {
        debug!(name = %collider.name, ?kind, "registering collider");
        match kind {
            ColliderKind::Blocking => self.blocking.push(collider),
            ColliderKind::Walkable => self.walkable.push(collider),
        }
    }

    pub fn blocking(&self) -> &[Collider] {
        &self.blocking
    }

    pub fn walkable(&self) -> &[Collider] {
        &self.walkable
    }

    pub fn character_bounds(&self, position: Vec3) -> Aabb {
        Aabb::from_center(position, self.character_half_extents)
    }
}

impl CollisionProvider for CollisionWorld {
    fn overlaps(&self, candidate: Vec3) -> bool {
        let player = self.character_bounds(candidate);
        self.blocking
            .iter()
            .filter_map(Collider::bounds)
            .any(|bounds| bounds.intersects(&player))
    }

    fn raycast_down(&self, origin: Vec3) -> Option<RayHit> {
        self.walkable
            .iter()
            .filter_map(|surface| surface.raycast_down(origin))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> CollisionWorld {
        CollisionWorld::new(Vec3::new(0.3, 0.8, 0.3))
    }

    #[test]
    fn empty_world_answers_no_collision() {
        let w = world();
        assert!(!w.overlaps(Vec3::new(93.0, 79.0, 110.0)));
        assert!(w.raycast_down(Vec3::new(93.0, 79.0, 110.0)).is_none());
    }

    #[test]
    fn cuboid_faces_point_outward() {
        let c = Collider::cuboid("box", Aabb::new(Vec3::ZERO, Vec3::ONE));
        let center = Vec3::splat(0.5);
        for [a, b, c] in c.triangles() {
            let n = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(n.dot(centroid - center) > 0.0);
        }
        assert_eq!(c.triangles().count(), 12);
    }

    #[test]
    fn overlap_uses_character_bounds() {
        let mut w = world();
        w.insert(
            ColliderKind::Blocking,
            Collider::cuboid("wall", Aabb::new(Vec3::new(1.0, 0.0, -5.0), Vec3::new(2.0, 5.0, 5.0))),
        );
        assert!(!w.overlaps(Vec3::new(0.5, 1.0, 0.0)));
        assert!(w.overlaps(Vec3::new(0.8, 1.0, 0.0)));
    }

    #[test]
    fn touching_counts_as_overlap() {
        let mut w = CollisionWorld::new(Vec3::splat(0.5));
        w.insert(
            ColliderKind::Blocking,
            Collider::cuboid("wall", Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0))),
        );
        assert!(w.overlaps(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!w.overlaps(Vec3::new(0.25, 0.5, 0.5)));
    }

    #[test]
    fn walkable_surfaces_do_not_block() {
        let mut w = world();
        w.insert(
            ColliderKind::Walkable,
            Collider::cuboid("floor", Aabb::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0))),
        );
        assert!(!w.overlaps(Vec3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn raycast_hits_top_of_floor() {
        let mut w = world();
        w.insert(
            ColliderKind::Walkable,
            Collider::cuboid("floor", Aabb::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.25, 10.0))),
        );
        let hit = w.raycast_down(Vec3::new(3.0, 2.8, -4.0)).unwrap();
        assert_eq!(hit.point, Vec3::new(3.0, 0.25, -4.0));
        assert!((hit.distance - 2.55).abs() < 1e-5);
        assert!(w.raycast_down(Vec3::new(30.0, 2.8, 0.0)).is_none());
        // below the floor: only back faces above, nothing hit
        assert!(w.raycast_down(Vec3::new(0.0, -2.0, 0.0)).is_none());
    }

    #[test]
    fn raycast_returns_nearest_surface() {
        let mut w = world();
        w.insert(
            ColliderKind::Walkable,
            Collider::cuboid("ground", Aabb::new(Vec3::new(-50.0, -1.0, -50.0), Vec3::new(50.0, 0.0, 50.0))),
        );
        w.insert(
            ColliderKind::Walkable,
            Collider::cuboid("stage", Aabb::new(Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 1.5, 2.0))),
        );
        let hit = w.raycast_down(Vec3::new(0.0, 10.0, 0.0)).unwrap();
        assert_eq!(hit.point.y, 1.5);
        let hit = w.raycast_down(Vec3::new(5.0, 10.0, 0.0)).unwrap();
        assert_eq!(hit.point.y, 0.0);
    }

    #[test]
    fn sloped_triangle_interpolates_height() {
        let ramp = Collider::new(
            "ramp",
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0), Vec3::new(4.0, 4.0, 0.0)],
            Vec::new(),
        );
        let hit = ramp.raycast_down(Vec3::new(2.0, 10.0, 1.0)).unwrap();
        assert!((hit.point.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn translated_moves_bounds() {
        let c = Collider::cuboid("c", Aabb::new(Vec3::ZERO, Vec3::ONE)).translated(Vec3::new(0.0, -2.0, 0.0));
        let b = c.bounds().unwrap();
        assert_eq!(b.min, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, -1.0, 1.0));
    }
}

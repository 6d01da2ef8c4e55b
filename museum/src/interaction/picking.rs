//! Ray picking against exhibit geometry.
//!
//! Manual ray casts instead of Bevy's mesh picking, so egui keeps its
//! input. Each mesh's bounding box is the broad phase; a box hit is then
//! confirmed against the mesh triangles. Both tests run in the mesh's local
//! space, so rotated and scaled exhibits pick on their actual shape.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::render::camera::CameraProjection;
use bevy::render::mesh::{PrimitiveTopology, VertexAttributeValues};
use bevy::render::primitives::Aabb;
use bevy::window::PrimaryWindow;

use super::Decoration;
use crate::camera::OrbitCamera;
use crate::catalog::ModelRecord;

/// Slab test. Returns the entry distance along `dir`, clamped to 0 when the
/// origin is inside the box.
pub fn ray_aabb_intersect(origin: Vec3, dir: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Option<f32> {
    let inv_dir = 1.0 / dir;
    let t1 = (aabb_min - origin) * inv_dir;
    let t2 = (aabb_max - origin) * inv_dir;
    let t_min = t1.min(t2);
    let t_max = t1.max(t2);
    let t_enter = t_min.x.max(t_min.y).max(t_min.z);
    let t_exit = t_max.x.min(t_max.y).min(t_max.z);
    if t_enter <= t_exit && t_exit > 0.0 {
        Some(t_enter.max(0.0))
    } else {
        None
    }
}

/// Möller-Trumbore. Both faces count; only hits in front of `origin`.
pub fn ray_triangle_intersect(origin: Vec3, dir: Vec3, [a, b, c]: [Vec3; 3]) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < 1e-12 {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t > 0.0).then_some(t)
}

/// Distance along `ray` to a mesh's bounding box.
pub fn ray_hits_box(ray: Ray3d, transform: &GlobalTransform, aabb: &Aabb) -> Option<f32> {
    let to_local = transform.affine().inverse();
    let origin = to_local.transform_point3(ray.origin);
    // Not normalized: keeps the ray parameter equal to world distance.
    let dir = to_local.transform_vector3(*ray.direction);
    let center = Vec3::from(aabb.center);
    let half = Vec3::from(aabb.half_extents);
    ray_aabb_intersect(origin, dir, center - half, center + half)
}

/// Distance along `ray` to the nearest triangle of `mesh`. Meshes that are not
/// triangle lists are never hit.
pub fn ray_hits_mesh(
    ray: Ray3d,
    transform: &GlobalTransform,
    aabb: &Aabb,
    mesh: &Mesh,
) -> Option<f32> {
    ray_hits_box(ray, transform, aabb)?;
    if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
        return None;
    }
    let Some(VertexAttributeValues::Float32x3(positions)) =
        mesh.attribute(Mesh::ATTRIBUTE_POSITION)
    else {
        return None;
    };

    let to_local = transform.affine().inverse();
    let origin = to_local.transform_point3(ray.origin);
    let dir = to_local.transform_vector3(*ray.direction);

    let indices: Vec<usize> = match mesh.indices() {
        Some(indices) => indices.iter().collect(),
        None => (0..positions.len()).collect(),
    };
    indices
        .chunks_exact(3)
        .filter_map(|triangle| {
            let corner = |i: usize| positions.get(triangle[i]).map(|p| Vec3::from(*p));
            ray_triangle_intersect(origin, dir, [corner(0)?, corner(1)?, corner(2)?])
        })
        .min_by(f32::total_cmp)
}

pub fn nearest_hit<'a>(
    ray: Ray3d,
    candidates: impl IntoIterator<Item = (Entity, &'a GlobalTransform, &'a Aabb, &'a Mesh)>,
) -> Option<(Entity, f32)> {
    candidates
        .into_iter()
        .filter_map(|(entity, transform, aabb, mesh)| {
            ray_hits_mesh(ray, transform, aabb, mesh).map(|dist| (entity, dist))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
}

/// Follows parent links up to the entity that has no parent.
pub fn top_level_ancestor(entity: Entity, parent_of: impl Fn(Entity) -> Option<Entity>) -> Entity {
    let mut current = entity;
    while let Some(parent) = parent_of(current) {
        current = parent;
    }
    current
}

/// World-space ray through `cursor` for a camera that renders the whole
/// surface. Unprojects through the camera's own projection, so it does not
/// depend on render-world state.
pub fn screen_ray(
    projection: &Projection,
    camera: &GlobalTransform,
    surface: Vec2,
    cursor: Vec2,
) -> Option<Ray3d> {
    if surface.x <= 0.0 || surface.y <= 0.0 {
        return None;
    }
    let ndc = Vec2::new(
        cursor.x / surface.x * 2.0 - 1.0,
        1.0 - cursor.y / surface.y * 2.0,
    );
    let world_from_ndc = camera.compute_matrix() * projection.get_clip_from_view().inverse();
    // Reverse-z: the near plane sits at depth 1.
    let near = world_from_ndc.project_point3(ndc.extend(1.0));
    let far = world_from_ndc.project_point3(ndc.extend(f32::EPSILON));
    let direction = Dir3::new(far - near).ok()?;
    Some(Ray3d {
        origin: near,
        direction,
    })
}

/// Resolves screen points to the exhibit record under them.
///
/// Only meshes whose top-level ancestor carries a [`ModelRecord`] are in the
/// hit set. Record-less scenery like the hall backdrop neither resolves nor
/// blocks a recorded exhibit behind it.
#[derive(SystemParam)]
pub struct ExhibitPicker<'w, 's> {
    windows: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    cameras: Query<'w, 's, (&'static Projection, &'static GlobalTransform), With<OrbitCamera>>,
    targets: Query<
        'w,
        's,
        (
            Entity,
            &'static GlobalTransform,
            &'static Aabb,
            &'static Mesh3d,
        ),
        Without<Decoration>,
    >,
    meshes: Res<'w, Assets<Mesh>>,
    parents: Query<'w, 's, &'static Parent>,
    records: Query<'w, 's, &'static ModelRecord>,
}

impl ExhibitPicker<'_, '_> {
    pub fn pick(&self, cursor: Vec2) -> Option<&ModelRecord> {
        let window = self.windows.get_single().ok()?;
        let (projection, transform) = self.cameras.get_single().ok()?;
        let ray = screen_ray(projection, transform, window.size(), cursor)?;
        self.pick_ray(ray)
    }

    pub fn pick_ray(&self, ray: Ray3d) -> Option<&ModelRecord> {
        let candidates = self
            .targets
            .iter()
            .filter_map(|(entity, transform, aabb, mesh)| {
                let root = top_level_ancestor(entity, |entity| {
                    self.parents.get(entity).ok().map(Parent::get)
                });
                if !self.records.contains(root) {
                    return None;
                }
                // Not loaded yet.
                let mesh = self.meshes.get(&mesh.0)?;
                Some((root, transform, aabb, mesh))
            });
        let (root, _) = nearest_hit(ray, candidates)?;
        self.records.get(root).ok()
    }
}

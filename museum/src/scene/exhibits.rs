//! Exhibit loading: one asset request per catalog entry, attached to the
//! scene as each finishes. Failures are logged and leave nothing behind.

use bevy::asset::{LoadState, RecursiveDependencyLoadState, UntypedAssetId};
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::render::primitives::Aabb;

use crate::camera::OrbitCamera;
use crate::catalog::{ExhibitSpec, SourceFormat};

const DEFAULT_EXHIBIT_COLOR: Color = Color::srgb(0.7, 0.7, 0.72);

/// Root entity of a loaded exhibit, directly under the scene root.
#[derive(Component, Clone, Debug)]
pub struct Exhibit {
    pub url: String,
}

/// The first primary exhibit; removed once the camera has been framed on it.
#[derive(Component)]
pub struct AwaitingFraming;

/// Material to push onto every mesh of a glTF scene once it has spawned.
#[derive(Component)]
pub struct MaterialOverridePending(pub Handle<StandardMaterial>);

/// The catalog the loader works from.
#[derive(Resource, Clone, Debug, Default)]
pub struct ExhibitCatalog(pub Vec<ExhibitSpec>);

#[derive(Clone, Debug)]
pub enum ExhibitHandle {
    Gltf(Handle<Gltf>),
    Mesh(Handle<Mesh>),
}

impl ExhibitHandle {
    fn id(&self) -> UntypedAssetId {
        match self {
            Self::Gltf(handle) => handle.id().untyped(),
            Self::Mesh(handle) => handle.id().untyped(),
        }
    }
}

/// Loads issued but not yet attached or failed.
#[derive(Resource, Default)]
pub struct PendingExhibits {
    entries: Vec<(ExhibitSpec, ExhibitHandle)>,
}

impl PendingExhibits {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a primary exhibit has already claimed the camera this session.
#[derive(Resource, Default)]
pub struct FramingState {
    claimed: bool,
}

impl FramingState {
    fn claim(&mut self) -> bool {
        !std::mem::replace(&mut self.claimed, true)
    }
}

enum LoadPoll {
    Waiting,
    Ready,
    Failed(String),
}

fn poll_load(server: &AssetServer, id: UntypedAssetId) -> LoadPoll {
    match server.load_state(id) {
        LoadState::Failed(err) => LoadPoll::Failed(err.to_string()),
        LoadState::Loaded => match server.recursive_dependency_load_state(id) {
            RecursiveDependencyLoadState::Loaded => LoadPoll::Ready,
            RecursiveDependencyLoadState::Failed(err) => LoadPoll::Failed(err.to_string()),
            _ => LoadPoll::Waiting,
        },
        _ => LoadPoll::Waiting,
    }
}

pub fn request_exhibit_loads(
    catalog: Res<ExhibitCatalog>,
    asset_server: Res<AssetServer>,
    mut pending: ResMut<PendingExhibits>,
) {
    for spec in &catalog.0 {
        let handle = match spec.format() {
            Some(SourceFormat::Gltf) => ExhibitHandle::Gltf(asset_server.load(spec.url.clone())),
            Some(SourceFormat::Stl | SourceFormat::Obj) => {
                ExhibitHandle::Mesh(asset_server.load(spec.url.clone()))
            }
            None => {
                error!("cannot load {}: unsupported format", spec.url);
                continue;
            }
        };
        debug!("requested {}", spec.url);
        pending.entries.push((spec.clone(), handle));
    }
}

#[allow(clippy::too_many_arguments)]
pub fn attach_loaded_exhibits(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pending: ResMut<PendingExhibits>,
    mut framing: ResMut<FramingState>,
) {
    if pending.is_empty() {
        return;
    }

    let entries = std::mem::take(&mut pending.entries);
    for (spec, handle) in entries {
        match poll_load(&asset_server, handle.id()) {
            LoadPoll::Waiting => {
                pending.entries.push((spec, handle));
                continue;
            }
            LoadPoll::Failed(reason) => {
                error!("failed to load {}: {reason}", spec.url);
                continue;
            }
            LoadPoll::Ready => {}
        }

        let mut exhibit = match &handle {
            ExhibitHandle::Gltf(handle) => {
                let scene = gltfs.get(handle).and_then(|gltf| {
                    gltf.default_scene
                        .clone()
                        .or_else(|| gltf.scenes.first().cloned())
                });
                let Some(scene) = scene else {
                    error!("failed to load {}: file has no scenes", spec.url);
                    continue;
                };
                let mut exhibit = commands.spawn(SceneRoot(scene));
                if let Some(material) = spec.material {
                    exhibit.insert(MaterialOverridePending(materials.add(material.to_material())));
                }
                exhibit
            }
            ExhibitHandle::Mesh(handle) => {
                let material = spec.material.map_or_else(
                    || StandardMaterial::from(DEFAULT_EXHIBIT_COLOR),
                    |material| material.to_material(),
                );
                commands.spawn((Mesh3d(handle.clone()), MeshMaterial3d(materials.add(material))))
            }
        };

        exhibit.insert((
            spec.transform(),
            Exhibit {
                url: spec.url.clone(),
            },
            Name::new(spec.url.clone()),
        ));
        if let Some(record) = &spec.record {
            exhibit.insert(record.clone());
        }
        if spec.primary && framing.claim() {
            exhibit.insert(AwaitingFraming);
        }
        info!("attached {}", spec.url);
    }
}

pub fn apply_material_overrides(
    mut commands: Commands,
    pending: Query<(Entity, &MaterialOverridePending)>,
    children: Query<&Children>,
    meshes: Query<(), With<Mesh3d>>,
) {
    for (root, MaterialOverridePending(material)) in &pending {
        let targets: Vec<Entity> = children
            .iter_descendants(root)
            .filter(|entity| meshes.contains(*entity))
            .collect();
        // Scene instance not spawned yet.
        if targets.is_empty() {
            continue;
        }
        for entity in targets {
            commands
                .entity(entity)
                .insert(MeshMaterial3d(material.clone()));
        }
        commands.entity(root).remove::<MaterialOverridePending>();
    }
}

pub fn frame_primary_exhibit(
    mut commands: Commands,
    awaiting: Query<Entity, With<AwaitingFraming>>,
    children: Query<&Children>,
    bounds: Query<(&GlobalTransform, &Aabb)>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    for root in &awaiting {
        let boxes = std::iter::once(root)
            .chain(children.iter_descendants(root))
            .filter_map(|entity| bounds.get(entity).ok())
            .map(|(transform, aabb)| world_aabb(transform, aabb));
        // Bounds are computed in PostUpdate; try again next frame.
        let Some((min, max)) = union_boxes(boxes) else {
            continue;
        };

        let (target, eye) = framing_for(min, max);
        for mut orbit in &mut cameras {
            orbit.target = target;
            orbit.look_from(eye);
        }
        commands.entity(root).remove::<AwaitingFraming>();
        info!("camera framed on primary exhibit at {target}");
    }
}

/// World-space bounds of a local-space box.
pub fn world_aabb(transform: &GlobalTransform, aabb: &Aabb) -> (Vec3, Vec3) {
    let center = Vec3::from(aabb.center);
    let half = Vec3::from(aabb.half_extents);
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for corner in 0..8 {
        let sign = Vec3::new(
            if corner & 1 == 0 { -1.0 } else { 1.0 },
            if corner & 2 == 0 { -1.0 } else { 1.0 },
            if corner & 4 == 0 { -1.0 } else { 1.0 },
        );
        let point = transform.transform_point(center + half * sign);
        min = min.min(point);
        max = max.max(point);
    }
    (min, max)
}

pub fn union_boxes(boxes: impl IntoIterator<Item = (Vec3, Vec3)>) -> Option<(Vec3, Vec3)> {
    boxes
        .into_iter()
        .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
}

/// Orbit target and eye that frame a box: centre, then centre offset by
/// half, a fifth and half of the box diagonal.
pub fn framing_for(min: Vec3, max: Vec3) -> (Vec3, Vec3) {
    let center = (min + max) * 0.5;
    let diagonal = (max - min).length();
    let eye = center + Vec3::new(diagonal / 2.0, diagonal / 5.0, diagonal / 2.0);
    (center, eye)
}

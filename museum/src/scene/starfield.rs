// Background star points with a slow twinkle.

use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::interaction::Decoration;

#[derive(Component)]
pub struct Starfield;

#[derive(Resource, Clone, Debug)]
pub struct StarfieldSettings {
    pub count: usize,
    /// Edge length of the cube the stars are spread over.
    pub spread: f32,
    pub seed: u64,
}

impl Default for StarfieldSettings {
    fn default() -> Self {
        Self {
            count: 2000,
            spread: 200.0,
            seed: 77,
        }
    }
}

#[derive(Resource)]
pub(super) struct StarfieldMaterial(pub(super) Handle<StandardMaterial>);

pub fn starfield_plugin(app: &mut App) {
    app.init_resource::<StarfieldSettings>()
        .add_systems(Startup, spawn_starfield)
        .add_systems(Update, twinkle_system);
}

/// Uniform positions in a cube of edge `spread` centred on the origin.
pub fn star_positions(count: usize, spread: f32, seed: u64) -> Vec<[f32; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = spread / 2.0;
    (0..count)
        .map(|_| {
            [
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
            ]
        })
        .collect()
}

pub fn twinkle_opacity(seconds: f32) -> f32 {
    0.7 + 0.3 * seconds.sin()
}

fn spawn_starfield(
    mut commands: Commands,
    settings: Res<StarfieldSettings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let positions = star_positions(settings.count, settings.spread, settings.seed);
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];
    let mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals);

    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE.with_alpha(twinkle_opacity(0.0)),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    commands.insert_resource(StarfieldMaterial(material.clone()));

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(material),
        Transform::default(),
        Starfield,
        Decoration,
        Name::new("starfield"),
    ));
    debug!("spawned {} stars", settings.count);
}

fn twinkle_system(
    time: Res<Time>,
    handle: Option<Res<StarfieldMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(handle) = handle else {
        return;
    };
    if let Some(material) = materials.get_mut(&handle.0) {
        material
            .base_color
            .set_alpha(twinkle_opacity(time.elapsed_secs()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_stay_inside_the_cube() {
        let stars = star_positions(2000, 200.0, 1);

        assert_eq!(stars.len(), 2000);
        assert!(stars
            .iter()
            .flatten()
            .all(|coord| (-100.0..=100.0).contains(coord)));
    }

    #[test]
    fn same_seed_same_sky() {
        assert_eq!(star_positions(16, 10.0, 9), star_positions(16, 10.0, 9));
        assert_ne!(star_positions(16, 10.0, 9), star_positions(16, 10.0, 10));
    }

    #[test]
    fn twinkle_stays_between_point_four_and_one() {
        assert!((twinkle_opacity(0.0) - 0.7).abs() < 1e-6);
        assert!((twinkle_opacity(std::f32::consts::FRAC_PI_2) - 1.0).abs() < 1e-6);
        for step in 0..100 {
            let alpha = twinkle_opacity(step as f32 * 0.37);
            assert!((0.4 - 1e-6..=1.0 + 1e-6).contains(&alpha));
        }
    }
}

//! Camera, lights, render-surface tracking and teardown.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use super::starfield::StarfieldMaterial;
use super::{Exhibit, Starfield};
use crate::camera::OrbitCamera;
use crate::mint::TransferChannel;

const FOV_DEGREES: f32 = 60.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;
const INITIAL_EYE: Vec3 = Vec3::new(2.0, 2.0, 4.0);
const SUN_POSITION: Vec3 = Vec3::new(5.0, 10.0, 7.5);

/// Camera and lights spawned by [`setup_scene`].
#[derive(Component)]
pub struct SceneFixture;

/// Size of the render surface in logical pixels.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

pub fn setup_scene(mut commands: Commands, windows: Query<&Window, With<PrimaryWindow>>) {
    let viewport = windows
        .get_single()
        .map(|window| Viewport {
            width: window.width(),
            height: window.height(),
        })
        .unwrap_or_default();
    commands.insert_resource(viewport);

    let orbit = OrbitCamera::looking_at(INITIAL_EYE, Vec3::ZERO);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            near: NEAR,
            far: FAR,
            aspect_ratio: viewport.aspect_ratio(),
        }),
        orbit.transform(),
        orbit,
        SceneFixture,
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        SceneFixture,
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });
}

pub fn viewport_resize_system(
    mut resized: EventReader<WindowResized>,
    mut viewport: ResMut<Viewport>,
    mut projections: Query<&mut Projection, With<OrbitCamera>>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    viewport.width = last.width;
    viewport.height = last.height;
    debug!("viewport resized to {}x{}", last.width, last.height);

    for mut projection in &mut projections {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = viewport.aspect_ratio();
        }
    }
}

/// Cancels in-flight transfers, despawns everything the museum spawned and
/// drops the starfield material handle.
pub fn teardown_on_exit(
    mut exits: EventReader<AppExit>,
    mut commands: Commands,
    channel: Option<ResMut<TransferChannel>>,
    spawned: Query<Entity, Or<(With<Exhibit>, With<Starfield>, With<SceneFixture>)>>,
) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(mut channel) = channel {
        channel.cancel_all();
    }
    for entity in &spawned {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<StarfieldMaterial>();
    info!("museum shut down");
}

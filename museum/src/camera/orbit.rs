//! OrbitCamera component and systems: drag to rotate/pan, wheel to zoom,
//! all with damped response.

use std::f32::consts::FRAC_PI_2;

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

const ROTATE_SPEED: f32 = 0.005;
const PAN_SPEED: f32 = 0.0015;
const ZOOM_SPEED: f32 = 0.1;
const PIXELS_PER_LINE: f32 = 16.0;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
const EPSILON: f32 = 1e-6;

/// Spherical camera rig around a target point.
///
/// Input accumulates into pending deltas; each [`OrbitCamera::advance`]
/// applies `damping` of what is pending and keeps the rest for later frames.
#[derive(Component, Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub damping: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: Vec3,
    /// Log-scale zoom; positive moves away.
    pending_zoom: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            radius: 1.0,
            yaw: 0.0,
            pitch: 0.0,
            damping: 0.05,
            min_radius: 0.05,
            max_radius: 500.0,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: Vec3::ZERO,
            pending_zoom: 0.0,
        }
    }
}

impl OrbitCamera {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let mut orbit = Self {
            target,
            ..default()
        };
        orbit.look_from(eye);
        orbit
    }

    /// Re-derives radius, yaw and pitch so that `eye()` returns `eye`.
    /// Pending motion is dropped.
    pub fn look_from(&mut self, eye: Vec3) {
        let offset = eye - self.target;
        self.radius = offset.length().clamp(self.min_radius, self.max_radius);
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / offset.length().max(EPSILON))
            .clamp(-1.0, 1.0)
            .asin()
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_pan = Vec3::ZERO;
        self.pending_zoom = 0.0;
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + self.radius * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }

    /// Queues a rotation from a pointer drag in pixels.
    pub fn rotate(&mut self, drag: Vec2) {
        self.pending_yaw -= drag.x * ROTATE_SPEED;
        self.pending_pitch += drag.y * ROTATE_SPEED;
    }

    /// Queues a pan in the camera's screen plane, scaled by distance.
    pub fn pan(&mut self, drag: Vec2) {
        let transform = self.transform();
        let right = transform.right().as_vec3();
        let up = transform.up().as_vec3();
        let scale = self.radius * PAN_SPEED;
        self.pending_pan += (-right * drag.x + up * drag.y) * scale;
    }

    /// Queues a zoom; positive `steps` zoom in.
    pub fn zoom(&mut self, steps: f32) {
        self.pending_zoom -= steps * ZOOM_SPEED;
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw.abs() < EPSILON
            && self.pending_pitch.abs() < EPSILON
            && self.pending_zoom.abs() < EPSILON
            && self.pending_pan.length_squared() < EPSILON * EPSILON
    }

    /// Applies one frame of damped motion.
    pub fn advance(&mut self) {
        let k = self.damping.clamp(0.0, 1.0);

        self.yaw += self.pending_yaw * k;
        self.pitch = (self.pitch + self.pending_pitch * k).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.radius = (self.radius * (self.pending_zoom * k).exp())
            .clamp(self.min_radius, self.max_radius);
        self.target += self.pending_pan * k;

        let keep = 1.0 - k;
        self.pending_yaw *= keep;
        self.pending_pitch *= keep;
        self.pending_zoom *= keep;
        self.pending_pan *= keep;
    }
}

pub fn orbit_camera_plugin(app: &mut App) {
    app.add_systems(Update, (orbit_input_system, orbit_update_system).chain());
}

fn orbit_input_system(
    mouse: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    mut contexts: EguiContexts,
    mut cameras: Query<&mut OrbitCamera>,
) {
    if contexts.ctx_mut().wants_pointer_input() {
        return;
    }

    let zoom_steps = match scroll.unit {
        MouseScrollUnit::Line => scroll.delta.y,
        MouseScrollUnit::Pixel => scroll.delta.y / PIXELS_PER_LINE,
    };

    for mut orbit in &mut cameras {
        if mouse.pressed(MouseButton::Left) {
            orbit.rotate(motion.delta);
        }
        if mouse.pressed(MouseButton::Right) {
            orbit.pan(motion.delta);
        }
        if zoom_steps != 0.0 {
            orbit.zoom(zoom_steps);
        }
    }
}

/// Runs every frame, independent of pending loads or transfers.
fn orbit_update_system(mut cameras: Query<(&mut OrbitCamera, &mut Transform)>) {
    for (mut orbit, mut transform) in &mut cameras {
        orbit.advance();
        *transform = orbit.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn look_from_round_trips_eye() {
        let eye = Vec3::new(2.0, 2.0, 4.0);
        let orbit = OrbitCamera::looking_at(eye, Vec3::ZERO);

        assert!(approx(orbit.eye(), eye));
        assert!((orbit.radius - eye.length()).abs() < 1e-5);
    }

    #[test]
    fn damping_applies_a_fraction_per_frame() {
        let mut orbit = OrbitCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        orbit.rotate(Vec2::new(-100.0, 0.0));
        let total = 100.0 * ROTATE_SPEED;

        orbit.advance();
        assert!((orbit.yaw - total * 0.05).abs() < 1e-6);

        orbit.advance();
        let expected = total * 0.05 + total * 0.95 * 0.05;
        assert!((orbit.yaw - expected).abs() < 1e-6);
    }

    #[test]
    fn damped_motion_converges_to_full_delta() {
        let mut orbit = OrbitCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        orbit.rotate(Vec2::new(-100.0, 0.0));

        for _ in 0..600 {
            orbit.advance();
        }

        assert!((orbit.yaw - 100.0 * ROTATE_SPEED).abs() < 1e-4);
        assert!(orbit.is_settled());
    }

    #[test]
    fn pitch_is_clamped_short_of_the_poles() {
        let mut orbit = OrbitCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        orbit.damping = 1.0;
        orbit.rotate(Vec2::new(0.0, 10_000.0));
        orbit.advance();

        assert!(orbit.pitch <= PITCH_LIMIT);
        assert!(orbit.eye().is_finite());
    }

    #[test]
    fn zoom_in_shrinks_radius_within_bounds() {
        let mut orbit = OrbitCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        orbit.damping = 1.0;
        orbit.zoom(3.0);
        orbit.advance();
        assert!(orbit.radius < 5.0);

        orbit.zoom(1_000.0);
        orbit.advance();
        assert!((orbit.radius - orbit.min_radius).abs() < 1e-6);
    }

    #[test]
    fn pan_moves_target_and_eye_together() {
        let mut orbit = OrbitCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        orbit.damping = 1.0;
        let offset_before = orbit.eye() - orbit.target;

        orbit.pan(Vec2::new(50.0, 0.0));
        orbit.advance();

        assert!(orbit.target.x < 0.0);
        assert!(approx(orbit.eye() - orbit.target, offset_before));
    }
}

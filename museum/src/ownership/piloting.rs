// Keyboard piloting of an owned exhibit, plus the distance reward.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use super::OwnershipRecord;
use crate::catalog::ModelRecord;
use crate::error::PilotError;
use crate::scene::Exhibit;

/// Distance a pilot must cover before the reward unlocks.
pub const REWARD_THRESHOLD: f32 = 25.0;

const STEP: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PilotDirection {
    Forward,
    Back,
    Left,
    Right,
}

impl PilotDirection {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::ArrowUp | KeyCode::KeyW => Some(Self::Forward),
            KeyCode::ArrowDown | KeyCode::KeyS => Some(Self::Back),
            KeyCode::ArrowLeft | KeyCode::KeyA => Some(Self::Left),
            KeyCode::ArrowRight | KeyCode::KeyD => Some(Self::Right),
            _ => None,
        }
    }

    /// Unit displacement on the horizontal plane.
    pub fn offset(self) -> Vec3 {
        match self {
            Self::Forward => Vec3::NEG_Z,
            Self::Back => Vec3::Z,
            Self::Left => Vec3::NEG_X,
            Self::Right => Vec3::X,
        }
    }
}

/// At most one piloted model. Distance is kept for the whole session and is
/// not reset by stopping.
#[derive(Resource, Debug, Default)]
pub struct PilotingState {
    target: Option<String>,
    distance_traveled: f32,
    reward_claimed: bool,
}

impl PilotingState {
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    pub fn reward_claimed(&self) -> bool {
        self.reward_claimed
    }

    pub fn reward_unlocked(&self) -> bool {
        self.distance_traveled >= REWARD_THRESHOLD
    }

    /// Starts piloting `name`. Switching from another model replaces it.
    pub fn start(&mut self, name: &str, ownership: &OwnershipRecord) -> Result<(), PilotError> {
        if !ownership.is_owned(name) {
            return Err(PilotError::NotOwned(name.to_string()));
        }
        if let Some(previous) = self.target.replace(name.to_string()) {
            if previous != name {
                info!("piloting switched from {previous} to {name}");
            }
        } else {
            info!("piloting {name}");
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(name) = self.target.take() {
            info!("stopped piloting {name}");
        }
    }

    /// Applies one key press. Returns the displacement to apply to the
    /// piloted model.
    pub fn step(&mut self, direction: PilotDirection) -> Result<Vec3, PilotError> {
        if self.target.is_none() {
            return Err(PilotError::NotPiloting);
        }
        let delta = direction.offset() * STEP;
        self.distance_traveled += delta.length();
        Ok(delta)
    }

    /// Local acknowledgment only; nothing is sent anywhere.
    pub fn claim_reward(&mut self) -> Result<(), PilotError> {
        if self.reward_claimed {
            return Err(PilotError::AlreadyClaimed);
        }
        if !self.reward_unlocked() {
            return Err(PilotError::RewardLocked {
                remaining: REWARD_THRESHOLD - self.distance_traveled,
            });
        }
        self.reward_claimed = true;
        info!("reward claimed after {:.1} units", self.distance_traveled);
        Ok(())
    }
}

pub fn pilot_movement_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut piloting: ResMut<PilotingState>,
    mut exhibits: Query<(&ModelRecord, &mut Transform), With<Exhibit>>,
) {
    let Some(target) = piloting.target().map(str::to_string) else {
        return;
    };
    if contexts.ctx_mut().wants_keyboard_input() {
        return;
    }

    for key in keys.get_just_pressed() {
        let Some(direction) = PilotDirection::from_key(*key) else {
            continue;
        };
        let Ok(delta) = piloting.step(direction) else {
            return;
        };
        for (record, mut transform) in &mut exhibits {
            if record.display_name == target {
                transform.translation += delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ownership::MemoryStore;

    fn owning(names: &[&str]) -> OwnershipRecord {
        let store = MemoryStore::with_entries(names.iter().map(|name| (*name, true)));
        OwnershipRecord::load(Box::new(store), &[])
    }

    #[test]
    fn cannot_pilot_unowned_model() {
        let mut piloting = PilotingState::default();
        let ownership = owning(&["Tachikoma"]);

        assert_eq!(
            piloting.start("Swordfish II", &ownership),
            Err(PilotError::NotOwned("Swordfish II".into()))
        );
        assert_eq!(piloting.target(), None);
    }

    #[test]
    fn switching_targets_replaces_the_pilot() {
        let mut piloting = PilotingState::default();
        let ownership = owning(&["Tachikoma", "Swordfish II"]);

        piloting.start("Tachikoma", &ownership).unwrap();
        piloting.start("Swordfish II", &ownership).unwrap();

        assert_eq!(piloting.target(), Some("Swordfish II"));
    }

    #[test]
    fn distance_only_grows_while_piloting() {
        let mut piloting = PilotingState::default();
        let ownership = owning(&["Tachikoma"]);
        assert_eq!(piloting.step(PilotDirection::Left), Err(PilotError::NotPiloting));

        piloting.start("Tachikoma", &ownership).unwrap();
        let mut last = piloting.distance_traveled();
        for direction in [
            PilotDirection::Forward,
            PilotDirection::Back,
            PilotDirection::Left,
            PilotDirection::Right,
        ] {
            piloting.step(direction).unwrap();
            assert!(piloting.distance_traveled() > last);
            last = piloting.distance_traveled();
        }
        assert_eq!(last, 4.0);

        piloting.stop();
        assert_eq!(piloting.distance_traveled(), 4.0);
    }

    #[test]
    fn reward_unlocks_at_threshold_and_claims_once() {
        let mut piloting = PilotingState::default();
        piloting.start("Tachikoma", &owning(&["Tachikoma"])).unwrap();
        for _ in 0..24 {
            piloting.step(PilotDirection::Right).unwrap();
        }
        assert_eq!(
            piloting.claim_reward(),
            Err(PilotError::RewardLocked { remaining: 1.0 })
        );

        piloting.step(PilotDirection::Right).unwrap();
        assert_eq!(piloting.claim_reward(), Ok(()));
        assert_eq!(piloting.claim_reward(), Err(PilotError::AlreadyClaimed));
    }

    #[test]
    fn keys_map_to_horizontal_unit_steps() {
        assert_eq!(PilotDirection::from_key(KeyCode::KeyW), Some(PilotDirection::Forward));
        assert_eq!(PilotDirection::from_key(KeyCode::ArrowDown), Some(PilotDirection::Back));
        assert_eq!(PilotDirection::from_key(KeyCode::Space), None);
        for direction in [PilotDirection::Forward, PilotDirection::Right] {
            let offset = direction.offset();
            assert_eq!(offset.y, 0.0);
            assert_eq!(offset.length(), 1.0);
        }
    }
}

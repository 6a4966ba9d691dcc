//! Game polish/juice effects - screen shake on explosions.

use bevy::prelude::*;
use rand::Rng;

use super::bomb::BombExploded;
use crate::{PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<ScreenShake>();
    app.add_systems(
        Update,
        (trigger_shake_on_explosions, apply_screen_shake)
            .chain()
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
    app.add_systems(OnExit(Screen::Gameplay), reset_screen_shake);
}

/// Resource tracking screen shake state.
#[derive(Resource, Default)]
pub struct ScreenShake {
    /// Current trauma level (0.0 to 1.0).
    pub trauma: f32,
    /// Base position to return to.
    pub base_position: Vec3,
}

impl ScreenShake {
    /// Add trauma, saturating at 1.
    pub fn add_trauma(&mut self, amount: f32) {
        self.trauma = (self.trauma + amount).min(1.0);
    }

    /// Offset scale for the current trauma (trauma squared feels more natural).
    pub fn shake_amount(&self) -> f32 {
        self.trauma * self.trauma
    }

    pub fn decay(&mut self, seconds: f32) {
        self.trauma = (self.trauma - TRAUMA_DECAY * seconds).max(0.0);
    }
}

/// Maximum shake offset in pixels.
const MAX_SHAKE_OFFSET: f32 = 8.0;
/// How fast trauma decays per second.
const TRAUMA_DECAY: f32 = 2.5;
/// Trauma from one explosion, plus a bit per crate it breaks.
const EXPLOSION_TRAUMA: f32 = 0.45;
const CRATE_TRAUMA: f32 = 0.1;

fn trigger_shake_on_explosions(
    mut shake: ResMut<ScreenShake>,
    mut explosions: MessageReader<BombExploded>,
) {
    for event in explosions.read() {
        shake.add_trauma(EXPLOSION_TRAUMA + CRATE_TRAUMA * event.blast.crates.len() as f32);
        debug!("Screen shake from explosion, trauma={}", shake.trauma);
    }
}

/// Apply screen shake to camera.
fn apply_screen_shake(
    time: Res<Time>,
    mut shake: ResMut<ScreenShake>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    if shake.trauma > 0.0 {
        let mut rng = rand::rng();
        let shake_amount = shake.shake_amount();

        let offset_x = rng.random_range(-1.0..1.0) * MAX_SHAKE_OFFSET * shake_amount;
        let offset_y = rng.random_range(-1.0..1.0) * MAX_SHAKE_OFFSET * shake_amount;

        camera_transform.translation.x = shake.base_position.x + offset_x;
        camera_transform.translation.y = shake.base_position.y + offset_y;

        shake.decay(time.delta_secs());
    } else {
        camera_transform.translation.x = shake.base_position.x;
        camera_transform.translation.y = shake.base_position.y;
    }
}

fn reset_screen_shake(
    mut shake: ResMut<ScreenShake>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
) {
    shake.trauma = 0.0;
    if let Ok(mut camera_transform) = camera_query.single_mut() {
        camera_transform.translation.x = shake.base_position.x;
        camera_transform.translation.y = shake.base_position.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trauma_saturates_and_decays() {
        let mut shake = ScreenShake::default();
        shake.add_trauma(0.8);
        shake.add_trauma(0.8);
        assert_eq!(shake.trauma, 1.0);
        assert_eq!(shake.shake_amount(), 1.0);

        shake.decay(0.2);
        assert!((shake.trauma - 0.5).abs() < 1e-6);
        shake.decay(1.0);
        assert_eq!(shake.trauma, 0.0);
    }
}

use glam::Vec3;
use serde::Serialize;

/// Character position, velocity and ground contact. Owned by the locomotion
/// integrator; cameras only ever receive a copy of `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MovementState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
}

impl MovementState {
    pub fn at(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            grounded: false,
        }
    }

    pub fn horizontal_speed(&self) -> f32 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z).length()
    }
}

use glam::{Vec2, Vec3};
use tracing::trace;

use crate::config::ControllerConfig;
use crate::model::{CollisionProvider, MovementState};

/// Per-tick character integration: friction, gravity, intent displacement,
/// whole-step collision revert and ground snapping.
#[derive(Debug, Clone)]
pub struct LocomotionIntegrator {
    pub move_speed: f32,
    pub friction: f32,
    pub gravity: f32,
    pub player_height: f32,
    pub jump_impulse: f32,
    pub snap_epsilon: f32,
}

/// Yaw-only movement basis taken from the active camera.
#[derive(Debug, Clone, Copy)]
pub struct MoveBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub jumped: bool,
    pub reverted: bool,
    pub snapped: bool,
}

impl LocomotionIntegrator {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            friction: config.friction,
            gravity: config.gravity,
            player_height: config.player_height,
            jump_impulse: config.jump_impulse,
            snap_epsilon: config.ground_snap_epsilon,
        }
    }

    /// Only a grounded character can jump.
    pub fn jump(&self, state: &mut MovementState) -> bool {
        if !state.grounded {
            return false;
        }
        state.velocity.y = self.jump_impulse;
        state.grounded = false;
        true
    }

    /// Advance one tick. `intent` is the normalized (x = right, y = forward) direction.
    pub fn step<C: CollisionProvider + ?Sized>(
        &self,
        state: &mut MovementState,
        basis: MoveBasis,
        intent: Vec2,
        jump: bool,
        world: &C,
        dt: f32,
    ) -> StepReport {
        let mut report = StepReport {
            jumped: jump && self.jump(state),
            ..StepReport::default()
        };
        let old_pos = state.position;

        // Friction (horizontal only)
        let decay = (self.friction * dt).min(1.0);
        state.velocity.x -= state.velocity.x * decay;
        state.velocity.z -= state.velocity.z * decay;

        // Gravity
        state.velocity.y -= self.gravity * dt;

        let walk = basis.forward * (intent.y * self.move_speed * dt)
            + basis.right * (intent.x * self.move_speed * dt);
        // horizontal velocity only decays; walking is pure displacement
        let proposed = old_pos + walk + Vec3::new(0.0, state.velocity.y * dt, 0.0);

        // Whole-step revert: no sliding, no partial resolution.
        if world.overlaps(proposed) {
            state.position = old_pos;
            state.velocity.y = 0.0;
            report.reverted = true;
            trace!(?proposed, "collision, step reverted");
        } else {
            state.position = proposed;
        }

        // a rising character is never snapped, or a short tick would eat the jump
        let rising = state.velocity.y > 0.0;
        if let Some(hit) = world.raycast_down(state.position).filter(|_| !rising) {
            let rest_y = hit.point.y + self.player_height;
            if state.position.y <= rest_y + self.snap_epsilon {
                state.position.y = rest_y;
                state.velocity.y = 0.0;
                state.grounded = true;
                report.snapped = true;
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Aabb, Collider, ColliderKind, CollisionWorld};

    const DT: f32 = 1.0 / 60.0;

    fn integrator(gravity: f32) -> LocomotionIntegrator {
        LocomotionIntegrator::new(&ControllerConfig {
            gravity,
            ..ControllerConfig::default()
        })
    }

    fn basis() -> MoveBasis {
        MoveBasis {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
        }
    }

    fn empty_world() -> CollisionWorld {
        CollisionWorld::new(Vec3::new(0.3, 0.8, 0.3))
    }

    fn floor_world(top: f32) -> CollisionWorld {
        let mut w = empty_world();
        w.insert(
            ColliderKind::Walkable,
            Collider::cuboid("floor", Aabb::new(Vec3::new(-100.0, top - 1.0, -100.0), Vec3::new(100.0, top, 100.0))),
        );
        w
    }

    #[test]
    fn friction_decays_horizontal_speed() {
        let loco = integrator(0.0);
        let world = empty_world();
        let mut state = MovementState::at(Vec3::ZERO);
        state.velocity = Vec3::new(3.0, 0.0, -4.0);
        let before = state.horizontal_speed();
        loco.step(&mut state, basis(), Vec2::ZERO, false, &world, DT);
        let expected = before * (1.0 - 10.0 * DT);
        assert!((state.horizontal_speed() - expected).abs() < 1e-4);

        let mut last = state.velocity.length();
        for _ in 0..120 {
            loco.step(&mut state, basis(), Vec2::ZERO, false, &world, DT);
            let now = state.velocity.length();
            assert!(now <= last);
            last = now;
        }
        assert!(last < 1e-3);
    }

    #[test]
    fn friction_never_reverses_velocity() {
        let loco = integrator(0.0);
        let mut state = MovementState::at(Vec3::ZERO);
        state.velocity = Vec3::new(5.0, 0.0, 0.0);
        loco.step(&mut state, basis(), Vec2::ZERO, false, &empty_world(), 0.5);
        assert_eq!(state.velocity.x, 0.0);
    }

    #[test]
    fn horizontal_velocity_does_not_move_position() {
        let loco = integrator(0.0);
        let mut state = MovementState::at(Vec3::ZERO);
        state.velocity = Vec3::new(5.0, 0.0, -2.0);
        loco.step(&mut state, basis(), Vec2::ZERO, false, &empty_world(), 0.05);
        assert_eq!(state.position, Vec3::ZERO);
        assert!(state.velocity.x > 0.0 && state.velocity.x < 5.0);
    }

    #[test]
    fn intent_moves_along_basis_at_speed() {
        let loco = integrator(0.0);
        let mut state = MovementState::at(Vec3::new(1.0, 2.0, 3.0));
        loco.step(&mut state, basis(), Vec2::new(0.0, 1.0), false, &empty_world(), 0.1);
        assert!((state.position - Vec3::new(1.0, 2.0, 2.0)).length() < 1e-5);
        loco.step(&mut state, basis(), Vec2::new(-1.0, 0.0), false, &empty_world(), 0.1);
        assert!((state.position - Vec3::new(0.0, 2.0, 2.0)).length() < 1e-5);
        assert_eq!(state.velocity, Vec3::ZERO);
    }

    #[test]
    fn overlap_reverts_whole_step() {
        let loco = integrator(30.0);
        let mut world = empty_world();
        world.insert(
            ColliderKind::Blocking,
            Collider::cuboid("wall", Aabb::new(Vec3::new(-5.0, 0.0, -2.0), Vec3::new(5.0, 5.0, -0.35))),
        );
        let start = Vec3::new(0.0, 2.0, 0.0);
        let mut state = MovementState::at(start);
        state.velocity.y = -3.0;
        let report = loco.step(&mut state, basis(), Vec2::new(0.0, 1.0), false, &world, 0.1);
        assert!(report.reverted);
        assert_eq!(state.position, start);
        assert_eq!(state.velocity.y, 0.0);
    }

    #[test]
    fn resting_on_floor_is_stable() {
        let loco = integrator(0.0);
        let world = floor_world(0.0);
        let rest = Vec3::new(4.0, 2.8, -7.0);
        let mut state = MovementState::at(rest);
        state.grounded = true;
        for _ in 0..10 {
            let report = loco.step(&mut state, basis(), Vec2::ZERO, false, &world, DT);
            assert!(report.snapped);
        }
        assert_eq!(state.position, rest);
        assert!(state.grounded);
    }

    #[test]
    fn falling_character_lands_and_can_jump() {
        let loco = integrator(30.0);
        let world = floor_world(1.0);
        let mut state = MovementState::at(Vec3::new(0.0, 10.0, 0.0));
        for _ in 0..120 {
            loco.step(&mut state, basis(), Vec2::ZERO, false, &world, DT);
        }
        assert!(state.grounded);
        assert!((state.position.y - 3.8).abs() < 1e-5);
        assert_eq!(state.velocity.y, 0.0);

        let report = loco.step(&mut state, basis(), Vec2::ZERO, true, &world, DT);
        assert!(report.jumped);
        assert!(!state.grounded);
        assert!(state.position.y > 3.8);
        assert!(state.velocity.y > 0.0);

        // no double jump mid-air
        let report = loco.step(&mut state, basis(), Vec2::ZERO, true, &world, DT);
        assert!(!report.jumped);
    }

    #[test]
    fn jump_survives_short_ticks() {
        let loco = integrator(30.0);
        let world = floor_world(0.0);
        for dt in [1.0 / 240.0, 0.0] {
            let mut state = MovementState::at(Vec3::new(0.0, 2.8, 0.0));
            state.grounded = true;
            let report = loco.step(&mut state, basis(), Vec2::ZERO, true, &world, dt);
            assert!(report.jumped);
            assert!(!report.snapped);
            assert!(!state.grounded);
            assert!(state.velocity.y > 0.0);

            loco.step(&mut state, basis(), Vec2::ZERO, false, &world, 1.0 / 240.0);
            assert!(state.position.y > 2.8);
            assert!(!state.grounded);
        }
    }

    #[test]
    fn snap_within_epsilon_above() {
        let loco = integrator(0.0);
        let world = floor_world(0.0);
        let mut state = MovementState::at(Vec3::new(0.0, 2.84, 0.0));
        loco.step(&mut state, basis(), Vec2::ZERO, false, &world, DT);
        assert_eq!(state.position.y, 2.8);
        assert!(state.grounded);

        let mut state = MovementState::at(Vec3::new(0.0, 3.5, 0.0));
        loco.step(&mut state, basis(), Vec2::ZERO, false, &world, DT);
        assert_eq!(state.position.y, 3.5);
        assert!(!state.grounded);
    }

    #[test]
    fn grounded_persists_without_surface() {
        let loco = integrator(30.0);
        let mut state = MovementState::at(Vec3::new(0.0, 50.0, 0.0));
        state.grounded = true;
        loco.step(&mut state, basis(), Vec2::ZERO, false, &empty_world(), DT);
        assert!(state.grounded);
        assert!(state.position.y < 50.0);
    }

    #[test]
    fn zero_gravity_floats() {
        let loco = integrator(0.0);
        let mut state = MovementState::at(Vec3::new(0.0, 50.0, 0.0));
        for _ in 0..60 {
            loco.step(&mut state, basis(), Vec2::ZERO, false, &empty_world(), DT);
        }
        assert_eq!(state.position, Vec3::new(0.0, 50.0, 0.0));
    }
}

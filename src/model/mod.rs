// MODEL: controller state and static scene data
pub mod camera;
pub mod collision;
pub mod movement;
pub mod shot;

pub use camera::{Camera, CameraPose, CameraUniform};
pub use collision::{Aabb, Collider, ColliderKind, CollisionProvider, CollisionWorld, RayHit};
pub use movement::MovementState;
pub use shot::{CinematicShot, Euler};

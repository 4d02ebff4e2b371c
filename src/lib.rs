pub mod assets;
pub mod config;
pub mod logging;

// MVC-style split: plain data in `model`, behaviour in `controller`
pub mod controller;
pub mod model;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use assets::{AssetDescriptor, AssetError, AssetRole, AssetSource, FsAssetSource, LoadReport, LoadedAsset, MeshData};
pub use config::{ConfigError, ControllerConfig, KeyBindings, SceneManifest};
pub use controller::{CameraMode, ControllerState, FrameOutput, HostRequest, InputEvent, OverlaySignal};
pub use model::{Aabb, Camera, CameraPose, CinematicShot, Collider, ColliderKind, CollisionWorld, Euler, MovementState};

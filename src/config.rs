//! Tunables, key bindings and the scene manifest.
//!
//! Everything scene-specific (spawn pose, shot list, which meshes block and
//! which are walkable) arrives as JSON so that one controller serves every level.

use std::f32::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::AssetDescriptor;
use crate::model::{CinematicShot, Euler};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed scene manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scene manifest: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Walking speed in units per second.
    pub move_speed: f32,
    /// Horizontal velocity decay rate per second.
    pub friction: f32,
    /// 0 gives the floating variant.
    pub gravity: f32,
    /// Eye height above the walkable surface.
    pub player_height: f32,
    pub jump_impulse: f32,
    pub ground_snap_epsilon: f32,
    pub character_half_extents: Vec3,
    /// Radians per smoothed pointer unit.
    pub look_sensitivity: f32,
    pub pitch_limit: f32,
    pub max_pointer_delta: f32,
    /// Exponential smoothing factor in (0, 1]; 1 disables smoothing.
    pub pointer_smoothing: f32,
    /// Upper bound on a single tick's Δt in seconds.
    pub max_frame_dt: f32,
    /// Fade-out length before a cinematic cut.
    pub cinematic_fade_ms: f64,
    /// Fade-out length before the first switch to first person.
    pub entry_fade_ms: f64,
    pub fade_in_ms: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            friction: 10.0,
            gravity: 0.0,
            player_height: 2.8,
            jump_impulse: 10.0,
            ground_snap_epsilon: 0.05,
            character_half_extents: Vec3::new(0.3, 0.8, 0.3),
            look_sensitivity: 0.002,
            pitch_limit: FRAC_PI_2,
            max_pointer_delta: 50.0,
            pointer_smoothing: 0.4,
            max_frame_dt: 0.1,
            cinematic_fade_ms: 2500.0,
            entry_fade_ms: 1000.0,
            fade_in_ms: 1000.0,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("move_speed", self.move_speed),
            ("player_height", self.player_height),
            ("look_sensitivity", self.look_sensitivity),
            ("max_pointer_delta", self.max_pointer_delta),
            ("max_frame_dt", self.max_frame_dt),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be finite and > 0")));
            }
        }
        let non_negative = [
            ("friction", self.friction),
            ("gravity", self.gravity),
            ("jump_impulse", self.jump_impulse),
            ("ground_snap_epsilon", self.ground_snap_epsilon),
            ("pitch_limit", self.pitch_limit),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be finite and >= 0")));
            }
        }
        if !(self.pointer_smoothing > 0.0 && self.pointer_smoothing <= 1.0) {
            return Err(ConfigError::Invalid("pointer_smoothing must be in (0, 1]".into()));
        }
        if !self.character_half_extents.is_finite() || self.character_half_extents.min_element() < 0.0 {
            return Err(ConfigError::Invalid("character_half_extents must be finite and >= 0".into()));
        }
        for (name, value) in [
            ("cinematic_fade_ms", self.cinematic_fade_ms),
            ("entry_fade_ms", self.entry_fade_ms),
            ("fade_in_ms", self.fade_in_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be finite and >= 0")));
            }
        }
        Ok(())
    }
}

/// DOM `KeyboardEvent.code` names. Arrow keys always work as alternates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub jump: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "KeyW".to_string(),
            backward: "KeyS".to_string(),
            left: "KeyA".to_string(),
            right: "KeyD".to_string(),
            jump: "Space".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneManifest {
    pub spawn: Vec3,
    #[serde(default)]
    pub spawn_rotation: Euler,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub bindings: KeyBindings,
    #[serde(default)]
    pub shots: Vec<CinematicShot>,
    #[serde(default)]
    pub assets: Vec<AssetDescriptor>,
}

impl Default for SceneManifest {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(100.0, 79.0, 100.0),
            spawn_rotation: Euler::default(),
            controller: ControllerConfig::default(),
            bindings: KeyBindings::default(),
            shots: Vec::new(),
            assets: Vec::new(),
        }
    }
}

impl SceneManifest {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let manifest: Self = serde_json::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::from_json(&text)?;
        // asset paths are relative to the manifest
        if let Some(dir) = path.parent() {
            for asset in &mut manifest.assets {
                if Path::new(&asset.path).is_relative() {
                    asset.path = dir.join(&asset.path).to_string_lossy().into_owned();
                }
            }
        }
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.spawn.is_finite() || !self.spawn_rotation.is_finite() {
            return Err(ConfigError::Invalid("spawn pose must be finite".into()));
        }
        self.controller.validate()?;
        for (i, shot) in self.shots.iter().enumerate() {
            if !shot.position.is_finite() || !shot.rotation.is_finite() {
                return Err(ConfigError::Invalid(format!("shot {i} pose must be finite")));
            }
            let durations = [shot.hold_ms, shot.transition_ms, shot.fade_lead_ms];
            if durations.iter().any(|d| !d.is_finite() || *d < 0.0) {
                return Err(ConfigError::Invalid(format!("shot {i} durations must be finite and >= 0")));
            }
            if shot.fade && shot.fade_lead_ms > shot.hold_ms {
                return Err(ConfigError::Invalid(format!("shot {i} fade lead exceeds its hold")));
            }
        }
        for asset in &self.assets {
            if asset.path.trim().is_empty() {
                return Err(ConfigError::Invalid("asset path must not be empty".into()));
            }
        }
        Ok(())
    }
}

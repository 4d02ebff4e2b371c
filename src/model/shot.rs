use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera orientation in radians, applied in YXZ order (yaw, then pitch, then roll).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    /// Pitch
    pub x: f32,
    /// Yaw
    pub y: f32,
    /// Roll
    pub z: f32,
}

impl Euler {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Per-axis linear interpolation. Angles are not wrapped, so shot data
    /// decides which way the camera turns.
    pub fn lerp(self, other: Euler, t: f32) -> Euler {
        Euler {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One fixed cinematic pose with its timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CinematicShot {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Euler,
    pub hold_ms: f64,
    /// Duration of the move *into* this shot from the previous one.
    #[serde(default)]
    pub transition_ms: f64,
    #[serde(default)]
    pub fade: bool,
    #[serde(default)]
    pub fade_lead_ms: f64,
    #[serde(skip)]
    pub fade_triggered: bool,
}

impl CinematicShot {
    pub fn new(position: Vec3, rotation: Euler, hold_ms: f64, transition_ms: f64) -> Self {
        Self {
            position,
            rotation,
            hold_ms,
            transition_ms,
            fade: false,
            fade_lead_ms: 0.0,
            fade_triggered: false,
        }
    }

    /// Cross-fade through black, starting `lead_ms` before the hold ends.
    pub fn with_fade(mut self, lead_ms: f64) -> Self {
        self.fade = true;
        self.fade_lead_ms = lead_ms;
        self
    }

    /// Elapsed hold time at which the fade-out starts.
    pub fn fade_start_ms(&self) -> f64 {
        (self.hold_ms - self.fade_lead_ms).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euler_lerp_is_per_axis() {
        let a = Euler::new(0.0, 1.0, -2.0);
        let b = Euler::new(1.0, 3.0, 2.0);
        assert_eq!(a.lerp(b, 0.5), Euler::new(0.5, 2.0, 0.0));
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn shot_deserializes_with_defaults() {
        let shot: CinematicShot = serde_json::from_str(
            r#"{ "position": [1.0, 2.0, 3.0], "hold_ms": 4000 }"#,
        )
        .unwrap();
        assert_eq!(shot.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(shot.rotation, Euler::default());
        assert!(!shot.fade);
        assert!(!shot.fade_triggered);
        assert_eq!(shot.transition_ms, 0.0);
    }

    #[test]
    fn fade_start_never_negative() {
        let shot = CinematicShot::new(Vec3::ZERO, Euler::default(), 1000.0, 0.0).with_fade(1500.0);
        assert_eq!(shot.fade_start_ms(), 0.0);
    }
}

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::Serialize;

use super::Euler;

/// The render camera. Whichever driver is active (cinematic or first person)
/// writes its pose here once per tick.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub rotation: Euler,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

/// Position + orientation handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Euler,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye, w unused
    pub eye: [f32; 4],
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::ZERO,
            rotation: Euler::default(),
            fov_y: 75f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.rotation.y
    }

    pub fn pitch(&self) -> f32 {
        self.rotation.x
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z)
    }

    /// View direction; yaw 0 / pitch 0 looks down -Z.
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// Horizontal forward from yaw alone, so looking up or down never changes walking speed.
    pub fn flat_forward(&self) -> Vec3 {
        let yaw = self.yaw();
        Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
    }

    pub fn flat_right(&self) -> Vec3 {
        self.flat_forward().cross(Vec3::Y)
    }

    /// Mouse look: dx turns, dy tilts; pitch is clamped to `±pitch_limit`.
    pub fn apply_look(&mut self, dx: f32, dy: f32, sensitivity: f32, pitch_limit: f32) {
        self.rotation.y -= dx * sensitivity;
        self.rotation.x = (self.rotation.x - dy * sensitivity).clamp(-pitch_limit, pitch_limit);
    }

    pub fn set_pose(&mut self, pose: CameraPose) {
        self.eye = pose.position;
        self.rotation = pose.rotation;
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.eye,
            rotation: self.rotation,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::from_rotation_translation(self.orientation(), self.eye).inverse();
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            eye: [self.eye.x, self.eye.y, self.eye.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let cam = Camera::new(800, 600);
        assert!(close(cam.forward(), Vec3::NEG_Z));
        assert!(close(cam.flat_forward(), Vec3::NEG_Z));
        assert!(close(cam.flat_right(), Vec3::X));
    }

    #[test]
    fn flat_basis_ignores_pitch() {
        let mut cam = Camera::new(800, 600);
        cam.rotation = Euler::new(1.2, 0.7, 0.0);
        let flat = cam.flat_forward();
        assert_eq!(flat.y, 0.0);
        assert!((flat.length() - 1.0).abs() < 1e-6);
        let full = cam.forward();
        let projected = Vec3::new(full.x, 0.0, full.z).normalize();
        assert!(close(flat, projected));
    }

    #[test]
    fn look_clamps_pitch() {
        let mut cam = Camera::new(800, 600);
        cam.apply_look(0.0, -10_000.0, 0.002, FRAC_PI_2);
        assert_eq!(cam.pitch(), FRAC_PI_2);
        cam.apply_look(100.0, 0.0, 0.002, FRAC_PI_2);
        assert!((cam.yaw() + 0.2).abs() < 1e-6);
    }

    #[test]
    fn uniform_carries_eye() {
        let mut cam = Camera::new(1280, 720);
        cam.eye = Vec3::new(1.0, 2.0, 3.0);
        let u = cam.uniform();
        assert_eq!(u.eye, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(bytemuck::bytes_of(&u).len(), 80);
    }
}

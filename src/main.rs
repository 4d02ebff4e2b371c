use std::process::ExitCode;

use tracing::{error, info};
use winit::event::{DeviceEvent, ElementState};
use winit::keyboard::KeyCode;

use walkthrough::assets::{load_scene_assets, FsAssetSource};
use walkthrough::controller::input::native;
use walkthrough::controller::{CameraMode, ControllerState};
use walkthrough::{logging, SceneManifest};

const DEFAULT_SCENE: &str = "demos/hotel/scene.json";
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Headless scripted run: watch the cinematic, press start, walk forward
/// while turning, and log where the camera ends up.
struct Script {
    state: ControllerState,
    now_ms: f64,
}

impl Script {
    fn frames(&mut self, count: u32) {
        for _ in 0..count {
            self.now_ms += FRAME_MS;
            let out = self.state.tick(self.now_ms);
            for signal in &out.overlay {
                info!(t = self.now_ms, ?signal, "overlay");
            }
            for request in &out.requests {
                info!(t = self.now_ms, ?request, "host request");
                // no real pointer lock here; grant it immediately
                self.state.on_pointer_lock_changed(true);
            }
        }
        let out = self.state.tick(self.now_ms);
        info!(
            t = self.now_ms,
            mode = ?out.mode,
            pos = ?out.pose.position,
            yaw = out.pose.rotation.y,
            pitch = out.pose.rotation.x,
            grounded = out.movement.grounded,
            "camera"
        );
    }

    fn key(&mut self, code: KeyCode, state: ElementState) {
        if let Some(event) = native::key_to_input(code, state) {
            self.state.process_event(&event);
        }
    }

    fn mouse(&mut self, dx: f64, dy: f64) {
        let motion = DeviceEvent::MouseMotion { delta: (dx, dy) };
        if let Some(event) = native::device_event_to_input(&motion) {
            self.state.process_event(&event);
        }
    }
}

fn main() -> ExitCode {
    logging::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_SCENE.to_string());
    let manifest = match SceneManifest::load(&path) {
        Ok(manifest) => manifest,
        Err(err) => {
            error!(%path, %err, "cannot load scene");
            return ExitCode::FAILURE;
        }
    };
    info!(%path, shots = manifest.shots.len(), assets = manifest.assets.len(), "scene loaded");

    let mut state = ControllerState::new(&manifest, 1280, 720);
    let report = pollster::block_on(load_scene_assets(&FsAssetSource, &manifest.assets, state.collision_mut()));
    info!(loaded = report.loaded, failed = report.failed, colliders = report.colliders, "assets");

    let mut script = Script { state, now_ms: 0.0 };

    // one full pass over the shot list
    let cycle_ms: f64 = manifest.shots.iter().map(|s| s.hold_ms + s.transition_ms).sum();
    script.frames((cycle_ms / FRAME_MS).ceil() as u32 + 1);

    script.state.trigger_start();
    let entry_frames = (manifest.controller.entry_fade_ms / FRAME_MS).ceil() as u32 + 1;
    script.frames(entry_frames);
    if script.state.mode() != CameraMode::FirstPerson {
        error!("did not reach first person");
        return ExitCode::FAILURE;
    }

    script.key(KeyCode::KeyW, ElementState::Pressed);
    script.frames(120);

    for _ in 0..30 {
        script.mouse(-20.0, 0.0);
    }
    script.frames(120);

    script.key(KeyCode::Space, ElementState::Pressed);
    script.frames(30);
    script.key(KeyCode::Space, ElementState::Released);
    script.key(KeyCode::KeyW, ElementState::Released);
    script.frames(60);

    ExitCode::SUCCESS
}

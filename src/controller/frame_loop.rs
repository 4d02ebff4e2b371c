use serde::Serialize;
use tracing::{debug, trace};

use super::camera_mode::{CameraMode, CameraModeController, StartOutcome};
use super::cinematic::CinematicSequencer;
use super::input::{InputAggregator, InputEvent};
use super::locomotion::{LocomotionIntegrator, MoveBasis, StepReport};
use super::overlay::{HostRequest, Outbox, OverlaySignal};
use super::schedule::{ScheduledAction, ScheduledEvent, Scheduler};
use crate::assets::{self, AssetDescriptor, LoadedAsset};
use crate::config::{ControllerConfig, SceneManifest};
use crate::model::{Camera, CameraPose, CameraUniform, CollisionWorld, MovementState};

/// Everything the renderer and overlay need after one tick.
#[derive(Debug, Clone, Serialize)]
pub struct FrameOutput {
    pub now_ms: f64,
    pub dt: f32,
    pub mode: CameraMode,
    pub pose: CameraPose,
    #[serde(skip)]
    pub uniform: CameraUniform,
    pub movement: MovementState,
    pub overlay: Vec<OverlaySignal>,
    pub requests: Vec<HostRequest>,
}

/// All controller state, owned by the host's frame loop and advanced by `tick`.
/// Input and asset completions are applied between ticks on the same thread.
pub struct ControllerState {
    config: ControllerConfig,
    input: InputAggregator,
    movement: MovementState,
    locomotion: LocomotionIntegrator,
    collision: CollisionWorld,
    cinematic: CinematicSequencer,
    mode: CameraModeController,
    scheduler: Scheduler,
    player_camera: Camera,
    cinematic_camera: Camera,
    outbox: Outbox,
    last_tick_ms: Option<f64>,
    now_ms: f64,
    last_step: StepReport,
}

impl ControllerState {
    pub fn new(manifest: &SceneManifest, width: u32, height: u32) -> Self {
        let config = manifest.controller.clone();

        let mut player_camera = Camera::new(width, height);
        player_camera.eye = manifest.spawn;
        player_camera.rotation = manifest.spawn_rotation;

        let mut cinematic_camera = Camera::new(width, height);
        match manifest.shots.first() {
            Some(shot) => {
                cinematic_camera.eye = shot.position;
                cinematic_camera.rotation = shot.rotation;
            }
            None => cinematic_camera.set_pose(player_camera.pose()),
        }

        Self {
            input: InputAggregator::new(manifest.bindings.clone(), &config),
            movement: MovementState::at(manifest.spawn),
            locomotion: LocomotionIntegrator::new(&config),
            collision: CollisionWorld::new(config.character_half_extents),
            cinematic: CinematicSequencer::new(manifest.shots.clone(), config.cinematic_fade_ms, config.fade_in_ms),
            mode: CameraModeController::new(config.entry_fade_ms, config.fade_in_ms),
            scheduler: Scheduler::new(),
            player_camera,
            cinematic_camera,
            outbox: Outbox::default(),
            last_tick_ms: None,
            now_ms: 0.0,
            last_step: StepReport::default(),
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn mode(&self) -> CameraMode {
        self.mode.mode()
    }

    pub fn movement(&self) -> &MovementState {
        &self.movement
    }

    pub fn movement_mut(&mut self) -> &mut MovementState {
        &mut self.movement
    }

    pub fn input(&self) -> &InputAggregator {
        &self.input
    }

    pub fn collision(&self) -> &CollisionWorld {
        &self.collision
    }

    pub fn collision_mut(&mut self) -> &mut CollisionWorld {
        &mut self.collision
    }

    pub fn cinematic(&self) -> &CinematicSequencer {
        &self.cinematic
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn last_step(&self) -> StepReport {
        self.last_step
    }

    pub fn active_camera(&self) -> &Camera {
        match self.mode.mode() {
            CameraMode::Cinematic => &self.cinematic_camera,
            CameraMode::FirstPerson => &self.player_camera,
        }
    }

    // Host ingestion points

    pub fn process_event(&mut self, event: &InputEvent) {
        self.input.process_event(event);
    }

    pub fn on_key_down(&mut self, code: &str) {
        self.input.on_key_down(code);
    }

    pub fn on_key_up(&mut self, code: &str) {
        self.input.on_key_up(code);
    }

    pub fn on_pointer_move(&mut self, dx: f32, dy: f32) {
        self.input.on_pointer_move(dx, dy);
    }

    pub fn on_pointer_lock_changed(&mut self, locked: bool) {
        self.input.set_pointer_captured(locked);
    }

    pub fn on_focus_lost(&mut self) {
        self.input.clear_keys();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.player_camera.set_aspect(width, height);
        self.cinematic_camera.set_aspect(width, height);
    }

    /// Leave the cinematic. Takes effect relative to the last tick's clock.
    pub fn trigger_start(&mut self) -> StartOutcome {
        let outcome = self.mode.trigger_start(self.now_ms, &mut self.scheduler, &mut self.outbox);
        if outcome == StartOutcome::Immediate {
            self.engage_pointer();
        }
        outcome
    }

    /// Completion handler for one streamed asset.
    pub fn register_asset(&mut self, descriptor: &AssetDescriptor, asset: &LoadedAsset) -> usize {
        assets::register_asset(&mut self.collision, descriptor, asset)
    }

    fn engage_pointer(&mut self) {
        self.input.set_pointer_captured(true);
        self.outbox.request(HostRequest::CapturePointer);
    }

    fn fire(&mut self, event: ScheduledEvent, now_ms: f64) {
        debug!(action = ?event.action, at = event.fire_at_ms, "timer fired");
        match event.action {
            ScheduledAction::BeginShotTransition => {
                if self.mode.mode() == CameraMode::Cinematic {
                    self.cinematic.begin_transition(now_ms);
                }
            }
            ScheduledAction::EnterFirstPerson => {
                if self.mode.complete_entry(&mut self.outbox) {
                    self.player_camera.eye = self.movement.position;
                    self.scheduler.cancel_action(ScheduledAction::BeginShotTransition);
                    self.engage_pointer();
                }
            }
        }
    }

    /// Advance one frame. Order: timers, input, integration, collision,
    /// ground snap, pose publication.
    pub fn tick(&mut self, now_ms: f64) -> FrameOutput {
        let dt = match self.last_tick_ms {
            Some(last) => ((now_ms - last) / 1000.0).clamp(0.0, self.config.max_frame_dt as f64) as f32,
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);
        self.now_ms = now_ms;

        for event in self.scheduler.drain_due(now_ms) {
            self.fire(event, now_ms);
        }

        match self.mode.mode() {
            CameraMode::Cinematic => {
                // player input has no effect behind the cinematic
                self.input.take_jump();
                self.input.consume_look();
                // frozen behind the entry fade: a shot commit would fade the picture back in
                if self.mode.is_entry_pending() {
                    trace!("cinematic held for first-person entry");
                } else if let Some(pose) = self.cinematic.tick(now_ms, &mut self.scheduler, &mut self.outbox) {
                    self.cinematic_camera.set_pose(pose);
                }
            }
            CameraMode::FirstPerson => {
                let look = self.input.consume_look();
                self.player_camera.apply_look(
                    look.x,
                    look.y,
                    self.config.look_sensitivity,
                    self.config.pitch_limit,
                );
                let basis = MoveBasis {
                    forward: self.player_camera.flat_forward(),
                    right: self.player_camera.flat_right(),
                };
                let intent = self.input.normalized_intent();
                let jump = self.input.take_jump();
                self.last_step = self.locomotion.step(
                    &mut self.movement,
                    basis,
                    intent,
                    jump,
                    &self.collision,
                    dt,
                );
                self.player_camera.eye = self.movement.position;
                trace!(pos = ?self.movement.position, grounded = self.movement.grounded, "player step");
            }
        }

        let camera = self.active_camera();
        let pose = camera.pose();
        let uniform = camera.uniform();
        let Outbox { overlay, requests } = self.outbox.take();
        FrameOutput {
            now_ms,
            dt,
            mode: self.mode.mode(),
            pose,
            uniform,
            movement: self.movement,
            overlay,
            requests,
        }
    }
}

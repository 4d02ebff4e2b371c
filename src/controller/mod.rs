// CONTROLLER: input, locomotion, camera sequencing and the per-tick loop
pub mod camera_mode;
pub mod cinematic;
pub mod frame_loop;
pub mod input;
pub mod locomotion;
pub mod overlay;
pub mod schedule;

pub use camera_mode::{CameraMode, CameraModeController, StartOutcome};
pub use cinematic::CinematicSequencer;
pub use frame_loop::{ControllerState, FrameOutput};
pub use input::{InputAggregator, InputEvent, InputIntent, MoveKey, PointerSmoothing};
pub use locomotion::{LocomotionIntegrator, MoveBasis, StepReport};
pub use overlay::{HostRequest, Outbox, OverlaySignal};
pub use schedule::{ScheduledAction, ScheduledEvent, Scheduler, TimerId};

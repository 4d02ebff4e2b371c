use tracing::debug;

use super::overlay::Outbox;
use super::schedule::{ScheduledAction, Scheduler};
use crate::model::{CameraPose, CinematicShot};

/// Loops a fixed list of shots forever: hold each pose, then either cut via a
/// fade through black or glide linearly into the next one.
#[derive(Debug, Clone)]
pub struct CinematicSequencer {
    shots: Vec<CinematicShot>,
    current: usize,
    shot_start_ms: f64,
    transitioning: bool,
    started: bool,
    fade_ms: f64,
    fade_in_ms: f64,
}

impl CinematicSequencer {
    pub fn new(shots: Vec<CinematicShot>, fade_ms: f64, fade_in_ms: f64) -> Self {
        Self {
            shots,
            current: 0,
            shot_start_ms: 0.0,
            transitioning: false,
            started: false,
            fade_ms,
            fade_in_ms,
        }
    }

    pub fn shots(&self) -> &[CinematicShot] {
        &self.shots
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    fn next_index(&self) -> usize {
        (self.current + 1) % self.shots.len()
    }

    fn shot_pose(shot: &CinematicShot) -> CameraPose {
        CameraPose {
            position: shot.position,
            rotation: shot.rotation,
        }
    }

    /// Start gliding toward the next shot. Ignored while already moving.
    pub fn begin_transition(&mut self, now_ms: f64) {
        if self.shots.is_empty() || self.transitioning {
            return;
        }
        self.transitioning = true;
        self.shot_start_ms = now_ms;
        debug!(from = self.current, to = self.next_index(), "shot transition started");
    }

    /// Pose for this tick, or `None` when there are no shots.
    pub fn tick(&mut self, now_ms: f64, scheduler: &mut Scheduler, outbox: &mut Outbox) -> Option<CameraPose> {
        if self.shots.is_empty() {
            return None;
        }
        if !self.started {
            self.started = true;
            self.shot_start_ms = now_ms;
        }
        let elapsed = now_ms - self.shot_start_ms;

        if self.transitioning {
            let next = self.next_index();
            let from = &self.shots[self.current];
            let to = &self.shots[next];
            let t = if to.transition_ms <= 0.0 {
                1.0
            } else {
                (elapsed / to.transition_ms).min(1.0)
            };
            let pose = CameraPose {
                position: from.position.lerp(to.position, t as f32),
                rotation: from.rotation.lerp(to.rotation, t as f32),
            };
            if t >= 1.0 {
                self.current = next;
                self.shots[next].fade_triggered = false;
                self.transitioning = false;
                self.shot_start_ms = now_ms;
                outbox.fade_in(self.fade_in_ms);
                debug!(shot = next, "shot committed");
                return Some(Self::shot_pose(&self.shots[next]));
            }
            return Some(pose);
        }

        let shot = &mut self.shots[self.current];
        let pose = Self::shot_pose(shot);
        if shot.fade {
            if !shot.fade_triggered && elapsed >= shot.fade_start_ms() {
                shot.fade_triggered = true;
                outbox.fade_out(self.fade_ms);
                scheduler.schedule(now_ms + self.fade_ms, ScheduledAction::BeginShotTransition);
                debug!(shot = self.current, "fade-out before cut");
            }
        } else if elapsed >= shot.hold_ms {
            self.begin_transition(now_ms);
        }
        Some(pose)
    }
}

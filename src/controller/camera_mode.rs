use serde::Serialize;
use tracing::{debug, info};

use super::overlay::Outbox;
use super::schedule::{ScheduledAction, Scheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    Cinematic,
    FirstPerson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    NotStarted,
    /// Fade-out running, switch scheduled.
    Pending,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// First activation: fading out, first person follows after the delay.
    Fading,
    /// A start is already in flight.
    Ignored,
    /// Already in first person: re-engage immediately.
    Immediate,
}

/// One-way switch from the cinematic camera to the player camera.
#[derive(Debug, Clone)]
pub struct CameraModeController {
    mode: CameraMode,
    entry: Entry,
    entry_fade_ms: f64,
    fade_in_ms: f64,
}

impl CameraModeController {
    pub fn new(entry_fade_ms: f64, fade_in_ms: f64) -> Self {
        Self {
            mode: CameraMode::Cinematic,
            entry: Entry::NotStarted,
            entry_fade_ms,
            fade_in_ms,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_entry_pending(&self) -> bool {
        self.entry == Entry::Pending
    }

    pub fn trigger_start(&mut self, now_ms: f64, scheduler: &mut Scheduler, outbox: &mut Outbox) -> StartOutcome {
        match self.entry {
            Entry::NotStarted => {
                self.entry = Entry::Pending;
                outbox.fade_out(self.entry_fade_ms);
                scheduler.schedule(now_ms + self.entry_fade_ms, ScheduledAction::EnterFirstPerson);
                info!(delay_ms = self.entry_fade_ms, "start triggered, fading to first person");
                StartOutcome::Fading
            }
            Entry::Pending => {
                debug!("start already pending");
                StartOutcome::Ignored
            }
            Entry::Done => StartOutcome::Immediate,
        }
    }

    /// The scheduled entry fired. Returns false if there was nothing to complete.
    pub fn complete_entry(&mut self, outbox: &mut Outbox) -> bool {
        if self.entry != Entry::Pending {
            return false;
        }
        self.entry = Entry::Done;
        self.mode = CameraMode::FirstPerson;
        outbox.fade_in(self.fade_in_ms);
        info!("camera mode: first person");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::overlay::OverlaySignal;

    #[test]
    fn first_start_fades_and_schedules() {
        let mut ctl = CameraModeController::new(1000.0, 800.0);
        let (mut s, mut o) = (Scheduler::new(), Outbox::default());
        assert_eq!(ctl.trigger_start(50.0, &mut s, &mut o), StartOutcome::Fading);
        assert_eq!(ctl.mode(), CameraMode::Cinematic);
        assert_eq!(o.take().overlay, vec![OverlaySignal::FadeOut { duration_ms: 1000.0 }]);
        assert_eq!(s.next_fire_at(), Some(1050.0));

        assert_eq!(ctl.trigger_start(60.0, &mut s, &mut o), StartOutcome::Ignored);
        assert_eq!(s.len(), 1);

        assert!(ctl.complete_entry(&mut o));
        assert_eq!(ctl.mode(), CameraMode::FirstPerson);
        assert_eq!(o.take().overlay, vec![OverlaySignal::FadeIn { duration_ms: 800.0 }]);
    }

    #[test]
    fn later_starts_are_immediate() {
        let mut ctl = CameraModeController::new(1000.0, 800.0);
        let (mut s, mut o) = (Scheduler::new(), Outbox::default());
        ctl.trigger_start(0.0, &mut s, &mut o);
        assert_eq!(s.drain_due(1000.0).len(), 1);
        ctl.complete_entry(&mut o);
        o.take();
        assert_eq!(ctl.trigger_start(5000.0, &mut s, &mut o), StartOutcome::Immediate);
        assert!(o.overlay.is_empty());
        assert!(s.is_empty());
        assert!(!ctl.complete_entry(&mut o));
        assert_eq!(ctl.mode(), CameraMode::FirstPerson);
    }
}

/// Time-ordered queue of deferred state changes, polled once per tick on the
/// simulation thread. Nothing here sleeps or spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Fade-out finished: start moving to the next cinematic shot.
    BeginShotTransition,
    /// Entry fade finished: hand the camera to the player.
    EnterFirstPerson,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    pub id: TimerId,
    pub fire_at_ms: f64,
    pub action: ScheduledAction,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Sorted by fire time; equal times keep scheduling order.
    events: Vec<ScheduledEvent>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, fire_at_ms: f64, action: ScheduledAction) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let at = self.events.partition_point(|e| e.fire_at_ms <= fire_at_ms);
        self.events.insert(at, ScheduledEvent { id, fire_at_ms, action });
        id
    }

    /// Cancel every pending event carrying `action`; returns how many were dropped.
    pub fn cancel_action(&mut self, action: ScheduledAction) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.action != action);
        before - self.events.len()
    }

    /// Remove and return everything due at `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<ScheduledEvent> {
        let due = self.events.partition_point(|e| e.fire_at_ms <= now_ms);
        self.events.drain(..due).collect()
    }

    pub fn is_pending(&self, action: ScheduledAction) -> bool {
        self.events.iter().any(|e| e.action == action)
    }

    pub fn next_fire_at(&self) -> Option<f64> {
        self.events.first().map(|e| e.fire_at_ms)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ScheduledAction::*;

    #[test]
    fn drains_in_time_then_insertion_order() {
        let mut s = Scheduler::new();
        let late = s.schedule(300.0, EnterFirstPerson);
        let a = s.schedule(100.0, BeginShotTransition);
        let b = s.schedule(100.0, EnterFirstPerson);
        assert_eq!(s.next_fire_at(), Some(100.0));

        assert!(s.drain_due(99.9).is_empty());
        let due: Vec<_> = s.drain_due(250.0).into_iter().map(|e| e.id).collect();
        assert_eq!(due, vec![a, b]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.drain_due(1e9)[0].id, late);
        assert!(s.is_empty());
    }

    #[test]
    fn cancelled_events_never_fire() {
        let mut s = Scheduler::new();
        s.schedule(10.0, BeginShotTransition);
        s.schedule(15.0, BeginShotTransition);
        s.schedule(20.0, EnterFirstPerson);
        assert_eq!(s.cancel_action(BeginShotTransition), 2);
        assert_eq!(s.cancel_action(BeginShotTransition), 0);
        assert!(!s.is_pending(BeginShotTransition));
        assert_eq!(s.cancel_action(EnterFirstPerson), 1);
        assert!(s.drain_due(100.0).is_empty());
    }
}

use serde::Serialize;

/// Fade instructions for the UI overlay. The overlay reports nothing back;
/// the core schedules its own follow-up after `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlaySignal {
    FadeOut { duration_ms: f64 },
    FadeIn { duration_ms: f64 },
}

/// Things only the host can do, e.g. the browser pointer-lock API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostRequest {
    CapturePointer,
}

/// Signals raised during one tick, drained into the frame output.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    pub overlay: Vec<OverlaySignal>,
    pub requests: Vec<HostRequest>,
}

impl Outbox {
    pub fn fade_out(&mut self, duration_ms: f64) {
        self.overlay.push(OverlaySignal::FadeOut { duration_ms });
    }

    pub fn fade_in(&mut self, duration_ms: f64) {
        self.overlay.push(OverlaySignal::FadeIn { duration_ms });
    }

    pub fn request(&mut self, request: HostRequest) {
        self.requests.push(request);
    }

    pub fn take(&mut self) -> Outbox {
        std::mem::take(self)
    }
}

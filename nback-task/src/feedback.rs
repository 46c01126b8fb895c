use nback_timing::elapsed_ms;

/// Short-lived render override (the white flash after a press).
/// Purely a display concern: it never gates trial progression, only
/// what color the strip shows until the duration elapses.
#[derive(Debug, Clone)]
pub struct FeedbackOverlay {
    active: bool,
    started_ms: u32,
    duration_ms: u32,
}

impl FeedbackOverlay {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            active: false,
            started_ms: 0,
            duration_ms,
        }
    }

    pub fn set_duration(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
    }

    /// Unconditionally (re)start the flash.
    pub fn start(&mut self, now_ms: u32) {
        self.active = true;
        self.started_ms = now_ms;
    }

    /// Once-per-loop duration check; deactivates after the window.
    pub fn tick(&mut self, now_ms: u32) {
        if self.active && elapsed_ms(now_ms, self.started_ms) > self.duration_ms {
            self.active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }
}

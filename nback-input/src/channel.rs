use nback_timing::elapsed_ms;

pub const DEFAULT_DEBOUNCE_MS: u32 = 20;

/// Edge detector with a debounce window, polled once per loop
/// iteration with the channel's derived boolean state.
///
/// The debounce clock tracks the most recent raw transition, not the
/// most recent reported edge: rapid chatter keeps restarting the
/// window, which can delay acceptance of a press under electrically
/// noisy input. That matches the deployed firmware and is kept for
/// parity with recorded study data.
#[derive(Debug, Clone)]
pub struct DebouncedChannel {
    last_state: bool,
    last_transition_ms: u32,
    debounce_ms: u32,
}

impl DebouncedChannel {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            last_state: false,
            last_transition_ms: 0,
            debounce_ms,
        }
    }

    /// Reports `true` at most once per physical activation: only on an
    /// inactive-to-active transition observed after the debounce
    /// window has elapsed since the last raw transition.
    pub fn poll(&mut self, raw_active: bool, now_ms: u32) -> bool {
        if elapsed_ms(now_ms, self.last_transition_ms) > self.debounce_ms
            && raw_active
            && !self.last_state
        {
            self.last_transition_ms = now_ms;
            self.last_state = raw_active;
            return true;
        }

        if raw_active != self.last_state {
            self.last_transition_ms = now_ms;
            self.last_state = raw_active;
        }

        false
    }

    pub fn last_state(&self) -> bool {
        self.last_state
    }

    /// Forget any in-flight transition; used when switching input modes.
    pub fn reset(&mut self) {
        self.last_state = false;
        self.last_transition_ms = 0;
    }
}

impl Default for DebouncedChannel {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

use crate::channel::DebouncedChannel;
use crate::probe::Probe;

pub const CHANNEL_CONFIRM: usize = 0;
pub const CHANNEL_WRONG: usize = 1;

struct ChannelSlot {
    probe: Box<dyn Probe>,
    debounce: DebouncedChannel,
    /// Undebounced state, tracked for input-forwarding mode.
    last_raw: bool,
}

/// The two physical response channels behind one polling surface.
/// Probes are swapped wholesale when the host switches between button
/// and capacitive input; debounce state is reset only then.
pub struct InputRig {
    slots: [ChannelSlot; 2],
}

impl InputRig {
    pub fn new(confirm: Box<dyn Probe>, wrong: Box<dyn Probe>, debounce_ms: u32) -> Self {
        Self {
            slots: [
                ChannelSlot {
                    probe: confirm,
                    debounce: DebouncedChannel::new(debounce_ms),
                    last_raw: false,
                },
                ChannelSlot {
                    probe: wrong,
                    debounce: DebouncedChannel::new(debounce_ms),
                    last_raw: false,
                },
            ],
        }
    }

    /// Debounced activation edge for one channel. An out-of-range
    /// channel index reads as "no edge" rather than panicking.
    pub fn just_activated(&mut self, channel: usize, now_ms: u32) -> bool {
        match self.slots.get_mut(channel) {
            Some(slot) => {
                let raw = slot.probe.is_active();
                slot.last_raw = raw;
                slot.debounce.poll(raw, now_ms)
            }
            None => false,
        }
    }

    /// Raw press edge with no debounce filtering, for input-forwarding
    /// mode. Release edges are deliberately not reported.
    pub fn raw_press_edge(&mut self, channel: usize) -> bool {
        match self.slots.get_mut(channel) {
            Some(slot) => {
                let raw = slot.probe.is_active();
                let edge = raw && !slot.last_raw;
                slot.last_raw = raw;
                edge
            }
            None => false,
        }
    }

    /// Replace both probes (input-mode switch) and clear all channel
    /// state so stale transitions cannot leak across modes.
    pub fn set_probes(&mut self, confirm: Box<dyn Probe>, wrong: Box<dyn Probe>) {
        self.slots[CHANNEL_CONFIRM].probe = confirm;
        self.slots[CHANNEL_WRONG].probe = wrong;
        for slot in &mut self.slots {
            slot.debounce.reset();
            slot.last_raw = false;
        }
    }

    /// Clear transition state without touching the probes, used when
    /// entering or leaving forwarding mode.
    pub fn reset_edges(&mut self) {
        for slot in &mut self.slots {
            slot.debounce.reset();
            slot.last_raw = false;
        }
    }
}

pub mod calibrate;
pub mod channel;
pub mod probe;
pub mod rig;

pub use calibrate::TouchStats;
pub use channel::{DebouncedChannel, DEFAULT_DEBOUNCE_MS};
pub use probe::{ActiveLowButton, LineReader, Probe, TouchPad, TouchReader};
pub use rig::{InputRig, CHANNEL_CONFIRM, CHANNEL_WRONG};

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// One finalized trial, handed to the data collector by value once the
/// response window closes. All timestamps are milliseconds relative to
/// session start; `response_ms` and `reaction_ms` are 0 when no
/// response was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// 1-based position in the stimulus sequence.
    pub stimulus_number: u32,
    pub color: Color,
    pub is_target: bool,
    pub response_made: bool,
    /// True when the response came from the confirm channel.
    pub response_is_confirm: bool,
    pub is_correct: bool,
    pub onset_ms: u32,
    pub response_ms: u32,
    pub reaction_ms: u32,
    pub end_ms: u32,
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_STIMULUS_MS: u32 = 100;
pub const MIN_INTERVAL_MS: u32 = 100;
pub const MIN_TRIALS: usize = 5;
pub const MAX_TRIALS: usize = 50;

/// When the response window closes. The deployed firmware revisions
/// disagree; the policy is an explicit per-session setting rather
/// than a silent merge of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPolicy {
    /// The window stays open until a response arrives (latest
    /// dual-channel firmware).
    ResponseOnly,
    /// The window also closes once `stimulus_duration_ms` elapses
    /// (early single-button firmware).
    ResponseOrTimeout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub stimulus_duration_ms: u32,
    pub inter_stimulus_interval_ms: u32,
    pub feedback_duration_ms: u32,
    pub debug_color_duration_ms: u32,
    pub n_back_level: usize,
    pub trial_count: usize,
    pub study_id: String,
    pub session_number: u16,
    pub window_policy: WindowPolicy,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            stimulus_duration_ms: 2_000,
            inter_stimulus_interval_ms: 2_000,
            feedback_duration_ms: 100,
            debug_color_duration_ms: 1_000,
            n_back_level: 1,
            trial_count: 30,
            study_id: "DEFAULT".to_owned(),
            session_number: 0,
            window_policy: WindowPolicy::ResponseOnly,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("stimulus duration {0} ms is below the {MIN_STIMULUS_MS} ms minimum")]
    StimulusTooShort(u32),
    #[error("inter-stimulus interval {0} ms is below the {MIN_INTERVAL_MS} ms minimum")]
    IntervalTooShort(u32),
    #[error("n-back level must be at least 1")]
    LevelTooLow,
    #[error("trial count {0} outside the {MIN_TRIALS}-{MAX_TRIALS} range")]
    TrialCountOutOfRange(usize),
    #[error("study id must not be empty")]
    EmptyStudyId,
    #[error("cannot reconfigure while a session is running or paused")]
    SessionActive,
}

impl TaskConfig {
    /// Validate-then-apply: callers apply the configuration only when
    /// this passes, leaving the previous one intact otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stimulus_duration_ms < MIN_STIMULUS_MS {
            return Err(ConfigError::StimulusTooShort(self.stimulus_duration_ms));
        }
        if self.inter_stimulus_interval_ms < MIN_INTERVAL_MS {
            return Err(ConfigError::IntervalTooShort(
                self.inter_stimulus_interval_ms,
            ));
        }
        if self.n_back_level < 1 {
            return Err(ConfigError::LevelTooLow);
        }
        if self.trial_count < MIN_TRIALS || self.trial_count > MAX_TRIALS {
            return Err(ConfigError::TrialCountOutOfRange(self.trial_count));
        }
        if self.study_id.is_empty() {
            return Err(ConfigError::EmptyStudyId);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(TaskConfig::default().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let base = TaskConfig::default();

        let mut config = base.clone();
        config.stimulus_duration_ms = 99;
        assert_eq!(config.validate(), Err(ConfigError::StimulusTooShort(99)));

        let mut config = base.clone();
        config.inter_stimulus_interval_ms = 50;
        assert_eq!(config.validate(), Err(ConfigError::IntervalTooShort(50)));

        let mut config = base.clone();
        config.n_back_level = 0;
        assert_eq!(config.validate(), Err(ConfigError::LevelTooLow));

        let mut config = base.clone();
        config.trial_count = 4;
        assert_eq!(config.validate(), Err(ConfigError::TrialCountOutOfRange(4)));

        let mut config = base.clone();
        config.trial_count = 51;
        assert_eq!(
            config.validate(),
            Err(ConfigError::TrialCountOutOfRange(51))
        );

        let mut config = base;
        config.study_id.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyStudyId));
    }
}

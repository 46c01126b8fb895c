use nback_core::Outcome;
use serde::Serialize;

/// Session-scoped signal-detection counters, mutated exactly once per
/// completed trial.
///
/// The reaction-time accumulator counts every trial with a response,
/// whatever its outcome; the reported average is therefore over all
/// responses, not hits only (the dual-channel firmware's convention).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metrics {
    correct_responses: u32,
    false_alarms: u32,
    missed_targets: u32,
    total_reaction_ms: u64,
    reaction_count: u32,
}

/// Side-effect-free read of the aggregate, computed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub total_targets: u32,
    pub correct_responses: u32,
    pub false_alarms: u32,
    pub missed_targets: u32,
    /// Percent of targets answered with a confirm press; 0 when the
    /// session had no targets.
    pub hit_rate: f32,
    /// Mean reaction time over all responses; 0 without responses.
    pub average_reaction_ms: f32,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn record(&mut self, outcome: Outcome, reaction_ms: Option<u32>) {
        if let Some(rt) = reaction_ms {
            self.total_reaction_ms += u64::from(rt);
            self.reaction_count += 1;
        }
        match outcome {
            Outcome::Hit => self.correct_responses += 1,
            Outcome::Miss => self.missed_targets += 1,
            Outcome::FalseAlarm => self.false_alarms += 1,
            Outcome::CorrectRejection => {}
        }
    }

    pub fn summarize(&self) -> Summary {
        let total_targets = self.correct_responses + self.missed_targets;
        let hit_rate = if total_targets > 0 {
            self.correct_responses as f32 / total_targets as f32 * 100.0
        } else {
            0.0
        };
        let average_reaction_ms = if self.reaction_count > 0 {
            self.total_reaction_ms as f32 / self.reaction_count as f32
        } else {
            0.0
        };
        Summary {
            total_targets,
            correct_responses: self.correct_responses,
            false_alarms: self.false_alarms,
            missed_targets: self.missed_targets,
            hit_rate,
            average_reaction_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_follow_the_outcome_table() {
        let mut metrics = Metrics::new();
        metrics.record(Outcome::Hit, Some(420));
        metrics.record(Outcome::Miss, None);
        metrics.record(Outcome::Miss, Some(380)); // wrong press on a target
        metrics.record(Outcome::FalseAlarm, Some(300));
        metrics.record(Outcome::CorrectRejection, Some(340)); // wrong press on a non-target
        metrics.record(Outcome::CorrectRejection, None);

        let summary = metrics.summarize();
        assert_eq!(summary.correct_responses, 1);
        assert_eq!(summary.missed_targets, 2);
        assert_eq!(summary.false_alarms, 1);
        assert_eq!(summary.total_targets, 3);
        // All four responses feed the average: (420+380+300+340)/4.
        assert!((summary.average_reaction_ms - 360.0).abs() < f32::EPSILON);
        assert!((summary.hit_rate - 100.0 / 3.0).abs() < 1e-3);
    }

    #[test]
    fn reset_zeroes_the_summary() {
        let mut metrics = Metrics::new();
        metrics.record(Outcome::Hit, Some(500));
        metrics.record(Outcome::FalseAlarm, Some(250));
        metrics.reset();

        let summary = metrics.summarize();
        assert_eq!(summary.hit_rate, 0.0);
        assert_eq!(summary.average_reaction_ms, 0.0);
        assert_eq!(summary.correct_responses, 0);
        assert_eq!(summary.false_alarms, 0);
        assert_eq!(summary.missed_targets, 0);
    }

    #[test]
    fn empty_denominators_read_as_zero() {
        let mut metrics = Metrics::new();
        metrics.record(Outcome::CorrectRejection, None);
        let summary = metrics.summarize();
        assert_eq!(summary.hit_rate, 0.0);
        assert_eq!(summary.average_reaction_ms, 0.0);
    }
}

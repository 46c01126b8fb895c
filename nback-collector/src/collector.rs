use std::io::{self, Write};

use nback_core::TrialRecord;
use nback_timing::elapsed_ms;

use crate::wire;

/// Upper bound on buffered trials, matching the session trial-count
/// ceiling accepted by `config`.
pub const MAX_DATA_ROWS: usize = 50;

/// Session-scoped sink for finalized trials. Owns the buffered records
/// until the host retrieves them with `get_data`; the state machine
/// hands records over by value and keeps nothing.
#[derive(Debug, Clone)]
pub struct DataCollector {
    study_id: String,
    session_number: u16,
    session_start_ms: u32,
    trials: Vec<TrialRecord>,
}

impl DataCollector {
    pub fn new() -> Self {
        Self {
            study_id: String::new(),
            session_number: 0,
            session_start_ms: 0,
            trials: Vec::new(),
        }
    }

    /// Open a session: stamp the start time and drop any records left
    /// over from an abandoned run.
    pub fn begin(&mut self, study_id: &str, session_number: u16, now_ms: u32) {
        self.study_id = study_id.to_owned();
        self.session_number = session_number;
        self.session_start_ms = now_ms;
        self.trials.clear();
    }

    pub fn reset(&mut self) {
        self.trials.clear();
    }

    /// Buffer one finalized trial. Silently drops records past the
    /// buffer bound; `config` validation keeps sessions within it.
    pub fn record(&mut self, trial: TrialRecord) {
        if self.trials.len() < MAX_DATA_ROWS {
            self.trials.push(trial);
        }
    }

    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn trials(&self) -> &[TrialRecord] {
        &self.trials
    }

    pub fn session_start_ms(&self) -> u32 {
        self.session_start_ms
    }

    pub fn study_id(&self) -> &str {
        &self.study_id
    }

    pub fn session_number(&self) -> u16 {
        self.session_number
    }

    /// Emit the immediate `write>` record for one completed trial.
    pub fn send_trial_event<W: Write>(&self, w: &mut W, trial: &TrialRecord) -> io::Result<()> {
        wire::write_realtime_trial(w, &self.study_id, self.session_number, trial)
    }

    /// Emit a `write>` lifecycle breadcrumb (`start`, `pause`, …)
    /// stamped with the session-relative time.
    pub fn send_timestamped_event<W: Write>(
        &self,
        w: &mut W,
        now_ms: u32,
        event: &str,
        detail: Option<&str>,
    ) -> io::Result<()> {
        let session_ms = elapsed_ms(now_ms, self.session_start_ms);
        wire::write_realtime_event(w, &self.study_id, self.session_number, session_ms, event, detail)
    }

    /// The buffered end-of-session dump: trial section then session
    /// summary section, each `$$$`-delimited.
    pub fn send_data<W: Write>(&self, w: &mut W, now_ms: u32) -> io::Result<()> {
        if self.trials.is_empty() {
            writeln!(w, "No data to send")?;
            return Ok(());
        }

        writeln!(w, "Opening Data Socket")?;
        writeln!(w, "{}", wire::TRIAL_FORMAT_HEADER)?;
        writeln!(w, "{}", wire::SECTION_DELIMITER)?;
        for trial in &self.trials {
            writeln!(
                w,
                "{}",
                wire::trial_row(&self.study_id, self.session_number, trial)
            )?;
        }
        writeln!(w, "{}", wire::SECTION_DELIMITER)?;

        writeln!(w, "{}", wire::SESSION_FORMAT_HEADER)?;
        writeln!(w, "{}", wire::SECTION_DELIMITER)?;
        let duration = elapsed_ms(now_ms, self.session_start_ms);
        writeln!(
            w,
            "{},{},{},{},{},{},{}",
            self.study_id,
            self.session_number,
            self.session_start_ms,
            wire::format_timestamp(self.session_start_ms),
            wire::format_timestamp(now_ms),
            wire::format_timestamp(duration),
            self.trials.len(),
        )?;
        writeln!(w, "{}", wire::SECTION_DELIMITER)?;
        writeln!(w, "Closing Data Socket")?;
        Ok(())
    }
}

impl Default for DataCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nback_core::Color;

    fn sample_trial(number: u32) -> TrialRecord {
        TrialRecord {
            stimulus_number: number,
            color: Color::Red,
            is_target: false,
            response_made: false,
            response_is_confirm: false,
            is_correct: true,
            onset_ms: number * 1_000,
            response_ms: 0,
            reaction_ms: 0,
            end_ms: number * 1_000 + 500,
        }
    }

    #[test]
    fn begin_clears_previous_session() {
        let mut collector = DataCollector::new();
        collector.begin("A", 1, 0);
        collector.record(sample_trial(1));
        collector.begin("B", 2, 10_000);
        assert!(collector.is_empty());
        assert_eq!(collector.study_id(), "B");
        assert_eq!(collector.session_start_ms(), 10_000);
    }

    #[test]
    fn record_stops_at_the_buffer_bound() {
        let mut collector = DataCollector::new();
        collector.begin("T1", 1, 0);
        for i in 0..(MAX_DATA_ROWS as u32 + 10) {
            collector.record(sample_trial(i + 1));
        }
        assert_eq!(collector.trial_count(), MAX_DATA_ROWS);
    }

    #[test]
    fn dump_has_two_delimited_sections() {
        let mut collector = DataCollector::new();
        collector.begin("T1", 3, 1_000);
        collector.record(sample_trial(1));
        collector.record(sample_trial(2));

        let mut out = Vec::new();
        collector.send_data(&mut out, 31_000).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Opening Data Socket");
        assert_eq!(
            lines.iter().filter(|l| **l == wire::SECTION_DELIMITER).count(),
            4
        );
        assert_eq!(*lines.last().unwrap(), "Closing Data Socket");
        // Session summary: start raw ms, duration 30 s, 2 trials.
        assert!(text.contains("T1,3,1000,00:00:01:000,00:00:31:000,00:00:30:000,2"));
    }

    #[test]
    fn empty_dump_reports_no_data() {
        let collector = DataCollector::new();
        let mut out = Vec::new();
        collector.send_data(&mut out, 0).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No data to send\n");
    }
}

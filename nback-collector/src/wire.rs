//! Text protocol shared with the host-side study scripts. Field order
//! and the `$$$` section delimiters are a wire contract; changing them
//! breaks the analysis pipeline.

use std::io::{self, Write};

use nback_core::TrialRecord;

pub const SECTION_DELIMITER: &str = "$$$";

pub const TRIAL_FORMAT_HEADER: &str = "Format=study_id,session_number,timestamp,task_type,event_type,\
stimulus_number,stimulus_color,is_target,response_made,is_correct,stimulus_onset_time,response_time,reaction_time,stimulus_end_time";

pub const SESSION_FORMAT_HEADER: &str = "Format=study_id,session_number,start_time_millis,start_time,completion_time,total_duration,total_trials";

pub const TASK_TYPE: &str = "n-back";

/// Prefix marking a record the host should append to file immediately
/// instead of waiting for the buffered end-of-session dump.
pub const REALTIME_PREFIX: &str = "write>";

/// Render milliseconds as `HH:MM:SS:mmm`. Reaction times stay raw
/// milliseconds; everything else on the wire uses this form.
pub fn format_timestamp(ms: u32) -> String {
    let total_seconds = ms / 1000;
    format!(
        "{:02}:{:02}:{:02}:{:03}",
        total_seconds / 3600,
        (total_seconds / 60) % 60,
        total_seconds % 60,
        ms % 1000
    )
}

/// One CSV trial row, without the leading prefix or trailing newline.
pub fn trial_row(study_id: &str, session_number: u16, trial: &TrialRecord) -> String {
    format!(
        "{},{},{},{},trial_complete,{},{},{},{},{},{},{},{},{}",
        study_id,
        session_number,
        format_timestamp(trial.end_ms),
        TASK_TYPE,
        trial.stimulus_number,
        trial.color.name(),
        trial.is_target,
        trial.response_made,
        trial.is_correct,
        format_timestamp(trial.onset_ms),
        format_timestamp(trial.response_ms),
        trial.reaction_ms,
        format_timestamp(trial.end_ms),
    )
}

pub fn write_realtime_trial<W: Write>(
    w: &mut W,
    study_id: &str,
    session_number: u16,
    trial: &TrialRecord,
) -> io::Result<()> {
    writeln!(
        w,
        "{}{}",
        REALTIME_PREFIX,
        trial_row(study_id, session_number, trial)
    )
}

pub fn write_realtime_event<W: Write>(
    w: &mut W,
    study_id: &str,
    session_number: u16,
    session_ms: u32,
    event: &str,
    detail: Option<&str>,
) -> io::Result<()> {
    write!(
        w,
        "{}{},{},{},{},{}",
        REALTIME_PREFIX,
        study_id,
        session_number,
        format_timestamp(session_ms),
        TASK_TYPE,
        event
    )?;
    if let Some(detail) = detail {
        write!(w, ",{detail}")?;
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nback_core::Color;

    #[test]
    fn timestamps_render_as_hh_mm_ss_mmm() {
        assert_eq!(format_timestamp(0), "00:00:00:000");
        assert_eq!(format_timestamp(61_005), "00:01:01:005");
        assert_eq!(format_timestamp(3_600_000 + 123), "01:00:00:123");
    }

    #[test]
    fn trial_row_field_order() {
        let trial = TrialRecord {
            stimulus_number: 3,
            color: Color::Blue,
            is_target: true,
            response_made: true,
            response_is_confirm: true,
            is_correct: true,
            onset_ms: 4_000,
            response_ms: 4_350,
            reaction_ms: 350,
            end_ms: 4_350,
        };
        assert_eq!(
            trial_row("T1", 2, &trial),
            "T1,2,00:00:04:350,n-back,trial_complete,3,blue,true,true,true,00:00:04:000,00:00:04:350,350,00:00:04:350"
        );
    }

    #[test]
    fn realtime_event_carries_the_write_prefix() {
        let mut out = Vec::new();
        write_realtime_event(&mut out, "T1", 1, 1_500, "pause", None).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "write>T1,1,00:00:01:500,n-back,pause\n"
        );
    }
}

use anyhow::{anyhow, bail, Result};
use nback_core::{Color, Polarity};

/// One line from the host, parsed. Command words are case-insensitive;
/// `config` arguments keep their serial comma syntax:
///
/// `config <stim>,<isi>,<n>,<trials>,<studyId>,<session>[,%red,green,…%]`
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Configure {
        stimulus_duration_ms: u32,
        inter_stimulus_interval_ms: u32,
        n_back_level: usize,
        trial_count: usize,
        study_id: String,
        session_number: u16,
        sequence: Option<Vec<Color>>,
    },
    Start,
    Pause,
    Debug,
    ExitDebug,
    Exit,
    GetData,
    /// `input_mode 1` forwards raw press edges to the host;
    /// `input_mode 0` returns to normal operation.
    InputMode(bool),
    Sync,
    /// Host-side stand-in for a physical press on one channel.
    Press(Polarity),
}

pub fn parse(line: &str) -> Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "config" => parse_config(rest),
        "start" => Ok(Command::Start),
        "pause" => Ok(Command::Pause),
        "debug" => Ok(Command::Debug),
        "exit-debug" => Ok(Command::ExitDebug),
        "exit" => Ok(Command::Exit),
        "get_data" => Ok(Command::GetData),
        "input_mode" => match rest {
            "0" => Ok(Command::InputMode(false)),
            "1" => Ok(Command::InputMode(true)),
            other => bail!("input_mode takes 0 or 1, got {other:?}"),
        },
        "sync" => Ok(Command::Sync),
        "press" => match rest.to_ascii_lowercase().as_str() {
            "confirm" | "c" => Ok(Command::Press(Polarity::Confirm)),
            "wrong" | "w" => Ok(Command::Press(Polarity::Wrong)),
            other => bail!("press takes confirm or wrong, got {other:?}"),
        },
        other => bail!("unrecognized command {other:?}"),
    }
}

fn parse_config(args: &str) -> Result<Command> {
    // Split off the optional %…% color list before the comma split,
    // since the list itself is comma-separated.
    let (plain, sequence) = match args.find('%') {
        Some(open) => {
            let close = args
                .rfind('%')
                .filter(|&c| c > open)
                .ok_or_else(|| anyhow!("unterminated color sequence"))?;
            let colors = parse_sequence(&args[open + 1..close])?;
            (args[..open].trim_end_matches([',', ' ']), Some(colors))
        }
        None => (args, None),
    };

    let fields: Vec<&str> = plain.split(',').map(str::trim).collect();
    if fields.len() != 6 {
        bail!("config takes 6 comma-separated values, got {}", fields.len());
    }

    let numeric = |index: usize, name: &str| -> Result<u32> {
        fields[index]
            .parse()
            .map_err(|_| anyhow!("{name} must be a number, got {:?}", fields[index]))
    };

    Ok(Command::Configure {
        stimulus_duration_ms: numeric(0, "stimulus duration")?,
        inter_stimulus_interval_ms: numeric(1, "inter-stimulus interval")?,
        n_back_level: numeric(2, "n-back level")? as usize,
        trial_count: numeric(3, "trial count")? as usize,
        study_id: fields[4].to_owned(),
        session_number: numeric(5, "session number")? as u16,
        sequence,
    })
}

fn parse_sequence(list: &str) -> Result<Vec<Color>> {
    list.split(',')
        .map(|name| {
            Color::from_name(name).ok_or_else(|| anyhow!("unknown color {:?}", name.trim()))
        })
        .collect()
}

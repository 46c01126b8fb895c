use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use nback_collector::wire;
use nback_core::{Polarity, TaskState};
use nback_input::{ActiveLowButton, InputRig, CHANNEL_CONFIRM, CHANNEL_WRONG, DEFAULT_DEBOUNCE_MS};
use nback_task::{NBackTask, TaskConfig, TaskEvent};
use nback_timing::MonotonicClock;
use rand::rngs::ThreadRng;

use crate::command::{self, Command};
use crate::led::LedStrip;

/// The rig's control loop on a host terminal: stdin stands in for the
/// serial link, stdout carries the wire protocol, and `press` commands
/// stand in for the physical channels. One thread owns everything; the
/// stdin reader only feeds a channel this loop polls.
pub struct App {
    task: NBackTask<MonotonicClock, ThreadRng>,
    rig: InputRig,
    pressed: [Arc<AtomicBool>; 2],
    led: LedStrip,
    commands: mpsc::Receiver<String>,
}

impl App {
    pub fn new() -> Self {
        Self::with_commands(spawn_stdin_reader())
    }

    fn with_commands(commands: mpsc::Receiver<String>) -> Self {
        let clock = MonotonicClock::new();
        let task = NBackTask::new(TaskConfig::default(), clock, rand::rng());

        // A press command latches the line low for one poll cycle.
        let pressed = [
            Arc::new(AtomicBool::new(false)),
            Arc::new(AtomicBool::new(false)),
        ];
        let confirm = pressed[CHANNEL_CONFIRM].clone();
        let wrong = pressed[CHANNEL_WRONG].clone();
        let rig = InputRig::new(
            Box::new(ActiveLowButton(move || !confirm.load(Ordering::Relaxed))),
            Box::new(ActiveLowButton(move || !wrong.load(Ordering::Relaxed))),
            DEFAULT_DEBOUNCE_MS,
        );

        Self {
            task,
            rig,
            pressed,
            led: LedStrip::new(),
            commands,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let stdout = io::stdout();
        {
            let mut out = stdout.lock();
            writeln!(out, "=== N-BACK TASK RIG ===")?;
            writeln!(
                out,
                "Commands: config, start, pause, debug, exit-debug, exit, \
                 get_data, input_mode <0|1>, sync, press <confirm|wrong>"
            )?;
            writeln!(out, "ready")?;
        }

        loop {
            let mut out = stdout.lock();

            if let Ok(line) = self.commands.try_recv() {
                if !line.trim().is_empty() && !self.dispatch(&mut out, &line)? {
                    return Ok(());
                }
            }

            self.poll_input(&mut out)?;

            for event in self.task.tick() {
                self.emit(&mut out, event)?;
            }

            self.led.show(&mut out, self.task.display_color())?;
            out.flush()?;
            drop(out);

            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Returns `false` when the loop should terminate.
    fn dispatch<W: Write>(&mut self, out: &mut W, line: &str) -> Result<bool> {
        let command = match command::parse(line) {
            Ok(command) => command,
            Err(err) => {
                log::warn!("rejected command line {line:?}: {err}");
                writeln!(out, "command-error: {err}")?;
                return Ok(true);
            }
        };

        match command {
            Command::Configure {
                stimulus_duration_ms,
                inter_stimulus_interval_ms,
                n_back_level,
                trial_count,
                study_id,
                session_number,
                sequence,
            } => {
                let current = self.task.config();
                let config = TaskConfig {
                    stimulus_duration_ms,
                    inter_stimulus_interval_ms,
                    n_back_level,
                    trial_count,
                    study_id,
                    session_number,
                    feedback_duration_ms: current.feedback_duration_ms,
                    debug_color_duration_ms: current.debug_color_duration_ms,
                    window_policy: current.window_policy,
                };
                match self.task.configure(config, sequence) {
                    Ok(()) => writeln!(out, "config-ok")?,
                    Err(err) => writeln!(out, "config-error: {err}")?,
                }
            }
            Command::Start => self.task.start(),
            Command::Pause => {
                if !self.task.pause_toggle() {
                    log::warn!("pause ignored in state {:?}", self.task.state());
                }
            }
            Command::Debug => {
                if !self.task.enter_debug() {
                    log::warn!("debug ignored in state {:?}", self.task.state());
                }
            }
            Command::ExitDebug => {
                if self.task.exit_debug() {
                    writeln!(out, "exiting")?;
                    writeln!(out, "ready")?;
                }
            }
            Command::Exit => match self.task.state() {
                // Only exit-debug leaves debug mode.
                TaskState::Debug => {
                    log::warn!("exit ignored in debug mode");
                }
                TaskState::Idle => {
                    writeln!(out, "exiting")?;
                    return Ok(false);
                }
                _ => {
                    self.task.exit();
                    writeln!(out, "exiting")?;
                    writeln!(out, "ready")?;
                }
            },
            Command::GetData => {
                if self.task.state() == TaskState::DataReady {
                    let now = self.task.now_ms();
                    self.task.collector().send_data(out, now)?;
                    writeln!(out, "data-completed")?;
                    self.task.acknowledge_data();
                    writeln!(out, "ready")?;
                } else {
                    writeln!(out, "No data available. Run task first.")?;
                }
            }
            Command::InputMode(forward) => {
                if forward {
                    if self.task.enter_input_forwarding() {
                        self.rig.reset_edges();
                    } else {
                        log::warn!("input_mode ignored in state {:?}", self.task.state());
                    }
                } else if self.task.state() == TaskState::InputForwarding {
                    self.task.exit();
                    writeln!(out, "ready")?;
                }
            }
            Command::Sync => writeln!(out, "sync {}", self.task.now_ms())?,
            Command::Press(polarity) => {
                let channel = match polarity {
                    Polarity::Confirm => CHANNEL_CONFIRM,
                    Polarity::Wrong => CHANNEL_WRONG,
                };
                self.pressed[channel].store(true, Ordering::Relaxed);
            }
        }
        Ok(true)
    }

    fn poll_input<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let now = self.task.now_ms();
        let channels = [
            (CHANNEL_CONFIRM, Polarity::Confirm),
            (CHANNEL_WRONG, Polarity::Wrong),
        ];

        if self.task.state() == TaskState::InputForwarding {
            for (channel, polarity) in channels {
                if self.rig.raw_press_edge(channel) {
                    writeln!(out, "button-press:{}", polarity_label(polarity))?;
                    self.task.collector().send_timestamped_event(
                        out,
                        now,
                        "input_forwarded",
                        Some(polarity_label(polarity)),
                    )?;
                }
            }
        } else {
            for (channel, polarity) in channels {
                if self.rig.just_activated(channel, now) {
                    self.task.handle_response(polarity);
                }
            }
        }

        // Release the simulated lines after one observed poll.
        for flag in &self.pressed {
            flag.store(false, Ordering::Relaxed);
        }
        Ok(())
    }

    fn emit<W: Write>(&mut self, out: &mut W, event: TaskEvent) -> Result<()> {
        let now = self.task.now_ms();
        match event {
            TaskEvent::Sync { now_ms } => writeln!(out, "sync {now_ms}")?,
            TaskEvent::SessionStarted {
                study_id,
                n_back_level,
                stimulus_duration_ms,
                inter_stimulus_interval_ms,
                trial_count,
            } => {
                writeln!(out, "=== {study_id}: {n_back_level}-BACK SESSION ===")?;
                writeln!(
                    out,
                    "{trial_count} trials, stimulus {stimulus_duration_ms} ms, \
                     interval {inter_stimulus_interval_ms} ms"
                )?;
                self.task
                    .collector()
                    .send_timestamped_event(out, now, "start", None)?;
            }
            TaskEvent::SequenceTooShort { provided, needed } => {
                log::warn!("custom sequence has {provided} colors, need {needed}; tail generated");
            }
            TaskEvent::TrialStarted {
                number,
                color,
                is_target,
            } => {
                log::debug!("trial {number}: {} (target: {is_target})", color.name());
            }
            TaskEvent::ResponseRegistered {
                polarity,
                reaction_ms,
            } => {
                log::debug!("response {} after {reaction_ms} ms", polarity_label(polarity));
            }
            TaskEvent::TrialCompleted { record, outcome } => {
                log::debug!("trial {} outcome: {}", record.stimulus_number, outcome.label());
                self.task.collector().send_trial_event(out, &record)?;
                writeln!(out, "trial-complete")?;
            }
            TaskEvent::TaskCompleted {
                summary,
                duration_ms,
            } => {
                writeln!(out, "=== TASK COMPLETE ===")?;
                writeln!(out, "Targets: {}", summary.total_targets)?;
                writeln!(
                    out,
                    "Hits: {}, Misses: {}, False alarms: {}",
                    summary.correct_responses, summary.missed_targets, summary.false_alarms
                )?;
                writeln!(out, "Hit rate: {:.1}%", summary.hit_rate)?;
                writeln!(
                    out,
                    "Average reaction time: {:.1} ms",
                    summary.average_reaction_ms
                )?;
                writeln!(
                    out,
                    "Session duration: {}",
                    wire::format_timestamp(duration_ms)
                )?;
                writeln!(out, "task-completed")?;
            }
            TaskEvent::PauseToggled { paused } => {
                let label = if paused { "pause" } else { "resume" };
                self.task
                    .collector()
                    .send_timestamped_event(out, now, label, None)?;
                if !paused {
                    writeln!(out, "interrupt-over")?;
                }
            }
            TaskEvent::DebugColor { color } => {
                log::debug!("debug color: {}", color.name());
            }
            TaskEvent::DebugInput { polarity } => {
                writeln!(out, "debug-press:{}", polarity_label(polarity))?;
            }
        }
        Ok(())
    }
}

fn polarity_label(polarity: Polarity) -> &'static str {
    match polarity {
        Polarity::Confirm => "CONFIRM",
        Polarity::Wrong => "WRONG",
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let (_tx, rx) = mpsc::channel();
        // The sender is dropped on purpose: dispatch is driven directly.
        App::with_commands(rx)
    }

    fn dispatch(app: &mut App, line: &str) -> (bool, String) {
        let mut out = Vec::new();
        let keep_running = app.dispatch(&mut out, line).unwrap();
        (keep_running, String::from_utf8(out).unwrap())
    }

    #[test]
    fn get_data_is_rejected_outside_data_ready() {
        let mut app = test_app();

        let (_, text) = dispatch(&mut app, "get_data");
        assert!(text.contains("No data available. Run task first."));
        assert!(!text.contains("data-completed"));

        dispatch(&mut app, "config 500,200,1,8,T1,1");
        dispatch(&mut app, "start");
        assert_eq!(app.task.state(), TaskState::Running);

        let (_, text) = dispatch(&mut app, "get_data");
        assert!(text.contains("No data available. Run task first."));
        assert!(!text.contains("Opening Data Socket"));
        assert_eq!(app.task.state(), TaskState::Running);
    }

    #[test]
    fn ready_reappears_on_each_return_to_idle() {
        let mut app = test_app();

        dispatch(&mut app, "debug");
        let (_, text) = dispatch(&mut app, "exit-debug");
        assert!(text.contains("exiting"));
        assert!(text.contains("ready"));

        dispatch(&mut app, "start");
        let (keep_running, text) = dispatch(&mut app, "exit");
        assert!(keep_running);
        assert_eq!(app.task.state(), TaskState::Idle);
        assert!(text.contains("exiting"));
        assert!(text.contains("ready"));
    }

    #[test]
    fn exit_in_debug_mode_is_ignored() {
        let mut app = test_app();

        dispatch(&mut app, "debug");
        let (keep_running, text) = dispatch(&mut app, "exit");
        assert!(keep_running);
        assert_eq!(app.task.state(), TaskState::Debug);
        assert!(!text.contains("exiting"));
    }

    #[test]
    fn exit_from_idle_terminates_the_loop() {
        let mut app = test_app();
        let (keep_running, text) = dispatch(&mut app, "exit");
        assert!(!keep_running);
        assert!(text.contains("exiting"));
    }
}

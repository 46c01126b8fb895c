use nback_collector::DataCollector;
use nback_core::{classify, Color, Outcome, Polarity, Response, TaskState, TrialRecord};
use nback_timing::{elapsed_ms, Clock};
use rand::Rng;

use crate::config::{ConfigError, TaskConfig, WindowPolicy};
use crate::feedback::FeedbackOverlay;
use crate::metrics::{Metrics, Summary};
use crate::sequence;

/// Everything the outside world needs to react to, drained once per
/// loop iteration. The binary turns these into serial lines; tests
/// assert on them directly.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    /// Clock alignment marker sent at session start and on `sync`.
    Sync { now_ms: u32 },
    SessionStarted {
        study_id: String,
        n_back_level: usize,
        stimulus_duration_ms: u32,
        inter_stimulus_interval_ms: u32,
        trial_count: usize,
    },
    /// The provided custom sequence was shorter than the trial count;
    /// the generated tail stays in place.
    SequenceTooShort { provided: usize, needed: usize },
    TrialStarted {
        number: u32,
        color: Color,
        is_target: bool,
    },
    ResponseRegistered {
        polarity: Polarity,
        reaction_ms: u32,
    },
    TrialCompleted {
        record: TrialRecord,
        outcome: Outcome,
    },
    TaskCompleted {
        summary: Summary,
        duration_ms: u32,
    },
    PauseToggled { paused: bool },
    DebugColor { color: Color },
    DebugInput { polarity: Polarity },
}

/// Per-trial sub-phase inside `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrialPhase {
    Inactive,
    ResponseWindow,
    InterStimulus,
}

/// The N-back trial state machine. One instance, owned and driven by
/// the single control loop: `tick` once per iteration, `handle_response`
/// whenever the input rig reports a debounced edge. Nothing here
/// blocks; every wait is an elapsed-time guard re-evaluated each tick.
pub struct NBackTask<C: Clock, R: Rng> {
    clock: C,
    rng: R,
    config: TaskConfig,
    state: TaskState,
    sequence: Vec<Color>,
    collector: DataCollector,
    metrics: Metrics,
    feedback: FeedbackOverlay,

    phase: TrialPhase,
    current_trial: usize,
    trial_start_ms: u32,
    stimulus_end_ms: u32,
    onset_session_ms: u32,
    target_trial: bool,
    response: Option<Response>,

    debug_color: usize,
    last_color_change_ms: u32,

    events: Vec<TaskEvent>,
}

impl<C: Clock, R: Rng> NBackTask<C, R> {
    pub fn new(config: TaskConfig, clock: C, mut rng: R) -> Self {
        let sequence = sequence::generate(&mut rng, config.trial_count, config.n_back_level);
        let feedback = FeedbackOverlay::new(config.feedback_duration_ms);
        let mut collector = DataCollector::new();
        collector.begin(&config.study_id, config.session_number, clock.now_ms());

        Self {
            clock,
            rng,
            config,
            state: TaskState::Idle,
            sequence,
            collector,
            metrics: Metrics::new(),
            feedback,
            phase: TrialPhase::Inactive,
            current_trial: 0,
            trial_start_ms: 0,
            stimulus_end_ms: 0,
            onset_session_ms: 0,
            target_trial: false,
            response: None,
            debug_color: 0,
            last_color_change_ms: 0,
            events: Vec::new(),
        }
    }

    //--------------------------------------------------------------
    // Public operations (driven by the serial command layer)
    //--------------------------------------------------------------

    /// Validate-then-apply. The previous configuration (and sequence)
    /// survive any rejection untouched. A custom sequence replaces the
    /// generated prefix; otherwise a fresh sequence is generated.
    pub fn configure(
        &mut self,
        config: TaskConfig,
        custom_sequence: Option<Vec<Color>>,
    ) -> Result<(), ConfigError> {
        if self.state.session_active() {
            return Err(ConfigError::SessionActive);
        }
        config.validate()?;

        self.feedback.set_duration(config.feedback_duration_ms);
        self.sequence =
            sequence::generate(&mut self.rng, config.trial_count, config.n_back_level);
        if let Some(custom) = custom_sequence {
            if custom.len() < config.trial_count {
                self.events.push(TaskEvent::SequenceTooShort {
                    provided: custom.len(),
                    needed: config.trial_count,
                });
            }
            for (slot, color) in self.sequence.iter_mut().zip(custom) {
                *slot = color;
            }
        }
        self.collector
            .begin(&config.study_id, config.session_number, self.clock.now_ms());
        self.config = config;
        Ok(())
    }

    /// Begin a session. Valid from any non-running state; entering
    /// from `Debug` clears debug state first. Metrics, trial flags and
    /// the collector are reset; the existing sequence is reused.
    pub fn start(&mut self) {
        let now = self.clock.now_ms();

        self.metrics.reset();
        self.current_trial = 0;
        self.phase = TrialPhase::Inactive;
        self.response = None;
        self.target_trial = false;
        self.feedback.cancel();

        self.collector
            .begin(&self.config.study_id, self.config.session_number, now);

        self.events.push(TaskEvent::Sync { now_ms: now });
        self.events.push(TaskEvent::SessionStarted {
            study_id: self.config.study_id.clone(),
            n_back_level: self.config.n_back_level,
            stimulus_duration_ms: self.config.stimulus_duration_ms,
            inter_stimulus_interval_ms: self.config.inter_stimulus_interval_ms,
            trial_count: self.config.trial_count,
        });

        self.state = TaskState::Running;
        self.start_trial(now);
    }

    /// Toggle Running/Paused. No trial data is touched.
    pub fn pause_toggle(&mut self) -> bool {
        match self.state {
            TaskState::Running => {
                self.state = TaskState::Paused;
                self.events.push(TaskEvent::PauseToggled { paused: true });
                true
            }
            TaskState::Paused => {
                self.state = TaskState::Running;
                self.events.push(TaskEvent::PauseToggled { paused: false });
                true
            }
            _ => false,
        }
    }

    /// Abandon the session or leave input forwarding; collected data
    /// for the in-progress session is discarded.
    pub fn exit(&mut self) -> bool {
        match self.state {
            TaskState::Running | TaskState::Paused => {
                self.collector.reset();
                self.phase = TrialPhase::Inactive;
                self.feedback.cancel();
                self.state = TaskState::Idle;
                true
            }
            TaskState::DataReady | TaskState::InputForwarding => {
                self.state = TaskState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Hardware self-test; only reachable when no session is in flight.
    pub fn enter_debug(&mut self) -> bool {
        if self.state.session_active() {
            return false;
        }
        self.state = TaskState::Debug;
        self.debug_color = 0;
        self.last_color_change_ms = self.clock.now_ms();
        self.feedback.cancel();
        true
    }

    pub fn exit_debug(&mut self) -> bool {
        if self.state != TaskState::Debug {
            return false;
        }
        self.state = TaskState::Idle;
        true
    }

    pub fn enter_input_forwarding(&mut self) -> bool {
        if self.state.session_active() {
            return false;
        }
        self.state = TaskState::InputForwarding;
        true
    }

    /// Host has retrieved the dump; return to idle.
    pub fn acknowledge_data(&mut self) -> bool {
        if self.state != TaskState::DataReady {
            return false;
        }
        self.state = TaskState::Idle;
        true
    }

    //--------------------------------------------------------------
    // Loop integration
    //--------------------------------------------------------------

    /// One cooperative step: a no-op unless an elapsed-time guard has
    /// fired. Returns the events produced since the last drain.
    pub fn tick(&mut self) -> Vec<TaskEvent> {
        let now = self.clock.now_ms();
        self.feedback.tick(now);

        match self.state {
            TaskState::Running => self.advance_trial(now),
            TaskState::Debug => self.cycle_debug_color(now),
            _ => {}
        }

        std::mem::take(&mut self.events)
    }

    /// A debounced activation edge from one of the response channels.
    /// Outside a response window (or after the first response of a
    /// trial) the edge is ignored.
    pub fn handle_response(&mut self, polarity: Polarity) {
        let now = self.clock.now_ms();
        match self.state {
            TaskState::Running => {
                if self.phase != TrialPhase::ResponseWindow || self.response.is_some() {
                    return;
                }
                let response = Response {
                    polarity,
                    response_ms: elapsed_ms(now, self.collector.session_start_ms()),
                    reaction_ms: elapsed_ms(now, self.trial_start_ms),
                };
                self.response = Some(response);
                self.feedback.start(now);
                self.events.push(TaskEvent::ResponseRegistered {
                    polarity,
                    reaction_ms: response.reaction_ms,
                });
            }
            TaskState::Debug => {
                self.feedback.start(now);
                self.events.push(TaskEvent::DebugInput { polarity });
            }
            _ => {}
        }
    }

    /// What the strip should show this iteration. Feedback overrides
    /// everything; otherwise the current phase decides.
    pub fn display_color(&self) -> Option<Color> {
        if self.feedback.is_active() {
            return Some(Color::White);
        }
        match self.state {
            TaskState::Debug => Color::from_index(self.debug_color),
            TaskState::Running if self.phase == TrialPhase::ResponseWindow => {
                self.sequence.get(self.current_trial).copied()
            }
            _ => None,
        }
    }

    //--------------------------------------------------------------
    // Accessors
    //--------------------------------------------------------------

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn sequence(&self) -> &[Color] {
        &self.sequence
    }

    pub fn collector(&self) -> &DataCollector {
        &self.collector
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    //--------------------------------------------------------------
    // Trial progression
    //--------------------------------------------------------------

    fn start_trial(&mut self, now: u32) {
        self.trial_start_ms = now;
        self.onset_session_ms = elapsed_ms(now, self.collector.session_start_ms());
        self.response = None;
        self.target_trial =
            sequence::is_target(&self.sequence, self.current_trial, self.config.n_back_level);
        self.phase = TrialPhase::ResponseWindow;

        self.events.push(TaskEvent::TrialStarted {
            number: self.current_trial as u32 + 1,
            color: self.sequence[self.current_trial],
            is_target: self.target_trial,
        });
    }

    fn advance_trial(&mut self, now: u32) {
        match self.phase {
            TrialPhase::ResponseWindow => {
                let timed_out = self.config.window_policy == WindowPolicy::ResponseOrTimeout
                    && elapsed_ms(now, self.trial_start_ms) > self.config.stimulus_duration_ms;
                if self.response.is_some() || timed_out {
                    self.close_response_window(now);
                }
            }
            TrialPhase::InterStimulus => {
                if elapsed_ms(now, self.stimulus_end_ms)
                    > self.config.inter_stimulus_interval_ms
                {
                    if self.current_trial + 1 < self.config.trial_count {
                        self.current_trial += 1;
                        self.start_trial(now);
                    } else {
                        self.finish(now);
                    }
                }
            }
            TrialPhase::Inactive => {}
        }
    }

    fn close_response_window(&mut self, now: u32) {
        self.stimulus_end_ms = now;
        let end_session_ms = elapsed_ms(now, self.collector.session_start_ms());

        let outcome = classify(self.target_trial, self.response.map(|r| r.polarity));
        self.metrics
            .record(outcome, self.response.map(|r| r.reaction_ms));

        let record = TrialRecord {
            stimulus_number: self.current_trial as u32 + 1,
            color: self.sequence[self.current_trial],
            is_target: self.target_trial,
            response_made: self.response.is_some(),
            response_is_confirm: matches!(
                self.response,
                Some(Response {
                    polarity: Polarity::Confirm,
                    ..
                })
            ),
            is_correct: outcome.is_correct(),
            onset_ms: self.onset_session_ms,
            response_ms: self.response.map_or(0, |r| r.response_ms),
            reaction_ms: self.response.map_or(0, |r| r.reaction_ms),
            end_ms: end_session_ms,
        };
        self.collector.record(record.clone());
        self.events.push(TaskEvent::TrialCompleted { record, outcome });

        self.phase = TrialPhase::InterStimulus;
    }

    fn finish(&mut self, now: u32) {
        self.phase = TrialPhase::Inactive;
        self.state = TaskState::DataReady;
        self.events.push(TaskEvent::TaskCompleted {
            summary: self.metrics.summarize(),
            duration_ms: elapsed_ms(now, self.collector.session_start_ms()),
        });
    }

    fn cycle_debug_color(&mut self, now: u32) {
        if elapsed_ms(now, self.last_color_change_ms) > self.config.debug_color_duration_ms {
            let palette = &nback_core::color::PALETTE;
            self.debug_color = (self.debug_color + 1) % palette.len();
            self.last_color_change_ms = now;
            self.events.push(TaskEvent::DebugColor {
                color: palette[self.debug_color],
            });
        }
    }
}

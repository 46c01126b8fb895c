use serde::{Deserialize, Serialize};

/// Top-level task states. `InputForwarding` diverts raw channel edges
/// to the serial link and never touches session data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Idle,
    Running,
    Paused,
    Debug,
    DataReady,
    InputForwarding,
}

impl TaskState {
    /// A session is in flight: configuration changes are rejected.
    pub fn session_active(self) -> bool {
        matches!(self, TaskState::Running | TaskState::Paused)
    }
}

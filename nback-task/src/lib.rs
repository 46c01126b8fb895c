pub mod config;
pub mod feedback;
pub mod metrics;
pub mod sequence;
pub mod task;

pub use config::{ConfigError, TaskConfig, WindowPolicy};
pub use feedback::FeedbackOverlay;
pub use metrics::{Metrics, Summary};
pub use task::{NBackTask, TaskEvent};

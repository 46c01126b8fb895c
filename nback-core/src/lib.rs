pub mod color;
pub mod outcome;
pub mod state;
pub mod trial;

pub use color::Color;
pub use outcome::{classify, Outcome, Polarity, Response};
pub use state::TaskState;
pub use trial::TrialRecord;

pub mod collector;
pub mod wire;

pub use collector::DataCollector;
pub use wire::format_timestamp;

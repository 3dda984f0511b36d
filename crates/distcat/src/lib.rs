pub mod combine;
pub mod concat;
pub mod config;
pub mod dirs;
pub mod orchestrator;

pub use concat::{ConcatError, concatenate};
pub use config::{Config, JobConfig};
pub use orchestrator::DistOrchestrator;

pub mod cli;
pub mod config;
pub mod error;
pub mod job;
pub mod languages;
pub mod orchestrator;
pub mod sandbox;
pub mod staging;

pub use error::{Result, RunboxError};
pub use orchestrator::Orchestrator;
pub use sandbox::ProcessResult;

pub mod command;
pub mod config;
pub mod download;
pub mod git;
pub mod layout;
pub mod pipeline;
pub mod preflight;
pub mod steps;

pub use command::{CommandRunner, CommandSpec, ProcessOutput, ProcessRunner, StreamMode};
pub use layout::BuildLayout;
pub use pipeline::{Pipeline, PipelineReport};

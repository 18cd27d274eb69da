//! Library exports for otlpconf-cli.
//!
//! The CLI structure is exported so benches and tests can drive argument
//! parsing without spawning the binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;

//! CLI command implementations.
//!
//! - `resolve`: Build a configuration and print a summary
//! - `env`: List the exporter environment variables
//! - `completions`: Generate shell completion scripts

pub mod completions;
pub mod env;
pub mod resolve;

pub use completions::CompletionsCommand;
pub use env::EnvCommand;
pub use resolve::ResolveCommand;

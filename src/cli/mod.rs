//! CLI argument parsing and command dispatch.

pub mod args;
pub mod extract;
pub mod inspect;
pub mod proxies;

pub use args::{Cli, Commands, OutputFormat};

//! Command-line front end for power-grid dataset documents.
//!
//! The binary (`pgm`) lives in `main.rs`; this library exposes the argument
//! definitions so they can be reused for completions and tested directly.

pub mod cli;

pub use cli::{build_cli_command, Cli, Commands, OutputFormat};

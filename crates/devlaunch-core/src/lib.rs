//! Start a client/server development environment in one step.
//!
//! The run checks that the runtime is installed, installs each sub-project's
//! dependencies when its install marker is missing, then starts the server,
//! waits a fixed grace period, and starts the client. Both dev processes are
//! left running on their own.

pub mod command;
pub mod config;
pub mod error;
pub mod installer;
pub mod interrupt;
pub mod launcher;
pub mod orchestrator;
pub mod platform;
pub mod preflight;
pub mod project;
pub mod report;
pub mod runner;
pub mod ui;

pub use error::{Error, Result};

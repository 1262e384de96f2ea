#![warn(missing_docs)]

//! Scenario runner for the picture-in-picture transition core.
//!
//! `pipctl` wires a [`pip_transitions::PipShell`] to a simulated window
//! manager: a transition manager that queues submissions until a scenario
//! step delivers them, frame animators driven by a tokio [`pump::FramePump`],
//! and fixed display, split-screen and desktop collaborators.

pub mod cli;
mod error;
pub mod pump;
pub mod runner;
pub mod scenario;
pub mod sim;
pub mod snap;

pub use error::{Error, Result};

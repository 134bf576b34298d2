//! Core library for the curator collection browser.
//!
//! The interesting logic lives in [`browser`]; [`api`] talks to the
//! collections service and [`command`] runs the resulting effects.

pub mod api;
pub mod browser;
pub mod command;
pub mod config;

pub use browser::{update, Msg, State};
pub use command::{run_to_completion, Command, Runtime};
pub use config::BrowserConfig;

//! Command-line front end for the wearbridge bridge.
//!
//! `devices` and `check-url` inspect state a host application would see;
//! `simulate` replays a scripted scenario against the simulated SDK.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod script;

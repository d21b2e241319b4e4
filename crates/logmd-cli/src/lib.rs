//! Shared infrastructure for the logger-metadata CLI.

pub mod logging;

//! Ambient services: logging, terminal modes, and time.

pub mod log_dirs;
pub mod terminal_modes;
pub mod time_source;
pub mod tracing_setup;

// Library half of waitplay - exposes the modules for the binary and tests

pub mod app;
pub mod config;
pub mod game;
pub mod process;
pub mod services;
pub mod view;

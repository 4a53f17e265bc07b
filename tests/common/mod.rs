#![allow(dead_code)]

pub mod tracing;

use std::time::{Duration, Instant};
use waitplay::process::ProcessSupervisor;

/// Wait until the command's output has been fully read, or `limit` passes.
pub fn wait_for_exit(supervisor: &ProcessSupervisor, limit: Duration) -> bool {
    let start = Instant::now();
    while supervisor.is_alive() {
        if start.elapsed() > limit {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    true
}

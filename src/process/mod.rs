//! Running the wrapped command and collecting its output.

pub mod buffers;
pub mod relay;
pub mod supervisor;

pub use buffers::{DisplayRing, OutputBuffers, Spool};
pub use relay::OutputRelay;
pub use supervisor::{DrainReport, ProcessSupervisor, QuitFlag};

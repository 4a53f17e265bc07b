//! Process supervisor: owns the command's lifecycle.
//!
//! The command string is split into argv with POSIX shell quoting rules and
//! spawned directly, lazily on the first render pass. Its stdout and
//! stderr are merged into one pipe drained by an `OutputRelay`, and on
//! shutdown everything it printed is replayed to the output sink. The child
//! is never killed: shutdown waits for it to exit on its own.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::buffers::OutputBuffers;
use super::relay::OutputRelay;

/// Display ring capacity used until the first layout pass sets the real one.
const INITIAL_RING_CAPACITY: usize = 256;

/// Shared "quit requested" flag, set off the UI thread and polled by the loop.
#[derive(Debug, Clone, Default)]
pub struct QuitFlag(Arc<AtomicBool>);

impl QuitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What shutdown did with the command's output.
#[derive(Debug)]
pub struct DrainReport {
    /// Lines the relay read from the command
    pub lines_relayed: usize,
    /// Lines written to the sink (banner excluded)
    pub lines_replayed: usize,
    /// None if the command was never started
    pub exit_status: Option<ExitStatus>,
}

#[derive(Debug)]
struct RunningProcess {
    child: Child,
    relay: OutputRelay,
    buffers: Arc<OutputBuffers>,
}

/// Runs one command and collects its output.
#[derive(Debug)]
pub struct ProcessSupervisor {
    command: String,
    auto_quit: bool,
    quit: QuitFlag,
    ring_capacity: usize,
    running: Option<RunningProcess>,
}

impl ProcessSupervisor {
    /// `quit` is raised when the command finishes if `auto_quit` is set.
    pub fn new(command: impl Into<String>, auto_quit: bool, quit: QuitFlag) -> Self {
        Self {
            command: command.into(),
            auto_quit,
            quit,
            ring_capacity: INITIAL_RING_CAPACITY,
            running: None,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Flag raised when the command finishes in auto-quit mode.
    pub fn quit_flag(&self) -> &QuitFlag {
        &self.quit
    }

    /// Spawn the command and start the relay. No-op after the first call.
    pub fn ensure_started(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Ok(());
        }

        let buffers = Arc::new(
            OutputBuffers::new(self.ring_capacity).context("Failed to open output spool")?,
        );

        let argv = split_command(&self.command)?;
        let (reader, writer) = io::pipe().context("Failed to create output pipe")?;
        let child = {
            let mut command = Command::new(&argv[0]);
            command
                .args(&argv[1..])
                .stdin(Stdio::null())
                .stdout(writer.try_clone().context("Failed to clone output pipe")?)
                .stderr(writer);
            command
                .spawn()
                .with_context(|| format!("Failed to spawn `{}`", self.command))?
            // `command` drops here, closing our copies of the write end so
            // the relay sees end-of-stream when the child exits
        };
        tracing::info!("Spawned `{}` (pid {})", self.command, child.id());

        let auto_quit = self.auto_quit;
        let quit = self.quit.clone();
        let relay = OutputRelay::spawn(reader, buffers.clone(), move || {
            if auto_quit {
                tracing::info!("Command finished, requesting quit");
                quit.request();
            }
        })
        .context("Failed to start output relay")?;

        self.running = Some(RunningProcess {
            child,
            relay,
            buffers,
        });
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.running.is_some()
    }

    /// True while the relay is still reading the command's output.
    pub fn is_alive(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.relay.is_finished())
    }

    /// Output buffers, available once the command has started.
    pub fn buffers(&self) -> Option<&Arc<OutputBuffers>> {
        self.running.as_ref().map(|running| &running.buffers)
    }

    /// Resize the live view to `rows` visible lines.
    pub fn set_display_capacity(&mut self, rows: usize) {
        self.ring_capacity = rows;
        if let Some(buffers) = self.buffers() {
            buffers.set_capacity(rows);
        }
    }

    /// Wait for the command to finish and replay its full output to `sink`.
    ///
    /// Blocks until the command exits. Lines still in the display ring are
    /// logged; the spool holds all of them and is written after the optional
    /// `banner`. Sink write failures are returned as errors.
    pub fn shutdown(self, sink: &mut dyn Write, banner: Option<&str>) -> Result<DrainReport> {
        let Some(RunningProcess {
            mut child,
            relay,
            buffers,
        }) = self.running
        else {
            tracing::info!("Command was never started, nothing to drain");
            return Ok(DrainReport {
                lines_relayed: 0,
                lines_replayed: 0,
                exit_status: None,
            });
        };

        if !relay.is_finished() {
            tracing::info!("Waiting for `{}` to finish", self.command);
        }
        let lines_relayed = relay.join();

        for line in buffers.take_remaining() {
            tracing::debug!(target: "waitplay::output", "{}", line);
        }

        let lines_replayed = buffers
            .replay(sink, banner)
            .context("Failed to write captured output")?;

        let exit_status = child.wait().context("Failed to wait for command")?;
        tracing::info!(
            "`{}` exited with {}; replayed {} of {} lines",
            self.command,
            exit_status,
            lines_replayed,
            lines_relayed
        );

        Ok(DrainReport {
            lines_relayed,
            lines_replayed,
            exit_status: Some(exit_status),
        })
    }
}

/// Split a command string into argv using POSIX shell quoting.
///
/// No shell is involved: pipes, globs and variables are passed through as
/// literal arguments. Unbalanced quotes and empty commands are errors.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let argv = shlex::split(command)
        .with_context(|| format!("Unbalanced quotes or escape in command `{}`", command))?;
    if argv.is_empty() {
        anyhow::bail!("Empty command");
    }
    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_flag_is_shared() {
        let flag = QuitFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_requested());
        clone.request();
        assert!(flag.is_requested());
    }

    #[test]
    fn test_split_command_honours_quotes() {
        assert_eq!(
            split_command(r#"grep -r "two words" 'it''s' a\ b"#).unwrap(),
            vec!["grep", "-r", "two words", "its", "a b"]
        );
        assert_eq!(split_command("  make   -j8 ").unwrap(), vec!["make", "-j8"]);
    }

    #[test]
    fn test_split_command_rejects_bad_input() {
        assert!(split_command("echo 'unterminated").is_err());
        assert!(split_command("").is_err());
        assert!(split_command("   ").is_err());
    }

    #[test]
    fn test_unparsable_command_fails_to_start() {
        let mut supervisor = ProcessSupervisor::new("echo \"oops", false, QuitFlag::new());
        assert!(supervisor.ensure_started().is_err());
        assert!(!supervisor.is_started());
    }

    #[test]
    fn test_missing_program_fails_to_start() {
        let mut supervisor =
            ProcessSupervisor::new("waitplay-no-such-program --flag", false, QuitFlag::new());
        assert!(supervisor.ensure_started().is_err());
    }

    #[test]
    fn test_not_started_is_not_alive() {
        let supervisor = ProcessSupervisor::new("true", false, QuitFlag::new());
        assert!(!supervisor.is_started());
        assert!(!supervisor.is_alive());
        assert!(supervisor.buffers().is_none());
    }

    #[test]
    fn test_shutdown_without_start_writes_nothing() {
        let supervisor = ProcessSupervisor::new("true", false, QuitFlag::new());
        let mut sink = Vec::new();
        let report = supervisor.shutdown(&mut sink, Some("banner")).unwrap();

        assert_eq!(report.lines_replayed, 0);
        assert!(report.exit_status.is_none());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_capacity_before_start_is_applied_on_start() {
        let mut supervisor = ProcessSupervisor::new("true", false, QuitFlag::new());
        supervisor.set_display_capacity(7);
        supervisor.ensure_started().unwrap();
        assert_eq!(supervisor.buffers().unwrap().capacity(), 7);

        let mut sink = Vec::new();
        supervisor.shutdown(&mut sink, None).unwrap();
    }
}

use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use crossterm::event::{poll as event_poll, read as event_read};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use waitplay::app::App;
use waitplay::config::{Config, GameKind};
use waitplay::game::Game;
use waitplay::process::{ProcessSupervisor, QuitFlag};
use waitplay::services::terminal_modes::{self, TerminalModes};
use waitplay::services::time_source::SystemClock;
use waitplay::services::{log_dirs, tracing_setup};

/// Play a small game while a command runs, then print its output
#[derive(Parser, Debug)]
#[command(name = "waitplay")]
#[command(about = "Run a command and play a terminal game until it finishes", long_about = None)]
#[command(version)]
struct Args {
    /// Command to run, split into arguments with shell quoting rules
    #[arg(value_name = "COMMAND", required_unless_present = "dump_config")]
    command: Option<String>,

    /// Leave as soon as the command finishes
    #[arg(short = 'q', long)]
    auto_quit: bool,

    /// Seconds between game ticks
    #[arg(short = 'r', long, value_name = "SECONDS")]
    refresh_rate: Option<f64>,

    /// Game to play
    #[arg(short = 'g', long, value_enum)]
    game: Option<GameKind>,

    /// Stack the game above the command output
    #[arg(long = "hsplit", visible_alias = "horizontal-split")]
    horizontal_split: bool,

    /// Write the command output here instead of stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Line printed before the command output
    #[arg(long, value_name = "TEXT")]
    banner: Option<String>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Word list for the word game, one word per line
    #[arg(long = "words", value_name = "PATH")]
    word_list: Option<PathBuf>,

    /// Seed for the word game's target selection
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Path to log file for diagnostics (default: state log directory)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

/// Load the config file, if any, and apply command-line overrides.
fn effective_config(args: &Args) -> AnyhowResult<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(rate) = args.refresh_rate {
        config.refresh_rate_secs = rate;
    }
    if let Some(game) = args.game {
        config.game = game;
    }
    if args.auto_quit {
        config.auto_quit = true;
    }
    if args.horizontal_split {
        config.horizontal_split = true;
    }
    if args.banner.is_some() {
        config.banner = args.banner.clone();
    }
    if args.word_list.is_some() {
        config.words.word_list = args.word_list.clone();
    }
    if args.seed.is_some() {
        config.words.seed = args.seed;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn open_sink(output: Option<&PathBuf>) -> AnyhowResult<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file {}", path.display())
        })?)),
        None => Box::new(stdout().lock()),
    })
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let config = effective_config(&args)?;

    // Handle --dump-config early (no terminal setup needed)
    if args.dump_config {
        let json =
            serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
        println!("{}", json);
        return Ok(());
    }

    let Some(command) = args.command.clone() else {
        anyhow::bail!("No command given");
    };

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(log_dirs::main_log_path);
    if let Err(e) = tracing_setup::init_global(&log_file) {
        eprintln!(
            "Warning: could not open log file {}: {}",
            log_file.display(),
            e
        );
    }
    tracing::info!("waitplay starting: `{}`", command);

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        terminal_modes::emergency_cleanup();
        original_hook(panic);
    }));

    // Fail on a bad word list before touching the terminal
    let game = Game::from_config(&config)?;
    let supervisor = ProcessSupervisor::new(command, config.auto_quit, QuitFlag::new());
    let banner = config.banner.clone();
    let mut app = App::new(config, supervisor, game, SystemClock::shared());

    let mut terminal_modes = TerminalModes::enable()?;
    let loop_result = match Terminal::new(CrosstermBackend::new(stdout())) {
        Ok(mut terminal) => app.run(&mut terminal, |timeout| {
            if event_poll(timeout)? {
                Ok(Some(event_read()?))
            } else {
                Ok(None)
            }
        }),
        Err(e) => Err(anyhow::Error::new(e).context("Failed to create terminal")),
    };

    // Restore terminal state before anything is printed
    terminal_modes.undo();

    // Drain even after a loop error so the command's output is not lost
    let supervisor = app.into_supervisor();
    let drain_result = drain(supervisor, args.output.as_ref(), banner.as_deref());

    loop_result.context("Game loop returned an error")?;
    drain_result
}

fn drain(
    supervisor: ProcessSupervisor,
    output: Option<&PathBuf>,
    banner: Option<&str>,
) -> AnyhowResult<()> {
    let mut sink = open_sink(output)?;
    let report = supervisor.shutdown(&mut sink, banner)?;
    sink.flush().context("Failed to flush command output")?;

    match report.exit_status {
        Some(status) => tracing::info!(
            "Command exited with {}; {} lines replayed",
            status,
            report.lines_replayed
        ),
        None => tracing::info!("Command was never started"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["waitplay", "make -j8"]);
        assert_eq!(args.command.as_deref(), Some("make -j8"));
        let config = effective_config(&args).unwrap();
        assert_eq!(config.game, GameKind::Words);
        assert!(!config.auto_quit);
        assert_eq!(config.refresh_rate_secs, 0.3);
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "waitplay",
            "-q",
            "-r",
            "0.1",
            "-g",
            "shooter",
            "--horizontal-split",
            "--banner",
            "done",
            "--seed",
            "9",
            "cargo build",
        ]);
        let config = effective_config(&args).unwrap();
        assert!(config.auto_quit);
        assert!(config.horizontal_split);
        assert_eq!(config.refresh_rate_secs, 0.1);
        assert_eq!(config.game, GameKind::Shooter);
        assert_eq!(config.banner.as_deref(), Some("done"));
        assert_eq!(config.words.seed, Some(9));
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "game": "shooter", "refresh_rate_secs": 0.5 }"#).unwrap();

        let args = parse(&["waitplay", "--config", path.to_str().unwrap(), "-r", "1", "ls"]);
        let config = effective_config(&args).unwrap();
        assert_eq!(config.game, GameKind::Shooter);
        assert_eq!(config.refresh_rate_secs, 1.0);
    }

    #[test]
    fn test_hsplit_and_its_alias() {
        for flag in ["--hsplit", "--horizontal-split"] {
            let args = parse(&["waitplay", flag, "ls"]);
            assert!(effective_config(&args).unwrap().horizontal_split);
        }
    }

    #[test]
    fn test_rejects_non_positive_refresh_rate() {
        let args = parse(&["waitplay", "-r", "0", "ls"]);
        assert!(effective_config(&args).is_err());
    }

    #[test]
    fn test_command_required() {
        assert!(Args::try_parse_from(["waitplay"]).is_err());
        assert!(Args::try_parse_from(["waitplay", "--dump-config"]).is_ok());
    }

    #[test]
    fn test_unknown_game_rejected() {
        assert!(Args::try_parse_from(["waitplay", "-g", "chess", "ls"]).is_err());
    }
}

//! The fixed-tick loop tying the command, the game and the terminal together.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use std::time::Duration;

use crate::config::Config;
use crate::game::{Game, MiniGame};
use crate::process::ProcessSupervisor;
use crate::services::time_source::{SharedTimeSource, TickClock};
use crate::view::{self, PanelLayout};

/// Owns the game and the supervised command for the lifetime of the UI.
pub struct App {
    config: Config,
    supervisor: ProcessSupervisor,
    game: Game,
    clock: TickClock,
    layout: PanelLayout,
}

impl App {
    pub fn new(
        config: Config,
        supervisor: ProcessSupervisor,
        game: Game,
        time_source: SharedTimeSource,
    ) -> Self {
        let clock = TickClock::new(time_source, config.refresh_rate());
        Self {
            config,
            supervisor,
            game,
            clock,
            layout: PanelLayout::compute(Rect::default(), false),
        }
    }

    /// Number of game ticks so far.
    pub fn tick_count(&self) -> u64 {
        self.clock.ticks()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    /// Give back the supervisor so the caller can drain the command's output.
    pub fn into_supervisor(self) -> ProcessSupervisor {
        self.supervisor
    }

    /// Run until a quit key is pressed or the command finishes in auto-quit
    /// mode.
    ///
    /// `poll_event` waits up to the given timeout for one terminal event.
    /// Drawing happens every iteration; the game only advances once at least
    /// one refresh period has passed since the previous tick.
    pub fn run<B, F>(&mut self, terminal: &mut Terminal<B>, mut poll_event: F) -> Result<()>
    where
        B: Backend,
        F: FnMut(Duration) -> Result<Option<Event>>,
    {
        self.start(terminal)?;
        while self.step(terminal, &mut poll_event)? {}

        tracing::info!("Game loop finished after {} ticks", self.clock.ticks());
        Ok(())
    }

    /// Spawn the command, lay out the panels and set up the game.
    fn start<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.supervisor.ensure_started()?;

        let size = terminal.size()?;
        self.apply_layout(Rect::new(0, 0, size.width, size.height));
        self.game.setup(self.layout.game_inner());
        self.clock.restart();
        tracing::info!(
            "Starting {} game, tick every {:?}",
            self.game.name(),
            self.clock.period()
        );
        Ok(())
    }

    /// One loop iteration. Returns false once the loop should stop.
    fn step<B, F>(&mut self, terminal: &mut Terminal<B>, poll_event: &mut F) -> Result<bool>
    where
        B: Backend,
        F: FnMut(Duration) -> Result<Option<Event>>,
    {
        terminal.draw(|frame| self.render(frame))?;

        if let Some(event) = poll_event(self.clock.period())? {
            match event {
                Event::Resize(width, height) => {
                    tracing::debug!("Terminal resized to {}x{}", width, height);
                    self.apply_layout(Rect::new(0, 0, width, height));
                    self.game.relayout(self.layout.game_inner());
                }
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.is_quit_key(&key) {
                        tracing::info!("Quit key pressed");
                        return Ok(false);
                    }
                    self.game.handle_input(key);
                }
                _ => {}
            }
        }

        if self.supervisor.quit_flag().is_requested() {
            tracing::info!("Quit requested after command finished");
            return Ok(false);
        }

        if self.clock.tick_or_wait() {
            self.game.update_state();
        }
        Ok(true)
    }

    fn is_quit_key(&self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Char('q') => key.modifiers.is_empty() && !self.game.captures_text(),
            _ => false,
        }
    }

    fn apply_layout(&mut self, area: Rect) {
        self.layout = PanelLayout::compute(area, self.config.horizontal_split);
        self.supervisor
            .set_display_capacity(self.layout.output_rows());
    }

    fn render(&mut self, frame: &mut Frame) {
        // Ring capacity follows the panel size on every frame
        self.apply_layout(frame.area());

        let game_area = view::framed(frame, self.layout.game, self.game.name());
        self.game.render(frame, game_area);

        let process_area = view::framed(frame, self.layout.process, self.supervisor.command());
        let lines = self
            .supervisor
            .buffers()
            .map(|buffers| buffers.visible_lines())
            .unwrap_or_default();
        view::render_process_panel(frame, process_area, self.supervisor.is_alive(), &lines);
    }
}

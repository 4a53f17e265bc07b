//! Mini-games shown while the command runs.
//!
//! Every game follows the same contract: `setup` once the viewport is known,
//! `handle_input` for key presses, `update_state` on tick boundaries only, and
//! a pure `render`. `Game` is the closed set of games; `GameKind` picks one at
//! startup.

pub mod shooter;
pub mod word_guess;
pub mod words;

use anyhow::{Context, Result};
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;

use crate::config::{Config, GameKind};
use shooter::Shooter;
use word_guess::WordGuess;
use words::WordList;

/// Behavior shared by all games driven by the loop.
pub trait MiniGame {
    /// Title shown on the game panel.
    fn name(&self) -> &'static str;

    /// True if plain letter keys belong to the game, so `q` must not quit.
    fn captures_text(&self) -> bool {
        false
    }

    /// Called once, after the first layout pass, with the game's viewport.
    fn setup(&mut self, area: Rect);

    /// Called when the viewport changes size.
    fn relayout(&mut self, area: Rect);

    /// React to a key press. Mutates state, never draws.
    fn handle_input(&mut self, key: KeyEvent);

    /// Advance one tick.
    fn update_state(&mut self);

    /// Draw the current state into `area`. Must not mutate game state.
    fn render(&self, frame: &mut Frame, area: Rect);
}

/// The active game.
#[derive(Debug)]
pub enum Game {
    Shooter(Shooter),
    Words(WordGuess),
}

impl GameKind {
    /// Build the game selected by `config.game`.
    pub fn build(self, config: &Config) -> Result<Game> {
        match self {
            GameKind::Shooter => Ok(Game::Shooter(Shooter::new(config.shooter.invader_count))),
            GameKind::Words => {
                let words = match &config.words.word_list {
                    Some(path) => WordList::from_file(path)
                        .with_context(|| format!("Failed to load word list {}", path.display()))?,
                    None => WordList::builtin(),
                };
                Ok(Game::Words(WordGuess::new(
                    words,
                    config.words.max_guesses,
                    config.words.seed,
                )))
            }
        }
    }
}

impl Game {
    /// Build the game chosen in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.game.build(config)
    }

    fn inner(&self) -> &dyn MiniGame {
        match self {
            Game::Shooter(game) => game,
            Game::Words(game) => game,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn MiniGame {
        match self {
            Game::Shooter(game) => game,
            Game::Words(game) => game,
        }
    }
}

impl MiniGame for Game {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn captures_text(&self) -> bool {
        self.inner().captures_text()
    }

    fn setup(&mut self, area: Rect) {
        self.inner_mut().setup(area)
    }

    fn relayout(&mut self, area: Rect) {
        self.inner_mut().relayout(area)
    }

    fn handle_input(&mut self, key: KeyEvent) {
        self.inner_mut().handle_input(key)
    }

    fn update_state(&mut self) {
        self.inner_mut().update_state()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        self.inner().render(frame, area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_builds_selected_game() {
        let mut config = Config::default();

        config.game = GameKind::Shooter;
        let game = Game::from_config(&config).unwrap();
        assert!(matches!(game, Game::Shooter(_)));
        assert!(!game.captures_text());

        config.game = GameKind::Words;
        config.words.seed = Some(7);
        let game = Game::from_config(&config).unwrap();
        assert!(matches!(game, Game::Words(_)));
        assert!(game.captures_text());
    }

    #[test]
    fn test_missing_word_list_is_an_error() {
        let mut config = Config::default();
        config.words.word_list = Some("/nonexistent/words.txt".into());
        assert!(Game::from_config(&config).is_err());
    }
}

//! Shooter: move a ship under a row of bouncing invaders.
//!
//! Shots fly straight up and never hit anything; the invaders only bounce
//! between the panel edges.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::Frame;

use super::MiniGame;

const INVADER_SPRITE: [&str; 2] = [" ██ ", "█  █"];
const INVADER_WIDTH: i32 = 4;
const INVADER_ROW: i32 = 3;

const PLAYER_SPRITE: [&str; 2] = ["█", "█"];
const SHOT_GLYPH: &str = "|";

const INVADER_COLOR: Color = Color::Yellow;
const PLAYER_COLOR: Color = Color::Green;
const SHOT_COLOR: Color = Color::Magenta;

/// Row/column position relative to the game viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invader {
    pub pos: Cell,
    /// -1 moving left, +1 moving right
    pub direction: i32,
}

#[derive(Debug)]
pub struct Shooter {
    invader_count: usize,
    width: i32,
    height: i32,
    player: Cell,
    invaders: Vec<Invader>,
    shots: Vec<Cell>,
    pending_move: i32,
    shot_requested: bool,
}

impl Shooter {
    pub fn new(invader_count: usize) -> Self {
        Self {
            invader_count,
            width: 0,
            height: 0,
            player: Cell { row: 0, col: 0 },
            invaders: Vec::new(),
            shots: Vec::new(),
            pending_move: 0,
            shot_requested: false,
        }
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    pub fn invaders(&self) -> &[Invader] {
        &self.invaders
    }

    #[cfg(test)]
    pub fn invaders_mut(&mut self) -> &mut [Invader] {
        &mut self.invaders
    }

    pub fn shots(&self) -> &[Cell] {
        &self.shots
    }

    pub fn shot_pending(&self) -> bool {
        self.shot_requested
    }

    /// Rightmost column an invader can occupy.
    fn invader_max_col(&self) -> i32 {
        (self.width - INVADER_WIDTH).max(0)
    }

    fn player_max_col(&self) -> i32 {
        (self.width - 1).max(0)
    }

    fn advance_shots(&mut self) {
        for shot in &mut self.shots {
            shot.row -= 1;
        }
        self.shots.retain(|shot| shot.row >= 0);
    }

    fn move_invaders(&mut self) {
        let max_col = self.invader_max_col();
        for invader in &mut self.invaders {
            if max_col == 0 {
                invader.pos.col = 0;
                continue;
            }
            // Edge test uses the next position, before moving
            let next = invader.pos.col + invader.direction;
            if next > max_col {
                invader.direction = -1;
            } else if next < 0 {
                invader.direction = 1;
            }
            invader.pos.col += invader.direction;
        }
    }
}

impl MiniGame for Shooter {
    fn name(&self) -> &'static str {
        "Invaders"
    }

    fn setup(&mut self, area: Rect) {
        self.width = area.width as i32;
        self.height = area.height as i32;

        let count = self.invader_count.max(1) as i32;
        let max_col = self.invader_max_col();
        self.invaders = (0..count)
            .map(|i| Invader {
                pos: Cell {
                    row: INVADER_ROW,
                    col: (i * self.width / count).min(max_col),
                },
                direction: 1,
            })
            .collect();

        self.player = Cell {
            row: (self.height - 2).max(0),
            col: self.width / 2,
        };
        self.shots.clear();
        self.pending_move = 0;
        self.shot_requested = false;
        tracing::debug!(
            "Shooter set up in {}x{} with {} invaders",
            self.width,
            self.height,
            count
        );
    }

    fn relayout(&mut self, area: Rect) {
        self.width = area.width as i32;
        self.height = area.height as i32;

        let max_col = self.invader_max_col();
        for invader in &mut self.invaders {
            invader.pos.col = invader.pos.col.clamp(0, max_col);
        }
        self.player.row = (self.height - 2).max(0);
        self.player.col = self.player.col.clamp(0, self.player_max_col());
        let (width, height) = (self.width, self.height);
        self.shots
            .retain(|shot| shot.row < height && shot.col < width);
    }

    fn handle_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => self.pending_move = -1,
            KeyCode::Right => self.pending_move = 1,
            KeyCode::Down => self.pending_move = 0,
            KeyCode::Up | KeyCode::Char(' ') => self.shot_requested = true,
            _ => {}
        }
    }

    fn update_state(&mut self) {
        self.advance_shots();

        if self.shot_requested {
            self.shots.push(Cell {
                row: self.player.row - 1,
                col: self.player.col,
            });
            self.shot_requested = false;
        }

        self.player.col = (self.player.col + self.pending_move).clamp(0, self.player_max_col());
        self.pending_move = 0;

        self.move_invaders();
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let buf = frame.buffer_mut();
        let mut put = |row: i32, col: i32, symbol: &str, color: Color| {
            if row < 0 || col < 0 || row >= area.height as i32 || col >= area.width as i32 {
                return;
            }
            let position = (area.x + col as u16, area.y + row as u16);
            if let Some(cell) = buf.cell_mut(position) {
                cell.set_symbol(symbol).set_style(Style::default().fg(color));
            }
        };

        for invader in &self.invaders {
            for (dy, line) in INVADER_SPRITE.iter().enumerate() {
                for (dx, ch) in line.chars().enumerate() {
                    if ch != ' ' {
                        let mut tmp = [0u8; 4];
                        put(
                            invader.pos.row + dy as i32,
                            invader.pos.col + dx as i32,
                            ch.encode_utf8(&mut tmp),
                            INVADER_COLOR,
                        );
                    }
                }
            }
        }

        for shot in &self.shots {
            put(shot.row, shot.col, SHOT_GLYPH, SHOT_COLOR);
        }

        for (dy, symbol) in PLAYER_SPRITE.iter().enumerate() {
            put(
                self.player.row + dy as i32,
                self.player.col,
                symbol,
                PLAYER_COLOR,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn game(width: u16, height: u16) -> Shooter {
        let mut game = Shooter::new(3);
        game.setup(Rect::new(0, 0, width, height));
        game
    }

    #[test]
    fn test_setup_places_entities() {
        let game = game(30, 20);
        let cols: Vec<i32> = game.invaders().iter().map(|i| i.pos.col).collect();
        assert_eq!(cols, vec![0, 10, 20]);
        assert!(game.invaders().iter().all(|i| i.pos.row == 3 && i.direction == 1));
        assert_eq!(game.player(), Cell { row: 18, col: 15 });
        assert!(game.shots().is_empty());
    }

    #[test]
    fn test_invader_bounces_at_right_edge() {
        let mut game = game(30, 20);
        let max_col = 30 - INVADER_WIDTH;
        game.invaders_mut()[0] = Invader {
            pos: Cell { row: 3, col: max_col },
            direction: 1,
        };

        game.update_state();

        let invader = game.invaders()[0];
        assert_eq!(invader.direction, -1);
        assert_eq!(invader.pos.col, max_col - 1);
    }

    #[test]
    fn test_invader_bounces_at_left_edge() {
        let mut game = game(30, 20);
        game.invaders_mut()[0] = Invader {
            pos: Cell { row: 3, col: 0 },
            direction: -1,
        };

        game.update_state();

        assert_eq!(game.invaders()[0].direction, 1);
        assert_eq!(game.invaders()[0].pos.col, 1);
    }

    #[test]
    fn test_invaders_stay_in_bounds_over_many_ticks() {
        let mut game = game(17, 10);
        for _ in 0..200 {
            game.update_state();
            for invader in game.invaders() {
                assert!(invader.pos.col >= 0);
                assert!(invader.pos.col <= 17 - INVADER_WIDTH);
            }
        }
    }

    #[test]
    fn test_pending_move_applies_once_on_tick() {
        let mut game = game(30, 20);
        game.handle_input(key(KeyCode::Left));
        assert_eq!(game.player().col, 15, "input alone must not move the player");

        game.update_state();
        assert_eq!(game.player().col, 14);

        game.update_state();
        assert_eq!(game.player().col, 14, "move is consumed by the tick");

        game.handle_input(key(KeyCode::Right));
        game.handle_input(key(KeyCode::Down));
        game.update_state();
        assert_eq!(game.player().col, 14, "down cancels the pending move");
    }

    #[test]
    fn test_player_is_clamped_to_viewport() {
        let mut game = game(4, 10);
        for _ in 0..10 {
            game.handle_input(key(KeyCode::Right));
            game.update_state();
        }
        assert_eq!(game.player().col, 3);
    }

    #[test]
    fn test_shot_lifecycle() {
        let mut game = game(30, 8);
        game.handle_input(key(KeyCode::Up));
        assert!(game.shot_pending());

        game.update_state();
        assert!(!game.shot_pending());
        assert_eq!(game.shots(), &[Cell { row: 5, col: 15 }]);

        game.update_state();
        assert_eq!(game.shots(), &[Cell { row: 4, col: 15 }]);

        for _ in 0..4 {
            game.update_state();
        }
        assert_eq!(game.shots(), &[Cell { row: 0, col: 15 }]);

        game.update_state();
        assert!(game.shots().is_empty(), "shot leaves through the top edge");
    }

    #[test]
    fn test_relayout_clamps_positions() {
        let mut game = game(40, 20);
        game.relayout(Rect::new(0, 0, 10, 6));

        assert_eq!(game.player(), Cell { row: 4, col: 9 });
        assert!(game
            .invaders()
            .iter()
            .all(|i| i.pos.col <= 10 - INVADER_WIDTH));
    }

    #[test]
    fn test_render_draws_sprites() {
        let game = game(20, 8);
        let backend = TestBackend::new(20, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| game.render(frame, Rect::new(0, 0, 20, 8)))
            .unwrap();

        let buffer = terminal.backend().buffer();
        // Invader at col 0: " ██ " on row 3, "█  █" on row 4
        assert_eq!(buffer[(1, 3)].symbol(), "█");
        assert_eq!(buffer[(0, 4)].symbol(), "█");
        assert_eq!(buffer[(0, 3)].symbol(), " ");
        // Player at row 6 and 7, col 10
        assert_eq!(buffer[(10, 6)].symbol(), "█");
        assert_eq!(buffer[(10, 7)].symbol(), "█");
    }

    #[test]
    fn test_tiny_viewport_does_not_panic() {
        let mut game = game(2, 1);
        for _ in 0..5 {
            game.handle_input(key(KeyCode::Up));
            game.update_state();
        }
        let backend = TestBackend::new(2, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| game.render(frame, Rect::new(0, 0, 2, 1)))
            .unwrap();
    }
}

//! Word guessing game.
//!
//! Letters are typed into the current guess; Enter submits it and the guess
//! is judged on the next tick. Each letter is marked as in the right place,
//! somewhere else in the word, or absent. A round ends when the word is found
//! or the guesses run out, and its score goes to the score log.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::words::WordList;
use super::MiniGame;

/// Judgement for one letter of a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterScore {
    /// Same letter at the same position in the target
    Exact,
    /// Letter occurs somewhere in the target
    Present,
    Absent,
}

/// Classify each letter of `guess` against `target`.
///
/// Position `i` is `Exact` when both words have the same letter there,
/// otherwise `Present` when the letter occurs anywhere in the target. Repeated
/// letters are not counted off against each other.
pub fn classify(guess: &str, target: &str) -> Vec<LetterScore> {
    let target: Vec<char> = target.chars().collect();
    guess
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if target.get(i) == Some(&c) {
                LetterScore::Exact
            } else if target.contains(&c) {
                LetterScore::Present
            } else {
                LetterScore::Absent
            }
        })
        .collect()
}

/// A submitted guess with its per-letter judgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredGuess {
    pub word: String,
    pub letters: Vec<LetterScore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundScore {
    /// Found after this many guesses
    Solved(usize),
    Fail,
}

impl std::fmt::Display for RoundScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundScore::Solved(guesses) => write!(f, "{guesses}"),
            RoundScore::Fail => write!(f, "Fail"),
        }
    }
}

/// One line of the score log: `<word>: <score>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub word: String,
    pub score: RoundScore,
}

impl std::fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.word, self.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Editing,
    /// Enter was pressed; the guess is judged on the next tick
    Pending,
}

#[derive(Debug)]
pub struct WordGuess {
    words: WordList,
    rng: StdRng,
    max_guesses: Option<usize>,
    target: String,
    target_index: Option<usize>,
    guesses: Vec<ScoredGuess>,
    input: Vec<char>,
    cursor: usize,
    phase: Phase,
    score_log: Vec<ScoreRecord>,
    rounds: usize,
}

impl WordGuess {
    /// `max_guesses` of `None` allows twice the target length per round.
    pub fn new(words: WordList, max_guesses: Option<usize>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut game = Self {
            words,
            rng,
            max_guesses,
            target: String::new(),
            target_index: None,
            guesses: Vec::new(),
            input: Vec::new(),
            cursor: 0,
            phase: Phase::Editing,
            score_log: Vec::new(),
            rounds: 0,
        };
        game.start_round();
        game
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn guesses(&self) -> &[ScoredGuess] {
        &self.guesses
    }

    pub fn input(&self) -> String {
        self.input.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }

    pub fn score_log(&self) -> &[ScoreRecord] {
        &self.score_log
    }

    /// Rounds started so far, including the current one.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn max_guesses(&self) -> usize {
        self.max_guesses
            .unwrap_or(2 * self.target_len())
            .max(1)
    }

    fn target_len(&self) -> usize {
        self.target.chars().count()
    }

    /// Pick a new target, different from the previous one when possible.
    fn start_round(&mut self) {
        let count = self.words.len();
        let index = match (count, self.target_index) {
            (0, _) => None,
            (1, _) | (_, None) => Some(self.rng.random_range(0..count)),
            (_, Some(previous)) => {
                let index = self.rng.random_range(0..count - 1);
                Some(if index >= previous { index + 1 } else { index })
            }
        };

        self.target_index = index;
        self.target = index
            .and_then(|i| self.words.get(i))
            .unwrap_or_default()
            .to_string();
        if self.target.is_empty() {
            tracing::warn!("Word list is empty, word game has nothing to guess");
        }
        self.guesses.clear();
        self.clear_input();
        self.phase = Phase::Editing;
        self.rounds += 1;
        tracing::debug!("Word game round {} started", self.rounds);
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    fn finish_round(&mut self, score: RoundScore) {
        let record = ScoreRecord {
            word: self.target.clone(),
            score,
        };
        tracing::info!("Word game round over: {}", record);
        self.score_log.push(record);
        self.start_round();
    }

    fn evaluate_pending(&mut self) {
        self.phase = Phase::Editing;
        let guess = self.input();

        if guess.chars().count() != self.target_len() {
            tracing::debug!("Rejected guess {:?}: wrong length", guess);
            return;
        }
        if !self.words.contains(&guess) {
            tracing::debug!("Rejected guess {:?}: not a known word", guess);
            self.clear_input();
            return;
        }

        let letters = classify(&guess, &self.target);
        let solved = guess == self.target;
        self.guesses.push(ScoredGuess {
            word: guess,
            letters,
        });
        self.clear_input();

        if solved {
            self.finish_round(RoundScore::Solved(self.guesses.len()));
        } else if self.guesses.len() >= self.max_guesses() {
            self.finish_round(RoundScore::Fail);
        }
    }

    fn insert_letter(&mut self, c: char) {
        if self.input.len() < self.target_len() {
            self.input.insert(self.cursor, c.to_ascii_lowercase());
            self.cursor += 1;
        }
    }

    fn letter_style(score: LetterScore) -> Style {
        match score {
            LetterScore::Exact => Style::default().fg(Color::Black).bg(Color::Green),
            LetterScore::Present => Style::default().fg(Color::Black).bg(Color::Yellow),
            LetterScore::Absent => Style::default().fg(Color::Gray),
        }
    }

    fn guess_line(guess: &ScoredGuess) -> Line<'static> {
        let spans: Vec<Span> = guess
            .word
            .chars()
            .zip(&guess.letters)
            .map(|(c, score)| {
                Span::styled(
                    format!(" {} ", c.to_ascii_uppercase()),
                    Self::letter_style(*score),
                )
            })
            .collect();
        Line::from(spans)
    }

    fn input_line(&self) -> Line<'static> {
        let mut spans: Vec<Span> = (0..self.target_len())
            .map(|i| {
                let symbol = self
                    .input
                    .get(i)
                    .map(|c| c.to_ascii_uppercase())
                    .unwrap_or('_');
                let style = if i == self.cursor && self.phase == Phase::Editing {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                Span::styled(format!(" {} ", symbol), style)
            })
            .collect();
        if self.phase == Phase::Pending {
            spans.push(Span::raw(" ↵"));
        }
        Line::from(spans)
    }

    fn empty_line(&self) -> Line<'static> {
        Line::styled(
            " _ ".repeat(self.target_len()),
            Style::default().fg(Color::DarkGray),
        )
    }
}

impl MiniGame for WordGuess {
    fn name(&self) -> &'static str {
        "Words"
    }

    fn captures_text(&self) -> bool {
        true
    }

    fn setup(&mut self, _area: Rect) {}

    fn relayout(&mut self, _area: Rect) {}

    fn handle_input(&mut self, key: KeyEvent) {
        if self.phase == Phase::Pending {
            return;
        }
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return;
        }

        match key.code {
            KeyCode::Char(c) if c.is_ascii_alphabetic() => self.insert_letter(c),
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.input.remove(self.cursor);
            }
            KeyCode::Delete if self.cursor < self.input.len() => {
                self.input.remove(self.cursor);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.input.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.len(),
            KeyCode::Enter => self.phase = Phase::Pending,
            _ => {}
        }
    }

    fn update_state(&mut self) {
        if self.phase == Phase::Pending {
            self.evaluate_pending();
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        // Slots past the bottom of the panel would never be seen
        let slots = self.max_guesses().min(area.height as usize);
        let mut lines: Vec<Line> = Vec::with_capacity(slots.saturating_add(2));

        for slot in 0..slots {
            let line = match self.guesses.get(slot) {
                Some(guess) => Self::guess_line(guess),
                None if slot == self.guesses.len() => self.input_line(),
                None => self.empty_line(),
            };
            lines.push(line);
        }

        lines.push(Line::default());
        lines.push(Line::styled(
            "Scores",
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ));

        let room = (area.height as usize).saturating_sub(lines.len());
        let skip = self.score_log.len().saturating_sub(room);
        lines.extend(
            self.score_log
                .iter()
                .skip(skip)
                .map(|record| Line::raw(record.to_string())),
        );

        frame.render_widget(Paragraph::new(lines), area);
    }
}

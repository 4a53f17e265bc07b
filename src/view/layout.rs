use ratatui::layout::{Constraint, Layout, Rect};

/// Areas for the game and process panels.
///
/// Side by side puts the game on the left. Stacked puts the game on top.
/// Both panels are bordered, so the usable areas are one cell in from each
/// edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub game: Rect,
    pub process: Rect,
}

impl PanelLayout {
    pub fn compute(area: Rect, horizontal_split: bool) -> Self {
        let halves = [Constraint::Percentage(50), Constraint::Percentage(50)];
        let chunks = if horizontal_split {
            Layout::vertical(halves).split(area)
        } else {
            Layout::horizontal(halves).split(area)
        };
        Self {
            game: chunks[0],
            process: chunks[1],
        }
    }

    /// Area inside the game panel border.
    pub fn game_inner(&self) -> Rect {
        inner(self.game)
    }

    /// Area inside the process panel border.
    pub fn process_inner(&self) -> Rect {
        inner(self.process)
    }

    /// Output rows visible under the process status line.
    pub fn output_rows(&self) -> usize {
        self.process_inner().height.saturating_sub(1) as usize
    }
}

fn inner(area: Rect) -> Rect {
    Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    )
}

//! Panel layout and the command output panel.

pub mod layout;
pub mod process_panel;

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

pub use layout::PanelLayout;
pub use process_panel::render_process_panel;

pub const BORDER_COLOR: Color = Color::DarkGray;

/// Draw a titled border around `area` and return the inner area.
pub fn framed(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_COLOR));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Draw the command status line and the most recent output lines.
///
/// `area` is the inner panel area. The first row holds the centered status,
/// the rest holds `lines`, each cut to the panel width.
pub fn render_process_panel(frame: &mut Frame, area: Rect, running: bool, lines: &[String]) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let status = if running {
        "Process: Running..."
    } else {
        "Process: Finished"
    };
    let status_area = Rect::new(area.x, area.y, area.width, 1);
    frame.render_widget(
        Paragraph::new(Line::styled(
            status,
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ))
        .alignment(Alignment::Center),
        status_area,
    );

    let rows = area.height.saturating_sub(1) as usize;
    let width = area.width as usize;
    let skip = lines.len().saturating_sub(rows);
    let visible: Vec<Line> = lines
        .iter()
        .skip(skip)
        .map(|line| Line::raw(line.chars().take(width).collect::<String>()))
        .collect();

    let output_area = Rect::new(area.x, area.y + 1, area.width, rows as u16);
    frame.render_widget(Paragraph::new(visible), output_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(width: u16, height: u16, running: bool, lines: &[String]) -> Vec<String> {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                render_process_panel(frame, Rect::new(0, 0, width, height), running, lines)
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn test_status_line_is_centered() {
        let rows = render(23, 2, true, &[]);
        assert_eq!(rows[0], "  Process: Running...  ");

        let rows = render(21, 2, false, &[]);
        assert_eq!(rows[0], "  Process: Finished  ");
    }

    #[test]
    fn test_lines_truncated_to_width() {
        let lines = vec!["short".to_string(), "a much longer line".to_string()];
        let rows = render(8, 3, true, &lines);
        assert_eq!(rows[1], "short   ");
        assert_eq!(rows[2], "a much l");
    }

    #[test]
    fn test_only_newest_lines_fit() {
        let lines: Vec<String> = (0..5).map(|i| format!("line {i}")).collect();
        let rows = render(10, 3, false, &lines);
        assert_eq!(rows[1], "line 3    ");
        assert_eq!(rows[2], "line 4    ");
    }
}

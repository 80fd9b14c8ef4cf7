//! Terminal UI rendering with ratatui

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tetrad::{BlockColor, GameState, Snapshot, Status};

const FILLED: &str = "██";
const EMPTY: &str = "  ";

/// Width of the stats panel to the right of the board
const STATS_WIDTH: u16 = 16;

/// Map a block color to a terminal color
fn terminal_color(color: BlockColor) -> Color {
    match color {
        BlockColor::Red => Color::Red,
        BlockColor::Gray => Color::Gray,
        BlockColor::Cyan => Color::Cyan,
        BlockColor::Yellow => Color::Yellow,
        BlockColor::Magenta => Color::Magenta,
        BlockColor::Blue => Color::Blue,
        BlockColor::Green => Color::Green,
    }
}

/// Render the board, stats and any overlay
pub fn render_game(frame: &mut Frame, snapshot: &Snapshot) {
    let area = frame.area();

    // Two terminal columns per cell, plus borders
    let board_width = (snapshot.columns as u16).saturating_mul(2).saturating_add(2);
    let board_height = (snapshot.rows as u16).saturating_add(2);
    let game_area = center_rect(area, board_width + STATS_WIDTH, board_height);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width), Constraint::Length(STATS_WIDTH)])
        .split(game_area);

    render_board(frame, layout[0], snapshot);
    render_stats(frame, layout[1], &snapshot.status);

    match snapshot.status.state {
        GameState::Paused => render_overlay(frame, area, "PAUSED", "Press P to resume"),
        GameState::GameOver => render_overlay(frame, area, "GAME OVER", "Press any key"),
        GameState::Playing => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn render_board(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let block = Block::default()
        .title(" TETRAD ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = (0..snapshot.rows)
        .map(|row| {
            let spans: Vec<Span> = (0..snapshot.columns)
                .map(|col| match snapshot.color_at(row, col) {
                    Some(color) => Span::styled(FILLED, Style::default().fg(terminal_color(color))),
                    None => Span::raw(EMPTY),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, status: &Status) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));

    let mut lines = vec![
        label("SCORE"),
        Line::from(Span::styled(
            status.points.to_string(),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        label("LEVEL"),
        Line::from(Span::styled(
            status.level.to_string(),
            Style::default().fg(Color::Cyan),
        )),
        Line::raw(""),
        label("LINES"),
        Line::from(Span::styled(
            status.lines.to_string(),
            Style::default().fg(Color::Green),
        )),
    ];

    let callout = match status.last_cleared {
        0 => None,
        1 => Some("Single"),
        2 => Some("Double"),
        3 => Some("Triple"),
        _ => Some("Tetris"),
    };
    if let Some(text) = callout {
        lines.push(Line::raw(""));
        lines.push(Line::styled(text, Style::default().fg(Color::Magenta).bold()));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_area = center_rect(area, 24, 5);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

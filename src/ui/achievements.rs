use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::achievements::{Achievement, ACHIEVEMENTS};
use crate::app::App;

pub fn present_row(achievement: &Achievement, unlocked: bool) -> Row<'static> {
    let (icon, status, style) = if unlocked {
        (achievement.icon, "unlocked", Style::default().fg(Color::Green))
    } else {
        ("🔒", "locked", Style::default().add_modifier(Modifier::DIM))
    };

    Row::new(vec![
        Cell::from(icon),
        Cell::from(achievement.name),
        Cell::from(achievement.description),
        Cell::from(status),
    ])
    .style(style)
}

/// Render the Achievements screen
pub fn render_achievements(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // List
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let tracker = app.achievements();
    let title = Paragraph::new(format!(
        "Unlocked {}/{} ({}%)",
        tracker.unlocked_count(),
        ACHIEVEMENTS.len(),
        tracker.unlock_percentage()
    ))
    .block(Block::default().borders(Borders::ALL).title("Achievements"))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let all = tracker.all_with_status();

    // borders
    let table_height = chunks[1].height.saturating_sub(2) as usize;
    let max_scroll = all.len().saturating_sub(table_height);
    if app.scroll > max_scroll {
        app.scroll = max_scroll;
    }

    let visible_rows: Vec<Row> = all
        .iter()
        .skip(app.scroll)
        .take(table_height)
        .map(|&(achievement, unlocked)| present_row(achievement, unlocked))
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(18),
        Constraint::Min(20),
        Constraint::Length(8),
    ];

    let table = Table::new(visible_rows, widths)
        .block(Block::default().borders(Borders::ALL))
        .column_spacing(1);
    f.render_widget(table, chunks[1]);

    let instructions =
        Paragraph::new("(↑/↓) scroll  (Home) top  (h) history  (b/esc) back  (r) retry")
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
    f.render_widget(instructions, chunks[2]);
}

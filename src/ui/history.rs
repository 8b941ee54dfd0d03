use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::stats::GameRecord;
use crate::summary::Statistics;
use crate::ui::charting::{render_score_chart, CHART_GAMES};

/// Games listed in the history table.
pub const HISTORY_ROWS: usize = 20;

const CATEGORY_WIDTH: usize = 14;

/// Cut `text` to `width` terminal columns, marking the cut with an ellipsis.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Pure presenter for a single history row
pub fn present_row(record: &GameRecord) -> Row<'static> {
    let accuracy_color = if record.accuracy >= 90 {
        Color::Green
    } else if record.accuracy >= 70 {
        Color::Yellow
    } else {
        Color::Red
    };

    Row::new(vec![
        Cell::from(record.timestamp.format("%m-%d %H:%M").to_string()),
        Cell::from(record.mode.label()),
        Cell::from(fit(
            record.category_name.as_deref().unwrap_or("All"),
            CATEGORY_WIDTH,
        )),
        Cell::from(record.score.to_string()),
        Cell::from(format!("{}%", record.accuracy)).style(Style::default().fg(accuracy_color)),
        Cell::from(record.max_combo.to_string()),
        Cell::from(record.rank.clone()),
    ])
}

fn summary_lines(stats: &Statistics) -> Vec<Line<'static>> {
    vec![
        Line::from(format!(
            "Games {} · Avg {} · Best {} ({}) · Accuracy {}% · Speed {:.2}/s",
            stats.total_games,
            stats.average_score,
            stats.best_score,
            stats.best_rank.title,
            stats.average_accuracy,
            stats.average_speed
        )),
        Line::from(format!(
            "Correct {} · Wrong {} · Max combo {} · Favourite {}",
            stats.total_correct,
            stats.total_wrong,
            stats.max_combo,
            stats.favourite_category.as_deref().unwrap_or("-")
        )),
    ]
}

/// Render the History screen
pub fn render_history(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(4),      // Summary
            Constraint::Percentage(35), // Chart
            Constraint::Min(0),         // Table
            Constraint::Length(2),      // Instructions
        ])
        .split(area);

    let summary = Paragraph::new(summary_lines(&app.statistics()))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(summary, chunks[0]);

    if app.history().is_empty() {
        let no_data = Paragraph::new("No games played yet.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[2]);
    } else {
        render_score_chart(
            &app.history()[..app.history().len().min(CHART_GAMES)],
            chunks[1],
            f.buffer_mut(),
        );

        // borders + header
        let table_height = chunks[2].height.saturating_sub(3) as usize;
        let total_rows = app.history().len().min(HISTORY_ROWS);
        let max_scroll = total_rows.saturating_sub(table_height);
        if app.scroll > max_scroll {
            app.scroll = max_scroll;
        }

        let header = Row::new(vec![
            Cell::from("Date"),
            Cell::from("Mode"),
            Cell::from("Category"),
            Cell::from("Score"),
            Cell::from("Acc"),
            Cell::from("Combo"),
            Cell::from("Rank"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let visible_rows: Vec<Row> = app
            .history()
            .iter()
            .take(HISTORY_ROWS)
            .skip(app.scroll)
            .take(table_height)
            .map(present_row)
            .collect();

        let widths = [
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(CATEGORY_WIDTH as u16),
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(10),
        ];

        let table = Table::new(visible_rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Latest {HISTORY_ROWS} games")),
            )
            .column_spacing(1);

        f.render_widget(table, chunks[2]);
    }

    let instructions =
        Paragraph::new("(↑/↓) scroll  (Home) top  (a) achievements  (b/esc) back  (r) retry")
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
    f.render_widget(instructions, chunks[3]);
}

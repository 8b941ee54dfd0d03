use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Chart, Dataset, GraphType, Widget},
};

use crate::stats::GameRecord;

/// Games shown in score charts.
pub const CHART_GAMES: usize = 20;

/// Scores of the most recent `limit` games, oldest first, numbered from 1.
pub fn score_points(history: &[GameRecord], limit: usize) -> Vec<(f64, f64)> {
    history
        .iter()
        .take(limit)
        .rev()
        .enumerate()
        .map(|(i, r)| ((i + 1) as f64, f64::from(r.score)))
        .collect()
}

/// Compute X (games) and Y (score) bounds for the score chart
pub fn compute_chart_params(coords: &[(f64, f64)]) -> (f64, f64) {
    let highest_score = coords.iter().map(|&(_, score)| score).fold(0.0, f64::max);

    let games = coords.last().map_or(1.0, |&(x, _)| x).max(1.0);

    // Keep a flat line of zeros visible.
    (games, highest_score.round().max(10.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

pub fn render_score_chart(history: &[GameRecord], area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let magenta_style = Style::default().fg(Color::Magenta);

    let coords = score_points(history, CHART_GAMES);
    let (games, highest_score) = compute_chart_params(&coords);

    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&coords)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("games")
                .bounds([1.0, games])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(format_label(games), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("score")
                .bounds([0.0, highest_score])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format_label(highest_score), bold_style),
                ]),
        )
        .render(area, buf);
}

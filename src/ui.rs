pub mod achievements;
pub mod charting;
pub mod history;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
    Frame,
};

use crate::app::{App, AppState, FeedbackKind};
use crate::session::Limit;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Draw whatever screen the app is on.
pub fn draw(app: &mut App, f: &mut Frame) {
    screen::current_screen(app.state).render(app, f);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Playing => render_playing(self, area, buf),
            _ => render_results(self, area, buf),
        }
    }
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let game = &app.game;
    let state = game.state();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // status
            Constraint::Min(0),
            Constraint::Length(1), // word
            Constraint::Length(1), // reading
            Constraint::Length(1), // romaji guide
            Constraint::Length(1), // hint
            Constraint::Length(1), // padding
            Constraint::Length(1), // input
            Constraint::Length(1), // feedback
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let limit = match (state.remaining, game.mistakes_left()) {
        (Limit::Finite(secs), _) => format!("{secs}s left"),
        (_, Limit::Finite(lives)) => format!("{lives} mistakes left"),
        _ => String::new(),
    };
    let (answered, pool) = game.progress();
    Paragraph::new(Span::styled(
        format!(
            "{} · {} · score {} · combo {} · {}/{} · {}",
            app.mode().label(),
            app.category_name(),
            state.score,
            state.combo,
            answered,
            pool,
            limit
        ),
        dim_bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let Some(word) = game.current_word() else {
        Paragraph::new(Span::styled("No words to practise", italic_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
        return;
    };

    Paragraph::new(Span::styled(word.word.as_str(), bold_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    Paragraph::new(Span::styled(word.reading.as_str(), dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    if app.show_romaji {
        let answer = game.canonical_answer().unwrap_or_default();
        let typed: Vec<char> = app.input.to_lowercase().chars().collect();

        let spans: Vec<Span> = answer
            .chars()
            .enumerate()
            .map(|(idx, expected)| match typed.get(idx) {
                Some(&c) if c == expected => Span::styled(expected.to_string(), green_bold_style),
                Some(_) => Span::styled(expected.to_string(), red_bold_style),
                None if idx == typed.len() => {
                    Span::styled(expected.to_string(), underlined_dim_bold_style)
                }
                None => Span::styled(expected.to_string(), dim_bold_style),
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    if let Some(hint) = &word.hint {
        Paragraph::new(Span::styled(hint.as_str(), italic_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[5], buf);
    }

    Paragraph::new(Line::from(vec![
        Span::styled("> ", dim_bold_style),
        Span::styled(app.input.as_str(), bold_style),
        Span::styled("_", underlined_dim_bold_style),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[7], buf);

    if let Some(feedback) = &app.feedback {
        let line = match &feedback.kind {
            FeedbackKind::Correct { points, milestone } => {
                let mut text = format!("✓ {}  +{}", feedback.word, points);
                if let Some(m) = milestone {
                    text.push_str(&format!("  {} combo {} (x{})", m.combo, m.label, m.multiplier));
                }
                Span::styled(text, green_bold_style)
            }
            FeedbackKind::Incorrect { answer } => {
                Span::styled(format!("✗ {}  = {}", feedback.word, answer), red_bold_style)
            }
        };
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(chunks[8], buf);
    }

    Paragraph::new(Span::styled("(enter) submit / (esc) end session", italic_style))
        .render(chunks[10], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let yellow_bold_style = Style::default().patch(bold_style).fg(Color::Yellow);

    let Some(outcome) = &app.outcome else {
        Paragraph::new(Span::styled("No results yet", italic_style))
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    };
    let record = &outcome.record;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // rank
            Constraint::Length(1), // stats
            Constraint::Length(1), // details
            Constraint::Length(1), // padding
            Constraint::Length(2), // achievements
            Constraint::Min(1),    // chart
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let mut rank_spans = vec![Span::styled(
        format!(
            "{}  {}",
            outcome.rank.rank.title,
            "★".repeat(usize::from(outcome.rank.rank.level))
        ),
        yellow_bold_style,
    )];
    for badge in &outcome.rank.badges {
        rank_spans.push(Span::styled(format!("  [{badge}]"), italic_style));
    }
    Paragraph::new(Line::from(rank_spans))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} pts   {} correct   {}% acc   {} max combo",
            record.score, record.correct, record.accuracy, record.max_combo
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} · {} · {}s · {:.2}/s",
            record.mode.label(),
            app.category_name(),
            record.elapsed_secs,
            record.average_speed
        ),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    if !outcome.new_achievements.is_empty() {
        let unlocked = outcome
            .new_achievements
            .iter()
            .map(|a| format!("{} {}", a.icon, a.name))
            .collect::<Vec<_>>()
            .join("  ");
        Paragraph::new(Span::styled(
            format!("Unlocked: {unlocked}"),
            Style::default().fg(Color::Green),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);
    }

    charting::render_score_chart(app.history(), chunks[5], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (h)istory / (a)chievements / (esc)ape",
        italic_style,
    ))
    .render(chunks[7], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::Config;
    use crate::game::Game;
    use crate::session::GameMode;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    const SNACKS: &str = r#"[
        {
            "id": "snacks",
            "name": "Snacks",
            "icon": "🍡",
            "words": [
                { "word": "団子", "reading": "だんご", "hint": "sweet rice dumpling" }
            ]
        }
    ]"#;

    fn create_test_app(show_romaji: bool) -> App {
        let config = Config {
            mode: GameMode::Survival,
            show_romaji,
            ..Config::default()
        };
        let game = Game::new().with_rng(3);
        App::with_game(Catalog::from_json(SNACKS).unwrap(), &config, None, game).unwrap()
    }

    fn render(app: &App) -> String {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn test_playing_screen_shows_guide_and_hint() {
        let mut app = create_test_app(true);
        type_str(&mut app, "da");

        let rendered = render(&app);

        assert!(rendered.contains("dango"));
        assert!(rendered.contains("sweet rice dumpling"));
        assert!(rendered.contains("> da_"));
        assert!(rendered.contains("1 mistakes left"));
        assert!(rendered.contains("(enter) submit"));
    }

    #[test]
    fn test_playing_screen_without_romaji() {
        let app = create_test_app(false);

        let rendered = render(&app);

        assert!(!rendered.contains("dango"));
        assert!(rendered.contains("Survival"));
    }

    #[test]
    fn test_results_screen() {
        let mut app = create_test_app(true);
        type_str(&mut app, "dango");
        type_str(&mut app, "zzzzz");
        assert_eq!(app.state, AppState::Results);

        let rendered = render(&app);

        assert!(rendered.contains("Beginner"));
        assert!(rendered.contains("50% acc"));
        assert!(rendered.contains("First Steps"));
        assert!(rendered.contains("(r)etry / (h)istory / (a)chievements / (esc)ape"));
    }

    #[test]
    fn test_render_small_area() {
        let app = create_test_app(true);
        let area = Rect::new(0, 0, 10, 5);
        let mut buffer = Buffer::empty(area);

        (&app).render(area, &mut buffer);
    }

    #[test]
    fn test_draw_every_state() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut app = create_test_app(true);
        type_str(&mut app, "zzzzz");
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        for state in [
            AppState::Results,
            AppState::History,
            AppState::Achievements,
            AppState::Playing,
        ] {
            app.state = state;
            terminal.draw(|f| draw(&mut app, f)).unwrap();
        }
    }
}

use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use kanatype::app::{App, AppState};
use kanatype::catalog::Catalog;
use kanatype::config::Config;
use kanatype::game::{Game, ManualClock};
use kanatype::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use kanatype::session::GameMode;
use kanatype::stats::{HistoryStore, StatsDb};

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn app_for(mode: GameMode, category: &str, store: Option<StatsDb>) -> App {
    let config = Config {
        mode,
        category: Some(category.to_string()),
        ..Config::default()
    };
    let game = Game::new().with_rng(11).with_clock(ManualClock::new());
    App::with_game(Catalog::embedded().unwrap(), &config, store, game).unwrap()
}

/// Pump events through the runner the way the binary does, feeding a fixed
/// tick to the app after every step.
fn drive(app: &mut App, runner: &Runner<TestEventSource, FixedTicker>, steps: u32) {
    for _ in 0..steps {
        if let AppEvent::Key(key) = runner.step() {
            app.on_key(key);
        }
        app.on_tick(runner.tick_interval());
        if app.should_quit() {
            break;
        }
    }
}

// Headless run of a full survival game without a TTY
#[test]
fn headless_survival_flow_records_result() {
    let mut app = app_for(
        GameMode::Survival,
        "animals",
        Some(StatsDb::open_in_memory().unwrap()),
    );
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    // Answer three words correctly, reading each target as it comes up.
    for _ in 0..3 {
        let answer = app.game.canonical_answer().unwrap();
        for c in answer.chars() {
            tx.send(key(c)).unwrap();
        }
        drive(&mut app, &runner, answer.len() as u32);
    }
    assert_eq!(app.game.state().correct, 3);
    assert_eq!(app.game.state().combo, 3);
    assert_eq!(app.state, AppState::Playing);

    // A single miss ends survival.
    for _ in 0..30 {
        tx.send(key('q')).unwrap();
    }
    drive(&mut app, &runner, 30);

    assert_eq!(app.state, AppState::Results);
    let outcome = app.outcome.as_ref().unwrap();
    assert_eq!(outcome.record.correct, 3);
    assert_eq!(outcome.record.wrong, 1);
    assert_eq!(outcome.record.accuracy, 75);
    assert_eq!(outcome.record.category_id.as_deref(), Some("animals"));
    assert_eq!(app.history().len(), 1);

    // esc from results quits
    tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
        .unwrap();
    drive(&mut app, &runner, 5);
    assert!(app.should_quit());
}

#[test]
fn headless_quick_game_finishes_by_time() {
    let mut app = app_for(GameMode::Quick, "food", None);
    let (tx, rx) = mpsc::channel();
    // A closed channel makes every step an immediate tick.
    drop(tx);
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(100)),
    );

    drive(&mut app, &runner, 299);
    assert_eq!(app.state, AppState::Playing);
    assert_eq!(app.game.state().remaining.value(), Some(1));

    drive(&mut app, &runner, 1);
    assert_eq!(app.state, AppState::Results);
    let record = &app.outcome.as_ref().unwrap().record;
    assert_eq!(record.elapsed_secs, 30);
    assert_eq!(record.score, 0);
    assert_eq!(record.accuracy, 0);
}

#[test]
fn headless_retry_keeps_history_across_games() {
    let db = StatsDb::open_in_memory().unwrap();
    let mut app = app_for(GameMode::Perfect, "travel", Some(db));
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    for _ in 0..2 {
        // Three explicit forfeits end a perfect game.
        for _ in 0..3 {
            tx.send(key('x')).unwrap();
            tx.send(AppEvent::Key(KeyEvent::new(
                KeyCode::Enter,
                KeyModifiers::NONE,
            )))
            .unwrap();
        }
        drive(&mut app, &runner, 6);
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.outcome.as_ref().unwrap().record.wrong, 3);

        tx.send(key('r')).unwrap();
        drive(&mut app, &runner, 1);
        assert_eq!(app.state, AppState::Playing);
    }

    assert_eq!(app.history().len(), 2);
    assert!(app.history()[0].id > app.history()[1].id);
    assert!(app.achievements().is_unlocked("first_play"));
}

#[test]
fn headless_history_screen_navigation() {
    let mut app = app_for(GameMode::Survival, "nature", None);
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    tx.send(key('x')).unwrap();
    tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
        .unwrap();
    tx.send(key('h')).unwrap();
    drive(&mut app, &runner, 3);
    assert_eq!(app.state, AppState::History);

    tx.send(key('a')).unwrap();
    drive(&mut app, &runner, 1);
    assert_eq!(app.state, AppState::Achievements);

    tx.send(key('b')).unwrap();
    drive(&mut app, &runner, 1);
    assert_eq!(app.state, AppState::Results);
}

#[test]
fn stored_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.db");

    {
        let mut app = app_for(
            GameMode::Survival,
            "school",
            Some(StatsDb::open(&path).unwrap()),
        );
        app.on_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.state, AppState::Results);
    }

    let db = StatsDb::open(&path).unwrap();
    let history = db.read_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].category_name.as_deref(), Some("School"));

    let app = app_for(GameMode::Survival, "school", Some(db));
    assert_eq!(app.history().len(), 1);
    assert!(app.achievements().is_unlocked("first_play"));
}

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use kanatype::catalog::Catalog;
use kanatype::game::{Game, ManualClock, Phase, Verdict};
use kanatype::session::{GameMode, SessionConfig, SessionResult};

// End-to-end engine sessions against the embedded vocabulary.

fn start(mode: GameMode, category: &str, seed: u64) -> (Game, ManualClock) {
    let catalog = Catalog::embedded().unwrap();
    let clock = ManualClock::new();
    let mut game = Game::new().with_rng(seed).with_clock(clock.clone());
    game.start(SessionConfig::from_selection(mode, &catalog, Some(category)).unwrap());
    (game, clock)
}

/// Type the current answer after `think` and move on.
fn answer(game: &mut Game, clock: &ManualClock, think: Duration) -> Verdict {
    clock.advance(think);
    let typed = game.canonical_answer().unwrap();
    let verdict = game.evaluate_input(&typed);
    if game.is_active() {
        game.select_next_word();
    }
    verdict
}

fn miss(game: &mut Game) -> Verdict {
    let verdict = game.submit("x");
    if game.is_active() {
        game.select_next_word();
    }
    verdict
}

#[test]
fn every_word_appears_once_per_rotation() {
    let (mut game, clock) = start(GameMode::Perfect, "food", 42);

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for _ in 0..10 {
        let word = game.current_word().unwrap().word.clone();
        assert!(seen.insert(word.clone()), "{word} repeated within a rotation");
        order.push(word);
        answer(&mut game, &clock, Duration::from_secs(1));
    }

    assert_eq!(seen.len(), 10);
    // The next rotation does not open with the word that closed the last one.
    assert_ne!(Some(&game.current_word().unwrap().word), order.last());
}

#[test]
fn slow_streak_scores_combo_multipliers() {
    let (mut game, clock) = start(GameMode::Perfect, "animals", 1);

    // Ten seconds per word keeps every answer below the speed bonus.
    for _ in 0..10 {
        assert!(matches!(
            answer(&mut game, &clock, Duration::from_secs(10)),
            Verdict::Correct { .. }
        ));
    }

    // 12 + 14 + 16 + 18 + 24 + 26 + 29 + 31 + 34 + 45
    assert_eq!(game.state().score, 249);
    assert_eq!(game.state().combo, 10);
    assert_eq!(game.state().max_combo, 10);
}

#[test]
fn perfect_mode_ends_on_third_mistake() {
    let (mut game, clock) = start(GameMode::Perfect, "nature", 9);

    answer(&mut game, &clock, Duration::from_secs(1));
    answer(&mut game, &clock, Duration::from_secs(1));
    miss(&mut game);
    assert_eq!(game.state().combo, 0);
    answer(&mut game, &clock, Duration::from_secs(1));
    miss(&mut game);
    assert!(game.is_active());
    miss(&mut game);

    assert_eq!(game.phase(), Phase::Ended);
    let result = game.result().unwrap().clone();
    assert_eq!(result.correct, 3);
    assert_eq!(result.wrong, 3);
    assert_eq!(result.accuracy, 50);
    assert_eq!(result.max_combo, 2);
    assert_eq!(result.elapsed_secs, 0);
    assert_eq!(result.average_speed, 0.0);

    // Nothing moves once the game is over.
    assert_eq!(game.evaluate_input("anything"), Verdict::Pending);
    assert_eq!(game.state().wrong, 3);
}

#[test]
fn time_attack_reports_elapsed_and_speed() {
    let (mut game, clock) = start(GameMode::TimeAttack, "travel", 3);

    for _ in 0..6 {
        answer(&mut game, &clock, Duration::from_secs(2));
    }
    let mut ended = None;
    for _ in 0..600 {
        if let Some(result) = game.on_tick(Duration::from_millis(100)) {
            ended = Some(result);
            break;
        }
    }

    let result = ended.expect("time attack should run out");
    assert_eq!(result.mode, GameMode::TimeAttack);
    assert_eq!(result.elapsed_secs, 60);
    assert_eq!(result.average_speed, 0.1);
    assert_eq!(result.accuracy, 100);
    assert_eq!(result.category.unwrap().id, "travel");
}

#[test]
fn completion_observer_fires_once() {
    let seen: Rc<RefCell<Vec<SessionResult>>> = Rc::default();
    let (mut game, clock) = start(GameMode::Survival, "work", 5);
    let sink = Rc::clone(&seen);
    game.set_on_end(move |result| sink.borrow_mut().push(result.clone()));

    answer(&mut game, &clock, Duration::from_millis(500));
    miss(&mut game);
    let again = game.end();

    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(again.as_ref(), seen.borrow().first());
}

#[test]
fn answers_ignore_case_and_surrounding_space() {
    let (mut game, _) = start(GameMode::Quick, "home", 8);
    let typed = format!("  {}\t", game.canonical_answer().unwrap().to_uppercase());

    assert!(matches!(game.submit(&typed), Verdict::Correct { .. }));
}

#[test]
fn restarting_resets_the_session() {
    let catalog = Catalog::embedded().unwrap();
    let (mut game, clock) = start(GameMode::Perfect, "culture", 2);
    answer(&mut game, &clock, Duration::from_secs(1));
    miss(&mut game);

    game.start(SessionConfig::for_catalog(GameMode::Quick, &catalog));

    assert_eq!(game.phase(), Phase::Active);
    assert_eq!(game.state().score, 0);
    assert_eq!(game.state().answered(), 0);
    assert!(game.result().is_none());
    assert_eq!(game.progress(), (0, 100));
}

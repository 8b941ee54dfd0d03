use std::time::Duration;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use crate::achievements::{Achievement, AchievementTracker};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{CatalogError, StoreError};
use crate::game::{Game, Verdict};
use crate::rank::RankInfo;
use crate::scoring::{combo_milestone, ComboMilestone};
use crate::session::{GameMode, SessionConfig, SessionResult};
use crate::stats::{AchievementStore, GameRecord, HistoryStore, StatsDb};
use crate::summary::Statistics;

/// How long a verdict stays on screen.
pub const FEEDBACK_TTL: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Results,
    History,
    Achievements,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackKind {
    Correct {
        points: u32,
        milestone: Option<ComboMilestone>,
    },
    /// The romaji that was expected.
    Incorrect { answer: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub word: String,
    pub ttl: Duration,
}

/// What the results screen shows for the last finished session.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub record: GameRecord,
    pub rank: RankInfo,
    pub new_achievements: Vec<&'static Achievement>,
}

#[derive(Debug)]
pub struct App {
    pub game: Game,
    pub state: AppState,
    pub input: String,
    pub feedback: Option<Feedback>,
    pub outcome: Option<Outcome>,
    pub show_romaji: bool,
    pub scroll: usize,
    catalog: Catalog,
    session: SessionConfig,
    store: Option<StatsDb>,
    history: Vec<GameRecord>,
    history_limit: usize,
    achievements: AchievementTracker,
    should_quit: bool,
}

impl App {
    /// Start a session for the configured mode and category.
    /// Without a store the history only lives as long as the app.
    pub fn new(
        catalog: Catalog,
        config: &Config,
        store: Option<StatsDb>,
    ) -> Result<Self, CatalogError> {
        Self::with_game(catalog, config, store, Game::new())
    }

    pub fn with_game(
        catalog: Catalog,
        config: &Config,
        store: Option<StatsDb>,
        game: Game,
    ) -> Result<Self, CatalogError> {
        let session =
            SessionConfig::from_selection(config.mode, &catalog, config.category.as_deref())?;

        let history = match store.as_ref().map(|db| db.read_history()) {
            Some(Ok(history)) => history,
            Some(Err(err)) => {
                warn!(%err, "could not read history, starting empty");
                Vec::new()
            }
            None => Vec::new(),
        };
        let achievements =
            AchievementTracker::load(store.as_ref().map(|db| db as &dyn AchievementStore));

        let mut app = Self {
            game,
            state: AppState::Playing,
            input: String::new(),
            feedback: None,
            outcome: None,
            show_romaji: config.show_romaji,
            scroll: 0,
            catalog,
            session,
            store,
            history,
            history_limit: config.history_limit.max(1),
            achievements,
            should_quit: false,
        };
        app.restart();
        Ok(app)
    }

    /// Fresh session with the same mode and category.
    pub fn restart(&mut self) {
        self.input.clear();
        self.feedback = None;
        self.outcome = None;
        self.scroll = 0;
        self.state = AppState::Playing;
        self.game.start(self.session.clone());
    }

    pub fn mode(&self) -> GameMode {
        self.session.mode
    }

    /// Display name of the category being played.
    pub fn category_name(&self) -> &str {
        self.session
            .category
            .as_ref()
            .map_or("All categories", |c| c.name.as_str())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Newest first.
    pub fn history(&self) -> &[GameRecord] {
        &self.history
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_history(&self.history)
    }

    pub fn achievements(&self) -> &AchievementTracker {
        &self.achievements
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state {
            AppState::Playing => self.on_playing_key(key),
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('h') => self.show(AppState::History),
                KeyCode::Char('a') => self.show(AppState::Achievements),
                KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
            AppState::History | AppState::Achievements => match key.code {
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('h') => self.show(AppState::History),
                KeyCode::Char('a') => self.show(AppState::Achievements),
                KeyCode::Char('b') | KeyCode::Backspace | KeyCode::Esc => {
                    self.show(AppState::Results)
                }
                KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
                KeyCode::Down => self.scroll += 1,
                KeyCode::Home => self.scroll = 0,
                _ => {}
            },
        }
    }

    fn show(&mut self, state: AppState) {
        self.scroll = 0;
        self.state = state;
    }

    fn on_playing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => {
                self.input.push(c);
                let verdict = self.game.evaluate_input(&self.input);
                self.apply(verdict);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                let verdict = self.game.submit(&self.input);
                self.apply(verdict);
            }
            KeyCode::Esc => {
                info!("session ended early");
                match self.game.end() {
                    Some(result) => self.finish(result),
                    None => self.should_quit = true,
                }
            }
            _ => {}
        }
    }

    fn apply(&mut self, verdict: Verdict) {
        let (word, kind) = match verdict {
            Verdict::Pending => return,
            Verdict::Correct {
                word,
                points,
                combo,
                ..
            } => (
                word,
                FeedbackKind::Correct {
                    points,
                    milestone: combo_milestone(combo),
                },
            ),
            Verdict::Incorrect { word, answer } => (word, FeedbackKind::Incorrect { answer }),
        };

        self.input.clear();
        self.feedback = Some(Feedback {
            kind,
            word: word.word,
            ttl: FEEDBACK_TTL,
        });

        if self.game.is_active() {
            self.game.select_next_word();
        } else if let Some(result) = self.game.result().cloned() {
            self.finish(result);
        }
    }

    pub fn on_tick(&mut self, dt: Duration) {
        if let Some(feedback) = self.feedback.as_mut() {
            feedback.ttl = feedback.ttl.saturating_sub(dt);
            if feedback.ttl.is_zero() {
                self.feedback = None;
            }
        }

        if self.state == AppState::Playing {
            if let Some(result) = self.game.on_tick(dt) {
                self.finish(result);
            }
        }
    }

    /// Rank, persist and check achievements, then show the results.
    fn finish(&mut self, result: SessionResult) {
        let now = Local::now();
        let rank = RankInfo::evaluate(result.score, result.accuracy, result.max_combo);
        let mut record = GameRecord::from_result(&result, &rank.rank, now);

        let saved = self.store.as_ref().map(|db| -> Result<_, StoreError> {
            let id = db.record_result(&record)?;
            Ok((id, db.read_history()?))
        });
        let stored = match saved {
            Some(Ok((id, history))) => {
                record.id = id;
                self.history = history;
                true
            }
            Some(Err(err)) => {
                warn!(%err, "could not save result, keeping it in memory");
                false
            }
            None => false,
        };
        if !stored {
            self.history.insert(0, record.clone());
            self.history.truncate(self.history_limit);
        }

        let new_achievements = self.achievements.check(
            self.store.as_ref().map(|db| db as &dyn AchievementStore),
            &result,
            &self.history,
            now,
        );
        debug!(
            rank = rank.rank.title,
            unlocked = new_achievements.len(),
            "results ready"
        );

        self.input.clear();
        self.outcome = Some(Outcome {
            record,
            rank,
            new_achievements,
        });
        self.show(AppState::Results);
    }
}

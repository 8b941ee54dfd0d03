use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};

use crate::catalog::VocabItem;
use crate::romaji::to_romaji;
use crate::scoring::compute_score;
use crate::session::{Limit, SessionConfig, SessionResult, SessionState};
use crate::util::{percent, round2};

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
    Ended,
}

/// Outcome of checking the typed input against the current word.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Still typing, the caller must not advance.
    Pending,
    Correct {
        word: VocabItem,
        points: u32,
        combo: u32,
        speed: f64,
    },
    Incorrect {
        word: VocabItem,
        answer: String,
    },
}

impl Verdict {
    pub fn is_decided(&self) -> bool {
        !matches!(self, Verdict::Pending)
    }
}

type EndCallback = Box<dyn FnMut(&SessionResult)>;

/// One practice session at a time: word rotation, verdicts, scoring and termination.
pub struct Game {
    config: Option<SessionConfig>,
    state: SessionState,
    phase: Phase,
    used: HashSet<usize>,
    current: Option<usize>,
    question_started: Duration,
    tick_carry: Duration,
    result: Option<SessionResult>,
    on_end: Option<EndCallback>,
    rng: Box<dyn RngCore>,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self {
            config: None,
            state: SessionState::default(),
            phase: Phase::Idle,
            used: HashSet::new(),
            current: None,
            question_started: Duration::ZERO,
            tick_carry: Duration::ZERO,
            result: None,
            on_end: None,
            rng: Box::new(StdRng::from_entropy()),
            clock: Box::new(SystemClock::new()),
        }
    }

    /// Deterministic word selection.
    pub fn with_rng(mut self, seed: u64) -> Self {
        self.rng = Box::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Register the completion observer. It fires once per session.
    pub fn set_on_end(&mut self, callback: impl FnMut(&SessionResult) + 'static) {
        self.on_end = Some(Box::new(callback));
    }

    /// Begin a fresh session, discarding whatever came before.
    pub fn start(&mut self, config: SessionConfig) {
        self.state = SessionState {
            remaining: config.time_limit,
            is_active: true,
            ..SessionState::default()
        };
        self.used.clear();
        self.current = None;
        self.tick_carry = Duration::ZERO;
        self.result = None;

        info!(
            mode = %config.mode,
            category = config.category.as_ref().map(|c| c.id.as_str()).unwrap_or("all"),
            pool = config.pool.len(),
            "session started"
        );

        self.config = Some(config);
        self.phase = Phase::Active;
        self.select_next_word();
    }

    /// Pick a word not shown in the current rotation. `None` when the pool is empty.
    pub fn select_next_word(&mut self) -> Option<&VocabItem> {
        let config = self.config.as_ref()?;
        let n = config.pool.len();
        if n == 0 {
            self.state.current_word = None;
            return None;
        }

        if self.used.len() >= n {
            self.used.clear();
        }
        // A new rotation must not open with the word that closed the last one.
        let fresh = self.used.is_empty();
        let candidates: Vec<usize> = (0..n)
            .filter(|i| !self.used.contains(i))
            .filter(|i| !(fresh && n > 1 && Some(*i) == self.current))
            .collect();

        let index = *candidates.choose(&mut *self.rng)?;
        self.used.insert(index);
        self.current = Some(index);
        self.question_started = self.clock.now();

        let word = config.pool[index].clone();
        debug!(word = %word.word, reading = %word.reading, "word selected");
        self.state.current_word = Some(word);
        self.state.current_word.as_ref()
    }

    /// Judge the typed text. Only a full-length answer can be wrong.
    pub fn evaluate_input(&mut self, raw: &str) -> Verdict {
        if self.phase != Phase::Active {
            return Verdict::Pending;
        }
        let Some(word) = self.state.current_word.clone() else {
            return Verdict::Pending;
        };

        let input = raw.trim().to_lowercase();
        let answer = to_romaji(&word.reading).to_lowercase();

        if input == answer {
            self.record_correct(word, &answer)
        } else if input.chars().count() >= answer.chars().count() {
            self.record_wrong(word, answer)
        } else {
            Verdict::Pending
        }
    }

    /// Explicit submission: anything typed but undecided counts as a miss.
    pub fn submit(&mut self, raw: &str) -> Verdict {
        let verdict = self.evaluate_input(raw);
        if verdict.is_decided() || raw.trim().is_empty() || self.phase != Phase::Active {
            return verdict;
        }
        match self.state.current_word.clone() {
            Some(word) => {
                let answer = to_romaji(&word.reading).to_lowercase();
                self.record_wrong(word, answer)
            }
            None => verdict,
        }
    }

    fn record_correct(&mut self, word: VocabItem, answer: &str) -> Verdict {
        let state = &mut self.state;
        state.correct += 1;
        state.combo += 1;
        state.max_combo = state.max_combo.max(state.combo);

        let len = answer.chars().count();
        let secs = self
            .clock
            .now()
            .saturating_sub(self.question_started)
            .as_secs_f64();
        let speed = len as f64 / secs;
        let points = compute_score(len, state.combo, speed);
        state.score += points;

        debug!(word = %word.word, points, combo = state.combo, speed, "correct");
        Verdict::Correct {
            word,
            points,
            combo: state.combo,
            speed,
        }
    }

    fn record_wrong(&mut self, word: VocabItem, answer: String) -> Verdict {
        self.state.wrong += 1;
        self.state.combo = 0;
        debug!(word = %word.word, wrong = self.state.wrong, "incorrect");

        let limit = self
            .config
            .as_ref()
            .map_or(Limit::Unlimited, |c| c.mistake_limit);
        if limit.reached_by(self.state.wrong) {
            self.end();
        }
        Verdict::Incorrect { word, answer }
    }

    /// Advance the countdown by `dt`. Returns the result if time ran out.
    pub fn on_tick(&mut self, dt: Duration) -> Option<SessionResult> {
        if self.phase != Phase::Active {
            return None;
        }
        let Limit::Finite(mut remaining) = self.state.remaining else {
            return None;
        };

        self.tick_carry += dt;
        while remaining > 0 && self.tick_carry >= Duration::from_secs(1) {
            self.tick_carry -= Duration::from_secs(1);
            remaining -= 1;
        }
        self.state.remaining = Limit::Finite(remaining);

        if remaining == 0 {
            self.end()
        } else {
            None
        }
    }

    /// Finish the session. Repeated calls return the same result without notifying again.
    pub fn end(&mut self) -> Option<SessionResult> {
        match self.phase {
            Phase::Idle => None,
            Phase::Ended => self.result.clone(),
            Phase::Active => {
                let result = self.finalize()?;
                if let Some(callback) = self.on_end.as_mut() {
                    callback(&result);
                }
                Some(result)
            }
        }
    }

    fn finalize(&mut self) -> Option<SessionResult> {
        let config = self.config.as_ref()?;
        self.phase = Phase::Ended;
        self.state.is_active = false;
        self.tick_carry = Duration::ZERO;

        let state = &self.state;
        let elapsed = match (config.time_limit, state.remaining) {
            (Limit::Finite(limit), Limit::Finite(left)) => limit.saturating_sub(left),
            _ => 0,
        };
        let average_speed = if elapsed > 0 && state.correct > 0 {
            round2(f64::from(state.correct) / f64::from(elapsed))
        } else {
            0.0
        };

        let result = SessionResult {
            mode: config.mode,
            score: state.score,
            correct: state.correct,
            wrong: state.wrong,
            accuracy: percent(state.correct, state.answered()),
            max_combo: state.max_combo,
            average_speed,
            elapsed_secs: elapsed,
            category: config.category.clone(),
        };
        info!(
            score = result.score,
            correct = result.correct,
            wrong = result.wrong,
            accuracy = result.accuracy,
            "session ended"
        );

        self.result = Some(result.clone());
        Some(result)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    pub fn current_word(&self) -> Option<&VocabItem> {
        self.state.current_word.as_ref()
    }

    /// The romaji the player has to type for the current word.
    pub fn canonical_answer(&self) -> Option<String> {
        self.current_word()
            .map(|word| to_romaji(&word.reading).to_lowercase())
    }

    /// Answered so far against the pool size.
    pub fn progress(&self) -> (u32, usize) {
        let pool = self.config.as_ref().map_or(0, |c| c.pool.len());
        (self.state.answered(), pool)
    }

    pub fn mistakes_left(&self) -> Limit {
        match self.config.as_ref().map(|c| c.mistake_limit) {
            Some(Limit::Finite(n)) => Limit::Finite(n.saturating_sub(self.state.wrong)),
            _ => Limit::Unlimited,
        }
    }

    /// Set once the session has ended.
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }
}

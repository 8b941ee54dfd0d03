use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::catalog::{Catalog, Category, CategoryRef, VocabItem};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    /// 60 seconds, unlimited mistakes
    #[default]
    #[value(name = "timeattack")]
    TimeAttack,
    /// 30 seconds, unlimited mistakes
    Quick,
    /// no clock, three mistakes
    Perfect,
    /// no clock, one mistake
    Survival,
}

impl GameMode {
    pub fn time_limit(self) -> Limit {
        match self {
            GameMode::TimeAttack => Limit::Finite(60),
            GameMode::Quick => Limit::Finite(30),
            GameMode::Perfect | GameMode::Survival => Limit::Unlimited,
        }
    }

    pub fn mistake_limit(self) -> Limit {
        match self {
            GameMode::TimeAttack | GameMode::Quick => Limit::Unlimited,
            GameMode::Perfect => Limit::Finite(3),
            GameMode::Survival => Limit::Finite(1),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::TimeAttack => "Time Attack",
            GameMode::Quick => "Quick",
            GameMode::Perfect => "Perfect",
            GameMode::Survival => "Survival",
        }
    }

    pub fn all() -> [GameMode; 4] {
        [
            GameMode::TimeAttack,
            GameMode::Quick,
            GameMode::Perfect,
            GameMode::Survival,
        ]
    }
}

/// A count that is either bounded or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Limit {
    Finite(u32),
    Unlimited,
}

impl Limit {
    pub fn is_finite(self) -> bool {
        matches!(self, Limit::Finite(_))
    }

    pub fn value(self) -> Option<u32> {
        match self {
            Limit::Finite(n) => Some(n),
            Limit::Unlimited => None,
        }
    }

    /// True once `count` has hit a finite limit.
    pub fn reached_by(self, count: u32) -> bool {
        match self {
            Limit::Finite(n) => count >= n,
            Limit::Unlimited => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: GameMode,
    pub time_limit: Limit,
    pub mistake_limit: Limit,
    pub category: Option<CategoryRef>,
    pub pool: Vec<VocabItem>,
}

impl SessionConfig {
    pub fn new(mode: GameMode, category: Option<CategoryRef>, pool: Vec<VocabItem>) -> Self {
        Self {
            mode,
            time_limit: mode.time_limit(),
            mistake_limit: mode.mistake_limit(),
            category,
            pool,
        }
    }

    pub fn for_category(mode: GameMode, category: &Category) -> Self {
        Self::new(mode, Some(category.to_ref()), category.words.clone())
    }

    /// Every word of the catalog, no category attached.
    pub fn for_catalog(mode: GameMode, catalog: &Catalog) -> Self {
        Self::new(mode, None, catalog.all_words())
    }

    /// Resolve an optional category id against the catalog.
    pub fn from_selection(
        mode: GameMode,
        catalog: &Catalog,
        category_id: Option<&str>,
    ) -> Result<Self, crate::error::CatalogError> {
        match category_id {
            Some(id) => Ok(Self::for_category(mode, catalog.require(id)?)),
            None => Ok(Self::for_catalog(mode, catalog)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub score: u32,
    pub correct: u32,
    pub wrong: u32,
    pub combo: u32,
    pub max_combo: u32,
    /// Whole seconds left on the clock.
    pub remaining: Limit,
    pub current_word: Option<VocabItem>,
    pub is_active: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            score: 0,
            correct: 0,
            wrong: 0,
            combo: 0,
            max_combo: 0,
            remaining: Limit::Unlimited,
            current_word: None,
            is_active: false,
        }
    }
}

impl SessionState {
    pub fn answered(&self) -> u32 {
        self.correct + self.wrong
    }
}

/// Snapshot taken once when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub mode: GameMode,
    pub score: u32,
    pub correct: u32,
    pub wrong: u32,
    pub accuracy: u32,
    pub max_combo: u32,
    pub average_speed: f64,
    pub elapsed_secs: u32,
    pub category: Option<CategoryRef>,
}

impl SessionResult {
    pub fn attempts(&self) -> u32 {
        self.correct + self.wrong
    }
}

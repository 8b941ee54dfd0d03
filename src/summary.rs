use itertools::Itertools;

use crate::rank::Rank;
use crate::stats::GameRecord;
use crate::util::{mean, round2, round_div};

/// Aggregates over the whole stored history.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_games: usize,
    pub average_score: u32,
    pub best_score: u32,
    pub best_rank: Rank,
    pub total_correct: u32,
    pub total_wrong: u32,
    pub average_accuracy: u32,
    pub average_speed: f64,
    pub max_combo: u32,
    /// Most played category name.
    pub favourite_category: Option<String>,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            total_games: 0,
            average_score: 0,
            best_score: 0,
            best_rank: Rank::lowest(),
            total_correct: 0,
            total_wrong: 0,
            average_accuracy: 0,
            average_speed: 0.0,
            max_combo: 0,
            favourite_category: None,
        }
    }
}

impl Statistics {
    /// `history` is newest first; ties for the best score go to the newest game.
    pub fn from_history(history: &[GameRecord]) -> Self {
        let Some(first) = history.first() else {
            return Self::default();
        };

        let n = history.len() as u64;
        let total_score: u64 = history.iter().map(|r| u64::from(r.score)).sum();
        let total_accuracy: u64 = history.iter().map(|r| u64::from(r.accuracy)).sum();
        let best = history
            .iter()
            .fold(first, |best, r| if r.score > best.score { r } else { best });

        // Stored titles can be stale or missing; fall back to the score.
        let best_rank = Rank::from_title(&best.rank)
            .filter(|rank| *rank != Rank::lowest())
            .unwrap_or_else(|| Rank::for_score(best.score));

        let speeds: Vec<f64> = history.iter().map(|r| r.average_speed).collect();

        Self {
            total_games: history.len(),
            average_score: round_div(total_score, n) as u32,
            best_score: best.score,
            best_rank,
            total_correct: history.iter().map(|r| r.correct).sum(),
            total_wrong: history.iter().map(|r| r.wrong).sum(),
            average_accuracy: round_div(total_accuracy, n) as u32,
            average_speed: round2(mean(&speeds).unwrap_or(0.0)),
            max_combo: history.iter().map(|r| r.max_combo).max().unwrap_or(0),
            favourite_category: favourite_category(history),
        }
    }
}

fn favourite_category(history: &[GameRecord]) -> Option<String> {
    history
        .iter()
        .filter_map(|r| r.category_name.as_deref())
        .counts()
        .into_iter()
        // Alphabetical order breaks ties.
        .max_by(|(a_name, a_count), (b_name, b_count)| {
            a_count.cmp(b_count).then_with(|| b_name.cmp(a_name))
        })
        .map(|(name, _)| name.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub play_count: usize,
    pub average_score: u32,
    pub best_score: u32,
    pub average_accuracy: u32,
}

impl CategoryStats {
    pub fn for_category(history: &[GameRecord], category_id: &str) -> Self {
        let games: Vec<&GameRecord> = history
            .iter()
            .filter(|r| r.category_id.as_deref() == Some(category_id))
            .collect();
        if games.is_empty() {
            return Self::default();
        }

        let n = games.len() as u64;
        Self {
            play_count: games.len(),
            average_score: round_div(games.iter().map(|r| u64::from(r.score)).sum(), n) as u32,
            best_score: games.iter().map(|r| r.score).max().unwrap_or(0),
            average_accuracy: round_div(games.iter().map(|r| u64::from(r.accuracy)).sum(), n)
                as u32,
        }
    }
}

/// Highest scores first, at most `limit`.
pub fn top_scores(history: &[GameRecord], limit: usize) -> Vec<GameRecord> {
    history
        .iter()
        .sorted_by(|a, b| b.score.cmp(&a.score))
        .take(limit)
        .cloned()
        .collect()
}

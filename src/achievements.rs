use std::collections::HashSet;

use chrono::{DateTime, Datelike, Local, Timelike, Weekday};
use tracing::{info, warn};

use crate::session::SessionResult;
use crate::stats::{AchievementStore, GameRecord};
use crate::summary::Statistics;
use crate::util::percent;

/// Everything an achievement condition can look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementStats {
    pub total_games: usize,
    pub best_score: u32,
    pub average_score: u32,
    pub max_speed: f64,
    pub max_combo: u32,
    pub perfect_clear: bool,
    pub categories_played: usize,
    pub high_score_count: usize,
    pub perfect_count: usize,
    pub night_play: bool,
    pub morning_play: bool,
    pub weekend_play: bool,
    pub weekday_play: bool,
    pub daily_play_count: usize,
    pub total_score: u64,
    pub achievement_count: usize,
    pub achievement_rate: u32,
}

impl AchievementStats {
    /// `history` is the stored history, already including `result`.
    pub fn compute(
        result: &SessionResult,
        history: &[GameRecord],
        unlocked: usize,
        now: DateTime<Local>,
    ) -> Self {
        let statistics = Statistics::from_history(history);
        let categories: HashSet<&str> = history
            .iter()
            .filter_map(|r| r.category_id.as_deref())
            .collect();
        let today = now.date_naive();
        let hour = now.hour();

        Self {
            total_games: statistics.total_games,
            best_score: statistics.best_score,
            average_score: statistics.average_score,
            max_speed: history
                .iter()
                .map(|r| r.average_speed)
                .fold(0.0, f64::max),
            max_combo: statistics.max_combo,
            perfect_clear: result.wrong == 0 && result.correct > 0,
            categories_played: categories.len(),
            high_score_count: history.iter().filter(|r| r.score >= 90).count(),
            perfect_count: history.iter().filter(|r| r.accuracy == 100).count(),
            night_play: hour < 6,
            morning_play: (5..7).contains(&hour),
            weekend_play: matches!(now.weekday(), Weekday::Sat | Weekday::Sun),
            weekday_play: !matches!(now.weekday(), Weekday::Sat | Weekday::Sun),
            daily_play_count: history
                .iter()
                .filter(|r| r.timestamp.date_naive() == today)
                .count(),
            total_score: history.iter().map(|r| u64::from(r.score)).sum(),
            achievement_count: unlocked,
            achievement_rate: percent(unlocked as u32, ACHIEVEMENTS.len() as u32),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    condition: fn(&AchievementStats) -> bool,
}

impl Achievement {
    pub fn is_met(&self, stats: &AchievementStats) -> bool {
        (self.condition)(stats)
    }
}

impl PartialEq for Achievement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

macro_rules! achievement {
    ($id:literal, $name:literal, $desc:literal, $icon:literal, |$s:ident| $cond:expr) => {
        Achievement {
            id: $id,
            name: $name,
            description: $desc,
            icon: $icon,
            condition: |$s| $cond,
        }
    };
}

pub static ACHIEVEMENTS: [Achievement; 30] = [
    achievement!("first_play", "First Steps", "Play your first game", "🎯", |s| s.total_games >= 1),
    achievement!("keep_going", "Keep Going", "Play 5 games", "💪", |s| s.total_games >= 5),
    achievement!("hard_worker", "Hard Worker", "Play 50 games", "⭐", |s| s.total_games >= 50),
    achievement!("speed_star", "Speed Star", "Reach an average speed of 5 per second", "⚡", |s| s.max_speed >= 5.0),
    achievement!("light_speed", "Light Speed", "Reach an average speed of 7 per second", "💫", |s| s.max_speed >= 7.0),
    achievement!("perfectionist", "Perfectionist", "Finish a game without a mistake", "💯", |s| s.perfect_clear),
    achievement!("genius", "Spark of Genius", "Score 80 or more", "🌟", |s| s.best_score >= 80),
    achievement!("godlike", "Godlike", "Score 95 or more", "👑", |s| s.best_score >= 95),
    achievement!("combo_master", "Combo Master", "Reach a 30 combo", "🔥", |s| s.max_combo >= 30),
    achievement!("all_categories", "Completionist", "Play every category", "🏆", |s| s.categories_played >= 10),
    achievement!("century", "Centurion", "Play 100 games", "💎", |s| s.total_games >= 100),
    achievement!("marathon", "Marathon Runner", "Play 200 games", "🏃", |s| s.total_games >= 200),
    achievement!("super_combo", "Super Combo", "Reach a 50 combo", "💥", |s| s.max_combo >= 50),
    achievement!("ultra_combo", "Ultra Combo", "Reach a 100 combo", "🌪️", |s| s.max_combo >= 100),
    achievement!("score_master", "Score Master", "Score 90 or more ten times", "🎖️", |s| s.high_score_count >= 10),
    achievement!("accuracy_king", "Accuracy King", "Hit 100% accuracy five times", "🎯", |s| s.perfect_count >= 5),
    achievement!("night_owl", "Night Owl", "Play between midnight and 6am", "🦉", |s| s.night_play),
    achievement!("early_bird", "Early Bird", "Play between 5am and 7am", "🐦", |s| s.morning_play),
    achievement!("speed_demon", "Supersonic", "Reach an average speed of 10 per second", "🚀", |s| s.max_speed >= 10.0),
    achievement!("collector", "Collector", "Unlock 10 achievements", "📚", |s| s.achievement_count >= 10),
    achievement!("weekend_warrior", "Weekend Warrior", "Play on a weekend", "🎮", |s| s.weekend_play),
    achievement!("weekday_fighter", "Weekday Fighter", "Play on a weekday", "💼", |s| s.weekday_play),
    achievement!("fever_mode", "Fever", "Play 10 games in one day", "🎊", |s| s.daily_play_count >= 10),
    achievement!("skilled_player", "Skilled", "Keep an average score of 70", "🥈", |s| s.average_score >= 70),
    achievement!("elite_player", "Elite", "Keep an average score of 80", "🥇", |s| s.average_score >= 80),
    achievement!("legend_points", "Living Legend", "Score 10,000 points in total", "🌠", |s| s.total_score >= 10_000),
    achievement!("master_level", "Master", "Unlock half of all achievements", "🎓", |s| s.achievement_rate >= 50),
    achievement!("combo_god", "Combo God", "Reach a 150 combo", "⚡", |s| s.max_combo >= 150),
    achievement!("ultimate_player", "Ultimate Player", "Score 98 or more", "💠", |s| s.best_score >= 98),
    achievement!("platinum_trophy", "Platinum Trophy", "Unlock 75% of all achievements", "🏅", |s| s.achievement_rate >= 75),
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Tracks which achievements are unlocked and persists new unlocks.
#[derive(Debug, Clone, Default)]
pub struct AchievementTracker {
    unlocked: Vec<String>,
}

impl AchievementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from whatever the store remembers. Unknown ids are dropped.
    pub fn load(store: Option<&dyn AchievementStore>) -> Self {
        let unlocked = match store.map(|s| s.unlocked_achievements()) {
            Some(Ok(ids)) => ids.into_iter().filter(|id| find(id).is_some()).collect(),
            Some(Err(err)) => {
                warn!(%err, "could not read unlocked achievements");
                Vec::new()
            }
            None => Vec::new(),
        };
        Self { unlocked }
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.iter().any(|u| u == id)
    }

    /// Unlock everything newly satisfied by this result. Stats are taken once,
    /// so unlocks made here do not count toward the collector conditions until
    /// the next check.
    pub fn check(
        &mut self,
        store: Option<&dyn AchievementStore>,
        result: &SessionResult,
        history: &[GameRecord],
        now: DateTime<Local>,
    ) -> Vec<&'static Achievement> {
        let stats = AchievementStats::compute(result, history, self.unlocked.len(), now);
        let mut newly = Vec::new();

        for achievement in ACHIEVEMENTS.iter() {
            if self.is_unlocked(achievement.id) || !achievement.is_met(&stats) {
                continue;
            }
            if let Some(store) = store {
                if let Err(err) = store.unlock(achievement.id, now) {
                    warn!(%err, id = achievement.id, "could not persist achievement");
                }
            }
            info!(id = achievement.id, "achievement unlocked");
            self.unlocked.push(achievement.id.to_string());
            newly.push(achievement);
        }

        newly
    }

    pub fn all_with_status(&self) -> Vec<(&'static Achievement, bool)> {
        ACHIEVEMENTS
            .iter()
            .map(|a| (a, self.is_unlocked(a.id)))
            .collect()
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    pub fn unlock_percentage(&self) -> u32 {
        percent(self.unlocked.len() as u32, ACHIEVEMENTS.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryRef;
    use crate::rank::Rank;
    use crate::session::GameMode;
    use crate::stats::{HistoryStore, StatsDb};
    use chrono::TimeZone;

    // A Wednesday afternoon: no time-of-day or weekend unlocks.
    fn wednesday() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 8, 14, 0, 0).unwrap()
    }

    fn result(score: u32, correct: u32, wrong: u32, max_combo: u32) -> SessionResult {
        SessionResult {
            mode: GameMode::TimeAttack,
            score,
            correct,
            wrong,
            accuracy: percent(correct, correct + wrong),
            max_combo,
            average_speed: 0.5,
            elapsed_secs: 60,
            category: Some(CategoryRef {
                id: "food".into(),
                name: "Food".into(),
            }),
        }
    }

    fn record_of(result: &SessionResult, at: DateTime<Local>) -> GameRecord {
        GameRecord::from_result(result, &Rank::for_score(result.score), at)
    }

    fn ids(list: &[&Achievement]) -> Vec<&'static str> {
        list.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_catalogue_has_unique_ids() {
        let unique: HashSet<&str> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(unique.len(), 30);
        assert!(find("platinum_trophy").is_some());
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_first_game_unlocks() {
        let mut tracker = AchievementTracker::new();
        let res = result(40, 5, 1, 5);
        let history = vec![record_of(&res, wednesday())];

        let newly = tracker.check(None, &res, &history, wednesday());

        assert_eq!(ids(&newly), vec!["first_play", "weekday_fighter"]);
        assert_eq!(tracker.unlocked_count(), 2);
        // 2 / 30 = 6.67
        assert_eq!(tracker.unlock_percentage(), 7);
    }

    #[test]
    fn test_unlocks_only_once() {
        let mut tracker = AchievementTracker::new();
        let res = result(40, 5, 1, 5);
        let history = vec![record_of(&res, wednesday())];

        tracker.check(None, &res, &history, wednesday());
        let again = tracker.check(None, &res, &history, wednesday());

        assert!(again.is_empty());
    }

    #[test]
    fn test_perfect_high_score_game() {
        let mut tracker = AchievementTracker::new();
        let res = result(99, 12, 0, 31);
        let history = vec![record_of(&res, wednesday())];

        let newly = ids(&tracker.check(None, &res, &history, wednesday()));

        for id in [
            "perfectionist",
            "genius",
            "godlike",
            "ultimate_player",
            "combo_master",
            "skilled_player",
            "elite_player",
        ] {
            assert!(newly.contains(&id), "missing {id}");
        }
        assert!(!newly.contains(&"super_combo"));
    }

    #[test]
    fn test_time_of_day_and_weekend() {
        let saturday_dawn = Local.with_ymd_and_hms(2024, 5, 11, 5, 30, 0).unwrap();
        let res = result(1, 0, 1, 0);
        let history = vec![record_of(&res, saturday_dawn)];

        let stats = AchievementStats::compute(&res, &history, 0, saturday_dawn);

        assert!(stats.night_play);
        assert!(stats.morning_play);
        assert!(stats.weekend_play);
        assert!(!stats.weekday_play);
        assert!(!stats.perfect_clear);
    }

    #[test]
    fn test_history_derived_stats() {
        let now = wednesday();
        let yesterday = Local.with_ymd_and_hms(2024, 5, 7, 14, 0, 0).unwrap();
        let res = result(95, 10, 0, 12);
        let mut history: Vec<GameRecord> = (0..10).map(|_| record_of(&res, now)).collect();
        let mut old = record_of(&result(20, 1, 1, 1), yesterday);
        old.category_id = Some("animals".into());
        old.average_speed = 7.5;
        history.push(old);

        let stats = AchievementStats::compute(&res, &history, 10, now);

        assert_eq!(stats.total_games, 11);
        assert_eq!(stats.daily_play_count, 10);
        assert_eq!(stats.high_score_count, 10);
        assert_eq!(stats.perfect_count, 10);
        assert_eq!(stats.categories_played, 2);
        assert_eq!(stats.max_speed, 7.5);
        assert_eq!(stats.total_score, 970);
        assert_eq!(stats.achievement_rate, 33);
    }

    #[test]
    fn test_collector_counts_previous_unlocks_only() {
        let mut tracker = AchievementTracker::new();
        let res = result(99, 12, 0, 51);
        let history = vec![record_of(&res, wednesday())];

        let first = ids(&tracker.check(None, &res, &history, wednesday()));
        assert_eq!(first.len(), 10);
        assert!(!first.contains(&"collector"));

        let second = ids(&tracker.check(None, &res, &history, wednesday()));
        assert_eq!(second, vec!["collector"]);
    }

    #[test]
    fn test_unlocks_persist_through_store() {
        let db = StatsDb::open_in_memory().unwrap();
        let res = result(40, 5, 1, 5);
        let id = db.record_result(&record_of(&res, wednesday())).unwrap();
        assert!(id > 0);
        let history = db.read_history().unwrap();

        let mut tracker = AchievementTracker::load(Some(&db));
        tracker.check(Some(&db), &res, &history, wednesday());

        let reloaded = AchievementTracker::load(Some(&db));
        assert!(reloaded.is_unlocked("first_play"));
        assert!(reloaded.is_unlocked("weekday_fighter"));
        assert_eq!(reloaded.unlocked_count(), 2);
    }

    #[test]
    fn test_all_with_status() {
        let mut tracker = AchievementTracker::new();
        let res = result(40, 5, 1, 5);
        tracker.check(None, &res, &[record_of(&res, wednesday())], wednesday());

        let all = tracker.all_with_status();

        assert_eq!(all.len(), 30);
        assert_eq!(all.iter().filter(|(_, unlocked)| *unlocked).count(), 2);
        assert!(all[0].1);
    }
}

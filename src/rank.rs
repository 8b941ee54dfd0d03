use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A title earned by a session score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub title: &'static str,
    pub min_score: u32,
    /// Display tier, 1 (lowest) to 8.
    pub level: u8,
}

// Highest first.
#[rustfmt::skip]
const TIERS: [Rank; 21] = [
    Rank { title: "Absolute Being", min_score: 1000, level: 8 },
    Rank { title: "Creator of Dimensions", min_score: 800, level: 8 },
    Rank { title: "Realm of Infinity", min_score: 600, level: 7 },
    Rank { title: "Apex of the Gods", min_score: 500, level: 7 },
    Rank { title: "Ruler of the Cosmos", min_score: 400, level: 7 },
    Rank { title: "Master of Space-Time", min_score: 350, level: 6 },
    Rank { title: "Dimension Breaker", min_score: 300, level: 6 },
    Rank { title: "Omniscient", min_score: 250, level: 6 },
    Rank { title: "Ultimate Deity", min_score: 200, level: 5 },
    Rank { title: "Transcendent", min_score: 180, level: 5 },
    Rank { title: "God of Destruction", min_score: 160, level: 5 },
    Rank { title: "Typing God", min_score: 140, level: 4 },
    Rank { title: "Supreme Kai", min_score: 120, level: 4 },
    Rank { title: "Overlord", min_score: 100, level: 4 },
    Rank { title: "Legend", min_score: 85, level: 3 },
    Rank { title: "Hero", min_score: 70, level: 3 },
    Rank { title: "Genius", min_score: 55, level: 2 },
    Rank { title: "Prodigy", min_score: 40, level: 2 },
    Rank { title: "Everyday Typist", min_score: 25, level: 1 },
    Rank { title: "Beginner", min_score: 10, level: 1 },
    Rank { title: "Apprentice", min_score: 0, level: 1 },
];

impl Rank {
    pub fn for_score(score: u32) -> Rank {
        TIERS
            .iter()
            .copied()
            .find(|tier| score >= tier.min_score)
            .unwrap_or(TIERS[TIERS.len() - 1])
    }

    /// Look up a stored title.
    pub fn from_title(title: &str) -> Option<Rank> {
        TIERS.iter().copied().find(|tier| tier.title == title)
    }

    pub fn lowest() -> Rank {
        TIERS[TIERS.len() - 1]
    }

    pub fn all() -> &'static [Rank] {
        &TIERS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Badge {
    #[strum(serialize = "Perfectionist")]
    Perfectionist,
    #[strum(serialize = "Combo Master")]
    ComboMaster,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankInfo {
    pub rank: Rank,
    pub badges: Vec<Badge>,
}

impl RankInfo {
    pub fn evaluate(score: u32, accuracy: u32, max_combo: u32) -> Self {
        let mut badges = Vec::new();
        if accuracy == 100 {
            badges.push(Badge::Perfectionist);
        }
        if max_combo >= 20 {
            badges.push(Badge::ComboMaster);
        }
        Self {
            rank: Rank::for_score(score),
            badges,
        }
    }
}

//! Points for a single correct answer.
//!
//! Multipliers are kept in tenths so that rounding is exact half-up integer
//! arithmetic instead of float rounding.

const BASE_POINTS: u32 = 10;
const COMBO_POINTS: u32 = 2;

/// Combo thresholds that earn a call-out, highest last.
const MILESTONES: [(u32, &str); 5] = [
    (5, "Good!"),
    (10, "Great!"),
    (20, "Excellent!"),
    (30, "Perfect!"),
    (50, "AMAZING!!"),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboMilestone {
    pub combo: u32,
    pub label: &'static str,
    pub multiplier: f64,
}

fn multiplier_tenths(combo: u32) -> u32 {
    match combo {
        30.. => 25,
        20..=29 => 20,
        10..=19 => 15,
        5..=9 => 12,
        _ => 10,
    }
}

pub fn combo_multiplier(combo: u32) -> f64 {
    f64::from(multiplier_tenths(combo)) / 10.0
}

/// Bonus for typing speed in characters per second.
pub fn speed_bonus(chars_per_sec: f64) -> u32 {
    if chars_per_sec >= 5.0 {
        10
    } else if chars_per_sec >= 4.0 {
        5
    } else if chars_per_sec >= 3.0 {
        3
    } else {
        0
    }
}

/// Points for one correct answer. `combo` is the streak including this answer.
/// The answer length does not contribute.
pub fn compute_score(_answer_len: usize, combo: u32, chars_per_sec: f64) -> u32 {
    let sum = BASE_POINTS + combo * COMBO_POINTS + speed_bonus(chars_per_sec);
    (sum * multiplier_tenths(combo) + 5) / 10
}

pub fn combo_milestone(combo: u32) -> Option<ComboMilestone> {
    MILESTONES
        .iter()
        .find(|(at, _)| *at == combo)
        .map(|&(at, label)| ComboMilestone {
            combo: at,
            label,
            multiplier: combo_multiplier(at),
        })
}

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Integer division rounded half-up. Zero when `den` is zero.
pub fn round_div(num: u64, den: u64) -> u64 {
    if den == 0 {
        return 0;
    }
    (2 * num + den) / (2 * den)
}

/// `part / whole` as a whole percentage, rounded half-up. Zero when `whole` is zero.
pub fn percent(part: u32, whole: u32) -> u32 {
    round_div(100 * u64::from(part), u64::from(whole)) as u32
}

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Share of correct answers as a whole percentage, 0 when nothing was answered
pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((correct as f64 / total as f64) * 100.0).round()
}

/// Render remaining lives as hearts, e.g. `♥♥♡`
pub fn hearts(lives: u8, max: u8) -> String {
    let full = lives.min(max) as usize;
    let empty = max as usize - full;
    format!("{}{}", "♥".repeat(full), "♡".repeat(empty))
}

//! Per-move accuracy from win-probability drops.

/// Converts the mover's win probability before and after a move into an
/// accuracy percentage.
///
/// `A = 103.1668 * exp(-0.04354 * (before - after)) - 3.1669`, clamped to
/// `0..=100`. Both probabilities must be from the mover's point of view.
/// Without the clamp a move that improves the mover's chances scores above
/// 100 and a large drop scores below 0.
pub fn move_accuracy(win_before: f64, win_after: f64) -> f64 {
    let raw = 103.1668 * (-0.04354 * (win_before - win_after)).exp() - 3.1669;
    raw.clamp(0.0, 100.0)
}

/// Arithmetic mean of per-move accuracies; zero moves yield 0.
pub fn mean_accuracy(accuracies: &[f64]) -> f64 {
    if accuracies.is_empty() {
        return 0.0;
    }
    accuracies.iter().sum::<f64>() / accuracies.len() as f64
}

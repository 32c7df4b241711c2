//! Centipawn loss of a played move against the engine's top move.

use crate::quality::MISSED_WIN_THRESHOLD;

/// Absolute score gap between the best line and the played line.
///
/// Both scores must be relative to the mover and searched at the same
/// depth. Returns 0 when the played move is the engine's top move.
pub fn raw_loss(best_line_cp: i32, played_line_cp: i32, is_best_move: bool) -> i32 {
    if is_best_move {
        return 0;
    }
    best_line_cp.abs_diff(played_line_cp).min(i32::MAX as u32) as i32
}

/// Centipawn loss as folded into ACPL.
///
/// Same as [`raw_loss`], except that gaps of [`MISSED_WIN_THRESHOLD`] or
/// more are reported as 0; those moves are tracked as missed wins instead.
pub fn move_loss(best_line_cp: i32, played_line_cp: i32, is_best_move: bool) -> i32 {
    aggregated_loss(raw_loss(best_line_cp, played_line_cp, is_best_move))
}

/// Applies the missed-win exclusion to a raw loss.
pub fn aggregated_loss(raw: i32) -> i32 {
    if raw >= MISSED_WIN_THRESHOLD {
        0
    } else {
        raw
    }
}

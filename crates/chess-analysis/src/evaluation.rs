//! Chess position evaluation types and the win-probability transform.

use std::fmt;

/// Centipawn magnitude substituted for forced-mate scores.
///
/// Every evaluation converted with [`Evaluation::to_centipawns`] lies in
/// `-MATE_SCORE..=MATE_SCORE`.
pub const MATE_SCORE: i32 = 10_000;

/// Calibration constant of the win-probability logistic curve.
const WIN_PROBABILITY_SLOPE: f64 = 0.003_682_08;

/// Represents a chess position evaluation.
///
/// Scores are relative to the side to move: positive values favour the
/// player whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawn evaluation.
    Centipawns(i32),
    /// Mate in N moves (positive = side to move mates, zero or negative =
    /// side to move gets mated).
    Mate(i32),
}

impl Evaluation {
    /// Builds an evaluation from the two halves of a UCI `score` token.
    ///
    /// A mate score wins over a centipawn score when both are present.
    pub fn from_uci_score(cp: Option<i32>, mate: Option<i32>) -> Option<Self> {
        match (cp, mate) {
            (_, Some(m)) => Some(Evaluation::Mate(m)),
            (Some(c), None) => Some(Evaluation::Centipawns(c)),
            (None, None) => None,
        }
    }

    /// Converts the evaluation to a bounded centipawn score.
    ///
    /// Mate in `n` maps to `MATE_SCORE - n` and being mated in `n` to
    /// `-MATE_SCORE + n`, so quicker mates score further from zero.
    /// Centipawn scores are clamped to the mate sentinel.
    pub fn to_centipawns(self) -> i32 {
        match self {
            Evaluation::Centipawns(cp) => cp.clamp(-MATE_SCORE, MATE_SCORE),
            Evaluation::Mate(n) if n > 0 => MATE_SCORE - n.min(MATE_SCORE),
            Evaluation::Mate(n) => -MATE_SCORE - n.max(-MATE_SCORE),
        }
    }

    /// Win probability (0-100) of the side to move.
    pub fn win_probability(self) -> f64 {
        win_probability(self.to_centipawns())
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => write!(f, "{:+.2}", *cp as f64 / 100.0),
            Evaluation::Mate(n) => write!(f, "M{}", n),
        }
    }
}

/// Converts a centipawn score into a win-probability percentage.
///
/// `W = 100 / (1 + exp(-0.00368208 * cp))`, which is the same curve as
/// `50 + 50 * (2 / (1 + exp(-0.00368208 * cp)) - 1)`. The result is
/// monotonic in `cp` and saturates towards 0 and 100; at the mate
/// sentinel it rounds to the bound in double precision.
pub fn win_probability(centipawns: i32) -> f64 {
    100.0 / (1.0 + (-WIN_PROBABILITY_SLOPE * f64::from(centipawns)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_uci_score() {
        assert_eq!(
            Evaluation::from_uci_score(Some(35), None),
            Some(Evaluation::Centipawns(35))
        );
        assert_eq!(
            Evaluation::from_uci_score(None, Some(-2)),
            Some(Evaluation::Mate(-2))
        );
        assert_eq!(
            Evaluation::from_uci_score(Some(10), Some(3)),
            Some(Evaluation::Mate(3))
        );
        assert_eq!(Evaluation::from_uci_score(None, None), None);
    }

    #[test]
    fn test_mate_maps_to_sentinel() {
        assert_eq!(Evaluation::Mate(1).to_centipawns(), 9_999);
        assert_eq!(Evaluation::Mate(3).to_centipawns(), 9_997);
        assert_eq!(Evaluation::Mate(-3).to_centipawns(), -9_997);
        assert_eq!(Evaluation::Mate(0).to_centipawns(), -MATE_SCORE);
    }

    #[test]
    fn test_centipawns_are_clamped() {
        assert_eq!(Evaluation::Centipawns(150).to_centipawns(), 150);
        assert_eq!(Evaluation::Centipawns(25_000).to_centipawns(), MATE_SCORE);
        assert_eq!(
            Evaluation::Centipawns(-25_000).to_centipawns(),
            -MATE_SCORE
        );
        assert_eq!(Evaluation::Mate(i32::MAX).to_centipawns(), 0);
        assert_eq!(Evaluation::Mate(i32::MIN).to_centipawns(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Evaluation::Centipawns(35).to_string(), "+0.35");
        assert_eq!(Evaluation::Centipawns(-150).to_string(), "-1.50");
        assert_eq!(Evaluation::Mate(-4).to_string(), "M-4");
    }

    #[test]
    fn test_win_probability_even_position() {
        assert_eq!(win_probability(0), 50.0);
        assert_eq!(Evaluation::Centipawns(0).win_probability(), 50.0);
    }

    #[test]
    fn test_win_probability_known_values() {
        // 100cp is roughly a 59% chance for the side to move.
        let w = win_probability(100);
        assert!((w - 59.1).abs() < 0.1, "got {}", w);
        let l = win_probability(-100);
        assert!((w + l - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_win_probability_saturates_at_mate() {
        assert!(Evaluation::Mate(1).win_probability() > 99.99);
        assert!(Evaluation::Mate(-1).win_probability() < 0.01);
    }

    proptest! {
        #[test]
        fn win_probability_is_strictly_inside_bounds(cp in -5_000i32..5_000) {
            let w = win_probability(cp);
            prop_assert!(w > 0.0 && w < 100.0);
        }

        #[test]
        fn win_probability_is_strictly_increasing(cp in -5_000i32..5_000) {
            prop_assert!(win_probability(cp) < win_probability(cp + 1));
        }

        #[test]
        fn bounded_evaluations_never_exceed_sentinel(cp in any::<i32>(), mate in any::<i32>()) {
            prop_assert!(Evaluation::Centipawns(cp).to_centipawns().abs() <= MATE_SCORE);
            prop_assert!(Evaluation::Mate(mate).to_centipawns().abs() <= MATE_SCORE);
        }
    }
}

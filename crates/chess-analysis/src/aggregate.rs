//! Folder-level aggregation of per-game results.

use crate::color::{ColorLabel, Side};
use crate::quality::{GameResult, PlayerStats};

/// Per-color running totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorTotals {
    /// Games folded into this color.
    pub games: u32,
    /// Sum of per-game ACPL.
    pub acpl_sum: f64,
    /// Sum of per-game accuracy.
    pub accuracy_sum: f64,
    /// Move-level totals across all of this color's games.
    pub moves: PlayerStats,
}

impl ColorTotals {
    fn record(&mut self, stats: &PlayerStats) {
        self.games += 1;
        self.acpl_sum += stats.avg_cp_loss();
        self.accuracy_sum += stats.accuracy_percent();
        self.moves.merge(stats);
    }

    /// Mean per-game ACPL; 0 without games.
    pub fn avg_cp_loss(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.acpl_sum / f64::from(self.games)
    }

    /// Mean per-game accuracy; 0 without games.
    pub fn accuracy_percent(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.accuracy_sum / f64::from(self.games)
    }
}

/// Running totals of a batch, one bucket per manifest color.
///
/// Every game weighs the same inside its color regardless of its length,
/// and the overall figures weigh both colors the same regardless of how
/// many games each has.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderAggregate {
    /// Every game seen, including those with an unrecognized color.
    pub total_games: u32,
    /// Games whose color label matched neither color.
    pub skipped_games: u32,
    pub white: ColorTotals,
    pub black: ColorTotals,
}

impl FolderAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one game into the bucket named by its label.
    ///
    /// Games with an unrecognized label only bump the game counters.
    pub fn record(&mut self, label: &ColorLabel, stats: &PlayerStats) {
        self.total_games += 1;
        match label.side() {
            Some(side) => self.color_mut(side).record(stats),
            None => self.skipped_games += 1,
        }
    }

    /// Totals for one color.
    pub fn color(&self, side: Side) -> &ColorTotals {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    fn color_mut(&mut self, side: Side) -> &mut ColorTotals {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }

    /// Mean of the two per-color ACPL averages.
    pub fn overall_cp_loss(&self) -> f64 {
        (self.white.avg_cp_loss() + self.black.avg_cp_loss()) / 2.0
    }

    /// Mean of the two per-color accuracy averages.
    pub fn overall_accuracy(&self) -> f64 {
        (self.white.accuracy_percent() + self.black.accuracy_percent()) / 2.0
    }
}

/// Folds a sequence of labelled games, scoring each game over all of its
/// plies.
pub fn analyze_folder<'a, I>(games: I) -> FolderAggregate
where
    I: IntoIterator<Item = (&'a ColorLabel, &'a GameResult)>,
{
    let mut aggregate = FolderAggregate::new();
    for (label, game) in games {
        aggregate.record(label, &game.combined());
    }
    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with_acpl(acpl: i64, moves: u32) -> PlayerStats {
        PlayerStats {
            total_moves: moves,
            total_loss: acpl * i64::from(moves),
            accuracy_sum: 90.0 * f64::from(moves),
            ..PlayerStats::default()
        }
    }

    #[test]
    fn test_zero_games_average_to_zero() {
        let aggregate = FolderAggregate::new();
        assert_eq!(aggregate.black.avg_cp_loss(), 0.0);
        assert_eq!(aggregate.white.avg_cp_loss(), 0.0);
        assert_eq!(aggregate.overall_cp_loss(), 0.0);
        assert_eq!(aggregate.overall_accuracy(), 0.0);
    }

    #[test]
    fn test_overall_is_mean_of_color_means() {
        let mut aggregate = FolderAggregate::new();
        aggregate.record(&ColorLabel::Black, &stats_with_acpl(100, 10));
        aggregate.record(&ColorLabel::White, &stats_with_acpl(200, 60));

        assert_eq!(aggregate.black.avg_cp_loss(), 100.0);
        assert_eq!(aggregate.white.avg_cp_loss(), 200.0);
        assert_eq!(aggregate.overall_cp_loss(), 150.0);
        assert_eq!(aggregate.total_games, 2);
    }

    #[test]
    fn test_games_weigh_equally_within_a_color() {
        let mut aggregate = FolderAggregate::new();
        aggregate.record(&ColorLabel::White, &stats_with_acpl(10, 100));
        aggregate.record(&ColorLabel::White, &stats_with_acpl(50, 2));

        assert_eq!(aggregate.white.games, 2);
        assert_eq!(aggregate.white.avg_cp_loss(), 30.0);
        assert_eq!(aggregate.white.moves.total_moves, 102);
    }

    #[test]
    fn test_unrecognized_label_is_counted_but_skipped() {
        let mut aggregate = FolderAggregate::new();
        aggregate.record(&ColorLabel::Black, &stats_with_acpl(40, 5));
        aggregate.record(&ColorLabel::Other("both".into()), &stats_with_acpl(900, 5));

        assert_eq!(aggregate.total_games, 2);
        assert_eq!(aggregate.skipped_games, 1);
        assert_eq!(aggregate.black.games, 1);
        assert_eq!(aggregate.white.games, 0);
        assert_eq!(aggregate.black.avg_cp_loss(), 40.0);
        assert_eq!(aggregate.color(Side::Black).accuracy_percent(), 90.0);
    }

    #[test]
    fn test_analyze_folder_over_game_results() {
        let black = ColorLabel::Black;
        let white = ColorLabel::White;
        let mut short_game = GameResult::default();
        short_game.black = stats_with_acpl(100, 1);
        let mut long_game = GameResult::default();
        long_game.white = stats_with_acpl(200, 40);

        let aggregate = analyze_folder([(&black, &short_game), (&white, &long_game)]);
        assert_eq!(aggregate.overall_cp_loss(), 150.0);
    }
}

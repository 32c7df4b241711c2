//! Move severity classification and per-game results.

use std::fmt;

use crate::color::Side;

/// Raw loss at which a move counts as a missed win.
pub const MISSED_WIN_THRESHOLD: i32 = 2000;
/// Raw loss at which a move counts as a blunder.
pub const BLUNDER_THRESHOLD: i32 = 150;
/// Raw loss at which a move counts as a mistake.
pub const MISTAKE_THRESHOLD: i32 = 80;
/// Raw loss at which a move counts as an inaccuracy.
pub const INACCURACY_THRESHOLD: i32 = 30;

/// Severity tier of a sub-optimal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveTier {
    /// Failed to keep or convert a decisive advantage.
    MissedWin,
    /// Major centipawn loss.
    Blunder,
    /// Significant centipawn loss.
    Mistake,
    /// Noticeable centipawn loss.
    Inaccuracy,
}

impl MoveTier {
    /// All tiers, most severe first.
    pub const ALL: [MoveTier; 4] = [
        MoveTier::MissedWin,
        MoveTier::Blunder,
        MoveTier::Mistake,
        MoveTier::Inaccuracy,
    ];
}

impl fmt::Display for MoveTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveTier::MissedWin => "missed win",
            MoveTier::Blunder => "blunder",
            MoveTier::Mistake => "mistake",
            MoveTier::Inaccuracy => "inaccuracy",
        };
        f.write_str(name)
    }
}

/// Buckets a raw centipawn loss into a severity tier.
///
/// Thresholds are checked from the most severe down and the first match
/// wins. Losses below the inaccuracy threshold get no tier.
pub fn classify(raw_loss: i32) -> Option<MoveTier> {
    if raw_loss >= MISSED_WIN_THRESHOLD {
        Some(MoveTier::MissedWin)
    } else if raw_loss >= BLUNDER_THRESHOLD {
        Some(MoveTier::Blunder)
    } else if raw_loss >= MISTAKE_THRESHOLD {
        Some(MoveTier::Mistake)
    } else if raw_loss >= INACCURACY_THRESHOLD {
        Some(MoveTier::Inaccuracy)
    } else {
        None
    }
}

/// One analysed ply.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    /// Ply index within the game, starting at 1.
    pub ply: u32,
    /// Full-move number the ply belongs to.
    pub move_number: u32,
    /// Side that played the move.
    pub side: Side,
    /// The move in standard algebraic notation.
    pub notation: String,
    /// Loss before the missed-win exclusion.
    pub raw_loss: i32,
    /// Loss folded into ACPL.
    pub loss: i32,
    /// Accuracy percentage of the move.
    pub accuracy: f64,
    /// Severity tier, if any.
    pub tier: Option<MoveTier>,
}

impl MoveRecord {
    /// Line written to the all-moves stream, with the loss before the
    /// missed-win exclusion.
    pub fn summary_line(&self) -> String {
        format!(
            "Move: {} -> Difference: {} ({})",
            self.notation, self.raw_loss, self.side
        )
    }

    /// Line written to the stream of this move's tier.
    pub fn tier_line(&self) -> String {
        let dots = match self.side {
            Side::White => ".",
            Side::Black => "...",
        };
        format!(
            "{}{} {} ({}) -> {}",
            self.move_number, dots, self.notation, self.side, self.raw_loss
        )
    }
}

/// Running totals for one side in one game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStats {
    /// Total moves analysed.
    pub total_moves: u32,
    /// Number of inaccuracies.
    pub inaccuracies: u32,
    /// Number of mistakes.
    pub mistakes: u32,
    /// Number of blunders.
    pub blunders: u32,
    /// Number of missed wins.
    pub missed_wins: u32,
    /// Sum of aggregated centipawn loss.
    pub total_loss: i64,
    /// Sum of per-move accuracy.
    pub accuracy_sum: f64,
}

impl PlayerStats {
    /// Folds one move into the totals.
    pub fn record(&mut self, record: &MoveRecord) {
        self.total_moves += 1;
        self.total_loss += i64::from(record.loss);
        self.accuracy_sum += record.accuracy;
        match record.tier {
            Some(MoveTier::MissedWin) => self.missed_wins += 1,
            Some(MoveTier::Blunder) => self.blunders += 1,
            Some(MoveTier::Mistake) => self.mistakes += 1,
            Some(MoveTier::Inaccuracy) => self.inaccuracies += 1,
            None => {}
        }
    }

    /// Adds another side's totals to this one.
    pub fn merge(&mut self, other: &PlayerStats) {
        self.total_moves += other.total_moves;
        self.inaccuracies += other.inaccuracies;
        self.mistakes += other.mistakes;
        self.blunders += other.blunders;
        self.missed_wins += other.missed_wins;
        self.total_loss += other.total_loss;
        self.accuracy_sum += other.accuracy_sum;
    }

    /// Number of moves in the given tier.
    pub fn tier_count(&self, tier: MoveTier) -> u32 {
        match tier {
            MoveTier::MissedWin => self.missed_wins,
            MoveTier::Blunder => self.blunders,
            MoveTier::Mistake => self.mistakes,
            MoveTier::Inaccuracy => self.inaccuracies,
        }
    }

    /// Average centipawn loss; 0 when no moves were recorded.
    pub fn avg_cp_loss(&self) -> f64 {
        if self.total_moves == 0 {
            return 0.0;
        }
        self.total_loss as f64 / f64::from(self.total_moves)
    }

    /// Mean move accuracy; 0 when no moves were recorded.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_moves == 0 {
            return 0.0;
        }
        self.accuracy_sum / f64::from(self.total_moves)
    }
}

/// Analysis of one game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameResult {
    /// Every analysed ply in order.
    pub moves: Vec<MoveRecord>,
    /// Statistics for white's moves.
    pub white: PlayerStats,
    /// Statistics for black's moves.
    pub black: PlayerStats,
}

impl GameResult {
    /// Appends a ply and folds it into the mover's statistics.
    pub fn push(&mut self, record: MoveRecord) {
        match record.side {
            Side::White => self.white.record(&record),
            Side::Black => self.black.record(&record),
        }
        self.moves.push(record);
    }

    /// Statistics for one side.
    pub fn side(&self, side: Side) -> &PlayerStats {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    /// Statistics over both sides' moves.
    pub fn combined(&self) -> PlayerStats {
        let mut stats = self.white.clone();
        stats.merge(&self.black);
        stats
    }

    /// ACPL over every ply of the game.
    pub fn avg_cp_loss(&self) -> f64 {
        self.combined().avg_cp_loss()
    }

    /// Mean accuracy over every ply of the game.
    pub fn accuracy_percent(&self) -> f64 {
        self.combined().accuracy_percent()
    }
}

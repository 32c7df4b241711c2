//! Game replay, per-move scoring and classification.
//!
//! [`analyze_game`] turns already-evaluated plies into a [`GameResult`];
//! [`GameAnalyzer`] produces those plies by walking a recorded game and
//! querying an [`Evaluator`] for each position.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::accuracy::move_accuracy;
use crate::color::Side;
use crate::engine::{EngineError, Evaluator};
use crate::evaluation::win_probability;
use crate::logs::{LogError, LogSink, LogStream};
use crate::loss::{aggregated_loss, raw_loss};
use crate::pgn::{PgnError, RecordedGame};
use crate::quality::{classify, GameResult, MoveRecord};

/// Errors that can occur during game analysis.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Error from the analysis engine.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    /// The recorded game could not be replayed.
    #[error("Invalid game data: {0}")]
    Pgn(#[from] PgnError),
    /// A log line could not be written.
    #[error("Log error: {0}")]
    Log(#[from] LogError),
}

/// Which plies of a game count towards its ACPL and accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlyScope {
    /// Every ply, whichever side played it.
    #[default]
    All,
    /// Only the plies of the color named in the manifest.
    Labelled,
}

/// Configuration for game analysis.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Depth of the unrestricted search that finds the engine's top move.
    pub probe_depth: u32,
    /// Depth of the searches restricted to the best and the played move.
    pub compare_depth: u32,
    /// Plies folded into per-game figures.
    pub ply_scope: PlyScope,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            probe_depth: 15,
            compare_depth: 18,
            ply_scope: PlyScope::All,
        }
    }
}

/// Evaluations gathered for one ply, all from the mover's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlySample {
    pub ply: u32,
    pub move_number: u32,
    pub side: Side,
    /// The played move in SAN.
    pub notation: String,
    /// Value of the position before the move, with best play.
    pub before_cp: i32,
    /// Value of the position after the played move.
    pub after_cp: i32,
    /// Score of the line starting with the engine's top move.
    pub best_line_cp: i32,
    /// Score of the line starting with the played move.
    pub played_line_cp: i32,
    /// Whether the played move is the engine's top move.
    pub is_best_move: bool,
}

/// Scores and classifies one ply.
pub fn evaluate_ply(sample: &PlySample) -> MoveRecord {
    let raw = raw_loss(sample.best_line_cp, sample.played_line_cp, sample.is_best_move);
    let accuracy = move_accuracy(
        win_probability(sample.before_cp),
        win_probability(sample.after_cp),
    );

    MoveRecord {
        ply: sample.ply,
        move_number: sample.move_number,
        side: sample.side,
        notation: sample.notation.clone(),
        raw_loss: raw,
        loss: aggregated_loss(raw),
        accuracy,
        tier: classify(raw),
    }
}

/// Writes a move to the all-moves stream and, if it has a tier, to that
/// tier's stream.
pub fn log_move<L: LogSink + ?Sized>(logs: &mut L, record: &MoveRecord) -> Result<(), LogError> {
    logs.append(LogStream::AllMoves, &record.summary_line())?;
    if let Some(tier) = record.tier {
        logs.append(LogStream::from(tier), &record.tier_line())?;
    }
    Ok(())
}

/// Scores a sequence of evaluated plies in order and logs each move.
pub fn analyze_game<L: LogSink + ?Sized>(
    samples: &[PlySample],
    logs: &mut L,
) -> Result<GameResult, LogError> {
    let mut result = GameResult::default();
    for sample in samples {
        let record = evaluate_ply(sample);
        debug!(
            ply = record.ply,
            san = %record.notation,
            loss = record.raw_loss,
            accuracy = record.accuracy,
            tier = ?record.tier,
            "scored move"
        );
        log_move(logs, &record)?;
        result.push(record);
    }
    Ok(result)
}

/// Analyzes recorded games against an evaluation source.
pub struct GameAnalyzer<E> {
    /// The evaluation source.
    evaluator: E,
    /// Configuration for analysis.
    config: AnalysisConfig,
}

impl<E: Evaluator> GameAnalyzer<E> {
    /// Creates a new game analyzer over an evaluation source.
    pub fn new(evaluator: E, config: AnalysisConfig) -> Self {
        Self { evaluator, config }
    }

    /// The analysis configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Gives the evaluation source back.
    pub fn into_inner(self) -> E {
        self.evaluator
    }

    /// Replays a game and evaluates every ply.
    ///
    /// For each position the engine first searches freely to find its top
    /// move. If the played move differs, the best and the played move are
    /// each searched again at the comparison depth, restricted to that
    /// single root move, so both scores share depth and perspective.
    pub fn sample_game(&mut self, game: &RecordedGame) -> Result<Vec<PlySample>, AnalyzerError> {
        self.evaluator.new_game()?;

        let plies = game.replay()?;
        let mut samples = Vec::with_capacity(plies.len());

        for ply in plies {
            let probe = self
                .evaluator
                .evaluate(&ply.fen, self.config.probe_depth, &[])?;
            let is_best_move = probe.best_move == ply.uci;

            let (best_line_cp, played_line_cp) = if is_best_move {
                let cp = probe.evaluation.to_centipawns();
                (cp, cp)
            } else {
                let best_line = self.evaluator.evaluate(
                    &ply.fen,
                    self.config.compare_depth,
                    std::slice::from_ref(&probe.best_move),
                )?;
                let played_line = self.evaluator.evaluate(
                    &ply.fen,
                    self.config.compare_depth,
                    std::slice::from_ref(&ply.uci),
                )?;
                (
                    best_line.evaluation.to_centipawns(),
                    played_line.evaluation.to_centipawns(),
                )
            };

            samples.push(PlySample {
                ply: ply.ply,
                move_number: ply.move_number,
                side: ply.side,
                notation: ply.san,
                before_cp: best_line_cp,
                after_cp: played_line_cp,
                best_line_cp,
                played_line_cp,
                is_best_move,
            });
        }

        Ok(samples)
    }

    /// Replays, evaluates, scores and logs a complete game.
    pub fn analyze_game<L: LogSink + ?Sized>(
        &mut self,
        game: &RecordedGame,
        logs: &mut L,
    ) -> Result<GameResult, AnalyzerError> {
        let samples = self.sample_game(game)?;
        Ok(analyze_game(&samples, logs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::MemoryLogs;
    use crate::quality::MoveTier;

    fn sample(best_line_cp: i32, played_line_cp: i32, is_best_move: bool) -> PlySample {
        PlySample {
            ply: 1,
            move_number: 1,
            side: Side::White,
            notation: "e4".to_string(),
            before_cp: best_line_cp,
            after_cp: played_line_cp,
            best_line_cp,
            played_line_cp,
            is_best_move,
        }
    }

    #[test]
    fn test_analysis_config_default() {
        let config = AnalysisConfig::default();
        assert_eq!(config.probe_depth, 15);
        assert_eq!(config.compare_depth, 18);
        assert_eq!(config.ply_scope, PlyScope::All);
    }

    #[test]
    fn test_best_move_scores_clean() {
        let record = evaluate_ply(&sample(40, 40, true));
        assert_eq!(record.loss, 0);
        assert_eq!(record.tier, None);
        assert!(record.accuracy > 99.99);
    }

    #[test]
    fn test_blunder_sample() {
        let record = evaluate_ply(&sample(50, -100, false));
        assert_eq!(record.raw_loss, 150);
        assert_eq!(record.loss, 150);
        assert_eq!(record.tier, Some(MoveTier::Blunder));
        assert!(record.accuracy < 60.0);
    }

    #[test]
    fn test_missed_win_sample_keeps_raw_loss() {
        let record = evaluate_ply(&sample(9_995, 300, false));
        assert_eq!(record.raw_loss, 9_695);
        assert_eq!(record.loss, 0);
        assert_eq!(record.tier, Some(MoveTier::MissedWin));
    }

    #[test]
    fn test_analyze_game_logs_tiers_once() {
        let mut logs = MemoryLogs::new();
        let mut second = sample(10, -30, false);
        second.ply = 2;
        second.side = Side::Black;
        second.notation = "e5".to_string();

        let result = analyze_game(&[sample(20, 20, true), second], &mut logs).unwrap();

        assert_eq!(result.moves.len(), 2);
        assert_eq!(result.black.inaccuracies, 1);
        assert_eq!(result.avg_cp_loss(), 20.0);
        assert_eq!(
            logs.lines(LogStream::AllMoves),
            [
                "Move: e4 -> Difference: 0 (White)",
                "Move: e5 -> Difference: 40 (Black)"
            ]
        );
        assert_eq!(logs.lines(LogStream::Inaccuracies), ["1... e5 (Black) -> 40"]);
        assert!(logs.lines(LogStream::Blunders).is_empty());
    }

    #[test]
    fn test_analyze_empty_game() {
        let mut logs = MemoryLogs::new();
        let result = analyze_game(&[], &mut logs).unwrap();
        assert!(result.moves.is_empty());
        assert_eq!(result.avg_cp_loss(), 0.0);
        assert_eq!(result.accuracy_percent(), 0.0);
        assert!(logs.lines(LogStream::AllMoves).is_empty());
    }

    #[test]
    fn test_ply_scope_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            scope: PlyScope,
        }
        let w: Wrapper = toml::from_str("scope = \"labelled\"").unwrap();
        assert_eq!(w.scope, PlyScope::Labelled);
    }

    #[test]
    fn test_analyzer_error_display() {
        let engine_err = AnalyzerError::Engine(EngineError::NotFound("stockfish".to_string()));
        let display = format!("{}", engine_err);
        assert!(display.contains("Engine error"));
        assert!(display.contains("stockfish"));

        let pgn_err = AnalyzerError::Pgn(PgnError::IllegalMove {
            ply: 3,
            san: "Ke3".to_string(),
            reason: "illegal".to_string(),
        });
        assert!(pgn_err.to_string().contains("Ke3"));
    }
}

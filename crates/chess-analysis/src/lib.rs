//! Post-game move accuracy and centipawn-loss analysis.
//!
//! This crate replays recorded games, compares every played move with the
//! top move of a UCI engine such as Stockfish, and turns the score gaps
//! into per-move accuracy, centipawn loss and severity tiers.
//!
//! # Overview
//!
//! - [`win_probability`] / [`move_accuracy`] - score-to-percentage transforms
//! - [`move_loss`] / [`classify`] - centipawn loss and severity tiers
//! - [`GameAnalyzer`] - replays a game against an [`Evaluator`]
//! - [`FolderAggregate`] - per-color and overall averages over a batch
//! - [`run_batch`] - manifest-driven folder analysis writing to a [`LogSink`]
//!
//! # Example
//!
//! ```ignore
//! use chess_analysis::{AnalysisConfig, AnalysisEngine, FileLogs, GameAnalyzer, run_batch};
//!
//! let engine = AnalysisEngine::new("stockfish")?;
//! let mut analyzer = GameAnalyzer::new(engine, AnalysisConfig::default());
//! let mut logs = FileLogs::open("logs")?;
//! let report = run_batch(&mut analyzer, "games".as_ref(), "games-collection.csv", &mut logs)?;
//! println!("ACPL: {:.0}", report.aggregate.overall_cp_loss());
//! ```

pub mod accuracy;
pub mod aggregate;
pub mod analyzer;
pub mod batch;
pub mod color;
pub mod engine;
pub mod evaluation;
pub mod logs;
pub mod loss;
pub mod manifest;
pub mod pgn;
pub mod quality;

pub use accuracy::{mean_accuracy, move_accuracy};
pub use aggregate::{analyze_folder, ColorTotals, FolderAggregate};
pub use analyzer::{
    analyze_game, evaluate_ply, AnalysisConfig, AnalyzerError, GameAnalyzer, PlyScope, PlySample,
};
pub use batch::{run_batch, BatchError, BatchReport, GameReport};
pub use color::{ColorLabel, Side};
pub use engine::{AnalysisEngine, EngineError, Evaluator, PositionAnalysis};
pub use evaluation::{win_probability, Evaluation, MATE_SCORE};
pub use logs::{FileLogs, LogError, LogSink, LogStream, MemoryLogs};
pub use loss::{move_loss, raw_loss};
pub use manifest::{read_manifest, ManifestEntry, ManifestError};
pub use pgn::{read_games, read_games_file, GameHeaders, PgnError, RecordedGame};
pub use quality::{classify, GameResult, MoveRecord, MoveTier, PlayerStats};

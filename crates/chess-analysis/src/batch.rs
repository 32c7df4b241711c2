//! Folder-level driver: manifest in, logs and averages out.

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::aggregate::FolderAggregate;
use crate::analyzer::{AnalyzerError, GameAnalyzer, PlyScope};
use crate::color::ColorLabel;
use crate::engine::Evaluator;
use crate::logs::{LogError, LogSink, LogStream};
use crate::manifest::{read_manifest, ManifestError};
use crate::pgn::{read_games_file, PgnError};
use crate::quality::{GameResult, PlayerStats};

/// Errors that abort a batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Game file error: {0}")]
    Pgn(#[from] PgnError),
    #[error("Analysis failed for {file}: {source}")]
    Analysis {
        file: String,
        #[source]
        source: AnalyzerError,
    },
    #[error("Log error: {0}")]
    Log(#[from] LogError),
}

/// Outcome of one analysed game, or of a manifest row that produced none.
#[derive(Debug, Clone)]
pub struct GameReport {
    pub file_name: String,
    /// 1-based position of the game in its file; `None` when the row was
    /// skipped or its file holds no finished game.
    pub game_number: Option<usize>,
    pub label: ColorLabel,
    pub result: Option<GameResult>,
    /// The figures folded into the aggregate.
    pub stats: PlayerStats,
}

impl GameReport {
    fn empty(file_name: &str, label: &ColorLabel) -> Self {
        Self {
            file_name: file_name.to_string(),
            game_number: None,
            label: label.clone(),
            result: None,
            stats: PlayerStats::default(),
        }
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub games: Vec<GameReport>,
    pub aggregate: FolderAggregate,
}

/// Analyzes every game listed in `<folder>/<manifest>`.
///
/// The log streams are reset first. Files are processed in manifest order
/// and every finished game in a file counts as one game of the row's
/// color; games without a result (`*`) are skipped. A file with no
/// finished game counts as one game with zero figures. Any missing or
/// unreadable file aborts the run.
pub fn run_batch<E, L>(
    analyzer: &mut GameAnalyzer<E>,
    folder: &Path,
    manifest: &str,
    logs: &mut L,
) -> Result<BatchReport, BatchError>
where
    E: Evaluator,
    L: LogSink + ?Sized,
{
    logs.reset()?;
    let entries = read_manifest(folder.join(manifest))?;
    info!(folder = %folder.display(), files = entries.len(), "starting batch");

    let scope = analyzer.config().ply_scope;
    let mut report = BatchReport::default();

    for entry in entries {
        logs.append(LogStream::Acpl, &format!("Analyzing game: {}", entry.file_name))?;

        let Some(side) = entry.color.side() else {
            warn!(
                line = entry.line,
                file = %entry.file_name,
                label = %entry.color,
                "unrecognized color label, game skipped"
            );
            report.aggregate.record(&entry.color, &PlayerStats::default());
            report
                .games
                .push(GameReport::empty(&entry.file_name, &entry.color));
            continue;
        };

        let games = read_games_file(folder.join(&entry.file_name))?;
        let mut analysed = 0;

        for (idx, game) in games.iter().enumerate() {
            let game_number = idx + 1;
            if !game.is_finished() {
                info!(
                    file = %entry.file_name,
                    game = game_number,
                    result = game.result().unwrap_or("none"),
                    "unfinished game skipped"
                );
                continue;
            }

            let result = analyzer
                .analyze_game(game, logs)
                .map_err(|source| BatchError::Analysis {
                    file: entry.file_name.clone(),
                    source,
                })?;
            let stats = match scope {
                PlyScope::All => result.combined(),
                PlyScope::Labelled => result.side(side).clone(),
            };

            write_game_lines(logs, &entry.color, &entry.file_name, &stats)?;
            info!(
                file = %entry.file_name,
                game = game_number,
                event = game.headers.event.as_deref().unwrap_or("?"),
                white = game.headers.white.as_deref().unwrap_or("?"),
                black = game.headers.black.as_deref().unwrap_or("?"),
                color = %entry.color,
                plies = result.moves.len(),
                acpl = stats.avg_cp_loss(),
                accuracy = stats.accuracy_percent(),
                "game analysed"
            );

            report.aggregate.record(&entry.color, &stats);
            report.games.push(GameReport {
                file_name: entry.file_name.clone(),
                game_number: Some(game_number),
                label: entry.color.clone(),
                result: Some(result),
                stats,
            });
            analysed += 1;
        }

        if analysed == 0 {
            warn!(
                file = %entry.file_name,
                games = games.len(),
                "no finished game in file, counted as zero"
            );
            let empty = GameReport::empty(&entry.file_name, &entry.color);
            write_game_lines(logs, &entry.color, &entry.file_name, &empty.stats)?;
            report.aggregate.record(&entry.color, &empty.stats);
            report.games.push(empty);
        }
    }

    write_summary(&report.aggregate, logs)?;
    logs.flush()?;
    Ok(report)
}

/// Appends the per-game ACPL and accuracy lines.
fn write_game_lines<L: LogSink + ?Sized>(
    logs: &mut L,
    color: &ColorLabel,
    file_name: &str,
    stats: &PlayerStats,
) -> Result<(), LogError> {
    logs.append(
        LogStream::Acpl,
        &format!(
            "Average Centipawn Loss (ACPL) for {}: {}",
            color,
            stats.avg_cp_loss() as i64
        ),
    )?;
    logs.append(
        LogStream::Accuracy,
        &format!(
            "Accuracy for {} in {}: {:.1}%",
            color,
            file_name,
            stats.accuracy_percent()
        ),
    )
}

/// Appends the folder-level averages to the summary streams.
pub fn write_summary<L: LogSink + ?Sized>(
    aggregate: &FolderAggregate,
    logs: &mut L,
) -> Result<(), LogError> {
    logs.append(
        LogStream::Acpl,
        &format!(
            "Average Centipawn Loss for Black: {}",
            aggregate.black.avg_cp_loss() as i64
        ),
    )?;
    logs.append(
        LogStream::Acpl,
        &format!(
            "Average Centipawn Loss for White: {}",
            aggregate.white.avg_cp_loss() as i64
        ),
    )?;
    logs.append(
        LogStream::Acpl,
        &format!("Average Centipawn Loss: {}", aggregate.overall_cp_loss() as i64),
    )?;

    logs.append(
        LogStream::Accuracy,
        &format!(
            "Average Accuracy for Black: {:.1}%",
            aggregate.black.accuracy_percent()
        ),
    )?;
    logs.append(
        LogStream::Accuracy,
        &format!(
            "Average Accuracy for White: {:.1}%",
            aggregate.white.accuracy_percent()
        ),
    )?;
    logs.append(
        LogStream::Accuracy,
        &format!("Average Accuracy: {:.1}%", aggregate.overall_accuracy()),
    )
}

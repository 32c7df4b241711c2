mod config;

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use chess_analysis::{
    run_batch, AnalysisEngine, BatchReport, FileLogs, GameAnalyzer, MoveTier, PlayerStats, Side,
};
use clap::Parser;
use config::ReviewConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "acpl")]
#[command(about = "Accuracy and average centipawn loss for a folder of PGN games")]
struct Cli {
    /// Folder holding the PGN files and the manifest
    #[arg(default_value = "./games")]
    folder: PathBuf,
    /// Configuration file (defaults to ./acpl.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Engine executable, overriding the configuration
    #[arg(short, long)]
    engine: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config =
        ReviewConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_engine_override(cli.engine);

    info!(
        engine = %config.stockfish_path,
        folder = %cli.folder.display(),
        logs = %config.log_dir.display(),
        "Starting analysis"
    );

    let engine = AnalysisEngine::new(&config.stockfish_path)
        .with_context(|| format!("Failed to start engine at {}", config.stockfish_path))?;
    info!(engine = engine.name(), "Engine ready");

    let mut analyzer = GameAnalyzer::new(engine, config.analysis.clone());
    let mut logs = FileLogs::open(&config.log_dir)
        .with_context(|| format!("Failed to open log directory {}", config.log_dir.display()))?;

    let report = run_batch(&mut analyzer, &cli.folder, &config.manifest, &mut logs)
        .with_context(|| format!("Batch analysis of {} failed", cli.folder.display()))?;

    print!("{}", render_summary(&report));
    Ok(())
}

/// Formats the end-of-run summary printed to stdout.
fn render_summary(report: &BatchReport) -> String {
    let aggregate = &report.aggregate;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Games: {} analysed, {} skipped",
        aggregate.total_games - aggregate.skipped_games,
        aggregate.skipped_games
    );
    for side in [Side::White, Side::Black] {
        let totals = aggregate.color(side);
        let _ = writeln!(
            out,
            "{:<6} {:>3} games  ACPL {:>4}  accuracy {:>5.1}%  {}",
            side.to_string(),
            totals.games,
            totals.avg_cp_loss() as i64,
            totals.accuracy_percent(),
            tier_counts(&totals.moves)
        );
    }
    let _ = writeln!(
        out,
        "Overall ACPL {}  accuracy {:.1}%",
        aggregate.overall_cp_loss() as i64,
        aggregate.overall_accuracy()
    );
    out
}

fn tier_counts(stats: &PlayerStats) -> String {
    MoveTier::ALL
        .iter()
        .map(|&tier| format!("{}: {}", tier, stats.tier_count(tier)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_analysis::{ColorLabel, FolderAggregate};
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_folder() {
        let cli = Cli::try_parse_from(["acpl"]).unwrap();
        assert_eq!(cli.folder, PathBuf::from("./games"));
        assert!(cli.config.is_none());
        assert!(cli.engine.is_none());
    }

    #[test]
    fn test_folder_and_overrides() {
        let cli = Cli::try_parse_from([
            "acpl",
            "tournament",
            "--config",
            "review.toml",
            "-e",
            "/usr/bin/stockfish",
        ])
        .unwrap();
        assert_eq!(cli.folder, PathBuf::from("tournament"));
        assert_eq!(cli.config, Some(PathBuf::from("review.toml")));
        assert_eq!(cli.engine.as_deref(), Some("/usr/bin/stockfish"));
    }

    #[test]
    fn test_extra_positional_is_rejected() {
        assert!(Cli::try_parse_from(["acpl", "a", "b"]).is_err());
    }

    #[test]
    fn test_render_summary() {
        let mut aggregate = FolderAggregate::new();
        let black = PlayerStats {
            total_moves: 2,
            blunders: 1,
            total_loss: 200,
            accuracy_sum: 150.0,
            ..PlayerStats::default()
        };
        let white = PlayerStats {
            total_moves: 1,
            total_loss: 200,
            accuracy_sum: 50.0,
            ..PlayerStats::default()
        };
        aggregate.record(&ColorLabel::Black, &black);
        aggregate.record(&ColorLabel::White, &white);
        aggregate.record(&ColorLabel::Other("none".to_string()), &PlayerStats::default());

        let report = BatchReport {
            games: Vec::new(),
            aggregate,
        };
        let summary = render_summary(&report);
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines[0], "Games: 2 analysed, 1 skipped");
        assert!(lines[1].starts_with("White"));
        assert!(lines[2].contains("ACPL  100"));
        assert!(lines[2].contains("blunder: 1"));
        assert_eq!(lines[3], "Overall ACPL 150  accuracy 62.5%");
    }
}

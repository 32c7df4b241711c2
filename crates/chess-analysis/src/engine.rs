//! UCI engine process used as the evaluation source.

use crate::Evaluation;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use thiserror::Error;
use tracing::{debug, trace};

/// Maximum number of lines read while waiting for one UCI reply.
pub const MAX_UCI_LINES: usize = 1000;

/// Errors that can occur when talking to an evaluation source.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process or talk to it.
    #[error("Failed to spawn engine: {0}")]
    SpawnError(#[from] std::io::Error),
    /// Engine executable was not found at the specified path.
    #[error("Engine not found at path: {0}")]
    NotFound(String),
    /// The `uci`/`isready` handshake did not complete.
    #[error("Engine initialization failed")]
    InitFailed,
    /// Engine returned an invalid or unexpected response.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
}

/// Outcome of one engine search.
#[derive(Debug, Clone)]
pub struct PositionAnalysis {
    /// Top move in UCI notation, e.g. `e2e4`.
    pub best_move: String,
    /// Score relative to the side to move.
    pub evaluation: Evaluation,
    /// Depth of the last complete iteration.
    pub depth: u32,
    pub nodes: u64,
    /// Principal variation, UCI moves.
    pub pv: Vec<String>,
}

/// Source of position evaluations.
///
/// Implementations must search to the requested depth so that scores
/// from one run are comparable, and report scores relative to the side
/// to move.
pub trait Evaluator {
    /// Prepares for a new, unrelated game.
    fn new_game(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Evaluates the position given as FEN.
    ///
    /// When `root_moves` is non-empty the search only considers those
    /// moves (UCI notation) at the root.
    fn evaluate(
        &mut self,
        fen: &str,
        depth: u32,
        root_moves: &[String],
    ) -> Result<PositionAnalysis, EngineError>;
}

/// Fields of one final `info` line.
#[derive(Debug, Clone, PartialEq)]
struct SearchInfo {
    depth: u32,
    evaluation: Evaluation,
    nodes: u64,
    pv: Vec<String>,
}

impl SearchInfo {
    /// Parses `info depth D ... score (cp|mate) N ... pv m1 m2 ...`.
    ///
    /// Lines without depth or score, and bound scores, yield `None`.
    fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("info") {
            return None;
        }

        let mut depth = None;
        let mut cp = None;
        let mut mate = None;
        let mut nodes = 0;

        while let Some(token) = tokens.next() {
            match token {
                "depth" => depth = tokens.next().and_then(|v| v.parse().ok()),
                "nodes" => nodes = tokens.next().and_then(|v| v.parse().ok()).unwrap_or(0),
                "score" => match tokens.next() {
                    Some("cp") => cp = tokens.next().and_then(|v| v.parse().ok()),
                    Some("mate") => mate = tokens.next().and_then(|v| v.parse().ok()),
                    _ => {}
                },
                "lowerbound" | "upperbound" => return None,
                // Everything after `pv` is the variation itself.
                "pv" => break,
                _ => {}
            }
        }

        Some(Self {
            depth: depth?,
            evaluation: Evaluation::from_uci_score(cp, mate)?,
            nodes,
            pv: tokens.map(str::to_string).collect(),
        })
    }
}

/// Builds the `go` command for a fixed-depth search.
fn go_command(depth: u32, root_moves: &[String]) -> String {
    if root_moves.is_empty() {
        format!("go depth {}", depth)
    } else {
        format!("go depth {} searchmoves {}", depth, root_moves.join(" "))
    }
}

/// A running UCI engine such as Stockfish.
///
/// The process lives as long as the value: it is started and handshaken in
/// [`AnalysisEngine::new`] and told to quit when dropped.
pub struct AnalysisEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    /// Name reported via `id name`.
    name: String,
}

impl AnalysisEngine {
    /// Spawns the engine and performs the UCI handshake.
    ///
    /// `engine_path` is either a path to the executable or a bare command
    /// name looked up in `PATH`.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotFound` if the executable doesn't exist
    /// - `EngineError::SpawnError` if the engine process fails to start
    /// - `EngineError::InitFailed` if the handshake does not complete
    pub fn new(engine_path: &str) -> Result<Self, EngineError> {
        let path = Path::new(engine_path);
        if path.components().count() > 1 && !path.exists() {
            return Err(EngineError::NotFound(engine_path.to_string()));
        }

        let mut process = Command::new(engine_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => EngineError::NotFound(engine_path.to_string()),
                _ => EngineError::SpawnError(e),
            })?;

        let stdin = process.stdin.take().ok_or(EngineError::InitFailed)?;
        let stdout = process.stdout.take().ok_or(EngineError::InitFailed)?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            name: String::from("Unknown Engine"),
        };
        engine.handshake()?;
        debug!(name = %engine.name, "engine ready");
        Ok(engine)
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        self.send_command("uci")?;
        let mut name = None;
        self.read_until(|line| {
            if let Some(id) = line.strip_prefix("id name ") {
                name = Some(id.to_string());
            }
            line == "uciok"
        })
        .map_err(|_| EngineError::InitFailed)?;

        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.name = name;
        }
        self.wait_ready()
    }

    /// Returns the engine's name as reported via UCI protocol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Searches the position given as FEN to a fixed depth.
    ///
    /// The reported score is taken from the last complete `info` line
    /// before `bestmove`.
    pub fn analyze_fen(
        &mut self,
        fen: &str,
        depth: u32,
        root_moves: &[String],
    ) -> Result<PositionAnalysis, EngineError> {
        self.send_command(&format!("position fen {}", fen))?;
        self.send_command(&go_command(depth, root_moves))?;

        let mut last_info: Option<SearchInfo> = None;
        let mut bestmove_line = String::new();
        self.read_until(|line| {
            if line.starts_with("info ") {
                if let Some(info) = SearchInfo::parse(line) {
                    last_info = Some(info);
                }
                false
            } else if line.starts_with("bestmove") {
                bestmove_line = line.to_string();
                true
            } else {
                false
            }
        })?;

        // "bestmove e2e4 ponder e7e5"
        let best_move = bestmove_line
            .split_whitespace()
            .nth(1)
            .filter(|mv| *mv != "(none)")
            .ok_or_else(|| EngineError::InvalidResponse("No best move received".to_string()))?
            .to_string();
        let info =
            last_info.ok_or_else(|| EngineError::InvalidResponse("No score received".to_string()))?;

        debug!(
            fen,
            depth = info.depth,
            nodes = info.nodes,
            best_move = %best_move,
            eval = %info.evaluation,
            "search finished"
        );

        Ok(PositionAnalysis {
            best_move,
            evaluation: info.evaluation,
            depth: info.depth,
            nodes: info.nodes,
            pv: info.pv,
        })
    }

    /// Clears the hash tables ahead of an unrelated game.
    pub fn clear_hash(&mut self) -> Result<(), EngineError> {
        self.send_command("ucinewgame")?;
        self.wait_ready()
    }

    fn wait_ready(&mut self) -> Result<(), EngineError> {
        self.send_command("isready")?;
        self.read_until(|line| line == "readyok")
            .map_err(|_| EngineError::InitFailed)
    }

    /// Feeds output lines to `done` until it returns true.
    fn read_until<F>(&mut self, mut done: F) -> Result<(), EngineError>
    where
        F: FnMut(&str) -> bool,
    {
        for _ in 0..MAX_UCI_LINES {
            let line = self.read_line()?;
            if done(&line) {
                return Ok(());
            }
        }
        Err(EngineError::InvalidResponse(format!(
            "No reply within {} lines",
            MAX_UCI_LINES
        )))
    }

    fn send_command(&mut self, command: &str) -> Result<(), EngineError> {
        trace!(command, "uci >");
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EngineError::InvalidResponse(
                "Engine closed unexpectedly".to_string(),
            ));
        }
        Ok(line.trim().to_string())
    }
}

impl Evaluator for AnalysisEngine {
    fn new_game(&mut self) -> Result<(), EngineError> {
        self.clear_hash()
    }

    fn evaluate(
        &mut self,
        fen: &str,
        depth: u32,
        root_moves: &[String],
    ) -> Result<PositionAnalysis, EngineError> {
        self.analyze_fen(fen, depth, root_moves)
    }
}

impl Drop for AnalysisEngine {
    fn drop(&mut self) {
        let _ = self.send_command("quit");
        let _ = self.process.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_not_found() {
        let result = AnalysisEngine::new("/nonexistent/path/to/stockfish");
        match result {
            Err(EngineError::NotFound(path)) => {
                assert_eq!(path, "/nonexistent/path/to/stockfish");
            }
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_bare_command_not_in_path() {
        let result = AnalysisEngine::new("no-such-uci-engine-binary");
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_engine_error_display() {
        let not_found = EngineError::NotFound("/path/to/engine".to_string());
        assert!(not_found.to_string().contains("/path/to/engine"));
        assert_eq!(
            EngineError::InitFailed.to_string(),
            "Engine initialization failed"
        );
    }

    #[test]
    fn test_go_command() {
        assert_eq!(go_command(15, &[]), "go depth 15");
        assert_eq!(
            go_command(18, &["e2e4".to_string()]),
            "go depth 18 searchmoves e2e4"
        );
    }

    #[test]
    fn test_parse_centipawn_info() {
        let info =
            SearchInfo::parse("info depth 15 score cp 35 nodes 50000 pv e2e4 e7e5 g1f3").unwrap();
        assert_eq!(info.depth, 15);
        assert_eq!(info.evaluation, Evaluation::Centipawns(35));
        assert_eq!(info.nodes, 50000);
        assert_eq!(info.pv, vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn test_parse_mate_info() {
        let line = "info depth 12 seldepth 4 multipv 1 score mate -3 nodes 10000 nps 500000 pv d1h5 g6h5";
        let info = SearchInfo::parse(line).unwrap();
        assert_eq!(info.depth, 12);
        assert_eq!(info.evaluation, Evaluation::Mate(-3));
        assert_eq!(info.pv.len(), 2);
    }

    #[test]
    fn test_pv_tokens_are_not_keywords() {
        // A move list never contains keywords, but parsing stops at `pv`.
        let info = SearchInfo::parse("info depth 8 score cp 12 pv e2e4 depth").unwrap();
        assert_eq!(info.depth, 8);
        assert_eq!(info.pv, vec!["e2e4", "depth"]);
    }

    #[test]
    fn test_parse_without_pv() {
        let info = SearchInfo::parse("info depth 5 score cp 0 nodes 1000").unwrap();
        assert!(info.pv.is_empty());
    }

    #[test]
    fn test_bound_scores_are_skipped() {
        assert!(SearchInfo::parse("info depth 18 score cp 40 lowerbound nodes 90000 pv e2e4").is_none());
        assert!(SearchInfo::parse("info depth 18 score mate 2 upperbound").is_none());
    }

    #[test]
    fn test_incomplete_info_is_skipped() {
        assert!(SearchInfo::parse("info score cp 35 nodes 50000 pv e2e4").is_none());
        assert!(SearchInfo::parse("info depth 15 nodes 50000 pv e2e4").is_none());
        assert!(SearchInfo::parse("info string NNUE evaluation enabled").is_none());
        assert!(SearchInfo::parse("bestmove e2e4").is_none());
    }
}

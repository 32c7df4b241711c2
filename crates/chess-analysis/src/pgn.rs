//! Reading recorded games from PGN files.
//!
//! Every game of a file is read, mainline only; variations, comments
//! and NAGs are skipped. Replaying the moves with `shakmaty`
//! yields, for every ply, the position the engine has to look at.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use pgn_reader::{Nag, Outcome, RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position};
use thiserror::Error;

use crate::color::Side;

/// Errors raised while loading or replaying a game.
#[derive(Error, Debug)]
pub enum PgnError {
    /// The PGN file could not be opened or read.
    #[error("Failed to read PGN {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The `FEN` tag does not describe a legal starting position.
    #[error("Invalid starting position: {0}")]
    InvalidFen(String),
    /// A mainline move is not legal in the replayed position.
    #[error("Illegal move {san} at ply {ply}: {reason}")]
    IllegalMove {
        ply: u32,
        san: String,
        reason: String,
    },
}

/// Tag pairs used by the analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameHeaders {
    pub event: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    /// Custom starting position, if the game does not start from the
    /// standard position.
    pub fen: Option<String>,
}

impl GameHeaders {
    fn set(&mut self, key: &[u8], value: RawTag<'_>) {
        let slot = match key {
            b"Event" => &mut self.event,
            b"White" => &mut self.white,
            b"Black" => &mut self.black,
            b"Result" => &mut self.result,
            b"FEN" => &mut self.fen,
            _ => return,
        };
        let bytes = value.as_bytes();
        if slot.is_none() && !bytes.is_empty() {
            *slot = Some(String::from_utf8_lossy(bytes).into_owned());
        }
    }
}

/// One recorded game: its headers and mainline moves.
#[derive(Debug, Clone, Default)]
pub struct RecordedGame {
    pub headers: GameHeaders,
    pub moves: Vec<SanPlus>,
    /// Result marker from the movetext, e.g. `1-0` or `*`.
    pub outcome: Option<String>,
}

impl RecordedGame {
    /// Game result from the `Result` tag, or the movetext marker when the
    /// tag is absent.
    pub fn result(&self) -> Option<&str> {
        self.headers
            .result
            .as_deref()
            .or(self.outcome.as_deref())
    }

    /// Whether the game reached a result. Games marked `*`, or carrying no
    /// result at all, are still in progress.
    pub fn is_finished(&self) -> bool {
        matches!(self.result(), Some(result) if result != "*")
    }

    /// Replays the mainline and returns one entry per ply.
    pub fn replay(&self) -> Result<Vec<ReplayedPly>, PgnError> {
        let mut pos = self.starting_position()?;
        let mut plies = Vec::with_capacity(self.moves.len());

        for (idx, san_plus) in self.moves.iter().enumerate() {
            let ply = idx as u32 + 1;
            let m = san_plus
                .san
                .to_move(&pos)
                .map_err(|e| PgnError::IllegalMove {
                    ply,
                    san: san_plus.to_string(),
                    reason: e.to_string(),
                })?;

            plies.push(ReplayedPly {
                ply,
                move_number: pos.fullmoves().get(),
                side: Side::from(pos.turn()),
                fen: Fen::from_position(&pos, EnPassantMode::Legal).to_string(),
                uci: m.to_uci(CastlingMode::Standard).to_string(),
                san: san_plus.to_string(),
            });
            pos.play_unchecked(m);
        }

        Ok(plies)
    }

    fn starting_position(&self) -> Result<Chess, PgnError> {
        match &self.headers.fen {
            None => Ok(Chess::default()),
            Some(fen) => {
                let parsed = fen
                    .parse::<Fen>()
                    .map_err(|e| PgnError::InvalidFen(e.to_string()))?;
                parsed
                    .into_position(CastlingMode::Standard)
                    .map_err(|e| PgnError::InvalidFen(e.to_string()))
            }
        }
    }
}

/// A ply ready to be shown to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayedPly {
    /// Ply index, starting at 1.
    pub ply: u32,
    /// Full-move number of the position before the move.
    pub move_number: u32,
    /// Side to move.
    pub side: Side,
    /// Position before the move.
    pub fen: String,
    /// The played move in UCI notation.
    pub uci: String,
    /// The played move as written in the PGN.
    pub san: String,
}

/// Collects headers and mainline moves of one game.
struct GameCollector;

impl Visitor for GameCollector {
    type Tags = GameHeaders;
    type Movetext = RecordedGame;
    type Output = RecordedGame;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameHeaders::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        tags.set(key, value);
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(RecordedGame {
            headers: tags,
            moves: Vec::new(),
            outcome: None,
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        movetext.moves.push(san_plus);
        ControlFlow::Continue(())
    }

    fn nag(&mut self, _: &mut Self::Movetext, _: Nag) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn comment(&mut self, _: &mut Self::Movetext, _: RawComment<'_>) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn outcome(&mut self, movetext: &mut Self::Movetext, outcome: Outcome) -> ControlFlow<Self::Output> {
        movetext.outcome = Some(outcome.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        movetext
    }
}

/// Reads every game from a PGN source, in order.
///
/// A source without games yields an empty list.
pub fn read_games<R: Read>(source: R, name: &str) -> Result<Vec<RecordedGame>, PgnError> {
    let mut reader = Reader::new(source);
    let mut games = Vec::new();
    loop {
        match reader.read_game(&mut GameCollector) {
            Ok(Some(game)) => games.push(game),
            Ok(None) => return Ok(games),
            Err(source) => {
                return Err(PgnError::Io {
                    path: PathBuf::from(name),
                    source,
                })
            }
        }
    }
}

/// Reads every game of a PGN file.
pub fn read_games_file<P: AsRef<Path>>(path: P) -> Result<Vec<RecordedGame>, PgnError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PgnError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_games(BufReader::new(file), &path.display().to_string())
}

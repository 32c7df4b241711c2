//! Side-to-move and manifest color labels.

use std::fmt;

/// The side that played a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl From<shakmaty::Color> for Side {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Side::White,
            shakmaty::Color::Black => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

/// Color label attached to a game by the batch manifest.
///
/// The label is supplied externally and only decides which per-color
/// bucket a game is folded into. Anything other than `black` or `white`
/// (case-insensitive) is kept verbatim as [`ColorLabel::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorLabel {
    Black,
    White,
    Other(String),
}

impl ColorLabel {
    /// Parses a manifest label, ignoring case and surrounding whitespace.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "black" => ColorLabel::Black,
            "white" => ColorLabel::White,
            _ => ColorLabel::Other(trimmed.to_string()),
        }
    }

    /// The side this label buckets into, or `None` for unrecognized labels.
    pub fn side(&self) -> Option<Side> {
        match self {
            ColorLabel::Black => Some(Side::Black),
            ColorLabel::White => Some(Side::White),
            ColorLabel::Other(_) => None,
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorLabel::Black => write!(f, "Black"),
            ColorLabel::White => write!(f, "White"),
            ColorLabel::Other(label) => write!(f, "{}", label),
        }
    }
}

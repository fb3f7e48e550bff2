use thiserror::Error;

use crate::{CellCount, Coord, Coord2, PlayerId};

/// Rejected board operation. The board is left unchanged whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid board dimensions {rows}x{cols} for {cards} cards")]
    InvalidDimensions {
        rows: Coord,
        cols: Coord,
        cards: usize,
    },
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid player id {0:?}")]
    InvalidPlayerId(String),
    #[error("Invalid card token {0:?}")]
    InvalidCard(String),
    #[error("No card at {0:?}")]
    EmptyCell(Coord2),
    #[error("Card at {coords:?} is already controlled by {by}")]
    Controlled { coords: Coord2, by: PlayerId },
    #[error("Card at {0:?} is already held as the first card")]
    AlreadyHeld(Coord2),
    #[error("Player is not holding a card")]
    NothingHeld,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Malformed board description.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    EmptyInput,
    #[error("invalid board dimensions format {0:?}")]
    MalformedDimensions(String),
    #[error("board dimensions {0:?} are too large")]
    DimensionsTooLarge(String),
    #[error("board dimensions must be positive")]
    NonPositiveDimensions,
    #[error("missing card at line {line}")]
    MissingCard { line: usize },
    #[error("invalid card format at line {line}")]
    MalformedCard { line: usize },
    #[error("expected {expected} cards but found {found}")]
    CardCountMismatch { expected: CellCount, found: CellCount },
    #[error(transparent)]
    Board(#[from] GameError),
}

/// Failure to load a board from a file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read board file")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

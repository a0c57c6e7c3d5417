use thiserror::Error;

/// Errors a [`crate::board::Board`] can signal from its public operations.
///
/// These are the "permanent failure" outcomes: each leaves the board
/// in a state that still satisfies every invariant, and none of them are
/// retried internally — the caller decides whether to reissue the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("no card at row {row}, col {col}")]
    NoCardAtPosition { row: usize, col: usize },

    #[error("card at row {row}, col {col} is controlled by another player")]
    CardControlledByOther { row: usize, col: usize },

    #[error("coordinates ({row}, {col}) are out of range for a {rows}x{cols} board")]
    InvalidCoordinates {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("invalid player id {0:?}: must be non-empty letters, digits, or underscores")]
    InvalidPlayerId(String),

    #[error("map transform produced an invalid value {0:?}: must be non-empty and whitespace-free")]
    InvalidMappedValue(String),
}

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::board::Board;

/// Errors raised by [`parse_from_str`] and [`parse_from_file`] when a board
/// file violates the board-file grammar. No `Board` is constructed on any of these.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("board file is empty")]
    EmptyFile,

    #[error("malformed header {0:?}: expected ROWSxCOLS with both at least 1")]
    BadHeader(String),

    #[error("expected {expected} card lines but found {found}")]
    WrongCardCount { expected: usize, found: usize },

    #[error("blank line before the last card line (line {line})")]
    BlankLine { line: usize },

    #[error("card value {0:?} is empty or contains whitespace")]
    InvalidCardValue(String),

    #[error("unexpected non-blank content after the last card line (line {line})")]
    TrailingContent { line: usize },

    #[error("could not read board file {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::sync::Arc<std::io::Error>,
    },
}

/// Parses the board-file grammar:
///
/// ```text
/// file      := header LF cardline (LF cardline){rows*cols - 1} LF?
/// header    := digits "x" digits
/// cardline  := non-empty run of non-whitespace characters
/// ```
///
/// Trailing blank lines are tolerated; a blank line anywhere between the
/// header and the last card line is a parse error.
pub fn parse_from_str(text: &str) -> Result<Board, ParseError> {
    let mut lines = text.lines();

    let header = lines.next().ok_or(ParseError::EmptyFile)?;
    let (rows, cols) = parse_header(header)?;
    let expected = rows * cols;

    let mut values = Vec::with_capacity(expected);
    let mut line_no = 1usize;
    for _ in 0..expected {
        line_no += 1;
        let line = lines.next().ok_or(ParseError::WrongCardCount {
            expected,
            found: values.len(),
        })?;
        if line.is_empty() {
            return Err(ParseError::BlankLine { line: line_no });
        }
        if line.chars().any(char::is_whitespace) {
            return Err(ParseError::InvalidCardValue(line.to_owned()));
        }
        values.push(line.to_owned());
    }

    for line in lines {
        line_no += 1;
        if !line.is_empty() {
            return Err(ParseError::TrailingContent { line: line_no });
        }
    }

    Ok(Board::from_values(rows, cols, values))
}

fn parse_header(header: &str) -> Result<(usize, usize), ParseError> {
    let (rows_str, cols_str) = header
        .split_once('x')
        .ok_or_else(|| ParseError::BadHeader(header.to_owned()))?;

    let rows: usize = rows_str
        .parse()
        .map_err(|_| ParseError::BadHeader(header.to_owned()))?;
    let cols: usize = cols_str
        .parse()
        .map_err(|_| ParseError::BadHeader(header.to_owned()))?;

    if rows == 0 || cols == 0 {
        return Err(ParseError::BadHeader(header.to_owned()));
    }

    Ok((rows, cols))
}

/// Reads a board file from disk and parses it per the board-file grammar.
pub fn parse_from_file(path: impl AsRef<Path>) -> Result<Board, ParseError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        source: std::sync::Arc::new(e),
    })?;
    parse_from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_board() {
        let board = parse_from_str("2x2\na\na\nb\nb\n").unwrap();
        assert_eq!(board.rows(), 2);
        assert_eq!(board.cols(), 2);
    }

    #[test]
    fn tolerates_trailing_blank_lines() {
        let board = parse_from_str("2x2\na\na\nb\nb\n\n\n").unwrap();
        assert_eq!(board.rows(), 2);
    }

    #[test]
    fn rejects_blank_line_before_last_card() {
        let err = parse_from_str("2x2\na\n\nb\nb\n").unwrap_err();
        assert!(matches!(err, ParseError::BlankLine { .. }));
    }

    #[test]
    fn rejects_wrong_card_count() {
        let err = parse_from_str("2x2\na\na\nb\n").unwrap_err();
        assert!(matches!(err, ParseError::WrongCardCount { expected: 4, found: 3 }));
    }

    #[test]
    fn rejects_whitespace_in_card_value() {
        let err = parse_from_str("1x1\nhas space\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidCardValue(_)));
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(matches!(parse_from_str("2-2\na\n").unwrap_err(), ParseError::BadHeader(_)));
        assert!(matches!(parse_from_str("0x2\n").unwrap_err(), ParseError::BadHeader(_)));
    }

    #[test]
    fn round_trips_a_fresh_board() {
        let board = parse_from_str("3x3\na\na\nb\nb\nc\nc\nd\nd\ne\n").unwrap();
        let look = board.look("anyone").unwrap();
        // strip the header and any `my `/`up `/`down`/`none` markers back to raw values
        let values: Vec<&str> = look
            .lines()
            .skip(1)
            .map(|spot| match spot {
                "down" => "down",
                other => other.rsplit(' ').next().unwrap_or(other),
            })
            .collect();
        assert_eq!(values, vec!["down"; 9]);
    }
}

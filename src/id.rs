use std::fmt;

use crate::error::BoardError;

/// A validated, opaque player identifier.
///
/// The alphabet is fixed at letters, digits, and underscore, and forbids the
/// reserved tokens used by the board-string grammar (`none`, `down`, `up`,
/// `my`) so that a `spot` line can never be mistaken for a player id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

const RESERVED: &[&str] = &["none", "down", "up", "my"];

impl PlayerId {
    pub fn parse(raw: &str) -> Result<PlayerId, BoardError> {
        let valid = !raw.is_empty()
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !RESERVED.contains(&raw);

        if valid {
            Ok(PlayerId(raw.to_owned()))
        } else {
            Err(BoardError::InvalidPlayerId(raw.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

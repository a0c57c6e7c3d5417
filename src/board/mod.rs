mod cell;
mod format;
mod state;

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

pub use cell::{Cell, Face};

use crate::error::BoardError;
use crate::id::PlayerId;
use state::BoardState;

/// A concurrent, mutable Memory Scramble board.
///
/// `Board` is cheap to clone: it is a thin handle around an `Arc` to shared
/// state, so every client (a handler thread, a `watch` waiter, a test) holds
/// its own handle to the same board rather than a borrow of it. All access
/// to the grid, the player table, and the change counter goes through a
/// single mutex (`inner.state`).
/// Two condition variables hang off that same mutex: `released`, broadcast
/// whenever a controller is dropped or a cell is emptied (wakes position
/// waiters), and `changed`, broadcast whenever anything a `look` could
/// observe is mutated (wakes `watch` callers).
#[derive(Clone)]
pub struct Board {
    inner: Arc<Inner>,
}

struct Inner {
    rows: usize,
    cols: usize,
    state: Mutex<BoardState>,
    released: Condvar,
    changed: Condvar,
}

impl Board {
    /// Builds a board from a row-major list of card values, all face-down,
    /// uncontrolled, with no players yet recorded.
    ///
    /// This is the constructor [`crate::parse::parse_from_str`] and
    /// [`crate::parse::parse_from_file`] build on after validating the
    /// board-file grammar; call it directly when a board is assembled
    /// in-memory instead of from a file (tests, embedding applications).
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != rows * cols`.
    pub fn from_values(rows: usize, cols: usize, values: Vec<String>) -> Board {
        assert_eq!(values.len(), rows * cols, "card count must equal rows * cols");
        let cells = values.into_iter().map(Cell::down).collect();
        Board {
            inner: Arc::new(Inner {
                rows,
                cols,
                state: Mutex::new(BoardState::new(cells)),
                released: Condvar::new(),
                changed: Condvar::new(),
            }),
        }
    }

    pub fn rows(&self) -> usize {
        self.inner.rows
    }

    pub fn cols(&self) -> usize {
        self.inner.cols
    }

    fn validate_coords(&self, row: usize, col: usize) -> Result<usize, BoardError> {
        if row < self.inner.rows && col < self.inner.cols {
            Ok(row * self.inner.cols + col)
        } else {
            Err(BoardError::InvalidCoordinates {
                row,
                col,
                rows: self.inner.rows,
                cols: self.inner.cols,
            })
        }
    }

    fn look_locked(&self, guard: &BoardState, viewer: &PlayerId) -> String {
        format::render(self.inner.rows, self.inner.cols, &guard.cells, viewer)
    }

    /// Attempts the next flip in `player_id`'s move sequence.
    ///
    /// Blocks the calling thread only in the first-card "controlled by
    /// another player" case; every other outcome, success or failure, is
    /// immediate.
    pub fn flip(&self, player_id: &str, row: usize, col: usize) -> Result<String, BoardError> {
        let player = PlayerId::parse(player_id)?;
        let pos = self.validate_coords(row, col)?;

        let mut guard = self.inner.state.lock().unwrap();
        loop {
            let step = guard.step_flip(&player, pos, row, col);

            if step.released {
                self.inner.released.notify_all();
            }
            if step.changed {
                self.inner.changed.notify_all();
            }

            match step.outcome {
                Some(Ok(())) => return Ok(self.look_locked(&guard, &player)),
                Some(Err(e)) => return Err(e),
                None => {
                    guard = self.wait_for_release(guard);
                }
            }
        }
    }

    fn wait_for_release<'a>(&'a self, guard: MutexGuard<'a, BoardState>) -> MutexGuard<'a, BoardState> {
        self.inner.released.wait(guard).unwrap()
    }

    /// Returns a snapshot of the grid from `player_id`'s perspective.
    /// Never suspends, never mutates.
    pub fn look(&self, player_id: &str) -> Result<String, BoardError> {
        let player = PlayerId::parse(player_id)?;
        let guard = self.inner.state.lock().unwrap();
        Ok(self.look_locked(&guard, &player))
    }

    /// Blocks until the board's change counter strictly exceeds its value
    /// at the time of the call, then returns the next snapshot.
    pub fn watch(&self, player_id: &str) -> Result<String, BoardError> {
        let player = PlayerId::parse(player_id)?;
        let mut guard = self.inner.state.lock().unwrap();
        let baseline = guard.version;
        while guard.version <= baseline {
            guard = self.inner.changed.wait(guard).unwrap();
        }
        Ok(self.look_locked(&guard, &player))
    }

    /// Atomically replaces every non-empty cell's value `v` with `f(v)`,
    /// preserving pairwise equality.
    ///
    /// `f` is invoked once per distinct value while the board's exclusion is
    /// held, so it may itself block without any other `flip`/`look`/`watch`
    /// observing a partially-mapped grid — but `f` must not call back into
    /// this `Board`, or it will deadlock against its own lock.
    pub fn map<F>(&self, mut f: F) -> Result<(), BoardError>
    where
        F: FnMut(&str) -> Result<String, BoardError>,
    {
        use itertools::Itertools;

        let mut guard = self.inner.state.lock().unwrap();

        let distinct: Vec<String> = guard
            .cells
            .iter()
            .filter_map(Cell::value)
            .unique()
            .map(str::to_owned)
            .collect();

        let mut mapping = std::collections::HashMap::with_capacity(distinct.len());
        for value in distinct {
            let mapped = f(&value)?;
            if mapped.is_empty() || mapped.chars().any(char::is_whitespace) {
                return Err(BoardError::InvalidMappedValue(mapped));
            }
            mapping.insert(value, mapped);
        }

        let mut changed = false;
        for cell in guard.cells.iter_mut() {
            if let Cell::Card { value, .. } = cell {
                if let Some(mapped) = mapping.get(value.as_str()) {
                    if mapped != value {
                        changed = true;
                    }
                    *value = mapped.clone();
                }
            }
        }

        if changed {
            guard.version += 1;
            self.inner.changed.notify_all();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_3x3() -> Board {
        let values = ["a", "a", "b", "b", "c", "c", "d", "d", "e"]
            .into_iter()
            .map(String::from)
            .collect();
        Board::from_values(3, 3, values)
    }

    #[test]
    fn look_is_pure_between_mutations() {
        let board = board_3x3();
        let a = board.look("alice").unwrap();
        let b = board.look("alice").unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("3x3"));
    }

    #[test]
    fn match_then_remove_on_next_move() {
        let board = board_3x3();
        let v = board.flip("alice", 0, 0).unwrap();
        assert!(v.lines().nth(1).unwrap() == "my a");

        let v = board.flip("alice", 0, 1).unwrap();
        // both now face up, uncontrolled
        assert!(v.lines().nth(1).unwrap() == "up a");
        assert!(v.lines().nth(2).unwrap() == "up a");

        let v = board.flip("alice", 1, 0).unwrap();
        assert_eq!(v.lines().nth(1).unwrap(), "none");
        assert_eq!(v.lines().nth(2).unwrap(), "none");
        assert_eq!(v.lines().nth(4).unwrap(), "my b");
    }

    #[test]
    fn non_match_flips_back_down_on_next_move() {
        let board = board_3x3();
        board.flip("alice", 0, 0).unwrap();
        let v = board.flip("alice", 0, 2).unwrap();
        assert_eq!(v.lines().nth(1).unwrap(), "up a");
        assert_eq!(v.lines().nth(3).unwrap(), "up b");

        let v = board.flip("alice", 1, 0).unwrap();
        assert_eq!(v.lines().nth(1).unwrap(), "down");
        assert_eq!(v.lines().nth(3).unwrap(), "down");
        assert_eq!(v.lines().nth(4).unwrap(), "my b");
    }

    #[test]
    fn empty_second_card_releases_first_and_fails() {
        let board = board_3x3();
        board.flip("alice", 0, 0).unwrap();
        board.flip("alice", 0, 1).unwrap();
        board.flip("alice", 1, 0).unwrap(); // cleanup removes (0,0),(0,1)

        board.flip("bob", 1, 1).unwrap(); // bob controls (1,1), value "c"
        let err = board.flip("bob", 0, 0).unwrap_err();
        assert!(matches!(err, BoardError::NoCardAtPosition { row: 0, col: 0 }));

        let v = board.look("alice").unwrap();
        assert_eq!(v.lines().nth(5).unwrap(), "up c");
    }

    #[test]
    fn second_card_controlled_fails_without_waiting() {
        let board = board_3x3();
        board.flip("alice", 0, 0).unwrap();
        board.flip("bob", 1, 1).unwrap();

        let err = board.flip("bob", 0, 0).unwrap_err();
        assert!(matches!(err, BoardError::CardControlledByOther { row: 0, col: 0 }));

        let v = board.look("carol").unwrap();
        assert_eq!(v.lines().nth(5).unwrap(), "up c");
    }

    #[test]
    fn flipping_same_cell_twice_leaves_it_face_up_uncontrolled() {
        let board = board_3x3();
        board.flip("alice", 0, 0).unwrap();
        let err = board.flip("alice", 0, 0).unwrap_err();
        assert!(matches!(err, BoardError::CardControlledByOther { row: 0, col: 0 }));

        let v = board.look("bob").unwrap();
        assert_eq!(v.lines().nth(1).unwrap(), "up a");
    }

    #[test]
    fn map_preserves_pairwise_equality() {
        let board = board_3x3();
        board.map(|v| Ok(format!("{v}_x"))).unwrap();
        let v = board.look("alice").unwrap();
        let lines: Vec<&str> = v.lines().skip(1).collect();
        assert_eq!(lines[0], "down"); // map doesn't change face
        // compare mapped values of originally-equal cells by re-flipping a pair
        board.flip("alice", 0, 0).unwrap();
        let snap = board.flip("alice", 0, 1).unwrap();
        let a = snap.lines().nth(1).unwrap();
        let b = snap.lines().nth(2).unwrap();
        assert_eq!(a, b);
        assert!(a.ends_with("_x"));
    }

    #[test]
    fn map_rejects_whitespace_values() {
        let board = board_3x3();
        let err = board.map(|_| Ok("has space".to_string())).unwrap_err();
        assert!(matches!(err, BoardError::InvalidMappedValue(_)));
    }

    #[test]
    fn invalid_player_id_rejected_without_state_change() {
        let board = board_3x3();
        let err = board.flip("not a name", 0, 0).unwrap_err();
        assert!(matches!(err, BoardError::InvalidPlayerId(_)));
        let v = board.look("alice").unwrap();
        assert_eq!(v.lines().nth(1).unwrap(), "down");
    }

    #[test]
    fn invalid_coordinates_rejected() {
        let board = board_3x3();
        let err = board.flip("alice", 9, 9).unwrap_err();
        assert!(matches!(err, BoardError::InvalidCoordinates { .. }));
    }
}

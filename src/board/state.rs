use std::collections::HashMap;

use super::cell::{Cell, Face};
use crate::error::BoardError;
use crate::id::PlayerId;

/// A move that has completed but not yet been cleaned up.
#[derive(Clone, Debug)]
pub(super) struct PreviousMove {
    pub positions: Vec<usize>,
    pub matched: bool,
}

/// Per-player move state, keyed by [`PlayerId`] and created lazily on first use.
#[derive(Clone, Debug, Default)]
pub(super) struct PlayerMove {
    /// Positions this player currently controls; length is 0 or 1 between
    /// calls to `flip` (length 2 only exists transiently inside a single
    /// `flip` invocation).
    pub current: Vec<usize>,
    pub previous: Option<PreviousMove>,
}

/// The effect of one step of flip evaluation, reported back to the
/// exclusion-holding caller so it can decide which waiters to wake.
pub(super) struct StepResult {
    /// `None` means the step suspended: the caller must park on the
    /// position-waiter condition and re-evaluate from the top on wake.
    pub outcome: Option<Result<(), BoardError>>,
    /// A controller was released or a cell was emptied; wake position waiters.
    pub released: bool,
    /// Board-visible state changed; wake change waiters.
    pub changed: bool,
}

impl StepResult {
    fn suspend() -> StepResult {
        StepResult {
            outcome: None,
            released: false,
            changed: false,
        }
    }

    fn done(outcome: Result<(), BoardError>, released: bool, changed: bool) -> StepResult {
        StepResult {
            outcome: Some(outcome),
            released,
            changed,
        }
    }
}

/// The mutable representation guarded by the board's exclusion lock.
///
/// `rows`/`cols` are not stored here: they are fixed at construction and
/// live on the owning [`super::Board`] so coordinate checks never need the
/// lock.
pub(super) struct BoardState {
    pub cells: Vec<Cell>,
    pub players: HashMap<PlayerId, PlayerMove>,
    pub version: u64,
}

impl BoardState {
    pub fn new(cells: Vec<Cell>) -> BoardState {
        BoardState {
            cells,
            players: HashMap::new(),
            version: 0,
        }
    }

    fn clear_controller(&mut self, pos: usize) {
        if let Cell::Card { controller, .. } = &mut self.cells[pos] {
            *controller = None;
        }
    }

    fn release_and_record(&mut self, player: &PlayerId, positions: Vec<usize>, matched: bool) {
        for &p in &positions {
            self.clear_controller(p);
        }
        let pm = self.players.get_mut(player).expect("player entry must exist");
        pm.current.clear();
        pm.previous = Some(PreviousMove { positions, matched });
    }

    /// Runs the deferred cleanup if the player is idle and has a
    /// pending `previous` move. Returns whether anything was released or
    /// changed.
    fn cleanup(&mut self, player: &PlayerId) -> (bool, bool) {
        let should_run = {
            let pm = self.players.get(player).expect("player entry must exist");
            pm.current.is_empty() && pm.previous.is_some()
        };
        if !should_run {
            return (false, false);
        }

        let previous = self
            .players
            .get_mut(player)
            .unwrap()
            .previous
            .take()
            .unwrap();

        let mut released = false;
        let mut changed = false;

        if previous.matched {
            for p in previous.positions {
                if !self.cells[p].is_empty() {
                    self.cells[p] = Cell::Empty;
                    released = true;
                    changed = true;
                }
            }
        } else {
            for p in previous.positions {
                if let Cell::Card { face, controller, .. } = &mut self.cells[p] {
                    if *face == Face::Up && controller.is_none() {
                        *face = Face::Down;
                        changed = true;
                    }
                }
            }
        }

        (released, changed)
    }

    /// Evaluates one step of `flip` for `player` at linear position `pos`,
    /// after running pre-flip cleanup. `row`/`col` are passed through only
    /// for error messages.
    pub fn step_flip(
        &mut self,
        player: &PlayerId,
        pos: usize,
        row: usize,
        col: usize,
    ) -> StepResult {
        self.players.entry(player.clone()).or_default();

        let (mut released, mut changed) = self.cleanup(player);

        let current_len = self.players[player].current.len();
        let step = match current_len {
            0 => self.first_card(player, pos, row, col),
            1 => self.second_card(player, pos, row, col),
            _ => unreachable!("PlayerMove.current is never 2 between flip calls"),
        };

        released |= step.released;
        changed |= step.changed;
        if changed {
            self.version += 1;
        }
        StepResult {
            outcome: step.outcome,
            released,
            changed,
        }
    }

    fn first_card(&mut self, player: &PlayerId, pos: usize, row: usize, col: usize) -> StepResult {
        match &self.cells[pos] {
            Cell::Empty => StepResult::done(
                Err(BoardError::NoCardAtPosition { row, col }),
                false,
                false,
            ),
            Cell::Card {
                controller: Some(owner),
                ..
            } if owner != player => StepResult::suspend(),
            Cell::Card { .. } => {
                let mut changed = false;
                if let Cell::Card { face, controller, .. } = &mut self.cells[pos] {
                    if *face == Face::Down {
                        *face = Face::Up;
                        changed = true;
                    }
                    *controller = Some(player.clone());
                }
                self.players.get_mut(player).unwrap().current.push(pos);
                StepResult::done(Ok(()), false, changed)
            }
        }
    }

    fn second_card(&mut self, player: &PlayerId, pos: usize, row: usize, col: usize) -> StepResult {
        let first = self.players[player].current[0];

        if pos == first {
            self.release_and_record(player, vec![first], false);
            return StepResult::done(
                Err(BoardError::CardControlledByOther { row, col }),
                true,
                true,
            );
        }

        match &self.cells[pos] {
            Cell::Card {
                controller: Some(owner),
                ..
            } if owner != player => {
                self.release_and_record(player, vec![first], false);
                StepResult::done(
                    Err(BoardError::CardControlledByOther { row, col }),
                    true,
                    true,
                )
            }
            Cell::Empty => {
                self.release_and_record(player, vec![first], false);
                StepResult::done(Err(BoardError::NoCardAtPosition { row, col }), true, true)
            }
            Cell::Card { .. } => {
                if let Cell::Card { face, .. } = &mut self.cells[pos] {
                    *face = Face::Up;
                }

                let equal = self.cells[first].value() == self.cells[pos].value();
                if equal {
                    if let Cell::Card { controller, .. } = &mut self.cells[pos] {
                        *controller = Some(player.clone());
                    }
                    self.clear_controller(first);
                    self.clear_controller(pos);
                    let pm = self.players.get_mut(player).unwrap();
                    pm.current.clear();
                    pm.previous = Some(PreviousMove {
                        positions: vec![first, pos],
                        matched: true,
                    });
                } else {
                    self.clear_controller(first);
                    let pm = self.players.get_mut(player).unwrap();
                    pm.current.clear();
                    pm.previous = Some(PreviousMove {
                        positions: vec![first, pos],
                        matched: false,
                    });
                }
                StepResult::done(Ok(()), true, true)
            }
        }
    }
}

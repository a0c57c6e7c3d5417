use std::fmt::Write as _;

use super::cell::{Cell, Face};
use crate::id::PlayerId;

/// Renders the `look`/`watch`/`flip` board string for `viewer`.
pub(super) fn render(rows: usize, cols: usize, cells: &[Cell], viewer: &PlayerId) -> String {
    let mut out = String::with_capacity(cells.len() * 4);
    let _ = write!(out, "{rows}x{cols}");

    for cell in cells {
        out.push('\n');
        match cell {
            Cell::Empty => out.push_str("none"),
            Cell::Card {
                face: Face::Down, ..
            } => out.push_str("down"),
            Cell::Card {
                value,
                face: Face::Up,
                controller,
            } => {
                if controller.as_ref() == Some(viewer) {
                    out.push_str("my ");
                } else {
                    out.push_str("up ");
                }
                out.push_str(value);
            }
        }
    }

    out
}

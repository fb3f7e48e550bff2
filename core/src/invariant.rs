//! Representation checks for [`Board`](crate::Board).
//!
//! Cell-level rules (no card on an empty cell, controllers only on face-up cards) are carried by
//! the shape of [`Cell`]. What is left to check at runtime is the agreement between the
//! controllers recorded on cells and the holdings recorded per participant. Any disagreement is a
//! bug in the board's own mutation logic, so every check panics instead of returning an error.

use hashbrown::HashMap;

use crate::*;

/// Full check over every cell and every participant. Callers hold all involved locks.
pub(crate) fn check_board<'a>(
    size: Coord2,
    cells: impl ExactSizeIterator<Item = &'a Cell>,
    players: impl IntoIterator<Item = (&'a PlayerId, &'a PlayerState)>,
) {
    let (rows, cols) = size;
    assert!(rows > 0, "rows must be positive");
    assert!(cols > 0, "cols must be positive");
    assert_eq!(
        cells.len(),
        mult(rows, cols) as usize,
        "grid must hold exactly {rows}x{cols} cells"
    );

    let cells: Vec<&Cell> = cells.collect();
    let mut controlled: HashMap<Coord2, &PlayerId> = HashMap::new();
    for (offset, cell) in cells.iter().enumerate() {
        let coords = from_row_major(offset, cols);
        check_cell(coords, cell);
        if let Some(owner) = cell.controller() {
            controlled.insert(coords, owner);
        }
    }

    let lookup = |coords: Coord2| cells.get(row_major(coords, cols)).copied();
    let mut holders: HashMap<Coord2, &PlayerId> = HashMap::new();
    for (player, state) in players {
        check_player(size, player, state, lookup);
        for coords in state.held() {
            if let Some(other) = holders.insert(coords, player) {
                panic!("card at {coords:?} held by both {other} and {player}");
            }
        }
    }

    for (coords, owner) in controlled {
        assert_eq!(
            holders.get(&coords),
            Some(&owner),
            "card at {coords:?} is controlled by {owner} but not recorded as held"
        );
    }
}

/// Check after a single operation: the cells it locked and the participant that acted.
///
/// Every cell the participant holds must be among `cells`.
pub(crate) fn check_local<'a>(
    size: Coord2,
    cells: &[(Coord2, &'a Cell)],
    player: &PlayerId,
    state: &PlayerState,
) {
    for (coords, cell) in cells {
        check_cell(*coords, cell);
    }

    check_player(size, player, state, |coords| {
        cells
            .iter()
            .find(|(locked, _)| *locked == coords)
            .map(|(_, cell)| *cell)
    });

    let held = state.held();
    for (coords, cell) in cells {
        if cell.is_controlled_by(player) {
            assert!(
                held.contains(coords),
                "card at {coords:?} is controlled by {player} but not recorded as held"
            );
        }
    }
}

fn check_cell(coords: Coord2, cell: &Cell) {
    if let Some(card) = cell.card() {
        assert!(
            Card::is_valid_token(card.as_str()),
            "card at {coords:?} has an invalid token {card:?}"
        );
    }
}

fn check_player<'a>(
    size: Coord2,
    player: &PlayerId,
    state: &PlayerState,
    cell_at: impl Fn(Coord2) -> Option<&'a Cell>,
) {
    let in_bounds = |(row, col): Coord2| row < size.0 && col < size.1;

    if state.first.is_some() {
        assert!(
            state.pending.is_none(),
            "{player} holds a first card with an unsettled previous move"
        );
    }

    for coords in state.held() {
        assert!(in_bounds(coords), "{player} holds {coords:?} outside the board");
        let cell = cell_at(coords)
            .unwrap_or_else(|| panic!("{player} holds {coords:?} but the cell was not checked"));
        assert!(
            matches!(cell, Cell::FaceUp(..)) && cell.is_controlled_by(player),
            "{player} holds {coords:?} but the cell is {cell:?}"
        );
    }

    match &state.pending {
        Some(Pending::Matched(a, b)) => {
            assert_ne!(a, b, "{player} matched a card with itself");
            if let (Some(first), Some(second)) = (cell_at(*a), cell_at(*b)) {
                assert_eq!(
                    first.card(),
                    second.card(),
                    "{player} matched different cards at {a:?} and {b:?}"
                );
            }
        }
        Some(Pending::Mismatched(relinquished)) => {
            assert!(
                (1..=2).contains(&relinquished.len()),
                "{player} relinquished {} cards",
                relinquished.len()
            );
            for coords in relinquished {
                assert!(
                    in_bounds(*coords),
                    "{player} relinquished {coords:?} outside the board"
                );
            }
        }
        None => {}
    }
}

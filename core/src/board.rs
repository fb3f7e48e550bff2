use hashbrown::HashMap;
use ndarray::Array2;
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::sync::Arc;

use crate::*;

type PlayerSlot = Arc<Mutex<PlayerState>>;

/// Outcome of a successful [`Board::flip`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipOutcome {
    /// First card was face down and is now face up under the player's control.
    Revealed,
    /// First card was already face up and uncontrolled; the player took control of it.
    Claimed,
    /// Second card matched the first; the player keeps control of both until their next move.
    Matched,
    /// Second card did not match; both cards stay face up and are relinquished.
    Mismatched,
}

/// Outcome of settling a participant's previous move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettleOutcome {
    Nothing,
    /// Matched pair removed from the board.
    Removed(Coord2, Coord2),
    /// Number of relinquished cards turned back face down.
    Restored(usize),
}

impl SettleOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Nothing | Self::Restored(0) => false,
            Self::Removed(..) | Self::Restored(_) => true,
        }
    }
}

/// Shared Memory Scramble board.
///
/// Every cell sits behind its own lock. An operation locks the acting participant first and then
/// the cells it touches in ascending row-major order, stages its changes on copies, and writes
/// them back only once every precondition held. Nothing outside the board ever sees a reference
/// into it: reads return owned copies.
#[derive(Debug)]
pub struct Board {
    size: Coord2,
    cells: Array2<Mutex<Cell>>,
    players: RwLock<HashMap<PlayerId, PlayerSlot>>,
}

impl Board {
    pub fn new(layout: Layout) -> Self {
        let size = layout.size();
        let cells = layout
            .cards()
            .map(|card| Mutex::new(Cell::FaceDown(card.clone())));
        let board = Self {
            size,
            cells,
            players: RwLock::new(HashMap::new()),
        };
        board.check_rep();
        log::debug!("created {}x{} board", size.0, size.1);
        board
    }

    pub fn from_cards(size: Coord2, cards: Vec<Card>) -> Result<Self> {
        Layout::from_cards(size, cards).map(Self::new)
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.size.0 && coords.1 < self.size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[coords.to_nd_index()].lock().clone())
    }

    /// Copy of every cell, taken while all cells are locked.
    pub fn snapshot(&self) -> BoardSnapshot {
        let guards: Vec<MutexGuard<'_, Cell>> = self.cells.iter().map(|cell| cell.lock()).collect();
        let mut cells: Array2<Cell> = Array2::default(self.size.to_nd_index());
        for (slot, guard) in cells.iter_mut().zip(&guards) {
            *slot = Cell::clone(guard);
        }
        BoardSnapshot::new(cells)
    }

    pub fn render(&self) -> String {
        self.snapshot().to_string()
    }

    pub fn player_view(&self, player: &PlayerId) -> Option<PlayerView> {
        let slot = self.players.read().get(player).map(Arc::clone)?;
        let view = slot.lock().view();
        Some(view)
    }

    /// Participants that have acted on this board, sorted.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.players.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Turns over a card for `player`.
    ///
    /// When the player holds no card this is their first card: their previous move is settled
    /// (a matched pair is removed, relinquished cards still face up and free are turned face
    /// down) and the target must then be a card nobody controls. Otherwise this is their second
    /// card, which is compared against the first.
    ///
    /// On error nothing changes, including the settling of the previous move.
    pub fn flip(&self, player: &PlayerId, coords: Coord2) -> Result<FlipOutcome> {
        let coords = self.validate_coords(coords)?;
        let slot = self.player_slot(player);
        let mut state = slot.lock();
        let mut next = state.clone();
        let mut staged = self.lock_for(&state, Some(coords));

        let outcome = match state.first {
            None => {
                settle_pending(&mut staged, &mut next);
                take_first(&mut staged, &mut next, player, coords)?
            }
            Some(first) => take_second(&mut staged, &mut next, player, first, coords)?,
        };

        self.commit(staged, &mut state, next, player);
        log::debug!("{player} flipped {coords:?}: {outcome:?}");
        Ok(outcome)
    }

    /// Gives up the first card `player` is holding. The card stays face up and is turned back
    /// down on the player's next first card unless someone else takes it.
    pub fn release(&self, player: &PlayerId) -> Result<()> {
        let slot = self.player_slot(player);
        let mut state = slot.lock();
        let first = state.first.ok_or(GameError::NothingHeld)?;

        let mut next = state.clone();
        let mut staged = self.lock_for(&state, None);
        let card = held_card(&staged, player, first);
        staged.set(first, Cell::FaceUp(card, None));
        next.first = None;
        next.pending = Some(Pending::Mismatched(smallvec![first]));

        self.commit(staged, &mut state, next, player);
        log::debug!("{player} released {first:?}");
        Ok(())
    }

    /// Applies the effects of `player`'s previous move now instead of on their next first card.
    pub fn settle(&self, player: &PlayerId) -> SettleOutcome {
        let slot = self.player_slot(player);
        let mut state = slot.lock();
        let mut next = state.clone();
        let mut staged = self.lock_for(&state, None);

        let outcome = settle_pending(&mut staged, &mut next);

        self.commit(staged, &mut state, next, player);
        if outcome.has_update() {
            log::debug!("{player} settled: {outcome:?}");
        }
        outcome
    }

    /// Verifies the representation of the whole board, panicking on any inconsistency.
    ///
    /// Blocks until in-flight operations finish; new participants cannot join meanwhile.
    pub fn check_rep(&self) {
        let players = self.players.read();
        let mut slots: Vec<(&PlayerId, &PlayerSlot)> = players.iter().collect();
        slots.sort_by(|a, b| a.0.cmp(b.0));
        let states: Vec<(&PlayerId, MutexGuard<'_, PlayerState>)> =
            slots.into_iter().map(|(id, slot)| (id, slot.lock())).collect();
        let guards: Vec<MutexGuard<'_, Cell>> = self.cells.iter().map(|cell| cell.lock()).collect();

        invariant::check_board(
            self.size,
            guards.iter().map(|guard| &**guard),
            states.iter().map(|(id, state)| (*id, &**state)),
        );
    }

    fn player_slot(&self, player: &PlayerId) -> PlayerSlot {
        if let Some(slot) = self.players.read().get(player) {
            return Arc::clone(slot);
        }
        let mut players = self.players.write();
        let slot = players.entry(player.clone()).or_insert_with(|| {
            log::debug!("{player} joined");
            PlayerSlot::default()
        });
        Arc::clone(slot)
    }

    /// Locks every cell `state` refers to plus `target`, in ascending order.
    fn lock_for(&self, state: &PlayerState, target: Option<Coord2>) -> Staged<'_> {
        let mut coords: SmallVec<[Coord2; 4]> = state.held().into_iter().collect();
        coords.extend(state.pending_cells());
        coords.extend(target);
        coords.sort_unstable();
        coords.dedup();
        log::trace!("locking {coords:?}");

        let guards: SmallVec<[_; 4]> = coords
            .into_iter()
            .map(|coords| (coords, self.cells[coords.to_nd_index()].lock()))
            .collect();
        let scratch = guards.iter().map(|(_, guard)| Cell::clone(guard)).collect();
        Staged { guards, scratch }
    }

    fn commit(
        &self,
        mut staged: Staged<'_>,
        state: &mut PlayerState,
        next: PlayerState,
        player: &PlayerId,
    ) {
        staged.apply();
        *state = next;
        let committed: SmallVec<[(Coord2, &Cell); 4]> = staged
            .guards
            .iter()
            .map(|(coords, guard)| (*coords, &**guard))
            .collect();
        invariant::check_local(self.size, &committed, player, state);
    }
}

/// Locked cells with pending edits. Dropping it without [`Staged::apply`] discards the edits.
struct Staged<'a> {
    guards: SmallVec<[(Coord2, MutexGuard<'a, Cell>); 4]>,
    scratch: SmallVec<[Cell; 4]>,
}

impl Staged<'_> {
    fn slot(&self, coords: Coord2) -> usize {
        self.guards
            .iter()
            .position(|(locked, _)| *locked == coords)
            .unwrap_or_else(|| panic!("cell {coords:?} used without holding its lock"))
    }

    fn get(&self, coords: Coord2) -> &Cell {
        &self.scratch[self.slot(coords)]
    }

    fn set(&mut self, coords: Coord2, cell: Cell) {
        let slot = self.slot(coords);
        self.scratch[slot] = cell;
    }

    fn apply(&mut self) {
        for ((_, guard), cell) in self.guards.iter_mut().zip(self.scratch.drain(..)) {
            **guard = cell;
        }
    }
}

fn held_card(staged: &Staged<'_>, player: &PlayerId, coords: Coord2) -> Card {
    match staged.get(coords) {
        Cell::FaceUp(card, Some(owner)) if owner == player => card.clone(),
        cell => panic!("{player} holds {coords:?} but the cell is {cell:?}"),
    }
}

fn settle_pending(staged: &mut Staged<'_>, next: &mut PlayerState) -> SettleOutcome {
    match next.pending.take() {
        None => SettleOutcome::Nothing,
        Some(Pending::Matched(a, b)) => {
            staged.set(a, Cell::Empty);
            staged.set(b, Cell::Empty);
            SettleOutcome::Removed(a, b)
        }
        Some(Pending::Mismatched(relinquished)) => {
            let mut restored = 0;
            for coords in relinquished {
                if let Cell::FaceUp(card, None) = staged.get(coords) {
                    let card = card.clone();
                    staged.set(coords, Cell::FaceDown(card));
                    restored += 1;
                }
            }
            SettleOutcome::Restored(restored)
        }
    }
}

fn take_first(
    staged: &mut Staged<'_>,
    next: &mut PlayerState,
    player: &PlayerId,
    coords: Coord2,
) -> Result<FlipOutcome> {
    let (card, outcome) = match staged.get(coords) {
        Cell::Empty => return Err(GameError::EmptyCell(coords)),
        Cell::FaceUp(_, Some(owner)) => {
            return Err(GameError::Controlled {
                coords,
                by: owner.clone(),
            });
        }
        Cell::FaceDown(card) => (card.clone(), FlipOutcome::Revealed),
        Cell::FaceUp(card, None) => (card.clone(), FlipOutcome::Claimed),
    };

    staged.set(coords, Cell::FaceUp(card, Some(player.clone())));
    next.first = Some(coords);
    Ok(outcome)
}

fn take_second(
    staged: &mut Staged<'_>,
    next: &mut PlayerState,
    player: &PlayerId,
    first: Coord2,
    coords: Coord2,
) -> Result<FlipOutcome> {
    if coords == first {
        return Err(GameError::AlreadyHeld(coords));
    }
    let card = match staged.get(coords) {
        Cell::Empty => return Err(GameError::EmptyCell(coords)),
        Cell::FaceUp(_, Some(owner)) => {
            return Err(GameError::Controlled {
                coords,
                by: owner.clone(),
            });
        }
        Cell::FaceDown(card) | Cell::FaceUp(card, None) => card.clone(),
    };
    let first_card = held_card(staged, player, first);

    next.first = None;
    if card == first_card {
        staged.set(coords, Cell::FaceUp(card, Some(player.clone())));
        next.pending = Some(Pending::Matched(first, coords));
        Ok(FlipOutcome::Matched)
    } else {
        staged.set(first, Cell::FaceUp(first_card, None));
        staged.set(coords, Cell::FaceUp(card, None));
        next.pending = Some(Pending::Mismatched(smallvec![first, coords]));
        Ok(FlipOutcome::Mismatched)
    }
}

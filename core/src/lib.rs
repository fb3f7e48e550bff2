use serde::{Deserialize, Serialize};

pub use board::*;
pub use card::*;
pub use error::*;
pub use generator::*;
pub use layout::*;
pub use player::*;
pub use snapshot::*;
pub use types::*;

mod board;
mod card;
mod error;
mod generator;
mod invariant;
mod layout;
mod parse;
mod player;
mod snapshot;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2) -> Self {
        Self { size }
    }

    pub fn new((rows, cols): Coord2) -> Self {
        let rows = rows.clamp(1, Coord::MAX);
        let cols = cols.clamp(1, Coord::MAX);
        Self::new_unchecked((rows, cols))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn pair_count(&self) -> CellCount {
        self.total_cells() / 2
    }
}

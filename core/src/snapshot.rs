use core::fmt;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Owned copy of every cell on a board, taken at a single point in time.
///
/// Rendered with [`fmt::Display`] as a `Board ROWSxCOLS` header followed by one line per row.
/// Cells are `[ ]` when empty, `[?]` when face down, `[+CARD]` when face up, and
/// `[+CARD @player]` when face up and controlled. Card tokens never contain whitespace, so the
/// forms cannot be confused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    cells: Array2<Cell>,
}

impl BoardSnapshot {
    pub(crate) fn new(cells: Array2<Cell>) -> Self {
        Self { cells }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.get(coords.to_nd_index())
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Row-major `(coords, cell)` pairs.
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Coord2, &Cell)> {
        self.cells
            .indexed_iter()
            .map(|((row, col), cell)| ((row as Coord, col as Coord), cell))
    }

    pub fn count(&self, visibility: Visibility) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.visibility() == visibility)
            .count()
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.size();
        writeln!(f, "Board {rows}x{cols}")?;
        for row in self.cells.rows() {
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    f.write_str(" ")?;
                }
                match cell {
                    Cell::Empty => f.write_str("[ ]")?,
                    Cell::FaceDown(_) => f.write_str("[?]")?,
                    Cell::FaceUp(card, None) => write!(f, "[+{card}]")?,
                    Cell::FaceUp(card, Some(player)) => write!(f, "[+{card} @{player}]")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

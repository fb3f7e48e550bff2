use core::fmt;
use core::ops::Index;
use ndarray::Array2;
use serde::Serialize;

use crate::*;

/// Validated arrangement of cards, row-major, that a [`Board`] starts from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Layout {
    cards: Array2<Card>,
}

impl Layout {
    pub fn from_cards(size: Coord2, cards: Vec<Card>) -> Result<Self> {
        let (rows, cols) = size;
        let count = cards.len();
        let invalid = move || GameError::InvalidDimensions {
            rows,
            cols,
            cards: count,
        };

        if rows == 0 || cols == 0 || count != mult(rows, cols) as usize {
            return Err(invalid());
        }

        let cards = Array2::from_shape_vec(size.to_nd_index(), cards).map_err(|_| invalid())?;
        Ok(Self { cards })
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cards.dim();
        // dimensions came from a `Coord2`
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        self.cards.len() as CellCount
    }

    /// Cards in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Renders the layout in the board file format accepted by [`Layout::parse`].
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub(crate) fn cards(&self) -> &Array2<Card> {
        &self.cards
    }
}

/// Board file format: a `ROWSxCOLS` header, then one card per line.
impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.size();
        writeln!(f, "{rows}x{cols}")?;
        for card in self.cards.iter() {
            writeln!(f, "{card}")?;
        }
        Ok(())
    }
}

impl Index<Coord2> for Layout {
    type Output = Card;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cards[coords.to_nd_index()]
    }
}

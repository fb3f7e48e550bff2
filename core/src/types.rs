/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u16;

/// Count type used for card and total-cell counts.
pub type CellCount = u32;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Row-major offset of `coords` on a board with `cols` columns.
pub(crate) const fn row_major(coords: Coord2, cols: Coord) -> usize {
    coords.0 as usize * cols as usize + coords.1 as usize
}

/// Inverse of [`row_major`].
pub(crate) const fn from_row_major(offset: usize, cols: Coord) -> Coord2 {
    let cols = cols as usize;
    ((offset / cols) as Coord, (offset % cols) as Coord)
}

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Participant identifier: a non-empty run of ASCII letters, digits and underscores.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if valid {
            Ok(Self(id))
        } else {
            Err(GameError::InvalidPlayerId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PlayerId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for PlayerId {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Positions relinquished face up by a failed match attempt or a release.
pub type Relinquished = SmallVec<[Coord2; 2]>;

/// Work left over from a participant's previous attempt, applied before their next first card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pending {
    /// Matched pair, still controlled by the participant, to be removed from the board.
    Matched(Coord2, Coord2),
    /// Cards to turn back face down if nobody has taken them in the meantime.
    Mismatched(Relinquished),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PlayerState {
    pub first: Option<Coord2>,
    pub pending: Option<Pending>,
}

impl PlayerState {
    /// Cells this participant is expected to control.
    pub fn held(&self) -> SmallVec<[Coord2; 2]> {
        match (&self.first, &self.pending) {
            (Some(first), _) => SmallVec::from_slice(&[*first]),
            (None, Some(Pending::Matched(a, b))) => SmallVec::from_slice(&[*a, *b]),
            _ => SmallVec::new(),
        }
    }

    /// Cells touched when settling `pending`.
    pub fn pending_cells(&self) -> Relinquished {
        match &self.pending {
            Some(Pending::Matched(a, b)) => SmallVec::from_slice(&[*a, *b]),
            Some(Pending::Mismatched(cells)) => cells.clone(),
            None => SmallVec::new(),
        }
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            first: self.first,
            pending: self.pending.clone(),
        }
    }
}

/// Owned copy of a participant's bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub first: Option<Coord2>,
    pub pending: Option<Pending>,
}

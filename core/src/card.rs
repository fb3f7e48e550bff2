use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

/// Opaque card token. Two cards match when their tokens are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card(String);

impl Card {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if Self::is_valid_token(&token) {
            Ok(Self(token))
        } else {
            Err(GameError::InvalidCard(token))
        }
    }

    /// A token is any non-empty run of non-whitespace characters.
    pub fn is_valid_token(token: &str) -> bool {
        !token.is_empty() && !token.chars().any(char::is_whitespace)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Card {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Card {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visibility of a cell, without its card.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Empty,
    FaceDown,
    FaceUp,
}

/// State of one board position.
///
/// A controller can only exist on a face-up card, and only removed cards have no card at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    FaceDown(Card),
    FaceUp(Card, Option<PlayerId>),
}

impl Cell {
    pub const fn visibility(&self) -> Visibility {
        match self {
            Self::Empty => Visibility::Empty,
            Self::FaceDown(_) => Visibility::FaceDown,
            Self::FaceUp(..) => Visibility::FaceUp,
        }
    }

    pub fn card(&self) -> Option<&Card> {
        match self {
            Self::Empty => None,
            Self::FaceDown(card) | Self::FaceUp(card, _) => Some(card),
        }
    }

    pub fn controller(&self) -> Option<&PlayerId> {
        match self {
            Self::FaceUp(_, controller) => controller.as_ref(),
            _ => None,
        }
    }

    pub fn is_controlled_by(&self, player: &PlayerId) -> bool {
        self.controller() == Some(player)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_tokens_reject_whitespace() {
        assert!(Card::new("A").is_ok());
        assert!(Card::new("🦄").is_ok());
        assert_eq!(Card::new(""), Err(GameError::InvalidCard(String::new())));
        assert_eq!(Card::new("a b"), Err(GameError::InvalidCard("a b".into())));
        assert!("x\ty".parse::<Card>().is_err());
    }

    #[test]
    fn controller_only_reported_for_face_up() {
        let alice: PlayerId = "alice".parse().unwrap();
        let card: Card = "A".parse().unwrap();

        let up = Cell::FaceUp(card.clone(), Some(alice.clone()));
        assert_eq!(up.visibility(), Visibility::FaceUp);
        assert!(up.is_controlled_by(&alice));

        let down = Cell::FaceDown(card.clone());
        assert_eq!(down.controller(), None);
        assert_eq!(down.card(), Some(&card));

        assert_eq!(Cell::Empty.card(), None);
        assert_eq!(Cell::default().visibility(), Visibility::Empty);
    }

    #[test]
    fn card_deserialization_validates_token() {
        let card: Card = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(card.as_str(), "B");
        assert!(serde_json::from_str::<Card>("\"B C\"").is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::error::Rejection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipCard {
    pub opened: bool,
    /// Points revealed when the card was flipped.
    pub value: Option<u64>,
}

/// Flip & Win board. Every card flips once; a fully opened board locks
/// until the flip-reset window passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipBoard {
    pub cards: Vec<FlipCard>,
}

impl FlipBoard {
    pub fn fresh(len: usize) -> Self {
        Self {
            cards: vec![FlipCard::default(); len],
        }
    }

    /// Decode a stored board, falling back to a fresh one when the value is
    /// missing, corrupt, or sized for a different configuration.
    pub fn parse(raw: Option<&str>, len: usize) -> Self {
        raw.and_then(|json| serde_json::from_str::<FlipBoard>(json).ok())
            .filter(|board| board.cards.len() == len)
            .unwrap_or_else(|| Self::fresh(len))
    }

    pub fn is_complete(&self) -> bool {
        self.cards.iter().all(|card| card.opened)
    }

    pub fn opened_count(&self) -> usize {
        self.cards.iter().filter(|card| card.opened).count()
    }

    pub fn total_won(&self) -> u64 {
        self.cards.iter().filter_map(|card| card.value).sum()
    }

    /// # Errors
    /// [`Rejection::InvalidCard`] or [`Rejection::CardAlreadyFlipped`].
    pub fn check_flip(&self, index: usize) -> Result<(), Rejection> {
        match self.cards.get(index) {
            None => Err(Rejection::InvalidCard {
                index,
                len: self.cards.len(),
            }),
            Some(card) if card.opened => Err(Rejection::CardAlreadyFlipped { index }),
            Some(_) => Ok(()),
        }
    }

    pub fn flip(&mut self, index: usize, value: u64) -> Result<(), Rejection> {
        self.check_flip(index)?;
        self.cards[index] = FlipCard {
            opened: true,
            value: Some(value),
        };
        Ok(())
    }
}

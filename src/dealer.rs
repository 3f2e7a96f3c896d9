//! Deck ownership and dealing.
//!
//! A `Dealer` owns one shuffled 52-card deck. Every deal removes the cards it
//! returns, so within a dealer's lifetime no card can be handed out twice.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::{Card, FULL_DECK};
use crate::error::{CfrError, CfrResult};

#[derive(Debug, Clone)]
pub struct Dealer {
    cards: Vec<Card>,
}

impl Dealer {
    /// Fresh deck, shuffled twice.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Dealer {
        let mut dealer = Dealer {
            cards: FULL_DECK.clone(),
        };
        dealer.shuffle(rng);
        dealer
    }

    /// Deck in a fixed order; the next deals follow `cards` front to back.
    pub fn from_cards(cards: Vec<Card>) -> Dealer {
        Dealer { cards }
    }

    fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.cards.shuffle(rng);
    }

    /// Restore all 52 cards and reshuffle.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards = FULL_DECK.clone();
        self.shuffle(rng);
    }

    fn deal(&mut self, n: usize) -> CfrResult<Vec<Card>> {
        if n > self.cards.len() {
            return Err(CfrError::DeckExhausted {
                requested: n,
                available: self.cards.len(),
            });
        }
        Ok(self.cards.drain(..n).collect())
    }

    pub fn deal_card(&mut self) -> CfrResult<Card> {
        Ok(self.deal(1)?[0])
    }

    pub fn deal_hand(&mut self) -> CfrResult<[Card; 2]> {
        let cards = self.deal(2)?;
        Ok([cards[0], cards[1]])
    }

    pub fn deal_flop(&mut self) -> CfrResult<[Card; 3]> {
        let cards = self.deal(3)?;
        Ok([cards[0], cards[1], cards[2]])
    }

    pub fn remaining(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

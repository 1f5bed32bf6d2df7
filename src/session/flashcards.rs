use crate::store::schema::{Word, WordId};

/// A shuffled deck of the words still shown as flashcards.
///
/// "I know" takes the card out of the deck; "I don't know" moves on but keeps
/// it. The caller persists the matching visibility flag for the returned id.
#[derive(Clone, Debug)]
pub struct FlashcardSession {
    deck: Vec<Word>,
    index: usize,
    flipped: bool,
    pub hangul_first: bool,
}

impl FlashcardSession {
    pub fn new(deck: Vec<Word>, hangul_first: bool) -> Self {
        Self {
            deck,
            index: 0,
            flipped: false,
            hangul_first,
        }
    }

    pub fn current(&self) -> Option<&Word> {
        self.deck.get(self.index)
    }

    pub fn remaining(&self) -> usize {
        self.deck.len()
    }

    /// 1-based position in the deck, for "3 / 12" style display.
    pub fn position(&self) -> usize {
        if self.deck.is_empty() { 0 } else { self.index + 1 }
    }

    pub fn is_finished(&self) -> bool {
        self.deck.is_empty()
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn flip(&mut self) {
        if !self.deck.is_empty() {
            self.flipped = !self.flipped;
        }
    }

    pub fn toggle_hangul_first(&mut self) {
        self.hangul_first = !self.hangul_first;
        self.flipped = false;
    }

    /// Text on the visible side of the current card.
    pub fn visible_side(&self) -> Option<&str> {
        let word = self.current()?;
        let hangul_up = self.hangul_first != self.flipped;
        Some(if hangul_up {
            &word.hangul
        } else {
            &word.translation
        })
    }

    /// Remove the current card. Returns the word to hide from future decks.
    pub fn know(&mut self) -> Option<WordId> {
        if self.index >= self.deck.len() {
            return None;
        }
        let word = self.deck.remove(self.index);
        if self.index >= self.deck.len() {
            self.index = 0;
        }
        self.flipped = false;
        Some(word.id)
    }

    /// Keep the current card and move to the next one. The last card stays
    /// put. Returns the word whose visibility should be (re)written as shown.
    pub fn dont_know(&mut self) -> Option<WordId> {
        let id = self.current()?.id.clone();
        if self.index + 1 < self.deck.len() {
            self.index += 1;
        }
        self.flipped = false;
        Some(id)
    }

    /// Start over with a fresh deck (every word of the level, reshuffled).
    pub fn reset(&mut self, deck: Vec<Word>) {
        self.deck = deck;
        self.index = 0;
        self.flipped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(n: u32) -> Word {
        Word {
            id: WordId::new(format!("00000000-0000-4000-8000-{n:012}")),
            hangul: format!("단어{n}"),
            translation: format!("word {n}"),
            level: "1A".into(),
            unit: 1,
            example_context: None,
            example_context_translation: None,
        }
    }

    fn session(n: u32) -> FlashcardSession {
        FlashcardSession::new((1..=n).map(word).collect(), true)
    }

    #[test]
    fn test_know_removes_card() {
        let mut cards = session(3);
        let id = cards.know().unwrap();
        assert_eq!(id, word(1).id);
        assert_eq!(cards.remaining(), 2);
        assert_eq!(cards.current().unwrap().id, word(2).id);
    }

    #[test]
    fn test_know_on_last_card_wraps() {
        let mut cards = session(2);
        cards.dont_know();
        cards.know();
        assert_eq!(cards.position(), 1);
        assert_eq!(cards.current().unwrap().id, word(1).id);
    }

    #[test]
    fn test_dont_know_stays_on_last_card() {
        let mut cards = session(2);
        assert_eq!(cards.dont_know(), Some(word(1).id));
        assert_eq!(cards.dont_know(), Some(word(2).id));
        assert_eq!(cards.current().unwrap().id, word(2).id);
        assert_eq!(cards.remaining(), 2);
    }

    #[test]
    fn test_empty_deck_is_finished() {
        let mut cards = session(1);
        cards.know();
        assert!(cards.is_finished());
        assert!(cards.know().is_none());
        assert!(cards.dont_know().is_none());
        assert_eq!(cards.position(), 0);
    }

    #[test]
    fn test_flip_and_side() {
        let mut cards = session(1);
        assert_eq!(cards.visible_side(), Some("단어1"));
        cards.flip();
        assert_eq!(cards.visible_side(), Some("word 1"));
        cards.toggle_hangul_first();
        assert_eq!(cards.visible_side(), Some("word 1"));
        assert!(!cards.is_flipped());
    }

    #[test]
    fn test_reset_restores_deck() {
        let mut cards = session(2);
        cards.know();
        cards.know();
        cards.reset((1..=2).map(word).collect());
        assert_eq!(cards.remaining(), 2);
        assert_eq!(cards.position(), 1);
    }
}

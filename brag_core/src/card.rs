use crate::error::{BragError, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Core data structures ---

/// Card suit. Declared weakest first, so the derived `Ord` gives ♠ > ♥ > ♣ > ♦,
/// which is the order of the final tie-break between otherwise equal hands.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Diamond, // ♦
    Club,    // ♣
    Heart,   // ♥
    Spade,   // ♠
}

/// Card rank. Ace is high by default; the only place it plays low is the A-2-3 straight.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

/// A single playing card.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Suit {
    /// Deck-building order, strongest first.
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Club, Suit::Diamond];
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];

    /// Numeric value, 2 through 14.
    pub fn value(self) -> u8 {
        self as u8 + 2
    }
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }
}

/// What kind of hand three cards make. Variants are declared weakest first so they compare directly with `Ord`.
/// Note that in three-card play trips outrank a straight flush.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard,
    Pair,
    Straight,
    Flush,
    StraightFlush,
    Trips,
}

/// Everything needed to order two hands.
///
/// Fields are declared in comparison order, so the derived `Ord` compares the
/// category first, then the primary tie-break sequence element by element,
/// then the secondary sequence, and finally the highest suit held. Two hands
/// tie only when their keys are equal.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize, Deserialize)]
pub struct ComparisonKey {
    pub category: HandCategory,
    pub primary: Vec<u8>,
    pub secondary: Vec<u8>,
    pub high_suit: Suit,
}

/// Result of comparing hand A with hand B.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Outcome {
    A,
    B,
    Tie,
}

/// Exactly three cards held by one player.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Hand {
    cards: [Card; 3],
}

impl Hand {
    pub fn new(cards: [Card; 3]) -> Hand {
        Hand { cards }
    }

    pub fn cards(&self) -> &[Card; 3] {
        &self.cards
    }

    pub fn evaluate(&self) -> ComparisonKey {
        evaluate(self)
    }

    pub fn high_rank(&self) -> Rank {
        self.cards.iter().map(|c| c.rank).max().unwrap_or(Rank::Two)
    }

    pub fn high_suit(&self) -> Suit {
        self.cards.iter().map(|c| c.suit).max().unwrap_or(Suit::Diamond)
    }
}

// --- Display & parsing ---

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Suit::Spade => "♠",
            Suit::Heart => "♥",
            Suit::Club => "♣",
            Suit::Diamond => "♦",
        })
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c] = &self.cards;
        write!(f, "{} {} {}", a, b, c)
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            HandCategory::HighCard => "high card",
            HandCategory::Pair => "pair",
            HandCategory::Straight => "straight",
            HandCategory::Flush => "flush",
            HandCategory::StraightFlush => "straight flush",
            HandCategory::Trips => "three of a kind",
        })
    }
}

/// Accepts `10♠`, `T♠`, `ts`, `Qh`, `a♦` and the emoji suit forms.
impl FromStr for Card {
    type Err = BragError;

    fn from_str(s: &str) -> Result<Card> {
        let text = s.trim().trim_end_matches('\u{fe0f}');
        let mut chars = text.chars();
        let suit = match chars.next_back() {
            Some('♠' | 's' | 'S') => Suit::Spade,
            Some('♥' | 'h' | 'H') => Suit::Heart,
            Some('♣' | 'c' | 'C') => Suit::Club,
            Some('♦' | 'd' | 'D') => Suit::Diamond,
            _ => return Err(BragError::InvalidCard(s.to_string())),
        };
        let rank = match chars.as_str().to_ascii_uppercase().as_str() {
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "10" | "T" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            _ => return Err(BragError::InvalidCard(s.to_string())),
        };
        Ok(Card { rank, suit })
    }
}

/// Three whitespace-separated cards, e.g. `"10♠ J♠ Q♠"`.
impl FromStr for Hand {
    type Err = BragError;

    fn from_str(s: &str) -> Result<Hand> {
        let cards = s.split_whitespace().map(str::parse).collect::<Result<Vec<Card>>>()?;
        match cards.as_slice() {
            [a, b, c] => Ok(Hand::new([*a, *b, *c])),
            _ => Err(BragError::InvalidHand(s.to_string())),
        }
    }
}

// --- Deck ---

/// An ordered stack of cards. Dealing removes cards from the top for good;
/// a fresh deck is built for every hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        Deck::new()
    }
}

impl Deck {
    /// A full, unshuffled 52-card deck.
    pub fn new() -> Deck {
        let mut cards = Vec::with_capacity(52);
        for &suit in &Suit::ALL {
            for &rank in &Rank::ALL {
                cards.push(Card { rank, suit });
            }
        }
        Deck { cards }
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Deck {
        let mut deck = Deck::new();
        deck.shuffle(rng);
        deck
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Removes `n` cards from the top of the deck.
    ///
    /// Fails without touching the deck when fewer than `n` remain; a short
    /// hand is never dealt.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>> {
        if self.cards.len() < n {
            return Err(BragError::InsufficientCards { requested: n, remaining: self.cards.len() });
        }
        Ok(self.cards.drain(..n).collect())
    }

    pub fn deal_hand(&mut self) -> Result<Hand> {
        let cards = self.deal(3)?;
        Ok(Hand::new([cards[0], cards[1], cards[2]]))
    }
}

// --- Hand evaluation ---

/// Classifies a three-card hand and builds its comparison key.
///
/// Precedence when several shapes match: trips, straight flush, flush,
/// straight, pair, high card. A-2-3 counts as a straight and is keyed as
/// `[3, 2, 1]`, the weakest straight there is.
pub fn evaluate(hand: &Hand) -> ComparisonKey {
    // Ranks from high to low
    let mut ranks: Vec<u8> = hand.cards.iter().map(|c| c.rank.value()).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let first_suit = hand.cards[0].suit;
    let is_flush = hand.cards.iter().all(|c| c.suit == first_suit);
    let is_ace_low = ranks == [14, 3, 2];
    let is_straight = (ranks[0] == ranks[1] + 1 && ranks[1] == ranks[2] + 1) || is_ace_low;
    let straight_key = if is_ace_low { vec![3, 2, 1] } else { ranks.clone() };

    let key = |category, primary, secondary| ComparisonKey {
        category,
        primary,
        secondary,
        high_suit: hand.high_suit(),
    };

    if ranks[0] == ranks[2] {
        let trips = ranks[0];
        let rest = ranks.iter().copied().filter(|&r| r != trips).collect();
        return key(HandCategory::Trips, vec![trips], rest);
    }
    if is_flush && is_straight {
        return key(HandCategory::StraightFlush, straight_key, vec![]);
    }
    if is_flush {
        return key(HandCategory::Flush, ranks, vec![]);
    }
    if is_straight {
        return key(HandCategory::Straight, straight_key, vec![]);
    }
    // Sorted, so a pair always sits next to itself
    if ranks[0] == ranks[1] {
        return key(HandCategory::Pair, vec![ranks[0], ranks[2]], vec![]);
    }
    if ranks[1] == ranks[2] {
        return key(HandCategory::Pair, vec![ranks[1], ranks[0]], vec![]);
    }
    key(HandCategory::HighCard, ranks, vec![])
}

pub fn compare(a: &ComparisonKey, b: &ComparisonKey) -> Outcome {
    match a.cmp(b) {
        std::cmp::Ordering::Greater => Outcome::A,
        std::cmp::Ordering::Less => Outcome::B,
        std::cmp::Ordering::Equal => Outcome::Tie,
    }
}

pub fn compare_hands(a: &Hand, b: &Hand) -> Outcome {
    compare(&evaluate(a), &evaluate(b))
}

// --- Unit tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{HashMap, HashSet};

    fn hand(text: &str) -> Hand {
        text.parse().unwrap()
    }

    fn category(text: &str) -> HandCategory {
        evaluate(&hand(text)).category
    }

    // --- Classification ---

    #[test]
    fn test_trips() {
        let key = evaluate(&hand("9♠ 9♥ 9♦"));
        assert_eq!(key.category, HandCategory::Trips);
        assert_eq!(key.primary, vec![9]);
        assert!(key.secondary.is_empty());
    }

    #[test]
    fn test_straight_flush() {
        let key = evaluate(&hand("10♠ J♠ Q♠"));
        assert_eq!(key.category, HandCategory::StraightFlush);
        assert_eq!(key.primary, vec![12, 11, 10]);
    }

    #[test]
    fn test_flush() {
        let key = evaluate(&hand("2♣ 9♣ K♣"));
        assert_eq!(key.category, HandCategory::Flush);
        assert_eq!(key.primary, vec![13, 9, 2]);
    }

    #[test]
    fn test_straight() {
        assert_eq!(category("4♠ 5♥ 6♦"), HandCategory::Straight);
        assert_eq!(category("Q♠ K♥ A♦"), HandCategory::Straight);
        // No wrap-around past the ace
        assert_eq!(category("K♠ A♥ 2♦"), HandCategory::HighCard);
    }

    #[test]
    fn test_ace_low_straight() {
        let key = evaluate(&hand("A♠ 2♥ 3♦"));
        assert_eq!(key.category, HandCategory::Straight);
        assert_eq!(key.primary, vec![3, 2, 1]);

        let ace_low_flush = evaluate(&hand("3♥ A♥ 2♥"));
        assert_eq!(ace_low_flush.category, HandCategory::StraightFlush);
        assert_eq!(ace_low_flush.primary, vec![3, 2, 1]);
    }

    #[test]
    fn test_pair_keys_pair_then_kicker() {
        assert_eq!(evaluate(&hand("7♠ 7♥ 2♣")).primary, vec![7, 2]);
        assert_eq!(evaluate(&hand("2♠ K♥ K♣")).primary, vec![13, 2]);
        assert_eq!(evaluate(&hand("A♠ 5♥ A♣")).primary, vec![14, 5]);
    }

    #[test]
    fn test_high_card() {
        let key = evaluate(&hand("3♦ K♠ 8♥"));
        assert_eq!(key.category, HandCategory::HighCard);
        assert_eq!(key.primary, vec![13, 8, 3]);
        assert_eq!(key.high_suit, Suit::Spade);
    }

    #[test]
    fn test_every_hand_gets_one_category() {
        // Exhaustive over all C(52, 3) hands
        let cards = Deck::new().cards().to_vec();
        let mut counts: HashMap<HandCategory, usize> = HashMap::new();
        for i in 0..cards.len() {
            for j in (i + 1)..cards.len() {
                for k in (j + 1)..cards.len() {
                    let key = evaluate(&Hand::new([cards[i], cards[j], cards[k]]));
                    *counts.entry(key.category).or_insert(0) += 1;
                }
            }
        }
        assert_eq!(counts[&HandCategory::Trips], 52);
        assert_eq!(counts[&HandCategory::StraightFlush], 48);
        assert_eq!(counts[&HandCategory::Flush], 1096);
        assert_eq!(counts[&HandCategory::Straight], 720);
        assert_eq!(counts[&HandCategory::Pair], 3744);
        assert_eq!(counts[&HandCategory::HighCard], 16440);
        assert_eq!(counts.values().sum::<usize>(), 22100);
    }

    // --- Comparison ---

    #[test]
    fn test_straight_flush_beats_ace_low_straight() {
        assert_eq!(compare_hands(&hand("10♠ J♠ Q♠"), &hand("A♠ 2♥ 3♦")), Outcome::A);
    }

    #[test]
    fn test_pair_kicker_decides() {
        assert_eq!(compare_hands(&hand("7♠ 7♥ 2♣"), &hand("7♦ 7♣ 9♠")), Outcome::B);
    }

    #[test]
    fn test_ace_low_is_weakest_straight() {
        let ace_low = hand("A♠ 2♥ 3♦");
        assert_eq!(compare_hands(&ace_low, &hand("4♣ 5♦ 6♣")), Outcome::B);
        assert_eq!(compare_hands(&ace_low, &hand("2♠ 3♥ 4♦")), Outcome::B);
        // Still above every pair and high card
        assert_eq!(compare_hands(&ace_low, &hand("A♥ A♦ K♠")), Outcome::A);
        assert_eq!(compare_hands(&ace_low, &hand("A♥ K♦ J♠")), Outcome::A);
    }

    #[test]
    fn test_trips_beat_everything_else() {
        let low_trips = hand("2♦ 2♣ 2♥");
        for other in ["Q♠ K♠ A♠", "2♠ 9♠ A♠", "Q♥ K♦ A♣", "A♥ A♦ K♠", "A♥ K♦ J♠"] {
            assert_eq!(compare_hands(&low_trips, &hand(other)), Outcome::A, "vs {}", other);
        }
        assert_eq!(compare_hands(&low_trips, &hand("3♦ 3♣ 3♥")), Outcome::B);
    }

    #[test]
    fn test_category_order() {
        let ladder = ["A♥ K♦ J♠", "2♥ 2♦ 3♠", "2♠ 3♥ 4♦", "2♣ 4♣ 6♣", "2♣ 3♣ 4♣", "2♦ 2♣ 2♥"];
        for pair in ladder.windows(2) {
            assert_eq!(compare_hands(&hand(pair[1]), &hand(pair[0])), Outcome::A, "{} vs {}", pair[1], pair[0]);
        }
    }

    #[test]
    fn test_suit_breaks_rank_ties() {
        // Same ranks, the hand holding the spade wins
        assert_eq!(compare_hands(&hand("K♠ 9♥ 5♦"), &hand("K♥ 9♣ 5♣")), Outcome::A);
        assert_eq!(compare_hands(&hand("Q♦ J♦ 10♦"), &hand("Q♣ J♣ 10♣")), Outcome::B);
    }

    #[test]
    fn test_true_tie() {
        let a = hand("K♠ 9♥ 5♦");
        let b = hand("K♣ 9♠ 5♥");
        assert_eq!(evaluate(&a), evaluate(&b));
        assert_eq!(compare_hands(&a, &b), Outcome::Tie);
    }

    #[test]
    fn test_compare_is_a_total_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let keys: Vec<ComparisonKey> = (0..60)
            .map(|_| Deck::shuffled(&mut rng).deal_hand().unwrap().evaluate())
            .collect();
        for a in &keys {
            assert_eq!(compare(a, a), Outcome::Tie);
            for b in &keys {
                let ab = compare(a, b);
                let ba = compare(b, a);
                match ab {
                    Outcome::A => assert_eq!(ba, Outcome::B),
                    Outcome::B => assert_eq!(ba, Outcome::A),
                    Outcome::Tie => assert_eq!(ba, Outcome::Tie),
                }
                for c in &keys {
                    if ab == Outcome::A && compare(b, c) == Outcome::A {
                        assert_eq!(compare(a, c), Outcome::A);
                    }
                }
            }
        }
    }

    // --- Deck ---

    #[test]
    fn test_new_deck_is_complete() {
        let deck = Deck::new();
        assert_eq!(deck.len(), 52);
        let unique: HashSet<Card> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let a = Deck::shuffled(&mut StdRng::seed_from_u64(42));
        let b = Deck::shuffled(&mut StdRng::seed_from_u64(42));
        let c = Deck::shuffled(&mut StdRng::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_deal_removes_cards() {
        let mut deck = Deck::shuffled(&mut StdRng::seed_from_u64(1));
        let top: Vec<Card> = deck.cards()[..3].to_vec();
        let hand = deck.deal_hand().unwrap();
        assert_eq!(hand.cards().to_vec(), top);
        assert_eq!(deck.len(), 49);
        assert!(hand.cards().iter().all(|c| !deck.cards().contains(c)));
    }

    #[test]
    fn test_deal_past_the_bottom_fails() {
        let mut deck = Deck::new();
        deck.deal(50).unwrap();
        assert_eq!(deck.deal_hand(), Err(BragError::InsufficientCards { requested: 3, remaining: 2 }));
        // Nothing was dealt
        assert_eq!(deck.len(), 2);
    }

    // --- Parsing ---

    #[test]
    fn test_parse_cards() {
        assert_eq!("10♠".parse::<Card>().unwrap(), Card::new(Rank::Ten, Suit::Spade));
        assert_eq!("Ts".parse::<Card>().unwrap(), Card::new(Rank::Ten, Suit::Spade));
        assert_eq!("qh".parse::<Card>().unwrap(), Card::new(Rank::Queen, Suit::Heart));
        assert_eq!("A♦️".parse::<Card>().unwrap(), Card::new(Rank::Ace, Suit::Diamond));
        assert!("1♠".parse::<Card>().is_err());
        assert!("K".parse::<Card>().is_err());
        assert!("9♠ 9♥".parse::<Hand>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let h = hand("10♠ J♥ A♦");
        assert_eq!(h.to_string(), "10♠ J♥ A♦");
        assert_eq!(h.to_string().parse::<Hand>().unwrap(), h);
    }
}

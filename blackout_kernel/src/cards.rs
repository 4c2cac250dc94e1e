/// Blackout Kernel: Playing Cards
///
/// Suits, ranks and cards of a single 52-card deck, plus trick precedence.
///
/// Precedence is never stored on the suits themselves: the trump suit and
/// the led suit travel in an explicit `TrickContext`, so a comparison can
/// only ever see one trump and one led suit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KernelError;

// ── Suit ───────────────────────────────────────────────────────────

/// One of the four suits, declared in deck order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Spade,
    Heart,
    Club,
    Diamond,
}

impl Suit {
    /// All suits in deck order.
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Club, Suit::Diamond];

    /// Position of the suit in the deck (0..4).
    pub fn index(self) -> u8 {
        match self {
            Suit::Spade => 0,
            Suit::Heart => 1,
            Suit::Club => 2,
            Suit::Diamond => 3,
        }
    }

    /// Single-letter symbol used in card notation.
    pub fn symbol(self) -> char {
        match self {
            Suit::Spade => 'S',
            Suit::Heart => 'H',
            Suit::Club => 'C',
            Suit::Diamond => 'D',
        }
    }

    pub fn from_symbol(c: char) -> Option<Suit> {
        match c.to_ascii_uppercase() {
            'S' => Some(Suit::Spade),
            'H' => Some(Suit::Heart),
            'C' => Some(Suit::Club),
            'D' => Some(Suit::Diamond),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Spade => "Spade",
            Suit::Heart => "Heart",
            Suit::Club => "Club",
            Suit::Diamond => "Diamond",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Rank ───────────────────────────────────────────────────────────

/// Card rank, 2..=14 with J=11, Q=12, K=13, A=14.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rank(u8);

impl Rank {
    pub const TWO: Rank = Rank(2);
    pub const THREE: Rank = Rank(3);
    pub const FOUR: Rank = Rank(4);
    pub const FIVE: Rank = Rank(5);
    pub const SIX: Rank = Rank(6);
    pub const SEVEN: Rank = Rank(7);
    pub const EIGHT: Rank = Rank(8);
    pub const NINE: Rank = Rank(9);
    pub const TEN: Rank = Rank(10);
    pub const JACK: Rank = Rank(11);
    pub const QUEEN: Rank = Rank(12);
    pub const KING: Rank = Rank(13);
    pub const ACE: Rank = Rank(14);

    /// All ranks, lowest first.
    pub const ALL: [Rank; 13] = [
        Rank::TWO,
        Rank::THREE,
        Rank::FOUR,
        Rank::FIVE,
        Rank::SIX,
        Rank::SEVEN,
        Rank::EIGHT,
        Rank::NINE,
        Rank::TEN,
        Rank::JACK,
        Rank::QUEEN,
        Rank::KING,
        Rank::ACE,
    ];

    /// Build a rank from its numeric value. Rejects anything outside 2..=14.
    pub fn new(value: u8) -> Result<Rank, KernelError> {
        if (2..=14).contains(&value) {
            Ok(Rank(value))
        } else {
            Err(KernelError::InvalidRank(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        const LABELS: [&str; 13] = [
            "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K", "A",
        ];
        LABELS[(self.0 - 2) as usize]
    }

    fn from_label(label: &str) -> Option<Rank> {
        let value = match label.to_ascii_uppercase().as_str() {
            "J" => 11,
            "Q" => 12,
            "K" => 13,
            "A" => 14,
            "T" => 10,
            digits => digits.parse::<u8>().ok()?,
        };
        Rank::new(value).ok()
    }
}

impl TryFrom<u8> for Rank {
    type Error = KernelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::new(value)
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Card ───────────────────────────────────────────────────────────

/// A single card. Serialized in text notation, e.g. `"QS"` or `"10H"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

/// Number of cards in the deck.
pub const DECK_SIZE: usize = 52;

impl Card {
    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Unique position of this card in an unshuffled deck (0..52).
    pub fn index(self) -> u8 {
        self.suit.index() * 13 + (self.rank.value() - 2)
    }

    /// Inverse of `index`. `None` for values >= 52.
    pub fn from_index(index: u8) -> Option<Card> {
        if index as usize >= DECK_SIZE {
            return None;
        }
        let suit = Suit::ALL[(index / 13) as usize];
        let rank = Rank(index % 13 + 2);
        Some(Card { suit, rank })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.symbol())
    }
}

impl FromStr for Card {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || KernelError::InvalidCard(s.to_string());

        let suit_char = s.chars().last().ok_or_else(invalid)?;
        let suit = Suit::from_symbol(suit_char).ok_or_else(invalid)?;
        let rank_part = &s[..s.len() - suit_char.len_utf8()];
        let rank = Rank::from_label(rank_part).ok_or_else(invalid)?;

        Ok(Card { suit, rank })
    }
}

impl TryFrom<String> for Card {
    type Error = KernelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> String {
        card.to_string()
    }
}

/// The 52 cards in deck-index order: spades, hearts, clubs, diamonds,
/// each from two up to ace.
pub fn full_deck() -> Vec<Card> {
    Suit::ALL
        .iter()
        .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card::new(suit, rank)))
        .collect()
}

// ── Precedence ─────────────────────────────────────────────────────

/// Trump and led suit in force while a trick is being compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrickContext {
    pub trump: Option<Suit>,
    pub led: Option<Suit>,
}

impl TrickContext {
    pub fn new(trump: Option<Suit>, led: Option<Suit>) -> Self {
        Self { trump, led }
    }

    /// Does `a` beat `b`?
    ///
    /// Same suit: higher rank wins. Different suits: trump wins, then the
    /// led suit. Two off-suit cards never beat each other.
    pub fn beats(&self, a: Card, b: Card) -> bool {
        if a.suit == b.suit {
            return a.rank > b.rank;
        }
        if let Some(trump) = self.trump {
            if a.suit == trump || b.suit == trump {
                return a.suit == trump;
            }
        }
        if let Some(led) = self.led {
            if a.suit == led || b.suit == led {
                return a.suit == led;
            }
        }
        false
    }
}

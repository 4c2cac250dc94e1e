/// Blackout Kernel: Trick Resolution
///
/// Pure analysis of a trick's plays. No state mutation.

use crate::cards::{Suit, TrickContext};
use crate::domain::PlayedCard;
use crate::seats::Seat;

/// Suit of the first card played, if any.
pub fn led_suit(plays: &[PlayedCard]) -> Option<Suit> {
    plays.first().map(|p| p.card.suit)
}

/// Index into `plays` of the winning card.
///
/// Scans in play order and only replaces the current best when a later
/// card strictly beats it. Returns `None` for an empty trick.
pub fn winning_index(plays: &[PlayedCard], trump: Option<Suit>) -> Option<usize> {
    let ctx = TrickContext::new(trump, led_suit(plays));
    let mut best: Option<usize> = None;
    for (i, play) in plays.iter().enumerate() {
        match best {
            Some(b) if !ctx.beats(play.card, plays[b].card) => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Seat that takes the trick.
pub fn trick_winner(plays: &[PlayedCard], trump: Option<Suit>) -> Option<Seat> {
    winning_index(plays, trump).map(|i| plays[i].seat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plays(cards: &[(Seat, &str)]) -> Vec<PlayedCard> {
        cards
            .iter()
            .map(|(seat, c)| PlayedCard {
                seat: *seat,
                card: c.parse().unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_led_suit_wins_without_trump() {
        let p = plays(&[(2, "5H"), (3, "AS"), (0, "9H"), (1, "KD")]);
        assert_eq!(trick_winner(&p, None), Some(0));
    }

    #[test]
    fn test_lowest_trump_beats_led_ace() {
        let p = plays(&[(1, "AH"), (2, "2C"), (3, "KH")]);
        assert_eq!(trick_winner(&p, Some(Suit::Club)), Some(2));
    }

    #[test]
    fn test_highest_trump_wins() {
        let p = plays(&[(0, "4D"), (1, "3S"), (2, "JS"), (3, "AD")]);
        assert_eq!(trick_winner(&p, Some(Suit::Spade)), Some(2));
    }

    #[test]
    fn test_trump_led_is_just_highest_trump() {
        let p = plays(&[(0, "7S"), (1, "AH"), (2, "8S")]);
        assert_eq!(trick_winner(&p, Some(Suit::Spade)), Some(2));
    }

    #[test]
    fn test_empty_trick_has_no_winner() {
        assert_eq!(trick_winner(&[], Some(Suit::Heart)), None);
        assert_eq!(led_suit(&[]), None);
    }
}

//! Pure trick-resolution queries: play legality, trick winners, and seat
//! rotation. These take no session context beyond their arguments so UI and
//! AI callers can probe positions without mutating anything.

use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::seat::Seat;
use crate::model::suit::Suit;
use crate::model::trick::{Play, Trick};

/// The seat that acts after `seat`, clockwise.
pub fn next_seat(seat: Seat) -> Seat {
    seat.next()
}

/// Whether `card` may be played from `hand` onto `trick`. An opening lead is
/// unrestricted; otherwise the led suit must be followed when the hand is
/// able. There is no constraint beyond follow-suit: a void hand may trump or
/// discard freely.
pub fn is_legal_play(card: Card, hand: &Hand, trick: &Trick) -> bool {
    if !hand.contains(card) {
        return false;
    }
    match trick.lead_suit() {
        None => true,
        Some(led) => card.suit == led || !hand.has_suit(led),
    }
}

/// Every card in `hand` that would be legal on `trick`, in hand order.
pub fn legal_plays(hand: &Hand, trick: &Trick) -> Vec<Card> {
    match trick.lead_suit() {
        Some(led) if hand.has_suit(led) => hand.cards_in_suit(led).copied().collect(),
        _ => hand.iter().copied().collect(),
    }
}

/// The seat that won a completed trick, or `None` while it is still open.
/// A trump card beats any non-trump; within a suit higher rank wins; a card
/// of neither the led suit nor trump can never win. All 52 cards are
/// distinct, so exactly one play satisfies this.
pub fn determine_trick_winner(trick: &Trick, trump: Option<Suit>) -> Option<Seat> {
    if !trick.is_complete() {
        return None;
    }
    let led = trick.lead_suit()?;
    trick
        .plays()
        .iter()
        .fold(None::<&Play>, |best, play| match best {
            None => Some(play),
            Some(current) => {
                if card_beats(play.card, current.card, led, trump) {
                    Some(play)
                } else {
                    best
                }
            }
        })
        .map(|play| play.seat)
}

/// Whether `challenger` outranks `incumbent` given the led suit and trump.
/// The incumbent is assumed to have been played first.
pub fn card_beats(challenger: Card, incumbent: Card, led: Suit, trump: Option<Suit>) -> bool {
    let challenger_trump = trump == Some(challenger.suit);
    let incumbent_trump = trump == Some(incumbent.suit);
    match (challenger_trump, incumbent_trump) {
        (true, false) => true,
        (false, true) => false,
        (true, true) => challenger.rank > incumbent.rank,
        (false, false) => challenger.suit == led && {
            incumbent.suit != led || challenger.rank > incumbent.rank
        },
    }
}

use crate::model::card::Card;
use crate::model::seat::Seat;
use crate::model::suit::Suit;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Trick {
    leader: Seat,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrickError {
    TrickComplete,
    OutOfTurn { expected: Seat, actual: Seat },
    AlreadyPlayed(Seat),
}

impl fmt::Display for TrickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrickError::TrickComplete => write!(f, "trick already complete"),
            TrickError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to play next but got {actual}")
            }
            TrickError::AlreadyPlayed(seat) => {
                write!(f, "{seat} has already played this trick")
            }
        }
    }
}

impl std::error::Error for TrickError {}

impl Trick {
    pub fn new(leader: Seat) -> Self {
        Self {
            leader,
            plays: Vec::with_capacity(4),
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == 4
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn expected_seat(&self) -> Seat {
        self.plays
            .last()
            .map(|play| play.seat.next())
            .unwrap_or(self.leader)
    }

    pub fn play(&mut self, seat: Seat, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        if self.plays.iter().any(|play| play.seat == seat) {
            return Err(TrickError::AlreadyPlayed(seat));
        }

        let expected = self.expected_seat();
        if expected != seat {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        self.plays.push(Play { seat, card });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Trick, TrickError};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::seat::Seat;
    use crate::model::suit::Suit;

    #[test]
    fn plays_follow_turn_order() {
        let mut trick = Trick::new(Seat::North);
        assert!(
            trick
                .play(Seat::North, Card::new(Rank::Two, Suit::Clubs))
                .is_ok()
        );
        assert!(matches!(
            trick.play(Seat::South, Card::new(Rank::Three, Suit::Clubs)),
            Err(TrickError::OutOfTurn { .. })
        ));
    }

    #[test]
    fn fifth_play_is_rejected() {
        let mut trick = Trick::new(Seat::West);
        for (seat, rank) in [
            (Seat::West, Rank::Two),
            (Seat::North, Rank::Three),
            (Seat::East, Rank::Four),
            (Seat::South, Rank::Five),
        ] {
            trick.play(seat, Card::new(rank, Suit::Diamonds)).unwrap();
        }
        assert!(trick.is_complete());
        assert_eq!(
            trick.play(Seat::West, Card::new(Rank::Six, Suit::Diamonds)),
            Err(TrickError::TrickComplete)
        );
    }

    #[test]
    fn lead_suit_is_first_card_played() {
        let mut trick = Trick::new(Seat::East);
        assert_eq!(trick.lead_suit(), None);
        trick
            .play(Seat::East, Card::new(Rank::Ten, Suit::Hearts))
            .unwrap();
        assert_eq!(trick.lead_suit(), Some(Suit::Hearts));
        assert_eq!(trick.expected_seat(), Seat::South);
    }
}

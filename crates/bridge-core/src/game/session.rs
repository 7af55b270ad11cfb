use crate::game::phase::{GamePhase, PhaseError};
use crate::model::card::Card;
use crate::model::contract::{Contract, Vulnerability};
use crate::model::hand::Hand;
use crate::model::seat::{Seat, Side};
use crate::model::suit::Suit;
use crate::model::trick::{Trick, TrickError};
use crate::rules;
use std::fmt;

/// The aggregate root for one played hand: the four hands, the in-progress
/// trick, the archived trick history, the tricks-won tally, and the phase
/// tag. All hand mutation funnels through `play_card`.
#[derive(Debug, Clone)]
pub struct PlaySession {
    contract: Contract,
    vulnerability: Vulnerability,
    hands: [Hand; 4],
    current_trick: Trick,
    trick_history: Vec<Trick>,
    tricks_won: [u8; 4],
    dummy_visible: bool,
    phase: GamePhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted { winner: Seat },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    NotPlayable(GamePhase),
    OutOfTurn { expected: Seat, actual: Seat },
    CardNotInHand(Card),
    MustFollowSuit(Suit),
    Trick(TrickError),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::NotPlayable(phase) => write!(f, "cannot play a card during {phase}"),
            PlayError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to play but got {actual}")
            }
            PlayError::CardNotInHand(card) => write!(f, "{card} is not in that hand"),
            PlayError::MustFollowSuit(suit) => write!(f, "must follow {suit} when able"),
            PlayError::Trick(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PlayError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealError {
    WrongCardCount { seat: Seat, count: usize },
    DuplicateCard(Card),
}

impl fmt::Display for DealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealError::WrongCardCount { seat, count } => {
                write!(f, "{seat} was dealt {count} cards, expected 13")
            }
            DealError::DuplicateCard(card) => write!(f, "{card} was dealt twice"),
        }
    }
}

impl std::error::Error for DealError {}

impl PlaySession {
    /// Factory consumed by the auction collaborator: validates the 52-card
    /// partition, computes the opening leader (declarer's LHO) and starts the
    /// session in `PlayStarting`.
    pub fn new(
        contract: Contract,
        hands: [Hand; 4],
        vulnerability: Vulnerability,
    ) -> Result<Self, DealError> {
        for seat in Seat::LOOP {
            let count = hands[seat.index()].len();
            if count != 13 {
                return Err(DealError::WrongCardCount { seat, count });
            }
        }

        let mut seen = [false; 52];
        for hand in &hands {
            for card in hand.iter() {
                let slot = card.suit.index() * 13 + (card.rank.value() as usize - 2);
                if seen[slot] {
                    return Err(DealError::DuplicateCard(*card));
                }
                seen[slot] = true;
            }
        }

        let leader = contract.opening_leader();
        Ok(Self {
            contract,
            vulnerability,
            hands,
            current_trick: Trick::new(leader),
            trick_history: Vec::with_capacity(13),
            tricks_won: [0; 4],
            dummy_visible: false,
            phase: GamePhase::PlayStarting,
        })
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn vulnerability(&self) -> Vulnerability {
        self.vulnerability
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn dummy_visible(&self) -> bool {
        self.dummy_visible
    }

    pub fn next_to_play(&self) -> Seat {
        self.current_trick.expected_seat()
    }

    pub fn tricks_completed(&self) -> usize {
        self.trick_history.len()
    }

    pub fn tricks_won(&self, seat: Seat) -> u8 {
        self.tricks_won[seat.index()]
    }

    pub fn tricks_won_by_side(&self, side: Side) -> u8 {
        side.seats()
            .iter()
            .map(|seat| self.tricks_won[seat.index()])
            .sum()
    }

    pub fn declarer_tricks(&self) -> u8 {
        self.tricks_won_by_side(self.contract.declaring_side())
    }

    pub fn defender_tricks(&self) -> u8 {
        self.tricks_won_by_side(self.contract.defending_side())
    }

    pub fn is_play_complete(&self) -> bool {
        matches!(self.phase, GamePhase::PlayComplete)
    }

    /// The legal cards for `seat` on the current trick. Turn order is not
    /// checked here; `play_card` enforces it.
    pub fn legal_plays(&self, seat: Seat) -> Vec<Card> {
        rules::legal_plays(&self.hands[seat.index()], &self.current_trick)
    }

    /// Explicit phase transitions. Automatic advancement on card plays is
    /// handled inside `play_card`; everything else must come through here and
    /// is checked against the fixed transition table.
    pub fn transition_to(&mut self, phase: GamePhase) -> Result<(), PhaseError> {
        if !self.phase.can_advance_to(phase) {
            return Err(PhaseError::InvalidTransition {
                from: self.phase,
                to: phase,
            });
        }
        self.phase = phase;
        Ok(())
    }

    /// The single mutation path for hands. Rule violations surface as errors;
    /// the session never substitutes a "corrected" card.
    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, PlayError> {
        if !self.phase.can_play_card() {
            return Err(PlayError::NotPlayable(self.phase));
        }

        let expected = self.next_to_play();
        if expected != seat {
            return Err(PlayError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        let hand = &self.hands[seat.index()];
        if !hand.contains(card) {
            return Err(PlayError::CardNotInHand(card));
        }

        if let Some(led) = self.current_trick.lead_suit() {
            if card.suit != led && hand.has_suit(led) {
                return Err(PlayError::MustFollowSuit(led));
            }
        }

        let _ = self.hands[seat.index()].remove(card);
        self.current_trick.play(seat, card).map_err(PlayError::Trick)?;
        // The opening lead is faced before dummy goes down, so visibility
        // flips on the very first card.
        self.dummy_visible = true;

        let outcome = if self.current_trick.is_complete() {
            let winner = rules::determine_trick_winner(&self.current_trick, self.contract.trump())
                .expect("winner when complete");
            self.complete_trick(winner);
            PlayOutcome::TrickCompleted { winner }
        } else {
            PlayOutcome::Played
        };
        self.advance_after_card();
        Ok(outcome)
    }

    /// The only place phase changes happen automatically: the first card
    /// moves the session into `PlayInProgress`, the thirteenth archived trick
    /// into `PlayComplete`.
    fn advance_after_card(&mut self) {
        if matches!(self.phase, GamePhase::PlayStarting) {
            self.phase = GamePhase::PlayInProgress;
        }
        if self.trick_history.len() == 13 {
            self.phase = GamePhase::PlayComplete;
        }
    }

    fn complete_trick(&mut self, winner: Seat) {
        let finished = std::mem::replace(&mut self.current_trick, Trick::new(winner));
        self.trick_history.push(finished);
        self.tricks_won[winner.index()] += 1;
    }
}

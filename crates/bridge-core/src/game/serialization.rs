use crate::game::session::{DealError, PlayError, PlaySession};
use crate::model::card::{Card, ParseCardError};
use crate::model::contract::{Contract, Vulnerability};
use crate::model::hand::Hand;
use crate::model::seat::Seat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A replayable snapshot of a session: the dealt hands plus the cards played
/// so far, in play order. Restoring replays the cards through `play_card`,
/// so a snapshot can never smuggle in an illegal position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub contract: Contract,
    pub vulnerability: Vulnerability,
    pub dealt: [Vec<String>; 4],
    pub plays: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    Card(ParseCardError),
    Deal(DealError),
    Play(PlayError),
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreError::Card(err) => write!(f, "{err}"),
            RestoreError::Deal(err) => write!(f, "{err}"),
            RestoreError::Play(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RestoreError {}

impl SessionSnapshot {
    pub fn capture(session: &PlaySession) -> Self {
        // Dealt hands are reconstructed from what each seat still holds plus
        // every card it has already contributed to a trick.
        let mut dealt: [Vec<String>; 4] = Default::default();
        for seat in Seat::LOOP {
            dealt[seat.index()] = session
                .hand(seat)
                .iter()
                .map(|card| card.to_string())
                .collect();
        }

        let mut plays = Vec::new();
        let archived = session.trick_history().iter().map(|trick| trick.plays());
        let open = std::iter::once(session.current_trick().plays());
        for trick_plays in archived.chain(open) {
            for play in trick_plays {
                dealt[play.seat.index()].push(play.card.to_string());
                plays.push(play.card.to_string());
            }
        }

        SessionSnapshot {
            contract: *session.contract(),
            vulnerability: session.vulnerability(),
            dealt,
            plays,
        }
    }

    pub fn restore(&self) -> Result<PlaySession, RestoreError> {
        let mut hands: [Hand; 4] = std::array::from_fn(|_| Hand::new());
        for (index, cards) in self.dealt.iter().enumerate() {
            for text in cards {
                let card: Card = text.parse().map_err(RestoreError::Card)?;
                hands[index].add(card);
            }
        }

        let mut session = PlaySession::new(self.contract, hands, self.vulnerability)
            .map_err(RestoreError::Deal)?;
        for text in &self.plays {
            let card: Card = text.parse().map_err(RestoreError::Card)?;
            let seat = session.next_to_play();
            session.play_card(seat, card).map_err(RestoreError::Play)?;
        }
        Ok(session)
    }

    pub fn to_json(session: &PlaySession) -> serde_json::Result<String> {
        let snapshot = Self::capture(session);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionSnapshot;
    use crate::model::contract::{Contract, Doubling, Strain, Vulnerability};
    use crate::model::deck::Deck;
    use crate::model::hand::Hand;
    use crate::model::seat::Seat;
    use crate::game::session::PlaySession;

    fn session_with_plays(plays: usize) -> PlaySession {
        let contract = Contract::new(4, Strain::Spades, Seat::South, Doubling::Undoubled).unwrap();
        let mut hands: [Hand; 4] = std::array::from_fn(|_| Hand::new());
        for (index, card) in Deck::shuffled_with_seed(11).cards().iter().enumerate() {
            hands[index % 4].add(*card);
        }
        let mut session = PlaySession::new(contract, hands, Vulnerability::BOTH).unwrap();
        for _ in 0..plays {
            let seat = session.next_to_play();
            let card = session.legal_plays(seat)[0];
            session.play_card(seat, card).unwrap();
        }
        session
    }

    #[test]
    fn snapshot_roundtrips_mid_trick() {
        let session = session_with_plays(6);
        let snapshot = SessionSnapshot::capture(&session);
        let restored = snapshot.restore().unwrap();

        assert_eq!(restored.phase(), session.phase());
        assert_eq!(restored.next_to_play(), session.next_to_play());
        assert_eq!(restored.tricks_completed(), session.tricks_completed());
        for seat in Seat::LOOP {
            assert_eq!(restored.hand(seat).cards(), session.hand(seat).cards());
        }
    }

    #[test]
    fn json_roundtrip_preserves_the_snapshot() {
        let session = session_with_plays(9);
        let json = SessionSnapshot::to_json(&session).unwrap();
        let parsed = SessionSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed, SessionSnapshot::capture(&session));
    }

    #[test]
    fn dealt_hands_always_hold_thirteen_cards() {
        let session = session_with_plays(17);
        let snapshot = SessionSnapshot::capture(&session);
        for cards in &snapshot.dealt {
            assert_eq!(cards.len(), 13);
        }
        assert_eq!(snapshot.plays.len(), 17);
    }

    #[test]
    fn tampered_play_list_fails_to_restore() {
        let session = session_with_plays(4);
        let mut snapshot = SessionSnapshot::capture(&session);
        snapshot.plays.push("ZZ".to_string());
        assert!(snapshot.restore().is_err());
    }
}

use core::fmt;
use serde::{Deserialize, Serialize};

/// The closed set of round phases. A round advances monotonically along a
/// fixed edge set; the only automatic transitions happen inside
/// `PlaySession::play_card`, every other move is an explicit
/// `transition_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    Setup,
    Dealing,
    Bidding,
    BiddingComplete,
    PlayStarting,
    PlayInProgress,
    PlayComplete,
    Scoring,
    RoundComplete,
}

impl GamePhase {
    pub const fn can_advance_to(self, next: GamePhase) -> bool {
        matches!(
            (self, next),
            (GamePhase::Setup, GamePhase::Dealing)
                | (GamePhase::Dealing, GamePhase::Bidding)
                | (GamePhase::Bidding, GamePhase::BiddingComplete)
                | (GamePhase::BiddingComplete, GamePhase::PlayStarting)
                | (GamePhase::PlayStarting, GamePhase::PlayInProgress)
                | (GamePhase::PlayInProgress, GamePhase::PlayInProgress)
                | (GamePhase::PlayInProgress, GamePhase::PlayComplete)
                | (GamePhase::PlayComplete, GamePhase::Scoring)
                | (GamePhase::Scoring, GamePhase::RoundComplete)
                | (GamePhase::RoundComplete, GamePhase::Setup)
                | (GamePhase::RoundComplete, GamePhase::Dealing)
        )
    }

    pub const fn can_play_card(self) -> bool {
        matches!(self, GamePhase::PlayStarting | GamePhase::PlayInProgress)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GamePhase::Setup => "Setup",
            GamePhase::Dealing => "Dealing",
            GamePhase::Bidding => "Bidding",
            GamePhase::BiddingComplete => "BiddingComplete",
            GamePhase::PlayStarting => "PlayStarting",
            GamePhase::PlayInProgress => "PlayInProgress",
            GamePhase::PlayComplete => "PlayComplete",
            GamePhase::Scoring => "Scoring",
            GamePhase::RoundComplete => "RoundComplete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseError {
    InvalidTransition { from: GamePhase, to: GamePhase },
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseError::InvalidTransition { from, to } => {
                write!(f, "invalid phase transition {from} -> {to}")
            }
        }
    }
}

impl std::error::Error for PhaseError {}

#[cfg(test)]
mod tests {
    use super::GamePhase;

    const ALL: [GamePhase; 9] = [
        GamePhase::Setup,
        GamePhase::Dealing,
        GamePhase::Bidding,
        GamePhase::BiddingComplete,
        GamePhase::PlayStarting,
        GamePhase::PlayInProgress,
        GamePhase::PlayComplete,
        GamePhase::Scoring,
        GamePhase::RoundComplete,
    ];

    #[test]
    fn forward_chain_is_allowed() {
        let chain = [
            GamePhase::Setup,
            GamePhase::Dealing,
            GamePhase::Bidding,
            GamePhase::BiddingComplete,
            GamePhase::PlayStarting,
            GamePhase::PlayInProgress,
            GamePhase::PlayComplete,
            GamePhase::Scoring,
            GamePhase::RoundComplete,
        ];
        for pair in chain.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn play_in_progress_may_loop() {
        assert!(GamePhase::PlayInProgress.can_advance_to(GamePhase::PlayInProgress));
    }

    #[test]
    fn round_complete_restarts_at_setup_or_dealing() {
        assert!(GamePhase::RoundComplete.can_advance_to(GamePhase::Setup));
        assert!(GamePhase::RoundComplete.can_advance_to(GamePhase::Dealing));
    }

    #[test]
    fn backwards_and_skipping_edges_are_rejected() {
        assert!(!GamePhase::Bidding.can_advance_to(GamePhase::Setup));
        assert!(!GamePhase::Setup.can_advance_to(GamePhase::PlayStarting));
        assert!(!GamePhase::PlayComplete.can_advance_to(GamePhase::PlayInProgress));
        assert!(!GamePhase::Scoring.can_advance_to(GamePhase::Scoring));
    }

    #[test]
    fn cards_are_playable_only_during_play() {
        for phase in ALL {
            let expected = matches!(phase, GamePhase::PlayStarting | GamePhase::PlayInProgress);
            assert_eq!(phase.can_play_card(), expected, "{phase}");
        }
    }
}

//! Position evaluation for the search. The heuristic scores a board as a
//! weighted sum of per-partnership components; an external double-dummy
//! solver can be injected behind the same interface and falls back to the
//! heuristic whenever it is unavailable.

use crate::board::Board;
use bridge_core::model::seat::Side;
use bridge_core::model::suit::Suit;
use core::fmt;
use tracing::warn;

/// Component weights. `trump_control`, `communication` and
/// `defensive_signals` are extension points and contribute nothing by
/// default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalWeights {
    pub tricks_won: f32,
    pub sure_winners: f32,
    pub trump_control: f32,
    pub communication: f32,
    /// Reserved for a defensive-signalling component; currently unused.
    pub defensive_signals: f32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            tricks_won: 1.0,
            sure_winners: 0.6,
            trump_control: 0.0,
            communication: 0.0,
            defensive_signals: 0.0,
        }
    }
}

/// Anything that can score a position from one partnership's perspective.
/// Scores are antisymmetric: `evaluate(b, side) == -evaluate(b, opponent)`.
pub trait Evaluate {
    fn evaluate(&self, board: &Board, perspective: Side) -> f32;
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicEvaluator {
    weights: EvalWeights,
}

impl HeuristicEvaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    fn sure_winners(board: &Board, side: Side) -> i32 {
        let mut total = 0;
        for suit in Suit::ALL {
            let ours = board.side_mask(side, suit);
            let theirs = board.side_mask(side.opponent(), suit);

            // Unbroken top honors: the Ace, then Ace-King, and so on. The
            // run stops at the first rank the partnership does not hold,
            // whether an opponent holds it or it has already been played.
            let mut run = 0;
            for value in (2..=14u8).rev() {
                if ours & (1 << (value - 2)) != 0 {
                    run += 1;
                } else {
                    break;
                }
            }

            // Master-card adjustment: with the opponents void, the highest
            // remaining card wins a trick even without a sequence behind it.
            // Keeps a live low trump from being discarded as worthless.
            if run == 0 && theirs == 0 && ours != 0 {
                run = 1;
            }
            total += run;
        }
        total
    }

    fn trump_control(board: &Board, side: Side) -> i32 {
        match board.trump() {
            Some(trump) => {
                let ours = board.side_mask(side, trump).count_ones() as i32;
                let theirs = board.side_mask(side.opponent(), trump).count_ones() as i32;
                ours - theirs
            }
            None => 0,
        }
    }

    fn communication(board: &Board, side: Side) -> i32 {
        let count = |s: Side| {
            let [a, b] = s.seats();
            Suit::ALL
                .iter()
                .filter(|suit| {
                    board.hand_mask(a, **suit) != 0 && board.hand_mask(b, **suit) != 0
                })
                .count() as i32
        };
        count(side) - count(side.opponent())
    }
}

impl Evaluate for HeuristicEvaluator {
    fn evaluate(&self, board: &Board, perspective: Side) -> f32 {
        let opponent = perspective.opponent();
        let tricks =
            board.tricks_won(perspective) as f32 - board.tricks_won(opponent) as f32;
        let sure =
            (Self::sure_winners(board, perspective) - Self::sure_winners(board, opponent)) as f32;

        let mut score = self.weights.tricks_won * tricks + self.weights.sure_winners * sure;
        if self.weights.trump_control != 0.0 {
            score += self.weights.trump_control * Self::trump_control(board, perspective) as f32;
        }
        if self.weights.communication != 0.0 {
            score += self.weights.communication * Self::communication(board, perspective) as f32;
        }
        score
    }
}

/// Predicted tricks still to come for each partnership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TricksBySide {
    pub declaring: u8,
    pub defending: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    Unavailable,
    Failed(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Unavailable => write!(f, "double-dummy solver unavailable"),
            SolverError::Failed(reason) => write!(f, "double-dummy solver failed: {reason}"),
        }
    }
}

impl std::error::Error for SolverError {}

/// Capability interface for an external double-dummy solver.
pub trait DoubleDummySolver: Send {
    fn solve(&self, board: &Board) -> Result<TricksBySide, SolverError>;
}

/// The evaluator the search is constructed with. Backend selection happens
/// here, once, rather than through conditionals scattered down the call
/// stack; a failing solver degrades to the heuristic locally.
pub enum Evaluator {
    Heuristic(HeuristicEvaluator),
    DoubleDummy {
        solver: Box<dyn DoubleDummySolver>,
        fallback: HeuristicEvaluator,
    },
}

impl Evaluator {
    pub fn heuristic(weights: EvalWeights) -> Self {
        Evaluator::Heuristic(HeuristicEvaluator::new(weights))
    }

    /// Pick the backend by solver availability at construction time.
    pub fn with_solver(solver: Option<Box<dyn DoubleDummySolver>>, weights: EvalWeights) -> Self {
        match solver {
            Some(solver) => Evaluator::DoubleDummy {
                solver,
                fallback: HeuristicEvaluator::new(weights),
            },
            None => Evaluator::heuristic(weights),
        }
    }
}

impl Evaluate for Evaluator {
    fn evaluate(&self, board: &Board, perspective: Side) -> f32 {
        match self {
            Evaluator::Heuristic(heuristic) => heuristic.evaluate(board, perspective),
            Evaluator::DoubleDummy { solver, fallback } => match solver.solve(board) {
                Ok(tricks) => {
                    let (ours, theirs) = if perspective == board.declaring_side() {
                        (tricks.declaring, tricks.defending)
                    } else {
                        (tricks.defending, tricks.declaring)
                    };
                    let resolved = board.tricks_won(perspective) as f32
                        - board.tricks_won(perspective.opponent()) as f32;
                    resolved + ours as f32 - theirs as f32
                }
                Err(error) => {
                    warn!(
                        target: "bridge_bot::eval",
                        %error,
                        "falling back to heuristic evaluation"
                    );
                    fallback.evaluate(board, perspective)
                }
            },
        }
    }
}

//! Depth-limited minimax with alpha-beta pruning over the undo-log board.
//! The declaring partnership maximizes, the defenders minimize; leaves are
//! scored by the injected evaluator from the declarer's perspective.

use crate::board::Board;
use crate::eval::Evaluate;
use bridge_core::game::session::PlaySession;
use bridge_core::model::card::Card;
use bridge_core::model::seat::Seat;
use std::time::{Duration, Instant};
use tracing::{Level, event};

/// Per-call counters; nothing is kept between calls.
#[derive(Debug, Clone, Copy)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaf_nodes: u64,
    pub pruned: u64,
    pub elapsed: Duration,
    pub best_score: f32,
    pub depth: u8,
}

pub struct Search<E: Evaluate> {
    depth: u8,
    evaluator: E,
}

impl<E: Evaluate> Search<E> {
    /// `depth` counts individual card plays; it is clamped to at least one.
    /// The evaluator is an explicit dependency, injected here.
    pub fn new(depth: u8, evaluator: E) -> Self {
        Self {
            depth: depth.max(1),
            evaluator,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Pick a card for `seat`. A forced card is returned without searching.
    /// Panics if the seat has no legal card, which a well-formed session can
    /// never produce.
    pub fn choose_card(&self, session: &PlaySession, seat: Seat) -> (Card, SearchStats) {
        let start = Instant::now();
        debug_assert_eq!(seat, session.next_to_play());
        let legal = session.legal_plays(seat);
        assert!(!legal.is_empty(), "no legal card for {seat}");

        let mut stats = SearchStats {
            nodes: 0,
            leaf_nodes: 0,
            pruned: 0,
            elapsed: Duration::ZERO,
            best_score: 0.0,
            depth: self.depth,
        };

        if let [forced] = legal.as_slice() {
            stats.elapsed = start.elapsed();
            self.log_choice(seat, *forced, &stats, "forced");
            return (*forced, stats);
        }

        let mut board = Board::from_session(session);
        let maximizing = seat.side() == board.declaring_side();
        let mut alpha = f32::NEG_INFINITY;
        let mut beta = f32::INFINITY;
        let mut best: Option<(Card, f32)> = None;

        for card in legal {
            let undo = board.play(card);
            let score = self.minimax(&mut board, self.depth - 1, alpha, beta, &mut stats);
            board.undo(undo);

            let replace = match best {
                None => true,
                Some((incumbent, best_score)) => {
                    let strictly_better = if maximizing {
                        score > best_score
                    } else {
                        score < best_score
                    };
                    strictly_better || (score == best_score && prefer_discard(card, incumbent))
                }
            };
            if replace {
                best = Some((card, score));
            }

            let (_, best_score) = best.expect("best set above");
            if maximizing {
                alpha = alpha.max(best_score);
            } else {
                beta = beta.min(best_score);
            }
        }

        let (card, score) = best.expect("legal non-empty");
        stats.best_score = score;
        stats.elapsed = start.elapsed();
        self.log_choice(seat, card, &stats, "searched");
        (card, stats)
    }

    fn minimax(
        &self,
        board: &mut Board,
        depth: u8,
        mut alpha: f32,
        mut beta: f32,
        stats: &mut SearchStats,
    ) -> f32 {
        stats.nodes += 1;
        if depth == 0 || board.is_play_complete() {
            stats.leaf_nodes += 1;
            return self.evaluator.evaluate(board, board.declaring_side());
        }

        let maximizing = board.next_seat().side() == board.declaring_side();
        if maximizing {
            let mut best = f32::NEG_INFINITY;
            for card in board.legal_plays() {
                let undo = board.play(card);
                let score = self.minimax(board, depth - 1, alpha, beta, stats);
                board.undo(undo);
                best = best.max(score);
                alpha = alpha.max(best);
                if beta <= alpha {
                    stats.pruned += 1;
                    break;
                }
            }
            best
        } else {
            let mut best = f32::INFINITY;
            for card in board.legal_plays() {
                let undo = board.play(card);
                let score = self.minimax(board, depth - 1, alpha, beta, stats);
                board.undo(undo);
                best = best.min(score);
                beta = beta.min(best);
                if beta <= alpha {
                    stats.pruned += 1;
                    break;
                }
            }
            best
        }
    }

    fn log_choice(&self, seat: Seat, card: Card, stats: &SearchStats, reason: &str) {
        if !tracing::enabled!(Level::DEBUG) {
            return;
        }
        event!(
            target: "bridge_bot::search",
            Level::DEBUG,
            seat = %seat,
            chosen = %card,
            nodes = stats.nodes,
            leaf_nodes = stats.leaf_nodes,
            pruned = stats.pruned,
            best_score = stats.best_score,
            depth = stats.depth,
            elapsed_us = stats.elapsed.as_micros() as u64,
            reason,
        );
    }
}

// Among equal-scoring cards, throw the lowest rank and keep honors as the
// strict last resort.
fn prefer_discard(candidate: Card, incumbent: Card) -> bool {
    (candidate.is_honor(), candidate.rank) < (incumbent.is_honor(), incumbent.rank)
}

#[cfg(test)]
mod tests {
    use super::{Search, prefer_discard};
    use crate::board::Board;
    use crate::eval::{EvalWeights, Evaluator};
    use bridge_core::game::session::PlaySession;
    use bridge_core::model::card::Card;
    use bridge_core::model::contract::{Contract, Doubling, Strain, Vulnerability};
    use bridge_core::model::hand::Hand;
    use bridge_core::model::rank::Rank;
    use bridge_core::model::seat::{Seat, Side};
    use bridge_core::model::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn suit_run(suit: Suit, ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|rank| card(*rank, suit)).collect()
    }

    fn search(depth: u8) -> Search<Evaluator> {
        Search::new(depth, Evaluator::heuristic(EvalWeights::default()))
    }

    /// North holds twelve spades and a club; East one spade and twelve
    /// hearts; South all diamonds; West twelve clubs and a heart.
    fn striped_session(declarer: Seat) -> PlaySession {
        let mut north = suit_run(
            Suit::Spades,
            &[
                Rank::Two,
                Rank::Three,
                Rank::Four,
                Rank::Five,
                Rank::Six,
                Rank::Seven,
                Rank::Eight,
                Rank::Nine,
                Rank::Ten,
                Rank::Jack,
                Rank::Queen,
                Rank::King,
            ],
        );
        north.push(card(Rank::Two, Suit::Clubs));

        let mut east = vec![card(Rank::Ace, Suit::Spades)];
        east.extend(suit_run(
            Suit::Hearts,
            &[
                Rank::Two,
                Rank::Three,
                Rank::Four,
                Rank::Five,
                Rank::Six,
                Rank::Seven,
                Rank::Eight,
                Rank::Nine,
                Rank::Ten,
                Rank::Jack,
                Rank::Queen,
                Rank::King,
            ],
        ));

        let south = suit_run(Suit::Diamonds, &Rank::ORDERED);

        let mut west = suit_run(
            Suit::Clubs,
            &[
                Rank::Three,
                Rank::Four,
                Rank::Five,
                Rank::Six,
                Rank::Seven,
                Rank::Eight,
                Rank::Nine,
                Rank::Ten,
                Rank::Jack,
                Rank::Queen,
                Rank::King,
                Rank::Ace,
            ],
        );
        west.push(card(Rank::Ace, Suit::Hearts));

        let contract = Contract::new(1, Strain::NoTrump, declarer, Doubling::Undoubled).unwrap();
        PlaySession::new(
            contract,
            [
                Hand::with_cards(north),
                Hand::with_cards(east),
                Hand::with_cards(south),
                Hand::with_cards(west),
            ],
            Vulnerability::NONE,
        )
        .unwrap()
    }

    #[test]
    fn forced_card_skips_the_search() {
        // West declares, North leads a spade; East's only spade is the ace.
        let mut session = striped_session(Seat::West);
        session
            .play_card(Seat::North, card(Rank::Two, Suit::Spades))
            .unwrap();

        let (chosen, stats) = search(4).choose_card(&session, Seat::East);
        assert_eq!(chosen, card(Rank::Ace, Suit::Spades));
        assert_eq!(stats.nodes, 0);
    }

    #[test]
    fn search_cashes_the_master_before_surrendering_the_lead() {
        // Two-card NT endgame: leading the ace first takes one trick, while
        // leading low first lets West win both.
        let north = [card(Rank::Ace, Suit::Spades), card(Rank::Two, Suit::Spades)];
        let east = [card(Rank::Three, Suit::Spades), card(Rank::Five, Suit::Hearts)];
        let south = [card(Rank::Four, Suit::Spades), card(Rank::Six, Suit::Hearts)];
        let west = [card(Rank::Five, Suit::Spades), card(Rank::King, Suit::Hearts)];
        let mut board = Board::from_cards(
            [&north, &east, &south, &west],
            None,
            Side::NorthSouth,
            Seat::North,
        );

        let engine = search(8);
        let mut best: Option<(Card, f32)> = None;
        let mut stats = super::SearchStats {
            nodes: 0,
            leaf_nodes: 0,
            pruned: 0,
            elapsed: std::time::Duration::ZERO,
            best_score: 0.0,
            depth: 8,
        };
        for candidate in board.legal_plays() {
            let undo = board.play(candidate);
            let score = engine.minimax(&mut board, 7, f32::NEG_INFINITY, f32::INFINITY, &mut stats);
            board.undo(undo);
            let better = match best {
                None => true,
                Some((_, incumbent)) => score > incumbent,
            };
            if better {
                best = Some((candidate, score));
            }
        }
        assert_eq!(best.unwrap().0, card(Rank::Ace, Suit::Spades));
    }

    #[test]
    fn honor_is_never_discarded_when_an_equal_spot_card_exists() {
        // One-trick NT ending: North discards on the heart lead. Both
        // discards lose the trick, so minimax values are equal and the
        // deterministic tie-break must pick the club two over the spade ace.
        let north = [card(Rank::Ace, Suit::Spades), card(Rank::Two, Suit::Clubs)];
        let east = [card(Rank::Three, Suit::Hearts), card(Rank::Four, Suit::Hearts)];
        let south = [card(Rank::Five, Suit::Clubs), card(Rank::Six, Suit::Clubs)];
        let west = [card(Rank::Queen, Suit::Hearts), card(Rank::Two, Suit::Hearts)];
        let mut board = Board::from_cards(
            [&north, &east, &south, &west],
            None,
            Side::EastWest,
            Seat::West,
        );
        board.play(card(Rank::Queen, Suit::Hearts));

        let engine = search(8);
        let mut stats = super::SearchStats {
            nodes: 0,
            leaf_nodes: 0,
            pruned: 0,
            elapsed: std::time::Duration::ZERO,
            best_score: 0.0,
            depth: 8,
        };
        let mut best: Option<(Card, f32)> = None;
        for candidate in board.legal_plays() {
            let undo = board.play(candidate);
            let score = engine.minimax(&mut board, 7, f32::NEG_INFINITY, f32::INFINITY, &mut stats);
            board.undo(undo);
            let replace = match best {
                None => true,
                Some((incumbent, incumbent_score)) => {
                    // North defends, so lower is better for its side.
                    score < incumbent_score
                        || (score == incumbent_score && prefer_discard(candidate, incumbent))
                }
            };
            if replace {
                best = Some((candidate, score));
            }
        }
        assert_eq!(best.unwrap().0, card(Rank::Two, Suit::Clubs));
    }

    #[test]
    fn deeper_search_never_visits_fewer_nodes() {
        let session = striped_session(Seat::South);
        let seat = session.next_to_play();
        let mut previous = 0u64;
        for depth in 1..=4u8 {
            let (_, stats) = search(depth).choose_card(&session, seat);
            assert!(
                stats.nodes >= previous,
                "depth {depth}: {} < {previous}",
                stats.nodes
            );
            previous = stats.nodes;
        }
    }

    #[test]
    fn pruning_fires_on_wide_positions() {
        let session = striped_session(Seat::South);
        let seat = session.next_to_play();
        let (_, stats) = search(5).choose_card(&session, seat);
        assert!(stats.pruned > 0);
        assert!(stats.leaf_nodes > 0);
        assert!(stats.leaf_nodes <= stats.nodes);
    }

    #[test]
    fn chosen_card_is_always_legal() {
        let mut session = striped_session(Seat::East);
        let engine = search(3);
        while !session.is_play_complete() {
            let seat = session.next_to_play();
            let legal = session.legal_plays(seat);
            let (chosen, stats) = engine.choose_card(&session, seat);
            assert!(legal.contains(&chosen));
            assert_eq!(stats.depth, 3);
            session.play_card(seat, chosen).unwrap();
        }
    }
}

//! Compact search board. Instead of cloning the whole `PlaySession` per
//! node, the search mutates one board through an explicit `play`/`undo`
//! pair: hands are per-seat per-suit rank masks, so a node costs two bit
//! flips and an `Undo` record on the stack.

use bridge_core::game::session::PlaySession;
use bridge_core::model::card::Card;
use bridge_core::model::rank::Rank;
use bridge_core::model::seat::{Seat, Side};
use bridge_core::model::suit::Suit;
use bridge_core::rules;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Rank bits per seat and suit; bit 0 is the Two, bit 12 the Ace.
    hands: [[u16; 4]; 4],
    trump: Option<Suit>,
    declaring_side: Side,
    trick: [Option<(Seat, Card)>; 4],
    trick_len: u8,
    leader: Seat,
    tricks_won: [u8; 2],
    cards_in_hands: u8,
}

/// Everything needed to reverse one `play`.
#[derive(Debug, Clone)]
pub struct Undo {
    seat: Seat,
    card: Card,
    completed: Option<CompletedTrick>,
}

#[derive(Debug, Clone)]
struct CompletedTrick {
    plays: [(Seat, Card); 4],
    winner: Seat,
}

const fn rank_bit(rank: Rank) -> u16 {
    1 << (rank.value() - 2)
}

fn highest_rank(mask: u16) -> Option<Rank> {
    if mask == 0 {
        return None;
    }
    let bit = 15 - mask.leading_zeros() as u8;
    Rank::from_value(bit + 2)
}

impl Board {
    pub fn from_session(session: &PlaySession) -> Self {
        let mut hands = [[0u16; 4]; 4];
        let mut cards_in_hands = 0u8;
        for seat in Seat::LOOP {
            for card in session.hand(seat).iter() {
                hands[seat.index()][card.suit.index()] |= rank_bit(card.rank);
                cards_in_hands += 1;
            }
        }

        let mut trick = [None; 4];
        let plays = session.current_trick().plays();
        for (index, play) in plays.iter().enumerate() {
            trick[index] = Some((play.seat, play.card));
        }

        Self {
            hands,
            trump: session.contract().trump(),
            declaring_side: session.contract().declaring_side(),
            trick,
            trick_len: plays.len() as u8,
            leader: session.current_trick().leader(),
            tricks_won: [
                session.tricks_won_by_side(Side::NorthSouth),
                session.tricks_won_by_side(Side::EastWest),
            ],
            cards_in_hands,
        }
    }

    pub fn trump(&self) -> Option<Suit> {
        self.trump
    }

    pub fn declaring_side(&self) -> Side {
        self.declaring_side
    }

    pub fn tricks_won(&self, side: Side) -> u8 {
        self.tricks_won[side.index()]
    }

    pub fn next_seat(&self) -> Seat {
        let mut seat = self.leader;
        for _ in 0..self.trick_len {
            seat = seat.next();
        }
        seat
    }

    pub fn is_play_complete(&self) -> bool {
        self.cards_in_hands == 0 && self.trick_len == 0
    }

    pub fn hand_mask(&self, seat: Seat, suit: Suit) -> u16 {
        self.hands[seat.index()][suit.index()]
    }

    /// Union of the partnership's remaining cards in `suit`.
    pub fn side_mask(&self, side: Side, suit: Suit) -> u16 {
        let [a, b] = side.seats();
        self.hands[a.index()][suit.index()] | self.hands[b.index()][suit.index()]
    }

    pub fn legal_plays(&self) -> Vec<Card> {
        let seat = self.next_seat();
        if self.trick_len > 0 {
            let (_, lead_card) = self.trick[0].expect("trick has a lead");
            let led = lead_card.suit;
            let mask = self.hands[seat.index()][led.index()];
            if mask != 0 {
                return cards_from_mask(led, mask);
            }
        }
        let mut cards = Vec::new();
        for suit in Suit::ALL {
            cards.extend(cards_from_mask(
                suit,
                self.hands[seat.index()][suit.index()],
            ));
        }
        cards
    }

    /// Play `card` for the seat on turn, resolving the trick when it is the
    /// fourth card. The returned `Undo` restores the board exactly.
    pub fn play(&mut self, card: Card) -> Undo {
        let seat = self.next_seat();
        debug_assert!(
            self.hands[seat.index()][card.suit.index()] & rank_bit(card.rank) != 0,
            "{seat} does not hold {card}"
        );

        self.hands[seat.index()][card.suit.index()] &= !rank_bit(card.rank);
        self.cards_in_hands -= 1;
        self.trick[self.trick_len as usize] = Some((seat, card));
        self.trick_len += 1;

        let completed = if self.trick_len == 4 {
            let plays = [
                self.trick[0].expect("trick play"),
                self.trick[1].expect("trick play"),
                self.trick[2].expect("trick play"),
                self.trick[3].expect("trick play"),
            ];
            let winner = winner_of(&plays, self.trump);
            self.tricks_won[winner.side().index()] += 1;
            self.trick = [None; 4];
            self.trick_len = 0;
            self.leader = winner;
            Some(CompletedTrick { plays, winner })
        } else {
            None
        };

        Undo {
            seat,
            card,
            completed,
        }
    }

    pub fn undo(&mut self, undo: Undo) {
        if let Some(completed) = undo.completed {
            self.tricks_won[completed.winner.side().index()] -= 1;
            self.leader = completed.plays[0].0;
            for (index, play) in completed.plays.iter().take(3).enumerate() {
                self.trick[index] = Some(*play);
            }
            self.trick[3] = None;
            self.trick_len = 3;
        } else {
            self.trick_len -= 1;
            self.trick[self.trick_len as usize] = None;
        }
        self.hands[undo.seat.index()][undo.card.suit.index()] |= rank_bit(undo.card.rank);
        self.cards_in_hands += 1;
    }

    /// The highest card of `suit` still in any hand.
    pub fn highest_remaining(&self, suit: Suit) -> Option<Rank> {
        let mask = self.side_mask(Side::NorthSouth, suit) | self.side_mask(Side::EastWest, suit);
        highest_rank(mask)
    }

    #[cfg(test)]
    pub(crate) fn from_cards(
        cards: [&[Card]; 4],
        trump: Option<Suit>,
        declaring_side: Side,
        leader: Seat,
    ) -> Self {
        let mut hands = [[0u16; 4]; 4];
        let mut cards_in_hands = 0u8;
        for (index, seat_cards) in cards.iter().enumerate() {
            for card in seat_cards.iter() {
                hands[index][card.suit.index()] |= rank_bit(card.rank);
                cards_in_hands += 1;
            }
        }
        Self {
            hands,
            trump,
            declaring_side,
            trick: [None; 4],
            trick_len: 0,
            leader,
            tricks_won: [0; 2],
            cards_in_hands,
        }
    }
}

fn cards_from_mask(suit: Suit, mask: u16) -> Vec<Card> {
    let mut cards = Vec::new();
    for value in 2..=14u8 {
        if mask & (1 << (value - 2)) != 0 {
            let rank = Rank::from_value(value).expect("rank bit in range");
            cards.push(Card::new(rank, suit));
        }
    }
    cards
}

fn winner_of(plays: &[(Seat, Card); 4], trump: Option<Suit>) -> Seat {
    let led = plays[0].1.suit;
    let mut best = plays[0];
    for play in &plays[1..] {
        if rules::card_beats(play.1, best.1, led, trump) {
            best = *play;
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::Board;
    use bridge_core::game::session::PlaySession;
    use bridge_core::model::card::Card;
    use bridge_core::model::contract::{Contract, Doubling, Strain, Vulnerability};
    use bridge_core::model::deck::Deck;
    use bridge_core::model::hand::Hand;
    use bridge_core::model::rank::Rank;
    use bridge_core::model::seat::{Seat, Side};
    use bridge_core::model::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn session(seed: u64, strain: Strain) -> PlaySession {
        let contract = Contract::new(4, strain, Seat::South, Doubling::Undoubled).unwrap();
        let mut hands: [Hand; 4] = std::array::from_fn(|_| Hand::new());
        for (index, c) in Deck::shuffled_with_seed(seed).cards().iter().enumerate() {
            hands[index % 4].add(*c);
        }
        PlaySession::new(contract, hands, Vulnerability::NONE).unwrap()
    }

    #[test]
    fn from_session_mirrors_hands_and_turn() {
        let game = session(5, Strain::Hearts);
        let board = Board::from_session(&game);
        assert_eq!(board.next_seat(), game.next_to_play());
        assert_eq!(board.trump(), Some(Suit::Hearts));
        assert!(!board.is_play_complete());
        for seat in Seat::LOOP {
            let count: u32 = Suit::ALL
                .iter()
                .map(|suit| board.hand_mask(seat, *suit).count_ones())
                .sum();
            assert_eq!(count, 13);
        }
    }

    #[test]
    fn play_then_undo_restores_the_board() {
        let game = session(9, Strain::NoTrump);
        let mut board = Board::from_session(&game);
        let original = board.clone();

        let first = board.legal_plays()[0];
        let undo = board.play(first);
        assert_ne!(board, original);
        board.undo(undo);
        assert_eq!(board, original);
    }

    #[test]
    fn undo_reverses_a_completed_trick() {
        let game = session(13, Strain::Spades);
        let mut board = Board::from_session(&game);

        let mut undos = Vec::new();
        for _ in 0..4 {
            let card = board.legal_plays()[0];
            undos.push(board.play(card));
        }
        assert_eq!(
            board.tricks_won(Side::NorthSouth) + board.tricks_won(Side::EastWest),
            1
        );

        let before_last: Board = {
            let mut replay = Board::from_session(&game);
            for _ in 0..3 {
                let card = replay.legal_plays()[0];
                replay.play(card);
            }
            replay
        };
        board.undo(undos.pop().unwrap());
        assert_eq!(board, before_last);
    }

    #[test]
    fn board_agrees_with_session_over_a_whole_hand() {
        let mut game = session(33, Strain::Diamonds);
        let mut board = Board::from_session(&game);

        while !game.is_play_complete() {
            let seat = game.next_to_play();
            assert_eq!(board.next_seat(), seat);
            let card = game.legal_plays(seat)[0];
            assert!(board.legal_plays().contains(&card));
            board.play(card);
            game.play_card(seat, card).unwrap();
        }

        assert!(board.is_play_complete());
        for side in [Side::NorthSouth, Side::EastWest] {
            assert_eq!(board.tricks_won(side), game.tricks_won_by_side(side));
        }
    }

    #[test]
    fn follow_suit_is_enforced_on_the_board() {
        let north = [card(Rank::Ace, Suit::Spades), card(Rank::Two, Suit::Hearts)];
        let east = [card(Rank::Three, Suit::Spades), card(Rank::Five, Suit::Hearts)];
        let south = [card(Rank::Four, Suit::Spades), card(Rank::Six, Suit::Hearts)];
        let west = [card(Rank::Five, Suit::Spades), card(Rank::King, Suit::Hearts)];
        let mut board = Board::from_cards(
            [&north, &east, &south, &west],
            None,
            Side::NorthSouth,
            Seat::North,
        );

        board.play(card(Rank::Ace, Suit::Spades));
        assert_eq!(board.legal_plays(), vec![card(Rank::Three, Suit::Spades)]);
    }

    #[test]
    fn highest_remaining_tracks_played_cards() {
        let north = [card(Rank::Ace, Suit::Spades), card(Rank::Two, Suit::Hearts)];
        let east = [card(Rank::Three, Suit::Spades), card(Rank::Five, Suit::Hearts)];
        let south = [card(Rank::King, Suit::Spades), card(Rank::Six, Suit::Hearts)];
        let west = [card(Rank::Queen, Suit::Spades), card(Rank::King, Suit::Hearts)];
        let mut board = Board::from_cards(
            [&north, &east, &south, &west],
            None,
            Side::NorthSouth,
            Seat::North,
        );

        assert_eq!(board.highest_remaining(Suit::Spades), Some(Rank::Ace));
        board.play(card(Rank::Ace, Suit::Spades));
        assert_eq!(board.highest_remaining(Suit::Spades), Some(Rank::King));
        assert_eq!(board.highest_remaining(Suit::Diamonds), None);
    }
}

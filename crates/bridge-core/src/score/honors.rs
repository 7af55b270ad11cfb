use crate::model::contract::Strain;
use crate::model::hand::Hand;

/// The honors bonus for a board: in a trump contract, one hand alone holding
/// four of the five trump honors earns 100, all five earns 150; in no-trump,
/// one hand holding all four aces earns 150. Which side holds them is
/// irrelevant, and the bonus applies whatever the play result was.
pub fn honors_bonus(hands: &[Hand; 4], strain: Strain) -> i32 {
    match strain.trump() {
        Some(trump) => {
            for hand in hands {
                let held = hand
                    .cards_in_suit(trump)
                    .filter(|card| card.is_honor())
                    .count();
                match held {
                    5 => return 150,
                    4 => return 100,
                    _ => {}
                }
            }
            0
        }
        None => {
            for hand in hands {
                let aces = hand.iter().filter(|card| card.is_ace()).count();
                if aces == 4 {
                    return 150;
                }
            }
            0
        }
    }
}

//! Duplicate-bridge scoring for a completed hand. `calculate_score` is a
//! total pure function over well-formed inputs; honors are only assessed
//! when the dealt hands are supplied.

mod honors;

pub use honors::honors_bonus;

use crate::model::contract::{Contract, Doubling, Vulnerability};
use crate::model::hand::Hand;
use serde::Serialize;

/// The itemized bonuses behind a score. Defeated contracts zero everything
/// except the honors bonus, which applies regardless of the play result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub trick_score: i32,
    pub game_or_partial_bonus: i32,
    pub slam_bonus: i32,
    pub insult_bonus: i32,
    pub honors_bonus: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    pub made: bool,
    pub overtricks: u8,
    pub undertricks: u8,
    /// Declarer's score for the board; negative when the contract fails.
    pub total: i32,
    pub breakdown: ScoreBreakdown,
}

pub fn calculate_score(
    contract: &Contract,
    tricks_taken: u8,
    vulnerability: Vulnerability,
    hands: Option<&[Hand; 4]>,
) -> ScoreResult {
    let vulnerable = vulnerability.is_vulnerable(contract.declaring_side());
    let needed = contract.tricks_needed();
    let honors = hands.map_or(0, |hands| honors_bonus(hands, contract.strain()));

    if tricks_taken >= needed {
        let overtricks = tricks_taken - needed;
        let breakdown = making_breakdown(contract, vulnerable, honors);
        ScoreResult {
            made: true,
            overtricks,
            undertricks: 0,
            total: breakdown.trick_score
                + breakdown.game_or_partial_bonus
                + breakdown.slam_bonus
                + breakdown.insult_bonus
                + breakdown.honors_bonus
                + overtrick_score(contract, overtricks, vulnerable),
            breakdown,
        }
    } else {
        let undertricks = needed - tricks_taken;
        ScoreResult {
            made: false,
            overtricks: 0,
            undertricks,
            total: -undertrick_penalty(contract.doubling(), undertricks, vulnerable) + honors,
            breakdown: ScoreBreakdown {
                honors_bonus: honors,
                ..ScoreBreakdown::default()
            },
        }
    }
}

fn making_breakdown(contract: &Contract, vulnerable: bool, honors: i32) -> ScoreBreakdown {
    let strain = contract.strain();
    let level = contract.level() as i32;
    let base = strain.first_trick_value() + strain.trick_value() * (level - 1);
    let trick_score = base * contract.doubling().multiplier();

    let game_or_partial_bonus = if trick_score >= 100 {
        if vulnerable { 500 } else { 300 }
    } else {
        50
    };

    let slam_bonus = match contract.level() {
        6 => {
            if vulnerable {
                750
            } else {
                500
            }
        }
        7 => {
            if vulnerable {
                1500
            } else {
                1000
            }
        }
        _ => 0,
    };

    ScoreBreakdown {
        trick_score,
        game_or_partial_bonus,
        slam_bonus,
        insult_bonus: contract.doubling().insult_bonus(),
        honors_bonus: honors,
    }
}

fn overtrick_score(contract: &Contract, overtricks: u8, vulnerable: bool) -> i32 {
    let overtricks = overtricks as i32;
    match contract.doubling() {
        Doubling::Undoubled => overtricks * contract.strain().trick_value(),
        Doubling::Doubled => overtricks * if vulnerable { 200 } else { 100 },
        Doubling::Redoubled => overtricks * if vulnerable { 400 } else { 200 },
    }
}

fn undertrick_penalty(doubling: Doubling, undertricks: u8, vulnerable: bool) -> i32 {
    let n = undertricks as i32;
    match doubling {
        Doubling::Undoubled => n * if vulnerable { 100 } else { 50 },
        Doubling::Doubled => doubled_penalty(n, vulnerable),
        Doubling::Redoubled => 2 * doubled_penalty(n, vulnerable),
    }
}

// Doubled undertricks: vulnerable 200 then 300 each; non-vulnerable 100,
// then 200 for the second and third, then 300 each.
fn doubled_penalty(undertricks: i32, vulnerable: bool) -> i32 {
    if vulnerable {
        200 + (undertricks - 1) * 300
    } else {
        match undertricks {
            1 => 100,
            2 => 300,
            3 => 500,
            n => 500 + (n - 3) * 300,
        }
    }
}

use crate::model::seat::{Seat, Side};
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The denomination named by the final bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Strain {
    Clubs = 0,
    Diamonds = 1,
    Hearts = 2,
    Spades = 3,
    NoTrump = 4,
}

impl Strain {
    pub const fn trump(self) -> Option<Suit> {
        match self {
            Strain::Clubs => Some(Suit::Clubs),
            Strain::Diamonds => Some(Suit::Diamonds),
            Strain::Hearts => Some(Suit::Hearts),
            Strain::Spades => Some(Suit::Spades),
            Strain::NoTrump => None,
        }
    }

    pub const fn is_minor(self) -> bool {
        matches!(self, Strain::Clubs | Strain::Diamonds)
    }

    pub const fn is_major(self) -> bool {
        matches!(self, Strain::Hearts | Strain::Spades)
    }

    /// Points per contracted trick: 20 for minors, 30 otherwise.
    pub const fn trick_value(self) -> i32 {
        if self.is_minor() { 20 } else { 30 }
    }

    /// In no-trump the first contracted trick scores 40.
    pub const fn first_trick_value(self) -> i32 {
        match self {
            Strain::NoTrump => 40,
            _ => self.trick_value(),
        }
    }
}

impl fmt::Display for Strain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Strain::Clubs => "C",
            Strain::Diamonds => "D",
            Strain::Hearts => "H",
            Strain::Spades => "S",
            Strain::NoTrump => "NT",
        };
        f.write_str(symbol)
    }
}

impl FromStr for Strain {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "C" => Ok(Strain::Clubs),
            "D" => Ok(Strain::Diamonds),
            "H" => Ok(Strain::Hearts),
            "S" => Ok(Strain::Spades),
            "N" | "NT" => Ok(Strain::NoTrump),
            _ => Err(ContractError::Unparseable(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Doubling {
    #[default]
    Undoubled = 0,
    Doubled = 1,
    Redoubled = 2,
}

impl Doubling {
    pub const fn multiplier(self) -> i32 {
        match self {
            Doubling::Undoubled => 1,
            Doubling::Doubled => 2,
            Doubling::Redoubled => 4,
        }
    }

    /// The fixed bonus for making a doubled or redoubled contract.
    pub const fn insult_bonus(self) -> i32 {
        match self {
            Doubling::Undoubled => 0,
            Doubling::Doubled => 50,
            Doubling::Redoubled => 100,
        }
    }
}

impl fmt::Display for Doubling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self {
            Doubling::Undoubled => "",
            Doubling::Doubled => "X",
            Doubling::Redoubled => "XX",
        };
        f.write_str(suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    InvalidLevel(u8),
    Unparseable(String),
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::InvalidLevel(level) => {
                write!(f, "contract level must be 1-7, got {level}")
            }
            ContractError::Unparseable(text) => write!(f, "not a contract: {text:?}"),
        }
    }
}

impl std::error::Error for ContractError {}

/// The outcome of the auction. Immutable once play begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    level: u8,
    strain: Strain,
    declarer: Seat,
    doubling: Doubling,
}

impl Contract {
    pub fn new(
        level: u8,
        strain: Strain,
        declarer: Seat,
        doubling: Doubling,
    ) -> Result<Self, ContractError> {
        if !(1..=7).contains(&level) {
            return Err(ContractError::InvalidLevel(level));
        }
        Ok(Self {
            level,
            strain,
            declarer,
            doubling,
        })
    }

    /// Parse a call such as "3NT", "4S", "4S X" or "6C XX"; the declarer is
    /// supplied by the caller because the call text does not carry it.
    pub fn parse(call: &str, declarer: Seat) -> Result<Self, ContractError> {
        let text = call.trim().to_ascii_uppercase();
        let err = || ContractError::Unparseable(call.to_string());
        let mut parts = text.split_whitespace();
        let head = parts.next().ok_or_else(err)?;

        let level_char = head.chars().next().ok_or_else(err)?;
        let level = level_char.to_digit(10).ok_or_else(err)? as u8;

        let strain_text = if head.len() > 1 {
            &head[1..]
        } else {
            parts.next().ok_or_else(err)?
        };
        let strain: Strain = strain_text.parse()?;

        let doubling = match parts.next() {
            None => Doubling::Undoubled,
            Some("X") => Doubling::Doubled,
            Some("XX") => Doubling::Redoubled,
            Some(_) => return Err(err()),
        };
        if parts.next().is_some() {
            return Err(err());
        }

        Contract::new(level, strain, declarer, doubling)
    }

    pub const fn level(&self) -> u8 {
        self.level
    }

    pub const fn strain(&self) -> Strain {
        self.strain
    }

    pub const fn declarer(&self) -> Seat {
        self.declarer
    }

    pub const fn doubling(&self) -> Doubling {
        self.doubling
    }

    pub const fn trump(&self) -> Option<Suit> {
        self.strain.trump()
    }

    pub const fn tricks_needed(&self) -> u8 {
        self.level + 6
    }

    pub const fn dummy(&self) -> Seat {
        self.declarer.partner()
    }

    /// The opening lead comes from the seat to declarer's left.
    pub const fn opening_leader(&self) -> Seat {
        self.declarer.next()
    }

    pub const fn declaring_side(&self) -> Side {
        self.declarer.side()
    }

    pub const fn defending_side(&self) -> Side {
        self.declaring_side().opponent()
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{} by {}",
            self.level, self.strain, self.doubling, self.declarer
        )
    }
}

/// Which partnerships are vulnerable this board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vulnerability {
    pub north_south: bool,
    pub east_west: bool,
}

impl Vulnerability {
    pub const NONE: Vulnerability = Vulnerability {
        north_south: false,
        east_west: false,
    };

    pub const BOTH: Vulnerability = Vulnerability {
        north_south: true,
        east_west: true,
    };

    pub const fn is_vulnerable(&self, side: Side) -> bool {
        match side {
            Side::NorthSouth => self.north_south,
            Side::EastWest => self.east_west,
        }
    }
}

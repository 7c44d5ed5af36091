//! Parity games and the normalization of priorities.

pub mod game;
pub mod priority;

use std::fmt;

/// A priority of a node in a parity game or of an acceptance set.
pub type Color = usize;

/// A parity value: either even (0) or odd (1).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Parity {
    /// Even parity (0).
    Even = 0,
    /// Odd parity (1).
    Odd = 1,
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let string = match self {
            Self::Even => "even",
            Self::Odd => "odd",
        };
        write!(f, "{}", string)
    }
}

impl Parity {
    /// Returns the parity of the given color.
    pub fn of(color: Color) -> Self {
        match color % 2 {
            0 => Self::Even,
            1 => Self::Odd,
            _ => unreachable!(),
        }
    }
}

impl From<Parity> for Color {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::Even => 0,
            Parity::Odd => 1,
        }
    }
}

/// A player of a parity game.
///
/// In the games constructed here, player even resolves the choice of
/// transitions, while player odd chooses the uncontrollable propositions.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Player {
    Even = 0,
    Odd = 1,
}

impl From<Player> for u32 {
    fn from(player: Player) -> Self {
        match player {
            Player::Even => 0,
            Player::Odd => 1,
        }
    }
}

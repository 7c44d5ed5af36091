//! Normalization of acceptance priorities to max-even games.

use std::fmt;

use log::trace;

use super::{Color, Parity};

/// Whether the highest or the lowest priority seen infinitely often decides the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityOrder {
    Max,
    Min,
}

impl fmt::Display for PriorityOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            Self::Max => "max",
            Self::Min => "min",
        };
        write!(f, "{}", string)
    }
}

/// A parity acceptance condition of an automaton, e.g. `parity min odd 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParityCondition {
    order: PriorityOrder,
    winning: Parity,
    num_priorities: usize,
}

impl ParityCondition {
    pub const fn new(order: PriorityOrder, winning: Parity, num_priorities: usize) -> Self {
        Self {
            order,
            winning,
            num_priorities,
        }
    }

    pub fn order(&self) -> PriorityOrder {
        self.order
    }

    pub fn winning(&self) -> Parity {
        self.winning
    }

    pub fn num_priorities(&self) -> usize {
        self.num_priorities
    }

    /// Maps a priority of this condition to a priority of a max-even game.
    ///
    /// The result is never 0, which is left for nodes without a relevant
    /// priority. Even results are at least 2; the only odd result below 2
    /// is 1, for priority 0 of a max-odd condition.
    ///
    /// # Panics
    ///
    /// Panics if the priority is not below the number of priorities.
    pub fn normalize(&self, priority: Color) -> Color {
        assert!(
            priority < self.num_priorities,
            "priority {} out of range for {} priorities",
            priority,
            self.num_priorities
        );
        // round up so that flipping the order keeps the parity
        let even_ceil = self.num_priorities + self.num_priorities % 2;
        let max_priority = match self.order {
            PriorityOrder::Max => priority,
            PriorityOrder::Min => even_ceil - priority,
        };
        let normalized = max_priority + 2 - Color::from(self.winning);
        debug_assert_eq!(
            Parity::of(normalized) == Parity::Even,
            Parity::of(priority) == self.winning,
            "normalization must preserve the winner"
        );
        trace!(
            "Normalized priority {} to {} for condition {}",
            priority,
            normalized,
            self
        );
        normalized
    }
}

impl fmt::Display for ParityCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parity {} {} {}",
            self.order, self.winning, self.num_priorities
        )
    }
}

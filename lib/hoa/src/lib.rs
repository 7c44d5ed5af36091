//! Automata in the Hanoi Omega-Automata (HOA) format.
//!
//! This crate provides the in-memory model of an automaton read from a HOA
//! file, including the `controllable-AP` extension used for synthesis, and a
//! reader that parses HOA text into this model.

pub mod automaton;
pub mod expr;
mod parser;

pub use automaton::{Aliases, Automaton, AutomatonBuilder, ModelError, State, Transition};
pub use expr::Expr;
pub use parser::{parse, ParseError};

/// The index of a state of an automaton.
pub type StateId = usize;

/// The index of an atomic proposition.
pub type ApIndex = usize;

/// The index of an acceptance set.
pub type AccSet = usize;

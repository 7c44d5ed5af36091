//! Translation of deterministic parity automata in HOA format
//! to parity games in PGSolver format.
//!
//! The automaton needs to be deterministic, complete and colored, and
//! declare which atomic propositions are controllable with the
//! `controllable-AP` header. The resulting game is a max-even parity game.

mod constructor;
mod error;
pub mod label;
pub mod options;
pub mod parity;
pub mod validation;

use std::io;

use log::{info, trace};

pub use constructor::ConstructionStats;
pub use error::Error;
pub use hoa::Automaton;

use constructor::GameConstructor;
use options::ConstructionOptions;
use parity::game::LabelledParityGame;

/// The game constructed for an automaton.
pub struct ConstructionResult {
    game: LabelledParityGame<String>,
    stats: ConstructionStats,
}

impl ConstructionResult {
    pub fn game(&self) -> &LabelledParityGame<String> {
        &self.game
    }

    pub fn stats(&self) -> &ConstructionStats {
        &self.stats
    }

    pub fn into_game(self) -> LabelledParityGame<String> {
        self.game
    }

    /// Writes the game in PGSolver format.
    pub fn write<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "{}", self.game)?;
        writer.flush()
    }
}

pub fn construct_game(automaton: &Automaton) -> Result<ConstructionResult, Error> {
    construct_game_with(automaton, &ConstructionOptions::default())
}

/// Validates the automaton and constructs its game with the given options.
///
/// # Errors
///
/// Returns an error if the automaton is not a deterministic, complete and
/// colored parity automaton with one start state, or if it has too many
/// uncontrollable atomic propositions.
///
/// # Panics
///
/// Panics if the automaton does not match its declared properties, e.g.
/// if a transition has more than one acceptance set.
pub fn construct_game_with(
    automaton: &Automaton,
    options: &ConstructionOptions,
) -> Result<ConstructionResult, Error> {
    info!("Validating automaton");
    let condition = validation::validate(automaton)?;

    info!("Constructing game");
    let mut constructor = GameConstructor::new(automaton, condition, options)?;
    constructor.construct();
    let stats = constructor.stats().clone();
    info!("Finished constructing game: {}", stats);

    Ok(ConstructionResult {
        game: constructor.into_game(),
        stats,
    })
}

/// Reads an automaton in HOA format and constructs its game.
///
/// # Errors
///
/// Returns an error if the input can not be parsed, or under the
/// conditions of [`construct_game_with`].
pub fn translate_with(
    input: &str,
    options: &ConstructionOptions,
) -> Result<ConstructionResult, Error> {
    info!("Reading automaton");
    let automaton = hoa::parse(input)?;
    trace!("Read automaton:\n{}", automaton);
    construct_game_with(&automaton, options)
}

//! Options for the game construction and the command-line interface.

use std::fmt;

use clap::{Args, Parser, ValueEnum};

/// The largest number of uncontrollable atomic propositions for which
/// valuations can be enumerated.
pub const MAX_UNCONTROLLABLE: u8 = 63;

/// The trace level / verbosity for the logging framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceLevel {
    /// Turn logging off.
    #[value(name = "off")]
    Off,
    /// Only print errors.
    #[value(name = "error")]
    Error,
    /// Print errors and warnings.
    #[value(name = "warn")]
    Warn,
    /// Print errors, warnings and useful information.
    #[value(name = "info")]
    Info,
    /// Print errors, warnings, useful and debug information.
    #[value(name = "debug")]
    Debug,
    /// Print all information, including very verbose output.
    #[value(name = "trace")]
    Trace,
}
impl Default for TraceLevel {
    fn default() -> Self {
        Self::Error
    }
}

/// Uses the names from [`clap::ValueEnum`], so that the
/// displayed default value can be parsed again.
impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => write!(f, "{}", value.get_name()),
            None => Ok(()),
        }
    }
}

impl From<TraceLevel> for log::LevelFilter {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Off => Self::Off,
            TraceLevel::Error => Self::Error,
            TraceLevel::Warn => Self::Warn,
            TraceLevel::Info => Self::Info,
            TraceLevel::Debug => Self::Debug,
            TraceLevel::Trace => Self::Trace,
        }
    }
}

/// A group of options used for parsing the arguments of the
/// command-line interface.
///
/// This struct should mainly be used with [`clap`] and not
/// instantiated manually. For using this crate as library,
/// please use [`ConstructionOptions`] directly instead. This struct
/// only includes additional fields for specifying input
/// and output options.
#[derive(Debug, Clone, Default, Parser)]
#[command(version, about)]
pub struct CliOptions {
    /// The input file from which the automaton is read.
    /// If not set, the automaton is read from standard input.
    #[arg(
        short = 'F',
        long = "input-file",
        value_name = "FILE",
        help = "Read automaton from the given file instead of standard input",
        display_order = 0
    )]
    pub input_file: Option<String>,
    /// The output file where the game should be written to.
    /// If not set, the game is written to standard output.
    #[arg(
        short = 'O',
        long = "output-file",
        value_name = "FILE",
        help = "Write game to the given file instead of standard output",
        display_order = 1
    )]
    pub output_file: Option<String>,
    /// The trace level to use for instantiating the logging framework.
    #[arg(
        value_enum,
        short = 't',
        long = "trace",
        value_name = "LEVEL",
        default_value_t,
        help = "Trace level",
        display_order = 3
    )]
    pub trace_level: TraceLevel,
    /// The set of options for the game construction.
    #[command(flatten)]
    pub construction_options: ConstructionOptions,
}

/// Options to control the construction of the game.
///
/// These options can then be used with [`construct_game_with`](crate::construct_game_with).
///
/// # Examples
///
/// ```
/// use hoa2pg::options::ConstructionOptions;
/// let options = ConstructionOptions {
///     max_uncontrollable: 8,
///     ..ConstructionOptions::default()
/// };
/// ```
#[derive(Debug, Clone, Args)]
pub struct ConstructionOptions {
    /// The largest number of uncontrollable atomic propositions that is accepted.
    ///
    /// The game has a node for each valuation of the uncontrollable propositions
    /// in each state, so its size grows exponentially with this number.
    /// Values above [`MAX_UNCONTROLLABLE`] are treated as [`MAX_UNCONTROLLABLE`].
    #[arg(
        long = "max-uncontrollable",
        value_name = "N",
        default_value_t = 20,
        value_parser = clap::value_parser!(u8).range(0..=MAX_UNCONTROLLABLE as i64),
        help = "Maximal number of uncontrollable atomic propositions",
        display_order = 2
    )]
    pub max_uncontrollable: u8,
}

impl Default for ConstructionOptions {
    fn default() -> Self {
        Self {
            max_uncontrollable: 20,
        }
    }
}

impl From<&CliOptions> for ConstructionOptions {
    fn from(options: &CliOptions) -> Self {
        options.construction_options.clone()
    }
}

use std::fmt;
use std::io;

use crate::validation::ValidationError;

/// An error which can occur when translating an automaton to a game.
#[derive(Debug)]
pub enum Error {
    /// Reading the input or writing the output failed.
    Io(io::Error),
    /// The input is not a valid automaton in HOA format.
    Parse(hoa::ParseError),
    /// The automaton is not suitable for translation to a game.
    Validation(ValidationError),
    /// The automaton has more uncontrollable propositions than the configured limit.
    TooManyUncontrollable { count: usize, limit: usize },
    /// The nodes for all valuations of the uncontrollable propositions do not fit into memory.
    GameTooLarge { states: usize, uncontrollable: usize },
}

impl Error {
    /// The exit code with which the binary terminates for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Parse(_) => 1,
            Self::Io(_) => 2,
            Self::Validation(e) => e.exit_code(),
            Self::TooManyUncontrollable { .. } | Self::GameTooLarge { .. } => 400,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{}", e),
            Self::Parse(e) => write!(f, "{}", e),
            Self::Validation(e) => write!(f, "{}", e),
            Self::TooManyUncontrollable { count, limit } => write!(
                f,
                "automaton has {} uncontrollable atomic propositions, but at most {} are supported",
                count, limit
            ),
            Self::GameTooLarge {
                states,
                uncontrollable,
            } => write!(
                f,
                "game for {} states with {} uncontrollable atomic propositions does not fit into memory",
                states, uncontrollable
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Validation(e) => Some(e),
            Self::TooManyUncontrollable { .. } | Self::GameTooLarge { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<hoa::ParseError> for Error {
    fn from(error: hoa::ParseError) -> Self {
        Self::Parse(error)
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let io = Error::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(io.exit_code(), 2);
        let parse = Error::from(hoa::parse("HOA: v1").unwrap_err());
        assert_eq!(parse.exit_code(), 1);
        let validation = Error::from(ValidationError::NotColored);
        assert_eq!(validation.exit_code(), 202);
        let limit = Error::TooManyUncontrollable {
            count: 21,
            limit: 20,
        };
        assert_eq!(limit.exit_code(), 400);
        assert_eq!(
            limit.to_string(),
            "automaton has 21 uncontrollable atomic propositions, but at most 20 are supported"
        );
        let too_large = Error::GameTooLarge {
            states: 2,
            uncontrollable: 63,
        };
        assert_eq!(too_large.exit_code(), 400);
    }
}

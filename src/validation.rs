//! Checks that an automaton can be translated to a parity game.

use std::fmt;

use hoa::Automaton;
use log::debug;

use crate::parity::priority::{ParityCondition, PriorityOrder};
use crate::parity::Parity;

/// The reason why an automaton is not suitable for translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The acceptance name is missing or not `parity`.
    NotParity(Option<String>),
    /// The acceptance name has no unique `max` or `min` parameter.
    PriorityOrder,
    /// The acceptance name has no unique `even` or `odd` parameter.
    WinningParity,
    NotDeterministic,
    NotComplete,
    NotColored,
    /// The automaton has the given number of start states instead of one.
    StartStates(usize),
}

impl ValidationError {
    /// The exit code with which the binary terminates for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotParity(_) => 100,
            Self::PriorityOrder => 101,
            Self::WinningParity => 102,
            Self::NotDeterministic => 200,
            Self::NotComplete => 201,
            Self::NotColored => 202,
            Self::StartStates(_) => 300,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotParity(Some(name)) => write!(
                f,
                "expected a parity acceptance condition, found acc-name {}",
                name
            ),
            Self::NotParity(None) => {
                write!(f, "expected a parity acceptance condition, found no acc-name")
            }
            Self::PriorityOrder => write!(f, "acc-name needs exactly one of max and min"),
            Self::WinningParity => write!(f, "acc-name needs exactly one of even and odd"),
            Self::NotDeterministic => write!(f, "automaton is not declared deterministic"),
            Self::NotComplete => write!(f, "automaton is not declared complete"),
            Self::NotColored => write!(f, "automaton is not declared colored"),
            Self::StartStates(n) => {
                write!(f, "automaton needs exactly one start state, found {}", n)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Returns the single value of the given candidates occuring in the
/// parameters, or `None` if there is no such value or more than one.
fn unique_param<T: Copy>(params: &[String], candidates: &[(&str, T)]) -> Option<T> {
    let mut found = candidates
        .iter()
        .filter(|(name, _)| params.iter().any(|p| p == name))
        .map(|&(_, value)| value);
    match (found.next(), found.next()) {
        (Some(value), None) => Some(value),
        _ => None,
    }
}

/// Checks that the automaton is a deterministic, complete and colored parity
/// automaton with a single start state, and returns its parity condition.
///
/// # Errors
///
/// Returns the first violated requirement, checked in the order of
/// acceptance name, parameters, properties and start states.
pub fn validate(automaton: &Automaton) -> Result<ParityCondition, ValidationError> {
    match automaton.acc_name() {
        Some("parity") => (),
        name => return Err(ValidationError::NotParity(name.map(String::from))),
    }
    let params = automaton.acc_name_params();
    let order = unique_param(
        params,
        &[("max", PriorityOrder::Max), ("min", PriorityOrder::Min)],
    )
    .ok_or(ValidationError::PriorityOrder)?;
    let winning = unique_param(params, &[("even", Parity::Even), ("odd", Parity::Odd)])
        .ok_or(ValidationError::WinningParity)?;

    if !automaton.has_property("deterministic") {
        return Err(ValidationError::NotDeterministic);
    }
    if !automaton.has_property("complete") {
        return Err(ValidationError::NotComplete);
    }
    if !automaton.has_property("colored") {
        return Err(ValidationError::NotColored);
    }
    match automaton.start().len() {
        1 => (),
        n => return Err(ValidationError::StartStates(n)),
    }

    let condition = ParityCondition::new(order, winning, automaton.num_acc_sets());
    debug!("Automaton has acceptance condition {}", condition);
    Ok(condition)
}

#[cfg(test)]
mod tests {
    use super::*;

    use hoa::{State, Transition};

    fn builder(acc_name: &str, params: &[&str], properties: &[&str]) -> hoa::AutomatonBuilder {
        let mut builder = Automaton::builder();
        builder
            .num_states(1)
            .start(vec![0])
            .aps(0, Vec::<String>::new())
            .acceptance(2, hoa::Expr::inf(hoa::Expr::Set(0)))
            .acc_name(acc_name, params.iter().copied())
            .properties(properties.iter().copied());
        let mut state = State::new(0);
        state.add_transition(Transition::new(
            Some(hoa::Expr::Bool(true)),
            vec![0],
            Some(vec![0]),
        ));
        builder.state(state);
        builder
    }

    const ALL: &[&str] = &["deterministic", "complete", "colored"];

    fn validate_with(
        acc_name: &str,
        params: &[&str],
        properties: &[&str],
    ) -> Result<ParityCondition, ValidationError> {
        validate(&builder(acc_name, params, properties).build().unwrap())
    }

    #[test]
    fn test_valid() {
        assert_eq!(
            validate_with("parity", &["max", "even", "2"], ALL),
            Ok(ParityCondition::new(PriorityOrder::Max, Parity::Even, 2))
        );
        assert_eq!(
            validate_with("parity", &["odd", "min"], ALL),
            Ok(ParityCondition::new(PriorityOrder::Min, Parity::Odd, 2))
        );
    }

    #[test]
    fn test_acceptance_name() {
        let result = validate_with("Rabin", &["1"], ALL);
        assert_eq!(
            result,
            Err(ValidationError::NotParity(Some(String::from("Rabin"))))
        );
        assert_eq!(result.unwrap_err().exit_code(), 100);

        let automaton = Automaton::builder()
            .num_states(1)
            .start(vec![0])
            .properties(ALL.iter().copied())
            .build()
            .unwrap();
        assert_eq!(validate(&automaton), Err(ValidationError::NotParity(None)));
    }

    #[test]
    fn test_parameters() {
        let result = validate_with("parity", &["max"], ALL);
        assert_eq!(result, Err(ValidationError::WinningParity));
        assert_eq!(result.unwrap_err().exit_code(), 102);

        let result = validate_with("parity", &["even"], ALL);
        assert_eq!(result, Err(ValidationError::PriorityOrder));
        assert_eq!(result.unwrap_err().exit_code(), 101);

        assert_eq!(
            validate_with("parity", &["max", "min", "even"], ALL),
            Err(ValidationError::PriorityOrder)
        );
        assert_eq!(
            validate_with("parity", &["max", "even", "odd"], ALL),
            Err(ValidationError::WinningParity)
        );
    }

    #[test]
    fn test_properties() {
        let result = validate_with("parity", &["max", "even"], &["complete", "colored"]);
        assert_eq!(result, Err(ValidationError::NotDeterministic));
        assert_eq!(result.unwrap_err().exit_code(), 200);

        let result = validate_with("parity", &["max", "even"], &["deterministic", "colored"]);
        assert_eq!(result, Err(ValidationError::NotComplete));
        assert_eq!(result.unwrap_err().exit_code(), 201);

        let result = validate_with("parity", &["max", "even"], &["deterministic", "complete"]);
        assert_eq!(result, Err(ValidationError::NotColored));
        assert_eq!(result.unwrap_err().exit_code(), 202);
    }

    #[test]
    fn test_start_states() {
        let mut builder = builder("parity", &["max", "even"], ALL);
        builder.num_states(2).start(vec![1]);
        let result = validate(&builder.build().unwrap());
        assert_eq!(result, Err(ValidationError::StartStates(2)));
        assert_eq!(result.unwrap_err().exit_code(), 300);
    }

    #[test]
    fn test_order_of_checks() {
        // missing parameters are reported before missing properties
        assert_eq!(
            validate_with("parity", &[], &[]),
            Err(ValidationError::PriorityOrder)
        );
        assert_eq!(
            validate_with("co-Buchi", &[], &[]),
            Err(ValidationError::NotParity(Some(String::from("co-Buchi"))))
        );
    }
}

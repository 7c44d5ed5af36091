//! The automaton model of a HOA file.

use std::fmt;

use log::warn;

use crate::expr::Expr;
use crate::{AccSet, ApIndex, StateId};

/// An alias with its name (without the leading `@`) and bound expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alias {
    name: String,
    expr: Expr,
}

impl Alias {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

/// The table of aliases of an automaton, in definition order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Aliases {
    aliases: Vec<Alias>,
}

impl Aliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&mut self, name: S, expr: Expr) {
        self.aliases.push(Alias {
            name: name.into(),
            expr,
        });
    }

    /// Returns the expression bound to the first alias with the given name.
    pub fn lookup(&self, name: &str) -> Option<&Expr> {
        self.aliases
            .iter()
            .find(|alias| alias.name == name)
            .map(Alias::expr)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Alias> {
        self.aliases.iter()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// An edge of a state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    label: Option<Expr>,
    successors: Vec<StateId>,
    acc_sig: Option<Vec<AccSet>>,
}

impl Transition {
    /// Creates a transition; the successor list must not be empty.
    pub fn new(label: Option<Expr>, successors: Vec<StateId>, acc_sig: Option<Vec<AccSet>>) -> Self {
        assert!(!successors.is_empty(), "transition without successor");
        Self {
            label,
            successors,
            acc_sig,
        }
    }

    pub fn label(&self) -> Option<&Expr> {
        self.label.as_ref()
    }

    pub fn successors(&self) -> &[StateId] {
        &self.successors
    }

    pub fn acc_sig(&self) -> Option<&[AccSet]> {
        self.acc_sig.as_deref()
    }
}

/// A state with its outgoing transitions.
///
/// A label or acceptance signature on the state itself applies to
/// all of its outgoing transitions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct State {
    id: StateId,
    name: Option<String>,
    label: Option<Expr>,
    acc_sig: Option<Vec<AccSet>>,
    transitions: Vec<Transition>,
}

impl State {
    pub fn new(id: StateId) -> Self {
        Self {
            id,
            name: None,
            label: None,
            acc_sig: None,
            transitions: Vec::new(),
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_label(mut self, label: Expr) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_acc_sig(mut self, acc_sig: Vec<AccSet>) -> Self {
        self.acc_sig = Some(acc_sig);
        self
    }

    pub fn add_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn label(&self) -> Option<&Expr> {
        self.label.as_ref()
    }

    pub fn acc_sig(&self) -> Option<&[AccSet]> {
        self.acc_sig.as_deref()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

/// An automaton read from a HOA file.
///
/// The automaton is immutable once built; use [`AutomatonBuilder`]
/// to assemble one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Automaton {
    version: String,
    name: Option<String>,
    tool: Option<(String, Option<String>)>,
    num_states: usize,
    start: Vec<StateId>,
    aps: Vec<String>,
    controllable_aps: Vec<ApIndex>,
    aliases: Aliases,
    num_acc_sets: usize,
    acceptance: Option<Expr>,
    acc_name: Option<String>,
    acc_name_params: Vec<String>,
    properties: Vec<String>,
    states: Vec<State>,
}

impl Automaton {
    pub fn builder() -> AutomatonBuilder {
        AutomatonBuilder::default()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The tool name and optional tool version.
    pub fn tool(&self) -> Option<(&str, Option<&str>)> {
        self.tool
            .as_ref()
            .map(|(name, version)| (name.as_str(), version.as_deref()))
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// The start states, in order of appearance.
    pub fn start(&self) -> &[StateId] {
        &self.start
    }

    pub fn num_aps(&self) -> usize {
        self.aps.len()
    }

    pub fn aps(&self) -> &[String] {
        &self.aps
    }

    pub fn controllable_aps(&self) -> &[ApIndex] {
        &self.controllable_aps
    }

    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }

    pub fn num_acc_sets(&self) -> usize {
        self.num_acc_sets
    }

    pub fn acceptance(&self) -> Option<&Expr> {
        self.acceptance.as_ref()
    }

    /// The identifier of the acceptance name, e.g. `parity`.
    pub fn acc_name(&self) -> Option<&str> {
        self.acc_name.as_deref()
    }

    /// The parameters of the acceptance name, e.g. `max` and `even`.
    pub fn acc_name_params(&self) -> &[String] {
        &self.acc_name_params
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }

    /// The states in order of appearance in the body.
    pub fn states(&self) -> &[State] {
        &self.states
    }
}

/// An error in the structure of an automaton, e.g. a reference
/// to a state that does not exist.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ModelError {
    /// The number of AP names differs from the declared number.
    ApCount { declared: usize, names: usize },
    /// An atomic proposition index is out of range.
    ApOutOfRange(ApIndex),
    /// A state index is out of range.
    StateOutOfRange(StateId),
    /// A state is defined more than once in the body.
    DuplicateState(StateId),
    /// An acceptance set index is out of range.
    AccSetOutOfRange(AccSet),
    /// An alias refers to an alias that is not defined before it.
    AliasBeforeDefinition(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApCount { declared, names } => write!(
                f,
                "declared {} atomic propositions, but {} names are given",
                declared, names
            ),
            Self::ApOutOfRange(i) => write!(f, "atomic proposition {} is out of range", i),
            Self::StateOutOfRange(s) => write!(f, "state {} is out of range", s),
            Self::DuplicateState(s) => write!(f, "state {} is defined more than once", s),
            Self::AccSetOutOfRange(a) => write!(f, "acceptance set {} is out of range", a),
            Self::AliasBeforeDefinition(name) => {
                write!(f, "alias @{} is used before its definition", name)
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// Builder that collects the parts of an automaton and checks
/// their consistency when building.
#[derive(Debug, Default)]
pub struct AutomatonBuilder {
    version: Option<String>,
    name: Option<String>,
    tool: Option<(String, Option<String>)>,
    num_states: Option<usize>,
    start: Vec<StateId>,
    num_aps: usize,
    aps: Vec<String>,
    controllable_aps: Vec<ApIndex>,
    aliases: Aliases,
    num_acc_sets: usize,
    acceptance: Option<Expr>,
    acc_name: Option<String>,
    acc_name_params: Vec<String>,
    properties: Vec<String>,
    states: Vec<State>,
}

impl AutomatonBuilder {
    pub fn version<S: Into<String>>(&mut self, version: S) -> &mut Self {
        self.version = Some(version.into());
        self
    }

    pub fn name<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn tool<S: Into<String>>(&mut self, name: S, version: Option<S>) -> &mut Self {
        self.tool = Some((name.into(), version.map(Into::into)));
        self
    }

    pub fn num_states(&mut self, num_states: usize) -> &mut Self {
        self.num_states = Some(num_states);
        self
    }

    /// Adds start states; may be called several times.
    pub fn start<I: IntoIterator<Item = StateId>>(&mut self, states: I) -> &mut Self {
        self.start.extend(states);
        self
    }

    pub fn aps<I, S>(&mut self, num_aps: usize, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.num_aps = num_aps;
        self.aps = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn controllable_aps<I: IntoIterator<Item = ApIndex>>(&mut self, aps: I) -> &mut Self {
        self.controllable_aps.extend(aps);
        self
    }

    pub fn alias<S: Into<String>>(&mut self, name: S, expr: Expr) -> &mut Self {
        let name = name.into();
        if self.aliases.lookup(&name).is_some() {
            warn!("Alias @{} is defined more than once, using first definition", name);
        }
        self.aliases.push(name, expr);
        self
    }

    pub fn acceptance(&mut self, num_acc_sets: usize, condition: Expr) -> &mut Self {
        self.num_acc_sets = num_acc_sets;
        self.acceptance = Some(condition);
        self
    }

    pub fn acc_name<S, I, P>(&mut self, name: S, params: I) -> &mut Self
    where
        S: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.acc_name = Some(name.into());
        self.acc_name_params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Adds properties; may be called several times.
    pub fn properties<I, S>(&mut self, properties: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.extend(properties.into_iter().map(Into::into));
        self
    }

    pub fn state(&mut self, state: State) -> &mut Self {
        self.states.push(state);
        self
    }

    /// Checks the collected parts and builds the automaton.
    ///
    /// If no number of states was given, it is derived from the largest
    /// referenced state. States below the number of states that have not
    /// been added are appended without transitions in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the parts are inconsistent.
    pub fn build(&mut self) -> Result<Automaton, ModelError> {
        let builder = std::mem::take(self);
        if builder.aps.len() != builder.num_aps {
            return Err(ModelError::ApCount {
                declared: builder.num_aps,
                names: builder.aps.len(),
            });
        }
        let num_aps = builder.num_aps;
        let check_ap = |ap: ApIndex| {
            if ap < num_aps {
                Ok(())
            } else {
                Err(ModelError::ApOutOfRange(ap))
            }
        };
        for &ap in &builder.controllable_aps {
            check_ap(ap)?;
        }
        for (i, alias) in builder.aliases.iter().enumerate() {
            alias.expr().max_ap().map_or(Ok(()), check_ap)?;
            // aliases may only refer to earlier aliases
            let mut undefined =
                |name: &str| !builder.aliases.iter().take(i).any(|a| a.name() == name);
            if let Some(name) = alias.expr().find_alias(&mut undefined) {
                return Err(ModelError::AliasBeforeDefinition(name.to_string()));
            }
        }

        let referenced = builder
            .states
            .iter()
            .flat_map(|s| {
                std::iter::once(s.id)
                    .chain(s.transitions.iter().flat_map(|t| t.successors.iter().copied()))
            })
            .chain(builder.start.iter().copied())
            .max();
        let num_states = builder
            .num_states
            .unwrap_or_else(|| referenced.map_or(0, |s| s + 1));
        if let Some(s) = referenced.filter(|&s| s >= num_states) {
            return Err(ModelError::StateOutOfRange(s));
        }

        let num_acc_sets = builder.num_acc_sets;
        let check_sig = |sig: Option<&[AccSet]>| match sig
            .and_then(|sig| sig.iter().copied().find(|&a| a >= num_acc_sets))
        {
            Some(a) => Err(ModelError::AccSetOutOfRange(a)),
            None => Ok(()),
        };

        let mut defined = vec![false; num_states];
        for state in &builder.states {
            if defined[state.id] {
                return Err(ModelError::DuplicateState(state.id));
            }
            defined[state.id] = true;
            state.label().and_then(Expr::max_ap).map_or(Ok(()), check_ap)?;
            check_sig(state.acc_sig())?;
            for transition in &state.transitions {
                transition
                    .label()
                    .and_then(Expr::max_ap)
                    .map_or(Ok(()), check_ap)?;
                check_sig(transition.acc_sig())?;
            }
        }

        let mut states = builder.states;
        states.extend(
            defined
                .iter()
                .enumerate()
                .filter(|(_, defined)| !**defined)
                .map(|(id, _)| State::new(id)),
        );

        Ok(Automaton {
            version: builder.version.unwrap_or_else(|| String::from("v1")),
            name: builder.name,
            tool: builder.tool,
            num_states,
            start: builder.start,
            aps: builder.aps,
            controllable_aps: builder.controllable_aps,
            aliases: builder.aliases,
            num_acc_sets,
            acceptance: builder.acceptance,
            acc_name: builder.acc_name,
            acc_name_params: builder.acc_name_params,
            properties: builder.properties,
            states,
        })
    }
}

/// Writes a string as a quoted HOA string.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            write!(f, "\\")?;
        }
        write!(f, "{}", c)?;
    }
    write!(f, "\"")
}

fn write_acc_sig(f: &mut fmt::Formatter<'_>, sig: &[AccSet]) -> fmt::Result {
    write!(f, " {{")?;
    for (i, a) in sig.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", a)?;
    }
    write!(f, "}}")
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // write header
        writeln!(f, "HOA: {}", self.version)?;
        if let Some(name) = &self.name {
            write!(f, "name: ")?;
            write_quoted(f, name)?;
            writeln!(f)?;
        }
        if let Some((tool, version)) = &self.tool {
            write!(f, "tool: ")?;
            write_quoted(f, tool)?;
            if let Some(version) = version {
                write!(f, " ")?;
                write_quoted(f, version)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "States: {}", self.num_states)?;
        for s in &self.start {
            writeln!(f, "Start: {}", s)?;
        }
        write!(f, "AP: {}", self.aps.len())?;
        for ap in &self.aps {
            write!(f, " ")?;
            write_quoted(f, ap)?;
        }
        writeln!(f)?;
        if !self.controllable_aps.is_empty() {
            write!(f, "controllable-AP:")?;
            for ap in &self.controllable_aps {
                write!(f, " {}", ap)?;
            }
            writeln!(f)?;
        }
        for alias in self.aliases.iter() {
            writeln!(f, "Alias: @{} {}", alias.name(), alias.expr())?;
        }
        if let Some(acc_name) = &self.acc_name {
            write!(f, "acc-name: {}", acc_name)?;
            for param in &self.acc_name_params {
                write!(f, " {}", param)?;
            }
            writeln!(f)?;
        }
        match &self.acceptance {
            Some(condition) => writeln!(f, "Acceptance: {} {}", self.num_acc_sets, condition)?,
            None => writeln!(f, "Acceptance: {} t", self.num_acc_sets)?,
        }
        if !self.properties.is_empty() {
            write!(f, "properties:")?;
            for property in &self.properties {
                write!(f, " {}", property)?;
            }
            writeln!(f)?;
        }

        // write body
        writeln!(f, "--BODY--")?;
        for state in &self.states {
            write!(f, "State:")?;
            if let Some(label) = &state.label {
                write!(f, " [{}]", label)?;
            }
            write!(f, " {}", state.id)?;
            if let Some(name) = &state.name {
                write!(f, " ")?;
                write_quoted(f, name)?;
            }
            if let Some(sig) = &state.acc_sig {
                write_acc_sig(f, sig)?;
            }
            writeln!(f)?;
            for t in &state.transitions {
                if let Some(label) = &t.label {
                    write!(f, "[{}] ", label)?;
                }
                for (i, s) in t.successors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "&")?;
                    }
                    write!(f, "{}", s)?;
                }
                if let Some(sig) = &t.acc_sig {
                    write_acc_sig(f, sig)?;
                }
                writeln!(f)?;
            }
        }
        writeln!(f, "--END--")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_state_builder() -> AutomatonBuilder {
        let mut builder = Automaton::builder();
        builder
            .num_states(2)
            .start(vec![0])
            .aps(2, vec!["a", "b"])
            .controllable_aps(vec![1])
            .acceptance(2, Expr::inf(Expr::Set(0)))
            .acc_name("parity", vec!["max", "even"]);
        let mut s0 = State::new(0).with_name("init");
        s0.add_transition(Transition::new(Some(Expr::Ap(0)), vec![1], Some(vec![1])));
        s0.add_transition(Transition::new(
            Some(Expr::not(Expr::Ap(0))),
            vec![0],
            Some(vec![0]),
        ));
        builder.state(s0);
        builder
    }

    #[test]
    fn test_build_fills_missing_states() {
        let automaton = two_state_builder().build().unwrap();
        assert_eq!(automaton.num_states(), 2);
        let ids: Vec<_> = automaton.states().iter().map(State::id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert!(automaton.states()[1].transitions().is_empty());
        assert_eq!(automaton.states()[0].name(), Some("init"));
    }

    #[test]
    fn test_build_derives_number_of_states() {
        let mut builder = Automaton::builder();
        let mut s = State::new(0);
        s.add_transition(Transition::new(Some(Expr::Bool(true)), vec![2], None));
        builder.start(vec![0]).state(s);
        let automaton = builder.build().unwrap();
        assert_eq!(automaton.num_states(), 3);
        assert_eq!(automaton.states().len(), 3);
    }

    #[test]
    fn test_build_errors() {
        let mut builder = two_state_builder();
        builder.aps(3, vec!["a", "b"]);
        assert_eq!(
            builder.build(),
            Err(ModelError::ApCount {
                declared: 3,
                names: 2
            })
        );

        let mut builder = two_state_builder();
        builder.controllable_aps(vec![2]);
        assert_eq!(builder.build(), Err(ModelError::ApOutOfRange(2)));

        let mut builder = two_state_builder();
        builder.start(vec![5]);
        assert_eq!(builder.build(), Err(ModelError::StateOutOfRange(5)));

        let mut builder = two_state_builder();
        builder.state(State::new(0));
        assert_eq!(builder.build(), Err(ModelError::DuplicateState(0)));

        let mut builder = two_state_builder();
        let mut s1 = State::new(1);
        s1.add_transition(Transition::new(Some(Expr::Bool(true)), vec![1], Some(vec![2])));
        builder.state(s1);
        assert_eq!(builder.build(), Err(ModelError::AccSetOutOfRange(2)));
    }

    #[test]
    fn test_alias_order() {
        let mut builder = two_state_builder();
        builder.alias("a", Expr::Ap(0)).alias("b", Expr::not(Expr::alias("a")));
        assert!(builder.build().is_ok());

        let mut builder = two_state_builder();
        builder.alias("loop", Expr::and(Expr::Ap(0), Expr::alias("loop")));
        assert_eq!(
            builder.build(),
            Err(ModelError::AliasBeforeDefinition(String::from("loop")))
        );

        let mut builder = two_state_builder();
        builder
            .alias("a", Expr::alias("b"))
            .alias("b", Expr::alias("a"));
        assert_eq!(
            builder.build(),
            Err(ModelError::AliasBeforeDefinition(String::from("b")))
        );
    }

    #[test]
    fn test_alias_lookup_first_match() {
        let mut aliases = Aliases::new();
        aliases.push("a", Expr::Ap(0));
        aliases.push("b", Expr::Ap(1));
        aliases.push("a", Expr::Ap(2));
        assert_eq!(aliases.lookup("a"), Some(&Expr::Ap(0)));
        assert_eq!(aliases.lookup("b"), Some(&Expr::Ap(1)));
        assert_eq!(aliases.lookup("c"), None);
        assert_eq!(aliases.len(), 3);
    }

    #[test]
    fn test_display() {
        let automaton = two_state_builder().build().unwrap();
        let expected = "HOA: v1
States: 2
Start: 0
AP: 2 \"a\" \"b\"
controllable-AP: 1
acc-name: parity max even
Acceptance: 2 Inf(0)
--BODY--
State: 0 \"init\"
[0] 1 {1}
[!0] 0 {0}
State: 1
--END--
";
        assert_eq!(automaton.to_string(), expected);
    }
}

use std::fmt;
use std::time::{Duration, Instant};

use fixedbitset::FixedBitSet;
use log::{debug, trace};

use hoa::{ApIndex, Automaton, State};

use crate::error::Error;
use crate::label::{evaluate, PartialValuation, Ternary};
use crate::options::{ConstructionOptions, MAX_UNCONTROLLABLE};
use crate::parity::game::{LabelledParityGame, Node, Successors};
use crate::parity::priority::ParityCondition;
use crate::parity::{Color, Player};

/// Statistics about a constructed game.
#[derive(Debug, Default, Clone)]
pub struct ConstructionStats {
    states: usize,
    valuations: usize,
    nodes: usize,
    edges: usize,
    time: Duration,
}

impl ConstructionStats {
    /// The number of automaton states.
    pub fn states(&self) -> usize {
        self.states
    }

    /// The number of valuations of uncontrollable propositions per state.
    pub fn valuations(&self) -> usize {
        self.valuations
    }

    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn edges(&self) -> usize {
        self.edges
    }

    pub fn time(&self) -> Duration {
        self.time
    }
}

impl fmt::Display for ConstructionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|Q| = {}, |U| = {}, |V| = {}, |E| = {}, construction time: {:.2}",
            self.states(),
            self.valuations(),
            self.nodes(),
            self.edges(),
            self.time().as_secs_f32(),
        )
    }
}

/// Constructs the parity game for a validated automaton.
///
/// For each state there is a decision node with the index of the state,
/// where player odd chooses a valuation of the uncontrollable propositions.
/// For each valuation there is a node where player even chooses one of
/// the transitions compatible with the valuation, leading to a node with
/// the priority of that transition and an edge to the decision node of
/// the successor.
pub(crate) struct GameConstructor<'a> {
    automaton: &'a Automaton,
    condition: ParityCondition,
    uncontrollable: Vec<ApIndex>,
    game: LabelledParityGame<String>,
    stats: ConstructionStats,
}

impl<'a> GameConstructor<'a> {
    const SYS_OWNER: Player = Player::Even;
    const ENV_OWNER: Player = Player::Odd;
    const TRANSITION_OWNER: Player = Self::SYS_OWNER;
    const AUX_COLOR: Color = 0;

    /// Creates a constructor for the automaton with the given parity condition.
    ///
    /// # Errors
    ///
    /// Returns an error if the automaton has more uncontrollable propositions
    /// than allowed by the options.
    pub(crate) fn new(
        automaton: &'a Automaton,
        condition: ParityCondition,
        options: &ConstructionOptions,
    ) -> Result<Self, Error> {
        let num_aps = automaton.num_aps();
        let mut controllable = FixedBitSet::with_capacity(num_aps);
        controllable.extend(automaton.controllable_aps().iter().copied());
        let uncontrollable: Vec<_> = (0..num_aps).filter(|&i| !controllable[i]).collect();

        let limit = options.max_uncontrollable.min(MAX_UNCONTROLLABLE) as usize;
        if uncontrollable.len() > limit {
            return Err(Error::TooManyUncontrollable {
                count: uncontrollable.len(),
                limit,
            });
        }
        debug!(
            "Uncontrollable atomic propositions: {}",
            uncontrollable
                .iter()
                .map(|&i| automaton.aps()[i].as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let num_states = automaton.num_states();
        let num_nodes = 1usize
            .checked_shl(uncontrollable.len() as u32)
            .and_then(|valuations| valuations.checked_add(1))
            .and_then(|nodes| nodes.checked_mul(num_states));
        let mut game = LabelledParityGame::default();
        if !matches!(num_nodes.map(|n| game.try_reserve(n)), Some(Ok(()))) {
            return Err(Error::GameTooLarge {
                states: num_states,
                uncontrollable: uncontrollable.len(),
            });
        }
        // decision nodes take the indices of the states
        game.allocate(num_states);
        Ok(Self {
            automaton,
            condition,
            uncontrollable,
            game,
            stats: ConstructionStats::default(),
        })
    }

    fn num_valuations(&self) -> u64 {
        1 << self.uncontrollable.len()
    }

    /// Adds the nodes for all states of the automaton.
    pub(crate) fn construct(&mut self) {
        let start = Instant::now();
        let automaton = self.automaton;
        for state in automaton.states() {
            self.add_state(state);
        }
        debug_assert!(self.game.is_complete());
        self.stats = ConstructionStats {
            states: self.automaton.num_states(),
            valuations: self.num_valuations() as usize,
            nodes: self.game.num_nodes(),
            edges: self.game.num_edges(),
            time: start.elapsed(),
        };
    }

    fn add_state(&mut self, state: &State) {
        debug!("Adding nodes for state {}", state.id());
        let num_valuations = self.num_valuations();
        let valuation_nodes = self.game.allocate(num_valuations as usize);
        for (value, valuation_node) in (0..num_valuations).zip(valuation_nodes.clone()) {
            let valuation = PartialValuation::new(&self.uncontrollable, value);
            let mut node = Node::new(Self::SYS_OWNER, Self::AUX_COLOR);
            node.extend(Self::add_compatible_transitions(
                &mut self.game,
                self.automaton,
                &self.condition,
                state,
                &valuation,
            ));
            assert!(
                !node.successors().is_empty(),
                "no transition of state {} compatible with valuation {}",
                state.id(),
                value
            );
            self.game.add_node(valuation_node, node);
        }

        let mut node = Node::new(Self::ENV_OWNER, Self::AUX_COLOR);
        node.extend(valuation_nodes);
        if let Some(name) = state.name() {
            node = node.with_label(String::from(name));
        }
        self.game.add_node(state.id(), node);
    }

    /// Adds a node for each transition that may be taken under the valuation,
    /// and returns the indices of the new nodes.
    fn add_compatible_transitions(
        game: &mut LabelledParityGame<String>,
        automaton: &Automaton,
        condition: &ParityCondition,
        state: &State,
        valuation: &PartialValuation<'_>,
    ) -> Successors {
        let mut compatible = Successors::default();
        for (i, transition) in state.transitions().iter().enumerate() {
            let label = match state.label().or_else(|| transition.label()) {
                Some(label) => label,
                None => panic!("transition {} of state {} has no label", i, state.id()),
            };
            let value = evaluate(label, automaton.aliases(), valuation);
            trace!(
                "Label {} of transition {} of state {} evaluates to {}",
                label,
                i,
                state.id(),
                value
            );
            if value == Ternary::False {
                continue;
            }
            let successor = match transition.successors() {
                [successor] => *successor,
                successors => panic!(
                    "transition {} of state {} has {} successors instead of one",
                    i,
                    state.id(),
                    successors.len()
                ),
            };
            let priority = match state.acc_sig().or_else(|| transition.acc_sig()) {
                Some([priority]) => *priority,
                sig => panic!(
                    "transition {} of state {} has {} acceptance sets instead of one",
                    i,
                    state.id(),
                    sig.map_or(0, <[_]>::len)
                ),
            };

            let index = game.allocate(1).start;
            let mut node = Node::new(Self::TRANSITION_OWNER, condition.normalize(priority));
            node.add_successor(successor);
            game.add_node(index, node);
            compatible.push(index);
        }
        compatible
    }

    pub(crate) fn stats(&self) -> &ConstructionStats {
        &self.stats
    }

    pub(crate) fn into_game(self) -> LabelledParityGame<String> {
        self.game
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hoa::{Expr, Transition};

    use crate::parity::priority::PriorityOrder;
    use crate::parity::Parity;

    const MAX_EVEN: ParityCondition = ParityCondition::new(PriorityOrder::Max, Parity::Even, 2);

    fn construct(
        automaton: &Automaton,
        condition: ParityCondition,
    ) -> LabelledParityGame<String> {
        let mut constructor =
            GameConstructor::new(automaton, condition, &ConstructionOptions::default()).unwrap();
        constructor.construct();
        constructor.into_game()
    }

    /// A chain of states over the propositions `ap0..apN`, where the last
    /// proposition is controllable. In each state, the transition to the next
    /// state is taken if `ap0` holds, and otherwise the state loops.
    fn chain(num_states: usize, num_aps: usize) -> Automaton {
        let mut builder = Automaton::builder();
        builder
            .num_states(num_states)
            .start(vec![0])
            .aps(num_aps, (0..num_aps).map(|i| format!("ap{}", i)))
            .controllable_aps(vec![num_aps - 1])
            .acceptance(2, Expr::inf(Expr::Set(0)));
        for s in 0..num_states {
            let mut state = State::new(s);
            state.add_transition(Transition::new(
                Some(Expr::Ap(0)),
                vec![(s + 1) % num_states],
                Some(vec![1]),
            ));
            state.add_transition(Transition::new(
                Some(Expr::not(Expr::Ap(0))),
                vec![s],
                Some(vec![0]),
            ));
            builder.state(state);
        }
        builder.build().unwrap()
    }

    fn single_state(label: Expr, num_aps: usize, controllable: Vec<ApIndex>) -> Automaton {
        let mut builder = Automaton::builder();
        builder
            .num_states(1)
            .start(vec![0])
            .aps(num_aps, (0..num_aps).map(|i| format!("ap{}", i)))
            .controllable_aps(controllable)
            .acceptance(1, Expr::inf(Expr::Set(0)));
        let mut state = State::new(0);
        state.add_transition(Transition::new(Some(label), vec![0], Some(vec![0])));
        builder.state(state);
        builder.build().unwrap()
    }

    #[test]
    fn test_single_state() {
        let automaton = single_state(Expr::Bool(true), 1, vec![]);
        let condition = ParityCondition::new(PriorityOrder::Max, Parity::Even, 1);
        let game = construct(&automaton, condition);

        assert_eq!(game.num_nodes(), 5);
        assert_eq!(game.max_index(), Some(4));
        let decision = &game[0];
        assert_eq!(decision.owner(), Player::Odd);
        assert_eq!(decision.color(), 0);
        assert_eq!(decision.successors(), &[1, 2]);
        for &valuation in decision.successors() {
            let node = &game[valuation];
            assert_eq!(node.owner(), Player::Even);
            assert_eq!(node.color(), 0);
            assert_eq!(node.successors().len(), 1);
            let transition = &game[node.successors()[0]];
            assert_eq!(transition.owner(), Player::Even);
            assert_eq!(transition.color(), condition.normalize(0));
            assert_eq!(transition.color(), 2);
            assert_eq!(transition.successors(), &[0]);
        }
        let order: Vec<_> = game.nodes().map(|(i, _)| i).collect();
        assert_eq!(order, vec![3, 1, 4, 2, 0]);
    }

    #[test]
    fn test_compatible_transitions() {
        let automaton = chain(2, 2);
        let game = construct(&automaton, MAX_EVEN);
        // ap0 is uncontrollable, so each valuation has one compatible transition
        assert_eq!(game.num_nodes(), 2 + 2 * (2 + 2));
        let valuations = game[0].successors();
        assert_eq!(valuations, &[2, 3]);
        // ap0 false
        let transition = &game[game[2].successors()[0]];
        assert_eq!(transition.successors(), &[0]);
        assert_eq!(transition.color(), 2);
        // ap0 true
        let transition = &game[game[3].successors()[0]];
        assert_eq!(transition.successors(), &[1]);
        assert_eq!(transition.color(), 3);
    }

    #[test]
    fn test_unknown_labels_are_compatible() {
        // ap0 is controllable, so both transitions are compatible with every valuation
        let mut builder = Automaton::builder();
        builder
            .num_states(1)
            .start(vec![0])
            .aps(2, vec!["c", "u"])
            .controllable_aps(vec![0])
            .acceptance(2, Expr::inf(Expr::Set(0)));
        let mut state = State::new(0).with_name("only");
        state.add_transition(Transition::new(
            Some(Expr::and(Expr::Ap(0), Expr::Ap(1))),
            vec![0],
            Some(vec![1]),
        ));
        state.add_transition(Transition::new(
            Some(Expr::not(Expr::Ap(0))),
            vec![0],
            Some(vec![0]),
        ));
        builder.state(state);
        let automaton = builder.build().unwrap();

        let game = construct(&automaton, MAX_EVEN);
        // u false: only the second transition; u true: both
        assert_eq!(game[1].successors(), &[3]);
        assert_eq!(game[2].successors(), &[4, 5]);
        assert_eq!(game[0].label().map(String::as_str), Some("only"));
    }

    #[test]
    fn test_state_label_and_acceptance_override() {
        let mut builder = Automaton::builder();
        builder
            .num_states(1)
            .start(vec![0])
            .aps(1, vec!["u"])
            .acceptance(2, Expr::inf(Expr::Set(0)));
        let mut state = State::new(0)
            .with_label(Expr::Bool(true))
            .with_acc_sig(vec![1]);
        state.add_transition(Transition::new(
            Some(Expr::Bool(false)),
            vec![0],
            Some(vec![0]),
        ));
        builder.state(state);
        let automaton = builder.build().unwrap();

        let game = construct(&automaton, MAX_EVEN);
        assert_eq!(game.num_nodes(), 5);
        for &valuation in game[0].successors() {
            assert_eq!(game[game[valuation].successors()[0]].color(), 3);
        }
    }

    #[test]
    fn test_scaling() {
        let count =
            |num_states, num_aps| construct(&chain(num_states, num_aps), MAX_EVEN).num_nodes();
        // linear in the number of states
        for n in 1..5 {
            assert_eq!(count(n, 2), n * count(1, 2));
        }
        // non-decision nodes double per additional uncontrollable proposition
        for aps in 2..6 {
            assert_eq!(count(3, aps + 1) - 3, 2 * (count(3, aps) - 3));
        }
    }

    #[test]
    fn test_deterministic_allocation() {
        let automaton = chain(3, 3);
        let first = construct(&automaton, MAX_EVEN);
        let second = construct(&automaton, MAX_EVEN);
        assert_eq!(first.to_string(), second.to_string());

        let mut seen = vec![false; first.num_nodes()];
        for (i, node) in first.nodes() {
            assert!(!seen[i], "node {} defined twice", i);
            seen[i] = true;
            for &j in node.successors() {
                assert!(j <= first.max_index().unwrap());
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn test_uncontrollable_limit() {
        let automaton = chain(1, 5);
        let options = ConstructionOptions {
            max_uncontrollable: 3,
        };
        match GameConstructor::new(&automaton, MAX_EVEN, &options) {
            Err(Error::TooManyUncontrollable { count, limit }) => {
                assert_eq!(count, 4);
                assert_eq!(limit, 3);
            }
            _ => panic!("expected error for too many uncontrollable propositions"),
        }
        let options = ConstructionOptions {
            max_uncontrollable: 4,
        };
        assert!(GameConstructor::new(&automaton, MAX_EVEN, &options).is_ok());
    }

    #[test]
    fn test_game_too_large() {
        let automaton = chain(2, 64);
        let options = ConstructionOptions {
            max_uncontrollable: MAX_UNCONTROLLABLE,
        };
        match GameConstructor::new(&automaton, MAX_EVEN, &options) {
            Err(Error::GameTooLarge {
                states,
                uncontrollable,
            }) => {
                assert_eq!(states, 2);
                assert_eq!(uncontrollable, 63);
            }
            _ => panic!("expected error for a game that does not fit into memory"),
        }
    }

    #[test]
    #[should_panic(expected = "no transition of state 0 compatible with valuation 0")]
    fn test_incomplete_state() {
        let automaton = single_state(Expr::Ap(0), 1, vec![]);
        construct(&automaton, MAX_EVEN);
    }

    #[test]
    #[should_panic(expected = "has 0 acceptance sets instead of one")]
    fn test_uncolored_transition() {
        let mut builder = Automaton::builder();
        builder
            .num_states(1)
            .start(vec![0])
            .aps(0, Vec::<String>::new())
            .acceptance(2, Expr::inf(Expr::Set(0)));
        let mut state = State::new(0);
        state.add_transition(Transition::new(Some(Expr::Bool(true)), vec![0], None));
        builder.state(state);
        construct(&builder.build().unwrap(), MAX_EVEN);
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use log::{debug, trace};

use crate::nfa::{Nfa, StateId, TransitionKind};

/// Label of a DFA state, `q0` is the start state and the rest are numbered in
/// discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DfaState(usize);

impl DfaState {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for DfaState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Deterministic automaton produced by subset construction. Every state stands
/// for an epsilon-closed set of NFA states.
#[derive(Debug, Clone)]
pub struct Dfa {
    // insertion order is label order
    states: IndexMap<BTreeSet<StateId>, DfaState>,
    transitions: BTreeMap<(DfaState, char), DfaState>,
    accepting: BTreeSet<DfaState>,
}

impl Dfa {
    /// Subset construction over `nfa`.
    ///
    /// The number of DFA states is bounded by the number of distinct closure
    /// sets, which can grow exponentially with the length of the expression.
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let mut dfa = Dfa {
            states: IndexMap::new(),
            transitions: BTreeMap::new(),
            accepting: BTreeSet::new(),
        };
        dfa.discover(nfa, nfa.epsilon_closure([nfa.start()]));

        // the map doubles as the FIFO work queue
        let mut next = 0;
        while let Some((set, &label)) = dfa.states.get_index(next) {
            let set = set.clone();
            for symbol in Self::symbols_out_of(nfa, &set) {
                let successors = nfa.epsilon_closure(nfa.step(&set, symbol));
                let target = dfa.discover(nfa, successors);
                dfa.transitions.insert((label, symbol), target);
            }
            next += 1;
        }

        debug!(
            "determinized NFA of {} states into {} DFA states",
            nfa.state_count(),
            dfa.state_count()
        );
        dfa
    }

    /// Returns the label of `set`, labelling it first if it is new.
    fn discover(&mut self, nfa: &Nfa, set: BTreeSet<StateId>) -> DfaState {
        if let Some(&label) = self.states.get(&set) {
            return label;
        }
        let label = DfaState(self.states.len());
        if set.contains(&nfa.accept()) {
            self.accepting.insert(label);
        }
        trace!("discovered {label} = {set:?}");
        self.states.insert(set, label);
        label
    }

    /// Non-epsilon symbols leaving any state of `set`, in ascending order.
    fn symbols_out_of(nfa: &Nfa, set: &BTreeSet<StateId>) -> BTreeSet<char> {
        set.iter()
            .flat_map(|&state| nfa.transitions(state))
            .filter_map(|t| match t.kind {
                TransitionKind::Symbol(c) => Some(c),
                TransitionKind::Epsilon => None,
            })
            .collect()
    }

    pub fn start(&self) -> DfaState {
        DfaState(0)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Labels in creation order together with the NFA states they stand for.
    pub fn states(&self) -> impl Iterator<Item = (DfaState, &BTreeSet<StateId>)> + '_ {
        self.states.iter().map(|(set, &label)| (label, set))
    }

    pub fn nfa_states(&self, state: DfaState) -> Option<&BTreeSet<StateId>> {
        self.states.get_index(state.0).map(|(set, _)| set)
    }

    /// `None` means the input is rejected from here.
    pub fn transition(&self, state: DfaState, symbol: char) -> Option<DfaState> {
        self.transitions.get(&(state, symbol)).copied()
    }

    /// `(source, symbol, destination)` ordered by source then symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (DfaState, char, DfaState)> + '_ {
        self.transitions
            .iter()
            .map(|(&(source, symbol), &destination)| (source, symbol, destination))
    }

    pub fn is_accepting(&self, state: DfaState) -> bool {
        self.accepting.contains(&state)
    }

    pub fn accepting(&self) -> &BTreeSet<DfaState> {
        &self.accepting
    }

    pub fn accepts(&self, s: &str) -> bool {
        let mut current = self.start();
        for c in s.chars() {
            match self.transition(current, c) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.is_accepting(current)
    }
}

/// One block per state: the label (starred when accepting) with its NFA
/// states, then its outgoing transitions.
impl Display for Dfa {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut lines = Vec::with_capacity(self.states.len() + self.transitions.len());
        for (label, set) in self.states() {
            let members = set
                .iter()
                .map(|state| state.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let marker = if self.is_accepting(label) { "*" } else { "" };
            lines.push(format!("{label}{marker} {{{members}}}"));

            let outgoing = self
                .transitions
                .range((label, char::MIN)..=(label, char::MAX));
            for (&(_, symbol), destination) in outgoing {
                lines.push(format!("  {symbol} -> {destination}"));
            }
        }
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postfix::rewrite;
    use lazy_static::lazy_static;
    use rstest::*;

    const SNAPSHOT_PATH: &str = "../tests/dfa/";

    lazy_static! {
        static ref INSTA_SETTINGS: insta::Settings = {
            let mut set = insta::Settings::clone_current();
            set.set_snapshot_path(SNAPSHOT_PATH);
            set.set_prepend_module_to_snapshot(false);
            set
        };
    }

    fn nfa(infix: &str) -> Nfa {
        Nfa::from_postfix(&rewrite(infix).unwrap()).unwrap()
    }

    fn dfa(infix: &str) -> Dfa {
        Dfa::from_nfa(&nfa(infix))
    }

    mod subset_construction {
        use super::*;

        #[test]
        fn start_state_is_closure_of_nfa_start() {
            // given
            let nfa = nfa("a*b");

            // when
            let dfa = Dfa::from_nfa(&nfa);

            // then
            assert_eq!(dfa.start(), DfaState(0));
            assert_eq!(
                dfa.nfa_states(dfa.start()),
                Some(&nfa.epsilon_closure([nfa.start()]))
            );
        }

        #[test]
        fn labels_follow_discovery_order() {
            // given
            let dfa = dfa("a|b");

            // when
            let labels = dfa
                .states()
                .map(|(label, _)| label.to_string())
                .collect::<Vec<_>>();

            // then
            assert_eq!(labels, vec!["q0", "q1", "q2"]);
            assert_eq!(dfa.transition(DfaState(0), 'a'), Some(DfaState(1)));
            assert_eq!(dfa.transition(DfaState(0), 'b'), Some(DfaState(2)));
        }

        #[test]
        fn equal_closure_sets_share_one_label() {
            // given: after the first `a` every further `a` lands in the same set
            let dfa = dfa("a+");

            // then
            assert_eq!(dfa.state_count(), 2);
            assert_eq!(dfa.transition(DfaState(0), 'a'), Some(DfaState(1)));
            assert_eq!(dfa.transition(DfaState(1), 'a'), Some(DfaState(1)));
        }

        #[test]
        fn missing_symbol_has_no_transition() {
            // given
            let dfa = dfa("ab");

            // then
            assert_eq!(dfa.transition(dfa.start(), 'b'), None);
            assert_eq!(dfa.transition(dfa.start(), 'z'), None);
        }

        #[rstest]
        #[case("a", &[1])]
        #[case("a*", &[0, 1])]
        #[case("a?b", &[2])]
        #[case("a|b", &[1, 2])]
        fn accepting_states_contain_the_nfa_accept(
            #[case] infix: &str,
            #[case] expected: &[usize],
        ) {
            // given
            let nfa = nfa(infix);

            // when
            let dfa = Dfa::from_nfa(&nfa);

            // then
            let accepting = dfa.accepting().iter().map(|s| s.index()).collect::<Vec<_>>();
            assert_eq!(accepting, expected);
            for &label in dfa.accepting() {
                assert!(dfa.nfa_states(label).unwrap().contains(&nfa.accept()));
            }
        }

        #[test]
        fn transitions_are_listed_by_source_then_symbol() {
            // given
            let dfa = dfa("(a|b)*c");

            // when
            let transitions = dfa
                .transitions()
                .map(|(s, c, d)| format!("{s}-{c}-{d}"))
                .collect::<Vec<_>>();

            // then
            assert_eq!(
                transitions,
                vec![
                    "q0-a-q1", "q0-b-q2", "q0-c-q3", "q1-a-q1", "q1-b-q2", "q1-c-q3", "q2-a-q1",
                    "q2-b-q2", "q2-c-q3",
                ]
            );
        }
    }

    mod table_walk {
        use super::*;

        #[rstest]
        #[case("a|b", "a", true)]
        #[case("a|b", "c", false)]
        #[case("ab*", "a", true)]
        #[case("ab*", "abbb", true)]
        #[case("ab*", "b", false)]
        #[case("a+", "", false)]
        #[case("a+", "aaa", true)]
        #[case("a?b", "b", true)]
        #[case("a?b", "ab", true)]
        #[case("a?b", "aab", false)]
        #[case("(a|b)*abb", "babb", true)]
        #[case("(a|b)*abb", "abab", false)]
        fn dfa_agrees_with_expected(#[case] infix: &str, #[case] input: &str, #[case] expected: bool) {
            assert_eq!(dfa(infix).accepts(input), expected);
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn alternation_table() {
            // when
            let table = dfa("a|b").to_string();

            // then
            INSTA_SETTINGS.bind(|| insta::assert_snapshot!("alternation_table", table));
        }

        #[test]
        fn star_table() {
            // when
            let table = dfa("ab*").to_string();

            // then
            INSTA_SETTINGS.bind(|| insta::assert_snapshot!("star_table", table));
        }
    }
}

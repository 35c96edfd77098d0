use std::collections::{BTreeSet, VecDeque};

use log::{debug, trace};

use crate::error::RegexError;
use crate::postfix::Postfix;
use crate::token::Token;

/// Index of a state inside the [`Nfa`] that owns it.
pub type StateId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Symbol(char),
    Epsilon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub target: StateId,
}

impl Transition {
    fn matches(&self, c: char) -> bool {
        match self.kind {
            TransitionKind::Symbol(symbol) => symbol == c,
            TransitionKind::Epsilon => false,
        }
    }

    fn is_epsilon(&self) -> bool {
        self.kind == TransitionKind::Epsilon
    }
}

#[derive(Debug, Clone, Default)]
struct State {
    transitions: Vec<Transition>,
}

/// A sub-automaton with one entry and one accept state. The accept state has
/// no outgoing transitions until an operator consumes the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fragment {
    start: StateId,
    accept: StateId,
}

/// Thompson NFA. States live in one arena and refer to each other by index,
/// so the cycles introduced by `*` and `+` need no shared ownership.
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
    accept: StateId,
}

impl Nfa {
    /// Runs Thompson's construction over `postfix`.
    pub fn from_postfix(postfix: &Postfix) -> Result<Self, RegexError> {
        let mut builder = NfaBuilder::default();
        for (pos, &token) in postfix.tokens().iter().enumerate() {
            builder.apply(token, pos)?;
        }
        let nfa = builder.finish()?;
        debug!(
            "built NFA with {} states for postfix '{postfix}'",
            nfa.state_count()
        );
        Ok(nfa)
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn accept(&self) -> StateId {
        self.accept
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Outgoing transitions of `state` in insertion order.
    pub fn transitions(&self, state: StateId) -> &[Transition] {
        match self.states.get(state) {
            Some(state) => &state.transitions,
            None => &[],
        }
    }

    /// Every literal symbol that labels some transition.
    pub fn alphabet(&self) -> BTreeSet<char> {
        self.states
            .iter()
            .flat_map(|state| &state.transitions)
            .filter_map(|t| match t.kind {
                TransitionKind::Symbol(c) => Some(c),
                TransitionKind::Epsilon => None,
            })
            .collect()
    }

    /// States reachable from `seeds` through zero or more epsilon transitions.
    /// The result always contains the seeds; epsilon cycles are visited once.
    pub fn epsilon_closure<I>(&self, seeds: I) -> BTreeSet<StateId>
    where
        I: IntoIterator<Item = StateId>,
    {
        let mut reachable = BTreeSet::new();
        let mut queue: VecDeque<StateId> = VecDeque::new();

        for state in seeds {
            if reachable.insert(state) {
                queue.push_back(state);
            }
        }

        while let Some(cur) = queue.pop_front() {
            for t in self.transitions(cur) {
                if t.is_epsilon() && reachable.insert(t.target) {
                    queue.push_back(t.target);
                }
            }
        }

        reachable
    }

    /// Direct successors of `states` on `symbol`, without closing over epsilons.
    pub fn step(&self, states: &BTreeSet<StateId>, symbol: char) -> BTreeSet<StateId> {
        states
            .iter()
            .flat_map(|&state| self.transitions(state))
            .filter(|t| t.matches(symbol))
            .map(|t| t.target)
            .collect()
    }

    pub fn accepts(&self, s: &str) -> bool {
        let mut current_states = self.epsilon_closure([self.start]);
        for c in s.chars() {
            current_states = self.epsilon_closure(self.step(&current_states, c));
            if current_states.is_empty() {
                return false;
            }
        }

        current_states.contains(&self.accept)
    }
}

#[derive(Default)]
struct NfaBuilder {
    states: Vec<State>,
    stack: Vec<Fragment>,
}

impl NfaBuilder {
    fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    fn add_transition(&mut self, start: StateId, end: StateId, kind: TransitionKind) {
        self.states[start].transitions.push(Transition { kind, target: end });
    }

    fn add_epsilon(&mut self, start: StateId, end: StateId) {
        self.add_transition(start, end, TransitionKind::Epsilon);
    }

    fn underflow(operator: Token, position: usize, available: usize) -> RegexError {
        RegexError::StackUnderflow {
            operator: char::from(operator),
            position,
            required: operator.arity(),
            available,
        }
    }

    fn pop_one(&mut self, operator: Token, position: usize) -> Result<Fragment, RegexError> {
        self.stack
            .pop()
            .ok_or_else(|| Self::underflow(operator, position, 0))
    }

    /// Returns `(first, second)` in push order.
    fn pop_two(
        &mut self,
        operator: Token,
        position: usize,
    ) -> Result<(Fragment, Fragment), RegexError> {
        match (self.stack.pop(), self.stack.pop()) {
            (Some(second), Some(first)) => Ok((first, second)),
            (popped, _) => Err(Self::underflow(
                operator,
                position,
                usize::from(popped.is_some()),
            )),
        }
    }

    fn apply(&mut self, token: Token, pos: usize) -> Result<(), RegexError> {
        let fragment = match token {
            Token::Literal(c) => self.literal(c),
            Token::Concat => {
                let (first, second) = self.pop_two(token, pos)?;
                self.concatenate(first, second)
            }
            Token::Alter => {
                let (first, second) = self.pop_two(token, pos)?;
                self.alternate(first, second)
            }
            Token::Star => {
                let inner = self.pop_one(token, pos)?;
                self.kleene_star(inner)
            }
            Token::Plus => {
                let inner = self.pop_one(token, pos)?;
                self.one_or_more(inner)
            }
            Token::QuestionMark => {
                let inner = self.pop_one(token, pos)?;
                self.zero_or_one(inner)
            }
            Token::LParen | Token::RParen => {
                return Err(RegexError::MalformedPostfix {
                    fragments: self.stack.len(),
                });
            }
        };
        trace!(
            "'{token}' at {pos} -> fragment {} => {}",
            fragment.start, fragment.accept
        );
        self.stack.push(fragment);
        Ok(())
    }

    fn finish(mut self) -> Result<Nfa, RegexError> {
        match (self.stack.pop(), self.stack.len()) {
            (Some(Fragment { start, accept }), 0) => Ok(Nfa {
                states: self.states,
                start,
                accept,
            }),
            (last, rest) => Err(RegexError::MalformedPostfix {
                fragments: rest + usize::from(last.is_some()),
            }),
        }
    }

    fn literal(&mut self, c: char) -> Fragment {
        let start = self.add_state();
        let accept = self.add_state();
        self.add_transition(start, accept, TransitionKind::Symbol(c));
        Fragment { start, accept }
    }

    fn concatenate(&mut self, first: Fragment, second: Fragment) -> Fragment {
        self.add_epsilon(first.accept, second.start);
        Fragment {
            start: first.start,
            accept: second.accept,
        }
    }

    fn alternate(&mut self, first: Fragment, second: Fragment) -> Fragment {
        let start = self.add_state();
        let accept = self.add_state();

        self.add_epsilon(start, first.start);
        self.add_epsilon(start, second.start);

        self.add_epsilon(first.accept, accept);
        self.add_epsilon(second.accept, accept);

        Fragment { start, accept }
    }

    fn kleene_star(&mut self, inner: Fragment) -> Fragment {
        let start = self.add_state();
        let accept = self.add_state();

        // enter, or skip for zero repetitions
        self.add_epsilon(start, inner.start);
        self.add_epsilon(start, accept);

        // repeat, or leave
        self.add_epsilon(inner.accept, inner.start);
        self.add_epsilon(inner.accept, accept);

        Fragment { start, accept }
    }

    fn one_or_more(&mut self, inner: Fragment) -> Fragment {
        let start = self.add_state();
        let accept = self.add_state();

        // no bypass: the first repetition is mandatory
        self.add_epsilon(start, inner.start);

        self.add_epsilon(inner.accept, inner.start);
        self.add_epsilon(inner.accept, accept);

        Fragment { start, accept }
    }

    fn zero_or_one(&mut self, inner: Fragment) -> Fragment {
        let start = self.add_state();
        let accept = self.add_state();

        self.add_epsilon(start, inner.start);
        self.add_epsilon(start, accept);

        self.add_epsilon(inner.accept, accept);

        Fragment { start, accept }
    }
}

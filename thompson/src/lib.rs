pub use dfa::{Dfa, DfaState};
pub use error::{RegexError, SyntaxError};
pub use nfa::{Nfa, StateId, Transition, TransitionKind};
pub use postfix::{Postfix, rewrite};
pub use token::Token;

mod dfa;
mod error;
mod nfa;
mod postfix;
mod token;

/// Compiles an infix expression into a Thompson NFA.
pub fn compile_regex(expression: &str) -> Result<Nfa, RegexError> {
    Nfa::from_postfix(&rewrite(expression)?)
}

/// Whether `nfa` accepts the whole of `candidate`.
pub fn matches(nfa: &Nfa, candidate: &str) -> bool {
    nfa.accepts(candidate)
}

pub fn to_deterministic(nfa: &Nfa) -> Dfa {
    Dfa::from_nfa(nfa)
}

/// A compiled expression that keeps its postfix form around.
#[derive(Debug, Clone)]
pub struct Regex {
    postfix: Postfix,
    nfa: Nfa,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Self, RegexError> {
        let postfix = rewrite(pattern)?;
        let nfa = Nfa::from_postfix(&postfix)?;

        Ok(Self { postfix, nfa })
    }

    pub fn postfix(&self) -> &Postfix {
        &self.postfix
    }

    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    pub fn is_exact_match(&self, s: &str) -> bool {
        self.nfa.accepts(s)
    }

    pub fn to_dfa(&self) -> Dfa {
        Dfa::from_nfa(&self.nfa)
    }
}

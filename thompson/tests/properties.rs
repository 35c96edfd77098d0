use rstest::*;
use thompson::{Nfa, compile_regex, matches, to_deterministic};

/// Every string over `alphabet` of length at most `max_len`, the empty one included.
fn candidates(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut res = vec![String::new()];
    let mut layer = vec![String::new()];
    for _ in 0..max_len {
        layer = layer
            .iter()
            .flat_map(|prefix| {
                alphabet.iter().map(move |c| {
                    let mut s = prefix.clone();
                    s.push(*c);
                    s
                })
            })
            .collect();
        res.extend(layer.iter().cloned());
    }
    res
}

fn compile(pattern: &str) -> Nfa {
    compile_regex(pattern).unwrap()
}

fn assert_same_language(left: &str, right: &str, alphabet: &[char]) {
    let (left_nfa, right_nfa) = (compile(left), compile(right));
    for candidate in candidates(alphabet, 6) {
        assert_eq!(
            matches(&left_nfa, &candidate),
            matches(&right_nfa, &candidate),
            "'{left}' and '{right}' disagree on '{candidate}'"
        );
    }
}

mod empty_string {
    use super::*;

    #[rstest]
    #[case("a*", true)]
    #[case("a", false)]
    #[case("a?", true)]
    #[case("a+", false)]
    #[case("a|b*", true)]
    #[case("ab*", false)]
    #[case("a*b*", true)]
    #[case("(a?b?)+", true)]
    #[case("(ab)?c*", true)]
    #[case("(a|b)+", false)]
    fn empty_input_is_accepted_iff_the_expression_derives_it(
        #[case] pattern: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(matches(&compile(pattern), ""), expected);
    }
}

mod algebraic_laws {
    use super::*;

    #[test]
    fn concatenation_is_associative() {
        assert_same_language("(ab)c", "a(bc)", &['a', 'b', 'c']);
    }

    #[rstest]
    #[case("a|b", "b|a")]
    #[case("ab|c", "c|ab")]
    #[case("a*|b+", "b+|a*")]
    fn alternation_is_commutative(#[case] left: &str, #[case] right: &str) {
        assert_same_language(left, right, &['a', 'b', 'c']);
    }

    #[rstest]
    #[case("a")]
    #[case("ab")]
    #[case("a|b")]
    #[case("a?b")]
    #[case("(a+b)")]
    fn star_is_idempotent(#[case] r: &str) {
        assert_same_language(&format!("({r})**"), &format!("({r})*"), &['a', 'b']);
    }

    #[test]
    fn explicit_and_implicit_concatenation_agree() {
        assert_same_language("a.b.c", "abc", &['a', 'b', 'c']);
    }
}

mod determinization {
    use super::*;

    #[rstest]
    #[case("a|b")]
    #[case("ab*")]
    #[case("a+")]
    #[case("a?b")]
    #[case("(a|b)*abb")]
    #[case("(ab|a)*b?")]
    #[case("a*b*a*")]
    #[case("((a|b)(a|b))+")]
    #[case("x1(y2|z3)*")]
    fn dfa_and_nfa_accept_the_same_strings(#[case] pattern: &str) {
        // given
        let nfa = compile(pattern);
        let dfa = to_deterministic(&nfa);
        // one symbol foreign to every pattern above
        let mut alphabet = nfa.alphabet().into_iter().collect::<Vec<_>>();
        alphabet.push('q');

        // when && then
        for candidate in candidates(&alphabet, 5) {
            assert_eq!(
                dfa.accepts(&candidate),
                matches(&nfa, &candidate),
                "'{pattern}' on '{candidate}'"
            );
        }
    }

    #[rstest]
    #[case("(a|b)*abb")]
    #[case("(ab|a)*b?")]
    #[case("a*|a+|a?")]
    fn every_state_and_symbol_has_at_most_one_destination(#[case] pattern: &str) {
        // given
        let dfa = to_deterministic(&compile(pattern));

        // when
        let mut keys = dfa
            .transitions()
            .map(|(source, symbol, _)| (source, symbol))
            .collect::<Vec<_>>();
        let total = keys.len();
        keys.dedup();

        // then
        assert_eq!(keys.len(), total);
        for (source, symbol, destination) in dfa.transitions() {
            assert_eq!(dfa.transition(source, symbol), Some(destination));
            assert!(dfa.nfa_states(destination).is_some());
        }
    }

    #[test]
    fn accepting_labels_are_exactly_those_holding_the_nfa_accept() {
        // given
        let nfa = compile("(a|b)*a(a|b)");
        let dfa = to_deterministic(&nfa);

        // then
        for (label, set) in dfa.states() {
            assert_eq!(dfa.is_accepting(label), set.contains(&nfa.accept()));
        }
    }
}

mod independence {
    use super::*;
    use std::thread;

    #[test]
    fn compilations_run_side_by_side_on_separate_threads() {
        // given
        let patterns = ["a|b", "ab*", "a+", "a?b", "(a|b)*abb"];

        // when
        let handles = patterns
            .iter()
            .map(|&pattern| {
                thread::spawn(move || {
                    let nfa = compile(pattern);
                    (matches(&nfa, "ab"), to_deterministic(&nfa).accepts("ab"))
                })
            })
            .collect::<Vec<_>>();

        // then
        for handle in handles {
            let (from_nfa, from_dfa) = handle.join().unwrap();
            assert_eq!(from_nfa, from_dfa);
        }
    }
}

//! Built-in end-to-end regression scenarios (see the grounding ledger for their source), shared
//! by the `suite` CLI subcommand and the integration tests.

use crate::grammar::Grammar;

/// One named scenario: a grammar, a list of (word, expected membership) cases, and whether the
/// grammar is expected to be rejected by `Lr1::fit`.
pub struct Scenario {
    pub name: &'static str,
    pub build: fn() -> Grammar,
    pub cases: &'static [(&'static str, bool)],
    pub expect_lr1_conflict: bool,
}

fn balanced_parens() -> Grammar {
    use crate::grammar::Rule;
    let mut g = Grammar::new(['S'].into(), ['(', ')'].into(), 'S');
    g.add_rule(Rule::new('S', vec!['(', 'S', ')', 'S']));
    g.add_rule(Rule::new('S', vec![]));
    g
}

fn mixed_brackets() -> Grammar {
    use crate::grammar::Rule;
    let mut g = Grammar::new(['S'].into(), ['(', ')', '[', ']', '{', '}'].into(), 'S');
    g.add_rule(Rule::new('S', vec!['(', 'S', ')', 'S']));
    g.add_rule(Rule::new('S', vec!['[', 'S', ']', 'S']));
    g.add_rule(Rule::new('S', vec!['{', 'S', '}', 'S']));
    g.add_rule(Rule::new('S', vec![]));
    g
}

fn a_n_b_n_via_nested() -> Grammar {
    use crate::grammar::Rule;
    let mut g = Grammar::new(['S', 'F'].into(), ['a', 'b'].into(), 'S');
    g.add_rule(Rule::new('S', vec!['a', 'F', 'b', 'F']));
    g.add_rule(Rule::new('F', vec!['a', 'F', 'b']));
    g.add_rule(Rule::new('F', vec![]));
    g
}

fn crossing_interleave() -> Grammar {
    use crate::grammar::Rule;
    let mut g = Grammar::new(['A', 'S'].into(), ['a', 'b'].into(), 'A');
    g.add_rule(Rule::new('A', vec!['S']));
    g.add_rule(Rule::new('S', vec!['a', 'S', 'b', 'S']));
    g.add_rule(Rule::new('S', vec!['b', 'S', 'a', 'S']));
    g.add_rule(Rule::new('S', vec![]));
    g
}

fn shift_reduce_free() -> Grammar {
    use crate::grammar::Rule;
    let mut g = Grammar::new(['S', 'B', 'C'].into(), ['a', 'b', 'c'].into(), 'S');
    g.add_rule(Rule::new('S', vec!['B', 'b']));
    g.add_rule(Rule::new('S', vec!['C', 'c']));
    g.add_rule(Rule::new('B', vec!['a']));
    g.add_rule(Rule::new('C', vec!['a']));
    g
}

fn reduce_reduce() -> Grammar {
    use crate::grammar::Rule;
    let mut g = Grammar::new(['S', 'B', 'C'].into(), ['b', 'a'].into(), 'S');
    g.add_rule(Rule::new('S', vec!['B']));
    g.add_rule(Rule::new('S', vec!['C']));
    g.add_rule(Rule::new('B', vec!['b', 'a', 'a']));
    g.add_rule(Rule::new('C', vec!['b', 'a', 'a']));
    g
}

/// The six end-to-end scenarios, in the order they appear in the design notes.
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "balanced_parens",
            build: balanced_parens,
            cases: &[
                ("", true),
                ("()", true),
                ("(())", true),
                ("()()", true),
                ("(", false),
                ("(()", false),
                (")(", false),
            ],
            expect_lr1_conflict: false,
        },
        Scenario {
            name: "mixed_brackets",
            build: mixed_brackets,
            cases: &[("([]){}", true), ("[(])", false), ("", true)],
            expect_lr1_conflict: false,
        },
        Scenario {
            name: "a_n_b_n_via_nested",
            build: a_n_b_n_via_nested,
            cases: &[
                ("aabb", true),
                ("abab", true),
                ("aabbab", true),
                ("aabbaaabbb", true),
                ("ababab", false),
                ("aabbb", false),
            ],
            expect_lr1_conflict: false,
        },
        Scenario {
            name: "crossing_interleave",
            build: crossing_interleave,
            cases: &[
                ("aababb", true),
                ("abba", true),
                ("babababa", true),
                ("bababab", false),
            ],
            expect_lr1_conflict: true,
        },
        Scenario {
            name: "shift_reduce_free",
            build: shift_reduce_free,
            cases: &[("ab", true), ("ac", true), ("a", false)],
            expect_lr1_conflict: false,
        },
        Scenario {
            name: "reduce_reduce",
            build: reduce_reduce,
            cases: &[("baa", true)],
            expect_lr1_conflict: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earley::Earley;

    #[test]
    fn every_scenario_case_agrees_with_earley() {
        for scenario in scenarios() {
            let grammar = (scenario.build)();
            let fitted = Earley::fit(&grammar);
            for &(word, expected) in scenario.cases {
                assert_eq!(
                    fitted.predict(word),
                    expected,
                    "scenario {}: word {word:?}",
                    scenario.name
                );
            }
        }
    }

    #[test]
    fn lr1_conflict_scenarios_fail_to_fit() {
        use crate::lr1::Lr1;
        for scenario in scenarios() {
            let grammar = (scenario.build)();
            let fit_result = Lr1::fit(&grammar);
            assert_eq!(
                fit_result.is_err(),
                scenario.expect_lr1_conflict,
                "scenario {}",
                scenario.name
            );
        }
    }
}

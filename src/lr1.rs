//! LR(1) recognizer: accepts only grammars whose canonical LR(1) automaton is conflict-free.
//!
//! `fit` builds the canonical collection of LR(1) item sets (closure + goto), fills an
//! action/goto table, and fails with [`LrError`] on the first shift/reduce or reduce/reduce
//! conflict. `predict` then drives a table-driven shift-reduce stack machine; because `fit`
//! already ruled out conflicts, every step has at most one applicable action.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, trace};

use crate::error::LrError;
use crate::grammar::{Grammar, Rule, Symbol, AUGMENTED_START, END_MARKER};

type RuleId = usize;

/// `(rule, lookahead, dot)`.
type LrItem = (RuleId, Symbol, usize);

#[derive(Debug, Clone)]
enum Action {
    Shift(usize),
    Reduce(RuleId),
}

#[derive(Debug)]
struct State {
    items: BTreeSet<LrItem>,
    goto: BTreeMap<Symbol, usize>,
}

/// The LR(1) engine. `fit` is the only way to obtain a [`FittedLr1`]; an unfitted engine is
/// unrepresentable, so there is no "caller forgot to fit" failure mode to guard against at
/// `predict` time.
#[derive(Debug, Default)]
pub struct Lr1;

impl Lr1 {
    /// Build the canonical LR(1) automaton and action/goto table for `grammar`.
    ///
    /// Fails with [`LrError`] on the first shift/reduce or reduce/reduce conflict, or on a
    /// state that would need two distinct GOTO targets for the same symbol.
    pub fn fit(grammar: &Grammar) -> Result<FittedLr1<'_>, LrError> {
        let mut all_rules = Vec::with_capacity(grammar.rules().len() + 1);
        all_rules.push(Rule::augmented(grammar.start()));
        all_rules.extend(grammar.rules().iter().cloned());

        let (nullable, first_sets) = compute_first_sets(grammar);
        let builder = Builder {
            grammar,
            all_rules,
            nullable,
            first_sets,
        };
        builder.build()
    }
}

/// Nonterminals that can derive ε, and each nonterminal's FIRST set (terminals only).
fn compute_first_sets(grammar: &Grammar) -> (BTreeSet<Symbol>, HashMap<Symbol, BTreeSet<Symbol>>) {
    let mut nullable: BTreeSet<Symbol> = BTreeSet::new();
    let mut first_sets: HashMap<Symbol, BTreeSet<Symbol>> = grammar
        .nonterminals()
        .iter()
        .map(|&nt| (nt, BTreeSet::new()))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for rule in grammar.rules() {
            let mut all_nullable_so_far = true;
            for &sym in &rule.right {
                if grammar.is_terminal(sym) {
                    if first_sets.get_mut(&rule.left).unwrap().insert(sym) {
                        changed = true;
                    }
                    all_nullable_so_far = false;
                    break;
                } else {
                    let sym_first = first_sets.get(&sym).cloned().unwrap_or_default();
                    let entry = first_sets.get_mut(&rule.left).unwrap();
                    for t in sym_first {
                        if entry.insert(t) {
                            changed = true;
                        }
                    }
                    if !nullable.contains(&sym) {
                        all_nullable_so_far = false;
                        break;
                    }
                }
            }
            if all_nullable_so_far && nullable.insert(rule.left) {
                changed = true;
            }
        }
    }
    (nullable, first_sets)
}

struct Builder<'g> {
    grammar: &'g Grammar,
    all_rules: Vec<Rule>,
    nullable: BTreeSet<Symbol>,
    first_sets: HashMap<Symbol, BTreeSet<Symbol>>,
}

impl<'g> Builder<'g> {
    fn rule(&self, id: RuleId) -> &Rule {
        &self.all_rules[id]
    }

    fn rule_ids_for(&self, nonterminal: Symbol) -> Vec<RuleId> {
        if nonterminal == AUGMENTED_START {
            return vec![0];
        }
        self.grammar
            .rules()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.left == nonterminal)
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// FIRST(seq · lookahead): terminals that can begin a derivation of `seq`, plus `lookahead`
    /// itself if every symbol in `seq` (including the empty sequence) can derive ε.
    fn first_of_seq(&self, seq: &[Symbol], lookahead: Symbol) -> BTreeSet<Symbol> {
        let mut result = BTreeSet::new();
        let mut all_nullable = true;
        for &sym in seq {
            if self.grammar.is_terminal(sym) {
                result.insert(sym);
                all_nullable = false;
                break;
            }
            if let Some(set) = self.first_sets.get(&sym) {
                result.extend(set.iter().copied());
            }
            if !self.nullable.contains(&sym) {
                all_nullable = false;
                break;
            }
        }
        if all_nullable {
            result.insert(lookahead);
        }
        result
    }

    /// Fixed-point closure of an LR(1) item set.
    fn closure(&self, items: BTreeSet<LrItem>) -> BTreeSet<LrItem> {
        let mut set = items;
        loop {
            let mut additions = Vec::new();
            for &(rule_id, lookahead, dot) in &set {
                let rule = self.rule(rule_id);
                if dot >= rule.right.len() {
                    continue;
                }
                let b = rule.right[dot];
                if !self.grammar.is_nonterminal(b) {
                    continue;
                }
                let beta = &rule.right[dot + 1..];
                let lookaheads = self.first_of_seq(beta, lookahead);
                for sub_rule_id in self.rule_ids_for(b) {
                    for &t in &lookaheads {
                        let candidate = (sub_rule_id, t, 0);
                        if !set.contains(&candidate) {
                            additions.push(candidate);
                        }
                    }
                }
            }
            if additions.is_empty() {
                return set;
            }
            set.extend(additions);
        }
    }

    /// GOTO(items, x): advance every item whose dot faces `x`, then close the result.
    fn goto(&self, items: &BTreeSet<LrItem>, x: Symbol) -> BTreeSet<LrItem> {
        let mut advanced = BTreeSet::new();
        for &(rule_id, lookahead, dot) in items {
            let rule = self.rule(rule_id);
            if dot < rule.right.len() && rule.right[dot] == x {
                advanced.insert((rule_id, lookahead, dot + 1));
            }
        }
        self.closure(advanced)
    }

    fn build(&self) -> Result<FittedLr1<'g>, LrError> {
        let start_items = self.closure(BTreeSet::from([(0, END_MARKER, 0)]));
        let mut states = vec![State {
            items: start_items.clone(),
            goto: BTreeMap::new(),
        }];
        let mut index_of: HashMap<BTreeSet<LrItem>, usize> = HashMap::new();
        index_of.insert(start_items, 0);

        let mut i = 0;
        while i < states.len() {
            let mut symbols_at_dot: BTreeSet<Symbol> = BTreeSet::new();
            for &(rule_id, _, dot) in &states[i].items {
                let rule = self.rule(rule_id);
                if dot < rule.right.len() {
                    symbols_at_dot.insert(rule.right[dot]);
                }
            }

            for x in symbols_at_dot {
                let target_items = self.goto(&states[i].items, x);
                if target_items.is_empty() {
                    continue;
                }
                let target_idx = match index_of.get(&target_items) {
                    Some(&idx) => idx,
                    None => {
                        let idx = states.len();
                        index_of.insert(target_items.clone(), idx);
                        states.push(State {
                            items: target_items,
                            goto: BTreeMap::new(),
                        });
                        idx
                    }
                };
                if let Some(&existing) = states[i].goto.get(&x) {
                    if existing != target_idx {
                        return Err(LrError {
                            state: i,
                            symbol: x,
                            detail: format!(
                                "GOTO({i}, '{x}') already targets state {existing}, cannot also target {target_idx}"
                            ),
                        });
                    }
                } else {
                    states[i].goto.insert(x, target_idx);
                }
            }
            trace!("state {i}: {} items, {} transitions", states[i].items.len(), states[i].goto.len());
            i += 1;
        }
        debug!("LR(1) automaton has {} states", states.len());

        let mut action: HashMap<(usize, Symbol), Action> = HashMap::new();
        let mut goto_table: HashMap<(usize, Symbol), usize> = HashMap::new();

        for (i, state) in states.iter().enumerate() {
            for (&sym, &target) in &state.goto {
                if self.grammar.is_nonterminal(sym) {
                    goto_table.insert((i, sym), target);
                } else {
                    action.insert((i, sym), Action::Shift(target));
                }
            }
        }

        for (i, state) in states.iter().enumerate() {
            for &(rule_id, lookahead, dot) in &state.items {
                let rule = self.rule(rule_id);
                if dot != rule.right.len() {
                    continue;
                }
                match action.get(&(i, lookahead)) {
                    None => {
                        action.insert((i, lookahead), Action::Reduce(rule_id));
                    }
                    Some(Action::Shift(_)) => {
                        return Err(LrError {
                            state: i,
                            symbol: lookahead,
                            detail: format!("shift/reduce conflict reducing '{rule}'"),
                        });
                    }
                    Some(Action::Reduce(other)) if *other != rule_id => {
                        return Err(LrError {
                            state: i,
                            symbol: lookahead,
                            detail: format!(
                                "reduce/reduce conflict between '{}' and '{rule}'",
                                self.rule(*other)
                            ),
                        });
                    }
                    Some(Action::Reduce(_)) => {}
                }
            }
        }

        Ok(FittedLr1 {
            grammar: self.grammar,
            all_rules: self.all_rules.clone(),
            action,
            goto: goto_table,
        })
    }
}

/// A grammar bound to the LR(1) engine, with a conflict-free action/goto table ready to drive
/// the shift-reduce stack machine.
#[derive(Debug)]
pub struct FittedLr1<'g> {
    #[allow(dead_code)]
    grammar: &'g Grammar,
    all_rules: Vec<Rule>,
    action: HashMap<(usize, Symbol), Action>,
    goto: HashMap<(usize, Symbol), usize>,
}

impl<'g> FittedLr1<'g> {
    /// Does `word` belong to the language generated by the bound grammar?
    pub fn predict(&self, word: &str) -> bool {
        let mut tokens: Vec<char> = word.chars().collect();
        tokens.push(END_MARKER);

        let mut states: Vec<usize> = vec![0];
        let mut symbols: Vec<Symbol> = Vec::new();
        let mut i = 0;

        loop {
            let s = *states.last().expect("stack never empties");
            let a = tokens[i];
            match self.action.get(&(s, a)) {
                None => {
                    trace!("state {s}, lookahead '{a}': no action -> reject");
                    return false;
                }
                Some(Action::Shift(j)) => {
                    trace!("state {s}, lookahead '{a}': shift to {j}");
                    symbols.push(a);
                    states.push(*j);
                    i += 1;
                }
                Some(Action::Reduce(rule_id)) => {
                    let rule_id = *rule_id;
                    let rule = self.rule(rule_id);
                    if rule.left == AUGMENTED_START {
                        return a == END_MARKER && i == tokens.len() - 1;
                    }
                    trace!("state {s}, lookahead '{a}': reduce by '{rule}'");
                    let arity = rule.right.len();
                    if symbols.len() < arity || states.len() <= arity {
                        return false;
                    }
                    symbols.truncate(symbols.len() - arity);
                    states.truncate(states.len() - arity);
                    let exposed = *states.last().expect("stack never empties");
                    match self.goto.get(&(exposed, rule.left)) {
                        None => return false,
                        Some(&j) => {
                            symbols.push(rule.left);
                            states.push(j);
                        }
                    }
                }
            }
        }
    }

    fn rule(&self, id: RuleId) -> &Rule {
        &self.all_rules[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn balanced_parens() -> Grammar {
        let mut g = Grammar::new(['S'].into(), ['(', ')'].into(), 'S');
        g.add_rule(Rule::new('S', vec!['(', 'S', ')', 'S']));
        g.add_rule(Rule::new('S', vec![]));
        g
    }

    #[test]
    fn balanced_parens_scenarios() {
        let g = balanced_parens();
        let lr1 = Lr1::fit(&g).expect("grammar is LR(1)");
        assert!(lr1.predict(""));
        assert!(lr1.predict("()"));
        assert!(lr1.predict("(())"));
        assert!(lr1.predict("()()"));
        assert!(!lr1.predict("("));
        assert!(!lr1.predict("(()"));
        assert!(!lr1.predict(")("));
    }

    #[test]
    fn mixed_brackets() {
        let mut g = Grammar::new(['S'].into(), ['(', ')', '[', ']', '{', '}'].into(), 'S');
        g.add_rule(Rule::new('S', vec!['(', 'S', ')', 'S']));
        g.add_rule(Rule::new('S', vec!['[', 'S', ']', 'S']));
        g.add_rule(Rule::new('S', vec!['{', 'S', '}', 'S']));
        g.add_rule(Rule::new('S', vec![]));
        let lr1 = Lr1::fit(&g).expect("grammar is LR(1)");
        assert!(lr1.predict("([]){}"));
        assert!(!lr1.predict("[(])"));
        assert!(lr1.predict(""));
    }

    #[test]
    fn a_n_b_n_via_nested_nonterminal() {
        let mut g = Grammar::new(['S', 'F'].into(), ['a', 'b'].into(), 'S');
        g.add_rule(Rule::new('S', vec!['a', 'F', 'b', 'F']));
        g.add_rule(Rule::new('F', vec!['a', 'F', 'b']));
        g.add_rule(Rule::new('F', vec![]));
        let lr1 = Lr1::fit(&g).expect("grammar is LR(1)");
        assert!(lr1.predict("aabb"));
        assert!(lr1.predict("abab"));
        assert!(lr1.predict("aabbab"));
        assert!(lr1.predict("aabbaaabbb"));
        assert!(!lr1.predict("ababab"));
        assert!(!lr1.predict("aabbb"));
    }

    #[test]
    fn ambiguous_crossing_interleave_is_rejected_at_fit() {
        let mut g = Grammar::new(['A', 'S'].into(), ['a', 'b'].into(), 'A');
        g.add_rule(Rule::new('A', vec!['S']));
        g.add_rule(Rule::new('S', vec!['a', 'S', 'b', 'S']));
        g.add_rule(Rule::new('S', vec!['b', 'S', 'a', 'S']));
        g.add_rule(Rule::new('S', vec![]));
        assert!(Lr1::fit(&g).is_err());
    }

    #[test]
    fn shift_reduce_free_grammar_agrees_with_shape() {
        let mut g = Grammar::new(['S', 'B', 'C'].into(), ['a', 'b', 'c'].into(), 'S');
        g.add_rule(Rule::new('S', vec!['B', 'b']));
        g.add_rule(Rule::new('S', vec!['C', 'c']));
        g.add_rule(Rule::new('B', vec!['a']));
        g.add_rule(Rule::new('C', vec!['a']));
        let lr1 = Lr1::fit(&g).expect("grammar is LR(1)");
        assert!(lr1.predict("ab"));
        assert!(lr1.predict("ac"));
        assert!(!lr1.predict("a"));
    }

    #[test]
    fn reduce_reduce_conflict_is_rejected_at_fit() {
        let mut g = Grammar::new(['S', 'B', 'C'].into(), ['a', 'b'].into(), 'S');
        g.add_rule(Rule::new('S', vec!['B']));
        g.add_rule(Rule::new('S', vec!['C']));
        g.add_rule(Rule::new('B', vec!['b', 'a', 'a']));
        g.add_rule(Rule::new('C', vec!['b', 'a', 'a']));
        assert!(Lr1::fit(&g).is_err());
    }

    #[test]
    fn left_recursive_a_star() {
        let mut g = Grammar::new(['S'].into(), ['a'].into(), 'S');
        g.add_rule(Rule::new('S', vec!['S', 'a']));
        g.add_rule(Rule::new('S', vec![]));
        let lr1 = Lr1::fit(&g).expect("grammar is LR(1)");
        for n in 0..5 {
            assert!(lr1.predict(&"a".repeat(n)));
        }
        assert!(!lr1.predict("ab"));
    }

    #[test]
    fn single_symbol_grammar_accepts_only_that_symbol() {
        let mut g = Grammar::new(['S'].into(), ['a'].into(), 'S');
        g.add_rule(Rule::new('S', vec!['a']));
        let lr1 = Lr1::fit(&g).expect("grammar is LR(1)");
        assert!(lr1.predict("a"));
        assert!(!lr1.predict(""));
        assert!(!lr1.predict("aa"));
    }

    #[test]
    fn determinism_across_repeated_calls() {
        let g = balanced_parens();
        let lr1 = Lr1::fit(&g).expect("grammar is LR(1)");
        for _ in 0..3 {
            assert!(lr1.predict("(())"));
            assert!(!lr1.predict("(("));
        }
    }
}

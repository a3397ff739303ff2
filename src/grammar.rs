//! A context-free grammar over single-character symbols.
//!
//! A grammar is a map of definitions: `char -> Vec<Rule>` plus the disjoint terminal/nonterminal
//! sets and the start symbol. Built once by the driver (or by hand in tests), then frozen;
//! both engines only ever see a shared reference during `fit`/`predict`.
//!
//! Two sentinel symbols are reserved by the engines and must never appear in a user-supplied N
//! or Σ: `#` (the augmented start nonterminal) and `$` (the LR(1) end-of-input marker).

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::GrammarError;

/// The augmented start nonterminal, used by both engines to give the original start symbol a
/// single, unambiguous top-level reduction.
pub const AUGMENTED_START: char = '#';

/// The LR(1) end-of-input terminal.
pub const END_MARKER: char = '$';

/// A single grammar symbol. Terminals and nonterminals share this type; which set a symbol
/// belongs to is a property of the [`Grammar`], not of the symbol itself.
pub type Symbol = char;

/// One production `left -> right`. `right` may be empty (an ε-production).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rule {
    pub left: Symbol,
    pub right: Vec<Symbol>,
}

impl Rule {
    pub fn new(left: Symbol, right: impl Into<Vec<Symbol>>) -> Self {
        Self {
            left,
            right: right.into(),
        }
    }

    /// The synthetic rule `#→S` used to seed both engines.
    pub fn augmented(start: Symbol) -> Self {
        Self::new(AUGMENTED_START, vec![start])
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rhs: String = self.right.iter().collect();
        write!(f, "{}->{}", self.left, rhs)
    }
}

/// The frozen grammar: `(N, Σ, P, S)`. Rule storage is owned per instance, so two grammars
/// never share a rule set.
#[derive(Debug, Clone)]
pub struct Grammar {
    nonterminals: BTreeSet<Symbol>,
    terminals: BTreeSet<Symbol>,
    rules: Vec<Rule>,
    start: Symbol,
    /// Index from a nonterminal to the rules whose left side it is, in insertion order.
    /// Precomputed so both engines' predict/closure steps avoid a full scan of `rules` per call.
    by_left: HashMap<Symbol, Vec<usize>>,
}

impl Grammar {
    /// Build a grammar from its symbol sets and start symbol, with no rules yet.
    /// `add_rule` is used to populate `P` afterward.
    pub fn new(
        nonterminals: BTreeSet<Symbol>,
        terminals: BTreeSet<Symbol>,
        start: Symbol,
    ) -> Self {
        Self {
            nonterminals,
            terminals,
            rules: Vec::new(),
            start,
            by_left: HashMap::new(),
        }
    }

    /// Insert a rule into P. Idempotent on duplicates: adding the same rule twice leaves the
    /// rule set, and hence the recognized language, unchanged.
    pub fn add_rule(&mut self, rule: Rule) {
        if self.rules.contains(&rule) {
            return;
        }
        let idx = self.rules.len();
        self.by_left.entry(rule.left).or_default().push(idx);
        self.rules.push(rule);
    }

    pub fn is_terminal(&self, sym: Symbol) -> bool {
        self.terminals.contains(&sym)
    }

    pub fn is_nonterminal(&self, sym: Symbol) -> bool {
        self.nonterminals.contains(&sym)
    }

    pub fn nonterminals(&self) -> &BTreeSet<Symbol> {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &BTreeSet<Symbol> {
        &self.terminals
    }

    pub fn start(&self) -> Symbol {
        self.start
    }

    /// All rules, in the stable (insertion) order they were added.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The rules whose left side is `nonterminal`, in insertion order. Empty if there are none.
    pub fn rules_for(&self, nonterminal: Symbol) -> impl Iterator<Item = &Rule> {
        self.by_left
            .get(&nonterminal)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.rules[idx])
    }

    /// Every rule's left side is a single symbol in N, and every right-side symbol is in N ∪ Σ.
    /// Checks both sides of each rule, not just the left side.
    pub fn is_well_formed(&self) -> Result<(), GrammarError> {
        for rule in &self.rules {
            if !self.nonterminals.contains(&rule.left) {
                return Err(GrammarError::NotWellFormed(format!(
                    "left side '{}' of rule '{}' is not a nonterminal",
                    rule.left, rule
                )));
            }
            for &sym in &rule.right {
                if !self.nonterminals.contains(&sym) && !self.terminals.contains(&sym) {
                    return Err(GrammarError::NotWellFormed(format!(
                        "symbol '{sym}' in rule '{rule}' is neither a terminal nor a nonterminal"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Neither sentinel symbol (`#`, `$`) may appear in N or Σ.
    pub fn check_reserved_symbols(&self) -> Result<(), GrammarError> {
        for &sentinel in &[AUGMENTED_START, END_MARKER] {
            if self.nonterminals.contains(&sentinel) || self.terminals.contains(&sentinel) {
                return Err(GrammarError::ReservedSymbol(sentinel));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        write!(f, "start: {}", self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket_grammar() -> Grammar {
        let mut g = Grammar::new(['S'].into(), ['(', ')'].into(), 'S');
        g.add_rule(Rule::new('S', vec!['(', 'S', ')', 'S']));
        g.add_rule(Rule::new('S', vec![]));
        g
    }

    #[test]
    fn well_formed_grammar_passes() {
        let g = bracket_grammar();
        assert!(g.is_well_formed().is_ok());
        assert!(g.check_reserved_symbols().is_ok());
    }

    #[test]
    fn rule_with_unknown_symbol_is_rejected() {
        let mut g = Grammar::new(['S'].into(), ['a'].into(), 'S');
        g.add_rule(Rule::new('S', vec!['b']));
        assert!(g.is_well_formed().is_err());
    }

    #[test]
    fn rule_with_non_nonterminal_left_is_rejected() {
        let mut g = Grammar::new(['S'].into(), ['a'].into(), 'S');
        g.add_rule(Rule::new('a', vec!['a']));
        assert!(g.is_well_formed().is_err());
    }

    #[test]
    fn reserved_symbol_in_nonterminals_is_rejected() {
        let g = Grammar::new(['#'].into(), ['a'].into(), '#');
        assert!(g.check_reserved_symbols().is_err());
    }

    #[test]
    fn reserved_symbol_in_terminals_is_rejected() {
        let g = Grammar::new(['S'].into(), ['$'].into(), 'S');
        assert!(g.check_reserved_symbols().is_err());
    }

    #[test]
    fn duplicate_rule_add_is_idempotent() {
        let mut g = bracket_grammar();
        let before = g.rules().len();
        g.add_rule(Rule::new('S', vec![]));
        assert_eq!(g.rules().len(), before);
    }

    #[test]
    fn rules_for_returns_only_matching_left_side() {
        let g = bracket_grammar();
        let for_s: Vec<_> = g.rules_for('S').collect();
        assert_eq!(for_s.len(), 2);
        let for_other: Vec<_> = g.rules_for('Z').collect();
        assert!(for_other.is_empty());
    }
}

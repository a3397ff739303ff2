//! General-purpose Earley recognizer: accepts any context-free grammar.
//!
//! The chart `D[0..=|w|]` is a sequence of ordered worklists. Each `D[i]` is a plain `Vec<ItemId>`
//! that predict/scan/complete keep appending to while a cursor walks it, so a completer whose
//! origin is the *current* position (`j == i`) still observes items predicted or completed later
//! in the same pass. This is the fixed-point invariant nullable grammars depend on; freezing a
//! snapshot of `D[i]` before iterating would silently drop completions.

use std::collections::HashMap;

use log::{debug, trace};

use crate::grammar::{Grammar, Rule, Symbol, AUGMENTED_START};

/// Index of an [`Item`] inside the per-call arena. Back-pointers are stored as `ItemId`s rather
/// than owning references: the predict/complete graph is a DAG, and indexing into a flat `Vec`
/// sidesteps lifetimes entirely.
type ItemId = usize;

/// Index into [`FittedEarley::all_rules`]. Index 0 is always the augmented rule `#→S`.
type RuleId = usize;

/// `(rule, origin, dot)`, the configuration's equality key. Back-pointers are intentionally
/// excluded: two items are the same item regardless of how they were derived.
type ItemKey = (RuleId, usize, usize);

#[derive(Debug, Clone)]
struct Item {
    rule: RuleId,
    origin: usize,
    dot: usize,
    back: Option<ItemId>,
}

/// The general Earley engine. Stateless with respect to any particular input word; `fit` binds
/// a grammar and returns a [`FittedEarley`] that can answer `predict` any number of times.
#[derive(Debug, Default)]
pub struct Earley;

impl Earley {
    /// Bind a grammar. O(1): just clones the rule list and prepends the augmented start rule.
    pub fn fit(grammar: &Grammar) -> FittedEarley<'_> {
        let mut all_rules = Vec::with_capacity(grammar.rules().len() + 1);
        all_rules.push(Rule::augmented(grammar.start()));
        all_rules.extend(grammar.rules().iter().cloned());
        FittedEarley { grammar, all_rules }
    }
}

/// A grammar bound to the Earley engine, ready to answer membership queries.
#[derive(Debug)]
pub struct FittedEarley<'g> {
    grammar: &'g Grammar,
    all_rules: Vec<Rule>,
}

impl<'g> FittedEarley<'g> {
    fn rule(&self, id: RuleId) -> &Rule {
        &self.all_rules[id]
    }

    /// `rule_ids` whose left side is `nonterminal`, including the augmented rule when
    /// `nonterminal == '#'` (which otherwise never appears on the left of a user rule).
    fn rule_ids_for(&self, nonterminal: Symbol) -> Vec<RuleId> {
        if nonterminal == AUGMENTED_START {
            return vec![0];
        }
        // Index 0 is the augmented rule; user rules start at 1.
        self.grammar
            .rules()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.left == nonterminal)
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Does `word` belong to the language generated by the bound grammar?
    ///
    /// Deterministic and side-effect-free: repeated calls with the same word return the same
    /// answer, and no state is shared across calls.
    pub fn predict(&self, word: &str) -> bool {
        let tokens: Vec<char> = word.chars().collect();
        let n = tokens.len();

        let mut arena: Vec<Item> = Vec::new();
        let mut chart: Vec<Vec<ItemId>> = vec![Vec::new(); n + 1];
        let mut seen: Vec<HashMap<ItemKey, ItemId>> = vec![HashMap::new(); n + 1];

        self.add_item(
            &mut arena,
            &mut chart,
            &mut seen,
            0,
            Item {
                rule: 0,
                origin: 0,
                dot: 0,
                back: None,
            },
        );

        for i in 0..=n {
            let mut idx = 0;
            while idx < chart[i].len() {
                let id = chart[i][idx];
                let item = arena[id].clone();
                let rule = self.rule(item.rule);

                if item.dot == rule.right.len() {
                    trace!("D{i}: complete {}@{} (origin {})", rule, item.dot, item.origin);
                    self.complete(&mut arena, &mut chart, &mut seen, i, id);
                } else {
                    let sym = rule.right[item.dot];
                    if self.grammar.is_terminal(sym) {
                        if i < n && tokens[i] == sym {
                            trace!("D{i}: scan '{sym}' -> D{}", i + 1);
                            self.scan(&mut arena, &mut chart, &mut seen, i, id);
                        }
                    } else {
                        trace!("D{i}: predict '{sym}'");
                        self.predict_symbol(&mut arena, &mut chart, &mut seen, i, sym);
                    }
                }
                idx += 1;
            }
            debug!("D{i} settled with {} items", chart[i].len());
        }

        chart[n].iter().any(|&id| {
            let item = &arena[id];
            item.rule == 0 && item.dot == 1 && item.origin == 0
        })
    }

    /// Insert `item` into `D[pos]` unless a structurally equal item (same rule/origin/dot) is
    /// already present there; returns the id it now has either way.
    fn add_item(
        &self,
        arena: &mut Vec<Item>,
        chart: &mut [Vec<ItemId>],
        seen: &mut [HashMap<ItemKey, ItemId>],
        pos: usize,
        item: Item,
    ) -> ItemId {
        let key = (item.rule, item.origin, item.dot);
        if let Some(&existing) = seen[pos].get(&key) {
            return existing;
        }
        let id = arena.len();
        arena.push(item);
        seen[pos].insert(key, id);
        chart[pos].push(id);
        id
    }

    /// PREDICTOR: the dot in `D[pos]` faces nonterminal `sym`; seed one item per rule for `sym`.
    fn predict_symbol(
        &self,
        arena: &mut Vec<Item>,
        chart: &mut [Vec<ItemId>],
        seen: &mut [HashMap<ItemKey, ItemId>],
        pos: usize,
        sym: Symbol,
    ) {
        for rule_id in self.rule_ids_for(sym) {
            self.add_item(
                arena,
                chart,
                seen,
                pos,
                Item {
                    rule: rule_id,
                    origin: pos,
                    dot: 0,
                    back: None,
                },
            );
        }
    }

    /// SCANNER: `item` in `D[pos]` has a matched terminal at the dot; advance it into `D[pos+1]`.
    fn scan(
        &self,
        arena: &mut Vec<Item>,
        chart: &mut [Vec<ItemId>],
        seen: &mut [HashMap<ItemKey, ItemId>],
        pos: usize,
        item_id: ItemId,
    ) {
        let item = arena[item_id].clone();
        self.add_item(
            arena,
            chart,
            seen,
            pos + 1,
            Item {
                rule: item.rule,
                origin: item.origin,
                dot: item.dot + 1,
                back: Some(item_id),
            },
        );
    }

    /// COMPLETER: `item` in `D[pos]` is finished (`B→γ·`, origin `j`). Advance every item in
    /// `D[j]` whose dot faces `B` into `D[pos]`.
    ///
    /// Reads `chart[j]` by index rather than `for ... in &chart[j]` so that when `j == pos`
    /// (the nullable-completion case), items this very call (or an earlier one in the same pass)
    /// appended to that same vector are still visited.
    fn complete(
        &self,
        arena: &mut Vec<Item>,
        chart: &mut [Vec<ItemId>],
        seen: &mut [HashMap<ItemKey, ItemId>],
        pos: usize,
        item_id: ItemId,
    ) {
        let item = arena[item_id].clone();
        let completed = self.rule(item.rule).left;
        let origin = item.origin;

        let mut k = 0;
        while k < chart[origin].len() {
            let parent_id = chart[origin][k];
            let parent = arena[parent_id].clone();
            let parent_rule = self.rule(parent.rule);
            if parent.dot < parent_rule.right.len() && parent_rule.right[parent.dot] == completed {
                self.add_item(
                    arena,
                    chart,
                    seen,
                    pos,
                    Item {
                        rule: parent.rule,
                        origin: parent.origin,
                        dot: parent.dot + 1,
                        back: Some(item_id),
                    },
                );
            }
            k += 1;
        }
    }
}

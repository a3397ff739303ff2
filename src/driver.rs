//! The line-oriented text driver: reads a grammar and a batch of query words, fits one of the
//! two engines, and writes `Yes`/`No` per query.
//!
//! Parameterized over `BufRead`/`Write` so it can be driven against a file, stdin, or an
//! in-memory buffer in tests, without spawning a process.

use std::io::{BufRead, Write};

use crate::earley::Earley;
use crate::error::DriverError;
use crate::grammar::{Grammar, Rule, AUGMENTED_START, END_MARKER};
use crate::lr1::Lr1;

/// Which recognizer engine `run` should fit and query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Earley,
    Lr1,
}

/// Parse the line-oriented text format from `input`, fit `engine`, and write one `Yes`/`No` line
/// per query to `output`. Aborts at the first structural error; there is no partial success.
pub fn run<R: BufRead, W: Write>(input: R, mut output: W, engine: Engine) -> Result<(), DriverError> {
    let mut lines = input.lines();
    let record = parse_input_record(&mut lines)?;

    record.grammar.check_reserved_symbols()?;
    record.grammar.is_well_formed()?;

    match engine {
        Engine::Earley => {
            let fitted = Earley::fit(&record.grammar);
            for word in &record.queries {
                writeln!(output, "{}", if fitted.predict(word) { "Yes" } else { "No" })
                    .map_err(|e| DriverError::MalformedInput(format!("write failed: {e}")))?;
            }
        }
        Engine::Lr1 => {
            let fitted = Lr1::fit(&record.grammar)?;
            for word in &record.queries {
                writeln!(output, "{}", if fitted.predict(word) { "Yes" } else { "No" })
                    .map_err(|e| DriverError::MalformedInput(format!("write failed: {e}")))?;
            }
        }
    }
    Ok(())
}

/// The parsed, validated in-memory representation of one driver session.
struct InputRecord {
    grammar: Grammar,
    queries: Vec<String>,
}

fn next_line<R: BufRead>(
    lines: &mut std::io::Lines<R>,
    what: &str,
) -> Result<String, DriverError> {
    match lines.next() {
        None => Err(DriverError::MalformedInput(format!(
            "expected {what}, found end of input"
        ))),
        Some(Err(e)) => Err(DriverError::MalformedInput(format!("read error: {e}"))),
        Some(Ok(line)) => Ok(line),
    }
}

fn parse_input_record<R: BufRead>(lines: &mut std::io::Lines<R>) -> Result<InputRecord, DriverError> {
    let counts_line = next_line(lines, "a line of three counts")?;
    let counts: Vec<&str> = counts_line.split_whitespace().collect();
    if counts.len() != 3 {
        return Err(DriverError::MalformedInput(format!(
            "expected three counts '|N| |\u{3a3}| |P|', got '{counts_line}'"
        )));
    }
    let parse_count = |s: &str| -> Result<usize, DriverError> {
        s.parse()
            .map_err(|_| DriverError::MalformedInput(format!("'{s}' is not a valid count")))
    };
    let n_count = parse_count(counts[0])?;
    let t_count = parse_count(counts[1])?;
    let p_count = parse_count(counts[2])?;

    let n_line = next_line(lines, "the nonterminal symbol line")?;
    let nonterminals: Vec<char> = n_line.chars().collect();
    if nonterminals.len() != n_count {
        return Err(DriverError::MalformedInput(format!(
            "expected {n_count} nonterminal symbols, got '{n_line}'"
        )));
    }
    let nonterminal_set: std::collections::BTreeSet<char> = nonterminals.iter().copied().collect();
    if nonterminal_set.len() != nonterminals.len() {
        return Err(DriverError::MalformedInput(format!(
            "nonterminal symbols must be distinct, got '{n_line}'"
        )));
    }

    let t_line = next_line(lines, "the terminal symbol line")?;
    let terminals: Vec<char> = t_line.chars().collect();
    if terminals.len() != t_count {
        return Err(DriverError::MalformedInput(format!(
            "expected {t_count} terminal symbols, got '{t_line}'"
        )));
    }
    let terminal_set: std::collections::BTreeSet<char> = terminals.iter().copied().collect();
    if terminal_set.len() != terminals.len() {
        return Err(DriverError::MalformedInput(format!(
            "terminal symbols must be distinct, got '{t_line}'"
        )));
    }
    if !nonterminal_set.is_disjoint(&terminal_set) {
        return Err(DriverError::MalformedInput(
            "nonterminal and terminal sets must be disjoint".to_string(),
        ));
    }

    let mut grammar = Grammar::new(nonterminal_set.clone(), terminal_set.clone(), AUGMENTED_START);

    for _ in 0..p_count {
        let rule_line = next_line(lines, "a rule line 'L->R'")?;
        let rule = parse_rule_line(&rule_line, &nonterminal_set, &terminal_set)?;
        grammar.add_rule(rule);
    }

    let start_line = next_line(lines, "the start symbol line")?;
    let mut start_chars = start_line.chars();
    let start = start_chars
        .next()
        .ok_or_else(|| DriverError::MalformedInput("start symbol line is empty".to_string()))?;
    if start_chars.next().is_some() {
        return Err(DriverError::MalformedInput(format!(
            "start symbol must be a single character, got '{start_line}'"
        )));
    }
    if !nonterminal_set.contains(&start) {
        return Err(DriverError::InvalidStartSymbol(start));
    }
    grammar = rebuild_with_start(grammar, start);

    let q_line = next_line(lines, "the query count line")?;
    let q_count: usize = q_line
        .trim()
        .parse()
        .map_err(|_| DriverError::MalformedInput(format!("'{q_line}' is not a valid query count")))?;

    let mut queries = Vec::with_capacity(q_count);
    for line_no in 1..=q_count {
        let query = next_line(lines, "a query line")?;
        for symbol in query.chars() {
            if !terminal_set.contains(&symbol) {
                return Err(DriverError::InvalidWord {
                    line: line_no,
                    symbol,
                });
            }
        }
        queries.push(query);
    }

    Ok(InputRecord { grammar, queries })
}

/// `Grammar::new` takes the start symbol up front; the text format declares N/Σ/P before S, so
/// the grammar is reassembled once S is known rather than threading a placeholder through.
fn rebuild_with_start(grammar: Grammar, start: char) -> Grammar {
    let mut rebuilt = Grammar::new(
        grammar.nonterminals().clone(),
        grammar.terminals().clone(),
        start,
    );
    for rule in grammar.rules() {
        rebuilt.add_rule(rule.clone());
    }
    rebuilt
}

fn parse_rule_line(
    line: &str,
    nonterminals: &std::collections::BTreeSet<char>,
    terminals: &std::collections::BTreeSet<char>,
) -> Result<Rule, DriverError> {
    let mut occurrences = line.match_indices("->");
    let (idx, _) = occurrences
        .next()
        .ok_or_else(|| DriverError::MalformedInput(format!("rule line '{line}' has no '->'")))?;
    if occurrences.next().is_some() {
        return Err(DriverError::MalformedInput(format!(
            "rule line '{line}' has more than one '->'"
        )));
    }
    let (left_part, rest) = line.split_at(idx);
    let right_part = &rest[2..];

    if left_part.chars().count() != 1 {
        return Err(DriverError::MalformedInput(format!(
            "rule line '{line}' must have a single-symbol left side"
        )));
    }
    if right_part.contains('-') || right_part.contains('>') {
        return Err(DriverError::MalformedInput(format!(
            "rule line '{line}' has a stray '-' or '>' in its right side"
        )));
    }

    let left = left_part.chars().next().unwrap();
    if left != AUGMENTED_START && !nonterminals.contains(&left) && !terminals.contains(&left) {
        return Err(DriverError::MalformedInput(format!(
            "symbol '{left}' in rule line '{line}' is neither a terminal nor a nonterminal"
        )));
    }
    if left == END_MARKER {
        return Err(DriverError::MalformedInput(format!(
            "reserved symbol '{END_MARKER}' used in rule line '{line}'"
        )));
    }

    let mut right = Vec::with_capacity(right_part.chars().count());
    for symbol in right_part.chars() {
        if !nonterminals.contains(&symbol) && !terminals.contains(&symbol) {
            return Err(DriverError::MalformedInput(format!(
                "symbol '{symbol}' in rule line '{line}' is neither a terminal nor a nonterminal"
            )));
        }
        right.push(symbol);
    }

    Ok(Rule::new(left, right))
}

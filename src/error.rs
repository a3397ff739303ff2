//! Typed error hierarchy for the grammar model, the LR(1) engine, and the driver.
//!
//! Malformed input, non-context-free grammar shape, invalid start symbol, LR(1) conflicts, and
//! invalid query characters are all distinct, reportable failures. None of them are panics.

use std::fmt;

/// A defect in a [`crate::grammar::Grammar`] detected by `is_well_formed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A rule's left side was not a single symbol in N, or a right-side symbol was outside N ∪ Σ.
    NotWellFormed(String),
    /// `#` or `$` appeared in N or Σ.
    ReservedSymbol(char),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotWellFormed(detail) => write!(f, "Wrong grammar: {detail}"),
            Self::ReservedSymbol(sym) => {
                write!(f, "Wrong grammar: reserved symbol '{sym}' used in N or \u{3a3}")
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// Failure of [`crate::lr1::Lr1::fit`] to build a conflict-free table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrError {
    pub state: usize,
    pub symbol: char,
    pub detail: String,
}

impl fmt::Display for LrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Not LR(1) grammar: conflict in state {} on symbol '{}': {}",
            self.state, self.symbol, self.detail
        )
    }
}

impl std::error::Error for LrError {}

/// Everything that can go wrong reading the line-oriented text format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Malformed counts, symbol lists, or rule-line syntax.
    MalformedInput(String),
    /// The declared start symbol is not in N.
    InvalidStartSymbol(char),
    /// The grammar itself is not context-free-shaped.
    InvalidGrammar(GrammarError),
    /// A query character at 1-based `line` is not in Σ.
    InvalidWord { line: usize, symbol: char },
    /// The LR(1) engine rejected the grammar at fit time.
    NotLr1(LrError),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput(detail) => write!(f, "Wrong input format: {detail}"),
            Self::InvalidStartSymbol(sym) => {
                write!(f, "Start symbol is not a nonterminal: '{sym}'")
            }
            Self::InvalidGrammar(e) => write!(f, "{e}"),
            Self::InvalidWord { line, symbol } => {
                write!(f, "Wrong word: '{symbol}' on query line {line}")
            }
            Self::NotLr1(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<GrammarError> for DriverError {
    fn from(e: GrammarError) -> Self {
        Self::InvalidGrammar(e)
    }
}

impl From<LrError> for DriverError {
    fn from(e: LrError) -> Self {
        Self::NotLr1(e)
    }
}

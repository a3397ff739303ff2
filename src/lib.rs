//! Context-free grammar membership recognition: a shared grammar model plus two independent
//! recognizer engines (general Earley, conflict-checked LR(1)) and a line-oriented text driver.

pub mod driver;
pub mod earley;
pub mod error;
pub mod grammar;
pub mod lr1;
pub mod scenarios;

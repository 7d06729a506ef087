//! Result reporting: scope tree, accumulator and NUnit XML output.

mod accumulator;
mod environment;
mod tree;
mod xml;

pub use accumulator::{Counters, ResultAccumulator};
pub use environment::{culture_from_lang, Environment, DEFAULT_CULTURE};
pub use tree::{FailureDetail, ResultState, ScopeKind, ScopeNode, StatusFlags, TestCaseNode};

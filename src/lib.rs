//! maxixe: a verifier for block-structured formal proofs
//!
//! A proof text declares rules of inference (typed hypotheses and a
//! conclusion schema), optionally block rules governing nested
//! case-based sub-proofs, a goal term, and a sequence of steps each
//! justified by a rule applied to prior results or atoms. This crate
//! parses such a text and checks that every step is a valid instance
//! of its rule, that every block satisfies its block rule, and that
//! the proof reaches its declared goal. It never searches for proofs;
//! it only checks the one it is given.

pub mod ast;
pub mod checker;
pub mod parser;
pub mod term;
pub mod unification;

// Re-export the types most callers need
pub use ast::{
    Block, BlockId, BlockRule, BlockRuleCase, Case, CaseItem, HypAttr, Hypothesis, Proof, Rule,
    Step, StepId,
};
pub use checker::{check, CheckError, Checker, ReasoningError, StructureError};
pub use parser::parse_proof;
pub use term::{ResolveError, Term, Unifier};
pub use unification::{match_term, MatchError};

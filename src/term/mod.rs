//! Term representation and instantiation
//!
//! This module provides the term algebra the checker works over:
//! compound terms, variables, substitution wrappers, and the unifier
//! built up during one-way matching.

pub mod substitution;
pub mod term;

pub use substitution::{ResolveError, Unifier};
pub use term::Term;

//! One-way matching of rule patterns against concrete terms

use crate::term::{Term, Unifier};
use std::fmt;

/// Ways a one-way match can fail. Constructor and arity clashes are
/// reported separately so diagnostics can name the actual difference.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    /// Compound pattern and term have different constructors
    ConstructorClash { pattern: String, found: String },
    /// Same constructor but different subterm counts
    ArityMismatch {
        constructor: String,
        pattern: usize,
        found: usize,
    },
    /// Compound pattern matched against a non-compound term
    NotCompound { pattern: Term, found: Term },
    /// A substitution wrapper is not a valid match pattern
    UnsupportedPattern { pattern: Term },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::ConstructorClash { pattern, found } => {
                write!(f, "`{}` != `{}`", pattern, found)
            }
            MatchError::ArityMismatch {
                constructor,
                pattern,
                found,
            } => write!(
                f,
                "`{}` takes {} subterms in the pattern but {} were given",
                constructor, pattern, found
            ),
            MatchError::NotCompound { pattern, found } => {
                write!(f, "`{}` cannot match non-compound term `{}`", pattern, found)
            }
            MatchError::UnsupportedPattern { pattern } => {
                write!(f, "`{}` cannot be used as a match pattern", pattern)
            }
        }
    }
}

/// One-way match: bind variables in `pattern` so that it becomes
/// `term`, extending `unifier` in place. Only variables in the pattern
/// are bound. A variable that is already bound must have its binding
/// match the term, recursively via the same algorithm. Bindings made
/// before a failure are kept; there is no backtracking.
pub fn match_term(pattern: &Term, term: &Term, unifier: &mut Unifier) -> Result<(), MatchError> {
    match pattern {
        Term::Var(name) => {
            if let Some(bound) = unifier.get(name) {
                let bound = bound.clone();
                match_term(&bound, term, unifier)
            } else {
                unifier.insert(name.clone(), term.clone());
                Ok(())
            }
        }
        Term::Compound(constructor, subpatterns) => match term {
            Term::Compound(found, subterms) => {
                if constructor != found {
                    return Err(MatchError::ConstructorClash {
                        pattern: constructor.clone(),
                        found: found.clone(),
                    });
                }
                if subpatterns.len() != subterms.len() {
                    return Err(MatchError::ArityMismatch {
                        constructor: constructor.clone(),
                        pattern: subpatterns.len(),
                        found: subterms.len(),
                    });
                }
                for (subpattern, subterm) in subpatterns.iter().zip(subterms.iter()) {
                    match_term(subpattern, subterm, unifier)?;
                }
                Ok(())
            }
            _ => Err(MatchError::NotCompound {
                pattern: pattern.clone(),
                found: term.clone(),
            }),
        },
        Term::Subst(_, _) => Err(MatchError::UnsupportedPattern {
            pattern: pattern.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(name: &str, args: Vec<Term>) -> Term {
        Term::compound(name, args)
    }

    #[test]
    fn test_match_variable_binds() {
        let mut unifier = Unifier::new();
        let a = Term::atom("a");
        match_term(&Term::var("X"), &a, &mut unifier).unwrap();
        assert_eq!(unifier.get("X"), Some(&a));
    }

    #[test]
    fn test_match_compound() {
        let mut unifier = Unifier::new();
        let pattern = func("f", vec![Term::var("X"), Term::var("Y")]);
        let term = func("f", vec![Term::atom("a"), Term::atom("b")]);
        match_term(&pattern, &term, &mut unifier).unwrap();
        assert_eq!(pattern.instantiate(&unifier), term);
    }

    #[test]
    fn test_match_ground_terms_leaves_unifier_unchanged() {
        let mut unifier = Unifier::new();
        let term = func("f", vec![Term::atom("a")]);
        match_term(&term, &term, &mut unifier).unwrap();
        assert!(unifier.map.is_empty());
    }

    #[test]
    fn test_constructor_clash() {
        let mut unifier = Unifier::new();
        let result = match_term(&Term::atom("a"), &Term::atom("b"), &mut unifier);
        assert_eq!(
            result,
            Err(MatchError::ConstructorClash {
                pattern: "a".to_string(),
                found: "b".to_string(),
            })
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let mut unifier = Unifier::new();
        let pattern = func("f", vec![Term::var("X")]);
        let term = func("f", vec![Term::atom("a"), Term::atom("b")]);
        let result = match_term(&pattern, &term, &mut unifier);
        assert_eq!(
            result,
            Err(MatchError::ArityMismatch {
                constructor: "f".to_string(),
                pattern: 1,
                found: 2,
            })
        );
    }

    #[test]
    fn test_rebinding_to_equal_term_succeeds() {
        let mut unifier = Unifier::new();
        let pattern = func("eq", vec![Term::var("X"), Term::var("X")]);
        let term = func("eq", vec![Term::atom("a"), Term::atom("a")]);
        match_term(&pattern, &term, &mut unifier).unwrap();
        assert_eq!(unifier.get("X"), Some(&Term::atom("a")));
    }

    #[test]
    fn test_rebinding_to_different_term_fails() {
        let mut unifier = Unifier::new();
        let pattern = func("eq", vec![Term::var("X"), Term::var("X")]);
        let term = func("eq", vec![Term::atom("a"), Term::atom("b")]);
        assert!(match_term(&pattern, &term, &mut unifier).is_err());
    }

    #[test]
    fn test_pattern_not_compound_over_variable_term() {
        let mut unifier = Unifier::new();
        let pattern = func("f", vec![Term::atom("a")]);
        let result = match_term(&pattern, &Term::var("Y"), &mut unifier);
        assert!(matches!(result, Err(MatchError::NotCompound { .. })));
    }
}

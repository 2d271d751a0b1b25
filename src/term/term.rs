//! Terms of the proof language

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A first-order term.
///
/// A compound term with no subterms is called an atom. A substitution
/// wrapper carries a list of pending `lhs -> rhs` replacements to be
/// applied against a fully instantiated copy of its base term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Constructor name applied to an ordered list of subterms.
    Compound(String, Vec<Term>),
    /// A named logic variable (uppercase-initial).
    Var(String),
    /// A base term plus ordered replacement pairs, applied at
    /// resolution time.
    Subst(Box<Term>, Vec<(Term, Term)>),
}

impl Term {
    /// Build an atom (zero-arity compound term).
    pub fn atom(name: &str) -> Term {
        Term::Compound(name.to_string(), vec![])
    }

    /// Build a compound term.
    pub fn compound(name: &str, subterms: Vec<Term>) -> Term {
        Term::Compound(name.to_string(), subterms)
    }

    /// Build a variable.
    pub fn var(name: &str) -> Term {
        debug_assert!(
            name.chars().next().map_or(false, |c| c.is_ascii_uppercase()),
            "variable names start with an uppercase letter"
        );
        Term::Var(name.to_string())
    }

    /// True iff this is a compound term with no subterms.
    pub fn is_atom(&self) -> bool {
        matches!(self, Term::Compound(_, subterms) if subterms.is_empty())
    }

    /// True iff the term contains no variables. A substitution wrapper
    /// is ground iff its base term is ground; the replacement pairs
    /// are not inspected since they only apply after full resolution.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Compound(_, subterms) => subterms.iter().all(Term::is_ground),
            Term::Var(_) => false,
            Term::Subst(base, _) => base.is_ground(),
        }
    }

    /// True if `other` equals this term or any subterm of it.
    pub fn contains(&self, other: &Term) -> bool {
        if self == other {
            return true;
        }
        match self {
            Term::Compound(_, subterms) => subterms.iter().any(|st| st.contains(other)),
            Term::Var(_) => false,
            Term::Subst(base, _) => base.contains(other),
        }
    }

    /// Return a copy with every subtree equal to `old` replaced by
    /// `new`. Replacement does not recurse into the inserted `new`.
    pub fn replace(&self, old: &Term, new: &Term) -> Term {
        if self == old {
            return new.clone();
        }
        match self {
            Term::Compound(name, subterms) => Term::Compound(
                name.clone(),
                subterms.iter().map(|st| st.replace(old, new)).collect(),
            ),
            Term::Var(_) => self.clone(),
            Term::Subst(base, pairs) => {
                Term::Subst(Box::new(base.replace(old, new)), pairs.clone())
            }
        }
    }

    /// Accumulate the string form of every atom reachable in this
    /// term. Variables contribute nothing; a substitution wrapper is
    /// expected to be resolved before its atoms are collected, so only
    /// its base term is visited.
    pub fn collect_atoms(&self, atoms: &mut HashSet<String>) {
        match self {
            Term::Compound(name, subterms) => {
                if subterms.is_empty() {
                    atoms.insert(name.clone());
                } else {
                    for subterm in subterms {
                        subterm.collect_atoms(atoms);
                    }
                }
            }
            Term::Var(_) => {}
            Term::Subst(base, _) => base.collect_atoms(atoms),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Compound(name, subterms) => {
                write!(f, "{}", name)?;
                if !subterms.is_empty() {
                    write!(f, "(")?;
                    for (i, subterm) in subterms.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", subterm)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            Term::Var(name) => write!(f, "{}", name),
            Term::Subst(base, pairs) => {
                write!(f, "{}[", base)?;
                for (i, (lhs, rhs)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} -> {}", lhs, rhs)?;
                }
                write!(f, "]")
            }
        }
    }
}

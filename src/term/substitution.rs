//! Variable bindings and term instantiation

use super::term::Term;
use std::collections::HashMap;

/// A unifier mapping variable names to bound terms.
///
/// Built incrementally by one-way matching; the first binding for a
/// variable wins, and there is no backtracking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unifier {
    pub map: HashMap<String, Term>,
}

impl Unifier {
    /// Create a new empty unifier
    pub fn new() -> Self {
        Unifier {
            map: HashMap::new(),
        }
    }

    /// Add a variable -> term binding
    pub fn insert(&mut self, name: String, term: Term) {
        self.map.insert(name, term);
    }

    /// Get the term bound to a variable, if any
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.map.get(name)
    }

    /// Check if a variable is bound
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Snapshot of the bindings in name order, for diagnostics
    pub fn bindings(&self) -> Vec<(String, Term)> {
        let mut pairs: Vec<_> = self
            .map
            .iter()
            .map(|(name, term)| (name.clone(), term.clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}

/// A substitution-wrapper replacement pair whose right-hand side
/// already occurs in the instance it would be applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveError {
    pub rhs: Term,
    pub instance: Term,
}

impl Term {
    /// Apply a unifier to this term. Bound variables are replaced by
    /// their bindings; unbound variables are left in place, so the
    /// caller can test the result for groundness. The replacement
    /// pairs of a substitution wrapper are carried through unresolved.
    pub fn instantiate(&self, unifier: &Unifier) -> Term {
        match self {
            Term::Compound(name, subterms) => Term::Compound(
                name.clone(),
                subterms.iter().map(|st| st.instantiate(unifier)).collect(),
            ),
            Term::Var(name) => unifier.get(name).cloned().unwrap_or_else(|| self.clone()),
            Term::Subst(base, pairs) => {
                Term::Subst(Box::new(base.instantiate(unifier)), pairs.clone())
            }
        }
    }

    /// Resolve any substitution wrappers in this term. Each pair of a
    /// wrapper is instantiated against the unifier and then applied in
    /// declared order to the instantiated base term. A pair whose
    /// resolved right-hand side already occurs in the current instance
    /// is rejected, so a replacement can never reintroduce itself.
    pub fn resolve_substs(&self, unifier: &Unifier) -> Result<Term, ResolveError> {
        match self {
            Term::Compound(name, subterms) => {
                let subterms = subterms
                    .iter()
                    .map(|st| st.resolve_substs(unifier))
                    .collect::<Result<_, _>>()?;
                Ok(Term::Compound(name.clone(), subterms))
            }
            Term::Var(_) => Ok(self.clone()),
            Term::Subst(base, pairs) => {
                let mut instance = base.instantiate(unifier);
                for (lhs, rhs) in pairs {
                    let lhs = lhs.instantiate(unifier);
                    let rhs = rhs.instantiate(unifier);
                    if instance.contains(&rhs) {
                        return Err(ResolveError { rhs, instance });
                    }
                    instance = instance.replace(&lhs, &rhs);
                }
                Ok(instance)
            }
        }
    }
}

//! Structured errors reported by the checker

use crate::term::Term;
use crate::unification::MatchError;
use std::fmt;

/// A failed check. Structure errors concern the shape of the proof;
/// reasoning errors concern its logical content. Both abort the whole
/// check; there is no partial success.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckError {
    Structure(StructureError),
    Reasoning(ReasoningError),
}

/// Violations of the proof's shape.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureError {
    /// The declared goal contains variables
    GoalNotGround { goal: Term },
    /// A step cites a rule that was never declared
    UnknownRule { step: String, rule: String },
    /// Block has a different number of cases than its block rule
    CaseCountMismatch {
        block: String,
        declared: usize,
        found: usize,
    },
    /// A case with no entries
    EmptyCase { block: String, case: usize },
    /// A case whose last entry is a nested block rather than a step
    CaseEndsWithBlock { block: String, case: usize },
    /// First step of a case does not cite the declared initial rule
    WrongInitialRule {
        block: String,
        case: usize,
        required: String,
        found: Option<String>,
    },
    /// Last step of a case does not cite the declared final rule
    WrongFinalRule {
        block: String,
        case: usize,
        required: String,
        found: String,
    },
    /// Cases of one block finish with different terms
    FinalTermMismatch {
        block: String,
        case: usize,
        expected: Term,
        found: Term,
    },
    /// A case-local atom appears in the case's final term
    LocalAtomEscapes { atom: String },
    /// Step argument count differs from the rule's hypothesis count
    HypothesisCountMismatch {
        step: String,
        rule: String,
        hypotheses: usize,
        arguments: usize,
    },
    /// An `atom` hypothesis was given a non-atom argument
    ArgumentNotAtom { step: String, argument: Term },
    /// A `nonlocal` hypothesis was given a term mentioning a local atom
    LocalAtomInNonlocal { step: String, atom: String },
    /// A `with` argument does not name a preceding step
    UnknownStep { step: String, name: String },
    /// A non-final step of an inner block cited from outside it
    NonFinalInnerStep { step: String, cited: String },
    /// A `unique` hypothesis argument was already used as an atom
    AtomAlreadyUsed { step: String, atom: String },
    /// Rule instantiation left variables in the conclusion
    ConclusionNotGround {
        step: String,
        rule: String,
        instance: Term,
    },
    /// A substitution pair would reintroduce its right-hand side
    SubstitutionReintroduces {
        step: String,
        rhs: Term,
        instance: Term,
    },
    /// The last step checked does not produce the declared goal
    GoalNotReached { goal: Term, last: Option<Term> },
}

/// Violations of the proof's logical content.
#[derive(Debug, Clone, PartialEq)]
pub enum ReasoningError {
    /// A hypothesis pattern failed to match its argument
    HypothesisMismatch {
        step: String,
        pattern: Term,
        term: Term,
        unifier: Vec<(String, Term)>,
        cause: MatchError,
    },
    /// The instantiated conclusion differs from the declared result
    ConclusionMismatch {
        step: String,
        rule: String,
        declared: Term,
        computed: Term,
        arguments: Vec<Term>,
    },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Structure(e) => write!(f, "{}", e),
            CheckError::Reasoning(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::GoalNotGround { goal } => {
                write!(f, "goal '{}' is not ground", goal)
            }
            StructureError::UnknownRule { step, rule } => {
                write!(f, "in {}, '{}' is not the name of a rule of inference", step, rule)
            }
            StructureError::CaseCountMismatch {
                block,
                declared,
                found,
            } => write!(
                f,
                "block {} must have the same number of cases as its block rule ({} declared, {} given)",
                block, declared, found
            ),
            StructureError::EmptyCase { block, case } => {
                write!(f, "case {} of {} has no steps", case, block)
            }
            StructureError::CaseEndsWithBlock { block, case } => {
                write!(f, "case {} of {} must finish with a step", case, block)
            }
            StructureError::WrongInitialRule {
                block,
                case,
                required,
                found,
            } => {
                write!(
                    f,
                    "initial step of case {} of {} must use rule {}",
                    case, block, required
                )?;
                match found {
                    Some(found) => write!(f, " (found {})", found),
                    None => write!(f, " (found a nested block)"),
                }
            }
            StructureError::WrongFinalRule {
                block,
                case,
                required,
                found,
            } => write!(
                f,
                "final step of case {} of {} must use rule {} (found {})",
                case, block, required, found
            ),
            StructureError::FinalTermMismatch {
                block,
                case,
                expected,
                found,
            } => write!(
                f,
                "cases of {} do not finish with the same term: case {} finishes with '{}', expected '{}'",
                block, case, found, expected
            ),
            StructureError::LocalAtomEscapes { atom } => write!(
                f,
                "local atom '{}' cannot be used in final step of case",
                atom
            ),
            StructureError::HypothesisCountMismatch {
                step,
                rule,
                hypotheses,
                arguments,
            } => write!(
                f,
                "in {}, number of arguments provided ({}) does not match number of hypotheses of {} ({})",
                step, arguments, rule, hypotheses
            ),
            StructureError::ArgumentNotAtom { step, argument } => {
                write!(f, "in {}, argument '{}' is not an atom", step, argument)
            }
            StructureError::LocalAtomInNonlocal { step, atom } => write!(
                f,
                "in {}, local atom '{}' cannot satisfy a nonlocal hypothesis",
                step, atom
            ),
            StructureError::UnknownStep { step, name } => write!(
                f,
                "in {}, '{}' is not the name of a preceding step",
                step, name
            ),
            StructureError::NonFinalInnerStep { step, cited } => {
                write!(f, "in {}, {} is a non-final step in an inner block", step, cited)
            }
            StructureError::AtomAlreadyUsed { step, atom } => write!(
                f,
                "in {}, '{}' has already been used as an atom in this proof",
                step, atom
            ),
            StructureError::ConclusionNotGround {
                step,
                rule,
                instance,
            } => write!(
                f,
                "in {}, not all variables were replaced instantiating {}: '{}'",
                step, rule, instance
            ),
            StructureError::SubstitutionReintroduces {
                step,
                rhs,
                instance,
            } => write!(
                f,
                "in {}, in substitution, '{}' already occurs in '{}'",
                step, rhs, instance
            ),
            StructureError::GoalNotReached { goal, last } => {
                write!(f, "proof does not reach goal '{}'", goal)?;
                if let Some(last) = last {
                    write!(f, " (last step produced '{}')", last)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ReasoningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasoningError::HypothesisMismatch {
                step,
                pattern,
                term,
                unifier,
                cause,
            } => {
                let bindings = unifier
                    .iter()
                    .map(|(name, term)| format!("{} -> {}", name, term))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "in {}, could not match '{}' with '{}' with unifier '{}': {}",
                    step, pattern, term, bindings, cause
                )
            }
            ReasoningError::ConclusionMismatch {
                step,
                rule,
                declared,
                computed,
                arguments,
            } => {
                let args = arguments
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" ; ");
                write!(
                    f,
                    "in {}, '{}' does not follow from {} with {} - it would be '{}'",
                    step, declared, rule, args, computed
                )
            }
        }
    }
}

impl std::error::Error for CheckError {}

impl From<StructureError> for CheckError {
    fn from(e: StructureError) -> Self {
        CheckError::Structure(e)
    }
}

impl From<ReasoningError> for CheckError {
    fn from(e: ReasoningError) -> Self {
        CheckError::Reasoning(e)
    }
}

//! Proof syntax tree
//!
//! Rules, block rules, and the block/case/step structure of a proof.
//! Steps and blocks live in index-addressed arenas on [`Proof`]; the
//! step-name index resolves a name to the step and its enclosing
//! block.

use crate::term::Term;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a step in the proof's step arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub usize);

/// Index of a block in the proof's block arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub usize);

/// Modifier tag on a rule hypothesis, controlling how its matching
/// argument is validated and scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HypAttr {
    /// Argument must be a zero-arity atom
    Atom,
    /// Atom argument is scoped to the enclosing case
    Local,
    /// Argument is a literal term, not a step reference
    Term,
    /// Term argument must not mention any case-local atom
    Nonlocal,
    /// Argument must not have been used as an atom before
    Unique,
}

impl HypAttr {
    /// Parse an attribute identifier as written in proof text.
    pub fn from_name(name: &str) -> Option<HypAttr> {
        match name {
            "atom" => Some(HypAttr::Atom),
            "local" => Some(HypAttr::Local),
            "term" => Some(HypAttr::Term),
            "nonlocal" => Some(HypAttr::Nonlocal),
            "unique" => Some(HypAttr::Unique),
            _ => None,
        }
    }
}

/// One premise slot of a rule. Without an `atom` or `term` attribute
/// the hypothesis is satisfied by a prior step's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub pattern: Term,
    pub attrs: Vec<HypAttr>,
}

impl Hypothesis {
    pub fn has(&self, attr: HypAttr) -> bool {
        self.attrs.contains(&attr)
    }
}

/// A rule of inference: hypotheses and a conclusion schema. A rule
/// declared with a substitution list has its conclusion wrapped in
/// [`Term::Subst`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub hypotheses: Vec<Hypothesis>,
    pub conclusion: Term,
}

/// One declared case of a block rule: the rule the case's first step
/// must cite, and optionally the rule its last step must cite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRuleCase {
    pub initial: Option<String>,
    pub final_: Option<String>,
}

impl BlockRuleCase {
    /// A case with no initial or final constraint.
    pub fn open() -> Self {
        BlockRuleCase {
            initial: None,
            final_: None,
        }
    }
}

/// The shape contract for blocks of a given name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRule {
    pub name: String,
    pub cases: Vec<BlockRuleCase>,
}

/// A proof step: a named result term justified by a rule applied to
/// `with` arguments (terms, or variables naming earlier steps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub term: Term,
    pub rule: String,
    pub args: Vec<Term>,
}

/// An entry in a case: either a step or a nested block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseItem {
    Step(StepId),
    Block(BlockId),
}

/// An ordered list of steps and nested blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub items: Vec<CaseItem>,
}

impl Case {
    /// The final step of this case, if the case ends with a step.
    pub fn last_step(&self) -> Option<StepId> {
        match self.items.last() {
            Some(CaseItem::Step(step)) => Some(*step),
            _ => None,
        }
    }

    /// The first step of this case, if the case opens with a step.
    pub fn first_step(&self) -> Option<StepId> {
        match self.items.first() {
            Some(CaseItem::Step(step)) => Some(*step),
            _ => None,
        }
    }
}

/// A group of parallel cases, checked against the block rule named by
/// `name`. The proof's implicit root block has no name and level 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub name: Option<String>,
    pub level: usize,
    pub cases: Vec<Case>,
}

/// A complete parsed proof, ready for checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    pub rules: IndexMap<String, Rule>,
    pub block_rules: IndexMap<String, BlockRule>,
    pub goal: Term,
    pub steps: Vec<Step>,
    pub blocks: Vec<Block>,
    pub root: BlockId,
    pub step_index: HashMap<String, (StepId, BlockId)>,
}

impl Proof {
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn block_rule(&self, name: &str) -> Option<&BlockRule> {
        self.block_rules.get(name)
    }

    pub fn step(&self, id: StepId) -> &Step {
        &self.steps[id.0]
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    /// Resolve a step name to the step and its enclosing block.
    pub fn find_step(&self, name: &str) -> Option<(StepId, BlockId)> {
        self.step_index.get(name).copied()
    }

    /// True if `step` is the last entry of one of `block`'s cases,
    /// looking through nested blocks at the end of a case.
    pub fn has_as_last_step(&self, block: BlockId, step: StepId) -> bool {
        self.block(block).cases.iter().any(|case| match case.items.last() {
            Some(CaseItem::Step(last)) => *last == step,
            Some(CaseItem::Block(inner)) => self.has_as_last_step(*inner, step),
            None => false,
        })
    }
}

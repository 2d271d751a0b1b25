//! Structural and semantic checking of parsed proofs
//!
//! The checker walks the proof's block/case/step tree depth-first.
//! Each block is validated against its block rule (case count,
//! required initial/final rules, agreeing final terms), each step is
//! validated as an instance of the rule it cites, and the last step
//! checked must produce the declared goal. Atom scoping is enforced
//! along the way: `local` atoms must not escape their case, and
//! `unique` atoms may be consumed only once per proof.

pub mod error;

pub use error::{CheckError, ReasoningError, StructureError};

use crate::ast::{Block, BlockId, BlockRuleCase, Case, CaseItem, HypAttr, Proof, StepId};
use crate::term::{Term, Unifier};
use crate::unification::match_term;
use std::collections::HashSet;

/// Check a proof. Returns `Ok(())` iff every step is a valid instance
/// of its rule, every block satisfies its block rule, and the final
/// step produces the declared goal.
pub fn check(proof: &Proof) -> Result<(), CheckError> {
    Checker::new(proof).run()
}

/// One-shot checker over a parsed proof. The used-atom set and the
/// last step examined persist across the whole traversal; local-atom
/// sets are scoped to a block and restored by call-stack unwinding.
pub struct Checker<'a> {
    proof: &'a Proof,
    used_atoms: HashSet<String>,
    last_step: Option<StepId>,
}

impl<'a> Checker<'a> {
    pub fn new(proof: &'a Proof) -> Self {
        Checker {
            proof,
            used_atoms: HashSet::new(),
            last_step: None,
        }
    }

    /// Run the check to completion.
    pub fn run(&mut self) -> Result<(), CheckError> {
        let proof = self.proof;
        if !proof.goal.is_ground() {
            return Err(StructureError::GoalNotGround {
                goal: proof.goal.clone(),
            }
            .into());
        }
        self.check_block(proof.root)?;
        match self.last_step.map(|id| &proof.step(id).term) {
            Some(last) if *last == proof.goal => Ok(()),
            last => Err(StructureError::GoalNotReached {
                goal: proof.goal.clone(),
                last: last.cloned(),
            }
            .into()),
        }
    }

    fn check_block(&mut self, block_id: BlockId) -> Result<(), CheckError> {
        let proof = self.proof;
        let block = proof.block(block_id);
        let label = block_label(block);

        // The unnamed root, and any block whose name has no declared
        // block rule, answer to a synthetic single open case.
        let open = [BlockRuleCase::open()];
        let declared: &[BlockRuleCase] = match block.name.as_ref().and_then(|n| proof.block_rule(n))
        {
            Some(block_rule) => &block_rule.cases,
            None => &open,
        };
        if declared.len() != block.cases.len() {
            return Err(StructureError::CaseCountMismatch {
                block: label,
                declared: declared.len(),
                found: block.cases.len(),
            }
            .into());
        }

        let mut local_atoms = HashSet::new();
        let mut final_term: Option<&Term> = None;
        for (num, (declared_case, case)) in declared.iter().zip(block.cases.iter()).enumerate() {
            let case_num = num + 1;
            self.check_case(block_id, case_num, declared_case, case, &mut local_atoms)?;
            // check_case guarantees the case ends with a step.
            let term = &proof.step(case.last_step().unwrap()).term;
            match final_term {
                None => final_term = Some(term),
                Some(expected) if expected == term => {}
                Some(expected) => {
                    return Err(StructureError::FinalTermMismatch {
                        block: label,
                        case: case_num,
                        expected: expected.clone(),
                        found: term.clone(),
                    }
                    .into())
                }
            }
        }
        Ok(())
    }

    fn check_case(
        &mut self,
        block_id: BlockId,
        case_num: usize,
        declared: &BlockRuleCase,
        case: &Case,
        local_atoms: &mut HashSet<String>,
    ) -> Result<(), CheckError> {
        let proof = self.proof;
        let label = block_label(proof.block(block_id));

        if case.items.is_empty() {
            return Err(StructureError::EmptyCase {
                block: label,
                case: case_num,
            }
            .into());
        }
        let last_step = case.last_step().ok_or(StructureError::CaseEndsWithBlock {
            block: label.clone(),
            case: case_num,
        })?;

        if let Some(required) = &declared.initial {
            let found = case.first_step().map(|id| proof.step(id).rule.clone());
            if found.as_deref() != Some(required.as_str()) {
                return Err(StructureError::WrongInitialRule {
                    block: label,
                    case: case_num,
                    required: required.clone(),
                    found,
                }
                .into());
            }
        }
        if let Some(required) = &declared.final_ {
            let found = &proof.step(last_step).rule;
            if found != required {
                return Err(StructureError::WrongFinalRule {
                    block: label,
                    case: case_num,
                    required: required.clone(),
                    found: found.clone(),
                }
                .into());
            }
        }

        for item in &case.items {
            match item {
                CaseItem::Step(step) => self.check_step(*step, block_id, local_atoms)?,
                CaseItem::Block(inner) => self.check_block(*inner)?,
            }
        }

        let mut final_atoms = HashSet::new();
        proof.step(last_step).term.collect_atoms(&mut final_atoms);
        let mut escaped: Vec<_> = local_atoms.intersection(&final_atoms).collect();
        escaped.sort();
        if let Some(atom) = escaped.first() {
            return Err(StructureError::LocalAtomEscapes {
                atom: (*atom).clone(),
            }
            .into());
        }
        Ok(())
    }

    fn check_step(
        &mut self,
        step_id: StepId,
        block_id: BlockId,
        local_atoms: &mut HashSet<String>,
    ) -> Result<(), CheckError> {
        self.last_step = Some(step_id);
        let proof = self.proof;
        let step = proof.step(step_id);
        let rule = proof.rule(&step.rule).ok_or(StructureError::UnknownRule {
            step: step.name.clone(),
            rule: step.rule.clone(),
        })?;

        if rule.hypotheses.len() != step.args.len() {
            return Err(StructureError::HypothesisCountMismatch {
                step: step.name.clone(),
                rule: rule.name.clone(),
                hypotheses: rule.hypotheses.len(),
                arguments: step.args.len(),
            }
            .into());
        }

        let mut unifier = Unifier::new();
        let mut resolved_args = Vec::with_capacity(step.args.len());
        for (hypothesis, arg) in rule.hypotheses.iter().zip(step.args.iter()) {
            let resolved = if hypothesis.has(HypAttr::Atom) {
                if !arg.is_atom() {
                    return Err(StructureError::ArgumentNotAtom {
                        step: step.name.clone(),
                        argument: arg.clone(),
                    }
                    .into());
                }
                match_term(&hypothesis.pattern, arg, &mut unifier).map_err(|cause| {
                    ReasoningError::HypothesisMismatch {
                        step: step.name.clone(),
                        pattern: hypothesis.pattern.clone(),
                        term: arg.clone(),
                        unifier: unifier.bindings(),
                        cause,
                    }
                })?;
                if hypothesis.has(HypAttr::Local) {
                    local_atoms.insert(arg.to_string());
                }
                arg.clone()
            } else if hypothesis.has(HypAttr::Term) {
                match_term(&hypothesis.pattern, arg, &mut unifier).map_err(|cause| {
                    ReasoningError::HypothesisMismatch {
                        step: step.name.clone(),
                        pattern: hypothesis.pattern.clone(),
                        term: arg.clone(),
                        unifier: unifier.bindings(),
                        cause,
                    }
                })?;
                if hypothesis.has(HypAttr::Nonlocal) {
                    let mut atoms = HashSet::new();
                    arg.collect_atoms(&mut atoms);
                    let mut hits: Vec<_> = atoms.intersection(local_atoms).collect();
                    hits.sort();
                    if let Some(atom) = hits.first() {
                        return Err(StructureError::LocalAtomInNonlocal {
                            step: step.name.clone(),
                            atom: (*atom).clone(),
                        }
                        .into());
                    }
                }
                arg.clone()
            } else {
                // The hypothesis denotes a prior proof result.
                let name = match arg {
                    Term::Var(name) => name,
                    _ => {
                        return Err(StructureError::UnknownStep {
                            step: step.name.clone(),
                            name: arg.to_string(),
                        }
                        .into())
                    }
                };
                let (cited_id, from_block) =
                    proof.find_step(name).ok_or(StructureError::UnknownStep {
                        step: step.name.clone(),
                        name: name.clone(),
                    })?;
                let level = proof.block(block_id).level;
                let from_level = proof.block(from_block).level;
                if from_level > level && !proof.has_as_last_step(from_block, cited_id) {
                    return Err(StructureError::NonFinalInnerStep {
                        step: step.name.clone(),
                        cited: name.clone(),
                    }
                    .into());
                }
                let cited = proof.step(cited_id);
                match_term(&hypothesis.pattern, &cited.term, &mut unifier).map_err(|cause| {
                    ReasoningError::HypothesisMismatch {
                        step: step.name.clone(),
                        pattern: hypothesis.pattern.clone(),
                        term: cited.term.clone(),
                        unifier: unifier.bindings(),
                        cause,
                    }
                })?;
                cited.term.clone()
            };

            if hypothesis.has(HypAttr::Unique) && self.used_atoms.contains(&resolved.to_string()) {
                return Err(StructureError::AtomAlreadyUsed {
                    step: step.name.clone(),
                    atom: resolved.to_string(),
                }
                .into());
            }
            resolved_args.push(resolved);
        }

        let mut instance = rule.conclusion.instantiate(&unifier);
        if !instance.is_ground() && !matches!(instance, Term::Subst(_, _)) {
            // Conclusion variables no hypothesis covered are bound by
            // the step's declared result; a clash there is already the
            // conclusion failing to produce the declared term. The
            // declared term must be ground here: matching against one
            // that is not could bind a variable to itself.
            if !step.term.is_ground() {
                return Err(StructureError::ConclusionNotGround {
                    step: step.name.clone(),
                    rule: rule.name.clone(),
                    instance,
                }
                .into());
            }
            match match_term(&instance, &step.term, &mut unifier) {
                Ok(()) => instance = instance.instantiate(&unifier),
                Err(_) => {
                    return Err(ReasoningError::ConclusionMismatch {
                        step: step.name.clone(),
                        rule: rule.name.clone(),
                        declared: step.term.clone(),
                        computed: instance.instantiate(&unifier),
                        arguments: resolved_args,
                    }
                    .into())
                }
            }
        }
        if !instance.is_ground() {
            return Err(StructureError::ConclusionNotGround {
                step: step.name.clone(),
                rule: rule.name.clone(),
                instance,
            }
            .into());
        }
        let instance =
            instance
                .resolve_substs(&unifier)
                .map_err(|e| StructureError::SubstitutionReintroduces {
                    step: step.name.clone(),
                    rhs: e.rhs,
                    instance: e.instance,
                })?;

        if instance != step.term {
            return Err(ReasoningError::ConclusionMismatch {
                step: step.name.clone(),
                rule: rule.name.clone(),
                declared: step.term.clone(),
                computed: instance,
                arguments: resolved_args,
            }
            .into());
        }

        step.term.collect_atoms(&mut self.used_atoms);
        Ok(())
    }
}

fn block_label(block: &Block) -> String {
    match &block.name {
        Some(name) => name.clone(),
        None => "proof".to_string(),
    }
}

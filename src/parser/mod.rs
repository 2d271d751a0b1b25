//! Parser for the proof language
//!
//! Grammar:
//!
//! ```text
//! Proof         ::= "given" {Rule | BlockRule} "show" Term "proof" {Step | Block} "qed".
//! Rule          ::= Var "=" [Hyp {";" Hyp}] "|-" Term ["[" Subst {"," Subst} "]"].
//! BlockRule     ::= "block" Var {BlockRuleCase} "end".
//! BlockRuleCase ::= "case" Rule [Rule] "end".
//! Hyp           ::= Term Attributes.
//! Attributes    ::= ["{" {Atom} "}"].
//! Subst         ::= Term "->" Term.
//! Block         ::= "block" Var {BlockCase} "end".
//! BlockCase     ::= "case" {Step | Block} "end".
//! Step          ::= Var "=" Term "by" Var ["with" Term {"," Term}].
//! Term          ::= Var | Atom ["(" Term {"," Term} ")"].
//! ```
//!
//! Variables are uppercase-initial, atoms lowercase- or digit-initial,
//! and `//` starts a comment running to end of line. Parsing happens
//! in two passes: nom combinators build a raw tree, and a build pass
//! validates names and assembles the arena-based [`Proof`].

use crate::ast::{
    Block, BlockId, BlockRule, BlockRuleCase, Case, CaseItem, HypAttr, Hypothesis, Proof, Rule,
    Step, StepId,
};
use crate::term::Term;
use indexmap::IndexMap;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{multispace1, not_line_ending, satisfy},
    combinator::{map, opt, recognize, value, verify},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded},
    IResult,
};
use std::collections::HashMap;

/// Parse a complete proof text.
pub fn parse_proof(input: &str) -> Result<Proof, String> {
    let (rest, raw) = proof(input).map_err(|e| format!("parse error: {}", e))?;
    let (rest, _) = sp(rest).map_err(|e| format!("parse error: {}", e))?;
    if !rest.is_empty() {
        return Err(format!("unexpected input near '{}'", near(rest)));
    }
    Builder::default().build(raw)
}

fn near(input: &str) -> String {
    input.chars().take(10).collect()
}

// ---------------------------------------------------------------------------
// Raw tree produced by the combinators

#[derive(Debug)]
struct RawProof {
    decls: Vec<RawDecl>,
    goal: Term,
    items: Vec<RawItem>,
}

#[derive(Debug)]
enum RawDecl {
    Rule(RawRule),
    BlockRule(RawBlockRule),
}

#[derive(Debug)]
struct RawRule {
    name: String,
    hypotheses: Vec<RawHyp>,
    conclusion: Term,
    substs: Vec<(Term, Term)>,
}

#[derive(Debug)]
struct RawHyp {
    pattern: Term,
    attrs: Vec<String>,
}

#[derive(Debug)]
struct RawBlockRule {
    name: String,
    cases: Vec<(RawRule, Option<RawRule>)>,
}

#[derive(Debug)]
enum RawItem {
    Step(RawStep),
    Block(RawBlock),
}

#[derive(Debug)]
struct RawStep {
    name: String,
    term: Term,
    rule: String,
    args: Vec<Term>,
}

#[derive(Debug)]
struct RawBlock {
    name: String,
    cases: Vec<Vec<RawItem>>,
}

// ---------------------------------------------------------------------------
// Lexical layer

/// Skip whitespace and `//` comments.
fn sp(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), pair(tag("//"), not_line_ending)),
        ))),
    )(input)
}

/// An identifier word: alphanumeric-initial, then alphanumerics and
/// underscores.
fn word(input: &str) -> IResult<&str, &str> {
    preceded(
        sp,
        recognize(pair(
            satisfy(|c: char| c.is_ascii_alphanumeric()),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
    )(input)
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    verify(word, move |w: &str| w == kw)
}

fn sym<'a>(s: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(sp, tag(s))
}

fn variable_name(input: &str) -> IResult<&str, String> {
    map(
        verify(word, |w: &str| {
            w.starts_with(|c: char| c.is_ascii_uppercase())
        }),
        str::to_string,
    )(input)
}

fn atom_name(input: &str) -> IResult<&str, String> {
    map(
        verify(word, |w: &str| {
            w.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
        }),
        str::to_string,
    )(input)
}

// ---------------------------------------------------------------------------
// Grammar

fn term(input: &str) -> IResult<&str, Term> {
    alt((
        map(variable_name, Term::Var),
        map(
            pair(
                atom_name,
                opt(delimited(
                    sym("("),
                    separated_list1(sym(","), term),
                    sym(")"),
                )),
            ),
            |(name, subterms)| Term::Compound(name, subterms.unwrap_or_default()),
        ),
    ))(input)
}

fn hyp(input: &str) -> IResult<&str, RawHyp> {
    let (input, pattern) = term(input)?;
    let (input, attrs) = opt(delimited(sym("{"), many0(word), sym("}")))(input)?;
    let attrs = attrs
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string)
        .collect();
    Ok((input, RawHyp { pattern, attrs }))
}

fn subst_pair(input: &str) -> IResult<&str, (Term, Term)> {
    let (input, lhs) = term(input)?;
    let (input, _) = sym("->")(input)?;
    let (input, rhs) = term(input)?;
    Ok((input, (lhs, rhs)))
}

fn rule(input: &str) -> IResult<&str, RawRule> {
    let (input, name) = variable_name(input)?;
    let (input, _) = sym("=")(input)?;
    let (input, hypotheses) = separated_list0(sym(";"), hyp)(input)?;
    let (input, _) = sym("|-")(input)?;
    let (input, conclusion) = term(input)?;
    let (input, substs) = opt(delimited(
        sym("["),
        separated_list1(sym(","), subst_pair),
        sym("]"),
    ))(input)?;
    Ok((
        input,
        RawRule {
            name,
            hypotheses,
            conclusion,
            substs: substs.unwrap_or_default(),
        },
    ))
}

fn block_rule_case(input: &str) -> IResult<&str, (RawRule, Option<RawRule>)> {
    let (input, _) = keyword("case")(input)?;
    let (input, initial) = rule(input)?;
    let (input, final_) = opt(rule)(input)?;
    let (input, _) = keyword("end")(input)?;
    Ok((input, (initial, final_)))
}

fn block_rule(input: &str) -> IResult<&str, RawBlockRule> {
    let (input, _) = keyword("block")(input)?;
    let (input, name) = variable_name(input)?;
    let (input, cases) = many0(block_rule_case)(input)?;
    let (input, _) = keyword("end")(input)?;
    Ok((input, RawBlockRule { name, cases }))
}

fn decl(input: &str) -> IResult<&str, RawDecl> {
    alt((
        map(block_rule, RawDecl::BlockRule),
        map(rule, RawDecl::Rule),
    ))(input)
}

fn step(input: &str) -> IResult<&str, RawStep> {
    let (input, name) = variable_name(input)?;
    let (input, _) = sym("=")(input)?;
    let (input, term_) = term(input)?;
    let (input, _) = keyword("by")(input)?;
    let (input, rule) = variable_name(input)?;
    let (input, args) = opt(preceded(
        keyword("with"),
        separated_list1(sym(","), term),
    ))(input)?;
    Ok((
        input,
        RawStep {
            name,
            term: term_,
            rule,
            args: args.unwrap_or_default(),
        },
    ))
}

fn block_case(input: &str) -> IResult<&str, Vec<RawItem>> {
    delimited(keyword("case"), many0(item), keyword("end"))(input)
}

fn block(input: &str) -> IResult<&str, RawBlock> {
    let (input, _) = keyword("block")(input)?;
    let (input, name) = variable_name(input)?;
    let (input, cases) = many0(block_case)(input)?;
    let (input, _) = keyword("end")(input)?;
    Ok((input, RawBlock { name, cases }))
}

fn item(input: &str) -> IResult<&str, RawItem> {
    alt((map(block, RawItem::Block), map(step, RawItem::Step)))(input)
}

fn proof(input: &str) -> IResult<&str, RawProof> {
    let (input, _) = keyword("given")(input)?;
    let (input, decls) = many0(decl)(input)?;
    let (input, _) = keyword("show")(input)?;
    let (input, goal) = term(input)?;
    let (input, _) = keyword("proof")(input)?;
    let (input, items) = many0(item)(input)?;
    let (input, _) = keyword("qed")(input)?;
    Ok((input, RawProof { decls, goal, items }))
}

// ---------------------------------------------------------------------------
// Build pass: name validation and arena assembly

#[derive(Default)]
struct Builder {
    rules: IndexMap<String, Rule>,
    block_rules: IndexMap<String, BlockRule>,
    steps: Vec<Step>,
    blocks: Vec<Block>,
    step_index: HashMap<String, (StepId, BlockId)>,
}

impl Builder {
    fn build(mut self, raw: RawProof) -> Result<Proof, String> {
        for decl in raw.decls {
            match decl {
                RawDecl::Rule(rule) => {
                    self.add_rule(rule)?;
                }
                RawDecl::BlockRule(block_rule) => self.add_block_rule(block_rule)?,
            }
        }

        let root = self.add_block(None, 0, vec![raw.items])?;
        Ok(Proof {
            rules: self.rules,
            block_rules: self.block_rules,
            goal: raw.goal,
            steps: self.steps,
            blocks: self.blocks,
            root,
            step_index: self.step_index,
        })
    }

    fn add_rule(&mut self, raw: RawRule) -> Result<String, String> {
        let mut hypotheses = Vec::with_capacity(raw.hypotheses.len());
        for hyp in raw.hypotheses {
            let mut attrs = Vec::with_capacity(hyp.attrs.len());
            for attr in &hyp.attrs {
                let attr = HypAttr::from_name(attr)
                    .ok_or_else(|| format!("unknown hypothesis attribute '{}'", attr))?;
                attrs.push(attr);
            }
            hypotheses.push(Hypothesis {
                pattern: hyp.pattern,
                attrs,
            });
        }
        let conclusion = if raw.substs.is_empty() {
            raw.conclusion
        } else {
            Term::Subst(Box::new(raw.conclusion), raw.substs)
        };
        let rule = Rule {
            name: raw.name.clone(),
            hypotheses,
            conclusion,
        };
        if self.rules.insert(raw.name.clone(), rule).is_some() {
            return Err(format!(
                "name '{}' has already been used for a rule of inference",
                raw.name
            ));
        }
        Ok(raw.name)
    }

    fn add_block_rule(&mut self, raw: RawBlockRule) -> Result<(), String> {
        let mut cases = Vec::with_capacity(raw.cases.len());
        for (initial, final_) in raw.cases {
            let initial = self.add_rule(initial)?;
            let final_ = match final_ {
                Some(rule) => Some(self.add_rule(rule)?),
                None => None,
            };
            cases.push(BlockRuleCase {
                initial: Some(initial),
                final_,
            });
        }
        let name = raw.name.clone();
        let block_rule = BlockRule {
            name: name.clone(),
            cases,
        };
        if self.block_rules.insert(name.clone(), block_rule).is_some() {
            return Err(format!(
                "name '{}' has already been used for a block rule",
                name
            ));
        }
        Ok(())
    }

    fn add_block(
        &mut self,
        name: Option<String>,
        level: usize,
        cases: Vec<Vec<RawItem>>,
    ) -> Result<BlockId, String> {
        // Reserve the slot first so steps can record their block.
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block {
            name,
            level,
            cases: vec![],
        });
        let mut built = Vec::with_capacity(cases.len());
        for items in cases {
            let mut case = Vec::with_capacity(items.len());
            for raw_item in items {
                match raw_item {
                    RawItem::Step(step) => case.push(CaseItem::Step(self.add_step(step, id)?)),
                    RawItem::Block(inner) => case.push(CaseItem::Block(self.add_block(
                        Some(inner.name),
                        level + 1,
                        inner.cases,
                    )?)),
                }
            }
            built.push(Case { items: case });
        }
        self.blocks[id.0].cases = built;
        Ok(id)
    }

    fn add_step(&mut self, raw: RawStep, block: BlockId) -> Result<StepId, String> {
        if self.rules.contains_key(&raw.name) {
            return Err(format!(
                "name '{}' has already been used for a rule of inference",
                raw.name
            ));
        }
        if self.step_index.contains_key(&raw.name) {
            return Err(format!("name '{}' has already been used for a step", raw.name));
        }
        // A variable argument must refer back to an earlier step; term
        // arguments are passed through for the checker to interpret.
        for arg in &raw.args {
            if let Term::Var(name) = arg {
                if !self.step_index.contains_key(name) {
                    return Err(format!(
                        "in step '{}': step name '{}' in with is not the name of a preceding step",
                        raw.name, name
                    ));
                }
            }
        }
        let id = StepId(self.steps.len());
        self.steps.push(Step {
            name: raw.name.clone(),
            term: raw.term,
            rule: raw.rule,
            args: raw.args,
        });
        self.step_index.insert(raw.name, (id, block));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFL: &str = "
        given
        Refl = |- eq(X, X)
        show eq(a, a)
        proof
        S1 = eq(a, a) by Refl
        qed
    ";

    #[test]
    fn test_parse_minimal_proof() {
        let proof = parse_proof(REFL).unwrap();
        assert_eq!(proof.rules.len(), 1);
        assert_eq!(proof.goal, Term::compound("eq", vec![Term::atom("a"), Term::atom("a")]));
        assert_eq!(proof.steps.len(), 1);
        assert_eq!(proof.steps[0].name, "S1");
        assert_eq!(proof.steps[0].rule, "Refl");
        let root = proof.block(proof.root);
        assert_eq!(root.level, 0);
        assert_eq!(root.name, None);
        assert_eq!(root.cases.len(), 1);
    }

    #[test]
    fn test_parse_rule_with_hypotheses_and_attributes() {
        let text = "
            given
            Mp = impl(P, Q); P |- Q
            Intro = A {atom local unique} |- fresh(A)
            show a
            proof
            qed
        ";
        let proof = parse_proof(text).unwrap();
        let mp = proof.rule("Mp").unwrap();
        assert_eq!(mp.hypotheses.len(), 2);
        assert!(mp.hypotheses[0].attrs.is_empty());
        let intro = proof.rule("Intro").unwrap();
        assert_eq!(
            intro.hypotheses[0].attrs,
            vec![HypAttr::Atom, HypAttr::Local, HypAttr::Unique]
        );
    }

    #[test]
    fn test_parse_substitution_list_wraps_conclusion() {
        let text = "
            given
            Repl = eq(A, B) {term}; T {term} |- T [A -> B]
            show a
            proof
            qed
        ";
        let proof = parse_proof(text).unwrap();
        let rule = proof.rule("Repl").unwrap();
        match &rule.conclusion {
            Term::Subst(base, pairs) => {
                assert_eq!(**base, Term::var("T"));
                assert_eq!(pairs, &vec![(Term::var("A"), Term::var("B"))]);
            }
            other => panic!("expected substitution wrapper, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_block_rule_registers_inline_rules() {
        let text = "
            given
            block Split
              case
                Left = |- left
                Done = X |- finished
              end
              case
                Right = |- right
              end
            end
            show finished
            proof
            qed
        ";
        let proof = parse_proof(text).unwrap();
        let block_rule = proof.block_rule("Split").unwrap();
        assert_eq!(block_rule.cases.len(), 2);
        assert_eq!(block_rule.cases[0].initial.as_deref(), Some("Left"));
        assert_eq!(block_rule.cases[0].final_.as_deref(), Some("Done"));
        assert_eq!(block_rule.cases[1].final_, None);
        assert!(proof.rule("Left").is_some());
        assert!(proof.rule("Done").is_some());
        assert!(proof.rule("Right").is_some());
    }

    #[test]
    fn test_parse_nested_blocks_assign_levels() {
        let text = "
            given
            R = |- a
            block Outer case O1 = |- a end end
            block Inner case I1 = |- a end end
            show a
            proof
            block Outer
              case
                S1 = a by R
                block Inner
                  case
                    S2 = a by R
                  end
                end
                S3 = a by R
              end
            end
            qed
        ";
        let proof = parse_proof(text).unwrap();
        assert_eq!(proof.block(proof.root).level, 0);
        let (_, outer) = proof.find_step("S1").unwrap();
        let (_, inner) = proof.find_step("S2").unwrap();
        assert_eq!(proof.block(outer).level, 1);
        assert_eq!(proof.block(inner).level, 2);
    }

    #[test]
    fn test_comments_and_whitespace() {
        let text = "
            given // the one rule
            Refl = |- eq(X, X)
            show eq(a, a) // the goal
            proof
            S1 = eq(a, a) by Refl
            qed
        ";
        assert!(parse_proof(text).is_ok());
    }

    #[test]
    fn test_duplicate_rule_name_rejected() {
        let text = "
            given
            R = |- a
            R = |- b
            show a
            proof
            qed
        ";
        let err = parse_proof(text).unwrap_err();
        assert!(err.contains("already been used for a rule"));
    }

    #[test]
    fn test_duplicate_step_name_rejected() {
        let text = "
            given
            R = |- a
            show a
            proof
            S1 = a by R
            S1 = a by R
            qed
        ";
        let err = parse_proof(text).unwrap_err();
        assert!(err.contains("already been used for a step"));
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let text = "
            given
            R = A {shiny} |- a
            show a
            proof
            qed
        ";
        let err = parse_proof(text).unwrap_err();
        assert!(err.contains("unknown hypothesis attribute"));
    }

    #[test]
    fn test_forward_step_reference_rejected() {
        let text = "
            given
            R = |- a
            S = P |- b
            show b
            proof
            S2 = b by S with S9
            qed
        ";
        let err = parse_proof(text).unwrap_err();
        assert!(err.contains("not the name of a preceding step"));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let err = parse_proof("given R = |- a show a proof qed leftover").unwrap_err();
        assert!(err.contains("unexpected input"));
    }
}

//! This module contains the machinery shared by the detectors that look for
//! approving paths missing some kind of check.
//!
//! Such a detector is described by a guard, which is a predicate over the
//! conditions established along a path. A path is unguarded if it approves the
//! transaction without establishing any condition that satisfies the guard.
//!
//! Before enumerating paths, a dataflow pass checks whether the guard is
//! established on every path to every block that can approve. When it is, there
//! are no unguarded paths and enumeration is skipped entirely.

use std::collections::BTreeSet;

use crate::{
    analysis::{
        dataflow::must_facts,
        paths::{enumerate, Path},
        roots,
        symbolic::{self, Condition, Summary, Value},
        Context,
        DeadBlockPolicy,
    },
    cfg::BlockId,
    contract::Contract,
    detector::{Finding, Severity},
    error::detection::Result,
    field::{GlobalField, TransactionField},
};

/// Enumerates the paths from each root of `contract` that may approve the
/// transaction, along with the summary of evaluating them.
///
/// # Errors
///
/// Returns [`Err`] if path enumeration fails.
pub fn approving_paths(contract: &Contract, context: &Context) -> Result<Vec<(Path, Summary)>> {
    let mut approving = Vec::new();
    for root in roots(contract, context.dead_block_policy()) {
        for (iteration, path) in enumerate(contract, root, context)?.into_iter().enumerate() {
            if let Some(block) = path.last().and_then(|b| contract.block(b)) {
                context.poll(iteration, block.last_line())?;
            }
            let summary = symbolic::evaluate(contract, &path);
            if summary.approves() {
                approving.push((path, summary));
            }
        }
    }

    Ok(approving)
}

/// Checks whether every path to every block that can approve the transaction
/// establishes a condition satisfying `guard`.
///
/// This is always `false` when dead blocks are being analysed, as they have no
/// paths from the entry.
///
/// # Errors
///
/// Returns [`Err`] if the dataflow analysis fails.
pub fn guarded_everywhere(
    contract: &Contract,
    context: &Context,
    guard: &impl Fn(&Condition) -> bool,
) -> Result<bool> {
    if context.dead_block_policy() == DeadBlockPolicy::Report {
        return Ok(false);
    }

    let cfg = contract.cfg();
    let gen = |from: BlockId, to: Option<BlockId>| -> BTreeSet<()> {
        if symbolic::block_conditions(contract, from, to).iter().any(guard) {
            BTreeSet::from([()])
        } else {
            BTreeSet::new()
        }
    };
    let facts = must_facts(contract, context, &gen)?;

    for block in cfg.blocks() {
        let id = block.id();
        if block.is_dead() || !block.successors().is_empty() || facts.at_entry(id).is_none() {
            continue;
        }
        if symbolic::block_rejects(contract, id) {
            continue;
        }
        if !facts.holds_at_entry(id, &()) && gen(id, None).is_empty() {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Reports one finding for each approving path of `contract` that is
/// `relevant` but establishes no condition satisfying `guard`.
///
/// # Errors
///
/// Returns [`Err`] if the underlying analyses fail.
pub fn unguarded_paths(
    contract: &Contract,
    context: &Context,
    report: &Report<'_>,
    guard: impl Fn(&Condition) -> bool,
    relevant: impl Fn(&Summary) -> bool,
) -> Result<Vec<Finding>> {
    if guarded_everywhere(contract, context, &guard)? {
        log::debug!("Every approving path through the program satisfies the guard of {}", report.detector);
        return Ok(Vec::new());
    }

    Ok(approving_paths(contract, context)?
        .into_iter()
        .filter(|(_, summary)| relevant(summary) && !summary.requires(&guard))
        .map(|(path, _)| report.finding().on_path(contract, &path))
        .collect())
}

/// The information needed to report a finding.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Report<'a> {
    pub detector:    &'a str,
    pub severity:    Severity,
    pub description: &'a str,
}

impl Report<'_> {
    #[must_use]
    pub fn finding(&self) -> Finding {
        Finding::new(self.detector, self.severity, self.description)
    }
}

/// Checks whether `condition` requires the sender to be the creator of the
/// application.
#[must_use]
pub fn checks_creator(condition: &Condition) -> bool {
    condition.implies_equality(is_sender, |v| *v == Value::Global(GlobalField::CreatorAddress))
}

/// Checks whether `condition` requires the sender to be some particular
/// account.
///
/// This is the creator, an address stored in global state, or a constant
/// address.
#[must_use]
pub fn checks_sender(condition: &Condition) -> bool {
    condition.implies_equality(is_sender, |v| {
        matches!(
            v,
            Value::Global(GlobalField::CreatorAddress)
                | Value::GlobalState(_)
                | Value::Address(_)
                | Value::Bytes(_)
        )
    })
}

/// Checks whether `condition` requires `field` of the transaction to be the
/// zero address.
#[must_use]
pub fn checks_zero_address(condition: &Condition, field: TransactionField) -> bool {
    condition.implies_equality(
        |v| *v == Value::Txn(field),
        |v| *v == Value::Global(GlobalField::ZeroAddress),
    )
}

fn is_sender(value: &Value) -> bool {
    *value == Value::Txn(TransactionField::Sender)
}

#[cfg(test)]
mod test {
    use crate::{
        analysis::Context,
        contract::Contract,
        detector::{
            creator::MissingCreatorCheck,
            guard::{approving_paths, checks_creator, guarded_everywhere},
            Detector,
        },
        parser::parse,
    };

    fn contract(lines: &[&str]) -> anyhow::Result<Contract> {
        Ok(Contract::from_listing(parse(lines)?, None)?)
    }

    #[test]
    fn straight_line_checks_guard_everything() -> anyhow::Result<()> {
        let contract = contract(&[
            "txn Sender",
            "global CreatorAddress",
            "==",
            "assert",
            "int 1",
            "return",
        ])?;

        assert!(guarded_everywhere(&contract, &Context::default(), &checks_creator)?);

        Ok(())
    }

    #[test]
    fn checks_split_across_blocks_are_found_by_paths() -> anyhow::Result<()> {
        let contract = contract(&[
            "txn Sender",
            "b check",
            "check:",
            "global CreatorAddress",
            "==",
            "return",
        ])?;

        // Each block alone cannot see the comparison, but the path can.
        assert!(!guarded_everywhere(&contract, &Context::default(), &checks_creator)?);
        let paths = approving_paths(&contract, &Context::default())?;
        assert_eq!(paths.len(), 1);
        assert!(paths[0].1.requires(checks_creator));

        Ok(())
    }

    #[test]
    fn buried_operands_are_not_mistaken_for_checks() -> anyhow::Result<()> {
        let contract = contract(&[
            "#pragma version 5",
            "int 5",
            "int 6",
            "b next",
            "next:",
            "txn Sender",
            "cover 2",
            "global CreatorAddress",
            "==",
            "assert",
            "int 1",
            "return",
        ])?;

        assert!(!guarded_everywhere(&contract, &Context::default(), &checks_creator)?);
        assert_eq!(MissingCreatorCheck.detect(&contract, &Context::default())?.len(), 1);

        Ok(())
    }

    #[test]
    fn guarded_everywhere_agrees_with_the_paths() -> anyhow::Result<()> {
        let programs: [&[&str]; 5] = [
            &["txn Sender", "global CreatorAddress", "==", "assert", "int 1", "return"],
            &[
                "#pragma version 5",
                "int 5",
                "int 6",
                "b next",
                "next:",
                "txn Sender",
                "cover 2",
                "global CreatorAddress",
                "==",
                "assert",
                "int 1",
                "return",
            ],
            &[
                "#pragma version 5",
                "txn Sender",
                "b next",
                "next:",
                "global CreatorAddress",
                "uncover 1",
                "==",
                "assert",
                "int 1",
                "return",
            ],
            &[
                "#pragma version 8",
                "global CreatorAddress",
                "int 0",
                "b next",
                "next:",
                "txn Sender",
                "bury 1",
                "==",
                "assert",
                "int 1",
                "return",
            ],
            &[
                "#pragma version 5",
                "txn Sender",
                "global CreatorAddress",
                "cover 1",
                "==",
                "assert",
                "int 1",
                "return",
            ],
        ];

        let mut guarded = 0;
        for lines in programs {
            let contract = contract(lines)?;
            let context = Context::default();
            if guarded_everywhere(&contract, &context, &checks_creator)? {
                guarded += 1;
                for (path, summary) in approving_paths(&contract, &context)? {
                    assert!(summary.requires(checks_creator), "{path:?} lacks the check");
                }
            }
        }
        assert_eq!(guarded, 2);

        Ok(())
    }
}

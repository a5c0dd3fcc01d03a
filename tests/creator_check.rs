//! This module is an integration test that checks the analysis of programs
//! that should restrict their approval to the creator of the application.
#![cfg(test)]

use teal_analyzer::{
    cfg::BlockId,
    detector::Severity,
    field::{GlobalField, TransactionField},
};

mod common;

#[test]
fn straight_line_creator_check_has_no_findings() -> anyhow::Result<()> {
    let contract = common::new_contract_from_path("./asset/creator_check.teal")?;

    // The pragma does not produce an instruction
    let instructions: Vec<_> = contract.instructions().collect();
    assert_eq!(instructions.len(), 6);
    assert_eq!(instructions[0].transaction_field(), Some(TransactionField::Sender));
    assert_eq!(instructions[1].global_field(), Some(GlobalField::CreatorAddress));

    // With no branches there is only a single block
    assert_eq!(contract.blocks().len(), 1);
    assert!(contract.cfg()[BlockId::ENTRY].successors().is_empty());

    let findings = common::findings_of("./asset/creator_check.teal", None, "missing-creator-check")?;
    assert!(findings.is_empty());

    Ok(())
}

#[test]
fn reports_the_branch_that_skips_the_creator_check() -> anyhow::Result<()> {
    let contract = common::new_contract_from_path("./asset/unguarded_branch.teal")?;
    assert_eq!(contract.blocks().len(), 3);

    let findings =
        common::findings_of("./asset/unguarded_branch.teal", None, "missing-creator-check")?;
    assert_eq!(findings.len(), 1);

    // The finding is attributed to the block that approves without the check
    let finding = &findings[0];
    assert_eq!(finding.severity, Severity::High);
    assert_eq!(finding.blocks, vec![BlockId::new(0), BlockId::new(1)]);
    assert_eq!(finding.block(), Some(BlockId::new(1)));
    assert_eq!(finding.lines, vec![5]);

    Ok(())
}

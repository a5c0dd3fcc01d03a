//! This module contains the detector for approving paths that never check that
//! the sender is the creator of the application.

use crate::{
    analysis::Context,
    contract::Contract,
    detector::{
        guard::{checks_creator, unguarded_paths, Report},
        Detector,
        Finding,
        Severity,
    },
    error::detection::Result,
};

/// Reports each path that approves the transaction without requiring that
/// `txn Sender` equals `global CreatorAddress`.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct MissingCreatorCheck;

impl Detector for MissingCreatorCheck {
    fn name(&self) -> &str {
        "missing-creator-check"
    }

    fn description(&self) -> &str {
        "An approving path does not check that the sender is the creator"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn detect(&self, contract: &Contract, context: &Context) -> Result<Vec<Finding>> {
        let report = Report {
            detector:    self.name(),
            severity:    self.severity(),
            description: self.description(),
        };
        unguarded_paths(contract, context, &report, checks_creator, |_| true)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        analysis::Context,
        cfg::BlockId,
        contract::Contract,
        detector::{creator::MissingCreatorCheck, Detector},
        parser::parse,
    };

    fn contract(lines: &[&str]) -> anyhow::Result<Contract> {
        Ok(Contract::from_listing(parse(lines)?, None)?)
    }

    #[test]
    fn accepts_a_straight_line_creator_check() -> anyhow::Result<()> {
        let contract = contract(&[
            "txn Sender",
            "global CreatorAddress",
            "==",
            "assert",
            "int 1",
            "return",
        ])?;
        assert_eq!(contract.blocks().len(), 1);
        assert_eq!(contract.instructions().count(), 6);

        let findings = MissingCreatorCheck.detect(&contract, &Context::default())?;
        assert!(findings.is_empty());

        Ok(())
    }

    #[test]
    fn reports_the_single_unguarded_branch() -> anyhow::Result<()> {
        let contract = contract(&[
            "#pragma version 2",
            "txn OnCompletion",
            "bnz admin",
            "int 1",
            "return",
            "admin:",
            "txn Sender",
            "global CreatorAddress",
            "==",
            "assert",
            "int 1",
            "return",
        ])?;

        let findings = MissingCreatorCheck.detect(&contract, &Context::default())?;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].block(), Some(BlockId::new(1)));
        assert_eq!(findings[0].lines, vec![5]);

        Ok(())
    }

    #[test]
    fn terminates_on_a_self_loop() -> anyhow::Result<()> {
        let contract = contract(&[
            "loop:",
            "txn Fee",
            "bnz loop",
            "int 1",
            "return",
        ])?;

        let findings = MissingCreatorCheck.detect(&contract, &Context::default())?;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].block(), Some(BlockId::new(1)));

        Ok(())
    }
}

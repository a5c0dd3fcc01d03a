//! This module contains the detector for logic signatures that approve
//! transactions which rekey the signing account.

use crate::{
    analysis::Context,
    contract::{Contract, ExecutionMode},
    detector::{
        guard::{checks_zero_address, unguarded_paths, Report},
        Detector,
        Finding,
        Severity,
    },
    error::detection::Result,
    field::TransactionField,
};

/// Reports each path that approves a transaction without requiring its
/// `RekeyTo` field to be the zero address.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct RekeyTo;

impl Detector for RekeyTo {
    fn name(&self) -> &str {
        "rekey-to"
    }

    fn description(&self) -> &str {
        "An approving path does not check the RekeyTo field of the transaction"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn applies_to(&self, mode: ExecutionMode) -> bool {
        mode.may_be_stateless()
    }

    fn detect(&self, contract: &Contract, context: &Context) -> Result<Vec<Finding>> {
        let report = Report {
            detector:    self.name(),
            severity:    self.severity(),
            description: self.description(),
        };
        unguarded_paths(
            contract,
            context,
            &report,
            |c| checks_zero_address(c, TransactionField::RekeyTo),
            |_| true,
        )
    }
}

#[cfg(test)]
mod test {
    use crate::{
        analysis::Context,
        contract::{Contract, ExecutionMode},
        detector::{rekey::RekeyTo, Detector},
        parser::parse,
    };

    #[test]
    fn accepts_programs_that_check_rekey_to() -> anyhow::Result<()> {
        let contract = Contract::from_listing(
            parse([
                "#pragma version 2",
                "txn RekeyTo",
                "global ZeroAddress",
                "==",
                "txn Fee",
                "int 1000",
                "<=",
                "&&",
            ])?,
            None,
        )?;

        assert!(RekeyTo.detect(&contract, &Context::default())?.is_empty());

        Ok(())
    }

    #[test]
    fn reports_programs_that_do_not() -> anyhow::Result<()> {
        let contract = Contract::from_listing(
            parse(["#pragma version 2", "arg 0", "len", "int 32", "=="])?,
            None,
        )?;
        assert_eq!(contract.mode(), ExecutionMode::Stateless);

        let findings = RekeyTo.detect(&contract, &Context::default())?;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].lines, vec![5]);

        Ok(())
    }
}

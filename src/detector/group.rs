//! This module contains the detector for programs that access transactions in
//! the group by absolute index without checking the size of the group.

use crate::{
    analysis::{symbolic::Value, Context},
    contract::Contract,
    detector::{
        guard::{unguarded_paths, Report},
        Detector,
        Finding,
        Severity,
    },
    error::detection::Result,
    field::GlobalField,
};

/// Reports each approving path that reads a transaction at a fixed group index
/// without constraining `global GroupSize`.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct GroupSizeCheck;

impl Detector for GroupSizeCheck {
    fn name(&self) -> &str {
        "group-size-check"
    }

    fn description(&self) -> &str {
        "An approving path accesses the group by absolute index without checking the group size"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn detect(&self, contract: &Contract, context: &Context) -> Result<Vec<Finding>> {
        let group_size = Value::Global(GlobalField::GroupSize);
        let report = Report {
            detector:    self.name(),
            severity:    self.severity(),
            description: self.description(),
        };
        unguarded_paths(
            contract,
            context,
            &report,
            |c| c.mentions(&group_size),
            |summary| !summary.group_indices().is_empty(),
        )
    }
}

#[cfg(test)]
mod test {
    use crate::{
        analysis::Context,
        contract::Contract,
        detector::{group::GroupSizeCheck, Detector},
        parser::parse,
    };

    fn contract(lines: &[&str]) -> anyhow::Result<Contract> {
        Ok(Contract::from_listing(parse(lines)?, None)?)
    }

    #[test]
    fn reports_absolute_access_without_size_check() -> anyhow::Result<()> {
        let contract = contract(&["gtxn 1 Amount", "int 100", ">"])?;
        assert_eq!(GroupSizeCheck.detect(&contract, &Context::default())?.len(), 1);

        Ok(())
    }

    #[test]
    fn accepts_absolute_access_with_size_check() -> anyhow::Result<()> {
        let contract = contract(&[
            "global GroupSize",
            "int 2",
            "==",
            "assert",
            "gtxn 1 Amount",
            "int 100",
            ">",
        ])?;
        assert!(GroupSizeCheck.detect(&contract, &Context::default())?.is_empty());

        Ok(())
    }

    #[test]
    fn ignores_relative_access() -> anyhow::Result<()> {
        let contract = contract(&["txn Amount", "int 100", ">"])?;
        assert!(GroupSizeCheck.detect(&contract, &Context::default())?.is_empty());

        Ok(())
    }
}

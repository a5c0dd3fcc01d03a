//! This module contains the detector for logic signatures that let the
//! transaction pay an arbitrary fee.

use crate::{
    analysis::{symbolic::Value, Context},
    contract::{Contract, ExecutionMode},
    detector::{
        guard::{unguarded_paths, Report},
        Detector,
        Finding,
        Severity,
    },
    error::detection::Result,
    field::TransactionField,
};

/// Reports each path that approves a transaction without placing any
/// constraint on its `Fee`.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct MissingFeeCheck;

impl Detector for MissingFeeCheck {
    fn name(&self) -> &str {
        "missing-fee-check"
    }

    fn description(&self) -> &str {
        "An approving path does not constrain the fee of the transaction"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn applies_to(&self, mode: ExecutionMode) -> bool {
        mode.may_be_stateless()
    }

    fn detect(&self, contract: &Contract, context: &Context) -> Result<Vec<Finding>> {
        let fee = Value::Txn(TransactionField::Fee);
        let report = Report {
            detector:    self.name(),
            severity:    self.severity(),
            description: self.description(),
        };
        unguarded_paths(contract, context, &report, |c| c.mentions(&fee), |_| true)
    }
}

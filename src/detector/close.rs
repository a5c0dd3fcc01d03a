//! This module contains the detectors for logic signatures that approve
//! transactions which close the signing account or one of its asset holdings.
//!
//! A path is safe if it requires the relevant close-to field to be the zero
//! address, or if it rules out the transaction being of the type that has that
//! field.

use crate::{
    analysis::{
        symbolic::{Condition, Value},
        Context,
    },
    constant::{TYPE_ENUM_ASSET_TRANSFER, TYPE_ENUM_PAYMENT},
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

fn rules_out_type(condition: &Condition, type_enum: u64) -> bool {
    condition.rules_out(&Value::Txn(TransactionField::TypeEnum), type_enum)
}

/// Reports each path that approves a payment without requiring its
/// `CloseRemainderTo` field to be the zero address.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct CanCloseAccount;

impl Detector for CanCloseAccount {
    fn name(&self) -> &str {
        "can-close-account"
    }

    fn description(&self) -> &str {
        "An approving path does not check the CloseRemainderTo field of the transaction"
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
            |c| {
                checks_zero_address(c, TransactionField::CloseRemainderTo)
                    || rules_out_type(c, TYPE_ENUM_PAYMENT)
            },
            |_| true,
        )
    }
}

/// Reports each path that approves an asset transfer without requiring its
/// `AssetCloseTo` field to be the zero address.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct CanCloseAsset;

impl Detector for CanCloseAsset {
    fn name(&self) -> &str {
        "can-close-asset"
    }

    fn description(&self) -> &str {
        "An approving path does not check the AssetCloseTo field of the transaction"
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
            |c| {
                checks_zero_address(c, TransactionField::AssetCloseTo)
                    || rules_out_type(c, TYPE_ENUM_ASSET_TRANSFER)
            },
            |_| true,
        )
    }
}

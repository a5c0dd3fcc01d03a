//! This module contains the detectors for applications that can be updated or
//! deleted.
//!
//! An application can be updated (or deleted) if some path approves a
//! transaction whose `OnCompletion` is `UpdateApplication` (or
//! `DeleteApplication`). Such an application is unprotected if that path also
//! places no restriction on who the sender is.

use crate::{
    analysis::{
        symbolic::{Condition, Value},
        Context,
    },
    constant::{ON_COMPLETION_DELETE_APPLICATION, ON_COMPLETION_UPDATE_APPLICATION},
    contract::{Contract, ExecutionMode},
    detector::{
        guard::{checks_sender, unguarded_paths, Report},
        Detector,
        Finding,
        Severity,
    },
    error::detection::Result,
    field::TransactionField,
};

/// Checks whether `condition` rules out `OnCompletion` being `action`.
fn rules_out_action(condition: &Condition, action: u64) -> bool {
    condition.rules_out(&Value::Txn(TransactionField::OnCompletion), action)
}

/// Reports each path that approves a transaction updating the application.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct IsUpdatable;

impl Detector for IsUpdatable {
    fn name(&self) -> &str {
        "is-updatable"
    }

    fn description(&self) -> &str {
        "The application can be updated"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn applies_to(&self, mode: ExecutionMode) -> bool {
        mode.may_be_stateful()
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
            |c| rules_out_action(c, ON_COMPLETION_UPDATE_APPLICATION),
            |_| true,
        )
    }
}

/// Reports each path that approves a transaction deleting the application.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct IsDeletable;

impl Detector for IsDeletable {
    fn name(&self) -> &str {
        "is-deletable"
    }

    fn description(&self) -> &str {
        "The application can be deleted"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn applies_to(&self, mode: ExecutionMode) -> bool {
        mode.may_be_stateful()
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
            |c| rules_out_action(c, ON_COMPLETION_DELETE_APPLICATION),
            |_| true,
        )
    }
}

/// Reports each path that approves a transaction updating the application
/// from any sender.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct UnprotectedUpdatable;

impl Detector for UnprotectedUpdatable {
    fn name(&self) -> &str {
        "unprotected-updatable"
    }

    fn description(&self) -> &str {
        "The application can be updated by any sender"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn applies_to(&self, mode: ExecutionMode) -> bool {
        mode.may_be_stateful()
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
            |c| rules_out_action(c, ON_COMPLETION_UPDATE_APPLICATION) || checks_sender(c),
            |_| true,
        )
    }
}

/// Reports each path that approves a transaction deleting the application
/// from any sender.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct UnprotectedDeletable;

impl Detector for UnprotectedDeletable {
    fn name(&self) -> &str {
        "unprotected-deletable"
    }

    fn description(&self) -> &str {
        "The application can be deleted by any sender"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn applies_to(&self, mode: ExecutionMode) -> bool {
        mode.may_be_stateful()
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
            |c| rules_out_action(c, ON_COMPLETION_DELETE_APPLICATION) || checks_sender(c),
            |_| true,
        )
    }
}

//! This module contains a printer for the call graph between the units of code
//! in a contract.

use std::{collections::BTreeMap, fmt::Write};

use itertools::Itertools;

use crate::{
    constant::MAIN_UNIT_NAME,
    contract::Contract,
    printer::{unit_name, Printer},
};

/// Prints one line per unit of code, listing the subroutines it calls.
///
/// ```text
/// __main__ -> check, pay
/// check -> (none)
/// ```
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct CallGraph;

impl Printer for CallGraph {
    fn name(&self) -> &str {
        "call-graph"
    }

    fn print(&self, contract: &Contract) -> String {
        let cfg = contract.cfg();
        let mut calls: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        calls.insert(MAIN_UNIT_NAME, Vec::new());
        for name in cfg.subroutines().keys() {
            calls.insert(name.as_str(), Vec::new());
        }

        for block in cfg.blocks() {
            let Some(callee) = block.callee() else { continue };
            let caller = unit_name(block.owner());
            let callees = calls.entry(caller).or_default();
            callees.extend(cfg.subroutines_entered_at(callee).map(|s| s.name()));
        }

        let mut out = String::new();
        let main = calls.remove(MAIN_UNIT_NAME).unwrap_or_default();
        for (unit, callees) in std::iter::once((MAIN_UNIT_NAME, main)).chain(calls) {
            let callees = callees.into_iter().sorted().dedup().join(", ");
            let callees = if callees.is_empty() { "(none)".to_string() } else { callees };
            let _ = writeln!(out, "{unit} -> {callees}");
        }

        out
    }
}

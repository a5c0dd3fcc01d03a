//! This module contains a printer that summarises a contract for humans.

use std::fmt::Write;

use itertools::Itertools;

use crate::{
    cfg::EdgeKind,
    contract::Contract,
    printer::{unit_name, Printer},
};

/// Prints the version and mode of the contract, followed by each block with
/// its owning unit, its outgoing edges, and its instructions.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct HumanSummary;

impl Printer for HumanSummary {
    fn name(&self) -> &str {
        "human-summary"
    }

    fn print(&self, contract: &Contract) -> String {
        let cfg = contract.cfg();
        let mut out = String::new();

        let _ = writeln!(out, "version: {}", contract.version());
        let _ = writeln!(out, "mode: {}", contract.mode());
        let _ = writeln!(out, "blocks: {}", cfg.len());
        let subroutines = cfg.subroutines().keys().join(", ");
        let subroutines = if subroutines.is_empty() { "(none)".to_string() } else { subroutines };
        let _ = writeln!(out, "subroutines: {subroutines}");

        for block in cfg.blocks() {
            let edges = cfg
                .successor_edges(block.id())
                .map(|(to, kind)| format!("{to} ({})", edge_name(kind)))
                .join(", ");
            let dead = if block.is_dead() { " [dead]" } else { "" };
            let _ = writeln!(out);
            let _ = writeln!(out, "{} in {}{dead} -> [{edges}]", block.id(), unit_name(block.owner()));
            for instruction in block.instructions() {
                let _ = writeln!(out, "  {:>4}: {instruction}", instruction.line());
            }
        }

        out
    }
}

fn edge_name(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Fallthrough => "fallthrough",
        EdgeKind::Branch => "branch",
        EdgeKind::Call => "call",
        EdgeKind::Return => "return",
    }
}

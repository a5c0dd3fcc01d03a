//! This module contains the construction of the [`ControlFlowGraph`] from a
//! linear stream of instructions.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    cfg::{BasicBlock, BlockId, ControlFlowGraph, EdgeKind, Subroutine},
    error::{
        cfg::{Error, Result},
        container::Locatable,
    },
    instruction::Instruction,
    opcode::{ControlFlow, Opcode},
};

/// Builds the control-flow graph of a program from its `instructions`.
///
/// Blocks begin at the first instruction, after every control transfer, and at
/// every label. Runs of consecutive labels share a single block.
///
/// # Errors
///
/// Returns [`Err`] if a branch or call target does not resolve to a label, if
/// a `callsub` is the last instruction of the program, or if `instructions` is
/// empty.
pub fn build(instructions: Vec<Instruction>) -> Result<ControlFlowGraph> {
    if instructions.is_empty() {
        return Err(Error::EmptyInstructionStream.locate(0));
    }

    let mut graph = partition(instructions);
    link(&mut graph)?;
    link_subroutines(&mut graph);
    assign_owners(&mut graph);
    mark_dead(&mut graph);

    log::debug!(
        "Built a control-flow graph with {} blocks, {} edges and {} subroutines",
        graph.blocks.len(),
        graph.edges.len(),
        graph.subroutines.len()
    );

    Ok(graph)
}

/// Splits the instructions into blocks at control-flow boundaries.
fn partition(instructions: Vec<Instruction>) -> ControlFlowGraph {
    let mut runs: Vec<Vec<Instruction>> = Vec::new();
    let mut current: Vec<Instruction> = Vec::new();

    for instruction in instructions {
        let starts_block = instruction.opcode() == Opcode::Label
            && current.iter().any(|i| i.opcode() != Opcode::Label);
        if starts_block {
            runs.push(std::mem::take(&mut current));
        }

        let ends_block = instruction.is_control_transfer();
        current.push(instruction);
        if ends_block {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    let mut labels = BTreeMap::new();
    let blocks = runs
        .into_iter()
        .enumerate()
        .map(|(index, instructions)| {
            let id = BlockId::new(index);
            for label in instructions.iter().filter_map(Instruction::defined_label) {
                labels.insert(label.to_string(), id);
            }
            BasicBlock {
                id,
                instructions,
                successors: BTreeSet::new(),
                predecessors: BTreeSet::new(),
                callee: None,
                return_site: None,
                owner: None,
                dead: false,
            }
        })
        .collect();

    ControlFlowGraph {
        blocks,
        edges: BTreeMap::new(),
        labels,
        main: BTreeSet::new(),
        subroutines: BTreeMap::new(),
    }
}

/// Adds the intraprocedural and call edges of every block.
fn link(graph: &mut ControlFlowGraph) -> Result<()> {
    let count = graph.blocks.len();
    for index in 0..count {
        let id = BlockId::new(index);
        let next = (index + 1 < count).then(|| BlockId::new(index + 1));
        let Some(terminator) = graph.blocks[index].terminator().cloned() else {
            continue;
        };

        let resolve = |label: &str| {
            graph.block_for_label(label).ok_or_else(|| {
                Error::UnresolvedLabel {
                    label: label.to_string(),
                }
                .locate(terminator.line())
            })
        };

        let mut edges = Vec::new();
        match terminator.control_flow() {
            ControlFlow::Next => edges.extend(next.map(|n| (n, EdgeKind::Fallthrough))),
            ControlFlow::Jump | ControlFlow::ConditionalJump | ControlFlow::MultiJump => {
                for label in terminator.labels() {
                    edges.push((resolve(label)?, EdgeKind::Branch));
                }
                if terminator.control_flow().falls_through() {
                    edges.extend(next.map(|n| (n, EdgeKind::Fallthrough)));
                }
            }
            ControlFlow::Call => {
                let label = terminator.labels().first().copied().unwrap_or_default();
                let callee = resolve(label)?;
                let return_site = next.ok_or_else(|| {
                    Error::MissingReturnSite {
                        label: label.to_string(),
                    }
                    .locate(terminator.line())
                })?;
                let block = &mut graph.blocks[index];
                block.callee = Some(callee);
                block.return_site = Some(return_site);
                edges.push((callee, EdgeKind::Call));
            }
            ControlFlow::SubroutineReturn | ControlFlow::Return | ControlFlow::Fail => (),
        }

        for (to, kind) in edges {
            add_edge(graph, id, to, kind);
        }
    }

    Ok(())
}

/// Discovers the subroutines of the program and adds the return edges from
/// their exits to the return sites of their callers.
fn link_subroutines(graph: &mut ControlFlowGraph) {
    let mut call_sites: BTreeMap<String, (BlockId, BTreeSet<BlockId>)> = BTreeMap::new();
    for block in &graph.blocks {
        let (Some(callee), Some(terminator)) = (block.callee, block.terminator()) else {
            continue;
        };
        let Some(name) = terminator.labels().first().map(ToString::to_string) else {
            continue;
        };
        call_sites
            .entry(name)
            .or_insert_with(|| (callee, BTreeSet::new()))
            .1
            .insert(block.id);
    }

    let mut subroutines = BTreeMap::new();
    for (name, (entry, sites)) in call_sites {
        let blocks = graph.intraprocedural_closure(entry);
        let exits: BTreeSet<BlockId> = blocks
            .iter()
            .copied()
            .filter(|b| {
                graph[*b]
                    .terminator()
                    .is_some_and(|t| t.control_flow() == ControlFlow::SubroutineReturn)
            })
            .collect();
        subroutines.insert(name.clone(), Subroutine::new(name, entry, blocks, exits, sites));
    }

    let mut returns = Vec::new();
    for subroutine in subroutines.values() {
        for exit in subroutine.exits() {
            for site in subroutine.call_sites() {
                if let Some(return_site) = graph[*site].return_site {
                    returns.push((*exit, return_site));
                }
            }
        }
    }
    for (from, to) in returns {
        add_edge(graph, from, to, EdgeKind::Return);
    }

    graph.subroutines = subroutines;
}

/// Assigns every block to exactly one unit of code.
///
/// The main program claims its blocks first, followed by the subroutines in
/// order of their entry blocks. Blocks that no unit reaches belong to the main
/// program.
fn assign_owners(graph: &mut ControlFlowGraph) {
    let main = graph.intraprocedural_closure(BlockId::ENTRY);
    let mut claimed = main.clone();

    let mut order: Vec<&Subroutine> = graph.subroutines.values().collect();
    order.sort_by_key(|s| (s.entry(), s.name().to_string()));

    let mut owners = Vec::new();
    for subroutine in order {
        for block in subroutine.blocks() {
            if claimed.insert(*block) {
                owners.push((*block, subroutine.name().to_string()));
            }
        }
    }

    let mut main = main;
    main.extend(
        graph
            .blocks
            .iter()
            .map(BasicBlock::id)
            .filter(|id| !claimed.contains(id)),
    );
    for (block, owner) in owners {
        graph.blocks[block.index()].owner = Some(owner);
    }
    graph.main = main;
}

/// Flags the blocks that cannot be reached from the entry.
fn mark_dead(graph: &mut ControlFlowGraph) {
    let live = graph.reachable_from(BlockId::ENTRY);
    for block in &mut graph.blocks {
        block.dead = !live.contains(&block.id);
    }
}

fn add_edge(graph: &mut ControlFlowGraph, from: BlockId, to: BlockId, kind: EdgeKind) {
    graph.edges.entry((from, to)).or_insert(kind);
    graph.blocks[from.index()].successors.insert(to);
    graph.blocks[to.index()].predecessors.insert(from);
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use crate::{
        cfg::{build, BlockId, ControlFlowGraph, EdgeKind},
        error::cfg::Error,
        parser::parse,
    };

    fn graph(lines: &[&str]) -> anyhow::Result<ControlFlowGraph> {
        let listing = parse(lines)?;
        Ok(build(listing.into_instructions())?)
    }

    fn ids(raw: &[usize]) -> BTreeSet<BlockId> {
        raw.iter().copied().map(BlockId::new).collect()
    }

    #[test]
    fn straight_line_code_is_one_block() -> anyhow::Result<()> {
        let cfg = graph(&[
            "txn Sender",
            "global CreatorAddress",
            "==",
            "assert",
            "int 1",
            "return",
        ])?;

        assert_eq!(cfg.len(), 1);
        assert_eq!(cfg[BlockId::ENTRY].instructions().len(), 6);
        assert!(cfg[BlockId::ENTRY].successors().is_empty());
        assert_eq!(cfg.dead_blocks().count(), 0);

        Ok(())
    }

    #[test]
    fn conditional_branches_have_two_successors() -> anyhow::Result<()> {
        let cfg = graph(&[
            "txn OnCompletion",
            "bnz handle",
            "int 1",
            "return",
            "handle:",
            "int 0",
            "return",
        ])?;

        assert_eq!(cfg.len(), 3);
        assert_eq!(cfg[BlockId::new(0)].successors(), &ids(&[1, 2]));
        assert_eq!(cfg.edge_kind(BlockId::new(0), BlockId::new(2)), Some(EdgeKind::Branch));
        assert_eq!(
            cfg.edge_kind(BlockId::new(0), BlockId::new(1)),
            Some(EdgeKind::Fallthrough)
        );
        assert_eq!(cfg.block_for_label("handle"), Some(BlockId::new(2)));
        assert_eq!(cfg[BlockId::new(2)].predecessors(), &ids(&[0]));

        Ok(())
    }

    #[test]
    fn consecutive_labels_share_a_block() -> anyhow::Result<()> {
        let cfg = graph(&["b second", "first:", "second:", "int 1"])?;

        assert_eq!(cfg.len(), 2);
        assert_eq!(cfg.block_for_label("first"), cfg.block_for_label("second"));
        assert_eq!(cfg[BlockId::new(1)].labels().collect::<Vec<_>>(), vec!["first", "second"]);

        Ok(())
    }

    #[test]
    fn switch_targets_and_falls_through() -> anyhow::Result<()> {
        let cfg = graph(&[
            "#pragma version 8",
            "txn OnCompletion",
            "switch a b",
            "err",
            "a:",
            "int 1",
            "return",
            "b:",
            "int 1",
            "return",
        ])?;

        assert_eq!(cfg[BlockId::ENTRY].successors(), &ids(&[1, 2, 3]));

        Ok(())
    }

    #[test]
    fn two_call_sites_get_two_return_edges() -> anyhow::Result<()> {
        let cfg = graph(&[
            "#pragma version 4",
            "callsub check",
            "callsub check",
            "int 1",
            "return",
            "check:",
            "txn Fee",
            "pop",
            "retsub",
        ])?;

        // B0: callsub, B1: callsub, B2: int 1; return, B3: check
        let check = cfg.subroutine("check").ok_or_else(|| anyhow::anyhow!("no subroutine"))?;
        assert_eq!(check.entry(), BlockId::new(3));
        assert_eq!(check.call_sites(), &ids(&[0, 1]));
        assert_eq!(check.exits(), &ids(&[3]));

        let returns: Vec<_> = cfg.edges().filter(|(_, _, k)| *k == EdgeKind::Return).collect();
        assert_eq!(returns.len(), 2);
        assert_eq!(cfg.edge_kind(BlockId::new(3), BlockId::new(1)), Some(EdgeKind::Return));
        assert_eq!(cfg.edge_kind(BlockId::new(3), BlockId::new(2)), Some(EdgeKind::Return));

        let entry = &cfg[BlockId::new(0)];
        assert_eq!(entry.callee(), Some(BlockId::new(3)));
        assert_eq!(entry.return_site(), Some(BlockId::new(1)));
        assert_eq!(entry.successors(), &ids(&[3]));
        assert_eq!(cfg.edge_kind(BlockId::new(0), BlockId::new(1)), None);

        assert_eq!(cfg.main_blocks(), &ids(&[0, 1, 2]));
        assert_eq!(cfg[BlockId::new(3)].owner(), Some("check"));
        assert_eq!(cfg.dead_blocks().count(), 0);
        assert!(!check.is_recursive());

        Ok(())
    }

    #[test]
    fn recursive_subroutines_call_themselves() -> anyhow::Result<()> {
        let cfg = graph(&[
            "#pragma version 4",
            "callsub rec",
            "int 1",
            "return",
            "rec:",
            "callsub rec",
            "retsub",
        ])?;

        // B0: callsub, B1: int 1; return, B2: rec, B3: retsub
        let rec = cfg.subroutine("rec").ok_or_else(|| anyhow::anyhow!("no subroutine"))?;
        assert_eq!(rec.blocks(), &ids(&[2, 3]));
        assert_eq!(rec.call_sites(), &ids(&[0, 2]));
        assert!(rec.is_recursive());

        Ok(())
    }

    #[test]
    fn marks_unreachable_blocks_dead() -> anyhow::Result<()> {
        let cfg = graph(&["int 1", "return", "int 2", "pop"])?;

        assert_eq!(cfg.len(), 2);
        assert!(!cfg[BlockId::new(0)].is_dead());
        assert!(cfg[BlockId::new(1)].is_dead());
        assert!(cfg.main_blocks().contains(&BlockId::new(1)));

        Ok(())
    }

    #[test]
    fn keeps_self_loops() -> anyhow::Result<()> {
        let cfg = graph(&["loop:", "int 1", "bnz loop", "int 1", "return"])?;

        assert!(cfg[BlockId::new(0)].successors().contains(&BlockId::new(0)));
        assert!(cfg[BlockId::new(0)].predecessors().contains(&BlockId::new(0)));

        Ok(())
    }

    #[test]
    fn rejects_unresolved_labels() -> anyhow::Result<()> {
        let listing = parse(["int 1", "bnz nowhere"])?;
        let err = build(listing.into_instructions()).unwrap_err();
        assert_eq!(err.line(), 2);
        assert_eq!(
            err.payload,
            Error::UnresolvedLabel {
                label: "nowhere".into(),
            }
        );

        Ok(())
    }

    #[test]
    fn rejects_trailing_calls() -> anyhow::Result<()> {
        let listing = parse(["#pragma version 4", "f:", "callsub f"])?;
        let err = build(listing.into_instructions()).unwrap_err();
        assert_eq!(err.payload, Error::MissingReturnSite { label: "f".into() });

        Ok(())
    }

    #[test]
    fn rejects_empty_streams() {
        assert_eq!(build(Vec::new()).unwrap_err().payload, Error::EmptyInstructionStream);
    }

    fn build_lines(lines: &[String]) -> Result<ControlFlowGraph, TestCaseError> {
        let listing = parse(lines).map_err(|e| TestCaseError::fail(e.to_string()))?;
        build(listing.into_instructions()).map_err(|e| TestCaseError::fail(e.to_string()))
    }

    /// Generates listings of straight-line code, branches and labels.
    fn listing() -> impl Strategy<Value = Vec<String>> {
        let line = prop_oneof![
            Just("int 1".to_string()),
            Just("pop".to_string()),
            Just("return".to_string()),
            Just("err".to_string()),
            (0usize..4).prop_map(|l| format!("l{l}:")),
            (0usize..4).prop_map(|l| format!("bnz l{l}")),
            (0usize..4).prop_map(|l| format!("b l{l}")),
        ];
        prop::collection::vec(line, 1..40).prop_map(|body| {
            let mut defined = BTreeSet::new();
            let mut lines = vec!["#pragma version 2".to_string()];
            for line in body {
                if let Some(name) = line.strip_suffix(':') {
                    if !defined.insert(name.to_string()) {
                        continue;
                    }
                }
                lines.push(line);
            }
            for l in 0..4 {
                if defined.insert(format!("l{l}")) {
                    lines.push(format!("l{l}:"));
                }
            }
            lines.push("int 1".to_string());
            lines
        })
    }

    proptest! {
        #[test]
        fn transfers_only_end_blocks(lines in listing()) {
            let cfg = build_lines(&lines)?;
            for block in cfg.blocks() {
                let instructions = block.instructions();
                let transfers = instructions.iter().filter(|i| i.is_control_transfer()).count();
                prop_assert!(transfers <= 1);
                if transfers == 1 {
                    prop_assert!(instructions.last().is_some_and(|i| i.is_control_transfer()));
                }
            }
        }

        #[test]
        fn live_blocks_are_reachable(lines in listing()) {
            let cfg = build_lines(&lines)?;
            let reachable = cfg.reachable_from(cfg.entry());
            for block in cfg.blocks() {
                prop_assert_eq!(!block.is_dead(), reachable.contains(&block.id()));
            }
        }
    }
}

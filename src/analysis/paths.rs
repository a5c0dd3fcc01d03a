//! This module contains the enumeration of interprocedural execution paths
//! through a contract.
//!
//! Paths follow `callsub` into the callee and `retsub` back to the return site
//! of the matching call, so a path never returns to a call site it did not come
//! from. Each path is cut short when it would revisit a block with the same
//! call stack, or when it would re-enter a subroutine that is already active.
//! This means that enumeration always terminates, even for programs containing
//! loops or recursion.

use std::collections::BTreeSet;

use crate::{
    analysis::Context,
    cfg::BlockId,
    contract::Contract,
    error::{
        container::Locatable,
        detection::{Error, Result},
    },
    opcode::Opcode,
};

/// A sequence of blocks that execution can pass through, in order.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Path {
    blocks:    Vec<BlockId>,
    truncated: bool,
}

impl Path {
    #[must_use]
    pub fn new(blocks: Vec<BlockId>, truncated: bool) -> Self {
        Self { blocks, truncated }
    }

    #[must_use]
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Checks if the path was cut short at a cycle or at a recursive call
    /// rather than running to the end of the program.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Gets the last block on the path.
    #[must_use]
    pub fn last(&self) -> Option<BlockId> {
        self.blocks.last().copied()
    }

    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        self.blocks.contains(&block)
    }
}

/// A path under construction.
#[derive(Clone, Debug)]
struct Partial {
    blocks:  Vec<BlockId>,
    stack:   Vec<BlockId>,
    visited: BTreeSet<(BlockId, Vec<BlockId>)>,
}

/// Enumerates the paths through `contract` that start at `start`.
///
/// # Errors
///
/// Returns [`Error::PathLimitExceeded`] if there are more paths than the
/// context allows, and [`Error::StoppedByWatchdog`] if the watchdog stops the
/// enumeration.
pub fn enumerate(contract: &Contract, start: BlockId, context: &Context) -> Result<Vec<Path>> {
    let cfg = contract.cfg();
    let limit = context.config().max_paths;
    let mut paths: Vec<Path> = Vec::new();
    let mut worklist = vec![Partial {
        blocks:  vec![start],
        stack:   Vec::new(),
        visited: BTreeSet::from([(start, Vec::new())]),
    }];
    let mut iteration = 0usize;

    while let Some(mut partial) = worklist.pop() {
        let Some(&current) = partial.blocks.last() else {
            continue;
        };
        let Some(block) = cfg.block(current) else {
            continue;
        };
        context.poll(iteration, block.first_line())?;
        iteration += 1;

        let mut successors: Vec<BlockId> = Vec::new();
        let mut truncated = false;
        if let Some(callee) = block.callee() {
            match block.return_site() {
                Some(site) if !partial.stack.contains(&site) => {
                    partial.stack.push(site);
                    successors.push(callee);
                }
                _ => truncated = true,
            }
        } else if block.terminator().map(|i| i.opcode()) == Some(Opcode::Retsub) {
            if let Some(site) = partial.stack.pop() {
                successors.push(site);
            }
        } else {
            successors.extend(
                cfg.successor_edges(current)
                    .filter(|(_, kind)| kind.is_intraprocedural())
                    .map(|(to, _)| to),
            );
        }

        let mut extended = false;
        for next in successors {
            let key = (next, partial.stack.clone());
            if partial.visited.contains(&key) {
                truncated = true;
                continue;
            }
            let mut branch = partial.clone();
            branch.visited.insert(key);
            branch.blocks.push(next);
            worklist.push(branch);
            extended = true;
        }

        if truncated || !extended {
            if paths.len() >= limit {
                return Err(Error::PathLimitExceeded { limit }.locate(block.last_line()));
            }
            paths.push(Path::new(partial.blocks, truncated));
        }
    }

    paths.reverse();
    Ok(paths)
}

#[cfg(test)]
mod test {
    use crate::{
        analysis::{paths::enumerate, Context},
        cfg::BlockId,
        contract::Contract,
        detector::Config,
        error::detection::Error,
        parser::parse,
        watchdog::LazyWatchdog,
    };

    fn contract(lines: &[&str]) -> anyhow::Result<Contract> {
        Ok(Contract::from_listing(parse(lines)?, None)?)
    }

    fn ids(raw: &[usize]) -> Vec<BlockId> {
        raw.iter().copied().map(BlockId::new).collect()
    }

    #[test]
    fn enumerates_both_sides_of_a_branch() -> anyhow::Result<()> {
        let contract = contract(&["int 1", "bnz yes", "int 0", "return", "yes:", "int 1", "return"])?;
        let paths = enumerate(&contract, BlockId::ENTRY, &Context::default())?;

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| !p.is_truncated()));
        assert!(paths.iter().any(|p| p.blocks() == ids(&[0, 1])));
        assert!(paths.iter().any(|p| p.blocks() == ids(&[0, 2])));

        Ok(())
    }

    #[test]
    fn matches_returns_with_their_calls() -> anyhow::Result<()> {
        let contract = contract(&[
            "#pragma version 4",
            "callsub check",
            "callsub check",
            "int 1",
            "return",
            "check:",
            "retsub",
        ])?;
        let paths = enumerate(&contract, BlockId::ENTRY, &Context::default())?;

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].blocks(), ids(&[0, 3, 1, 3, 2]));

        Ok(())
    }

    #[test]
    fn terminates_on_self_loops() -> anyhow::Result<()> {
        let contract = contract(&["loop:", "int 1", "bnz loop", "int 1", "return"])?;
        let paths = enumerate(&contract, BlockId::ENTRY, &Context::default())?;

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().any(|p| p.is_truncated() && p.blocks() == ids(&[0])));
        assert!(paths.iter().any(|p| !p.is_truncated() && p.blocks() == ids(&[0, 1])));

        Ok(())
    }

    #[test]
    fn terminates_on_recursion() -> anyhow::Result<()> {
        let contract = contract(&[
            "#pragma version 4",
            "callsub rec",
            "int 1",
            "return",
            "rec:",
            "callsub rec",
            "retsub",
        ])?;
        let paths = enumerate(&contract, BlockId::ENTRY, &Context::default())?;

        assert_eq!(paths.len(), 1);
        assert!(paths[0].is_truncated());

        Ok(())
    }

    #[test]
    fn reports_exceeding_the_path_limit() -> anyhow::Result<()> {
        let contract = contract(&[
            "int 1", "bnz a", "int 0", "pop", "a:", "int 1", "bnz b", "int 0", "pop", "b:",
            "int 1", "return",
        ])?;
        let context = Context::new(Config::default().with_max_paths(2), LazyWatchdog.in_rc());
        let result = enumerate(&contract, BlockId::ENTRY, &context);

        assert!(matches!(result, Err(e) if e.payload == Error::PathLimitExceeded { limit: 2 }));

        Ok(())
    }
}

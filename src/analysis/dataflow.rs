//! This module contains a forward "must" dataflow analysis over the
//! control-flow graph.
//!
//! Facts are generated along each edge by a caller-provided function, and a
//! fact holds on entry to a block only if it holds along every edge into that
//! block. The analysis runs to a fixpoint, with the number of passes bounded by
//! the detector configuration.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    analysis::Context,
    cfg::{BasicBlock, BlockId},
    contract::Contract,
    error::{
        container::Locatable,
        detection::{Error, Result},
    },
};

/// The facts that hold on entry to each block of a contract.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MustFacts<F> {
    /// The facts on entry to each block, where [`None`] means that no path
    /// reaching the block has been seen.
    entry: Vec<Option<BTreeSet<F>>>,
}

impl<F> MustFacts<F>
where
    F: Clone + Ord,
{
    /// Gets the facts that hold on entry to `block`, or [`None`] if the block
    /// is never reached from the entry.
    #[must_use]
    pub fn at_entry(&self, block: BlockId) -> Option<&BTreeSet<F>> {
        self.entry.get(block.index()).and_then(Option::as_ref)
    }

    /// Checks whether `fact` holds on entry to `block`.
    ///
    /// A fact vacuously holds on entry to a block that is never reached.
    #[must_use]
    pub fn holds_at_entry(&self, block: BlockId, fact: &F) -> bool {
        match self.entry.get(block.index()) {
            Some(Some(facts)) => facts.contains(fact),
            _ => true,
        }
    }
}

/// Computes the facts that must hold on entry to each block of `contract`.
///
/// The function `gen` is called as `gen(from, Some(to))` for every edge in the
/// graph and returns the facts established by executing `from` and then moving
/// to `to`.
///
/// # Errors
///
/// Returns [`Error::FixpointDidNotConverge`] if no fixpoint is reached within
/// the configured number of passes, or [`Error::StoppedByWatchdog`] if the
/// watchdog stops the analysis.
pub fn must_facts<F>(
    contract: &Contract,
    context: &Context,
    gen: impl Fn(BlockId, Option<BlockId>) -> BTreeSet<F>,
) -> Result<MustFacts<F>>
where
    F: Clone + Ord,
{
    let cfg = contract.cfg();
    let generated: BTreeMap<(BlockId, BlockId), BTreeSet<F>> = cfg
        .edges()
        .map(|(from, to, _)| ((from, to), gen(from, Some(to))))
        .collect();

    let mut entry: Vec<Option<BTreeSet<F>>> = vec![None; cfg.len()];
    if let Some(start) = entry.get_mut(cfg.entry().index()) {
        *start = Some(BTreeSet::new());
    }

    let iterations = context.config().max_fixpoint_iterations;
    for iteration in 0..iterations {
        context.poll(iteration, 0)?;

        let mut changed = false;
        for block in cfg.blocks() {
            let id = block.id();
            if id == cfg.entry() {
                continue;
            }

            let mut incoming: Option<BTreeSet<F>> = None;
            for pred in block.predecessors() {
                let Some(Some(pred_facts)) = entry.get(pred.index()) else {
                    continue;
                };
                let mut along_edge = pred_facts.clone();
                if let Some(facts) = generated.get(&(*pred, id)) {
                    along_edge.extend(facts.iter().cloned());
                }
                incoming = Some(match incoming {
                    None => along_edge,
                    Some(acc) => acc.intersection(&along_edge).cloned().collect(),
                });
            }

            if incoming.is_some() && entry[id.index()] != incoming {
                entry[id.index()] = incoming;
                changed = true;
            }
        }

        if !changed {
            return Ok(MustFacts { entry });
        }
    }

    let line = cfg.blocks().last().map_or(0, BasicBlock::last_line);
    Err(Error::FixpointDidNotConverge { iterations }.locate(line))
}

/// Computes the blocks that execution can only reach by first passing
/// through a block that satisfies `predicate`.
///
/// Blocks that cannot be reached from the entry are never included.
///
/// # Errors
///
/// Returns an error under the same conditions as [`must_facts`].
pub fn must_pass_through(
    contract: &Contract,
    context: &Context,
    predicate: impl Fn(&BasicBlock) -> bool,
) -> Result<BTreeSet<BlockId>> {
    let cfg = contract.cfg();
    let facts = must_facts(contract, context, |from, _| {
        if cfg.block(from).is_some_and(&predicate) {
            BTreeSet::from([()])
        } else {
            BTreeSet::new()
        }
    })?;

    Ok(cfg
        .blocks()
        .iter()
        .map(BasicBlock::id)
        .filter(|id| facts.at_entry(*id).is_some_and(|f| f.contains(&())))
        .collect())
}

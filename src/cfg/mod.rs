//! This module contains the control-flow graph of a TEAL program, and the
//! [`build`] function that reconstructs it from a linear stream of
//! [`Instruction`]s.
//!
//! # Representation
//!
//! The graph is an arena of [`BasicBlock`]s indexed by [`BlockId`]. Blocks are
//! numbered in source order, and edges are stored as sets of identifiers on
//! both of their endpoints, so back-edges and self-loops never imply any kind
//! of ownership. The [`EdgeKind`] of each edge is kept in the graph itself.
//!
//! # Subroutines
//!
//! A `callsub` block has a single [`EdgeKind::Call`] edge to the entry of the
//! called subroutine, and records the block that follows it as its _return
//! site_. Every block of the subroutine that ends in `retsub` then gets an
//! [`EdgeKind::Return`] edge to the return site of every call to that
//! subroutine. There is never a fallthrough edge from a call block to its
//! return site.
//!
//! # Dead Blocks
//!
//! Blocks that cannot be reached from the entry block over any edge are kept
//! in the graph but flagged as dead. What to do about them is left to each
//! consumer.

mod builder;
mod subroutine;

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::{Display, Formatter},
    ops::Index,
};

pub use builder::build;
use serde::{Deserialize, Serialize};
pub use subroutine::Subroutine;

use crate::instruction::Instruction;

/// The identifier of a basic block, which is its index in source order.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockId(usize);

impl BlockId {
    /// The identifier of the entry block of every program.
    pub const ENTRY: Self = Self(0);

    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// The kinds of edge in the control-flow graph.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Execution continues into the next block in source order.
    Fallthrough,

    /// A jump to the target of `b`, `bz`, `bnz`, `switch` or `match`.
    Branch,

    /// A `callsub` entering a subroutine.
    Call,

    /// A `retsub` returning to the block after a call site.
    Return,
}

impl EdgeKind {
    /// Checks whether the edge stays within the unit of code it starts in.
    #[must_use]
    pub fn is_intraprocedural(self) -> bool {
        matches!(self, Self::Fallthrough | Self::Branch)
    }
}

/// A maximal run of instructions with a single entry and a single exit.
///
/// A block contains at most one control-transfer instruction, and if it does
/// that instruction is the last in the block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BasicBlock {
    id:           BlockId,
    instructions: Vec<Instruction>,
    successors:   BTreeSet<BlockId>,
    predecessors: BTreeSet<BlockId>,

    /// The entry block of the subroutine called by this block, if it ends in
    /// `callsub`.
    callee: Option<BlockId>,

    /// The block that execution resumes at once the called subroutine returns.
    return_site: Option<BlockId>,

    /// The subroutine that owns this block, or [`None`] for the main program.
    owner: Option<String>,

    dead: bool,
}

impl BasicBlock {
    #[must_use]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    #[must_use]
    pub fn successors(&self) -> &BTreeSet<BlockId> {
        &self.successors
    }

    #[must_use]
    pub fn predecessors(&self) -> &BTreeSet<BlockId> {
        &self.predecessors
    }

    #[must_use]
    pub fn callee(&self) -> Option<BlockId> {
        self.callee
    }

    #[must_use]
    pub fn return_site(&self) -> Option<BlockId> {
        self.return_site
    }

    /// Gets the name of the subroutine that owns this block, or [`None`] if it
    /// belongs to the main program.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Checks whether the block is unreachable from the entry of the program.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Gets the last instruction of the block.
    #[must_use]
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    /// Gets the labels defined at the start of this block.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.instructions.iter().map_while(Instruction::defined_label)
    }

    /// Gets the source line of the first instruction in the block.
    #[must_use]
    pub fn first_line(&self) -> u32 {
        self.instructions.first().map(Instruction::line).unwrap_or_default()
    }

    /// Gets the source line of the last instruction in the block.
    #[must_use]
    pub fn last_line(&self) -> u32 {
        self.instructions.last().map(Instruction::line).unwrap_or_default()
    }
}

/// The control-flow graph of a whole TEAL program, including all of its
/// subroutines.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControlFlowGraph {
    blocks:      Vec<BasicBlock>,
    edges:       BTreeMap<(BlockId, BlockId), EdgeKind>,
    labels:      BTreeMap<String, BlockId>,
    main:        BTreeSet<BlockId>,
    subroutines: BTreeMap<String, Subroutine>,
}

impl ControlFlowGraph {
    /// Gets the identifier of the block at which execution starts.
    #[must_use]
    pub fn entry(&self) -> BlockId {
        BlockId::ENTRY
    }

    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    /// Gets the number of blocks in the graph.
    #[allow(clippy::len_without_is_empty)] // The graph always has an entry block
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Gets every instruction in the program, in source order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }

    /// Gets the kind of the edge from `from` to `to`, if there is one.
    #[must_use]
    pub fn edge_kind(&self, from: BlockId, to: BlockId) -> Option<EdgeKind> {
        self.edges.get(&(from, to)).copied()
    }

    /// Gets every edge in the graph as `(from, to, kind)`, ordered by source.
    pub fn edges(&self) -> impl Iterator<Item = (BlockId, BlockId, EdgeKind)> + '_ {
        self.edges.iter().map(|((from, to), kind)| (*from, *to, *kind))
    }

    /// Gets the successors of `id` along with the kinds of the edges to them.
    pub fn successor_edges(&self, id: BlockId) -> impl Iterator<Item = (BlockId, EdgeKind)> + '_ {
        self.edges
            .range((id, BlockId::ENTRY)..=(id, BlockId(usize::MAX)))
            .map(|((_, to), kind)| (*to, *kind))
    }

    /// Gets the block that starts at `label`.
    #[must_use]
    pub fn block_for_label(&self, label: &str) -> Option<BlockId> {
        self.labels.get(label).copied()
    }

    /// Gets the block containing the instruction on `line`.
    #[must_use]
    pub fn block_containing_line(&self, line: u32) -> Option<BlockId> {
        self.blocks
            .iter()
            .find(|b| b.instructions.iter().any(|i| i.line() == line))
            .map(BasicBlock::id)
    }

    /// Gets the blocks owned by the main program.
    #[must_use]
    pub fn main_blocks(&self) -> &BTreeSet<BlockId> {
        &self.main
    }

    #[must_use]
    pub fn subroutines(&self) -> &BTreeMap<String, Subroutine> {
        &self.subroutines
    }

    #[must_use]
    pub fn subroutine(&self, name: &str) -> Option<&Subroutine> {
        self.subroutines.get(name)
    }

    /// Gets the subroutines whose entry is `block`.
    pub fn subroutines_entered_at(&self, block: BlockId) -> impl Iterator<Item = &Subroutine> {
        self.subroutines.values().filter(move |s| s.entry() == block)
    }

    /// Gets the dead blocks of the graph.
    pub fn dead_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().filter(|b| b.dead).map(BasicBlock::id)
    }

    /// Computes the set of blocks reachable from `start` over every kind of
    /// edge, including `start` itself.
    #[must_use]
    pub fn reachable_from(&self, start: BlockId) -> BTreeSet<BlockId> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(block) = self.block(id) {
                queue.extend(block.successors.iter().copied().filter(|s| !visited.contains(s)));
            }
        }
        visited
    }

    /// Computes the set of blocks reachable from `start` without leaving the
    /// unit of code that `start` is in.
    ///
    /// Calls are stepped over by moving directly from the call block to its
    /// return site, and returns are not followed.
    #[must_use]
    pub fn intraprocedural_closure(&self, start: BlockId) -> BTreeSet<BlockId> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            let Some(block) = self.block(id) else { continue };
            if let Some(site) = block.return_site {
                queue.push_back(site);
            }
            for (to, kind) in self.successor_edges(id) {
                if kind.is_intraprocedural() {
                    queue.push_back(to);
                }
            }
        }
        visited
    }
}

impl Index<BlockId> for ControlFlowGraph {
    type Output = BasicBlock;

    fn index(&self, index: BlockId) -> &Self::Output {
        &self.blocks[index.index()]
    }
}

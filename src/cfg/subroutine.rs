//! This module contains the [`Subroutine`] type, a named fragment of the
//! control-flow graph entered through `callsub`.

use std::collections::BTreeSet;

use crate::cfg::BlockId;

/// A subroutine of the program.
///
/// A subroutine is identified by the label that its callers name. Its blocks
/// are those reachable from its entry without following calls or returns, so
/// they may overlap with the blocks of other units when code is shared.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subroutine {
    name:       String,
    entry:      BlockId,
    blocks:     BTreeSet<BlockId>,
    exits:      BTreeSet<BlockId>,
    call_sites: BTreeSet<BlockId>,
}

impl Subroutine {
    pub(super) fn new(
        name: String,
        entry: BlockId,
        blocks: BTreeSet<BlockId>,
        exits: BTreeSet<BlockId>,
        call_sites: BTreeSet<BlockId>,
    ) -> Self {
        Self {
            name,
            entry,
            blocks,
            exits,
            call_sites,
        }
    }

    /// Gets the label through which the subroutine is called.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entry(&self) -> BlockId {
        self.entry
    }

    /// Gets every block reachable from the entry within the subroutine.
    #[must_use]
    pub fn blocks(&self) -> &BTreeSet<BlockId> {
        &self.blocks
    }

    /// Gets the blocks that end the subroutine with `retsub`.
    #[must_use]
    pub fn exits(&self) -> &BTreeSet<BlockId> {
        &self.exits
    }

    /// Gets the blocks that call the subroutine.
    #[must_use]
    pub fn call_sites(&self) -> &BTreeSet<BlockId> {
        &self.call_sites
    }

    /// Checks whether the subroutine calls itself, directly or through blocks
    /// that it shares with its callers.
    #[must_use]
    pub fn is_recursive(&self) -> bool {
        self.call_sites.iter().any(|site| self.blocks.contains(site))
    }
}

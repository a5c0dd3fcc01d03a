//! This module contains the [`Contract`], the root aggregate that the
//! detectors and printers analyse.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};

use crate::{
    cfg::{self, BasicBlock, BlockId, ControlFlowGraph, Subroutine},
    error::cfg::Result,
    instruction::Instruction,
    opcode::Mode,
    parser::Listing,
};

/// The ways in which a TEAL program can be executed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// A logic signature, which approves or rejects a transaction without
    /// access to any on-chain state.
    Stateless,

    /// An application, which is called by transactions and has access to its
    /// on-chain state.
    Stateful,

    /// The mode is not known.
    Any,
}

impl ExecutionMode {
    /// Infers the mode of a program from the `instructions` it uses.
    ///
    /// A program that only uses signature-mode instructions is stateless and
    /// one that only uses application-mode instructions is stateful. Programs
    /// that use neither, or both, are [`Self::Any`].
    pub fn infer<'a>(instructions: impl IntoIterator<Item = &'a Instruction>) -> Self {
        let mut signature = false;
        let mut application = false;
        for instruction in instructions {
            match instruction.mode() {
                Mode::Signature => signature = true,
                Mode::Application => application = true,
                Mode::Any => (),
            }
        }

        match (signature, application) {
            (true, false) => Self::Stateless,
            (false, true) => Self::Stateful,
            _ => Self::Any,
        }
    }

    /// Checks whether a program running in this mode may be a logic signature.
    #[must_use]
    pub fn may_be_stateless(self) -> bool {
        matches!(self, Self::Stateless | Self::Any)
    }

    /// Checks whether a program running in this mode may be an application.
    #[must_use]
    pub fn may_be_stateful(self) -> bool {
        matches!(self, Self::Stateful | Self::Any)
    }

    /// Checks whether an opcode with the given `mode` may execute in this
    /// execution mode.
    #[must_use]
    pub fn permits(self, mode: Mode) -> bool {
        match (self, mode) {
            (_, Mode::Any) | (Self::Any, _) => true,
            (Self::Stateless, Mode::Signature) | (Self::Stateful, Mode::Application) => true,
            (Self::Stateless, Mode::Application) | (Self::Stateful, Mode::Signature) => false,
        }
    }
}

impl Display for ExecutionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Stateless => "stateless",
            Self::Stateful => "stateful",
            Self::Any => "any",
        };
        f.write_str(text)
    }
}

/// A parsed TEAL program and its control-flow graph.
///
/// The contract owns every instruction of the program through its
/// [`ControlFlowGraph`], and is immutable once constructed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contract {
    cfg:              ControlFlowGraph,
    version:          u8,
    declared_version: bool,
    mode:             ExecutionMode,
    declared_mode:    bool,
}

impl Contract {
    /// Builds a contract from a parsed `listing`.
    ///
    /// If `mode` is [`None`] the execution mode is inferred from the opcodes
    /// that the program uses.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the control-flow graph cannot be built.
    pub fn from_listing(listing: Listing, mode: Option<ExecutionMode>) -> Result<Self> {
        let version = listing.version();
        let declared_version = listing.has_declared_version();
        let cfg = cfg::build(listing.into_instructions())?;
        Ok(Self::new(cfg, version, declared_version, mode))
    }

    /// Creates a contract from an already-built `cfg`.
    #[must_use]
    pub fn new(
        cfg: ControlFlowGraph,
        version: u8,
        declared_version: bool,
        mode: Option<ExecutionMode>,
    ) -> Self {
        let declared_mode = mode.is_some();
        let mode = mode.unwrap_or_else(|| ExecutionMode::infer(cfg.instructions()));
        Self {
            cfg,
            version,
            declared_version,
            mode,
            declared_mode,
        }
    }

    #[must_use]
    pub fn cfg(&self) -> &ControlFlowGraph {
        &self.cfg
    }

    /// Gets the TEAL version that the program targets.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Checks whether the version was declared by the program itself.
    #[must_use]
    pub fn has_declared_version(&self) -> bool {
        self.declared_version
    }

    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Checks whether the mode was supplied by the caller rather than being
    /// inferred.
    #[must_use]
    pub fn has_declared_mode(&self) -> bool {
        self.declared_mode
    }

    /// Gets every instruction of the program in source order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.cfg.instructions()
    }

    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        self.cfg.blocks()
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.cfg.block(id)
    }

    /// Gets the mapping from subroutine name to subroutine.
    #[must_use]
    pub fn subroutines(&self) -> &BTreeMap<String, Subroutine> {
        self.cfg.subroutines()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        contract::{Contract, ExecutionMode},
        opcode::Mode,
        parser::parse,
    };

    #[test]
    fn infers_the_execution_mode() -> anyhow::Result<()> {
        let stateful = Contract::from_listing(parse(["#pragma version 2", "byte \"k\"", "app_global_get"])?, None)?;
        assert_eq!(stateful.mode(), ExecutionMode::Stateful);
        assert!(!stateful.has_declared_mode());

        let stateless = Contract::from_listing(parse(["arg 0", "len"])?, None)?;
        assert_eq!(stateless.mode(), ExecutionMode::Stateless);

        let unknown = Contract::from_listing(parse(["int 1"])?, None)?;
        assert_eq!(unknown.mode(), ExecutionMode::Any);

        let creator = Contract::from_listing(parse(["txn Sender", "global CreatorAddress", "=="])?, None)?;
        assert_eq!(creator.mode(), ExecutionMode::Stateful);

        Ok(())
    }

    #[test]
    fn declared_modes_win() -> anyhow::Result<()> {
        let contract =
            Contract::from_listing(parse(["int 1"])?, Some(ExecutionMode::Stateless))?;
        assert_eq!(contract.mode(), ExecutionMode::Stateless);
        assert!(contract.has_declared_mode());

        Ok(())
    }

    #[test]
    fn modes_permit_opcodes() {
        assert!(ExecutionMode::Stateless.permits(Mode::Signature));
        assert!(!ExecutionMode::Stateless.permits(Mode::Application));
        assert!(ExecutionMode::Any.permits(Mode::Application));
        assert!(ExecutionMode::Stateful.permits(Mode::Any));
    }
}

//! The control-flow classification of opcodes, used to find the boundaries of
//! basic blocks and the edges between them.

use crate::opcode::Opcode;

/// How an opcode transfers control once it has executed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ControlFlow {
    /// Execution continues with the next instruction.
    Next,

    /// Execution continues at the label unconditionally (`b`).
    Jump,

    /// Execution continues at the label or at the next instruction (`bz`,
    /// `bnz`).
    ConditionalJump,

    /// Execution continues at one of several labels or at the next
    /// instruction (`switch`, `match`).
    MultiJump,

    /// Execution continues in a subroutine and later resumes at the next
    /// instruction (`callsub`).
    Call,

    /// Execution resumes after the most recent call (`retsub`).
    SubroutineReturn,

    /// The program finishes with the value on top of the stack (`return`).
    Return,

    /// The program fails immediately (`err`).
    Fail,
}

impl ControlFlow {
    /// Checks whether the classification transfers control anywhere other
    /// than the next instruction.
    #[must_use]
    pub fn is_transfer(self) -> bool {
        self != Self::Next
    }

    /// Checks whether control may continue with the next instruction in
    /// source order.
    #[must_use]
    pub fn falls_through(self) -> bool {
        matches!(self, Self::Next | Self::ConditionalJump | Self::MultiJump)
    }

    /// Checks whether the classification ends the program.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Return | Self::Fail)
    }
}

impl Opcode {
    /// Gets the control-flow behaviour of the opcode.
    #[must_use]
    pub fn control_flow(self) -> ControlFlow {
        match self {
            Self::B => ControlFlow::Jump,
            Self::Bz | Self::Bnz => ControlFlow::ConditionalJump,
            Self::Switch | Self::Match => ControlFlow::MultiJump,
            Self::Callsub => ControlFlow::Call,
            Self::Retsub => ControlFlow::SubroutineReturn,
            Self::Return => ControlFlow::Return,
            Self::Err => ControlFlow::Fail,
            _ => ControlFlow::Next,
        }
    }

    /// Checks whether the opcode is a control-transfer instruction, and hence
    /// must end a basic block.
    #[must_use]
    pub fn is_control_transfer(self) -> bool {
        self.control_flow().is_transfer()
    }
}

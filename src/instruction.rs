//! This module contains the [`Instruction`] type, a single parsed line of a
//! TEAL listing together with its decoded operands.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    field::{Field, GlobalField, TransactionField},
    opcode::{ControlFlow, Mode, Opcode},
};

/// The decoded form of a byte literal.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum ByteLiteral {
    /// A `0x`-prefixed hexadecimal literal.
    Hex(Vec<u8>),

    /// A quoted string literal, with its escapes resolved.
    Text(Vec<u8>),

    /// A base64 literal, kept in its encoded form.
    Base64(String),

    /// A base32 literal, kept in its encoded form.
    Base32(String),
}

/// A decoded immediate argument of an instruction.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Immediate {
    /// An unsigned integer, including indices and named constants.
    Uint(u64),

    /// A signed integer (the frame offsets of `frame_dig` and `frame_bury`).
    Int(i64),

    /// A byte string.
    Bytes(ByteLiteral),

    /// An account address in its base32 form.
    Address(String),

    /// An ABI method signature.
    Method(String),

    /// A branch target.
    Label(String),

    /// A structured operand.
    Field(Field),
}

/// A single instruction of a TEAL listing.
///
/// Instructions are immutable once parsed. Labels are represented as
/// instructions with the [`Opcode::Label`] pseudo-opcode so that the start of
/// every labelled block is a concrete instruction with a source line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
    /// The 1-based line of the listing on which the instruction occurs.
    line: u32,

    /// The opcode of the instruction.
    opcode: Opcode,

    /// The operand tokens exactly as they were written.
    raw_operands: Vec<String>,

    /// The decoded operands.
    immediates: Vec<Immediate>,

    /// The minimum TEAL version that the instruction requires.
    version: u8,
}

impl Instruction {
    /// Creates a new instruction.
    ///
    /// The version requirement is computed as the maximum of the opcode's
    /// version and the versions of any fields in `immediates`.
    #[must_use]
    pub fn new(
        line: u32,
        opcode: Opcode,
        raw_operands: Vec<String>,
        immediates: Vec<Immediate>,
    ) -> Self {
        let field_version = immediates
            .iter()
            .filter_map(|imm| match imm {
                Immediate::Field(f) => Some(f.version()),
                _ => None,
            })
            .max()
            .unwrap_or_default();
        let version = opcode.version().max(field_version);

        Self {
            line,
            opcode,
            raw_operands,
            immediates,
            version,
        }
    }

    /// Creates a label pseudo-instruction for `name` on `line`.
    #[must_use]
    pub fn label(line: u32, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            line,
            Opcode::Label,
            vec![name.clone()],
            vec![Immediate::Label(name)],
        )
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    #[must_use]
    pub fn raw_operands(&self) -> &[String] {
        &self.raw_operands
    }

    #[must_use]
    pub fn immediates(&self) -> &[Immediate] {
        &self.immediates
    }

    /// Gets the minimum TEAL version required to execute the instruction.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Gets the execution mode in which the instruction can run.
    ///
    /// This is narrower than the mode of the opcode when the instruction reads
    /// a global that only applications have.
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self.global_field() {
            Some(field) if field.is_application_only() => Mode::Application,
            _ => self.opcode.mode(),
        }
    }

    /// Gets the structured operand of the instruction, if it has one.
    #[must_use]
    pub fn field(&self) -> Option<Field> {
        self.immediates.iter().find_map(|imm| match imm {
            Immediate::Field(f) => Some(*f),
            _ => None,
        })
    }

    /// Gets the transaction field read or written by the instruction, if any.
    #[must_use]
    pub fn transaction_field(&self) -> Option<TransactionField> {
        match self.field() {
            Some(Field::Transaction(f)) => Some(f),
            _ => None,
        }
    }

    /// Gets the global field read by the instruction, if any.
    #[must_use]
    pub fn global_field(&self) -> Option<GlobalField> {
        match self.field() {
            Some(Field::Global(f)) => Some(f),
            _ => None,
        }
    }

    /// Gets the first unsigned integer immediate, if any.
    #[must_use]
    pub fn uint(&self) -> Option<u64> {
        self.immediates.iter().find_map(|imm| match imm {
            Immediate::Uint(v) => Some(*v),
            _ => None,
        })
    }

    /// Gets all unsigned integer immediates in order.
    #[must_use]
    pub fn uints(&self) -> Vec<u64> {
        self.immediates
            .iter()
            .filter_map(|imm| match imm {
                Immediate::Uint(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Gets every label referenced by the instruction, in order.
    ///
    /// For the label pseudo-instruction this is the label it defines.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.immediates
            .iter()
            .filter_map(|imm| match imm {
                Immediate::Label(l) => Some(l.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Gets the name of the label defined by this instruction if it is a label
    /// pseudo-instruction.
    #[must_use]
    pub fn defined_label(&self) -> Option<&str> {
        if self.opcode == Opcode::Label {
            self.labels().first().copied()
        } else {
            None
        }
    }

    /// Gets the control-flow behaviour of the instruction.
    #[must_use]
    pub fn control_flow(&self) -> ControlFlow {
        self.opcode.control_flow()
    }

    /// Checks whether the instruction transfers control and hence must be the
    /// last instruction of its block.
    #[must_use]
    pub fn is_control_transfer(&self) -> bool {
        self.opcode.is_control_transfer()
    }
}

/// Renders the instruction as it would appear in a listing.
impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(label) = self.defined_label() {
            return write!(f, "{label}:");
        }
        if self.raw_operands.is_empty() {
            write!(f, "{}", self.opcode)
        } else {
            write!(f, "{} {}", self.opcode, self.raw_operands.iter().join(" "))
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        field::{Field, GlobalField, TransactionField},
        instruction::{Immediate, Instruction},
        opcode::{Mode, Opcode},
    };

    #[test]
    fn application_globals_narrow_the_mode() {
        let global = |field: GlobalField| {
            Instruction::new(
                2,
                Opcode::Global,
                vec![field.name().into()],
                vec![Immediate::Field(Field::Global(field))],
            )
        };

        assert_eq!(Opcode::Global.mode(), Mode::Any);
        assert_eq!(global(GlobalField::CreatorAddress).mode(), Mode::Application);
        assert_eq!(global(GlobalField::LatestTimestamp).mode(), Mode::Application);
        assert_eq!(global(GlobalField::ZeroAddress).mode(), Mode::Any);
    }

    #[test]
    fn version_accounts_for_fields() {
        let instruction = Instruction::new(
            3,
            Opcode::Txn,
            vec!["RekeyTo".into()],
            vec![Immediate::Field(Field::Transaction(TransactionField::RekeyTo))],
        );

        assert_eq!(Opcode::Txn.version(), 1);
        assert_eq!(instruction.version(), 2);
        assert_eq!(instruction.transaction_field(), Some(TransactionField::RekeyTo));
    }

    #[test]
    fn renders_like_the_listing() {
        let label = Instruction::label(1, "main");
        assert_eq!(label.to_string(), "main:");
        assert_eq!(label.defined_label(), Some("main"));

        let branch = Instruction::new(
            2,
            Opcode::Bnz,
            vec!["main".into()],
            vec![Immediate::Label("main".into())],
        );
        assert_eq!(branch.to_string(), "bnz main");
        assert_eq!(branch.defined_label(), None);
        assert_eq!(branch.labels(), vec!["main"]);
        assert!(branch.is_control_transfer());
    }
}

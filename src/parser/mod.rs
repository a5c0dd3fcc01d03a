//! This module contains the parser that turns the lines of a TEAL listing into
//! a [`Listing`] of [`Instruction`]s.
//!
//! Parsing is a pure function of the text and the opcode table. Each line may
//! contain a label definition, an instruction, or both, along with a trailing
//! comment. The `#pragma version` directive is consumed by the parser and does
//! not produce an instruction.
//!
//! # Version Gating
//!
//! Instructions and fields that require a newer version of TEAL than the
//! listing declares are _not_ rejected. Each [`Instruction`] records the
//! version it requires, leaving the mismatch to be reported by analysis.

pub mod operand;
pub mod tokenizer;

use std::collections::HashSet;

use crate::{
    constant::{DEFAULT_TEAL_VERSION, MAX_SUPPORTED_VERSION},
    error::{
        container::Locatable,
        parse::{Error, LocatedError, Result},
    },
    instruction::Instruction,
    opcode::Opcode,
};

/// The directive token that begins a pragma line.
const PRAGMA_DIRECTIVE: &str = "#pragma";

/// The only pragma that the analyzer understands.
const VERSION_PRAGMA: &str = "version";

/// The result of parsing a TEAL listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Listing {
    /// The version of TEAL that the listing targets.
    version: u8,

    /// Whether `version` came from a pragma in the listing.
    declared: bool,

    /// The parsed instructions, in source order.
    instructions: Vec<Instruction>,
}

impl Listing {
    /// Gets the version of TEAL that the listing targets.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Checks whether the version was declared by a `#pragma version` line in
    /// the listing, rather than being the default.
    #[must_use]
    pub fn has_declared_version(&self) -> bool {
        self.declared
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Gets the instructions, consuming the listing.
    #[must_use]
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}

/// A listing can be parsed directly from its source text.
impl TryFrom<&str> for Listing {
    type Error = LocatedError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        parse(value.lines())
    }
}

/// Parses the `lines` of a TEAL listing, assuming [`DEFAULT_TEAL_VERSION`] if
/// the listing does not declare a version.
///
/// # Errors
///
/// Returns [`Err`] if any line is malformed, or if the listing contains no
/// instructions.
pub fn parse<I, S>(lines: I) -> Result<Listing>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_with_default_version(lines, DEFAULT_TEAL_VERSION)
}

/// Parses the `lines` of a TEAL listing, assuming `default_version` if the
/// listing does not declare a version.
///
/// # Errors
///
/// Returns [`Err`] if any line is malformed, or if the listing contains no
/// instructions.
pub fn parse_with_default_version<I, S>(lines: I, default_version: u8) -> Result<Listing>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = Parser::new(default_version);
    for (index, line) in lines.into_iter().enumerate() {
        let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        parser.line(number, line.as_ref()).map_err(|e| e.locate(number))?;
    }
    parser.finish()
}

/// The state of an in-progress parse.
#[derive(Debug)]
struct Parser {
    version:      u8,
    declared:     bool,
    labels:       HashSet<String>,
    instructions: Vec<Instruction>,
}

impl Parser {
    fn new(default_version: u8) -> Self {
        Self {
            version:      default_version,
            declared:     false,
            labels:       HashSet::new(),
            instructions: Vec::new(),
        }
    }

    /// Parses a single source line numbered `number`.
    fn line(&mut self, number: u32, text: &str) -> std::result::Result<(), Error> {
        let tokens = tokenizer::tokenize(text)?;
        let Some(first) = tokens.first() else {
            return Ok(());
        };

        if first == PRAGMA_DIRECTIVE {
            return self.pragma(&tokens, text);
        }

        let mut rest = tokens.as_slice();
        if let Some(name) = first.strip_suffix(':') {
            self.label(number, name)?;
            rest = &rest[1..];
        }

        let Some((mnemonic, operands)) = rest.split_first() else {
            return Ok(());
        };
        let opcode = Opcode::from_mnemonic(mnemonic)
            .ok_or_else(|| Error::UnknownMnemonic(mnemonic.clone()))?;
        let immediates = operand::decode(opcode, operands)?;
        self.instructions
            .push(Instruction::new(number, opcode, operands.to_vec(), immediates));

        Ok(())
    }

    fn label(&mut self, number: u32, name: &str) -> std::result::Result<(), Error> {
        if name.is_empty() {
            return Err(Error::EmptyLabel);
        }
        if !self.labels.insert(name.to_string()) {
            return Err(Error::DuplicateLabel(name.to_string()));
        }
        self.instructions.push(Instruction::label(number, name));
        Ok(())
    }

    fn pragma(&mut self, tokens: &[String], text: &str) -> std::result::Result<(), Error> {
        let [_, kind, value] = tokens else {
            return Err(Error::InvalidPragma(text.trim().to_string()));
        };
        if kind != VERSION_PRAGMA {
            return Err(Error::InvalidPragma(text.trim().to_string()));
        }
        if self.declared || !self.instructions.is_empty() {
            return Err(Error::MisplacedPragma);
        }

        let version: u64 = value
            .parse()
            .map_err(|_| Error::InvalidPragma(text.trim().to_string()))?;
        let version = u8::try_from(version)
            .ok()
            .filter(|v| (1..=MAX_SUPPORTED_VERSION).contains(v))
            .ok_or(Error::UnsupportedVersion(version))?;

        self.version = version;
        self.declared = true;
        Ok(())
    }

    fn finish(self) -> Result<Listing> {
        if self.instructions.is_empty() {
            return Err(Error::EmptyListing.locate(0));
        }
        log::debug!(
            "Parsed {} instructions targeting TEAL v{}",
            self.instructions.len(),
            self.version
        );

        Ok(Listing {
            version:      self.version,
            declared:     self.declared,
            instructions: self.instructions,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{
        error::parse::Error,
        field::{Field, GlobalField, TransactionField},
        instruction::Immediate,
        opcode::Opcode,
        parser::{parse, parse_with_default_version, Listing},
    };

    #[test]
    fn parses_the_creator_check() -> anyhow::Result<()> {
        let listing = parse([
            "txn Sender",
            "global CreatorAddress",
            "==",
            "assert",
            "int 1",
            "return",
        ])?;

        let instructions = listing.instructions();
        assert_eq!(instructions.len(), 6);
        assert_eq!(instructions[0].transaction_field(), Some(TransactionField::Sender));
        assert_eq!(instructions[1].global_field(), Some(GlobalField::CreatorAddress));
        assert_eq!(instructions[2].opcode(), Opcode::Eq);
        assert_eq!(instructions[4].uint(), Some(1));
        assert_eq!(
            instructions.iter().map(|i| i.line()).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert_eq!(listing.version(), 1);
        assert!(!listing.has_declared_version());

        Ok(())
    }

    #[test]
    fn handles_pragmas_labels_and_comments() -> anyhow::Result<()> {
        let listing = Listing::try_from(
            "#pragma version 6\n\
             // leading comment\n\
             \n\
             main: int 1 // trailing\n\
             bnz done\n\
             done:\n\
             int 1",
        )?;

        assert_eq!(listing.version(), 6);
        assert!(listing.has_declared_version());

        let opcodes: Vec<_> = listing.instructions().iter().map(|i| i.opcode()).collect();
        assert_eq!(
            opcodes,
            vec![Opcode::Label, Opcode::Int, Opcode::Bnz, Opcode::Label, Opcode::Int]
        );
        assert_eq!(listing.instructions()[0].line(), 4);
        assert_eq!(listing.instructions()[1].line(), 4);
        assert_eq!(listing.instructions()[3].defined_label(), Some("done"));

        Ok(())
    }

    #[test]
    fn uses_the_default_version() -> anyhow::Result<()> {
        let listing = parse_with_default_version(["int 1"], 4)?;
        assert_eq!(listing.version(), 4);

        Ok(())
    }

    #[test]
    fn keeps_version_gated_instructions() -> anyhow::Result<()> {
        let listing = parse(["#pragma version 2", "callsub f", "f:", "retsub"])?;
        assert_eq!(listing.version(), 2);
        assert_eq!(listing.instructions()[0].version(), 4);

        Ok(())
    }

    #[test]
    fn reports_errors_with_lines() {
        let err = parse(["int 1", "frobnicate"]).unwrap_err();
        assert_eq!(err.line(), 2);
        assert_eq!(err.payload, Error::UnknownMnemonic("frobnicate".into()));

        let err = parse(["txn Foo"]).unwrap_err();
        assert_eq!(err.line(), 1);
        assert!(matches!(err.payload, Error::UnknownField(_)));

        let err = parse(["x:", "int 1", "x:"]).unwrap_err();
        assert_eq!(err.line(), 3);
        assert_eq!(err.payload, Error::DuplicateLabel("x".into()));

        let err = parse(["int 1", "#pragma version 3"]).unwrap_err();
        assert_eq!(err.payload, Error::MisplacedPragma);

        let err = parse(["#pragma version 99"]).unwrap_err();
        assert_eq!(err.payload, Error::UnsupportedVersion(99));

        let err = parse(["#pragma mode"]).unwrap_err();
        assert!(matches!(err.payload, Error::InvalidPragma(_)));

        let err = parse(["// nothing", ""]).unwrap_err();
        assert_eq!(err.payload, Error::EmptyListing);
    }

    #[test]
    fn decodes_gtxn_fields() -> anyhow::Result<()> {
        let listing = parse(["gtxn 1 RekeyTo"])?;
        let instruction = &listing.instructions()[0];
        assert_eq!(instruction.immediates()[0], Immediate::Uint(1));
        assert_eq!(
            instruction.field(),
            Some(Field::Transaction(TransactionField::RekeyTo))
        );
        assert_eq!(instruction.raw_operands(), &["1".to_string(), "RekeyTo".to_string()]);

        Ok(())
    }
}

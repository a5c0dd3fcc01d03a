//! This module contains the decoding of operand tokens into [`Immediate`]s,
//! driven by the [`ImmediateKind`]s that an opcode declares.

use std::num::IntErrorKind;

use crate::{
    constant::NAMED_INTEGER_CONSTANTS,
    error::parse::Error,
    field::Field,
    instruction::{ByteLiteral, Immediate},
    opcode::{ImmediateKind, Opcode},
};

/// The keywords that introduce a two-token base64 literal.
const BASE64_KEYWORDS: [&str; 2] = ["base64", "b64"];

/// The keywords that introduce a two-token base32 literal.
const BASE32_KEYWORDS: [&str; 2] = ["base32", "b32"];

/// The length of a base32 encoded account address.
const ADDRESS_LENGTH: usize = 58;

/// Decodes the operand `tokens` of an instruction with the given `opcode`.
///
/// # Errors
///
/// Returns [`Err`] if the tokens do not match the immediates declared by the
/// opcode, or if any of them fails to decode.
pub fn decode(opcode: Opcode, tokens: &[String]) -> Result<Vec<Immediate>, Error> {
    let kinds = opcode.immediates();
    let mut cursor = Cursor::new(opcode, tokens);
    let mut immediates = Vec::with_capacity(kinds.len());

    for kind in kinds {
        match kind {
            ImmediateKind::Uint => immediates.push(Immediate::Uint(uint(cursor.take()?)?)),
            ImmediateKind::Uint8 | ImmediateKind::Index => {
                if matches!(kind, ImmediateKind::Index) {
                    require_array_field(&immediates, true)?;
                }
                immediates.push(Immediate::Uint(uint8(cursor.take()?)?));
            }
            ImmediateKind::Int8 => immediates.push(Immediate::Int(int8(cursor.take()?)?)),
            ImmediateKind::Bytes => immediates.push(Immediate::Bytes(cursor.bytes()?)),
            ImmediateKind::Address => immediates.push(Immediate::Address(address(cursor.take()?)?)),
            ImmediateKind::Method => immediates.push(Immediate::Method(method(cursor.take()?)?)),
            ImmediateKind::Label => immediates.push(Immediate::Label(cursor.take()?.to_string())),
            ImmediateKind::Labels => {
                while let Some(token) = cursor.take_optional() {
                    immediates.push(Immediate::Label(token.to_string()));
                }
            }
            ImmediateKind::Uints => {
                while let Some(token) = cursor.take_optional() {
                    immediates.push(Immediate::Uint(uint(token)?));
                }
            }
            ImmediateKind::BytesList => {
                while !cursor.is_done() {
                    immediates.push(Immediate::Bytes(cursor.bytes()?));
                }
            }
            ImmediateKind::Field(category) => {
                immediates.push(Immediate::Field(Field::parse(*category, cursor.take()?)?));
            }
            ImmediateKind::OptionalIndex => {
                let is_array = require_array_field(&immediates, false)?;
                match (is_array, cursor.take_optional()) {
                    (true, Some(token)) => immediates.push(Immediate::Uint(uint8(token)?)),
                    (true, None) => {
                        return Err(Error::MissingArrayIndex {
                            field: last_field_name(&immediates),
                        })
                    }
                    (false, Some(_)) => {
                        return Err(Error::UnexpectedArrayIndex {
                            field: last_field_name(&immediates),
                        })
                    }
                    (false, None) => (),
                }
            }
        }
    }

    if cursor.is_done() {
        Ok(immediates)
    } else {
        Err(cursor.count_error())
    }
}

/// Describes the number of operands that `opcode` expects, for use in error
/// messages.
#[must_use]
pub fn describe_arity(opcode: Opcode) -> String {
    let kinds = opcode.immediates();
    let fixed = kinds
        .iter()
        .filter(|k| !k.is_variadic() && !matches!(k, ImmediateKind::OptionalIndex))
        .count();

    if kinds.iter().any(|k| k.is_variadic()) {
        format!("at least {fixed}")
    } else if kinds.contains(&ImmediateKind::OptionalIndex) {
        format!("{fixed} or {}", fixed + 1)
    } else {
        fixed.to_string()
    }
}

/// A cursor over the operand tokens of a single instruction.
struct Cursor<'a> {
    opcode:   Opcode,
    tokens:   &'a [String],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(opcode: Opcode, tokens: &'a [String]) -> Self {
        Self {
            opcode,
            tokens,
            position: 0,
        }
    }

    fn take_optional(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token.as_str())
    }

    fn take(&mut self) -> Result<&'a str, Error> {
        self.take_optional().ok_or_else(|| self.count_error())
    }

    fn is_done(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn count_error(&self) -> Error {
        Error::WrongOperandCount {
            mnemonic: self.opcode.mnemonic().to_string(),
            expected: describe_arity(self.opcode),
            found:    self.tokens.len(),
        }
    }

    /// Consumes a byte literal, which may occupy one or two tokens.
    fn bytes(&mut self) -> Result<ByteLiteral, Error> {
        let first = self.take()?;
        if BASE64_KEYWORDS.contains(&first) {
            let encoded = self.take()?;
            return base64(encoded);
        }
        if BASE32_KEYWORDS.contains(&first) {
            let encoded = self.take()?;
            return base32(encoded);
        }
        bytes(first)
    }
}

/// Checks whether the most recent field decoded for this instruction is an
/// array transaction field.
///
/// If `required` is set the field must be an array, as for `txna`.
fn require_array_field(immediates: &[Immediate], required: bool) -> Result<bool, Error> {
    let is_array = matches!(
        immediates.last(),
        Some(Immediate::Field(Field::Transaction(f))) if f.is_array()
    );
    if required && !is_array {
        return Err(Error::UnexpectedArrayIndex {
            field: last_field_name(immediates),
        });
    }
    Ok(is_array)
}

fn last_field_name(immediates: &[Immediate]) -> String {
    immediates
        .iter()
        .rev()
        .find_map(|imm| match imm {
            Immediate::Field(f) => Some(f.name().to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Parses an unsigned 64-bit integer operand.
///
/// Decimal, `0x` hexadecimal, `0o` octal and `0b` binary forms are accepted, as
/// are the named integer constants such as `pay` or `UpdateApplication`.
///
/// # Errors
///
/// Returns [`Err`] if the token is not an integer or does not fit in 64 bits.
pub fn uint(token: &str) -> Result<u64, Error> {
    if let Some((_, value)) = NAMED_INTEGER_CONSTANTS.iter().find(|(name, _)| *name == token) {
        return Ok(*value);
    }

    let (digits, radix) = if let Some(rest) = token.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = token.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = token.strip_prefix("0b") {
        (rest, 2)
    } else {
        (token, 10)
    };

    u64::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => Error::OperandOutOfRange {
            operand: token.to_string(),
            min:     0,
            max:     u64::MAX,
        },
        _ => Error::InvalidInteger {
            operand: token.to_string(),
        },
    })
}

/// Parses an unsigned integer operand in `0..=255`.
///
/// # Errors
///
/// Returns [`Err`] if the token is not an integer or is out of range.
pub fn uint8(token: &str) -> Result<u64, Error> {
    let value = uint(token)?;
    if value > u64::from(u8::MAX) {
        return Err(Error::OperandOutOfRange {
            operand: token.to_string(),
            min:     0,
            max:     u64::from(u8::MAX),
        });
    }
    Ok(value)
}

/// Parses a signed integer operand in `-128..=127`.
///
/// # Errors
///
/// Returns [`Err`] if the token is not an integer or is out of range.
pub fn int8(token: &str) -> Result<i64, Error> {
    let value: i64 = token.parse().map_err(|_| Error::InvalidInteger {
        operand: token.to_string(),
    })?;
    if i8::try_from(value).is_err() {
        return Err(Error::OperandOutOfRange {
            operand: token.to_string(),
            min:     i64::from(i8::MIN),
            max:     0x7f,
        });
    }
    Ok(value)
}

/// Parses a single-token byte literal.
///
/// # Errors
///
/// Returns [`Err`] if the token is not a valid byte literal.
pub fn bytes(token: &str) -> Result<ByteLiteral, Error> {
    let invalid = || Error::InvalidBytes {
        literal: token.to_string(),
    };

    if let Some(digits) = token.strip_prefix("0x") {
        return hex::decode(digits).map(ByteLiteral::Hex).map_err(|_| invalid());
    }
    if token.starts_with('"') {
        return string(token).map(ByteLiteral::Text);
    }
    for keyword in BASE64_KEYWORDS {
        if let Some(inner) = wrapped(token, keyword) {
            return base64(inner);
        }
    }
    for keyword in BASE32_KEYWORDS {
        if let Some(inner) = wrapped(token, keyword) {
            return base32(inner);
        }
    }

    Err(invalid())
}

/// Extracts `inner` from a token of the form `keyword(inner)`.
fn wrapped<'a>(token: &'a str, keyword: &str) -> Option<&'a str> {
    token.strip_prefix(keyword)?.strip_prefix('(')?.strip_suffix(')')
}

fn base64(encoded: &str) -> Result<ByteLiteral, Error> {
    let valid = encoded
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '-' | '_'));
    if valid {
        Ok(ByteLiteral::Base64(encoded.to_string()))
    } else {
        Err(Error::InvalidBytes {
            literal: encoded.to_string(),
        })
    }
}

fn base32(encoded: &str) -> Result<ByteLiteral, Error> {
    if is_base32(encoded) {
        Ok(ByteLiteral::Base32(encoded.to_string()))
    } else {
        Err(Error::InvalidBytes {
            literal: encoded.to_string(),
        })
    }
}

fn is_base32(encoded: &str) -> bool {
    encoded
        .chars()
        .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c) || c == '=')
}

/// Decodes a quoted string literal, resolving its escape sequences.
///
/// # Errors
///
/// Returns [`Err`] if the literal is not quoted or contains an invalid escape.
pub fn string(token: &str) -> Result<Vec<u8>, Error> {
    let invalid = || Error::InvalidBytes {
        literal: token.to_string(),
    };
    let inner = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(invalid)?;

    let mut result = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buffer = [0u8; 4];
            result.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
            continue;
        }
        match chars.next().ok_or_else(invalid)? {
            'n' => result.push(b'\n'),
            'r' => result.push(b'\r'),
            't' => result.push(b'\t'),
            '0' => result.push(0),
            '\\' => result.push(b'\\'),
            '"' => result.push(b'"'),
            'x' => {
                let digits: String = chars.by_ref().take(2).collect();
                let byte = u8::from_str_radix(&digits, 16).map_err(|_| invalid())?;
                result.push(byte);
            }
            _ => return Err(invalid()),
        }
    }

    Ok(result)
}

fn address(token: &str) -> Result<String, Error> {
    if token.len() == ADDRESS_LENGTH && is_base32(token) {
        Ok(token.to_string())
    } else {
        Err(Error::InvalidBytes {
            literal: token.to_string(),
        })
    }
}

fn method(token: &str) -> Result<String, Error> {
    let signature = string(token)?;
    String::from_utf8(signature).map_err(|_| Error::InvalidBytes {
        literal: token.to_string(),
    })
}

#[cfg(test)]
mod test {
    use crate::{
        error::parse::Error,
        field::{Field, GlobalField, TransactionField},
        instruction::{ByteLiteral, Immediate},
        opcode::Opcode,
        parser::operand::{bytes, decode, describe_arity, int8, string, uint, uint8},
    };

    fn tokens(ts: &[&str]) -> Vec<String> {
        ts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_integers() -> anyhow::Result<()> {
        assert_eq!(uint("42")?, 42);
        assert_eq!(uint("0x10")?, 16);
        assert_eq!(uint("0b101")?, 5);
        assert_eq!(uint("UpdateApplication")?, 4);
        assert_eq!(uint("appl")?, 6);
        assert!(matches!(uint("seven"), Err(Error::InvalidInteger { .. })));
        assert!(matches!(
            uint("18446744073709551616"),
            Err(Error::OperandOutOfRange { .. })
        ));

        Ok(())
    }

    #[test]
    fn checks_small_integer_ranges() -> anyhow::Result<()> {
        assert_eq!(uint8("255")?, 255);
        assert!(matches!(uint8("256"), Err(Error::OperandOutOfRange { max: 255, .. })));
        assert_eq!(int8("-128")?, -128);
        assert!(matches!(int8("128"), Err(Error::OperandOutOfRange { min: -128, .. })));

        Ok(())
    }

    #[test]
    fn parses_byte_literals() -> anyhow::Result<()> {
        assert_eq!(bytes("0xdead")?, ByteLiteral::Hex(vec![0xde, 0xad]));
        assert_eq!(bytes(r#""a\nb""#)?, ByteLiteral::Text(b"a\nb".to_vec()));
        assert_eq!(bytes("b64(AAEC)")?, ByteLiteral::Base64("AAEC".into()));
        assert_eq!(bytes("base32(MFRGG)")?, ByteLiteral::Base32("MFRGG".into()));
        assert!(bytes("0xabc").is_err());
        assert!(bytes("plain").is_err());
        assert_eq!(string(r#""\x41\x42""#)?, b"AB".to_vec());

        Ok(())
    }

    #[test]
    fn decodes_two_token_byte_literals() -> anyhow::Result<()> {
        let imms = decode(Opcode::Byte, &tokens(&["base64", "AAEC"]))?;
        assert_eq!(imms, vec![Immediate::Bytes(ByteLiteral::Base64("AAEC".into()))]);

        let imms = decode(Opcode::Bytecblock, &tokens(&["0x01", "b32", "AE", "\"x\""]))?;
        assert_eq!(imms.len(), 3);

        Ok(())
    }

    #[test]
    fn decodes_fields() -> anyhow::Result<()> {
        let imms = decode(Opcode::Global, &tokens(&["CreatorAddress"]))?;
        assert_eq!(imms, vec![Immediate::Field(Field::Global(GlobalField::CreatorAddress))]);

        let imms = decode(Opcode::Gtxn, &tokens(&["1", "Receiver"]))?;
        assert_eq!(
            imms,
            vec![
                Immediate::Uint(1),
                Immediate::Field(Field::Transaction(TransactionField::Receiver))
            ]
        );

        Ok(())
    }

    #[test]
    fn checks_array_indices() -> anyhow::Result<()> {
        assert_eq!(decode(Opcode::Txn, &tokens(&["ApplicationArgs", "0"]))?.len(), 2);
        assert_eq!(decode(Opcode::Txna, &tokens(&["Accounts", "1"]))?.len(), 2);
        assert!(matches!(
            decode(Opcode::Txn, &tokens(&["ApplicationArgs"])),
            Err(Error::MissingArrayIndex { .. })
        ));
        assert!(matches!(
            decode(Opcode::Txn, &tokens(&["Sender", "0"])),
            Err(Error::UnexpectedArrayIndex { .. })
        ));
        assert!(matches!(
            decode(Opcode::Txna, &tokens(&["Sender", "0"])),
            Err(Error::UnexpectedArrayIndex { .. })
        ));

        Ok(())
    }

    #[test]
    fn rejects_wrong_operand_counts() {
        let result = decode(Opcode::Int, &tokens(&["1", "2"]));
        assert_eq!(
            result,
            Err(Error::WrongOperandCount {
                mnemonic: "int".into(),
                expected: "1".into(),
                found:    2,
            })
        );

        assert!(matches!(
            decode(Opcode::Bnz, &[]),
            Err(Error::WrongOperandCount { found: 0, .. })
        ));
    }

    #[test]
    fn describes_arities() {
        assert_eq!(describe_arity(Opcode::Add), "0");
        assert_eq!(describe_arity(Opcode::Gtxn), "2 or 3");
        assert_eq!(describe_arity(Opcode::Switch), "at least 0");
    }

    #[test]
    fn accepts_variadic_lists() -> anyhow::Result<()> {
        assert!(decode(Opcode::Switch, &[])?.is_empty());
        assert_eq!(
            decode(Opcode::Intcblock, &tokens(&["0", "1", "pay"]))?,
            vec![Immediate::Uint(0), Immediate::Uint(1), Immediate::Uint(1)]
        );

        Ok(())
    }
}

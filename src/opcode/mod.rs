//! This module contains the [`Opcode`] type, the static description of every
//! TEAL [opcode](https://developer.algorand.org/docs/get-details/dapps/avm/teal/opcodes/)
//! that the analyzer understands.
//!
//! Each opcode carries the metadata needed by the parser and the analyses:
//!
//! - The mnemonic with which it is written in a listing.
//! - The first version of TEAL in which it is available.
//! - The [`Mode`] in which it may be executed.
//! - Its [`StackEffect`], where that is independent of its immediates.
//! - The kinds of immediate arguments it takes, as [`ImmediateKind`]s.
//!
//! The assembler pseudo-ops (`int`, `byte`, `addr` and `method`) are included
//! as opcodes as they appear in listings exactly like real instructions.

mod control;

use std::{collections::HashMap, sync::OnceLock};

pub use control::ControlFlow;
use serde::{Deserialize, Serialize};

use crate::field::FieldCategory;

/// The execution mode(s) in which an opcode is permitted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Mode {
    /// Usable in both logic signatures and applications.
    Any,

    /// Only usable in logic signatures (stateless programs).
    Signature,

    /// Only usable in applications (stateful programs).
    Application,
}

/// The number of stack items an opcode consumes and produces.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StackEffect {
    /// A fixed number of items is popped and then pushed.
    Fixed { pops: u8, pushes: u8 },

    /// The effect depends on the immediates or on runtime values.
    Dynamic,
}

/// Shorthand for a fixed stack effect in the opcode table.
const fn io(pops: u8, pushes: u8) -> StackEffect {
    StackEffect::Fixed { pops, pushes }
}

/// Shorthand for a dynamic stack effect in the opcode table.
const DYN: StackEffect = StackEffect::Dynamic;

/// The kinds of immediate argument that follow a mnemonic.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ImmediateKind {
    /// An unsigned 64-bit integer, or one of the named integer constants.
    Uint,

    /// An unsigned integer in `0..=255`.
    Uint8,

    /// A signed integer in `-128..=127`.
    Int8,

    /// A byte literal, which may span two tokens (`base64 AA==`).
    Bytes,

    /// A base32 encoded account address.
    Address,

    /// A quoted ABI method signature.
    Method,

    /// A branch target.
    Label,

    /// Zero or more branch targets. Only valid as the last kind.
    Labels,

    /// Zero or more unsigned integers. Only valid as the last kind.
    Uints,

    /// Zero or more byte literals. Only valid as the last kind.
    BytesList,

    /// The name of a field in the given category.
    Field(FieldCategory),

    /// A `0..=255` index into the preceding array transaction field.
    Index,

    /// An index that must be present if, and only if, the preceding
    /// transaction field is an array.
    OptionalIndex,
}

impl ImmediateKind {
    /// Checks whether the kind consumes all of the remaining operands.
    #[must_use]
    pub fn is_variadic(self) -> bool {
        matches!(self, Self::Labels | Self::Uints | Self::BytesList)
    }
}

/// Defines the [`Opcode`] enum and its metadata accessors from a table of
/// `Variant = "mnemonic", version, mode, stack effect, [immediates]` rows.
macro_rules! opcodes {
    ($($variant:ident = $mnemonic:literal, $version:literal, $mode:ident, $effect:expr, [$($kind:expr),*];)+) => {
        /// A TEAL opcode.
        #[allow(non_camel_case_types)] // Mirrors mnemonics such as `sha512_256`
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
        pub enum Opcode {
            $($variant),+
        }

        impl Opcode {
            /// Every opcode known to the analyzer.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Gets the textual mnemonic of the opcode.
            #[must_use]
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$variant => $mnemonic),+
                }
            }

            /// Gets the first TEAL version in which the opcode is available.
            #[must_use]
            pub fn version(self) -> u8 {
                match self {
                    $(Self::$variant => $version),+
                }
            }

            /// Gets the mode(s) in which the opcode can execute.
            #[must_use]
            pub fn mode(self) -> Mode {
                match self {
                    $(Self::$variant => Mode::$mode),+
                }
            }

            /// Gets the effect of the opcode on the stack.
            #[must_use]
            pub fn stack_effect(self) -> StackEffect {
                match self {
                    $(Self::$variant => $effect),+
                }
            }

            /// Gets the kinds of the immediates that the opcode takes, in
            /// order.
            #[must_use]
            pub fn immediates(self) -> &'static [ImmediateKind] {
                match self {
                    $(Self::$variant => &[$($kind),*]),+
                }
            }
        }
    };
}

use ImmediateKind::{
    Address,
    Bytes,
    BytesList,
    Index,
    Int8,
    Label as Target,
    Labels,
    Method,
    OptionalIndex,
    Uint,
    Uint8,
    Uints,
};

const TXN: ImmediateKind = ImmediateKind::Field(FieldCategory::Transaction);

opcodes! {
    Label = "label", 1, Any, io(0, 0), [Target];
    Err = "err", 1, Any, io(0, 0), [];
    Sha256 = "sha256", 1, Any, io(1, 1), [];
    Keccak256 = "keccak256", 1, Any, io(1, 1), [];
    Sha512_256 = "sha512_256", 1, Any, io(1, 1), [];
    Ed25519Verify = "ed25519verify", 1, Any, io(3, 1), [];
    Add = "+", 1, Any, io(2, 1), [];
    Sub = "-", 1, Any, io(2, 1), [];
    Div = "/", 1, Any, io(2, 1), [];
    Mul = "*", 1, Any, io(2, 1), [];
    Lt = "<", 1, Any, io(2, 1), [];
    Gt = ">", 1, Any, io(2, 1), [];
    Le = "<=", 1, Any, io(2, 1), [];
    Ge = ">=", 1, Any, io(2, 1), [];
    And = "&&", 1, Any, io(2, 1), [];
    Or = "||", 1, Any, io(2, 1), [];
    Eq = "==", 1, Any, io(2, 1), [];
    Ne = "!=", 1, Any, io(2, 1), [];
    Not = "!", 1, Any, io(1, 1), [];
    Len = "len", 1, Any, io(1, 1), [];
    Itob = "itob", 1, Any, io(1, 1), [];
    Btoi = "btoi", 1, Any, io(1, 1), [];
    Mod = "%", 1, Any, io(2, 1), [];
    BitOr = "|", 1, Any, io(2, 1), [];
    BitAnd = "&", 1, Any, io(2, 1), [];
    BitXor = "^", 1, Any, io(2, 1), [];
    BitNot = "~", 1, Any, io(1, 1), [];
    Mulw = "mulw", 1, Any, io(2, 2), [];
    Intcblock = "intcblock", 1, Any, io(0, 0), [Uints];
    Intc = "intc", 1, Any, io(0, 1), [Uint8];
    Intc0 = "intc_0", 1, Any, io(0, 1), [];
    Intc1 = "intc_1", 1, Any, io(0, 1), [];
    Intc2 = "intc_2", 1, Any, io(0, 1), [];
    Intc3 = "intc_3", 1, Any, io(0, 1), [];
    Bytecblock = "bytecblock", 1, Any, io(0, 0), [BytesList];
    Bytec = "bytec", 1, Any, io(0, 1), [Uint8];
    Bytec0 = "bytec_0", 1, Any, io(0, 1), [];
    Bytec1 = "bytec_1", 1, Any, io(0, 1), [];
    Bytec2 = "bytec_2", 1, Any, io(0, 1), [];
    Bytec3 = "bytec_3", 1, Any, io(0, 1), [];
    Arg = "arg", 1, Signature, io(0, 1), [Uint8];
    Arg0 = "arg_0", 1, Signature, io(0, 1), [];
    Arg1 = "arg_1", 1, Signature, io(0, 1), [];
    Arg2 = "arg_2", 1, Signature, io(0, 1), [];
    Arg3 = "arg_3", 1, Signature, io(0, 1), [];
    Txn = "txn", 1, Any, io(0, 1), [TXN, OptionalIndex];
    Global = "global", 1, Any, io(0, 1), [ImmediateKind::Field(FieldCategory::Global)];
    Gtxn = "gtxn", 1, Any, io(0, 1), [Uint8, TXN, OptionalIndex];
    Load = "load", 1, Any, io(0, 1), [Uint8];
    Store = "store", 1, Any, io(1, 0), [Uint8];
    Bnz = "bnz", 1, Any, io(1, 0), [Target];
    Pop = "pop", 1, Any, io(1, 0), [];
    Dup = "dup", 1, Any, io(1, 2), [];
    Int = "int", 1, Any, io(0, 1), [Uint];
    Byte = "byte", 1, Any, io(0, 1), [Bytes];
    Addr = "addr", 1, Any, io(0, 1), [Address];
    MethodSelector = "method", 1, Any, io(0, 1), [Method];
    Addw = "addw", 2, Any, io(2, 2), [];
    Txna = "txna", 2, Any, io(0, 1), [TXN, Index];
    Gtxna = "gtxna", 2, Any, io(0, 1), [Uint8, TXN, Index];
    Bz = "bz", 2, Any, io(1, 0), [Target];
    B = "b", 2, Any, io(0, 0), [Target];
    Return = "return", 2, Any, io(1, 0), [];
    Dup2 = "dup2", 2, Any, io(2, 4), [];
    Concat = "concat", 2, Any, io(2, 1), [];
    Substring = "substring", 2, Any, io(1, 1), [Uint8, Uint8];
    Substring3 = "substring3", 2, Any, io(3, 1), [];
    Balance = "balance", 2, Application, io(1, 1), [];
    AppOptedIn = "app_opted_in", 2, Application, io(2, 1), [];
    AppLocalGet = "app_local_get", 2, Application, io(2, 1), [];
    AppLocalGetEx = "app_local_get_ex", 2, Application, io(3, 2), [];
    AppGlobalGet = "app_global_get", 2, Application, io(1, 1), [];
    AppGlobalGetEx = "app_global_get_ex", 2, Application, io(2, 2), [];
    AppLocalPut = "app_local_put", 2, Application, io(3, 0), [];
    AppGlobalPut = "app_global_put", 2, Application, io(2, 0), [];
    AppLocalDel = "app_local_del", 2, Application, io(2, 0), [];
    AppGlobalDel = "app_global_del", 2, Application, io(1, 0), [];
    AssetHoldingGet = "asset_holding_get", 2, Application, io(2, 2), [ImmediateKind::Field(FieldCategory::AssetHolding)];
    AssetParamsGet = "asset_params_get", 2, Application, io(1, 2), [ImmediateKind::Field(FieldCategory::AssetParams)];
    Assert = "assert", 3, Any, io(1, 0), [];
    Gtxns = "gtxns", 3, Any, io(1, 1), [TXN, OptionalIndex];
    Gtxnsa = "gtxnsa", 3, Any, io(1, 1), [TXN, Index];
    Pushbytes = "pushbytes", 3, Any, io(0, 1), [Bytes];
    Pushint = "pushint", 3, Any, io(0, 1), [Uint];
    Swap = "swap", 3, Any, io(2, 2), [];
    Select = "select", 3, Any, io(3, 1), [];
    Dig = "dig", 3, Any, DYN, [Uint8];
    Getbit = "getbit", 3, Any, io(2, 1), [];
    Setbit = "setbit", 3, Any, io(3, 1), [];
    Getbyte = "getbyte", 3, Any, io(2, 1), [];
    Setbyte = "setbyte", 3, Any, io(3, 1), [];
    MinBalance = "min_balance", 3, Application, io(1, 1), [];
    Divmodw = "divmodw", 4, Any, io(4, 4), [];
    Exp = "exp", 4, Any, io(2, 1), [];
    Expw = "expw", 4, Any, io(2, 2), [];
    Shl = "shl", 4, Any, io(2, 1), [];
    Shr = "shr", 4, Any, io(2, 1), [];
    Sqrt = "sqrt", 4, Any, io(1, 1), [];
    Bitlen = "bitlen", 4, Any, io(1, 1), [];
    BAdd = "b+", 4, Any, io(2, 1), [];
    BSub = "b-", 4, Any, io(2, 1), [];
    BDiv = "b/", 4, Any, io(2, 1), [];
    BMul = "b*", 4, Any, io(2, 1), [];
    BLt = "b<", 4, Any, io(2, 1), [];
    BGt = "b>", 4, Any, io(2, 1), [];
    BLe = "b<=", 4, Any, io(2, 1), [];
    BGe = "b>=", 4, Any, io(2, 1), [];
    BEq = "b==", 4, Any, io(2, 1), [];
    BNe = "b!=", 4, Any, io(2, 1), [];
    BMod = "b%", 4, Any, io(2, 1), [];
    BBitOr = "b|", 4, Any, io(2, 1), [];
    BBitAnd = "b&", 4, Any, io(2, 1), [];
    BBitXor = "b^", 4, Any, io(2, 1), [];
    BBitNot = "b~", 4, Any, io(1, 1), [];
    Bzero = "bzero", 4, Any, io(1, 1), [];
    Gload = "gload", 4, Application, io(0, 1), [Uint8, Uint8];
    Gloads = "gloads", 4, Application, io(1, 1), [Uint8];
    Gaid = "gaid", 4, Application, io(0, 1), [Uint8];
    Gaids = "gaids", 4, Application, io(1, 1), [];
    Callsub = "callsub", 4, Any, io(0, 0), [Target];
    Retsub = "retsub", 4, Any, io(0, 0), [];
    EcdsaVerify = "ecdsa_verify", 5, Any, io(5, 1), [ImmediateKind::Field(FieldCategory::EcdsaCurve)];
    EcdsaPkDecompress = "ecdsa_pk_decompress", 5, Any, io(1, 2), [ImmediateKind::Field(FieldCategory::EcdsaCurve)];
    EcdsaPkRecover = "ecdsa_pk_recover", 5, Any, io(4, 2), [ImmediateKind::Field(FieldCategory::EcdsaCurve)];
    Loads = "loads", 5, Any, io(1, 1), [];
    Stores = "stores", 5, Any, io(2, 0), [];
    Cover = "cover", 5, Any, DYN, [Uint8];
    Uncover = "uncover", 5, Any, DYN, [Uint8];
    Extract = "extract", 5, Any, io(1, 1), [Uint8, Uint8];
    Extract3 = "extract3", 5, Any, io(3, 1), [];
    ExtractUint16 = "extract_uint16", 5, Any, io(2, 1), [];
    ExtractUint32 = "extract_uint32", 5, Any, io(2, 1), [];
    ExtractUint64 = "extract_uint64", 5, Any, io(2, 1), [];
    AppParamsGet = "app_params_get", 5, Application, io(1, 2), [ImmediateKind::Field(FieldCategory::AppParams)];
    Log = "log", 5, Application, io(1, 0), [];
    ItxnBegin = "itxn_begin", 5, Application, io(0, 0), [];
    ItxnField = "itxn_field", 5, Application, io(1, 0), [TXN];
    ItxnSubmit = "itxn_submit", 5, Application, io(0, 0), [];
    Itxn = "itxn", 5, Application, io(0, 1), [TXN, OptionalIndex];
    Itxna = "itxna", 5, Application, io(0, 1), [TXN, Index];
    Txnas = "txnas", 5, Any, io(1, 1), [TXN];
    Gtxnas = "gtxnas", 5, Any, io(1, 1), [Uint8, TXN];
    Gtxnsas = "gtxnsas", 5, Any, io(2, 1), [TXN];
    Args = "args", 5, Signature, io(1, 1), [];
    Divw = "divw", 6, Any, io(3, 1), [];
    Bsqrt = "bsqrt", 6, Any, io(1, 1), [];
    Gloadss = "gloadss", 6, Application, io(2, 1), [];
    AcctParamsGet = "acct_params_get", 6, Application, io(1, 2), [ImmediateKind::Field(FieldCategory::AcctParams)];
    ItxnNext = "itxn_next", 6, Application, io(0, 0), [];
    Gitxn = "gitxn", 6, Application, io(0, 1), [Uint8, TXN, OptionalIndex];
    Gitxna = "gitxna", 6, Application, io(0, 1), [Uint8, TXN, Index];
    Gitxnas = "gitxnas", 6, Application, io(1, 1), [Uint8, TXN];
    Itxnas = "itxnas", 6, Application, io(1, 1), [TXN];
    Replace2 = "replace2", 7, Any, io(2, 1), [Uint8];
    Replace3 = "replace3", 7, Any, io(3, 1), [];
    Base64Decode = "base64_decode", 7, Any, io(1, 1), [ImmediateKind::Field(FieldCategory::Base64Encoding)];
    JsonRef = "json_ref", 7, Any, io(2, 1), [ImmediateKind::Field(FieldCategory::JsonRefType)];
    Ed25519VerifyBare = "ed25519verify_bare", 7, Any, io(3, 1), [];
    Sha3_256 = "sha3_256", 7, Any, io(1, 1), [];
    VrfVerify = "vrf_verify", 7, Any, io(3, 2), [ImmediateKind::Field(FieldCategory::VrfStandard)];
    Block = "block", 7, Any, io(1, 1), [ImmediateKind::Field(FieldCategory::Block)];
    Bury = "bury", 8, Any, DYN, [Uint8];
    Popn = "popn", 8, Any, DYN, [Uint8];
    Dupn = "dupn", 8, Any, DYN, [Uint8];
    Pushbytess = "pushbytess", 8, Any, DYN, [BytesList];
    Pushints = "pushints", 8, Any, DYN, [Uints];
    Proto = "proto", 8, Any, io(0, 0), [Uint8, Uint8];
    FrameDig = "frame_dig", 8, Any, io(0, 1), [Int8];
    FrameBury = "frame_bury", 8, Any, io(1, 0), [Int8];
    Switch = "switch", 8, Any, io(1, 0), [Labels];
    Match = "match", 8, Any, DYN, [Labels];
    BoxCreate = "box_create", 8, Application, io(2, 1), [];
    BoxExtract = "box_extract", 8, Application, io(3, 1), [];
    BoxReplace = "box_replace", 8, Application, io(3, 0), [];
    BoxDel = "box_del", 8, Application, io(1, 1), [];
    BoxLen = "box_len", 8, Application, io(1, 2), [];
    BoxGet = "box_get", 8, Application, io(1, 2), [];
    BoxPut = "box_put", 8, Application, io(2, 0), [];
    BoxSplice = "box_splice", 10, Application, io(4, 0), [];
    BoxResize = "box_resize", 10, Application, io(2, 0), [];
}

impl Opcode {
    /// Looks up the opcode written as `mnemonic` in a listing.
    ///
    /// The label pseudo-instruction has no mnemonic of its own, so it is never
    /// returned.
    #[must_use]
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        static TABLE: OnceLock<HashMap<&'static str, Opcode>> = OnceLock::new();
        TABLE
            .get_or_init(|| {
                Self::ALL
                    .iter()
                    .filter(|op| **op != Self::Label)
                    .map(|op| (op.mnemonic(), *op))
                    .collect()
            })
            .get(mnemonic)
            .copied()
    }

    /// Checks whether the opcode is one of the integer comparison operators.
    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Gt | Self::Le | Self::Ge
        )
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use crate::opcode::{ImmediateKind, Mode, Opcode, StackEffect};

    #[test]
    fn mnemonics_are_unique() {
        let mnemonics: HashSet<_> = Opcode::ALL.iter().map(|op| op.mnemonic()).collect();
        assert_eq!(mnemonics.len(), Opcode::ALL.len());
    }

    #[test]
    fn looks_up_by_mnemonic() {
        assert_eq!(Opcode::from_mnemonic("=="), Some(Opcode::Eq));
        assert_eq!(Opcode::from_mnemonic("callsub"), Some(Opcode::Callsub));
        assert_eq!(Opcode::from_mnemonic("b+"), Some(Opcode::BAdd));
        assert_eq!(Opcode::from_mnemonic("label"), None);
        assert_eq!(Opcode::from_mnemonic("jump"), None);
    }

    #[test]
    fn variadic_immediates_come_last() {
        for op in Opcode::ALL {
            let kinds = op.immediates();
            for (i, kind) in kinds.iter().enumerate() {
                if kind.is_variadic() {
                    assert_eq!(i, kinds.len() - 1, "{op} has a misplaced variadic immediate");
                }
            }
        }
    }

    #[test]
    fn carries_metadata() {
        assert_eq!(Opcode::Retsub.version(), 4);
        assert_eq!(Opcode::Arg.mode(), Mode::Signature);
        assert_eq!(Opcode::AppGlobalPut.mode(), Mode::Application);
        assert_eq!(Opcode::Assert.stack_effect(), StackEffect::Fixed { pops: 1, pushes: 0 });
        assert_eq!(Opcode::Int.immediates(), &[ImmediateKind::Uint]);
    }
}

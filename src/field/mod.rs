//! This module contains the structured operand types of TEAL, the _fields_.
//!
//! Opcodes such as `txn`, `global` or `asset_params_get` take the name of a
//! field as an immediate argument. Each category of field is represented by a
//! fieldless enum with exactly one variant per valid name, and a parser that
//! maps the textual name to that variant.
//!
//! # Interning
//!
//! The variants of a field enum are `Copy` values identified by their name, so
//! there is exactly one value for every valid textual name. The name to
//! variant mapping is held in a [`BiMap`] that is built the first time it is
//! needed, and the reverse mapping is total by construction.

use std::fmt::{Display, Formatter};

pub use account::AcctParamsField;
pub use application::AppParamsField;
pub use asset::{AssetHoldingField, AssetParamsField};
#[doc(hidden)]
pub use bimap::BiMap;
pub use global::GlobalField;
pub use immediate::{Base64Encoding, BlockField, EcdsaCurve, JsonRefType, VrfStandard};
use serde::{Deserialize, Serialize};
pub use transaction::TransactionField;

use crate::error::UnknownFieldError;

/// Defines a field enum from a table of `Variant = "Name", version` rows.
///
/// The generated type gets an `ALL` listing, a name table, a `parse`
/// constructor that fails with [`UnknownFieldError`], along with `name`,
/// `version`, [`Display`] and [`std::str::FromStr`].
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident in $category:ident {
            $($(#[$vmeta:meta])* $variant:ident = $text:literal, $version:literal);+ $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every field in this category, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The category of this field type.
            pub const CATEGORY: $crate::field::FieldCategory =
                $crate::field::FieldCategory::$category;

            /// Gets the table mapping between names and fields.
            #[must_use]
            pub fn table() -> &'static $crate::field::BiMap<&'static str, Self> {
                static TABLE: std::sync::OnceLock<$crate::field::BiMap<&'static str, $name>> =
                    std::sync::OnceLock::new();
                TABLE.get_or_init(|| {
                    let mut table = $crate::field::BiMap::new();
                    $(table.insert($text, Self::$variant);)+
                    table
                })
            }

            /// Parses the field with the exact textual `name`.
            ///
            /// # Errors
            ///
            /// Returns [`Err`] if `name` is not a field of this category.
            pub fn parse(name: &str) -> Result<Self, $crate::error::UnknownFieldError> {
                Self::table()
                    .get_by_left(name)
                    .copied()
                    .ok_or_else(|| $crate::error::UnknownFieldError::new(Self::CATEGORY, name))
            }

            /// Gets the textual name of the field.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Gets the first TEAL version in which the field is available.
            #[must_use]
            pub fn version(self) -> u8 {
                match self {
                    $(Self::$variant => $version),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::UnknownFieldError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}


// These are declared after the macro so that it is in textual scope for them.
mod account;
mod application;
mod asset;
mod global;
mod immediate;
mod transaction;

/// The categories of structured operand.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum FieldCategory {
    Transaction,
    Global,
    AssetHolding,
    AssetParams,
    AcctParams,
    AppParams,
    EcdsaCurve,
    Base64Encoding,
    JsonRefType,
    VrfStandard,
    Block,
}

impl Display for FieldCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Transaction => "transaction",
            Self::Global => "global",
            Self::AssetHolding => "asset holding",
            Self::AssetParams => "asset params",
            Self::AcctParams => "account params",
            Self::AppParams => "app params",
            Self::EcdsaCurve => "ECDSA curve",
            Self::Base64Encoding => "base64 encoding",
            Self::JsonRefType => "JSON reference type",
            Self::VrfStandard => "VRF standard",
            Self::Block => "block",
        };
        f.write_str(text)
    }
}

/// A decoded structured operand of any category.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Field {
    Transaction(TransactionField),
    Global(GlobalField),
    AssetHolding(AssetHoldingField),
    AssetParams(AssetParamsField),
    AcctParams(AcctParamsField),
    AppParams(AppParamsField),
    EcdsaCurve(EcdsaCurve),
    Base64Encoding(Base64Encoding),
    JsonRefType(JsonRefType),
    VrfStandard(VrfStandard),
    Block(BlockField),
}

impl Field {
    /// Parses `name` as a field of the given `category`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `name` is not a field of `category`.
    pub fn parse(category: FieldCategory, name: &str) -> Result<Self, UnknownFieldError> {
        Ok(match category {
            FieldCategory::Transaction => Self::Transaction(TransactionField::parse(name)?),
            FieldCategory::Global => Self::Global(GlobalField::parse(name)?),
            FieldCategory::AssetHolding => Self::AssetHolding(AssetHoldingField::parse(name)?),
            FieldCategory::AssetParams => Self::AssetParams(AssetParamsField::parse(name)?),
            FieldCategory::AcctParams => Self::AcctParams(AcctParamsField::parse(name)?),
            FieldCategory::AppParams => Self::AppParams(AppParamsField::parse(name)?),
            FieldCategory::EcdsaCurve => Self::EcdsaCurve(EcdsaCurve::parse(name)?),
            FieldCategory::Base64Encoding => Self::Base64Encoding(Base64Encoding::parse(name)?),
            FieldCategory::JsonRefType => Self::JsonRefType(JsonRefType::parse(name)?),
            FieldCategory::VrfStandard => Self::VrfStandard(VrfStandard::parse(name)?),
            FieldCategory::Block => Self::Block(BlockField::parse(name)?),
        })
    }

    /// Gets the category that this field belongs to.
    #[must_use]
    pub fn category(self) -> FieldCategory {
        match self {
            Self::Transaction(_) => FieldCategory::Transaction,
            Self::Global(_) => FieldCategory::Global,
            Self::AssetHolding(_) => FieldCategory::AssetHolding,
            Self::AssetParams(_) => FieldCategory::AssetParams,
            Self::AcctParams(_) => FieldCategory::AcctParams,
            Self::AppParams(_) => FieldCategory::AppParams,
            Self::EcdsaCurve(_) => FieldCategory::EcdsaCurve,
            Self::Base64Encoding(_) => FieldCategory::Base64Encoding,
            Self::JsonRefType(_) => FieldCategory::JsonRefType,
            Self::VrfStandard(_) => FieldCategory::VrfStandard,
            Self::Block(_) => FieldCategory::Block,
        }
    }

    /// Gets the textual name of the field.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Transaction(f) => f.name(),
            Self::Global(f) => f.name(),
            Self::AssetHolding(f) => f.name(),
            Self::AssetParams(f) => f.name(),
            Self::AcctParams(f) => f.name(),
            Self::AppParams(f) => f.name(),
            Self::EcdsaCurve(f) => f.name(),
            Self::Base64Encoding(f) => f.name(),
            Self::JsonRefType(f) => f.name(),
            Self::VrfStandard(f) => f.name(),
            Self::Block(f) => f.name(),
        }
    }

    /// Gets the first TEAL version in which the field is available.
    #[must_use]
    pub fn version(self) -> u8 {
        match self {
            Self::Transaction(f) => f.version(),
            Self::Global(f) => f.version(),
            Self::AssetHolding(f) => f.version(),
            Self::AssetParams(f) => f.version(),
            Self::AcctParams(f) => f.version(),
            Self::AppParams(f) => f.version(),
            Self::EcdsaCurve(f) => f.version(),
            Self::Base64Encoding(f) => f.version(),
            Self::JsonRefType(f) => f.version(),
            Self::VrfStandard(f) => f.version(),
            Self::Block(f) => f.version(),
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a transaction field, as used by `txn`, `gtxn`, `itxn` and friends.
///
/// # Errors
///
/// Returns [`Err`] if `name` is not a transaction field.
pub fn parse_transaction_field(name: &str) -> Result<TransactionField, UnknownFieldError> {
    TransactionField::parse(name)
}

/// Parses a global field, as used by `global`.
///
/// # Errors
///
/// Returns [`Err`] if `name` is not a global field.
pub fn parse_global_field(name: &str) -> Result<GlobalField, UnknownFieldError> {
    GlobalField::parse(name)
}

/// Parses an asset holding field, as used by `asset_holding_get`.
///
/// # Errors
///
/// Returns [`Err`] if `name` is not an asset holding field.
pub fn parse_asset_holding_field(name: &str) -> Result<AssetHoldingField, UnknownFieldError> {
    AssetHoldingField::parse(name)
}

/// Parses an asset params field, as used by `asset_params_get`.
///
/// # Errors
///
/// Returns [`Err`] if `name` is not an asset params field.
pub fn parse_asset_params_field(name: &str) -> Result<AssetParamsField, UnknownFieldError> {
    AssetParamsField::parse(name)
}

/// Parses an account params field, as used by `acct_params_get`.
///
/// # Errors
///
/// Returns [`Err`] if `name` is not an account params field.
pub fn parse_acct_params_field(name: &str) -> Result<AcctParamsField, UnknownFieldError> {
    AcctParamsField::parse(name)
}

/// Parses an app params field, as used by `app_params_get`.
///
/// # Errors
///
/// Returns [`Err`] if `name` is not an app params field.
pub fn parse_app_params_field(name: &str) -> Result<AppParamsField, UnknownFieldError> {
    AppParamsField::parse(name)
}

//! This module contains constants that are needed throughout the codebase.

/// The TEAL version assumed for a listing that has no `#pragma version`.
pub const DEFAULT_TEAL_VERSION: u8 = 1;

/// The highest TEAL version that the analyzer understands.
pub const MAX_SUPPORTED_VERSION: u8 = 10;

/// The first TEAL version in which programs can be applications.
pub const FIRST_APPLICATION_VERSION: u8 = 2;

/// The default maximum number of paths that a single detector may enumerate
/// before giving up.
pub const DEFAULT_MAX_PATHS: usize = 10_000;

/// The default maximum number of passes that a dataflow analysis may make over
/// the blocks of a unit before it is considered not to converge.
pub const DEFAULT_MAX_FIXPOINT_ITERATIONS: usize = 256;

/// The default number of loop iterations an analysis will wait before polling
/// the watchdog.
pub const DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS: usize = 100;

/// The value of `OnCompletion` for a plain application call.
pub const ON_COMPLETION_NO_OP: u64 = 0;

/// The value of `OnCompletion` for an application update.
pub const ON_COMPLETION_UPDATE_APPLICATION: u64 = 4;

/// The value of `OnCompletion` for an application deletion.
pub const ON_COMPLETION_DELETE_APPLICATION: u64 = 5;

/// The value of `TypeEnum` for a payment transaction.
pub const TYPE_ENUM_PAYMENT: u64 = 1;

/// The value of `TypeEnum` for an asset transfer transaction.
pub const TYPE_ENUM_ASSET_TRANSFER: u64 = 4;

/// The named integer constants accepted by `int` and `pushint`.
///
/// These are the values of the `OnCompletion` and `TypeEnum` transaction
/// fields.
pub const NAMED_INTEGER_CONSTANTS: &[(&str, u64)] = &[
    ("NoOp", ON_COMPLETION_NO_OP),
    ("OptIn", 1),
    ("CloseOut", 2),
    ("ClearState", 3),
    ("UpdateApplication", ON_COMPLETION_UPDATE_APPLICATION),
    ("DeleteApplication", ON_COMPLETION_DELETE_APPLICATION),
    ("unknown", 0),
    ("pay", TYPE_ENUM_PAYMENT),
    ("keyreg", 2),
    ("acfg", 3),
    ("axfer", TYPE_ENUM_ASSET_TRANSFER),
    ("afrz", 5),
    ("appl", 6),
];

/// The name used for the top-level unit of code when reporting locations.
pub const MAIN_UNIT_NAME: &str = "__main__";

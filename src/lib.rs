//! This library implements a static analysis of
//! [TEAL](https://developer.algorand.org/docs/get-details/dapps/avm/teal/)
//! programs, the stack-based bytecode language of the Algorand Virtual
//! Machine. It looks for common classes of vulnerability in both logic
//! signatures and applications. It is a _best effort_ analysis.
//!
//! # How it Works
//!
//! From a very high level, the analysis is performed as follows:
//!
//! 1. The lines of the program are parsed into a [`parser::Listing`] of typed
//!    [`instruction::Instruction`]s, with structured operands such as
//!    transaction [`field`]s resolved.
//! 2. The instructions are split into basic blocks and linked into a
//!    [`cfg::ControlFlowGraph`], including the call and return edges of
//!    subroutines. Together with the version and execution mode of the
//!    program this forms a [`contract::Contract`].
//! 3. Each [`detector::Detector`] looks for one kind of issue in the contract,
//!    making use of the shared [`analysis`] utilities to reason about the
//!    paths through the program.
//! 4. The result of each detector is returned as a
//!    [`detector::DetectorOutcome`], which contains either its
//!    [`detector::Finding`]s or the error that stopped it.
//!
//! # Basic Usage
//!
//! For the most basic usage of the library, it is sufficient to construct an
//! `Analyzer` and call the `.analyze` method.
//!
//! ```
//! use teal_analyzer::{analyzer::Config, watchdog::LazyWatchdog};
//!
//! let program = [
//!     "#pragma version 3",
//!     "txn Sender",
//!     "global CreatorAddress",
//!     "==",
//!     "assert",
//!     "int 1",
//!     "return",
//! ];
//!
//! let analysis = teal_analyzer::new(program, Config::default(), LazyWatchdog.in_rc())
//!     .analyze()
//!     .unwrap();
//!
//! assert_eq!(analysis.contract().blocks().len(), 1);
//! assert!(analysis.findings().all(|f| f.detector != "missing-creator-check"));
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod analysis;
pub mod analyzer;
pub mod cfg;
pub mod constant;
pub mod contract;
pub mod detector;
pub mod error;
pub mod field;
pub mod instruction;
pub mod opcode;
pub mod parser;
pub mod printer;
pub mod watchdog;

// Re-exports to provide the library interface.
pub use analyzer::new;
pub use contract::Contract;
pub use detector::{Detectors, Finding};

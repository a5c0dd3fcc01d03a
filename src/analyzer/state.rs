//! This module contains the state tracking functionality for the analyzer.

use std::fmt::Debug;

use crate::{
    analyzer::Config,
    contract::Contract,
    detector::{DetectorOutcome, Detectors},
    parser::Listing,
    watchdog::DynWatchdog,
};

/// A marker trait that says that the type implementing it is an analyzer
/// state.
///
/// Analyzer states can be transitioned between as part of the
/// [`crate::analyzer::Analyzer`] state machine, and are intended to enforce
/// that correct state transitions take place.
pub trait State
where
    Self: Debug + Sized,
{
}

/// The initial state for the analyzer, which only has the source of the
/// program.
#[derive(Debug)]
pub struct HasSource {
    /// The configuration for the analysis.
    pub config: Config,

    /// The detectors that will be run over the contract.
    pub detectors: Detectors,

    /// The watchdog that is monitoring the progress of the analysis.
    pub watchdog: DynWatchdog,
}
impl State for HasSource {}

/// The state for an analyzer that has successfully parsed the listing.
#[derive(Debug)]
pub struct Parsed {
    /// The parsed listing.
    pub listing: Listing,

    /// The configuration for the analysis.
    pub config: Config,

    /// The detectors that will be run over the contract.
    pub detectors: Detectors,

    /// The watchdog that is monitoring the progress of the analysis.
    pub watchdog: DynWatchdog,
}
impl State for Parsed {}

/// The state for an analyzer that has built the control-flow graph of the
/// program, and hence has a contract.
#[derive(Debug)]
pub struct HasContract {
    /// The contract being analysed.
    pub contract: Contract,

    /// The configuration for the analysis.
    pub config: Config,

    /// The detectors that will be run over the contract.
    pub detectors: Detectors,

    /// The watchdog that is monitoring the progress of the analysis.
    pub watchdog: DynWatchdog,
}
impl State for HasContract {}

/// The state for an analyzer that has run its detectors.
#[derive(Debug)]
pub struct DetectionComplete {
    /// The contract that was analysed.
    pub contract: Contract,

    /// The outcome of each detector that ran, in the order they ran.
    pub outcomes: Vec<DetectorOutcome>,
}
impl State for DetectionComplete {}

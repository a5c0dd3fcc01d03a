//! This module contains the analyses that are shared between the detectors.
//!
//! Detectors are free to inspect the [`Contract`] directly, but most of them
//! reason about the ways in which the program can execute. These analyses
//! provide that reasoning in a bounded fashion:
//!
//! - [`paths`] enumerates interprocedural execution paths, matching calls with
//!   their returns and cutting paths at cycles.
//! - [`dataflow`] computes the facts that must hold on every path into a block
//!   as a fixpoint over the control-flow graph.
//! - [`symbolic`] evaluates the instructions along a path to find the facts
//!   under which that path approves the transaction.

pub mod dataflow;
pub mod paths;
pub mod symbolic;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    cfg::BlockId,
    contract::Contract,
    detector::Config,
    error::{
        container::Locatable,
        detection::{Error, Result},
    },
    watchdog::{DynWatchdog, LazyWatchdog},
};

/// How a detector treats blocks that cannot be reached from the program
/// entry.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum DeadBlockPolicy {
    /// Dead blocks are excluded from the detector's reasoning.
    #[default]
    Ignore,

    /// Dead blocks are analysed as additional roots, as if control could reach
    /// them.
    Report,
}

/// The context in which a detector runs.
///
/// It carries the bounds on the shared analyses, the watchdog that can stop
/// them, and the dead-block policy in effect for the current detector.
#[derive(Clone, Debug)]
pub struct Context {
    config:            Config,
    watchdog:          DynWatchdog,
    dead_block_policy: DeadBlockPolicy,
}

impl Context {
    /// Creates a new context with the provided `config` and `watchdog`.
    #[must_use]
    pub fn new(config: Config, watchdog: DynWatchdog) -> Self {
        let dead_block_policy = DeadBlockPolicy::default();
        Self {
            config,
            watchdog,
            dead_block_policy,
        }
    }

    /// Sets the dead-block policy for the detector about to run.
    #[must_use]
    pub fn with_dead_block_policy(mut self, policy: DeadBlockPolicy) -> Self {
        self.dead_block_policy = policy;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn watchdog(&self) -> &DynWatchdog {
        &self.watchdog
    }

    #[must_use]
    pub fn dead_block_policy(&self) -> DeadBlockPolicy {
        self.dead_block_policy
    }

    /// Polls the watchdog if `iteration` falls on its polling interval,
    /// returning an error located at `line` if it asks for analysis to stop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoppedByWatchdog`] if the watchdog says to stop.
    pub fn poll(&self, iteration: usize, line: u32) -> Result<()> {
        let polling_interval = self.watchdog.poll_every().max(1);
        if iteration % polling_interval == 0 && self.watchdog.should_stop() {
            return Err(Error::StoppedByWatchdog.locate(line));
        }

        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Config::default(), LazyWatchdog.in_rc())
    }
}

/// Gets the blocks from which a detector should start its reasoning about
/// `contract` under `policy`.
///
/// This is always the entry block. Under [`DeadBlockPolicy::Report`] it also
/// includes every dead block that is not reachable from an earlier root, so
/// that each dead region is explored once.
#[must_use]
pub fn roots(contract: &Contract, policy: DeadBlockPolicy) -> Vec<BlockId> {
    let cfg = contract.cfg();
    let mut roots = vec![cfg.entry()];
    if policy == DeadBlockPolicy::Ignore {
        return roots;
    }

    let mut covered: BTreeSet<BlockId> = cfg.reachable_from(cfg.entry());
    for dead in cfg.dead_blocks() {
        if covered.contains(&dead) {
            continue;
        }
        covered.extend(cfg.reachable_from(dead));
        roots.push(dead);
    }

    roots
}

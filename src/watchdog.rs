//! This module contains the type definitions necessary to support stopping an
//! analysis from outside.
//!
//! # Best-Effort Monitoring
//!
//! The watchdog is only polled by the bounded analyses that the detectors run,
//! namely path enumeration and the dataflow fixpoint. Parsing and building the
//! control-flow graph are linear in the size of the listing and never poll it.
//!
//! A detector stopped by the watchdog reports [`StoppedByWatchdog`] in its
//! outcome. Every detector after it is stopped in turn as soon as it first
//! polls.
//!
//! [`StoppedByWatchdog`]: crate::error::detection::Error::StoppedByWatchdog

use std::{
    fmt::Debug,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use crate::constant::DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS;

/// A dynamically dispatched [`Watchdog`] instance.
pub type DynWatchdog = Rc<dyn Watchdog>;

/// The interface to an object that the detectors poll to see if they need to
/// abandon their work.
pub trait Watchdog
where
    Self: Debug,
{
    /// Checks if the current detector should stop and return an error.
    #[must_use]
    fn should_stop(&self) -> bool;

    /// Gets the number of loop iterations to wait between polls.
    #[must_use]
    fn poll_every(&self) -> usize;
}

/// A watchdog that never asks for analysis to stop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LazyWatchdog;

impl LazyWatchdog {
    /// Wraps `self` into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> DynWatchdog {
        Rc::new(self)
    }
}

impl Watchdog for LazyWatchdog {
    fn should_stop(&self) -> bool {
        false
    }

    fn poll_every(&self) -> usize {
        usize::MAX
    }
}

/// A watchdog that asks for analysis to stop once a shared flag is set.
///
/// By default, it is polled every [`DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS`]
/// iterations. This is configurable by calling [`Self::polling_every`].
#[derive(Clone, Debug)]
pub struct FlagWatchdog {
    /// The flag that should be set from elsewhere to stop the analysis.
    flag: Arc<AtomicBool>,

    poll_loop_iterations: usize,
}

impl FlagWatchdog {
    /// Constructs a new `FlagWatchdog` wrapping the provided `flag`.
    #[must_use]
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        let poll_loop_iterations = DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS;
        Self {
            flag,
            poll_loop_iterations,
        }
    }

    /// Specifies the number of loop iterations to wait between polls.
    #[must_use]
    pub fn polling_every(mut self, iterations: usize) -> Self {
        self.poll_loop_iterations = iterations;
        self
    }

    /// Wraps the watchdog into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> DynWatchdog {
        Rc::new(self)
    }
}

impl Watchdog for FlagWatchdog {
    fn should_stop(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    fn poll_every(&self) -> usize {
        self.poll_loop_iterations
    }
}

/// A watchdog that asks for analysis to stop once a time budget has elapsed.
///
/// The budget starts when the watchdog is constructed.
#[derive(Clone, Debug)]
pub struct DeadlineWatchdog {
    deadline:             Instant,
    poll_loop_iterations: usize,
}

impl DeadlineWatchdog {
    /// Constructs a watchdog that stops the analysis after `budget`.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        let deadline = Instant::now() + budget;
        let poll_loop_iterations = DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS;
        Self {
            deadline,
            poll_loop_iterations,
        }
    }

    /// Specifies the number of loop iterations to wait between polls.
    #[must_use]
    pub fn polling_every(mut self, iterations: usize) -> Self {
        self.poll_loop_iterations = iterations;
        self
    }

    /// Wraps the watchdog into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> DynWatchdog {
        Rc::new(self)
    }
}

impl Watchdog for DeadlineWatchdog {
    fn should_stop(&self) -> bool {
        Instant::now() >= self.deadline
    }

    fn poll_every(&self) -> usize {
        self.poll_loop_iterations
    }
}

#[cfg(test)]
mod test {
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        time::Duration,
    };

    use crate::watchdog::{DeadlineWatchdog, FlagWatchdog, LazyWatchdog, Watchdog};

    #[test]
    fn flag_watchdog_follows_its_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let watchdog = FlagWatchdog::new(flag.clone()).polling_every(5);
        assert!(!watchdog.should_stop());
        assert_eq!(watchdog.poll_every(), 5);

        flag.store(true, Ordering::Relaxed);
        assert!(watchdog.should_stop());
    }

    #[test]
    fn deadline_watchdog_stops_once_the_budget_is_spent() {
        assert!(DeadlineWatchdog::new(Duration::ZERO).should_stop());
        assert!(!DeadlineWatchdog::new(Duration::from_secs(3600)).should_stop());
    }

    #[test]
    fn lazy_watchdog_never_stops() {
        assert!(!LazyWatchdog.in_rc().should_stop());
    }
}

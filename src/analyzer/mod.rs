//! This module contains the definition of the analyzer itself.

pub mod state;

use crate::{
    analyzer::state::State,
    constant::DEFAULT_TEAL_VERSION,
    contract::{Contract, ExecutionMode},
    detector,
    detector::{DetectorOutcome, Detectors, Finding},
    error,
    parser,
    watchdog::DynWatchdog,
};

/// Creates a new analyzer for the program given by `lines`, with the provided
/// `config` and `watchdog`.
///
/// The analyzer runs the [`Detectors::default`] set of detectors unless told
/// otherwise with [`Analyzer::with_detectors`].
#[must_use]
pub fn new<I, S>(lines: I, config: Config, watchdog: DynWatchdog) -> InitialAnalyzer
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let source = lines.into_iter().map(|l| l.as_ref().to_string()).collect();
    let state = state::HasSource {
        config,
        detectors: Detectors::default(),
        watchdog,
    };
    Analyzer { source, state }
}

/// The core of the analysis, the `Analyzer` is responsible for taking the
/// source of a TEAL program through parsing and control-flow graph
/// construction, and then running the detectors over the result.
///
/// # Enforcing Valid State Transitions
///
/// The analyzer enforces that only correct state transitions can occur through
/// use of structs that implement the exact state required by it at any given
/// point.
///
/// There is the [`Self::state`] function that provides access to the state data
/// of whichever state the analyzer is currently in.
#[derive(Debug)]
pub struct Analyzer<S: State> {
    /// The lines of the program being analysed.
    source: Vec<String>,

    /// The internal state of the analyzer.
    state: S,
}

/// The operations available in all states.
impl<S: State> Analyzer<S> {
    /// Gets the lines of the program being analysed.
    pub fn source(&self) -> &[String] {
        &self.source
    }

    /// Gets an immutable reference to the current state of the analyzer.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Moves the analyzer into the state `NS` created by applying `transform`
    /// to its current state.
    fn transform_state<NS: State>(
        self,
        transform: impl FnOnce(S, &[String]) -> error::Result<NS>,
    ) -> error::Result<Analyzer<NS>> {
        let state = transform(self.state, &self.source)?;
        let source = self.source;

        Ok(Analyzer { source, state })
    }
}

/// A type that allows the user to easily name the initial state of the
/// analyzer.
pub type InitialAnalyzer = Analyzer<state::HasSource>;

/// Operations available on a newly-created analyzer.
impl Analyzer<state::HasSource> {
    /// Replaces the set of detectors that will be run.
    #[must_use]
    pub fn with_detectors(mut self, detectors: Detectors) -> Self {
        self.state.detectors = detectors;
        self
    }

    /// Executes the analysis process from beginning to end, performing all
    /// the intermediate steps automatically.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the program cannot be parsed or its control-flow
    /// graph cannot be built. Failures of individual detectors are instead
    /// reported in their outcomes.
    pub fn analyze(self) -> error::Result<Analyzer<state::DetectionComplete>> {
        let analyzer = self.parse()?;
        let analyzer = analyzer.build_cfg()?;
        let analyzer = analyzer.detect();

        Ok(analyzer)
    }

    /// Parses the source of the program into a listing of instructions.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if parsing fails.
    pub fn parse(self) -> error::Result<Analyzer<state::Parsed>> {
        self.transform_state(|old_state, source| {
            let listing =
                parser::parse_with_default_version(source, old_state.config.default_version)?;
            log::info!(
                "Parsed {} instructions targeting version {}",
                listing.instructions().len(),
                listing.version()
            );
            Ok(state::Parsed {
                listing,
                config: old_state.config,
                detectors: old_state.detectors,
                watchdog: old_state.watchdog,
            })
        })
    }
}

/// Operations available on an analyzer that has parsed its program.
impl Analyzer<state::Parsed> {
    /// Builds the control-flow graph of the parsed program, producing the
    /// contract to be analysed.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the control-flow graph is malformed.
    pub fn build_cfg(self) -> error::Result<Analyzer<state::HasContract>> {
        self.transform_state(|old_state, _| {
            let contract = Contract::from_listing(old_state.listing, old_state.config.mode)?;
            log::info!(
                "Built a control-flow graph of {} blocks for a {} contract",
                contract.blocks().len(),
                contract.mode()
            );
            Ok(state::HasContract {
                contract,
                config: old_state.config,
                detectors: old_state.detectors,
                watchdog: old_state.watchdog,
            })
        })
    }
}

/// Operations available on an analyzer that has a contract.
impl Analyzer<state::HasContract> {
    /// Gets the contract being analysed.
    #[must_use]
    pub fn contract(&self) -> &Contract {
        &self.state.contract
    }

    /// Runs the detectors over the contract.
    ///
    /// Detector failures never fail this step.
    #[must_use]
    pub fn detect(self) -> Analyzer<state::DetectionComplete> {
        let Analyzer { source, state } = self;
        let state::HasContract {
            contract,
            config,
            detectors,
            watchdog,
        } = state;
        let outcomes = detectors.run(&contract, &config.detection, &watchdog);
        log::info!("Ran {} detectors", outcomes.len());

        let state = state::DetectionComplete { contract, outcomes };
        Analyzer { source, state }
    }
}

/// Operations available on an analyzer that has run its detectors.
impl Analyzer<state::DetectionComplete> {
    /// Gets the contract that was analysed.
    #[must_use]
    pub fn contract(&self) -> &Contract {
        &self.state.contract
    }

    /// Gets the outcome of each detector that ran.
    #[must_use]
    pub fn outcomes(&self) -> &[DetectorOutcome] {
        &self.state.outcomes
    }

    /// Gets every finding reported by a detector that succeeded.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.state.outcomes.iter().flat_map(DetectorOutcome::findings)
    }
}

/// The configuration for the analyzer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The TEAL version assumed for programs without a `#pragma version`.
    ///
    /// Defaults to [`DEFAULT_TEAL_VERSION`].
    pub default_version: u8,

    /// The execution mode of the program, or [`None`] to infer it from the
    /// opcodes the program uses.
    ///
    /// Defaults to [`None`].
    pub mode: Option<ExecutionMode>,

    /// The configuration passed to the detectors.
    pub detection: detector::Config,
}

impl Config {
    /// Sets the `default_version` config parameter to `value`.
    #[must_use]
    pub fn with_default_version(mut self, value: u8) -> Self {
        self.default_version = value;
        self
    }

    /// Sets the `mode` config parameter to `value`.
    #[must_use]
    pub fn with_mode(mut self, value: ExecutionMode) -> Self {
        self.mode = Some(value);
        self
    }

    /// Sets the `detection` config parameter to `value`.
    #[must_use]
    pub fn with_detection(mut self, value: detector::Config) -> Self {
        self.detection = value;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_version: DEFAULT_TEAL_VERSION,
            mode:            None,
            detection:       detector::Config::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        analyzer::{self, Config},
        contract::ExecutionMode,
        detector::{Detectors, FnDetector, Severity},
        error::Error,
        watchdog::LazyWatchdog,
    };

    #[test]
    fn runs_every_stage() -> anyhow::Result<()> {
        let analyzer = analyzer::new(
            ["#pragma version 2", "txn RekeyTo", "global ZeroAddress", "=="],
            Config::default(),
            LazyWatchdog.in_rc(),
        );
        let analyzer = analyzer.parse()?;
        assert_eq!(analyzer.state().listing.version(), 2);

        let analyzer = analyzer.build_cfg()?;
        assert_eq!(analyzer.contract().blocks().len(), 1);

        let analyzer = analyzer.detect();
        assert!(analyzer.outcomes().iter().all(|o| o.is_success()));
        assert!(analyzer.findings().all(|f| f.detector != "rekey-to"));

        Ok(())
    }

    #[test]
    fn uses_the_configured_mode_and_detectors() -> anyhow::Result<()> {
        let mut detectors = Detectors::new();
        detectors.add(FnDetector::new("mode", "", Severity::Low, |contract, _| {
            assert_eq!(contract.mode(), ExecutionMode::Stateless);
            Ok(Vec::new())
        }));

        let analyzer = analyzer::new(
            ["int 1"],
            Config::default().with_mode(ExecutionMode::Stateless),
            LazyWatchdog.in_rc(),
        )
        .with_detectors(detectors)
        .analyze()?;

        assert_eq!(analyzer.outcomes().len(), 1);
        assert!(analyzer.contract().has_declared_mode());

        Ok(())
    }

    #[test]
    fn parse_failures_stop_the_analysis() {
        let result = analyzer::new(["bogus"], Config::default(), LazyWatchdog.in_rc()).analyze();

        let Err(errors) = result else {
            panic!("Analysis of an invalid listing succeeded");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.payloads()[0].location, 1);
        assert!(matches!(errors.payloads()[0].payload, Error::Parse(_)));
    }
}

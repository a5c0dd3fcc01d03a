//! This module contains the definition of the `Detector` trait that looks for
//! a particular class of issue in a contract, along with the registry that
//! runs a set of detectors over a contract.
//!
//! Each detector is independent of the others. A detector that fails does not
//! prevent the remaining detectors from running, and its failure is reported
//! in its [`DetectorOutcome`] instead.

pub mod close;
pub mod creator;
pub mod dead_code;
pub mod fee;
pub mod finding;
pub mod group;
pub mod guard;
pub mod mode;
pub mod rekey;
pub mod update;
pub mod version;

use std::{any::Any, collections::BTreeMap, fmt::Debug};

use derivative::Derivative;
use downcast_rs::Downcast;
pub use finding::{Finding, Severity};

pub use crate::analysis::DeadBlockPolicy;
use crate::{
    analysis::Context,
    constant::{DEFAULT_MAX_FIXPOINT_ITERATIONS, DEFAULT_MAX_PATHS},
    contract::{Contract, ExecutionMode},
    detector::{
        close::{CanCloseAccount, CanCloseAsset},
        creator::MissingCreatorCheck,
        dead_code::DeadCode,
        fee::MissingFeeCheck,
        group::GroupSizeCheck,
        mode::ModeMismatch,
        rekey::RekeyTo,
        update::{IsDeletable, IsUpdatable, UnprotectedDeletable, UnprotectedUpdatable},
        version::VersionMismatch,
    },
    error::{
        container::Locatable,
        detection::{Error, LocatedError, Result},
    },
    watchdog::DynWatchdog,
};

/// A trait representing an analysis that looks for one kind of issue in a
/// contract.
pub trait Detector
where
    Self: Any + Debug + Downcast,
{
    /// The unique name of the detector, used to select it.
    fn name(&self) -> &str;

    /// A human-readable description of what the detector looks for.
    fn description(&self) -> &str;

    /// The severity of the findings that the detector reports.
    fn severity(&self) -> Severity;

    /// Checks whether the detector is meaningful for a contract executing in
    /// `mode`.
    fn applies_to(&self, mode: ExecutionMode) -> bool {
        let _ = mode;
        true
    }

    /// How the detector treats blocks that are unreachable from the entry
    /// unless overridden in the registry.
    fn dead_block_policy(&self) -> DeadBlockPolicy {
        DeadBlockPolicy::Ignore
    }

    /// Runs the detector over `contract`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if one of the analyses the detector relies on exceeds
    /// its bounds or is stopped by the watchdog.
    fn detect(&self, contract: &Contract, context: &Context) -> Result<Vec<Finding>>;
}

/// The signature of the functions that can be registered as detectors.
pub type DetectFn = dyn Fn(&Contract, &Context) -> Result<Vec<Finding>>;

/// A detector built from a plain function or closure.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct FnDetector {
    name:        String,
    description: String,
    severity:    Severity,
    policy:      DeadBlockPolicy,
    #[derivative(Debug = "ignore")]
    detect:      Box<DetectFn>,
}

impl FnDetector {
    /// Creates a new detector called `name` that runs `detect`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        detect: impl Fn(&Contract, &Context) -> Result<Vec<Finding>> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            severity,
            policy: DeadBlockPolicy::default(),
            detect: Box::new(detect),
        }
    }

    /// Sets the dead-block policy of the detector.
    #[must_use]
    pub fn with_dead_block_policy(mut self, policy: DeadBlockPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Detector for FnDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn dead_block_policy(&self) -> DeadBlockPolicy {
        self.policy
    }

    fn detect(&self, contract: &Contract, context: &Context) -> Result<Vec<Finding>> {
        (self.detect)(contract, context)
    }
}

/// The configuration for running detectors.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The maximum number of paths that path enumeration will produce from any
    /// single root before giving up.
    ///
    /// Defaults to [`DEFAULT_MAX_PATHS`].
    pub max_paths: usize,

    /// The maximum number of passes the dataflow analysis will make over the
    /// control-flow graph before giving up.
    ///
    /// Defaults to [`DEFAULT_MAX_FIXPOINT_ITERATIONS`].
    pub max_fixpoint_iterations: usize,
}

impl Config {
    /// Sets the `max_paths` config parameter to `value`.
    #[must_use]
    pub fn with_max_paths(mut self, value: usize) -> Self {
        self.max_paths = value;
        self
    }

    /// Sets the `max_fixpoint_iterations` config parameter to `value`.
    #[must_use]
    pub fn with_max_fixpoint_iterations(mut self, value: usize) -> Self {
        self.max_fixpoint_iterations = value;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_paths:               DEFAULT_MAX_PATHS,
            max_fixpoint_iterations: DEFAULT_MAX_FIXPOINT_ITERATIONS,
        }
    }
}

/// The result of running a single detector.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DetectorOutcome {
    /// The name of the detector that was run.
    pub detector: String,

    /// The findings of the detector, or the error that stopped it.
    pub result: std::result::Result<Vec<Finding>, LocatedError>,
}

impl DetectorOutcome {
    /// Gets the findings of the detector, which are empty if it failed.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        self.result.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// A container for a set of detectors, keyed and run in order of their names.
#[derive(Debug)]
pub struct Detectors {
    /// The detectors themselves.
    detectors: BTreeMap<String, Box<dyn Detector>>,

    /// The dead-block policies that take precedence over the detectors' own.
    policies: BTreeMap<String, DeadBlockPolicy>,
}

impl Detectors {
    /// Constructs a new container with no detectors in it.
    #[must_use]
    pub fn new() -> Self {
        let detectors = BTreeMap::new();
        let policies = BTreeMap::new();
        Self {
            detectors,
            policies,
        }
    }

    /// Adds the `detector` to the container.
    ///
    /// If a detector with the same name already exists, it is replaced.
    pub fn add<D: Detector>(&mut self, detector: D) {
        self.detectors
            .insert(detector.name().to_string(), Box::new(detector));
    }

    /// Removes the detector called `name` from the container, returning
    /// whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.policies.remove(name);
        self.detectors.remove(name).is_some()
    }

    /// Gets the detector called `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Detector> {
        self.detectors.get(name).map(|d| &**d)
    }

    /// Gets a reference to the first detector of the type `D`, if any.
    #[must_use]
    pub fn get_typed<D: Detector>(&self) -> Option<&D> {
        self.detectors
            .values()
            .find_map(|d| d.as_ref().as_any().downcast_ref::<D>())
    }

    /// Gets the names of the contained detectors, in the order they run.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.detectors.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Overrides the dead-block policy of the detector called `name`.
    pub fn set_dead_block_policy(&mut self, name: impl Into<String>, policy: DeadBlockPolicy) {
        self.policies.insert(name.into(), policy);
    }

    /// Gets the dead-block policy in effect for the detector called `name`.
    #[must_use]
    pub fn dead_block_policy(&self, name: &str) -> Option<DeadBlockPolicy> {
        self.policies
            .get(name)
            .copied()
            .or_else(|| self.get(name).map(|d| d.dead_block_policy()))
    }

    /// Runs every contained detector that applies to the mode of `contract`.
    pub fn run(
        &self,
        contract: &Contract,
        config: &Config,
        watchdog: &DynWatchdog,
    ) -> Vec<DetectorOutcome> {
        self.detectors
            .values()
            .filter_map(|detector| self.run_one(&**detector, contract, config, watchdog))
            .collect()
    }

    /// Runs the detectors with the provided `names`, in the order given, that
    /// apply to the mode of `contract`.
    ///
    /// A name that does not correspond to a detector produces a failed outcome.
    pub fn run_selected(
        &self,
        names: &[&str],
        contract: &Contract,
        config: &Config,
        watchdog: &DynWatchdog,
    ) -> Vec<DetectorOutcome> {
        names
            .iter()
            .filter_map(|name| match self.get(name) {
                Some(detector) => self.run_one(detector, contract, config, watchdog),
                None => Some(DetectorOutcome {
                    detector: (*name).to_string(),
                    result:   Err(Error::other(format!("No detector named {name:?}")).locate(0)),
                }),
            })
            .collect()
    }

    fn run_one(
        &self,
        detector: &dyn Detector,
        contract: &Contract,
        config: &Config,
        watchdog: &DynWatchdog,
    ) -> Option<DetectorOutcome> {
        let name = detector.name();
        if !detector.applies_to(contract.mode()) {
            log::debug!("Skipping detector {name} for a {} contract", contract.mode());
            return None;
        }

        let policy = self
            .policies
            .get(name)
            .copied()
            .unwrap_or_else(|| detector.dead_block_policy());
        let context = Context::new(config.clone(), watchdog.clone()).with_dead_block_policy(policy);
        let result = detector.detect(contract, &context);
        match &result {
            Ok(findings) => log::debug!("Detector {name} reported {} findings", findings.len()),
            Err(error) => log::warn!("Detector {name} failed: {error}"),
        }

        Some(DetectorOutcome {
            detector: name.to_string(),
            result,
        })
    }
}

impl Default for Detectors {
    fn default() -> Self {
        // Keep these sorted for easy visual grep
        let mut detectors = Self::new();
        detectors.add(CanCloseAccount);
        detectors.add(CanCloseAsset);
        detectors.add(DeadCode);
        detectors.add(GroupSizeCheck);
        detectors.add(IsDeletable);
        detectors.add(IsUpdatable);
        detectors.add(MissingCreatorCheck);
        detectors.add(MissingFeeCheck);
        detectors.add(ModeMismatch);
        detectors.add(RekeyTo);
        detectors.add(UnprotectedDeletable);
        detectors.add(UnprotectedUpdatable);
        detectors.add(VersionMismatch);

        detectors
    }
}

#[cfg(test)]
mod test {
    use crate::{
        contract::Contract,
        detector::{
            creator::MissingCreatorCheck,
            Config,
            DeadBlockPolicy,
            Detectors,
            Finding,
            FnDetector,
            Severity,
        },
        error::{container::Locatable, detection::Error},
        parser::parse,
        watchdog::LazyWatchdog,
    };

    fn contract(lines: &[&str]) -> anyhow::Result<Contract> {
        Ok(Contract::from_listing(parse(lines)?, None)?)
    }

    #[test]
    fn default_registry_contains_the_built_in_detectors() {
        let detectors = Detectors::default();

        assert_eq!(detectors.len(), 13);
        assert!(detectors.get("missing-creator-check").is_some());
        assert!(detectors.get_typed::<MissingCreatorCheck>().is_some());
        assert_eq!(
            detectors.dead_block_policy("dead-code"),
            Some(DeadBlockPolicy::Report)
        );
    }

    #[test]
    fn failures_are_isolated_to_their_detector() -> anyhow::Result<()> {
        let mut detectors = Detectors::new();
        detectors.add(FnDetector::new("always-fails", "", Severity::Low, |_, _| {
            Err(Error::other("broken").locate(3))
        }));
        detectors.add(FnDetector::new("always-finds", "", Severity::Low, |_, _| {
            Ok(vec![Finding::new("always-finds", Severity::Low, "found")])
        }));

        let contract = contract(&["int 1"])?;
        let outcomes = detectors.run(&contract, &Config::default(), &LazyWatchdog.in_rc());

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].detector, "always-fails");
        assert!(!outcomes[0].is_success());
        assert!(outcomes[0].findings().is_empty());
        assert_eq!(outcomes[1].findings().len(), 1);

        Ok(())
    }

    #[test]
    fn policy_overrides_reach_the_detector() -> anyhow::Result<()> {
        let mut detectors = Detectors::new();
        detectors.add(FnDetector::new("policy", "", Severity::Low, |_, context| {
            let finding = Finding::new("policy", Severity::Low, format!("{:?}", context.dead_block_policy()));
            Ok(vec![finding])
        }));
        detectors.set_dead_block_policy("policy", DeadBlockPolicy::Report);

        let contract = contract(&["int 1"])?;
        let outcomes = detectors.run_selected(
            &["policy", "missing"],
            &contract,
            &Config::default(),
            &LazyWatchdog.in_rc(),
        );

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].findings()[0].description, "Report");
        assert_eq!(outcomes[1].detector, "missing");
        assert!(!outcomes[1].is_success());

        Ok(())
    }
}

//! This module contains common utilities for simplifying the writing of
//! integration tests for this library.

#![cfg(test)]

use std::fs;

use anyhow::anyhow;
use teal_analyzer as ta;
use teal_analyzer::{
    analyzer::{Config, InitialAnalyzer},
    contract::{Contract, ExecutionMode},
    detector::Finding,
    parser,
    watchdog::LazyWatchdog,
};

/// Reads the lines of the TEAL listing at the provided `path`.
#[allow(unused)] // It is actually
pub fn read_listing(path: impl AsRef<str>) -> anyhow::Result<Vec<String>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|_| anyhow!("File {path} not available"))?;

    Ok(contents.lines().map(ToString::to_string).collect())
}

/// Constructs a new analyzer for the listing at the provided `path`.
///
/// It uses the default configuration, inferring the execution mode of the
/// program unless a `mode` is given.
#[allow(unused)] // It is actually
pub fn new_analyzer_from_path(
    path: impl AsRef<str>,
    mode: Option<ExecutionMode>,
) -> anyhow::Result<InitialAnalyzer> {
    let lines = read_listing(path)?;
    let config = match mode {
        Some(mode) => Config::default().with_mode(mode),
        None => Config::default(),
    };

    Ok(ta::new(lines, config, LazyWatchdog.in_rc()))
}

/// Parses the listing at the provided `path` and builds its contract.
#[allow(unused)] // It is actually
pub fn new_contract_from_path(path: impl AsRef<str>) -> anyhow::Result<Contract> {
    let listing = parser::parse(read_listing(path)?)?;

    Ok(Contract::from_listing(listing, None)?)
}

/// Runs the full analysis over the listing at `path` and gets the findings
/// reported by the detector called `detector`.
#[allow(unused)] // It is actually
pub fn findings_of(
    path: impl AsRef<str>,
    mode: Option<ExecutionMode>,
    detector: &str,
) -> anyhow::Result<Vec<Finding>> {
    let analyzer = new_analyzer_from_path(path, mode)?.analyze()?;
    let outcome = analyzer
        .outcomes()
        .iter()
        .find(|o| o.detector == detector)
        .ok_or_else(|| anyhow!("Detector {detector} did not run"))?;

    match &outcome.result {
        Ok(findings) => Ok(findings.clone()),
        Err(error) => Err(anyhow!("Detector {detector} failed: {error}")),
    }
}

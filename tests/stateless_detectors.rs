//! This module is an integration test that runs the detectors for logic
//! signatures over escrow programs with and without the usual checks.
#![cfg(test)]

use teal_analyzer::{contract::ExecutionMode, detector::Severity};

mod common;

const ESCROW_DETECTORS: [&str; 4] = [
    "can-close-account",
    "can-close-asset",
    "missing-fee-check",
    "rekey-to",
];

#[test]
fn guarded_escrow_passes_the_escrow_detectors() -> anyhow::Result<()> {
    for detector in ESCROW_DETECTORS {
        let findings = common::findings_of(
            "./asset/guarded_escrow.teal",
            Some(ExecutionMode::Stateless),
            detector,
        )?;
        assert!(findings.is_empty(), "{detector} reported {findings:?}");
    }

    Ok(())
}

#[test]
fn open_escrow_fails_every_escrow_detector() -> anyhow::Result<()> {
    for detector in ESCROW_DETECTORS {
        let findings = common::findings_of(
            "./asset/open_escrow.teal",
            Some(ExecutionMode::Stateless),
            detector,
        )?;
        assert_eq!(findings.len(), 1, "{detector} reported {findings:?}");
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].lines, vec![5]);
    }

    Ok(())
}

#[test]
fn application_detectors_are_skipped_for_logic_signatures() -> anyhow::Result<()> {
    let analyzer =
        common::new_analyzer_from_path("./asset/open_escrow.teal", Some(ExecutionMode::Stateless))?
            .analyze()?;

    let ran: Vec<_> = analyzer.outcomes().iter().map(|o| o.detector.as_str()).collect();
    assert!(ran.contains(&"rekey-to"));
    assert!(!ran.contains(&"is-updatable"));
    assert!(!ran.contains(&"unprotected-deletable"));

    Ok(())
}

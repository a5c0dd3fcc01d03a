//! This module is an integration test that checks how the results of an
//! analysis are reported to its consumers.
#![cfg(test)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use teal_analyzer::{
    analyzer::Config,
    cfg::BlockId,
    detector::{Finding, Severity},
    error::detection,
    printer::Printers,
    watchdog::FlagWatchdog,
};

mod common;

#[test]
fn dead_code_findings_survive_serialization() -> anyhow::Result<()> {
    let findings = common::findings_of("./asset/dead_tail.teal", None, "dead-code")?;
    assert_eq!(findings.len(), 1);

    let finding = &findings[0];
    assert_eq!(finding.severity, Severity::Informational);
    assert_eq!(finding.blocks, vec![BlockId::new(1)]);
    assert_eq!(finding.lines, vec![4, 5]);

    let json = serde_json::to_string(finding)?;
    let decoded: Finding = serde_json::from_str(&json)?;
    assert_eq!(&decoded, finding);

    Ok(())
}

#[test]
fn human_summary_marks_dead_blocks() -> anyhow::Result<()> {
    let contract = common::new_contract_from_path("./asset/dead_tail.teal")?;

    let summary = Printers::default()
        .print("human-summary", &contract)
        .ok_or_else(|| anyhow::anyhow!("No human summary printer"))?;
    assert!(summary.contains("B1 in __main__ [dead]"));
    assert!(!summary.contains("B0 in __main__ [dead]"));

    Ok(())
}

#[test]
fn stopped_detectors_report_the_watchdog() -> anyhow::Result<()> {
    let flag = Arc::new(AtomicBool::new(false));
    let watchdog = FlagWatchdog::new(flag.clone()).polling_every(1).in_rc();
    flag.store(true, Ordering::Relaxed);

    let lines = common::read_listing("./asset/unguarded_branch.teal")?;
    let analyzer = teal_analyzer::new(lines, Config::default(), watchdog).analyze()?;

    // Parsing and building the graph never poll, so the analysis still completes
    assert_eq!(analyzer.contract().blocks().len(), 3);

    let creator = analyzer
        .outcomes()
        .iter()
        .find(|o| o.detector == "missing-creator-check")
        .ok_or_else(|| anyhow::anyhow!("Detector did not run"))?;
    let Err(error) = &creator.result else {
        anyhow::bail!("Detector was not stopped");
    };
    assert_eq!(error.payload, detection::Error::StoppedByWatchdog);

    Ok(())
}

//! This module contains the detector for instructions that need a newer TEAL
//! version than the program targets.

use crate::{
    analysis::Context,
    contract::Contract,
    detector::{Detector, Finding, Severity},
    error::detection::Result,
    opcode::Opcode,
};

/// Reports each instruction whose opcode or field was introduced in a later
/// version than the one the program targets.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct VersionMismatch;

impl Detector for VersionMismatch {
    fn name(&self) -> &str {
        "version-mismatch"
    }

    fn description(&self) -> &str {
        "The instruction is not available in the targeted version"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn detect(&self, contract: &Contract, _context: &Context) -> Result<Vec<Finding>> {
        let version = contract.version();
        let cfg = contract.cfg();

        Ok(contract
            .instructions()
            .filter(|i| i.opcode() != Opcode::Label && i.version() > version)
            .map(|i| {
                let description = format!(
                    "`{i}` requires version {} but the program targets version {version}",
                    i.version()
                );
                Finding::new(self.name(), self.severity(), description)
                    .with_blocks(cfg.block_containing_line(i.line()))
                    .with_lines([i.line()])
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        analysis::Context,
        contract::Contract,
        detector::{version::VersionMismatch, Detector},
        parser::parse,
    };

    #[test]
    fn reports_instructions_and_fields_from_later_versions() -> anyhow::Result<()> {
        let contract = Contract::from_listing(
            parse([
                "#pragma version 2",
                "txn RekeyTo",
                "global CreatorAddress",
                "==",
                "assert",
                "int 1",
            ])?,
            None,
        )?;

        let findings = VersionMismatch.detect(&contract, &Context::default())?;
        let lines: Vec<u32> = findings.iter().flat_map(|f| f.lines.clone()).collect();
        assert_eq!(lines, vec![3, 5]);
        assert_eq!(
            findings[1].description,
            "`assert` requires version 3 but the program targets version 2"
        );

        Ok(())
    }

    #[test]
    fn accepts_programs_within_their_version() -> anyhow::Result<()> {
        let contract = Contract::from_listing(parse(["#pragma version 8", "int 1", "assert", "int 1"])?, None)?;
        assert!(VersionMismatch.detect(&contract, &Context::default())?.is_empty());

        Ok(())
    }
}

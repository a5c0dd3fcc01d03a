//! This module contains the detector for instructions used outside the
//! execution mode in which they are available.

use itertools::Itertools;

use crate::{
    analysis::Context,
    constant::FIRST_APPLICATION_VERSION,
    contract::{Contract, ExecutionMode},
    detector::{Detector, Finding, Severity},
    error::detection::Result,
    instruction::Instruction,
    opcode::Mode,
};

/// Reports instructions that cannot execute in the mode of the program.
///
/// An instruction is restricted by its opcode, and also by the global it reads
/// when that global only exists for applications. If the mode was declared,
/// each instruction it does not permit is reported. If it was inferred, a
/// program that mixes signature-only and application-only instructions can run
/// in neither mode, and is reported once. An application that
/// targets a version without applications is also reported.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ModeMismatch;

impl ModeMismatch {
    fn finding(&self, description: impl Into<String>, contract: &Contract, lines: &[u32]) -> Finding {
        let cfg = contract.cfg();
        Finding::new(self.name(), self.severity(), description)
            .with_blocks(
                lines
                    .iter()
                    .filter_map(|l| cfg.block_containing_line(*l))
                    .dedup(),
            )
            .with_lines(lines.iter().copied())
    }
}

impl Detector for ModeMismatch {
    fn name(&self) -> &str {
        "mode-mismatch"
    }

    fn description(&self) -> &str {
        "The opcode is not available in the execution mode of the program"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn detect(&self, contract: &Contract, _context: &Context) -> Result<Vec<Finding>> {
        let mode = contract.mode();
        let mut findings = Vec::new();

        if contract.has_declared_mode() {
            for instruction in contract.instructions() {
                if !mode.permits(instruction.mode()) {
                    let description =
                        format!("`{instruction}` cannot be used in a {mode} program");
                    findings.push(self.finding(description, contract, &[instruction.line()]));
                }
            }
        } else {
            let lines_in = |wanted: Mode| -> Vec<u32> {
                contract
                    .instructions()
                    .filter(|i| i.mode() == wanted)
                    .map(Instruction::line)
                    .collect()
            };
            let signature = lines_in(Mode::Signature);
            let application = lines_in(Mode::Application);
            if !signature.is_empty() && !application.is_empty() {
                let lines: Vec<u32> = signature.into_iter().merge(application).collect();
                findings.push(self.finding(
                    "The program mixes signature-only and application-only instructions",
                    contract,
                    &lines,
                ));
            }
        }

        if mode == ExecutionMode::Stateful && contract.version() < FIRST_APPLICATION_VERSION {
            let description = format!(
                "Applications require version {FIRST_APPLICATION_VERSION} but the program targets \
                 version {}",
                contract.version()
            );
            findings.push(Finding::new(self.name(), self.severity(), description));
        }

        Ok(findings)
    }
}

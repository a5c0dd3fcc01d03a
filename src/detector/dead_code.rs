//! This module contains the detector for code that can never execute.

use crate::{
    analysis::{Context, DeadBlockPolicy},
    contract::Contract,
    detector::{Detector, Finding, Severity},
    error::detection::Result,
};

/// Reports each block that cannot be reached from the entry of the program.
///
/// As it is about dead blocks, this detector only reports anything when it
/// runs under [`DeadBlockPolicy::Report`], which is its default.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct DeadCode;

impl Detector for DeadCode {
    fn name(&self) -> &str {
        "dead-code"
    }

    fn description(&self) -> &str {
        "The block can never be executed"
    }

    fn severity(&self) -> Severity {
        Severity::Informational
    }

    fn dead_block_policy(&self) -> DeadBlockPolicy {
        DeadBlockPolicy::Report
    }

    fn detect(&self, contract: &Contract, context: &Context) -> Result<Vec<Finding>> {
        if context.dead_block_policy() == DeadBlockPolicy::Ignore {
            return Ok(Vec::new());
        }

        Ok(contract
            .blocks()
            .iter()
            .filter(|block| block.is_dead())
            .map(|block| {
                Finding::new(self.name(), self.severity(), self.description())
                    .with_blocks([block.id()])
                    .with_lines(block.first_line()..=block.last_line())
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        analysis::{Context, DeadBlockPolicy},
        cfg::BlockId,
        contract::Contract,
        detector::{dead_code::DeadCode, Detector},
        parser::parse,
    };

    #[test]
    fn reports_each_dead_block() -> anyhow::Result<()> {
        let contract = Contract::from_listing(
            parse(["int 1", "return", "int 2", "return", "orphan:", "int 3", "return"])?,
            None,
        )?;
        let context = Context::default().with_dead_block_policy(DeadBlockPolicy::Report);

        let findings = DeadCode.detect(&contract, &context)?;
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].blocks, vec![BlockId::new(1)]);
        assert_eq!(findings[0].lines, vec![3, 4]);
        assert_eq!(findings[1].blocks, vec![BlockId::new(2)]);

        let ignored = Context::default().with_dead_block_policy(DeadBlockPolicy::Ignore);
        assert!(DeadCode.detect(&contract, &ignored)?.is_empty());

        Ok(())
    }
}

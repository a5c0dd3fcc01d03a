//! This module contains the types that describe the results of running a
//! detector.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{analysis::paths::Path, cfg::BlockId, contract::Contract};

/// How serious a finding is.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
    Informational,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Informational => "informational",
        };
        write!(f, "{name}")
    }
}

/// A single issue reported by a detector.
///
/// The blocks are those involved in the issue, in the order that execution
/// passes through them, and the lines are the source lines that the issue is
/// attributed to.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub detector:    String,
    pub severity:    Severity,
    pub description: String,
    pub blocks:      Vec<BlockId>,
    pub lines:       Vec<u32>,
}

impl Finding {
    /// Creates a finding with no associated blocks or lines.
    #[must_use]
    pub fn new(detector: impl Into<String>, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            detector: detector.into(),
            severity,
            description: description.into(),
            blocks: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Attaches the blocks of `path` to the finding, along with the last line
    /// executed on it.
    #[must_use]
    pub fn on_path(mut self, contract: &Contract, path: &Path) -> Self {
        self.blocks = path.blocks().to_vec();
        self.lines = path
            .last()
            .and_then(|b| contract.block(b))
            .map(|b| vec![b.last_line()])
            .unwrap_or_default();
        self
    }

    #[must_use]
    pub fn with_blocks(mut self, blocks: impl IntoIterator<Item = BlockId>) -> Self {
        self.blocks = blocks.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_lines(mut self, lines: impl IntoIterator<Item = u32>) -> Self {
        self.lines = lines.into_iter().collect();
        self
    }

    /// Gets the block the finding is primarily about, which is the last block
    /// it references.
    #[must_use]
    pub fn block(&self) -> Option<BlockId> {
        self.blocks.last().copied()
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.detector, self.description)?;
        if !self.blocks.is_empty() {
            write!(f, " (blocks {})", self.blocks.iter().join(" -> "))?;
        }
        if !self.lines.is_empty() {
            write!(f, " (lines {})", self.lines.iter().join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        cfg::BlockId,
        detector::finding::{Finding, Severity},
    };

    #[test]
    fn displays_blocks_and_lines() {
        let finding = Finding::new("rekey-to", Severity::High, "The transaction can be rekeyed")
            .with_blocks([BlockId::new(0), BlockId::new(2)])
            .with_lines([7]);

        assert_eq!(
            finding.to_string(),
            "[high] rekey-to: The transaction can be rekeyed (blocks B0 -> B2) (lines 7)"
        );
        assert_eq!(finding.block(), Some(BlockId::new(2)));
    }

    #[test]
    fn severities_order_by_seriousness() {
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Low < Severity::Informational);
    }
}

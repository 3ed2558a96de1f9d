//! Ordered application of modifications with per-step validation.

use omni_gotree::{SourceTree, check_circular_references, validate};
use serde::Serialize;

use crate::config::MutateConfig;
use crate::error::{MutateError, MutateResult};
use crate::modification::{Modification, Outcome};

/// Outcome of one modification in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Human description of the modification.
    pub description: String,
    /// Whether it changed the tree.
    pub outcome: Outcome,
}

/// Outcome of a whole batch, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// One entry per modification.
    pub steps: Vec<StepReport>,
}

impl PipelineReport {
    /// Number of modifications that changed the tree.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == Outcome::Applied)
            .count()
    }

    /// True when every modification was already satisfied.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.applied() == 0
    }
}

/// Apply `modifications` to `tree` in order.
///
/// The tree is validated after every step. On any error the tree is put
/// back exactly as it was before the call.
///
/// # Errors
/// The first error raised by a modification, or `MutateError::Validation`
/// when a step leaves the tree structurally invalid.
pub fn apply_all(
    tree: &mut SourceTree,
    modifications: &[Modification],
    config: &MutateConfig,
) -> MutateResult<PipelineReport> {
    let snapshot = tree.clone();
    match run(tree, modifications, config) {
        Ok(report) => Ok(report),
        Err(err) => {
            *tree = snapshot;
            tracing::warn!(error = %err, "modification batch aborted; tree restored");
            Err(err)
        }
    }
}

fn run(
    tree: &mut SourceTree,
    modifications: &[Modification],
    config: &MutateConfig,
) -> MutateResult<PipelineReport> {
    let mut report = PipelineReport::default();
    for (step, modification) in modifications.iter().enumerate() {
        let outcome = modification.apply(tree)?;
        check_tree(tree, config)?;
        tracing::debug!(step, outcome = ?outcome, change = %modification, "modification step");
        report.steps.push(StepReport {
            description: modification.describe(),
            outcome,
        });
    }
    Ok(report)
}

/// Run the validator (and the circular-reference check when enabled).
pub(crate) fn check_tree(tree: &SourceTree, config: &MutateConfig) -> MutateResult<()> {
    let mut violations = validate(tree);
    if config.check_circular_references {
        violations.extend(check_circular_references(tree));
    }
    if violations.is_empty() {
        return Ok(());
    }
    tracing::warn!(count = violations.len(), "tree validation failed");
    Err(MutateError::Validation(violations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modification::{AddImport, AddRecordField};
    use omni_gotree::{NewField, TypeReference};

    const SOURCE: &str = "package a\n\ntype A struct {\n}\n";

    fn field(record: &str, name: &str, ty: &str) -> Modification {
        Modification::AddRecordField(AddRecordField {
            record: record.into(),
            field: NewField::new(name, TypeReference::simple(ty)),
        })
    }

    #[test]
    fn test_report_counts() {
        let mut tree = SourceTree::parse(SOURCE).expect("Should parse");
        let batch = [field("A", "X", "int"), field("A", "X", "int")];
        let report = apply_all(&mut tree, &batch, &MutateConfig::default()).expect("Should apply");
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.applied(), 1);
        assert_eq!(report.steps[1].outcome, Outcome::AlreadyPresent);
    }

    #[test]
    fn test_failure_restores_tree() {
        let mut tree = SourceTree::parse(SOURCE).expect("Should parse");
        let batch = [
            field("A", "X", "int"),
            Modification::AddImport(AddImport {
                path: "os".into(),
                alias: None,
            }),
            field("Missing", "Y", "int"),
        ];
        let result = apply_all(&mut tree, &batch, &MutateConfig::default());
        assert!(matches!(result, Err(MutateError::TargetNotFound(_))));
        assert_eq!(tree.render(), SOURCE);
    }

    #[test]
    fn test_self_reference_rejected_when_enabled() {
        let batch = [field("A", "Inner", "A")];

        let mut tree = SourceTree::parse(SOURCE).expect("Should parse");
        let result = apply_all(&mut tree, &batch, &MutateConfig::default());
        assert!(matches!(result, Err(MutateError::Validation(v)) if v.len() == 1));
        assert_eq!(tree.render(), SOURCE);

        let config = MutateConfig {
            check_circular_references: false,
            ..MutateConfig::default()
        };
        let mut tree = SourceTree::parse(SOURCE).expect("Should parse");
        assert!(apply_all(&mut tree, &batch, &config).is_ok());
    }
}

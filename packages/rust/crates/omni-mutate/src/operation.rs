//! ModifyFileOperation - validate, execute or preview a batch of specs
//! against one file, with rollback on failure.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use omni_gotree::{NewTypeBody, SourceTree, locate_record};
use serde::Serialize;

use crate::config::MutateConfig;
use crate::error::{MutateError, MutateResult};
use crate::modification::Modification;
use crate::modifier::{FileModifier, WriteOutcome};
use crate::pipeline::PipelineReport;
use crate::spec::ModificationSpec;

/// Result of a successful [`ModifyFileOperation::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// Target file.
    pub path: PathBuf,
    /// Per-modification outcomes.
    pub pipeline: PipelineReport,
    /// Whether the file was rewritten.
    pub write: WriteOutcome,
}

impl ExecutionReport {
    /// Whether the file content changed on disk.
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(self.write, WriteOutcome::Written { .. })
    }
}

/// A batch of modification specs bound to one target file.
///
/// # Example
///
/// ```rust,ignore
/// use omni_mutate::{ModificationSpec, ModifyFileOperation};
///
/// let specs = ModificationSpec::list_from_yaml(&std::fs::read_to_string("specs.yaml")?)?;
/// let op = ModifyFileOperation::new("config.go", specs);
/// op.validate(false)?;
/// println!("{}", op.dry_run()?);
/// let report = op.execute()?;
/// ```
#[derive(Debug, Clone)]
pub struct ModifyFileOperation {
    path: PathBuf,
    specs: Vec<ModificationSpec>,
    config: MutateConfig,
}

impl ModifyFileOperation {
    /// Bind `specs` to `path` with default settings.
    pub fn new(path: impl Into<PathBuf>, specs: Vec<ModificationSpec>) -> Self {
        Self {
            path: path.into(),
            specs,
            config: MutateConfig::default(),
        }
    }

    /// Replace the settings.
    #[must_use]
    pub fn with_config(mut self, config: MutateConfig) -> Self {
        self.config = config;
        self
    }

    /// Target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Requested changes.
    #[must_use]
    pub fn specs(&self) -> &[ModificationSpec] {
        &self.specs
    }

    /// Check the batch without changing anything.
    ///
    /// The file must exist and parse and every spec must be well-formed.
    /// Unless `force` is set, every field target must also be a struct that
    /// already exists or is declared by an earlier spec in the batch.
    ///
    /// # Errors
    /// `MutateError::Spec`, `MutateError::Io`, `MutateError::Parse`, or
    /// `MutateError::TargetNotFound` for an unresolvable field target.
    pub fn validate(&self, force: bool) -> MutateResult<()> {
        let modifications = self.modifications()?;
        let modifier = FileModifier::open_with_config(&self.path, self.config.clone())?;
        if !force {
            preflight(modifier.tree(), &modifications)?;
        }
        tracing::debug!(
            path = %self.path.display(),
            count = modifications.len(),
            force,
            "batch validated"
        );
        Ok(())
    }

    /// Apply the batch and commit it.
    ///
    /// On any failure the file is restored to its original bytes.
    ///
    /// # Errors
    /// The error that aborted the batch, or `MutateError::RollbackFailed`
    /// when the restore failed as well.
    pub fn execute(&self) -> MutateResult<ExecutionReport> {
        let modifications = self.modifications()?;
        let mut modifier = FileModifier::open_with_config(&self.path, self.config.clone())?;
        for modification in modifications {
            modifier.queue(modification);
        }

        match commit(&mut modifier) {
            Ok((pipeline, write)) => {
                tracing::info!(
                    path = %self.path.display(),
                    applied = pipeline.applied(),
                    outcome = ?write,
                    "operation complete"
                );
                Ok(ExecutionReport {
                    path: self.path.clone(),
                    pipeline,
                    write,
                })
            }
            Err(err) => Err(roll_back(&modifier, err)),
        }
    }

    /// One-line summary of the batch.
    #[must_use]
    pub fn description(&self) -> String {
        if self.specs.is_empty() {
            return format!("Modify {}: no changes", self.path.display());
        }
        let changes: Vec<String> = self.specs.iter().map(ToString::to_string).collect();
        format!(
            "Modify {} ({} change{}): {}",
            self.path.display(),
            changes.len(),
            if changes.len() == 1 { "" } else { "s" },
            changes.join(", ")
        )
    }

    /// Unified diff of what [`ModifyFileOperation::execute`] would write.
    ///
    /// Empty when the batch changes nothing. The file is never touched.
    ///
    /// # Errors
    /// Same as `execute` before the write step.
    pub fn dry_run(&self) -> MutateResult<String> {
        let modifications = self.modifications()?;
        let mut modifier = FileModifier::open_with_config(&self.path, self.config.clone())?;
        for modification in modifications {
            modifier.queue(modification);
        }
        modifier.apply()?;
        Ok(modifier.diff())
    }

    fn modifications(&self) -> MutateResult<Vec<Modification>> {
        self.specs
            .iter()
            .map(|spec| spec.to_modification().map_err(MutateError::from))
            .collect()
    }
}

fn commit(modifier: &mut FileModifier) -> MutateResult<(PipelineReport, WriteOutcome)> {
    let pipeline = modifier.apply()?;
    let write = modifier.write()?;
    Ok((pipeline, write))
}

fn roll_back(modifier: &FileModifier, cause: MutateError) -> MutateError {
    tracing::warn!(
        path = %modifier.path().display(),
        error = %cause,
        "operation failed; rolling back"
    );
    match modifier.restore() {
        Ok(()) => cause,
        Err(source) => {
            tracing::warn!(path = %modifier.path().display(), error = %source, "rollback failed");
            MutateError::RollbackFailed {
                cause: Box::new(cause),
                source,
            }
        }
    }
}

/// Every field target must be a struct in the file or one declared earlier
/// in the batch.
fn preflight(tree: &SourceTree, modifications: &[Modification]) -> MutateResult<()> {
    let mut declared: HashSet<&str> = HashSet::new();
    for modification in modifications {
        match modification {
            Modification::AddTypeDeclaration(m) => {
                if matches!(m.ty.body, NewTypeBody::Record(_)) {
                    declared.insert(&m.ty.name);
                }
            }
            Modification::AddRecordField(m) => {
                let known = declared.contains(m.record.as_str())
                    || locate_record(tree, &m.record).is_some();
                if !known {
                    return Err(MutateError::TargetNotFound(m.record.clone()));
                }
            }
            Modification::AddImport(_) => {}
        }
    }
    Ok(())
}

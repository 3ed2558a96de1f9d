//! FileModifier - one load/mutate/write session over a single Go file.
//!
//! The original bytes are captured before anything else happens and are
//! never changed; they are the only basis for [`FileModifier::rollback`].

use std::path::{Path, PathBuf};

use omni_gotree::{NewType, Position, SourceTree};
use omni_io::IoError;
use serde::Serialize;

use crate::config::MutateConfig;
use crate::diff::generate_unified_diff;
use crate::error::{MutateError, MutateResult};
use crate::modification::{AddTypeDeclaration, Modification};
use crate::pipeline::{PipelineReport, apply_all, check_tree};
use crate::spec::{ImportParams, ModificationSpec, RecordFieldParams, check_new_type};

/// What [`FileModifier::write`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// New content was committed.
    Written {
        /// Bytes written.
        bytes: usize,
    },
    /// Output equals the original; the file was not touched.
    Unchanged,
}

/// A mutation session over one file.
///
/// # Example
///
/// ```rust,ignore
/// use omni_mutate::FileModifier;
///
/// let mut modifier = FileModifier::open("config.go")?;
/// modifier.add_field("Config", "Modules", "ModulesConfig", Some("yaml:\"modules\""))?;
/// modifier.apply()?;
/// modifier.write()?;
/// ```
#[derive(Debug)]
pub struct FileModifier {
    path: PathBuf,
    backup: String,
    tree: SourceTree,
    pending: Vec<Modification>,
    config: MutateConfig,
}

impl FileModifier {
    /// Open `path` with default settings.
    ///
    /// # Errors
    /// `MutateError::Io` when the file cannot be read (missing, too large,
    /// binary, not UTF-8); `MutateError::Parse` when it is not valid Go.
    pub fn open(path: impl AsRef<Path>) -> MutateResult<Self> {
        Self::open_with_config(path, MutateConfig::default())
    }

    /// Open `path` with explicit settings.
    ///
    /// # Errors
    /// See [`FileModifier::open`].
    pub fn open_with_config(path: impl AsRef<Path>, config: MutateConfig) -> MutateResult<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = omni_io::read_bytes_safe(&path, config.max_file_size)?;
        let backup = omni_io::decode_buffer(bytes)?;
        let tree = SourceTree::parse(&backup).map_err(|source| MutateError::Parse {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(
            path = %path.display(),
            package = tree.package(),
            decls = tree.len(),
            "opened source file"
        );

        Ok(Self {
            path,
            backup,
            tree,
            pending: Vec::new(),
            config,
        })
    }

    /// Target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current in-memory tree.
    #[must_use]
    pub fn tree(&self) -> &SourceTree {
        &self.tree
    }

    /// File content as it was when the session opened.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.backup
    }

    /// Modifications queued but not yet applied.
    #[must_use]
    pub fn pending(&self) -> &[Modification] {
        &self.pending
    }

    /// Session settings.
    #[must_use]
    pub fn config(&self) -> &MutateConfig {
        &self.config
    }

    /// Queue an already-built modification.
    pub fn queue(&mut self, modification: Modification) {
        self.pending.push(modification);
    }

    /// Queue appending `field` to struct `record`.
    ///
    /// A missing `record` is only detected by [`FileModifier::apply`].
    ///
    /// # Errors
    /// `MutateError::Spec` for a malformed name, type or tag.
    pub fn add_field(
        &mut self,
        record: &str,
        field: &str,
        type_text: &str,
        tag: Option<&str>,
    ) -> MutateResult<()> {
        let spec = ModificationSpec::AddRecordField(RecordFieldParams {
            record: record.to_string(),
            field: field.to_string(),
            type_text: type_text.to_string(),
            tag: tag.map(str::to_string),
            doc: None,
        });
        self.queue(spec.to_modification()?);
        Ok(())
    }

    /// Queue inserting `ty` at `position`.
    ///
    /// # Errors
    /// `MutateError::Spec` for a malformed declaration.
    pub fn add_type(&mut self, ty: NewType, position: Position) -> MutateResult<()> {
        check_new_type(&ty)?;
        self.queue(Modification::AddTypeDeclaration(AddTypeDeclaration {
            ty,
            position,
        }));
        Ok(())
    }

    /// Queue ensuring `path` is imported.
    ///
    /// # Errors
    /// `MutateError::Spec` for a malformed path or alias.
    pub fn add_import(&mut self, path: &str, alias: Option<&str>) -> MutateResult<()> {
        let spec = ModificationSpec::AddImport(ImportParams {
            path: path.to_string(),
            alias: alias.map(str::to_string),
        });
        self.queue(spec.to_modification()?);
        Ok(())
    }

    /// Apply and clear the queue.
    ///
    /// On error the tree is exactly as it was before the call.
    ///
    /// # Errors
    /// `MutateError::TargetNotFound`, `MutateError::Validation` or
    /// `MutateError::Edit` from the failing step.
    pub fn apply(&mut self) -> MutateResult<PipelineReport> {
        let pending = std::mem::take(&mut self.pending);
        let report = apply_all(&mut self.tree, &pending, &self.config)?;
        tracing::debug!(
            path = %self.path.display(),
            steps = report.steps.len(),
            applied = report.applied(),
            "modifications applied"
        );
        Ok(report)
    }

    /// Current tree as source text.
    #[must_use]
    pub fn render(&self) -> String {
        self.tree.render()
    }

    /// Whether the tree differs from the file as opened.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.render() != self.backup
    }

    /// Unified diff from the original content to the current tree.
    #[must_use]
    pub fn diff(&self) -> String {
        generate_unified_diff(&self.backup, &self.render(), self.config.diff_context)
    }

    /// Commit the current tree to disk.
    ///
    /// The serialized text is parsed again from scratch and validated
    /// before anything is written; the write itself is atomic.
    ///
    /// # Errors
    /// `MutateError::Parse` / `MutateError::Validation` when the output does
    /// not survive re-parsing, `MutateError::Write` when the write fails.
    pub fn write(&self) -> MutateResult<WriteOutcome> {
        let rendered = self.render();
        if self.config.skip_unchanged_writes && rendered == self.backup {
            tracing::debug!(path = %self.path.display(), "content unchanged; skipping write");
            return Ok(WriteOutcome::Unchanged);
        }

        let reparsed = SourceTree::parse(&rendered).map_err(|source| MutateError::Parse {
            path: self.path.clone(),
            source,
        })?;
        check_tree(&reparsed, &self.config)?;

        omni_io::write_atomic(&self.path, rendered.as_bytes()).map_err(|source| {
            MutateError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        tracing::info!(path = %self.path.display(), bytes = rendered.len(), "wrote source file");
        Ok(WriteOutcome::Written {
            bytes: rendered.len(),
        })
    }

    /// Put the original bytes back on disk.
    ///
    /// # Errors
    /// `MutateError::Rollback` when the restore fails.
    pub fn rollback(&self) -> MutateResult<()> {
        self.restore().map_err(|source| MutateError::Rollback {
            path: self.path.clone(),
            source,
        })
    }

    pub(crate) fn restore(&self) -> Result<(), IoError> {
        let restored = omni_io::restore_bytes(&self.path, self.backup.as_bytes())?;
        if restored {
            tracing::info!(path = %self.path.display(), "restored original content");
        } else {
            tracing::debug!(path = %self.path.display(), "file already matches original");
        }
        Ok(())
    }
}

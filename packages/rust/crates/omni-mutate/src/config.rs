//! Mutation settings.
//!
//! Defaults cover the common case; a YAML file and two environment variables
//! may override them:
//! - `OMNI_MUTATE_MAX_FILE_SIZE`: positive byte count
//! - `OMNI_MUTATE_CHECK_CIRCULAR`: `true`/`false` (also `1`/`0`, `yes`/`no`)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MutateError, MutateResult};

const ENV_MAX_FILE_SIZE: &str = "OMNI_MUTATE_MAX_FILE_SIZE";
const ENV_CHECK_CIRCULAR: &str = "OMNI_MUTATE_CHECK_CIRCULAR";

/// Settings for a mutation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutateConfig {
    /// Largest file that will be opened, in bytes.
    pub max_file_size: u64,
    /// Also reject structs that embed themselves by value.
    pub check_circular_references: bool,
    /// Do not touch the file when the output equals the input.
    pub skip_unchanged_writes: bool,
    /// Context lines around each hunk in dry-run diffs.
    pub diff_context: usize,
}

impl Default for MutateConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1024 * 1024, // 1MB
            check_circular_references: true,
            skip_unchanged_writes: true,
            diff_context: 3,
        }
    }
}

impl MutateConfig {
    /// Parse settings from YAML; missing keys keep their defaults.
    ///
    /// # Errors
    /// `MutateError::Config` when the document is not valid YAML for this shape.
    pub fn from_yaml_str(raw: &str) -> MutateResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|e| MutateError::Config(e.to_string()))
    }

    /// Load settings from a YAML file and apply environment overrides.
    ///
    /// # Errors
    /// `MutateError::Config` when the file cannot be read or parsed.
    pub fn load_from_path(path: impl AsRef<Path>) -> MutateResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MutateError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_yaml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded mutate config");
        Ok(config.with_env_overrides())
    }

    /// Defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `OMNI_MUTATE_*` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_MAX_FILE_SIZE) {
            match raw.trim().parse::<u64>() {
                Ok(value) if value > 0 => self.max_file_size = value,
                _ => {
                    tracing::warn!(
                        env_var = ENV_MAX_FILE_SIZE,
                        value = %raw,
                        "invalid positive integer env value"
                    );
                }
            }
        }
        if let Some(raw) = lookup(ENV_CHECK_CIRCULAR) {
            match parse_bool(&raw) {
                Some(value) => self.check_circular_references = value,
                None => {
                    tracing::warn!(
                        env_var = ENV_CHECK_CIRCULAR,
                        value = %raw,
                        "invalid boolean env value"
                    );
                }
            }
        }
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Semester → gradesheet source registry.
//!
//! Which PDF a semester's results live in is configuration, not code. The
//! registry is parsed from TOML: a default table is embedded in the
//! binary at compile time, and a deployment can swap it out by pointing
//! the `GRADESHEET_SOURCES` environment variable at another file, so a
//! changed download URL never requires a rebuild.

use std::path::Path;

use gradesheet_extract::TableLayout;
use serde::Deserialize;

/// Default sources embedded at compile time.
const DEFAULT_SOURCES_TOML: &str = include_str!("../sources/semesters.toml");

/// Environment variable naming an alternative sources TOML file.
pub const SOURCES_ENV_VAR: &str = "GRADESHEET_SOURCES";

/// Errors that can occur while loading the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The TOML config failed to parse.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Reading a config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config parsed but is not usable.
    #[error("invalid source config: {message}")]
    Invalid {
        /// Description of what is wrong.
        message: String,
    },
}

/// One semester's gradesheet source.
#[derive(Debug, Clone, Deserialize)]
pub struct SemesterSource {
    /// Semester label as requested by clients (e.g. `"1st Semester"`).
    pub label: String,
    /// Where to download this semester's gradesheet PDF.
    pub url: String,
    /// How the gradesheet's table text is laid out.
    #[serde(default)]
    pub table: TableLayout,
}

/// On-disk shape of the sources config.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    semesters: Vec<SemesterSource>,
}

/// Immutable, ordered mapping from semester label to gradesheet source.
///
/// [`labels`](Self::labels) and lookup follow config order.
#[derive(Debug, Clone)]
pub struct SemesterRegistry {
    sources: Vec<SemesterSource>,
}

impl SemesterRegistry {
    /// Parses a registry from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the TOML is malformed, no semesters
    /// are configured, a label or URL is empty, or two entries share a
    /// label.
    pub fn from_toml_str(toml: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(toml)?;
        let sources = file.semesters;

        if sources.is_empty() {
            return Err(RegistryError::Invalid {
                message: "no semesters configured".to_owned(),
            });
        }
        for source in &sources {
            if source.label.is_empty() {
                return Err(RegistryError::Invalid {
                    message: "semester label is empty".to_owned(),
                });
            }
            if source.url.is_empty() {
                return Err(RegistryError::Invalid {
                    message: format!("{}: url is empty", source.label),
                });
            }
        }

        let mut labels: Vec<&str> = sources.iter().map(|s| s.label.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        if labels.len() != sources.len() {
            return Err(RegistryError::Invalid {
                message: "duplicate semester labels".to_owned(),
            });
        }

        Ok(Self { sources })
    }

    /// Reads and parses a registry from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the file cannot be read or its
    /// content fails [`Self::from_toml_str`].
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let toml = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml)
    }

    /// Returns the registry embedded in the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed — a compile-time
    /// guarantee in practice, since the config is baked in and covered
    /// by tests.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml_str(DEFAULT_SOURCES_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded semesters.toml: {e}"))
    }

    /// Loads the registry for this process: the file named by
    /// [`SOURCES_ENV_VAR`] when set, the embedded default otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the configured file cannot be read
    /// or parsed.
    pub fn load() -> Result<Self, RegistryError> {
        match std::env::var(SOURCES_ENV_VAR) {
            Ok(path) => {
                log::info!("Loading semester sources from {path}");
                Self::from_path(Path::new(&path))
            }
            Err(_) => {
                log::debug!("Using embedded semester sources");
                Ok(Self::embedded())
            }
        }
    }

    /// Looks up a semester by its exact label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&SemesterSource> {
        self.sources.iter().find(|s| s.label == label)
    }

    /// Semester labels in config order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.label.as_str()).collect()
    }

    /// Number of configured semesters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the registry has no sources. Never true after a
    /// successful parse.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_registry_has_five_semesters_in_order() {
        let registry = SemesterRegistry::embedded();
        assert_eq!(
            registry.labels(),
            vec![
                "1st Semester",
                "2nd Semester",
                "3rd Semester",
                "4th Semester",
                "5th Semester",
            ]
        );
    }

    #[test]
    fn embedded_labels_are_unique() {
        let registry = SemesterRegistry::embedded();
        let mut labels = registry.labels();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), registry.len());
    }

    #[test]
    fn lookup_is_exact() {
        let registry = SemesterRegistry::embedded();
        assert!(registry.get("1st Semester").is_some());
        assert!(registry.get("1st semester").is_none());
        assert!(registry.get("6th Semester").is_none());
    }

    #[test]
    fn table_layout_defaults_to_whitespace_gap() {
        let registry = SemesterRegistry::embedded();
        let source = registry.get("1st Semester").unwrap();
        assert_eq!(source.table, TableLayout::WhitespaceGap);
    }

    #[test]
    fn delimited_layout_is_parsed_from_config() {
        let registry = SemesterRegistry::from_toml_str(
            r#"
            [[semesters]]
            label = "1st Semester"
            url = "https://example.com/sem1.pdf"

            [semesters.table]
            type = "delimited"
            delimiter = "|"
            "#,
        )
        .unwrap();
        let source = registry.get("1st Semester").unwrap();
        assert_eq!(
            source.table,
            TableLayout::Delimited {
                delimiter: "|".to_owned()
            }
        );
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = SemesterRegistry::from_toml_str("semesters = []").unwrap_err();
        assert!(matches!(err, RegistryError::Invalid { .. }));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let err = SemesterRegistry::from_toml_str(
            r#"
            [[semesters]]
            label = "1st Semester"
            url = "https://example.com/a.pdf"

            [[semesters]]
            label = "1st Semester"
            url = "https://example.com/b.pdf"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Invalid { .. }));
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = SemesterRegistry::from_toml_str(
            r#"
            [[semesters]]
            label = "1st Semester"
            url = ""
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Invalid { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SemesterRegistry::from_toml_str("[[semesters").unwrap_err();
        assert!(matches!(err, RegistryError::Toml(_)));
    }
}

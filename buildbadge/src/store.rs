// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Build status collaborators.
//!
//! The renderer never talks to a build system directly. It asks a
//! [`StatusSource`] for the latest outcome of a builder and classifies the
//! answer. [`FileStatusStore`] is the bundled source: a YAML snapshot of
//! builders and their builds, suitable for the CLI and for tests.

use std::{
    collections::HashSet,
    fs,
    future::{self, Future},
    path::Path
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Error},
    status::BuildOutcome
};

/// Source of latest-build outcomes.
pub trait StatusSource: Send + Sync {
    /// Looks up the latest build of the builder named or numbered by
    /// `identifier`.
    ///
    /// An unknown builder is not an error; it yields
    /// [`BuildOutcome::not_found`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] when the source itself cannot answer.
    fn find_status(
        &self,
        identifier: &str
    ) -> impl Future<Output = Result<BuildOutcome, Error>> + Send;
}

/// Snapshot document listing builders and their builds.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StatusDocument {
    /// Known builders.
    #[serde(default)]
    pub builders: Vec<BuilderRecord>
}

/// One builder in the snapshot.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuilderRecord {
    /// Numeric builder id.
    pub id:     u64,
    /// Builder name.
    pub name:   String,
    /// Builds of this builder in any order.
    #[serde(default)]
    pub builds: Vec<BuildRecord>
}

/// One build of a builder.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildRecord {
    /// Build number, increasing per builder.
    pub number:   u64,
    /// Whether the build has completed.
    #[serde(default)]
    pub complete: bool,
    /// Result code of a completed build.
    #[serde(default)]
    pub results:  Option<i64>
}

impl BuilderRecord {
    /// Returns the build with the highest number.
    pub fn latest_build(&self) -> Option<&BuildRecord> {
        self.builds.iter().max_by_key(|build| build.number)
    }

    /// Returns the outcome of the latest build.
    pub fn latest_outcome(&self) -> BuildOutcome {
        match self.latest_build() {
            Some(build) => BuildOutcome {
                found:       true,
                complete:    build.complete,
                result_code: build.results
            },
            None => BuildOutcome::not_found()
        }
    }
}

/// In-memory status source loaded from a YAML snapshot.
#[derive(Debug, Clone, Default)]
pub struct FileStatusStore {
    builders: Vec<BuilderRecord>
}

impl FileStatusStore {
    /// Loads a snapshot from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read, [`Error::Parse`]
    /// when it is not a valid document and [`Error::Validation`] when builder
    /// ids or names repeat.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
        Self::parse(&contents)
    }

    /// Parses a snapshot from YAML text.
    ///
    /// # Errors
    ///
    /// See [`FileStatusStore::load`].
    ///
    /// # Examples
    ///
    /// ```
    /// use buildbadge::{BuildStatus, FileStatusStore, classify};
    ///
    /// let store = FileStatusStore::parse(
    ///     "builders:\n  - id: 1\n    name: linux\n    builds:\n      - number: 7\n        complete: true\n        results: 0\n"
    /// )
    /// .unwrap();
    /// assert_eq!(classify(&store.lookup("linux")), BuildStatus::Success);
    /// assert_eq!(classify(&store.lookup("1")), BuildStatus::Success);
    /// ```
    pub fn parse(contents: &str) -> Result<Self, Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let document: StatusDocument = serde_yaml::from_str(contents)?;
        Self::from_document(document)
    }

    /// Builds a store from an already decoded document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when builder ids or names repeat.
    pub fn from_document(document: StatusDocument) -> Result<Self, Error> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for builder in &document.builders {
            if !ids.insert(builder.id) {
                return Err(Error::validation(format!(
                    "builder id {} is listed more than once",
                    builder.id
                )));
            }
            if !names.insert(builder.name.as_str()) {
                return Err(Error::validation(format!(
                    "builder name '{}' is listed more than once",
                    builder.name
                )));
            }
        }

        Ok(Self {
            builders: document.builders
        })
    }

    /// Returns every builder in document order.
    pub fn builders(&self) -> &[BuilderRecord] {
        &self.builders
    }

    /// Resolves `identifier` to a builder.
    ///
    /// All-digit identifiers are matched against builder ids, anything else
    /// against builder names.
    pub fn builder(&self, identifier: &str) -> Option<&BuilderRecord> {
        match identifier.parse::<u64>() {
            Ok(id) => self.builders.iter().find(|builder| builder.id == id),
            Err(_) => self
                .builders
                .iter()
                .find(|builder| builder.name == identifier)
        }
    }

    /// Returns the latest outcome for `identifier`.
    pub fn lookup(&self, identifier: &str) -> BuildOutcome {
        self.builder(identifier)
            .map_or_else(BuildOutcome::not_found, BuilderRecord::latest_outcome)
    }
}

impl StatusSource for FileStatusStore {
    fn find_status(
        &self,
        identifier: &str
    ) -> impl Future<Output = Result<BuildOutcome, Error>> + Send {
        future::ready(Ok(self.lookup(identifier)))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::status::{BuildStatus, classify};

    const SNAPSHOT: &str = r#"
builders:
  - id: 1
    name: linux
    builds:
      - number: 3
        complete: true
        results: 2
      - number: 4
        complete: true
        results: 0
  - id: 2
    name: windows
    builds:
      - number: 9
        complete: false
  - id: 3
    name: docs
"#;

    fn store() -> FileStatusStore {
        FileStatusStore::parse(SNAPSHOT).expect("expected valid snapshot")
    }

    #[test]
    fn latest_build_is_the_highest_number() {
        let outcome = store().lookup("linux");
        assert_eq!(classify(&outcome), BuildStatus::Success);
    }

    #[test]
    fn numeric_identifier_matches_builder_id() {
        assert_eq!(store().lookup("2"), BuildOutcome {
            found:       true,
            complete:    false,
            result_code: None
        });
    }

    #[test]
    fn builder_without_builds_is_not_found() {
        assert_eq!(store().lookup("docs"), BuildOutcome::not_found());
    }

    #[test]
    fn unknown_identifier_is_not_found() {
        let store = store();
        assert_eq!(store.lookup("macos"), BuildOutcome::not_found());
        assert_eq!(store.lookup("42"), BuildOutcome::not_found());
    }

    #[test]
    fn empty_document_yields_empty_store() {
        let store = FileStatusStore::parse("   \n").expect("expected empty store");
        assert!(store.builders().is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = FileStatusStore::parse(
            "builders:\n  - id: 1\n    name: a\n  - id: 1\n    name: b\n"
        );
        match result {
            Err(Error::Validation {
                message
            }) => assert!(message.contains("builder id 1")),
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = FileStatusStore::parse(
            "builders:\n  - id: 1\n    name: a\n  - id: 2\n    name: a\n"
        );
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = FileStatusStore::parse("builders:\n  - id: 1\n    name: a\n    owner: x\n");
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn load_reads_snapshot_from_disk() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("status.yaml");
        fs::write(&path, SNAPSHOT).expect("failed to write snapshot");

        let store = FileStatusStore::load(&path).expect("expected load success");
        assert_eq!(store.builders().len(), 3);
    }

    #[test]
    fn load_reports_missing_file() {
        let error = FileStatusStore::load(Path::new("/nonexistent/status.yaml"))
            .expect_err("expected io error");
        assert!(matches!(error, Error::Io { .. }));
    }

    #[tokio::test]
    async fn find_status_answers_with_lookup() {
        let store = store();
        let outcome = store.find_status("windows").await.expect("expected outcome");
        assert_eq!(classify(&outcome), BuildStatus::Running);
    }
}

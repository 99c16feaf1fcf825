// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Build outcome classification and status colors.
//!
//! The classifier is a total function: every outcome reported by the build
//! status collaborator maps to exactly one [`BuildStatus`]. Colors are looked
//! up in a [`ColorScheme`] which always answers, falling back to the color of
//! [`BuildStatus::Unknown`].

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Grey used when a scheme has neither the requested status nor `unknown`.
const FALLBACK_COLOR: &str = "#9f9f9f";

/// Canonical status labels used for color lookup.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    /// The build finished successfully.
    Success,
    /// The build finished with warnings.
    Warnings,
    /// The build failed.
    Failure,
    /// The build was skipped.
    Skipped,
    /// The build hit an infrastructure exception.
    Exception,
    /// The build is scheduled for a retry.
    Retry,
    /// The latest build has not completed yet.
    Running,
    /// No build exists or its result has no canonical label.
    Unknown
}

impl BuildStatus {
    /// Every canonical status, in result-code order followed by the derived
    /// labels.
    pub const ALL: [BuildStatus; 8] = [
        BuildStatus::Success,
        BuildStatus::Warnings,
        BuildStatus::Failure,
        BuildStatus::Skipped,
        BuildStatus::Exception,
        BuildStatus::Retry,
        BuildStatus::Running,
        BuildStatus::Unknown
    ];

    /// Maps a build result code to its canonical label.
    ///
    /// Codes outside the result vocabulary, including `6` (cancelled), have
    /// no canonical label.
    pub fn from_result_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::Warnings),
            2 => Some(Self::Failure),
            3 => Some(Self::Skipped),
            4 => Some(Self::Exception),
            5 => Some(Self::Retry),
            _ => None
        }
    }

    /// Returns the lowercase label rendered in the badge.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warnings => "warnings",
            Self::Failure => "failure",
            Self::Skipped => "skipped",
            Self::Exception => "exception",
            Self::Retry => "retry",
            Self::Running => "running",
            Self::Unknown => "unknown"
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or(())
    }
}

/// Latest build outcome reported by the build status collaborator.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildOutcome {
    /// Whether a build record exists for the identifier.
    pub found:       bool,
    /// Whether the build has completed.
    pub complete:    bool,
    /// Raw result code of a completed build.
    pub result_code: Option<i64>
}

impl BuildOutcome {
    /// Outcome reported for identifiers without any build.
    pub const fn not_found() -> Self {
        Self {
            found:       false,
            complete:    false,
            result_code: None
        }
    }
}

/// Classifies a build outcome into its canonical status.
///
/// # Examples
///
/// ```
/// use buildbadge::{BuildOutcome, BuildStatus, classify};
///
/// let outcome = BuildOutcome {
///     found:       true,
///     complete:    true,
///     result_code: Some(0)
/// };
/// assert_eq!(classify(&outcome), BuildStatus::Success);
/// assert_eq!(classify(&BuildOutcome::not_found()), BuildStatus::Unknown);
/// ```
pub fn classify(outcome: &BuildOutcome) -> BuildStatus {
    if !outcome.found {
        return BuildStatus::Unknown;
    }
    if !outcome.complete {
        return BuildStatus::Running;
    }
    outcome
        .result_code
        .and_then(BuildStatus::from_result_code)
        .unwrap_or(BuildStatus::Unknown)
}

/// Mapping from canonical status to display color.
///
/// The default scheme covers every status. Overrides are merged entry by
/// entry, so a scheme built from [`ColorScheme::default`] never loses a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorScheme {
    colors: BTreeMap<BuildStatus, String>
}

impl Default for ColorScheme {
    fn default() -> Self {
        let colors = [
            (BuildStatus::Success, "#4c1"),
            (BuildStatus::Warnings, "#dfb317"),
            (BuildStatus::Failure, "#e05d44"),
            (BuildStatus::Skipped, "#a4a61d"),
            (BuildStatus::Exception, "#007ec6"),
            (BuildStatus::Retry, "#007ec6"),
            (BuildStatus::Running, "#007ec6"),
            (BuildStatus::Unknown, FALLBACK_COLOR)
        ]
        .into_iter()
        .map(|(status, color)| (status, color.to_owned()))
        .collect();

        Self {
            colors
        }
    }
}

impl ColorScheme {
    /// Builds a scheme holding exactly the provided entries.
    ///
    /// Statuses missing from `entries` resolve to the `unknown` color.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (BuildStatus, String)>
    {
        Self {
            colors: entries.into_iter().collect()
        }
    }

    /// Merges `overrides` into the scheme, replacing colors per status.
    pub fn merge<'a, I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (&'a BuildStatus, &'a String)>
    {
        for (status, color) in overrides {
            self.colors.insert(*status, color.clone());
        }
    }

    /// Returns the color configured for `status`.
    ///
    /// Falls back to the `unknown` color and, when that entry is missing as
    /// well, to a neutral grey.
    pub fn color_for(&self, status: BuildStatus) -> &str {
        self.colors
            .get(&status)
            .or_else(|| self.colors.get(&BuildStatus::Unknown))
            .map_or(FALLBACK_COLOR, String::as_str)
    }

    /// Returns the explicitly configured color for `status`, if any.
    pub fn get(&self, status: BuildStatus) -> Option<&str> {
        self.colors.get(&status).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn outcome(found: bool, complete: bool, result_code: Option<i64>) -> BuildOutcome {
        BuildOutcome {
            found,
            complete,
            result_code
        }
    }

    #[test]
    fn successful_build_is_green() {
        let status = classify(&outcome(true, true, Some(0)));
        assert_eq!(status, BuildStatus::Success);
        assert_eq!(ColorScheme::default().color_for(status), "#4c1");
    }

    #[test]
    fn incomplete_build_is_running() {
        let status = classify(&outcome(true, false, None));
        assert_eq!(status, BuildStatus::Running);
        assert_eq!(ColorScheme::default().color_for(status), "#007ec6");
    }

    #[test]
    fn incomplete_build_ignores_stale_result_code() {
        assert_eq!(classify(&outcome(true, false, Some(2))), BuildStatus::Running);
    }

    #[test]
    fn missing_build_is_unknown() {
        let status = classify(&BuildOutcome::not_found());
        assert_eq!(status, BuildStatus::Unknown);
        assert_eq!(ColorScheme::default().color_for(status), "#9f9f9f");
    }

    #[test]
    fn result_codes_follow_vocabulary_order() {
        let expected = [
            BuildStatus::Success,
            BuildStatus::Warnings,
            BuildStatus::Failure,
            BuildStatus::Skipped,
            BuildStatus::Exception,
            BuildStatus::Retry
        ];
        for (code, status) in expected.into_iter().enumerate() {
            assert_eq!(classify(&outcome(true, true, Some(code as i64))), status);
        }
    }

    #[test]
    fn out_of_range_codes_are_unknown() {
        assert_eq!(classify(&outcome(true, true, Some(6))), BuildStatus::Unknown);
        assert_eq!(classify(&outcome(true, true, Some(-1))), BuildStatus::Unknown);
        assert_eq!(classify(&outcome(true, true, None)), BuildStatus::Unknown);
    }

    #[test]
    fn default_scheme_covers_every_status() {
        let scheme = ColorScheme::default();
        for status in BuildStatus::ALL {
            assert!(scheme.get(status).is_some(), "missing color for {status}");
        }
        assert_eq!(scheme.color_for(BuildStatus::Skipped), "#a4a61d");
    }

    #[test]
    fn merge_replaces_only_supplied_entries() {
        let mut scheme = ColorScheme::default();
        let overrides = BTreeMap::from([(BuildStatus::Failure, "#f00".to_owned())]);
        scheme.merge(&overrides);

        assert_eq!(scheme.color_for(BuildStatus::Failure), "#f00");
        assert_eq!(scheme.color_for(BuildStatus::Success), "#4c1");
    }

    #[test]
    fn partial_scheme_falls_back_to_unknown_color() {
        let scheme = ColorScheme::from_entries([(BuildStatus::Unknown, "#123456".to_owned())]);
        assert_eq!(scheme.color_for(BuildStatus::Failure), "#123456");
    }

    #[test]
    fn empty_scheme_still_answers() {
        let scheme = ColorScheme::from_entries([]);
        assert_eq!(scheme.color_for(BuildStatus::Success), FALLBACK_COLOR);
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for status in BuildStatus::ALL {
            assert_eq!(status.as_str().parse::<BuildStatus>(), Ok(status));
        }
        assert!("cancelled".parse::<BuildStatus>().is_err());
    }

    fn any_status() -> impl Strategy<Value = BuildStatus> {
        prop::sample::select(BuildStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn classify_is_total_and_deterministic(
            found in any::<bool>(),
            complete in any::<bool>(),
            code in proptest::option::of(any::<i64>())
        ) {
            let input = outcome(found, complete, code);
            let first = classify(&input);
            prop_assert_eq!(first, classify(&input));
            prop_assert!(BuildStatus::ALL.contains(&first));
        }

        #[test]
        fn color_lookup_falls_back_to_unknown(
            status in any_status(),
            unknown_color in "#[0-9a-f]{6}"
        ) {
            let scheme = ColorScheme::from_entries([(BuildStatus::Unknown, unknown_color.clone())]);
            prop_assert_eq!(scheme.color_for(status), unknown_color.as_str());
        }
    }
}

#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the badge renderer."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Every failure is local to a single render. Configuration problems are the
//! caller's fault and map to a client error; template, rasterization and font
//! backend problems are server-side faults. An unknown builder is not an
//! error at all and never reaches this type.

use std::path::{Path, PathBuf};

/// Unified error type returned by the renderer, the service and the CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// A request-supplied option carried an invalid value.
    #[error("invalid badge option: {message}")]
    Config {
        /// Human readable message naming the offending option.
        message: String
    },
    /// A deployment or status document is structurally valid but
    /// semantically inconsistent.
    #[error("{message}")]
    Validation {
        /// Human readable message describing the inconsistency.
        message: String
    },
    /// The resolved template name does not exist in the template set.
    #[error("badge template '{name}' was not found")]
    TemplateNotFound {
        /// Template name after `{style}` substitution.
        name: String
    },
    /// A template could not be parsed or rendered.
    #[error("failed to render badge template: {message}")]
    Render {
        /// Human readable message describing the template failure.
        message: String
    },
    /// Vector to raster conversion failed.
    #[error("failed to rasterize badge: {message}")]
    Rasterization {
        /// Human readable message describing the conversion failure.
        message: String
    },
    /// The font backend could not resolve any usable face.
    #[error("font backend error: {message}")]
    RenderBackend {
        /// Human readable message describing the backend failure.
        message: String
    },
    /// The build status collaborator failed to answer.
    #[error("build status lookup failed: {message}")]
    Status {
        /// Human readable message describing the lookup failure.
        message: String
    },
    /// The requested path does not name a badge.
    #[error("no badge route matches '{path}'")]
    Route {
        /// Path received by the service.
        path: String
    },
    /// Wraps I/O errors that occur while reading configuration, status or
    /// template files.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// Location of the file being read.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps serialization errors when writing JSON reports.
    #[error("failed to serialize report: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps I/O errors that occur while writing badge artifacts.
    #[error("failed to write badge artifact at {path:?}: {source}")]
    BadgeIo {
        /// Location of the artifact being produced.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    }
}

impl Error {
    /// Constructs a configuration error from the provided message.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the invalid option.
    pub fn config<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Config {
            message: message.into()
        }
    }

    /// Constructs a validation error from the provided message.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a template-not-found error for the resolved name.
    pub fn template_not_found<N>(name: N) -> Self
    where
        N: Into<String>
    {
        Self::TemplateNotFound {
            name: name.into()
        }
    }

    /// Constructs a template render error from the provided message.
    pub fn render<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Render {
            message: message.into()
        }
    }

    /// Constructs a rasterization error from the provided message.
    pub fn rasterization<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Rasterization {
            message: message.into()
        }
    }

    /// Constructs a font backend error from the provided message.
    pub fn render_backend<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::RenderBackend {
            message: message.into()
        }
    }

    /// Constructs a status lookup error from the provided message.
    pub fn status<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Status {
            message: message.into()
        }
    }

    /// Returns the HTTP status code the service answers with for this error.
    ///
    /// Invalid options are the caller's fault (`400`), unmatched paths are
    /// `404`, and everything else is a server-side failure (`500`).
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config {
                ..
            } => 400,
            Self::Route {
                ..
            } => 404,
            _ => 500
        }
    }

    /// Returns `true` when retrying the failed operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::BadgeIo`] variant capturing the failing path and
/// source.
///
/// # Parameters
///
/// * `path` - Location of the badge artifact that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn badge_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::BadgeIo {
        path: path.to_path_buf(),
        source
    }
}

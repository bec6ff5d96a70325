#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the community tooling crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the config readers, the GraphQL client,
/// the validators and the CLI.
///
/// Configuration problems (`Io`, `Parse`, `Validation`) are raised before any
/// remote call is made. Remote failures surface as `Service` or `Query` once
/// the retry budget is spent. Output failures (`Emit`, `Write`)
/// abort the run as well.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading configuration files.
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
    /// Returned when flags or configuration violate invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps YAML encoding errors raised when producing output documents.
    #[error("failed to emit yaml: {source}")]
    Emit {
        /// Underlying serialization error.
        source: serde_yaml::Error
    },
    /// Wraps I/O errors that occur while writing reports or rewritten files.
    #[error("failed to write {path:?}: {source}")]
    Write {
        /// Location of the file being written.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Service errors when interacting with external APIs.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    },
    /// A GraphQL query that reached the endpoint but could not be answered.
    #[error("failed to use github query {operation} with variables {variables}: {message}")]
    Query {
        /// Operation name of the failing query.
        operation: String,
        /// JSON rendering of the variables sent with the query.
        variables: String,
        /// Messages reported by the endpoint.
        message:   String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the service error.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }

    /// The message without the variant prefix, for wrapping into another
    /// error.
    ///
    /// `Service` and `Validation` yield their bare message; every other
    /// variant renders as [`std::fmt::Display`].
    pub fn detail(&self) -> String {
        match self {
            Self::Service {
                message
            }
            | Self::Validation {
                message
            } => message.clone(),
            other => other.to_string()
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(error: octocrab::Error) -> Self {
        Self::Service {
            message: error.to_string()
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

/// Creates an [`Error::Write`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the output file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn write_error(path: &Path, source: std::io::Error) -> Error {
    Error::Write {
        path: path.to_path_buf(),
        source
    }
}

/// Maps a YAML encoding failure onto [`Error::Emit`].
pub fn emit_error(source: serde_yaml::Error) -> Error {
    Error::Emit {
        source
    }
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gitsieve

use thiserror::Error;

/// Errors that can occur while configuring or walking repositories
#[derive(Debug, Error)]
pub enum SieveError {
    /// Error from git2 library
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// Invalid commit reference (branch, tag, or SHA)
    #[error("Invalid commit reference: {reference}")]
    InvalidReference {
        /// The reference string that could not be resolved
        reference: String,
    },

    /// An object id that does not name a commit
    #[error("Object {id} is not a commit")]
    NotACommit {
        /// Hex id of the offending object
        id: String,
    },

    /// A filter or finder was constructed with a missing or empty argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument
        message: String,
    },
}

impl SieveError {
    /// Build an [`SieveError::InvalidArgument`] from a message
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Reasons a filter evaluation did not produce a verdict
///
/// `Stop` is not a failure: it ends the current repository's walk and is
/// swallowed by the finder. `Error` unwinds the whole find call.
#[derive(Debug, Error)]
pub enum Interrupt {
    /// Stop walking the current repository
    #[error("walk stopped")]
    Stop,

    /// Hard failure
    #[error(transparent)]
    Error(#[from] SieveError),
}

impl From<git2::Error> for Interrupt {
    fn from(err: git2::Error) -> Self {
        Self::Error(SieveError::Git2(err))
    }
}

/// Result of evaluating a filter against one commit
pub type FilterResult = Result<bool, Interrupt>;

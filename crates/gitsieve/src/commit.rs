// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Owned commit snapshots
//!
//! `git2::Commit` borrows its repository, so filters that keep commits past a
//! single evaluation (lists, cursors, last-seen) copy them into [`Commit`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A name and email pair identifying an author or committer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

/// A person with the time they acted on a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// When the person authored or committed
    pub when: DateTime<Utc>,
}

impl Person {
    /// Copy a git2 signature
    #[must_use]
    pub fn from_signature(signature: &git2::Signature<'_>) -> Self {
        Self {
            name: signature.name().unwrap_or("Unknown").to_string(),
            email: signature.email().unwrap_or("").to_string(),
            when: DateTime::from_timestamp(signature.when().seconds(), 0).unwrap_or_default(),
        }
    }

    /// The name and email without the timestamp
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Represents a parsed git commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// The commit SHA (40 hex characters)
    pub sha: String,
    /// SHA of the root tree
    pub tree: String,
    /// Commit message
    pub message: String,
    /// Author identity and author time
    pub author: Person,
    /// Committer identity and commit time
    pub committer: Person,
    /// Parent commit SHAs
    pub parents: Vec<String>,
}

impl Commit {
    /// Snapshot a commit handed out by the walk
    #[must_use]
    pub fn from_git2(commit: &git2::Commit<'_>) -> Self {
        Self {
            sha: commit.id().to_string(),
            tree: commit.tree_id().to_string(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            author: Person::from_signature(&commit.author()),
            committer: Person::from_signature(&commit.committer()),
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
        }
    }
}

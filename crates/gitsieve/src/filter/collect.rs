// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Accumulating filters
//!
//! These include every commit and remember something about it. Combine them
//! with selecting filters through [`AndFilter`](super::AndFilter) or
//! [`AllFilter`](super::AllFilter).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{CommitFilter, WalkContext};
use crate::commit::{Commit, Identity, Person};
use crate::error::FilterResult;

/// Counts the commits it sees
#[derive(Debug, Clone, Default)]
pub struct CommitCountFilter {
    count: usize,
}

impl CommitCountFilter {
    /// Counter starting at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits counted since construction or reset
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}

impl CommitFilter for CommitCountFilter {
    fn include(&mut self, _walk: &mut WalkContext<'_>, _commit: &git2::Commit<'_>) -> FilterResult {
        self.count += 1;
        Ok(true)
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self::new())
    }
}

/// Collects every commit it sees, in walk order
#[derive(Debug, Clone, Default)]
pub struct CommitListFilter {
    commits: Vec<Commit>,
}

impl CommitListFilter {
    /// Empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected commits
    #[must_use]
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }
}

impl CommitFilter for CommitListFilter {
    fn include(&mut self, _walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        self.commits.push(Commit::from_git2(commit));
        Ok(true)
    }

    fn reset(&mut self) {
        self.commits.clear();
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self::new())
    }
}

/// Remembers the most recent commit it saw
#[derive(Debug, Clone, Default)]
pub struct LastCommitFilter {
    last: Option<Commit>,
}

impl LastCommitFilter {
    /// Filter that has seen nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commit seen
    #[must_use]
    pub fn last(&self) -> Option<&Commit> {
        self.last.as_ref()
    }
}

impl CommitFilter for LastCommitFilter {
    fn include(&mut self, _walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        self.last = Some(Commit::from_git2(commit));
        Ok(true)
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self::new())
    }
}

/// Which person on a commit a filter looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The author
    Author,
    /// The committer
    Committer,
}

impl Role {
    /// The person in this role on `commit`
    #[must_use]
    pub fn person(self, commit: &git2::Commit<'_>) -> Person {
        match self {
            Self::Author => Person::from_signature(&commit.author()),
            Self::Committer => Person::from_signature(&commit.committer()),
        }
    }
}

/// Collects the distinct authors or committers of the commits it sees
#[derive(Debug, Clone)]
pub struct PersonSetFilter {
    role: Role,
    people: BTreeSet<Identity>,
}

impl PersonSetFilter {
    /// Collect people in `role`
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            people: BTreeSet::new(),
        }
    }

    /// Collect authors
    #[must_use]
    pub fn authors() -> Self {
        Self::new(Role::Author)
    }

    /// Collect committers
    #[must_use]
    pub fn committers() -> Self {
        Self::new(Role::Committer)
    }

    /// Distinct identities, sorted by name then email
    #[must_use]
    pub fn people(&self) -> &BTreeSet<Identity> {
        &self.people
    }
}

impl CommitFilter for PersonSetFilter {
    fn include(&mut self, _walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        self.people.insert(self.role.person(commit).identity());
        Ok(true)
    }

    fn reset(&mut self) {
        self.people.clear();
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self::new(self.role))
    }
}

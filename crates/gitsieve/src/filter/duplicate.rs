// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commits that write the same content to more than one path

use std::collections::{BTreeMap, BTreeSet};

use git2::Repository;
use serde::{Deserialize, Serialize};

use super::{BoundRenames, CommitFilter, WalkContext, bind_renames};
use crate::diff::{ChangeKind, RenameDetector};
use crate::error::{FilterResult, SieveError};

/// Duplicate content found in one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateContainer {
    /// The commit's SHA
    pub commit: String,
    /// Blob SHA to the paths that received it
    pub duplicates: BTreeMap<String, BTreeSet<String>>,
}

impl DuplicateContainer {
    /// Total number of paths across all duplicate groups
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.duplicates.values().map(BTreeSet::len).sum()
    }
}

/// Includes commits whose changes write one blob to two or more paths
///
/// Deletions, submodules and renames that kept their content are not
/// considered. One [`DuplicateContainer`] is recorded per included commit.
#[derive(Debug, Clone, Default)]
pub struct DuplicateBlobFilter {
    renames: Option<BoundRenames>,
    containers: Vec<DuplicateContainer>,
}

impl DuplicateBlobFilter {
    /// Detector without rename detection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Detect renames first so pure moves are not reported
    #[must_use]
    pub fn with_renames(mut self, detector: RenameDetector) -> Self {
        self.renames = Some(BoundRenames::new(detector));
        self
    }

    /// Duplicate groups found so far, in walk order
    #[must_use]
    pub fn containers(&self) -> &[DuplicateContainer] {
        &self.containers
    }
}

impl CommitFilter for DuplicateBlobFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        let changes = walk.changes(commit, self.renames.as_ref().map(BoundRenames::detector))?;

        let mut blobs: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for change in changes.iter() {
            if change.kind == ChangeKind::Delete || change.is_submodule() {
                continue;
            }
            if change.kind == ChangeKind::Rename && change.old_id == change.new_id {
                continue;
            }
            if let Some(path) = &change.new_path {
                blobs
                    .entry(change.new_id.to_string())
                    .or_default()
                    .insert(path.clone());
            }
        }
        blobs.retain(|_, paths| paths.len() > 1);
        if blobs.is_empty() {
            return Ok(false);
        }

        self.containers.push(DuplicateContainer {
            commit: commit.id().to_string(),
            duplicates: blobs,
        });
        Ok(true)
    }

    fn reset(&mut self) {
        self.containers.clear();
        if let Some(renames) = self.renames.as_mut() {
            renames.reset();
        }
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        bind_renames(self.renames.as_mut(), repo)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self {
            renames: self.renames.clone(),
            containers: Vec::new(),
        })
    }
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Filters over a commit's changeset
//!
//! Each filter asks the walk context for the commit's changes, optionally
//! with rename detection, and for line edits only when it needs them.

use git2::Repository;
use serde::{Deserialize, Serialize};

use super::{BoundRenames, CommitFilter, WalkContext, bind_renames};
use crate::diff::{EditKind, RenameDetector};
use crate::error::{FilterResult, SieveError};

/// Running line totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStats {
    /// Lines inserted
    pub added: usize,
    /// Lines rewritten, counting the longer side of each replacement
    pub edited: usize,
    /// Lines removed
    pub deleted: usize,
}

impl LineStats {
    /// Sum of all three counters
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.edited + self.deleted
    }
}

/// Accumulates inserted, edited and deleted lines over a whole walk
///
/// Includes every commit.
#[derive(Debug, Clone, Default)]
pub struct LineStatsFilter {
    renames: Option<BoundRenames>,
    stats: LineStats,
}

impl LineStatsFilter {
    /// Totals without rename detection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Detect renames before counting, so moved files count only their edits
    #[must_use]
    pub fn with_renames(mut self, detector: RenameDetector) -> Self {
        self.renames = Some(BoundRenames::new(detector));
        self
    }

    /// Totals since construction or reset
    #[must_use]
    pub fn stats(&self) -> LineStats {
        self.stats
    }
}

impl CommitFilter for LineStatsFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        let changes = walk.changes(commit, self.renames.as_ref().map(BoundRenames::detector))?;
        for change in changes.iter() {
            for edit in walk.edits(change)? {
                match edit.kind {
                    EditKind::Insert => self.stats.added += edit.new_len,
                    EditKind::Delete => self.stats.deleted += edit.old_len,
                    EditKind::Replace => self.stats.edited += edit.lines(),
                }
            }
        }
        Ok(true)
    }

    fn reset(&mut self) {
        self.stats = LineStats::default();
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
            stats: LineStats::default(),
        })
    }
}

/// Includes commits that change at least `min` lines
///
/// Edits are fetched file by file and counting stops once the threshold is
/// reached.
#[derive(Debug, Clone)]
pub struct DiffLineCountFilter {
    min: usize,
    renames: Option<BoundRenames>,
}

impl DiffLineCountFilter {
    /// Require `min` changed lines
    #[must_use]
    pub fn new(min: usize) -> Self {
        Self { min, renames: None }
    }

    /// Detect renames before counting
    #[must_use]
    pub fn with_renames(mut self, detector: RenameDetector) -> Self {
        self.renames = Some(BoundRenames::new(detector));
        self
    }

    /// Configured threshold
    #[must_use]
    pub fn min(&self) -> usize {
        self.min
    }
}

impl CommitFilter for DiffLineCountFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        if self.min == 0 {
            return Ok(true);
        }
        let changes = walk.changes(commit, self.renames.as_ref().map(BoundRenames::detector))?;
        let mut lines = 0;
        for change in changes.iter() {
            for edit in walk.edits(change)? {
                lines += edit.lines();
                if lines >= self.min {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn reset(&mut self) {
        if let Some(renames) = self.renames.as_mut() {
            renames.reset();
        }
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        bind_renames(self.renames.as_mut(), repo)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(self.clone())
    }
}

/// Includes commits that touch at least `min` paths
#[derive(Debug, Clone)]
pub struct DiffFileCountFilter {
    min: usize,
    renames: Option<BoundRenames>,
}

impl DiffFileCountFilter {
    /// Require `min` changed paths
    #[must_use]
    pub fn new(min: usize) -> Self {
        Self { min, renames: None }
    }

    /// Detect renames first, so a moved file counts once
    #[must_use]
    pub fn with_renames(mut self, detector: RenameDetector) -> Self {
        self.renames = Some(BoundRenames::new(detector));
        self
    }

    /// Configured threshold
    #[must_use]
    pub fn min(&self) -> usize {
        self.min
    }
}

impl CommitFilter for DiffFileCountFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        if self.min == 0 {
            return Ok(true);
        }
        let changes = walk.changes(commit, self.renames.as_ref().map(BoundRenames::detector))?;
        Ok(changes.iter().take(self.min).count() >= self.min)
    }

    fn reset(&mut self) {
        if let Some(renames) = self.renames.as_mut() {
            renames.reset();
        }
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        bind_renames(self.renames.as_mut(), repo)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(self.clone())
    }
}

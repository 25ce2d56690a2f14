// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Filters that bound or checkpoint a walk
//!
//! [`LimitFilter`] caps how many commits are accepted, [`CursorFilter`]
//! remembers where a bounded walk left off, and [`StopFilter`] turns an
//! exclusion into the end of the walk. Together they page through long
//! histories:
//!
//! ```no_run
//! use gitsieve::filter::{CommitFilter, CursorFilter, LimitFilter, StopFilter};
//! use gitsieve::{CommitFinder, GitRepo};
//!
//! let mut finder = CommitFinder::new(vec![GitRepo::open(".")?])?;
//! let mut pager = StopFilter::new(CursorFilter::new(LimitFilter::new(100)));
//! let mut start = "HEAD".to_string();
//! loop {
//!     finder.find_from(&start, &mut pager)?;
//!     let Some(next) = pager.inner::<CursorFilter>().and_then(CursorFilter::boundary) else {
//!         break;
//!     };
//!     start = next.sha.clone();
//!     pager.reset();
//! }
//! # Ok::<(), gitsieve::SieveError>(())
//! ```

use git2::Repository;
use tracing::debug;

use super::{CommitFilter, WalkContext, downcast_mut, downcast_ref};
use crate::commit::Commit;
use crate::error::{FilterResult, Interrupt, SieveError};

/// Includes the first `limit` commits seen since construction or reset
#[derive(Debug, Clone)]
pub struct LimitFilter {
    limit: usize,
    seen: usize,
}

impl LimitFilter {
    /// Accept at most `limit` commits
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { limit, seen: 0 }
    }

    /// Configured limit
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Commits evaluated so far
    #[must_use]
    pub fn seen(&self) -> usize {
        self.seen
    }
}

impl CommitFilter for LimitFilter {
    fn include(&mut self, _walk: &mut WalkContext<'_>, _commit: &git2::Commit<'_>) -> FilterResult {
        self.seen = self.seen.saturating_add(1);
        Ok(self.seen <= self.limit)
    }

    fn reset(&mut self) {
        self.seen = 0;
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self::new(self.limit))
    }
}

/// Records where a wrapped filter first turned commits away
///
/// When the wrapped filter excludes a commit, that commit becomes the
/// boundary: the point a later walk resumes from. The most recent accepted
/// commit is kept as well.
#[derive(Debug)]
pub struct CursorFilter {
    inner: Box<dyn CommitFilter>,
    boundary: Option<Commit>,
    last: Option<Commit>,
}

impl CursorFilter {
    /// Track the verdicts of `filter`
    #[must_use]
    pub fn new(filter: impl CommitFilter + 'static) -> Self {
        Self::from_boxed(Box::new(filter))
    }

    fn from_boxed(inner: Box<dyn CommitFilter>) -> Self {
        Self {
            inner,
            boundary: None,
            last: None,
        }
    }

    /// The commit the wrapped filter most recently excluded
    #[must_use]
    pub fn boundary(&self) -> Option<&Commit> {
        self.boundary.as_ref()
    }

    /// The commit the wrapped filter most recently included
    #[must_use]
    pub fn last(&self) -> Option<&Commit> {
        self.last.as_ref()
    }

    /// The wrapped filter as its concrete type
    #[must_use]
    pub fn inner<T: CommitFilter + 'static>(&self) -> Option<&T> {
        downcast_ref::<T>(&*self.inner)
    }
}

impl CommitFilter for CursorFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        if self.inner.include(walk, commit)? {
            self.last = Some(Commit::from_git2(commit));
            Ok(true)
        } else {
            self.boundary = Some(Commit::from_git2(commit));
            Ok(false)
        }
    }

    fn reset(&mut self) {
        self.boundary = None;
        self.last = None;
        self.inner.reset();
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        self.inner.bind(repo)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self::from_boxed(self.inner.clone_filter()))
    }
}

/// Ends the walk of the current repository at the first commit the wrapped
/// filter excludes
#[derive(Debug)]
pub struct StopFilter {
    inner: Box<dyn CommitFilter>,
}

impl StopFilter {
    /// Stop when `filter` excludes a commit
    #[must_use]
    pub fn new(filter: impl CommitFilter + 'static) -> Self {
        Self {
            inner: Box::new(filter),
        }
    }

    /// The wrapped filter as its concrete type
    #[must_use]
    pub fn inner<T: CommitFilter + 'static>(&self) -> Option<&T> {
        downcast_ref::<T>(&*self.inner)
    }

    /// The wrapped filter as its mutable concrete type
    #[must_use]
    pub fn inner_mut<T: CommitFilter + 'static>(&mut self) -> Option<&mut T> {
        downcast_mut::<T>(&mut *self.inner)
    }
}

impl CommitFilter for StopFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        if self.inner.include(walk, commit)? {
            Ok(true)
        } else {
            debug!(commit = %commit.id(), "filter excluded commit, stopping walk");
            Err(Interrupt::Stop)
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        self.inner.bind(repo)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self {
            inner: self.inner.clone_filter(),
        })
    }
}

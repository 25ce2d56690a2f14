// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit filters
//!
//! Every filter implements [`CommitFilter`]: `include` evaluates one commit,
//! `reset` returns accumulated state to its freshly-built value, `bind`
//! caches repository-scoped settings before a walk, and `clone_filter`
//! produces an independent copy with fresh state.
//!
//! Filters are composed into trees with the combinators in [`compose`] and
//! read back after a walk through typed accessors:
//!
//! ```no_run
//! use gitsieve::filter::{AndFilter, CommitCountFilter, DiffLineCountFilter};
//! use gitsieve::{CommitFinder, GitRepo};
//!
//! let mut finder = CommitFinder::new(vec![GitRepo::open(".")?])?;
//! let mut matcher = AndFilter::new()
//!     .add(DiffLineCountFilter::new(10))
//!     .add(CommitCountFilter::new());
//! finder.find(&mut matcher)?;
//! let count = matcher.child::<CommitCountFilter>(1).map(CommitCountFilter::count);
//! # Ok::<(), gitsieve::SieveError>(())
//! ```

pub mod collect;
pub mod compose;
pub mod control;
pub mod diff;
pub mod duplicate;
pub mod impact;
pub mod select;

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use git2::{Oid, Repository};

use crate::diff::{ChangeEntry, Edit, RenameDetector, TreeDiffer, blob};
use crate::error::{FilterResult, SieveError};
use crate::path::PathFilter;

pub use collect::{CommitCountFilter, CommitListFilter, LastCommitFilter, PersonSetFilter, Role};
pub use compose::{AllFilter, AndFilter, NotFilter, OrFilter};
pub use control::{CursorFilter, LimitFilter, StopFilter};
pub use diff::{DiffFileCountFilter, DiffLineCountFilter, LineStats, LineStatsFilter};
pub use duplicate::{DuplicateBlobFilter, DuplicateContainer};
pub use impact::{CommitImpact, CommitImpactFilter, TopImpacts};
pub use select::{DateFilter, MessageFilter, ParentCountFilter, PersonFilter};

/// Upcast to [`Any`] so owned filters can be read back by concrete type
pub trait AsAny {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A predicate over the commits of a walk
pub trait CommitFilter: AsAny + fmt::Debug {
    /// Decide whether `commit` is included
    ///
    /// `Err(Interrupt::Stop)` ends the walk of the current repository;
    /// `Err(Interrupt::Error(_))` aborts the whole find call.
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult;

    /// Clear accumulated state back to its post-construction value
    fn reset(&mut self) {}

    /// Cache repository-scoped settings before walking `repo`
    ///
    /// # Errors
    ///
    /// Returns an error if repository configuration cannot be read.
    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        let _ = repo;
        Ok(())
    }

    /// An independent copy with the same configuration and fresh state
    fn clone_filter(&self) -> Box<dyn CommitFilter>;
}

impl Clone for Box<dyn CommitFilter> {
    fn clone(&self) -> Self {
        self.clone_filter()
    }
}

/// Conveniences available on every concrete filter
pub trait CommitFilterExt: CommitFilter + Sized + 'static {
    /// Stop the walk instead of excluding a commit
    fn stopping(self) -> StopFilter {
        StopFilter::new(self)
    }

    /// Box the filter
    fn boxed(self) -> Box<dyn CommitFilter> {
        Box::new(self)
    }
}

impl<T: CommitFilter + 'static> CommitFilterExt for T {}

/// Borrow a type-erased filter as its concrete type
#[must_use]
pub fn downcast_ref<T: CommitFilter + 'static>(filter: &dyn CommitFilter) -> Option<&T> {
    filter.as_any().downcast_ref::<T>()
}

/// Mutably borrow a type-erased filter as its concrete type
#[must_use]
pub fn downcast_mut<T: CommitFilter + 'static>(filter: &mut dyn CommitFilter) -> Option<&mut T> {
    filter.as_any_mut().downcast_mut::<T>()
}

/// Rename detection of one filter
///
/// `base` is the detector the filter was built with; `effective` is `base`
/// adjusted to the repository currently bound. Reset and clone return to
/// `base`, so one repository's settings never reach another walk.
#[derive(Debug)]
pub(crate) struct BoundRenames {
    base: RenameDetector,
    effective: RenameDetector,
}

impl BoundRenames {
    pub(crate) fn new(base: RenameDetector) -> Self {
        Self {
            effective: base.clone(),
            base,
        }
    }

    /// The detector to use for the current repository
    pub(crate) fn detector(&self) -> &RenameDetector {
        &self.effective
    }

    pub(crate) fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        self.effective = self.base.configured(repo)?;
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.effective = self.base.clone();
    }
}

impl Clone for BoundRenames {
    fn clone(&self) -> Self {
        Self::new(self.base.clone())
    }
}

/// Bind optional rename detection to `repo`
pub(crate) fn bind_renames(
    renames: Option<&mut BoundRenames>,
    repo: &Repository,
) -> Result<(), SieveError> {
    renames.map_or(Ok(()), |renames| renames.bind(repo))
}

/// Changes of one commit, keyed by the rename detection that produced them
#[derive(Debug)]
struct CachedChanges {
    commit: Oid,
    renames: Option<RenameDetector>,
    changes: Rc<[ChangeEntry]>,
}

/// Per-repository state shared by the filters of one walk
///
/// Holds the repository, the walk's path restriction, and the changesets of
/// the commit under evaluation so several diff-aware filters compute them
/// once.
pub struct WalkContext<'r> {
    repo: &'r Repository,
    paths: Option<&'r PathFilter>,
    raw: Option<CachedChanges>,
    detected: Option<CachedChanges>,
}

impl fmt::Debug for WalkContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkContext")
            .field("repo", &self.repo.path())
            .field("paths", &self.paths)
            .field("raw", &self.raw.as_ref().map(|cached| cached.commit))
            .field("detected", &self.detected.as_ref().map(|cached| cached.commit))
            .finish()
    }
}

impl<'r> WalkContext<'r> {
    /// Context for walking `repo` with no path restriction
    #[must_use]
    pub fn new(repo: &'r Repository) -> Self {
        Self {
            repo,
            paths: None,
            raw: None,
            detected: None,
        }
    }

    /// Restrict changesets to `paths`
    #[must_use]
    pub fn with_paths(mut self, paths: Option<&'r PathFilter>) -> Self {
        self.paths = paths;
        self
    }

    /// The repository being walked
    #[must_use]
    pub fn repo(&self) -> &'r Repository {
        self.repo
    }

    /// The path restriction of the walk
    #[must_use]
    pub fn paths(&self) -> Option<&'r PathFilter> {
        self.paths
    }

    /// Changes `commit` introduces against its parents, optionally with
    /// renames and copies detected
    ///
    /// # Errors
    ///
    /// Returns an error if trees or blobs cannot be read.
    pub fn changes(
        &mut self,
        commit: &git2::Commit<'_>,
        renames: Option<&RenameDetector>,
    ) -> Result<Rc<[ChangeEntry]>, SieveError> {
        let id = commit.id();
        let cached = self
            .raw
            .as_ref()
            .filter(|cached| cached.commit == id)
            .map(|cached| Rc::clone(&cached.changes));
        let raw = match cached {
            Some(changes) => changes,
            None => {
                let changes: Rc<[ChangeEntry]> = TreeDiffer::new(self.repo)
                    .with_paths(self.paths)
                    .diff_commit(commit)?
                    .into();
                self.raw = Some(CachedChanges {
                    commit: id,
                    renames: None,
                    changes: Rc::clone(&changes),
                });
                changes
            }
        };
        let Some(detector) = renames else {
            return Ok(raw);
        };

        if let Some(cached) = &self.detected
            && cached.commit == id
            && cached.renames.as_ref() == Some(detector)
        {
            return Ok(Rc::clone(&cached.changes));
        }
        let changes: Rc<[ChangeEntry]> = detector.detect(self.repo, raw.to_vec())?.into();
        self.detected = Some(CachedChanges {
            commit: id,
            renames: Some(detector.clone()),
            changes: Rc::clone(&changes),
        });
        Ok(changes)
    }

    /// Line edits of one change; submodules have none
    ///
    /// # Errors
    ///
    /// Returns an error if a blob cannot be read or diffed.
    pub fn edits(&self, change: &ChangeEntry) -> Result<Vec<Edit>, SieveError> {
        if change.is_submodule() {
            return Ok(Vec::new());
        }
        blob::blob_edits(self.repo, change.old_id, change.new_id)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeKind;
    use crate::testutil::TestRepo;

    #[test]
    fn test_changes_are_cached_per_commit() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("a.txt", "a\n")]);
        let commit = repo.find(root);

        let mut walk = WalkContext::new(&repo.repo);
        let first = walk.changes(&commit, None).expect("changes");
        let second = walk.changes(&commit, None).expect("changes");
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_changes_with_rename_detection() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("a.txt", "same\n")]);
        let next = repo.commit(&[root], &[("b.txt", "same\n")]);
        let commit = repo.find(next);

        let mut walk = WalkContext::new(&repo.repo);
        let detector = RenameDetector::new();
        let raw = walk.changes(&commit, None).expect("raw");
        let renamed = walk.changes(&commit, Some(&detector)).expect("renamed");
        assert_eq!(raw.len(), 2);
        assert_eq!(renamed.len(), 1);
        assert_eq!(renamed[0].kind, ChangeKind::Rename);
    }

    #[test]
    fn test_edits_of_modification() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("a.txt", "x\n")]);
        let next = repo.commit(&[root], &[("a.txt", "xy\n")]);
        let commit = repo.find(next);

        let mut walk = WalkContext::new(&repo.repo);
        let changes = walk.changes(&commit, None).expect("changes");
        let edits = walk.edits(&changes[0]).expect("edits");
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].lines(), 1);
    }

    #[test]
    fn test_walk_context_debug_names_cached_commit() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("a.txt", "a\n")]);

        let mut walk = WalkContext::new(&repo.repo);
        assert!(format!("{walk:?}").starts_with("WalkContext"));
        walk.changes(&repo.find(root), None).expect("changes");
        assert!(format!("{walk:?}").contains(&root.to_string()));
    }

    #[test]
    fn test_bound_renames_return_to_base() {
        let repo = TestRepo::new();
        repo.repo
            .config()
            .expect("config")
            .set_i64("diff.renameLimit", 0)
            .expect("set limit");

        let mut renames = BoundRenames::new(RenameDetector::new().with_limit(7));
        renames.bind(&repo.repo).expect("bind");
        assert_eq!(renames.detector().limit(), 0);
        assert_eq!(renames.clone().detector().limit(), 7);
        renames.reset();
        assert_eq!(renames.detector().limit(), 7);
    }

    #[test]
    fn test_downcast_boxed_filter() {
        let boxed: Box<dyn CommitFilter> = CommitCountFilter::new().boxed();
        assert!(downcast_ref::<CommitCountFilter>(&*boxed).is_some());
        assert!(downcast_ref::<LimitFilter>(&*boxed).is_none());
    }
}

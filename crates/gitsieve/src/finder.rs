// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The walk driver
//!
//! A [`CommitFinder`] walks one or more repositories in order and feeds every
//! commit that survives the path restriction and the optional revision
//! filter to a matcher. The matcher is borrowed, so whatever it accumulated
//! can be read once the walk returns:
//!
//! ```no_run
//! use gitsieve::filter::{CommitImpactFilter, StopFilter};
//! use gitsieve::{CommitFinder, GitRepo, PathFilter};
//!
//! let mut finder = CommitFinder::new(vec![GitRepo::open(".")?])?
//!     .with_paths(PathFilter::new(["src"])?);
//! let mut impact = CommitImpactFilter::new(10);
//! let summary = finder.find(&mut impact)?;
//! for record in impact.impacts().iter() {
//!     println!("{} {}", record.id, record.total());
//! }
//! println!("{} of {} commits", summary.matched, summary.visited);
//! # Ok::<(), gitsieve::SieveError>(())
//! ```

use git2::Oid;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Interrupt, SieveError};
use crate::filter::{CommitFilter, WalkContext};
use crate::path::PathFilter;
use crate::repo::{GitRepo, WalkOrder};

/// Counters of one find call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindSummary {
    /// Repositories walked
    pub repositories: usize,
    /// Commits handed to the filters after path pruning
    pub visited: usize,
    /// Commits the matcher included
    pub matched: usize,
    /// Repositories whose walk ended on a stop signal
    pub stopped: usize,
}

/// Which commits of a repository to walk
#[derive(Debug, Clone, Copy)]
enum Selection<'a> {
    Head,
    From(&'a str),
    Until(&'a str),
    Between(&'a str, &'a str),
    Branches,
    Tags,
    Commits(&'a [&'a str]),
}

/// Commit ids to evaluate for one repository
enum Plan {
    Walk { starts: Vec<Oid>, hide: Vec<Oid> },
    Exact(Vec<Oid>),
}

impl Selection<'_> {
    fn plan(self, repo: &GitRepo) -> Result<Plan, SieveError> {
        let plan = match self {
            Self::Head => Plan::Walk {
                starts: vec![repo.head()?],
                hide: Vec::new(),
            },
            Self::From(start) => Plan::Walk {
                starts: vec![repo.resolve(start)?],
                hide: Vec::new(),
            },
            Self::Until(end) => Plan::Walk {
                starts: vec![repo.head()?],
                hide: vec![repo.resolve(end)?],
            },
            Self::Between(start, end) => Plan::Walk {
                starts: vec![repo.resolve(start)?],
                hide: vec![repo.resolve(end)?],
            },
            Self::Branches => Plan::Walk {
                starts: repo.branch_commits()?.into_iter().collect(),
                hide: Vec::new(),
            },
            Self::Tags => Plan::Walk {
                starts: repo.tag_commits()?.into_iter().collect(),
                hide: Vec::new(),
            },
            Self::Commits(revs) => Plan::Exact(
                revs.iter()
                    .map(|rev| repo.resolve(rev))
                    .collect::<Result<_, _>>()?,
            ),
        };
        Ok(plan)
    }
}

/// Walks repositories and applies filters to their commits
#[derive(Debug)]
pub struct CommitFinder {
    repos: Vec<GitRepo>,
    paths: Option<PathFilter>,
    filter: Option<Box<dyn CommitFilter>>,
    order: WalkOrder,
}

impl CommitFinder {
    /// Finder over `repos`, walked in the order given
    ///
    /// # Errors
    ///
    /// Returns `SieveError::InvalidArgument` if `repos` is empty.
    pub fn new(repos: Vec<GitRepo>) -> Result<Self, SieveError> {
        if repos.is_empty() {
            return Err(SieveError::invalid("commit finder requires at least one repository"));
        }
        Ok(Self {
            repos,
            paths: None,
            filter: None,
            order: WalkOrder::default(),
        })
    }

    /// Skip commits that change nothing under `paths` and hide changes
    /// outside them from diff-aware filters
    #[must_use]
    pub fn with_paths(mut self, paths: PathFilter) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Evaluate `filter` before the matcher; commits it excludes never reach
    /// the matcher
    #[must_use]
    pub fn with_filter(mut self, filter: impl CommitFilter + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Walk in `order`
    #[must_use]
    pub fn with_order(mut self, order: WalkOrder) -> Self {
        self.order = order;
        self
    }

    /// Replace or clear the path restriction
    pub fn set_paths(&mut self, paths: Option<PathFilter>) -> &mut Self {
        self.paths = paths;
        self
    }

    /// Replace or clear the revision filter
    pub fn set_filter(&mut self, filter: Option<Box<dyn CommitFilter>>) -> &mut Self {
        self.filter = filter;
        self
    }

    /// Change the walk order
    pub fn set_order(&mut self, order: WalkOrder) -> &mut Self {
        self.order = order;
        self
    }

    /// The repositories, in walk order
    #[must_use]
    pub fn repositories(&self) -> &[GitRepo] {
        &self.repos
    }

    /// The revision filter, if any
    #[must_use]
    pub fn filter(&self) -> Option<&dyn CommitFilter> {
        self.filter.as_deref()
    }

    /// Walk the history of HEAD
    ///
    /// # Errors
    ///
    /// Returns the first resolution, repository or filter error; nothing is
    /// reported for repositories after it.
    pub fn find(&mut self, matcher: &mut dyn CommitFilter) -> Result<FindSummary, SieveError> {
        self.run(Selection::Head, matcher)
    }

    /// Walk the history of `start`
    ///
    /// # Errors
    ///
    /// See [`CommitFinder::find`].
    pub fn find_from(&mut self, start: &str, matcher: &mut dyn CommitFilter) -> Result<FindSummary, SieveError> {
        self.run(Selection::From(start), matcher)
    }

    /// Walk the history of HEAD, stopping before `end` and its ancestors
    ///
    /// # Errors
    ///
    /// See [`CommitFinder::find`].
    pub fn find_until(&mut self, end: &str, matcher: &mut dyn CommitFilter) -> Result<FindSummary, SieveError> {
        self.run(Selection::Until(end), matcher)
    }

    /// Walk commits reachable from `start` but not from `end`
    ///
    /// # Errors
    ///
    /// See [`CommitFinder::find`].
    pub fn find_between(
        &mut self,
        start: &str,
        end: &str,
        matcher: &mut dyn CommitFilter,
    ) -> Result<FindSummary, SieveError> {
        self.run(Selection::Between(start, end), matcher)
    }

    /// Walk the history of every branch
    ///
    /// # Errors
    ///
    /// See [`CommitFinder::find`].
    pub fn find_in_branches(&mut self, matcher: &mut dyn CommitFilter) -> Result<FindSummary, SieveError> {
        self.run(Selection::Branches, matcher)
    }

    /// Walk the history of every tagged commit
    ///
    /// # Errors
    ///
    /// See [`CommitFinder::find`].
    pub fn find_in_tags(&mut self, matcher: &mut dyn CommitFilter) -> Result<FindSummary, SieveError> {
        self.run(Selection::Tags, matcher)
    }

    /// Evaluate exactly the named commits, in the order given, without
    /// walking their ancestors
    ///
    /// # Errors
    ///
    /// See [`CommitFinder::find`].
    pub fn find_in_commits(
        &mut self,
        revs: &[&str],
        matcher: &mut dyn CommitFilter,
    ) -> Result<FindSummary, SieveError> {
        self.run(Selection::Commits(revs), matcher)
    }

    fn run(
        &mut self,
        selection: Selection<'_>,
        matcher: &mut dyn CommitFilter,
    ) -> Result<FindSummary, SieveError> {
        let mut summary = FindSummary::default();
        for repo in &self.repos {
            let path = repo.path().display().to_string();
            info!(repository = %path, ?selection, order = ?self.order, "Starting walk");

            if let Some(filter) = self.filter.as_mut() {
                filter.bind(repo.repository())?;
            }
            matcher.bind(repo.repository())?;

            let plan = selection.plan(repo)?;
            let mut walk = WalkContext::new(repo.repository()).with_paths(self.paths.as_ref());
            let mut visitor = Visitor {
                walk: &mut walk,
                paths: self.paths.as_ref(),
                filter: self.filter.as_deref_mut(),
                matcher: &mut *matcher,
                summary: &mut summary,
            };

            let outcome = match plan {
                Plan::Walk { starts, hide } => {
                    let mut outcome = Ok(());
                    for id in repo.walk(&starts, &hide, self.order)? {
                        outcome = visitor.visit(repo, id?);
                        if outcome.is_err() {
                            break;
                        }
                    }
                    outcome
                }
                Plan::Exact(ids) => ids
                    .into_iter()
                    .try_for_each(|id| visitor.visit(repo, id)),
            };

            summary.repositories += 1;
            match outcome {
                Ok(()) => {}
                Err(Interrupt::Stop) => {
                    debug!(repository = %path, "Walk stopped by filter");
                    summary.stopped += 1;
                }
                Err(Interrupt::Error(err)) => return Err(err),
            }
        }

        info!(
            repositories = summary.repositories,
            visited = summary.visited,
            matched = summary.matched,
            stopped = summary.stopped,
            "Walk complete"
        );
        Ok(summary)
    }
}

/// Borrowed state of one repository's walk
struct Visitor<'a, 'r> {
    walk: &'a mut WalkContext<'r>,
    paths: Option<&'a PathFilter>,
    filter: Option<&'a mut (dyn CommitFilter + 'static)>,
    matcher: &'a mut dyn CommitFilter,
    summary: &'a mut FindSummary,
}

impl Visitor<'_, '_> {
    fn visit(&mut self, repo: &GitRepo, id: Oid) -> Result<(), Interrupt> {
        let commit = repo.parse_commit(id)?;
        if self.paths.is_some() && self.walk.changes(&commit, None)?.is_empty() {
            return Ok(());
        }
        self.summary.visited += 1;

        if let Some(filter) = self.filter.as_deref_mut()
            && !filter.include(self.walk, &commit)?
        {
            return Ok(());
        }
        if self.matcher.include(self.walk, &commit)? {
            self.summary.matched += 1;
        }
        Ok(())
    }
}

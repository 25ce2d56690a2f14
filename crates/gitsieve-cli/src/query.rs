// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Turning a [`Config`] into a walk and a report
//!
//! Selection flags become one revision filter, a conjunction evaluated
//! before the query's matcher. `--max-count` is the last conjunct so it only
//! counts commits every other selector accepted.

use std::collections::BTreeSet;
use std::fmt;

use gitsieve::filter::{
    AndFilter, CommitCountFilter, CommitImpact, CommitImpactFilter, DateFilter,
    DiffFileCountFilter, DiffLineCountFilter, DuplicateBlobFilter, DuplicateContainer, LimitFilter,
    LineStats, LineStatsFilter, MessageFilter, ParentCountFilter, PersonFilter, PersonSetFilter,
    Role,
};
use gitsieve::{
    CommitFilter, CommitFilterExt, CommitFinder, FindSummary, GitRepo, Identity, PathFilter,
    RenameDetector, SieveError, WalkOrder,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Command, Config, ConfigError};

/// Errors raised while running a query
#[derive(Debug, Error)]
pub enum QueryError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Repository or filter failure
    #[error(transparent)]
    Sieve(#[from] SieveError),
}

/// Result of a query
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "query", rename_all = "lowercase")]
pub enum Report {
    /// Number of selected commits
    Count {
        /// Selected commits
        commits: usize,
        /// Walk counters
        summary: FindSummary,
    },
    /// Most impactful commits, best first
    Impact {
        /// Kept records
        impacts: Vec<CommitImpact>,
        /// Walk counters
        summary: FindSummary,
    },
    /// Commits with duplicate content
    Duplicates {
        /// One entry per commit
        commits: Vec<DuplicateContainer>,
        /// Walk counters
        summary: FindSummary,
    },
    /// Distinct people
    Authors {
        /// Sorted by name then email
        people: BTreeSet<Identity>,
        /// Walk counters
        summary: FindSummary,
    },
    /// Line totals
    Lines {
        /// Totals over the selected commits
        stats: LineStats,
        /// Walk counters
        summary: FindSummary,
    },
}

impl Report {
    /// Counters of the walk that produced the report
    #[must_use]
    pub fn summary(&self) -> &FindSummary {
        match self {
            Self::Count { summary, .. }
            | Self::Impact { summary, .. }
            | Self::Duplicates { summary, .. }
            | Self::Authors { summary, .. }
            | Self::Lines { summary, .. } => summary,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count { commits, .. } => writeln!(f, "{commits}"),
            Self::Impact { impacts, .. } => {
                for impact in impacts {
                    writeln!(
                        f,
                        "{} +{} ~{} -{} {} <{}>",
                        impact.short_id(),
                        impact.added,
                        impact.edited,
                        impact.deleted,
                        impact.author.name,
                        impact.author.email
                    )?;
                }
                Ok(())
            }
            Self::Duplicates { commits, .. } => {
                for container in commits {
                    writeln!(f, "{}", container.commit)?;
                    for (blob, paths) in &container.duplicates {
                        let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
                        writeln!(f, "  {blob} {}", paths.join(", "))?;
                    }
                }
                Ok(())
            }
            Self::Authors { people, .. } => {
                for person in people {
                    writeln!(f, "{} <{}>", person.name, person.email)?;
                }
                Ok(())
            }
            Self::Lines { stats, .. } => writeln!(
                f,
                "added {} edited {} deleted {}",
                stats.added, stats.edited, stats.deleted
            ),
        }
    }
}

/// Run the configured query
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a repository cannot be
/// opened or a revision cannot be resolved, or the walk fails.
pub fn run(config: &Config) -> Result<Report, QueryError> {
    let repos = config
        .repo_paths()
        .iter()
        .map(GitRepo::discover)
        .collect::<Result<Vec<_>, _>>()?;
    let mut finder = CommitFinder::new(repos)?;
    if !config.paths.is_empty() {
        finder.set_paths(Some(PathFilter::new(&config.paths)?));
    }
    if config.reverse {
        finder.set_order(WalkOrder::OldestFirst);
    }
    let selection = selection(config)?;
    if !selection.is_empty() {
        debug!(selectors = selection.len(), "Selecting commits");
        finder.set_filter(Some(selection.boxed()));
    }

    let renames = config.renames.then(RenameDetector::new);
    let query = config.query();
    info!(?query, "Running query");

    let report = match query {
        Command::Count => {
            let mut count = CommitCountFilter::new();
            let summary = walk(&mut finder, config, &mut count)?;
            Report::Count {
                commits: count.count(),
                summary,
            }
        }
        Command::Impact { top } => {
            let mut impact = with_renames(
                CommitImpactFilter::new(top),
                renames,
                CommitImpactFilter::with_renames,
            );
            let summary = walk(&mut finder, config, &mut impact)?;
            Report::Impact {
                impacts: impact.impacts().to_vec(),
                summary,
            }
        }
        Command::Duplicates => {
            let mut duplicates = with_renames(
                DuplicateBlobFilter::new(),
                renames,
                DuplicateBlobFilter::with_renames,
            );
            let summary = walk(&mut finder, config, &mut duplicates)?;
            Report::Duplicates {
                commits: duplicates.containers().to_vec(),
                summary,
            }
        }
        Command::Authors { committers } => {
            let role = if committers { Role::Committer } else { Role::Author };
            let mut people = PersonSetFilter::new(role);
            let summary = walk(&mut finder, config, &mut people)?;
            Report::Authors {
                people: people.people().clone(),
                summary,
            }
        }
        Command::Lines => {
            let mut lines =
                with_renames(LineStatsFilter::new(), renames, LineStatsFilter::with_renames);
            let summary = walk(&mut finder, config, &mut lines)?;
            Report::Lines {
                stats: lines.stats(),
                summary,
            }
        }
    };
    Ok(report)
}

/// Attach rename detection to a diff-aware filter when enabled
fn with_renames<F>(
    filter: F,
    renames: Option<RenameDetector>,
    attach: fn(F, RenameDetector) -> F,
) -> F {
    match renames {
        Some(detector) => attach(filter, detector),
        None => filter,
    }
}

/// Build the revision filter from the selection flags
fn selection(config: &Config) -> Result<AndFilter, QueryError> {
    let renames = config.renames.then(RenameDetector::new);
    let mut filters: Vec<Box<dyn CommitFilter>> = Vec::new();

    if let Some(author) = config.author.as_deref() {
        let filter = if author.contains('@') {
            PersonFilter::author(None, Some(author))?
        } else {
            PersonFilter::author(Some(author), None)?
        };
        filters.push(filter.boxed());
    }
    if let Some(pattern) = config.grep.as_deref() {
        filters.push(MessageFilter::new(pattern)?.boxed());
    }
    let (since, before) = (config.since_date()?, config.before_date()?);
    if since.is_some() || before.is_some() {
        filters.push(DateFilter::new(Role::Author, since, before)?.boxed());
    }
    if config.merges {
        filters.push(ParentCountFilter::merges().boxed());
    } else if config.no_merges {
        filters.push(ParentCountFilter::non_merges().boxed());
    }
    if let Some(min) = config.min_files {
        let filter = with_renames(
            DiffFileCountFilter::new(min),
            renames.clone(),
            DiffFileCountFilter::with_renames,
        );
        filters.push(filter.boxed());
    }
    if let Some(min) = config.min_lines {
        let filter = with_renames(
            DiffLineCountFilter::new(min),
            renames,
            DiffLineCountFilter::with_renames,
        );
        filters.push(filter.boxed());
    }
    if let Some(max) = config.max_count {
        filters.push(LimitFilter::new(max).stopping().boxed());
    }
    Ok(AndFilter::from_filters(filters))
}

/// Walk with the range the revision flags describe
fn walk(
    finder: &mut CommitFinder,
    config: &Config,
    matcher: &mut dyn CommitFilter,
) -> Result<FindSummary, SieveError> {
    match (config.from.as_deref(), config.until.as_deref()) {
        (Some(from), Some(until)) => finder.find_between(from, until, matcher),
        (Some(from), None) => finder.find_from(from, matcher),
        (None, Some(until)) => finder.find_until(until, matcher),
        (None, None) => finder.find(matcher),
    }
}

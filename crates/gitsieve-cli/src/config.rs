// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the gitsieve command line
//!
//! Selection flags are global so they may appear before or after the
//! subcommand. Everything is validated by [`Config::validate`] before any
//! repository is opened.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

/// gitsieve - query commit history with composable filters
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "gitsieve")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Query to run (defaults to `count`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Repositories to walk, in order
    ///
    /// May be repeated or given as a comma-separated list. Defaults to the
    /// repository containing the current directory.
    #[arg(
        short,
        long = "repo",
        env = "GITSIEVE_REPOS",
        value_delimiter = ',',
        global = true
    )]
    pub repos: Vec<PathBuf>,

    /// Only consider commits touching these paths
    #[arg(long = "path", global = true)]
    pub paths: Vec<String>,

    /// Start walking from this revision instead of HEAD
    #[arg(long, global = true)]
    pub from: Option<String>,

    /// Stop before this revision and its ancestors
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Author name, or email when it contains `@`
    #[arg(long, global = true)]
    pub author: Option<String>,

    /// Regular expression matched against commit messages
    #[arg(long, global = true)]
    pub grep: Option<String>,

    /// Only commits authored at or after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Only commits authored at or before this date (YYYY-MM-DD or RFC 3339)
    #[arg(long, global = true)]
    pub before: Option<String>,

    /// Only merge commits
    #[arg(long, default_value = "false", conflicts_with = "no_merges", global = true)]
    pub merges: bool,

    /// Skip merge commits
    #[arg(long, default_value = "false", global = true)]
    pub no_merges: bool,

    /// Only commits changing at least this many lines
    #[arg(long, global = true)]
    pub min_lines: Option<usize>,

    /// Only commits changing at least this many files
    #[arg(long, global = true)]
    pub min_files: Option<usize>,

    /// Stop after this many selected commits
    #[arg(short = 'n', long, global = true)]
    pub max_count: Option<usize>,

    /// Detect renames before looking at changes
    #[arg(long, default_value = "false", global = true)]
    pub renames: bool,

    /// Walk oldest commits first
    #[arg(long, default_value = "false", global = true)]
    pub reverse: bool,

    /// Print the report as JSON
    #[arg(long, default_value = "false", global = true)]
    pub json: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so reports on stdout stay parseable.
    #[arg(short, long, default_value = "false", global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false", global = true)]
    pub quiet: bool,
}

/// Available queries
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Count the selected commits
    Count,

    /// List the commits with the most edit regions
    Impact {
        /// Number of commits to keep
        #[arg(short = 'k', long, default_value_t = 10)]
        top: usize,
    },

    /// Find commits writing identical content to several paths
    Duplicates,

    /// List the distinct people behind the selected commits
    Authors {
        /// Collect committers instead of authors
        #[arg(long, default_value = "false")]
        committers: bool,
    },

    /// Total the lines added, edited and deleted
    Lines,
}

impl Config {
    /// The query to run
    #[must_use]
    pub fn query(&self) -> Command {
        self.command.clone().unwrap_or(Command::Count)
    }

    /// Repositories to walk, the current directory when none were given
    #[must_use]
    pub fn repo_paths(&self) -> Vec<PathBuf> {
        if self.repos.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.repos.clone()
        }
    }

    /// Parsed `--since` bound
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDate` if the value is not a date.
    pub fn since_date(&self) -> Result<Option<DateTime<Utc>>, ConfigError> {
        self.since.as_deref().map(parse_date).transpose()
    }

    /// Parsed `--before` bound
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDate` if the value is not a date.
    pub fn before_date(&self) -> Result<Option<DateTime<Utc>>, ConfigError> {
        self.before.as_deref().map(parse_date).transpose()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A repository path does not exist
    /// - A `--path` value is empty
    /// - A date does not parse or `--since` is after `--before`
    /// - `--grep` or `--author` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        for repo in &self.repos {
            if !repo.exists() {
                return Err(ConfigError::RepositoryNotFound(repo.clone()));
            }
        }

        if let Some(path) = self.paths.iter().find(|p| p.trim_matches('/').is_empty()) {
            return Err(ConfigError::EmptyValue {
                flag: "--path",
                value: path.clone(),
            });
        }
        for (flag, value) in [("--grep", &self.grep), ("--author", &self.author)] {
            if let Some(value) = value
                && value.is_empty()
            {
                return Err(ConfigError::EmptyValue {
                    flag,
                    value: value.clone(),
                });
            }
        }

        if let (Some(since), Some(before)) = (self.since_date()?, self.before_date()?)
            && since > before
        {
            return Err(ConfigError::InvalidDateRange { since, before });
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp
fn parse_date(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| ConfigError::InvalidDate(value.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Repository path not found
    #[error("Repository path not found: {0}")]
    RepositoryNotFound(PathBuf),

    /// A flag was given an empty value
    #[error("{flag} must not be empty (got '{value}')")]
    EmptyValue {
        /// The offending flag
        flag: &'static str,
        /// The value it was given
        value: String,
    },

    /// A date flag did not parse
    #[error("Invalid date '{0}': expected YYYY-MM-DD or RFC 3339")]
    InvalidDate(String),

    /// `--since` lies after `--before`
    #[error("--since {since} is after --before {before}")]
    InvalidDateRange {
        /// Lower bound
        since: DateTime<Utc>,
        /// Upper bound
        before: DateTime<Utc>,
    },
}

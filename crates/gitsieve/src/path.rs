// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Path restrictions for history walks
//!
//! A [`PathFilter`] limits both which commits a walk considers (commits that
//! change nothing under the paths are skipped) and which entries diff-aware
//! filters see.

use crate::error::SieveError;

/// A set of repository-relative paths, each matching itself and everything
/// below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    paths: Vec<String>,
}

impl PathFilter {
    /// Build a filter from one or more paths
    ///
    /// Leading `./` and surrounding slashes are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SieveError::InvalidArgument` if no paths are given or a path
    /// is empty.
    pub fn new<I, S>(paths: I) -> Result<Self, SieveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Vec::new();
        for path in paths {
            let raw = path.as_ref();
            let trimmed = raw.trim_start_matches("./").trim_matches('/');
            if trimmed.is_empty() {
                return Err(SieveError::invalid(format!(
                    "path filter entry '{raw}' is empty"
                )));
            }
            normalized.push(trimmed.to_string());
        }
        if normalized.is_empty() {
            return Err(SieveError::invalid("path filter requires at least one path"));
        }
        normalized.sort();
        normalized.dedup();
        Ok(Self { paths: normalized })
    }

    /// The configured paths, sorted
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Whether a file path is one of the paths or lies below one
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.paths.iter().any(|p| is_within(path, p))
    }

    /// Whether a directory may hold matching paths: it lies below a
    /// configured path or a configured path lies below it
    #[must_use]
    pub fn may_contain(&self, dir: &str) -> bool {
        self.paths
            .iter()
            .any(|p| is_within(dir, p) || is_within(p, dir))
    }
}

/// `path` equals `base` or starts with `base/`
fn is_within(path: &str, base: &str) -> bool {
    path.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

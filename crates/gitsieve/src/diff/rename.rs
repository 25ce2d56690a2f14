// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Rename and copy detection over a changeset
//!
//! Pairs deletions with additions, first by identical blob id, then by line
//! similarity. Copies are additions matching the old content of a modified
//! or renamed path.

use std::collections::HashMap;

use git2::{Oid, Repository};
use similar::TextDiff;
use tracing::debug;

use super::blob::{blob_content, looks_binary};
use super::{ChangeEntry, ChangeKind, mode};
use crate::error::SieveError;

/// Default minimum similarity for an inexact rename, in percent
pub const DEFAULT_SCORE: u8 = 60;

/// Default cap on sources and destinations considered for inexact pairing
pub const DEFAULT_LIMIT: usize = 400;

/// Similarity-based rename and copy detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDetector {
    score: u8,
    limit: usize,
    copies: bool,
}

impl Default for RenameDetector {
    fn default() -> Self {
        Self {
            score: DEFAULT_SCORE,
            limit: DEFAULT_LIMIT,
            copies: false,
        }
    }
}

impl RenameDetector {
    /// Detector with default score and limit, renames only
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum similarity percentage for inexact matches
    ///
    /// # Errors
    ///
    /// Returns `SieveError::InvalidArgument` if `score` exceeds 100.
    pub fn with_score(mut self, score: u8) -> Result<Self, SieveError> {
        if score > 100 {
            return Err(SieveError::invalid(format!(
                "rename score must be between 0 and 100, got {score}"
            )));
        }
        self.score = score;
        Ok(self)
    }

    /// Set the pair limit; zero disables inexact matching
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Enable or disable copy detection
    #[must_use]
    pub fn with_copies(mut self, copies: bool) -> Self {
        self.copies = copies;
        self
    }

    /// Minimum similarity percentage
    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    /// Pair limit
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether copies are detected
    #[must_use]
    pub fn copies(&self) -> bool {
        self.copies
    }

    /// This detector adjusted by `diff.renameLimit` and `diff.renames` from
    /// the repository configuration
    ///
    /// Unset keys keep this detector's values; `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns a git2 error if the configuration cannot be opened.
    pub fn configured(&self, repo: &Repository) -> Result<Self, SieveError> {
        let config = repo.config()?;
        let mut detector = self.clone();
        if let Ok(limit) = config.get_i64("diff.renameLimit") {
            detector.limit = usize::try_from(limit).unwrap_or(0);
        }
        if let Ok(renames) = config.get_string("diff.renames") {
            let renames = renames.to_ascii_lowercase();
            detector.copies = renames == "copies" || renames == "copy";
        }
        debug!(
            limit = detector.limit,
            copies = detector.copies,
            "rename detection configured from repository"
        );
        Ok(detector)
    }

    /// Rewrite matching additions and deletions into renames and copies
    ///
    /// # Errors
    ///
    /// Returns a git2 error if blob content cannot be read.
    pub fn detect(
        &self,
        repo: &Repository,
        changes: Vec<ChangeEntry>,
    ) -> Result<Vec<ChangeEntry>, SieveError> {
        let mut adds = Vec::new();
        let mut deletes = Vec::new();
        let mut others = Vec::new();
        for change in changes {
            match change.kind {
                ChangeKind::Add if mode::is_blob(change.new_mode) => adds.push(Some(change)),
                ChangeKind::Delete if mode::is_blob(change.old_mode) => deletes.push(Some(change)),
                _ => others.push(change),
            }
        }
        if adds.is_empty() {
            return Ok(merge_sorted(others, deletes, adds));
        }

        let mut result = Vec::new();
        let mut sources: Vec<ChangeEntry> = Vec::new();

        // Exact content matches
        let mut by_id: HashMap<Oid, Vec<usize>> = HashMap::new();
        for (index, delete) in deletes.iter().enumerate() {
            if let Some(delete) = delete {
                by_id.entry(delete.old_id).or_default().push(index);
            }
        }
        for add in &mut adds {
            let Some(candidate) = add.as_ref() else {
                continue;
            };
            let found = by_id.get_mut(&candidate.new_id).and_then(|indices| {
                let position = indices.iter().position(|&i| {
                    deletes[i].as_ref().is_some_and(|d| {
                        mode::file_type(d.old_mode) == mode::file_type(candidate.new_mode)
                    })
                })?;
                Some(indices.remove(position))
            });
            let Some(index) = found else {
                continue;
            };
            if let (Some(destination), Some(source)) = (add.take(), deletes[index].take()) {
                result.push(ChangeEntry::paired(ChangeKind::Rename, &source, &destination, 100));
                sources.push(source);
            }
        }

        // Similar content
        let remaining_adds = adds.iter().flatten().count();
        let remaining_deletes = deletes.iter().flatten().count();
        if remaining_adds > 0 && remaining_deletes > 0 {
            if remaining_adds.saturating_mul(remaining_deletes)
                > self.limit.saturating_mul(self.limit)
            {
                debug!(
                    adds = remaining_adds,
                    deletes = remaining_deletes,
                    limit = self.limit,
                    "skipping inexact rename detection"
                );
            } else {
                let pairs = self.best_pairs(repo, &deletes, &adds)?;
                for (score, delete_index, add_index) in pairs {
                    if deletes[delete_index].is_none() || adds[add_index].is_none() {
                        // One side was already paired with a better match
                        continue;
                    }
                    if let (Some(source), Some(destination)) =
                        (deletes[delete_index].take(), adds[add_index].take())
                    {
                        result.push(ChangeEntry::paired(
                            ChangeKind::Rename,
                            &source,
                            &destination,
                            score,
                        ));
                        sources.push(source);
                    }
                }
            }
        }

        if self.copies {
            sources.extend(
                others
                    .iter()
                    .filter(|c| c.kind == ChangeKind::Modify && mode::is_blob(c.old_mode))
                    .cloned(),
            );
            self.detect_copies(repo, &sources, &mut adds, &mut result)?;
        }

        debug!(paired = result.len(), "rename detection finished");
        result.extend(others);
        Ok(merge_sorted(result, deletes, adds))
    }

    /// Candidate (score, delete, add) triples at or above the threshold,
    /// best first
    fn best_pairs(
        &self,
        repo: &Repository,
        deletes: &[Option<ChangeEntry>],
        adds: &[Option<ChangeEntry>],
    ) -> Result<Vec<(u8, usize, usize)>, SieveError> {
        let mut old_contents = HashMap::new();
        for (index, delete) in deletes.iter().enumerate() {
            if let Some(delete) = delete {
                old_contents.insert(index, blob_content(repo, delete.old_id)?);
            }
        }

        let mut pairs = Vec::new();
        for (add_index, add) in adds.iter().enumerate() {
            let Some(add) = add else {
                continue;
            };
            let new_content = blob_content(repo, add.new_id)?;
            for (&delete_index, old_content) in &old_contents {
                let score = similarity(old_content, &new_content);
                if score >= self.score {
                    pairs.push((score, delete_index, add_index));
                }
            }
        }
        // Highest score first, then stable by position
        pairs.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
        Ok(pairs)
    }

    fn detect_copies(
        &self,
        repo: &Repository,
        sources: &[ChangeEntry],
        adds: &mut [Option<ChangeEntry>],
        result: &mut Vec<ChangeEntry>,
    ) -> Result<(), SieveError> {
        if sources.is_empty() {
            return Ok(());
        }
        let mut source_contents = Vec::with_capacity(sources.len());
        for source in sources {
            source_contents.push(blob_content(repo, source.old_id)?);
        }
        for add in adds.iter_mut() {
            let Some(destination) = add.as_ref() else {
                continue;
            };
            if let Some(source) = sources.iter().find(|s| s.old_id == destination.new_id) {
                result.push(ChangeEntry::paired(ChangeKind::Copy, source, destination, 100));
                *add = None;
                continue;
            }
            let new_content = blob_content(repo, destination.new_id)?;
            let best = source_contents
                .iter()
                .enumerate()
                .map(|(index, content)| (similarity(content, &new_content), index))
                .filter(|(score, _)| *score >= self.score)
                .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
            if let Some((score, index)) = best {
                result.push(ChangeEntry::paired(ChangeKind::Copy, &sources[index], destination, score));
                *add = None;
            }
        }
        Ok(())
    }
}

/// Line similarity of two blobs in percent; binary content scores 0
#[must_use]
pub fn similarity(old: &[u8], new: &[u8]) -> u8 {
    if old == new {
        return 100;
    }
    if looks_binary(old) || looks_binary(new) {
        return 0;
    }
    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    let ratio = TextDiff::from_lines(old.as_ref(), new.as_ref()).ratio();
    (ratio * 100.0).floor().clamp(0.0, 100.0) as u8
}

/// Concatenate the entries that survived pairing and sort them by path
fn merge_sorted(
    mut entries: Vec<ChangeEntry>,
    deletes: Vec<Option<ChangeEntry>>,
    adds: Vec<Option<ChangeEntry>>,
) -> Vec<ChangeEntry> {
    entries.extend(deletes.into_iter().flatten());
    entries.extend(adds.into_iter().flatten());
    entries.sort_by(|a, b| a.path().cmp(b.path()));
    entries
}

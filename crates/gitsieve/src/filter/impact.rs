// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The K most impactful commits of a walk
//!
//! Impact is the number of edit regions a commit introduces. Records are kept
//! in a [`BTreeSet`] ordered from most to least impactful, so insertion and
//! eviction of the weakest record are both logarithmic in K.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use git2::{Oid, Repository};
use serde::{Deserialize, Serialize};

use super::{BoundRenames, CommitFilter, WalkContext, bind_renames};
use crate::commit::Person;
use crate::diff::{EditKind, RenameDetector};
use crate::error::{FilterResult, SieveError};

mod oid_hex {
    use git2::Oid;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(id: &Oid, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Oid, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Oid::from_str(&hex).map_err(de::Error::custom)
    }
}

/// Edit counts of one commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitImpact {
    /// The commit
    #[serde(with = "oid_hex")]
    pub id: Oid,
    /// Insert regions
    pub added: usize,
    /// Replace regions
    pub edited: usize,
    /// Delete regions
    pub deleted: usize,
    /// Who wrote it
    pub author: Person,
}

impl CommitImpact {
    /// All edit regions
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.edited + self.deleted
    }

    /// Abbreviated commit id for reports
    #[must_use]
    pub fn short_id(&self) -> String {
        let mut id = self.id.to_string();
        id.truncate(7);
        id
    }
}

/// Larger totals first; equal totals by raw commit id, ascending
impl Ord for CommitImpact {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .total()
            .cmp(&self.total())
            .then_with(|| self.id.as_bytes().cmp(other.id.as_bytes()))
    }
}

impl PartialOrd for CommitImpact {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CommitImpact {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CommitImpact {}

/// At most K impact records, best first
#[derive(Debug, Clone, Default)]
pub struct TopImpacts {
    max: usize,
    set: BTreeSet<CommitImpact>,
}

impl TopImpacts {
    /// Keep the `max` best records; zero keeps nothing
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            max,
            set: BTreeSet::new(),
        }
    }

    /// Capacity
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Insert a record, evicting the weakest when over capacity
    ///
    /// Returns whether `impact` is retained.
    pub fn insert(&mut self, impact: CommitImpact) -> bool {
        if self.max == 0 {
            return false;
        }
        let id = impact.id;
        self.set.insert(impact);
        if self.set.len() > self.max
            && let Some(evicted) = self.set.pop_last()
        {
            return evicted.id != id;
        }
        true
    }

    /// Records from most to least impactful
    pub fn iter(&self) -> impl Iterator<Item = &CommitImpact> {
        self.set.iter()
    }

    /// Number of records held
    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Whether no record is held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.set.clear();
    }

    /// Records from most to least impactful
    #[must_use]
    pub fn to_vec(&self) -> Vec<CommitImpact> {
        self.set.iter().cloned().collect()
    }
}

/// Tracks the K commits with the most edit regions; includes every commit
#[derive(Debug, Clone)]
pub struct CommitImpactFilter {
    top: TopImpacts,
    renames: Option<BoundRenames>,
}

impl CommitImpactFilter {
    /// Track the `max` most impactful commits
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            top: TopImpacts::new(max),
            renames: None,
        }
    }

    /// Detect renames first so moved files count only their edits
    #[must_use]
    pub fn with_renames(mut self, detector: RenameDetector) -> Self {
        self.renames = Some(BoundRenames::new(detector));
        self
    }

    /// The records kept so far
    #[must_use]
    pub fn impacts(&self) -> &TopImpacts {
        &self.top
    }
}

impl CommitFilter for CommitImpactFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        if self.top.max() == 0 {
            return Ok(true);
        }
        let changes = walk.changes(commit, self.renames.as_ref().map(BoundRenames::detector))?;
        let mut impact = CommitImpact {
            id: commit.id(),
            added: 0,
            edited: 0,
            deleted: 0,
            author: Person::from_signature(&commit.author()),
        };
        for change in changes.iter() {
            for edit in walk.edits(change)? {
                match edit.kind {
                    EditKind::Insert => impact.added += 1,
                    EditKind::Replace => impact.edited += 1,
                    EditKind::Delete => impact.deleted += 1,
                }
            }
        }
        self.top.insert(impact);
        Ok(true)
    }

    fn reset(&mut self) {
        self.top.clear();
        if let Some(renames) = self.renames.as_mut() {
            renames.reset();
        }
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        bind_renames(self.renames.as_mut(), repo)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self {
            top: TopImpacts::new(self.top.max()),
            renames: self.renames.clone(),
        })
    }
}

#[cfg(test)]
fn impact(byte: u8, added: usize, edited: usize, deleted: usize) -> CommitImpact {
    use chrono::DateTime;

    CommitImpact {
        id: Oid::from_bytes(&[byte; 20]).expect("20 bytes"),
        added,
        edited,
        deleted,
        author: Person {
            name: "Test Author".to_string(),
            email: "author@example.com".to_string(),
            when: DateTime::from_timestamp(0, 0).expect("epoch"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestRepo;
    use similar_asserts::assert_eq;

    fn ids(top: &TopImpacts) -> Vec<u8> {
        top.iter().map(|i| i.id.as_bytes()[0]).collect()
    }

    #[test]
    fn test_short_id() {
        assert_eq!(impact(0xab, 1, 0, 0).short_id(), "abababa");
    }

    #[test]
    fn test_order_by_total_then_id() {
        let mut all = vec![impact(3, 1, 0, 0), impact(1, 0, 0, 5), impact(2, 1, 0, 0)];
        all.sort();
        let order: Vec<u8> = all.iter().map(|i| i.id.as_bytes()[0]).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_keeps_best_k() {
        let mut top = TopImpacts::new(2);
        assert!(top.insert(impact(1, 1, 0, 0)));
        assert!(top.insert(impact(2, 5, 0, 0)));
        assert!(top.insert(impact(3, 3, 0, 0)));
        assert!(!top.insert(impact(4, 0, 0, 0)));
        assert_eq!(ids(&top), vec![2, 3]);
    }

    #[test]
    fn test_ties_at_boundary_use_commit_id() {
        let mut top = TopImpacts::new(1);
        top.insert(impact(9, 2, 0, 0));
        top.insert(impact(4, 0, 2, 0));
        assert_eq!(ids(&top), vec![4]);
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let mut top = TopImpacts::new(0);
        assert!(!top.insert(impact(1, 10, 0, 0)));
        assert!(top.is_empty());
    }

    #[test]
    fn test_filter_counts_edit_regions() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("a.txt", "1\n2\n3\n4\n5\n")]);
        let next = repo.commit(&[root], &[("a.txt", "one\n2\n4\n5\nsix\n")]);

        let mut filter = CommitImpactFilter::new(5);
        let mut walk = WalkContext::new(&repo.repo);
        for id in [next, root] {
            assert!(filter.include(&mut walk, &repo.find(id)).expect("verdict"));
        }

        let impacts = filter.impacts().to_vec();
        assert_eq!(impacts.len(), 2);
        let edited = impacts.iter().find(|i| i.id == next).expect("next");
        assert_eq!((edited.added, edited.edited, edited.deleted), (1, 1, 1));
        let created = impacts.iter().find(|i| i.id == root).expect("root");
        assert_eq!((created.added, created.edited, created.deleted), (1, 0, 0));
        assert_eq!(created.author.email, "author@example.com");

        filter.reset();
        assert!(filter.impacts().is_empty());
    }

    #[test]
    fn test_serializes_id_as_hex() {
        let json = serde_json::to_value(impact(0xab, 1, 2, 3)).expect("json");
        assert_eq!(json["id"], "ab".repeat(20));
        assert_eq!(json["edited"], 2);
    }
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit-to-changeset diffing
//!
//! Root commits, ordinary commits and merges go through the same walk: the
//! commit's tree and all parent trees are read one directory level at a time
//! and advanced in lock-step by entry name. A path is reported only when it
//! differs from every parent, so a merge lists what it changed relative to
//! all of its parents at once.

use git2::{ObjectType, Oid, Repository, Tree};

use super::{ChangeEntry, mode};
use crate::error::SieveError;
use crate::path::PathFilter;

/// One entry of one tree at the current level
#[derive(Debug, Clone)]
struct Node {
    name: String,
    is_tree: bool,
    mode: u32,
    id: Oid,
}

impl Node {
    fn key(&self) -> (&str, bool) {
        (self.name.as_str(), self.is_tree)
    }
}

/// Mode and id of a side, with absent paths as mode 0 and the zero id
fn side(node: Option<&Node>) -> (u32, Oid) {
    node.map_or((mode::MISSING, Oid::zero()), |n| (n.mode, n.id))
}

/// Computes the changes a commit introduces relative to its parents
pub struct TreeDiffer<'r> {
    repo: &'r Repository,
    paths: Option<&'r PathFilter>,
}

impl<'r> TreeDiffer<'r> {
    /// Differ reading objects from `repo`
    #[must_use]
    pub fn new(repo: &'r Repository) -> Self {
        Self { repo, paths: None }
    }

    /// Restrict descent and reported paths to `paths`
    #[must_use]
    pub fn with_paths(mut self, paths: Option<&'r PathFilter>) -> Self {
        self.paths = paths;
        self
    }

    /// Changes of `commit` against all of its parents
    ///
    /// # Errors
    ///
    /// Returns a git2 error if a tree or parent cannot be read.
    pub fn diff_commit(&self, commit: &git2::Commit<'_>) -> Result<Vec<ChangeEntry>, SieveError> {
        let current = commit.tree()?;
        let parents = commit
            .parents()
            .map(|parent| parent.tree())
            .collect::<Result<Vec<_>, _>>()?;
        self.diff_trees(&parents, &current)
    }

    /// Changes of `current` against every tree in `parents`
    ///
    /// With no parents every path is an addition.
    ///
    /// # Errors
    ///
    /// Returns a git2 error if a subtree cannot be read.
    pub fn diff_trees(
        &self,
        parents: &[Tree<'_>],
        current: &Tree<'_>,
    ) -> Result<Vec<ChangeEntry>, SieveError> {
        let parents: Vec<Option<&Tree<'_>>> = parents.iter().map(Some).collect();
        let mut changes = Vec::new();
        self.walk_level("", Some(current), &parents, &mut changes)?;
        Ok(changes)
    }

    fn walk_level(
        &self,
        prefix: &str,
        current: Option<&Tree<'_>>,
        parents: &[Option<&Tree<'_>>],
        changes: &mut Vec<ChangeEntry>,
    ) -> Result<(), SieveError> {
        let current_nodes = current.map(level_nodes).unwrap_or_default();
        let parent_nodes: Vec<Vec<Node>> = parents
            .iter()
            .map(|tree| tree.map(level_nodes).unwrap_or_default())
            .collect();

        let mut current_at = 0;
        let mut parent_at = vec![0usize; parent_nodes.len()];

        loop {
            // Smallest key among all cursors
            let mut next: Option<(&str, bool)> = current_nodes.get(current_at).map(Node::key);
            for (nodes, &at) in parent_nodes.iter().zip(&parent_at) {
                if let Some(node) = nodes.get(at) {
                    let key = node.key();
                    if next.is_none_or(|best| key < best) {
                        next = Some(key);
                    }
                }
            }
            let Some(key) = next else {
                break;
            };

            let cur = current_nodes.get(current_at).filter(|n| n.key() == key);
            if cur.is_some() {
                current_at += 1;
            }
            let mut theirs: Vec<Option<&Node>> = Vec::with_capacity(parent_nodes.len());
            for (nodes, at) in parent_nodes.iter().zip(parent_at.iter_mut()) {
                let node = nodes.get(*at).filter(|n| n.key() == key);
                if node.is_some() {
                    *at += 1;
                }
                theirs.push(node);
            }

            let (name, is_tree) = key;
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}/{name}")
            };

            // Identical to some parent: nothing under this key changed
            let mine = side(cur);
            if theirs.iter().any(|node| side(*node) == mine) {
                continue;
            }

            if is_tree {
                if self.paths.is_some_and(|paths| !paths.may_contain(&path)) {
                    continue;
                }
                let current_sub = cur.map(|node| self.repo.find_tree(node.id)).transpose()?;
                let parent_subs = theirs
                    .iter()
                    .map(|node| node.map(|n| self.repo.find_tree(n.id)).transpose())
                    .collect::<Result<Vec<_>, _>>()?;
                let parent_refs: Vec<Option<&Tree<'_>>> =
                    parent_subs.iter().map(Option::as_ref).collect();
                self.walk_level(&path, current_sub.as_ref(), &parent_refs, changes)?;
            } else {
                if self.paths.is_some_and(|paths| !paths.matches(&path)) {
                    continue;
                }
                changes.push(leaf_change(path, cur, &theirs));
            }
        }
        Ok(())
    }
}

/// Change entry for a leaf that differs from every parent
fn leaf_change(path: String, current: Option<&Node>, parents: &[Option<&Node>]) -> ChangeEntry {
    let parent_modes = parents
        .iter()
        .fold(mode::MISSING, |acc, node| acc | side(*node).0);
    let first_parent = parents.iter().flatten().next();

    match (current, first_parent) {
        (Some(cur), Some(old)) if parent_modes != mode::MISSING => {
            ChangeEntry::modified(path, (old.mode, old.id), (cur.mode, cur.id))
        }
        (Some(cur), _) => ChangeEntry::added(path, cur.mode, cur.id),
        (None, Some(old)) => ChangeEntry::deleted(path, old.mode, old.id),
        // A key only exists because some tree holds it, and a current-only
        // key never reaches here with no parents holding it either
        (None, None) => ChangeEntry::deleted(path, mode::MISSING, Oid::zero()),
    }
}

/// Entries of one tree sorted by (name, is_tree)
fn level_nodes(tree: &Tree<'_>) -> Vec<Node> {
    let mut nodes: Vec<Node> = tree
        .iter()
        .map(|entry| Node {
            name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
            is_tree: entry.kind() == Some(ObjectType::Tree),
            mode: u32::try_from(entry.filemode()).unwrap_or(mode::MISSING),
            id: entry.id(),
        })
        .collect();
    nodes.sort_by(|a, b| a.key().cmp(&b.key()));
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeKind;
    use crate::testutil::TestRepo;
    use similar_asserts::assert_eq;

    fn kinds(changes: &[ChangeEntry]) -> Vec<(ChangeKind, String)> {
        changes
            .iter()
            .map(|c| (c.kind, c.path().to_string()))
            .collect()
    }

    #[test]
    fn test_root_commit_is_all_additions() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("a.txt", "x\n"), ("src/lib.rs", "fn main() {}\n")]);

        let commit = repo.find(root);
        let changes = TreeDiffer::new(&repo.repo).diff_commit(&commit).expect("diff");
        assert_eq!(
            kinds(&changes),
            vec![
                (ChangeKind::Add, "a.txt".to_string()),
                (ChangeKind::Add, "src/lib.rs".to_string()),
            ]
        );
        assert!(changes.iter().all(|c| c.old_id.is_zero()));
    }

    #[test]
    fn test_single_parent_diff() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("a.txt", "x\n"), ("b.txt", "b\n"), ("dir/c.txt", "c\n")]);
        let next = repo.commit(&[root], &[("a.txt", "xy\n"), ("dir/c.txt", "c\n"), ("d.txt", "d\n")]);

        let commit = repo.find(next);
        let changes = TreeDiffer::new(&repo.repo).diff_commit(&commit).expect("diff");
        assert_eq!(
            kinds(&changes),
            vec![
                (ChangeKind::Modify, "a.txt".to_string()),
                (ChangeKind::Delete, "b.txt".to_string()),
                (ChangeKind::Add, "d.txt".to_string()),
            ]
        );
    }

    #[test]
    fn test_mode_change_is_modify() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("run.sh", "echo\n")]);
        let next = repo.commit_with_modes(&[root], &[("run.sh", "echo\n", mode::EXECUTABLE)]);

        let changes = TreeDiffer::new(&repo.repo)
            .diff_commit(&repo.find(next))
            .expect("diff");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Modify);
        assert_eq!(changes[0].old_id, changes[0].new_id);
        assert_eq!(changes[0].new_mode, mode::EXECUTABLE);
    }

    #[test]
    fn test_merge_suppresses_paths_same_as_one_parent() {
        let repo = TestRepo::new();
        let base = repo.commit(&[], &[("shared.txt", "base\n"), ("both.txt", "base\n")]);
        let left = repo.commit(&[base], &[("shared.txt", "left\n"), ("both.txt", "base\n")]);
        let right = repo.commit(&[base], &[("shared.txt", "base\n"), ("both.txt", "right\n")]);
        // shared.txt taken from left, both.txt resolved to new content
        let merge = repo.commit(&[left, right], &[("shared.txt", "left\n"), ("both.txt", "merged\n")]);

        let changes = TreeDiffer::new(&repo.repo)
            .diff_commit(&repo.find(merge))
            .expect("diff");
        assert_eq!(kinds(&changes), vec![(ChangeKind::Modify, "both.txt".to_string())]);
    }

    #[test]
    fn test_merge_add_and_delete() {
        let repo = TestRepo::new();
        let base = repo.commit(&[], &[("keep.txt", "k\n"), ("gone.txt", "g\n")]);
        let left = repo.commit(&[base], &[("keep.txt", "k\n"), ("gone.txt", "g\n")]);
        let right = repo.commit(&[base], &[("keep.txt", "k\n"), ("gone.txt", "g2\n")]);
        let merge = repo.commit(&[left, right], &[("keep.txt", "k\n"), ("new.txt", "n\n")]);

        let changes = TreeDiffer::new(&repo.repo)
            .diff_commit(&repo.find(merge))
            .expect("diff");
        assert_eq!(
            kinds(&changes),
            vec![
                (ChangeKind::Delete, "gone.txt".to_string()),
                (ChangeKind::Add, "new.txt".to_string()),
            ]
        );
        assert_eq!(changes[0].old_id, repo.blob_id("g\n"));
    }

    #[test]
    fn test_merge_deleted_in_one_parent_is_suppressed() {
        let repo = TestRepo::new();
        let base = repo.commit(&[], &[("a.txt", "a\n"), ("b.txt", "b\n")]);
        let left = repo.commit(&[base], &[("a.txt", "a\n")]);
        let right = repo.commit(&[base], &[("a.txt", "a\n"), ("b.txt", "b\n")]);
        let merge = repo.commit(&[left, right], &[("a.txt", "a\n")]);

        let changes = TreeDiffer::new(&repo.repo)
            .diff_commit(&repo.find(merge))
            .expect("diff");
        assert!(changes.is_empty());
    }

    #[test]
    fn test_octopus_merge() {
        let repo = TestRepo::new();
        let base = repo.commit(&[], &[("f.txt", "0\n")]);
        let one = repo.commit(&[base], &[("f.txt", "1\n")]);
        let two = repo.commit(&[base], &[("f.txt", "2\n")]);
        let three = repo.commit(&[base], &[("f.txt", "3\n")]);
        let octopus = repo.commit(&[one, two, three], &[("f.txt", "4\n")]);
        let pick = repo.commit(&[one, two, three], &[("f.txt", "2\n")]);

        let differ = TreeDiffer::new(&repo.repo);
        let changes = differ.diff_commit(&repo.find(octopus)).expect("diff");
        assert_eq!(kinds(&changes), vec![(ChangeKind::Modify, "f.txt".to_string())]);
        assert_eq!(changes[0].old_id, repo.blob_id("1\n"));

        let changes = differ.diff_commit(&repo.find(pick)).expect("diff");
        assert!(changes.is_empty());
    }

    #[test]
    fn test_file_replaced_by_directory() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("docs", "flat\n")]);
        let next = repo.commit(&[root], &[("docs/index.md", "nested\n")]);

        let changes = TreeDiffer::new(&repo.repo)
            .diff_commit(&repo.find(next))
            .expect("diff");
        assert_eq!(
            kinds(&changes),
            vec![
                (ChangeKind::Delete, "docs".to_string()),
                (ChangeKind::Add, "docs/index.md".to_string()),
            ]
        );
    }

    #[test]
    fn test_path_filter_restricts_changes() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("src/a.rs", "a\n"), ("docs/a.md", "a\n"), ("README", "r\n")]);

        let paths = PathFilter::new(["src"]).expect("paths");
        let changes = TreeDiffer::new(&repo.repo)
            .with_paths(Some(&paths))
            .diff_commit(&repo.find(root))
            .expect("diff");
        assert_eq!(kinds(&changes), vec![(ChangeKind::Add, "src/a.rs".to_string())]);
    }
}

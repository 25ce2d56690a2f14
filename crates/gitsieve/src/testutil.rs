// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Throw-away repositories for unit tests

use std::cell::Cell;
use std::collections::BTreeMap;

use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

use crate::diff::mode;

/// A repository in a temporary directory with a deterministic clock
pub struct TestRepo {
    _dir: TempDir,
    pub repo: Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("init repository");
        Self {
            _dir: dir,
            repo,
            clock: Cell::new(1_700_000_000),
        }
    }

    /// Commit a full snapshot of regular files on top of `parents`
    pub fn commit(&self, parents: &[Oid], files: &[(&str, &str)]) -> Oid {
        let files: Vec<(&str, &str, u32)> = files
            .iter()
            .map(|&(path, content)| (path, content, mode::REGULAR))
            .collect();
        self.commit_full(parents, &files, ("Test Author", "author@example.com"), "change")
    }

    pub fn commit_with_modes(&self, parents: &[Oid], files: &[(&str, &str, u32)]) -> Oid {
        self.commit_full(parents, files, ("Test Author", "author@example.com"), "change")
    }

    pub fn commit_by(
        &self,
        parents: &[Oid],
        files: &[(&str, &str)],
        author: (&str, &str),
        message: &str,
    ) -> Oid {
        let files: Vec<(&str, &str, u32)> = files
            .iter()
            .map(|&(path, content)| (path, content, mode::REGULAR))
            .collect();
        self.commit_full(parents, &files, author, message)
    }

    fn commit_full(
        &self,
        parents: &[Oid],
        files: &[(&str, &str, u32)],
        author: (&str, &str),
        message: &str,
    ) -> Oid {
        let seconds = self.clock.get();
        self.clock.set(seconds + 60);

        let tree_id = self.write_tree(files);
        let tree = self.repo.find_tree(tree_id).expect("tree");
        let signature = Signature::new(author.0, author.1, &Time::new(seconds, 0)).expect("sig");
        let parents: Vec<git2::Commit<'_>> = parents.iter().map(|id| self.find(*id)).collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
        self.repo
            .commit(None, &signature, &signature, message, &tree, &parent_refs)
            .expect("commit")
    }

    fn write_tree(&self, files: &[(&str, &str, u32)]) -> Oid {
        let mut builder = self.repo.treebuilder(None).expect("treebuilder");
        let mut dirs: BTreeMap<&str, Vec<(&str, &str, u32)>> = BTreeMap::new();
        for &(path, content, file_mode) in files {
            match path.split_once('/') {
                Some((dir, rest)) => dirs.entry(dir).or_default().push((rest, content, file_mode)),
                None => {
                    let id = self.blob_id(content);
                    builder
                        .insert(path, id, file_mode as i32)
                        .expect("insert blob");
                }
            }
        }
        for (dir, entries) in dirs {
            let id = self.write_tree(&entries);
            builder
                .insert(dir, id, mode::TREE as i32)
                .expect("insert tree");
        }
        builder.write().expect("write tree")
    }

    pub fn blob_id(&self, content: &str) -> Oid {
        self.repo.blob(content.as_bytes()).expect("blob")
    }

    pub fn find(&self, id: Oid) -> git2::Commit<'_> {
        self.repo.find_commit(id).expect("commit")
    }

    /// Point `refs/heads/main` and HEAD at `id`
    pub fn set_head(&self, id: Oid) {
        self.repo
            .reference("refs/heads/main", id, true, "test")
            .expect("branch");
        self.repo.set_head("refs/heads/main").expect("head");
    }
}

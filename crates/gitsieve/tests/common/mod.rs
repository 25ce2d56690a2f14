// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repositories built on disk for integration tests

#![allow(dead_code)]

use git2::{Oid, Repository, Signature, Time};
use gitsieve::GitRepo;
use tempfile::TempDir;

/// A repository in a temporary directory
///
/// Every commit is a full snapshot of top-level regular files, stamped one
/// minute after the previous one.
pub struct Fixture {
    dir: TempDir,
    pub repo: Repository,
    seconds: i64,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("init repository");
        Self {
            dir,
            repo,
            seconds: 1_700_000_000,
        }
    }

    pub fn commit(&mut self, parents: &[Oid], files: &[(&str, &str)]) -> Oid {
        self.commit_as(parents, files, "Test Author", "commit")
    }

    pub fn commit_as(&mut self, parents: &[Oid], files: &[(&str, &str)], author: &str, message: &str) -> Oid {
        self.seconds += 60;
        let mut builder = self.repo.treebuilder(None).expect("treebuilder");
        for (path, content) in files {
            let blob = self.repo.blob(content.as_bytes()).expect("blob");
            builder.insert(*path, blob, 0o100_644).expect("insert");
        }
        let tree = self.repo.find_tree(builder.write().expect("tree")).expect("find tree");

        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
        let signature = Signature::new(author, &email, &Time::new(self.seconds, 0)).expect("signature");
        let parents: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|id| self.repo.find_commit(*id).expect("parent"))
            .collect();
        let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();
        self.repo
            .commit(None, &signature, &signature, message, &tree, &parents)
            .expect("commit")
    }

    /// Linear history of `count` commits, each rewriting `counter.txt`
    pub fn linear(count: usize) -> (Self, Vec<Oid>) {
        let mut fixture = Self::new();
        let mut ids: Vec<Oid> = Vec::with_capacity(count);
        for i in 0..count {
            let parents: Vec<Oid> = ids.last().copied().into_iter().collect();
            let content = format!("{i}\n");
            ids.push(fixture.commit(&parents, &[("counter.txt", content.as_str())]));
        }
        if let Some(tip) = ids.last() {
            fixture.set_head(*tip);
        }
        (fixture, ids)
    }

    /// Point `main` and HEAD at `id`
    pub fn set_head(&self, id: Oid) {
        self.repo
            .reference("refs/heads/main", id, true, "fixture")
            .expect("branch");
        self.repo.set_head("refs/heads/main").expect("head");
    }

    pub fn open(&self) -> GitRepo {
        GitRepo::open(self.dir.path()).expect("open fixture")
    }
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository access
//!
//! [`GitRepo`] wraps a `git2::Repository` with the handful of operations the
//! walk driver needs: resolving revisions, walking history lazily, finding
//! merge bases and listing the commits behind branches and tags.

use std::collections::BTreeSet;
use std::path::Path;

use git2::{ErrorCode, ObjectType, Oid, Repository, Revwalk, Sort};
use tracing::debug;

use crate::error::SieveError;

/// Order in which history is visited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WalkOrder {
    /// Children before parents, newer commits first
    #[default]
    NewestFirst,
    /// Parents before children, oldest commits first
    OldestFirst,
}

impl WalkOrder {
    fn sorting(self) -> Sort {
        match self {
            Self::NewestFirst => Sort::TOPOLOGICAL | Sort::TIME,
            Self::OldestFirst => Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE,
        }
    }
}

/// A lazy, forward-only sequence of commit ids
pub struct History<'r> {
    revwalk: Revwalk<'r>,
}

impl Iterator for History<'_> {
    type Item = Result<Oid, SieveError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.revwalk.next().map(|id| id.map_err(SieveError::from))
    }
}

/// A git repository opened for walking
pub struct GitRepo {
    repo: Repository,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl From<Repository> for GitRepo {
    fn from(repo: Repository) -> Self {
        Self { repo }
    }
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `SieveError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SieveError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| SieveError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Discover and open a git repository containing the given path
    ///
    /// This walks up the directory tree to find a `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `SieveError::RepositoryNotFound` if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, SieveError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|_| SieveError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// The underlying repository
    #[must_use]
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Get the repository path
    #[must_use]
    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    /// Get the working directory path (None for bare repos)
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Resolve a revision (SHA, branch, tag or expression) to a commit id
    ///
    /// Tags are peeled to the commit they point at.
    ///
    /// # Errors
    ///
    /// Returns `SieveError::InvalidReference` if the revision is unknown and
    /// `SieveError::NotACommit` if it names some other kind of object.
    pub fn resolve(&self, rev: &str) -> Result<Oid, SieveError> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|_| SieveError::InvalidReference {
                reference: rev.to_string(),
            })?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| SieveError::NotACommit {
                id: object.id().to_string(),
            })?;
        Ok(commit.id())
    }

    /// The commit HEAD points at
    ///
    /// # Errors
    ///
    /// Returns `SieveError::InvalidReference` if HEAD is unborn or detached
    /// onto something that is not a commit.
    pub fn head(&self) -> Result<Oid, SieveError> {
        self.resolve("HEAD")
    }

    /// Load a commit by id
    ///
    /// # Errors
    ///
    /// Returns `SieveError::NotACommit` if the id names another object type,
    /// or a git2 error if it cannot be read.
    pub fn parse_commit(&self, id: Oid) -> Result<git2::Commit<'_>, SieveError> {
        let object = self.repo.find_object(id, None)?;
        if object.kind() != Some(ObjectType::Commit) {
            return Err(SieveError::NotACommit { id: id.to_string() });
        }
        Ok(self.repo.find_commit(id)?)
    }

    /// Walk the history reachable from `starts` but not from `hide`
    ///
    /// # Errors
    ///
    /// Returns a git2 error if a start or hidden commit cannot be pushed.
    pub fn walk(&self, starts: &[Oid], hide: &[Oid], order: WalkOrder) -> Result<History<'_>, SieveError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(order.sorting())?;
        for id in starts {
            revwalk.push(*id)?;
        }
        for id in hide {
            revwalk.hide(*id)?;
        }
        Ok(History { revwalk })
    }

    /// Best common ancestor of `ids`, if any
    ///
    /// # Errors
    ///
    /// Returns a git2 error for lookup failures other than "no merge base".
    pub fn merge_base(&self, ids: &[Oid]) -> Result<Option<Oid>, SieveError> {
        match ids {
            [] => Ok(None),
            [id] => Ok(Some(*id)),
            _ => match self.repo.merge_base_many(ids) {
                Ok(base) => Ok(Some(base)),
                Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            },
        }
    }

    /// Commits at the tips of all local and remote-tracking branches
    ///
    /// # Errors
    ///
    /// Returns a git2 error if the branches cannot be listed.
    pub fn branch_commits(&self) -> Result<BTreeSet<Oid>, SieveError> {
        let mut commits = BTreeSet::new();
        for branch in self.repo.branches(None)? {
            let (branch, _) = branch?;
            let reference = branch.into_reference();
            match reference.peel_to_commit() {
                Ok(commit) => {
                    commits.insert(commit.id());
                }
                Err(err) => debug!(
                    reference = reference.name().unwrap_or("<non-utf8>"),
                    error = %err,
                    "skipping branch that does not point at a commit"
                ),
            }
        }
        Ok(commits)
    }

    /// Commits that tags point at, annotated tags peeled
    ///
    /// Tags of trees or blobs are skipped.
    ///
    /// # Errors
    ///
    /// Returns a git2 error if the tags cannot be listed.
    pub fn tag_commits(&self) -> Result<BTreeSet<Oid>, SieveError> {
        let mut commits = BTreeSet::new();
        for reference in self.repo.references_glob("refs/tags/*")? {
            let reference = reference?;
            match reference.peel_to_commit() {
                Ok(commit) => {
                    commits.insert(commit.id());
                }
                Err(err) => debug!(
                    reference = reference.name().unwrap_or("<non-utf8>"),
                    error = %err,
                    "skipping tag that does not point at a commit"
                ),
            }
        }
        Ok(commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestRepo;
    use similar_asserts::assert_eq;

    fn open(test: &TestRepo) -> GitRepo {
        GitRepo::open(test.repo.path()).expect("open repository")
    }

    fn walk(repo: &GitRepo, starts: &[Oid], hide: &[Oid], order: WalkOrder) -> Vec<Oid> {
        repo.walk(starts, hide, order)
            .expect("walk")
            .collect::<Result<Vec<_>, _>>()
            .expect("history")
    }

    #[test]
    fn test_open_nonexistent_repository() {
        match GitRepo::open("/nonexistent/path") {
            Err(SieveError::RepositoryNotFound { path }) => assert!(path.contains("nonexistent")),
            other => panic!("Expected RepositoryNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_revisions() {
        let test = TestRepo::new();
        let root = test.commit(&[], &[("a", "1\n")]);
        let next = test.commit(&[root], &[("a", "2\n")]);
        test.set_head(next);
        let repo = open(&test);

        assert_eq!(repo.head().expect("head"), next);
        assert_eq!(repo.resolve("main~1").expect("parent"), root);
        assert_eq!(repo.resolve(&root.to_string()).expect("sha"), root);
        assert!(matches!(
            repo.resolve("no-such-branch"),
            Err(SieveError::InvalidReference { .. })
        ));

        let blob = test.blob_id("1\n");
        assert!(matches!(
            repo.resolve(&blob.to_string()),
            Err(SieveError::NotACommit { .. })
        ));
        assert!(matches!(
            repo.parse_commit(blob),
            Err(SieveError::NotACommit { .. })
        ));
        assert_eq!(repo.parse_commit(root).expect("commit").parent_count(), 0);
    }

    #[test]
    fn test_unborn_head_is_invalid() {
        let test = TestRepo::new();
        assert!(matches!(
            open(&test).head(),
            Err(SieveError::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_walk_orders_and_hiding() {
        let test = TestRepo::new();
        let a = test.commit(&[], &[("f", "a\n")]);
        let b = test.commit(&[a], &[("f", "b\n")]);
        let c = test.commit(&[b], &[("f", "c\n")]);
        let repo = open(&test);

        assert_eq!(walk(&repo, &[c], &[], WalkOrder::NewestFirst), vec![c, b, a]);
        assert_eq!(walk(&repo, &[c], &[], WalkOrder::OldestFirst), vec![a, b, c]);
        assert_eq!(walk(&repo, &[c], &[a], WalkOrder::NewestFirst), vec![c, b]);
    }

    #[test]
    fn test_merge_base() {
        let test = TestRepo::new();
        let root = test.commit(&[], &[("f", "0\n")]);
        let left = test.commit(&[root], &[("f", "l\n")]);
        let right = test.commit(&[root], &[("f", "r\n")]);
        let other = test.commit(&[], &[("g", "x\n")]);
        let repo = open(&test);

        assert_eq!(repo.merge_base(&[left, right]).expect("base"), Some(root));
        assert_eq!(repo.merge_base(&[left]).expect("base"), Some(left));
        assert_eq!(repo.merge_base(&[]).expect("base"), None);
        assert_eq!(repo.merge_base(&[left, other]).expect("base"), None);
    }

    #[test]
    fn test_branch_and_tag_commits() {
        let test = TestRepo::new();
        let root = test.commit(&[], &[("f", "0\n")]);
        let side = test.commit(&[root], &[("f", "1\n")]);
        test.set_head(root);
        test.repo
            .reference("refs/heads/side", side, true, "test")
            .expect("branch");
        test.repo
            .reference("refs/tags/light", root, true, "test")
            .expect("lightweight tag");
        let signature = git2::Signature::now("Tagger", "tagger@example.com").expect("signature");
        let target = test.repo.find_object(side, None).expect("object");
        test.repo
            .tag("v1.0", &target, &signature, "release", false)
            .expect("annotated tag");
        let blob = test.repo.find_object(test.blob_id("data"), None).expect("blob");
        test.repo
            .tag_lightweight("blob-tag", &blob, false)
            .expect("blob tag");
        let repo = open(&test);

        assert_eq!(
            repo.branch_commits().expect("branches"),
            BTreeSet::from([root, side])
        );
        assert_eq!(repo.tag_commits().expect("tags"), BTreeSet::from([root, side]));
    }
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Changesets and line edits
//!
//! A commit is turned into a list of [`ChangeEntry`] values by
//! [`TreeDiffer`]; filters that need line detail ask for the [`Edit`]s of an
//! entry through [`blob::blob_edits`].

pub mod blob;
pub mod rename;
pub mod tree;

use git2::Oid;
use serde::{Deserialize, Serialize};

pub use rename::RenameDetector;
pub use tree::TreeDiffer;

/// Raw git file modes
pub mod mode {
    /// Path is absent
    pub const MISSING: u32 = 0;
    /// Directory
    pub const TREE: u32 = 0o040_000;
    /// Regular file
    pub const REGULAR: u32 = 0o100_644;
    /// Executable file
    pub const EXECUTABLE: u32 = 0o100_755;
    /// Symbolic link
    pub const SYMLINK: u32 = 0o120_000;
    /// Submodule commit
    pub const GITLINK: u32 = 0o160_000;

    const TYPE_MASK: u32 = 0o170_000;

    /// File type bits of a mode
    #[must_use]
    pub fn file_type(mode: u32) -> u32 {
        mode & TYPE_MASK
    }

    /// Whether a mode names blob content (regular file or symlink)
    #[must_use]
    pub fn is_blob(mode: u32) -> bool {
        matches!(file_type(mode), 0o100_000 | SYMLINK)
    }
}

/// How a path changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Path is new
    Add,
    /// Content or mode changed
    Modify,
    /// Path was removed
    Delete,
    /// Path moved, optionally with edits
    Rename,
    /// Path was copied from another path
    Copy,
}

/// One path-level change of a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    /// Kind of change
    pub kind: ChangeKind,
    /// Path before the change, `None` for additions
    pub old_path: Option<String>,
    /// Path after the change, `None` for deletions
    pub new_path: Option<String>,
    /// Mode before the change, [`mode::MISSING`] for additions
    pub old_mode: u32,
    /// Mode after the change, [`mode::MISSING`] for deletions
    pub new_mode: u32,
    /// Blob before the change, zero for additions
    pub old_id: Oid,
    /// Blob after the change, zero for deletions
    pub new_id: Oid,
    /// Similarity score of renames and copies (0-100)
    pub score: u8,
}

impl ChangeEntry {
    /// A new path
    #[must_use]
    pub fn added(path: impl Into<String>, mode: u32, id: Oid) -> Self {
        Self {
            kind: ChangeKind::Add,
            old_path: None,
            new_path: Some(path.into()),
            old_mode: mode::MISSING,
            new_mode: mode,
            old_id: Oid::zero(),
            new_id: id,
            score: 0,
        }
    }

    /// A removed path
    #[must_use]
    pub fn deleted(path: impl Into<String>, mode: u32, id: Oid) -> Self {
        Self {
            kind: ChangeKind::Delete,
            old_path: Some(path.into()),
            new_path: None,
            old_mode: mode,
            new_mode: mode::MISSING,
            old_id: id,
            new_id: Oid::zero(),
            score: 0,
        }
    }

    /// A path whose mode or content changed
    #[must_use]
    pub fn modified(path: impl Into<String>, old: (u32, Oid), new: (u32, Oid)) -> Self {
        let path = path.into();
        Self {
            kind: ChangeKind::Modify,
            old_path: Some(path.clone()),
            new_path: Some(path),
            old_mode: old.0,
            new_mode: new.0,
            old_id: old.1,
            new_id: new.1,
            score: 0,
        }
    }

    /// Pair a source and a destination into a rename or copy
    #[must_use]
    pub fn paired(kind: ChangeKind, source: &ChangeEntry, destination: &ChangeEntry, score: u8) -> Self {
        Self {
            kind,
            old_path: source.old_path.clone(),
            new_path: destination.new_path.clone(),
            old_mode: source.old_mode,
            new_mode: destination.new_mode,
            old_id: source.old_id,
            new_id: destination.new_id,
            score,
        }
    }

    /// The path that best names this change: the new path, or the old one
    /// for deletions
    #[must_use]
    pub fn path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or("")
    }

    /// Whether either side is a submodule
    #[must_use]
    pub fn is_submodule(&self) -> bool {
        mode::file_type(self.old_mode) == mode::GITLINK
            || mode::file_type(self.new_mode) == mode::GITLINK
    }
}

/// Shape of a line edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Lines only exist on the new side
    Insert,
    /// Lines only exist on the old side
    Delete,
    /// Lines were rewritten
    Replace,
}

/// A contiguous region of changed lines between two blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    /// Shape of the edit
    pub kind: EditKind,
    /// First old line (1-based as reported by libgit2)
    pub old_start: usize,
    /// Number of old lines
    pub old_len: usize,
    /// First new line (1-based as reported by libgit2)
    pub new_start: usize,
    /// Number of new lines
    pub new_len: usize,
}

impl Edit {
    /// Build an edit, deriving its kind from the line counts
    #[must_use]
    pub fn new(old_start: usize, old_len: usize, new_start: usize, new_len: usize) -> Self {
        let kind = match (old_len, new_len) {
            (0, _) => EditKind::Insert,
            (_, 0) => EditKind::Delete,
            _ => EditKind::Replace,
        };
        Self {
            kind,
            old_start,
            old_len,
            new_start,
            new_len,
        }
    }

    /// Lines this edit touches: new lines for inserts, old lines for
    /// deletes, the longer side for replacements
    #[must_use]
    pub fn lines(&self) -> usize {
        match self.kind {
            EditKind::Insert => self.new_len,
            EditKind::Delete => self.old_len,
            EditKind::Replace => self.old_len.max(self.new_len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> Oid {
        Oid::from_bytes(&[byte; 20]).expect("20 bytes")
    }

    #[test]
    fn test_edit_kind_from_lengths() {
        assert_eq!(Edit::new(0, 0, 1, 3).kind, EditKind::Insert);
        assert_eq!(Edit::new(4, 2, 3, 0).kind, EditKind::Delete);
        assert_eq!(Edit::new(4, 2, 4, 5).kind, EditKind::Replace);
    }

    #[test]
    fn test_edit_lines() {
        assert_eq!(Edit::new(0, 0, 1, 3).lines(), 3);
        assert_eq!(Edit::new(4, 2, 3, 0).lines(), 2);
        assert_eq!(Edit::new(4, 2, 4, 5).lines(), 5);
        assert_eq!(Edit::new(1, 1, 1, 1).lines(), 1);
    }

    #[test]
    fn test_entry_paths() {
        let add = ChangeEntry::added("src/lib.rs", mode::REGULAR, oid(1));
        assert_eq!(add.path(), "src/lib.rs");
        assert!(add.old_id.is_zero());

        let delete = ChangeEntry::deleted("old.rs", mode::REGULAR, oid(2));
        assert_eq!(delete.path(), "old.rs");
        assert!(delete.new_id.is_zero());
    }

    #[test]
    fn test_paired_takes_sides_from_each_entry() {
        let delete = ChangeEntry::deleted("a.txt", mode::REGULAR, oid(1));
        let add = ChangeEntry::added("b.txt", mode::EXECUTABLE, oid(2));
        let rename = ChangeEntry::paired(ChangeKind::Rename, &delete, &add, 80);

        assert_eq!(rename.old_path.as_deref(), Some("a.txt"));
        assert_eq!(rename.new_path.as_deref(), Some("b.txt"));
        assert_eq!(rename.old_mode, mode::REGULAR);
        assert_eq!(rename.new_mode, mode::EXECUTABLE);
        assert_eq!(rename.score, 80);
    }

    #[test]
    fn test_mode_helpers() {
        assert!(mode::is_blob(mode::REGULAR));
        assert!(mode::is_blob(mode::EXECUTABLE));
        assert!(mode::is_blob(mode::SYMLINK));
        assert!(!mode::is_blob(mode::TREE));
        assert!(!mode::is_blob(mode::GITLINK));
        assert!(ChangeEntry::added("vendor/lib", mode::GITLINK, oid(3)).is_submodule());
    }
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Line edits between two blobs
//!
//! The line diff itself is libgit2's. Hunks are requested without context so
//! each hunk is exactly one [`Edit`].

use git2::{DiffOptions, Oid, Patch, Repository};

use super::Edit;
use crate::error::SieveError;

/// Bytes inspected by the null-byte binary check
const BINARY_PROBE: usize = 8000;

/// Whether content looks binary: a NUL in the first 8000 bytes
#[must_use]
pub fn looks_binary(content: &[u8]) -> bool {
    content[..content.len().min(BINARY_PROBE)].contains(&0)
}

/// Load blob content, treating the zero id as an empty blob
///
/// # Errors
///
/// Returns a git2 error if the id does not name a blob.
pub fn blob_content(repo: &Repository, id: Oid) -> Result<Vec<u8>, SieveError> {
    if id.is_zero() {
        return Ok(Vec::new());
    }
    let blob = repo.find_blob(id)?;
    Ok(blob.content().to_vec())
}

/// Line edits turning blob `old` into blob `new`
///
/// Empty when the ids are equal or either side is binary.
///
/// # Errors
///
/// Returns a git2 error if a blob cannot be read or diffed.
pub fn blob_edits(repo: &Repository, old: Oid, new: Oid) -> Result<Vec<Edit>, SieveError> {
    if old == new {
        return Ok(Vec::new());
    }
    let old_content = blob_content(repo, old)?;
    let new_content = blob_content(repo, new)?;
    if looks_binary(&old_content) || looks_binary(&new_content) {
        return Ok(Vec::new());
    }
    content_edits(&old_content, &new_content)
}

/// Line edits between two in-memory buffers
///
/// # Errors
///
/// Returns a git2 error if libgit2 fails to produce a patch.
pub fn content_edits(old: &[u8], new: &[u8]) -> Result<Vec<Edit>, SieveError> {
    let mut opts = DiffOptions::new();
    opts.context_lines(0).interhunk_lines(0).force_text(true);

    let patch = Patch::from_buffers(old, None, new, None, Some(&mut opts))?;
    let mut edits = Vec::with_capacity(patch.num_hunks());
    for index in 0..patch.num_hunks() {
        let (hunk, _) = patch.hunk(index)?;
        edits.push(Edit::new(
            hunk.old_start() as usize,
            hunk.old_lines() as usize,
            hunk.new_start() as usize,
            hunk.new_lines() as usize,
        ));
    }
    Ok(edits)
}

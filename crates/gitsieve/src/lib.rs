// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitsieve: composable commit filters over git history
//!
//! This library walks the history of one or more repositories and evaluates
//! a tree of commit filters against every commit. Filters select commits by
//! metadata or by what they change, accumulate results (counts, people, line
//! totals, duplicate content, the most impactful commits) and bound or
//! checkpoint the walk.
//!
//! # Example
//!
//! ```no_run
//! use gitsieve::filter::{AndFilter, CommitCountFilter, MessageFilter, PersonSetFilter};
//! use gitsieve::{CommitFinder, GitRepo};
//!
//! let mut finder = CommitFinder::new(vec![GitRepo::open(".")?])?;
//! let mut matcher = AndFilter::new()
//!     .add(MessageFilter::new("(?i)fix")?)
//!     .add(CommitCountFilter::new())
//!     .add(PersonSetFilter::authors());
//! finder.find(&mut matcher)?;
//!
//! if let Some(people) = matcher.child::<PersonSetFilter>(2) {
//!     for person in people.people() {
//!         println!("{} <{}>", person.name, person.email);
//!     }
//! }
//! # Ok::<(), gitsieve::SieveError>(())
//! ```

#![warn(missing_docs)]

pub mod commit;
pub mod diff;
pub mod error;
pub mod filter;
pub mod finder;
pub mod path;
pub mod repo;

#[cfg(test)]
mod testutil;

pub use commit::{Commit, Identity, Person};
pub use diff::{ChangeEntry, ChangeKind, Edit, EditKind, RenameDetector, TreeDiffer};
pub use error::{FilterResult, Interrupt, SieveError};
pub use filter::{CommitFilter, CommitFilterExt, WalkContext};
pub use finder::{CommitFinder, FindSummary};
pub use path::PathFilter;
pub use repo::{GitRepo, History, WalkOrder};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::{Commit, Identity, Person};
    pub use crate::error::{FilterResult, Interrupt, SieveError};
    pub use crate::filter::{
        AllFilter, AndFilter, CommitCountFilter, CommitFilter, CommitFilterExt, CommitImpactFilter,
        CursorFilter, DiffFileCountFilter, DiffLineCountFilter, DuplicateBlobFilter, LimitFilter,
        NotFilter, OrFilter, StopFilter, WalkContext,
    };
    pub use crate::finder::{CommitFinder, FindSummary};
    pub use crate::path::PathFilter;
    pub use crate::repo::{GitRepo, WalkOrder};
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Boolean combinators over child filters
//!
//! Children are evaluated in insertion order. Stop signals and errors from a
//! child propagate out of the combinator unchanged.

use git2::Repository;

use super::{CommitFilter, WalkContext, downcast_mut, downcast_ref};
use crate::error::{FilterResult, SieveError};

/// Ordered list of owned children shared by the combinators
#[derive(Debug, Default)]
struct Children {
    filters: Vec<Box<dyn CommitFilter>>,
}

impl Children {
    fn get<T: CommitFilter + 'static>(&self, index: usize) -> Option<&T> {
        self.filters.get(index).and_then(|f| downcast_ref::<T>(&**f))
    }

    fn get_mut<T: CommitFilter + 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.filters
            .get_mut(index)
            .and_then(|f| downcast_mut::<T>(&mut **f))
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        self.filters.iter_mut().try_for_each(|f| f.bind(repo))
    }

    fn reset(&mut self) {
        self.filters.iter_mut().for_each(|f| f.reset());
    }

    fn fresh(&self) -> Self {
        Self {
            filters: self.filters.iter().map(|f| f.clone_filter()).collect(),
        }
    }
}

/// Includes a commit when every child does, stopping at the first child
/// that excludes it
///
/// With no children every commit is included.
#[derive(Debug, Default)]
pub struct AndFilter {
    children: Children,
}

impl AndFilter {
    /// Empty conjunction
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Conjunction of boxed filters, in order
    #[must_use]
    pub fn from_filters(filters: Vec<Box<dyn CommitFilter>>) -> Self {
        Self {
            children: Children { filters },
        }
    }

    /// Append a child
    #[must_use]
    pub fn add(mut self, filter: impl CommitFilter + 'static) -> Self {
        self.children.filters.push(Box::new(filter));
        self
    }

    /// Number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.filters.len()
    }

    /// Whether there are no children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.filters.is_empty()
    }

    /// Child at `index` as its concrete type
    #[must_use]
    pub fn child<T: CommitFilter + 'static>(&self, index: usize) -> Option<&T> {
        self.children.get(index)
    }

    /// Mutable child at `index` as its concrete type
    #[must_use]
    pub fn child_mut<T: CommitFilter + 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.children.get_mut(index)
    }
}

impl CommitFilter for AndFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        for filter in &mut self.children.filters {
            if !filter.include(walk, commit)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn reset(&mut self) {
        self.children.reset();
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        self.children.bind(repo)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self {
            children: self.children.fresh(),
        })
    }
}

/// Includes a commit when any child does, stopping at the first child that
/// includes it
///
/// With no children no commit is included.
#[derive(Debug, Default)]
pub struct OrFilter {
    children: Children,
}

impl OrFilter {
    /// Empty disjunction
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Disjunction of boxed filters, in order
    #[must_use]
    pub fn from_filters(filters: Vec<Box<dyn CommitFilter>>) -> Self {
        Self {
            children: Children { filters },
        }
    }

    /// Append a child
    #[must_use]
    pub fn add(mut self, filter: impl CommitFilter + 'static) -> Self {
        self.children.filters.push(Box::new(filter));
        self
    }

    /// Number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.filters.len()
    }

    /// Whether there are no children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.filters.is_empty()
    }

    /// Child at `index` as its concrete type
    #[must_use]
    pub fn child<T: CommitFilter + 'static>(&self, index: usize) -> Option<&T> {
        self.children.get(index)
    }

    /// Mutable child at `index` as its concrete type
    #[must_use]
    pub fn child_mut<T: CommitFilter + 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.children.get_mut(index)
    }
}

impl CommitFilter for OrFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        for filter in &mut self.children.filters {
            if filter.include(walk, commit)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn reset(&mut self) {
        self.children.reset();
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        self.children.bind(repo)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self {
            children: self.children.fresh(),
        })
    }
}

/// Evaluates every child on every commit and always includes it
///
/// Lets accumulating children observe the whole walk even when a sibling
/// would exclude the commit.
#[derive(Debug, Default)]
pub struct AllFilter {
    children: Children,
}

impl AllFilter {
    /// Empty filter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter over boxed children, in order
    #[must_use]
    pub fn from_filters(filters: Vec<Box<dyn CommitFilter>>) -> Self {
        Self {
            children: Children { filters },
        }
    }

    /// Append a child
    #[must_use]
    pub fn add(mut self, filter: impl CommitFilter + 'static) -> Self {
        self.children.filters.push(Box::new(filter));
        self
    }

    /// Number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.filters.len()
    }

    /// Whether there are no children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.filters.is_empty()
    }

    /// Child at `index` as its concrete type
    #[must_use]
    pub fn child<T: CommitFilter + 'static>(&self, index: usize) -> Option<&T> {
        self.children.get(index)
    }

    /// Mutable child at `index` as its concrete type
    #[must_use]
    pub fn child_mut<T: CommitFilter + 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.children.get_mut(index)
    }
}

impl CommitFilter for AllFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        for filter in &mut self.children.filters {
            filter.include(walk, commit)?;
        }
        Ok(true)
    }

    fn reset(&mut self) {
        self.children.reset();
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        self.children.bind(repo)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self {
            children: self.children.fresh(),
        })
    }
}

/// Inverts a single child
#[derive(Debug)]
pub struct NotFilter {
    inner: Box<dyn CommitFilter>,
}

impl NotFilter {
    /// Negate `filter`
    #[must_use]
    pub fn new(filter: impl CommitFilter + 'static) -> Self {
        Self {
            inner: Box::new(filter),
        }
    }

    /// The negated filter as its concrete type
    #[must_use]
    pub fn inner<T: CommitFilter + 'static>(&self) -> Option<&T> {
        downcast_ref::<T>(&*self.inner)
    }
}

impl CommitFilter for NotFilter {
    fn include(&mut self, walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        Ok(!self.inner.include(walk, commit)?)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn bind(&mut self, repo: &Repository) -> Result<(), SieveError> {
        self.inner.bind(repo)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(Self {
            inner: self.inner.clone_filter(),
        })
    }
}

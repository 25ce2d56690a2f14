// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Stateless filters selecting commits by metadata

use chrono::{DateTime, Utc};
use regex::Regex;

use super::{CommitFilter, Role, WalkContext};
use crate::commit::Identity;
use crate::error::{FilterResult, SieveError};

/// Includes commits whose author or committer matches a name and/or email
///
/// Names compare exactly; emails compare ignoring ASCII case.
#[derive(Debug, Clone)]
pub struct PersonFilter {
    role: Role,
    name: Option<String>,
    email: Option<String>,
}

impl PersonFilter {
    /// Match people in `role` by name, email, or both
    ///
    /// # Errors
    ///
    /// Returns `SieveError::InvalidArgument` if neither a non-empty name nor
    /// a non-empty email is given.
    pub fn new(role: Role, name: Option<&str>, email: Option<&str>) -> Result<Self, SieveError> {
        let name = name.filter(|n| !n.is_empty()).map(str::to_string);
        let email = email.filter(|e| !e.is_empty()).map(str::to_string);
        if name.is_none() && email.is_none() {
            return Err(SieveError::invalid(
                "person filter requires a name or an email",
            ));
        }
        Ok(Self { role, name, email })
    }

    /// Match authors
    ///
    /// # Errors
    ///
    /// See [`PersonFilter::new`].
    pub fn author(name: Option<&str>, email: Option<&str>) -> Result<Self, SieveError> {
        Self::new(Role::Author, name, email)
    }

    /// Match committers
    ///
    /// # Errors
    ///
    /// See [`PersonFilter::new`].
    pub fn committer(name: Option<&str>, email: Option<&str>) -> Result<Self, SieveError> {
        Self::new(Role::Committer, name, email)
    }
}

impl CommitFilter for PersonFilter {
    fn include(&mut self, _walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        let signature = match self.role {
            Role::Author => commit.author(),
            Role::Committer => commit.committer(),
        };
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|name| signature.name() == Some(name));
        let email_ok = self.email.as_deref().is_none_or(|email| {
            signature
                .email()
                .is_some_and(|actual| actual.eq_ignore_ascii_case(email))
        });
        Ok(name_ok && email_ok)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(self.clone())
    }
}

/// Includes commits whose full message contains a match of a pattern
#[derive(Debug, Clone)]
pub struct MessageFilter {
    pattern: Regex,
}

impl MessageFilter {
    /// Match `pattern` anywhere in the message
    ///
    /// # Errors
    ///
    /// Returns `SieveError::InvalidArgument` if the pattern is empty or not
    /// a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self, SieveError> {
        if pattern.is_empty() {
            return Err(SieveError::invalid("message pattern must not be empty"));
        }
        let pattern = Regex::new(pattern)
            .map_err(|err| SieveError::invalid(format!("invalid message pattern: {err}")))?;
        Ok(Self { pattern })
    }

    /// Match commits carrying a `Signed-off-by` trailer for `person`
    ///
    /// # Errors
    ///
    /// Returns `SieveError::InvalidArgument` if the name is empty.
    pub fn signed_off_by(person: &Identity) -> Result<Self, SieveError> {
        if person.name.is_empty() {
            return Err(SieveError::invalid("signed-off-by requires a name"));
        }
        Self::new(&format!(
            "(?m)^Signed-off-by: {} <{}>\\s*$",
            regex::escape(&person.name),
            regex::escape(&person.email)
        ))
    }

    /// The compiled pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl CommitFilter for MessageFilter {
    fn include(&mut self, _walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        let message = String::from_utf8_lossy(commit.message_bytes());
        Ok(self.pattern.is_match(&message))
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(self.clone())
    }
}

/// Includes commits whose parent count lies in an inclusive range
#[derive(Debug, Clone, Copy)]
pub struct ParentCountFilter {
    min: usize,
    max: usize,
}

impl ParentCountFilter {
    /// Accept commits with `min..=max` parents
    ///
    /// # Errors
    ///
    /// Returns `SieveError::InvalidArgument` if `min > max`.
    pub fn new(min: usize, max: usize) -> Result<Self, SieveError> {
        if min > max {
            return Err(SieveError::invalid(format!(
                "parent count range {min}..={max} is empty"
            )));
        }
        Ok(Self { min, max })
    }

    /// Commits with two or more parents
    #[must_use]
    pub fn merges() -> Self {
        Self {
            min: 2,
            max: usize::MAX,
        }
    }

    /// Commits with at most one parent
    #[must_use]
    pub fn non_merges() -> Self {
        Self { min: 0, max: 1 }
    }

    /// Commits without parents
    #[must_use]
    pub fn roots() -> Self {
        Self { min: 0, max: 0 }
    }
}

impl CommitFilter for ParentCountFilter {
    fn include(&mut self, _walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        let parents = commit.parent_count();
        Ok(parents >= self.min && parents <= self.max)
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(*self)
    }
}

/// Includes commits whose author or commit time lies in a range
#[derive(Debug, Clone)]
pub struct DateFilter {
    role: Role,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

impl DateFilter {
    /// Accept times in `since..=until`; either bound may be open
    ///
    /// # Errors
    ///
    /// Returns `SieveError::InvalidArgument` if both bounds are open or
    /// `since` is after `until`.
    pub fn new(
        role: Role,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Self, SieveError> {
        match (since, until) {
            (None, None) => Err(SieveError::invalid(
                "date filter requires a since or until bound",
            )),
            (Some(since), Some(until)) if since > until => Err(SieveError::invalid(format!(
                "date range starts at {since} after it ends at {until}"
            ))),
            _ => Ok(Self { role, since, until }),
        }
    }
}

impl CommitFilter for DateFilter {
    fn include(&mut self, _walk: &mut WalkContext<'_>, commit: &git2::Commit<'_>) -> FilterResult {
        let when = self.role.person(commit).when;
        Ok(self.since.is_none_or(|since| when >= since)
            && self.until.is_none_or(|until| when <= until))
    }

    fn clone_filter(&self) -> Box<dyn CommitFilter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestRepo;

    fn verdict(filter: &mut dyn CommitFilter, repo: &TestRepo, id: git2::Oid) -> bool {
        let mut walk = WalkContext::new(&repo.repo);
        filter.include(&mut walk, &repo.find(id)).expect("verdict")
    }

    #[test]
    fn test_person_filter_requires_criteria() {
        assert!(matches!(
            PersonFilter::author(None, Some("")),
            Err(SieveError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_person_filter_matches() {
        let repo = TestRepo::new();
        let id = repo.commit_by(&[], &[("a", "1\n")], ("Ada", "Ada@Example.com"), "msg");

        let mut by_name = PersonFilter::author(Some("Ada"), None).expect("filter");
        let mut by_email = PersonFilter::author(None, Some("ada@example.com")).expect("filter");
        let mut other = PersonFilter::author(Some("Ada"), Some("bob@example.com")).expect("filter");
        assert!(verdict(&mut by_name, &repo, id));
        assert!(verdict(&mut by_email, &repo, id));
        assert!(!verdict(&mut other, &repo, id));
    }

    #[test]
    fn test_message_filter() {
        let repo = TestRepo::new();
        let id = repo.commit_by(
            &[],
            &[("a", "1\n")],
            ("Ada", "ada@example.com"),
            "Fix overflow\n\nCloses #42\n",
        );

        assert!(verdict(&mut MessageFilter::new(r"#\d+").expect("regex"), &repo, id));
        assert!(!verdict(&mut MessageFilter::new("^Revert").expect("regex"), &repo, id));
        assert!(MessageFilter::new("").is_err());
        assert!(MessageFilter::new("(unclosed").is_err());
    }

    #[test]
    fn test_signed_off_by() {
        let repo = TestRepo::new();
        let id = repo.commit_by(
            &[],
            &[("a", "1\n")],
            ("Ada", "ada@example.com"),
            "Add thing\n\nSigned-off-by: Ada L. <ada@example.com>\n",
        );
        let ada = Identity {
            name: "Ada L.".to_string(),
            email: "ada@example.com".to_string(),
        };
        let bob = Identity {
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
        };
        assert!(verdict(&mut MessageFilter::signed_off_by(&ada).expect("filter"), &repo, id));
        assert!(!verdict(&mut MessageFilter::signed_off_by(&bob).expect("filter"), &repo, id));
    }

    #[test]
    fn test_parent_count_filter() {
        let repo = TestRepo::new();
        let root = repo.commit(&[], &[("a", "1\n")]);
        let left = repo.commit(&[root], &[("a", "2\n")]);
        let right = repo.commit(&[root], &[("a", "3\n")]);
        let merge = repo.commit(&[left, right], &[("a", "4\n")]);

        assert!(verdict(&mut ParentCountFilter::roots(), &repo, root));
        assert!(!verdict(&mut ParentCountFilter::roots(), &repo, left));
        assert!(verdict(&mut ParentCountFilter::merges(), &repo, merge));
        assert!(!verdict(&mut ParentCountFilter::non_merges(), &repo, merge));
        assert!(ParentCountFilter::new(3, 1).is_err());
    }

    #[test]
    fn test_date_filter() {
        let repo = TestRepo::new();
        let first = repo.commit(&[], &[("a", "1\n")]);
        let second = repo.commit(&[first], &[("a", "2\n")]);
        let cutoff = DateTime::from_timestamp(1_700_000_030, 0).expect("timestamp");

        let mut since = DateFilter::new(Role::Author, Some(cutoff), None).expect("filter");
        let mut until = DateFilter::new(Role::Committer, None, Some(cutoff)).expect("filter");
        assert!(!verdict(&mut since, &repo, first));
        assert!(verdict(&mut since, &repo, second));
        assert!(verdict(&mut until, &repo, first));
        assert!(!verdict(&mut until, &repo, second));

        assert!(DateFilter::new(Role::Author, None, None).is_err());
        let later = DateFilter::new(Role::Author, Some(cutoff), Some(cutoff - chrono::Duration::days(1)));
        assert!(later.is_err());
    }
}

use std::fmt;
use thiserror::Error;

/// Errors raised by domain list mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("domain '{0}' is already in the list")]
    AlreadyAdded(String),

    #[error("domain '{0}' is not in the list")]
    NotListed(String),
}

/// The mutation to apply to a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Add,
    Remove,
}

/// Which list a domain belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Allow,
    Deny,
}

impl ListKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A domain entry together with the identifiers that select its list file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    name: String,
    server: String,
    kind: ListKind,
}

impl Domain {
    #[must_use]
    pub fn new(name: impl Into<String>, server: impl Into<String>, kind: ListKind) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    #[must_use]
    pub fn kind(&self) -> ListKind {
        self.kind
    }

    /// Path of the list file this domain belongs to, following the
    /// `{server}.{kind}-domains.txt` naming convention.
    #[must_use]
    pub fn list_path(&self) -> String {
        format!("{}.{}-domains.txt", self.server, self.kind)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Apply a list mutation to the file content.
///
/// The content is one domain per line. Membership is checked on trimmed
/// lines so stray whitespace cannot produce duplicates.
///
/// # Errors
///
/// Returns [`ListError::AlreadyAdded`] when adding a present domain and
/// [`ListError::NotListed`] when removing an absent one.
pub fn apply(action: ListAction, content: &str, domain: &str) -> Result<String, ListError> {
    let domain = domain.trim();
    let mut lines: Vec<&str> = content.split('\n').collect();
    let present = lines.iter().any(|line| line.trim() == domain);

    match action {
        ListAction::Add => {
            if present {
                return Err(ListError::AlreadyAdded(domain.to_owned()));
            }
            lines.push(domain);
        }
        ListAction::Remove => {
            if !present {
                return Err(ListError::NotListed(domain.to_owned()));
            }
            lines.retain(|line| line.trim() != domain);
        }
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_absent_domain_appends_line() {
        let content = "one.example\ntwo.example";
        let updated = apply(ListAction::Add, content, "three.example").unwrap();
        assert_eq!(updated, "one.example\ntwo.example\nthree.example");
        assert_eq!(
            updated
                .lines()
                .filter(|l| *l == "three.example")
                .count(),
            1
        );
    }

    #[test]
    fn add_duplicate_fails() {
        let content = "one.example\ntwo.example";
        let err = apply(ListAction::Add, content, "two.example").unwrap_err();
        assert_eq!(err, ListError::AlreadyAdded("two.example".to_owned()));
    }

    #[test]
    fn add_duplicate_with_whitespace_still_fails() {
        let content = "one.example\n  two.example  ";
        let err = apply(ListAction::Add, content, "two.example").unwrap_err();
        assert!(matches!(err, ListError::AlreadyAdded(_)));
    }

    #[test]
    fn remove_present_domain_drops_line() {
        let content = "one.example\ntwo.example\nthree.example";
        let updated = apply(ListAction::Remove, content, "two.example").unwrap();
        assert_eq!(updated, "one.example\nthree.example");
        assert!(!updated.contains("two.example"));
    }

    #[test]
    fn remove_absent_domain_fails() {
        let content = "one.example";
        let err = apply(ListAction::Remove, content, "two.example").unwrap_err();
        assert_eq!(err, ListError::NotListed("two.example".to_owned()));
    }

    #[test]
    fn remove_matches_trimmed_lines() {
        let content = " one.example \ntwo.example";
        let updated = apply(ListAction::Remove, content, "one.example").unwrap();
        assert_eq!(updated, "two.example");
    }

    #[test]
    fn remove_last_domain_leaves_empty_content() {
        let updated = apply(ListAction::Remove, "one.example", "one.example").unwrap();
        assert_eq!(updated, "");
    }

    #[test]
    fn list_path_follows_naming_convention() {
        let domain = Domain::new("ads.example", "edge1", ListKind::Deny);
        assert_eq!(domain.list_path(), "edge1.deny-domains.txt");

        let domain = Domain::new("cdn.example", "edge2", ListKind::Allow);
        assert_eq!(domain.list_path(), "edge2.allow-domains.txt");
    }
}

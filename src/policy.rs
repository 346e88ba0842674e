//! Path-based access rules.
//!
//! The table is built once at startup and consulted by the access middleware
//! for every request, before any handler runs.

use crate::auth::{Principal, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches one path exactly.
    Exact(String),
    /// `prefix/**`: the prefix itself and anything below it.
    Subtree(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Subtree(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == p,
            PathPattern::Subtree(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }

    /// Exact patterns beat subtrees; among subtrees the longer prefix wins.
    fn specificity(&self) -> (u8, usize) {
        match self {
            PathPattern::Exact(p) => (1, p.len()),
            PathPattern::Subtree(p) => (0, p.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Unauthenticated,
    Forbidden(Role),
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    fallback: Requirement,
}

impl AccessPolicy {
    /// Rules are sorted most-specific-first; paths no rule matches get `fallback`.
    pub fn new(rules: impl IntoIterator<Item = (&'static str, Requirement)>, fallback: Requirement) -> Self {
        let mut rules: Vec<AccessRule> = rules
            .into_iter()
            .map(|(pattern, requirement)| AccessRule {
                pattern: PathPattern::parse(pattern),
                requirement,
            })
            .collect();
        rules.sort_by(|a, b| b.pattern.specificity().cmp(&a.pattern.specificity()));
        Self { rules, fallback }
    }

    /// The rule set this service ships with.
    pub fn standard() -> Self {
        Self::new(
            [
                ("/", Requirement::Public),
                ("/health", Requirement::Public),
                ("/api/auth/register", Requirement::Public),
                ("/api/auth/login", Requirement::Public),
                ("/api/auth/logout", Requirement::Public),
                ("/api/user/**", Requirement::Role(Role::User)),
                ("/api/admin/**", Requirement::Role(Role::Admin)),
                ("/api/submit-assessment", Requirement::Role(Role::User)),
                ("/api/my-assessments", Requirement::Role(Role::User)),
                ("/api/assessments", Requirement::Role(Role::Admin)),
                ("/api/assessment/**", Requirement::Role(Role::Admin)),
                ("/api/assessment-stats", Requirement::Role(Role::Admin)),
            ],
            Requirement::Authenticated,
        )
    }

    pub fn requirement_for(&self, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| rule.requirement)
            .unwrap_or(self.fallback)
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }
}

/// Decide whether `principal` satisfies `requirement`.
pub fn guard(principal: Option<&Principal>, requirement: Requirement) -> Decision {
    match (requirement, principal) {
        (Requirement::Public, _) => Decision::Allow,
        (_, None) => Decision::Unauthenticated,
        (Requirement::Authenticated, Some(_)) => Decision::Allow,
        (Requirement::Role(role), Some(p)) if p.has_role(role) => Decision::Allow,
        (Requirement::Role(role), Some(_)) => Decision::Forbidden(role),
    }
}

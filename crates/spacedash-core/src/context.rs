//! Active context
//!
//! The (space, user) pair the aggregation pipeline reacts to. The context is
//! owned by the surrounding application; this core observes emissions and
//! never drives changes. Both values are passed explicitly, there is no
//! ambient current-user singleton.

use serde::{Deserialize, Serialize};

/// A logged-in user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity id
    pub id: String,
    /// Login name
    pub username: String,
}

impl User {
    /// Create a new user reference
    #[must_use]
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }

    /// Whether the identity is usable for commits
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Reference to the currently active space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRef {
    /// Space id
    pub id: String,
    /// Space path segment
    pub path: String,
}

impl SpaceRef {
    /// Create a new space reference
    #[must_use]
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

/// The externally owned active context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Currently active space
    pub space: SpaceRef,
    /// Currently logged-in user, if any
    pub user: Option<User>,
}

impl Context {
    /// Create a context for a space with no logged-in user
    #[must_use]
    pub fn new(space: SpaceRef) -> Self {
        Self { space, user: None }
    }

    /// Attach the logged-in user
    #[inline]
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_validity() {
        assert!(User::new("u1", "alice").is_valid());
        assert!(!User::new("", "ghost").is_valid());
    }

    #[test]
    fn context_builder() {
        let ctx = Context::new(SpaceRef::new("s1", "/s1")).with_user(User::new("u1", "alice"));
        assert_eq!(ctx.space.id, "s1");
        assert_eq!(ctx.user.as_ref().map(|u| u.id.as_str()), Some("u1"));
    }
}

//! Filter expressions and the work-item query builder
//!
//! A filter is an immutable tree of `equal` predicates joined by `and`,
//! built fresh for every query and serialized inside the `{expression: ...}`
//! envelope the work-item collaborator expects.

use serde::{Deserialize, Serialize};

/// An immutable filter expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterExpr {
    /// `field == value`
    Equal {
        /// Field name
        field: String,
        /// Compared value
        value: String,
    },
    /// Conjunction of two sub-expressions
    And {
        /// Left operand
        left: Box<FilterExpr>,
        /// Right operand
        right: Box<FilterExpr>,
    },
}

impl FilterExpr {
    /// Build an equality predicate
    #[must_use]
    pub fn equal(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equal {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Join with another expression under `and`
    #[inline]
    #[must_use]
    pub fn and(self, other: FilterExpr) -> Self {
        Self::And {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Borrowing wire envelope for transmission
    #[inline]
    #[must_use]
    pub fn envelope(&self) -> QueryEnvelope<'_> {
        QueryEnvelope { expression: self }
    }
}

/// Wire envelope wrapping a filter expression
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QueryEnvelope<'a> {
    /// The filter expression
    pub expression: &'a FilterExpr,
}

/// Compose the work-item filter for a space and an optional assignee
///
/// Equivalent to `assignee == user AND space == space`. A missing or empty
/// user id omits the assignee predicate entirely; an equality against an
/// undefined assignee would silently match nothing.
#[must_use]
pub fn work_item_query(space_id: &str, user_id: Option<&str>) -> FilterExpr {
    debug_assert!(!space_id.is_empty(), "space id must be non-empty");

    let space = FilterExpr::equal("space", space_id);
    match user_id {
        Some(user) if !user.is_empty() => FilterExpr::equal("assignee", user).and(space),
        _ => space,
    }
}

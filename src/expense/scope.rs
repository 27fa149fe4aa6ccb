//! The access-control guard for the expense store.

use crate::{auth::Claims, database_id::UserId};

/// The owner a database query is scoped to.
///
/// Every function that touches the expense table takes an [OwnerScope] and
/// binds its user ID into the SQL `WHERE` clause, so a query that forgets to
/// scope by owner does not compile. The only way to obtain a scope is from
/// the verified [Claims] of the request being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    owner: UserId,
}

impl OwnerScope {
    /// The ID of the user this scope restricts queries to.
    pub fn owner(&self) -> UserId {
        self.owner
    }
}

impl From<&Claims> for OwnerScope {
    fn from(claims: &Claims) -> Self {
        Self { owner: claims.sub }
    }
}

#[cfg(test)]
impl OwnerScope {
    /// Build a scope directly from a user ID, bypassing authentication.
    pub fn for_user(owner: UserId) -> Self {
        Self { owner }
    }
}

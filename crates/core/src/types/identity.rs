//! Requester identity for recommendation calls.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Who is asking for recommendations.
///
/// An explicit two-variant identity instead of a runtime "is this object
/// authenticated" probe: anonymous visitors carry no user ID and always fall
/// back to globally trending products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "user_id")]
pub enum UserIdentity {
    /// A visitor without an account session.
    Anonymous,
    /// A signed-in user.
    Authenticated(UserId),
}

impl UserIdentity {
    /// Whether this identity belongs to a signed-in user.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The user ID, if authenticated.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(*id),
        }
    }
}

impl From<UserId> for UserIdentity {
    fn from(id: UserId) -> Self {
        Self::Authenticated(id)
    }
}

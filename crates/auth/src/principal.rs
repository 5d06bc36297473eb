use serde::Serialize;

use shopfloor_core::UserId;

use crate::Role;

/// An authenticated caller.
///
/// `user_id` is what ownership checks compare against (e.g. who created a
/// product), so it must stay the same for every request made with the same
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: UserId::new(),
            name: name.into(),
            role,
        }
    }
}

use shopfloor_auth::{Principal, Role};
use shopfloor_core::UserId;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware; handlers extract it explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn name(&self) -> &str {
        &self.principal.name
    }

    pub fn role(&self) -> &Role {
        &self.principal.role
    }
}

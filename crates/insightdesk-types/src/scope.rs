use serde::{Deserialize, Serialize};

/// The tenant a directory view is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantScope {
    pub domain: String,
}

impl TenantScope {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }
}

/// Authenticated session plus tenant, handed to the backend at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub token: String,
    pub scope: TenantScope,
}

impl SessionContext {
    pub fn new(token: impl Into<String>, scope: TenantScope) -> Self {
        Self {
            token: token.into(),
            scope,
        }
    }
}

// Keeps the bearer token out of logs.
impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

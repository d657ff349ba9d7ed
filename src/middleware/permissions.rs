//! Role/permission guard.
//!
//! Protected operations declare the capabilities they require as route
//! metadata (`RequiredCapabilities` attached via `route_layer(Extension)`);
//! the guard compares them against the server-resolved `Principal`. Routes
//! without metadata pass unconditionally.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;
use crate::middleware::auth::Principal;

/// Capability requirements attached to a route group.
///
/// Role and permission checks are both any-match with no precedence: the
/// principal needs one of the required roles OR one of the required
/// permissions.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequiredCapabilities {
    pub roles: &'static [&'static str],
    pub permissions: &'static [&'static str],
}

impl RequiredCapabilities {
    pub fn roles(roles: &'static [&'static str]) -> Self {
        Self { roles, permissions: &[] }
    }

    pub fn permissions(permissions: &'static [&'static str]) -> Self {
        Self { roles: &[], permissions }
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty()
    }

    pub fn satisfied_by(&self, principal: &Principal) -> bool {
        self.roles.iter().any(|role| principal.has_role(role))
            || self.permissions.iter().any(|perm| principal.has_permission(perm))
    }
}

/// Enforce route capability metadata against the resolved principal.
pub async fn capability_guard(request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(required) = request.extensions().get::<RequiredCapabilities>().copied() else {
        return Ok(next.run(request).await);
    };

    if required.is_empty() {
        return Ok(next.run(request).await);
    }

    let Some(principal) = request.extensions().get::<Principal>() else {
        tracing::warn!("capability check failed: no authenticated principal");
        return Err(ApiError::forbidden("Not authenticated"));
    };

    if !required.satisfied_by(principal) {
        tracing::warn!(
            user_id = %principal.user_id,
            role = %principal.role,
            required_roles = ?required.roles,
            required_permissions = ?required.permissions,
            "capability check failed"
        );
        return Err(ApiError::forbidden("Insufficient permissions"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn principal(role: &str, permissions: &[&str]) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            role: role.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect::<HashSet<_>>(),
        }
    }

    #[test]
    fn role_check_is_any_match() {
        let required = RequiredCapabilities::roles(&["ADMIN", "EDITOR"]);
        assert!(required.satisfied_by(&principal("EDITOR", &[])));
        assert!(!required.satisfied_by(&principal("USER", &[])));
    }

    #[test]
    fn permission_satisfies_when_role_does_not() {
        let required = RequiredCapabilities {
            roles: &["ADMIN"],
            permissions: &["content.delete"],
        };
        assert!(required.satisfied_by(&principal("USER", &["content.delete"])));
        assert!(!required.satisfied_by(&principal("USER", &["content.read"])));
    }
}

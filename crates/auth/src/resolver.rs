//! Role resolution: (principal, request path) → role.
//!
//! Tiers are checked in a fixed order and the first match wins:
//!
//! 1. operator, on any path
//! 2. pipeline principal of the application named by the path
//! 3. admin of the tenant named by the path (via the tenant's domain)
//! 4. everyone
//!
//! Unknown tenants and applications simply fail their tier. Only directory
//! failures surface as errors, unchanged. All lookups of one resolution go
//! through a single [`crate::DirectoryView`].

use serde::Serialize;

use crate::config::{ConfigError, PathMatcherConfig};
use crate::{DirectoryError, MembershipDirectory, PathMatcher, PathScope, Principal, PrincipalId, Role, RoleSet};

/// Tier of the precedence chain that produced a role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    Operator,
    Pipeline,
    TenantAdmin,
    Default,
}

impl core::fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ResolutionTier::Operator => f.write_str("operator"),
            ResolutionTier::Pipeline => f.write_str("pipeline"),
            ResolutionTier::TenantAdmin => f.write_str("tenant_admin"),
            ResolutionTier::Default => f.write_str("default"),
        }
    }
}

/// Auditable account of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleResolution {
    pub principal: PrincipalId,
    pub scope: PathScope,
    pub tier: ResolutionTier,
    pub role: Role,
    /// Human-readable reason for the decision.
    pub reason: String,
}

impl RoleResolution {
    pub fn roles(&self) -> RoleSet {
        RoleSet::from([self.role.clone()])
    }
}

/// Stateless resolver over a path matcher and a membership directory.
///
/// Holds no mutable state; share it freely across request handlers.
#[derive(Debug, Clone)]
pub struct RoleResolver<D> {
    matcher: PathMatcher,
    directory: D,
}

impl<D: MembershipDirectory> RoleResolver<D> {
    pub fn new(matcher: PathMatcher, directory: D) -> Self {
        Self { matcher, directory }
    }

    pub fn with_config(config: PathMatcherConfig, directory: D) -> Result<Self, ConfigError> {
        Ok(Self::new(PathMatcher::new(config)?, directory))
    }

    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Roles of `principal` for a request to `path`. Always a single role.
    pub fn resolve_roles(&self, principal: &Principal, path: &str) -> Result<RoleSet, DirectoryError> {
        Ok(self.explain(principal, path)?.roles())
    }

    /// Like [`Self::resolve_roles`], for callers that already classified the path.
    pub fn resolve_scope(&self, principal: &Principal, scope: &PathScope) -> Result<RoleSet, DirectoryError> {
        Ok(self.resolve(principal, scope.clone())?.roles())
    }

    /// Resolve and report which tier decided, and why.
    pub fn explain(&self, principal: &Principal, path: &str) -> Result<RoleResolution, DirectoryError> {
        let scope = self.matcher.match_path(path);
        self.resolve(principal, scope)
    }

    fn resolve(&self, principal: &Principal, scope: PathScope) -> Result<RoleResolution, DirectoryError> {
        let resolution = self.run_tiers(principal, scope).inspect_err(|err| {
            tracing::warn!(principal = %principal, error = %err, "role resolution failed");
        })?;

        tracing::debug!(
            principal = %resolution.principal,
            scope = %resolution.scope,
            tier = %resolution.tier,
            role = %resolution.role,
            "resolved role"
        );
        debug_assert!(resolution.role.applies_to(&resolution.scope));
        Ok(resolution)
    }

    fn run_tiers(&self, principal: &Principal, scope: PathScope) -> Result<RoleResolution, DirectoryError> {
        let decide = |scope: PathScope, tier, role, reason: String| RoleResolution {
            principal: principal.id().clone(),
            scope,
            tier,
            role,
            reason,
        };

        let directory = self.directory.view()?;

        if directory.is_operator(principal)? {
            return Ok(decide(
                scope,
                ResolutionTier::Operator,
                Role::Operator,
                "principal is a system operator".to_string(),
            ));
        }

        let Some(tenant_name) = scope.tenant() else {
            return Ok(decide(
                scope,
                ResolutionTier::Default,
                Role::Everyone,
                "path does not name a tenant".to_string(),
            ));
        };

        let Some(tenant) = directory.resolve_tenant(tenant_name)? else {
            let reason = format!("tenant '{tenant_name}' is unknown");
            return Ok(decide(scope, ResolutionTier::Default, Role::Everyone, reason));
        };

        if let Some(application) = scope.application() {
            if directory.is_pipeline_principal(&tenant.name, application, principal)? {
                let reason = format!(
                    "principal is a pipeline principal of application '{}' in tenant '{}'",
                    application, tenant.name
                );
                let role = Role::tenant_pipeline(tenant.name.clone(), application.clone());
                return Ok(decide(scope, ResolutionTier::Pipeline, role, reason));
            }
        }

        if directory.is_tenant_admin(&tenant.domain, principal)? {
            let reason = format!(
                "principal is an admin of tenant '{}' through domain '{}'",
                tenant.name, tenant.domain
            );
            let role = Role::tenant_admin(tenant.name);
            return Ok(decide(scope, ResolutionTier::TenantAdmin, role, reason));
        }

        let reason = match scope.application() {
            Some(application) => format!(
                "principal holds no membership for application '{}' in tenant '{}'",
                application, tenant.name
            ),
            None => format!("principal holds no membership in tenant '{}'", tenant.name),
        };
        Ok(decide(scope, ResolutionTier::Default, Role::Everyone, reason))
    }
}

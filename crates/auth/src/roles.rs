use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tenantgate_core::{ApplicationName, TenantName};

use crate::PathScope;

/// Access-control role resolved for one request.
///
/// Closed set: downstream policy matches on the variant and its scope, never on
/// a role name string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    /// Every authenticated principal.
    Everyone,
    /// System-wide operator.
    Operator,
    /// Administrator of one tenant.
    TenantAdmin { tenant: TenantName },
    /// Build pipeline of one application.
    TenantPipeline {
        tenant: TenantName,
        application: ApplicationName,
    },
}

/// Unscoped discriminant of a [`Role`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Everyone,
    Operator,
    TenantAdmin,
    TenantPipeline,
}

/// Roles resolved for a request, in a deterministic order.
pub type RoleSet = BTreeSet<Role>;

impl Role {
    pub fn tenant_admin(tenant: TenantName) -> Self {
        Role::TenantAdmin { tenant }
    }

    pub fn tenant_pipeline(tenant: TenantName, application: ApplicationName) -> Self {
        Role::TenantPipeline {
            tenant,
            application,
        }
    }

    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Everyone => RoleKind::Everyone,
            Role::Operator => RoleKind::Operator,
            Role::TenantAdmin { .. } => RoleKind::TenantAdmin,
            Role::TenantPipeline { .. } => RoleKind::TenantPipeline,
        }
    }

    pub fn tenant(&self) -> Option<&TenantName> {
        match self {
            Role::TenantAdmin { tenant } | Role::TenantPipeline { tenant, .. } => Some(tenant),
            Role::Everyone | Role::Operator => None,
        }
    }

    pub fn application(&self) -> Option<&ApplicationName> {
        match self {
            Role::TenantPipeline { application, .. } => Some(application),
            _ => None,
        }
    }

    pub fn is_scoped(&self) -> bool {
        self.tenant().is_some()
    }

    /// Whether this role may be the result of resolving a request with `scope`.
    ///
    /// Scoped roles require the path to name their tenant (and application) or
    /// something narrower beneath it.
    pub fn applies_to(&self, scope: &PathScope) -> bool {
        match self {
            Role::Everyone | Role::Operator => true,
            Role::TenantAdmin { tenant } => scope.tenant() == Some(tenant),
            Role::TenantPipeline {
                tenant,
                application,
            } => scope.tenant() == Some(tenant) && scope.application() == Some(application),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::Everyone => f.write_str("Everyone"),
            Role::Operator => f.write_str("Operator"),
            Role::TenantAdmin { tenant } => write!(f, "TenantAdmin({tenant})"),
            Role::TenantPipeline {
                tenant,
                application,
            } => write!(f, "TenantPipeline({tenant}, {application})"),
        }
    }
}

impl core::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RoleKind::Everyone => f.write_str("Everyone"),
            RoleKind::Operator => f.write_str("Operator"),
            RoleKind::TenantAdmin => f.write_str("TenantAdmin"),
            RoleKind::TenantPipeline => f.write_str("TenantPipeline"),
        }
    }
}

/// Audit rendering of a role set, e.g. `{TenantAdmin(mytenant)}`.
pub fn render_roles(roles: &RoleSet) -> String {
    let inner: Vec<String> = roles.iter().map(Role::to_string).collect();
    format!("{{{}}}", inner.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn t(name: &str) -> TenantName {
        TenantName::parse(name).unwrap()
    }

    fn a(name: &str) -> ApplicationName {
        ApplicationName::parse(name).unwrap()
    }

    #[test]
    fn display_distinguishes_scope() {
        assert_eq!(Role::Everyone.to_string(), "Everyone");
        assert_eq!(Role::Operator.to_string(), "Operator");
        assert_eq!(Role::tenant_admin(t("mytenant")).to_string(), "TenantAdmin(mytenant)");
        assert_ne!(
            Role::tenant_admin(t("mytenant")).to_string(),
            Role::tenant_admin(t("othertenant")).to_string()
        );
        assert_eq!(
            Role::tenant_pipeline(t("mytenant"), a("myapp")).to_string(),
            "TenantPipeline(mytenant, myapp)"
        );
    }

    #[test]
    fn equality_covers_scope_parameters() {
        let mut set = HashSet::new();
        set.insert(Role::tenant_admin(t("mytenant")));
        set.insert(Role::tenant_admin(t("mytenant")));
        set.insert(Role::tenant_admin(t("othertenant")));
        set.insert(Role::tenant_pipeline(t("mytenant"), a("myapp")));
        set.insert(Role::tenant_pipeline(t("mytenant"), a("otherapp")));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn accessors() {
        let role = Role::tenant_pipeline(t("mytenant"), a("myapp"));
        assert_eq!(role.kind(), RoleKind::TenantPipeline);
        assert_eq!(role.tenant(), Some(&t("mytenant")));
        assert_eq!(role.application(), Some(&a("myapp")));
        assert!(role.is_scoped());
        assert!(!Role::Operator.is_scoped());
        assert_eq!(Role::tenant_admin(t("x")).application(), None);
    }

    #[test]
    fn scope_consistency() {
        let tenant_scope = PathScope::Tenant { tenant: t("mytenant") };
        let app_scope = PathScope::Application {
            tenant: t("mytenant"),
            application: a("myapp"),
        };

        let admin = Role::tenant_admin(t("mytenant"));
        assert!(admin.applies_to(&tenant_scope));
        assert!(admin.applies_to(&app_scope));
        assert!(!admin.applies_to(&PathScope::None));
        assert!(!Role::tenant_admin(t("othertenant")).applies_to(&tenant_scope));

        let pipeline = Role::tenant_pipeline(t("mytenant"), a("myapp"));
        assert!(pipeline.applies_to(&app_scope));
        assert!(!pipeline.applies_to(&tenant_scope));

        assert!(Role::Everyone.applies_to(&PathScope::None));
        assert!(Role::Operator.applies_to(&app_scope));
    }

    #[test]
    fn render_is_sorted_and_braced() {
        let mut roles = RoleSet::new();
        roles.insert(Role::tenant_admin(t("mytenant")));
        assert_eq!(render_roles(&roles), "{TenantAdmin(mytenant)}");

        roles.insert(Role::Everyone);
        assert_eq!(render_roles(&roles), "{Everyone, TenantAdmin(mytenant)}");
        assert_eq!(render_roles(&RoleSet::new()), "{}");
    }

    #[test]
    fn serde_is_tagged() {
        let json = serde_json::to_value(Role::tenant_admin(t("mytenant"))).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "tenant_admin", "tenant": "mytenant" }));

        let back: Role = serde_json::from_value(json).unwrap();
        assert_eq!(back, Role::tenant_admin(t("mytenant")));
    }
}

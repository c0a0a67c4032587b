//! JSON seed documents for bootstrapping an in-memory directory.
//!
//! ```json
//! {
//!   "operators": [{ "id": "user.hosted-operator", "kind": "user" }],
//!   "tenants": [{
//!     "name": "mytenant",
//!     "domain": "tenantdomain",
//!     "admins": [{ "id": "tenantdomain.adminservice", "kind": "service" }],
//!     "applications": [{ "name": "myapp", "pipeline_principals": [] }]
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tenantgate_auth::Principal;
use tenantgate_core::{ApplicationName, DomainError, DomainName, TenantName};

use super::snapshot::DirectorySnapshot;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("malformed seed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("inconsistent seed document: {0}")]
    Domain(#[from] DomainError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySeed {
    pub operators: Vec<Principal>,
    pub tenants: Vec<TenantSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSeed {
    pub name: TenantName,
    pub domain: DomainName,
    #[serde(default)]
    pub admins: Vec<Principal>,
    #[serde(default)]
    pub applications: Vec<ApplicationSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSeed {
    pub name: ApplicationName,
    #[serde(default)]
    pub pipeline_principals: Vec<Principal>,
}

impl DirectorySeed {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Materialize the seed. Duplicate tenants or applications are rejected.
    pub fn to_snapshot(&self) -> Result<DirectorySnapshot, DomainError> {
        let mut snap = DirectorySnapshot::new();
        for op in &self.operators {
            snap.add_operator(op.clone());
        }
        for tenant in &self.tenants {
            snap.create_tenant(tenant.name.clone(), tenant.domain.clone())?;
            for admin in &tenant.admins {
                snap.add_tenant_admin(tenant.domain.clone(), admin.clone());
            }
            for app in &tenant.applications {
                snap.create_application(&tenant.name, app.name.clone())?;
                for member in &app.pipeline_principals {
                    snap.add_pipeline_principal(&tenant.name, &app.name, member.clone())?;
                }
            }
        }
        Ok(snap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantgate_auth::MembershipDirectory;

    const SEED: &str = r#"{
        "operators": [{ "id": "user.hosted-operator", "kind": "user" }],
        "tenants": [
            {
                "name": "mytenant",
                "domain": "tenantdomain",
                "admins": [{ "id": "tenantdomain.adminservice", "kind": "service" }],
                "applications": [
                    { "name": "myapp", "pipeline_principals": [{ "id": "cd.sd12345", "kind": "service" }] }
                ]
            },
            { "name": "othertenant", "domain": "tenantdomain2" }
        ]
    }"#;

    #[test]
    fn loads_memberships() {
        let snap = DirectorySeed::from_json(SEED).unwrap().to_snapshot().unwrap();
        let op = Principal::user("hosted-operator");
        let admin = Principal::service(&DomainName::parse("tenantdomain").unwrap(), "adminservice");
        let ci = Principal::service(&DomainName::parse("cd").unwrap(), "sd12345");

        assert!(snap.is_operator(&op).unwrap());
        assert!(snap
            .is_tenant_admin(&DomainName::parse("tenantdomain").unwrap(), &admin)
            .unwrap());
        assert!(snap
            .is_pipeline_principal(
                &TenantName::parse("mytenant").unwrap(),
                &ApplicationName::parse("myapp").unwrap(),
                &ci
            )
            .unwrap());
        assert_eq!(snap.tenants().len(), 2);
    }

    #[test]
    fn invalid_names_fail_to_parse() {
        let err = DirectorySeed::from_json(r#"{ "tenants": [{ "name": "bad/name", "domain": "d" }] }"#)
            .unwrap_err();
        assert!(matches!(err, SeedError::Parse(_)));
    }

    #[test]
    fn duplicate_tenant_is_rejected() {
        let seed = DirectorySeed::from_json(
            r#"{ "tenants": [{ "name": "t", "domain": "d" }, { "name": "t", "domain": "e" }] }"#,
        )
        .unwrap();
        assert!(matches!(seed.to_snapshot(), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn empty_document_is_empty_directory() {
        let snap = DirectorySeed::from_json("{}").unwrap().to_snapshot().unwrap();
        assert_eq!(snap, DirectorySnapshot::new());
    }
}

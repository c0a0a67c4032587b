use std::sync::{Arc, RwLock};

use thiserror::Error;

use tenantgate_auth::{Application, DirectoryError, DirectoryView, MembershipDirectory, Principal, Tenant};
use tenantgate_core::{ApplicationName, DomainError, DomainName, TenantName};

use super::seed::DirectorySeed;
use super::snapshot::DirectorySnapshot;

/// Error from a directory mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryAdminError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// In-memory membership directory for tests/dev.
///
/// Mutations copy the current snapshot, apply the change and publish the new
/// snapshot atomically; a failed mutation publishes nothing. Readers never
/// observe a half-applied change.
#[derive(Debug, Default)]
pub struct InMemoryMembershipDirectory {
    current: RwLock<Arc<DirectorySnapshot>>,
}

impl InMemoryMembershipDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: DirectorySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Build a directory from a seed document.
    pub fn from_seed(seed: &DirectorySeed) -> Result<Self, DomainError> {
        Ok(Self::from_snapshot(seed.to_snapshot()?))
    }

    /// The currently published state.
    pub fn snapshot(&self) -> Result<Arc<DirectorySnapshot>, DirectoryError> {
        let guard = self
            .current
            .read()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".to_string()))?;
        Ok(Arc::clone(&guard))
    }

    fn update<T>(
        &self,
        f: impl FnOnce(&mut DirectorySnapshot) -> Result<T, DomainError>,
    ) -> Result<T, DirectoryAdminError> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".to_string()))?;
        let mut next = DirectorySnapshot::clone(&guard);
        let out = f(&mut next)?;
        *guard = Arc::new(next);
        Ok(out)
    }

    pub fn add_operator(&self, principal: Principal) -> Result<bool, DirectoryAdminError> {
        tracing::info!(principal = %principal, "adding operator");
        self.update(|snap| Ok(snap.add_operator(principal)))
    }

    pub fn create_tenant(&self, name: TenantName, domain: DomainName) -> Result<Tenant, DirectoryAdminError> {
        let tenant = self.update(|snap| snap.create_tenant(name, domain))?;
        tracing::info!(tenant = %tenant.name, domain = %tenant.domain, "created tenant");
        Ok(tenant)
    }

    pub fn remove_tenant(&self, name: &TenantName) -> Result<Tenant, DirectoryAdminError> {
        let tenant = self.update(|snap| snap.remove_tenant(name))?;
        tracing::info!(tenant = %tenant.name, "removed tenant");
        Ok(tenant)
    }

    pub fn create_application(
        &self,
        tenant: &TenantName,
        name: ApplicationName,
    ) -> Result<Application, DirectoryAdminError> {
        let app = self.update(|snap| snap.create_application(tenant, name))?;
        tracing::info!(tenant = %app.tenant, application = %app.name, "created application");
        Ok(app)
    }

    pub fn remove_application(&self, tenant: &TenantName, name: &ApplicationName) -> Result<(), DirectoryAdminError> {
        self.update(|snap| snap.remove_application(tenant, name))?;
        tracing::info!(tenant = %tenant, application = %name, "removed application");
        Ok(())
    }

    pub fn add_tenant_admin(&self, domain: DomainName, principal: Principal) -> Result<bool, DirectoryAdminError> {
        tracing::info!(domain = %domain, principal = %principal, "adding tenant admin");
        self.update(|snap| Ok(snap.add_tenant_admin(domain, principal)))
    }

    pub fn add_pipeline_principal(
        &self,
        tenant: &TenantName,
        application: &ApplicationName,
        principal: Principal,
    ) -> Result<bool, DirectoryAdminError> {
        tracing::info!(
            tenant = %tenant,
            application = %application,
            principal = %principal,
            "adding pipeline principal"
        );
        self.update(|snap| snap.add_pipeline_principal(tenant, application, principal))
    }
}

/// Individual lookups read the latest published snapshot; a resolution pins
/// one snapshot through [`MembershipDirectory::view`].
impl MembershipDirectory for InMemoryMembershipDirectory {
    fn view(&self) -> Result<DirectoryView<'_>, DirectoryError> {
        Ok(DirectoryView::Pinned(self.snapshot()?))
    }

    fn is_operator(&self, principal: &Principal) -> Result<bool, DirectoryError> {
        self.snapshot()?.is_operator(principal)
    }

    fn resolve_tenant(&self, name: &TenantName) -> Result<Option<Tenant>, DirectoryError> {
        self.snapshot()?.resolve_tenant(name)
    }

    fn is_tenant_admin(&self, domain: &DomainName, principal: &Principal) -> Result<bool, DirectoryError> {
        self.snapshot()?.is_tenant_admin(domain, principal)
    }

    fn is_pipeline_principal(
        &self,
        tenant: &TenantName,
        application: &ApplicationName,
        principal: &Principal,
    ) -> Result<bool, DirectoryError> {
        self.snapshot()?
            .is_pipeline_principal(tenant, application, principal)
    }
}

//! Read-only view of the membership directory.
//!
//! The directory itself (storage, replication, mutation) lives outside this
//! crate; the resolver only needs these four lookups, made against one
//! [`DirectoryView`] per resolution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tenantgate_core::{ApplicationName, DomainName, Entity, TenantName};

use crate::Principal;

/// A tenant and the administrative domain backing its admin set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenant {
    pub name: TenantName,
    pub domain: DomainName,
}

impl Tenant {
    pub fn new(name: TenantName, domain: DomainName) -> Self {
        Self { name, domain }
    }
}

impl Entity for Tenant {
    type Id = TenantName;

    fn id(&self) -> &Self::Id {
        &self.name
    }
}

/// An application owned by exactly one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Application {
    pub tenant: TenantName,
    pub name: ApplicationName,
}

impl Entity for Application {
    type Id = ApplicationName;

    fn id(&self) -> &Self::Id {
        &self.name
    }
}

/// Failure of the directory backend itself.
///
/// Unknown tenants or applications are *not* errors; lookups report them as
/// `None`/`false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("membership directory unavailable: {0}")]
    Unavailable(String),

    #[error("membership directory backend error: {0}")]
    Backend(String),
}

/// Lookups of one resolution, pinned to a single directory state.
pub enum DirectoryView<'a> {
    /// The directory is immutable for as long as it is borrowed.
    Borrowed(&'a (dyn MembershipDirectory + 'a)),
    /// A published state that later writes cannot touch.
    Pinned(Arc<dyn MembershipDirectory>),
}

impl<'a> core::ops::Deref for DirectoryView<'a> {
    type Target = dyn MembershipDirectory + 'a;

    fn deref(&self) -> &Self::Target {
        match self {
            DirectoryView::Borrowed(directory) => *directory,
            DirectoryView::Pinned(directory) => directory.as_ref(),
        }
    }
}

impl core::fmt::Debug for DirectoryView<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DirectoryView::Borrowed(_) => f.write_str("DirectoryView::Borrowed"),
            DirectoryView::Pinned(_) => f.write_str("DirectoryView::Pinned"),
        }
    }
}

/// Read-only membership lookups.
///
/// Implementations own their own synchronization. Every lookup made through
/// one [`DirectoryView`] must observe the same state: a resolution calls
/// [`MembershipDirectory::view`] once and never mixes states published before
/// and after a concurrent write.
pub trait MembershipDirectory: Send + Sync {
    /// Pin the state that all lookups of one resolution run against.
    ///
    /// Implementations that can change while borrowed must return
    /// [`DirectoryView::Pinned`].
    fn view(&self) -> Result<DirectoryView<'_>, DirectoryError>;

    fn is_operator(&self, principal: &Principal) -> Result<bool, DirectoryError>;

    fn resolve_tenant(&self, name: &TenantName) -> Result<Option<Tenant>, DirectoryError>;

    fn is_tenant_admin(&self, domain: &DomainName, principal: &Principal) -> Result<bool, DirectoryError>;

    fn is_pipeline_principal(
        &self,
        tenant: &TenantName,
        application: &ApplicationName,
        principal: &Principal,
    ) -> Result<bool, DirectoryError>;
}

impl<D> MembershipDirectory for &D
where
    D: MembershipDirectory + ?Sized,
{
    fn view(&self) -> Result<DirectoryView<'_>, DirectoryError> {
        (**self).view()
    }

    fn is_operator(&self, principal: &Principal) -> Result<bool, DirectoryError> {
        (**self).is_operator(principal)
    }

    fn resolve_tenant(&self, name: &TenantName) -> Result<Option<Tenant>, DirectoryError> {
        (**self).resolve_tenant(name)
    }

    fn is_tenant_admin(&self, domain: &DomainName, principal: &Principal) -> Result<bool, DirectoryError> {
        (**self).is_tenant_admin(domain, principal)
    }

    fn is_pipeline_principal(
        &self,
        tenant: &TenantName,
        application: &ApplicationName,
        principal: &Principal,
    ) -> Result<bool, DirectoryError> {
        (**self).is_pipeline_principal(tenant, application, principal)
    }
}

impl<D> MembershipDirectory for Arc<D>
where
    D: MembershipDirectory + ?Sized,
{
    fn view(&self) -> Result<DirectoryView<'_>, DirectoryError> {
        (**self).view()
    }

    fn is_operator(&self, principal: &Principal) -> Result<bool, DirectoryError> {
        (**self).is_operator(principal)
    }

    fn resolve_tenant(&self, name: &TenantName) -> Result<Option<Tenant>, DirectoryError> {
        (**self).resolve_tenant(name)
    }

    fn is_tenant_admin(&self, domain: &DomainName, principal: &Principal) -> Result<bool, DirectoryError> {
        (**self).is_tenant_admin(domain, principal)
    }

    fn is_pipeline_principal(
        &self,
        tenant: &TenantName,
        application: &ApplicationName,
        principal: &Principal,
    ) -> Result<bool, DirectoryError> {
        (**self).is_pipeline_principal(tenant, application, principal)
    }
}

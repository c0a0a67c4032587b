use std::collections::{HashMap, HashSet};

use tenantgate_auth::{Application, DirectoryError, DirectoryView, MembershipDirectory, Principal, Tenant};
use tenantgate_core::{ApplicationName, DomainError, DomainName, DomainResult, Entity, TenantName};

/// Point-in-time membership state.
///
/// Immutable once published by [`super::InMemoryMembershipDirectory`]; a
/// resolver holding an `Arc<DirectorySnapshot>` sees one consistent state for
/// all of its lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    operators: HashSet<Principal>,
    tenants: HashMap<TenantName, Tenant>,
    applications: HashMap<TenantName, HashSet<ApplicationName>>,
    tenant_admins: HashMap<DomainName, HashSet<Principal>>,
    pipeline_principals: HashMap<(TenantName, ApplicationName), HashSet<Principal>>,
}

impl DirectorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tenant(&self, name: &TenantName) -> Option<&Tenant> {
        self.tenants.get(name)
    }

    /// Tenants sorted by name.
    pub fn tenants(&self) -> Vec<&Tenant> {
        let mut tenants: Vec<&Tenant> = self.tenants.values().collect();
        tenants.sort_by(|a, b| a.id().cmp(b.id()));
        tenants
    }

    /// Applications of `tenant`, sorted by name. Empty for unknown tenants.
    pub fn applications(&self, tenant: &TenantName) -> Vec<Application> {
        let mut apps: Vec<Application> = self
            .applications
            .get(tenant)
            .into_iter()
            .flatten()
            .map(|name| Application {
                tenant: tenant.clone(),
                name: name.clone(),
            })
            .collect();
        apps.sort_by(|a, b| a.id().cmp(b.id()));
        apps
    }

    pub fn has_application(&self, tenant: &TenantName, application: &ApplicationName) -> bool {
        self.applications
            .get(tenant)
            .is_some_and(|apps| apps.contains(application))
    }

    pub(crate) fn add_operator(&mut self, principal: Principal) -> bool {
        self.operators.insert(principal)
    }

    pub(crate) fn create_tenant(&mut self, name: TenantName, domain: DomainName) -> DomainResult<Tenant> {
        if self.tenants.contains_key(&name) {
            return Err(DomainError::conflict(format!("tenant '{name}' already exists")));
        }
        let tenant = Tenant::new(name.clone(), domain);
        self.tenants.insert(name.clone(), tenant.clone());
        self.applications.insert(name, HashSet::new());
        Ok(tenant)
    }

    /// Removes the tenant with its applications and their pipeline memberships.
    ///
    /// Admin sets stay: they belong to the domain, which outlives the tenant.
    pub(crate) fn remove_tenant(&mut self, name: &TenantName) -> DomainResult<Tenant> {
        let tenant = self
            .tenants
            .remove(name)
            .ok_or_else(|| DomainError::not_found(format!("tenant '{name}'")))?;
        self.applications.remove(name);
        self.pipeline_principals.retain(|(t, _), _| t != name);
        Ok(tenant)
    }

    pub(crate) fn create_application(
        &mut self,
        tenant: &TenantName,
        name: ApplicationName,
    ) -> DomainResult<Application> {
        let apps = self
            .applications
            .get_mut(tenant)
            .ok_or_else(|| DomainError::not_found(format!("tenant '{tenant}'")))?;
        if !apps.insert(name.clone()) {
            return Err(DomainError::conflict(format!(
                "application '{name}' already exists in tenant '{tenant}'"
            )));
        }
        Ok(Application {
            tenant: tenant.clone(),
            name,
        })
    }

    pub(crate) fn remove_application(
        &mut self,
        tenant: &TenantName,
        name: &ApplicationName,
    ) -> DomainResult<()> {
        let removed = self
            .applications
            .get_mut(tenant)
            .is_some_and(|apps| apps.remove(name));
        if !removed {
            return Err(DomainError::not_found(format!(
                "application '{name}' in tenant '{tenant}'"
            )));
        }
        self.pipeline_principals.remove(&(tenant.clone(), name.clone()));
        Ok(())
    }

    pub(crate) fn add_tenant_admin(&mut self, domain: DomainName, principal: Principal) -> bool {
        self.tenant_admins.entry(domain).or_default().insert(principal)
    }

    pub(crate) fn add_pipeline_principal(
        &mut self,
        tenant: &TenantName,
        application: &ApplicationName,
        principal: Principal,
    ) -> DomainResult<bool> {
        if !self.has_application(tenant, application) {
            return Err(DomainError::not_found(format!(
                "application '{application}' in tenant '{tenant}'"
            )));
        }
        Ok(self
            .pipeline_principals
            .entry((tenant.clone(), application.clone()))
            .or_default()
            .insert(principal))
    }
}

impl MembershipDirectory for DirectorySnapshot {
    fn view(&self) -> Result<DirectoryView<'_>, DirectoryError> {
        Ok(DirectoryView::Borrowed(self))
    }

    fn is_operator(&self, principal: &Principal) -> Result<bool, DirectoryError> {
        Ok(self.operators.contains(principal))
    }

    fn resolve_tenant(&self, name: &TenantName) -> Result<Option<Tenant>, DirectoryError> {
        Ok(self.tenants.get(name).cloned())
    }

    fn is_tenant_admin(&self, domain: &DomainName, principal: &Principal) -> Result<bool, DirectoryError> {
        Ok(self
            .tenant_admins
            .get(domain)
            .is_some_and(|admins| admins.contains(principal)))
    }

    fn is_pipeline_principal(
        &self,
        tenant: &TenantName,
        application: &ApplicationName,
        principal: &Principal,
    ) -> Result<bool, DirectoryError> {
        Ok(self
            .pipeline_principals
            .get(&(tenant.clone(), application.clone()))
            .is_some_and(|members| members.contains(principal)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(name: &str) -> TenantName {
        TenantName::parse(name).unwrap()
    }

    fn a(name: &str) -> ApplicationName {
        ApplicationName::parse(name).unwrap()
    }

    fn d(name: &str) -> DomainName {
        DomainName::parse(name).unwrap()
    }

    #[test]
    fn duplicate_tenant_is_conflict() {
        let mut snap = DirectorySnapshot::new();
        snap.create_tenant(t("mytenant"), d("tenantdomain")).unwrap();
        let err = snap.create_tenant(t("mytenant"), d("other")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn application_requires_tenant() {
        let mut snap = DirectorySnapshot::new();
        let err = snap.create_application(&t("ghost"), a("myapp")).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn pipeline_requires_application() {
        let mut snap = DirectorySnapshot::new();
        snap.create_tenant(t("mytenant"), d("tenantdomain")).unwrap();
        let err = snap
            .add_pipeline_principal(&t("mytenant"), &a("myapp"), Principal::user("ci"))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn removing_tenant_drops_pipelines_but_keeps_domain_admins() {
        let mut snap = DirectorySnapshot::new();
        let admin = Principal::user("alice");
        let ci = Principal::user("ci");
        snap.create_tenant(t("mytenant"), d("tenantdomain")).unwrap();
        snap.create_application(&t("mytenant"), a("myapp")).unwrap();
        snap.add_pipeline_principal(&t("mytenant"), &a("myapp"), ci.clone()).unwrap();
        snap.add_tenant_admin(d("tenantdomain"), admin.clone());

        snap.remove_tenant(&t("mytenant")).unwrap();

        assert_eq!(snap.resolve_tenant(&t("mytenant")).unwrap(), None);
        assert!(!snap.is_pipeline_principal(&t("mytenant"), &a("myapp"), &ci).unwrap());
        assert!(snap.is_tenant_admin(&d("tenantdomain"), &admin).unwrap());

        // Recreating the tenant does not resurrect old pipeline memberships.
        snap.create_tenant(t("mytenant"), d("tenantdomain")).unwrap();
        snap.create_application(&t("mytenant"), a("myapp")).unwrap();
        assert!(!snap.is_pipeline_principal(&t("mytenant"), &a("myapp"), &ci).unwrap());
    }

    #[test]
    fn listings_are_sorted() {
        let mut snap = DirectorySnapshot::new();
        snap.create_tenant(t("zeta"), d("z")).unwrap();
        snap.create_tenant(t("alpha"), d("a")).unwrap();
        snap.create_application(&t("alpha"), a("web")).unwrap();
        snap.create_application(&t("alpha"), a("api")).unwrap();

        let names: Vec<&str> = snap.tenants().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        let apps: Vec<String> = snap
            .applications(&t("alpha"))
            .into_iter()
            .map(|app| app.name.to_string())
            .collect();
        assert_eq!(apps, vec!["api", "web"]);
        assert!(snap.applications(&t("ghost")).is_empty());
    }

    #[test]
    fn remove_application_is_not_found_twice() {
        let mut snap = DirectorySnapshot::new();
        snap.create_tenant(t("mytenant"), d("tenantdomain")).unwrap();
        snap.create_application(&t("mytenant"), a("myapp")).unwrap();
        snap.remove_application(&t("mytenant"), &a("myapp")).unwrap();
        assert!(matches!(
            snap.remove_application(&t("mytenant"), &a("myapp")),
            Err(DomainError::NotFound(_))
        ));
    }
}

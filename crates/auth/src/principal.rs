use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tenantgate_core::DomainName;

/// Fully qualified identity of an authenticated principal.
///
/// The value is opaque at this layer: it is compared, hashed and logged, never
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PrincipalId(Arc<str>);

impl PrincipalId {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PrincipalId {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<PrincipalId> for String {
    fn from(value: PrincipalId) -> Self {
        value.0.to_string()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a principal is a human or an automated identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    User,
    /// Service or build-pipeline identity.
    Service,
}

/// An authenticated caller, as handed over by the authentication layer.
///
/// Two principals are the same iff both identity and kind match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Principal {
    id: PrincipalId,
    kind: PrincipalKind,
}

/// Domain that human users live under.
pub const USER_DOMAIN: &str = "user";

impl Principal {
    pub fn new(id: PrincipalId, kind: PrincipalKind) -> Self {
        Self { id, kind }
    }

    /// A human user, qualified as `user.<name>`.
    pub fn user(name: &str) -> Self {
        Self::new(PrincipalId::new(format!("{USER_DOMAIN}.{name}")), PrincipalKind::User)
    }

    /// A service identity, qualified as `<domain>.<name>`.
    pub fn service(domain: &DomainName, name: &str) -> Self {
        Self::new(PrincipalId::new(format!("{domain}.{name}")), PrincipalKind::Service)
    }

    pub fn id(&self) -> &PrincipalId {
        &self.id
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }
}

impl core::fmt::Display for Principal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.id, f)
    }
}

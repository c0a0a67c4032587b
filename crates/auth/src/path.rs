//! Request path → resource scope.

use serde::{Deserialize, Serialize};

use tenantgate_core::{ApplicationName, TenantName};

use crate::config::{ConfigError, PathMatcherConfig, is_dot_segment};

/// Paths longer than this are never classified.
pub const MAX_PATH_LEN: usize = 4096;

/// Resource scope implied by a request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum PathScope {
    /// No tenant in the path.
    #[default]
    None,
    Tenant {
        tenant: TenantName,
    },
    Application {
        tenant: TenantName,
        application: ApplicationName,
    },
}

impl PathScope {
    pub fn tenant(&self) -> Option<&TenantName> {
        match self {
            PathScope::None => None,
            PathScope::Tenant { tenant } | PathScope::Application { tenant, .. } => Some(tenant),
        }
    }

    pub fn application(&self) -> Option<&ApplicationName> {
        match self {
            PathScope::Application { application, .. } => Some(application),
            _ => None,
        }
    }
}

impl core::fmt::Display for PathScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PathScope::None => f.write_str("None"),
            PathScope::Tenant { tenant } => write!(f, "Tenant({tenant})"),
            PathScope::Application {
                tenant,
                application,
            } => write!(f, "Application({tenant}, {application})"),
        }
    }
}

/// Structural matcher for tenant and application paths.
///
/// Recognised shapes (anything may follow the last name segment):
/// - `<prefix>/<tenant-marker>/<tenant>`
/// - `<prefix>/<tenant-marker>/<tenant>/<application-marker>/<application>`
///
/// Query and fragment are ignored, as are empty segments. Paths containing a
/// dot segment (`.`, `..`, or their percent-encoded forms) never match, since
/// a router normalizing them could reach a different tenant than the one named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    prefix: Vec<String>,
    tenant_marker: String,
    application_marker: String,
}

impl PathMatcher {
    pub fn new(config: PathMatcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: PathMatcherConfig) -> Self {
        Self {
            prefix: config.prefix_segments(),
            tenant_marker: config.tenant_marker,
            application_marker: config.application_marker,
        }
    }

    /// Classify a request path. Never fails: anything unrecognised is [`PathScope::None`].
    pub fn match_path(&self, path: &str) -> PathScope {
        if path.len() > MAX_PATH_LEN || !path.is_ascii() || !path.starts_with('/') {
            return PathScope::None;
        }
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if path.split('/').any(is_dot_segment) {
            return PathScope::None;
        }

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        for expected in &self.prefix {
            if segments.next() != Some(expected.as_str()) {
                return PathScope::None;
            }
        }
        if segments.next() != Some(self.tenant_marker.as_str()) {
            return PathScope::None;
        }
        let Some(tenant) = segments.next().and_then(|s| TenantName::parse(s).ok()) else {
            return PathScope::None;
        };

        if segments.next() == Some(self.application_marker.as_str()) {
            if let Some(application) = segments.next().and_then(|s| ApplicationName::parse(s).ok()) {
                return PathScope::Application {
                    tenant,
                    application,
                };
            }
        }
        PathScope::Tenant { tenant }
    }
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::from_validated(PathMatcherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tenant(name: &str) -> PathScope {
        PathScope::Tenant {
            tenant: TenantName::parse(name).unwrap(),
        }
    }

    fn application(t: &str, a: &str) -> PathScope {
        PathScope::Application {
            tenant: TenantName::parse(t).unwrap(),
            application: ApplicationName::parse(a).unwrap(),
        }
    }

    #[test]
    fn prefix_alone_has_no_scope() {
        let matcher = PathMatcher::default();
        assert_eq!(matcher.match_path("/application/v4/"), PathScope::None);
        assert_eq!(matcher.match_path("/application/v4"), PathScope::None);
        assert_eq!(matcher.match_path("/"), PathScope::None);
        assert_eq!(matcher.match_path(""), PathScope::None);
    }

    #[test]
    fn tenant_paths() {
        let matcher = PathMatcher::default();
        assert_eq!(matcher.match_path("/application/v4/tenant/mytenant/"), tenant("mytenant"));
        assert_eq!(matcher.match_path("/application/v4/tenant/mytenant"), tenant("mytenant"));
        assert_eq!(
            matcher.match_path("/application/v4/tenant/mytenant/info?x=1"),
            tenant("mytenant")
        );
    }

    #[test]
    fn application_paths() {
        let matcher = PathMatcher::default();
        assert_eq!(
            matcher.match_path("/application/v4/tenant/mytenant/application/myapp/"),
            application("mytenant", "myapp")
        );
        assert_eq!(
            matcher.match_path("/application/v4/tenant/mytenant/application/myapp/instance/default/deploy"),
            application("mytenant", "myapp")
        );
    }

    #[test]
    fn application_marker_without_name_stays_at_tenant() {
        let matcher = PathMatcher::default();
        assert_eq!(
            matcher.match_path("/application/v4/tenant/mytenant/application/"),
            tenant("mytenant")
        );
        assert_eq!(
            matcher.match_path("/application/v4/tenant/mytenant/application/my%20app"),
            tenant("mytenant")
        );
    }

    #[test]
    fn wrong_prefix_or_marker_has_no_scope() {
        let matcher = PathMatcher::default();
        assert_eq!(matcher.match_path("/application/v3/tenant/mytenant/"), PathScope::None);
        assert_eq!(matcher.match_path("/application/v4/tenants/mytenant/"), PathScope::None);
        assert_eq!(matcher.match_path("/tenant/mytenant/"), PathScope::None);
        assert_eq!(matcher.match_path("application/v4/tenant/mytenant/"), PathScope::None);
    }

    #[test]
    fn invalid_tenant_name_has_no_scope() {
        let matcher = PathMatcher::default();
        assert_eq!(matcher.match_path("/application/v4/tenant/my%2Ftenant/"), PathScope::None);
        assert_eq!(matcher.match_path("/application/v4/tenant/"), PathScope::None);
    }

    #[test]
    fn dot_segments_never_match() {
        let matcher = PathMatcher::default();
        assert_eq!(
            matcher.match_path("/application/v4/tenant/mytenant/../othertenant/"),
            PathScope::None
        );
        assert_eq!(
            matcher.match_path("/application/v4/tenant/mytenant/%2E%2e/othertenant/"),
            PathScope::None
        );
        assert_eq!(matcher.match_path("/application/v4/./tenant/mytenant/"), PathScope::None);
    }

    #[test]
    fn non_ascii_and_oversized_paths_have_no_scope() {
        let matcher = PathMatcher::default();
        assert_eq!(matcher.match_path("/application/v4/tenant/mytenänt/"), PathScope::None);
        let long = format!("/application/v4/tenant/mytenant/{}", "a".repeat(MAX_PATH_LEN));
        assert_eq!(matcher.match_path(&long), PathScope::None);
    }

    #[test]
    fn default_matches_default_config() {
        assert_eq!(
            PathMatcher::default(),
            PathMatcher::new(PathMatcherConfig::default()).unwrap()
        );
    }

    #[test]
    fn dot_segment_prefix_is_rejected_up_front() {
        let err = PathMatcher::new(PathMatcherConfig {
            prefix: "/api/%2e/v1".to_string(),
            ..PathMatcherConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrefix(_)));
    }

    #[test]
    fn custom_markers_without_prefix() {
        let matcher = PathMatcher::new(PathMatcherConfig {
            prefix: String::new(),
            tenant_marker: "t".to_string(),
            application_marker: "app".to_string(),
        })
        .unwrap();
        assert_eq!(matcher.match_path("/t/acme/app/web"), application("acme", "web"));
        assert_eq!(matcher.match_path("/tenant/acme/"), PathScope::None);
    }

    #[test]
    fn duplicate_slashes_are_collapsed() {
        let matcher = PathMatcher::default();
        assert_eq!(
            matcher.match_path("//application//v4/tenant//mytenant///application/myapp"),
            application("mytenant", "myapp")
        );
    }

    #[test]
    fn scope_display() {
        assert_eq!(PathScope::None.to_string(), "None");
        assert_eq!(tenant("mytenant").to_string(), "Tenant(mytenant)");
        assert_eq!(application("mytenant", "myapp").to_string(), "Application(mytenant, myapp)");
    }

    proptest! {
        #[test]
        fn never_panics(path in ".{0,200}") {
            let _ = PathMatcher::default().match_path(&path);
        }

        #[test]
        fn scoped_matches_name_the_path_segments(
            t in "[a-z][a-z0-9-]{0,20}",
            a in "[a-z][a-z0-9-]{0,20}",
            rest in "(/[a-z0-9]{1,8}){0,3}",
        ) {
            let matcher = PathMatcher::default();
            let path = format!("/application/v4/tenant/{t}/application/{a}{rest}");
            prop_assert_eq!(matcher.match_path(&path), application(&t, &a));
        }
    }
}

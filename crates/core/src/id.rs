//! Strongly-typed names used across the control plane.
//!
//! Names are validated on construction, so a `TenantName` held anywhere in the
//! system is always a well-formed path segment.

use core::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Upper bound on the length of any name.
pub const MAX_NAME_LEN: usize = 256;

/// Name of a tenant (multi-tenant boundary).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantName(Arc<str>);

/// Name of an application, unique within its tenant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationName(Arc<str>);

/// Administrative domain backing a tenant's admin set.
///
/// Domains are dotted (`vespa.tenant.mydomain`), so they accept `.` where tenant
/// and application names do not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(Arc<str>);

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn validate_segment(kind: &str, s: &str) -> Result<(), DomainError> {
    if s.is_empty() || s.len() > MAX_NAME_LEN {
        return Err(DomainError::invalid_id(format!(
            "{kind}: length must be 1..={MAX_NAME_LEN}, got {}",
            s.len()
        )));
    }
    if let Some(c) = s.chars().find(|c| !is_segment_char(*c)) {
        return Err(DomainError::invalid_id(format!("{kind}: illegal character {c:?}")));
    }
    Ok(())
}

fn validate_domain(kind: &str, s: &str) -> Result<(), DomainError> {
    if s.is_empty() || s.len() > MAX_NAME_LEN {
        return Err(DomainError::invalid_id(format!(
            "{kind}: length must be 1..={MAX_NAME_LEN}, got {}",
            s.len()
        )));
    }
    if s.starts_with('.') || s.ends_with('.') {
        return Err(DomainError::invalid_id(format!(
            "{kind}: must not start or end with '.'"
        )));
    }
    if let Some(c) = s.chars().find(|c| !(is_segment_char(*c) || *c == '.')) {
        return Err(DomainError::invalid_id(format!("{kind}: illegal character {c:?}")));
    }
    Ok(())
}

macro_rules! impl_name_newtype {
    ($t:ty, $name:literal, $validate:path) => {
        impl $t {
            /// Parse and validate a name.
            pub fn parse(s: &str) -> Result<Self, DomainError> {
                $validate($name, s)?;
                Ok(Self(Arc::from(s)))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0.to_string()
            }
        }
    };
}

impl_name_newtype!(TenantName, "TenantName", validate_segment);
impl_name_newtype!(ApplicationName, "ApplicationName", validate_segment);
impl_name_newtype!(DomainName, "DomainName", validate_domain);

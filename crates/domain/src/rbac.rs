use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, PermissionId, PolicyId, RoleId, TenantId};

/// Separator between the parts of a permission key's canonical text form.
pub const KEY_SEPARATOR: char = ':';

const PART_MIN_LEN: usize = 2;
const SERVICE_MAX_LEN: usize = 100;
const ENTITY_MAX_LEN: usize = 100;
const ACTION_MAX_LEN: usize = 50;

/// Validated `(service, entity, action)` triple identifying a permission.
///
/// The canonical text form is `service:entity:action`, which is why no part
/// may contain the separator character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PermissionKey {
    service: String,
    entity: String,
    action: String,
}

impl PermissionKey {
    /// Creates a key after validating each part.
    pub fn new(
        service: impl Into<String>,
        entity: impl Into<String>,
        action: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            service: validate_part("service", service.into(), SERVICE_MAX_LEN)?,
            entity: validate_part("entity", entity.into(), ENTITY_MAX_LEN)?,
            action: validate_part("action", action.into(), ACTION_MAX_LEN)?,
        })
    }

    /// Returns the service part of the key.
    #[must_use]
    pub fn service(&self) -> &str {
        self.service.as_str()
    }

    /// Returns the entity part of the key.
    #[must_use]
    pub fn entity(&self) -> &str {
        self.entity.as_str()
    }

    /// Returns the action part of the key.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
            self.service, self.entity, self.action
        )
    }
}

fn validate_part(name: &str, value: String, max_len: usize) -> AppResult<String> {
    let value = value.trim().to_owned();

    if value.len() < PART_MIN_LEN {
        return Err(AppError::Validation(format!(
            "permission {name} must be at least {PART_MIN_LEN} characters"
        )));
    }

    if value.len() > max_len {
        return Err(AppError::Validation(format!(
            "permission {name} must be at most {max_len} characters"
        )));
    }

    if value.contains(KEY_SEPARATOR) {
        return Err(AppError::Validation(format!(
            "permission {name} must not contain '{KEY_SEPARATOR}'"
        )));
    }

    Ok(value)
}

/// An atomic access right in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    /// Stable permission identifier.
    pub id: PermissionId,
    /// Globally-unique permission key.
    pub key: PermissionKey,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A named, reusable group of permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Stable policy identifier.
    pub id: PolicyId,
    /// Policy name.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Owning tenant; `None` marks a system-level policy shared across tenants.
    pub tenant_id: Option<TenantId>,
    /// Indicates a system-managed policy.
    pub is_system: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Where a role may be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    /// Held by tenant memberships.
    Tenant,
    /// Usable only by platform tooling, never by a membership.
    Platform,
}

impl RoleKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Platform => "platform",
        }
    }
}

impl FromStr for RoleKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tenant" => Ok(Self::Tenant),
            "platform" => Ok(Self::Platform),
            _ => Err(AppError::Validation(format!(
                "unknown role kind '{value}'"
            ))),
        }
    }
}

/// A named, assignable group of policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Scope in which the role may be held.
    pub kind: RoleKind,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Owning tenant; `None` marks a system-level role shared across tenants.
    pub tenant_id: Option<TenantId>,
    /// Indicates a system-managed role.
    pub is_system: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{PermissionKey, RoleKind};

    #[test]
    fn key_formats_with_separator() {
        let key = PermissionKey::new("blog-api", "post", "publish");
        assert_eq!(
            key.ok().map(|key| key.to_string()),
            Some("blog-api:post:publish".to_owned())
        );
    }

    #[test]
    fn key_rejects_separator_in_parts() {
        let key = PermissionKey::new("blog:api", "post", "publish");
        assert!(key.is_err());
    }

    #[test]
    fn key_rejects_short_parts() {
        let key = PermissionKey::new("blog-api", "p", "publish");
        assert!(key.is_err());
    }

    #[test]
    fn key_rejects_whitespace_only_parts() {
        let key = PermissionKey::new("blog-api", "   ", "publish");
        assert!(key.is_err());
    }

    #[test]
    fn key_rejects_overlong_action() {
        let key = PermissionKey::new("blog-api", "post", "a".repeat(51));
        assert!(key.is_err());
    }

    #[test]
    fn role_kind_roundtrip_storage_value() {
        let kind = RoleKind::Platform;
        assert_eq!(RoleKind::from_str(kind.as_str()).ok(), Some(kind));
    }

    proptest! {
        #[test]
        fn valid_parts_roundtrip_through_canonical_form(
            service in "[a-z][a-z0-9-]{1,30}",
            entity in "[a-z][a-z0-9_]{1,30}",
            action in "[a-z][a-z0-9]{1,20}",
        ) {
            let key = PermissionKey::new(service.as_str(), entity.as_str(), action.as_str());
            prop_assert!(key.is_ok());

            if let Ok(key) = key {
                let rendered = key.to_string();
                let parts: Vec<&str> = rendered.split(':').collect();
                prop_assert_eq!(parts, vec![service.as_str(), entity.as_str(), action.as_str()]);
            }
        }
    }
}

use chrono::{DateTime, Utc};

/// Registry entry marking a user as exempt from tenant-scoped checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformAdmin {
    /// Upstream-verified user id.
    pub user_id: String,
    /// User id of the admin that created this entry; `None` for the
    /// out-of-band bootstrap entry.
    pub created_by: Option<String>,
    /// Timestamp the entry was created.
    pub created_at: DateTime<Utc>,
}

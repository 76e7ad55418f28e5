use serde::{Deserialize, Serialize};

/// Caller identity established upstream by the identity provider.
///
/// Warden never verifies credentials itself; the gateway in front of the API
/// forwards an already-verified user id with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: String,
}

impl UserIdentity {
    /// Creates an identity from an upstream-verified user id.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// Returns the stable user id supplied by the identity provider.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }
}

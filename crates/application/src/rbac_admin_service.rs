use std::sync::Arc;

use warden_core::{AppError, AppResult};

use crate::{PlatformAdminService, RbacRepository};

mod permissions;
mod policies;
mod roles;

#[cfg(test)]
mod tests;

const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 100;
const DESCRIPTION_MAX_LEN: usize = 500;

/// Application service for administering the permission catalog and the
/// policy/role graph. Every operation requires a platform admin actor.
#[derive(Clone)]
pub struct RbacAdminService {
    repository: Arc<dyn RbacRepository>,
    platform_admin_service: PlatformAdminService,
}

impl RbacAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn RbacRepository>,
        platform_admin_service: PlatformAdminService,
    ) -> Self {
        Self {
            repository,
            platform_admin_service,
        }
    }
}

fn validated_name(value: String) -> AppResult<String> {
    let value = value.trim().to_owned();

    if value.len() < NAME_MIN_LEN {
        return Err(AppError::Validation(format!(
            "name must be at least {NAME_MIN_LEN} characters"
        )));
    }

    if value.len() > NAME_MAX_LEN {
        return Err(AppError::Validation(format!(
            "name must be at most {NAME_MAX_LEN} characters"
        )));
    }

    Ok(value)
}

fn validated_description(value: Option<String>) -> AppResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    if value.len() > DESCRIPTION_MAX_LEN {
        return Err(AppError::Validation(format!(
            "description must be at most {DESCRIPTION_MAX_LEN} characters"
        )));
    }

    Ok(Some(value))
}

use warden_application::{
    AuthorizationService, MembershipService, PlatformAdminService, RbacAdminService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub rbac_admin_service: RbacAdminService,
    pub membership_service: MembershipService,
    pub platform_admin_service: PlatformAdminService,
}

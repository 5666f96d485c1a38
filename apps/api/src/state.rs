use std::sync::Arc;

use rollcall_application::{AccessRequestService, RoleService, UserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_request_service: AccessRequestService,
    pub role_service: RoleService,
    pub user_repository: Arc<dyn UserRepository>,
    pub postgres_pool: sqlx::PgPool,
}

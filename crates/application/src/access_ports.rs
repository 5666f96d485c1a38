//! Repository ports for the access-control workflow.
//!
//! The core logic depends only on these narrow read/write interfaces, never
//! on a concrete store. The approval orchestrator additionally drives an
//! explicit transaction handle ([`AccessRequestTransaction`]) so its
//! multi-statement sequence executes as one atomic unit.

use async_trait::async_trait;

use rollcall_core::{AppResult, OrgId};
use rollcall_domain::{AccessRequest, AccessRequestStatus, Edipi, Org, RequestId, Role, RoleId, User};

/// Requesting-user projection embedded in pending-request listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterSummary {
    /// Stable external identifier.
    pub edipi: Edipi,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Pending-request listing row with embedded user and organization.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessRequestRecord {
    /// The request itself.
    pub request: AccessRequest,
    /// Requesting user projection.
    pub requester: RequesterSummary,
    /// Target organization.
    pub org: Org,
}

/// Lookup port for the organization directory.
#[async_trait]
pub trait OrgRepository: Send + Sync {
    /// Finds an organization by id, with its contact.
    async fn find_org(&self, org_id: OrgId) -> AppResult<Option<Org>>;
}

/// Lookup port for the user directory.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by EDIPI with their role memberships across all
    /// organizations, roles loaded with full permissions.
    async fn find_user_with_roles(&self, edipi: &Edipi) -> AppResult<Option<User>>;
}

/// Read/write port for the role catalog.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists roles owned by an organization.
    async fn list_roles(&self, org_id: OrgId) -> AppResult<Vec<Role>>;

    /// Finds a role by id in organization scope.
    async fn find_role(&self, org_id: OrgId, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Persists a new role.
    async fn insert_role(&self, role: &Role) -> AppResult<()>;

    /// Replaces an existing role; fails with not-found if absent.
    async fn update_role(&self, role: &Role) -> AppResult<()>;

    /// Deletes a role; fails with conflict while memberships reference it.
    async fn delete_role(&self, org_id: OrgId, role_id: RoleId) -> AppResult<()>;
}

/// Read/write port for access requests, including the transactional handle
/// used by the approval and issuance paths.
#[async_trait]
pub trait AccessRequestRepository: Send + Sync {
    /// Lists pending requests for an organization with embedded user and
    /// organization projections.
    async fn list_pending(&self, org_id: OrgId) -> AppResult<Vec<AccessRequestRecord>>;

    /// Finds the single request a user has open against an organization.
    async fn find_for_user(&self, org_id: OrgId, edipi: &Edipi)
    -> AppResult<Option<AccessRequest>>;

    /// Finds a request by id in organization scope.
    async fn find_by_id(
        &self,
        org_id: OrgId,
        request_id: RequestId,
    ) -> AppResult<Option<AccessRequest>>;

    /// Deletes a request row.
    async fn delete(&self, request_id: RequestId) -> AppResult<()>;

    /// Updates a request's lifecycle status; fails with not-found if absent.
    async fn set_status(&self, request_id: RequestId, status: AccessRequestStatus)
    -> AppResult<()>;

    /// Opens a transaction spanning requests, roles, and memberships.
    async fn begin(&self) -> AppResult<Box<dyn AccessRequestTransaction>>;
}

/// One open transaction over the access-control tables.
///
/// Dropping the handle without calling [`commit`](Self::commit) rolls back
/// every statement issued through it.
#[async_trait]
pub trait AccessRequestTransaction: Send {
    /// Finds a request by id in organization scope.
    async fn find_request(
        &mut self,
        org_id: OrgId,
        request_id: RequestId,
    ) -> AppResult<Option<AccessRequest>>;

    /// Finds the single request a user has open against an organization.
    async fn find_request_for_user(
        &mut self,
        org_id: OrgId,
        edipi: &Edipi,
    ) -> AppResult<Option<AccessRequest>>;

    /// Finds a role by id in organization scope.
    async fn find_role(&mut self, org_id: OrgId, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a user with their role memberships across all organizations.
    async fn find_user_with_roles(&mut self, edipi: &Edipi) -> AppResult<Option<User>>;

    /// Inserts a fresh request row.
    async fn insert_request(&mut self, request: &AccessRequest) -> AppResult<()>;

    /// Deletes a request row.
    async fn delete_request(&mut self, request_id: RequestId) -> AppResult<()>;

    /// Creates the membership granting `role_id` to `edipi` within the
    /// organization. A concurrent duplicate surfaces as a conflict.
    async fn insert_user_role(
        &mut self,
        edipi: &Edipi,
        org_id: OrgId,
        role_id: RoleId,
    ) -> AppResult<()>;

    /// Commits every statement issued through this handle.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

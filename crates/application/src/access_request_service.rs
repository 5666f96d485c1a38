//! Access-request workflow service.
//!
//! Orchestrates the request lifecycle: issue, cancel, deny, and the
//! transactional approval that converts a pending request into a role
//! membership.

use std::sync::Arc;

use rollcall_core::{AppError, AppResult, OrgId};
use rollcall_domain::{
    AccessRequest, AccessRequestStatus, Org, RequestId, Role, RoleId, User,
};

use crate::access_ports::{AccessRequestRecord, AccessRequestRepository, OrgRepository};

mod approve;
mod issue;

#[cfg(test)]
mod tests;

/// Record of a successfully approved request.
///
/// The request row is gone by the time this is returned; the struct is the
/// caller-facing receipt of what was processed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedRequest {
    /// The deleted request, as it stood when approved.
    pub request: AccessRequest,
    /// The role that was granted.
    pub role: Role,
}

/// Application service for the access-request workflow.
#[derive(Clone)]
pub struct AccessRequestService {
    orgs: Arc<dyn OrgRepository>,
    requests: Arc<dyn AccessRequestRepository>,
}

impl AccessRequestService {
    /// Creates the service from repository implementations.
    #[must_use]
    pub fn new(orgs: Arc<dyn OrgRepository>, requests: Arc<dyn AccessRequestRepository>) -> Self {
        Self { orgs, requests }
    }

    /// Lists pending requests for an organization. Requires the actor to
    /// hold a manage-group role in the organization.
    pub async fn list_pending(
        &self,
        actor: &User,
        org_id: OrgId,
    ) -> AppResult<Vec<AccessRequestRecord>> {
        self.require_org(org_id).await?;
        self.require_manage_group(actor, org_id)?;

        self.requests.list_pending(org_id).await
    }

    /// Cancels the actor's own request against an organization.
    pub async fn cancel(&self, actor: &User, org_id: OrgId) -> AppResult<()> {
        if !actor.registered {
            return Err(AppError::Validation("user is not registered".to_owned()));
        }

        self.require_org(org_id).await?;

        let request = self
            .requests
            .find_for_user(org_id, &actor.edipi)
            .await?
            .ok_or_else(|| AppError::NotFound("access request was not found".to_owned()))?;

        self.requests.delete(request.id).await
    }

    /// Denies a pending request. The row is kept with status denied so the
    /// requester can see the outcome until they cancel or re-issue.
    pub async fn deny(
        &self,
        actor: &User,
        org_id: OrgId,
        request_id: RequestId,
    ) -> AppResult<AccessRequest> {
        self.require_org(org_id).await?;
        self.require_manage_group(actor, org_id)?;

        let mut request = self
            .requests
            .find_by_id(org_id, request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("access request was not found".to_owned()))?;

        self.requests
            .set_status(request.id, AccessRequestStatus::Denied)
            .await?;

        request.status = AccessRequestStatus::Denied;
        Ok(request)
    }

    async fn require_org(&self, org_id: OrgId) -> AppResult<Org> {
        self.orgs
            .find_org(org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("organization was not found".to_owned()))
    }

    fn require_manage_group<'a>(&self, actor: &'a User, org_id: OrgId) -> AppResult<&'a Role> {
        actor
            .role_in(org_id)
            .filter(|role| role.capabilities.manage_group)
            .ok_or_else(|| {
                AppError::Forbidden(
                    "managing access requests requires the manage-group capability".to_owned(),
                )
            })
    }
}

use super::*;

impl AccessRequestService {
    /// Approves a pending request, granting the target role to the
    /// requesting user and consuming the request row.
    ///
    /// The whole sequence runs inside one transaction so two concurrent
    /// approvals of the same request cannot both succeed. One deliberate
    /// exception to all-or-nothing: when the requesting user already holds a
    /// role in the organization, the stale request row is deleted and that
    /// deletion is committed even though the operation reports failure. The
    /// row is orphaned state at that point, not something to preserve.
    pub async fn approve(
        &self,
        actor: &User,
        org_id: OrgId,
        request_id: RequestId,
        role_id: RoleId,
    ) -> AppResult<ApprovedRequest> {
        self.require_org(org_id).await?;
        self.require_manage_group(actor, org_id)?;

        let mut transaction = self.requests.begin().await?;

        let request = transaction
            .find_request(org_id, request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("access request was not found".to_owned()))?;

        let role = transaction
            .find_role(org_id, role_id)
            .await?
            .ok_or_else(|| AppError::NotFound("role was not found".to_owned()))?;

        let actor_role = actor.role_in(org_id).ok_or_else(|| {
            AppError::Unauthorized("approver holds no role in the organization".to_owned())
        })?;
        if !actor_role.is_superset_of(&role) {
            return Err(AppError::Unauthorized(
                "unable to assign a role with greater permissions than your current role"
                    .to_owned(),
            ));
        }

        let requester = transaction
            .find_user_with_roles(&request.edipi)
            .await?
            .ok_or_else(|| AppError::NotFound("user was not found".to_owned()))?;

        if requester.role_in(org_id).is_some() {
            // The request is stale: the user gained a role through another
            // path while it sat pending. Clean up the orphaned row and keep
            // that deletion even though the approval fails.
            transaction.delete_request(request.id).await?;
            transaction.commit().await?;

            return Err(AppError::Validation(
                "user already has a role in the organization".to_owned(),
            ));
        }

        transaction
            .insert_user_role(&request.edipi, org_id, role.id)
            .await?;
        transaction.delete_request(request.id).await?;
        transaction.commit().await?;

        Ok(ApprovedRequest { request, role })
    }
}

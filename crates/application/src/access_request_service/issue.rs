use super::*;

impl AccessRequestService {
    /// Issues a new access request from the actor against an organization.
    ///
    /// Runs inside one transaction: an outstanding pending request fails the
    /// operation, a denied request is deleted and replaced with a fresh
    /// pending row.
    pub async fn issue(&self, actor: &User, org_id: OrgId) -> AppResult<AccessRequest> {
        if !actor.registered {
            return Err(AppError::Validation("user is not registered".to_owned()));
        }

        self.require_org(org_id).await?;

        let mut transaction = self.requests.begin().await?;

        if let Some(existing) = transaction
            .find_request_for_user(org_id, &actor.edipi)
            .await?
        {
            match existing.status {
                AccessRequestStatus::Pending => {
                    return Err(AppError::Validation(
                        "the access request has already been issued".to_owned(),
                    ));
                }
                AccessRequestStatus::Denied => {
                    // Remove the denied request so a fresh one can be issued.
                    transaction.delete_request(existing.id).await?;
                }
            }
        }

        let request = AccessRequest::pending(org_id, actor.edipi.clone());
        transaction.insert_request(&request).await?;
        transaction.commit().await?;

        Ok(request)
    }
}

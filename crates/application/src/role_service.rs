//! Role catalog service.
//!
//! Reads and writes org-scoped roles. Every write path runs the draft
//! through [`Role::from_draft`] so persisted roles always satisfy the
//! capability derivation hierarchy and the PII/PHI column gates.

use std::sync::Arc;

use rollcall_core::{AppError, AppResult, NonEmptyString, OrgId};
use rollcall_domain::{Role, RoleDraft, RoleId, User, base_roster_columns};

use crate::access_ports::{OrgRepository, RoleRepository};


/// Application service for role administration.
#[derive(Clone)]
pub struct RoleService {
    orgs: Arc<dyn OrgRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl RoleService {
    /// Creates the service from repository implementations.
    #[must_use]
    pub fn new(orgs: Arc<dyn OrgRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { orgs, roles }
    }

    /// Lists the organization's roles.
    pub async fn list_roles(&self, actor: &User, org_id: OrgId) -> AppResult<Vec<Role>> {
        self.require_org(org_id).await?;
        self.require_manage_group(actor, org_id)?;

        self.roles.list_roles(org_id).await
    }

    /// Returns one role by id.
    pub async fn get_role(&self, actor: &User, org_id: OrgId, role_id: RoleId) -> AppResult<Role> {
        self.require_org(org_id).await?;
        self.require_manage_group(actor, org_id)?;

        self.roles
            .find_role(org_id, role_id)
            .await?
            .ok_or_else(|| AppError::NotFound("role was not found".to_owned()))
    }

    /// Creates a role from writer input, sanitized against the roster
    /// column catalog.
    pub async fn create_role(
        &self,
        actor: &User,
        org_id: OrgId,
        draft: RoleDraft,
    ) -> AppResult<Role> {
        self.require_org(org_id).await?;
        self.require_manage_group(actor, org_id)?;

        let draft = validated(draft)?;
        let role = Role::from_draft(RoleId::new(), org_id, draft, base_roster_columns());
        self.roles.insert_role(&role).await?;

        Ok(role)
    }

    /// Replaces an existing role, re-running sanitization on the new input.
    pub async fn update_role(
        &self,
        actor: &User,
        org_id: OrgId,
        role_id: RoleId,
        draft: RoleDraft,
    ) -> AppResult<Role> {
        self.require_org(org_id).await?;
        self.require_manage_group(actor, org_id)?;

        if self.roles.find_role(org_id, role_id).await?.is_none() {
            return Err(AppError::NotFound("role was not found".to_owned()));
        }

        let draft = validated(draft)?;
        let role = Role::from_draft(role_id, org_id, draft, base_roster_columns());
        self.roles.update_role(&role).await?;

        Ok(role)
    }

    /// Deletes a role. Fails with conflict while memberships reference it.
    pub async fn delete_role(&self, actor: &User, org_id: OrgId, role_id: RoleId) -> AppResult<()> {
        self.require_org(org_id).await?;
        self.require_manage_group(actor, org_id)?;

        if self.roles.find_role(org_id, role_id).await?.is_none() {
            return Err(AppError::NotFound("role was not found".to_owned()));
        }

        self.roles.delete_role(org_id, role_id).await
    }

    async fn require_org(&self, org_id: OrgId) -> AppResult<()> {
        self.orgs
            .find_org(org_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("organization was not found".to_owned()))
    }

    fn require_manage_group(&self, actor: &User, org_id: OrgId) -> AppResult<()> {
        actor
            .role_in(org_id)
            .filter(|role| role.capabilities.manage_group)
            .map(|_| ())
            .ok_or_else(|| {
                AppError::Forbidden(
                    "role administration requires the manage-group capability".to_owned(),
                )
            })
    }
}

fn validated(draft: RoleDraft) -> AppResult<RoleDraft> {
    let name = NonEmptyString::new(draft.name)?;
    Ok(RoleDraft {
        name: name.into(),
        ..draft
    })
}

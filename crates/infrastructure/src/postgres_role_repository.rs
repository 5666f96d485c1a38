use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use rollcall_application::RoleRepository;
use rollcall_core::{AppError, AppResult, OrgId};
use rollcall_domain::{CapabilitySet, PermissionMap, Role, RoleId};

/// PostgreSQL-backed repository for the role catalog.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    pub(crate) id: uuid::Uuid,
    pub(crate) org_id: uuid::Uuid,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) index_prefix: String,
    pub(crate) workspace_id: Option<uuid::Uuid>,
    pub(crate) can_manage_group: bool,
    pub(crate) can_manage_roster: bool,
    pub(crate) can_manage_workspace: bool,
    pub(crate) can_view_roster: bool,
    pub(crate) can_view_muster: bool,
    pub(crate) can_view_pii: bool,
    pub(crate) can_view_phi: bool,
    pub(crate) allowed_roster_columns: Json<PermissionMap>,
    pub(crate) allowed_notification_events: Json<PermissionMap>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: RoleId::from_uuid(row.id),
            org_id: OrgId::from_uuid(row.org_id),
            name: row.name,
            description: row.description,
            index_prefix: row.index_prefix,
            workspace_id: row.workspace_id,
            capabilities: CapabilitySet {
                manage_group: row.can_manage_group,
                manage_roster: row.can_manage_roster,
                manage_workspace: row.can_manage_workspace,
                view_roster: row.can_view_roster,
                view_muster: row.can_view_muster,
                view_pii: row.can_view_pii,
                view_phi: row.can_view_phi,
            },
            allowed_roster_columns: row.allowed_roster_columns.0,
            allowed_notification_events: row.allowed_notification_events.0,
        }
    }
}

pub(crate) const ROLE_COLUMNS: &str = "id, org_id, name, description, index_prefix, \
    workspace_id, can_manage_group, can_manage_roster, can_manage_workspace, \
    can_view_roster, can_view_muster, can_view_pii, can_view_phi, \
    allowed_roster_columns, allowed_notification_events";

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, org_id: OrgId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM role WHERE org_id = $1 ORDER BY name"
        ))
        .bind(org_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn find_role(&self, org_id: OrgId, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM role WHERE org_id = $1 AND id = $2"
        ))
        .bind(org_id.as_uuid())
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

        Ok(row.map(Role::from))
    }

    async fn insert_role(&self, role: &Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role (
                id, org_id, name, description, index_prefix, workspace_id,
                can_manage_group, can_manage_roster, can_manage_workspace,
                can_view_roster, can_view_muster, can_view_pii, can_view_phi,
                allowed_roster_columns, allowed_notification_events
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.org_id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.description.as_str())
        .bind(role.index_prefix.as_str())
        .bind(role.workspace_id)
        .bind(role.capabilities.manage_group)
        .bind(role.capabilities.manage_roster)
        .bind(role.capabilities.manage_workspace)
        .bind(role.capabilities.view_roster)
        .bind(role.capabilities.view_muster)
        .bind(role.capabilities.view_pii)
        .bind(role.capabilities.view_phi)
        .bind(Json(&role.allowed_roster_columns))
        .bind(Json(&role.allowed_notification_events))
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_name_conflict(error, role.name.as_str()))?;

        Ok(())
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE role SET
                name = $3,
                description = $4,
                index_prefix = $5,
                workspace_id = $6,
                can_manage_group = $7,
                can_manage_roster = $8,
                can_manage_workspace = $9,
                can_view_roster = $10,
                can_view_muster = $11,
                can_view_pii = $12,
                can_view_phi = $13,
                allowed_roster_columns = $14,
                allowed_notification_events = $15
            WHERE org_id = $1 AND id = $2
            "#,
        )
        .bind(role.org_id.as_uuid())
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.description.as_str())
        .bind(role.index_prefix.as_str())
        .bind(role.workspace_id)
        .bind(role.capabilities.manage_group)
        .bind(role.capabilities.manage_roster)
        .bind(role.capabilities.manage_workspace)
        .bind(role.capabilities.view_roster)
        .bind(role.capabilities.view_muster)
        .bind(role.capabilities.view_pii)
        .bind(role.capabilities.view_phi)
        .bind(Json(&role.allowed_roster_columns))
        .bind(Json(&role.allowed_notification_events))
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_name_conflict(error, role.name.as_str()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("role was not found".to_owned()));
        }

        Ok(())
    }

    async fn delete_role(&self, org_id: OrgId, role_id: RoleId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM role WHERE org_id = $1 AND id = $2")
            .bind(org_id.as_uuid())
            .bind(role_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23503")
                {
                    return AppError::Conflict(
                        "role is still referenced by memberships".to_owned(),
                    );
                }

                AppError::Internal(format!("failed to delete role: {error}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("role was not found".to_owned()));
        }

        Ok(())
    }
}

fn map_role_name_conflict(error: sqlx::Error, role_name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!(
            "role '{role_name}' already exists in the organization"
        ));
    }

    AppError::Internal(format!("failed to persist role: {error}"))
}

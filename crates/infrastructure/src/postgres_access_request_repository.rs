use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use rollcall_application::{
    AccessRequestRecord, AccessRequestRepository, AccessRequestTransaction, RequesterSummary,
};
use rollcall_core::{AppError, AppResult, OrgId};
use rollcall_domain::{
    AccessRequest, AccessRequestStatus, Edipi, Org, OrgContact, RequestId, Role, RoleId, User,
};

use crate::postgres_role_repository::{ROLE_COLUMNS, RoleRow};
use crate::postgres_user_repository::fetch_user_with_roles;

/// PostgreSQL-backed repository for access requests.
///
/// Also produces the transaction handle the approval and issuance paths
/// drive: one sqlx transaction spanning requests, roles, and memberships.
#[derive(Clone)]
pub struct PostgresAccessRequestRepository {
    pool: PgPool,
}

impl PostgresAccessRequestRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

struct PostgresAccessRequestTransaction {
    transaction: Transaction<'static, Postgres>,
}

#[derive(Debug, FromRow)]
struct RequestRow {
    id: uuid::Uuid,
    org_id: uuid::Uuid,
    edipi: String,
    status: String,
    request_date: DateTime<Utc>,
}

impl TryFrom<RequestRow> for AccessRequest {
    type Error = AppError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(AccessRequest {
            id: RequestId::from_uuid(row.id),
            org_id: OrgId::from_uuid(row.org_id),
            edipi: Edipi::new(row.edipi)?,
            status: row.status.parse()?,
            request_date: row.request_date,
        })
    }
}

#[derive(Debug, FromRow)]
struct PendingRecordRow {
    id: uuid::Uuid,
    org_id: uuid::Uuid,
    edipi: String,
    status: String,
    request_date: DateTime<Utc>,
    first_name: String,
    last_name: String,
    org_name: String,
    org_description: String,
    contact_edipi: Option<String>,
    contact_first_name: Option<String>,
    contact_last_name: Option<String>,
}

const REQUEST_COLUMNS: &str = "id, org_id, edipi, status, request_date";

#[async_trait]
impl AccessRequestRepository for PostgresAccessRequestRepository {
    async fn list_pending(&self, org_id: OrgId) -> AppResult<Vec<AccessRequestRecord>> {
        let rows = sqlx::query_as::<_, PendingRecordRow>(
            r#"
            SELECT
                request.id,
                request.org_id,
                request.edipi,
                request.status,
                request.request_date,
                requester.first_name,
                requester.last_name,
                org.name AS org_name,
                org.description AS org_description,
                org.contact_edipi,
                contact.first_name AS contact_first_name,
                contact.last_name AS contact_last_name
            FROM access_request AS request
            JOIN app_user AS requester ON requester.edipi = request.edipi
            JOIN org ON org.id = request.org_id
            LEFT JOIN app_user AS contact ON contact.edipi = org.contact_edipi
            WHERE request.org_id = $1 AND request.status = 'pending'
            ORDER BY request.request_date
            "#,
        )
        .bind(org_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list pending requests: {error}"))
        })?;

        rows.into_iter().map(record_from_row).collect()
    }

    async fn find_for_user(
        &self,
        org_id: OrgId,
        edipi: &Edipi,
    ) -> AppResult<Option<AccessRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM access_request WHERE org_id = $1 AND edipi = $2"
        ))
        .bind(org_id.as_uuid())
        .bind(edipi.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load access request: {error}")))?;

        row.map(AccessRequest::try_from).transpose()
    }

    async fn find_by_id(
        &self,
        org_id: OrgId,
        request_id: RequestId,
    ) -> AppResult<Option<AccessRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM access_request WHERE org_id = $1 AND id = $2"
        ))
        .bind(org_id.as_uuid())
        .bind(request_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load access request: {error}")))?;

        row.map(AccessRequest::try_from).transpose()
    }

    async fn delete(&self, request_id: RequestId) -> AppResult<()> {
        sqlx::query("DELETE FROM access_request WHERE id = $1")
            .bind(request_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete access request: {error}"))
            })?;

        Ok(())
    }

    async fn set_status(&self, request_id: RequestId, status: AccessRequestStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE access_request SET status = $2 WHERE id = $1")
            .bind(request_id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to update access request: {error}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("access request was not found".to_owned()));
        }

        Ok(())
    }

    async fn begin(&self) -> AppResult<Box<dyn AccessRequestTransaction>> {
        let transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        Ok(Box::new(PostgresAccessRequestTransaction { transaction }))
    }
}

#[async_trait]
impl AccessRequestTransaction for PostgresAccessRequestTransaction {
    async fn find_request(
        &mut self,
        org_id: OrgId,
        request_id: RequestId,
    ) -> AppResult<Option<AccessRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM access_request WHERE org_id = $1 AND id = $2"
        ))
        .bind(org_id.as_uuid())
        .bind(request_id.as_uuid())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load access request: {error}")))?;

        row.map(AccessRequest::try_from).transpose()
    }

    async fn find_request_for_user(
        &mut self,
        org_id: OrgId,
        edipi: &Edipi,
    ) -> AppResult<Option<AccessRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM access_request WHERE org_id = $1 AND edipi = $2"
        ))
        .bind(org_id.as_uuid())
        .bind(edipi.as_str())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load access request: {error}")))?;

        row.map(AccessRequest::try_from).transpose()
    }

    async fn find_role(&mut self, org_id: OrgId, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM role WHERE org_id = $1 AND id = $2"
        ))
        .bind(org_id.as_uuid())
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

        Ok(row.map(Role::from))
    }

    async fn find_user_with_roles(&mut self, edipi: &Edipi) -> AppResult<Option<User>> {
        fetch_user_with_roles(&mut self.transaction, edipi).await
    }

    async fn insert_request(&mut self, request: &AccessRequest) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO access_request (id, org_id, edipi, status, request_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.org_id.as_uuid())
        .bind(request.edipi.as_str())
        .bind(request.status.as_str())
        .bind(request.request_date)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to insert access request: {error}"))
        })?;

        Ok(())
    }

    async fn delete_request(&mut self, request_id: RequestId) -> AppResult<()> {
        sqlx::query("DELETE FROM access_request WHERE id = $1")
            .bind(request_id.as_uuid())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete access request: {error}"))
            })?;

        Ok(())
    }

    async fn insert_user_role(
        &mut self,
        edipi: &Edipi,
        org_id: OrgId,
        role_id: RoleId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_role (edipi, org_id, role_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(edipi.as_str())
        .bind(org_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            // The (edipi, org_id) primary key is the serializability guard
            // against two concurrent approvals for the same user and org.
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(
                    "user already holds a role in the organization".to_owned(),
                );
            }

            AppError::Internal(format!("failed to insert membership: {error}"))
        })?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }
}

fn record_from_row(row: PendingRecordRow) -> AppResult<AccessRequestRecord> {
    let contact = match (row.contact_edipi, row.contact_first_name, row.contact_last_name) {
        (Some(edipi), Some(first_name), Some(last_name)) => Some(OrgContact {
            edipi: Edipi::new(edipi)?,
            first_name,
            last_name,
        }),
        _ => None,
    };

    Ok(AccessRequestRecord {
        request: AccessRequest {
            id: RequestId::from_uuid(row.id),
            org_id: OrgId::from_uuid(row.org_id),
            edipi: Edipi::new(row.edipi.clone())?,
            status: row.status.parse()?,
            request_date: row.request_date,
        },
        requester: RequesterSummary {
            edipi: Edipi::new(row.edipi)?,
            first_name: row.first_name,
            last_name: row.last_name,
        },
        org: Org {
            id: OrgId::from_uuid(row.org_id),
            name: row.org_name,
            description: row.org_description,
            contact,
        },
    })
}

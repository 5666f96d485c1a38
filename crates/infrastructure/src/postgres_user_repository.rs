use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};

use rollcall_application::UserRepository;
use rollcall_core::{AppError, AppResult};
use rollcall_domain::{Edipi, Role, User, UserRole};

use crate::postgres_role_repository::{ROLE_COLUMNS, RoleRow};

/// PostgreSQL-backed lookup for the user directory.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    edipi: String,
    first_name: String,
    last_name: String,
    registered: bool,
}

/// Loads a user with their memberships joined across org and role. Shared
/// with the access-request transaction, which performs the same lookup
/// inside an open transaction.
pub(crate) async fn fetch_user_with_roles(
    connection: &mut PgConnection,
    edipi: &Edipi,
) -> AppResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT edipi, first_name, last_name, registered FROM app_user WHERE edipi = $1",
    )
    .bind(edipi.as_str())
    .fetch_optional(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load user: {error}")))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let role_rows = sqlx::query_as::<_, RoleRow>(&format!(
        r#"
        SELECT {ROLE_COLUMNS_PREFIXED}
        FROM user_role
        JOIN role ON role.id = user_role.role_id
        WHERE user_role.edipi = $1
        ORDER BY role.org_id
        "#,
        ROLE_COLUMNS_PREFIXED = prefixed_role_columns()
    ))
    .bind(edipi.as_str())
    .fetch_all(connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load user memberships: {error}")))?;

    let roles = role_rows
        .into_iter()
        .map(|role_row| {
            let role = Role::from(role_row);
            UserRole {
                org_id: role.org_id,
                role,
            }
        })
        .collect();

    Ok(Some(User {
        edipi: Edipi::new(row.edipi)?,
        first_name: row.first_name,
        last_name: row.last_name,
        registered: row.registered,
        roles,
    }))
}

fn prefixed_role_columns() -> String {
    ROLE_COLUMNS
        .split(", ")
        .map(|column| format!("role.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user_with_roles(&self, edipi: &Edipi) -> AppResult<Option<User>> {
        let mut connection = self.pool.acquire().await.map_err(|error| {
            AppError::Internal(format!("failed to acquire connection: {error}"))
        })?;

        fetch_user_with_roles(&mut connection, edipi).await
    }
}

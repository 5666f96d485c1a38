use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use rollcall_application::OrgRepository;
use rollcall_core::{AppError, AppResult, OrgId};
use rollcall_domain::{Edipi, Org, OrgContact};

/// PostgreSQL-backed lookup for the organization directory.
#[derive(Clone)]
pub struct PostgresOrgRepository {
    pool: PgPool,
}

impl PostgresOrgRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OrgRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    contact_edipi: Option<String>,
    contact_first_name: Option<String>,
    contact_last_name: Option<String>,
}

impl TryFrom<OrgRow> for Org {
    type Error = AppError;

    fn try_from(row: OrgRow) -> Result<Self, Self::Error> {
        let contact = match (row.contact_edipi, row.contact_first_name, row.contact_last_name) {
            (Some(edipi), Some(first_name), Some(last_name)) => Some(OrgContact {
                edipi: Edipi::new(edipi)?,
                first_name,
                last_name,
            }),
            _ => None,
        };

        Ok(Org {
            id: OrgId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            contact,
        })
    }
}

#[async_trait]
impl OrgRepository for PostgresOrgRepository {
    async fn find_org(&self, org_id: OrgId) -> AppResult<Option<Org>> {
        let row = sqlx::query_as::<_, OrgRow>(
            r#"
            SELECT
                org.id,
                org.name,
                org.description,
                org.contact_edipi,
                contact.first_name AS contact_first_name,
                contact.last_name AS contact_last_name
            FROM org
            LEFT JOIN app_user AS contact
                ON contact.edipi = org.contact_edipi
            WHERE org.id = $1
            "#,
        )
        .bind(org_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load organization: {error}")))?;

        row.map(Org::try_from).transpose()
    }
}

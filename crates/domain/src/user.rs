//! User identity and organization membership types.

use rollcall_core::{AppError, AppResult, OrgId};
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Validated EDIPI, the stable external identifier for a person.
///
/// Exactly ten ASCII digits, as issued by the upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edipi(String);

impl Edipi {
    /// Creates a validated EDIPI.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        // The submitted value is itself PII; describe the format
        // requirement without reflecting the input.
        if trimmed.len() != 10 || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(AppError::Validation(
                "EDIPI must be exactly ten digits".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Edipi {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Durable grant linking one user to one role in one organization.
///
/// A user holds at most one role per organization; the approval workflow
/// enforces that invariant and the store backs it with a unique index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
    /// Organization the grant is scoped to.
    pub org_id: OrgId,
    /// Granted role, loaded with its permissions.
    pub role: Role,
}

/// A person known to the system, with their memberships across organizations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable external identifier.
    pub edipi: Edipi,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Whether the user has completed registration. Unregistered users may
    /// not issue or cancel access requests.
    pub registered: bool,
    /// Role memberships, one per organization at most.
    pub roles: Vec<UserRole>,
}

impl User {
    /// Returns the user's active role in the given organization, if any.
    #[must_use]
    pub fn role_in(&self, org_id: OrgId) -> Option<&Role> {
        self.roles
            .iter()
            .find(|membership| membership.org_id == org_id)
            .map(|membership| &membership.role)
    }
}

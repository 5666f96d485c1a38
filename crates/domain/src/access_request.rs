//! Access-request workflow types.
//!
//! An access request records one user's intent to join one organization. No
//! approved state is ever persisted: approval consumes the request and the
//! durable record is the resulting [`crate::UserRole`]. At most one request
//! exists per (user, org) pair at any time.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rollcall_core::{AppError, OrgId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Edipi;

/// Unique identifier for an access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random request identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a request identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle state of an access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRequestStatus {
    /// Awaiting an administrator decision.
    Pending,
    /// Declined; the row stays visible until cancelled or re-issued.
    Denied,
}

impl AccessRequestStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Denied => "denied",
        }
    }
}

impl FromStr for AccessRequestStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "denied" => Ok(Self::Denied),
            _ => Err(AppError::Internal(format!(
                "unknown access request status '{value}'"
            ))),
        }
    }
}

/// One user's pending or denied intent to join one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Stable request identifier.
    pub id: RequestId,
    /// Target organization.
    pub org_id: OrgId,
    /// Requesting user.
    pub edipi: Edipi,
    /// Current lifecycle state.
    pub status: AccessRequestStatus,
    /// When the request was issued.
    pub request_date: DateTime<Utc>,
}

impl AccessRequest {
    /// Creates a fresh pending request for the user and organization.
    #[must_use]
    pub fn pending(org_id: OrgId, edipi: Edipi) -> Self {
        Self {
            id: RequestId::new(),
            org_id,
            edipi,
            status: AccessRequestStatus::Pending,
            request_date: Utc::now(),
        }
    }
}

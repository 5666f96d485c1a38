//! Request and response payloads for the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rollcall_application::{AccessRequestRecord, ApprovedRequest, RequesterSummary};
use rollcall_domain::{AccessRequest, CapabilitySet, Org, PermissionMap, Role, RoleDraft};

/// Compact user projection embedded in other payloads.
#[derive(Debug, Serialize)]
pub struct UserSummaryResponse {
    pub edipi: String,
    pub first_name: String,
    pub last_name: String,
}

/// Organization projection with its contact.
#[derive(Debug, Serialize)]
pub struct OrgResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub contact: Option<UserSummaryResponse>,
}

/// A single access request row.
#[derive(Debug, Serialize)]
pub struct AccessRequestResponse {
    pub id: Uuid,
    pub org_id: Uuid,
    pub edipi: String,
    pub status: String,
    pub request_date: DateTime<Utc>,
}

/// Pending-request listing row with embedded user and organization.
#[derive(Debug, Serialize)]
pub struct AccessRequestRecordResponse {
    #[serde(flatten)]
    pub request: AccessRequestResponse,
    pub user: UserSummaryResponse,
    pub org: OrgResponse,
}

/// Body for the approve operation.
#[derive(Debug, Deserialize)]
pub struct ApproveAccessRequestRequest {
    pub request_id: Uuid,
    pub role_id: Uuid,
}

/// Response for a successful approval; the embedded request is the
/// now-deleted row that was processed.
#[derive(Debug, Serialize)]
pub struct ApproveAccessRequestResponse {
    pub success: bool,
    pub request: AccessRequestResponse,
}

/// Body for the deny operation.
#[derive(Debug, Deserialize)]
pub struct DenyAccessRequestRequest {
    pub request_id: Uuid,
}

/// Full role payload.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub description: String,
    pub index_prefix: String,
    pub workspace_id: Option<Uuid>,
    pub capabilities: CapabilitySet,
    pub allowed_roster_columns: PermissionMap,
    pub allowed_notification_events: PermissionMap,
}

/// Body for creating or replacing a role.
#[derive(Debug, Deserialize)]
pub struct SaveRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub index_prefix: String,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub capabilities: CapabilitySet,
    #[serde(default)]
    pub allowed_roster_columns: PermissionMap,
    #[serde(default)]
    pub allowed_notification_events: PermissionMap,
}

impl From<SaveRoleRequest> for RoleDraft {
    fn from(value: SaveRoleRequest) -> Self {
        RoleDraft {
            name: value.name,
            description: value.description,
            index_prefix: value.index_prefix,
            workspace_id: value.workspace_id,
            capabilities: value.capabilities,
            allowed_roster_columns: value.allowed_roster_columns,
            allowed_notification_events: value.allowed_notification_events,
        }
    }
}

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

impl From<RequesterSummary> for UserSummaryResponse {
    fn from(value: RequesterSummary) -> Self {
        Self {
            edipi: value.edipi.as_str().to_owned(),
            first_name: value.first_name,
            last_name: value.last_name,
        }
    }
}

impl From<Org> for OrgResponse {
    fn from(value: Org) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name,
            description: value.description,
            contact: value.contact.map(|contact| UserSummaryResponse {
                edipi: contact.edipi.as_str().to_owned(),
                first_name: contact.first_name,
                last_name: contact.last_name,
            }),
        }
    }
}

impl From<AccessRequest> for AccessRequestResponse {
    fn from(value: AccessRequest) -> Self {
        Self {
            id: value.id.as_uuid(),
            org_id: value.org_id.as_uuid(),
            edipi: value.edipi.as_str().to_owned(),
            status: value.status.as_str().to_owned(),
            request_date: value.request_date,
        }
    }
}

impl From<AccessRequestRecord> for AccessRequestRecordResponse {
    fn from(value: AccessRequestRecord) -> Self {
        Self {
            request: value.request.into(),
            user: value.requester.into(),
            org: value.org.into(),
        }
    }
}

impl From<ApprovedRequest> for ApproveAccessRequestResponse {
    fn from(value: ApprovedRequest) -> Self {
        Self {
            success: true,
            request: value.request.into(),
        }
    }
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            id: value.id.as_uuid(),
            org_id: value.org_id.as_uuid(),
            name: value.name,
            description: value.description,
            index_prefix: value.index_prefix,
            workspace_id: value.workspace_id,
            capabilities: value.capabilities,
            allowed_roster_columns: value.allowed_roster_columns,
            allowed_notification_events: value.allowed_notification_events,
        }
    }
}

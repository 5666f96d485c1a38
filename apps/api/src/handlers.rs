use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use rollcall_core::OrgId;
use rollcall_domain::{RequestId, RoleId, User};
use uuid::Uuid;

use crate::dto::{
    AccessRequestRecordResponse, AccessRequestResponse, ApproveAccessRequestRequest,
    ApproveAccessRequestResponse, DenyAccessRequestRequest, HealthDependencyStatus,
    HealthResponse, RoleResponse, SaveRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub mod access_requests;
pub mod health;
pub mod roles;

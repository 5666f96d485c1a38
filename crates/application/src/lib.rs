//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod access_request_service;
mod role_service;

pub use access_ports::{
    AccessRequestRecord, AccessRequestRepository, AccessRequestTransaction, OrgRepository,
    RequesterSummary, RoleRepository, UserRepository,
};
pub use access_request_service::{AccessRequestService, ApprovedRequest};
pub use role_service::RoleService;

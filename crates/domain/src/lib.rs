//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access_request;
mod org;
mod role;
mod roster;
mod user;

pub use access_request::{AccessRequest, AccessRequestStatus, RequestId};
pub use org::{Org, OrgContact};
pub use role::{CapabilitySet, PermissionMap, Role, RoleDraft, RoleId};
pub use roster::{RosterColumn, RosterColumnType, base_roster_columns};
pub use user::{Edipi, User, UserRole};

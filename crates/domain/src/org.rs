//! Organization (tenant) types.

use rollcall_core::OrgId;
use serde::{Deserialize, Serialize};

use crate::user::Edipi;

/// Contact person for an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgContact {
    /// Contact's external identifier.
    pub edipi: Edipi,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Tenant boundary owning roles, rosters, and access requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    /// Stable organization identifier.
    pub id: OrgId,
    /// Organization display name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Designated contact, if one is assigned.
    pub contact: Option<OrgContact>,
}

//! Role and permission model.
//!
//! A role is a named bundle of capability flags plus two fine-grained
//! permission maps (roster columns and notification events). The superset
//! comparison is the sole authorization gate for role assignment: an
//! approver may only grant a role whose permissions are entirely contained
//! within their own.

use std::collections::BTreeMap;

use rollcall_core::OrgId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roster::RosterColumn;

/// Unique identifier for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
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

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Boolean capability flags carried by a role.
///
/// Writers must persist flags in derived form (see [`CapabilitySet::derived`]);
/// the superset comparison assumes both sides already satisfy the hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitySet {
    /// Administer the organization: roles, access requests, membership.
    pub manage_group: bool,
    /// Create, edit, and delete roster entries.
    pub manage_roster: bool,
    /// Administer analytics workspaces.
    pub manage_workspace: bool,
    /// Read roster entries.
    pub view_roster: bool,
    /// Read muster compliance views.
    pub view_muster: bool,
    /// Read columns classified as personally identifiable information.
    pub view_pii: bool,
    /// Read columns classified as protected health information.
    pub view_phi: bool,
}

impl CapabilitySet {
    /// Returns the set with all implied capabilities filled in.
    ///
    /// manage-group implies manage-roster, manage-workspace, and view-roster;
    /// manage-roster implies view-roster; view-PHI implies view-PII.
    #[must_use]
    pub fn derived(self) -> Self {
        let manage_roster = self.manage_roster || self.manage_group;
        Self {
            manage_roster,
            manage_workspace: self.manage_workspace || self.manage_group,
            view_roster: self.view_roster || manage_roster,
            view_pii: self.view_pii || self.view_phi,
            ..self
        }
    }

    /// Returns true iff every flag set on `other` is also set on `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        (self.manage_group || !other.manage_group)
            && (self.manage_roster || !other.manage_roster)
            && (self.manage_workspace || !other.manage_workspace)
            && (self.view_roster || !other.view_roster)
            && (self.view_muster || !other.view_muster)
            && (self.view_pii || !other.view_pii)
            && (self.view_phi || !other.view_phi)
    }
}

/// Identifier-keyed boolean grants with a defined default-false lookup.
///
/// Used for roster column visibility and notification event subscriptions.
/// Absent keys read as not-allowed rather than erroring, which keeps the
/// superset comparison total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(BTreeMap<String, bool>);

impl PermissionMap {
    /// Creates an empty map (nothing allowed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the identifier is allowed; absent keys are false.
    #[must_use]
    pub fn allows(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// Sets the grant for one identifier.
    pub fn set(&mut self, key: impl Into<String>, allowed: bool) {
        self.0.insert(key.into(), allowed);
    }

    /// Returns true iff every identifier allowed by `other` is allowed here.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other
            .0
            .iter()
            .filter(|(_, allowed)| **allowed)
            .all(|(key, _)| self.allows(key))
    }

    /// Iterates the allowed identifiers.
    pub fn allowed_keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, allowed)| **allowed)
            .map(|(key, _)| key.as_str())
    }
}

impl FromIterator<(String, bool)> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(entries: I) -> Self {
        Self(entries.into_iter().collect())
    }
}

/// Writer input for creating or editing a role, before sanitization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoleDraft {
    /// Unique role name in organization scope.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Default analytics index prefix for the role.
    pub index_prefix: String,
    /// Optional analytics workspace reference.
    pub workspace_id: Option<Uuid>,
    /// Requested capability flags, prior to derivation.
    pub capabilities: CapabilitySet,
    /// Requested roster column grants, prior to PII/PHI filtering.
    pub allowed_roster_columns: PermissionMap,
    /// Notification event subscriptions, keyed by event id.
    pub allowed_notification_events: PermissionMap,
}

/// Named bundle of capability flags and visibility grants, scoped to one
/// organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Owning organization.
    pub org_id: OrgId,
    /// Unique role name in organization scope.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Default analytics index prefix for the role.
    pub index_prefix: String,
    /// Optional analytics workspace reference.
    pub workspace_id: Option<Uuid>,
    /// Capability flags, always stored in derived form.
    pub capabilities: CapabilitySet,
    /// Roster column grants, always stored filtered by the PII/PHI gates.
    pub allowed_roster_columns: PermissionMap,
    /// Notification event subscriptions, keyed by event id.
    pub allowed_notification_events: PermissionMap,
}

impl Role {
    /// Builds a role from writer input, enforcing the derivation hierarchy.
    ///
    /// Capability flags are expanded to their implied closure, then each
    /// roster column grant is kept only when the derived flags permit its
    /// data classification: a PII column requires view-PII, a PHI column
    /// requires view-PHI. Explicit per-column grants are filtered by these
    /// gates, never the other way around.
    #[must_use]
    pub fn from_draft(id: RoleId, org_id: OrgId, draft: RoleDraft, columns: &[RosterColumn]) -> Self {
        let capabilities = draft.capabilities.derived();

        let allowed_roster_columns = columns
            .iter()
            .map(|column| {
                let granted = draft.allowed_roster_columns.allows(column.name);
                let visible = (!column.pii || capabilities.view_pii)
                    && (!column.phi || capabilities.view_phi);
                (column.name.to_owned(), granted && visible)
            })
            .collect();

        Self {
            id,
            org_id,
            name: draft.name,
            description: draft.description,
            index_prefix: draft.index_prefix,
            workspace_id: draft.workspace_id,
            capabilities,
            allowed_roster_columns,
            allowed_notification_events: draft.allowed_notification_events,
        }
    }

    /// Returns true iff every permission held by `other` is also held by
    /// `self`: capability flags, roster column grants, and notification
    /// event subscriptions. Pure comparison, reflexive, not symmetric.
    #[must_use]
    pub fn is_superset_of(&self, other: &Role) -> bool {
        self.capabilities.contains(&other.capabilities)
            && self
                .allowed_roster_columns
                .contains(&other.allowed_roster_columns)
            && self
                .allowed_notification_events
                .contains(&other.allowed_notification_events)
    }
}

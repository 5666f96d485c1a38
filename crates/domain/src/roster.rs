//! Roster column catalog.
//!
//! Only the column metadata lives here: role sanitization consults the
//! PII/PHI classification when filtering column grants. Roster row CRUD is
//! handled elsewhere and is out of scope for this crate.

use serde::{Deserialize, Serialize};

/// Value type of a roster column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterColumnType {
    /// Free-form text.
    String,
    /// True/false flag.
    Boolean,
    /// Calendar date.
    Date,
    /// Date with time of day.
    DateTime,
    /// Numeric value.
    Number,
}

/// Metadata for one roster column, including its data classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RosterColumn {
    /// Stable column identifier used in permission maps.
    pub name: &'static str,
    /// Label shown to users.
    pub display_name: &'static str,
    /// Value type.
    pub column_type: RosterColumnType,
    /// Column contains personally identifiable information.
    pub pii: bool,
    /// Column contains protected health information.
    pub phi: bool,
    /// Column must be present on every roster entry.
    pub required: bool,
}

const BASE_COLUMNS: &[RosterColumn] = &[
    RosterColumn {
        name: "edipi",
        display_name: "EDIPI",
        column_type: RosterColumnType::String,
        pii: true,
        phi: false,
        required: true,
    },
    RosterColumn {
        name: "first_name",
        display_name: "First Name",
        column_type: RosterColumnType::String,
        pii: true,
        phi: false,
        required: true,
    },
    RosterColumn {
        name: "last_name",
        display_name: "Last Name",
        column_type: RosterColumnType::String,
        pii: true,
        phi: false,
        required: true,
    },
    RosterColumn {
        name: "unit",
        display_name: "Unit",
        column_type: RosterColumnType::String,
        pii: false,
        phi: false,
        required: true,
    },
    RosterColumn {
        name: "start_date",
        display_name: "Start Date",
        column_type: RosterColumnType::Date,
        pii: false,
        phi: false,
        required: false,
    },
    RosterColumn {
        name: "end_date",
        display_name: "End Date",
        column_type: RosterColumnType::Date,
        pii: false,
        phi: false,
        required: false,
    },
    RosterColumn {
        name: "last_reported",
        display_name: "Last Reported",
        column_type: RosterColumnType::DateTime,
        pii: false,
        phi: false,
        required: false,
    },
];

/// Returns the fixed base roster columns with their classifications.
#[must_use]
pub fn base_roster_columns() -> &'static [RosterColumn] {
    BASE_COLUMNS
}

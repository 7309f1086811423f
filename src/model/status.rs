use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Employment status. Transitions are unrestricted and admin-driven.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum EmployeeStatus {
    #[strum(serialize = "Active")]
    Active,
    #[strum(serialize = "On Leave")]
    #[serde(rename = "On Leave")]
    OnLeave,
    #[strum(serialize = "Inactive")]
    Inactive,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum AttendanceStatus {
    #[strum(serialize = "Present")]
    Present,
    #[strum(serialize = "Absent")]
    Absent,
    #[strum(serialize = "Late")]
    Late,
    #[strum(serialize = "Half Day")]
    #[serde(rename = "Half Day")]
    HalfDay,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Sick,
    Vacation,
    Personal,
    Maternity,
    Paternity,
    Other,
}

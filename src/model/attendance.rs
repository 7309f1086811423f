use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row per (employee_id, date); enforced by a unique key in the store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "08:55:00", value_type = String, nullable = true)]
    pub check_in: Option<NaiveTime>,

    #[schema(example = "17:30:00", value_type = String, nullable = true)]
    pub check_out: Option<NaiveTime>,

    #[schema(example = 0.5)]
    pub break_hours: f64,

    /// max(0, elapsed hours - break_hours), written at check-out.
    #[schema(example = 8.0, nullable = true)]
    pub total_hours: Option<f64>,

    #[schema(example = "Present")]
    pub status: String,

    #[schema(example = "worked from the field office", nullable = true)]
    pub notes: Option<String>,

    #[schema(example = "2026-01-05T08:55:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

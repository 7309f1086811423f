use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "sick")]
    pub leave_type: String,

    #[schema(example = "2026-02-02", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-02-04", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    /// Inclusive day count, derived from the date range on creation.
    #[schema(example = 3)]
    pub days_count: i32,

    #[schema(example = "pending")]
    pub status: String,

    #[schema(example = "flu", nullable = true)]
    pub reason: Option<String>,

    #[schema(example = 7, nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(example = "2026-02-01T10:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

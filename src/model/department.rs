use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Engineering")]
    pub name: String,

    #[schema(example = "Product development", nullable = true)]
    pub description: Option<String>,

    #[schema(example = "Building B", nullable = true)]
    pub location: Option<String>,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

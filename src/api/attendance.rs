use crate::{
    auth::auth::AuthUser,
    config::Config,
    model::{attendance::Attendance, status::AttendanceStatus},
    report::summary::{classify_check_in, round_hours, work_hours},
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{web, HttpResponse, Responder};
use chrono::{Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

const UPDATABLE_COLUMNS: &[&str] = &["check_in", "check_out", "break_hours", "status", "notes"];

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    #[schema(example = 1001)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "2026-06-01", value_type = String, format = "date")]
    /// Range start (inclusive)
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-06-30", value_type = String, format = "date")]
    /// Range end (inclusive)
    pub end_date: Option<NaiveDate>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 31)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<Attendance>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 31)]
    pub per_page: u32,
    #[schema(example = 60)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

/// Check-in endpoint
///
/// Upsert keyed by (employee, date): the first call of the day creates the
/// row and classifies it against the configured cutoff, repeat calls are
/// no-ops.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    responses(
        (status = 201, description = "Checked in", body = Object, example = json!({
            "message": "Checked in successfully",
            "status": "Present"
        })),
        (status = 200, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let now = Local::now();
    let today = now.date_naive();
    let time = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());

    let existing = sqlx::query_scalar::<_, u64>(
        "SELECT id FROM attendance WHERE employee_id = ? AND date = ?",
    )
    .bind(employee_id)
    .bind(today)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Check-in lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if existing.is_some() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Already checked in today"
        })));
    }

    // Classify on the wall clock; `time` drops the sub-second part only for
    // the stored TIME column, so 09:00:00.5 stays Late.
    let status = classify_check_in(now.time(), config.late_cutoff);

    // ON DUPLICATE KEY guards the race between the lookup and the insert;
    // a concurrent check-in wins and this one degrades to a no-op.
    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in, status)
        VALUES (?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE id = id
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .bind(time)
    .bind(status.to_string())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) if res.rows_affected() == 1 => Ok(HttpResponse::Created().json(json!({
            "message": "Checked in successfully",
            "status": status.to_string()
        }))),
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Already checked in today"
        }))),
        Err(e) => {
            error!(error = %e, employee_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Check-out endpoint
///
/// Requires today's row with a check-in; writes the out-stamp and the
/// recomputed total hours.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "total_hours": 8.0
        })),
        (status = 400, description = "No check-in recorded for today", body = Object, example = json!({
            "message": "No check-in recorded for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let now = Local::now();
    let today = now.date_naive();
    let time = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());

    let row = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE employee_id = ? AND date = ?",
    )
    .bind(employee_id)
    .bind(today)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Check-out lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (row, check_in) = match row {
        Some(r) => match r.check_in {
            Some(t) => (r, t),
            None => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "No check-in recorded for today"
                })));
            }
        },
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "No check-in recorded for today"
            })));
        }
    };

    let total_hours = work_hours(check_in, time, row.break_hours);

    sqlx::query("UPDATE attendance SET check_out = ?, total_hours = ? WHERE id = ?")
        .bind(time)
        .bind(total_hours)
        .bind(row.id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Check-out failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully",
        "total_hours": round_hours(total_hours)
    })))
}

/// List attendance rows
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance rows", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(31).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(start) = query.start_date {
        where_sql.push_str(" AND date >= ?");
        args.push(FilterValue::Date(start));
    }

    if let Some(end) = query.end_date {
        where_sql.push_str(" AND date <= ?");
        args.push(FilterValue::Date(end));
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count attendance rows");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT * FROM attendance{} ORDER BY date DESC, employee_id LIMIT ? OFFSET ?",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Attendance>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let rows = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch attendance rows");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: rows,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// All rows for one calendar date
#[utoipa::path(
    get,
    path = "/api/v1/attendance/daily/{date}",
    params(
        ("date", Path, description = "Calendar date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Attendance rows for the date", body = [Attendance]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn daily_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<NaiveDate>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let date = path.into_inner();

    let rows = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE date = ? ORDER BY employee_id",
    )
    .bind(date)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to fetch daily attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Admin correction of an attendance row
///
/// Accepts status (Absent, Half Day, ...), break hours and notes; total
/// hours is rederived whenever both stamps end up present.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{attendance_id}",
    params(
        ("attendance_id", Path, description = "Attendance row ID")
    ),
    responses(
        (status = 200, description = "Attendance updated"),
        (status = 400, description = "Unknown or invalid field"),
        (status = 404, description = "Attendance row not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn update_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let attendance_id = path.into_inner();

    if let Some(status) = body.get("status").and_then(|v| v.as_str()) {
        if status.parse::<AttendanceStatus>().is_err() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Invalid status. Allowed: Present, Absent, Late, Half Day"
            })));
        }
    }

    if let Some(break_hours) = body.get("break_hours").and_then(|v| v.as_f64()) {
        if break_hours < 0.0 {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Break hours must be non-negative"
            })));
        }
    }

    let update = build_update_sql("attendance", &body, UPDATABLE_COLUMNS, "id", attendance_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, attendance_id, "Failed to update attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance row not found"
        })));
    }

    // Corrections to stamps or break time invalidate the stored total.
    let row = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
        .bind(attendance_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, attendance_id, "Failed to re-read attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if let (Some(check_in), Some(check_out)) = (row.check_in, row.check_out) {
        let total_hours = work_hours(check_in, check_out, row.break_hours);
        sqlx::query("UPDATE attendance SET total_hours = ? WHERE id = ?")
            .bind(total_hours)
            .bind(attendance_id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, attendance_id, "Failed to store recomputed hours");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance updated"
    })))
}

use crate::{
    auth::auth::AuthUser,
    config::Config,
    model::{attendance::Attendance, department::Department, employee::Employee},
    report::{
        export::{export_filename, write_report},
        summary::{
            summarize_departments, summarize_employees, DepartmentSummary, EmployeeSummary,
            WorkdayPolicy,
        },
    },
};
use actix_web::{http::header::ContentDisposition, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    #[schema(example = "2026-06-01", value_type = String, format = "date")]
    /// Range start (inclusive)
    pub start_date: NaiveDate,
    #[schema(example = "2026-06-30", value_type = String, format = "date")]
    /// Range end (inclusive)
    pub end_date: NaiveDate,
    #[schema(example = 10)]
    /// Restrict to one department
    pub department_id: Option<u64>,
    #[schema(example = 1001)]
    /// Restrict to one employee
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    #[schema(example = "2026-06-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-06-30", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub employees: Vec<EmployeeSummary>,
    pub departments: Vec<DepartmentSummary>,
}

struct ReportData {
    employees: Vec<Employee>,
    departments: Vec<Department>,
    rows: Vec<Attendance>,
}

/// Fetch everything the aggregation needs. Employees are filtered here;
/// attendance rows are fetched per range and matched up in memory by the
/// pure summarizer.
async fn fetch_report_data(
    pool: &MySqlPool,
    query: &ReportQuery,
) -> Result<ReportData, sqlx::Error> {
    let mut employee_sql = String::from("SELECT * FROM employees WHERE 1=1");
    if query.department_id.is_some() {
        employee_sql.push_str(" AND department_id = ?");
    }
    if query.employee_id.is_some() {
        employee_sql.push_str(" AND id = ?");
    }
    employee_sql.push_str(" ORDER BY id");

    let mut employee_q = sqlx::query_as::<_, Employee>(&employee_sql);
    if let Some(dept) = query.department_id {
        employee_q = employee_q.bind(dept);
    }
    if let Some(emp) = query.employee_id {
        employee_q = employee_q.bind(emp);
    }
    let employees = employee_q.fetch_all(pool).await?;

    let departments = match query.department_id {
        Some(dept) => {
            sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ?")
                .bind(dept)
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name")
                .fetch_all(pool)
                .await?
        }
    };

    let rows = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE date >= ? AND date <= ? ORDER BY date, employee_id",
    )
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(pool)
    .await?;

    Ok(ReportData {
        employees,
        departments,
        rows,
    })
}

fn build_summaries(
    data: &ReportData,
    query: &ReportQuery,
    config: &Config,
) -> (Vec<EmployeeSummary>, Vec<DepartmentSummary>) {
    let policy = WorkdayPolicy {
        late_cutoff: config.late_cutoff,
        standard_day_hours: config.standard_day_hours,
    };

    let summaries = summarize_employees(
        &data.employees,
        &data.rows,
        query.start_date,
        query.end_date,
        policy,
    );
    let departments = summarize_departments(&data.departments, &summaries);
    (summaries, departments)
}

/// Attendance report
///
/// Per-employee and per-department summaries over the requested interval.
#[utoipa::path(
    get,
    path = "/api/v1/reports/attendance",
    params(ReportQuery),
    responses(
        (status = 200, description = "Aggregated report", body = ReportResponse),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn attendance_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if query.start_date > query.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let data = fetch_report_data(pool.get_ref(), &query).await.map_err(|e| {
        error!(error = %e, "Failed to fetch report data");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (summaries, departments) = build_summaries(&data, &query, &config);

    Ok(HttpResponse::Ok().json(ReportResponse {
        start_date: query.start_date,
        end_date: query.end_date,
        employees: summaries.iter().map(EmployeeSummary::rounded).collect(),
        departments: departments.iter().map(DepartmentSummary::rounded).collect(),
    }))
}

/// Attendance report export
///
/// Same aggregation rendered as a three-sheet XLSX attachment.
#[utoipa::path(
    get,
    path = "/api/v1/reports/attendance/export",
    params(ReportQuery),
    responses(
        (status = 200, description = "XLSX document", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn export_attendance_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if query.start_date > query.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let data = fetch_report_data(pool.get_ref(), &query).await.map_err(|e| {
        error!(error = %e, "Failed to fetch report data");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (summaries, departments) = build_summaries(&data, &query, &config);

    // Detail sheet carries only rows for the selected employees
    let detail: Vec<Attendance> = data
        .rows
        .iter()
        .filter(|r| data.employees.iter().any(|e| e.id == r.employee_id))
        .cloned()
        .collect();

    let bytes = write_report(&summaries, &departments, &detail, &data.employees).map_err(|e| {
        error!(error = %e, "Failed to render report workbook");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let filename = export_filename(query.start_date, query.end_date, query.department_id);

    Ok(HttpResponse::Ok()
        .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .insert_header(ContentDisposition::attachment(filename))
        .body(bytes))
}

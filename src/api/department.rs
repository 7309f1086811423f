use crate::{
    auth::auth::AuthUser,
    model::department::Department,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

const UPDATABLE_COLUMNS: &[&str] = &["name", "description", "location"];

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "Product development", nullable = true)]
    pub description: Option<String>,
    #[schema(example = "Building B", nullable = true)]
    pub location: Option<String>,
}

/// Create Department
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Object, example = json!({
            "message": "Department created"
        })),
        (status = 409, description = "Department name already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if payload.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Department name must not be empty"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO departments (name, description, location)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(&payload.location)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Department created"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Department name already exists"
                    })));
                }
            }

            error!(error = %e, "Failed to create department");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// List Departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "All departments ordered by name", body = [Department])
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_departments(
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let departments = sqlx::query_as::<_, Department>(
        r#"
        SELECT id, name, description, location, created_at
        FROM departments
        ORDER BY name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch departments");
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(departments))
}

/// Get Department by ID
#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department found", body = Department),
        (status = 404, description = "Department not found")
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_department(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();

    let department = sqlx::query_as::<_, Department>(
        r#"
        SELECT id, name, description, location, created_at
        FROM departments
        WHERE id = ?
        "#,
    )
    .bind(department_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, department_id, "Failed to fetch department");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match department {
        Some(dept) => Ok(HttpResponse::Ok().json(dept)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Department not found"
        }))),
    }
}

/// Update Department
#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department updated"),
        (status = 404, description = "Department not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let department_id = path.into_inner();

    let update = build_update_sql("departments", &body, UPDATABLE_COLUMNS, "id", department_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| {
            error!(error = %e, department_id, "Failed to update department");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Department not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department updated"
    })))
}

/// Delete Department
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Department not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let department_id = path.into_inner();

    let result = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(department_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Department not found"
                })));
            }

            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }
        Err(e) => {
            error!(error = %e, department_id, "Failed to delete department");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

use crate::api::attendance::{AttendanceFilter, AttendanceListResponse};
use crate::api::department::CreateDepartment;
use crate::api::employee::{CreateEmployee, EmployeeListResponse};
use crate::api::leave::{CreateLeave, LeaveFilter, LeaveListResponse};
use crate::api::report::{ReportQuery, ReportResponse};
use crate::model::attendance::Attendance;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave::LeaveRequest;
use crate::model::status::{AttendanceStatus, EmployeeStatus, LeaveStatus, LeaveType};
use crate::report::summary::{DepartmentSummary, EmployeeSummary};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;
use utoipa::{openapi, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Portal API",
        version = "1.0.0",
        description = r#"
## Employee Management & Attendance Portal

This API powers an **Employee Management & Attendance Portal** covering core
staffing operations within an organization.

### 🔹 Key Features
- **Department Management**
  - Create, update, list, and delete departments
- **Employee Management**
  - Create, update, list, and view employee profiles
- **Attendance Management**
  - Daily check-in and check-out tracking with late classification
- **Leave Management**
  - Apply for leave, approve/reject requests, and view leave history
- **Reporting**
  - Per-employee and per-department attendance summaries over any date
    range, exportable as a multi-sheet XLSX document

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Only authorized roles such as **Admin** or **HR** can access sensitive operations.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    modifiers(&SecurityAddon),
    paths(
        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::list_attendance,
        crate::api::attendance::daily_attendance,
        crate::api::attendance::update_attendance,

        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::create_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,

        crate::api::report::attendance_report,
        crate::api::report::export_attendance_report
    ),
    components(
        schemas(
            Department,
            CreateDepartment,
            Employee,
            CreateEmployee,
            EmployeeListResponse,
            EmployeeStatus,
            Attendance,
            AttendanceFilter,
            AttendanceListResponse,
            AttendanceStatus,
            LeaveRequest,
            CreateLeave,
            LeaveFilter,
            LeaveListResponse,
            LeaveStatus,
            LeaveType,
            ReportQuery,
            ReportResponse,
            EmployeeSummary,
            DepartmentSummary
        )
    ),
    tags(
        (name = "Department", description = "Department management APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance recording APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Report", description = "Attendance reporting and export APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

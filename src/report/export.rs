//! XLSX rendering of a finished report: three sheets (employee summary,
//! department summary, daily detail), formatting only.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use crate::report::summary::{DepartmentSummary, EmployeeSummary};

/// Deterministic name encoding the report period and department filter.
pub fn export_filename(start: NaiveDate, end: NaiveDate, department_id: Option<u64>) -> String {
    match department_id {
        Some(id) => format!("attendance_report_{start}_{end}_dept{id}.xlsx"),
        None => format!("attendance_report_{start}_{end}.xlsx"),
    }
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

fn hours_format() -> Format {
    Format::new().set_num_format("0.00")
}

fn rate_format() -> Format {
    Format::new().set_num_format("0.0")
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    let format = header_format();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &format)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn add_employee_sheet(
    workbook: &mut Workbook,
    summaries: &[EmployeeSummary],
) -> Result<u32, XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Employee Summary")?;

    write_headers(
        sheet,
        &[
            "Employee Code",
            "Name",
            "Marked Days",
            "Present",
            "Late",
            "Absent",
            "Half Day",
            "Total Hours",
            "Avg Hours/Day",
            "Attendance Rate %",
            "Overtime Hours",
            "Early Arrivals",
            "Late Arrivals",
        ],
    )?;

    sheet.set_column_width(0, 15)?;
    sheet.set_column_width(1, 30)?;
    sheet.set_column_width(9, 16)?;

    let hours = hours_format();
    let rate = rate_format();

    let mut written = 0u32;
    for (idx, s) in summaries.iter().enumerate() {
        let row = (idx + 1) as u32;

        sheet.write_string(row, 0, &s.employee_code)?;
        sheet.write_string(row, 1, &s.name)?;
        sheet.write_number(row, 2, s.total_days as f64)?;
        sheet.write_number(row, 3, s.present_days as f64)?;
        sheet.write_number(row, 4, s.late_days as f64)?;
        sheet.write_number(row, 5, s.absent_days as f64)?;
        sheet.write_number(row, 6, s.half_days as f64)?;
        sheet.write_number_with_format(row, 7, s.total_hours, &hours)?;
        sheet.write_number_with_format(row, 8, s.avg_hours_per_day, &hours)?;
        sheet.write_number_with_format(row, 9, s.attendance_rate, &rate)?;
        sheet.write_number_with_format(row, 10, s.overtime_hours, &hours)?;
        sheet.write_number(row, 11, s.early_arrivals as f64)?;
        sheet.write_number(row, 12, s.late_arrivals as f64)?;
        written += 1;
    }

    if !summaries.is_empty() {
        sheet.autofilter(0, 0, summaries.len() as u32, 12)?;
    }

    Ok(written)
}

fn add_department_sheet(
    workbook: &mut Workbook,
    departments: &[DepartmentSummary],
) -> Result<u32, XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Department Summary")?;

    write_headers(
        sheet,
        &[
            "Department",
            "Employees",
            "Avg Attendance Rate %",
            "Total Hours",
            "Avg Hours/Employee",
        ],
    )?;

    sheet.set_column_width(0, 25)?;
    sheet.set_column_width(2, 20)?;
    sheet.set_column_width(4, 18)?;

    let hours = hours_format();
    let rate = rate_format();

    let mut written = 0u32;
    for (idx, d) in departments.iter().enumerate() {
        let row = (idx + 1) as u32;

        sheet.write_string(row, 0, &d.department_name)?;
        sheet.write_number(row, 1, d.employee_count as f64)?;
        sheet.write_number_with_format(row, 2, d.avg_attendance_rate, &rate)?;
        sheet.write_number_with_format(row, 3, d.total_hours, &hours)?;
        sheet.write_number_with_format(row, 4, d.avg_hours_per_employee, &hours)?;
        written += 1;
    }

    if !departments.is_empty() {
        sheet.autofilter(0, 0, departments.len() as u32, 4)?;
    }

    Ok(written)
}

fn add_detail_sheet(
    workbook: &mut Workbook,
    rows: &[Attendance],
    employees: &[Employee],
) -> Result<u32, XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Daily Detail")?;

    write_headers(
        sheet,
        &[
            "Employee Code",
            "Name",
            "Date",
            "Check In",
            "Check Out",
            "Break Hours",
            "Total Hours",
            "Status",
            "Notes",
        ],
    )?;

    sheet.set_column_width(0, 15)?;
    sheet.set_column_width(1, 30)?;
    sheet.set_column_width(2, 12)?;
    sheet.set_column_width(8, 40)?;

    let hours = hours_format();

    // id -> employee, so the per-row lookups stay O(1) over large ranges
    let by_id: HashMap<u64, &Employee> = employees.iter().map(|e| (e.id, e)).collect();

    let mut written = 0u32;
    for (idx, r) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        let employee = by_id.get(&r.employee_id);

        sheet.write_string(
            row,
            0,
            employee.map(|e| e.employee_code.as_str()).unwrap_or(""),
        )?;
        sheet.write_string(
            row,
            1,
            employee.map(|e| e.full_name()).unwrap_or_default(),
        )?;
        sheet.write_string(row, 2, r.date.to_string())?;
        sheet.write_string(
            row,
            3,
            r.check_in.map(|t| t.to_string()).unwrap_or_default(),
        )?;
        sheet.write_string(
            row,
            4,
            r.check_out.map(|t| t.to_string()).unwrap_or_default(),
        )?;
        sheet.write_number_with_format(row, 5, r.break_hours, &hours)?;
        sheet.write_number_with_format(row, 6, r.total_hours.unwrap_or(0.0), &hours)?;
        sheet.write_string(row, 7, &r.status)?;
        sheet.write_string(row, 8, r.notes.clone().unwrap_or_default())?;
        written += 1;
    }

    if !rows.is_empty() {
        sheet.autofilter(0, 0, rows.len() as u32, 8)?;
    }

    Ok(written)
}

/// Render the full report workbook to an in-memory XLSX document. Every
/// input row lands on its sheet exactly once.
pub fn write_report(
    summaries: &[EmployeeSummary],
    departments: &[DepartmentSummary],
    detail: &[Attendance],
    employees: &[Employee],
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    add_employee_sheet(&mut workbook, summaries)?;
    add_department_sheet(&mut workbook, departments)?;
    add_detail_sheet(&mut workbook, detail, employees)?;

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_employee() -> Employee {
        Employee {
            id: 1,
            employee_code: "EMP-001".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@company.com".into(),
            national_id: "NID-1".into(),
            phone: None,
            department_id: Some(10),
            status: "Active".into(),
            hire_date: d(2024, 1, 1),
            profile_image: None,
            salary: 50_000.0,
            job_title: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn sample_summary() -> EmployeeSummary {
        EmployeeSummary {
            employee_id: 1,
            employee_code: "EMP-001".into(),
            name: "John Doe".into(),
            department_id: Some(10),
            total_days: 1,
            present_days: 1,
            late_days: 0,
            absent_days: 0,
            half_days: 0,
            total_hours: 8.0,
            avg_hours_per_day: 8.0,
            attendance_rate: 100.0,
            overtime_hours: 0.0,
            early_arrivals: 1,
            late_arrivals: 0,
        }
    }

    #[test]
    fn filename_encodes_period_and_filter() {
        let start = d(2026, 6, 1);
        let end = d(2026, 6, 30);
        assert_eq!(
            export_filename(start, end, None),
            "attendance_report_2026-06-01_2026-06-30.xlsx"
        );
        assert_eq!(
            export_filename(start, end, Some(7)),
            "attendance_report_2026-06-01_2026-06-30_dept7.xlsx"
        );
        // same inputs, same name
        assert_eq!(
            export_filename(start, end, Some(7)),
            export_filename(start, end, Some(7))
        );
    }

    fn detail_row(id: u64, employee_id: u64, date: NaiveDate) -> Attendance {
        Attendance {
            id,
            employee_id,
            date,
            check_in: NaiveTime::from_hms_opt(8, 55, 0),
            check_out: NaiveTime::from_hms_opt(17, 25, 0),
            break_hours: 0.5,
            total_hours: Some(8.0),
            status: "Present".into(),
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn three_sheets_cover_every_row_exactly_once() {
        let employees = vec![sample_employee()];
        let mut other = sample_summary();
        other.employee_id = 2;
        other.employee_code = "EMP-002".into();
        let summaries = vec![sample_summary(), other];
        let departments = vec![DepartmentSummary {
            department_id: 10,
            department_name: "Engineering".into(),
            employee_count: 1,
            avg_attendance_rate: 100.0,
            total_hours: 8.0,
            avg_hours_per_employee: 8.0,
        }];
        let detail = vec![
            detail_row(1, 1, d(2026, 6, 1)),
            detail_row(2, 1, d(2026, 6, 2)),
            detail_row(3, 1, d(2026, 6, 3)),
        ];

        let mut workbook = Workbook::new();
        assert_eq!(
            add_employee_sheet(&mut workbook, &summaries).unwrap(),
            summaries.len() as u32
        );
        assert_eq!(
            add_department_sheet(&mut workbook, &departments).unwrap(),
            departments.len() as u32
        );
        assert_eq!(
            add_detail_sheet(&mut workbook, &detail, &employees).unwrap(),
            detail.len() as u32
        );

        let sheets = workbook.worksheets_mut();
        assert_eq!(sheets.len(), 3);
        assert_eq!(sheets[0].name(), "Employee Summary");
        assert_eq!(sheets[1].name(), "Department Summary");
        assert_eq!(sheets[2].name(), "Daily Detail");

        let bytes = workbook.save_to_buffer().expect("workbook should render");
        assert!(!bytes.is_empty());
    }

    #[test]
    fn write_report_emits_three_worksheet_parts() {
        let summaries = vec![sample_summary()];
        let bytes = write_report(&summaries, &[], &[], &[]).expect("workbook should render");

        // XLSX is a zip; member names sit uncompressed in the entry headers
        let contains = |needle: &[u8]| bytes.windows(needle.len()).any(|w| w == needle);
        assert!(contains(b"xl/worksheets/sheet1.xml"));
        assert!(contains(b"xl/worksheets/sheet2.xml"));
        assert!(contains(b"xl/worksheets/sheet3.xml"));
        assert!(!contains(b"xl/worksheets/sheet4.xml"));
    }

    #[test]
    fn writes_empty_report() {
        let bytes = write_report(&[], &[], &[], &[]).expect("empty workbook should render");
        assert!(!bytes.is_empty());
    }

    #[test]
    fn detail_sheet_tolerates_unknown_employee() {
        let mut workbook = Workbook::new();
        let rows = vec![detail_row(1, 42, d(2026, 6, 1))];
        // no employee 42 in the roster, the row still lands with blank name cells
        assert_eq!(add_detail_sheet(&mut workbook, &rows, &[]).unwrap(), 1);
    }
}

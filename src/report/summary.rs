//! Attendance aggregation. Pure functions over already-fetched rows so the
//! whole module tests without a database.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::Attendance;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::status::AttendanceStatus;

/// Workday rules the aggregation runs under. Cutoff and day length come from
/// configuration, not constants.
#[derive(Debug, Clone, Copy)]
pub struct WorkdayPolicy {
    pub late_cutoff: NaiveTime,
    pub standard_day_hours: f64,
}

impl Default for WorkdayPolicy {
    fn default() -> Self {
        Self {
            late_cutoff: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            standard_day_hours: 8.0,
        }
    }
}

/// Hours worked between two stamps minus break time, floored at zero.
pub fn work_hours(check_in: NaiveTime, check_out: NaiveTime, break_hours: f64) -> f64 {
    let elapsed = (check_out - check_in).num_seconds() as f64 / 3600.0;
    (elapsed - break_hours).max(0.0)
}

/// At or before the cutoff counts as on time.
pub fn classify_check_in(check_in: NaiveTime, cutoff: NaiveTime) -> AttendanceStatus {
    if check_in <= cutoff {
        AttendanceStatus::Present
    } else {
        AttendanceStatus::Late
    }
}

/// Weekdays (Mon-Fri) in the inclusive interval. Zero when start > end.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = 10, nullable = true)]
    pub department_id: Option<u64>,

    pub total_days: u32,
    pub present_days: u32,
    pub late_days: u32,
    pub absent_days: u32,
    pub half_days: u32,

    #[schema(example = 160.5)]
    pub total_hours: f64,
    #[schema(example = 8.02)]
    pub avg_hours_per_day: f64,
    #[schema(example = 95.0)]
    pub attendance_rate: f64,
    #[schema(example = 2.5)]
    pub overtime_hours: f64,

    pub early_arrivals: u32,
    pub late_arrivals: u32,
}

impl EmployeeSummary {
    /// Display/export precision: hours to 2 places, rates to 1. Internal
    /// math stays full precision until this point.
    pub fn rounded(&self) -> Self {
        Self {
            total_hours: round_hours(self.total_hours),
            avg_hours_per_day: round_hours(self.avg_hours_per_day),
            attendance_rate: round_rate(self.attendance_rate),
            overtime_hours: round_hours(self.overtime_hours),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartmentSummary {
    #[schema(example = 10)]
    pub department_id: u64,
    #[schema(example = "Engineering")]
    pub department_name: String,
    pub employee_count: u32,
    #[schema(example = 92.5)]
    pub avg_attendance_rate: f64,
    #[schema(example = 1210.0)]
    pub total_hours: f64,
    #[schema(example = 151.25)]
    pub avg_hours_per_employee: f64,
}

impl DepartmentSummary {
    pub fn rounded(&self) -> Self {
        Self {
            avg_attendance_rate: round_rate(self.avg_attendance_rate),
            total_hours: round_hours(self.total_hours),
            avg_hours_per_employee: round_hours(self.avg_hours_per_employee),
            ..self.clone()
        }
    }
}

pub fn round_hours(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn round_rate(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn status_of(row: &Attendance) -> Option<AttendanceStatus> {
    row.status.parse().ok()
}

/// One summary per employee over rows restricted to [start, end].
pub fn summarize_employees(
    employees: &[Employee],
    rows: &[Attendance],
    start: NaiveDate,
    end: NaiveDate,
    policy: WorkdayPolicy,
) -> Vec<EmployeeSummary> {
    let range_working_days = working_days(start, end);

    employees
        .iter()
        .map(|emp| {
            let mut summary = EmployeeSummary {
                employee_id: emp.id,
                employee_code: emp.employee_code.clone(),
                name: emp.full_name(),
                department_id: emp.department_id,
                total_days: 0,
                present_days: 0,
                late_days: 0,
                absent_days: 0,
                half_days: 0,
                total_hours: 0.0,
                avg_hours_per_day: 0.0,
                attendance_rate: 0.0,
                overtime_hours: 0.0,
                early_arrivals: 0,
                late_arrivals: 0,
            };

            for row in rows
                .iter()
                .filter(|r| r.employee_id == emp.id && r.date >= start && r.date <= end)
            {
                summary.total_days += 1;
                summary.total_hours += row.total_hours.unwrap_or(0.0);

                match status_of(row) {
                    Some(AttendanceStatus::Present) => summary.present_days += 1,
                    Some(AttendanceStatus::Late) => summary.late_days += 1,
                    Some(AttendanceStatus::Absent) => summary.absent_days += 1,
                    Some(AttendanceStatus::HalfDay) => summary.half_days += 1,
                    None => {}
                }

                if let Some(check_in) = row.check_in {
                    if check_in < policy.late_cutoff {
                        summary.early_arrivals += 1;
                    } else if check_in > policy.late_cutoff {
                        summary.late_arrivals += 1;
                    }
                }
            }

            if summary.total_days > 0 {
                summary.avg_hours_per_day = summary.total_hours / summary.total_days as f64;
            }

            if range_working_days > 0 {
                let marked = summary.present_days + summary.late_days + summary.half_days;
                summary.attendance_rate = marked as f64 / range_working_days as f64 * 100.0;
            }

            let full_days = (summary.present_days + summary.late_days) as f64;
            summary.overtime_hours =
                (summary.total_hours - policy.standard_day_hours * full_days).max(0.0);

            summary
        })
        .collect()
}

/// Department rollup over per-employee summaries. The mean rate is the
/// arithmetic mean of the members' individual rates, not re-derived from
/// pooled day counts.
pub fn summarize_departments(
    departments: &[Department],
    summaries: &[EmployeeSummary],
) -> Vec<DepartmentSummary> {
    departments
        .iter()
        .map(|dept| {
            let members: Vec<&EmployeeSummary> = summaries
                .iter()
                .filter(|s| s.department_id == Some(dept.id))
                .collect();

            let count = members.len() as u32;
            let total_hours: f64 = members.iter().map(|s| s.total_hours).sum();
            let (avg_rate, avg_hours) = if count > 0 {
                (
                    members.iter().map(|s| s.attendance_rate).sum::<f64>() / count as f64,
                    total_hours / count as f64,
                )
            } else {
                (0.0, 0.0)
            };

            DepartmentSummary {
                department_id: dept.id,
                department_name: dept.name.clone(),
                employee_count: count,
                avg_attendance_rate: avg_rate,
                total_hours,
                avg_hours_per_employee: avg_hours,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn employee(id: u64, department_id: Option<u64>) -> Employee {
        Employee {
            id,
            employee_code: format!("EMP-{id:03}"),
            first_name: "Test".into(),
            last_name: format!("Employee{id}"),
            email: format!("emp{id}@company.com"),
            national_id: format!("NID-{id}"),
            phone: None,
            department_id,
            status: "Active".into(),
            hire_date: d(2024, 1, 1),
            profile_image: None,
            salary: 50_000.0,
            job_title: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn row(employee_id: u64, date: NaiveDate, status: &str, hours: Option<f64>) -> Attendance {
        Attendance {
            id: 0,
            employee_id,
            date,
            check_in: None,
            check_out: None,
            break_hours: 0.0,
            total_hours: hours,
            status: status.into(),
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn work_hours_subtracts_break() {
        // 09:00 -> 17:30 with a half hour break is a flat 8h day
        let hours = work_hours(t(9, 0, 0), t(17, 30, 0), 0.5);
        assert!((hours - 8.0).abs() < 1e-9);
    }

    #[test]
    fn work_hours_floors_at_zero() {
        let hours = work_hours(t(9, 0, 0), t(9, 15, 0), 2.0);
        assert_eq!(hours, 0.0);
    }

    #[test]
    fn cutoff_boundary_classification() {
        let cutoff = t(9, 0, 0);
        assert_eq!(
            classify_check_in(t(9, 0, 0), cutoff),
            AttendanceStatus::Present
        );
        assert_eq!(classify_check_in(t(9, 0, 1), cutoff), AttendanceStatus::Late);
        assert_eq!(
            classify_check_in(t(8, 59, 59), cutoff),
            AttendanceStatus::Present
        );
        // a fractional second past the cutoff is already Late
        let just_past = NaiveTime::from_hms_milli_opt(9, 0, 0, 500).unwrap();
        assert_eq!(classify_check_in(just_past, cutoff), AttendanceStatus::Late);
    }

    #[test]
    fn working_days_skips_weekends() {
        // 2026-06-01 is a Monday; a full June has 22 weekdays
        assert_eq!(working_days(d(2026, 6, 1), d(2026, 6, 30)), 22);
        // Sat + Sun only
        assert_eq!(working_days(d(2026, 6, 6), d(2026, 6, 7)), 0);
        // inverted range
        assert_eq!(working_days(d(2026, 6, 10), d(2026, 6, 1)), 0);
    }

    #[test]
    fn attendance_rate_over_working_days() {
        // 2026-06-01..2026-06-26 is exactly 20 weekdays
        let start = d(2026, 6, 1);
        let end = d(2026, 6, 26);
        assert_eq!(working_days(start, end), 20);

        let emp = employee(1, None);
        let mut rows = Vec::new();
        let mut marked = 0;
        for date in start.iter_days().take_while(|x| *x <= end) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            if marked < 18 {
                let status = if marked % 3 == 0 { "Late" } else { "Present" };
                rows.push(row(1, date, status, Some(8.0)));
                marked += 1;
            }
        }

        let summaries =
            summarize_employees(&[emp], &rows, start, end, WorkdayPolicy::default());
        assert!((summaries[0].attendance_rate - 90.0).abs() < 1e-9);
    }

    #[test]
    fn rate_is_zero_without_working_days() {
        let emp = employee(1, None);
        let summaries = summarize_employees(
            &[emp],
            &[],
            d(2026, 6, 6),
            d(2026, 6, 7),
            WorkdayPolicy::default(),
        );
        assert_eq!(summaries[0].attendance_rate, 0.0);
        assert_eq!(summaries[0].avg_hours_per_day, 0.0);
    }

    #[test]
    fn overtime_above_standard_day_baseline() {
        let emp = employee(1, None);
        let start = d(2026, 6, 1);
        let mut rows: Vec<Attendance> = (0..10u64)
            .map(|i| row(1, start + chrono::Days::new(i), "Present", Some(8.5)))
            .collect();

        // 10 present days at 8.5h = 85h total, baseline 80h
        let summaries =
            summarize_employees(&[emp], &rows, start, d(2026, 6, 30), WorkdayPolicy::default());
        assert!((summaries[0].total_hours - 85.0).abs() < 1e-9);
        assert!((summaries[0].overtime_hours - 5.0).abs() < 1e-9);

        // 75h total stays at zero overtime
        for r in rows.iter_mut() {
            r.total_hours = Some(7.5);
        }
        let emp = employee(1, None);
        let summaries =
            summarize_employees(&[emp], &rows, start, d(2026, 6, 30), WorkdayPolicy::default());
        assert_eq!(summaries[0].overtime_hours, 0.0);
    }

    #[test]
    fn missing_total_hours_count_as_zero() {
        let emp = employee(1, None);
        let rows = vec![
            row(1, d(2026, 6, 1), "Present", Some(8.0)),
            row(1, d(2026, 6, 2), "Present", None),
        ];
        let summaries = summarize_employees(
            &[emp],
            &rows,
            d(2026, 6, 1),
            d(2026, 6, 5),
            WorkdayPolicy::default(),
        );
        assert!((summaries[0].total_hours - 8.0).abs() < 1e-9);
        assert!((summaries[0].avg_hours_per_day - 4.0).abs() < 1e-9);
    }

    #[test]
    fn rows_outside_range_are_ignored() {
        let emp = employee(1, None);
        let rows = vec![
            row(1, d(2026, 5, 29), "Present", Some(8.0)),
            row(1, d(2026, 6, 1), "Present", Some(8.0)),
        ];
        let summaries = summarize_employees(
            &[emp],
            &rows,
            d(2026, 6, 1),
            d(2026, 6, 30),
            WorkdayPolicy::default(),
        );
        assert_eq!(summaries[0].total_days, 1);
    }

    #[test]
    fn early_and_late_arrival_counts() {
        let emp = employee(1, None);
        let mut on_time = row(1, d(2026, 6, 1), "Present", Some(8.0));
        on_time.check_in = Some(t(9, 0, 0));
        let mut early = row(1, d(2026, 6, 2), "Present", Some(8.0));
        early.check_in = Some(t(8, 30, 0));
        let mut late = row(1, d(2026, 6, 3), "Late", Some(7.0));
        late.check_in = Some(t(9, 0, 1));

        let summaries = summarize_employees(
            &[emp],
            &[on_time, early, late],
            d(2026, 6, 1),
            d(2026, 6, 5),
            WorkdayPolicy::default(),
        );
        // exactly at the cutoff counts as neither early nor late
        assert_eq!(summaries[0].early_arrivals, 1);
        assert_eq!(summaries[0].late_arrivals, 1);
    }

    #[test]
    fn department_mean_is_arithmetic_mean_of_member_rates() {
        let dept = Department {
            id: 10,
            name: "Engineering".into(),
            description: None,
            location: None,
            created_at: None,
        };
        let employees = vec![employee(1, Some(10)), employee(2, Some(10))];

        let start = d(2026, 6, 1);
        let end = d(2026, 6, 26); // 20 working days
        let mut rows = Vec::new();
        // employee 1 marks 20 days, employee 2 marks 10 -> rates 100 and 50
        let mut first = 0;
        let mut second = 0;
        for date in start.iter_days().take_while(|x| *x <= end) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            rows.push(row(1, date, "Present", Some(8.0)));
            first += 1;
            if second < 10 {
                rows.push(row(2, date, "Present", Some(4.0)));
                second += 1;
            }
        }
        assert_eq!(first, 20);

        let summaries =
            summarize_employees(&employees, &rows, start, end, WorkdayPolicy::default());
        let departments = summarize_departments(&[dept], &summaries);

        assert_eq!(departments[0].employee_count, 2);
        assert!((departments[0].avg_attendance_rate - 75.0).abs() < 1e-9);
        assert!((departments[0].total_hours - 200.0).abs() < 1e-9);
        assert!((departments[0].avg_hours_per_employee - 100.0).abs() < 1e-9);
    }

    #[test]
    fn employees_without_department_stay_out_of_rollups() {
        let dept = Department {
            id: 10,
            name: "Engineering".into(),
            description: None,
            location: None,
            created_at: None,
        };
        let employees = vec![employee(1, None)];
        let summaries = summarize_employees(
            &employees,
            &[row(1, d(2026, 6, 1), "Present", Some(8.0))],
            d(2026, 6, 1),
            d(2026, 6, 5),
            WorkdayPolicy::default(),
        );
        let departments = summarize_departments(&[dept], &summaries);
        assert_eq!(departments[0].employee_count, 0);
        assert_eq!(departments[0].avg_attendance_rate, 0.0);
    }

    #[test]
    fn rounding_happens_only_at_the_edge() {
        let summary = EmployeeSummary {
            employee_id: 1,
            employee_code: "EMP-001".into(),
            name: "Test Employee1".into(),
            department_id: None,
            total_days: 3,
            present_days: 3,
            late_days: 0,
            absent_days: 0,
            half_days: 0,
            total_hours: 23.333333,
            avg_hours_per_day: 7.777777,
            attendance_rate: 66.666666,
            overtime_hours: 0.0,
            early_arrivals: 0,
            late_arrivals: 0,
        };
        let rounded = summary.rounded();
        assert_eq!(rounded.total_hours, 23.33);
        assert_eq!(rounded.avg_hours_per_day, 7.78);
        assert_eq!(rounded.attendance_rate, 66.7);
    }
}

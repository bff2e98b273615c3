//! Head-of-department dashboard.

use super::heading;
use crate::directory::Role;
use crate::school::SchoolData;
use crate::{Result, SchoolError};

pub(super) fn render(data: &SchoolData, user_id: i64, email: &str) -> Result<String> {
    let profile = data
        .staff(user_id, Role::Hod)
        .ok_or_else(|| SchoolError::NotFound(format!("HOD profile for user {user_id}")))?;
    let department = profile.department.as_deref().unwrap_or("-");

    let mut lines = vec![
        "=== HOD Dashboard ===".to_string(),
        format!("Welcome, {}! ({email})", profile.full_name()),
        format!("Head of the {department} department"),
        String::new(),
    ];

    match data.department(department) {
        Some(d) => lines.push(format!(
            "Teachers: {}  Students: {}",
            d.teachers, d.students
        )),
        None => lines.push("No department statistics available.".to_string()),
    }
    lines.push(String::new());

    lines.push(heading("Faculty"));
    let faculty = data.staff_by_role(Role::Teacher, Some(department));
    if faculty.is_empty() {
        lines.push("  No teachers in this department.".to_string());
    }
    for t in faculty {
        lines.push(format!(
            "  {:<6} {:<18} {}",
            t.employee_id.as_deref().unwrap_or("-"),
            t.full_name(),
            t.qualification.as_deref().unwrap_or("")
        ));
    }
    lines.push(String::new());

    if let Some(perf) = &data.department_performance {
        lines.push(heading("Department Performance"));
        lines.push(format!("  Average: {:.1}%", perf.average_percentage));
        lines.push(format!("  Top performer: {}", perf.top_performer));
        lines.push(format!(
            "  Needs improvement: {}",
            perf.improvement_needed.join(", ")
        ));
        lines.push(String::new());
    }

    lines.push(heading("Classes"));
    for c in &data.classes {
        lines.push(format!(
            "  {:<6} {:>3} students  class teacher {}",
            c.name, c.strength, c.class_teacher
        ));
    }

    Ok(lines.join("\n"))
}

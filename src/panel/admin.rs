//! Admin dashboard.

use super::heading;
use crate::directory::Role;
use crate::school::SchoolData;
use crate::{Result, SchoolError};

pub(super) fn render(data: &SchoolData, user_id: i64, email: &str) -> Result<String> {
    let profile = data
        .staff(user_id, Role::Admin)
        .ok_or_else(|| SchoolError::NotFound(format!("admin profile for user {user_id}")))?;

    let mut lines = vec![
        "=== Admin Dashboard ===".to_string(),
        format!("Welcome, {}! ({email})", profile.full_name()),
        profile.designation.clone(),
        String::new(),
    ];

    if let Some(stats) = data.stats {
        lines.push(format!(
            "Students: {}  Teachers: {}  Departments: {}  Classes: {}  Active users: {}",
            stats.total_students,
            stats.total_teachers,
            stats.total_departments,
            stats.total_classes,
            stats.active_users
        ));
        lines.push(String::new());
    }

    lines.push(heading("Departments"));
    for d in &data.departments {
        lines.push(format!(
            "  {:<18} HOD {:<15} {:>2} teachers {:>4} students",
            d.name, d.hod, d.teachers, d.students
        ));
    }
    lines.push(String::new());

    lines.push(heading("Users"));
    for u in &data.users {
        lines.push(format!(
            "  {:>3} {:<22} {:<8} {:<10} {}",
            u.id,
            u.name,
            u.role.display_name(),
            u.department.as_deref().unwrap_or("-"),
            if u.active { "active" } else { "inactive" }
        ));
    }
    lines.push(String::new());

    lines.push(heading("System Logs"));
    for log in &data.logs {
        lines.push(format!(
            "  {} {:<10} {:<18} {}",
            log.timestamp, log.user, log.action, log.status
        ));
    }
    lines.push(String::new());

    lines.push(heading("Reports"));
    for r in &data.reports {
        let status = if r.ready { "ready" } else { "pending" };
        lines.push(format!("  {:<30} {} ({status})", r.name, r.generated));
    }

    Ok(lines.join("\n"))
}

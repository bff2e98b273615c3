//! Teacher dashboard.

use super::heading;
use crate::directory::Role;
use crate::school::SchoolData;
use crate::{Result, SchoolError};

pub(super) fn render(data: &SchoolData, user_id: i64, email: &str) -> Result<String> {
    let profile = data
        .staff(user_id, Role::Teacher)
        .ok_or_else(|| SchoolError::NotFound(format!("teacher profile for user {user_id}")))?;

    let classes: Vec<_> = data
        .classes
        .iter()
        .filter(|c| c.class_teacher.ends_with(profile.last_name.as_str()))
        .collect();
    let students: Vec<_> = data
        .all_students()
        .into_iter()
        .filter(|s| classes.iter().any(|c| c.name == s.class_name))
        .collect();
    let assignments = data.assignments_by(profile);

    let mut lines = vec![
        "=== Teacher Dashboard ===".to_string(),
        format!("Welcome, {}! ({email})", profile.full_name()),
        format!(
            "{}  Department: {}  Employee ID: {}",
            profile.designation,
            profile.department.as_deref().unwrap_or("-"),
            profile.employee_id.as_deref().unwrap_or("-"),
        ),
        String::new(),
        format!(
            "Classes: {}  Students: {}  Assignments set: {}",
            classes.len(),
            students.len(),
            assignments.len()
        ),
        String::new(),
        heading("Today's Schedule"),
    ];

    let schedule = data.todays_schedule(user_id);
    if schedule.is_empty() {
        lines.push("  No classes scheduled for today.".to_string());
    }
    for lesson in schedule {
        lines.push(format!(
            "  {:<9} {:<5} {:<10} {}",
            lesson.time, lesson.class_name, lesson.subject, lesson.topic
        ));
    }
    lines.push(String::new());

    lines.push(heading("My Classes"));

    if classes.is_empty() {
        lines.push("  No classes assigned.".to_string());
    }
    for c in &classes {
        lines.push(format!("  {:<6} {} students", c.name, c.strength));
    }
    lines.push(String::new());

    lines.push(heading("Students"));
    for s in &students {
        let attendance = data
            .attendance_rate(s.user_id)
            .map_or_else(|| "n/a".to_string(), |rate| format!("{rate:.1}%"));
        lines.push(format!(
            "  {:<6} {:<16} {:<6} attendance {attendance}",
            s.roll_number,
            s.full_name(),
            s.class_name
        ));
    }
    lines.push(String::new());

    lines.push(heading("Assignments"));
    for a in &assignments {
        lines.push(format!("  {} (due {}, {} marks)", a.title, a.due_date, a.max_marks));
    }
    lines.push(String::new());

    if let Some(stats) = data.class_statistics(user_id) {
        lines.push(heading("Class Statistics"));
        lines.push(format!(
            "  Class average: {:.2}  Highest: {}  Lowest: {}",
            stats.average, stats.highest, stats.lowest
        ));
        lines.push(String::new());
    }

    lines.push(heading("Student Feedback"));
    for f in &data.feedback {
        lines.push(format!("  {} ({}): {}", f.student, f.date, f.comment));
    }
    lines.push(String::new());

    lines.push(heading("Announcements"));
    for n in &data.announcements {
        lines.push(format!("  [{}] {} ({})", n.priority, n.title, n.date));
    }

    Ok(lines.join("\n"))
}

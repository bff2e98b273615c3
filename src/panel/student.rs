//! Student dashboard.

use super::heading;
use crate::school::{SchoolData, StudentProfile};
use crate::{Result, SchoolError};

pub(super) fn render(data: &SchoolData, user_id: i64, email: &str) -> Result<String> {
    let profile = data
        .student(user_id)
        .ok_or_else(|| SchoolError::NotFound(format!("student profile for user {user_id}")))?;

    let mut lines = vec![
        "=== Student Dashboard ===".to_string(),
        format!("Welcome, {}! ({email})", profile.full_name()),
        format!(
            "Class: {}  Roll No: {}  Department: {}",
            profile.class_name, profile.roll_number, profile.department
        ),
        String::new(),
    ];

    lines.push(summary(data, profile));
    lines.push(String::new());

    lines.push(heading("Timetable"));
    let timetable = data.timetable(user_id);
    if timetable.is_empty() {
        lines.push("  No classes scheduled.".to_string());
    }
    for slot in timetable {
        lines.push(format!(
            "  {:<10} {:<12} {:<12} {:<13} Room {}",
            slot.day, slot.time, slot.subject, slot.teacher, slot.room
        ));
    }
    lines.push(String::new());

    lines.push(heading("Attendance by Subject"));
    let by_subject = data.attendance_by_subject(user_id);
    if by_subject.is_empty() {
        lines.push("  No attendance records.".to_string());
    }
    for a in &by_subject {
        lines.push(format!(
            "  {:<12} present {:>2}  absent {:>2}",
            a.subject, a.present, a.absent
        ));
    }
    lines.push(String::new());

    lines.push(heading("Assignments"));
    for a in data.assignments(user_id) {
        let status = match (a.submitted, a.marks_obtained) {
            (true, Some(marks)) => format!("{marks}/{}", a.max_marks),
            (true, None) => "Submitted".to_string(),
            (false, _) => "Pending".to_string(),
        };
        lines.push(format!(
            "  [{status:<9}] {} ({}, due {}, {} marks)",
            a.title, a.subject, a.due_date, a.max_marks
        ));
    }
    lines.push(String::new());

    if let Some(perf) = data.performance(user_id) {
        lines.push(heading("Performance"));
        for s in &perf.subjects {
            lines.push(format!("  {:<12} {:>5.1}%  {}", s.subject, s.percentage, s.grade));
        }
        lines.push("  Recent tests:".to_string());
        for t in &perf.recent_tests {
            lines.push(format!(
                "    {:<18} {}/{} ({})",
                t.test, t.marks, t.max_marks, t.date
            ));
        }
        lines.push(String::new());
    }

    lines.push(heading("Study Materials"));
    let materials = data.materials_for(&profile.class_name);
    if materials.is_empty() {
        lines.push("  No study materials available.".to_string());
    }
    for (subject, items) in &materials {
        lines.push(format!("  {subject}"));
        for m in items {
            lines.push(format!(
                "    {} [{}] by {}, {}: {}",
                m.title, m.kind, m.teacher, m.upload_date, m.description
            ));
        }
    }
    lines.push(String::new());

    lines.push(heading("Announcements"));
    for n in &data.announcements {
        lines.push(format!("  [{}] {} ({}): {}", n.priority, n.title, n.date, n.content));
    }

    Ok(lines.join("\n"))
}

fn summary(data: &SchoolData, profile: &StudentProfile) -> String {
    let attendance = data
        .attendance_rate(profile.user_id)
        .map_or_else(|| "n/a".to_string(), |rate| format!("{rate:.1}%"));
    let pending = data
        .assignments(profile.user_id)
        .iter()
        .filter(|a| !a.submitted)
        .count();
    let overall = data
        .performance(profile.user_id)
        .map_or_else(|| "n/a".to_string(), |p| format!("{:.1}%", p.overall_percentage));

    format!("Attendance: {attendance}  Pending assignments: {pending}  Overall: {overall}")
}

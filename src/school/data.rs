//! In-memory school records.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::directory::Role;

/// A student's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentProfile {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub class_name: String,
    pub roll_number: String,
    pub department: String,
}

impl StudentProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Teacher, HOD or admin profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffProfile {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub department: Option<String>,
    pub designation: String,
    pub qualification: Option<String>,
    pub employee_id: Option<String>,
}

impl StaffProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableEntry {
    pub day: String,
    pub time: String,
    pub subject: String,
    pub teacher: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub date: String,
    pub subject: String,
    pub present: bool,
}

/// Present and absent counts for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAttendance {
    pub subject: String,
    pub present: u32,
    pub absent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyMaterial {
    pub title: String,
    pub subject: String,
    pub class_name: String,
    /// File type, e.g. "PDF".
    pub kind: String,
    pub upload_date: String,
    pub teacher: String,
    pub description: String,
}

/// A lesson on a teacher's schedule for today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledClass {
    pub time: String,
    pub class_name: String,
    pub subject: String,
    pub topic: String,
}

/// Summary of the marks a teacher last entered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassStatistics {
    pub average: f64,
    pub highest: u32,
    pub lowest: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub subject: String,
    pub due_date: String,
    pub max_marks: u32,
    pub submitted: bool,
    pub marks_obtained: Option<u32>,
    pub teacher: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectScore {
    pub subject: String,
    pub percentage: f64,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub test: String,
    pub marks: u32,
    pub max_marks: u32,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    pub overall_percentage: f64,
    pub subjects: Vec<SubjectScore>,
    pub recent_tests: Vec<TestResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub date: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub strength: u32,
    pub class_teacher: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub name: String,
    pub hod: String,
    pub teachers: u32,
    pub students: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentPerformance {
    pub average_percentage: f64,
    pub top_performer: String,
    pub improvement_needed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub student: String,
    pub comment: String,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemStats {
    pub total_students: u32,
    pub total_teachers: u32,
    pub total_departments: u32,
    pub total_classes: u32,
    pub active_users: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub department: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemLog {
    pub timestamp: String,
    pub user: String,
    pub action: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemReport {
    pub name: String,
    pub generated: String,
    pub ready: bool,
}

/// Everything the dashboards read.
#[derive(Debug, Clone, Default)]
pub struct SchoolData {
    students: HashMap<i64, StudentProfile>,
    staff: HashMap<i64, (Role, StaffProfile)>,
    timetables: HashMap<i64, Vec<TimetableEntry>>,
    attendance: HashMap<i64, Vec<AttendanceRecord>>,
    assignments: HashMap<i64, Vec<Assignment>>,
    performance: HashMap<i64, Performance>,
    schedules: HashMap<i64, Vec<ScheduledClass>>,
    entered_marks: HashMap<i64, Vec<u32>>,
    pub study_materials: Vec<StudyMaterial>,
    pub announcements: Vec<Announcement>,
    pub classes: Vec<ClassInfo>,
    pub departments: Vec<Department>,
    pub department_performance: Option<DepartmentPerformance>,
    pub feedback: Vec<Feedback>,
    pub stats: Option<SystemStats>,
    pub users: Vec<UserSummary>,
    pub logs: Vec<SystemLog>,
    pub reports: Vec<SystemReport>,
}

fn s(v: &str) -> String {
    v.to_string()
}

fn slot(day: &str, time: &str, subject: &str, teacher: &str, room: &str) -> TimetableEntry {
    TimetableEntry {
        day: s(day),
        time: s(time),
        subject: s(subject),
        teacher: s(teacher),
        room: s(room),
    }
}

fn attended(date: &str, subject: &str, present: bool) -> AttendanceRecord {
    AttendanceRecord {
        date: s(date),
        subject: s(subject),
        present,
    }
}

fn material(title: &str, subject: &str, date: &str, teacher: &str, description: &str) -> StudyMaterial {
    StudyMaterial {
        title: s(title),
        subject: s(subject),
        class_name: s("10A"),
        kind: s("PDF"),
        upload_date: s(date),
        teacher: s(teacher),
        description: s(description),
    }
}

fn lesson(time: &str, class_name: &str, topic: &str) -> ScheduledClass {
    ScheduledClass {
        time: s(time),
        class_name: s(class_name),
        subject: s("Physics"),
        topic: s(topic),
    }
}

fn score(subject: &str, percentage: f64, grade: &str) -> SubjectScore {
    SubjectScore {
        subject: s(subject),
        percentage,
        grade: s(grade),
    }
}

impl SchoolData {
    /// Sample school matching the demo accounts.
    pub fn demo() -> Self {
        let mut data = Self::default();

        data.students.insert(
            1,
            StudentProfile {
                user_id: 1,
                first_name: s("John"),
                last_name: s("Doe"),
                class_name: s("10A"),
                roll_number: s("S001"),
                department: s("Science"),
            },
        );

        data.staff.insert(
            2,
            (
                Role::Teacher,
                StaffProfile {
                    user_id: 2,
                    first_name: s("Dr. Sarah"),
                    last_name: s("Smith"),
                    department: Some(s("Physics")),
                    designation: s("Senior Teacher"),
                    qualification: Some(s("Ph.D. Physics")),
                    employee_id: Some(s("T001")),
                },
            ),
        );
        data.staff.insert(
            3,
            (
                Role::Hod,
                StaffProfile {
                    user_id: 3,
                    first_name: s("Prof. Michael"),
                    last_name: s("Johnson"),
                    department: Some(s("Physics")),
                    designation: s("Head of Department"),
                    qualification: Some(s("Ph.D. Physics")),
                    employee_id: Some(s("H001")),
                },
            ),
        );
        data.staff.insert(
            4,
            (
                Role::Admin,
                StaffProfile {
                    user_id: 4,
                    first_name: s("Admin"),
                    last_name: s("User"),
                    department: None,
                    designation: s("System Administrator"),
                    qualification: None,
                    employee_id: None,
                },
            ),
        );

        data.timetables.insert(
            1,
            vec![
                slot("Monday", "08:00-09:00", "Physics", "Dr. Smith", "101"),
                slot("Monday", "09:00-10:00", "Mathematics", "Mr. Brown", "102"),
                slot("Monday", "10:00-11:00", "Chemistry", "Dr. Wilson", "103"),
                slot("Monday", "11:00-12:00", "English", "Ms. Davis", "104"),
                slot("Monday", "12:00-13:00", "History", "Mr. Taylor", "105"),
                slot("Tuesday", "08:00-09:00", "Biology", "Dr. Anderson", "106"),
                slot("Tuesday", "09:00-10:00", "Physics", "Dr. Smith", "101"),
                slot("Tuesday", "10:00-11:00", "Mathematics", "Mr. Brown", "102"),
                slot("Tuesday", "11:00-12:00", "Chemistry", "Dr. Wilson", "103"),
                slot("Tuesday", "12:00-13:00", "English", "Ms. Davis", "104"),
            ],
        );

        data.attendance.insert(
            1,
            vec![
                attended("2024-01-15", "Physics", true),
                attended("2024-01-15", "Mathematics", true),
                attended("2024-01-15", "Chemistry", false),
                attended("2024-01-16", "Biology", true),
                attended("2024-01-16", "Physics", true),
                attended("2024-01-16", "Mathematics", true),
                attended("2024-01-17", "Chemistry", true),
                attended("2024-01-17", "English", true),
                attended("2024-01-17", "History", true),
                attended("2024-01-18", "Biology", true),
            ],
        );

        data.assignments.insert(
            1,
            vec![
                Assignment {
                    id: 1,
                    title: s("Physics Lab Report"),
                    subject: s("Physics"),
                    due_date: s("2024-01-25"),
                    max_marks: 100,
                    submitted: false,
                    marks_obtained: None,
                    teacher: s("Dr. Smith"),
                },
                Assignment {
                    id: 2,
                    title: s("Mathematics Problem Set"),
                    subject: s("Mathematics"),
                    due_date: s("2024-01-22"),
                    max_marks: 50,
                    submitted: true,
                    marks_obtained: Some(45),
                    teacher: s("Mr. Brown"),
                },
                Assignment {
                    id: 3,
                    title: s("Chemistry Quiz"),
                    subject: s("Chemistry"),
                    due_date: s("2024-01-28"),
                    max_marks: 30,
                    submitted: false,
                    marks_obtained: None,
                    teacher: s("Dr. Wilson"),
                },
            ],
        );

        data.performance.insert(
            1,
            Performance {
                overall_percentage: 85.5,
                subjects: vec![
                    score("Physics", 88.0, "A"),
                    score("Mathematics", 92.0, "A+"),
                    score("Chemistry", 82.0, "B+"),
                    score("Biology", 87.0, "A"),
                    score("English", 85.0, "A"),
                    score("History", 78.0, "B+"),
                ],
                recent_tests: vec![
                    TestResult {
                        test: s("Physics Mid-Term"),
                        marks: 88,
                        max_marks: 100,
                        date: s("2024-01-10"),
                    },
                    TestResult {
                        test: s("Mathematics Quiz"),
                        marks: 18,
                        max_marks: 20,
                        date: s("2024-01-08"),
                    },
                    TestResult {
                        test: s("Chemistry Lab"),
                        marks: 25,
                        max_marks: 30,
                        date: s("2024-01-05"),
                    },
                ],
            },
        );

        data.study_materials = vec![
            material(
                "Physics Formula Sheet",
                "Physics",
                "2024-01-10",
                "Dr. Smith",
                "Complete formula sheet for all physics chapters",
            ),
            material(
                "Mathematics Practice Problems",
                "Mathematics",
                "2024-01-08",
                "Mr. Brown",
                "Practice problems for algebra and geometry",
            ),
            material(
                "Chemistry Lab Manual",
                "Chemistry",
                "2024-01-05",
                "Dr. Wilson",
                "Complete lab manual with safety guidelines",
            ),
        ];

        data.schedules.insert(
            2,
            vec![
                lesson("08:00 AM", "10A", "Mechanics"),
                lesson("10:00 AM", "11B", "Thermodynamics"),
                lesson("02:00 PM", "12A", "Electromagnetism"),
            ],
        );
        data.entered_marks.insert(2, vec![85, 92, 78, 88, 90]);

        data.announcements = vec![
            Announcement {
                title: s("Annual Sports Day"),
                content: s("Annual sports day will be held on February 15th, 2024."),
                priority: Priority::High,
                date: s("2024-01-15"),
                author: s("Principal"),
            },
            Announcement {
                title: s("Parent-Teacher Meeting"),
                content: s("Parent-teacher meeting scheduled for January 30th, 2024."),
                priority: Priority::Medium,
                date: s("2024-01-14"),
                author: s("Admin"),
            },
            Announcement {
                title: s("Library Week"),
                content: s("Library week celebration from January 22nd to 26th."),
                priority: Priority::Low,
                date: s("2024-01-13"),
                author: s("Librarian"),
            },
        ];

        data.classes = [
            ("10A", 35, "Dr. Smith"),
            ("10B", 32, "Mr. Brown"),
            ("11A", 30, "Dr. Wilson"),
            ("11B", 28, "Ms. Davis"),
            ("12A", 25, "Prof. Johnson"),
        ]
        .into_iter()
        .map(|(name, strength, teacher)| ClassInfo {
            name: s(name),
            strength,
            class_teacher: s(teacher),
        })
        .collect();

        data.departments = [
            ("Physics", "Prof. Johnson", 8, 120),
            ("Chemistry", "Dr. Williams", 6, 95),
            ("Mathematics", "Prof. Davis", 7, 150),
            ("Biology", "Dr. Anderson", 5, 80),
            ("Computer Science", "Prof. Wilson", 4, 60),
        ]
        .into_iter()
        .map(|(name, hod, teachers, students)| Department {
            name: s(name),
            hod: s(hod),
            teachers,
            students,
        })
        .collect();

        data.department_performance = Some(DepartmentPerformance {
            average_percentage: 82.5,
            top_performer: s("John Doe"),
            improvement_needed: vec![s("Chemistry"), s("Biology")],
        });

        data.feedback = vec![
            Feedback {
                student: s("John Doe"),
                comment: s("Great teaching method!"),
                date: s("2024-01-10"),
            },
            Feedback {
                student: s("Jane Smith"),
                comment: s("Very helpful explanations"),
                date: s("2024-01-08"),
            },
        ];

        data.stats = Some(SystemStats {
            total_students: 450,
            total_teachers: 35,
            total_departments: 5,
            total_classes: 15,
            active_users: 485,
        });

        data.users = vec![
            UserSummary {
                id: 1,
                name: s("John Doe"),
                role: Role::Student,
                department: Some(s("Physics")),
                active: true,
            },
            UserSummary {
                id: 2,
                name: s("Dr. Sarah Smith"),
                role: Role::Teacher,
                department: Some(s("Physics")),
                active: true,
            },
            UserSummary {
                id: 3,
                name: s("Prof. Michael Johnson"),
                role: Role::Hod,
                department: Some(s("Physics")),
                active: true,
            },
            UserSummary {
                id: 4,
                name: s("Admin User"),
                role: Role::Admin,
                department: None,
                active: true,
            },
        ];

        data.logs = vec![
            SystemLog {
                timestamp: s("2024-01-15 10:30:00"),
                user: s("John Doe"),
                action: s("Login"),
                status: s("Success"),
            },
            SystemLog {
                timestamp: s("2024-01-15 10:25:00"),
                user: s("Dr. Smith"),
                action: s("Upload Assignment"),
                status: s("Success"),
            },
            SystemLog {
                timestamp: s("2024-01-15 10:20:00"),
                user: s("Admin"),
                action: s("Create User"),
                status: s("Success"),
            },
        ];

        data.reports = vec![
            SystemReport {
                name: s("Monthly Attendance Report"),
                generated: s("2024-01-15"),
                ready: true,
            },
            SystemReport {
                name: s("Academic Performance Report"),
                generated: s("2024-01-14"),
                ready: true,
            },
            SystemReport {
                name: s("Teacher Evaluation Report"),
                generated: s("2024-01-13"),
                ready: false,
            },
        ];

        data
    }

    pub fn student(&self, user_id: i64) -> Option<&StudentProfile> {
        self.students.get(&user_id)
    }

    /// Staff profile for `user_id`, only if it was recorded under `role`.
    pub fn staff(&self, user_id: i64, role: Role) -> Option<&StaffProfile> {
        self.staff
            .get(&user_id)
            .filter(|(r, _)| *r == role)
            .map(|(_, profile)| profile)
    }

    /// Staff of a role, optionally limited to one department, ordered by ID.
    pub fn staff_by_role(&self, role: Role, department: Option<&str>) -> Vec<&StaffProfile> {
        let mut staff: Vec<_> = self
            .staff
            .values()
            .filter(|(r, p)| {
                *r == role && department.map_or(true, |d| p.department.as_deref() == Some(d))
            })
            .map(|(_, p)| p)
            .collect();
        staff.sort_by_key(|p| p.user_id);
        staff
    }

    /// Students of a department, ordered by ID.
    pub fn students_in(&self, department: &str) -> Vec<&StudentProfile> {
        let mut students: Vec<_> = self
            .students
            .values()
            .filter(|p| p.department == department)
            .collect();
        students.sort_by_key(|p| p.user_id);
        students
    }

    /// All students, ordered by ID.
    pub fn all_students(&self) -> Vec<&StudentProfile> {
        let mut students: Vec<_> = self.students.values().collect();
        students.sort_by_key(|p| p.user_id);
        students
    }

    pub fn timetable(&self, user_id: i64) -> &[TimetableEntry] {
        self.timetables.get(&user_id).map_or(&[], Vec::as_slice)
    }

    pub fn attendance(&self, user_id: i64) -> &[AttendanceRecord] {
        self.attendance.get(&user_id).map_or(&[], Vec::as_slice)
    }

    /// Attendance rate in percent, or `None` without records.
    pub fn attendance_rate(&self, user_id: i64) -> Option<f64> {
        let records = self.attendance(user_id);
        if records.is_empty() {
            return None;
        }
        let present = records.iter().filter(|r| r.present).count();
        Some(present as f64 * 100.0 / records.len() as f64)
    }

    /// Attendance counts per subject, ordered by subject.
    pub fn attendance_by_subject(&self, user_id: i64) -> Vec<SubjectAttendance> {
        let mut counts: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
        for record in self.attendance(user_id) {
            let entry = counts.entry(record.subject.as_str()).or_default();
            if record.present {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
        counts
            .into_iter()
            .map(|(subject, (present, absent))| SubjectAttendance {
                subject: s(subject),
                present,
                absent,
            })
            .collect()
    }

    /// Study materials for a class, grouped by subject in subject order.
    pub fn materials_for(&self, class_name: &str) -> BTreeMap<&str, Vec<&StudyMaterial>> {
        let mut grouped: BTreeMap<&str, Vec<&StudyMaterial>> = BTreeMap::new();
        for m in self.study_materials.iter().filter(|m| m.class_name == class_name) {
            grouped.entry(m.subject.as_str()).or_default().push(m);
        }
        grouped
    }

    pub fn todays_schedule(&self, user_id: i64) -> &[ScheduledClass] {
        self.schedules.get(&user_id).map_or(&[], Vec::as_slice)
    }

    /// Average, highest and lowest of the marks a teacher last entered.
    pub fn class_statistics(&self, user_id: i64) -> Option<ClassStatistics> {
        let marks = self.entered_marks.get(&user_id)?;
        let highest = *marks.iter().max()?;
        let lowest = *marks.iter().min()?;
        let total: u32 = marks.iter().sum();
        Some(ClassStatistics {
            average: f64::from(total) / marks.len() as f64,
            highest,
            lowest,
        })
    }

    pub fn assignments(&self, user_id: i64) -> &[Assignment] {
        self.assignments.get(&user_id).map_or(&[], Vec::as_slice)
    }

    /// Assignments set by a teacher, matched on "<title> <surname>".
    pub fn assignments_by(&self, teacher: &StaffProfile) -> Vec<&Assignment> {
        let surname = teacher.last_name.as_str();
        let mut list: Vec<_> = self
            .assignments
            .values()
            .flatten()
            .filter(|a| a.teacher.ends_with(surname))
            .collect();
        list.sort_by_key(|a| a.id);
        list
    }

    pub fn performance(&self, user_id: i64) -> Option<&Performance> {
        self.performance.get(&user_id)
    }

    pub fn department(&self, name: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.name == name)
    }
}

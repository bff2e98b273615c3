//! School records shown on the dashboards.
//!
//! All data is held in memory. `SchoolData::demo` builds the sample school
//! that matches the demo accounts in the user directory.

mod data;

pub use data::{
    Announcement, Assignment, AttendanceRecord, ClassInfo, ClassStatistics, Department,
    DepartmentPerformance, Feedback, Performance, Priority, ScheduledClass, SchoolData,
    StaffProfile, StudentProfile, StudyMaterial, SubjectAttendance, SubjectScore, SystemLog,
    SystemReport, SystemStats, TestResult, TimetableEntry, UserSummary,
};

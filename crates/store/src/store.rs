//! In-memory record store with indexed lookups.
//!
//! All lookups use case-insensitive substring semantics and return rows in
//! source-table order, so repeated identical queries against unchanged data
//! are byte-for-byte reproducible.

use crate::loader::{self, LoadReport};
use crate::types::{Day, ScheduledSession, StaffAssignment, TimeRange};
use serde::Serialize;
use staffdesk_core::AppResult;
use std::collections::HashSet;
use std::path::Path;

/// Immutable staffing tables, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    assignments: Vec<StaffAssignment>,
    sessions: Vec<ScheduledSession>,
}

/// Read-only view over the vocabulary observed in the store. Handed to the
/// entity extractor so it never invents names the tables have not seen.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    pub names: Vec<String>,
    pub departments: Vec<String>,
    pub courses: Vec<String>,
    pub rooms: Vec<String>,
}

/// Per-person workload totals, used for aggregate workload answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadTotal {
    pub name: String,
    pub department: String,
    pub total_hours: f32,
    pub courses: Vec<String>,
}

/// Per-department aggregate for summary answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentSummary {
    pub department: String,
    pub staff_count: usize,
    pub course_count: usize,
    pub total_hours: f32,
    pub staff: Vec<String>,
}

impl RecordStore {
    /// Load both tables from disk. Row-level problems become warnings in
    /// the returned report; only I/O failures abort.
    pub fn load(workload_path: &Path, timetable_path: &Path) -> AppResult<(Self, LoadReport)> {
        let workload_text = loader::read_table(workload_path)?;
        let timetable_text = loader::read_table(timetable_path)?;

        let (assignments, mut warnings) = loader::parse_workload(&workload_text);
        let (sessions, timetable_warnings) = loader::parse_timetable(&timetable_text);
        warnings.extend(timetable_warnings);

        let report = LoadReport {
            workload_rows: assignments.len(),
            timetable_rows: sessions.len(),
            warnings,
        };

        tracing::info!(
            "Loaded {} workload rows and {} timetable rows ({} skipped)",
            report.workload_rows,
            report.timetable_rows,
            report.warnings.len()
        );

        Ok((Self { assignments, sessions }, report))
    }

    /// Build a store directly from rows (test seam).
    pub fn from_rows(assignments: Vec<StaffAssignment>, sessions: Vec<ScheduledSession>) -> Self {
        Self { assignments, sessions }
    }

    /// Total stored rows across both tables.
    pub fn record_count(&self) -> usize {
        self.assignments.len() + self.sessions.len()
    }

    pub fn assignments(&self) -> &[StaffAssignment] {
        &self.assignments
    }

    pub fn sessions(&self) -> &[ScheduledSession] {
        &self.sessions
    }

    /// Workload rows whose staff name contains `name`, case-insensitively.
    pub fn assignments_for_person(&self, name: &str) -> Vec<&StaffAssignment> {
        let needle = name.to_lowercase();
        self.assignments
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Workload rows for a department, case-insensitive substring match.
    pub fn assignments_for_department(&self, department: &str) -> Vec<&StaffAssignment> {
        let needle = department.to_lowercase();
        self.assignments
            .iter()
            .filter(|a| a.department.to_lowercase().contains(&needle))
            .collect()
    }

    /// Workload rows for a course, case-insensitive substring match.
    pub fn assignments_for_course(&self, course: &str) -> Vec<&StaffAssignment> {
        let needle = course.to_lowercase();
        self.assignments
            .iter()
            .filter(|a| a.course.to_lowercase().contains(&needle))
            .collect()
    }

    /// Sessions taught by a staff member, optionally restricted to a day.
    pub fn sessions_for_person(&self, name: &str, day: Option<Day>) -> Vec<&ScheduledSession> {
        let needle = name.to_lowercase();
        self.sessions
            .iter()
            .filter(|s| s.staff_name.to_lowercase().contains(&needle))
            .filter(|s| day.map_or(true, |d| s.day == d))
            .collect()
    }

    /// Sessions held in a room, optionally restricted to a day.
    pub fn sessions_for_room(&self, room: &str, day: Option<Day>) -> Vec<&ScheduledSession> {
        let needle = room.to_lowercase();
        self.sessions
            .iter()
            .filter(|s| s.room.to_lowercase().contains(&needle))
            .filter(|s| day.map_or(true, |d| s.day == d))
            .collect()
    }

    /// Sessions on `day` that overlap the given slot (busy set).
    pub fn sessions_overlapping(&self, day: Day, slot: TimeRange) -> Vec<&ScheduledSession> {
        self.sessions
            .iter()
            .filter(|s| s.day == day && s.time.overlaps(&slot))
            .collect()
    }

    /// Distinct staff names, first-appearance order.
    pub fn staff_names(&self) -> Vec<String> {
        distinct(self.assignments.iter().map(|a| a.name.as_str()))
    }

    /// Distinct departments, first-appearance order.
    pub fn departments(&self) -> Vec<String> {
        distinct(self.assignments.iter().map(|a| a.department.as_str()))
    }

    /// Department of a staff member, if known.
    pub fn department_of(&self, name: &str) -> Option<&str> {
        let needle = name.to_lowercase();
        self.assignments
            .iter()
            .find(|a| a.name.to_lowercase().contains(&needle))
            .map(|a| a.department.as_str())
    }

    /// Per-person workload totals, ranked by descending hours with a
    /// name-ascending tiebreak.
    pub fn workload_ranking(&self) -> Vec<WorkloadTotal> {
        let mut totals: Vec<WorkloadTotal> = Vec::new();

        for row in &self.assignments {
            match totals.iter_mut().find(|t| t.name == row.name) {
                Some(total) => {
                    total.total_hours += row.hours_per_week;
                    if !total.courses.contains(&row.course) {
                        total.courses.push(row.course.clone());
                    }
                }
                None => totals.push(WorkloadTotal {
                    name: row.name.clone(),
                    department: row.department.clone(),
                    total_hours: row.hours_per_week,
                    courses: vec![row.course.clone()],
                }),
            }
        }

        totals.sort_by(|a, b| {
            b.total_hours
                .partial_cmp(&a.total_hours)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });

        totals
    }

    /// Department aggregates, ordered by first appearance in the table.
    pub fn department_summaries(&self) -> Vec<DepartmentSummary> {
        let mut summaries: Vec<DepartmentSummary> = Vec::new();

        for row in &self.assignments {
            let summary = match summaries
                .iter_mut()
                .find(|s| s.department == row.department)
            {
                Some(s) => s,
                None => {
                    summaries.push(DepartmentSummary {
                        department: row.department.clone(),
                        staff_count: 0,
                        course_count: 0,
                        total_hours: 0.0,
                        staff: Vec::new(),
                    });
                    summaries.last_mut().expect("just pushed")
                }
            };

            summary.total_hours += row.hours_per_week;
            if !summary.staff.contains(&row.name) {
                summary.staff.push(row.name.clone());
                summary.staff_count += 1;
            }
        }

        // Distinct course counts in a second pass keeps the first pass simple
        for summary in &mut summaries {
            let courses: HashSet<&str> = self
                .assignments
                .iter()
                .filter(|a| a.department == summary.department)
                .map(|a| a.course.as_str())
                .collect();
            summary.course_count = courses.len();
        }

        summaries
    }

    /// Snapshot of every name, department, course, and room the tables
    /// actually contain.
    pub fn vocabulary(&self) -> Vocabulary {
        let mut courses = distinct(self.assignments.iter().map(|a| a.course.as_str()));
        for session in &self.sessions {
            if !courses.iter().any(|c| c == &session.course) {
                courses.push(session.course.clone());
            }
        }

        let mut names = self.staff_names();
        for session in &self.sessions {
            if !names.iter().any(|n| n == &session.staff_name) {
                names.push(session.staff_name.clone());
            }
        }

        Vocabulary {
            names,
            departments: self.departments(),
            courses,
            rooms: distinct(self.sessions.iter().map(|s| s.room.as_str())),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if seen.insert(value.to_string()) {
            out.push(value.to_string());
        }
    }
    out
}

//! Tabular source loading.
//!
//! Consumes two comma-separated sources with fixed column sets:
//! workload rows `StaffId,Name,Department,Course,HoursPerWeek` and
//! timetable rows `Day,Time,Course,Faculty,Room`. Malformed rows (wrong
//! column count, non-numeric or non-positive hours, malformed time range,
//! unknown day) are skipped with a warning; a row never aborts the load.

use crate::types::{Day, ScheduledSession, StaffAssignment, TimeRange};
use serde::Serialize;
use staffdesk_core::{AppError, AppResult};
use std::path::Path;

/// A skipped-row diagnostic accumulated during load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadWarning {
    /// 1-based line number within the source file
    pub line: usize,
    pub reason: String,
}

/// Outcome of loading both tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub workload_rows: usize,
    pub timetable_rows: usize,
    pub warnings: Vec<LoadWarning>,
}

/// Parse workload rows from file content. The first non-empty line is the
/// header and is skipped.
pub fn parse_workload(content: &str) -> (Vec<StaffAssignment>, Vec<LoadWarning>) {
    let mut rows = Vec::new();
    let mut warnings = Vec::new();

    for (line_no, line) in data_lines(content) {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 5 {
            skip(&mut warnings, line_no, format!("expected 5 columns, got {}", fields.len()));
            continue;
        }

        let hours: f32 = match fields[4].parse() {
            Ok(h) => h,
            Err(_) => {
                skip(&mut warnings, line_no, format!("non-numeric hours: {:?}", fields[4]));
                continue;
            }
        };
        if hours <= 0.0 {
            skip(&mut warnings, line_no, format!("non-positive hours: {}", hours));
            continue;
        }

        rows.push(StaffAssignment {
            staff_id: fields[0].to_string(),
            name: fields[1].to_string(),
            department: fields[2].to_string(),
            course: fields[3].to_string(),
            hours_per_week: hours,
        });
    }

    (rows, warnings)
}

/// Parse timetable rows from file content. The first non-empty line is the
/// header and is skipped.
pub fn parse_timetable(content: &str) -> (Vec<ScheduledSession>, Vec<LoadWarning>) {
    let mut rows = Vec::new();
    let mut warnings = Vec::new();

    for (line_no, line) in data_lines(content) {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 5 {
            skip(&mut warnings, line_no, format!("expected 5 columns, got {}", fields.len()));
            continue;
        }

        let day = match Day::parse(fields[0]) {
            Some(d) => d,
            None => {
                skip(&mut warnings, line_no, format!("unknown day: {:?}", fields[0]));
                continue;
            }
        };

        let time = match TimeRange::parse(fields[1]) {
            Ok(t) => t,
            Err(e) => {
                skip(&mut warnings, line_no, e.to_string());
                continue;
            }
        };

        rows.push(ScheduledSession {
            day,
            time,
            course: fields[2].to_string(),
            staff_name: fields[3].to_string(),
            room: fields[4].to_string(),
        });
    }

    (rows, warnings)
}

/// Read a table file, failing only on I/O.
pub fn read_table(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| AppError::Store(format!("Failed to read {:?}: {}", path, e)))
}

/// Iterate 1-based (line number, content) pairs, skipping the header line
/// and blanks.
fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .skip(1)
}

fn skip(warnings: &mut Vec<LoadWarning>, line: usize, reason: String) {
    tracing::warn!("Skipping row at line {}: {}", line, reason);
    warnings.push(LoadWarning { line, reason });
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKLOAD: &str = "\
StaffId,Name,Department,Course,HoursPerWeek
F001,Prof.Sharma,CSE,Data Structures,6
F001,Prof.Sharma,CSE,Algorithms,4
F002,Prof.Verma,ECE,Signals,five
F003,Prof.Rao,CSE,Operating Systems,0
F004,Prof.Iyer,MATH,Calculus,5
";

    const TIMETABLE: &str = "\
Day,Time,Course,Faculty,Room
Monday,09:00-10:00,Data Structures,Prof.Sharma,Room 201
Funday,09:00-10:00,Data Structures,Prof.Sharma,Room 201
Tuesday,13:30-14:30,Signals,Prof.Verma,Room 105
Tuesday,14:30-13:30,Signals,Prof.Verma,Room 105
Wednesday,10:00-11:00,Calculus,Prof.Iyer
";

    #[test]
    fn test_parse_workload_skips_bad_rows() {
        let (rows, warnings) = parse_workload(WORKLOAD);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "Prof.Sharma");
        assert_eq!(rows[0].hours_per_week, 6.0);

        // Non-numeric and non-positive hours both warn
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].reason.contains("non-numeric"));
        assert!(warnings[1].reason.contains("non-positive"));
    }

    #[test]
    fn test_parse_timetable_skips_bad_rows() {
        let (rows, warnings) = parse_timetable(TIMETABLE);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].room, "Room 201");
        assert_eq!(rows[1].time.to_string(), "13:30-14:30");

        // Unknown day, inverted range, short row
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].reason.contains("unknown day"));
        assert!(warnings[2].reason.contains("columns"));
    }

    #[test]
    fn test_warning_line_numbers_are_source_lines() {
        let (_, warnings) = parse_timetable(TIMETABLE);
        assert_eq!(warnings[0].line, 3);
        assert_eq!(warnings[1].line, 5);
        assert_eq!(warnings[2].line, 6);
    }
}

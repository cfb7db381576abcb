//! Row and value types for the staffing tables.

use serde::{Deserialize, Serialize};
use staffdesk_core::{AppError, AppResult};
use std::fmt;

/// One row of the workload table. A staff member may appear in multiple
/// rows, one per course taught.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffAssignment {
    pub staff_id: String,
    pub name: String,
    pub department: String,
    pub course: String,
    /// Weekly contact hours for this course; always positive (enforced at
    /// load, violating rows are skipped).
    pub hours_per_week: f32,
}

/// One row of the timetable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSession {
    pub day: Day,
    pub time: TimeRange,
    pub course: String,
    pub staff_name: String,
    pub room: String,
}

/// Day of week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Parse a day from a full name or a common abbreviation,
    /// case-insensitively.
    pub fn parse(s: &str) -> Option<Day> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" => Some(Day::Monday),
            "tuesday" | "tue" | "tues" => Some(Day::Tuesday),
            "wednesday" | "wed" => Some(Day::Wednesday),
            "thursday" | "thu" | "thur" | "thurs" => Some(Day::Thursday),
            "friday" | "fri" => Some(Day::Friday),
            "saturday" | "sat" => Some(Day::Saturday),
            "sunday" | "sun" => Some(Day::Sunday),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time range within a single day, in minutes since midnight.
///
/// Well-formed ranges satisfy `start < end`; a point in time (e.g., an
/// extracted "at 2 PM") is represented with `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: u16,
    pub end: u16,
}

impl TimeRange {
    /// Construct a range, validating ordering and bounds.
    pub fn new(start: u16, end: u16) -> AppResult<Self> {
        if start > end || end >= 24 * 60 {
            return Err(AppError::Store(format!(
                "Malformed time range: start {} end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// A single point in time.
    pub fn point(minutes: u16) -> Self {
        Self {
            start: minutes,
            end: minutes,
        }
    }

    /// Parse a `HH:MM-HH:MM` range with `start < end`.
    pub fn parse(s: &str) -> AppResult<Self> {
        let (start_str, end_str) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| AppError::Store(format!("Malformed time range: {:?}", s)))?;

        let start = parse_hhmm(start_str)
            .ok_or_else(|| AppError::Store(format!("Malformed start time: {:?}", start_str)))?;
        let end = parse_hhmm(end_str)
            .ok_or_else(|| AppError::Store(format!("Malformed end time: {:?}", end_str)))?;

        if start >= end {
            return Err(AppError::Store(format!(
                "Time range start must precede end: {:?}",
                s
            )));
        }

        Ok(Self { start, end })
    }

    /// Whether a session over this range occupies the instant `t`.
    /// The start is inclusive, the end exclusive.
    pub fn contains(&self, t: u16) -> bool {
        self.start <= t && t < self.end
    }

    /// Whether two ranges overlap. A point range overlaps a session when
    /// the session contains that instant.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        if other.start == other.end {
            return self.contains(other.start);
        }
        if self.start == self.end {
            return other.contains(self.start);
        }
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{:02}:{:02}", self.start / 60, self.start % 60)
        } else {
            write!(
                f,
                "{:02}:{:02}-{:02}:{:02}",
                self.start / 60,
                self.start % 60,
                self.end / 60,
                self.end % 60
            )
        }
    }
}

/// Parse `HH:MM` into minutes since midnight.
pub fn parse_hhmm(s: &str) -> Option<u16> {
    let (h, m) = s.trim().split_once(':')?;
    let h: u16 = h.parse().ok()?;
    let m: u16 = m.parse().ok()?;
    if h >= 24 || m >= 60 {
        return None;
    }
    Some(h * 60 + m)
}

//! Query, fact, and answer types shared across the engine stages.

use serde::Serialize;
use staffdesk_index::PolicyChunk;
use staffdesk_store::{
    Day, DepartmentSummary, ScheduledSession, StaffAssignment, TimeRange, WorkloadTotal,
};

/// Closed set of question kinds the engine can route.
///
/// The variant order is the tie-break order: when two intents score the
/// same, the later (more specific) one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    Policy,
    Room,
    Schedule,
    Workload,
    Availability,
    Summary,
    Unknown,
}

impl QueryIntent {
    /// Tie-break priority; higher wins. `Unknown` never competes, it is
    /// only produced when every intent scores zero.
    pub(crate) fn priority(self) -> u8 {
        match self {
            QueryIntent::Unknown => 0,
            QueryIntent::Policy => 1,
            QueryIntent::Room => 2,
            QueryIntent::Schedule => 3,
            QueryIntent::Workload => 4,
            QueryIntent::Availability => 5,
            QueryIntent::Summary => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryIntent::Policy => "policy",
            QueryIntent::Room => "room",
            QueryIntent::Schedule => "schedule",
            QueryIntent::Workload => "workload",
            QueryIntent::Availability => "availability",
            QueryIntent::Summary => "summary",
            QueryIntent::Unknown => "unknown",
        }
    }
}

/// Slots pulled out of the raw query. Every populated slot except
/// `person_mention` is guaranteed to come from the store vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedEntities {
    pub person: Option<String>,
    pub department: Option<String>,
    pub day: Option<Day>,
    pub time: Option<TimeRange>,
    pub course: Option<String>,
    pub room: Option<String>,
    /// Honorific-prefixed name seen in the query even when it matches no
    /// known staff member. Used only to word "not found" clarifications;
    /// never used as a lookup key.
    pub person_mention: Option<String>,
}

/// One retrieved fact, tagged by source.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    Session(ScheduledSession),
    Assignment(StaffAssignment),
    Policy { chunk: PolicyChunk, score: f32 },
    Workload(WorkloadTotal),
    Department(DepartmentSummary),
    FreeStaff { name: String, department: String },
}

/// How closely the retrieved facts match what the query asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchQuality {
    Exact,
    Fuzzy,
}

/// What kept a retrieval from producing facts.
#[derive(Debug, Clone, PartialEq)]
pub enum Missing {
    /// No known staff member matched; carries the raw mention if one was
    /// seen in the query.
    Person(Option<String>),
    /// Availability needs a day.
    Day,
    /// The intent itself could not be determined.
    Intent,
    /// Entities resolved but nothing in the data matched.
    Data,
    /// A known staff member has no sessions for the requested slot. This
    /// is an answer ("they are free"), not a failed lookup.
    Sessions { name: String, day: Option<Day> },
}

/// A session that makes someone busy during an availability check.
#[derive(Debug, Clone, Serialize)]
pub struct BusyDetail {
    pub name: String,
    pub course: String,
    pub room: String,
    pub time: TimeRange,
}

/// Output of the router stage.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub facts: Vec<Fact>,
    pub quality: MatchQuality,
    pub missing: Option<Missing>,
    /// Busy-staff context for availability answers; narrative-only, never
    /// part of `facts`.
    pub busy: Vec<BusyDetail>,
}

impl Retrieval {
    pub fn with_facts(facts: Vec<Fact>, quality: MatchQuality) -> Self {
        Self {
            facts,
            quality,
            missing: None,
            busy: Vec::new(),
        }
    }

    pub fn empty(missing: Missing) -> Self {
        Self {
            facts: Vec::new(),
            quality: MatchQuality::Exact,
            missing: Some(missing),
            busy: Vec::new(),
        }
    }
}

/// Answer confidence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// The final answer for one query.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerPayload {
    pub intent: QueryIntent,
    pub facts: Vec<Fact>,
    pub narrative: String,
    pub confidence: Confidence,
}

/// Engine status snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub record_count: usize,
    pub chunk_count: usize,
    pub index_backend: String,
}

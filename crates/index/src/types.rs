//! Chunk types for the semantic index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A contiguous segment of policy text treated as one retrieval unit.
///
/// The embedding vector lives in the vector backend, matched to the chunk
/// by position (`id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyChunk {
    /// Position of the chunk within the source document (0-based)
    pub id: u32,

    /// The rule number the chunk started with (0 for preamble text)
    pub rule_number: u32,

    /// Keyword-derived topic bucket
    pub category: ChunkCategory,

    /// Chunk text, whitespace-joined across continuation lines
    pub text: String,

    /// 1-based first source line
    pub line_start: u32,

    /// 1-based last source line
    pub line_end: u32,
}

/// Topic bucket assigned to a policy chunk by keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkCategory {
    WorkloadManagement,
    Scheduling,
    DepartmentManagement,
    FacultyDevelopment,
    General,
}

impl ChunkCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkCategory::WorkloadManagement => "workload management",
            ChunkCategory::Scheduling => "scheduling",
            ChunkCategory::DepartmentManagement => "department management",
            ChunkCategory::FacultyDevelopment => "faculty development",
            ChunkCategory::General => "general",
        }
    }
}

impl fmt::Display for ChunkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

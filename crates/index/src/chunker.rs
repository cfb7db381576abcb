//! Policy text chunking.
//!
//! Splits a policy document into retrieval chunks, one per numbered rule:
//! a line beginning `N.` starts a chunk, continuation lines append to the
//! current chunk, blank lines are skipped. Text before the first numbered
//! rule becomes a single preamble chunk with rule number 0. Each chunk
//! tracks its 1-based source line range and a keyword-derived category.

use crate::types::{ChunkCategory, PolicyChunk};

/// Split policy text into chunks.
pub fn split_policies(content: &str) -> Vec<PolicyChunk> {
    let mut chunks: Vec<PolicyChunk> = Vec::new();
    let mut current: Option<PolicyChunk> = None;

    for (idx, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = (idx + 1) as u32;

        if let Some(number) = leading_rule_number(line) {
            if let Some(chunk) = current.take() {
                chunks.push(finish(chunk, chunks.len() as u32));
            }
            current = Some(PolicyChunk {
                id: 0, // assigned at finish
                rule_number: number,
                category: ChunkCategory::General,
                text: line.to_string(),
                line_start: line_no,
                line_end: line_no,
            });
        } else {
            match current.as_mut() {
                Some(chunk) => {
                    chunk.text.push(' ');
                    chunk.text.push_str(line);
                    chunk.line_end = line_no;
                }
                None => {
                    // Preamble text before the first numbered rule
                    current = Some(PolicyChunk {
                        id: 0,
                        rule_number: 0,
                        category: ChunkCategory::General,
                        text: line.to_string(),
                        line_start: line_no,
                        line_end: line_no,
                    });
                }
            }
        }
    }

    if let Some(chunk) = current.take() {
        chunks.push(finish(chunk, chunks.len() as u32));
    }

    chunks
}

fn finish(mut chunk: PolicyChunk, id: u32) -> PolicyChunk {
    chunk.id = id;
    chunk.category = categorize(&chunk.text);
    chunk
}

/// Rule number of a line shaped like `12. ...`, if any.
fn leading_rule_number(line: &str) -> Option<u32> {
    let (head, _) = line.split_once('.')?;
    if head.is_empty() || !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

/// Assign a topic bucket based on keyword hits, first bucket wins.
fn categorize(text: &str) -> ChunkCategory {
    let lower = text.to_lowercase();
    let hit = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if hit(&["workload", "hours", "teaching"]) {
        ChunkCategory::WorkloadManagement
    } else if hit(&["schedule", "time", "slot", "break"]) {
        ChunkCategory::Scheduling
    } else if hit(&["department", "distribute", "staff"]) {
        ChunkCategory::DepartmentManagement
    } else if hit(&["research", "administrative", "mentoring"]) {
        ChunkCategory::FacultyDevelopment
    } else {
        ChunkCategory::General
    }
}

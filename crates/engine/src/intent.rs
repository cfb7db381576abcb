//! Lexical intent classification.
//!
//! Scores each intent by weighted trigger-phrase hits in the lowercased
//! query. No learned model; the trigger tables below are the whole
//! signal. Ties go to the higher-priority intent (`QueryIntent::priority`),
//! and a query that hits nothing is `Unknown`.

use crate::types::QueryIntent;

type Triggers = &'static [(&'static str, u32)];

const POLICY: Triggers = &[
    ("policy", 3),
    ("policies", 3),
    ("rule", 3),
    ("regulation", 2),
    ("guideline", 2),
    ("allowed", 1),
    ("permitted", 1),
];

const ROOM: Triggers = &[
    ("room", 3),
    ("classroom", 3),
    ("venue", 2),
    ("allocated", 2),
    ("where", 1),
];

const SCHEDULE: Triggers = &[
    ("schedule", 3),
    ("timetable", 3),
    ("session", 2),
    ("lecture", 2),
    ("when", 1),
    ("class", 1),
];

const WORKLOAD: Triggers = &[
    ("workload", 3),
    ("teaching hours", 3),
    ("hours", 2),
    ("load", 2),
    ("how many courses", 2),
];

const AVAILABILITY: Triggers = &[
    ("available", 3),
    ("availability", 3),
    ("free", 3),
    ("unoccupied", 2),
];

const SUMMARY: Triggers = &[
    ("summary", 3),
    ("overview", 3),
    ("department summary", 3),
    ("all staff", 2),
    ("statistics", 2),
    ("report", 2),
];

const TABLES: &[(QueryIntent, Triggers)] = &[
    (QueryIntent::Policy, POLICY),
    (QueryIntent::Room, ROOM),
    (QueryIntent::Schedule, SCHEDULE),
    (QueryIntent::Workload, WORKLOAD),
    (QueryIntent::Availability, AVAILABILITY),
    (QueryIntent::Summary, SUMMARY),
];

/// Classify a raw query. Pure and total.
pub fn classify(query: &str) -> QueryIntent {
    let normalized = query.to_lowercase();

    let mut best = QueryIntent::Unknown;
    let mut best_score = 0u32;
    for &(intent, triggers) in TABLES {
        let score: u32 = triggers
            .iter()
            .filter(|(phrase, _)| normalized.contains(phrase))
            .map(|&(_, weight)| weight)
            .sum();
        if score > best_score || (score == best_score && score > 0 && intent.priority() > best.priority())
        {
            best = intent;
            best_score = score;
        }
    }
    best
}

/// Example phrasings per intent, used to word clarification prompts.
pub fn example_queries(intent: QueryIntent) -> Vec<String> {
    match intent {
        QueryIntent::Policy => vec![
            "What is the policy on teaching hours?".to_string(),
            "Is there a rule about lab sessions?".to_string(),
            "What are the scheduling guidelines?".to_string(),
        ],
        QueryIntent::Room => vec![
            "Which room is allocated to Prof. Sharma on Monday?".to_string(),
            "Where does the Data Structures class meet?".to_string(),
        ],
        QueryIntent::Schedule => vec![
            "What is Prof. Sharma's schedule on Monday?".to_string(),
            "When is the next Databases session?".to_string(),
        ],
        QueryIntent::Workload => vec![
            "What is Prof. Sharma's workload?".to_string(),
            "How many teaching hours does the CSE department carry?".to_string(),
        ],
        QueryIntent::Availability => vec![
            "Which faculty is free on Tuesday at 2 PM?".to_string(),
            "Who is available on Friday morning?".to_string(),
        ],
        QueryIntent::Summary => vec![
            "Give me a summary of all departments.".to_string(),
            "Show an overview of staff workload.".to_string(),
        ],
        QueryIntent::Unknown => vec![
            "What is Prof. Sharma's workload?".to_string(),
            "Which faculty is free on Tuesday at 2 PM?".to_string(),
            "What is the policy on teaching hours?".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_intents() {
        assert_eq!(
            classify("Which room is allocated Prof. Sharma on Monday?"),
            QueryIntent::Room
        );
        assert_eq!(classify("What is Prof. Mehta's workload?"), QueryIntent::Workload);
        assert_eq!(
            classify("Which faculty is free on Tuesday at 2 PM?"),
            QueryIntent::Availability
        );
        assert_eq!(classify("What is the leave policy?"), QueryIntent::Policy);
        assert_eq!(classify("Show the timetable"), QueryIntent::Schedule);
        assert_eq!(classify("Give me a department summary"), QueryIntent::Summary);
    }

    #[test]
    fn test_unknown_on_no_signal() {
        assert_eq!(classify("hello there"), QueryIntent::Unknown);
        assert_eq!(classify(""), QueryIntent::Unknown);
    }

    #[test]
    fn test_deterministic() {
        let q = "are there rules about free time and hours?";
        let first = classify(q);
        for _ in 0..10 {
            assert_eq!(classify(q), first);
        }
    }

    #[test]
    fn test_tie_goes_to_higher_priority() {
        // "rule" (policy, 3) vs "free" (availability, 3)
        assert_eq!(classify("rule free"), QueryIntent::Availability);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("WORKLOAD"), classify("workload"));
    }
}

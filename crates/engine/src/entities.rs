//! Vocabulary-bound entity extraction.
//!
//! Every populated slot comes from the store's vocabulary snapshot; an
//! unmatched token is dropped, never guessed. The one exception is
//! `person_mention`, which records an honorific-prefixed name seen in the
//! query so a "not found" clarification can quote it back.

use crate::types::ExtractedEntities;
use once_cell::sync::Lazy;
use regex::Regex;
use staffdesk_store::{parse_hhmm, Day, TimeRange, Vocabulary};

const HONORIFICS: &[&str] = &["professor", "prof", "dr"];

static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    // Surname must be capitalized so "which professor is free" does not
    // produce a mention of "is".
    Regex::new(r"\b([Pp]rofessor|[Pp]rof\.?|[Dd]r\.?)\s*([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)").unwrap()
});

static TIME_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}:\d{2})\s*-\s*(\d{1,2}:\d{2})\b").unwrap());

static TIME_AMPM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").unwrap());

static TIME_POINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2}:\d{2})\b").unwrap());

/// Extract entity slots from a raw query against the known vocabulary.
pub fn extract(query: &str, vocab: &Vocabulary) -> ExtractedEntities {
    let canon_query = canonical(query);

    ExtractedEntities {
        person: best_match(&canon_query, &vocab.names),
        department: best_match(&canon_query, &vocab.departments),
        day: extract_day(&canon_query),
        time: extract_time(query),
        course: best_match(&canon_query, &vocab.courses),
        room: best_match(&canon_query, &vocab.rooms),
        person_mention: extract_mention(query),
    }
}

/// Lowercase, map punctuation to spaces, drop honorific tokens, collapse
/// whitespace. Both the query and vocabulary entries go through this so
/// "Prof.Sharma" and "prof. sharma" compare equal.
fn canonical(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut words: Vec<&str> = Vec::new();
    for word in lower.split(|c: char| !c.is_alphanumeric() && c != ':') {
        if word.is_empty() || HONORIFICS.contains(&word) {
            continue;
        }
        words.push(word);
    }
    words.join(" ")
}

/// Longest vocabulary entry found in the query; equal lengths break
/// toward the earlier occurrence, then vocabulary order.
fn best_match(canon_query: &str, vocab: &[String]) -> Option<String> {
    let mut best: Option<(usize, usize, &String)> = None; // (len, pos, entry)
    for entry in vocab {
        let canon_entry = canonical(entry);
        if canon_entry.is_empty() {
            continue;
        }
        if let Some(pos) = find_word_bounded(canon_query, &canon_entry) {
            let candidate = (canon_entry.len(), pos, entry);
            let better = match best {
                None => true,
                Some((len, at, _)) => {
                    candidate.0 > len || (candidate.0 == len && candidate.1 < at)
                }
            };
            if better {
                best = Some(candidate);
            }
        }
    }
    best.map(|(_, _, entry)| entry.clone())
}

/// Substring search that only accepts matches aligned on word boundaries,
/// so "Art" does not match inside "Start".
fn find_word_bounded(haystack: &str, needle: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(needle) {
        let pos = from + rel;
        let end = pos + needle.len();
        let left_ok = pos == 0 || haystack.as_bytes()[pos - 1] == b' ';
        let right_ok = end == haystack.len() || haystack.as_bytes()[end] == b' ';
        if left_ok && right_ok {
            return Some(pos);
        }
        // Step one full character so the next slice stays on a boundary.
        from = pos
            + haystack[pos..]
                .chars()
                .next()
                .map_or(1, |c| c.len_utf8());
    }
    None
}

fn extract_day(canon_query: &str) -> Option<Day> {
    canon_query.split(' ').find_map(Day::parse)
}

fn extract_time(query: &str) -> Option<TimeRange> {
    if let Some(caps) = TIME_RANGE_RE.captures(query) {
        let start = parse_hhmm(&caps[1])?;
        let end = parse_hhmm(&caps[2])?;
        return TimeRange::new(start, end).ok();
    }

    if let Some(caps) = TIME_AMPM_RE.captures(query) {
        let hour: u16 = caps[1].parse().ok()?;
        if hour == 0 || hour > 12 {
            return None;
        }
        let minute: u16 = caps
            .get(2)
            .map(|m| m.as_str().parse().ok())
            .unwrap_or(Some(0))?;
        if minute >= 60 {
            return None;
        }
        let hour24 = match caps[3].to_lowercase().as_str() {
            "pm" if hour != 12 => hour + 12,
            "am" if hour == 12 => 0,
            _ => hour,
        };
        return Some(TimeRange::point(hour24 * 60 + minute));
    }

    TIME_POINT_RE
        .captures(query)
        .and_then(|caps| parse_hhmm(&caps[1]))
        .map(TimeRange::point)
}

fn extract_mention(query: &str) -> Option<String> {
    MENTION_RE.captures(query).map(|caps| {
        let honorific = caps[1].trim_end_matches('.');
        // Normalized presentation form, e.g. "Prof. Mehta".
        let title = match honorific.to_lowercase().as_str() {
            "dr" => "Dr.",
            _ => "Prof.",
        };
        format!("{} {}", title, &caps[2])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary {
            names: vec!["Prof.Sharma".to_string(), "Dr. Anita Rao".to_string()],
            departments: vec!["CSE".to_string(), "Mathematics".to_string()],
            courses: vec!["Data Structures".to_string(), "Data Mining".to_string()],
            rooms: vec!["Room 201".to_string()],
        }
    }

    #[test]
    fn test_person_with_honorific_variants() {
        let e = extract("Which room is allocated Prof. Sharma on Monday?", &vocab());
        assert_eq!(e.person.as_deref(), Some("Prof.Sharma"));
        assert_eq!(e.day, Some(Day::Monday));
    }

    #[test]
    fn test_person_without_honorific() {
        let e = extract("workload of sharma", &vocab());
        assert_eq!(e.person.as_deref(), Some("Prof.Sharma"));
    }

    #[test]
    fn test_unknown_name_not_invented() {
        let e = extract("What is Prof. Mehta's workload?", &vocab());
        assert_eq!(e.person, None);
        assert_eq!(e.person_mention.as_deref(), Some("Prof. Mehta"));
    }

    #[test]
    fn test_longest_course_match() {
        let e = extract("who teaches data structures this term", &vocab());
        assert_eq!(e.course.as_deref(), Some("Data Structures"));
    }

    #[test]
    fn test_department_match() {
        let e = extract("summary for the mathematics department", &vocab());
        assert_eq!(e.department.as_deref(), Some("Mathematics"));
    }

    #[test]
    fn test_time_ampm() {
        let e = extract("Which faculty is free on Tuesday at 2 PM?", &vocab());
        assert_eq!(e.day, Some(Day::Tuesday));
        assert_eq!(e.time, Some(TimeRange::point(14 * 60)));
    }

    #[test]
    fn test_time_range() {
        let e = extract("who teaches 09:00-10:00 on monday", &vocab());
        assert_eq!(e.time, Some(TimeRange::new(540, 600).unwrap()));
    }

    #[test]
    fn test_time_noon_and_midnight() {
        assert_eq!(
            extract("free at 12 pm?", &vocab()).time,
            Some(TimeRange::point(12 * 60))
        );
        assert_eq!(
            extract("free at 12 am?", &vocab()).time,
            Some(TimeRange::point(0))
        );
    }

    #[test]
    fn test_room_match() {
        let e = extract("Who is teaching in room 201 on Monday?", &vocab());
        assert_eq!(e.room.as_deref(), Some("Room 201"));
    }

    #[test]
    fn test_no_match_leaves_slots_empty() {
        let e = extract("tell me something", &vocab());
        assert_eq!(e, ExtractedEntities::default());
    }

    #[test]
    fn test_word_boundary() {
        // "CSE" must not match inside another word
        let e = extract("discuss excseed limits", &vocab());
        assert_eq!(e.department, None);
    }
}

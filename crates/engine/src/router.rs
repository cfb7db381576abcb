//! Intent dispatch and fact retrieval.
//!
//! Maps (intent, entities) onto the record store or the semantic index
//! and collects facts in a stable order: source row order for table
//! facts, similarity-descending for policy chunks. Missing entities
//! degrade to broader lookups instead of failing; only a person mention
//! that matches nobody produces an empty, clarification-flagged result.

use crate::types::{BusyDetail, ExtractedEntities, Fact, MatchQuality, Missing, QueryIntent, Retrieval};
use staffdesk_core::AppResult;
use staffdesk_index::SemanticIndex;
use staffdesk_store::{Day, RecordStore, ScheduledSession, TimeRange};

/// Retrieve the facts for a classified, extracted query.
pub async fn resolve(
    intent: QueryIntent,
    entities: &ExtractedEntities,
    raw_query: &str,
    store: &RecordStore,
    index: &SemanticIndex,
    top_k: usize,
) -> AppResult<Retrieval> {
    match intent {
        QueryIntent::Policy => resolve_policy(raw_query, index, top_k).await,
        QueryIntent::Room | QueryIntent::Schedule => Ok(resolve_sessions(entities, store)),
        QueryIntent::Workload => Ok(resolve_workload(entities, store)),
        QueryIntent::Availability => Ok(resolve_availability(entities, store)),
        QueryIntent::Summary => Ok(resolve_summary(entities, store)),
        QueryIntent::Unknown => Ok(Retrieval::empty(Missing::Intent)),
    }
}

async fn resolve_policy(
    raw_query: &str,
    index: &SemanticIndex,
    top_k: usize,
) -> AppResult<Retrieval> {
    let hits = index.query(raw_query, top_k.max(1)).await?;
    if hits.is_empty() {
        return Ok(Retrieval::empty(Missing::Data));
    }
    let facts = hits
        .into_iter()
        .map(|hit| Fact::Policy {
            chunk: hit.chunk,
            score: hit.score,
        })
        .collect();
    Ok(Retrieval::with_facts(facts, MatchQuality::Exact))
}

fn resolve_sessions(entities: &ExtractedEntities, store: &RecordStore) -> Retrieval {
    let sessions: Vec<&ScheduledSession>;
    let mut quality = MatchQuality::Exact;

    if let Some(person) = &entities.person {
        let exact: Vec<&ScheduledSession> = store
            .sessions()
            .iter()
            .filter(|s| same_person(&s.staff_name, person))
            .filter(|s| entities.day.map_or(true, |d| s.day == d))
            .collect();
        if exact.is_empty() {
            // Partial-match fallback before declaring "no data".
            sessions = store.sessions_for_person(person, entities.day);
            quality = MatchQuality::Fuzzy;
        } else {
            sessions = exact;
        }
        if sessions.is_empty() {
            // The name came from the vocabulary, so the person exists;
            // an empty result means a clear slot, not a missing record.
            return Retrieval::empty(Missing::Sessions {
                name: person.clone(),
                day: entities.day,
            });
        }
    } else if let Some(room) = &entities.room {
        sessions = store.sessions_for_room(room, entities.day);
        if sessions.is_empty() {
            return Retrieval::empty(Missing::Data);
        }
    } else if let Some(department) = &entities.department {
        let staff: Vec<String> = store
            .assignments_for_department(department)
            .into_iter()
            .map(|a| a.name.clone())
            .collect();
        sessions = store
            .sessions()
            .iter()
            .filter(|s| staff.iter().any(|name| same_person(&s.staff_name, name)))
            .filter(|s| entities.day.map_or(true, |d| s.day == d))
            .collect();
        if sessions.is_empty() {
            return Retrieval::empty(Missing::Data);
        }
    } else if let Some(course) = &entities.course {
        let needle = course.to_lowercase();
        sessions = store
            .sessions()
            .iter()
            .filter(|s| s.course.to_lowercase().contains(&needle))
            .filter(|s| entities.day.map_or(true, |d| s.day == d))
            .collect();
        if sessions.is_empty() {
            return Retrieval::empty(Missing::Data);
        }
    } else {
        return Retrieval::empty(Missing::Person(entities.person_mention.clone()));
    }

    let filtered: Vec<&ScheduledSession> = sessions
        .into_iter()
        .filter(|s| entities.time.map_or(true, |t| s.time.overlaps(&t)))
        .collect();
    if filtered.is_empty() {
        return Retrieval::empty(Missing::Data);
    }

    let facts = filtered.into_iter().cloned().map(Fact::Session).collect();
    Retrieval::with_facts(facts, quality)
}

fn resolve_workload(entities: &ExtractedEntities, store: &RecordStore) -> Retrieval {
    if let Some(person) = &entities.person {
        let mut quality = MatchQuality::Exact;
        let mut rows: Vec<&staffdesk_store::StaffAssignment> = store
            .assignments()
            .iter()
            .filter(|a| same_person(&a.name, person))
            .collect();
        if rows.is_empty() {
            rows = store.assignments_for_person(person);
            quality = MatchQuality::Fuzzy;
        }
        if rows.is_empty() {
            // Known person (vocabulary-bound) with no workload rows.
            return Retrieval::empty(Missing::Data);
        }
        let facts = rows.into_iter().cloned().map(Fact::Assignment).collect();
        return Retrieval::with_facts(facts, quality);
    }

    // A named person that matched nothing must not silently widen into an
    // aggregate; quote them back instead.
    if let Some(mention) = &entities.person_mention {
        return Retrieval::empty(Missing::Person(Some(mention.clone())));
    }

    if let Some(department) = &entities.department {
        let rows = store.assignments_for_department(department);
        if rows.is_empty() {
            return Retrieval::empty(Missing::Data);
        }
        let facts = rows.into_iter().cloned().map(Fact::Assignment).collect();
        return Retrieval::with_facts(facts, MatchQuality::Exact);
    }

    if let Some(course) = &entities.course {
        let rows = store.assignments_for_course(course);
        if !rows.is_empty() {
            let facts = rows.into_iter().cloned().map(Fact::Assignment).collect();
            return Retrieval::with_facts(facts, MatchQuality::Exact);
        }
    }

    let ranking = store.workload_ranking();
    if ranking.is_empty() {
        return Retrieval::empty(Missing::Data);
    }
    let facts = ranking.into_iter().map(Fact::Workload).collect();
    Retrieval::with_facts(facts, MatchQuality::Exact)
}

fn resolve_availability(entities: &ExtractedEntities, store: &RecordStore) -> Retrieval {
    let day = match entities.day {
        Some(day) => day,
        None => return Retrieval::empty(Missing::Day),
    };

    let busy_sessions = busy_on(store, day, entities.time);
    let busy: Vec<BusyDetail> = busy_sessions
        .iter()
        .map(|s| BusyDetail {
            name: s.staff_name.clone(),
            course: s.course.clone(),
            room: s.room.clone(),
            time: s.time,
        })
        .collect();

    let mut facts = Vec::new();
    for name in store.staff_names() {
        if let Some(department) = &entities.department {
            let dept = store.department_of(&name).unwrap_or_default();
            if !dept.eq_ignore_ascii_case(department) {
                continue;
            }
        }
        let is_busy = busy_sessions.iter().any(|s| same_person(&s.staff_name, &name));
        if !is_busy {
            let department = store.department_of(&name).unwrap_or_default().to_string();
            facts.push(Fact::FreeStaff { name, department });
        }
    }

    let mut retrieval = if facts.is_empty() {
        Retrieval::empty(Missing::Data)
    } else {
        Retrieval::with_facts(facts, MatchQuality::Exact)
    };
    retrieval.busy = busy;
    retrieval
}

fn busy_on(store: &RecordStore, day: Day, time: Option<TimeRange>) -> Vec<ScheduledSession> {
    match time {
        Some(slot) => store
            .sessions_overlapping(day, slot)
            .into_iter()
            .cloned()
            .collect(),
        None => store
            .sessions()
            .iter()
            .filter(|s| s.day == day)
            .cloned()
            .collect(),
    }
}

fn resolve_summary(entities: &ExtractedEntities, store: &RecordStore) -> Retrieval {
    let summaries = store.department_summaries();
    let selected: Vec<_> = match &entities.department {
        Some(department) => summaries
            .into_iter()
            .filter(|s| s.department.eq_ignore_ascii_case(department))
            .collect(),
        None => summaries,
    };
    if selected.is_empty() {
        return Retrieval::empty(Missing::Data);
    }
    let facts = selected.into_iter().map(Fact::Department).collect();
    Retrieval::with_facts(facts, MatchQuality::Exact)
}

/// Name equality across the two tables' spellings: honorifics and
/// punctuation ignored.
fn same_person(a: &str, b: &str) -> bool {
    fn canon(s: &str) -> String {
        s.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !matches!(*w, "prof" | "professor" | "dr"))
            .collect::<Vec<_>>()
            .join(" ")
    }
    canon(a) == canon(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use staffdesk_store::{StaffAssignment, TimeRange};

    fn store() -> RecordStore {
        let assignments = vec![
            StaffAssignment {
                staff_id: "F1".to_string(),
                name: "Prof. Sharma".to_string(),
                department: "CSE".to_string(),
                course: "Data Structures".to_string(),
                hours_per_week: 6.0,
            },
            StaffAssignment {
                staff_id: "F2".to_string(),
                name: "Prof. Kumar".to_string(),
                department: "CSE".to_string(),
                course: "Databases".to_string(),
                hours_per_week: 4.0,
            },
        ];
        let sessions = vec![ScheduledSession {
            day: Day::Tuesday,
            time: TimeRange::parse("13:30-14:30").unwrap(),
            course: "Databases".to_string(),
            staff_name: "Prof.Kumar".to_string(),
            room: "Room 105".to_string(),
        }];
        RecordStore::from_rows(assignments, sessions)
    }

    #[test]
    fn test_availability_complement() {
        let store = store();
        let entities = ExtractedEntities {
            day: Some(Day::Tuesday),
            time: Some(TimeRange::point(14 * 60)),
            ..Default::default()
        };
        let retrieval = resolve_availability(&entities, &store);

        let free: Vec<&str> = retrieval
            .facts
            .iter()
            .map(|f| match f {
                Fact::FreeStaff { name, .. } => name.as_str(),
                other => panic!("unexpected fact {:?}", other),
            })
            .collect();
        assert_eq!(free, vec!["Prof. Sharma"]);
        assert_eq!(retrieval.busy.len(), 1);
        assert_eq!(retrieval.busy[0].name, "Prof.Kumar");
    }

    #[test]
    fn test_availability_needs_day() {
        let retrieval = resolve_availability(&ExtractedEntities::default(), &store());
        assert_eq!(retrieval.missing, Some(Missing::Day));
        assert!(retrieval.facts.is_empty());
    }

    #[test]
    fn test_workload_unmatched_mention_does_not_widen() {
        let entities = ExtractedEntities {
            person_mention: Some("Prof. Mehta".to_string()),
            ..Default::default()
        };
        let retrieval = resolve_workload(&entities, &store());
        assert!(retrieval.facts.is_empty());
        assert_eq!(
            retrieval.missing,
            Some(Missing::Person(Some("Prof. Mehta".to_string())))
        );
    }

    #[test]
    fn test_workload_global_ranking() {
        let retrieval = resolve_workload(&ExtractedEntities::default(), &store());
        assert!(matches!(retrieval.facts[0], Fact::Workload(ref w) if w.name == "Prof. Sharma"));
    }

    #[test]
    fn test_sessions_cross_table_spelling() {
        // Workload spells "Prof. Kumar", timetable "Prof.Kumar".
        let entities = ExtractedEntities {
            person: Some("Prof. Kumar".to_string()),
            ..Default::default()
        };
        let retrieval = resolve_sessions(&entities, &store());
        assert_eq!(retrieval.quality, MatchQuality::Exact);
        assert!(matches!(retrieval.facts[0], Fact::Session(ref s) if s.room == "Room 105"));
    }

    #[test]
    fn test_course_lookup_without_person() {
        let entities = ExtractedEntities {
            course: Some("Databases".to_string()),
            ..Default::default()
        };
        let retrieval = resolve_workload(&entities, &store());
        assert!(
            matches!(retrieval.facts[0], Fact::Assignment(ref a) if a.name == "Prof. Kumar")
        );

        let retrieval = resolve_sessions(&entities, &store());
        assert!(matches!(retrieval.facts[0], Fact::Session(ref s) if s.room == "Room 105"));
    }

    #[test]
    fn test_known_person_with_clear_day_is_not_reported_missing() {
        // Prof. Sharma is in the workload table but teaches nothing on
        // Friday; that is a free day, not an unknown person.
        let entities = ExtractedEntities {
            person: Some("Prof. Sharma".to_string()),
            day: Some(Day::Friday),
            ..Default::default()
        };
        let retrieval = resolve_sessions(&entities, &store());
        assert!(retrieval.facts.is_empty());
        assert_eq!(
            retrieval.missing,
            Some(Missing::Sessions {
                name: "Prof. Sharma".to_string(),
                day: Some(Day::Friday),
            })
        );
    }

    #[test]
    fn test_known_person_without_workload_rows_degrades_to_no_data() {
        let store = RecordStore::from_rows(
            vec![],
            vec![ScheduledSession {
                day: Day::Monday,
                time: TimeRange::parse("09:00-10:00").unwrap(),
                course: "Signals".to_string(),
                staff_name: "Prof.Verma".to_string(),
                room: "Room 310".to_string(),
            }],
        );
        let entities = ExtractedEntities {
            person: Some("Prof.Verma".to_string()),
            ..Default::default()
        };
        let retrieval = resolve_workload(&entities, &store);
        assert!(retrieval.facts.is_empty());
        assert_eq!(retrieval.missing, Some(Missing::Data));
    }

    #[test]
    fn test_room_occupancy_lookup() {
        let entities = ExtractedEntities {
            room: Some("Room 105".to_string()),
            ..Default::default()
        };
        let retrieval = resolve_sessions(&entities, &store());
        assert_eq!(retrieval.quality, MatchQuality::Exact);
        assert!(
            matches!(retrieval.facts[0], Fact::Session(ref s) if s.staff_name == "Prof.Kumar")
        );
    }

    #[test]
    fn test_summary_grouping() {
        let retrieval = resolve_summary(&ExtractedEntities::default(), &store());
        assert!(
            matches!(retrieval.facts[0], Fact::Department(ref d) if d.department == "CSE" && d.staff_count == 2)
        );
    }
}

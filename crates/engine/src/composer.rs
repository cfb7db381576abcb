//! Answer composition.
//!
//! Builds a deterministic templated narrative per intent, then optionally
//! asks the generation service for a more fluent restatement. Generation
//! is a refinement layer only: a single bounded attempt whose failure
//! falls back to the template and never touches the confidence tier.

use crate::intent::example_queries;
use crate::prompt::render_refinement;
use crate::types::{
    AnswerPayload, Confidence, ExtractedEntities, Fact, MatchQuality, Missing, QueryIntent,
    Retrieval,
};
use staffdesk_llm::{GenClient, GenRequest};

/// Compose the final payload for one query.
pub async fn compose(
    intent: QueryIntent,
    retrieval: Retrieval,
    entities: &ExtractedEntities,
    raw_query: &str,
    gen: Option<&dyn GenClient>,
    model: &str,
) -> AnswerPayload {
    let confidence = confidence_for(intent, &retrieval);
    let mut narrative = narrative_for(intent, &retrieval, entities);

    if let Some(client) = gen {
        if !retrieval.facts.is_empty() {
            match refine(client, model, raw_query, &retrieval.facts, &narrative).await {
                Ok(refined) => narrative = refined,
                Err(e) => {
                    tracing::warn!("Generation refinement failed, using template: {}", e);
                }
            }
        }
    }

    AnswerPayload {
        intent,
        facts: retrieval.facts,
        narrative,
        confidence,
    }
}

fn confidence_for(intent: QueryIntent, retrieval: &Retrieval) -> Confidence {
    if intent == QueryIntent::Unknown || retrieval.facts.is_empty() {
        Confidence::Low
    } else if retrieval.quality == MatchQuality::Fuzzy {
        Confidence::Medium
    } else {
        Confidence::High
    }
}

fn narrative_for(
    intent: QueryIntent,
    retrieval: &Retrieval,
    entities: &ExtractedEntities,
) -> String {
    if retrieval.facts.is_empty() {
        // Availability with a resolved day but nobody free is a real
        // answer, not a clarification.
        if intent == QueryIntent::Availability && retrieval.missing == Some(Missing::Data) {
            return format!("No staff members are free{}.", slot_phrase(entities));
        }
        return clarification(intent, retrieval.missing.as_ref());
    }

    match intent {
        QueryIntent::Policy => {
            let mut lines = vec!["Relevant policies:".to_string()];
            for fact in &retrieval.facts {
                if let Fact::Policy { chunk, .. } = fact {
                    lines.push(format!("- {}", chunk.text));
                }
            }
            lines.join("\n")
        }
        QueryIntent::Room | QueryIntent::Schedule => {
            let lines: Vec<String> = retrieval
                .facts
                .iter()
                .filter_map(|fact| match fact {
                    Fact::Session(s) => Some(format!(
                        "{} has {} in {} on {} at {}.",
                        s.staff_name, s.course, s.room, s.day, s.time
                    )),
                    _ => None,
                })
                .collect();
            lines.join("\n")
        }
        QueryIntent::Workload => workload_narrative(retrieval),
        QueryIntent::Availability => {
            let free: Vec<&str> = retrieval
                .facts
                .iter()
                .filter_map(|fact| match fact {
                    Fact::FreeStaff { name, .. } => Some(name.as_str()),
                    _ => None,
                })
                .collect();
            let mut text = format!("Free{}: {}.", slot_phrase(entities), free.join(", "));
            if !retrieval.busy.is_empty() {
                let busy: Vec<String> = retrieval
                    .busy
                    .iter()
                    .map(|b| format!("{} ({}, {}, {})", b.name, b.course, b.room, b.time))
                    .collect();
                text.push_str(&format!(" Busy: {}.", busy.join("; ")));
            }
            text
        }
        QueryIntent::Summary => {
            let lines: Vec<String> = retrieval
                .facts
                .iter()
                .filter_map(|fact| match fact {
                    Fact::Department(d) => Some(format!(
                        "{}: {} staff, {} courses, {:.1} total hours per week.",
                        d.department, d.staff_count, d.course_count, d.total_hours
                    )),
                    _ => None,
                })
                .collect();
            lines.join("\n")
        }
        QueryIntent::Unknown => clarification(intent, retrieval.missing.as_ref()),
    }
}

fn workload_narrative(retrieval: &Retrieval) -> String {
    let assignments: Vec<_> = retrieval
        .facts
        .iter()
        .filter_map(|fact| match fact {
            Fact::Assignment(a) => Some(a),
            _ => None,
        })
        .collect();
    if !assignments.is_empty() {
        let total: f32 = assignments.iter().map(|a| a.hours_per_week).sum();
        let courses: Vec<String> = assignments
            .iter()
            .map(|a| format!("{} ({:.1} h/week)", a.course, a.hours_per_week))
            .collect();
        return format!(
            "{} teaches {}, a total of {:.1} hours per week.",
            assignments[0].name,
            courses.join(", "),
            total
        );
    }

    let lines: Vec<String> = retrieval
        .facts
        .iter()
        .filter_map(|fact| match fact {
            Fact::Workload(w) => Some(format!(
                "{} ({}): {:.1} hours per week across {} course(s).",
                w.name,
                w.department,
                w.total_hours,
                w.courses.len()
            )),
            _ => None,
        })
        .collect();
    let mut text = "Workload by staff member, highest first:\n".to_string();
    text.push_str(&lines.join("\n"));
    text
}

fn slot_phrase(entities: &ExtractedEntities) -> String {
    let mut phrase = String::new();
    if let Some(day) = entities.day {
        phrase.push_str(&format!(" on {}", day));
    }
    if let Some(time) = entities.time {
        phrase.push_str(&format!(" at {}", time));
    }
    phrase
}

fn clarification(intent: QueryIntent, missing: Option<&Missing>) -> String {
    let lead = match missing {
        // A clear slot for a known person is a complete answer, not a
        // prompt to rephrase.
        Some(Missing::Sessions { name, day }) => {
            return match day {
                Some(day) => format!(
                    "{} has no classes scheduled on {}. They appear to be free that day.",
                    name, day
                ),
                None => format!("{} has no classes in the timetable.", name),
            };
        }
        Some(Missing::Person(Some(mention))) => {
            format!("I could not find {} in the staffing records.", mention)
        }
        Some(Missing::Person(None)) => {
            "I need a staff name or a department to answer that.".to_string()
        }
        Some(Missing::Day) => "I need a day of the week to check availability.".to_string(),
        Some(Missing::Intent) | None => {
            "I am not sure what you are asking about.".to_string()
        }
        Some(Missing::Data) => "I could not find any matching records.".to_string(),
    };

    let examples = example_queries(intent);
    let mut text = lead;
    text.push_str(" You could try, for example:");
    for example in examples.iter().take(3) {
        text.push_str(&format!("\n- {}", example));
    }
    text
}

async fn refine(
    client: &dyn GenClient,
    model: &str,
    raw_query: &str,
    facts: &[Fact],
    draft: &str,
) -> staffdesk_core::AppResult<String> {
    let facts_json = serde_json::to_string_pretty(facts)?;
    let prompt = render_refinement(raw_query, &facts_json, draft)?;
    let request = GenRequest::new(prompt, model).with_temperature(0.2);
    let response = client.complete(&request).await?;

    let content = response.content.trim();
    if content.is_empty() {
        return Err(staffdesk_core::AppError::Generation(
            "Empty generation response".to_string(),
        ));
    }
    Ok(content.to_string())
}

//! End-to-end scenarios through the engine facade.

use staffdesk_core::config::AppConfig;
use staffdesk_core::{AppError, AppResult};
use staffdesk_engine::{Confidence, Engine, Fact, QueryIntent};
use staffdesk_index::{create_provider, FlatBackend, SemanticIndex};
use staffdesk_llm::{GenClient, GenRequest, GenResponse};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const WORKLOAD_CSV: &str = "\
StaffId,Name,Department,Course,HoursPerWeek
F1,Prof. Sharma,CSE,Data Structures,6
F2,Prof. Kumar,CSE,Databases,4
";

const TIMETABLE_CSV: &str = "\
Day,Time,Course,Faculty,Room
Monday,09:00-10:00,Data Structures,Prof.Sharma,Room 201
Tuesday,13:30-14:30,Databases,Prof.Kumar,Room 105
";

const POLICIES_TXT: &str = "\
Institute staffing policies.

1. Maximum workload per professor: 12 hours per week.
2. Classes must not be scheduled during the lunch break.
3. Each department must distribute courses evenly among staff.
";

fn write_fixtures(dir: &Path) -> AppConfig {
    std::fs::write(dir.join("workload.csv"), WORKLOAD_CSV).unwrap();
    std::fs::write(dir.join("timetable.csv"), TIMETABLE_CSV).unwrap();
    std::fs::write(dir.join("policies.txt"), POLICIES_TXT).unwrap();

    AppConfig {
        workload_file: dir.join("workload.csv"),
        timetable_file: dir.join("timetable.csv"),
        policies_file: dir.join("policies.txt"),
        index_dir: dir.join("index"),
        ..AppConfig::default()
    }
}

async fn engine(dir: &Path) -> Engine {
    Engine::new(write_fixtures(dir)).await.unwrap()
}

#[tokio::test]
async fn scenario_room_lookup_names_the_room() {
    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path()).await;

    let payload = engine
        .answer("Which room is allocated Prof. Sharma on Monday?")
        .await;

    assert_eq!(payload.intent, QueryIntent::Room);
    assert!(payload.narrative.contains("Room 201"));
    assert!(payload
        .facts
        .iter()
        .any(|f| matches!(f, Fact::Session(s) if s.room == "Room 201")));
    assert_eq!(payload.confidence, Confidence::High);
}

#[tokio::test]
async fn known_person_on_a_clear_day_is_reported_free() {
    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path()).await;

    let payload = engine
        .answer("What is Prof. Sharma's schedule on Friday?")
        .await;

    assert_eq!(payload.intent, QueryIntent::Schedule);
    assert!(payload.facts.is_empty());
    assert!(payload.narrative.contains("free"));
    assert!(!payload.narrative.contains("could not find"));
}

#[tokio::test]
async fn scenario_unknown_person_gets_clarification() {
    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path()).await;

    let payload = engine.answer("What is Prof. Mehta's workload?").await;

    assert_eq!(payload.intent, QueryIntent::Workload);
    assert!(payload.facts.is_empty());
    assert!(payload.narrative.contains("Prof. Mehta"));
    assert_eq!(payload.confidence, Confidence::Low);
}

#[tokio::test]
async fn scenario_free_faculty_complement() {
    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path()).await;

    let payload = engine
        .answer("Which faculty is free on Tuesday at 2 PM?")
        .await;

    assert_eq!(payload.intent, QueryIntent::Availability);
    let free: Vec<&str> = payload
        .facts
        .iter()
        .filter_map(|f| match f {
            Fact::FreeStaff { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(free, vec!["Prof. Sharma"]);
    assert!(payload.narrative.contains("Prof. Sharma"));
}

#[tokio::test]
async fn scenario_policy_top_hit() {
    let provider = create_provider(&AppConfig::default().embedding).unwrap();
    let index = SemanticIndex::build(POLICIES_TXT, provider, Box::new(FlatBackend::new()))
        .await
        .unwrap();

    let hits = index.query("maximum workload per professor", 3).await.unwrap();
    assert!(hits[0]
        .chunk
        .text
        .contains("Maximum workload per professor: 12 hours per week."));
}

#[derive(Debug)]
struct TimingOutGenClient;

#[async_trait::async_trait]
impl GenClient for TimingOutGenClient {
    fn provider_name(&self) -> &str {
        "timing-out"
    }

    async fn complete(&self, _request: &GenRequest) -> AppResult<GenResponse> {
        Err(AppError::Generation("request timed out".to_string()))
    }
}

#[tokio::test]
async fn scenario_generation_failure_falls_back_to_template() {
    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path())
        .await
        .with_gen_client(Arc::new(TimingOutGenClient));

    let payload = engine
        .answer("Which room is allocated Prof. Sharma on Monday?")
        .await;

    assert!(!payload.narrative.is_empty());
    assert!(payload.narrative.contains("Room 201"));
    // Generation failure must not dent confidence.
    assert_eq!(payload.confidence, Confidence::High);
}

#[tokio::test]
async fn persisted_index_preserves_query_ordering() {
    let dir = TempDir::new().unwrap();
    let provider = create_provider(&AppConfig::default().embedding).unwrap();
    let built = SemanticIndex::build(POLICIES_TXT, provider.clone(), Box::new(FlatBackend::new()))
        .await
        .unwrap();
    built.save(dir.path()).unwrap();

    let loaded = SemanticIndex::load(dir.path(), provider, Box::new(FlatBackend::new())).unwrap();

    for query in ["lunch break", "workload limits", "course distribution"] {
        let before: Vec<u32> = built
            .query(query, 3)
            .await
            .unwrap()
            .iter()
            .map(|h| h.chunk.id)
            .collect();
        let after: Vec<u32> = loaded
            .query(query, 3)
            .await
            .unwrap()
            .iter()
            .map(|h| h.chunk.id)
            .collect();
        assert_eq!(before, after);
    }
}

#[tokio::test]
async fn increasing_k_only_appends() {
    let provider = create_provider(&AppConfig::default().embedding).unwrap();
    let index = SemanticIndex::build(POLICIES_TXT, provider, Box::new(FlatBackend::new()))
        .await
        .unwrap();

    let small: Vec<u32> = index
        .query("scheduling rules", 2)
        .await
        .unwrap()
        .iter()
        .map(|h| h.chunk.id)
        .collect();
    let large: Vec<u32> = index
        .query("scheduling rules", 4)
        .await
        .unwrap()
        .iter()
        .map(|h| h.chunk.id)
        .collect();

    assert_eq!(&large[..small.len()], &small[..]);
}

#[tokio::test]
async fn rebuild_is_idempotent_for_unchanged_text() {
    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path()).await;

    let query = "Is there a rule about the lunch break?";
    let first = engine.answer(query).await;
    engine.rebuild_index().await.unwrap();
    engine.rebuild_index().await.unwrap();
    let second = engine.answer(query).await;

    assert_eq!(first.narrative, second.narrative);
    assert_eq!(first.facts.len(), second.facts.len());
}

#[tokio::test]
async fn answer_never_fails_on_arbitrary_input() {
    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path()).await;

    for query in ["", "???", "weather tomorrow", "1234", "prof"] {
        let payload = engine.answer(query).await;
        assert!(!payload.narrative.is_empty());
    }
}

#[tokio::test]
async fn health_reports_counts_and_backend() {
    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path()).await;

    let health = engine.health().await;
    assert_eq!(health.record_count, 4);
    assert_eq!(health.chunk_count, 4);
    assert_eq!(health.index_backend, "flat");
}

#[tokio::test]
async fn stale_index_is_rebuilt_on_startup() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(dir.path());
    Engine::new(config.clone()).await.unwrap();

    // Edit the policy text; a fresh engine must not serve the old index.
    std::fs::write(
        &config.policies_file,
        "1. All staffing policies have been replaced.\n",
    )
    .unwrap();
    let engine = Engine::new(config).await.unwrap();
    assert_eq!(engine.health().await.chunk_count, 1);
}

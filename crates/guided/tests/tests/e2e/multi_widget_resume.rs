//! E2E test: one orchestrator hosting two widgets, checkpointed to disk
//! and resumed by a fresh orchestrator.

use guided_engine::{
    DefinitionRegistry, EngineConfig, ExerciseOrchestrator, FileProgressStore, ManualClock,
    ProgressStore,
};
use guided_tests::{angles, caravan, solve_current, ANGLES_ID, CARAVAN_ID};
use guided_types::*;
use serde_json::json;
use std::sync::Arc;

fn orchestrator(store: &FileProgressStore) -> ExerciseOrchestrator {
    let mut orchestrator = ExerciseOrchestrator::new(EngineConfig::default())
        .with_clock(Arc::new(ManualClock::at_epoch()))
        .with_store(Arc::new(store.clone()));
    orchestrator.register_definition(caravan()).unwrap();
    orchestrator.register_definition(angles()).unwrap();
    orchestrator
}

#[tokio::test]
async fn progress_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileProgressStore::new(dir.path());
    let caravan_id = WidgetId::new(CARAVAN_ID);
    let angles_id = WidgetId::new(ANGLES_ID);

    let mut first = orchestrator(&store);
    assert!(!first.resume_session(&caravan_id).await.unwrap());
    assert!(!first.resume_session(&angles_id).await.unwrap());

    first
        .dispatch_payload(&caravan_id, &json!({"step": 4, "subStep": 2}))
        .unwrap();
    solve_current(first.session_mut(&caravan_id).unwrap()).unwrap();
    solve_current(first.session_mut(&angles_id).unwrap()).unwrap();

    let drained = first.drain_notifications();
    let for_angles: Vec<_> = drained.iter().filter(|(id, _)| *id == angles_id).collect();
    assert_eq!(for_angles.len(), 1);
    assert_eq!(drained.len(), 6);

    assert_eq!(first.checkpoint_all().await.unwrap(), 2);
    assert_eq!(store.list().await.unwrap(), vec![caravan_id.clone(), angles_id.clone()]);

    let mut second = orchestrator(&store);
    assert!(second.resume_session(&caravan_id).await.unwrap());
    assert!(second.resume_session(&angles_id).await.unwrap());

    let caravan_session = second.session(&caravan_id).unwrap();
    assert_eq!(caravan_session.position(), Position::substep(4, 2));
    assert!(caravan_session.controller().is_unit_complete(Position::substep(4, 2)));
    assert!(second.drain_notifications().is_empty());

    // Working on from the restored pointer only announces new flags
    second
        .session_mut(&caravan_id)
        .unwrap()
        .go_next()
        .unwrap();
    solve_current(second.session_mut(&caravan_id).unwrap()).unwrap();
    let keys: Vec<String> = second
        .drain_notifications()
        .iter()
        .map(|(_, n)| n.notification_key())
        .collect();
    assert_eq!(keys, vec!["step-4-substep-3-completed"]);
}

#[tokio::test]
async fn snapshot_for_changed_definition_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileProgressStore::new(dir.path());
    let caravan_id = WidgetId::new(CARAVAN_ID);

    let mut first = orchestrator(&store);
    first.resume_session(&caravan_id).await.unwrap();
    first
        .dispatch(&caravan_id, &NavigationCommand::to_substep(4, 5))
        .unwrap();
    first.checkpoint(&caravan_id).await.unwrap();

    // The exercise was shortened since the learner's last visit
    let mut shortened = caravan();
    shortened.steps.truncate(3);
    let mut second = ExerciseOrchestrator::new(EngineConfig::default())
        .with_store(Arc::new(store.clone()));
    second.register_definition(shortened).unwrap();

    assert!(!second.resume_session(&caravan_id).await.unwrap());
    assert_eq!(
        second.session(&caravan_id).unwrap().position(),
        Position::step(1)
    );
}

#[test]
fn registry_loads_definitions_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    for definition in [caravan(), angles()] {
        let path = dir.path().join(format!("{}.json", definition.widget_id));
        std::fs::write(&path, serde_json::to_string_pretty(&definition).unwrap()).unwrap();
    }
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let mut registry = DefinitionRegistry::new();
    let loaded = registry.load_dir(dir.path()).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(registry.get(&WidgetId::new(CARAVAN_ID)).unwrap().as_ref(), &caravan());
    assert!(matches!(
        registry.register(angles()),
        Err(GuidedError::DuplicateWidget(_))
    ));
}

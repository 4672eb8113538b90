use super::engine_test_support::*;
use super::*;
use crate::progress::SLEEPING;

const SCRIPT: &str = r#"
=== Offer
? ticks == 2
* Stay -> Stay
! print Stay late?
> true
=== Stay
! overtime = true
! money += 10
=== Chance
? rand >= 0.0
! lucky += 1
=== Train
? ticks == 1
% 5
! fitness += 20
> true
"#;

#[test]
fn snapshot_roundtrip_preserves_session() {
    let mut engine = engine_from_script(SCRIPT);
    engine
        .set_variable("lucky", GameValue::Int(0))
        .expect("seed lucky");
    for _ in 0..3 {
        engine.tick().expect("tick should pass");
    }
    let snapshot = engine.to_snapshot();
    assert_eq!(snapshot.schema_version, SNAPSHOT_SCHEMA);
    assert_eq!(
        snapshot.choice.as_ref().map(|choice| choice.labels.clone()),
        Some(vec!["Stay".to_string()])
    );
    assert_eq!(snapshot.values.get("eventName"), Some(&GameValue::from("Train")));
    assert_eq!(snapshot.values.get("eventValue"), Some(&GameValue::Int(2)));
    assert!(snapshot.done_events.contains(&"Train".to_string()));
    assert!(!snapshot.values.contains_key("rand"));

    let json = serde_json::to_string(&snapshot).expect("snapshot should serialize");
    let decoded: iy_core::GameSnapshot =
        serde_json::from_str(&json).expect("snapshot should deserialize");
    assert_eq!(decoded, snapshot);

    let mut resumed = engine_from_script(SCRIPT);
    resumed.from_snapshot(decoded).expect("resume");
    assert_eq!(resumed.to_snapshot(), snapshot);
    assert_eq!(
        resumed.active_run().map(|run| (run.name.as_str(), run.ticks, run.target)),
        Some(("Train", 2, 5))
    );

    for _ in 0..3 {
        let left = engine.tick().expect("original tick");
        let right = resumed.tick().expect("resumed tick");
        assert_eq!(left, right);
    }
    assert_eq!(resumed.store().int("fitness"), 20);
    assert_eq!(engine.to_snapshot(), resumed.to_snapshot());

    resumed.select_choice("Stay").expect("choice survives resume");
    assert_eq!(resumed.get("overtime"), Some(GameValue::Bool(true)));
}

#[test]
fn builtin_run_resumes_from_mirrored_values() {
    let mut engine = engine_from_script("");
    engine
        .set_variable("working", GameValue::Bool(true))
        .expect("set working");
    engine
        .set_variable("energy", GameValue::Int(0))
        .expect("set energy");
    for _ in 0..11 {
        engine.tick().expect("tick should pass");
    }
    let snapshot = engine.to_snapshot();

    let mut resumed = engine_from_script("");
    resumed.from_snapshot(snapshot).expect("resume");
    let run = resumed.active_run().expect("sleep should resume");
    assert_eq!(run.name, SLEEPING);
    assert_eq!(run.ticks, 10);
    assert_eq!(run.target, 100);

    for _ in 0..90 {
        resumed.tick().expect("tick should pass");
    }
    assert_eq!(resumed.store().int("energy"), 100);
    assert_ne!(
        resumed.active_run().map(|run| run.name.as_str()),
        Some(SLEEPING)
    );
}

#[test]
fn energy_above_default_cap_survives_restore() {
    let mut engine = engine_from_script("");
    engine
        .set_variable("energyMax", GameValue::Int(150))
        .expect("set energyMax");
    engine
        .set_variable("energy", GameValue::Int(140))
        .expect("set energy");
    let snapshot = engine.to_snapshot();

    let mut resumed = engine_from_script("");
    resumed.from_snapshot(snapshot).expect("resume");
    assert_eq!(resumed.store().int("energy"), 140);
}

#[test]
fn snapshot_with_unknown_events_drops_them() {
    let mut engine = engine_from_script(SCRIPT);
    for _ in 0..2 {
        engine.tick().expect("tick should pass");
    }
    let snapshot = engine.to_snapshot();

    let mut resumed = engine_from_script("=== Other\n? false\n");
    resumed.from_snapshot(snapshot).expect("resume");
    assert!(resumed.choice().is_none());
    assert!(resumed.active_run().is_none());
    assert_eq!(resumed.store().string("eventName"), "");
    assert!(resumed.to_snapshot().done_events.is_empty());
}

#[test]
fn snapshot_rejects_bad_input() {
    let engine = engine_from_script("");

    let mut snapshot = engine.to_snapshot();
    snapshot.schema_version = "idle-snapshot.v0".to_string();
    let mut resumed = engine_from_script("");
    let error = resumed.from_snapshot(snapshot).expect_err("schema mismatch");
    assert_eq!(error.code, "SNAPSHOT_SCHEMA");

    let mut snapshot = engine.to_snapshot();
    snapshot
        .values
        .insert("mood".to_string(), GameValue::from("sad"));
    let error = resumed.from_snapshot(snapshot).expect_err("kind mismatch");
    assert_eq!(error.code, "SNAPSHOT_TYPE_MISMATCH");

    let mut snapshot = engine.to_snapshot();
    snapshot
        .variables
        .insert("money".to_string(), GameValue::Int(1));
    let error = resumed.from_snapshot(snapshot).expect_err("shadowing");
    assert_eq!(error.code, "SNAPSHOT_VARIABLE_SHADOWS_BUILTIN");
}

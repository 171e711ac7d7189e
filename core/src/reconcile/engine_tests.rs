use wardbell_types::{BucketRef, BucketShape, TaskChannel, TaskCounters};

use super::ReconcileEngine;
use crate::events::ChangeEvent;
use crate::roster::{EntityState, RosterSnapshot};

fn counters(diagnostics: u32, medication: u32, nursing_care: u32) -> TaskCounters {
    TaskCounters {
        diagnostics,
        medication,
        nursing_care,
    }
}

fn entity(key: &str, slots: &[&str]) -> EntityState {
    let slot_order: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
    EntityState::new(key.to_string(), &slot_order)
}

fn snapshot(entities: Vec<EntityState>, slots: &[&str]) -> RosterSnapshot {
    RosterSnapshot {
        entities,
        slot_order: slots.iter().map(|s| s.to_string()).collect(),
    }
}

fn is_added(event: &ChangeEvent) -> bool {
    matches!(event, ChangeEvent::EntityAdded { .. })
}

fn is_removed(event: &ChangeEvent) -> bool {
    matches!(event, ChangeEvent::EntityRemoved { .. })
}

#[test]
fn first_snapshot_admits_everyone_at_zero() {
    let mut engine = ReconcileEngine::new(BucketShape::Counts);

    let mut jane = entity("jane doe", &[]);
    jane.missed = counters(2, 0, 0);
    let events = engine.reconcile(snapshot(vec![jane], &[]));

    assert_eq!(
        events,
        vec![ChangeEvent::EntityAdded {
            key: "jane doe".into()
        }]
    );
    // Admitted at zero; the real counts alert on the next cycle
    assert!(engine.dump().get("jane doe").unwrap().missed.is_zero());
}

#[test]
fn admitted_counts_alert_on_the_following_cycle() {
    let mut engine = ReconcileEngine::new(BucketShape::Counts);

    let mut jane = entity("jane doe", &[]);
    jane.missed = counters(2, 0, 0);

    engine.reconcile(snapshot(vec![jane.clone()], &[]));
    let events = engine.reconcile(snapshot(vec![jane.clone()], &[]));

    assert_eq!(
        events,
        vec![ChangeEvent::CounterIncreased {
            entity: "jane doe".into(),
            bucket: BucketRef::Missed,
            channel: TaskChannel::Diagnostics,
            old_value: 0,
            new_value: 2,
        }]
    );

    // Quiescent from here on
    assert!(engine.reconcile(snapshot(vec![jane], &[])).is_empty());
}

#[test]
fn add_and_remove_in_one_cycle_orders_additions_first() {
    let mut engine = ReconcileEngine::new(BucketShape::Counts);
    engine.reconcile(snapshot(vec![entity("old dog", &[])], &[]));

    let events = engine.reconcile(snapshot(vec![entity("new cat", &[])], &[]));

    assert_eq!(events.len(), 2);
    assert!(is_added(&events[0]));
    assert!(is_removed(&events[1]));
    assert!(engine.dump().get("old dog").is_none());
    assert!(engine.dump().get("new cat").is_some());
}

#[test]
fn counter_increase_alerts_and_decrease_tracks_silently() {
    let mut engine = ReconcileEngine::new(BucketShape::Counts);
    engine.reconcile(snapshot(vec![entity("buster", &[])], &[]));
    engine.reconcile(snapshot(vec![entity("buster", &[])], &[]));

    let mut up = entity("buster", &[]);
    up.due = counters(0, 3, 0);
    let events = engine.reconcile(snapshot(vec![up], &[]));
    assert_eq!(
        events,
        vec![ChangeEvent::CounterIncreased {
            entity: "buster".into(),
            bucket: BucketRef::Due,
            channel: TaskChannel::Medication,
            old_value: 0,
            new_value: 3,
        }]
    );

    // 3 -> 1: no event, but the retained value tracks downward
    let mut down = entity("buster", &[]);
    down.due = counters(0, 1, 0);
    let events = engine.reconcile(snapshot(vec![down], &[]));
    assert!(events.is_empty());
    assert_eq!(engine.dump().get("buster").unwrap().due.medication, 1);
}

#[test]
fn slot_removal_drops_buckets_but_keeps_fixed_ones() {
    let mut engine = ReconcileEngine::new(BucketShape::Counts);

    let mut buster = entity("buster", &["2:00pm", "3:00pm"]);
    buster.missed = counters(1, 0, 0);
    engine.reconcile(snapshot(vec![buster.clone()], &["2:00pm", "3:00pm"]));
    engine.reconcile(snapshot(vec![buster], &["2:00pm", "3:00pm"]));

    let mut buster = entity("buster", &["2:00pm"]);
    buster.missed = counters(1, 0, 0);
    let events = engine.reconcile(snapshot(vec![buster], &["2:00pm"]));

    assert!(events.contains(&ChangeEvent::SlotSetChanged {
        added: vec![],
        removed: vec!["3:00pm".into()],
    }));
    let state = engine.dump();
    let buster = state.get("buster").unwrap();
    assert!(!buster.time_slots.contains_key("3:00pm"));
    assert_eq!(buster.missed.diagnostics, 1);
}

#[test]
fn new_slot_is_zero_initialized_for_every_entity() {
    let mut engine = ReconcileEngine::new(BucketShape::Counts);
    engine.reconcile(snapshot(
        vec![entity("a", &["2:00pm"]), entity("b", &["2:00pm"])],
        &["2:00pm"],
    ));

    let events = engine.reconcile(snapshot(
        vec![entity("a", &["2:00pm", "4:00pm"]), entity("b", &["2:00pm", "4:00pm"])],
        &["2:00pm", "4:00pm"],
    ));

    assert_eq!(
        events,
        vec![ChangeEvent::SlotSetChanged {
            added: vec!["4:00pm".into()],
            removed: vec![],
        }]
    );
    let state = engine.dump();
    for key in ["a", "b"] {
        assert!(state.get(key).unwrap().time_slots["4:00pm"].is_zero());
    }
}

#[test]
fn slot_rename_is_one_removal_and_one_addition() {
    let mut engine = ReconcileEngine::new(BucketShape::Counts);
    engine.reconcile(snapshot(vec![entity("a", &["2:00pm"])], &["2:00pm"]));

    let events = engine.reconcile(snapshot(vec![entity("a", &["2:15pm"])], &["2:15pm"]));

    assert_eq!(
        events,
        vec![ChangeEvent::SlotSetChanged {
            added: vec!["2:15pm".into()],
            removed: vec!["2:00pm".into()],
        }]
    );
}

#[test]
fn exam_room_entry_fires_once_per_transition() {
    let mut engine = ReconcileEngine::new(BucketShape::Counts);
    engine.reconcile(snapshot(vec![entity("buster", &[])], &[]));

    let mut inside = entity("buster", &[]);
    inside.in_exam_room = Some(true);

    let events = engine.reconcile(snapshot(vec![inside.clone()], &[]));
    assert_eq!(
        events,
        vec![ChangeEvent::ExamRoomEntered {
            key: "buster".into()
        }]
    );

    // Still inside: no repeat
    assert!(engine.reconcile(snapshot(vec![inside], &[])).is_empty());

    // Leaves, then re-enters: fires again
    engine.reconcile(snapshot(vec![entity("buster", &[])], &[]));
    let mut back = entity("buster", &[]);
    back.in_exam_room = Some(true);
    let events = engine.reconcile(snapshot(vec![back], &[]));
    assert_eq!(events.len(), 1);
}

#[test]
fn event_order_is_slots_then_adds_then_removes_then_counters() {
    let mut engine = ReconcileEngine::new(BucketShape::Counts);

    let mut resident = entity("resident", &["2:00pm"]);
    resident.due = counters(0, 0, 1);
    engine.reconcile(snapshot(vec![resident.clone()], &["2:00pm"]));
    engine.reconcile(snapshot(vec![resident], &["2:00pm"]));

    let mut resident = entity("resident", &["3:00pm"]);
    resident.due = counters(0, 0, 2);
    let events = engine.reconcile(snapshot(
        vec![resident, entity("arrival", &["3:00pm"])],
        &["3:00pm"],
    ));

    assert!(matches!(events[0], ChangeEvent::SlotSetChanged { .. }));
    assert!(is_added(&events[1]));
    assert!(matches!(events[2], ChangeEvent::CounterIncreased { .. }));
}

#[test]
fn clear_drops_everything() {
    let mut engine = ReconcileEngine::new(BucketShape::Counts);
    engine.reconcile(snapshot(vec![entity("a", &["2:00pm"])], &["2:00pm"]));

    engine.clear();
    assert!(engine.dump().entities.is_empty());
    assert!(engine.known_keys().is_empty());

    // Everything re-admits after a clear
    let events = engine.reconcile(snapshot(vec![entity("a", &["2:00pm"])], &["2:00pm"]));
    assert!(events.iter().any(is_added));
}

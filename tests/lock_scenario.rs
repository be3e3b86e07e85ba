//! A combination lock opened by the codes one, two, three, four in order.

use rulebook::builder::{case, otherwise, simple_transition, Body, BypassBuilder, RuleSetBuilder, TransitionBuilder};
use rulebook::core::{Event, EventName, Record, RecordKind, StateAccessor, StateName, StateValue};
use rulebook::dispatch::{action_available, available_actions, describe, dispatch, DispatchError};
use rulebook::RuleSet;
use serde_json::json;
use std::sync::Arc;

fn reset_on_anything_else(state: &str) -> TransitionBuilder {
    TransitionBuilder::new()
        .from(state)
        .on_any()
        .body(Body::next_state("locked"))
}

fn lock_rules() -> RuleSet {
    RuleSetBuilder::new("lock")
        .transition(simple_transition("locked", "one", "one"))
        .transition(reset_on_anything_else("locked"))
        .transition(simple_transition("one", "two", "two"))
        .transition(reset_on_anything_else("one"))
        .transition(simple_transition("two", "three", "three"))
        .transition(reset_on_anything_else("two"))
        .doc("last digit opens the lock")
        .transition(simple_transition("three", "four", "unlocked"))
        .transition(reset_on_anything_else("three"))
        .transition(TransitionBuilder::new().from("unlocked").on_any().body(Body::matching(
            |call| call.event.map(|event| event.to_string()),
            [case("lock", Body::next_state("locked")), otherwise(Body::keep_state())],
        )))
        .build()
        .unwrap()
}

fn reset_rules() -> RuleSet {
    RuleSetBuilder::new("reset")
        .bypass(BypassBuilder::new().on("c").body(Body::next_state("locked")))
        .build()
        .unwrap()
}

fn door(state: &str) -> StateValue {
    let kind = RecordKind::new("door", "state")
        .with_rule_set(Arc::new(lock_rules()))
        .with_rule_set(Arc::new(reset_rules()));
    Record::new(Arc::new(kind)).with_field("state", state).into()
}

fn send(value: &StateValue, event: &str) -> StateValue {
    dispatch(value, &EventName::from(event), &json!({})).unwrap()
}

#[test]
fn compiled_lock_knows_every_state() {
    let rules = lock_rules();
    let states: Vec<&str> = rules.states().iter().map(StateName::as_str).collect();
    assert_eq!(states, vec!["locked", "one", "three", "two", "unlocked"]);

    let unlocked = &rules.table()[&(StateName::from("unlocked"), Event::Any)];
    assert_eq!(unlocked.destinations.len(), 2);
}

#[test]
fn correct_code_opens_the_lock() {
    let door = ["one", "two", "three", "four"]
        .iter()
        .fold(door("locked"), |door, code| send(&door, code));

    assert_eq!(door.state_name().unwrap(), "unlocked");
}

#[test]
fn first_digit_advances() {
    assert_eq!(send(&door("locked"), "one").state_name().unwrap(), "one");
}

#[test]
fn skipping_a_digit_reverts_to_locked() {
    assert_eq!(send(&door("locked"), "two").state_name().unwrap(), "locked");
    assert_eq!(send(&door("two"), "two").state_name().unwrap(), "locked");
}

#[test]
fn clear_resets_the_lock() {
    assert_eq!(send(&door("three"), "c").state_name().unwrap(), "locked");
    assert_eq!(send(&door("jammed"), "c").state_name().unwrap(), "locked");
}

#[test]
fn wildcard_takes_precedence_over_bypass() {
    assert_eq!(send(&door("unlocked"), "c").state_name().unwrap(), "unlocked");
}

#[test]
fn unlocked_door_relocks_only_on_lock() {
    let open = door("unlocked");
    assert_eq!(send(&open, "push"), open);
    assert_eq!(send(&open, "lock").state_name().unwrap(), "locked");
}

#[test]
fn wildcard_state_offers_every_action() {
    let locked = door("locked");
    let actions = available_actions(&locked).unwrap();

    assert!(actions.contains(&Event::Any));
    assert!(actions.contains(&Event::named("c")));
    assert!(action_available(&locked, &EventName::from("whatever")).unwrap());
}

#[test]
fn record_without_state_is_unreadable() {
    let kind = RecordKind::new("door", "state").with_rule_set(Arc::new(lock_rules()));
    let blank = StateValue::from(Record::new(Arc::new(kind)));

    let error = dispatch(&blank, &EventName::from("one"), &json!({})).unwrap_err();
    assert!(matches!(error, DispatchError::Access(_)));
    assert_eq!(error.error_code(), "state_unreadable");
}

#[test]
fn state_without_handlers_rejects_everything() {
    let kind = RecordKind::new("door", "state").with_rule_set(Arc::new(lock_rules()));
    let stuck = StateValue::from(Record::new(Arc::new(kind)).with_field("state", "jammed"));

    let error = dispatch(&stuck, &EventName::from("one"), &json!({})).unwrap_err();
    assert_eq!(error.error_code(), "illegal_action");
    assert!(available_actions(&stuck).unwrap().is_empty());
}

#[test]
fn last_digit_is_documented() {
    let three = door("three");
    assert_eq!(
        describe(&three, &EventName::from("four")).unwrap().as_deref(),
        Some("last digit opens the lock")
    );
    assert_eq!(describe(&three, &EventName::from("one")).unwrap(), None);
}

//! Combination Lock
//!
//! This demo walks a door through a four-digit code.
//!
//! Key concepts:
//! - Wildcard transitions that reset on a wrong digit
//! - A bypass rule-set that clears the lock from any state
//! - Inspecting the compiled table and exporting a snapshot
//!
//! Run with: RUST_LOG=rulebook=debug cargo run --example combination_lock

use rulebook::builder::{case, otherwise, simple_transition, Body, BypassBuilder, RuleSetBuilder, TransitionBuilder};
use rulebook::core::{EventName, Record, RecordKind, StateAccessor, StateValue, TransitionLog};
use rulebook::dispatch::{available_actions, dispatch};
use rulebook::snapshot::RuleSetSnapshot;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulebook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Combination Lock ===\n");

    let digits = [("locked", "one", "one"), ("one", "two", "two"), ("two", "three", "three"), ("three", "four", "unlocked")];
    let lock = digits
        .iter()
        .fold(RuleSetBuilder::new("lock"), |builder, (from, digit, to)| {
            builder
                .transition(simple_transition(*from, *digit, *to))
                .transition(TransitionBuilder::new().from(*from).on_any().body(Body::next_state("locked")))
        })
        .doc("relock with 'lock', ignore anything else")
        .transition(TransitionBuilder::new().from("unlocked").on_any().body(Body::matching(
            |call| call.event.map(|event| event.to_string()),
            [case("lock", Body::next_state("locked")), otherwise(Body::keep_state())],
        )))
        .build()?;
    let reset = RuleSetBuilder::new("reset")
        .bypass(BypassBuilder::new().on("c").body(Body::next_state("locked")))
        .build()?;

    println!("States: {:?}", lock.states());
    println!("Reachable from 'locked': {:?}\n", lock.reachable_from(&"locked".into()));

    let kind = Arc::new(
        RecordKind::new("door", "state")
            .with_rule_set(Arc::new(lock))
            .with_rule_set(Arc::new(reset)),
    );
    let mut door = StateValue::from(Record::new(Arc::clone(&kind)).with_field("state", "locked"));
    let mut log = TransitionLog::new();

    for code in ["one", "two", "nine", "one", "two", "three", "four"] {
        let event = EventName::from(code);
        let next = dispatch(&door, &event, &json!({}))?;
        log = log.record_dispatch(&event, &door, &next)?;
        println!("  {:<6} -> {}", code, next.state_name()?);
        door = next;
    }

    println!("\nPath: {:?}", log.path());
    println!("Available now: {:?}", available_actions(&door)?);

    let snapshot = RuleSetSnapshot::capture(&kind.rule_sets()[0]);
    println!("\nSnapshot {} has {} transitions", snapshot.id, snapshot.transitions.len());

    println!("\n=== Demo Complete ===");
    Ok(())
}

//! End-to-end evaluation of condition sets against game state snapshots.

use nr_core::{Condition, DeathReason, GameStateSnapshot, WinLevel};
use nr_rules::{Engine, Outcome};

fn fires(expression: &str, state: &GameStateSnapshot) -> bool {
    let engine = Engine::new(vec![Condition::win("subject", WinLevel::C, expression)]);
    !engine.evaluate(state).triggered.is_empty()
}

#[test]
fn comparison_over_attributes() {
    let state = GameStateSnapshot::new()
        .with_attribute("sanity", 85)
        .with_attribute("hunger", 80);
    assert!(fires("sanity > 60 && hunger > 50", &state));
}

#[test]
fn unmet_win_has_no_level() {
    let state = GameStateSnapshot::new()
        .with_attribute("sanity", 85)
        .with_attribute("hunger", 80)
        .with_day(1);
    let engine = Engine::new(vec![Condition::win(
        "win_s",
        WinLevel::S,
        "sanity > 80 && hunger > 70 && day >= 7",
    )]);
    let result = engine.evaluate(&state);
    assert!(result.triggered.is_empty());
    assert_eq!(result.win_level(), None);
}

#[test]
fn inventory_membership() {
    let state = GameStateSnapshot::new()
        .with_item("golden_key")
        .with_item("food");
    assert!(fires("inventory.includes(\"golden_key\")", &state));
    assert!(!fires("inventory.includes(\"rope\")", &state));
}

#[test]
fn higher_priority_outcome_wins() {
    let engine = Engine::new(vec![
        Condition::win("low", WinLevel::C, "day >= 1").with_priority(1),
        Condition::win("high", WinLevel::A, "day >= 1").with_priority(3),
    ]);
    let result = engine.evaluate(&GameStateSnapshot::new().with_day(2));
    assert_eq!(result.priority, Some(3));
    assert_eq!(result.outcome, Outcome::Win(WinLevel::A));
    assert_eq!(result.triggered_ids(), vec!["high", "low"]);
}

#[test]
fn health_death_reason() {
    let engine = Engine::new(vec![Condition::death("dead", "attributes.health <= 0")]);
    let result = engine.evaluate(&GameStateSnapshot::new().with_attribute("health", 0));
    assert_eq!(result.outcome, Outcome::Death(DeathReason::HealthZero));
    assert_eq!(result.death_reason(), Some(DeathReason::HealthZero));
}

#[test]
fn unsafe_patterns_never_fire() {
    let state = GameStateSnapshot::new().with_day(9);
    for expression in [
        "eval('true')",
        "day > 1 && constructor",
        "flags['x']",
        "day > 1; true",
        "`${day}`",
        "new Function('return true')",
        "globalThis.process",
        "day > 1 && setTimeout",
    ] {
        assert!(!fires(expression, &state), "{expression}");
    }
}

#[test]
fn location_is_compared_as_data() {
    let state = GameStateSnapshot::new()
        .with_location("day")
        .with_day(3);
    assert!(fires("location == 'day' && day == 3", &state));
}

#[test]
fn deeply_nested_condition_never_fires() {
    let deep = format!("{}day >= 1{}", "(".repeat(1000), ")".repeat(1000));
    let state = GameStateSnapshot::new().with_day(3);
    assert!(!fires(&deep, &state));
    assert!(!nr_rules::validate_expression(&deep).valid);
}

#[test]
fn validator_agrees_with_engine() {
    let state = GameStateSnapshot::new().with_day(3).with_flag("includes", true);
    for expression in [
        "inventory.includes(\"a(\") || day >= 1",
        "flags.includes && day > 1",
    ] {
        assert!(nr_rules::validate_expression(expression).valid, "{expression}");
        assert!(fires(expression, &state), "{expression}");
    }
}

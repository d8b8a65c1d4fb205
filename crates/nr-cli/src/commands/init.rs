use std::fs;
use std::path::Path;

use nr_core::GameStateSnapshot;
use nr_rules::standard_conditions;

pub fn run(name: &str) -> Result<(), String> {
    let dir = Path::new(name);

    if dir.exists() {
        return Err(format!("directory '{}' already exists", name));
    }

    fs::create_dir_all(dir).map_err(|e| format!("cannot create directory: {e}"))?;

    let conditions = serde_json::to_string_pretty(&standard_conditions())
        .map_err(|e| format!("cannot serialize conditions: {e}"))?;
    fs::write(dir.join("conditions.json"), conditions + "\n")
        .map_err(|e| format!("cannot write conditions.json: {e}"))?;

    let state = GameStateSnapshot::new()
        .with_attribute("health", 100)
        .with_attribute("hunger", 100)
        .with_attribute("sanity", 100)
        .with_attribute("intelligence", 50)
        .with_attribute("strength", 50)
        .with_attribute("speed", 50)
        .with_attribute("luck", 50)
        .with_attribute("profession", "student")
        .with_item("flashlight")
        .with_flag("rule1_broken", false)
        .with_day(1)
        .with_time(8.0)
        .with_location("dormitory");
    let state = serde_json::to_string_pretty(&state)
        .map_err(|e| format!("cannot serialize state: {e}"))?;
    fs::write(dir.join("state.json"), state + "\n")
        .map_err(|e| format!("cannot write state.json: {e}"))?;

    println!("Created condition set '{}' in {}/", name, name);
    println!("  conditions.json  standard win and death conditions");
    println!("  state.json       a day-one game state");
    println!();
    println!("Get started:");
    println!("  cd {}", name);
    println!("  nr check conditions.json              # Validate every expression");
    println!("  nr eval conditions.json state.json    # Evaluate against the state");

    Ok(())
}

use nr_rules::standard_conditions;

pub fn run() -> Result<(), String> {
    let out = serde_json::to_string_pretty(&standard_conditions())
        .map_err(|e| format!("cannot serialize conditions: {e}"))?;
    println!("{out}");
    Ok(())
}

use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use nr_rules::{Engine, EngineConfig, EvaluationResult, Outcome, render_diagnostics};

pub fn run(conditions: &Path, state: &Path, json: bool, debug: bool) -> Result<(), String> {
    let conditions = super::load_conditions(conditions)?;
    let state = super::load_state(state)?;

    if debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let engine = Engine::builder(conditions)
        .config(EngineConfig::default().with_debug(debug))
        .build();

    if !debug {
        for entry in engine.registry().rejected() {
            let condition = entry.condition();
            eprint!(
                "{}",
                render_diagnostics(&condition.expression, &condition.id, entry.diagnostics())
            );
        }
    }

    let result = engine.evaluate(&state);

    if json {
        let out = serde_json::to_string_pretty(&result)
            .map_err(|e| format!("cannot serialize result: {e}"))?;
        println!("{out}");
    } else {
        print_result(&result);
    }

    Ok(())
}

fn print_result(result: &EvaluationResult) {
    let headline = match result.outcome {
        Outcome::None => "no outcome".dimmed(),
        Outcome::Win(level) => format!("WIN ({level})").green().bold(),
        Outcome::Death(reason) => format!("DEATH ({reason})").red().bold(),
    };
    println!("  Outcome: {headline}");
    if let Some(message) = result.message().filter(|m| !m.is_empty()) {
        println!("  {message}");
    }

    if result.triggered.is_empty() {
        println!();
        println!("  No conditions triggered.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Type", "Priority", "Expression"]);

    for condition in &result.triggered {
        let kind = match condition.level() {
            Some(level) => format!("win {level}"),
            None => "death".to_string(),
        };
        table.add_row(vec![
            condition.id.clone(),
            kind,
            condition.priority.to_string(),
            condition.expression.clone(),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} triggered, decided at priority {}",
        result.triggered.len(),
        result.priority.map_or_else(|| "-".to_string(), |p| p.to_string())
    );
}

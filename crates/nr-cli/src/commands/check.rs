use std::path::Path;

use nr_rules::{check_expression, render_diagnostics};

pub fn run(path: &Path) -> Result<(), String> {
    let conditions = super::load_conditions(path)?;

    let mut errors = 0;
    let mut warnings = 0;
    for condition in &conditions {
        let diagnostics = check_expression(&condition.expression);
        if diagnostics.is_empty() {
            continue;
        }
        eprint!(
            "{}",
            render_diagnostics(&condition.expression, &condition.id, &diagnostics)
        );
        let (e, w) = super::tally(&diagnostics);
        errors += e;
        warnings += w;
    }

    super::print_tally(errors, warnings);
    if errors > 0 {
        return Err(format!("{} has invalid conditions", path.display()));
    }

    let wins = conditions.iter().filter(|c| c.is_win()).count();
    println!("  All checks passed for '{}'.", path.display());
    println!(
        "  {} conditions ({} win, {} death)",
        conditions.len(),
        wins,
        conditions.len() - wins
    );

    Ok(())
}

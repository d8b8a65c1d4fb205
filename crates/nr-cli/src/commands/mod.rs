pub mod check;
pub mod eval;
pub mod init;
pub mod standard;
pub mod validate;

use std::fs;
use std::path::Path;

use nr_core::{Condition, GameStateSnapshot};
use nr_rules::{Diagnostic, Severity};

/// Read and parse a condition set, rejecting duplicate ids.
fn load_conditions(path: &Path) -> Result<Vec<Condition>, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    nr_core::load_conditions(&json).map_err(|e| format!("{}: {e}", path.display()))
}

/// Read and parse a game state snapshot.
fn load_state(path: &Path) -> Result<GameStateSnapshot, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    GameStateSnapshot::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}

/// Error and warning counts over a set of diagnostics.
fn tally<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> (usize, usize) {
    diagnostics
        .into_iter()
        .fold((0, 0), |(errors, warnings), d| match d.severity {
            Severity::Error => (errors + 1, warnings),
            Severity::Warning => (errors, warnings + 1),
        })
}

/// Print the error/warning summary line to stderr.
fn print_tally(errors: usize, warnings: usize) {
    if errors > 0 {
        eprintln!(
            "  {} error{}, {} warning{}",
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    } else if warnings > 0 {
        eprintln!(
            "  {} warning{}",
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    }
}

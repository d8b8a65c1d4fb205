use nr_rules::{check_expression, render_diagnostics, validate_expression};

pub fn run(expression: &str, json: bool) -> Result<(), String> {
    if json {
        let validation = validate_expression(expression);
        let out = serde_json::to_string_pretty(&validation)
            .map_err(|e| format!("cannot serialize result: {e}"))?;
        println!("{out}");
        return match validation.error {
            Some(_) => Err("expression is invalid".into()),
            None => Ok(()),
        };
    }

    let diagnostics = check_expression(expression);
    if !diagnostics.is_empty() {
        eprint!("{}", render_diagnostics(expression, "<expression>", &diagnostics));
    }

    match diagnostics.into_iter().find(|d| d.is_error()) {
        Some(diag) => Err(diag.message),
        None => {
            println!("  Expression is valid.");
            Ok(())
        }
    }
}

use std::env;
use std::path::PathBuf;

use topoforge_core::Configuration;
use topoforge_plan::{compile, render_plan_summary, validate_configuration_report};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("missing configuration path")?;

    let config = Configuration::load(&path)?;
    let report = validate_configuration_report(&config);
    if !report.is_ok() {
        eprintln!("configuration is invalid");
        for issue in &report.errors {
            eprintln!("error {} {}: {}", issue.code, issue.path, issue.message);
            if let Some(hint) = &issue.hint {
                eprintln!("  hint: {hint}");
            }
        }
        std::process::exit(1);
    }

    let plan = compile(&config)?;
    println!("{}", render_plan_summary(&plan));
    println!("{}", serde_json::to_string_pretty(&plan.outputs())?);
    Ok(())
}

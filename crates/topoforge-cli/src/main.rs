mod registry;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use registry::{RunContext, init_run_logging, init_stderr_logging, start_run, write_plan};
use thiserror::Error;
use topoforge_core::{Configuration, LoadError};
use topoforge_plan::{
    PlanError, ValidationIssue, ValidationReport, compile, configuration_json_schema,
    outputs_json_schema, plan_json_schema, validate_configuration_report,
};
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "topoforge", version, about = "Multi-region topology compiler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a configuration into a resource plan.
    Compile(CompileArgs),
    /// Check a configuration without compiling it.
    Validate(ConfigArgs),
    /// Print a JSON Schema.
    Schema(SchemaArgs),
    /// Print the application environment for one region.
    Env(EnvArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Configuration file (.toml or .json).
    #[arg(long, short = 'c', value_name = "PATH")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct CompileArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Optional output path for plan.json.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Treat validation warnings as errors.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Document to describe.
    #[arg(value_enum, default_value_t = SchemaKind::Config)]
    kind: SchemaKind,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemaKind {
    Config,
    Plan,
    Outputs,
}

#[derive(Args, Debug)]
struct EnvArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Region whose environment is printed.
    #[arg(long)]
    region: String,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile(args) => run_compile(args),
        Command::Validate(args) => run_validate(args),
        Command::Schema(args) => run_schema(args),
        Command::Env(args) => run_env(args),
    }
}

fn run_compile(args: CompileArgs) -> Result<(), CliError> {
    let CompileArgs {
        config: ConfigArgs { config: config_path },
        run_dir,
        out,
        strict,
    } = args;

    let configuration = Configuration::load(&config_path)?;
    let report = validate_configuration_report(&configuration);
    check_report(&report, strict)?;

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir,
        out,
        config_path,
        configuration,
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, config = %run_ctx.config_path.display());
    for warning in &report.warnings {
        log_warning(warning);
    }

    let timer = Instant::now();
    let plan = compile(&run_ctx.configuration).map_err(PlanError::from)?;
    tracing::info!(
        event = "plan_compiled",
        resource_count = plan.resource_count(),
        fingerprint = %plan.fingerprint()?
    );

    write_plan(&run_paths, &plan, run_ctx.out.as_deref())?;
    tracing::info!(event = "plan_written", path = %run_paths.plan_path.display());

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);

    println!("{}", serde_json::to_string_pretty(&plan.outputs())?);
    Ok(())
}

fn run_validate(args: ConfigArgs) -> Result<(), CliError> {
    init_stderr_logging()?;

    let configuration = Configuration::load(&args.config)?;
    let report = validate_configuration_report(&configuration);
    print_report(&report);
    check_report(&report, false)?;

    println!("configuration validated successfully");
    Ok(())
}

fn run_schema(args: SchemaArgs) -> Result<(), CliError> {
    let json = match args.kind {
        SchemaKind::Config => serde_json::to_string_pretty(&configuration_json_schema())?,
        SchemaKind::Plan => serde_json::to_string_pretty(&plan_json_schema())?,
        SchemaKind::Outputs => serde_json::to_string_pretty(&outputs_json_schema())?,
    };
    println!("{json}");
    Ok(())
}

fn run_env(args: EnvArgs) -> Result<(), CliError> {
    init_stderr_logging()?;

    let plan = load_and_compile(&args.config.config)?;
    let env = plan.env_exports(&args.region).ok_or_else(|| {
        CliError::InvalidConfig(format!("region '{}' is not configured", args.region))
    })?;

    for (key, value) in env {
        println!("{key}={value}");
    }
    Ok(())
}

fn load_and_compile(path: &Path) -> Result<topoforge_plan::Plan, CliError> {
    let configuration = Configuration::load(path)?;
    Ok(compile(&configuration).map_err(PlanError::from)?)
}

fn check_report(report: &ValidationReport, strict: bool) -> Result<(), CliError> {
    if let Some(issue) = report.errors.first() {
        return Err(CliError::InvalidConfig(format!(
            "{} ({} error(s)); first: {} {}",
            issue.message,
            report.errors.len(),
            issue.code,
            issue.path
        )));
    }
    if strict && let Some(issue) = report.warnings.first() {
        return Err(CliError::InvalidConfig(format!(
            "warning treated as error in strict mode: {} {}: {}",
            issue.code, issue.path, issue.message
        )));
    }
    Ok(())
}

fn log_warning(issue: &ValidationIssue) {
    tracing::warn!(
        event = "configuration_warning",
        code = %issue.code,
        path = %issue.path,
        message = %issue.message
    );
}

fn print_report(report: &ValidationReport) {
    for issue in &report.errors {
        eprintln!("error {} {}: {}", issue.code, issue.path, issue.message);
        if let Some(hint) = &issue.hint {
            eprintln!("  hint: {hint}");
        }
    }
    for issue in &report.warnings {
        eprintln!("warning {} {}: {}", issue.code, issue.path, issue.message);
        if let Some(hint) = &issue.hint {
            eprintln!("  hint: {hint}");
        }
    }
}

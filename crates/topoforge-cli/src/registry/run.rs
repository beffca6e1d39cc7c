use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;
use topoforge_core::Configuration;
use topoforge_plan::{Plan, render_plan_summary};

use super::atomic::write_bytes_atomic;
use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub out: Option<PathBuf>,
    pub config_path: PathBuf,
    pub configuration: Configuration,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub plan_version: String,
    pub config_path: String,
    pub configuration: Configuration,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub plan_path: PathBuf,
    pub outputs_path: PathBuf,
    pub summary_path: PathBuf,
    pub logs_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx
        .run_dir
        .join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        plan_version: topoforge_core::PLAN_VERSION.to_string(),
        config_path: ctx.config_path.display().to_string(),
        configuration: ctx.configuration.clone(),
        git: collect_git_info(),
    };

    write_json(&root.join("config.json"), &config)?;

    let logs_path = root.join("logs.ndjson");
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        plan_path: root.join("plan.json"),
        outputs_path: root.join("outputs.json"),
        summary_path: root.join("summary.md"),
        logs_path,
        root,
    })
}

/// Write plan, outputs and summary into the run, and the plan to `out_path` if given.
pub fn write_plan(paths: &RunPaths, plan: &Plan, out_path: Option<&Path>) -> RegistryResult<()> {
    write_json(&paths.plan_path, plan)?;
    write_json(&paths.outputs_path, &plan.outputs())?;
    write_bytes_atomic(&paths.summary_path, render_plan_summary(plan).as_bytes())?;

    if let Some(out_path) = out_path {
        let data = serde_json::to_vec_pretty(plan)?;
        write_bytes_atomic(out_path, &data)?;
    }

    Ok(())
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

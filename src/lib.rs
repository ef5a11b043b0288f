// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::command::CommandBuilder;
use crate::config::{load_or_default, Catalogue, ConfigFile, ConfigSnapshot};
use crate::engine::{ConsoleSink, LoggingSurface, Orchestrator, RunRequest};
use crate::exec::TokioProcessBackend;
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the snapshot taken from the CLI toggles
/// - command builder, supervisor and orchestrator loop
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_config(&args)?;

    if args.list {
        print_catalogue(&cfg);
        return Ok(0);
    }

    let snapshot = snapshot_from_args(&cfg.catalogue, &args)?;
    let builder = CommandBuilder::new(&cfg.settings, &cfg.catalogue);

    if args.print_command {
        let command = builder.build(&snapshot)?;
        println!("{}", command.display());
        return Ok(0);
    }

    let backend = TokioProcessBackend::new(cfg.settings.denial_exit_codes.clone());
    let orchestrator = Orchestrator::new(
        builder,
        backend,
        Arc::new(RealFileSystem),
        ConsoleSink::stdio(),
        LoggingSurface::default(),
    );

    let (req_tx, req_rx) = mpsc::channel::<RunRequest>(4);
    let server = tokio::spawn(orchestrator.serve(req_rx));

    let (request, reply) = RunRequest::new(snapshot);
    req_tx
        .send(request)
        .await
        .map_err(|_| anyhow::anyhow!("orchestrator stopped before accepting the run"))?;
    drop(req_tx);

    let accepted = reply.await.context("waiting for the orchestrator to accept the run")?;
    let verdict = server.await.context("orchestrator task panicked")?;

    if let Err(err) = accepted {
        return Err(err.into());
    }

    let Some(verdict) = verdict else {
        anyhow::bail!("run ended without a verdict");
    };

    info!(
        exit_code = verdict.exit_code,
        reason = %verdict.reason,
        "{}",
        verdict.status_message()
    );

    Ok(exit_code_for(verdict.succeeded, verdict.exit_code))
}

fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut cfg = load_or_default(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("loading config {}", path.display()),
        None => "loading built-in catalogue".to_string(),
    })?;

    if let Some(script) = &args.script {
        cfg.settings.script = std::path::absolute(script)
            .with_context(|| format!("resolving script path {}", script.display()))?;
    }
    if let Some(elevation) = &args.elevation {
        cfg.settings.elevation = elevation.clone();
    }

    debug!(settings = ?cfg.settings, "effective orchestrator settings");
    Ok(cfg)
}

/// Catalogue defaults with the CLI toggles applied. Unknown keys are
/// rejected here rather than at build time so typos get a direct message.
pub fn snapshot_from_args(catalogue: &Catalogue, args: &CliArgs) -> Result<ConfigSnapshot> {
    let mut snapshot = ConfigSnapshot::defaults(catalogue);

    for (keys, enabled) in [(&args.disable_tasks, false), (&args.enable_tasks, true)] {
        for key in keys {
            catalogue.check_task_key(key)?;
            snapshot = snapshot.with_task(key.as_str(), enabled);
        }
    }
    for (keys, enabled) in [(&args.enable_options, true), (&args.disable_options, false)] {
        for key in keys {
            catalogue.check_option_key(key)?;
            snapshot = snapshot.with_option(key.as_str(), enabled);
        }
    }

    Ok(snapshot)
}

/// 0 on success; otherwise the script's exit code when it fits a process
/// exit status, else 1.
fn exit_code_for(succeeded: bool, exit_code: i32) -> i32 {
    match (succeeded, exit_code) {
        (true, _) => 0,
        (false, code @ 1..=255) => code,
        (false, _) => 1,
    }
}

fn print_catalogue(cfg: &ConfigFile) {
    println!("fedorable catalogue");
    println!("  elevation = {}", cfg.settings.elevation);
    println!("  script    = {}", cfg.settings.script.display());
    println!();

    println!("tasks ({}):", cfg.catalogue.tasks().len());
    for task in cfg.catalogue.tasks() {
        let state = if task.default { "on " } else { "off" };
        println!("  [{state}] {:<20} {}", task.key, task.label);
    }
    println!();

    println!("options ({}):", cfg.catalogue.options().len());
    for option in cfg.catalogue.options() {
        let state = if option.default { "on " } else { "off" };
        println!(
            "  [{state}] {:<24} {:<28} {}",
            option.key, option.flag, option.label
        );
    }
}

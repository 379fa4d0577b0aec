//! Application flow.
//! Loads and merges config (XML < env < CLI), initializes logging, installs the
//! ctrl-c handler, validates the roots, resolves the source folder and runs the
//! orchestrator. Typed errors are logged with their code at this edge.

use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use tune_transporter::cli::Args;
use tune_transporter::config::{
    layer_from_env, validate_and_normalize, load_or_init, ConfigLayer, LoadResult, CONFIG_ENV,
};
use tune_transporter::output as out;
use tune_transporter::{
    default_config_path, shutdown, CleanupOutcome, LoftyTagReader, Orchestrator, Resolution,
    TracingNotifier, TransporterError,
};

use crate::logging::init_tracing;

fn print_config_location() {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit): {explicit}"));
    }
    match default_config_path() {
        Ok(p) => {
            out::print_user(&p.display().to_string());
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file there yet; running without --print-config creates a template.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine the config path: {e}")),
    }
}

/// The XML layer, creating a template on first run.
fn xml_layer() -> Result<ConfigLayer> {
    match load_or_init()? {
        LoadResult::Loaded { path, layer } => {
            debug!(path = %path.display(), "Loaded config");
            Ok(layer)
        }
        LoadResult::CreatedTemplate(path) => {
            out::print_success(&format!("Wrote a template config to {}", path.display()));
            out::print_info(
                "Set <downloads_path> and <music_path> there (or pass --downloads-path/--music-path) and re-run.",
            );
            tune_transporter::config::load_layer_from_xml_path(&path)
        }
        LoadResult::Missing(path) => {
            out::print_warn(&format!("No config file at {}; using CLI and environment only", path.display()));
            Ok(ConfigLayer::default())
        }
    }
}

fn log_failure(e: &anyhow::Error) {
    match e.downcast_ref::<TransporterError>() {
        Some(te) => error!(code = te.code(), kind = te.kind(), error = %e, "Run failed"),
        None => error!(error = ?e, "Run failed"),
    }
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    if args.print_config {
        print_config_location();
        return Ok(());
    }

    let layer = xml_layer()?.overlay(layer_from_env()).overlay(args.to_layer());

    let guard = init_tracing(
        layer.log_level.unwrap_or_default(),
        layer.log_file.as_deref(),
        args.json,
    )
    .inspect_err(|e| out::print_error(&format!("Failed to initialize logging: {e}")))?;

    // Dropped on ctrl-c so the file appender flushes before the process dies.
    let guard_slot = Arc::new(Mutex::new(guard));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Interrupt received; stopping after the current file...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .context("install ctrl-c handler")?;
    }

    debug!(?args, "Starting tune_transporter");

    let result = run_inner(&args, layer);
    if let Err(e) = &result {
        log_failure(e);
        out::print_error(&format!("{e:#}"));
    }

    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    result
}

fn run_inner(args: &Args, layer: ConfigLayer) -> Result<()> {
    let mut cfg = layer.resolve()?;
    validate_and_normalize(&mut cfg)?;

    let resolver = args.resolver(cfg.stdin_timeout, &cfg.stdin_sentinel);
    let source = match resolver.resolve(&cfg.downloads_path)? {
        Resolution::Selected(p) => p,
        Resolution::Cancelled => {
            info!("No directory selected; nothing to do");
            return Ok(());
        }
    };

    let tag_reader = LoftyTagReader;
    let notifier = TracingNotifier;
    let summary = Orchestrator::new(&cfg, &tag_reader, &notifier).run(&source)?;

    let verb = if cfg.dry_run { "would move" } else { "moved" };
    for m in &summary.report.moved {
        out::print_user(&format!("{} -> {}", m.from.display(), m.to.display()));
    }
    out::print_success(&format!(
        "{} {} file(s), {} already in place",
        verb,
        summary.report.moved.len(),
        summary.report.skipped.len()
    ));
    if let CleanupOutcome::Aborted { remaining } = &summary.cleanup {
        warn!(remaining = remaining.len(), "Source directory kept");
        out::print_warn(&format!(
            "{} still holds {} audio file(s); it was not deleted",
            source.display(),
            remaining.len()
        ));
    }
    info!(stage = %summary.stage, source = %summary.source.display(), "Run finished");
    Ok(())
}

//! sckrec - record system audio through a native ScreenCaptureKit recorder
//!
//! Run with `sckrec` for an interactive session, or `sckrec record --mode
//! both --duration 60` for scripted use. `sckrec build` refreshes the native
//! binary without recording.

use clap::Parser;
use sckrec::build_cache::{self, BuildStatus};
use sckrec::cli::{Cli, Commands};
use sckrec::config::{self, Config};
use sckrec::error::{BuildError, Result, SckrecError};
use sckrec::i18n::Messages;
use sckrec::session::{
    invocation_path, CaptureDuration, CaptureRequest, CaptureSession, Mode, Outcome,
    RecordingResult,
};
use sckrec::{lock, outpath, prompt};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("sckrec={},warn", log_level))),
        )
        .with_target(false)
        .init();

    // Load configuration
    let config = config::load_config(cli.config.as_deref())?;

    let lang = cli.lang.unwrap_or_else(|| config.resolve_language());
    let messages = Messages::new(lang);

    let result = match cli.command.unwrap_or(Commands::Record {
        mode: None,
        duration: None,
        output_dir: None,
    }) {
        Commands::Record {
            mode,
            duration,
            output_dir,
        } => run_record(&config, &messages, mode, duration, output_dir).await,

        Commands::Build { force } => run_build(&config, &messages, force).await,

        Commands::Config => show_config(&config),
    };

    // Every fatal path surfaces as one localized message.
    if let Err(e) = result {
        let text = match &e {
            SckrecError::Build(BuildError::CompileFailed { stderr }) => {
                messages.format("compilation_failed", &[("error", stderr.trim())])
            }
            other => messages.format("error_message", &[("error", &other.to_string())]),
        };
        eprintln!("{}", text);
        std::process::exit(1);
    }

    Ok(())
}

/// Run one capture session end to end: lock, build cache, output path,
/// session, outcome message.
async fn run_record(
    config: &Config,
    messages: &Messages,
    mode_flag: Option<String>,
    duration_flag: Option<u32>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    println!("{}", messages.get("app_title"));
    println!("{}", "=".repeat(40));

    let interactive = mode_flag.is_none();

    let mode = match mode_flag {
        Some(s) => s.parse::<Mode>().map_err(SckrecError::Config)?,
        None => match prompt::prompt_mode(messages)? {
            Some(mode) => mode,
            None => {
                println!("{}", messages.get("goodbye"));
                return Ok(());
            }
        },
    };

    let duration = match duration_flag {
        Some(secs) if secs > 0 => CaptureDuration::Seconds(secs),
        Some(_) => {
            println!("{}", messages.get("invalid_duration"));
            CaptureDuration::Continuous
        }
        None if interactive => prompt::prompt_duration(messages)?,
        None => CaptureDuration::Continuous,
    };

    let output_dir = output_dir.unwrap_or_else(|| config.capture.output_dir.clone());

    // One orchestrator at a time: two instances would race on the build
    // cache for the same source/binary pair.
    let lock = lock::acquire(&Config::lock_path())?;

    let result = record_session(config, messages, mode, duration, &output_dir).await;

    lock.release();

    match result? {
        result @ RecordingResult {
            outcome: Outcome::Completed,
            ..
        } => {
            if let Some(ref diagnostics) = result.diagnostics {
                println!("{}", diagnostics);
            }
            println!(
                "{}",
                messages.format(
                    "recording_complete",
                    &[("output", &result.output_path.display().to_string())]
                )
            );
        }
        RecordingResult {
            outcome: Outcome::Interrupted,
            ..
        } => {
            println!();
            println!("{}", messages.get("user_interrupted"));
            println!("{}", messages.get("goodbye"));
        }
        result @ RecordingResult {
            outcome: Outcome::Failed,
            ..
        } => {
            let error = result
                .diagnostics
                .unwrap_or_else(|| "capture binary exited with an error".to_string());
            eprintln!(
                "{}",
                messages.format("recording_failed", &[("error", error.trim())])
            );
            std::process::exit(1);
        }
    }

    Ok(())
}

/// The build-then-run middle of a session, separated so the caller can
/// release the lock before reporting the outcome.
async fn record_session(
    config: &Config,
    messages: &Messages,
    mode: Mode,
    duration: CaptureDuration,
    output_dir: &std::path::Path,
) -> Result<RecordingResult> {
    let build = &config.build;

    if build_cache::needs_rebuild(&build.source, &build.binary) {
        println!("{}", messages.get("compiling_in_progress"));
    }
    build_cache::ensure_binary(&build.source, &build.binary, &build.compiler).await?;

    outpath::ensure_directory(output_dir)?;
    let output_path = outpath::generate_output_path(output_dir);

    println!(
        "{}",
        messages.format(
            "starting_recording",
            &[("output", &output_path.display().to_string())]
        )
    );
    println!("{}", messages.get("running_in_progress"));

    let request = CaptureRequest {
        mode,
        duration,
        output_path,
    };
    let session = CaptureSession::new(invocation_path(&build.binary), request);

    let result = session
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(result)
}

/// Refresh the native capture binary without recording. Shares the instance
/// lock with `record`: two processes must never compile into the same binary
/// path at once.
async fn run_build(config: &Config, messages: &Messages, force: bool) -> Result<()> {
    let lock = lock::acquire(&Config::lock_path())?;
    let result = rebuild(config, messages, force).await;
    lock.release();
    result
}

async fn rebuild(config: &Config, messages: &Messages, force: bool) -> Result<()> {
    let build = &config.build;

    if force {
        println!("{}", messages.get("compiling_in_progress"));
        build_cache::force_rebuild(&build.source, &build.binary, &build.compiler).await?;
        println!("Rebuilt {:?}", build.binary);
        return Ok(());
    }

    if build_cache::needs_rebuild(&build.source, &build.binary) {
        println!("{}", messages.get("compiling_in_progress"));
    }
    match build_cache::ensure_binary(&build.source, &build.binary, &build.compiler).await? {
        BuildStatus::CacheHit => println!("Binary up to date: {:?}", build.binary),
        BuildStatus::Rebuilt => println!("Rebuilt {:?}", build.binary),
    }

    Ok(())
}

/// Show current configuration
fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration\n");
    println!("=====================\n");

    println!("language = {:?}", config.language);
    println!("  (resolves to: {:?})", config.resolve_language());

    println!("\n[build]");
    println!("  compiler = {:?}", config.build.compiler);
    println!("  source = {:?}", config.build.source);
    println!("  binary = {:?}", config.build.binary);

    println!("\n[capture]");
    println!("  output_dir = {:?}", config.capture.output_dir);

    println!("\n---");
    println!(
        "Config file: {:?}",
        Config::default_path().unwrap_or_else(|| PathBuf::from("(not found)"))
    );
    println!("Lock file: {:?}", Config::lock_path());

    Ok(())
}

use crate::args::{Invocation, RunConfig, HELP_TEXT};
use crate::error::{Error, Result};
use crate::report::Reporter;
use crate::scanner::ping::{ReachabilityChecker, SystemPing};
use crate::scanner::result::ProbeResult;
use crate::scanner::ProbeEngine;
use crate::target::{confirm, TargetSet, CONFIRM_THRESHOLD};
use crate::utils::conf::{default_conf_path, write_conf};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

mod args;
mod error;
mod report;
mod scanner;
mod target;
mod utils;

#[derive(Debug)]
enum Outcome {
    NoTargets,
    Declined,
    Probed {
        targets: TargetSet,
        result: ProbeResult,
    },
}

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "multi-ping.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(fmt::Layer::new().with_ansi(false).with_writer(non_blocking)),
                Some(guard),
            )
        }
        None => (None, None),
    };
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::Layer::new().with_writer(io::stderr))
        .with(file_layer);
    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("unable to set a global subscriber: {}", error);
    }
    guard
}

fn progress_bar(len: usize) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} hosts")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len as u64).with_style(style)
}

/// Resolves the targets, asks for confirmation when needed, saves explicit
/// targets to the default config file and probes everything.
async fn run_prog<R: BufRead, W: Write>(
    config: &RunConfig,
    checker: Arc<dyn ReachabilityChecker>,
    progress: ProgressBar,
    input: R,
    output: W,
) -> Result<Outcome> {
    let targets = config.sources.resolve(config.order)?;
    if targets.is_empty() {
        return Ok(Outcome::NoTargets);
    }
    if targets.len() > CONFIRM_THRESHOLD && !config.force && !confirm(targets.len(), input, output)? {
        return Ok(Outcome::Declined);
    }
    if config.sources.has_explicit() {
        write_conf(&config.default_conf, targets.as_slice())?;
        tracing::debug!("saved targets to {}", config.default_conf.display());
    }

    tracing::info!("working on {} hosts", targets.len());
    progress.set_length(targets.len() as u64);
    let result = ProbeEngine::new(checker, config.timeout)
        .with_concurrency(config.concurrency)
        .with_progress(progress)
        .run(&targets)
        .await;
    Ok(Outcome::Probed { targets, result })
}

async fn execute(args: &args::Args) -> Result<()> {
    let config = match args.invocation(default_conf_path)? {
        Invocation::Help => {
            println!("{}", HELP_TEXT);
            return Ok(());
        }
        Invocation::Run(config) => config,
    };
    let outcome = run_prog(
        &config,
        Arc::new(SystemPing),
        progress_bar(0),
        io::stdin().lock(),
        io::stdout(),
    )
    .await?;
    match outcome {
        Outcome::NoTargets => println!("Please specify at least one ip address"),
        Outcome::Declined => tracing::info!("cancelled, nothing probed"),
        Outcome::Probed { targets, result } => {
            let reporter = Reporter::new(config.mode, &targets);
            if config.json {
                match reporter.render_json(&targets, &result) {
                    Ok(json) => println!("{}", json),
                    Err(error) => tracing::error!("unable to render json: {}", error),
                }
            } else {
                reporter.print(&targets, &result);
            }
            tracing::info!(
                "finished: {} available, {} occupied",
                result.available().len(),
                result.occupied().len()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let argv = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<String>>();
    let args = match args::Args::try_parse_from(&argv) {
        Ok(args) => args,
        Err(error) => match args::illegal_param(error, &argv) {
            Ok(illegal) => {
                println!("{}", illegal);
                std::process::exit(illegal.exit_code());
            }
            Err(error) => error.exit(),
        },
    };
    let _guard = init_tracing(args.log_dir.as_deref());

    if let Err(error) = execute(&args).await {
        match &error {
            Error::IllegalParam(_) | Error::ConfigNotFound(_) => println!("{}", error),
            _ => tracing::error!("{}", error),
        }
        std::process::exit(error.exit_code());
    }
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! jobtide: pull USAJOBS listings into Postgres.

mod app;
mod logging;
mod output;

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use jobtide_config::{load_config, load_config_with_file, JobtideConfig};
use jobtide_etl::{Pipeline, RunRequest};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "jobtide", about = "Pull USAJOBS listings into Postgres", version)]
struct Args {
	/// TOML config file; must exist when given
	#[arg(long, global = true, env = "JOBTIDE_CONFIG")]
	config: Option<PathBuf>,

	/// Print results as JSON on stdout
	#[arg(long, global = true)]
	json: bool,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run one extract-and-load pass (the default)
	Run(RunArgs),

	/// Run repeatedly on a fixed interval until Ctrl-C
	Watch {
		#[arg(long, default_value_t = 3600, value_parser = clap::value_parser!(u64).range(1..))]
		interval_secs: u64,

		#[command(flatten)]
		run: RunArgs,
	},

	/// Print statistics about stored postings
	Stats,

	/// Print version information
	Version,
}

#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
struct RunArgs {
	/// Search keyword, overriding the configured one
	#[arg(long)]
	keyword: Option<String>,

	/// Location filter, e.g. "Washington, DC"
	#[arg(long)]
	location: Option<String>,

	/// Maximum number of pages to request
	#[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
	max_pages: Option<u32>,
}

impl From<RunArgs> for RunRequest {
	fn from(args: RunArgs) -> Self {
		RunRequest {
			keyword: args.keyword,
			location: args.location,
			max_pages: args.max_pages,
		}
	}
}

#[tokio::main]
async fn main() -> ExitCode {
	dotenvy::dotenv().ok();
	let args = Args::parse();

	match execute(args).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!(error = %format!("{e:#}"), "jobtide aborted");
			eprintln!("Error: {e:#}");
			ExitCode::FAILURE
		}
	}
}

async fn execute(args: Args) -> anyhow::Result<()> {
	let command = args
		.command
		.unwrap_or_else(|| Command::Run(RunArgs::default()));

	if let Command::Version = command {
		println!("jobtide {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	let config = match &args.config {
		Some(path) => load_config_with_file(path)?,
		None => load_config()?,
	};
	logging::init(&config.logging)?;

	match command {
		Command::Run(run) => run_once(config, run.into(), args.json).await,
		Command::Watch { interval_secs, run } => {
			watch(config, run.into(), Duration::from_secs(interval_secs), args.json).await
		}
		Command::Stats => stats(config, args.json).await,
		Command::Version => Ok(()),
	}
}

async fn run_once(config: JobtideConfig, request: RunRequest, json: bool) -> anyhow::Result<()> {
	let pipeline = app::build_pipeline(config).await?;
	let summary = pipeline.run(request).await?;
	output::print_summary(&summary, json)
}

async fn watch(
	config: JobtideConfig,
	request: RunRequest,
	interval: Duration,
	json: bool,
) -> anyhow::Result<()> {
	let pipeline = app::build_pipeline(config).await?;

	info!(interval_secs = interval.as_secs(), "Watching for new postings");
	let finished = watch_until(&pipeline, &request, interval, json, ctrl_c()).await;
	info!(runs = finished, "Stopped watching");
	Ok(())
}

/// Resolves on the first Ctrl-C, or never if the handler cannot be installed.
async fn ctrl_c() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!(error = %e, "Cannot listen for Ctrl-C");
		std::future::pending::<()>().await;
	}
	info!("Received Ctrl-C, stopping");
}

/// Runs the pipeline on every tick until `shutdown` resolves, abandoning any
/// run still in flight. Returns the number of runs that finished.
async fn watch_until(
	pipeline: &Pipeline,
	request: &RunRequest,
	interval: Duration,
	json: bool,
	shutdown: impl Future<Output = ()>,
) -> u64 {
	tokio::pin!(shutdown);
	let mut ticker = tokio::time::interval(interval);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
	let mut finished = 0;

	loop {
		tokio::select! {
			_ = ticker.tick() => {}
			_ = &mut shutdown => return finished,
		}

		tokio::select! {
			outcome = pipeline.run(request.clone()) => {
				finished += 1;
				match outcome {
					Ok(summary) => {
						if let Err(e) = output::print_summary(&summary, json) {
							warn!(error = %e, "Failed to print run summary");
						}
					}
					Err(e) => error!(error = %e, "ETL run failed, will retry next interval"),
				}
			}
			_ = &mut shutdown => {
				warn!("Run interrupted before completion");
				return finished;
			}
		}
	}
}

async fn stats(config: JobtideConfig, json: bool) -> anyhow::Result<()> {
	let store = app::connect_store(&config).await?;
	let stats = store.statistics().await?;
	output::print_statistics(&stats, json)
}

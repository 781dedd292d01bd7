//! This module contains the main entrypoint to the tabml cli.

use anyhow::{Context, Result};
use clap::{Args, Parser};
use colored::Colorize;
use std::{
	path::PathBuf,
	time::{Duration, Instant},
};
use tabml_core::{Capabilities, Config, Progress, Registry, Report, TrainOptions};
use tabml_dataframe::{normalize_column_name, DataFrame, FromCsvOptions};
use tabml_util::table::Table;
use tracing::info;

#[derive(Parser)]
#[clap(about = "Train a machine learning model on a csv file in one command.")]
enum Options {
	#[clap(name = "train")]
	Train(TrainArgs),
}

/// train a model
///
/// Train every candidate model on a csv file, pick the best one on a held out partition, and print a report.
#[derive(Args, Debug)]
struct TrainArgs {
	/// the path to your .csv file
	#[clap(short, long)]
	file: PathBuf,
	/// the name of the column to predict
	#[clap(short, long)]
	target: String,
	/// the path to a yaml config file
	#[clap(short, long)]
	config: Option<PathBuf>,
	/// print the report as json
	#[clap(long)]
	json: bool,
	/// log debug messages
	#[clap(short, long, conflicts_with = "quiet")]
	verbose: bool,
	/// only log errors
	#[clap(short, long)]
	quiet: bool,
	/// stop training if it has not finished after this many seconds
	#[clap(long)]
	timeout_secs: Option<u64>,
}

fn main() {
	let options = Options::parse();
	let result = match options {
		Options::Train(args) => {
			init_tracing(args.verbose, args.quiet);
			cli_train(args)
		}
	};
	if let Err(error) = result {
		eprintln!("{}: {:#}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

/// `RUST_LOG` is used unless `--verbose` or `--quiet` is passed.
fn init_tracing(verbose: bool, quiet: bool) {
	let filter = match (verbose, quiet) {
		(true, _) => tracing_subscriber::EnvFilter::new("debug"),
		(_, true) => tracing_subscriber::EnvFilter::new("error"),
		_ => tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn cli_train(args: TrainArgs) -> Result<()> {
	let mut dataframe = DataFrame::from_path(&args.file, FromCsvOptions::default())
		.with_context(|| format!("failed to load {}", args.file.display()))?;
	dataframe.normalize_column_names();
	let target = normalize_column_name(&args.target);

	let mut options = TrainOptions::default();
	let mut capabilities = Capabilities::current();
	if let Some(config_path) = args.config.as_deref() {
		let config = Config::from_path(config_path)?;
		config.apply(&mut options);
		capabilities = config.capabilities(capabilities);
	}
	if let Some(timeout_secs) = args.timeout_secs {
		options.deadline = Some(Instant::now() + Duration::from_secs(timeout_secs));
	}
	let registry = Registry::builtin(capabilities, &options);

	let report = tabml_core::train_with_registry(
		&dataframe,
		&target,
		&registry,
		&options,
		&mut |progress| match progress {
			Progress::Preparing => info!("preparing the dataset"),
			Progress::Training(counter) => info!(candidates = counter.total(), "training"),
			Progress::CrossValidating(counter) => {
				info!(folds = counter.total(), "cross validating")
			}
			Progress::Assembling => info!("assembling the report"),
		},
	)
	.context("failed to train")?;

	if args.json {
		let json = serde_json::to_string_pretty(&report)?;
		println!("{}", json);
	} else {
		print_report(&report);
	}
	Ok(())
}

fn print_report(report: &Report) {
	println!(
		"{} {} model: {}",
		"Trained".green().bold(),
		report.task_type(),
		report.model().bold()
	);
	println!();
	let mut metrics = Table::new(vec!["Metric".to_owned(), "Value".to_owned()]);
	for (name, value) in report.metrics() {
		metrics.push_row(vec![name.to_owned(), format!("{:.4}", value)]);
	}
	println!("{}", metrics);
	let mut candidates = Table::new(vec!["Candidate".to_owned(), "Test Score".to_owned()]);
	for candidate in report.candidates() {
		let score = match candidate.score {
			Some(score) => format!("{:.4}", score),
			None => "failed".to_owned(),
		};
		candidates.push_row(vec![candidate.name.clone(), score]);
	}
	println!("{}", candidates);
	if let Some(feature_importance) = report.feature_importance() {
		let mut importances: Vec<(&String, f32)> = report
			.features()
			.iter()
			.zip(feature_importance.iter().cloned())
			.collect();
		importances.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
		let mut table = Table::new(vec!["Feature".to_owned(), "Importance".to_owned()]);
		for (feature, importance) in importances {
			table.push_row(vec![feature.clone(), format!("{:.4}", importance)]);
		}
		println!("{}", table);
	}
}

use crate::{
	cancel,
	cross_validation::{cross_validate, Scorer, N_FOLDS},
	evaluate::{evaluate, ComparisonMetric, TestMetrics},
	prepare, train_test_split, Candidate, CandidateError, CandidateScore, Capabilities,
	ClassificationReport, Dataset, FittedModel, Progress, Registry, RegressionReport, Report,
	Target, TrainError, TrainOptions,
};
use num_traits::ToPrimitive;
use rayon::prelude::*;
use std::sync::Arc;
use tabml_dataframe::DataFrame;
use tabml_util::{finite::Finite, progress_counter::ProgressCounter};
use tracing::{info, instrument, warn};

/**
Train every built in candidate model on `dataframe` to predict the column named `target` and report on the best one.

This uses the candidates of [`Registry::builtin`](struct.Registry.html#method.builtin) with the capabilities of this build. Use [`train_with_registry`](fn.train_with_registry.html) to choose the candidates.
*/
pub fn train(
	dataframe: &DataFrame,
	target: &str,
	options: &TrainOptions,
	update_progress: &mut dyn FnMut(Progress),
) -> Result<Report, TrainError> {
	let registry = Registry::builtin(Capabilities::current(), options);
	train_with_registry(dataframe, target, &registry, options, update_progress)
}

/// A candidate that was fit and scored on the test partition.
struct Evaluated {
	candidate: Arc<dyn Candidate>,
	model: Box<dyn FittedModel>,
	metrics: TestMetrics,
	score: Finite<f32>,
}

/**
Train the candidates in `registry` for the detected task type on `dataframe` and report on the best one.

1. Find the target column, detect the task type, and encode the features and target.
2. Split the rows into a training partition and a test partition with a generator seeded by `options.seed`.
3. Fit every candidate on the training partition and score it on the test partition. A candidate that fails loses. The best candidate is kept, and ties keep the earlier candidate.
4. Cross validate the winner with `N_FOLDS` folds of the training partition.
5. Assemble the report from the winner's test metrics, cross validation score, and feature importances.
*/
#[instrument(skip_all, fields(target = target))]
pub fn train_with_registry(
	dataframe: &DataFrame,
	target: &str,
	registry: &Registry,
	options: &TrainOptions,
	update_progress: &mut dyn FnMut(Progress),
) -> Result<Report, TrainError> {
	cancel::check(options)?;
	update_progress(Progress::Preparing);
	let prepared = prepare(dataframe, target)?;
	let task = prepared.task;
	info!(task = %task, n_rows = dataframe.nrows(), "detected task type");

	// split the rows into train and test partitions
	let n_rows = prepared.dataset.nrows();
	let (train_rows, test_rows) = train_test_split(n_rows, options.seed);
	if train_rows.len() < N_FOLDS || test_rows.is_empty() {
		return Err(TrainError::TooFewRows {
			rows: n_rows,
			required: min_rows(),
		});
	}
	let dataset_train = prepared.dataset.select(&train_rows);
	let dataset_test = prepared.dataset.select(&test_rows);
	info!(
		n_train_rows = dataset_train.nrows(),
		n_test_rows = dataset_test.nrows(),
		"split dataset"
	);
	warn_about_absent_classes(&prepared.dataset.target, &dataset_train, &dataset_test);

	// train and score each candidate
	let comparison_metric = ComparisonMetric::for_task(task);
	let candidates = registry.candidates(task);
	let progress_counter = ProgressCounter::new(candidates.len().to_u64().unwrap());
	update_progress(Progress::Training(progress_counter.clone()));
	let train_candidate =
		|candidate: &Arc<dyn Candidate>| -> Result<Result<Evaluated, CandidateError>, TrainError> {
			cancel::check(options)?;
			let outcome = fit_and_evaluate(
				candidate,
				&dataset_train,
				&dataset_test,
				comparison_metric,
			);
			progress_counter.inc(1);
			Ok(outcome)
		};
	let outcomes: Vec<Result<Evaluated, CandidateError>> = if options.parallel {
		candidates.par_iter().map(&train_candidate).collect::<Result<_, _>>()?
	} else {
		candidates.iter().map(&train_candidate).collect::<Result<_, _>>()?
	};

	// choose the best candidate
	let mut scores = Vec::with_capacity(outcomes.len());
	let mut failures = Vec::new();
	let mut best: Option<Evaluated> = None;
	for (candidate, outcome) in candidates.iter().zip(outcomes) {
		match outcome {
			Ok(evaluated) => {
				info!(
					model = candidate.name(),
					metric = comparison_metric.name(),
					score = evaluated.score.get(),
					"evaluated candidate"
				);
				scores.push(CandidateScore {
					name: candidate.name().to_owned(),
					score: Some(evaluated.score.get()),
				});
				let is_better = best
					.as_ref()
					.map(|best| comparison_metric.is_better(evaluated.score, best.score))
					.unwrap_or(true);
				if is_better {
					best = Some(evaluated);
				}
			}
			Err(error) => {
				warn!(model = candidate.name(), error = %error, "candidate failed");
				scores.push(CandidateScore {
					name: candidate.name().to_owned(),
					score: None,
				});
				failures.push(format!("{}: {}", candidate.name(), error));
			}
		}
	}
	let winner = match best {
		Some(winner) => winner,
		None => return Err(TrainError::NoViableModel { failures }),
	};
	info!(model = winner.candidate.name(), "selected winner");

	// cross validate the winner on the training partition
	cancel::check(options)?;
	let progress_counter = ProgressCounter::new(N_FOLDS.to_u64().unwrap());
	update_progress(Progress::CrossValidating(progress_counter.clone()));
	let fold_scores = cross_validate(
		winner.candidate.as_ref(),
		&dataset_train,
		Scorer::for_task(task),
		options,
		&progress_counter,
	)?;
	let cv_score = fold_scores.iter().sum::<f32>() / fold_scores.len().to_f32().unwrap();

	let feature_importance = winner
		.model
		.as_supports_importance()
		.map(|model| model.feature_importances());

	// assemble the report
	cancel::check(options)?;
	update_progress(Progress::Assembling);
	let model = winner.candidate.name().to_owned();
	let report = match winner.metrics {
		TestMetrics::Regression(metrics) => Report::Regression(RegressionReport {
			model,
			rmse: metrics.rmse,
			r2: metrics.r2,
			cv_rmse: -cv_score,
			feature_importance,
			features: prepared.feature_names,
			n_train_rows: dataset_train.nrows(),
			n_test_rows: dataset_test.nrows(),
			candidates: scores,
		}),
		TestMetrics::Classification(metrics) => Report::Classification(ClassificationReport {
			model,
			accuracy: metrics.accuracy,
			precision: metrics.precision_weighted,
			recall: metrics.recall_weighted,
			f1: metrics.f1_weighted,
			cv_accuracy: cv_score,
			feature_importance,
			features: prepared.feature_names,
			n_train_rows: dataset_train.nrows(),
			n_test_rows: dataset_test.nrows(),
			candidates: scores,
		}),
	};
	Ok(report)
}

fn fit_and_evaluate(
	candidate: &Arc<dyn Candidate>,
	dataset_train: &Dataset,
	dataset_test: &Dataset,
	comparison_metric: ComparisonMetric,
) -> Result<Evaluated, CandidateError> {
	let model = candidate.fit(dataset_train.features.view(), dataset_train.target.view())?;
	let metrics = evaluate(model.as_ref(), dataset_test)?;
	let score = comparison_metric.value(&metrics)?;
	Ok(Evaluated {
		candidate: candidate.clone(),
		model,
		metrics,
		score,
	})
}

/// The smallest number of rows whose training partition holds one row per fold.
fn min_rows() -> usize {
	(1..)
		.find(|n_rows| {
			let n_test = (n_rows + 4) / 5;
			n_rows - n_test >= N_FOLDS
		})
		.unwrap_or(N_FOLDS)
}

/// Classes missing from a partition make some per-class metrics undefined. Those classes contribute zero to the weighted metrics, and this logs a warning so the caller knows.
fn warn_about_absent_classes(target: &Target, dataset_train: &Dataset, dataset_test: &Dataset) {
	let classes = match target {
		Target::Class { classes, .. } => classes,
		Target::Number(_) => return,
	};
	for (partition, dataset) in [("train", dataset_train), ("test", dataset_test)].iter() {
		if let Target::Class { codes, .. } = &dataset.target {
			let mut present = vec![false; classes.len()];
			for code in codes.iter() {
				present[*code] = true;
			}
			let absent: Vec<&str> = classes
				.iter()
				.zip(present)
				.filter(|(_, present)| !present)
				.map(|(class, _)| class.as_str())
				.collect();
			if !absent.is_empty() {
				warn!(
					partition = *partition,
					classes = ?absent,
					"classes are absent from a partition, their metrics count as zero"
				);
			}
		}
	}
}

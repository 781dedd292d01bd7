use crate::{
	cancel, evaluate::check_predictions, Candidate, CandidateError, Dataset, FittedModel,
	Predictions, Target, TaskType, TrainError, TrainOptions,
};
use rayon::prelude::*;
use tabml_metrics::{Accuracy, MeanSquaredError, StreamingMetric};
use tabml_util::{progress_counter::ProgressCounter, zip};
use tracing::debug;

/// The number of folds used to cross validate the winning model.
pub const N_FOLDS: usize = 5;

/// The score computed on each cross validation fold. Higher is always better, so the root mean squared error is negated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scorer {
	NegRootMeanSquaredError,
	Accuracy,
}

impl Scorer {
	pub fn for_task(task: TaskType) -> Scorer {
		match task {
			TaskType::Regression => Scorer::NegRootMeanSquaredError,
			TaskType::Classification => Scorer::Accuracy,
		}
	}

	/// Score `model`'s predictions on `dataset`.
	pub fn score(&self, model: &dyn FittedModel, dataset: &Dataset) -> Result<f32, CandidateError> {
		let predictions = model.predict(dataset.features.view());
		check_predictions(&predictions, &dataset.target)?;
		let score = match (self, &predictions, &dataset.target) {
			(
				Scorer::NegRootMeanSquaredError,
				Predictions::Number(predictions),
				Target::Number(labels),
			) => {
				let mut mse = MeanSquaredError::new();
				for (prediction, label) in zip!(predictions.iter(), labels.iter()) {
					mse.update((*prediction, *label));
				}
				mse.finalize().map(|mse| -mse.sqrt())
			}
			(Scorer::Accuracy, Predictions::Class(predictions), Target::Class { codes, .. }) => {
				let mut accuracy = Accuracy::new();
				for (prediction, label) in zip!(predictions.iter(), codes.iter()) {
					accuracy.update((*prediction, *label));
				}
				accuracy.finalize()
			}
			(_, predictions, _) => {
				return Err(CandidateError::PredictionMismatch {
					found: predictions.kind(),
					expected: match self {
						Scorer::NegRootMeanSquaredError => "number",
						Scorer::Accuracy => "class",
					},
				})
			}
		};
		match score {
			Some(score) if score.is_finite() => Ok(score),
			_ => Err(CandidateError::NonFiniteMetric {
				metric: "cross validation score",
			}),
		}
	}
}

/// Split `n_rows` rows into `k` contiguous folds without shuffling. The first `n_rows % k` folds get one extra row.
pub fn k_fold(n_rows: usize, k: usize) -> Vec<Vec<usize>> {
	let mut folds = Vec::with_capacity(k);
	let mut start = 0;
	for fold_index in 0..k {
		let size = n_rows / k + if fold_index < n_rows % k { 1 } else { 0 };
		folds.push((start..start + size).collect());
		start += size;
	}
	folds
}

/// Split rows into `k` folds so each class is spread evenly across them. Rows are taken class by class, in order, and dealt to the folds in turn, so fold sizes differ by at most one. Each fold's rows are sorted.
pub fn stratified_k_fold(codes: &[usize], k: usize) -> Vec<Vec<usize>> {
	let n_classes = codes.iter().max().map(|max| max + 1).unwrap_or(0);
	let mut folds: Vec<Vec<usize>> = vec![Vec::new(); k];
	let mut position = 0;
	for class_index in 0..n_classes {
		for (row, _) in codes
			.iter()
			.enumerate()
			.filter(|(_, code)| **code == class_index)
		{
			folds[position % k].push(row);
			position += 1;
		}
	}
	for fold in folds.iter_mut() {
		fold.sort_unstable();
	}
	folds
}

/// Refit `candidate` on each fold's complement within `dataset` and score it on the fold. Returns one score per fold, in fold order.
pub(crate) fn cross_validate(
	candidate: &dyn Candidate,
	dataset: &Dataset,
	scorer: Scorer,
	options: &TrainOptions,
	progress_counter: &ProgressCounter,
) -> Result<Vec<f32>, TrainError> {
	let n_rows = dataset.nrows();
	let folds = match &dataset.target {
		Target::Number(_) => k_fold(n_rows, N_FOLDS),
		Target::Class { codes, .. } => stratified_k_fold(&codes.to_vec(), N_FOLDS),
	};
	let failed = |source: CandidateError| TrainError::CrossValidationFailed {
		model: candidate.name().to_owned(),
		source,
	};
	let score_fold = |(fold_index, test_rows): (usize, &Vec<usize>)| -> Result<f32, TrainError> {
		cancel::check(options)?;
		let mut in_test = vec![false; n_rows];
		for row in test_rows {
			in_test[*row] = true;
		}
		let train_rows: Vec<usize> = (0..n_rows).filter(|row| !in_test[*row]).collect();
		let train = dataset.select(&train_rows);
		let test = dataset.select(test_rows);
		let model = candidate
			.fit(train.features.view(), train.target.view())
			.map_err(failed)?;
		let score = scorer.score(model.as_ref(), &test).map_err(failed)?;
		debug!(model = candidate.name(), fold = fold_index, score, "scored fold");
		progress_counter.inc(1);
		Ok(score)
	};
	if options.parallel {
		folds.par_iter().enumerate().map(&score_fold).collect()
	} else {
		folds.iter().enumerate().map(&score_fold).collect()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_k_fold() {
		let folds = k_fold(12, 5);
		let sizes: Vec<usize> = folds.iter().map(|fold| fold.len()).collect();
		assert_eq!(sizes, vec![3, 3, 2, 2, 2]);
		assert_eq!(folds[0], vec![0, 1, 2]);
		assert_eq!(folds[4], vec![10, 11]);
		let sizes: Vec<usize> = k_fold(120, 5).iter().map(|fold| fold.len()).collect();
		assert_eq!(sizes, vec![24; 5]);
	}

	#[test]
	fn test_stratified_k_fold() {
		let codes = [0, 1, 0, 1, 0, 1, 0, 1, 2, 2];
		let folds = stratified_k_fold(&codes, 5);
		assert_eq!(
			folds,
			vec![vec![0, 3], vec![2, 5], vec![4, 7], vec![6, 8], vec![1, 9]]
		);
		let codes: Vec<usize> = (0..150).map(|row| row % 3).collect();
		for fold in stratified_k_fold(&codes[..120], 5) {
			assert_eq!(fold.len(), 24);
		}
	}
}

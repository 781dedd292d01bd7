use crate::{CandidateError, Dataset, FittedModel, Predictions, Target, TaskType};
use tabml_metrics::{
	ClassificationMetrics, ClassificationMetricsInput, ClassificationMetricsOutput,
	RegressionMetrics, RegressionMetricsInput, RegressionMetricsOutput, StreamingMetric,
};
use tabml_util::finite::Finite;

/// The metrics computed from a model's predictions on the test partition.
#[derive(Debug)]
pub enum TestMetrics {
	Regression(RegressionMetricsOutput),
	Classification(ClassificationMetricsOutput),
}

/// The metric used to compare candidate models. A later candidate replaces the best so far only if it is strictly better, so ties keep the earlier candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComparisonMetric {
	/// Root mean squared error. Lower is better.
	Rmse,
	/// Higher is better.
	Accuracy,
}

impl ComparisonMetric {
	pub fn for_task(task: TaskType) -> ComparisonMetric {
		match task {
			TaskType::Regression => ComparisonMetric::Rmse,
			TaskType::Classification => ComparisonMetric::Accuracy,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			ComparisonMetric::Rmse => "rmse",
			ComparisonMetric::Accuracy => "accuracy",
		}
	}

	/// Pull this metric out of `metrics`. A value that is NaN or infinite is an error, which makes the candidate lose.
	pub fn value(&self, metrics: &TestMetrics) -> Result<Finite<f32>, CandidateError> {
		let value = match (self, metrics) {
			(ComparisonMetric::Rmse, TestMetrics::Regression(metrics)) => metrics.rmse,
			(ComparisonMetric::Accuracy, TestMetrics::Classification(metrics)) => metrics.accuracy,
			(ComparisonMetric::Rmse, TestMetrics::Classification(_)) => {
				return Err(CandidateError::PredictionMismatch {
					found: "class",
					expected: "number",
				})
			}
			(ComparisonMetric::Accuracy, TestMetrics::Regression(_)) => {
				return Err(CandidateError::PredictionMismatch {
					found: "number",
					expected: "class",
				})
			}
		};
		Finite::new(value).map_err(|_| CandidateError::NonFiniteMetric {
			metric: self.name(),
		})
	}

	/// Return true if `candidate` is strictly better than `best`.
	pub fn is_better(&self, candidate: Finite<f32>, best: Finite<f32>) -> bool {
		match self {
			ComparisonMetric::Rmse => candidate < best,
			ComparisonMetric::Accuracy => candidate > best,
		}
	}
}

/// Predict on `dataset` and compute the test metrics for its target type.
pub(crate) fn evaluate(
	model: &dyn FittedModel,
	dataset: &Dataset,
) -> Result<TestMetrics, CandidateError> {
	let predictions = model.predict(dataset.features.view());
	check_predictions(&predictions, &dataset.target)?;
	match (predictions, &dataset.target) {
		(Predictions::Number(predictions), Target::Number(labels)) => {
			let labels = labels.to_vec();
			let mut metrics = RegressionMetrics::new();
			metrics.update(RegressionMetricsInput {
				predictions: &predictions,
				labels: &labels,
			});
			Ok(TestMetrics::Regression(metrics.finalize()))
		}
		(Predictions::Class(predictions), Target::Class { codes, classes }) => {
			let labels = codes.to_vec();
			let mut metrics = ClassificationMetrics::new(classes.len());
			metrics.update(ClassificationMetricsInput {
				predictions: &predictions,
				labels: &labels,
			});
			Ok(TestMetrics::Classification(metrics.finalize()))
		}
		_ => unreachable!(),
	}
}

/// Make sure the predictions have the target's kind and length and contain only finite numbers or valid class indexes.
pub(crate) fn check_predictions(
	predictions: &Predictions,
	target: &Target,
) -> Result<(), CandidateError> {
	if predictions.len() != target.len() {
		return Err(CandidateError::Failed(format!(
			"the model produced {} predictions for {} examples",
			predictions.len(),
			target.len()
		)));
	}
	match (predictions, target) {
		(Predictions::Number(predictions), Target::Number(_)) => {
			if predictions.iter().any(|prediction| !prediction.is_finite()) {
				return Err(CandidateError::NonFinitePrediction);
			}
		}
		(Predictions::Class(predictions), Target::Class { classes, .. }) => {
			if let Some(prediction) = predictions.iter().find(|p| **p >= classes.len()) {
				return Err(CandidateError::Failed(format!(
					"the model predicted class {} but there are {} classes",
					prediction,
					classes.len()
				)));
			}
		}
		(predictions, target) => {
			return Err(CandidateError::PredictionMismatch {
				found: predictions.kind(),
				expected: target.view().kind(),
			})
		}
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;

	fn finite(value: f32) -> Finite<f32> {
		Finite::new(value).unwrap()
	}

	#[test]
	fn test_ties_keep_the_earlier_candidate() {
		assert!(!ComparisonMetric::Rmse.is_better(finite(1.0), finite(1.0)));
		assert!(!ComparisonMetric::Accuracy.is_better(finite(0.9), finite(0.9)));
		assert!(ComparisonMetric::Rmse.is_better(finite(0.5), finite(1.0)));
		assert!(ComparisonMetric::Accuracy.is_better(finite(0.95), finite(0.9)));
	}

	#[test]
	fn test_check_predictions() {
		let target = Target::Number(ndarray::arr1(&[1.0, 2.0]));
		assert!(check_predictions(&Predictions::Number(vec![1.0, 2.0]), &target).is_ok());
		assert!(matches!(
			check_predictions(&Predictions::Number(vec![1.0, std::f32::NAN]), &target),
			Err(CandidateError::NonFinitePrediction)
		));
		assert!(matches!(
			check_predictions(&Predictions::Class(vec![0, 1]), &target),
			Err(CandidateError::PredictionMismatch { .. })
		));
		assert!(check_predictions(&Predictions::Number(vec![1.0]), &target).is_err());
	}
}

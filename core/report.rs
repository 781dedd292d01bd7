use crate::TaskType;

/// The result of a training run. It serializes with a `type` field of `"regression"` or `"classification"` next to the fields of the task's report.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
	Regression(RegressionReport),
	Classification(ClassificationReport),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RegressionReport {
	/// The name of the winning candidate.
	pub model: String,
	/// The root mean squared error on the test partition.
	pub rmse: f32,
	/// The coefficient of determination on the test partition.
	pub r2: f32,
	/// The mean root mean squared error over the cross validation folds.
	pub cv_rmse: f32,
	/// One value per feature, aligned with `features`. This is `None` if the winning model does not measure feature importance.
	pub feature_importance: Option<Vec<f32>>,
	pub features: Vec<String>,
	pub n_train_rows: usize,
	pub n_test_rows: usize,
	/// The score of every candidate, in the order they were tried.
	pub candidates: Vec<CandidateScore>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClassificationReport {
	/// The name of the winning candidate.
	pub model: String,
	pub accuracy: f32,
	/// Precision, recall, and f1 are averaged over the classes weighted by the number of test examples in each class.
	pub precision: f32,
	pub recall: f32,
	pub f1: f32,
	/// The mean accuracy over the cross validation folds.
	pub cv_accuracy: f32,
	/// One value per feature, aligned with `features`. This is `None` if the winning model does not measure feature importance.
	pub feature_importance: Option<Vec<f32>>,
	pub features: Vec<String>,
	pub n_train_rows: usize,
	pub n_test_rows: usize,
	/// The score of every candidate, in the order they were tried.
	pub candidates: Vec<CandidateScore>,
}

/// A candidate's primary metric on the test partition. The score is `None` if the candidate failed.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CandidateScore {
	pub name: String,
	pub score: Option<f32>,
}

impl Report {
	pub fn task_type(&self) -> TaskType {
		match self {
			Report::Regression(_) => TaskType::Regression,
			Report::Classification(_) => TaskType::Classification,
		}
	}

	pub fn model(&self) -> &str {
		match self {
			Report::Regression(report) => &report.model,
			Report::Classification(report) => &report.model,
		}
	}

	pub fn features(&self) -> &[String] {
		match self {
			Report::Regression(report) => &report.features,
			Report::Classification(report) => &report.features,
		}
	}

	pub fn feature_importance(&self) -> Option<&[f32]> {
		match self {
			Report::Regression(report) => report.feature_importance.as_deref(),
			Report::Classification(report) => report.feature_importance.as_deref(),
		}
	}

	pub fn candidates(&self) -> &[CandidateScore] {
		match self {
			Report::Regression(report) => &report.candidates,
			Report::Classification(report) => &report.candidates,
		}
	}

	/// The metrics of this report as (name, value) pairs, in the order they are reported.
	pub fn metrics(&self) -> Vec<(&'static str, f32)> {
		match self {
			Report::Regression(report) => vec![
				("rmse", report.rmse),
				("r2", report.r2),
				("cv_rmse", report.cv_rmse),
			],
			Report::Classification(report) => vec![
				("accuracy", report.accuracy),
				("precision", report.precision),
				("recall", report.recall),
				("f1", report.f1),
				("cv_accuracy", report.cv_accuracy),
			],
		}
	}
}

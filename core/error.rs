use thiserror::Error;

/// The errors that abort a training run. No report is produced when one of these is returned.
#[derive(Debug, Error)]
pub enum TrainError {
	#[error("did not find target column \"{target}\" among column names \"{}\"", columns.join(", "))]
	InvalidTarget { target: String, columns: Vec<String> },
	#[error("the dataset has no rows")]
	EmptyDataset,
	#[error("the target column has {count} missing values")]
	MissingTargetValues { count: usize },
	#[error("the dataset has no columns other than the target")]
	NoFeatures,
	#[error("the dataset has {rows} rows but at least {required} are required")]
	TooFewRows { rows: usize, required: usize },
	#[error("every candidate model failed: {}", failures.join("; "))]
	NoViableModel { failures: Vec<String> },
	#[error("failed to cross validate {model}")]
	CrossValidationFailed {
		model: String,
		#[source]
		source: CandidateError,
	},
	#[error("training was cancelled")]
	Cancelled,
	#[error("training did not finish before the deadline")]
	DeadlineExceeded,
}

/// The errors that make a single candidate lose without aborting the run.
#[derive(Debug, Error)]
pub enum CandidateError {
	#[error("the model produced a non-finite prediction")]
	NonFinitePrediction,
	#[error("the {metric} is not finite")]
	NonFiniteMetric { metric: &'static str },
	#[error("the model produced {found} predictions for a {expected} target")]
	PredictionMismatch {
		found: &'static str,
		expected: &'static str,
	},
	#[error("{0}")]
	Failed(String),
}

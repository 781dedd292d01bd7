use crate::CancellationToken;
use std::time::Instant;
#[cfg(feature = "gbt")]
use tabml_tree::BoostingOptions;
use tabml_tree::ForestOptions;

/// These are the options passed to [`train`](fn.train.html).
#[derive(Clone, Debug)]
pub struct TrainOptions {
	/// The seed for the train/test partition and every candidate model.
	pub seed: u64,
	/// If true, candidate models and cross validation folds are trained in parallel.
	pub parallel: bool,
	pub cancellation: Option<CancellationToken>,
	/// If the run is still going at this instant, it stops at the next checkpoint with `TrainError::DeadlineExceeded`.
	pub deadline: Option<Instant>,
	/// The seed in these options is replaced by `seed`.
	pub forest: ForestOptions,
	/// The seed in these options is replaced by `seed`.
	#[cfg(feature = "gbt")]
	pub gradient_boosting: BoostingOptions,
}

impl Default for TrainOptions {
	fn default() -> Self {
		Self {
			seed: 42,
			parallel: true,
			cancellation: None,
			deadline: None,
			forest: ForestOptions::default(),
			#[cfg(feature = "gbt")]
			gradient_boosting: BoostingOptions::default(),
		}
	}
}

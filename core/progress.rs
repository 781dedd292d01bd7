use tabml_util::progress_counter::ProgressCounter;

/// This enum reports the progress of a training run to the `update_progress` callback passed to [`train`](fn.train.html).
#[derive(Debug)]
pub enum Progress {
	Preparing,
	/// The counter counts candidate models that have been trained and scored.
	Training(ProgressCounter),
	/// The counter counts cross validation folds that have been scored.
	CrossValidating(ProgressCounter),
	Assembling,
}

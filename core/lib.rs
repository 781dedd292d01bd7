/*!
This crate is the tabml training engine. Given a [`DataFrame`](../tabml_dataframe/struct.DataFrame.html) and the name of a target column, [`train`](fn.train.html) decides whether the task is regression or classification, encodes the features, splits the rows into a training and a test partition, trains every candidate model in the [`Registry`](struct.Registry.html), keeps the one with the best score on the test partition, cross-validates it on the training partition, and returns a [`Report`](enum.Report.html).

```
use tabml_core::{train, Progress, Report, TrainOptions};
use tabml_dataframe::{DataFrame, NumberColumn};

let x: Vec<f32> = (0..40).map(|i| i as f32).collect();
let y: Vec<f32> = x.iter().map(|x| 2.0 * x + 1.0).collect();
let dataframe = DataFrame::new(vec![
	NumberColumn::new("x".to_owned(), x).into(),
	NumberColumn::new("y".to_owned(), y).into(),
]);
let report = train(&dataframe, "y", &TrainOptions::default(), &mut |_: Progress| {}).unwrap();
assert!(matches!(report, Report::Regression(_)));
assert_eq!(report.features(), &["x".to_owned()]);
```
*/

#![allow(clippy::tabs_in_doc_comments)]

mod cancel;
mod candidate;
mod config;
mod cross_validation;
mod error;
mod evaluate;
mod models;
mod options;
mod prepare;
mod progress;
mod registry;
mod report;
mod task;
mod train;

pub use self::{
	cancel::CancellationToken,
	candidate::{Candidate, FittedModel, Predictions, SupportsImportance},
	config::{Config, GradientBoostingConfig, RandomForestConfig},
	cross_validation::{k_fold, stratified_k_fold, Scorer, N_FOLDS},
	error::{CandidateError, TrainError},
	evaluate::{ComparisonMetric, TestMetrics},
	models::RandomForest,
	options::TrainOptions,
	prepare::{
		prepare, train_test_split, Dataset, PreparedData, Target, TargetView, TEST_FRACTION,
	},
	progress::Progress,
	registry::{Capabilities, Registry},
	report::{CandidateScore, ClassificationReport, RegressionReport, Report},
	task::{detect_task_type, TaskType, CLASSIFICATION_MAX_DISTINCT_VALUES},
	train::{train, train_with_registry},
};

#[cfg(feature = "gbt")]
pub use self::models::GradientBoosting;

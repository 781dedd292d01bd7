use ndarray::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::sync::{Arc, Mutex};
use tabml_core::{
	Candidate, CandidateError, CancellationToken, FittedModel, Predictions, Progress, Registry,
	Report, TargetView, TaskType, TrainError, TrainOptions,
};
use tabml_dataframe::{DataFrame, EnumColumn, NumberColumn};

/// Three well separated classes in two informative columns plus one noise column.
fn flowers(n_rows: usize) -> DataFrame {
	let mut rng = Xoshiro256Plus::seed_from_u64(0);
	let names = ["setosa", "versicolor", "virginica"];
	let mut petal_length = Vec::with_capacity(n_rows);
	let mut petal_width = Vec::with_capacity(n_rows);
	let mut noise = Vec::with_capacity(n_rows);
	let mut species = Vec::with_capacity(n_rows);
	for i in 0..n_rows {
		let class = i % 3;
		petal_length.push(class as f32 * 2.0 + rng.gen_range(0.0, 1.0));
		petal_width.push(class as f32 * 0.8 + rng.gen_range(0.0, 0.4));
		noise.push(rng.gen_range(0.0, 1.0));
		species.push(names[class].to_owned());
	}
	DataFrame::new(vec![
		NumberColumn::new("petal_length".to_owned(), petal_length).into(),
		NumberColumn::new("petal_width".to_owned(), petal_width).into(),
		NumberColumn::new("noise".to_owned(), noise).into(),
		EnumColumn::new("species".to_owned(), species).into(),
	])
}

/// A price that depends on the size and the number of rooms of a house.
fn houses(n_rows: usize) -> DataFrame {
	let mut rng = Xoshiro256Plus::seed_from_u64(1);
	let mut size = Vec::with_capacity(n_rows);
	let mut rooms = Vec::with_capacity(n_rows);
	let mut price = Vec::with_capacity(n_rows);
	for _ in 0..n_rows {
		let s: f32 = rng.gen_range(50.0, 250.0);
		let r = rng.gen_range(1u32, 6u32) as f32;
		size.push(s);
		rooms.push(r);
		price.push(1000.0 * s + 5000.0 * r + rng.gen_range(-1000.0, 1000.0));
	}
	DataFrame::new(vec![
		NumberColumn::new("size".to_owned(), size).into(),
		NumberColumn::new("rooms".to_owned(), rooms).into(),
		NumberColumn::new("price".to_owned(), price).into(),
	])
}

fn quick_options() -> TrainOptions {
	let mut options = TrainOptions::default();
	options.forest.n_trees = 10;
	#[cfg(feature = "gbt")]
	{
		options.gradient_boosting.max_rounds = 10;
	}
	options
}

fn no_progress() -> impl FnMut(Progress) {
	|_: Progress| {}
}

/// Predicts the first class, or zero, for every row. It reports no feature importances.
struct Constant {
	name: &'static str,
}

struct ConstantModel {
	class: bool,
}

impl Candidate for Constant {
	fn name(&self) -> &str {
		self.name
	}

	fn fit(
		&self,
		_features: ArrayView2<f32>,
		target: TargetView,
	) -> Result<Box<dyn FittedModel>, CandidateError> {
		let class = matches!(target, TargetView::Class { .. });
		Ok(Box::new(ConstantModel { class }))
	}
}

impl FittedModel for ConstantModel {
	fn predict(&self, features: ArrayView2<f32>) -> Predictions {
		if self.class {
			Predictions::Class(vec![0; features.nrows()])
		} else {
			Predictions::Number(vec![0.0; features.nrows()])
		}
	}
}

struct Failing;

impl Candidate for Failing {
	fn name(&self) -> &str {
		"Failing"
	}

	fn fit(
		&self,
		_features: ArrayView2<f32>,
		_target: TargetView,
	) -> Result<Box<dyn FittedModel>, CandidateError> {
		Err(CandidateError::Failed("out of luck".to_owned()))
	}
}

/// Like `Constant`, but records the number of rows passed to every call to `fit`.
struct Recording {
	fit_rows: Arc<Mutex<Vec<usize>>>,
}

impl Candidate for Recording {
	fn name(&self) -> &str {
		"Recording"
	}

	fn fit(
		&self,
		features: ArrayView2<f32>,
		target: TargetView,
	) -> Result<Box<dyn FittedModel>, CandidateError> {
		self.fit_rows.lock().unwrap().push(features.nrows());
		let class = matches!(target, TargetView::Class { .. });
		Ok(Box::new(ConstantModel { class }))
	}
}

fn registry(candidates: Vec<Arc<dyn Candidate>>) -> Registry {
	Registry::new(candidates.clone(), candidates)
}

#[test]
fn test_classification() {
	let dataframe = flowers(150);
	let report = tabml_core::train(&dataframe, "species", &quick_options(), &mut no_progress())
		.unwrap();
	assert_eq!(report.task_type(), TaskType::Classification);
	let report = match report {
		Report::Classification(report) => report,
		Report::Regression(_) => panic!("expected a classification report"),
	};
	assert_eq!(report.n_train_rows, 120);
	assert_eq!(report.n_test_rows, 30);
	for value in &[
		report.accuracy,
		report.precision,
		report.recall,
		report.f1,
		report.cv_accuracy,
	] {
		assert!((0.0f32..=1.0).contains(value));
	}
	assert!(report.accuracy > 0.8);
	assert_eq!(
		report.features,
		vec![
			"petal_length".to_owned(),
			"petal_width".to_owned(),
			"noise".to_owned()
		]
	);
	let feature_importance = report.feature_importance.unwrap();
	assert_eq!(feature_importance.len(), 3);
	let total: f32 = feature_importance.iter().sum();
	assert!((total - 1.0).abs() < 1e-4);
}

#[test]
fn test_regression() {
	let dataframe = houses(500);
	let report =
		tabml_core::train(&dataframe, "price", &quick_options(), &mut no_progress()).unwrap();
	let report = match report {
		Report::Regression(report) => report,
		Report::Classification(_) => panic!("expected a regression report"),
	};
	assert_eq!(report.n_train_rows + report.n_test_rows, 500);
	assert_eq!(report.n_test_rows, 100);
	assert!(report.rmse >= 0.0);
	assert!(report.cv_rmse >= 0.0);
	assert!(report.r2 <= 1.0);
	assert!(report.r2 > 0.5);
	assert!(!report.features.contains(&"price".to_owned()));
	#[cfg(feature = "gbt")]
	assert_eq!(report.candidates.len(), 2);
}

#[test]
fn test_missing_target() {
	let dataframe = houses(20);
	let error = tabml_core::train(&dataframe, "cost", &quick_options(), &mut no_progress())
		.unwrap_err();
	match error {
		TrainError::InvalidTarget { target, columns } => {
			assert_eq!(target, "cost");
			assert_eq!(columns, vec!["size", "rooms", "price"]);
		}
		error => panic!("unexpected error {}", error),
	}
}

#[test]
fn test_too_few_rows() {
	let dataframe = houses(6);
	let error = tabml_core::train(&dataframe, "price", &quick_options(), &mut no_progress())
		.unwrap_err();
	assert!(matches!(
		error,
		TrainError::TooFewRows {
			rows: 6,
			required: 7
		}
	));
}

#[test]
fn test_ties_keep_the_first_candidate() {
	let dataframe = flowers(60);
	let first: Arc<dyn Candidate> = Arc::new(Constant { name: "First" });
	let second: Arc<dyn Candidate> = Arc::new(Constant { name: "Second" });
	let registry = registry(vec![first, second]);
	let report = tabml_core::train_with_registry(
		&dataframe,
		"species",
		&registry,
		&quick_options(),
		&mut no_progress(),
	)
	.unwrap();
	assert_eq!(report.model(), "First");
	let scores: Vec<Option<f32>> = report.candidates().iter().map(|c| c.score).collect();
	assert_eq!(scores[0], scores[1]);
	assert!(report.feature_importance().is_none());
}

#[test]
fn test_failing_candidate_loses() {
	let dataframe = houses(50);
	let failing: Arc<dyn Candidate> = Arc::new(Failing);
	let constant: Arc<dyn Candidate> = Arc::new(Constant { name: "Constant" });
	let report = tabml_core::train_with_registry(
		&dataframe,
		"price",
		&registry(vec![failing.clone(), constant]),
		&quick_options(),
		&mut no_progress(),
	)
	.unwrap();
	assert_eq!(report.model(), "Constant");
	assert_eq!(report.candidates()[0].name, "Failing");
	assert_eq!(report.candidates()[0].score, None);
	let error = tabml_core::train_with_registry(
		&dataframe,
		"price",
		&registry(vec![failing]),
		&quick_options(),
		&mut no_progress(),
	)
	.unwrap_err();
	match error {
		TrainError::NoViableModel { failures } => {
			assert_eq!(failures, vec!["Failing: out of luck".to_owned()]);
		}
		error => panic!("unexpected error {}", error),
	}
}

#[test]
fn test_same_seed_same_report() {
	let dataframe = flowers(90);
	let options = quick_options();
	let a = tabml_core::train(&dataframe, "species", &options, &mut no_progress()).unwrap();
	let b = tabml_core::train(&dataframe, "species", &options, &mut no_progress()).unwrap();
	assert_eq!(a, b);
}

#[test]
fn test_parallel_and_serial_reports_match() {
	let dataframe = houses(200);
	let parallel = tabml_core::train(&dataframe, "price", &quick_options(), &mut no_progress())
		.unwrap();
	let options = TrainOptions {
		parallel: false,
		..quick_options()
	};
	let serial = tabml_core::train(&dataframe, "price", &options, &mut no_progress()).unwrap();
	assert_eq!(parallel, serial);
}

#[test]
fn test_cross_validation_fits_only_training_rows() {
	let fit_rows = Arc::new(Mutex::new(Vec::new()));
	let recording: Arc<dyn Candidate> = Arc::new(Recording {
		fit_rows: fit_rows.clone(),
	});
	let options = TrainOptions {
		parallel: false,
		..quick_options()
	};
	let report = tabml_core::train_with_registry(
		&houses(100),
		"price",
		&registry(vec![recording]),
		&options,
		&mut no_progress(),
	)
	.unwrap();
	assert_eq!(report.task_type(), TaskType::Regression);
	// one fit on the training partition, then one per fold on the rest of it
	assert_eq!(*fit_rows.lock().unwrap(), vec![80, 64, 64, 64, 64, 64]);
}

#[test]
fn test_numeric_target_with_few_values_is_classification() {
	let n_rows = 60;
	let x: Vec<f32> = (0..n_rows).map(|i| i as f32).collect();
	let ten: Vec<f32> = (0..n_rows).map(|i| (i % 10) as f32).collect();
	let eleven: Vec<f32> = (0..n_rows).map(|i| (i % 11) as f32).collect();
	let dataframe = DataFrame::new(vec![
		NumberColumn::new("x".to_owned(), x.clone()).into(),
		NumberColumn::new("y".to_owned(), ten).into(),
	]);
	let report = tabml_core::train(&dataframe, "y", &quick_options(), &mut no_progress()).unwrap();
	assert_eq!(report.task_type(), TaskType::Classification);
	let dataframe = DataFrame::new(vec![
		NumberColumn::new("x".to_owned(), x).into(),
		NumberColumn::new("y".to_owned(), eleven).into(),
	]);
	let report = tabml_core::train(&dataframe, "y", &quick_options(), &mut no_progress()).unwrap();
	assert_eq!(report.task_type(), TaskType::Regression);
}

#[test]
fn test_cancelled() {
	let token = CancellationToken::new();
	token.cancel();
	let options = TrainOptions {
		cancellation: Some(token),
		..quick_options()
	};
	let error =
		tabml_core::train(&houses(50), "price", &options, &mut no_progress()).unwrap_err();
	assert!(matches!(error, TrainError::Cancelled));
}

#[test]
fn test_progress_stages() {
	let mut stages = Vec::new();
	tabml_core::train(&houses(50), "price", &quick_options(), &mut |progress| {
		stages.push(match progress {
			Progress::Preparing => "preparing",
			Progress::Training(_) => "training",
			Progress::CrossValidating(_) => "cross_validating",
			Progress::Assembling => "assembling",
		})
	})
	.unwrap();
	assert_eq!(
		stages,
		vec!["preparing", "training", "cross_validating", "assembling"]
	);
}

#[test]
fn test_capabilities_mask_gradient_boosting() {
	let options = quick_options();
	let registry = Registry::builtin(tabml_core::Capabilities::none(), &options);
	let report = tabml_core::train_with_registry(
		&houses(50),
		"price",
		&registry,
		&options,
		&mut no_progress(),
	)
	.unwrap();
	assert_eq!(report.model(), "RandomForest");
	assert_eq!(report.candidates().len(), 1);
}

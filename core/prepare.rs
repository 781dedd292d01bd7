use crate::{detect_task_type, TaskType, TrainError};
use fnv::FnvHashMap;
use ndarray::prelude::*;
use rand::{seq::SliceRandom, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use std::cmp::Ordering;
use tabml_dataframe::{Column, DataFrame};

/// The fraction of rows held out to score the candidate models.
pub const TEST_FRACTION: f32 = 0.2;

/// The encoded dataset, ready to be split and trained on.
#[derive(Clone, Debug)]
pub struct PreparedData {
	pub task: TaskType,
	/// The names of the feature columns in the order of the columns of `dataset.features`. The target column is never among them.
	pub feature_names: Vec<String>,
	pub dataset: Dataset,
}

/// A feature matrix with one row per example and its target values.
#[derive(Clone, Debug)]
pub struct Dataset {
	/// (n_examples, n_features). Enum columns are replaced by their codes and missing numbers are NaN.
	pub features: Array2<f32>,
	pub target: Target,
}

#[derive(Clone, Debug)]
pub enum Target {
	Number(Array1<f32>),
	Class {
		/// The class index of each example.
		codes: Array1<usize>,
		/// The name of each class, indexed by class index.
		classes: Vec<String>,
	},
}

/// A borrowed [`Target`](enum.Target.html). This is what candidate models are trained on.
#[derive(Clone, Copy, Debug)]
pub enum TargetView<'a> {
	Number(ArrayView1<'a, f32>),
	Class {
		codes: ArrayView1<'a, usize>,
		n_classes: usize,
	},
}

impl Dataset {
	pub fn nrows(&self) -> usize {
		self.features.nrows()
	}

	/// Copy the given rows, in the given order, into a new dataset.
	pub fn select(&self, rows: &[usize]) -> Dataset {
		Dataset {
			features: self.features.select(Axis(0), rows),
			target: self.target.select(rows),
		}
	}
}

impl Target {
	pub fn len(&self) -> usize {
		match self {
			Target::Number(values) => values.len(),
			Target::Class { codes, .. } => codes.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn view(&self) -> TargetView {
		match self {
			Target::Number(values) => TargetView::Number(values.view()),
			Target::Class { codes, classes } => TargetView::Class {
				codes: codes.view(),
				n_classes: classes.len(),
			},
		}
	}

	fn select(&self, rows: &[usize]) -> Target {
		match self {
			Target::Number(values) => Target::Number(values.select(Axis(0), rows)),
			Target::Class { codes, classes } => Target::Class {
				codes: codes.select(Axis(0), rows),
				classes: classes.clone(),
			},
		}
	}
}

impl<'a> TargetView<'a> {
	pub fn kind(&self) -> &'static str {
		match self {
			TargetView::Number(_) => "number",
			TargetView::Class { .. } => "class",
		}
	}
}

/**
Separate the target column from the features and encode both.

Number feature columns are copied as they are. Each enum feature column is replaced by integer codes assigned to its distinct values in order of first appearance, starting at 0. An enum target is coded the same way. A number target is kept as it is for regression, and for classification its distinct values are sorted and each value is replaced by its index.

Encoding happens before the rows are split, so the train and test partitions share codes.
*/
pub fn prepare(dataframe: &DataFrame, target: &str) -> Result<PreparedData, TrainError> {
	let target_column = dataframe
		.column(target)
		.ok_or_else(|| TrainError::InvalidTarget {
			target: target.to_owned(),
			columns: dataframe
				.column_names()
				.into_iter()
				.map(ToOwned::to_owned)
				.collect(),
		})?;
	let n_rows = dataframe.nrows();
	if n_rows == 0 {
		return Err(TrainError::EmptyDataset);
	}
	if let Column::Number(column) = target_column {
		let count = column.data.iter().filter(|value| value.is_nan()).count();
		if count > 0 {
			return Err(TrainError::MissingTargetValues { count });
		}
	}
	let task = detect_task_type(target_column);

	let feature_columns: Vec<&Column> = dataframe
		.columns
		.iter()
		.filter(|column| column.name() != target)
		.collect();
	if feature_columns.is_empty() {
		return Err(TrainError::NoFeatures);
	}
	let feature_names = feature_columns
		.iter()
		.map(|column| column.name().to_owned())
		.collect();
	let mut features = Array2::zeros((n_rows, feature_columns.len()));
	for (mut feature, column) in features.columns_mut().into_iter().zip(feature_columns) {
		match column {
			Column::Number(column) => {
				for (value, data) in feature.iter_mut().zip(column.data.iter()) {
					*value = *data;
				}
			}
			Column::Enum(column) => {
				let (codes, _) = encode_by_first_appearance(&column.data);
				for (value, code) in feature.iter_mut().zip(codes) {
					*value = code as f32;
				}
			}
		}
	}

	let target = match (task, target_column) {
		(TaskType::Regression, Column::Number(column)) => {
			Target::Number(Array::from(column.data.clone()))
		}
		(_, Column::Enum(column)) => {
			let (codes, classes) = encode_by_first_appearance(&column.data);
			Target::Class {
				codes: Array::from(codes),
				classes,
			}
		}
		(TaskType::Classification, Column::Number(column)) => {
			let (codes, classes) = encode_by_sorted_value(&column.data);
			Target::Class {
				codes: Array::from(codes),
				classes,
			}
		}
	};

	Ok(PreparedData {
		task,
		feature_names,
		dataset: Dataset { features, target },
	})
}

fn encode_by_first_appearance(values: &[String]) -> (Vec<usize>, Vec<String>) {
	let mut options: Vec<String> = Vec::new();
	let mut codes_by_value: FnvHashMap<&str, usize> = FnvHashMap::default();
	let codes = values
		.iter()
		.map(|value| {
			*codes_by_value.entry(value.as_str()).or_insert_with(|| {
				options.push(value.clone());
				options.len() - 1
			})
		})
		.collect();
	(codes, options)
}

fn encode_by_sorted_value(values: &[f32]) -> (Vec<usize>, Vec<String>) {
	let mut distinct: Vec<f32> = values.to_vec();
	distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
	distinct.dedup();
	let codes = values
		.iter()
		.map(|value| {
			distinct
				.iter()
				.position(|distinct| distinct == value)
				.unwrap_or(0)
		})
		.collect();
	let classes = distinct.iter().map(|value| value.to_string()).collect();
	(codes, classes)
}

/// Shuffle the row indexes with a generator seeded by `seed` and hold out the first `ceil(TEST_FRACTION * n_rows)` of them for testing. Returns the (train, test) row indexes.
pub fn train_test_split(n_rows: usize, seed: u64) -> (Vec<usize>, Vec<usize>) {
	let mut rows: Vec<usize> = (0..n_rows).collect();
	let mut rng = Xoshiro256Plus::seed_from_u64(seed);
	rows.shuffle(&mut rng);
	// ceil(0.2 * n_rows) without rounding error
	let n_test = (n_rows + 4) / 5;
	let train = rows.split_off(n_test);
	(train, rows)
}

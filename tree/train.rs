use crate::{
	feature_importances::compute_feature_importances, single::train_tree, BinaryClassifier,
	BoostingOptions, MulticlassClassifier, Regressor, TrainProgress, Tree, TreeOptions,
};
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use tabml_util::progress_counter::ProgressCounter;
use tracing::{debug, instrument};

#[derive(Debug)]
pub enum Task {
	Regression,
	BinaryClassification,
	MulticlassClassification { n_classes: usize },
}

pub enum Labels<'a> {
	Number(ArrayView1<'a, f32>),
	/// Class indexes in `0..n_classes`.
	Class(ArrayView1<'a, usize>),
}

#[derive(Debug)]
pub enum Model {
	Regressor(Regressor),
	BinaryClassifier(BinaryClassifier),
	MulticlassClassifier(MulticlassClassifier),
}

/// To avoid code duplication, this shared `train` method is called by `Regressor::train`, `BinaryClassifier::train`, and `MulticlassClassifier::train`.
#[instrument(skip_all, fields(task = ?task, n_examples = features.nrows(), max_rounds = options.max_rounds))]
pub fn train(
	task: &Task,
	features: ArrayView2<f32>,
	labels: Labels,
	options: &BoostingOptions,
	update_progress: &mut dyn FnMut(TrainProgress),
) -> Model {
	let n_examples = features.nrows();
	let n_features = features.ncols();

	// Regression and binary classification have one tree for each round. Multiclass classification has one tree per class for each round.
	let n_trees_per_round = match task {
		Task::Regression => 1,
		Task::BinaryClassification => 1,
		Task::MulticlassClassification { n_classes } => *n_classes,
	};

	// A tree model's prediction will be a bias plus the sum of the outputs of each tree. The bias will produce the baseline prediction.
	let biases = match (task, &labels) {
		// For regression, the bias is the mean of the labels.
		(Task::Regression, Labels::Number(labels)) => super::regressor::compute_biases(*labels),
		// For binary classification, the bias is the log of the ratio of positive examples to negative examples in the training set, so the baseline prediction is the majority class.
		(Task::BinaryClassification, Labels::Class(labels)) => {
			super::binary_classifier::compute_biases(*labels)
		}
		// For multiclass classification the biases are the logs of each class's proportion in the training set, so the baseline prediction is the majority class.
		(Task::MulticlassClassification { .. }, Labels::Class(labels)) => {
			super::multiclass_classifier::compute_biases(*labels, n_trees_per_round)
		}
		_ => unreachable!(),
	};

	let tree_options = TreeOptions {
		max_depth: Some(options.max_depth),
		min_examples_per_child: options.min_examples_per_child,
		min_sum_hessians_per_child: options.min_sum_hessians_per_child,
		min_gain_to_split: options.min_gain_to_split,
		l2_regularization: options.l2_regularization,
		max_features: None,
	};

	// Pre-allocate memory to be used in training.
	let mut predictions: Array2<f32> = Array::zeros((n_trees_per_round, n_examples));
	let mut gradients: Array2<f32> = Array::zeros((n_trees_per_round, n_examples));
	let mut hessians: Array2<f32> = Array::zeros((n_trees_per_round, n_examples));

	// These are the trees in round-major order. After training this will have shape (n_rounds, n_trees_per_round).
	let mut trees: Vec<Tree> = Vec::with_capacity(options.max_rounds * n_trees_per_round);

	// Before the first round, fill the predictions with the biases, which are the baseline predictions.
	for mut predictions_column in predictions.columns_mut() {
		predictions_column.assign(&biases)
	}

	let round_counter = ProgressCounter::new(options.max_rounds.to_u64().unwrap());
	update_progress(TrainProgress::Training(round_counter.clone()));
	for round_index in 0..options.max_rounds {
		// Update the gradients and hessians before each round using the loss between the current predictions and the labels.
		match &labels {
			Labels::Number(labels) => super::regressor::update_gradients_and_hessians(
				gradients.view_mut(),
				hessians.view_mut(),
				*labels,
				predictions.view(),
			),
			Labels::Class(labels) => match task {
				Task::BinaryClassification => {
					super::binary_classifier::update_gradients_and_hessians(
						gradients.view_mut(),
						hessians.view_mut(),
						*labels,
						predictions.view(),
					)
				}
				_ => super::multiclass_classifier::update_gradients_and_hessians(
					gradients.view_mut(),
					hessians.view_mut(),
					*labels,
					predictions.view(),
				),
			},
		};
		// Train n_trees_per_round trees in parallel.
		let gradients = gradients.view();
		let hessians = hessians.view();
		let tree_options = &tree_options;
		let trees_for_round: Vec<Tree> = (0..n_trees_per_round)
			.into_par_iter()
			.map(|tree_index| {
				let seed = options
					.seed
					.wrapping_add((round_index * n_trees_per_round + tree_index) as u64);
				let mut rng = Xoshiro256Plus::seed_from_u64(seed);
				let mut tree = train_tree(
					features,
					(0..n_examples).collect(),
					gradients.row(tree_index).insert_axis(Axis(1)),
					hessians.row(tree_index),
					tree_options,
					&mut rng,
				);
				tree.scale(options.learning_rate);
				tree
			})
			.collect();
		// Update the predictions with the most recently trained trees.
		for (example_index, row) in features.axis_iter(Axis(0)).enumerate() {
			let row = row.to_vec();
			for (tree_index, tree) in trees_for_round.iter().enumerate() {
				predictions[(tree_index, example_index)] += tree.predict(&row)[0];
			}
		}
		debug!(
			round = round_index,
			n_leaves = trees_for_round.iter().map(Tree::n_leaves).sum::<usize>(),
			"trained round"
		);
		trees.extend(trees_for_round);
		round_counter.inc(1);
	}

	// compute feature importances
	let feature_importances = compute_feature_importances(&trees, n_features);

	// assemble the model
	match task {
		Task::Regression => Model::Regressor(Regressor {
			bias: biases[0],
			trees,
			feature_importances,
		}),
		Task::BinaryClassification => Model::BinaryClassifier(BinaryClassifier {
			bias: biases[0],
			trees,
			feature_importances,
		}),
		Task::MulticlassClassification { n_classes } => {
			Model::MulticlassClassifier(MulticlassClassifier {
				n_rounds: options.max_rounds,
				n_classes: *n_classes,
				biases: biases.to_vec(),
				trees,
				feature_importances,
			})
		}
	}
}

use crate::{
	argmax, feature_importances::compute_averaged_feature_importances, single::train_tree,
	TrainProgress, Tree, TreeOptions,
};
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use tabml_util::progress_counter::ProgressCounter;
use tracing::{debug, instrument};

/// These are the options passed to `ForestRegressor::train` and `ForestClassifier::train`.
#[derive(Clone, Debug)]
pub struct ForestOptions {
	pub n_trees: usize,
	/// If this is `None`, trees grow until their leaves are pure.
	pub max_depth: Option<usize>,
	pub min_examples_per_child: usize,
	/// If this is `None`, regressors consider every feature at each node and classifiers consider the square root of the number of features.
	pub max_features: Option<MaxFeatures>,
	/// If true, each tree is trained on a sample of the training examples drawn with replacement.
	pub bootstrap: bool,
	pub seed: u64,
}

impl Default for ForestOptions {
	fn default() -> Self {
		Self {
			n_trees: 100,
			max_depth: None,
			min_examples_per_child: 1,
			max_features: None,
			bootstrap: true,
			seed: 42,
		}
	}
}

/// The number of features to consider when looking for the best split at each node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaxFeatures {
	All,
	Sqrt,
	Count(usize),
}

impl MaxFeatures {
	pub fn resolve(self, n_features: usize) -> usize {
		let resolved = match self {
			MaxFeatures::All => n_features,
			MaxFeatures::Sqrt => n_features.to_f64().unwrap().sqrt().floor().to_usize().unwrap(),
			MaxFeatures::Count(count) => count,
		};
		resolved.max(1).min(n_features.max(1))
	}
}

/// A `ForestRegressor` predicts the mean of the predictions of its trees.
#[derive(Debug)]
pub struct ForestRegressor {
	pub trees: Vec<Tree>,
	/// The importance of each feature as measured by the gain of the splits that use it, averaged over the trees.
	pub feature_importances: Vec<f32>,
}

/// A `ForestClassifier` predicts the class with the highest mean probability over its trees.
#[derive(Debug)]
pub struct ForestClassifier {
	pub n_classes: usize,
	pub trees: Vec<Tree>,
	/// The importance of each feature as measured by the gain of the splits that use it, averaged over the trees.
	pub feature_importances: Vec<f32>,
}

impl ForestRegressor {
	/// Train a forest regressor.
	#[instrument(skip_all, fields(n_trees = options.n_trees, n_examples = features.nrows()))]
	pub fn train(
		features: ArrayView2<f32>,
		labels: ArrayView1<f32>,
		options: &ForestOptions,
		update_progress: &mut dyn FnMut(TrainProgress),
	) -> ForestRegressor {
		let n_features = features.ncols();
		// With a gradient of -y and a hessian of 1 each leaf outputs the mean label.
		let gradients = labels.mapv(|label| -label).insert_axis(Axis(1));
		let hessians = Array1::ones(labels.len());
		let max_features = options.max_features.unwrap_or(MaxFeatures::All);
		let trees = train_trees(
			features,
			gradients.view(),
			hessians.view(),
			max_features.resolve(n_features),
			options,
			update_progress,
		);
		let feature_importances = compute_averaged_feature_importances(&trees, n_features);
		ForestRegressor {
			trees,
			feature_importances,
		}
	}

	/// Make predictions.
	pub fn predict(&self, features: ArrayView2<f32>, mut predictions: ArrayViewMut1<f32>) {
		let n_trees = self.trees.len().to_f32().unwrap();
		for (row, prediction) in features.axis_iter(Axis(0)).zip(predictions.iter_mut()) {
			let row = row.to_vec();
			let sum: f32 = self.trees.iter().map(|tree| tree.predict(&row)[0]).sum();
			*prediction = sum / n_trees;
		}
	}
}

impl ForestClassifier {
	/// Train a forest classifier. `labels` are class indexes in `0..n_classes`.
	#[instrument(skip_all, fields(n_trees = options.n_trees, n_examples = features.nrows(), n_classes = n_classes))]
	pub fn train(
		features: ArrayView2<f32>,
		labels: ArrayView1<usize>,
		n_classes: usize,
		options: &ForestOptions,
		update_progress: &mut dyn FnMut(TrainProgress),
	) -> ForestClassifier {
		let n_features = features.ncols();
		// With a gradient of the negated one hot label and a hessian of 1 each leaf outputs the class distribution.
		let gradients = Array2::from_shape_fn((labels.len(), n_classes), |(example_index, class_index)| {
			if labels[example_index] == class_index {
				-1.0
			} else {
				0.0
			}
		});
		let hessians = Array1::ones(labels.len());
		let max_features = options.max_features.unwrap_or(MaxFeatures::Sqrt);
		let trees = train_trees(
			features,
			gradients.view(),
			hessians.view(),
			max_features.resolve(n_features),
			options,
			update_progress,
		);
		let feature_importances = compute_averaged_feature_importances(&trees, n_features);
		ForestClassifier {
			n_classes,
			trees,
			feature_importances,
		}
	}

	/// Write the mean class distribution over the trees for each example into `probabilities`, which has shape (n_examples, n_classes).
	pub fn predict_probabilities(
		&self,
		features: ArrayView2<f32>,
		mut probabilities: ArrayViewMut2<f32>,
	) {
		let n_trees = self.trees.len().to_f32().unwrap();
		probabilities.fill(0.0);
		for (row, mut probabilities) in features
			.axis_iter(Axis(0))
			.zip(probabilities.axis_iter_mut(Axis(0)))
		{
			let row = row.to_vec();
			for tree in self.trees.iter() {
				for (probability, value) in probabilities.iter_mut().zip(tree.predict(&row)) {
					*probability += value;
				}
			}
			probabilities.mapv_inplace(|probability| probability / n_trees);
		}
	}

	/// Predict the class index for each example. Ties go to the lowest class index.
	pub fn predict(&self, features: ArrayView2<f32>) -> Vec<usize> {
		let mut probabilities = Array::zeros((features.nrows(), self.n_classes));
		self.predict_probabilities(features, probabilities.view_mut());
		probabilities
			.axis_iter(Axis(0))
			.map(|probabilities| argmax(&probabilities.to_vec()))
			.collect()
	}
}

/// Train the trees of a forest in parallel. Each tree gets its own seed drawn from a generator seeded with `options.seed`, so the result does not depend on how the trees are scheduled.
fn train_trees(
	features: ArrayView2<f32>,
	gradients: ArrayView2<f32>,
	hessians: ArrayView1<f32>,
	max_features: usize,
	options: &ForestOptions,
	update_progress: &mut dyn FnMut(TrainProgress),
) -> Vec<Tree> {
	let n_examples = features.nrows();
	let tree_options = TreeOptions {
		max_depth: options.max_depth,
		min_examples_per_child: options.min_examples_per_child,
		max_features: Some(max_features),
		..Default::default()
	};
	let mut rng = Xoshiro256Plus::seed_from_u64(options.seed);
	let tree_seeds: Vec<u64> = (0..options.n_trees).map(|_| rng.gen()).collect();
	let progress_counter = ProgressCounter::new(options.n_trees.to_u64().unwrap());
	update_progress(TrainProgress::Training(progress_counter.clone()));
	let trees: Vec<Tree> = tree_seeds
		.into_par_iter()
		.map(|seed| {
			let mut rng = Xoshiro256Plus::seed_from_u64(seed);
			let examples: Vec<usize> = if options.bootstrap && n_examples > 0 {
				(0..n_examples)
					.map(|_| rng.gen_range(0, n_examples))
					.collect()
			} else {
				(0..n_examples).collect()
			};
			let tree = train_tree(
				features,
				examples,
				gradients,
				hessians,
				&tree_options,
				&mut rng,
			);
			progress_counter.inc(1);
			tree
		})
		.collect();
	debug!(
		n_trees = trees.len(),
		n_leaves = trees.iter().map(|tree| tree.n_leaves()).sum::<usize>(),
		"trained forest"
	);
	trees
}

#[cfg(test)]
mod test {
	use super::*;

	fn step_dataset() -> (Array2<f32>, Array1<f32>) {
		let features = Array::from_shape_fn((40, 2), |(i, j)| {
			if j == 0 {
				i.to_f32().unwrap()
			} else {
				(i % 3).to_f32().unwrap()
			}
		});
		let labels = Array::from_shape_fn(40, |i| if i < 20 { 1.0 } else { 10.0 });
		(features, labels)
	}

	#[test]
	fn test_forest_regressor() {
		let (features, labels) = step_dataset();
		let model = ForestRegressor::train(
			features.view(),
			labels.view(),
			&ForestOptions {
				n_trees: 10,
				..Default::default()
			},
			&mut |_| {},
		);
		let mut predictions = Array::zeros(2);
		model.predict(
			arr2(&[[2.0, 0.0], [35.0, 0.0]]).view(),
			predictions.view_mut(),
		);
		assert!((predictions[0] - 1.0).abs() < 1e-4);
		assert!((predictions[1] - 10.0).abs() < 1e-4);
		assert!(model.feature_importances[0] > model.feature_importances[1]);
		let total: f32 = model.feature_importances.iter().sum();
		assert!((total - 1.0).abs() < 1e-4);
	}

	#[test]
	fn test_forest_classifier() {
		let (features, labels) = step_dataset();
		let labels = labels.mapv(|label| if label > 5.0 { 1 } else { 0 });
		let mut progress_total = 0;
		let model = ForestClassifier::train(
			features.view(),
			labels.view(),
			2,
			&ForestOptions {
				n_trees: 10,
				max_features: Some(MaxFeatures::All),
				..Default::default()
			},
			&mut |progress| match progress {
				TrainProgress::Training(counter) => progress_total = counter.total(),
			},
		);
		assert_eq!(progress_total, 10);
		assert_eq!(
			model.predict(arr2(&[[0.0, 1.0], [39.0, 1.0]]).view()),
			vec![0, 1]
		);
	}

	#[test]
	fn test_forest_is_deterministic() {
		let (features, labels) = step_dataset();
		let options = ForestOptions {
			n_trees: 5,
			max_features: Some(MaxFeatures::Count(1)),
			..Default::default()
		};
		let a = ForestRegressor::train(features.view(), labels.view(), &options, &mut |_| {});
		let b = ForestRegressor::train(features.view(), labels.view(), &options, &mut |_| {});
		assert_eq!(a.feature_importances, b.feature_importances);
		let mut predictions_a = Array::zeros(40);
		let mut predictions_b = Array::zeros(40);
		a.predict(features.view(), predictions_a.view_mut());
		b.predict(features.view(), predictions_b.view_mut());
		assert_eq!(predictions_a, predictions_b);
	}

	#[test]
	fn test_resolve_max_features() {
		assert_eq!(MaxFeatures::Sqrt.resolve(3), 1);
		assert_eq!(MaxFeatures::Sqrt.resolve(4), 2);
		assert_eq!(MaxFeatures::Sqrt.resolve(8), 2);
		assert_eq!(MaxFeatures::Sqrt.resolve(9), 3);
		assert_eq!(MaxFeatures::Sqrt.resolve(0), 1);
		assert_eq!(MaxFeatures::All.resolve(7), 7);
		assert_eq!(MaxFeatures::Count(10).resolve(3), 3);
		assert_eq!(MaxFeatures::Count(0).resolve(3), 1);
	}
}

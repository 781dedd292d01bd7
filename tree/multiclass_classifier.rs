use crate::{
	train::{train, Labels, Model, Task},
	BoostingOptions, TrainProgress, Tree,
};
use ndarray::prelude::*;
use num_traits::{clamp, ToPrimitive};
use tabml_util::zip;

/// This struct represents a tree multiclass classifier model. Multiclass classifier models are used to predict multiclass target values, for example which of several species a flower is.
#[derive(Debug)]
pub struct MulticlassClassifier {
	/// The initial prediction of the model given no trained trees. The biases are the logs of the proportion of each class in the training dataset.
	pub biases: Vec<f32>,
	/// The trees for this model. It has shape (n_rounds, n_classes) because for each round, we train n_classes trees.
	pub trees: Vec<Tree>,
	/// The number of classes.
	pub n_classes: usize,
	/// The number of rounds.
	pub n_rounds: usize,
	/// The importance of each feature as measured by the total gain of the splits that use it.
	pub feature_importances: Vec<f32>,
}

impl MulticlassClassifier {
	/// Train a multiclass classifier. `labels` are class indexes in `0..n_classes`.
	pub fn train(
		features: ArrayView2<f32>,
		labels: ArrayView1<usize>,
		n_classes: usize,
		options: &BoostingOptions,
		update_progress: &mut dyn FnMut(TrainProgress),
	) -> MulticlassClassifier {
		let model = train(
			&Task::MulticlassClassification { n_classes },
			features,
			Labels::Class(labels),
			options,
			update_progress,
		);
		match model {
			Model::MulticlassClassifier(model) => model,
			_ => unreachable!(),
		}
	}

	/// Write the probability of each class into `probabilities`, which has shape (n_examples, n_classes).
	pub fn predict(&self, features: ArrayView2<f32>, mut probabilities: ArrayViewMut2<f32>) {
		let n_rounds = self.n_rounds;
		let n_classes = self.n_classes;
		let trees = ArrayView2::from_shape((n_rounds, n_classes), &self.trees).unwrap();
		let biases = ArrayView1::from(self.biases.as_slice());
		for (row, mut logits) in zip!(
			features.axis_iter(Axis(0)),
			probabilities.axis_iter_mut(Axis(0))
		) {
			let row = row.to_vec();
			logits.assign(&biases);
			for trees in trees.rows() {
				for (logit, tree) in zip!(logits.iter_mut(), trees.iter()) {
					*logit += tree.predict(&row)[0];
				}
			}
			softmax(logits);
		}
	}
}

/// Compute the biases.
pub fn compute_biases(labels: ArrayView1<usize>, n_trees_per_round: usize) -> Array1<f32> {
	let mut biases: Array1<f32> = Array::zeros(n_trees_per_round);
	for label in labels {
		biases[*label] += 1.0;
	}
	let n_examples = labels.len().to_f32().unwrap().max(1.0);
	biases.mapv_inplace(|count| {
		let probability = clamp(count / n_examples, std::f32::EPSILON, 1.0 - std::f32::EPSILON);
		probability.ln()
	});
	biases
}

/// Compute the gradients and hessians for each example given the labels and predictions.
pub fn update_gradients_and_hessians(
	// (n_trees_per_round, n_examples)
	mut gradients: ArrayViewMut2<f32>,
	// (n_trees_per_round, n_examples)
	mut hessians: ArrayViewMut2<f32>,
	// (n_examples)
	labels: ArrayView1<usize>,
	// (n_trees_per_round, n_examples)
	predictions: ArrayView2<f32>,
) {
	let mut probabilities = predictions.to_owned();
	for (mut gradients, mut hessians, mut probabilities, label) in zip!(
		gradients.columns_mut(),
		hessians.columns_mut(),
		probabilities.columns_mut(),
		labels.iter()
	) {
		softmax(probabilities.view_mut());
		for (class_index, (probability, gradient, hessian)) in
			zip!(probabilities.iter(), gradients.iter_mut(), hessians.iter_mut()).enumerate()
		{
			let label = if *label == class_index { 1.0 } else { 0.0 };
			*gradient = *probability - label;
			*hessian = *probability * (1.0 - *probability);
		}
	}
}

fn softmax(mut logits: ArrayViewMut1<f32>) {
	let max = logits.iter().fold(std::f32::MIN, |a, &b| a.max(b));
	for logit in logits.iter_mut() {
		*logit = (*logit - max).exp();
	}
	let sum = logits.iter().sum::<f32>();
	logits /= sum;
}

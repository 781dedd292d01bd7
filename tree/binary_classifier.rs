use crate::{
	train::{train, Labels, Model, Task},
	BoostingOptions, TrainProgress, Tree,
};
use ndarray::prelude::*;
use num_traits::{clamp, ToPrimitive};
use std::ops::Neg;
use tabml_util::zip;

/// A Binary classifier model is trained to predict binary target values, for example whether a patient has heart disease or not.
#[derive(Debug)]
pub struct BinaryClassifier {
	/// The initial prediction of the model given no trained trees. The bias is the log odds of the positive class in the training dataset.
	pub bias: f32,
	/// The trees for this model.
	pub trees: Vec<Tree>,
	/// The importance of each feature as measured by the total gain of the splits that use it.
	pub feature_importances: Vec<f32>,
}

impl BinaryClassifier {
	/// Train a binary classifier. `labels` are 0 for the negative class and 1 for the positive class.
	pub fn train(
		features: ArrayView2<f32>,
		labels: ArrayView1<usize>,
		options: &BoostingOptions,
		update_progress: &mut dyn FnMut(TrainProgress),
	) -> BinaryClassifier {
		let model = train(
			&Task::BinaryClassification,
			features,
			Labels::Class(labels),
			options,
			update_progress,
		);
		match model {
			Model::BinaryClassifier(model) => model,
			_ => unreachable!(),
		}
	}

	/// Write the probability of each class into `probabilities`, which has shape (n_examples, 2).
	pub fn predict(&self, features: ArrayView2<f32>, mut probabilities: ArrayViewMut2<f32>) {
		for (row, mut probabilities) in zip!(
			features.axis_iter(Axis(0)),
			probabilities.axis_iter_mut(Axis(0))
		) {
			let row = row.to_vec();
			let mut logit = self.bias;
			for tree in &self.trees {
				logit += tree.predict(&row)[0];
			}
			let probability = sigmoid(logit);
			probabilities[0] = 1.0 - probability;
			probabilities[1] = probability;
		}
	}
}

/// Compute the biases.
pub fn compute_biases(labels: ArrayView1<usize>) -> Array1<f32> {
	let n_examples = labels.len().to_f32().unwrap().max(1.0);
	let pos_count = labels.iter().filter(|label| **label == 1).count();
	let probability = clamp(
		pos_count.to_f32().unwrap() / n_examples,
		std::f32::EPSILON,
		1.0 - std::f32::EPSILON,
	);
	arr1(&[(probability / (1.0 - probability)).ln()])
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
	for (gradient, hessian, label, prediction) in zip!(
		gradients.row_mut(0),
		hessians.row_mut(0),
		labels.iter(),
		predictions.row(0)
	) {
		let probability = clamp(
			sigmoid(*prediction),
			std::f32::EPSILON,
			1.0 - std::f32::EPSILON,
		);
		*gradient = probability - label.to_f32().unwrap();
		*hessian = probability * (1.0 - probability);
	}
}

fn sigmoid(value: f32) -> f32 {
	1.0 / (value.neg().exp() + 1.0)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_binary_classifier() {
		let features = Array::from_shape_fn((40, 2), |(i, j)| (i * (j + 1)).to_f32().unwrap());
		let labels = Array::from_shape_fn(40, |i| if i >= 25 { 1 } else { 0 });
		let model = BinaryClassifier::train(
			features.view(),
			labels.view(),
			&BoostingOptions {
				max_rounds: 10,
				..Default::default()
			},
			&mut |_| {},
		);
		assert!(model.bias < 0.0);
		let mut probabilities = Array::zeros((2, 2));
		model.predict(
			arr2(&[[1.0, 2.0], [30.0, 60.0]]).view(),
			probabilities.view_mut(),
		);
		assert!(probabilities[(0, 0)] > 0.5);
		assert!(probabilities[(1, 1)] > 0.5);
		assert!((probabilities[(1, 0)] + probabilities[(1, 1)] - 1.0).abs() < 1e-6);
	}

	#[test]
	fn test_biases_with_one_class() {
		let biases = compute_biases(arr1(&[0, 0, 0]).view());
		assert!(biases[0].is_finite());
		assert!(biases[0] < 0.0);
	}
}

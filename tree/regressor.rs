use crate::{
	train::{train, Labels, Model, Task},
	BoostingOptions, TrainProgress, Tree,
};
use ndarray::prelude::*;
use tabml_util::zip;

/// `Regressor`s predict continuous target values, for example the selling price of a home.
#[derive(Debug)]
pub struct Regressor {
	/// The initial prediction of the model given no trained trees. The bias is calculated using the mean value of the target column in the training dataset.
	pub bias: f32,
	/// The trees for this model.
	pub trees: Vec<Tree>,
	/// The importance of each feature as measured by the total gain of the splits that use it.
	pub feature_importances: Vec<f32>,
}

impl Regressor {
	/// Train a regressor.
	pub fn train(
		features: ArrayView2<f32>,
		labels: ArrayView1<f32>,
		options: &BoostingOptions,
		update_progress: &mut dyn FnMut(TrainProgress),
	) -> Regressor {
		let model = train(
			&Task::Regression,
			features,
			Labels::Number(labels),
			options,
			update_progress,
		);
		match model {
			Model::Regressor(model) => model,
			_ => unreachable!(),
		}
	}

	/// Make predictions.
	pub fn predict(&self, features: ArrayView2<f32>, mut predictions: ArrayViewMut1<f32>) {
		predictions.fill(self.bias);
		for (row, prediction) in zip!(features.axis_iter(Axis(0)), predictions.iter_mut()) {
			let row = row.to_vec();
			for tree in &self.trees {
				*prediction += tree.predict(&row)[0];
			}
		}
	}
}

/// This function is used by the common train function to compute the biases for regression.
pub fn compute_biases(labels: ArrayView1<f32>) -> Array1<f32> {
	arr1(&[labels.mean().unwrap_or(0.0)])
}

/// This function is used by the common train function to compute the gradients and hessians before each round.
pub fn update_gradients_and_hessians(
	// (n_trees_per_round, n_examples)
	mut gradients: ArrayViewMut2<f32>,
	// (n_trees_per_round, n_examples)
	mut hessians: ArrayViewMut2<f32>,
	// (n_examples)
	labels: ArrayView1<f32>,
	// (n_trees_per_round, n_examples)
	predictions: ArrayView2<f32>,
) {
	// The squared error loss has a constant second derivative.
	hessians.fill(1.0);
	for (gradient, label, prediction) in
		zip!(gradients.row_mut(0), labels.iter(), predictions.row(0))
	{
		*gradient = prediction - label;
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use num_traits::ToPrimitive;

	#[test]
	fn test_regressor() {
		let features = Array::from_shape_fn((30, 1), |(i, _)| i.to_f32().unwrap());
		let labels = features.column(0).mapv(|x| if x < 15.0 { 0.0 } else { 4.0 });
		let options = BoostingOptions {
			max_rounds: 20,
			..Default::default()
		};
		let model = Regressor::train(features.view(), labels.view(), &options, &mut |_| {});
		assert_eq!(model.bias, 2.0);
		assert_eq!(model.trees.len(), 20);
		let mut predictions = Array::zeros(2);
		model.predict(arr2(&[[3.0], [20.0]]).view(), predictions.view_mut());
		assert!((predictions[0] - 0.0).abs() < 0.1);
		assert!((predictions[1] - 4.0).abs() < 0.1);
		assert_eq!(model.feature_importances, vec![1.0]);
	}
}

use crate::{CandidateError, TargetView};
use ndarray::prelude::*;

/**
A `Candidate` is a named, trainable model. The [`Registry`](struct.Registry.html) lists the candidates to try for each task type, and each run fits a fresh model from every candidate.

The target passed to `fit` decides what kind of model is trained: a `TargetView::Number` target trains a regressor and a `TargetView::Class` target trains a classifier.
*/
pub trait Candidate: Send + Sync {
	fn name(&self) -> &str;
	fn fit(
		&self,
		features: ArrayView2<f32>,
		target: TargetView,
	) -> Result<Box<dyn FittedModel>, CandidateError>;
}

/// A model produced by [`Candidate::fit`](trait.Candidate.html#tymethod.fit).
pub trait FittedModel: Send + Sync {
	/// Predict a value for each row of `features`, which has shape (n_examples, n_features).
	fn predict(&self, features: ArrayView2<f32>) -> Predictions;

	/// Models that can report feature importances return `Some` here.
	fn as_supports_importance(&self) -> Option<&dyn SupportsImportance> {
		None
	}
}

/// Models that measure how much each feature contributes to their predictions implement this trait.
pub trait SupportsImportance {
	/// One value per feature, in the order of the feature columns the model was trained on.
	fn feature_importances(&self) -> Vec<f32>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predictions {
	Number(Vec<f32>),
	/// Class indexes.
	Class(Vec<usize>),
}

impl Predictions {
	pub fn kind(&self) -> &'static str {
		match self {
			Predictions::Number(_) => "number",
			Predictions::Class(_) => "class",
		}
	}

	pub fn len(&self) -> usize {
		match self {
			Predictions::Number(values) => values.len(),
			Predictions::Class(values) => values.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

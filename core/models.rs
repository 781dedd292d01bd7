use crate::{Candidate, CandidateError, FittedModel, Predictions, SupportsImportance, TargetView};
use ndarray::prelude::*;
#[cfg(feature = "gbt")]
use tabml_tree::{argmax, BinaryClassifier, BoostingOptions, MulticlassClassifier, Regressor};
use tabml_tree::{ForestClassifier, ForestOptions, ForestRegressor, TrainProgress};
use tracing::debug;

/// The bagged ensemble candidate. It trains a `ForestRegressor` for number targets and a `ForestClassifier` for class targets.
pub struct RandomForest {
	options: ForestOptions,
}

impl RandomForest {
	pub fn new(options: ForestOptions) -> RandomForest {
		RandomForest { options }
	}
}

impl Candidate for RandomForest {
	fn name(&self) -> &str {
		"RandomForest"
	}

	fn fit(
		&self,
		features: ArrayView2<f32>,
		target: TargetView,
	) -> Result<Box<dyn FittedModel>, CandidateError> {
		let mut update_progress = log_progress(self.name());
		let model: Box<dyn FittedModel> = match target {
			TargetView::Number(labels) => Box::new(ForestRegressor::train(
				features,
				labels,
				&self.options,
				&mut update_progress,
			)),
			TargetView::Class { codes, n_classes } => Box::new(ForestClassifier::train(
				features,
				codes,
				n_classes,
				&self.options,
				&mut update_progress,
			)),
		};
		Ok(model)
	}
}

impl FittedModel for ForestRegressor {
	fn predict(&self, features: ArrayView2<f32>) -> Predictions {
		let mut predictions = Array::zeros(features.nrows());
		ForestRegressor::predict(self, features, predictions.view_mut());
		Predictions::Number(predictions.to_vec())
	}

	fn as_supports_importance(&self) -> Option<&dyn SupportsImportance> {
		Some(self)
	}
}

impl SupportsImportance for ForestRegressor {
	fn feature_importances(&self) -> Vec<f32> {
		self.feature_importances.clone()
	}
}

impl FittedModel for ForestClassifier {
	fn predict(&self, features: ArrayView2<f32>) -> Predictions {
		Predictions::Class(ForestClassifier::predict(self, features))
	}

	fn as_supports_importance(&self) -> Option<&dyn SupportsImportance> {
		Some(self)
	}
}

impl SupportsImportance for ForestClassifier {
	fn feature_importances(&self) -> Vec<f32> {
		self.feature_importances.clone()
	}
}

/// The gradient boosted candidate. It trains a `Regressor` for number targets, a `BinaryClassifier` for two classes, and a `MulticlassClassifier` otherwise.
#[cfg(feature = "gbt")]
pub struct GradientBoosting {
	options: BoostingOptions,
}

#[cfg(feature = "gbt")]
impl GradientBoosting {
	pub fn new(options: BoostingOptions) -> GradientBoosting {
		GradientBoosting { options }
	}
}

#[cfg(feature = "gbt")]
impl Candidate for GradientBoosting {
	fn name(&self) -> &str {
		"GradientBoosting"
	}

	fn fit(
		&self,
		features: ArrayView2<f32>,
		target: TargetView,
	) -> Result<Box<dyn FittedModel>, CandidateError> {
		let mut update_progress = log_progress(self.name());
		// Binary and multiclass training both minimize the log loss.
		let model: Box<dyn FittedModel> = match target {
			TargetView::Number(labels) => Box::new(Regressor::train(
				features,
				labels,
				&self.options,
				&mut update_progress,
			)),
			TargetView::Class { codes, n_classes } if n_classes == 2 => {
				Box::new(BinaryClassifier::train(
					features,
					codes,
					&self.options,
					&mut update_progress,
				))
			}
			TargetView::Class { codes, n_classes } => Box::new(MulticlassClassifier::train(
				features,
				codes,
				n_classes,
				&self.options,
				&mut update_progress,
			)),
		};
		Ok(model)
	}
}

#[cfg(feature = "gbt")]
impl FittedModel for Regressor {
	fn predict(&self, features: ArrayView2<f32>) -> Predictions {
		let mut predictions = Array::zeros(features.nrows());
		Regressor::predict(self, features, predictions.view_mut());
		Predictions::Number(predictions.to_vec())
	}

	fn as_supports_importance(&self) -> Option<&dyn SupportsImportance> {
		Some(self)
	}
}

#[cfg(feature = "gbt")]
impl SupportsImportance for Regressor {
	fn feature_importances(&self) -> Vec<f32> {
		self.feature_importances.clone()
	}
}

#[cfg(feature = "gbt")]
impl FittedModel for BinaryClassifier {
	fn predict(&self, features: ArrayView2<f32>) -> Predictions {
		let mut probabilities = Array::zeros((features.nrows(), 2));
		BinaryClassifier::predict(self, features, probabilities.view_mut());
		Predictions::Class(class_indexes(probabilities.view()))
	}

	fn as_supports_importance(&self) -> Option<&dyn SupportsImportance> {
		Some(self)
	}
}

#[cfg(feature = "gbt")]
impl SupportsImportance for BinaryClassifier {
	fn feature_importances(&self) -> Vec<f32> {
		self.feature_importances.clone()
	}
}

#[cfg(feature = "gbt")]
impl FittedModel for MulticlassClassifier {
	fn predict(&self, features: ArrayView2<f32>) -> Predictions {
		let mut probabilities = Array::zeros((features.nrows(), self.n_classes));
		MulticlassClassifier::predict(self, features, probabilities.view_mut());
		Predictions::Class(class_indexes(probabilities.view()))
	}

	fn as_supports_importance(&self) -> Option<&dyn SupportsImportance> {
		Some(self)
	}
}

#[cfg(feature = "gbt")]
impl SupportsImportance for MulticlassClassifier {
	fn feature_importances(&self) -> Vec<f32> {
		self.feature_importances.clone()
	}
}

#[cfg(feature = "gbt")]
fn class_indexes(probabilities: ArrayView2<f32>) -> Vec<usize> {
	probabilities
		.axis_iter(Axis(0))
		.map(|probabilities| argmax(&probabilities.to_vec()))
		.collect()
}

fn log_progress(name: &str) -> impl FnMut(TrainProgress) + '_ {
	move |progress| match progress {
		TrainProgress::Training(counter) => {
			debug!(model = name, total = counter.total(), "training started")
		}
	}
}

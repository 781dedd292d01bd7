use crate::{Candidate, RandomForest, TaskType, TrainOptions};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tabml_tree::ForestOptions;

/// The optional model implementations available in this process.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capabilities {
	/// True when the gradient boosted tree implementation was compiled in.
	pub gradient_boosting: bool,
}

static CAPABILITIES: Lazy<Capabilities> = Lazy::new(|| Capabilities {
	gradient_boosting: cfg!(feature = "gbt"),
});

impl Capabilities {
	/// The capabilities of this build, resolved once per process.
	pub fn current() -> Capabilities {
		*CAPABILITIES
	}

	/// Capabilities with every optional implementation turned off.
	pub fn none() -> Capabilities {
		Capabilities {
			gradient_boosting: false,
		}
	}
}

/// The `Registry` lists, in order, the candidate models to try for each task type. Order matters: when two candidates score the same, the one listed first wins.
#[derive(Clone)]
pub struct Registry {
	regression: Vec<Arc<dyn Candidate>>,
	classification: Vec<Arc<dyn Candidate>>,
}

impl Registry {
	/// The built in candidates: the random forest first, then gradient boosting if `capabilities` has it. Both are seeded with `options.seed`.
	pub fn builtin(capabilities: Capabilities, options: &TrainOptions) -> Registry {
		let random_forest: Arc<dyn Candidate> = Arc::new(RandomForest::new(ForestOptions {
			seed: options.seed,
			..options.forest.clone()
		}));
		let mut candidates = vec![random_forest];
		if capabilities.gradient_boosting {
			candidates.extend(gradient_boosting(options));
		}
		Registry {
			regression: candidates.clone(),
			classification: candidates,
		}
	}

	/// A registry with the given candidates, for callers that bring their own models.
	pub fn new(
		regression: Vec<Arc<dyn Candidate>>,
		classification: Vec<Arc<dyn Candidate>>,
	) -> Registry {
		Registry {
			regression,
			classification,
		}
	}

	pub fn candidates(&self, task: TaskType) -> &[Arc<dyn Candidate>] {
		match task {
			TaskType::Regression => &self.regression,
			TaskType::Classification => &self.classification,
		}
	}
}

#[cfg(feature = "gbt")]
fn gradient_boosting(options: &TrainOptions) -> Option<Arc<dyn Candidate>> {
	let candidate: Arc<dyn Candidate> = Arc::new(crate::GradientBoosting::new(
		tabml_tree::BoostingOptions {
			seed: options.seed,
			..options.gradient_boosting.clone()
		},
	));
	Some(candidate)
}

#[cfg(not(feature = "gbt"))]
fn gradient_boosting(_options: &TrainOptions) -> Option<Arc<dyn Candidate>> {
	None
}

#[cfg(test)]
mod test {
	use super::*;

	fn names(registry: &Registry, task: TaskType) -> Vec<String> {
		registry
			.candidates(task)
			.iter()
			.map(|candidate| candidate.name().to_owned())
			.collect()
	}

	#[test]
	fn test_builtin_order() {
		let options = TrainOptions::default();
		let registry = Registry::builtin(Capabilities::current(), &options);
		let expected: Vec<&str> = if cfg!(feature = "gbt") {
			vec!["RandomForest", "GradientBoosting"]
		} else {
			vec!["RandomForest"]
		};
		assert_eq!(names(&registry, TaskType::Regression), expected);
		assert_eq!(names(&registry, TaskType::Classification), expected);
	}

	#[test]
	fn test_capability_masks_gradient_boosting() {
		let registry = Registry::builtin(Capabilities::none(), &TrainOptions::default());
		assert_eq!(names(&registry, TaskType::Regression), vec!["RandomForest"]);
		assert_eq!(names(&registry, TaskType::Classification), vec!["RandomForest"]);
	}
}

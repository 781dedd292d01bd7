/*!
This module defines the `Config` struct, which is read from a YAML file to adjust the options passed to [`train`](../fn.train.html).

```yaml
seed: 7
parallel: true
gradient_boosting:
  enabled: false
random_forest:
  n_trees: 50
```
*/

use crate::{Capabilities, TrainOptions};
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	pub seed: Option<u64>,
	pub parallel: Option<bool>,
	pub gradient_boosting: Option<GradientBoostingConfig>,
	pub random_forest: Option<RandomForestConfig>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct GradientBoostingConfig {
	/// Setting this to false removes gradient boosting from the candidates even when it is available.
	pub enabled: Option<bool>,
	pub max_rounds: Option<usize>,
	pub learning_rate: Option<f32>,
	pub max_depth: Option<usize>,
	pub l2_regularization: Option<f32>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct RandomForestConfig {
	pub n_trees: Option<usize>,
	pub max_depth: Option<usize>,
	pub min_examples_per_leaf: Option<usize>,
}

impl Config {
	pub fn from_path(config_path: &Path) -> Result<Config> {
		let config = std::fs::read_to_string(config_path)
			.with_context(|| format!("failed to read config file {}", config_path.display()))?;
		let config = serde_yaml::from_str(&config)
			.with_context(|| format!("failed to parse config file {}", config_path.display()))?;
		Ok(config)
	}

	/// Overwrite the options this config sets.
	pub fn apply(&self, options: &mut TrainOptions) {
		if let Some(seed) = self.seed {
			options.seed = seed;
		}
		if let Some(parallel) = self.parallel {
			options.parallel = parallel;
		}
		if let Some(random_forest) = &self.random_forest {
			if let Some(n_trees) = random_forest.n_trees {
				options.forest.n_trees = n_trees;
			}
			if random_forest.max_depth.is_some() {
				options.forest.max_depth = random_forest.max_depth;
			}
			if let Some(min_examples_per_leaf) = random_forest.min_examples_per_leaf {
				options.forest.min_examples_per_child = min_examples_per_leaf;
			}
		}
		#[cfg(feature = "gbt")]
		{
			if let Some(gradient_boosting) = &self.gradient_boosting {
				let boosting = &mut options.gradient_boosting;
				if let Some(max_rounds) = gradient_boosting.max_rounds {
					boosting.max_rounds = max_rounds;
				}
				if let Some(learning_rate) = gradient_boosting.learning_rate {
					boosting.learning_rate = learning_rate;
				}
				if let Some(max_depth) = gradient_boosting.max_depth {
					boosting.max_depth = max_depth;
				}
				if let Some(l2_regularization) = gradient_boosting.l2_regularization {
					boosting.l2_regularization = l2_regularization;
				}
			}
		}
	}

	/// Mask `capabilities` with the implementations this config disables.
	pub fn capabilities(&self, capabilities: Capabilities) -> Capabilities {
		let enabled = self
			.gradient_boosting
			.as_ref()
			.and_then(|gradient_boosting| gradient_boosting.enabled)
			.unwrap_or(true);
		Capabilities {
			gradient_boosting: capabilities.gradient_boosting && enabled,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_config() {
		let config: Config = serde_yaml::from_str(
			"seed: 7\ngradient_boosting:\n  enabled: false\n  max_rounds: 10\nrandom_forest:\n  n_trees: 20\n  min_examples_per_leaf: 2\n",
		)
		.unwrap();
		let mut options = TrainOptions::default();
		config.apply(&mut options);
		assert_eq!(options.seed, 7);
		assert!(options.parallel);
		assert_eq!(options.forest.n_trees, 20);
		assert_eq!(options.forest.min_examples_per_child, 2);
		assert_eq!(options.forest.max_depth, None);
		let capabilities = config.capabilities(Capabilities {
			gradient_boosting: true,
		});
		assert!(!capabilities.gradient_boosting);
		let empty = Config::default();
		assert!(
			empty
				.capabilities(Capabilities {
					gradient_boosting: true
				})
				.gradient_boosting
		);
	}
}

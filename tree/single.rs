use crate::{BranchNode, LeafNode, Node, Tree};
use ndarray::prelude::*;
use rand::Rng;
use std::cmp::Ordering;

/// These are the options that control the growth of a single tree.
#[derive(Clone, Debug)]
pub struct TreeOptions {
	/// If this is `None`, nodes are split until they are pure or no valid split remains.
	pub max_depth: Option<usize>,
	/// A split will only be considered valid if the number of training examples sent to each of the resulting children is at least this value.
	pub min_examples_per_child: usize,
	/// A split will only be considered valid if the sum of hessians in each of the resulting children is at least this value.
	pub min_sum_hessians_per_child: f32,
	/// A node will only be split if the best split achieves more than this gain.
	pub min_gain_to_split: f32,
	pub l2_regularization: f32,
	/// If this is `Some(n)`, only `n` randomly chosen features are considered at each node.
	pub max_features: Option<usize>,
}

impl Default for TreeOptions {
	fn default() -> Self {
		Self {
			max_depth: None,
			min_examples_per_child: 1,
			min_sum_hessians_per_child: 0.0,
			min_gain_to_split: 0.0,
			l2_regularization: 0.0,
			max_features: None,
		}
	}
}

/**
Train a single tree.

`features` has shape (n_examples, n_features). `gradients` has shape (n_examples, n_outputs) and `hessians` has shape (n_examples). `examples` lists the rows to train on and may contain repeats, which is how bootstrap samples are represented.

A node's score is the sum over outputs of G² / (H + λ), where G and H are the sums of the gradients and hessians of the examples in the node and λ is the L2 regularization. A split's gain is the score of its children minus the score of its parent, and each leaf outputs -G / (H + λ). With a gradient of the negated target and a hessian of 1, the gain is the reduction in squared error and each leaf outputs the mean target. With the negated one hot encoded class as the gradient, the gain is the reduction in Gini impurity and each leaf outputs the class distribution.
*/
pub fn train_tree<R: Rng>(
	features: ArrayView2<f32>,
	examples: Vec<usize>,
	gradients: ArrayView2<f32>,
	hessians: ArrayView1<f32>,
	options: &TreeOptions,
	rng: &mut R,
) -> Tree {
	let n_features = features.ncols();
	let n_outputs = gradients.ncols();
	let l2_regularization = options.l2_regularization as f64;
	let mut nodes: Vec<Node> = vec![placeholder()];
	let mut queue: Vec<QueueItem> = vec![QueueItem {
		node_index: 0,
		depth: 0,
		examples,
	}];
	while let Some(QueueItem {
		node_index,
		depth,
		examples,
	}) = queue.pop()
	{
		let stats = NodeStats::compute(&examples, gradients, hessians, n_outputs);
		let can_split = options.max_depth.map(|max| depth < max).unwrap_or(true)
			&& examples.len() >= 2 * options.min_examples_per_child.max(1)
			&& !is_pure(&examples, gradients);
		let split = if can_split {
			let feature_indexes = choose_features(n_features, options.max_features, rng);
			choose_best_split(
				features,
				&examples,
				gradients,
				hessians,
				&stats,
				&feature_indexes,
				options,
			)
		} else {
			None
		};
		match split {
			None => {
				nodes[node_index] = Node::Leaf(LeafNode {
					values: stats.leaf_values(l2_regularization),
				});
			}
			Some(split) => {
				let (left_examples, right_examples): (Vec<usize>, Vec<usize>) = examples
					.iter()
					.partition(|example_index| {
						features[(**example_index, split.feature_index)] <= split.split_value
					});
				let left_child_index = nodes.len();
				nodes.push(placeholder());
				let right_child_index = nodes.len();
				nodes.push(placeholder());
				nodes[node_index] = Node::Branch(BranchNode {
					left_child_index,
					right_child_index,
					feature_index: split.feature_index,
					split_value: split.split_value,
					gain: split.gain as f32,
				});
				queue.push(QueueItem {
					node_index: right_child_index,
					depth: depth + 1,
					examples: right_examples,
				});
				queue.push(QueueItem {
					node_index: left_child_index,
					depth: depth + 1,
					examples: left_examples,
				});
			}
		}
	}
	Tree { nodes }
}

struct QueueItem {
	node_index: usize,
	depth: usize,
	examples: Vec<usize>,
}

#[derive(Debug)]
struct Split {
	feature_index: usize,
	split_value: f32,
	gain: f64,
}

struct NodeStats {
	sum_gradients: Vec<f64>,
	sum_hessians: f64,
	count: usize,
}

impl NodeStats {
	fn compute(
		examples: &[usize],
		gradients: ArrayView2<f32>,
		hessians: ArrayView1<f32>,
		n_outputs: usize,
	) -> NodeStats {
		let mut stats = NodeStats {
			sum_gradients: vec![0.0; n_outputs],
			sum_hessians: 0.0,
			count: 0,
		};
		for example_index in examples {
			stats.add(*example_index, gradients, hessians);
		}
		stats
	}

	fn add(&mut self, example_index: usize, gradients: ArrayView2<f32>, hessians: ArrayView1<f32>) {
		for (sum, gradient) in self
			.sum_gradients
			.iter_mut()
			.zip(gradients.row(example_index))
		{
			*sum += *gradient as f64;
		}
		self.sum_hessians += hessians[example_index] as f64;
		self.count += 1;
	}

	fn score(&self, l2_regularization: f64) -> f64 {
		score(&self.sum_gradients, self.sum_hessians, l2_regularization)
	}

	fn leaf_values(&self, l2_regularization: f64) -> Vec<f32> {
		let denominator = self.sum_hessians + l2_regularization;
		self.sum_gradients
			.iter()
			.map(|sum_gradients| {
				if denominator > 0.0 {
					(-sum_gradients / denominator) as f32
				} else {
					0.0
				}
			})
			.collect()
	}
}

fn score(sum_gradients: &[f64], sum_hessians: f64, l2_regularization: f64) -> f64 {
	let denominator = sum_hessians + l2_regularization;
	if denominator <= 0.0 {
		return 0.0;
	}
	sum_gradients.iter().map(|g| g * g).sum::<f64>() / denominator
}

fn placeholder() -> Node {
	Node::Leaf(LeafNode {
		values: Vec::new(),
	})
}

/// A node is pure when every example in it has the same gradients, so no split can reduce its loss.
fn is_pure(examples: &[usize], gradients: ArrayView2<f32>) -> bool {
	match examples.first() {
		None => true,
		Some(first) => {
			let first = gradients.row(*first);
			examples
				.iter()
				.all(|example_index| gradients.row(*example_index) == first)
		}
	}
}

/// Choose the features to consider at a node, in increasing order of feature index.
fn choose_features<R: Rng>(n_features: usize, max_features: Option<usize>, rng: &mut R) -> Vec<usize> {
	match max_features {
		Some(max_features) if max_features < n_features => {
			let mut feature_indexes =
				rand::seq::index::sample(rng, n_features, max_features.max(1)).into_vec();
			feature_indexes.sort_unstable();
			feature_indexes
		}
		_ => (0..n_features).collect(),
	}
}

/// Sort number values ascending with missing values last.
fn compare_values(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(true, true) => Ordering::Equal,
	}
}

/// Find the split with the highest gain over the given features. Thresholds lie halfway between consecutive distinct values. Examples with a missing value always go right. Ties are broken in favor of the earlier feature and the lower threshold.
fn choose_best_split(
	features: ArrayView2<f32>,
	examples: &[usize],
	gradients: ArrayView2<f32>,
	hessians: ArrayView1<f32>,
	stats: &NodeStats,
	feature_indexes: &[usize],
	options: &TreeOptions,
) -> Option<Split> {
	let l2_regularization = options.l2_regularization as f64;
	let min_examples_per_child = options.min_examples_per_child.max(1);
	let min_sum_hessians_per_child = options.min_sum_hessians_per_child as f64;
	let parent_score = stats.score(l2_regularization);
	let n_outputs = stats.sum_gradients.len();
	let mut best: Option<Split> = None;
	let mut sorted: Vec<(f32, usize)> = Vec::with_capacity(examples.len());
	let mut right_gradients = vec![0.0; n_outputs];
	for feature_index in feature_indexes.iter().cloned() {
		sorted.clear();
		sorted.extend(
			examples
				.iter()
				.map(|example_index| (features[(*example_index, feature_index)], *example_index)),
		);
		sorted.sort_by(|a, b| compare_values(a.0, b.0));
		let n_valid = sorted.iter().take_while(|(value, _)| !value.is_nan()).count();
		let mut left = NodeStats {
			sum_gradients: vec![0.0; n_outputs],
			sum_hessians: 0.0,
			count: 0,
		};
		for position in 0..n_valid.saturating_sub(1) {
			let (value, example_index) = sorted[position];
			left.add(example_index, gradients, hessians);
			let next_value = sorted[position + 1].0;
			if value == next_value {
				continue;
			}
			let right_count = stats.count - left.count;
			if left.count < min_examples_per_child || right_count < min_examples_per_child {
				continue;
			}
			let right_hessians = stats.sum_hessians - left.sum_hessians;
			if left.sum_hessians < min_sum_hessians_per_child
				|| right_hessians < min_sum_hessians_per_child
			{
				continue;
			}
			for (right_sum, (total_sum, left_sum)) in right_gradients
				.iter_mut()
				.zip(stats.sum_gradients.iter().zip(left.sum_gradients.iter()))
			{
				*right_sum = total_sum - left_sum;
			}
			let gain = left.score(l2_regularization)
				+ score(&right_gradients, right_hessians, l2_regularization)
				- parent_score;
			if gain <= options.min_gain_to_split as f64 {
				continue;
			}
			if best.as_ref().map(|best| gain > best.gain).unwrap_or(true) {
				let mut split_value = value + (next_value - value) / 2.0;
				// Adjacent floats may round the midpoint up to the next value, which would send it left.
				if split_value >= next_value {
					split_value = value;
				}
				best = Some(Split {
					feature_index,
					split_value,
					gain,
				});
			}
		}
	}
	best
}

#[cfg(test)]
mod test {
	use super::*;
	use rand::SeedableRng;
	use rand_xoshiro::Xoshiro256Plus;

	fn regression_inputs(labels: &[f32]) -> (Array2<f32>, Array1<f32>) {
		let gradients = Array::from_shape_fn((labels.len(), 1), |(i, _)| -labels[i]);
		let hessians = Array::ones(labels.len());
		(gradients, hessians)
	}

	#[test]
	fn test_split_at_midpoint() {
		let features = arr2(&[[1.0], [2.0], [3.0], [4.0]]);
		let labels = [1.0, 1.0, 5.0, 5.0];
		let (gradients, hessians) = regression_inputs(&labels);
		let mut rng = Xoshiro256Plus::seed_from_u64(0);
		let tree = train_tree(
			features.view(),
			(0..4).collect(),
			gradients.view(),
			hessians.view(),
			&TreeOptions::default(),
			&mut rng,
		);
		let root = tree.nodes[0].as_branch().unwrap();
		assert_eq!(root.feature_index, 0);
		assert_eq!(root.split_value, 2.5);
		assert!((root.gain - 16.0).abs() < 1e-4);
		assert_eq!(tree.predict(&[2.0]), &[1.0]);
		assert_eq!(tree.predict(&[3.0]), &[5.0]);
		assert_eq!(tree.n_leaves(), 2);
	}

	#[test]
	fn test_missing_values_go_right() {
		let features = arr2(&[[1.0], [2.0], [std::f32::NAN], [std::f32::NAN]]);
		let labels = [0.0, 10.0, 10.0, 10.0];
		let (gradients, hessians) = regression_inputs(&labels);
		let mut rng = Xoshiro256Plus::seed_from_u64(0);
		let tree = train_tree(
			features.view(),
			(0..4).collect(),
			gradients.view(),
			hessians.view(),
			&TreeOptions::default(),
			&mut rng,
		);
		let root = tree.nodes[0].as_branch().unwrap();
		assert_eq!(root.split_value, 1.5);
		assert_eq!(tree.predict(&[1.0]), &[0.0]);
		assert_eq!(tree.predict(&[2.0]), &[10.0]);
		assert_eq!(tree.predict(&[std::f32::NAN]), &[10.0]);
	}

	#[test]
	fn test_max_depth_and_pure_nodes() {
		let features = arr2(&[[1.0], [2.0], [3.0], [4.0]]);
		let labels = [1.0, 2.0, 3.0, 4.0];
		let (gradients, hessians) = regression_inputs(&labels);
		let mut rng = Xoshiro256Plus::seed_from_u64(0);
		let stump = train_tree(
			features.view(),
			(0..4).collect(),
			gradients.view(),
			hessians.view(),
			&TreeOptions {
				max_depth: Some(1),
				..Default::default()
			},
			&mut rng,
		);
		assert_eq!(stump.n_leaves(), 2);
		let full = train_tree(
			features.view(),
			(0..4).collect(),
			gradients.view(),
			hessians.view(),
			&TreeOptions::default(),
			&mut rng,
		);
		assert_eq!(full.n_leaves(), 4);
		let constant = train_tree(
			features.view(),
			(0..4).collect(),
			regression_inputs(&[2.0; 4]).0.view(),
			hessians.view(),
			&TreeOptions::default(),
			&mut rng,
		);
		assert_eq!(constant.nodes.len(), 1);
		assert_eq!(constant.predict(&[0.0]), &[2.0]);
	}

	#[test]
	fn test_class_distribution_leaves() {
		// Negated one hot gradients with unit hessians make each leaf the class distribution.
		let features = arr2(&[[0.0], [0.0], [1.0], [1.0]]);
		let gradients = arr2(&[[-1.0, 0.0], [0.0, -1.0], [0.0, -1.0], [0.0, -1.0]]);
		let hessians = Array::ones(4);
		let mut rng = Xoshiro256Plus::seed_from_u64(0);
		let tree = train_tree(
			features.view(),
			(0..4).collect(),
			gradients.view(),
			hessians.view(),
			&TreeOptions::default(),
			&mut rng,
		);
		assert_eq!(tree.predict(&[0.0]), &[0.5, 0.5]);
		assert_eq!(tree.predict(&[1.0]), &[0.0, 1.0]);
	}

	#[test]
	fn test_repeated_examples_are_weighted() {
		let features = arr2(&[[0.0], [1.0]]);
		let labels = [0.0, 3.0];
		let (gradients, hessians) = regression_inputs(&labels);
		let mut rng = Xoshiro256Plus::seed_from_u64(0);
		let tree = train_tree(
			features.view(),
			vec![0, 1, 1],
			gradients.view(),
			hessians.view(),
			&TreeOptions {
				max_depth: Some(0),
				..Default::default()
			},
			&mut rng,
		);
		assert_eq!(tree.predict(&[0.0]), &[2.0]);
	}
}

/*!
This crate implements machine learning models for regression and classification using decision trees. It provides a random forest, which averages many deep trees trained on bootstrap samples of the training data, and, with the `gbt` feature enabled, a gradient boosted tree ensemble similar to [XGBoost](github.com/dmlc/xgboost).

Both ensembles are built from the same single tree learner in `single.rs`, which grows a tree from per-example gradients and hessians. Squared error and Gini impurity fall out of that formulation as special cases, which is how the random forest uses it.
*/

#![allow(clippy::tabs_in_doc_comments)]

#[cfg(feature = "gbt")]
mod binary_classifier;
mod feature_importances;
mod forest;
#[cfg(feature = "gbt")]
mod multiclass_classifier;
#[cfg(feature = "gbt")]
mod regressor;
mod single;
#[cfg(feature = "gbt")]
mod train;

#[cfg(feature = "gbt")]
pub use self::binary_classifier::BinaryClassifier;
pub use self::forest::{ForestClassifier, ForestOptions, ForestRegressor, MaxFeatures};
#[cfg(feature = "gbt")]
pub use self::multiclass_classifier::MulticlassClassifier;
#[cfg(feature = "gbt")]
pub use self::regressor::Regressor;
pub use self::single::{train_tree, TreeOptions};

use tabml_util::progress_counter::ProgressCounter;

/// These are the options passed to `Regressor::train`, `BinaryClassifier::train`, and `MulticlassClassifier::train`.
#[cfg(feature = "gbt")]
#[derive(Clone, Debug)]
pub struct BoostingOptions {
	/// This option sets the L2 regularization value, which helps avoid overfitting.
	pub l2_regularization: f32,
	/// The learning rate scales the leaf values to control the effect each tree has on the output.
	pub learning_rate: f32,
	/// The depth of a single tree will never exceed this value.
	pub max_depth: usize,
	/// This is the number of rounds of training that will occur.
	pub max_rounds: usize,
	/// A split will only be considered valid if the number of training examples sent to each of the resulting children is at least this value.
	pub min_examples_per_child: usize,
	/// A node will only be split if the best split achieves more than this gain.
	pub min_gain_to_split: f32,
	/// A split will only be considered valid if the sum of hessians in each of the resulting children is at least this value.
	pub min_sum_hessians_per_child: f32,
	pub seed: u64,
}

#[cfg(feature = "gbt")]
impl Default for BoostingOptions {
	fn default() -> Self {
		Self {
			l2_regularization: 1.0,
			learning_rate: 0.3,
			max_depth: 6,
			max_rounds: 100,
			min_examples_per_child: 1,
			min_gain_to_split: 0.0,
			min_sum_hessians_per_child: 1.0,
			seed: 42,
		}
	}
}

/// This struct reports the training progress.
#[derive(Debug)]
pub enum TrainProgress {
	/// The counter counts trees for a random forest and rounds for a boosted ensemble.
	Training(ProgressCounter),
}

/// Trees are stored as a `Vec` of `Node`s. Each branch in the tree has two indexes into the `Vec`, one for each of its children. The root is at index 0.
#[derive(Clone, Debug)]
pub struct Tree {
	pub nodes: Vec<Node>,
}

impl Tree {
	/// Make a prediction for a given example. The returned slice has one value per tree output.
	pub fn predict(&self, features: &[f32]) -> &[f32] {
		// Start at the root node.
		let mut node_index = 0;
		// Traverse the tree until we get to a leaf.
		loop {
			match &self.nodes[node_index] {
				Node::Branch(BranchNode {
					left_child_index,
					right_child_index,
					feature_index,
					split_value,
					..
				}) => {
					// Missing values compare false and are always sent right.
					node_index = if features[*feature_index] <= *split_value {
						*left_child_index
					} else {
						*right_child_index
					};
				}
				// We made it to a leaf! The prediction is the leaf's values.
				Node::Leaf(LeafNode { values, .. }) => return values,
			}
		}
	}

	/// Multiply every leaf value by `factor`.
	pub fn scale(&mut self, factor: f32) {
		for node in self.nodes.iter_mut() {
			if let Node::Leaf(leaf) = node {
				for value in leaf.values.iter_mut() {
					*value *= factor;
				}
			}
		}
	}

	pub fn n_leaves(&self) -> usize {
		self.nodes.iter().filter(|node| node.as_leaf().is_some()).count()
	}
}

/// A node is either a branch or a leaf.
#[derive(Clone, Debug)]
pub enum Node {
	Branch(BranchNode),
	Leaf(LeafNode),
}

impl Node {
	pub fn as_branch(&self) -> Option<&BranchNode> {
		match self {
			Self::Branch(branch) => Some(branch),
			_ => None,
		}
	}

	pub fn as_leaf(&self) -> Option<&LeafNode> {
		match self {
			Self::Leaf(leaf) => Some(leaf),
			_ => None,
		}
	}
}

/// A `BranchNode` is a branch in a tree. It takes the value of a single number feature and compares it with `split_value`. If the value is <= `split_value` the example is sent left, otherwise it is sent right.
#[derive(Clone, Debug)]
pub struct BranchNode {
	/// This is the index in the tree's node vector for this node's left child.
	pub left_child_index: usize,
	/// This is the index in the tree's node vector for this node's right child.
	pub right_child_index: usize,
	/// This is the index of the feature to get the value for.
	pub feature_index: usize,
	/// This is the threshold value of the split.
	pub split_value: f32,
	/// The reduction in loss achieved by this split. It is summed per feature to compute feature importances.
	pub gain: f32,
}

/// The leaves in a tree hold the values to output for examples that get sent to them.
#[derive(Clone, Debug)]
pub struct LeafNode {
	/// These are the values to output, one per tree output.
	pub values: Vec<f32>,
}

/// Return the index of the largest value. Ties go to the lowest index.
pub fn argmax(values: &[f32]) -> usize {
	let mut best = 0;
	for (index, value) in values.iter().enumerate() {
		if *value > values[best] {
			best = index;
		}
	}
	best
}

#[test]
fn test_predict() {
	let tree = Tree {
		nodes: vec![
			Node::Branch(BranchNode {
				left_child_index: 1,
				right_child_index: 2,
				feature_index: 1,
				split_value: 2.5,
				gain: 1.0,
			}),
			Node::Leaf(LeafNode { values: vec![-1.0] }),
			Node::Leaf(LeafNode { values: vec![1.0] }),
		],
	};
	assert_eq!(tree.predict(&[0.0, 2.5]), &[-1.0]);
	assert_eq!(tree.predict(&[0.0, 3.0]), &[1.0]);
	assert_eq!(tree.predict(&[0.0, std::f32::NAN]), &[1.0]);
	assert_eq!(tree.n_leaves(), 2);
}

#[test]
fn test_argmax_prefers_lowest_index() {
	assert_eq!(argmax(&[0.25, 0.5, 0.5]), 1);
	assert_eq!(argmax(&[0.0]), 0);
}

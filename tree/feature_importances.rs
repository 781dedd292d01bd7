use crate::{Node, Tree};

/// This function computes feature importances using the "gain" method, where a feature's importance is proportional to the total gain of the branch nodes that split on it. The importances sum to 1, unless no tree has a branch, in which case they are all 0.
pub fn compute_feature_importances(trees: &[Tree], n_features: usize) -> Vec<f32> {
	let mut feature_importances = vec![0.0; n_features];
	for tree in trees.iter() {
		accumulate_gains(tree, &mut feature_importances);
	}
	normalize(&mut feature_importances);
	feature_importances.into_iter().map(|v| v as f32).collect()
}

/// This function computes feature importances for an ensemble of independently trained trees. Each tree's gains are normalized before they are combined, so every tree that splits carries equal weight.
pub fn compute_averaged_feature_importances(trees: &[Tree], n_features: usize) -> Vec<f32> {
	let mut feature_importances = vec![0.0; n_features];
	let mut tree_importances = vec![0.0; n_features];
	for tree in trees.iter() {
		tree_importances.iter_mut().for_each(|v| *v = 0.0);
		accumulate_gains(tree, &mut tree_importances);
		normalize(&mut tree_importances);
		for (total, value) in feature_importances.iter_mut().zip(tree_importances.iter()) {
			*total += value;
		}
	}
	normalize(&mut feature_importances);
	feature_importances.into_iter().map(|v| v as f32).collect()
}

fn accumulate_gains(tree: &Tree, feature_importances: &mut [f64]) {
	for node in tree.nodes.iter() {
		if let Node::Branch(branch) = node {
			feature_importances[branch.feature_index] += branch.gain.max(0.0) as f64;
		}
	}
}

fn normalize(feature_importances: &mut [f64]) {
	let total: f64 = feature_importances.iter().sum();
	if total > 0.0 {
		for feature_importance in feature_importances.iter_mut() {
			*feature_importance /= total;
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{BranchNode, LeafNode};

	fn stump(feature_index: usize, gain: f32) -> Tree {
		let leaf = || Node::Leaf(LeafNode { values: vec![0.0] });
		Tree {
			nodes: vec![
				Node::Branch(BranchNode {
					left_child_index: 1,
					right_child_index: 2,
					feature_index,
					split_value: 0.0,
					gain,
				}),
				leaf(),
				leaf(),
			],
		}
	}

	#[test]
	fn test_feature_importances() {
		let trees = vec![stump(0, 3.0), stump(2, 1.0)];
		assert_eq!(compute_feature_importances(&trees, 3), vec![0.75, 0.0, 0.25]);
		assert_eq!(
			compute_averaged_feature_importances(&trees, 3),
			vec![0.5, 0.0, 0.5]
		);
	}

	#[test]
	fn test_no_splits() {
		let trees = vec![Tree {
			nodes: vec![Node::Leaf(LeafNode { values: vec![1.0] })],
		}];
		assert_eq!(compute_feature_importances(&trees, 2), vec![0.0, 0.0]);
		assert_eq!(compute_averaged_feature_importances(&trees, 2), vec![0.0, 0.0]);
	}
}

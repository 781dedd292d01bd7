use super::StreamingMetric;
use ndarray::prelude::*;
use num_traits::ToPrimitive;

/// `ClassificationMetrics` accumulates a confusion matrix from predicted and actual class indexes and computes accuracy along with support-weighted precision, recall, and f1 score.
pub struct ClassificationMetrics {
	/// The shape of the confusion matrix is (n_classes x n_classes).
	confusion_matrix: Array2<u64>,
}

pub struct ClassificationMetricsInput<'a> {
	/// (n_examples), 0-indexed
	pub predictions: &'a [usize],
	/// (n_examples), 0-indexed
	pub labels: &'a [usize],
}

#[derive(Debug)]
pub struct ClassificationMetricsOutput {
	pub class_metrics: Vec<ClassMetrics>,
	pub accuracy: f32,
	pub precision_weighted: f32,
	pub recall_weighted: f32,
	pub f1_weighted: f32,
}

/// Per-class metrics. A class that was never predicted has precision 0, a class that never appears in the labels has recall 0, and a class whose precision and recall are both 0 has f1 score 0.
#[derive(Debug)]
pub struct ClassMetrics {
	pub true_positives: u64,
	pub false_positives: u64,
	pub true_negatives: u64,
	pub false_negatives: u64,
	/// The number of examples whose label is this class.
	pub support: u64,
	pub precision: f32,
	pub recall: f32,
	pub f1_score: f32,
}

impl ClassificationMetrics {
	pub fn new(n_classes: usize) -> Self {
		//                                           prediction    label
		//                                               |           |
		//                                               v           v
		let confusion_matrix = <Array2<u64>>::zeros((n_classes, n_classes));
		Self { confusion_matrix }
	}
}

impl<'a> StreamingMetric<'a> for ClassificationMetrics {
	type Input = ClassificationMetricsInput<'a>;
	type Output = ClassificationMetricsOutput;

	fn update(&mut self, value: ClassificationMetricsInput) {
		for (prediction, label) in value.predictions.iter().zip(value.labels.iter()) {
			self.confusion_matrix[(*prediction, *label)] += 1;
		}
	}

	fn merge(&mut self, other: Self) {
		self.confusion_matrix += &other.confusion_matrix;
	}

	fn finalize(self) -> ClassificationMetricsOutput {
		let n_classes = self.confusion_matrix.nrows();
		let n_examples = self.confusion_matrix.sum();
		let confusion_matrix = self.confusion_matrix;
		let class_metrics: Vec<_> = (0..n_classes)
			.map(|class_index| {
				let true_positives = confusion_matrix[(class_index, class_index)];
				let false_positives = confusion_matrix.row(class_index).sum() - true_positives;
				let support = confusion_matrix.column(class_index).sum();
				let false_negatives = support - true_positives;
				let true_negatives =
					n_examples - true_positives - false_positives - false_negatives;
				let precision = ratio(true_positives, true_positives + false_positives);
				let recall = ratio(true_positives, support);
				let f1_score = if precision + recall > 0.0 {
					2.0 * (precision * recall) / (precision + recall)
				} else {
					0.0
				};
				ClassMetrics {
					true_positives,
					false_positives,
					true_negatives,
					false_negatives,
					support,
					precision,
					recall,
					f1_score,
				}
			})
			.collect();
		let n_correct: u64 = confusion_matrix.diag().sum();
		let accuracy = ratio(n_correct, n_examples);
		let weighted = |value: fn(&ClassMetrics) -> f32| {
			if n_examples == 0 {
				return 0.0;
			}
			class_metrics
				.iter()
				.map(|class| value(class) * class.support.to_f32().unwrap())
				.sum::<f32>()
				/ n_examples.to_f32().unwrap()
		};
		let precision_weighted = weighted(|class: &ClassMetrics| class.precision);
		let recall_weighted = weighted(|class: &ClassMetrics| class.recall);
		let f1_weighted = weighted(|class: &ClassMetrics| class.f1_score);
		ClassificationMetricsOutput {
			accuracy,
			class_metrics,
			precision_weighted,
			recall_weighted,
			f1_weighted,
		}
	}
}

fn ratio(numerator: u64, denominator: u64) -> f32 {
	if denominator == 0 {
		0.0
	} else {
		numerator.to_f32().unwrap() / denominator.to_f32().unwrap()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn summary(metrics: &ClassificationMetricsOutput) -> String {
		format!(
			"accuracy={:.4} precision={:.4} recall={:.4} f1={:.4}",
			metrics.accuracy, metrics.precision_weighted, metrics.recall_weighted, metrics.f1_weighted
		)
	}

	#[test]
	fn test_multiclass() {
		// example taken from https://en.wikipedia.org/wiki/Confusion_matrix
		let labels = [
			0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 1, 1, 1, 2, 2, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
		];
		let predictions = [
			0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
		];
		let mut metrics = ClassificationMetrics::new(3);
		metrics.update(ClassificationMetricsInput {
			predictions: &predictions,
			labels: &labels,
		});
		let metrics = metrics.finalize();
		let counts: Vec<(u64, u64, u64, u64)> = metrics
			.class_metrics
			.iter()
			.map(|c| {
				(
					c.true_positives,
					c.false_positives,
					c.false_negatives,
					c.support,
				)
			})
			.collect();
		assert_eq!(counts, vec![(5, 2, 3, 8), (3, 5, 3, 6), (11, 1, 2, 13)]);
		insta::assert_snapshot!(summary(&metrics), @"accuracy=0.7037 precision=0.7363 recall=0.7037 f1=0.7165");
	}

	#[test]
	fn test_class_missing_from_predictions_contributes_zero() {
		let mut metrics = ClassificationMetrics::new(3);
		metrics.update(ClassificationMetricsInput {
			predictions: &[0, 0, 0, 1],
			labels: &[0, 0, 2, 1],
		});
		let metrics = metrics.finalize();
		let class_2 = &metrics.class_metrics[2];
		assert_eq!(class_2.precision, 0.0);
		assert_eq!(class_2.f1_score, 0.0);
		assert!(metrics.precision_weighted.is_finite());
		insta::assert_snapshot!(summary(&metrics), @"accuracy=0.7500 precision=0.5833 recall=0.7500 f1=0.6500");
	}

	#[test]
	fn test_class_missing_from_labels_has_no_weight() {
		let mut metrics = ClassificationMetrics::new(3);
		metrics.update(ClassificationMetricsInput {
			predictions: &[0, 2, 1, 1],
			labels: &[0, 0, 1, 1],
		});
		let metrics = metrics.finalize();
		let class_2 = &metrics.class_metrics[2];
		assert_eq!(class_2.support, 0);
		assert_eq!(class_2.false_positives, 1);
		assert_eq!(class_2.precision, 0.0);
		for value in &[
			metrics.precision_weighted,
			metrics.recall_weighted,
			metrics.f1_weighted,
		] {
			assert!((0.0f32..=1.0).contains(value));
		}
		insta::assert_snapshot!(summary(&metrics), @"accuracy=0.7500 precision=1.0000 recall=0.7500 f1=0.8333");
	}
}

use super::StreamingMetric;
use num_traits::ToPrimitive;

/// `RegressionMetrics` computes the error of a regressor's predictions, along with R², which compares that error to the variance of the labels.
#[derive(Default)]
pub struct RegressionMetrics {
	mean_variance: Option<MeanVariance>,
	absolute_error: f64,
	squared_error: f64,
}

#[derive(Debug)]
struct MeanVariance {
	n: u64,
	m2: f64,
	mean: f64,
}

pub struct RegressionMetricsInput<'a> {
	pub predictions: &'a [f32],
	pub labels: &'a [f32],
}

#[derive(Debug)]
pub struct RegressionMetricsOutput {
	pub mse: f32,
	pub rmse: f32,
	pub mae: f32,
	pub r2: f32,
}

impl RegressionMetrics {
	pub fn new() -> Self {
		Self::default()
	}
}

impl<'a> StreamingMetric<'a> for RegressionMetrics {
	type Input = RegressionMetricsInput<'a>;
	type Output = RegressionMetricsOutput;

	fn update(&mut self, input: RegressionMetricsInput) {
		let RegressionMetricsInput {
			predictions,
			labels,
		} = input;
		for (prediction, label) in predictions.iter().zip(labels.iter()) {
			let label = *label as f64;
			match &mut self.mean_variance {
				Some(mean_variance) => {
					let (mean, m2) = merge_mean_m2(
						mean_variance.n,
						mean_variance.mean,
						mean_variance.m2,
						1,
						label,
						0.0,
					);
					mean_variance.n += 1;
					mean_variance.mean = mean;
					mean_variance.m2 = m2;
				}
				None => {
					self.mean_variance = Some(MeanVariance {
						n: 1,
						mean: label,
						m2: 0.0,
					})
				}
			}
			let error = *prediction as f64 - label;
			self.absolute_error += error.abs();
			self.squared_error += error * error;
		}
	}

	fn merge(&mut self, other: Self) {
		match &mut self.mean_variance {
			Some(mean_variance) => {
				if let Some(other) = other.mean_variance {
					let (mean, m2) = merge_mean_m2(
						mean_variance.n,
						mean_variance.mean,
						mean_variance.m2,
						other.n,
						other.mean,
						other.m2,
					);
					mean_variance.mean = mean;
					mean_variance.m2 = m2;
					mean_variance.n += other.n;
				}
			}
			None => {
				self.mean_variance = other.mean_variance;
			}
		}
		self.absolute_error += other.absolute_error;
		self.squared_error += other.squared_error;
	}

	fn finalize(self) -> Self::Output {
		let (n, m2) = match self.mean_variance {
			Some(m) => (m.n.to_f64().unwrap(), m.m2),
			None => (0.0, 0.0),
		};
		let mae = self.absolute_error / n;
		let mse = self.squared_error / n;
		let rmse = mse.sqrt();
		// m2 is the total sum of squares of the labels. When the labels are constant, R² is 1 for a perfect fit and 0 otherwise.
		let r2 = if m2 > 0.0 {
			1.0 - self.squared_error / m2
		} else if self.squared_error == 0.0 {
			1.0
		} else {
			0.0
		};
		RegressionMetricsOutput {
			mae: mae as f32,
			mse: mse as f32,
			r2: r2 as f32,
			rmse: rmse as f32,
		}
	}
}

/// Combine two separately computed means and sums of squared deviations into one. See <https://en.wikipedia.org/wiki/Algorithms_for_calculating_variance#Parallel_algorithm>.
fn merge_mean_m2(n_a: u64, mean_a: f64, m2_a: f64, n_b: u64, mean_b: f64, m2_b: f64) -> (f64, f64) {
	let n_a = n_a.to_f64().unwrap();
	let n_b = n_b.to_f64().unwrap();
	(
		(((n_a * mean_a) + (n_b * mean_b)) / (n_a + n_b)),
		m2_a + m2_b + (mean_b - mean_a) * (mean_b - mean_a) * (n_a * n_b / (n_a + n_b)),
	)
}

/*!
This crate defines the [`StreamingMetric`](trait.StreamingMetric.html) trait and a number of concrete types that implement it such as [`MeanSquaredError`](struct.MeanSquaredError.html), [`RegressionMetrics`](struct.RegressionMetrics.html) and [`ClassificationMetrics`](struct.ClassificationMetrics.html).
*/

#![allow(clippy::tabs_in_doc_comments)]

mod accuracy;
mod classification;
mod mean;
mod mean_squared_error;
mod regression;

pub use self::accuracy::Accuracy;
pub use self::classification::{
	ClassMetrics, ClassificationMetrics, ClassificationMetricsInput, ClassificationMetricsOutput,
};
pub use self::mean::Mean;
pub use self::mean_squared_error::MeanSquaredError;
pub use self::regression::{RegressionMetrics, RegressionMetricsInput, RegressionMetricsOutput};

/**
A `StreamingMetric` is computed one input at a time. Call `update()` with each `Input`, `merge()` to combine metrics computed on separate chunks of the data, for example on separate threads, and `finalize()` to produce the `Output`.

```
use tabml_metrics::{MeanSquaredError, StreamingMetric};

let mut left = MeanSquaredError::new();
left.update((1.0, 2.0));
let mut right = MeanSquaredError::new();
right.update((3.0, 3.0));
left.merge(right);
assert_eq!(left.finalize(), Some(0.5));
```

The lifetime `'a` lets an `Input` borrow, as `RegressionMetricsInput` borrows its slices.
*/
pub trait StreamingMetric<'a> {
	/// `Input` is the type to aggregate in calls to `update()`.
	type Input;
	/// `Output` is the return type of `finalize()`.
	type Output;
	/// Update this streaming metric with the `Input` `input`.
	fn update(&mut self, input: Self::Input);
	/// Merge multiple independently computed streaming metrics.
	fn merge(&mut self, other: Self);
	/// When you are done aggregating `Input`s, call `finalize()` to produce an `Output`.
	fn finalize(self) -> Self::Output;
}

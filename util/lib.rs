/*!
This crate contains small utilities shared by the other tabml crates.
*/

#![allow(clippy::tabs_in_doc_comments)]

pub mod finite;
pub mod progress_counter;
pub mod table;

#[doc(hidden)]
pub use itertools;

/// Zip any number of iterables together into a single iterator of tuples.
#[macro_export]
macro_rules! zip {
	($($e:expr),* $(,)*) => {
		$crate::itertools::izip!($($e),*)
	};
}

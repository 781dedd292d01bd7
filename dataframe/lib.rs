/*!
This crate provides the tabular dataset consumed by the training engine. A `DataFrame` is an ordered collection of named columns of equal length, where each column holds either numbers or string-like categorical values, like a spreadsheet.
*/

#![allow(clippy::tabs_in_doc_comments)]

use fnv::FnvHashSet;

mod load;

pub use self::load::{FromCsvOptions, LoadError, DEFAULT_INVALID_VALUES};

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
	Number(NumberColumn),
	Enum(EnumColumn),
}

/// A column of numbers. Missing values are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
	pub name: String,
	pub data: Vec<f32>,
}

/// A column of string-like categorical values. Values are stored as they appeared in the source, and are only assigned integer codes when a dataset is prepared for training.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumn {
	pub name: String,
	pub data: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
	Number,
	Enum,
}

impl DataFrame {
	pub fn new(columns: Vec<Column>) -> Self {
		Self { columns }
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|column| column.name()).collect()
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|column| column.name() == name)
	}

	/// Replace every column name with [`normalize_column_name`](fn.normalize_column_name.html) applied to it.
	pub fn normalize_column_names(&mut self) {
		for column in self.columns.iter_mut() {
			let name = normalize_column_name(column.name());
			*column.name_mut() = name;
		}
	}
}

/// Trim surrounding whitespace, lowercase, and replace spaces with underscores, so that `" Sale Price"` becomes `"sale_price"`.
pub fn normalize_column_name(name: &str) -> String {
	name.trim().to_lowercase().replace(' ', "_")
}

impl Column {
	pub fn len(&self) -> usize {
		match self {
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			Self::Number(s) => s.data.is_empty(),
			Self::Enum(s) => s.data.is_empty(),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Number(s) => s.name.as_str(),
			Self::Enum(s) => s.name.as_str(),
		}
	}

	fn name_mut(&mut self) -> &mut String {
		match self {
			Self::Number(s) => &mut s.name,
			Self::Enum(s) => &mut s.name,
		}
	}

	/// Count the distinct values in this column. Missing numbers (NaN) are not counted, and `-0.0` and `0.0` are the same value.
	pub fn n_unique(&self) -> usize {
		match self {
			Self::Number(column) => column
				.data
				.iter()
				.filter(|value| !value.is_nan())
				.map(|value| if *value == 0.0 { 0u32 } else { value.to_bits() })
				.collect::<FnvHashSet<u32>>()
				.len(),
			Self::Enum(column) => column
				.data
				.iter()
				.map(|value| value.as_str())
				.collect::<FnvHashSet<&str>>()
				.len(),
		}
	}
}

impl NumberColumn {
	pub fn new(name: String, data: Vec<f32>) -> Self {
		Self { name, data }
	}
}

impl EnumColumn {
	pub fn new(name: String, data: Vec<String>) -> Self {
		Self { name, data }
	}
}

impl From<NumberColumn> for Column {
	fn from(column: NumberColumn) -> Self {
		Column::Number(column)
	}
}

impl From<EnumColumn> for Column {
	fn from(column: EnumColumn) -> Self {
		Column::Enum(column)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn dataframe() -> DataFrame {
		DataFrame::new(vec![
			NumberColumn::new(" Sale Price".to_owned(), vec![1.0, 2.0, 2.0, f32::NAN, -0.0, 0.0]).into(),
			EnumColumn::new(
				"Color".to_owned(),
				vec!["red", "blue", "red", "green", "red", "blue"]
					.into_iter()
					.map(String::from)
					.collect(),
			)
			.into(),
		])
	}

	#[test]
	fn test_shape() {
		let dataframe = dataframe();
		assert_eq!(dataframe.nrows(), 6);
		assert_eq!(DataFrame::new(Vec::new()).nrows(), 0);
	}

	#[test]
	fn test_n_unique() {
		let dataframe = dataframe();
		assert_eq!(dataframe.columns[0].n_unique(), 3);
		assert_eq!(dataframe.columns[1].n_unique(), 3);
	}

	#[test]
	fn test_normalize_column_names() {
		let mut dataframe = dataframe();
		dataframe.normalize_column_names();
		assert_eq!(dataframe.column_names(), vec!["sale_price", "color"]);
		assert!(dataframe.column("color").is_some());
		assert!(dataframe.column("Color").is_none());
		assert_eq!(normalize_column_name("  Year Built "), "year_built");
	}
}

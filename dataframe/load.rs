use super::*;
use std::{collections::BTreeMap, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
	#[error("failed to read csv")]
	Csv(#[from] csv::Error),
	#[error("row {row} has {found} values, expected {expected}")]
	RaggedRow {
		row: usize,
		found: usize,
		expected: usize,
	},
}

#[derive(Clone)]
pub struct FromCsvOptions<'a> {
	/// Column types to use instead of inferring them. Columns not listed here are inferred.
	pub column_types: Option<BTreeMap<String, ColumnType>>,
	/// Values that are treated as missing when inferring column types and parsing numbers.
	pub invalid_values: &'a [&'a str],
}

impl<'a> Default for FromCsvOptions<'a> {
	fn default() -> Self {
		Self {
			column_types: None,
			invalid_values: DEFAULT_INVALID_VALUES,
		}
	}
}

/// These values are the default values that are considered invalid.
pub const DEFAULT_INVALID_VALUES: &[&str] = &[
	"", "null", "NULL", "NA", "n/a", "N/A", "nan", "-nan", "NaN", "-NaN", "?",
];

impl DataFrame {
	pub fn from_path(path: &Path, options: FromCsvOptions) -> Result<Self, LoadError> {
		Self::from_csv(&mut csv::Reader::from_path(path)?, options)
	}

	/// Load a dataframe from a csv reader. A column is a number column if every value that is not invalid parses as a finite number. Otherwise it is an enum column and its values are kept as they appear in the csv.
	pub fn from_csv<R>(reader: &mut csv::Reader<R>, options: FromCsvOptions) -> Result<Self, LoadError>
	where
		R: std::io::Read,
	{
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let n_columns = column_names.len();

		// Read every record so the column types can be inferred before any values are stored.
		let mut records = Vec::new();
		for record in reader.records() {
			let record = record?;
			if record.len() != n_columns {
				return Err(LoadError::RaggedRow {
					row: records.len(),
					found: record.len(),
					expected: n_columns,
				});
			}
			records.push(record);
		}

		let invalid_values = options.invalid_values;
		let columns = column_names
			.into_iter()
			.enumerate()
			.map(|(column_index, column_name)| {
				let values = records.iter().map(|record| &record[column_index]);
				let column_type = options
					.column_types
					.as_ref()
					.and_then(|column_types| column_types.get(&column_name).copied())
					.unwrap_or_else(|| infer_column_type(values.clone(), invalid_values));
				match column_type {
					ColumnType::Number => {
						let data = values
							.map(|value| parse_number(value, invalid_values))
							.collect();
						Column::Number(NumberColumn::new(column_name, data))
					}
					ColumnType::Enum => {
						let data = values.map(|value| value.to_owned()).collect();
						Column::Enum(EnumColumn::new(column_name, data))
					}
				}
			})
			.collect();
		Ok(DataFrame::new(columns))
	}
}

fn infer_column_type<'a>(
	values: impl Iterator<Item = &'a str>,
	invalid_values: &[&str],
) -> ColumnType {
	let mut values = values.filter(|value| !invalid_values.contains(value)).peekable();
	// A column with no valid values at all is a number column of missing values.
	if values.peek().is_none() {
		return ColumnType::Number;
	}
	let all_numbers = values.all(|value| {
		lexical::parse::<f32, _>(value.trim())
			.map(|value| value.is_finite())
			.unwrap_or(false)
	});
	if all_numbers {
		ColumnType::Number
	} else {
		ColumnType::Enum
	}
}

fn parse_number(value: &str, invalid_values: &[&str]) -> f32 {
	if invalid_values.contains(&value) {
		return f32::NAN;
	}
	match lexical::parse::<f32, _>(value.trim()) {
		Ok(value) if value.is_finite() => value,
		_ => f32::NAN,
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn load(csv: &str) -> DataFrame {
		let mut reader = csv::Reader::from_reader(csv.as_bytes());
		DataFrame::from_csv(&mut reader, FromCsvOptions::default()).unwrap()
	}

	#[test]
	fn test_infer_column_types() {
		let dataframe = load("price,rooms,city\n1.5,2,paris\n,3,berlin\n2.5,NA,paris\n");
		let price = match &dataframe.columns[0] {
			Column::Number(column) => column,
			Column::Enum(_) => panic!("expected price to be a number column"),
		};
		assert_eq!(price.data[0], 1.5);
		assert!(price.data[1].is_nan());
		assert!(matches!(dataframe.columns[1], Column::Number(_)));
		assert!(matches!(dataframe.columns[2], Column::Enum(_)));
		assert_eq!(dataframe.nrows(), 3);
	}

	#[test]
	fn test_column_type_override() {
		let mut reader = csv::Reader::from_reader("zip\n10001\n94103\n".as_bytes());
		let mut column_types = BTreeMap::new();
		column_types.insert("zip".to_owned(), ColumnType::Enum);
		let options = FromCsvOptions {
			column_types: Some(column_types),
			..Default::default()
		};
		let dataframe = DataFrame::from_csv(&mut reader, options).unwrap();
		insta::assert_debug_snapshot!(dataframe, @r###"
  DataFrame {
      columns: [
          Enum(
              EnumColumn {
                  name: "zip",
                  data: [
                      "10001",
                      "94103",
                  ],
              },
          ),
      ],
  }
  "###);
	}

	#[test]
	fn test_ragged_row() {
		let mut reader = csv::ReaderBuilder::new()
			.flexible(true)
			.from_reader("a,b\n1,2\n3\n".as_bytes());
		let result = DataFrame::from_csv(&mut reader, FromCsvOptions::default());
		assert!(matches!(result, Err(LoadError::RaggedRow { row: 1, .. })));
	}
}

use tabml_dataframe::Column;

/// A number target column with at most this many distinct values is treated as a classification target.
pub const CLASSIFICATION_MAX_DISTINCT_VALUES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
	Regression,
	Classification,
}

impl std::fmt::Display for TaskType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			TaskType::Regression => "regression",
			TaskType::Classification => "classification",
		};
		write!(f, "{}", s)
	}
}

/// Decide the task type from the target column. An enum column is always a classification target. A number column is a classification target if it has at most `CLASSIFICATION_MAX_DISTINCT_VALUES` distinct values, which catches integer coded categories such as 0/1 flags or 1 to 5 ratings, and a regression target otherwise.
pub fn detect_task_type(target_column: &Column) -> TaskType {
	match target_column {
		Column::Enum(_) => TaskType::Classification,
		Column::Number(_) => {
			if target_column.n_unique() <= CLASSIFICATION_MAX_DISTINCT_VALUES {
				TaskType::Classification
			} else {
				TaskType::Regression
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use tabml_dataframe::{EnumColumn, NumberColumn};

	fn number_column(n_distinct: usize) -> Column {
		let data = (0..100).map(|i| (i % n_distinct) as f32).collect();
		NumberColumn::new("target".to_owned(), data).into()
	}

	#[test]
	fn test_threshold() {
		assert_eq!(detect_task_type(&number_column(2)), TaskType::Classification);
		assert_eq!(detect_task_type(&number_column(10)), TaskType::Classification);
		assert_eq!(detect_task_type(&number_column(11)), TaskType::Regression);
	}

	#[test]
	fn test_enum_is_always_classification() {
		let data = (0..100).map(|i| format!("value_{}", i)).collect();
		let column: Column = EnumColumn::new("target".to_owned(), data).into();
		assert_eq!(detect_task_type(&column), TaskType::Classification);
	}
}

/// A plain text table with a header row, used to print summaries to the terminal.
pub struct Table {
	padding: usize,
	header: Vec<String>,
	rows: Vec<Vec<String>>,
}

impl Table {
	pub fn new(header: Vec<String>) -> Self {
		Self {
			padding: 1,
			header,
			rows: Vec::new(),
		}
	}

	pub fn push_row(&mut self, row: Vec<String>) {
		self.rows.push(row);
	}
}

impl std::fmt::Display for Table {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		// The width of each column is the width of its widest cell, header included.
		let mut column_widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
		for row in self.rows.iter() {
			for (column_width, value) in column_widths.iter_mut().zip(row.iter()) {
				*column_width = usize::max(*column_width, value.chars().count());
			}
		}
		let line = Line {
			column_widths: &column_widths,
			padding: self.padding,
		};
		let header = Row {
			column_widths: &column_widths,
			padding: self.padding,
			values: &self.header,
		};
		writeln!(f, "{}", header)?;
		writeln!(f, "{}", line)?;
		for values in self.rows.iter() {
			let row = Row {
				column_widths: &column_widths,
				padding: self.padding,
				values,
			};
			writeln!(f, "{}", row)?;
		}
		Ok(())
	}
}

struct Line<'a> {
	column_widths: &'a [usize],
	padding: usize,
}

impl<'a> std::fmt::Display for Line<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for column_width in self.column_widths.iter() {
			write!(f, "{}|", "-".repeat(column_width + 2 * self.padding))?;
		}
		Ok(())
	}
}

struct Row<'a> {
	column_widths: &'a [usize],
	padding: usize,
	values: &'a [String],
}

impl<'a> std::fmt::Display for Row<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let padding = " ".repeat(self.padding);
		write!(f, "|")?;
		for (column_width, value) in self.column_widths.iter().zip(self.values) {
			let fill = column_width - value.chars().count();
			write!(f, "{}{}{}{}|", padding, value, " ".repeat(fill), padding)?;
		}
		Ok(())
	}
}

#[test]
fn test_table() {
	let mut table = Table::new(vec!["model".to_owned(), "score".to_owned()]);
	table.push_row(vec!["RandomForest".to_owned(), "0.9".to_owned()]);
	let expected = "| model        | score |\n|--------------|-------|\n| RandomForest | 0.9   |\n";
	assert_eq!(table.to_string(), expected);
}

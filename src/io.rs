// Copyright 2024 Vladimir Kharchev

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Loading of columnar datasets from CSV files.

use std::path::Path;

use crate::error::{Error, Result};

/// Options of [`load_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Cell content that marks a missing value, in addition to an empty cell.
    pub missing: String,
}

impl CsvOptions {
    /// The default value of `self.delimiter`
    pub const DEFAULT_DELIMITER: u8 = b',';
    /// The default value of `self.missing`
    pub const DEFAULT_MISSING: &'static str = "M";
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: Self::DEFAULT_DELIMITER,
            missing: Self::DEFAULT_MISSING.to_string(),
        }
    }
}

/// Reads every column of the CSV file at `path` as numbers.
///
/// The header row names the columns, and the columns keep their order in the file. Cells are
/// trimmed; empty cells and cells equal to [`CsvOptions::missing`] become `NaN`.
///
/// # Errors
/// Returns [`Error::InvalidValue`] for a cell that is not a number, and [`Error::Csv`] if the file
/// cannot be opened or parsed.
pub fn load_csv(
    path: impl AsRef<Path>,
    options: &CsvOptions,
) -> Result<Vec<(String, Vec<f64>)>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut columns: Vec<(String, Vec<f64>)> = reader
        .headers()?
        .iter()
        .map(|name| (name.to_string(), Vec::new()))
        .collect();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        for ((name, values), cell) in columns.iter_mut().zip(record.iter()) {
            values.push(parse_cell(cell, &options.missing).ok_or_else(|| {
                Error::InvalidValue {
                    column: name.clone(),
                    row: index + 1,
                    value: cell.to_string(),
                }
            })?);
        }
    }
    tracing::debug!(
        "loaded {} columns from {}",
        columns.len(),
        path.display()
    );
    Ok(columns)
}

/// Parses a trimmed cell, mapping missing values to `NaN`.
fn parse_cell(cell: &str, missing: &str) -> Option<f64> {
    if cell.is_empty() || cell == missing {
        Some(f64::NAN)
    } else {
        cell.parse().ok()
    }
}

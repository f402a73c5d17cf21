//! Reader for the fixed-layout demo output files.
//!
//! A file holds 450 whitespace separated floats. Read row-major they form a
//! 30×15 matrix: the upper 15 rows are the temperature field, the lower 15
//! rows the concentration field. Physical line breaks do not matter, only the
//! flattened order does.
#[cfg(test)]
mod test;

use crate::{Error, Result};
use std::path::Path;

pub const ROWS: usize = 30;
pub const COLUMNS: usize = 15;
pub const HALF_ROWS: usize = ROWS / 2;
pub const VALUE_COUNT: usize = ROWS * COLUMNS;

/// Row-major matrix of floats.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    values: Box<[f64]>,
}
impl Matrix {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            values: vec![0.; rows * columns].into_boxed_slice(),
        }
    }
    pub fn from_values(rows: usize, columns: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != rows * columns {
            return Err(Error::Shape {
                expected: rows * columns,
                found: values.len(),
            });
        }
        Ok(Self {
            rows,
            columns,
            values: values.into_boxed_slice(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn columns(&self) -> usize {
        self.columns
    }
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    pub fn get(&self, row: usize, column: usize) -> f64 {
        debug_assert!(row < self.rows && column < self.columns);
        self.values[row * self.columns + column]
    }
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.columns..(row + 1) * self.columns]
    }
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // `max(1)` keeps `chunks` happy for degenerate 0-column matrices
        self.values.chunks(self.columns.max(1))
    }

    /// Smallest and largest finite entry; `None` if nothing is finite.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|f| f.is_finite())
            .fold(None, |range, f| match range {
                None => Some((f, f)),
                Some((min, max)) => Some((f64::min(min, f), f64::max(max, f))),
            })
    }

    /// Tab separated, one matrix row per line.
    pub fn to_tsv(&self) -> String {
        self.iter_rows()
            .map(|row| {
                row.iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parsed, not yet reshaped, content of one data file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSample {
    rows: Vec<Vec<f64>>,
}
impl RawSample {
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (line_index, line) in text.lines().enumerate() {
            let mut row = Vec::new();
            for (column_index, token) in line.split_whitespace().enumerate() {
                match token.parse::<f64>() {
                    Ok(f) => row.push(f),
                    Err(_) => {
                        return Err(Error::Parse {
                            line: line_index + 1,
                            column: column_index + 1,
                            token: token.to_string(),
                        })
                    }
                }
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn value_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// Reshapes into 30×15 and splits into the two fields.
    pub fn into_pair(self) -> Result<MeasurementPair> {
        let found = self.value_count();
        if found != VALUE_COUNT {
            return Err(Error::Shape {
                expected: VALUE_COUNT,
                found,
            });
        }
        let mut values: Vec<f64> = self.rows.into_iter().flatten().collect();
        let concentration = values.split_off(HALF_ROWS * COLUMNS);
        Ok(MeasurementPair {
            temperature: Matrix::from_values(HALF_ROWS, COLUMNS, values)?,
            concentration: Matrix::from_values(ROWS - HALF_ROWS, COLUMNS, concentration)?,
        })
    }
}

/// Temperature and concentration field of one time step.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementPair {
    pub temperature: Matrix,
    pub concentration: Matrix,
}
impl MeasurementPair {
    pub fn zeros() -> Self {
        Self {
            temperature: Matrix::zeros(HALF_ROWS, COLUMNS),
            concentration: Matrix::zeros(ROWS - HALF_ROWS, COLUMNS),
        }
    }

    pub fn parse_str(text: &str) -> Result<Self> {
        RawSample::parse(text)?.into_pair()
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        log::debug!("read {} bytes from {path:?}", text.len());
        Self::parse_str(&text)
    }

    pub fn matrices(&self) -> [&Matrix; 2] {
        [&self.temperature, &self.concentration]
    }

    /// Row-major concatenation of both fields.
    pub fn flatten(&self) -> Vec<f64> {
        self.temperature
            .values()
            .iter()
            .chain(self.concentration.values())
            .copied()
            .collect()
    }
}

use crate::config::DATE_FORMAT;
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use std::path::Path;

/// Header of the date column in every intermediate file
pub const DATE_COLUMN: &str = "DATE";

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Date-indexed table of numeric columns
///
/// Missing cells are stored as `NaN`. Column order is preserved on write.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl Frame {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Same as [`Frame::column`] but an error names the missing column
    pub fn require(&self, name: &str) -> Result<&[f64]> {
        self.column(name)
            .ok_or_else(|| anyhow!("column '{}' not found (have: {:?})", name, self.column_names()))
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if name == DATE_COLUMN {
            bail!("'{}' is reserved for the date index", DATE_COLUMN);
        }
        if values.len() != self.dates.len() {
            bail!(
                "column '{}' has {} values but the frame has {} rows",
                name,
                values.len(),
                self.dates.len()
            );
        }
        if self.column(&name).is_some() {
            bail!("duplicate column '{}'", name);
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    /// New frame holding only the rows whose index satisfies `keep`
    pub fn select_rows<F>(&self, mut keep: F) -> Frame
    where
        F: FnMut(usize, NaiveDate) -> bool,
    {
        let indices: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(i, d)| keep(*i, **d))
            .map(|(i, _)| i)
            .collect();

        Frame {
            dates: indices.iter().map(|&i| self.dates[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: indices.iter().map(|&i| c.values[i]).collect(),
                })
                .collect(),
        }
    }

    /// Drop every row with a missing value in any column
    pub fn drop_incomplete_rows(&self) -> Frame {
        let columns = &self.columns;
        self.select_rows(|i, _| columns.iter().all(|c| !c.values[i].is_nan()))
    }

    pub fn read_csv(path: &Path) -> Result<Frame> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        let headers = reader
            .headers()
            .with_context(|| format!("cannot read header of {}", path.display()))?
            .clone();

        let date_index = headers
            .iter()
            .position(|h| h == DATE_COLUMN)
            .ok_or_else(|| anyhow!("{} has no {} column", path.display(), DATE_COLUMN))?;
        let value_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_index)
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut dates = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); value_columns.len()];

        for (line, record) in reader.records().enumerate() {
            let record =
                record.with_context(|| format!("{}: bad record {}", path.display(), line + 2))?;
            let raw_date = record.get(date_index).unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date.trim(), DATE_FORMAT).with_context(|| {
                format!("{}: row {} has invalid date '{}'", path.display(), line + 2, raw_date)
            })?;
            dates.push(date);

            for (slot, (index, name)) in value_columns.iter().enumerate() {
                let cell = record.get(*index).unwrap_or_default().trim();
                let value = if cell.is_empty() {
                    f64::NAN
                } else {
                    cell.parse::<f64>().with_context(|| {
                        format!(
                            "{}: row {} column '{}' is not numeric: '{}'",
                            path.display(),
                            line + 2,
                            name,
                            cell
                        )
                    })?
                };
                values[slot].push(value);
            }
        }

        let mut frame = Frame::new(dates);
        for ((_, name), column) in value_columns.into_iter().zip(values) {
            frame.push_column(name, column)?;
        }
        Ok(frame)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("cannot create {}", path.display()))?;

        let mut header = vec![DATE_COLUMN.to_string()];
        header.extend(self.columns.iter().map(|c| c.name.clone()));
        writer.write_record(&header)?;

        for (row, date) in self.dates.iter().enumerate() {
            let mut record = vec![date.format(DATE_FORMAT).to_string()];
            record.extend(self.columns.iter().map(|c| {
                let value = c.values[row];
                if value.is_nan() {
                    String::new()
                } else {
                    value.to_string()
                }
            }));
            writer.write_record(&record)?;
        }

        writer
            .flush()
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }
}

use crate::config::SourceSettings;
use crate::data::{saver, Frame};
use crate::module::Module;
use crate::run::RunContext;
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Joins the configured raw series on date into `processed/cleaned_data.csv`
pub struct CleanEngineer {
    context: RunContext,
}

/// One raw source after parsing: output column names and values per day
struct SourceTable {
    columns: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<f64>>,
}

impl CleanEngineer {
    pub const NAME: &'static str = "CleanEngineer";
    pub const OUTPUT: &'static str = "cleaned_data";

    pub fn new(context: &RunContext) -> Result<Self> {
        if context.settings().preprocess.sources.is_empty() {
            bail!("preprocess.sources lists no raw inputs to clean");
        }
        Ok(Self {
            context: context.clone(),
        })
    }

    fn read_source(&self, source: &SourceSettings) -> Result<SourceTable> {
        let path = self.context.data_root().join(&source.file);
        debug!("Reading in {}...", path.display());

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("cannot open raw source {}", path.display()))?;
        let headers = reader.headers()?.clone();

        let date_index = headers
            .iter()
            .position(|h| h.trim() == source.date_column.trim())
            .ok_or_else(|| {
                anyhow!(
                    "{} has no date column '{}'",
                    path.display(),
                    source.date_column
                )
            })?;

        // Keep the file's own column order
        let mut selected = Vec::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(output) = source.columns.get(header) {
                selected.push((index, output.clone()));
            }
        }
        for wanted in source.columns.keys() {
            if !headers.iter().any(|h| h == wanted.as_str()) {
                bail!("{} has no column '{}'", path.display(), wanted);
            }
        }

        let mut rows = BTreeMap::new();
        let mut skipped = 0usize;
        for record in reader.records() {
            let record = record.with_context(|| format!("bad record in {}", path.display()))?;
            let raw_date = record.get(date_index).unwrap_or_default().trim();
            let Ok(date) = NaiveDate::parse_from_str(raw_date, &source.date_format) else {
                skipped += 1;
                continue;
            };
            let values = selected
                .iter()
                .map(|(index, _)| parse_raw_value(record.get(*index).unwrap_or_default()))
                .collect();
            rows.entry(date).or_insert(values);
        }

        if skipped > 0 {
            warn!(
                "Skipped {} rows of {} with dates not matching '{}'",
                skipped,
                path.display(),
                source.date_format
            );
        }

        Ok(SourceTable {
            columns: selected.into_iter().map(|(_, name)| name).collect(),
            rows,
        })
    }
}

/// Parse a raw cell, tolerating thousands separators and blanks
fn parse_raw_value(cell: &str) -> f64 {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().unwrap_or(f64::NAN)
}

/// Inner join on date, ascending
fn join_sources(tables: &[SourceTable]) -> Result<Frame> {
    let Some((first, rest)) = tables.split_first() else {
        bail!("nothing to join");
    };
    let dates: Vec<NaiveDate> = first
        .rows
        .keys()
        .filter(|d| rest.iter().all(|t| t.rows.contains_key(*d)))
        .copied()
        .collect();

    let mut frame = Frame::new(dates.clone());
    for table in tables {
        for (slot, name) in table.columns.iter().enumerate() {
            let values = dates.iter().map(|d| table.rows[d][slot]).collect();
            frame.push_column(name.clone(), values)?;
        }
    }
    Ok(frame)
}

impl Module for CleanEngineer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&mut self) -> Result<()> {
        info!("Reading in raw data sources...");
        let tables = self
            .context
            .settings()
            .preprocess
            .sources
            .iter()
            .map(|source| self.read_source(source))
            .collect::<Result<Vec<_>>>()?;

        info!("Joining {} sources on date", tables.len());
        let joined = join_sources(&tables)?;
        let cleaned = joined.drop_incomplete_rows();
        debug!(
            "Joined {} rows, {} complete rows kept",
            joined.len(),
            cleaned.len()
        );
        if cleaned.is_empty() {
            bail!("no complete rows remain after joining the raw sources");
        }

        saver::save_csv(&self.context, &cleaned, Self::OUTPUT, "processed")?;
        Ok(())
    }
}

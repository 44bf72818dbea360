use super::Scaling;
use crate::data::{saver, Frame};
use crate::module::Module;
use crate::run::RunContext;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Column holding the target moved by `model.data.shift` rows
pub const SHIFTED_TARGET: &str = "SHIFTED_PRICE";

/// Splits the scaled data into training and testing sets, with and without
/// a shifted target
pub struct PrepareTraining {
    context: RunContext,
    training_end: NaiveDate,
}

impl PrepareTraining {
    pub const NAME: &'static str = "PrepareTraining";

    pub fn new(context: &RunContext) -> Result<Self> {
        let data = &context.settings().model.data;
        let training_end = data.training_end().ok_or_else(|| {
            anyhow!(
                "model.data.training_end_date '{}' is not a YYYY-MM-DD date",
                data.training_end_date
            )
        })?;
        Ok(Self {
            context: context.clone(),
            training_end,
        })
    }
}

/// Move `values` by `periods` rows, filling the vacated slots with `NaN`
///
/// A positive shift takes each value from an earlier row, a negative one
/// from a later row.
pub fn shift(values: &[f64], periods: i64) -> Vec<f64> {
    let len = values.len() as i64;
    (0..len)
        .map(|i| {
            match i.checked_sub(periods) {
                Some(source) if (0..len).contains(&source) => values[source as usize],
                _ => f64::NAN,
            }
        })
        .collect()
}

/// Rows before `end` and rows on or after it
pub fn split_at_date(frame: &Frame, end: NaiveDate) -> (Frame, Frame) {
    (
        frame.select_rows(|_, date| date < end),
        frame.select_rows(|_, date| date >= end),
    )
}

/// Copy of `frame` plus [`SHIFTED_TARGET`], keeping only rows where it has a value
pub fn with_shifted_target(frame: &Frame, target: &str, periods: i64) -> Result<Frame> {
    let shifted = shift(frame.require(target)?, periods);
    let mut out = frame.clone();
    out.push_column(SHIFTED_TARGET, shifted)?;

    let shifted = out.require(SHIFTED_TARGET)?.to_vec();
    Ok(out.select_rows(|i, _| !shifted[i].is_nan()))
}

impl Module for PrepareTraining {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&mut self) -> Result<()> {
        let data = &self.context.settings().model.data;

        info!("Reading in scaled dataframe");
        let input = saver::data_path(&self.context, Scaling::OUTPUT, "processed");
        let scaled = Frame::read_csv(&input)?;

        info!("Splitting at {} without shifting", self.training_end);
        let (training, testing) = split_at_date(&scaled, self.training_end);
        debug!("{} training rows, {} testing rows", training.len(), testing.len());
        if training.is_empty() || testing.is_empty() {
            warn!(
                "Split at {} leaves an empty set ({} training, {} testing)",
                self.training_end,
                training.len(),
                testing.len()
            );
        }
        saver::save_csv(&self.context, &training, "training_unshifted", "modelling")?;
        saver::save_csv(&self.context, &testing, "testing_unshifted", "modelling")?;

        info!("Shifting [{}] by {} rows", data.target, data.shift);
        let shifted = with_shifted_target(&scaled, &data.target, data.shift)?;
        let (training, testing) = split_at_date(&shifted, self.training_end);
        debug!("{} training rows, {} testing rows", training.len(), testing.len());
        saver::save_csv(&self.context, &training, "training_shifted", "modelling")?;
        saver::save_csv(&self.context, &testing, "testing_shifted", "modelling")?;

        Ok(())
    }
}

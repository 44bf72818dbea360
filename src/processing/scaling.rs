use super::CleanEngineer;
use crate::data::{saver, Frame};
use crate::module::Module;
use crate::run::RunContext;
use anyhow::Result;
use tracing::{debug, info};

/// Min-max scales every column of the cleaned data to `[0, 1]`
pub struct Scaling {
    context: RunContext,
}

impl Scaling {
    pub const NAME: &'static str = "Scaling";
    pub const OUTPUT: &'static str = "scaled_cleaned_data";

    pub fn new(context: &RunContext) -> Self {
        Self {
            context: context.clone(),
        }
    }
}

/// Scale one column; a constant column maps to zero
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else if range > 0.0 {
                (v - min) / range
            } else {
                0.0
            }
        })
        .collect()
}

impl Module for Scaling {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&mut self) -> Result<()> {
        info!("Reading in cleaned dataframe");
        let input = saver::data_path(&self.context, CleanEngineer::OUTPUT, "processed");
        let clean = Frame::read_csv(&input)?;

        info!("Starting min-max scaling process");
        let mut scaled = Frame::new(clean.dates().to_vec());
        for column in clean.columns() {
            debug!("Scaling column [{}]", column.name);
            scaled.push_column(column.name.clone(), min_max_scale(&column.values))?;
        }

        saver::save_csv(&self.context, &scaled, Self::OUTPUT, "processed")?;
        Ok(())
    }
}

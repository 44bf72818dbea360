use super::Scaling;
use crate::config::DifferencingSettings;
use crate::data::{saver, Frame};
use crate::module::Module;
use crate::run::RunContext;
use anyhow::{bail, Result};
use tracing::{debug, info};

/// First-differences the scaled series so the model sees day-on-day moves
pub struct Differencing {
    context: RunContext,
}

impl Differencing {
    pub const NAME: &'static str = "Differencing";
    pub const OUTPUT: &'static str = "differenced_scaled_cleaned_data";

    pub fn new(context: &RunContext) -> Self {
        Self {
            context: context.clone(),
        }
    }
}

/// `values[i] - values[i - 1]` for every row after the first
pub fn first_difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Difference the selected columns and drop the first row
///
/// Passthrough columns keep the value of the later row of each pair so they
/// stay aligned with the differenced values.
pub fn difference_frame(frame: &Frame, settings: &DifferencingSettings) -> Result<Frame> {
    if frame.len() < 2 {
        bail!(
            "differencing needs at least two rows, the scaled data has {}",
            frame.len()
        );
    }

    for name in settings.columns.iter().chain(&settings.passthrough) {
        frame.require(name)?;
    }
    if let Some(both) = settings
        .columns
        .iter()
        .find(|c| settings.passthrough.contains(c))
    {
        bail!("column '{}' is both differenced and passed through", both);
    }

    let mut differenced = Frame::new(frame.dates()[1..].to_vec());
    for column in frame.columns() {
        let passthrough = settings.passthrough.contains(&column.name);
        let selected = settings.columns.is_empty() || settings.columns.contains(&column.name);

        if passthrough {
            debug!("Passing column [{}] through", column.name);
            differenced.push_column(column.name.clone(), column.values[1..].to_vec())?;
        } else if selected {
            debug!("Differencing column [{}]", column.name);
            differenced.push_column(column.name.clone(), first_difference(&column.values))?;
        }
    }
    Ok(differenced)
}

impl Module for Differencing {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&mut self) -> Result<()> {
        info!("Reading in scaled dataframe");
        let input = saver::data_path(&self.context, Scaling::OUTPUT, "processed");
        let scaled = Frame::read_csv(&input)?;

        info!("Differencing {} rows", scaled.len());
        let differenced = difference_frame(&scaled, &self.context.settings().preprocess.differencing)?;

        saver::save_csv(&self.context, &differenced, Self::OUTPUT, "processed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context_with, settings_in};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn scaled() -> Frame {
        let dates = (4..=7)
            .map(|d| NaiveDate::from_ymd_opt(2021, 1, d).unwrap())
            .collect();
        let mut frame = Frame::new(dates);
        frame.push_column("AL_PRICE", vec![0.0, 0.5, 0.25, 1.0]).unwrap();
        frame.push_column("OIL_PRICE", vec![1.0, 0.0, 0.0, 0.5]).unwrap();
        frame.push_column("WEEKDAY", vec![0.0, 0.25, 0.5, 0.75]).unwrap();
        frame
    }

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference(&[1.0, 3.0, 2.0]), vec![2.0, -1.0]);
        assert!(first_difference(&[1.0]).is_empty());
    }

    #[test]
    fn test_all_columns_differenced_by_default() {
        let out = difference_frame(&scaled(), &DifferencingSettings::default()).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out.dates()[0], NaiveDate::from_ymd_opt(2021, 1, 5).unwrap());
        assert_eq!(out.column("AL_PRICE"), Some(&[0.5, -0.25, 0.75][..]));
        assert_eq!(out.column("WEEKDAY"), Some(&[0.25, 0.25, 0.25][..]));
    }

    #[test]
    fn test_selected_and_passthrough_columns() {
        let settings = DifferencingSettings {
            columns: vec!["AL_PRICE".to_string()],
            passthrough: vec!["WEEKDAY".to_string()],
        };
        let out = difference_frame(&scaled(), &settings).unwrap();

        assert_eq!(out.column_names(), vec!["AL_PRICE", "WEEKDAY"]);
        assert_eq!(out.column("WEEKDAY"), Some(&[0.25, 0.5, 0.75][..]));
    }

    #[test]
    fn test_unknown_or_conflicting_columns_are_errors() {
        let unknown = DifferencingSettings {
            columns: vec!["COPPER".to_string()],
            passthrough: vec![],
        };
        assert!(difference_frame(&scaled(), &unknown).is_err());

        let conflicting = DifferencingSettings {
            columns: vec!["AL_PRICE".to_string()],
            passthrough: vec!["AL_PRICE".to_string()],
        };
        assert!(difference_frame(&scaled(), &conflicting).is_err());
    }

    #[test]
    fn test_run_writes_differenced_file() {
        let dir = TempDir::new().unwrap();
        let context = context_with(settings_in(dir.path()));
        saver::save_csv(&context, &scaled(), Scaling::OUTPUT, "processed").unwrap();

        Differencing::new(&context).run().unwrap();

        let out = Frame::read_csv(&dir.path().join("data/processed/differenced_scaled_cleaned_data.csv"))
            .unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.column("OIL_PRICE"), Some(&[-1.0, 0.0, 0.5][..]));
    }
}

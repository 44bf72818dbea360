//! Conventional locations for intermediate data and plots

use super::Frame;
use crate::run::RunContext;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Extension given to plots saved without one
pub const DEFAULT_PLOT_EXTENSION: &str = ".png";

fn with_extension(filename: &str, extension: &str) -> String {
    if filename.ends_with(extension) {
        filename.to_string()
    } else {
        debug!(
            "The filename does not contain {} as file extension, adding {}...",
            extension, extension
        );
        format!("{filename}{extension}")
    }
}

/// `<data_root>/<kind>/<filename>.csv`
pub fn data_path(context: &RunContext, filename: &str, kind: &str) -> PathBuf {
    context
        .data_dir(kind)
        .join(with_extension(filename, ".csv"))
}

/// `<run folder>/plots/<filename><extension>`, `.png` by default
pub fn plot_path(context: &RunContext, filename: &str, extension: Option<&str>) -> PathBuf {
    let extension = extension.unwrap_or(DEFAULT_PLOT_EXTENSION);
    context
        .run()
        .plots_dir
        .join(with_extension(filename, extension))
}

/// Write `frame` to its conventional location, creating the kind folder
pub fn save_csv(context: &RunContext, frame: &Frame, filename: &str, kind: &str) -> Result<PathBuf> {
    let path = prepare(context, filename, kind)?;
    frame.write_csv(&path)?;
    info!("Save successful!");
    Ok(path)
}

/// Write an `item,value` table such as model metrics
pub fn save_items(
    context: &RunContext,
    items: &[(&str, f64)],
    filename: &str,
    kind: &str,
) -> Result<PathBuf> {
    let path = prepare(context, filename, kind)?;
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    writer.write_record(["item", "value"])?;
    for (item, value) in items {
        writer.write_record([item.to_string(), value.to_string()])?;
    }
    writer.flush()?;
    info!("Save successful!");
    Ok(path)
}

fn prepare(context: &RunContext, filename: &str, kind: &str) -> Result<PathBuf> {
    let dir = context.data_dir(kind);
    std::fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;
    let path = data_path(context, filename, kind);
    debug!(
        "Saving file with file name [{}] at location [{}]...",
        filename,
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context_with, settings_in};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_csv_extension_added_once() {
        let dir = TempDir::new().unwrap();
        let context = context_with(settings_in(dir.path()));

        assert_eq!(
            data_path(&context, "cleaned_data", "processed"),
            dir.path().join("data/processed/cleaned_data.csv")
        );
        assert_eq!(
            data_path(&context, "cleaned_data.csv", "processed"),
            dir.path().join("data/processed/cleaned_data.csv")
        );
    }

    #[test]
    fn test_plot_path_defaults_to_png_under_run_folder() {
        let dir = TempDir::new().unwrap();
        let context = context_with(settings_in(dir.path()));
        let plots = context.run().plots_dir.clone();

        assert_eq!(plot_path(&context, "forecast", None), plots.join("forecast.png"));
        assert_eq!(plot_path(&context, "forecast.png", None), plots.join("forecast.png"));
        assert_eq!(
            plot_path(&context, "forecast", Some(".bmp")),
            plots.join("forecast.bmp")
        );
    }

    #[test]
    fn test_save_csv_creates_kind_directory() {
        let dir = TempDir::new().unwrap();
        let context = context_with(settings_in(dir.path()));
        let mut frame = Frame::new(vec![NaiveDate::from_ymd_opt(2021, 1, 4).unwrap()]);
        frame.push_column("AL_PRICE", vec![1.5]).unwrap();

        let path = save_csv(&context, &frame, "out", "processed").unwrap();
        assert_eq!(Frame::read_csv(&path).unwrap(), frame);
    }

    #[test]
    fn test_save_items_writes_item_value_table() {
        let dir = TempDir::new().unwrap();
        let context = context_with(settings_in(dir.path()));

        let path = save_items(&context, &[("MSE", 0.25), ("R2", 0.9)], "metrics", "modelling").unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "item,value\nMSE,0.25\nR2,0.9\n");
    }
}

//! Prediction-versus-actual charts
//!
//! Charts carry no captions or axis labels so rendering never needs a font.

use anyhow::{anyhow, bail, Result};
use ndarray::Array1;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

const SIZE: (u32, u32) = (1280, 720);

/// Draw `actual` in blue and `predicted` in red as line series over row index
pub fn plot_prediction(path: &Path, actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<()> {
    if actual.is_empty() || actual.len() != predicted.len() {
        bail!(
            "cannot plot {} actual against {} predicted values",
            actual.len(),
            predicted.len()
        );
    }

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow!("{}: {}", path.display(), e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0usize..actual.len(), value_range(actual, predicted))
        .map_err(|e| anyhow!("{}: {}", path.display(), e))?;

    for (series, colour) in [(actual, &BLUE), (predicted, &RED)] {
        chart
            .draw_series(LineSeries::new(
                series.iter().enumerate().map(|(i, v)| (i, *v)),
                colour,
            ))
            .map_err(|e| anyhow!("{}: {}", path.display(), e))?;
    }

    root.present()
        .map_err(|e| anyhow!("cannot write {}: {}", path.display(), e))?;
    Ok(())
}

fn value_range(actual: &Array1<f64>, predicted: &Array1<f64>) -> Range<f64> {
    let (min, max) = actual
        .iter()
        .chain(predicted)
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return 0.0..1.0;
    }
    let pad = if max > min { (max - min) * 0.05 } else { 0.5 };
    (min - pad)..(max + pad)
}

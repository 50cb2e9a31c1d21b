//! One-shot prediction commands

use anyhow::{Context, Result};
use predictor_lib::predictor::Pipeline;
use predictor_lib::RawInput;

use crate::output::{print_classification, print_forecast, warn_unknown_codes, OutputFormat};

/// Classify the area described by `input`
pub fn predict_crime_prone(pipeline: &Pipeline<'_>, input: &RawInput, format: OutputFormat) -> Result<()> {
    warn_unknown_codes(input);
    let result = pipeline
        .predict_crime_prone(input)
        .context("Crime-prone prediction failed")?;
    print_classification(input, result, format);
    Ok(())
}

/// Forecast the crime count for `input`
pub fn forecast_crime_rate(pipeline: &Pipeline<'_>, input: &RawInput, format: OutputFormat) -> Result<()> {
    warn_unknown_codes(input);
    let count = pipeline
        .forecast_crime_rate(input)
        .context("Crime rate forecast failed")?;
    print_forecast(input, count, pipeline.policy(), format);
    Ok(())
}

//! Output formatting utilities

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use predictor_lib::predictor::ForecastPolicy;
use predictor_lib::reference::{city_name, crime_type, police_presence};
use predictor_lib::{CrimeProneResult, RawInput};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// JSON envelope for a single prediction
#[derive(Debug, Serialize)]
pub struct PredictionReport<T: Serialize> {
    pub operation: &'static str,
    pub input: RawInput,
    pub result: T,
    pub generated_at: DateTime<Utc>,
}

impl<T: Serialize> PredictionReport<T> {
    pub fn new(operation: &'static str, input: RawInput, result: T) -> Self {
        Self {
            operation,
            input,
            result,
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ForecastResult {
    pub estimated_crime_count: i64,
    pub negative_policy: ForecastPolicy,
}

/// Row for the input summary table
#[derive(Tabled)]
struct InputRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Meaning")]
    meaning: String,
}

/// Print the classification outcome
pub fn print_classification(input: &RawInput, result: CrimeProneResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&PredictionReport::new("predict_crime_prone", *input, result)),
        OutputFormat::Table => {
            print_input_summary(input);
            if result.is_high() {
                println!("{} {}", "⚠".red().bold(), result.label().red().bold());
            } else {
                print_success(result.label());
            }
        }
    }
}

/// Print the forecast outcome
pub fn print_forecast(input: &RawInput, count: i64, policy: ForecastPolicy, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&PredictionReport::new(
            "forecast_crime_rate",
            *input,
            ForecastResult {
                estimated_crime_count: count,
                negative_policy: policy,
            },
        )),
        OutputFormat::Table => {
            print_input_summary(input);
            print_info(&format!("Estimated Crime Count: {}", count));
        }
    }
}

/// Print the current input values with their reference meanings
pub fn print_input_summary(input: &RawInput) {
    let rows = vec![
        InputRow {
            field: "City Code",
            value: input.city_code.to_string(),
            meaning: describe(city_name(input.city_code)),
        },
        InputRow {
            field: "Crime Description Code",
            value: input.crime_code.to_string(),
            meaning: describe(crime_type(input.crime_code)),
        },
        InputRow {
            field: "Victim Age",
            value: input.victim_age.to_string(),
            meaning: String::new(),
        },
        InputRow {
            field: "Police Deployed",
            value: input.police_deployed.to_string(),
            meaning: police_presence(input.police_deployed).to_string(),
        },
        InputRow {
            field: "Year",
            value: input.year.to_string(),
            meaning: String::new(),
        },
    ];
    print_rows(rows);
}

fn describe(name: Option<&str>) -> String {
    match name {
        Some(name) => name.to_string(),
        None => "unknown".yellow().to_string(),
    }
}

/// Warn about codes that have no entry in the reference tables
pub fn warn_unknown_codes(input: &RawInput) {
    if city_name(input.city_code).is_none() {
        print_warning(&format!("City code {} is not in the reference table", input.city_code));
    }
    if crime_type(input.crime_code).is_none() {
        print_warning(&format!(
            "Crime description code {} is not in the reference table",
            input.crime_code
        ));
    }
}

/// Render rows as a rounded table
pub fn print_rows<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize output: {}", e)),
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

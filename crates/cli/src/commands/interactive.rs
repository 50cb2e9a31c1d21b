//! Interactive prompt session
//!
//! Keeps the last entered value of every field, the way form widgets do, so
//! a user can tweak one field and re-run a prediction.

use anyhow::{Context, Result};
use predictor_lib::predictor::Pipeline;
use predictor_lib::{PipelineMetrics, RawInput};
use std::io::{BufRead, Write};

use crate::commands::codes::show_codes;
use crate::input::{default_input, Field};
use crate::output::{
    print_classification, print_error, print_forecast, print_input_summary, print_warning,
    warn_unknown_codes, OutputFormat,
};

const HELP: &str = "\
Set fields with name=value (several per line are allowed):
  city=<code> crime=<code> age=<0-100> police=<count> year=<2000-2030>
Actions:
  predict  (p)   Predict crime-prone area
  forecast (f)   Forecast crime rate
  show     (s)   Show current inputs
  codes    (c)   Show reference tables
  metrics  (m)   Show pipeline metrics
  help     (h)   Show this help
  quit     (q)   Leave the session";

/// One parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Assign(Vec<(Field, String)>),
    Predict,
    Forecast,
    Show,
    Codes,
    Metrics,
    Help,
    Quit,
    Empty,
}

fn parse_line(line: &str) -> Result<Action, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Action::Empty);
    }

    let action = match line.to_lowercase().as_str() {
        "predict" | "p" => Action::Predict,
        "forecast" | "f" => Action::Forecast,
        "show" | "s" => Action::Show,
        "codes" | "c" => Action::Codes,
        "metrics" | "m" => Action::Metrics,
        "help" | "h" | "?" => Action::Help,
        "quit" | "q" | "exit" => Action::Quit,
        _ => {
            let assignments = line
                .split_whitespace()
                .map(|token| -> Result<(Field, String), String> {
                    let (name, value) = token
                        .split_once('=')
                        .ok_or_else(|| format!("unrecognised input '{token}', type 'help'"))?;
                    Ok((name.parse::<Field>()?, value.to_string()))
                })
                .collect::<Result<Vec<_>, String>>()?;
            Action::Assign(assignments)
        }
    };
    Ok(action)
}

/// Counters reported when a session ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub input: RawInput,
    pub requests: usize,
    pub failures: usize,
}

/// Run the session on stdin until `quit` or end of input
pub fn run(pipeline: &Pipeline<'_>, format: OutputFormat) -> Result<SessionSummary> {
    let stdin = std::io::stdin();
    run_session(pipeline, format, stdin.lock())
}

pub fn run_session<R: BufRead>(
    pipeline: &Pipeline<'_>,
    format: OutputFormat,
    reader: R,
) -> Result<SessionSummary> {
    let mut summary = SessionSummary {
        input: default_input(),
        requests: 0,
        failures: 0,
    };

    println!("{}", HELP);
    let mut lines = reader.lines();
    loop {
        print!("crime> ");
        std::io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else { break };
        let line = line.context("Failed to read input")?;

        let action = match parse_line(&line) {
            Ok(action) => action,
            Err(message) => {
                print_warning(&message);
                continue;
            }
        };

        match action {
            Action::Assign(assignments) => {
                for (field, value) in assignments {
                    if let Err(message) = field.assign(&mut summary.input, &value) {
                        print_warning(&message);
                    }
                }
            }
            Action::Predict => {
                summary.requests += 1;
                warn_unknown_codes(&summary.input);
                match pipeline.predict_crime_prone(&summary.input) {
                    Ok(result) => print_classification(&summary.input, result, format),
                    Err(e) => {
                        summary.failures += 1;
                        print_error(&format!("Crime-prone prediction failed: {}", e));
                    }
                }
            }
            Action::Forecast => {
                summary.requests += 1;
                warn_unknown_codes(&summary.input);
                match pipeline.forecast_crime_rate(&summary.input) {
                    Ok(count) => print_forecast(&summary.input, count, pipeline.policy(), format),
                    Err(e) => {
                        summary.failures += 1;
                        print_error(&format!("Crime rate forecast failed: {}", e));
                    }
                }
            }
            Action::Show => print_input_summary(&summary.input),
            Action::Codes => show_codes(format),
            Action::Metrics => print!("{}", PipelineMetrics::new().render()),
            Action::Help => println!("{}", HELP),
            Action::Quit => break,
            Action::Empty => {}
        }
    }

    Ok(summary)
}

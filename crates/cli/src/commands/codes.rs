//! Reference table command

use predictor_lib::reference::{CITIES, CRIME_TYPES, POLICE_PRESENCE};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_json, print_rows, OutputFormat};

/// Row for the city and crime code tables
#[derive(Debug, Tabled, Serialize)]
struct CodeRow {
    #[tabled(rename = "Code")]
    code: u32,
    #[tabled(rename = "Name")]
    name: &'static str,
}

/// Row for the police deployment table
#[derive(Debug, Tabled, Serialize)]
struct PoliceRow {
    #[tabled(rename = "Police Deployed Value")]
    value: &'static str,
    #[tabled(rename = "Meaning")]
    meaning: &'static str,
}

#[derive(Debug, Serialize)]
struct ReferenceTables {
    cities: Vec<CodeRow>,
    crime_types: Vec<CodeRow>,
    police_presence: Vec<PoliceRow>,
}

fn code_rows(table: &[(u32, &'static str)]) -> Vec<CodeRow> {
    table
        .iter()
        .map(|&(code, name)| CodeRow { code, name })
        .collect()
}

fn reference_tables() -> ReferenceTables {
    ReferenceTables {
        cities: code_rows(CITIES),
        crime_types: code_rows(CRIME_TYPES),
        police_presence: POLICE_PRESENCE
            .iter()
            .map(|&(value, meaning)| PoliceRow { value, meaning })
            .collect(),
    }
}

/// Show the city, crime and police deployment reference tables
pub fn show_codes(format: OutputFormat) {
    let tables = reference_tables();
    match format {
        OutputFormat::Json => print_json(&tables),
        OutputFormat::Table => {
            println!("City Codes");
            print_rows(tables.cities);
            println!("\nCrime Description Codes");
            print_rows(tables.crime_types);
            println!("\nPolice Deployment Scale");
            print_rows(tables.police_presence);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_tables_json_shape() {
        let json = serde_json::to_value(reference_tables()).unwrap();
        assert_eq!(json["cities"].as_array().unwrap().len(), 13);
        assert_eq!(json["crime_types"][5]["name"], "Cyber Crime");
        assert_eq!(json["police_presence"][4]["value"], "10+");
    }
}

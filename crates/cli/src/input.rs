//! Collection and range checking of the five input fields

use clap::Args;
use predictor_lib::RawInput;
use std::fmt;
use std::str::FromStr;

pub const AGE_MIN: i64 = 0;
pub const AGE_MAX: i64 = 100;
pub const YEAR_MIN: i64 = 2000;
pub const YEAR_MAX: i64 = 2030;

/// Input fields shared by the `predict` and `forecast` commands
#[derive(Debug, Clone, Copy, Args)]
pub struct InputArgs {
    /// City code (see `crime codes`)
    #[arg(long, default_value_t = 0)]
    pub city: u32,

    /// Crime description code (see `crime codes`)
    #[arg(long, default_value_t = 0)]
    pub crime: u32,

    /// Victim age (0-100)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(AGE_MIN..=AGE_MAX))]
    pub age: u32,

    /// Number of police deployed
    #[arg(long, default_value_t = 0)]
    pub police: u32,

    /// Year (2000-2030)
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(i32).range(YEAR_MIN..=YEAR_MAX))]
    pub year: i32,
}

impl From<InputArgs> for RawInput {
    fn from(args: InputArgs) -> Self {
        RawInput {
            city_code: args.city,
            crime_code: args.crime,
            victim_age: args.age,
            police_deployed: args.police,
            year: args.year,
        }
    }
}

/// Initial form state, matching the lower bound of every field
pub fn default_input() -> RawInput {
    RawInput {
        city_code: 0,
        crime_code: 0,
        victim_age: AGE_MIN as u32,
        police_deployed: 0,
        year: YEAR_MIN as i32,
    }
}

/// A single editable field of the input form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    City,
    Crime,
    Age,
    Police,
    Year,
}

impl Field {
    pub const ALL: [Field; 5] = [Field::City, Field::Crime, Field::Age, Field::Police, Field::Year];

    pub fn name(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Crime => "crime",
            Self::Age => "age",
            Self::Police => "police",
            Self::Year => "year",
        }
    }

    fn bounds(&self) -> (i64, i64) {
        match self {
            Self::Age => (AGE_MIN, AGE_MAX),
            Self::Year => (YEAR_MIN, YEAR_MAX),
            _ => (0, i64::from(u32::MAX)),
        }
    }

    /// Parse and range-check `raw`, then store it in `input`
    pub fn assign(&self, input: &mut RawInput, raw: &str) -> Result<(), String> {
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("{} must be a whole number, got '{}'", self.name(), raw.trim()))?;

        let (min, max) = self.bounds();
        if value < min || value > max {
            return Err(format!("{} must be between {} and {}, got {}", self.name(), min, max, value));
        }

        // Bounds above keep both casts lossless.
        match self {
            Self::City => input.city_code = value as u32,
            Self::Crime => input.crime_code = value as u32,
            Self::Age => input.victim_age = value as u32,
            Self::Police => input.police_deployed = value as u32,
            Self::Year => input.year = value as i32,
        }
        Ok(())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "city" | "city_code" => Ok(Self::City),
            "crime" | "crime_code" => Ok(Self::Crime),
            "age" | "victim_age" => Ok(Self::Age),
            "police" | "police_deployed" => Ok(Self::Police),
            "year" => Ok(Self::Year),
            other => {
                let known: Vec<&str> = Self::ALL.iter().map(Field::name).collect();
                Err(format!("unknown field '{other}', expected one of {}", known.join(", ")))
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_into_raw_input() {
        let args = InputArgs {
            city: 1,
            crime: 3,
            age: 30,
            police: 5,
            year: 2023,
        };
        let input = RawInput::from(args);
        assert_eq!(input.city_code, 1);
        assert_eq!(input.crime_code, 3);
        assert_eq!(input.victim_age, 30);
        assert_eq!(input.police_deployed, 5);
        assert_eq!(input.year, 2023);
    }

    #[test]
    fn test_assign_within_bounds() {
        let mut input = default_input();
        Field::Age.assign(&mut input, "100").unwrap();
        Field::Year.assign(&mut input, " 2030 ").unwrap();
        Field::City.assign(&mut input, "12").unwrap();
        assert_eq!(input.victim_age, 100);
        assert_eq!(input.year, 2030);
        assert_eq!(input.city_code, 12);
    }

    #[test]
    fn test_assign_rejects_out_of_range() {
        let mut input = default_input();
        assert!(Field::Age.assign(&mut input, "101").is_err());
        assert!(Field::Year.assign(&mut input, "1999").is_err());
        assert!(Field::Police.assign(&mut input, "-1").is_err());
        assert!(Field::Crime.assign(&mut input, "three").is_err());
        assert_eq!(input, default_input());
    }

    #[test]
    fn test_field_names() {
        assert_eq!("Police".parse::<Field>().unwrap(), Field::Police);
        assert_eq!("victim_age".parse::<Field>().unwrap(), Field::Age);
        let err = "district".parse::<Field>().unwrap_err();
        assert!(err.ends_with("city, crime, age, police, year"), "{err}");
        for field in Field::ALL {
            assert_eq!(field.name().parse::<Field>().unwrap(), field);
        }
    }
}

//! Static code-to-name reference tables
//!
//! Display data only. The pipeline never consults these tables; unknown
//! codes are still passed to the models.

/// City codes used when the models were trained
pub const CITIES: &[(u32, &str)] = &[
    (0, "Delhi"),
    (1, "Mumbai"),
    (2, "Chennai"),
    (3, "Kolkata"),
    (4, "Bengaluru"),
    (5, "Hyderabad"),
    (6, "Pune"),
    (7, "Ahmedabad"),
    (8, "Jaipur"),
    (9, "Chandigarh"),
    (10, "Bhopal"),
    (11, "Indore"),
    (12, "Lucknow"),
];

/// Crime description codes used when the models were trained
pub const CRIME_TYPES: &[(u32, &str)] = &[
    (0, "Theft"),
    (1, "Robbery"),
    (2, "Assault"),
    (3, "Murder"),
    (4, "Kidnapping"),
    (5, "Cyber Crime"),
    (6, "Fraud"),
    (7, "Domestic Violence"),
    (8, "Drug Abuse"),
    (9, "Sexual Harassment"),
    (10, "Burglary"),
];

/// Meaning of the police-deployed value, by range
pub const POLICE_PRESENCE: &[(&str, &str)] = &[
    ("0", "No / Very Low Police Presence"),
    ("1 – 3", "Low Police Presence"),
    ("4 – 6", "Moderate Police Presence"),
    ("7 – 9", "High Police Presence"),
    ("10+", "Very High / Intensive Policing"),
];

fn lookup(table: &[(u32, &'static str)], code: u32) -> Option<&'static str> {
    table.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

pub fn city_name(code: u32) -> Option<&'static str> {
    lookup(CITIES, code)
}

pub fn crime_type(code: u32) -> Option<&'static str> {
    lookup(CRIME_TYPES, code)
}

/// Police presence description for a deployment count
pub fn police_presence(deployed: u32) -> &'static str {
    let index = match deployed {
        0 => 0,
        1..=3 => 1,
        4..=6 => 2,
        7..=9 => 3,
        _ => 4,
    };
    POLICE_PRESENCE[index].1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_lookup() {
        assert_eq!(city_name(0), Some("Delhi"));
        assert_eq!(city_name(12), Some("Lucknow"));
        assert_eq!(city_name(13), None);
    }

    #[test]
    fn test_crime_lookup() {
        assert_eq!(crime_type(3), Some("Murder"));
        assert_eq!(crime_type(10), Some("Burglary"));
        assert_eq!(crime_type(11), None);
    }

    #[test]
    fn test_police_presence_ranges() {
        assert_eq!(police_presence(0), "No / Very Low Police Presence");
        assert_eq!(police_presence(3), "Low Police Presence");
        assert_eq!(police_presence(4), "Moderate Police Presence");
        assert_eq!(police_presence(9), "High Police Presence");
        assert_eq!(police_presence(10), "Very High / Intensive Policing");
        assert_eq!(police_presence(250), "Very High / Intensive Policing");
    }

    #[test]
    fn test_codes_are_contiguous() {
        for (i, (code, _)) in CITIES.iter().enumerate() {
            assert_eq!(*code as usize, i);
        }
        for (i, (code, _)) in CRIME_TYPES.iter().enumerate() {
            assert_eq!(*code as usize, i);
        }
    }
}

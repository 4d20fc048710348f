use serde_json::{json, Map, Value};

use super::error::ValidationError;

/// The ten raw inputs every scoring request must carry. Everything else is derived.
pub const REQUIRED_KEYS: [&str; 10] = [
    "Age",
    "Diabetes",
    "Blood_Pressure_Problems",
    "Any_Transplants",
    "Any_Chronic_Diseases",
    "Height",
    "Weight",
    "Known_Allergies",
    "History_of_Cancer_in_Family",
    "Number_of_Major_Surgeries",
];

/// Applicant attributes exactly as supplied by a caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawApplicant {
    pub age: u32,
    pub diabetes: bool,
    pub blood_pressure_problems: bool,
    pub any_transplants: bool,
    pub any_chronic_diseases: bool,
    /// Centimeters.
    pub height_cm: f64,
    /// Kilograms.
    pub weight_kg: f64,
    pub known_allergies: bool,
    pub history_of_cancer_in_family: bool,
    pub major_surgeries: u32,
}

impl RawApplicant {
    /// Parse a request payload.
    ///
    /// Every missing key is reported at once before any field is interpreted.
    pub fn from_json(payload: &Value) -> Result<Self, ValidationError> {
        let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingKeys { missing });
        }

        Ok(Self {
            age: count_field(object, "Age")?,
            diabetes: flag_field(object, "Diabetes")?,
            blood_pressure_problems: flag_field(object, "Blood_Pressure_Problems")?,
            any_transplants: flag_field(object, "Any_Transplants")?,
            any_chronic_diseases: flag_field(object, "Any_Chronic_Diseases")?,
            height_cm: numeric_value(object, "Height")?,
            weight_kg: numeric_value(object, "Weight")?,
            known_allergies: flag_field(object, "Known_Allergies")?,
            history_of_cancer_in_family: flag_field(object, "History_of_Cancer_in_Family")?,
            major_surgeries: count_field(object, "Number_of_Major_Surgeries")?,
        })
    }

    /// Wire representation accepted by the `/predict` endpoint.
    pub fn to_payload(&self) -> Value {
        json!({
            "Age": self.age,
            "Diabetes": u8::from(self.diabetes),
            "Blood_Pressure_Problems": u8::from(self.blood_pressure_problems),
            "Any_Transplants": u8::from(self.any_transplants),
            "Any_Chronic_Diseases": u8::from(self.any_chronic_diseases),
            "Height": self.height_cm,
            "Weight": self.weight_kg,
            "Known_Allergies": u8::from(self.known_allergies),
            "History_of_Cancer_in_Family": u8::from(self.history_of_cancer_in_family),
            "Number_of_Major_Surgeries": self.major_surgeries,
        })
    }
}

fn numeric_value(object: &Map<String, Value>, key: &'static str) -> Result<f64, ValidationError> {
    let value = match object.get(key) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };

    match value {
        Some(number) if number.is_finite() => Ok(number),
        _ => Err(ValidationError::invalid(key, "expected a number")),
    }
}

fn count_field(object: &Map<String, Value>, key: &'static str) -> Result<u32, ValidationError> {
    let number = numeric_value(object, key)?;
    if number.fract() != 0.0 {
        return Err(ValidationError::invalid(key, "expected a whole number"));
    }
    if number < 0.0 {
        return Err(ValidationError::invalid(key, "must not be negative"));
    }
    if number > f64::from(u32::MAX) {
        return Err(ValidationError::invalid(key, "value is too large"));
    }
    Ok(number as u32)
}

fn flag_field(object: &Map<String, Value>, key: &'static str) -> Result<bool, ValidationError> {
    if let Some(Value::Bool(flag)) = object.get(key) {
        return Ok(*flag);
    }

    match numeric_value(object, key) {
        Ok(number) if number == 0.0 => Ok(false),
        Ok(number) if number == 1.0 => Ok(true),
        _ => Err(ValidationError::invalid(key, "expected 0 or 1")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Value {
        json!({
            "Age": 30,
            "Diabetes": 0,
            "Blood_Pressure_Problems": 1,
            "Any_Transplants": false,
            "Any_Chronic_Diseases": "0",
            "Height": 170,
            "Weight": "70.5",
            "Known_Allergies": 0,
            "History_of_Cancer_in_Family": true,
            "Number_of_Major_Surgeries": 2.0,
        })
    }

    #[test]
    fn parses_numbers_strings_and_booleans() {
        let applicant = RawApplicant::from_json(&payload()).expect("payload parses");
        assert_eq!(applicant.age, 30);
        assert!(applicant.blood_pressure_problems);
        assert!(!applicant.any_chronic_diseases);
        assert!(applicant.history_of_cancer_in_family);
        assert_eq!(applicant.height_cm, 170.0);
        assert_eq!(applicant.weight_kg, 70.5);
        assert_eq!(applicant.major_surgeries, 2);
    }

    #[test]
    fn reports_every_missing_key() {
        let mut body = payload();
        let object = body.as_object_mut().expect("object payload");
        object.remove("Age");
        object.remove("Weight");

        match RawApplicant::from_json(&body) {
            Err(ValidationError::MissingKeys { missing }) => {
                assert_eq!(missing, vec!["Age", "Weight"]);
            }
            other => panic!("expected missing keys, got {other:?}"),
        }
    }

    #[test]
    fn missing_keys_win_over_malformed_values() {
        let body = json!({ "Age": "old" });
        match RawApplicant::from_json(&body) {
            Err(ValidationError::MissingKeys { missing }) => assert_eq!(missing.len(), 9),
            other => panic!("expected missing keys, got {other:?}"),
        }
    }

    #[test]
    fn rejects_flags_outside_zero_and_one() {
        let mut body = payload();
        body["Diabetes"] = json!(2);
        let err = RawApplicant::from_json(&body).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidField {
                field: "Diabetes",
                ..
            }
        ));
    }

    #[test]
    fn rejects_negative_and_fractional_counts() {
        let mut body = payload();
        body["Number_of_Major_Surgeries"] = json!(-1);
        assert!(RawApplicant::from_json(&body).is_err());

        body["Number_of_Major_Surgeries"] = json!(1);
        body["Age"] = json!(30.5);
        let err = RawApplicant::from_json(&body).unwrap_err();
        assert!(err.to_string().contains("Age"));
    }

    #[test]
    fn distinguishes_negative_from_oversized_counts() {
        let mut body = payload();
        body["Age"] = json!("4294967296");
        assert_eq!(
            RawApplicant::from_json(&body).unwrap_err(),
            ValidationError::invalid("Age", "value is too large")
        );

        body["Age"] = json!(-3);
        assert_eq!(
            RawApplicant::from_json(&body).unwrap_err(),
            ValidationError::invalid("Age", "must not be negative")
        );
    }

    #[test]
    fn rejects_non_object_payloads() {
        let err = RawApplicant::from_json(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject);
    }

    #[test]
    fn payload_round_trips_through_parser() {
        let applicant = RawApplicant::from_json(&payload()).expect("payload parses");
        let reparsed = RawApplicant::from_json(&applicant.to_payload()).expect("reparses");
        assert_eq!(applicant, reparsed);
    }
}

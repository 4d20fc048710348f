use serde::{Deserialize, Serialize};

use super::applicant::RawApplicant;
use super::error::ValidationError;

/// BMI bucket used by the trained model. Underweight applicants fall in no bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub const ALL: [BmiCategory; 3] = [Self::Normal, Self::Overweight, Self::Obese];

    /// Half-open buckets: [18.5, 25), [25, 30), [30, inf).
    pub fn from_bmi(bmi: f64) -> Option<Self> {
        if bmi >= 30.0 {
            Some(Self::Obese)
        } else if bmi >= 25.0 {
            Some(Self::Overweight)
        } else if bmi >= 18.5 {
            Some(Self::Normal)
        } else {
            None
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Normal => "BMI_Category_Normal",
            Self::Overweight => "BMI_Category_Overweight",
            Self::Obese => "BMI_Category_Obese",
        }
    }
}

/// Age bracket used by the trained model. Applicants under 30 fall in no bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Thirties,
    Forties,
    Fifties,
    SixtyPlus,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        Self::Thirties,
        Self::Forties,
        Self::Fifties,
        Self::SixtyPlus,
    ];

    pub fn from_age(age: u32) -> Option<Self> {
        match age {
            0..=29 => None,
            30..=39 => Some(Self::Thirties),
            40..=49 => Some(Self::Forties),
            50..=59 => Some(Self::Fifties),
            _ => Some(Self::SixtyPlus),
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Thirties => "Age_Group_30-39",
            Self::Forties => "Age_Group_40-49",
            Self::Fifties => "Age_Group_50-59",
            Self::SixtyPlus => "Age_Group_60+",
        }
    }
}

/// Raw attributes plus BMI and the one-hot buckets the model was trained on.
///
/// Bucket membership is held as an `Option`, so at most one indicator per family
/// can ever be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatureSet {
    pub applicant: RawApplicant,
    pub bmi: f64,
    pub bmi_category: Option<BmiCategory>,
    pub age_group: Option<AgeGroup>,
}

impl DerivedFeatureSet {
    pub fn derive(applicant: &RawApplicant) -> Result<Self, ValidationError> {
        let height_cm = positive("Height", applicant.height_cm)?;
        let weight_kg = positive("Weight", applicant.weight_kg)?;

        let height_m = height_cm / 100.0;
        let bmi = weight_kg / (height_m * height_m);
        if !bmi.is_finite() {
            return Err(ValidationError::invalid(
                "Height",
                "height and weight do not produce a finite BMI",
            ));
        }

        Ok(Self {
            applicant: *applicant,
            bmi,
            bmi_category: BmiCategory::from_bmi(bmi),
            age_group: AgeGroup::from_age(applicant.age),
        })
    }

    pub fn bmi_indicator(&self, category: BmiCategory) -> u8 {
        u8::from(self.bmi_category == Some(category))
    }

    pub fn age_indicator(&self, group: AgeGroup) -> u8 {
        u8::from(self.age_group == Some(group))
    }

    /// Every derived feature keyed by its training column name.
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        let raw = &self.applicant;
        let mut values = vec![
            ("Age", f64::from(raw.age)),
            ("Diabetes", flag(raw.diabetes)),
            ("Blood_Pressure_Problems", flag(raw.blood_pressure_problems)),
            ("Any_Transplants", flag(raw.any_transplants)),
            ("Any_Chronic_Diseases", flag(raw.any_chronic_diseases)),
            ("Height", raw.height_cm),
            ("Weight", raw.weight_kg),
            ("Known_Allergies", flag(raw.known_allergies)),
            (
                "History_of_Cancer_in_Family",
                flag(raw.history_of_cancer_in_family),
            ),
            ("Number_of_Major_Surgeries", f64::from(raw.major_surgeries)),
            ("BMI", self.bmi),
        ];

        values.extend(
            BmiCategory::ALL
                .iter()
                .map(|category| (category.column(), f64::from(self.bmi_indicator(*category)))),
        );
        values.extend(
            AgeGroup::ALL
                .iter()
                .map(|group| (group.column(), f64::from(self.age_indicator(*group)))),
        );

        values
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NonPositiveMeasurement { field, value })
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

use std::io::Write;

use serde::Serialize;

use super::features::{AgeGroup, BmiCategory, DerivedFeatureSet};

#[derive(Debug, Serialize)]
struct ExportRow {
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "Diabetes")]
    diabetes: u8,
    #[serde(rename = "Blood_Pressure_Problems")]
    blood_pressure_problems: u8,
    #[serde(rename = "Any_Transplants")]
    any_transplants: u8,
    #[serde(rename = "Any_Chronic_Diseases")]
    any_chronic_diseases: u8,
    #[serde(rename = "Height")]
    height: f64,
    #[serde(rename = "Weight")]
    weight: f64,
    #[serde(rename = "Known_Allergies")]
    known_allergies: u8,
    #[serde(rename = "History_of_Cancer_in_Family")]
    history_of_cancer_in_family: u8,
    #[serde(rename = "Number_of_Major_Surgeries")]
    number_of_major_surgeries: u32,
    #[serde(rename = "BMI")]
    bmi: f64,
    #[serde(rename = "BMI_Category_Normal")]
    bmi_normal: u8,
    #[serde(rename = "BMI_Category_Overweight")]
    bmi_overweight: u8,
    #[serde(rename = "BMI_Category_Obese")]
    bmi_obese: u8,
    #[serde(rename = "Age_Group_30-39")]
    age_30_39: u8,
    #[serde(rename = "Age_Group_40-49")]
    age_40_49: u8,
    #[serde(rename = "Age_Group_50-59")]
    age_50_59: u8,
    #[serde(rename = "Age_Group_60+")]
    age_60_plus: u8,
}

impl From<&DerivedFeatureSet> for ExportRow {
    fn from(derived: &DerivedFeatureSet) -> Self {
        let raw = &derived.applicant;
        Self {
            age: raw.age,
            diabetes: u8::from(raw.diabetes),
            blood_pressure_problems: u8::from(raw.blood_pressure_problems),
            any_transplants: u8::from(raw.any_transplants),
            any_chronic_diseases: u8::from(raw.any_chronic_diseases),
            height: raw.height_cm,
            weight: raw.weight_kg,
            known_allergies: u8::from(raw.known_allergies),
            history_of_cancer_in_family: u8::from(raw.history_of_cancer_in_family),
            number_of_major_surgeries: raw.major_surgeries,
            bmi: derived.bmi,
            bmi_normal: derived.bmi_indicator(BmiCategory::Normal),
            bmi_overweight: derived.bmi_indicator(BmiCategory::Overweight),
            bmi_obese: derived.bmi_indicator(BmiCategory::Obese),
            age_30_39: derived.age_indicator(AgeGroup::Thirties),
            age_40_49: derived.age_indicator(AgeGroup::Forties),
            age_50_59: derived.age_indicator(AgeGroup::Fifties),
            age_60_plus: derived.age_indicator(AgeGroup::SixtyPlus),
        }
    }
}

/// Write the applicant's inputs and derived features as a one-row CSV with header.
pub fn write_csv<W: Write>(derived: &DerivedFeatureSet, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.serialize(ExportRow::from(derived))?;
    csv_writer.flush()?;
    Ok(())
}

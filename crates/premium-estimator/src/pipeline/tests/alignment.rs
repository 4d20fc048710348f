use super::common::*;
use crate::pipeline::align::align;
use crate::pipeline::features::DerivedFeatureSet;
use crate::pipeline::schema::FeatureSchema;

#[test]
fn aligned_vector_follows_schema_order() {
    let schema = FeatureSchema::trained();
    let derived = DerivedFeatureSet::derive(&applicant(45, 160.0, 80.0)).expect("derives");

    let aligned = derived.align(&schema);

    assert_eq!(aligned.columns(), schema.columns());
    assert_eq!(aligned.get("Age"), Some(45.0));
    assert_eq!(aligned.get("BMI"), Some(31.25));
    assert_eq!(aligned.get("BMI_Category_Obese"), Some(1.0));
    assert_eq!(aligned.get("Age_Group_40-49"), Some(1.0));
    assert_eq!(aligned.values()[0], 45.0);
}

#[test]
fn aligning_twice_is_a_no_op() {
    let schema = FeatureSchema::trained();
    let derived = DerivedFeatureSet::derive(&applicant(33, 175.0, 90.0)).expect("derives");

    let once = derived.align(&schema);
    let twice = align(once.iter(), &schema);

    assert_eq!(once, twice);
}

#[test]
fn unknown_columns_are_zero_filled_and_extras_dropped() {
    let schema = FeatureSchema::new(["BMI", "Smoker", "Age"], ["Age", "BMI"]).expect("schema");
    let derived = DerivedFeatureSet::derive(&applicant(52, 170.0, 70.0)).expect("derives");

    let aligned = derived.align(&schema);

    assert_eq!(aligned.columns(), &["BMI", "Smoker", "Age"]);
    assert_eq!(aligned.len(), 3);
    assert_eq!(aligned.get("Smoker"), Some(0.0));
    assert_eq!(aligned.get("Age"), Some(52.0));
    assert_eq!(aligned.get("Weight"), None);
}

#[test]
fn partial_inputs_fill_every_missing_column_with_zero() {
    let schema = FeatureSchema::trained();
    let aligned = align([("Age", 30.0), ("Height", 170.0), ("Weight", 70.0)], &schema);

    assert_eq!(aligned.len(), 18);
    let non_zero: Vec<&str> = aligned
        .iter()
        .filter(|(_, value)| *value != 0.0)
        .map(|(name, _)| name)
        .collect();
    assert_eq!(non_zero, vec!["Age", "Height", "Weight"]);
}

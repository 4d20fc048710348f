use crate::client::{RemoteScorer, DEFAULT_TIMEOUT};
use crate::infra::load_service;
use clap::Args;
use premium_estimator::config::AppConfig;
use premium_estimator::error::AppError;
use premium_estimator::pipeline::{
    write_csv, AgeGroup, BmiCategory, DerivedFeatureSet, PredictionError, RawApplicant,
};
use premium_estimator::telemetry;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Applicant age in years
    #[arg(long, value_parser = clap::value_parser!(u32).range(18..=66))]
    pub(crate) age: u32,
    /// Height in centimeters
    #[arg(long, value_parser = parse_height)]
    pub(crate) height: f64,
    /// Weight in kilograms
    #[arg(long, value_parser = parse_weight)]
    pub(crate) weight: f64,
    #[arg(long)]
    pub(crate) diabetes: bool,
    #[arg(long)]
    pub(crate) blood_pressure: bool,
    #[arg(long)]
    pub(crate) transplant: bool,
    #[arg(long)]
    pub(crate) chronic_disease: bool,
    #[arg(long)]
    pub(crate) allergies: bool,
    /// Family history of cancer
    #[arg(long)]
    pub(crate) cancer_history: bool,
    /// Number of major surgeries
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=3))]
    pub(crate) surgeries: u32,
    /// Score against a running service instead of the local artifacts
    #[arg(long)]
    pub(crate) endpoint: Option<String>,
    /// Request timeout in seconds when using --endpoint
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub(crate) timeout_secs: u64,
    /// Write the submitted inputs and derived features to a CSV file
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

impl ScoreArgs {
    fn applicant(&self) -> RawApplicant {
        RawApplicant {
            age: self.age,
            diabetes: self.diabetes,
            blood_pressure_problems: self.blood_pressure,
            any_transplants: self.transplant,
            any_chronic_diseases: self.chronic_disease,
            height_cm: self.height,
            weight_kg: self.weight,
            known_allergies: self.allergies,
            history_of_cancer_in_family: self.cancer_history,
            major_surgeries: self.surgeries,
        }
    }
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = command_config()?;
    let applicant = args.applicant();
    let derived = DerivedFeatureSet::derive(&applicant).map_err(PredictionError::from)?;

    println!("Insurance premium estimate");
    println!("  BMI: {:.2} ({})", derived.bmi, bmi_label(derived.bmi_category));
    println!("  Age group: {}", age_label(derived.age_group));

    let prediction = match &args.endpoint {
        Some(endpoint) => {
            let timeout = Duration::from_secs(args.timeout_secs);
            let scorer = RemoteScorer::new(endpoint.as_str(), timeout)?;
            scorer.predict(&applicant).await?
        }
        None => {
            let service = load_service(&config.artifacts)?;
            service.score(&derived)?
        }
    };

    println!("  Estimated insurance premium: {}", format_amount(prediction));

    if let Some(path) = &args.csv {
        let file = File::create(path)?;
        write_csv(&derived, file)?;
        println!("  Input data written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_schema() -> Result<(), AppError> {
    let config = command_config()?;
    let service = load_service(&config.artifacts)?;
    let bundle = service.bundle();

    println!("Model artifact: {}", config.artifacts.model_path.display());
    println!("  version: {}", bundle.model_version());
    println!("  kind: {}", bundle.model().model().kind());
    println!("Scaler artifact: {}", config.artifacts.scaler_path.display());
    println!("  version: {}", bundle.scaler_version());
    println!("  scaled features: {}", bundle.scaler().features().join(", "));
    println!("Column order ({}):", bundle.schema().len());
    for (index, column) in bundle.schema().columns().iter().enumerate() {
        println!("  {:>2}. {}", index + 1, column);
    }
    Ok(())
}

/// Load configuration and install logging for one-shot commands, so artifact
/// warnings reach the terminal as they do under `serve`.
fn command_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn parse_height(raw: &str) -> Result<f64, String> {
    parse_within(raw, 145.0, 188.0, "cm")
}

fn parse_weight(raw: &str) -> Result<f64, String> {
    parse_within(raw, 51.0, 132.0, "kg")
}

fn parse_within(raw: &str, min: f64, max: f64, unit: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|err| format!("failed to parse '{raw}' as a number ({err})"))?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside the accepted range {min}-{max} {unit}"))
    }
}

fn bmi_label(category: Option<BmiCategory>) -> &'static str {
    match category {
        Some(BmiCategory::Normal) => "normal",
        Some(BmiCategory::Overweight) => "overweight",
        Some(BmiCategory::Obese) => "obese",
        None => "underweight",
    }
}

fn age_label(group: Option<AgeGroup>) -> &'static str {
    match group {
        Some(AgeGroup::Thirties) => "30-39",
        Some(AgeGroup::Forties) => "40-49",
        Some(AgeGroup::Fifties) => "50-59",
        Some(AgeGroup::SixtyPlus) => "60+",
        None => "under 30",
    }
}

/// Two decimals with thousands separators, e.g. `23,514.50`.
fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

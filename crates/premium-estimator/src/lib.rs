//! Insurance premium estimation: feature engineering, schema alignment and
//! scoring against a frozen regression model.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod telemetry;

pub mod comparison;
pub mod config;
pub mod error;
pub mod telemetry;

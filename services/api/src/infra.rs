use metrics_exporter_prometheus::PrometheusHandle;
use proposal_scoring::comparison::{ComparisonService, IndicatorRegistry, WeightConfig};
use proposal_scoring::config::ScoringConfig;
use proposal_scoring::error::AppError;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Compiles the configured registry, falling back to the built-in indicators.
pub(crate) fn build_service(config: &ScoringConfig) -> Result<ComparisonService, AppError> {
    let registry = match &config.registry_path {
        Some(path) => {
            info!(path = %path.display(), "loading indicator registry");
            IndicatorRegistry::from_path(path)?
        }
        None => IndicatorRegistry::standard(),
    };
    Ok(ComparisonService::new(registry, config.match_threshold)?)
}

pub(crate) fn load_weights(path: Option<&Path>) -> Result<WeightConfig, AppError> {
    let Some(path) = path else {
        return Ok(WeightConfig::default());
    };
    let raw = std::fs::read(path)?;
    let weights = serde_json::from_slice(&raw)?;
    Ok(weights)
}

/// Parses `id=percent` pairs given on the command line.
pub(crate) fn parse_weight(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=PERCENT, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    let percent = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("failed to parse '{value}' as a percentage ({err})"))?;
    Ok((key.to_string(), percent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proposal_scoring::comparison::DEFAULT_MATCH_THRESHOLD;

    #[test]
    fn parse_weight_accepts_key_value_pairs() {
        assert_eq!(
            parse_weight("built_area = 40"),
            Ok(("built_area".to_string(), 40.0))
        );
        assert!(parse_weight("built_area").is_err());
        assert!(parse_weight("=40").is_err());
        assert!(parse_weight("built_area=lots").is_err());
    }

    #[test]
    fn build_service_defaults_to_standard_registry() {
        let service = build_service(&ScoringConfig {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            registry_path: None,
        })
        .expect("service builds");
        assert_eq!(service.registry(), &IndicatorRegistry::standard());
    }

    #[test]
    fn build_service_surfaces_missing_registry_file() {
        let result = build_service(&ScoringConfig {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            registry_path: Some("./missing-registry.json".into()),
        });
        assert!(matches!(result, Err(AppError::Registry(_))));
    }

    #[test]
    fn missing_weights_path_means_neutral_weights() {
        assert_eq!(load_weights(None).expect("weights"), WeightConfig::default());
    }

    #[test]
    fn malformed_weights_file_reports_json_error() {
        let path = std::env::temp_dir().join(format!(
            "proposal-scoring-weights-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"indicators": {"built_area": }}"#).expect("write weights");

        let result = load_weights(Some(&path));
        std::fs::remove_file(&path).expect("remove weights");

        let error = result.expect_err("malformed weights");
        assert!(matches!(error, AppError::Json(_)));
        assert!(error.to_string().starts_with("json error:"));
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::scoring::{GradingScale, ScoringPolicy};

pub const DEFAULT_TIMEOUT: &str = "30s";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub api: ApiConfig,

    /// Absent-mark and ranking policy (defaults apply when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringPolicy>,

    /// Grade bands for every exam type (built-in scale when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading: Option<GradingScale>,
}

impl Config {
    pub fn new(base_url: &str) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.to_string(),
                timeout: None,
            },
            scoring: None,
            grading: None,
        }
    }

    pub fn scoring_policy(&self) -> ScoringPolicy {
        self.scoring.unwrap_or_default()
    }

    pub fn grading_scale(&self) -> GradingScale {
        self.grading.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Root of the results API, e.g. "https://school.example.org/api"
    pub base_url: String,

    /// Request timeout as a duration string ("30s", "1m"); defaults to 30s
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

impl ApiConfig {
    pub fn timeout_duration(&self) -> Result<Duration, String> {
        let raw = self.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT);
        let duration = humantime::parse_duration(raw.trim())
            .map_err(|e| format!("api.timeout: invalid duration '{}' - {}", raw, e))?;
        if duration.is_zero() {
            return Err("api.timeout: must be greater than zero".to_string());
        }
        Ok(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{ExamType, TieBreak};

    #[test]
    fn test_minimal_config_parse() {
        let yaml = r#"
api:
  base_url: "https://school.example.org/api"
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://school.example.org/api");
        assert_eq!(config.api.timeout_duration().unwrap(), Duration::from_secs(30));
        assert_eq!(config.scoring_policy(), ScoringPolicy::default());
        assert_eq!(config.grading_scale(), GradingScale::default());
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
api:
  base_url: "http://localhost:8000/api"
  timeout: "1m"
scoring:
  ties: sequential
grading:
  - { exam_type: gpa, grade_name: "P", percent_from: 50, percent_upto: 100, grade_point: 1 }
  - { exam_type: gpa, grade_name: "F", percent_from: 0, percent_upto: 49.99, grade_point: 0 }
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.api.timeout_duration().unwrap(), Duration::from_secs(60));
        assert_eq!(config.scoring_policy().ties, TieBreak::Sequential);
        let scale = config.grading_scale();
        assert_eq!(scale.bands.len(), 2);
        assert!(!scale.has_bands_for(ExamType::SchoolBased));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
api:
  base_url: "http://localhost"
queries: []
"#;
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut api = ApiConfig {
            base_url: "http://localhost".to_string(),
            timeout: Some("forever".to_string()),
        };
        assert!(api.timeout_duration().unwrap_err().contains("api.timeout"));
        api.timeout = Some("0s".to_string());
        assert!(api.timeout_duration().is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::new("http://localhost:8000/api");
        config.grading = Some(GradingScale::default());
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}

use crate::models::logging::{LogLevel, OutputFormat};
use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_address: String,
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ConfigValidator for ApiConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.bind_address, "api.bind_address")?;

        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(crate::ConfigError::Validation(format!(
                "api.bind_address is not a valid socket address: {}",
                self.bind_address
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: OutputFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info.to_string(),
            log_format: OutputFormat::Pretty,
        }
    }
}

impl ConfigValidator for ObservabilityConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.log_level
            .parse::<LogLevel>()
            .map_err(crate::ConfigError::Validation)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_validation() {
        assert!(ApiConfig::default().validate().is_ok());

        let invalid = ApiConfig {
            bind_address: "localhost".to_string(),
            ..ApiConfig::default()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_observability_config_validation() {
        assert!(ObservabilityConfig::default().validate().is_ok());

        let invalid = ObservabilityConfig {
            log_level: "verbose".to_string(),
            ..ObservabilityConfig::default()
        };
        assert!(invalid.validate().is_err());
    }
}

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::metrics::MetricsConfig;
use super::service::{ServiceConfig, UpstreamConfig};

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "REQMETER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
const ENV_PREFIX: &str = "REQMETER_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Where the frontend forwards to. Ignored by backends.
    pub upstream: Option<UpstreamConfig>,
}

/// Builds the figment used by [`load_config`]: the YAML file, then
/// `REQMETER_`-prefixed environment variables (`__` separates nested keys).
pub fn default_figment() -> Figment {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extracts a versioned config from any figment.
pub fn extract(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from the YAML file and the environment, exiting on error.
pub fn load_config() -> ConfigV1 {
    match extract(&default_figment()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error rendering schema: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogFormat, PathLabel, ServiceRole};

    #[test]
    fn parses_a_full_frontend_config() {
        let yaml = r#"
version: "1.0.0"
bind_address: 0.0.0.0:8080
service:
  name: service-a
  role: frontend
logging:
  level: debug
  format: json
metrics:
  path_label: matched
  duration_buckets: [0.05, 0.1, 1]
upstream:
  url: http://service_b:8081/api
  timeout_in_ms: 500
"#;
        let config = extract(&Figment::new().merge(Yaml::string(yaml))).unwrap();
        assert_eq!(config.service.role, ServiceRole::Frontend);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.metrics.path_label, PathLabel::Matched);
        assert_eq!(config.metrics.duration_buckets, vec![0.05, 0.1, 1.0]);
        let upstream = config.upstream.unwrap();
        assert_eq!(upstream.url, "http://service_b:8081/api");
        assert_eq!(upstream.timeout_in_ms, 500);
    }

    #[test]
    fn metrics_section_and_timeout_have_defaults() {
        let yaml = r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
service:
  name: service-b
  role: backend
logging:
  level: info
  format: console
upstream:
  url: http://elsewhere/
"#;
        let config = extract(&Figment::new().merge(Yaml::string(yaml))).unwrap();
        assert_eq!(config.metrics.path_label, PathLabel::Raw);
        assert_eq!(
            config.metrics.duration_buckets,
            crate::metrics::DEFAULT_BUCKETS.to_vec()
        );
        assert_eq!(config.upstream.unwrap().timeout_in_ms, 3000);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let yaml = r#"
version: "2.0.0"
bind_address: 127.0.0.1:8081
"#;
        assert!(extract(&Figment::new().merge(Yaml::string(yaml))).is_err());
    }
}

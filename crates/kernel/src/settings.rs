use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "hosted";
const ENV_VAR_NAME: &str = "PULSE_ENV";
const CONFIG_DIR_ENV: &str = "PULSE_CONFIG_DIR";

/// Which target profile the run is configured for.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// A service running on the developer's machine.
    Local,
    /// The shared hosted test server.
    #[default]
    Hosted,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "hosted" => Ok(Environment::Hosted),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/hosted",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub target: TargetSettings,
    #[serde(default)]
    pub suite: SuiteSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay
    /// and `PULSE_*` variables.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .with_context(|| "unable to resolve current directory")?
                .join("config"),
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from an explicit config directory and profile name.
    pub fn load_from(config_dir: &std::path::Path, environment: &str) -> anyhow::Result<Self> {
        let parsed: Environment = environment.parse()?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let cfg = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix("PULSE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed;

        tracing::debug!(
            env = ?settings.environment,
            config_dir = %config_dir.display(),
            base_url = %settings.target.base_url,
            "settings loaded"
        );

        Ok(settings)
    }
}

/// Where the service under test lives and how to reach it.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetSettings {
    #[serde(default = "TargetSettings::default_base_url")]
    pub base_url: String,
    /// Per-request timeout. `None` keeps the HTTP client default.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl TargetSettings {
    fn default_base_url() -> String {
        "http://pulse-rest-testing.herokuapp.com".to_string()
    }
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuiteSettings {
    /// Id assumed absent on the server, used by the unknown-id cases.
    #[serde(default = "SuiteSettings::default_missing_id")]
    pub missing_id: u64,
    /// Delete fixture records after each case.
    #[serde(default = "SuiteSettings::default_cleanup")]
    pub cleanup: bool,
}

impl SuiteSettings {
    fn default_missing_id() -> u64 {
        99999
    }

    fn default_cleanup() -> bool {
        true
    }
}

impl Default for SuiteSettings {
    fn default() -> Self {
        Self {
            missing_id: Self::default_missing_id(),
            cleanup: Self::default_cleanup(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_hosted() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Hosted);
    }

    #[test]
    fn default_target_is_shared_test_server() {
        let settings = Settings::default();
        assert_eq!(
            settings.target.base_url,
            "http://pulse-rest-testing.herokuapp.com"
        );
        assert_eq!(settings.target.request_timeout_ms, None);
    }

    #[test]
    fn default_suite_cleans_up_and_uses_id_99999() {
        let suite = SuiteSettings::default();
        assert!(suite.cleanup);
        assert_eq!(suite.missing_id, 99999);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn missing_config_dir_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("pulse-kernel-no-such-config-dir");
        let settings = Settings::load_from(&dir, "local").unwrap();
        assert_eq!(settings.environment, Environment::Local);
        assert_eq!(settings.telemetry.filter, "info");
    }

    #[test]
    fn overlay_file_overrides_base() {
        let dir = std::env::temp_dir().join(format!("pulse-kernel-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("base.toml"),
            "[target]\nbase_url = \"http://base.invalid\"\n[suite]\nmissing_id = 5\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("local.toml"),
            "[target]\nbase_url = \"http://127.0.0.1:8000\"\nrequest_timeout_ms = 2500\n",
        )
        .unwrap();

        let settings = Settings::load_from(&dir, "local").unwrap();
        assert_eq!(settings.target.base_url, "http://127.0.0.1:8000");
        assert_eq!(settings.target.request_timeout_ms, Some(2500));
        assert_eq!(settings.suite.missing_id, 5);

        std::fs::remove_dir_all(&dir).ok();
    }
}

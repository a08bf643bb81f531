//! Command line flags and layered settings.
//!
//! Settings are resolved from, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional config file (`--config`, any format the `config` crate reads)
//! 3. `CACHET_EXPORTER_*` environment variables
//! 4. command line flags (`--cachet.api-url` also reads `CACHET_API_URL`)
//!
//! ```toml
//! api_url = "https://status.example.com/api/v1"
//! listen_address = ":9470"
//! telemetry_path = "/metrics"
//! timeout = "10s"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::duration::parse_duration;

const ENV_PREFIX: &str = "CACHET_EXPORTER";

#[derive(Parser, Debug, Default)]
#[command(name = "cachet_exporter")]
#[command(about = "Prometheus exporter for Cachet status pages")]
#[command(version)]
pub struct Args {
    /// Address to listen on for web interface and telemetry [default: :9470]
    #[arg(long = "web.listen-address")]
    pub listen_address: Option<String>,

    /// Path under which to expose metrics [default: /metrics]
    #[arg(long = "web.telemetry-path")]
    pub telemetry_path: Option<String>,

    /// Your Cachet instance API URL
    #[arg(long = "cachet.api-url", env = "CACHET_API_URL")]
    pub api_url: Option<String>,

    /// Timeout for each Cachet API request (e.g., "10s", "500ms") [default: 10s]
    #[arg(long = "cachet.timeout")]
    pub timeout: Option<String>,

    /// Page size used when listing groups and incidents [default: 100]
    #[arg(long = "cachet.per-page")]
    pub per_page: Option<u32>,

    /// Log level filter, overridden by RUST_LOG [default: info]
    #[arg(long = "log.level")]
    pub log_level: Option<String>,

    /// Optional config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Fully resolved exporter settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub listen_address: String,
    pub telemetry_path: String,
    pub api_url: String,
    pub timeout: String,
    pub per_page: u32,
    pub log_level: String,
}

impl Settings {
    /// Resolve settings from defaults, config file, environment and flags.
    pub fn load(args: &Args) -> Result<Self> {
        Self::load_with_env(args, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(args: &Args, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("listen_address", ":9470")?
            .set_default("telemetry_path", "/metrics")?
            .set_default("api_url", "")?
            .set_default("timeout", "10s")?
            .set_default("per_page", 100)?
            .set_default("log_level", "info")?;

        if let Some(path) = &args.config {
            builder = builder.add_source(File::from(path.as_path()));
        }

        let settings: Settings = builder
            .add_source(env)
            .set_override_option("listen_address", args.listen_address.clone())?
            .set_override_option("telemetry_path", args.telemetry_path.clone())?
            .set_override_option("api_url", args.api_url.clone())?
            .set_override_option("timeout", args.timeout.clone())?
            .set_override_option("per_page", args.per_page.map(i64::from))?
            .set_override_option("log_level", args.log_level.clone())?
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            bail!("You must provide your Cachet API URL");
        }
        if !self.telemetry_path.starts_with('/') {
            bail!(
                "Telemetry path must start with '/': {}",
                self.telemetry_path
            );
        }
        self.request_timeout()?;
        Ok(())
    }

    /// Listen address as a socket address string; a bare `:port` binds
    /// every interface.
    pub fn listen_addr(&self) -> String {
        match self.listen_address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port),
            None => self.listen_address.clone(),
        }
    }

    /// Per-request timeout for the Cachet client.
    pub fn request_timeout(&self) -> Result<Duration> {
        parse_duration(&self.timeout)
            .with_context(|| format!("Invalid Cachet timeout '{}'", self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::new()))
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn with_api_url() -> Args {
        Args {
            api_url: Some("https://status.example.com/api/v1".to_string()),
            ..Args::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with_env(&with_api_url(), no_env()).unwrap();

        assert_eq!(settings.listen_address, ":9470");
        assert_eq!(settings.listen_addr(), "0.0.0.0:9470");
        assert_eq!(settings.telemetry_path, "/metrics");
        assert_eq!(settings.per_page, 100);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.request_timeout().unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_api_url_is_rejected() {
        let err = Settings::load_with_env(&Args::default(), no_env()).unwrap_err();
        assert!(err.to_string().contains("Cachet API URL"));
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let args = Args {
            timeout: Some("eventually".to_string()),
            ..with_api_url()
        };
        assert!(Settings::load_with_env(&args, no_env()).is_err());
    }

    #[test]
    fn test_config_file_then_env_then_flags() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
api_url = "https://from-file.example.com/api/v1"
listen_address = "127.0.0.1:9000"
telemetry_path = "/file-metrics"
timeout = "3s"
"#
        )
        .unwrap();

        let args = Args {
            config: Some(file.path().to_path_buf()),
            telemetry_path: Some("/flag-metrics".to_string()),
            ..Args::default()
        };
        let settings = Settings::load_with_env(
            &args,
            env(&[("CACHET_EXPORTER_TIMEOUT", "5s"), ("CACHET_EXPORTER_PER_PAGE", "25")]),
        )
        .unwrap();

        assert_eq!(settings.api_url, "https://from-file.example.com/api/v1");
        assert_eq!(settings.listen_addr(), "127.0.0.1:9000");
        assert_eq!(settings.telemetry_path, "/flag-metrics");
        assert_eq!(settings.timeout, "5s");
        assert_eq!(settings.per_page, 25);
    }

    #[test]
    fn test_cli_flag_names() {
        let args = Args::try_parse_from([
            "cachet_exporter",
            "--web.listen-address",
            ":9999",
            "--web.telemetry-path",
            "/probe",
            "--cachet.api-url",
            "http://cachet.local/api/v1",
            "--cachet.timeout",
            "2s",
        ])
        .unwrap();

        assert_eq!(args.listen_address.as_deref(), Some(":9999"));
        assert_eq!(args.telemetry_path.as_deref(), Some("/probe"));
        assert_eq!(args.api_url.as_deref(), Some("http://cachet.local/api/v1"));
        assert_eq!(args.timeout.as_deref(), Some("2s"));
    }

    #[test]
    fn test_bad_telemetry_path_is_rejected() {
        let args = Args {
            telemetry_path: Some("metrics".to_string()),
            ..with_api_url()
        };
        assert!(Settings::load_with_env(&args, no_env()).is_err());
    }
}

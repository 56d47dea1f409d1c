//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `SHOPCTL_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `SHOPCTL_` override YAML values
//! 3. **SHOP_API_URL** - Special case: overrides `api.base_url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `SHOPCTL_AUTH__LOGIN_URL=/signin` sets the `auth.login_url` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use shopctl::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Console will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Shop API**: `api.base_url`, `api.request_timeout` - Where the JSON API lives
//! - **Auth**: `auth.token_cookie`, `auth.session_cookie`, `auth.login_url` - Credential forwarding
//! - **Display**: `display.app_name`, `display.currency_symbol`, `display.page_size`
//! - **Payments**: `payments.callback_url`, `payments.min_topup` - Paystack SMS top-ups
//! - **Telemetry**: `enable_otel_export`
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! SHOPCTL_PORT=8080
//! SHOP_API_URL="https://api.myshop.example"
//! SHOPCTL_DISPLAY__CURRENCY_SYMBOL="GH₵"
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "SHOPCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults, so an empty (or missing) YAML file yields a console pointed at a
/// shop API on `localhost:5000`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Shop API connection settings
    pub api: ApiConfig,
    /// How credentials are found on incoming requests and where to send users without them
    pub auth: AuthConfig,
    /// Presentation settings shared by every page
    pub display: DisplayConfig,
    /// Paystack SMS top-up settings
    pub payments: PaymentsConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Root of the shop JSON API. Endpoint paths (`api/...`) are joined onto it.
    pub base_url: Url,
    /// Timeout applied to every upstream request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Cookie holding the bearer token when no `Authorization` header is sent
    pub token_cookie: String,
    /// Upstream session cookie, forwarded verbatim
    pub session_cookie: String,
    /// Login page that unauthenticated users are redirected to
    pub login_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub app_name: String,
    pub currency_symbol: String,
    /// Rows per page on list views (1..=100)
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaymentsConfig {
    /// Where Paystack sends the customer after checkout
    pub callback_url: String,
    /// Smallest SMS top-up amount accepted, in the display currency
    pub min_topup: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            display: DisplayConfig::default(),
            payments: PaymentsConfig::default(),
            enable_otel_export: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:5000").expect("static URL is valid"),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_cookie: "token".to_string(),
            session_cookie: "session".to_string(),
            login_url: "/login".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            app_name: "ShopDesk".to_string(),
            currency_symbol: "₵".to_string(),
            page_size: 20,
        }
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            callback_url: "http://localhost:3000/sms/topup/verify".to_string(),
            min_topup: Decimal::ONE,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if !matches!(self.api.base_url.scheme(), "http" | "https") {
            return Err(Error::BadRequest {
                message: format!(
                    "Config validation: api.base_url must be an http(s) URL, got scheme '{}'",
                    self.api.base_url.scheme()
                ),
            });
        }

        if self.auth.login_url.trim().is_empty() {
            return Err(Error::BadRequest {
                message: "Config validation: auth.login_url cannot be empty".to_string(),
            });
        }

        if !(1..=100).contains(&self.display.page_size) {
            return Err(Error::BadRequest {
                message: format!(
                    "Config validation: display.page_size must be between 1 and 100, got {}",
                    self.display.page_size
                ),
            });
        }

        if self.display.currency_symbol.is_empty() {
            return Err(Error::BadRequest {
                message: "Config validation: display.currency_symbol cannot be empty".to_string(),
            });
        }

        if self.payments.min_topup <= Decimal::ZERO {
            return Err(Error::BadRequest {
                message: format!(
                    "Config validation: payments.min_topup must be positive, got {}",
                    self.payments.min_topup
                ),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("SHOPCTL_").split("__").ignore(&["config"]))
            .merge(Env::raw().only(&["SHOP_API_URL"]).map(|_| "api.base_url".into()))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

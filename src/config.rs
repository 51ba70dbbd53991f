use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_COMMERCE_API_URL: &str = "http://localhost:4000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Checkout business defaults. These mirror storefront policy and can be
/// overridden per environment.
const DEFAULT_FREE_SHIPPING_THRESHOLD: u32 = 599;
const DEFAULT_FALLBACK_SHIPPING_RATE: u32 = 80;
const DEFAULT_PARCEL_WEIGHT_PER_UNIT: f64 = 0.5;
const DEFAULT_PINCODE_DEBOUNCE_MS: u64 = 450;
const DEFAULT_WALLET_EXPIRY_POLL_SECS: u64 = 1;

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Cashfree payment gateway configuration. When `app_id` is absent the
/// online payment path reports the gateway as not configured.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct CashfreeConfig {
    #[serde(default)]
    pub app_id: Option<String>,

    /// "sandbox" or "production"
    #[serde(default = "default_cashfree_environment")]
    pub environment: String,

    /// Base URL embedded in the gateway return URL so the server can
    /// reconcile order status after redirect.
    #[serde(default = "default_return_url_base")]
    pub return_url_base: String,
}

impl Default for CashfreeConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            environment: default_cashfree_environment(),
            return_url_base: default_return_url_base(),
        }
    }
}

impl CashfreeConfig {
    pub fn is_configured(&self) -> bool {
        self.app_id.as_deref().map_or(false, |id| !id.is_empty())
    }
}

/// Application configuration with validation
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Base URL of the storefront commerce backend that owns addresses,
    /// wallets, gift milestones, serviceability and order persistence.
    #[serde(default = "default_commerce_api_url")]
    #[validate(url)]
    pub commerce_api_url: String,

    /// Timeout applied to collaborator HTTP calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// TTL for checkout session state in the session store
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Subtotal (after product discount) above which shipping is free,
    /// provided no percentage/flat discount is active.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: u32,

    /// Flat rate charged when no courier can be resolved
    #[serde(default = "default_fallback_shipping_rate")]
    pub fallback_shipping_rate: u32,

    /// Parcel weight per cart unit, in the courier's mass units
    #[serde(default = "default_parcel_weight_per_unit")]
    pub parcel_weight_per_unit: f64,

    /// Debounce window for keystroke-driven pincode checks
    #[serde(default = "default_pincode_debounce_ms")]
    pub pincode_debounce_ms: u64,

    /// Poll interval for wallet reservation expiry
    #[serde(default = "default_wallet_expiry_poll_secs")]
    pub wallet_expiry_poll_secs: u64,

    /// Cashfree gateway settings
    #[serde(default)]
    pub cashfree: CashfreeConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_commerce_api_url() -> String {
    DEFAULT_COMMERCE_API_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}
fn default_free_shipping_threshold() -> u32 {
    DEFAULT_FREE_SHIPPING_THRESHOLD
}
fn default_fallback_shipping_rate() -> u32 {
    DEFAULT_FALLBACK_SHIPPING_RATE
}
fn default_parcel_weight_per_unit() -> f64 {
    DEFAULT_PARCEL_WEIGHT_PER_UNIT
}
fn default_pincode_debounce_ms() -> u64 {
    DEFAULT_PINCODE_DEBOUNCE_MS
}
fn default_wallet_expiry_poll_secs() -> u64 {
    DEFAULT_WALLET_EXPIRY_POLL_SECS
}
fn default_cashfree_environment() -> String {
    "sandbox".to_string()
}
fn default_return_url_base() -> String {
    "https://glowcart.in/checkout/return".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            commerce_api_url: default_commerce_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            session_ttl_secs: default_session_ttl_secs(),
            free_shipping_threshold: default_free_shipping_threshold(),
            fallback_shipping_rate: default_fallback_shipping_rate(),
            parcel_weight_per_unit: default_parcel_weight_per_unit(),
            pincode_debounce_ms: default_pincode_debounce_ms(),
            wallet_expiry_poll_secs: default_wallet_expiry_poll_secs(),
            cashfree: CashfreeConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting a config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("glowcart_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}

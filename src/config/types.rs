use serde::Deserialize;

/// Main configuration structure for Pricewatch
///
/// Every section is optional; a missing file section falls back to the
/// defaults that target the EU Central listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Upstream listing page and the request headers sent with it
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Listing page URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Whole-request timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept")]
    pub accept: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    #[serde(default = "default_referer")]
    pub referer: String,
}

/// How a class fragment is matched against an element's `class` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Fragment appears anywhere in the attribute
    #[default]
    Substring,
    /// Some class token starts with the fragment
    Prefix,
    /// Some class token equals the fragment
    Exact,
}

/// Class fragments locating product cards and their fields
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    #[serde(rename = "match-mode", default)]
    pub match_mode: MatchMode,

    #[serde(default = "default_card")]
    pub card: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_price")]
    pub price: String,

    #[serde(default = "default_offers")]
    pub offers: String,
}

/// Region filter applied to extracted labels
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Case-insensitive substring a label must contain
    #[serde(rename = "region-marker", default = "default_region_marker")]
    pub region_marker: String,
}

/// Refresh timer settings
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(rename = "interval-secs", default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Fire one refresh immediately at startup
    #[serde(rename = "run-on-start", default = "default_true")]
    pub run_on_start: bool,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served at `/` for the dashboard, if any
    #[serde(rename = "static-dir", default)]
    pub static_dir: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            referer: default_referer(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::default(),
            card: default_card(),
            title: default_title(),
            price: default_price(),
            offers: default_offers(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            region_marker: default_region_marker(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            run_on_start: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

fn default_url() -> String {
    "https://www.g2g.com/categories/lost-ark-gold".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36".to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_referer() -> String {
    "https://www.g2g.com/".to_string()
}

fn default_card() -> String {
    "product-card-wrapper".to_string()
}

fn default_title() -> String {
    "product-title".to_string()
}

fn default_price() -> String {
    "price-amount".to_string()
}

fn default_offers() -> String {
    "g-chip-counter".to_string()
}

fn default_region_marker() -> String {
    "EU Central".to_string()
}

fn default_interval_secs() -> u64 {
    30 * 60
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

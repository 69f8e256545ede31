// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub package: PackageConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listening socket configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Served directory and HTML pages
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Directory everything is served from; canonicalized at startup
    pub root: String,
    /// Page served at `/`, relative to `root`
    pub landing_page: String,
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    /// Extra named pages, e.g. `/old` for a previous release's download page
    #[serde(default)]
    pub pages: Vec<PageAlias>,
}

/// A request path that is rewritten to a fixed file under the root
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PageAlias {
    pub path: String,
    pub file: String,
}

/// Package download behaviour
#[derive(Debug, Deserialize, Clone)]
pub struct PackageConfig {
    /// Exact request paths that trigger candidate resolution
    #[serde(default)]
    pub download_paths: Vec<String>,
    /// Package file extension, without the dot
    pub extension: String,
    /// Whether any request path ending in `.<extension>` triggers candidate resolution
    #[serde(default = "default_true")]
    pub match_extension: bool,
    pub content_type: String,
    /// Ordered list of files relative to the root; first existing one wins
    pub candidates: Vec<String>,
    /// Filename offered to the client via `Content-Disposition`
    #[serde(default)]
    pub download_filename: Option<String>,
}

/// Response header configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Added to every response, after `Access-Control-Allow-Origin: *`
    #[serde(default)]
    pub headers: Vec<HeaderOverride>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HeaderOverride {
    pub name: String,
    pub value: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Connection handling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub read_timeout: u64,
    pub write_timeout: u64,
}

const fn default_true() -> bool {
    true
}

fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

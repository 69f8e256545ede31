// Configuration module entry point
// Loads layered configuration, validates it and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use hyper::header::{HeaderName, HeaderValue};

use crate::error::StartupError;
use crate::routing::path::is_safe_relative;

pub use state::AppState;
pub use types::{Config, HeaderOverride, HttpConfig, LoggingConfig, PageAlias};

/// Config file looked up when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "apk-drop.toml";

/// Build output locations, most preferred first (arm64, arm32, x86_64, universal)
pub const DEFAULT_CANDIDATES: [&str; 4] = [
    "build/app/outputs/flutter-apk/app-arm64-v8a-release.apk",
    "build/app/outputs/flutter-apk/app-armeabi-v7a-release.apk",
    "build/app/outputs/flutter-apk/app-x86_64-release.apk",
    "build/app/outputs/flutter-apk/app-release.apk",
];

pub const APK_CONTENT_TYPE: &str = "application/vnd.android.package-archive";

const ACCESS_LOG_FORMATS: [&str; 3] = ["combined", "common", "json"];

impl Config {
    /// Load configuration from the given file path
    /// The file is optional; environment variables prefixed `APKDROP_` override it
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("APKDROP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("site.root", ".")?
            .set_default("site.landing_page", "download-app.html")?
            .set_default("package.download_paths", vec!["/app-release.apk"])?
            .set_default("package.extension", "apk")?
            .set_default("package.match_extension", true)?
            .set_default("package.content_type", APK_CONTENT_TYPE)?
            .set_default("package.candidates", DEFAULT_CANDIDATES.to_vec())?
            .set_default("http.server_name", concat!("apk-drop/", env!("CARGO_PKG_VERSION")))?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 600)?
            .set_default("performance.write_timeout", 600)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| StartupError::Invalid(format!("invalid listen address: {e}")))
    }

    /// Reject configurations that could serve files outside the root or build bad headers
    pub fn validate(&self) -> Result<(), StartupError> {
        self.get_socket_addr()?;

        check_relative("site.landing_page", &self.site.landing_page)?;
        for index in &self.site.index_files {
            check_relative("site.index_files", index)?;
        }
        for page in &self.site.pages {
            check_request_path("site.pages.path", &page.path)?;
            check_relative("site.pages.file", &page.file)?;
        }

        if self.package.candidates.is_empty() {
            return Err(StartupError::Invalid(
                "package.candidates must list at least one file".to_string(),
            ));
        }
        for candidate in &self.package.candidates {
            check_relative("package.candidates", candidate)?;
        }
        for path in &self.package.download_paths {
            check_request_path("package.download_paths", path)?;
        }
        if self.package_extension().is_empty() {
            return Err(StartupError::Invalid(
                "package.extension must not be empty".to_string(),
            ));
        }
        HeaderValue::from_str(&self.package.content_type).map_err(|_| {
            StartupError::Invalid(format!(
                "package.content_type is not a valid header value: {}",
                self.package.content_type
            ))
        })?;
        if let Some(name) = &self.package.download_filename {
            if name.is_empty()
                || name.contains(['"', '/', '\\'])
                || HeaderValue::from_str(name).is_err()
            {
                return Err(StartupError::Invalid(format!(
                    "package.download_filename is not a usable filename: {name:?}"
                )));
            }
        }

        HeaderValue::from_str(&self.http.server_name).map_err(|_| {
            StartupError::Invalid(format!(
                "http.server_name is not a valid header value: {}",
                self.http.server_name
            ))
        })?;
        for header in &self.http.headers {
            HeaderName::from_bytes(header.name.as_bytes()).map_err(|_| {
                StartupError::Invalid(format!("invalid header name: {}", header.name))
            })?;
            HeaderValue::from_str(&header.value).map_err(|_| {
                StartupError::Invalid(format!(
                    "invalid value for header {}: {}",
                    header.name, header.value
                ))
            })?;
        }

        if !ACCESS_LOG_FORMATS.contains(&self.logging.access_log_format.as_str()) {
            return Err(StartupError::Invalid(format!(
                "logging.access_log_format must be one of {ACCESS_LOG_FORMATS:?}, got '{}'",
                self.logging.access_log_format
            )));
        }

        Ok(())
    }

    /// Package extension without a leading dot
    pub fn package_extension(&self) -> &str {
        self.package.extension.trim_start_matches('.')
    }
}

fn check_relative(field: &str, value: &str) -> Result<(), StartupError> {
    if is_safe_relative(value) {
        Ok(())
    } else {
        Err(StartupError::Invalid(format!(
            "{field} must be a relative path inside the root without '..': {value}"
        )))
    }
}

fn check_request_path(field: &str, value: &str) -> Result<(), StartupError> {
    if value.starts_with('/') {
        Ok(())
    } else {
        Err(StartupError::Invalid(format!(
            "{field} must start with '/': {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Config {
        toml::from_str(toml_src).expect("test config should parse")
    }

    fn base_toml() -> String {
        r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [site]
            root = "/srv/app"
            landing_page = "download.html"

            [package]
            extension = "apk"
            content_type = "application/vnd.android.package-archive"
            candidates = ["build/app-arm64.apk", "build/app.apk"]

            [http]
            server_name = "apk-drop"

            [logging]
            access_log = true

            [performance]
            keep_alive = true
            read_timeout = 30
            write_timeout = 30
        "#
        .to_string()
    }

    #[test]
    fn test_minimal_config_is_valid() {
        let cfg = parse(&base_toml());
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.site.index_files, vec!["index.html", "index.htm"]);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.package.download_filename.is_none());
    }

    #[test]
    fn test_pages_and_headers_keep_declaration_order() {
        let src = base_toml()
            + r#"
            [[site.pages]]
            path = "/old"
            file = "download.html"

            [[http.headers]]
            name = "Cache-Control"
            value = "no-store, no-cache, must-revalidate"

            [[http.headers]]
            name = "Access-Control-Allow-Methods"
            value = "GET, OPTIONS"
        "#;
        let cfg = parse(&src);
        assert!(cfg.validate().is_ok());
        assert_eq!(
            cfg.site.pages,
            vec![PageAlias {
                path: "/old".to_string(),
                file: "download.html".to_string()
            }]
        );
        assert_eq!(cfg.http.headers[0].name, "Cache-Control");
        assert_eq!(cfg.http.headers[1].value, "GET, OPTIONS");
    }

    #[test]
    fn test_rejects_escaping_candidate() {
        let mut cfg = parse(&base_toml());
        cfg.package.candidates.push("../secret.apk".to_string());
        assert!(matches!(cfg.validate(), Err(StartupError::Invalid(_))));
    }

    #[test]
    fn test_rejects_absolute_landing_page() {
        let mut cfg = parse(&base_toml());
        cfg.site.landing_page = "/etc/passwd".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_candidate_list() {
        let mut cfg = parse(&base_toml());
        cfg.package.candidates.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_header_name() {
        let mut cfg = parse(&base_toml());
        cfg.http.headers.push(HeaderOverride {
            name: "Bad Header".to_string(),
            value: "x".to_string(),
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_quoted_download_filename() {
        let mut cfg = parse(&base_toml());
        cfg.package.download_filename = Some("evil\".apk".to_string());
        assert!(cfg.validate().is_err());
        cfg.package.download_filename = Some("HFC-App-v1.10.1.apk".to_string());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let mut cfg = parse(&base_toml());
        cfg.logging.access_log_format = "$remote_addr".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_extension_leading_dot_is_ignored() {
        let mut cfg = parse(&base_toml());
        cfg.package.extension = ".apk".to_string();
        assert_eq!(cfg.package_extension(), "apk");
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let cfg = Config::load_from("definitely-not-a-config-file-for-tests").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.package.candidates, DEFAULT_CANDIDATES.to_vec());
        assert_eq!(cfg.package.download_paths, vec!["/app-release.apk"]);
        assert_eq!(cfg.package.content_type, APK_CONTENT_TYPE);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apk-drop.toml");
        std::fs::write(
            &path,
            r#"
                [server]
                port = 9191

                [package]
                candidates = ["out/app.apk"]
                download_filename = "MyApp-v2.apk"
            "#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9191);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.package.candidates, vec!["out/app.apk"]);
        assert_eq!(cfg.package.download_filename.as_deref(), Some("MyApp-v2.apk"));
    }

    #[test]
    fn test_shipped_configs_are_valid() {
        let shipped = [
            include_str!("../../configs/arch-fallback.toml"),
            include_str!("../../configs/versioned-download.toml"),
            include_str!("../../configs/dual-release.toml"),
        ];
        for src in shipped {
            let cfg = parse(src);
            assert!(cfg.validate().is_ok(), "{src}");
        }

        let arch = parse(shipped[0]);
        assert_eq!(arch.package.candidates, DEFAULT_CANDIDATES.to_vec());

        let dual = parse(shipped[2]);
        assert!(!dual.package.match_extension);
        assert_eq!(dual.site.pages[0].path, "/old");
    }
}

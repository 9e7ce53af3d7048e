use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub stream: StreamConfig,
    pub logging: LoggingConfig,
    pub products: ProductsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 8080,
        }
    }
}

/// Upstream fetch configuration shared by every pipeline instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL that each frame's relative path is resolved against
    pub base_url: String,
    /// Timeout for the single feed request
    pub feed_timeout_seconds: u64,
    /// Timeout for each per-frame download
    pub frame_timeout_seconds: u64,
    /// Upper bound on simultaneously in-flight frame downloads
    pub max_concurrent_fetches: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://services.swpc.noaa.gov/".to_string(),
            feed_timeout_seconds: 10,
            frame_timeout_seconds: 10,
            max_concurrent_fetches: 10,
        }
    }
}

impl UpstreamConfig {
    #[must_use]
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_seconds)
    }

    #[must_use]
    pub fn frame_timeout(&self) -> Duration {
        Duration::from_secs(self.frame_timeout_seconds)
    }
}

/// Playback configuration for stream sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Pause between emitted frames, in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 150,
        }
    }
}

impl StreamConfig {
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// One streamable animation product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    /// URL path segment the product is served under
    pub slug: String,
    /// Upstream feed URL describing the product's frames
    pub feed_url: String,
    /// Human-readable name used in diagnostics ("no frames available for <label>")
    pub label: String,
    /// Treat element 0 of the feed array as a header row, not a frame
    #[serde(default)]
    pub skip_header: bool,
}

/// Configured animation products
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductsConfig {
    pub products: Vec<ProductConfig>,
}

impl Default for ProductsConfig {
    fn default() -> Self {
        // The four NOAA SWPC animation products. Their feeds are plain
        // arrays of frame objects, so no header skip.
        Self {
            products: vec![
                ProductConfig {
                    slug: "lasco-c3".to_string(),
                    feed_url: "https://services.swpc.noaa.gov/products/animations/lasco-c3.json"
                        .to_string(),
                    label: "LASCO C3".to_string(),
                    skip_header: false,
                },
                ProductConfig {
                    slug: "lasco-c2".to_string(),
                    feed_url: "https://services.swpc.noaa.gov/products/animations/lasco-c2.json"
                        .to_string(),
                    label: "LASCO C2".to_string(),
                    skip_header: false,
                },
                ProductConfig {
                    slug: "aurora".to_string(),
                    feed_url:
                        "https://services.swpc.noaa.gov/products/animations/ovation_north_24h.json"
                            .to_string(),
                    label: "AURORA".to_string(),
                    skip_header: false,
                },
                ProductConfig {
                    slug: "wsa-enlil".to_string(),
                    feed_url: "https://services.swpc.noaa.gov/products/animations/enlil.json"
                        .to_string(),
                    label: "WSA-ENLIL".to_string(),
                    skip_header: false,
                },
            ],
        }
    }
}

impl Config {
    /// Load configuration from an optional file plus environment overrides
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // Override with environment variables (HELIOCAST_SERVER_HOST, etc.)
        builder = builder.add_source(
            Environment::with_prefix("HELIOCAST")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Validate configuration, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.upstream.base_url.is_empty() {
            errors.push("upstream.base_url must not be empty".to_string());
        }
        if url::Url::parse(&self.upstream.base_url).is_err() {
            errors.push(format!(
                "upstream.base_url is not a valid URL: {}",
                self.upstream.base_url
            ));
        }
        if self.upstream.max_concurrent_fetches == 0 {
            errors.push("upstream.max_concurrent_fetches must be at least 1".to_string());
        }
        if self.products.products.is_empty() {
            errors.push("products must not be empty".to_string());
        }
        for product in &self.products.products {
            if product.slug.is_empty() {
                errors.push("product slug must not be empty".to_string());
            }
            if url::Url::parse(&product.feed_url).is_err() {
                errors.push(format!(
                    "product '{}' feed_url is not a valid URL: {}",
                    product.slug, product.feed_url
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get HTTP address
    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}

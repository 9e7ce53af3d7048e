mod http;
mod server;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use heliocast_core::{logging, Config};

use server::HeliocastServer;

/// Space weather animation streaming server
#[derive(Debug, Parser)]
#[command(name = "heliocast", version, about)]
struct Cli {
    /// Path to the configuration file (YAML)
    #[arg(short, long, env = "HELIOCAST_CONFIG_PATH")]
    config: Option<String>,
}

/// Load configuration from the CLI path, `./config.yaml`, or environment
/// variables only, in that order.
fn load_config(explicit: Option<&str>) -> Config {
    let config_path = explicit
        .map(str::to_string)
        .filter(|p| std::path::Path::new(p).exists())
        .or_else(|| {
            let cwd = "config.yaml";
            std::path::Path::new(cwd).exists().then(|| cwd.to_string())
        });

    if let Some(path) = config_path {
        eprintln!("Loading config from {path}");
        match Config::from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to load {path}: {e}");
                eprintln!("Falling back to environment variables");
                Config::from_env().unwrap_or_default()
            }
        }
    } else {
        Config::from_env().unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}");
            eprintln!("Using default configuration");
            Config::default()
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref());

    // Fail fast on misconfigurations
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    logging::init_logging(&config.logging)?;
    info!("Heliocast server starting...");
    info!("HTTP address: {}", config.http_address());

    let server = HeliocastServer::new(config);
    server.start().await
}

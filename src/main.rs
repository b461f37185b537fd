mod cli;

use podserve::{catalog, config, server::Server};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::io::Write;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn apply_overrides(
    config: &mut config::Config,
    dir: Option<PathBuf>,
    base_url: Option<String>,
) {
    if let Some(dir) = dir {
        config.feed.root = dir;
    }
    if let Some(base_url) = base_url {
        config.feed.external_url = base_url;
    }
}

async fn start_server(config: config::Config) -> Result<()> {
    tracing::info!("Starting podserve");

    let server = Server::bind(&config).await?;
    server.run(CancellationToken::new()).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "podserve=debug,tower_http=debug".to_string()
        } else {
            "podserve=info,tower_http=warn".to_string()
        }
    });

    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(&env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(&env_filter)
            .init();
    }

    match cli.command {
        Commands::Serve {
            host,
            port,
            dir,
            base_url,
        } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;
            apply_overrides(&mut config, dir, base_url);
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config::validate_config(&config)?;

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(config))
                .inspect_err(|e| tracing::error!("{:#}", e))
        }
        Commands::Feed { dir, base_url } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;
            apply_overrides(&mut config, dir, base_url);
            config::validate_config(&config)?;
            print_feed(&config)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("podserve {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn print_feed(config: &config::Config) -> Result<()> {
    let metadata = config.metadata();
    let snapshot = catalog::build(&metadata)
        .with_context(|| format!("Failed to build catalog from {:?}", metadata.local_root()))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(snapshot.feed())?;
    stdout.flush()?;
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Media directory: {:?}", config.feed.root);
            println!("  External URL: {}", config.metadata().external_url());
            println!("  Refresh interval: {}s", config.feed.refresh_interval_secs);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Media directory: {:?}", config.feed.root);
        }
    }

    Ok(())
}

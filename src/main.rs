//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `ipinfo` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use ipinfo::config::{Command, Opt};
use ipinfo::initialization::{init_logger_with, init_resolver};
use ipinfo::{parse_asn, shutdown_gracefully, Config, GeoIpManager, LookupService};

#[tokio::main]
async fn main() -> Result<()> {
    // GEOIPUPDATE_* credentials usually live in a .env file next to the databases
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();
    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = opt.apply(Config::from_env());
    let resolver = if config.reverse_dns {
        Some(init_resolver().context("Failed to initialize DNS resolver")?)
    } else {
        None
    };

    let manager = match GeoIpManager::open(config.clone()).await {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("ipinfo error: {:#}", anyhow::Error::from(e));
            process::exit(1);
        }
    };
    let lookups = LookupService::new(manager.store(), resolver, config.cache_ttl);

    let exit_code = match opt.command {
        Command::Lookup { ip } => match lookups.lookup_ip(ip).await {
            Some(record) => {
                println!("{}", serde_json::to_string_pretty(&record)?);
                0
            }
            None => {
                eprintln!("ipinfo error: could not retrieve data for {ip}");
                1
            }
        },
        Command::Asn { asn } => {
            let asn = parse_asn(&asn)?;
            match lookups.lookup_asn(asn) {
                Ok(response) => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                    0
                }
                Err(e) => {
                    eprintln!("ipinfo error: {e}");
                    1
                }
            }
        }
        Command::Serve => {
            let cancel = CancellationToken::new();
            let refresh = match manager.start_background_refresh(cancel, config.update_interval) {
                Ok(task) => Some(task),
                Err(e) => {
                    log::warn!("{e}; serving the current databases without updates");
                    None
                }
            };
            if let Some(info) = manager.info() {
                log::info!(
                    "Ready: {} / {} (press Ctrl-C to stop)",
                    info.city.version(),
                    info.asn.version()
                );
            }

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            log::info!("Shutting down");
            shutdown_gracefully(refresh, &manager).await;
            return Ok(());
        }
    };

    manager.close();
    if exit_code != 0 {
        process::exit(exit_code);
    }
    Ok(())
}

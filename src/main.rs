use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;

use backoffice::config::Config;
use backoffice::{logger, BackupService, LocalStorage};

fn print_usage() {
    eprintln!("Usage: backoffice <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  export [FILE]    Write a backup archive to FILE (stdout if omitted)");
    eprintln!("  restore FILE     Restore the store from a backup archive");
    eprintln!("  init-config      Generate a default configuration file");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    logger::init(&config.logging)?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("export") => {
            let service = open_service(&config).await?;
            let archive = service.export().await?;
            let json = serde_json::to_string_pretty(&archive)?;
            match args.next() {
                Some(path) => {
                    std::fs::write(&path, json).with_context(|| format!("Failed to write archive: {path}"))?;
                    println!("Archive written to {path}");
                }
                None => println!("{json}"),
            }
        }
        Some("restore") => {
            let Some(path) = args.next() else {
                print_usage();
                anyhow::bail!("restore requires an archive file");
            };
            let content =
                std::fs::read_to_string(&path).with_context(|| format!("Failed to read archive: {path}"))?;
            let payload = serde_json::from_str(&content).with_context(|| format!("Archive is not valid JSON: {path}"))?;

            let service = open_service(&config).await?;
            let report = service.restore(payload).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Some("init-config") => {
            Config::generate_default_config(Config::get_default_config_path()?)?;
        }
        _ => print_usage(),
    }

    Ok(())
}

async fn open_service(config: &Config) -> Result<BackupService> {
    let storage = LocalStorage::open(&config.database).await?;
    Ok(BackupService::new(Arc::new(Mutex::new(storage))))
}

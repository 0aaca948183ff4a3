use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use database::TracingObserver;
use savegame::{ErrorResponse, ProfileService, ServiceConfig};
use serde_json::Value;
use types::ExternalIdentity;

#[derive(Parser, Debug)]
struct Params {
    /// SQLite file or `sqlite:` URL; falls back to DATABASE_URL, then the config file.
    #[arg(long)]
    database_url: Option<String>,

    /// YAML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    identity: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the player profile with every slot, creating the player on first use.
    Profile,
    /// Print the payload stored in one slot.
    Load {
        #[arg(long)]
        index: String,
    },
    /// Store a JSON object in one slot and print the refreshed profile.
    Save {
        #[arg(long)]
        index: String,
        #[arg(long)]
        data: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let config = match &args.config {
        Some(path) => match ServiceConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::from(2);
            }
        },
        None => ServiceConfig::default(),
    };

    let db_config = config.database_config(args.database_url.clone());
    log::info!("database: {}", db_config.url);
    let service = match ProfileService::connect(&db_config, config.retry_policy()).await {
        Ok(service) => service.with_observer(Arc::new(TracingObserver)),
        Err(e) => {
            log::error!("{e}");
            return ExitCode::from(2);
        }
    };

    let identity = ExternalIdentity::new(args.identity);
    let result = match args.command {
        Command::Profile => service
            .get_profile(&identity)
            .await
            .and_then(|snapshot| serde_json::to_value(snapshot).map_err(Into::into)),
        Command::Load { index } => service
            .load_slot(&identity, &Value::String(index))
            .await
            .map(|payload| payload.into_value()),
        Command::Save { index, data } => {
            let raw_payload = serde_json::from_str(&data).unwrap_or(Value::String(data));
            service
                .save_slot(&identity, &Value::String(index), Some(&raw_payload))
                .await
                .and_then(|snapshot| serde_json::to_value(snapshot).map_err(Into::into))
        }
    };

    match result {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(e) => {
            let response = ErrorResponse::from(&e);
            log::warn!("request failed with status {}: {e}", response.status);
            println!(
                "{}",
                serde_json::to_string_pretty(&response).unwrap_or_default()
            );
            ExitCode::FAILURE
        }
    }
}

//! `qbusiness-provider`: run one CloudFormation lifecycle action for a
//! QBusiness resource and print the resulting progress event as JSON.
//!
//! Exit codes: 0 for SUCCESS or IN_PROGRESS, 1 for FAILED, 2 for usage and
//! I/O errors.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{debug, LevelFilter};
use qbusiness_provider_common::config::CONFIG_ENV_VAR;
use qbusiness_provider_common::{
    Action, CallbackContext, OperationStatus, ProgressEvent, ProviderConfig,
};
use qbusiness_provider_handlers::{dispatch, HandlerContext, ResourceType, SdkQBusinessClient};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const STDIN_PATH: &str = "-";

#[derive(Parser, Debug)]
#[command(
    name = "qbusiness-provider",
    version,
    about = "Invoke QBusiness CloudFormation resource handlers",
    long_about = None
)]
struct Cli {
    /// Resource type, e.g. AWS::QBusiness::Index
    #[arg(value_parser = parse_resource_type)]
    resource_type: ResourceType,

    /// Lifecycle action: create, read, update, delete or list
    #[arg(value_parser = parse_action)]
    action: Action,

    /// Handler request JSON file, or '-' for stdin
    #[arg(long, default_value = STDIN_PATH)]
    request: PathBuf,

    /// Callback context JSON returned by a previous IN_PROGRESS event
    #[arg(long)]
    callback_context: Option<PathBuf>,

    /// Provider configuration (TOML)
    #[arg(long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_resource_type(value: &str) -> Result<ResourceType, String> {
    value.parse().map_err(|e: qbusiness_provider_common::ProviderError| e.to_string())
}

fn parse_action(value: &str) -> Result<Action, String> {
    value.parse().map_err(|e: qbusiness_provider_common::ProviderError| e.to_string())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, when set, takes precedence over -v.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

fn read_json(path: &Path) -> Result<Value> {
    let content = if path == Path::new(STDIN_PATH) {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))
}

async fn run(cli: Cli) -> Result<ProgressEvent<Value>> {
    let config = match &cli.config {
        Some(path) => ProviderConfig::load(path)?,
        None => ProviderConfig::default(),
    };
    let request = read_json(&cli.request)?;
    let callback = match &cli.callback_context {
        Some(path) => serde_json::from_value::<CallbackContext>(read_json(path)?)
            .context("Invalid callback context")?,
        None => CallbackContext::default(),
    };

    let region = config.region.clone().or_else(|| {
        request
            .get("region")
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    debug!(
        "Invoking {} {} (region: {})",
        cli.resource_type,
        cli.action,
        region.as_deref().unwrap_or("from environment")
    );
    let client = SdkQBusinessClient::from_env(region).await;
    let ctx = HandlerContext::new(&client, &config);

    let event = dispatch(&ctx, cli.resource_type, cli.action, request, callback).await?;
    Ok(event)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(event) => {
            match serde_json::to_string_pretty(&event) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error: failed to serialize progress event: {e}");
                    return ExitCode::from(2);
                }
            }
            if event.status == OperationStatus::Failed {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

//! config command - Show or update the stored connection profile
//!
//! The profile fills in whatever the environment leaves unset. Secrets are
//! never printed.

use clap::{Args, Subcommand};
use serde::Serialize;
use sm_core::{Config, ConfigManager, StorageProfile};

use super::Context;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the config file location and stored profile
    Show,

    /// Store connection settings in the config file
    Set(SetArgs),
}

/// Values to store; omitted flags keep their current value
#[derive(Args, Debug, Default)]
pub struct SetArgs {
    /// Endpoint host or URL (e.g. nyc3.digitaloceanspaces.com)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Access key
    #[arg(long)]
    pub access_key: Option<String>,

    /// Secret key
    #[arg(long)]
    pub secret_key: Option<String>,

    /// Bucket (Space) name
    #[arg(long)]
    pub bucket: Option<String>,

    /// Signing region
    #[arg(long)]
    pub region: Option<String>,

    /// Default number of operations in flight
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    path: String,
    endpoint: Option<String>,
    access_key: Option<String>,
    secret_key_set: bool,
    bucket: Option<String>,
    region: String,
    concurrency: usize,
}

impl ShowOutput {
    fn new(path: String, config: &Config) -> Self {
        let storage = config.storage.clone().unwrap_or_default();
        Self {
            path,
            endpoint: storage.endpoint,
            access_key: storage.access_key,
            secret_key_set: storage.secret_key.is_some_and(|s| !s.is_empty()),
            bucket: storage.bucket,
            region: storage.region.unwrap_or_else(|| config.defaults.region.clone()),
            concurrency: config.defaults.concurrency,
        }
    }
}

/// Execute a config subcommand
pub fn execute(cmd: ConfigCommands, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let manager = match ConfigManager::new() {
        Ok(m) => m,
        Err(e) => return formatter.fail("Failed to locate config", &e),
    };
    let mut config = match manager.load() {
        Ok(c) => c,
        Err(e) => return formatter.fail("Failed to load config", &e),
    };

    match cmd {
        ConfigCommands::Show => {
            show(&formatter, &manager, &config);
            ExitCode::Success
        }
        ConfigCommands::Set(args) => {
            if let Err(e) = apply(&mut config, args) {
                return formatter.fail("Invalid setting", &e);
            }
            if let Err(e) = manager.save(&config) {
                return formatter.fail("Failed to save config", &e);
            }
            formatter.success(&format!(
                "Saved profile to {}",
                manager.config_path().display()
            ));
            ExitCode::Success
        }
    }
}

fn show(formatter: &Formatter, manager: &ConfigManager, config: &Config) {
    let output = ShowOutput::new(manager.config_path().display().to_string(), config);
    if formatter.is_json() {
        formatter.json(&output);
        return;
    }

    let unset = || "(unset)".to_string();
    formatter.println(&format!("Config file: {}", output.path));
    formatter.println(&format!("Endpoint:    {}", output.endpoint.unwrap_or_else(unset)));
    formatter.println(&format!("Access key:  {}", output.access_key.unwrap_or_else(unset)));
    formatter.println(&format!(
        "Secret key:  {}",
        if output.secret_key_set { "(set)" } else { "(unset)" }
    ));
    formatter.println(&format!("Bucket:      {}", output.bucket.unwrap_or_else(unset)));
    formatter.println(&format!("Region:      {}", output.region));
    formatter.println(&format!("Concurrency: {}", output.concurrency));
}

fn apply(config: &mut Config, args: SetArgs) -> sm_core::Result<()> {
    let storage = config.storage.get_or_insert_with(StorageProfile::default);

    if let Some(endpoint) = args.endpoint {
        storage.endpoint = Some(sm_core::config::normalize_endpoint(&endpoint)?);
    }
    if args.access_key.is_some() {
        storage.access_key = args.access_key;
    }
    if args.secret_key.is_some() {
        storage.secret_key = args.secret_key;
    }
    if args.bucket.is_some() {
        storage.bucket = args.bucket;
    }
    if args.region.is_some() {
        storage.region = args.region;
    }
    if let Some(concurrency) = args.concurrency {
        config.defaults.concurrency = concurrency as usize;
    }
    Ok(())
}

//! CLI command definitions and execution
//!
//! One subcommand per folder operation. Every command resolves its
//! connection settings the same way: environment variables first, then the
//! config file, then the `--bucket` / `--concurrency` overrides.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sm_core::{ConfigManager, EnvKeys, SpacesConfig, SpacesManager};
use sm_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod completions;
mod config;
mod download;
mod edit;
mod ls;
mod rm;
mod transfer;
mod upload;

/// spaces - folder operations for S3-compatible object storage
///
/// Upload, download, copy, move, remove and edit whole prefixes of a
/// DigitalOcean Space or any other S3-compatible bucket.
#[derive(Parser, Debug)]
#[command(name = "spaces")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Log every object touched
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Maximum number of operations in flight
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: Option<u32>,

    /// Bucket to operate on, overriding BUCKET and the config file
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a file or a directory tree
    Upload(upload::UploadArgs),

    /// List objects and folders under a prefix
    Ls(ls::LsArgs),

    /// Remove objects under a prefix
    Rm(rm::RmArgs),

    /// Copy objects within the bucket
    Cp(transfer::TransferArgs),

    /// Move objects within the bucket (copy + delete)
    Mv(transfer::TransferArgs),

    /// Download an object or every object under a prefix
    Download(download::DownloadArgs),

    /// Change the ACL or headers of existing objects
    Edit(edit::EditArgs),

    /// Show or update the stored connection profile
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputConfig,
    pub bucket: Option<String>,
    pub concurrency: Option<usize>,
}

impl Context {
    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.output)
    }

    /// Resolve configuration and build a manager over the S3 client
    pub async fn manager(&self) -> sm_core::Result<SpacesManager> {
        let file = ConfigManager::new()?.load()?;
        let mut config =
            SpacesConfig::resolve(&file, &EnvKeys::default(), |name| std::env::var(name).ok())?;

        if let Some(bucket) = &self.bucket {
            config = config.with_bucket(bucket.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }

        tracing::debug!(config = ?config, "Resolved configuration");
        let client = S3Client::new(&config).await?;
        Ok(SpacesManager::new(Arc::new(client), config.concurrency))
    }
}

/// Build the manager or report why it could not be built
pub(crate) async fn connect(ctx: &Context, formatter: &Formatter) -> Result<SpacesManager, ExitCode> {
    ctx.manager()
        .await
        .map_err(|e| formatter.fail("Failed to configure client", &e))
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let ctx = Context {
        output: OutputConfig {
            json: cli.json,
            no_color: cli.no_color,
            quiet: cli.quiet,
        },
        bucket: cli.bucket,
        concurrency: cli.concurrency.map(|c| c as usize),
    };

    match cli.command {
        Commands::Upload(args) => upload::execute(args, &ctx).await,
        Commands::Ls(args) => ls::execute(args, &ctx).await,
        Commands::Rm(args) => rm::execute(args, &ctx).await,
        Commands::Cp(args) => transfer::execute(args, transfer::Mode::Copy, &ctx).await,
        Commands::Mv(args) => transfer::execute(args, transfer::Mode::Move, &ctx).await,
        Commands::Download(args) => download::execute(args, &ctx).await,
        Commands::Edit(args) => edit::execute(args, &ctx).await,
        Commands::Config(cmd) => config::execute(cmd, &ctx),
        Commands::Completions(args) => completions::execute(args),
    }
}

//! download command - Download an object or a whole prefix

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use sm_core::DownloadOptions;

use super::{Context, connect};
use crate::exit_code::ExitCode;
use crate::output::Spinner;

/// Download objects
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Object key, or a prefix ending in `/`
    pub remote: String,

    /// Local file or directory (defaults to the current directory)
    pub local: Option<PathBuf>,

    /// Download every key under the remote path
    #[arg(short, long)]
    pub recursive: bool,

    /// Replace local files that already exist
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Debug, Serialize)]
struct DownloadOutput {
    downloaded: Vec<PathBuf>,
    skipped: Vec<PathBuf>,
    total_bytes: u64,
    total_size_human: String,
}

/// Execute the download command
pub async fn execute(args: DownloadArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let manager = match connect(ctx, &formatter).await {
        Ok(m) => m,
        Err(code) => return code,
    };

    let options = DownloadOptions {
        overwrite: args.overwrite,
        recursive: args.recursive,
    };

    let spinner = Spinner::start(formatter.config(), &format!("Downloading {}", args.remote));
    let result = manager
        .download_object(&args.remote, args.local.as_deref(), &options)
        .await;
    spinner.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => return formatter.fail("Download failed", &e),
    };

    let size = humansize::format_size(summary.bytes, humansize::BINARY);
    if formatter.is_json() {
        formatter.json(&DownloadOutput {
            total_bytes: summary.bytes,
            total_size_human: size,
            downloaded: summary.downloaded,
            skipped: summary.skipped,
        });
    } else {
        for path in &summary.skipped {
            formatter.warning(&format!("Skipped {} (already exists)", path.display()));
        }
        if summary.downloaded.is_empty() && summary.skipped.is_empty() {
            formatter.warning(&format!("No objects found under {}", args.remote));
        } else {
            formatter.success(&format!(
                "Downloaded {} file(s), {size}",
                summary.downloaded.len()
            ));
        }
    }

    ExitCode::Success
}

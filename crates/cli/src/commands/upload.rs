//! upload command - Upload a file or directory tree

use std::path::PathBuf;

use clap::Args;
use sm_core::{UploadOptions, UploadOutcome};

use super::{Context, connect};
use crate::exit_code::ExitCode;
use crate::output::Spinner;

/// Upload a local file or directory
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file or directory
    pub local: PathBuf,

    /// Remote key, or a prefix ending in `/` to keep the local file name
    pub remote: String,

    /// Upload a directory and everything below it
    #[arg(short, long)]
    pub recursive: bool,

    /// Make uploaded objects publicly readable
    #[arg(long)]
    pub public: bool,

    /// Leave objects that already exist untouched
    #[arg(long)]
    pub no_overwrite: bool,
}

impl UploadArgs {
    fn options(&self) -> UploadOptions {
        UploadOptions {
            public: self.public,
            overwrite: !self.no_overwrite,
        }
    }
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let is_dir = match tokio::fs::metadata(&args.local).await {
        Ok(meta) => meta.is_dir(),
        Err(e) => {
            formatter.error(&format!("Cannot read {}: {e}", args.local.display()));
            return ExitCode::UsageError;
        }
    };

    if is_dir && !args.recursive {
        formatter.error(&format!(
            "{} is a directory (use --recursive to upload it)",
            args.local.display()
        ));
        return ExitCode::UsageError;
    }

    let manager = match connect(ctx, &formatter).await {
        Ok(m) => m,
        Err(code) => return code,
    };
    let options = args.options();

    if is_dir {
        let spinner = Spinner::start(formatter.config(), &format!("Uploading {}", args.local.display()));
        let result = manager.upload_folder(&args.local, &args.remote, &options).await;
        spinner.finish_and_clear();

        match result {
            Ok(summary) => {
                if formatter.is_json() {
                    formatter.json(&summary);
                } else {
                    formatter.success(&format!(
                        "Uploaded {} file(s), skipped {} to {}",
                        summary.uploaded.len(),
                        summary.skipped.len(),
                        args.remote
                    ));
                }
                ExitCode::Success
            }
            Err(e) => formatter.fail("Upload failed", &e),
        }
    } else {
        match manager.upload_file(&args.local, &args.remote, &options).await {
            Ok(outcome) => {
                if formatter.is_json() {
                    formatter.json(&outcome);
                } else {
                    match &outcome {
                        UploadOutcome::Uploaded(key) => formatter.success(&format!(
                            "{} -> {key}",
                            args.local.display()
                        )),
                        UploadOutcome::Skipped(key) => {
                            formatter.warning(&format!("Skipped {key} (already exists)"))
                        }
                    }
                }
                ExitCode::Success
            }
            Err(e) => formatter.fail("Upload failed", &e),
        }
    }
}

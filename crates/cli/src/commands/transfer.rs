//! cp and mv commands - Server-side copy and move within the bucket
//!
//! A source ending in `/` is a folder: every key under it is re-rooted under
//! the target prefix. Any other source is a single key and the target is its
//! new full key.

use clap::Args;
use serde::Serialize;

use super::{Context, connect};
use crate::exit_code::ExitCode;

/// Copy or move objects
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Source key, or a prefix ending in `/`
    pub source: String,

    /// Destination key, or the prefix to place a folder under
    pub target: String,

    /// Include keys in nested folders
    #[arg(short, long)]
    pub recursive: bool,
}

/// Whether the source is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Copy,
    Move,
}

impl Mode {
    const fn verb(self) -> &'static str {
        match self {
            Mode::Copy => "Copied",
            Mode::Move => "Moved",
        }
    }
}

#[derive(Debug, Serialize)]
struct TransferOutput<'a> {
    operation: Mode,
    source: &'a str,
    target: &'a str,
    count: usize,
}

/// Execute the cp or mv command
pub async fn execute(args: TransferArgs, mode: Mode, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let manager = match connect(ctx, &formatter).await {
        Ok(m) => m,
        Err(code) => return code,
    };

    let result = match mode {
        Mode::Copy => {
            manager
                .copy_object(&args.source, &args.target, args.recursive)
                .await
        }
        Mode::Move => {
            manager
                .move_object(&args.source, &args.target, args.recursive)
                .await
        }
    };

    match result {
        Ok(count) => {
            if formatter.is_json() {
                formatter.json(&TransferOutput {
                    operation: mode,
                    source: &args.source,
                    target: &args.target,
                    count,
                });
            } else if count == 0 {
                formatter.warning(&format!("No objects found under {}", args.source));
            } else {
                formatter.success(&format!(
                    "{} {count} object(s) from {} to {}",
                    mode.verb(),
                    args.source,
                    args.target
                ));
            }
            ExitCode::Success
        }
        Err(e) => match mode {
            Mode::Copy => formatter.fail("Copy failed", &e),
            // Keys handled before the failure are already at the target
            Mode::Move => formatter.fail("Move stopped part-way", &e),
        },
    }
}

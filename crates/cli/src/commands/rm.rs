//! rm command - Remove objects
//!
//! Deletes every key under a prefix, one request per key. Without
//! `--recursive` only direct children of the prefix are removed. Matching
//! is by prefix, so `rm docs/a.txt` also removes `docs/a.txt.bak`.

use clap::Args;
use serde::Serialize;

use super::{Context, connect};
use crate::exit_code::ExitCode;

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Key or prefix to remove. A bare key also matches every longer key
    /// that starts with it (`docs/a.txt` removes `docs/a.txt.bak` too)
    pub prefix: String,

    /// Also remove keys in nested folders
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Debug, Serialize)]
struct RmOutput<'a> {
    prefix: &'a str,
    deleted: usize,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    if args.prefix.is_empty() {
        formatter.error("Refusing to remove the whole bucket without a prefix");
        return ExitCode::UsageError;
    }

    let manager = match connect(ctx, &formatter).await {
        Ok(m) => m,
        Err(code) => return code,
    };

    match manager.remove_object(&args.prefix, args.recursive).await {
        Ok(deleted) => {
            if formatter.is_json() {
                formatter.json(&RmOutput {
                    prefix: &args.prefix,
                    deleted,
                });
            } else if deleted == 0 {
                formatter.warning(&format!("No objects found under {}", args.prefix));
            } else {
                formatter.success(&format!("Removed {deleted} object(s)."));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail("Remove failed", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Cli;
    use clap::CommandFactory;

    #[test]
    fn test_rm_help_warns_about_prefix_matching() {
        let cmd = Cli::command();
        let rm = cmd.find_subcommand("rm").unwrap();
        let prefix = rm
            .get_arguments()
            .find(|arg| arg.get_id() == "prefix")
            .unwrap();
        let help = prefix.get_help().unwrap().to_string();
        assert!(help.contains("also matches every longer key"), "{help}");
    }

    #[test]
    fn test_rm_output_json() {
        let json = serde_json::to_value(RmOutput {
            prefix: "test/",
            deleted: 3,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "prefix": "test/", "deleted": 3 }));
    }
}

//! ls command - List objects under a prefix
//!
//! Shallow listings show virtual folders first, then the direct-child keys.

use clap::Args;
use sm_core::Listing;

use super::{Context, connect};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// List objects
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Key prefix; empty lists the bucket root
    #[arg(default_value = "")]
    pub prefix: String,

    /// List every key below the prefix
    #[arg(short, long)]
    pub recursive: bool,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let manager = match connect(ctx, &formatter).await {
        Ok(m) => m,
        Err(code) => return code,
    };

    match manager.list_objects(&args.prefix, args.recursive).await {
        Ok(listing) => {
            print_listing(&formatter, &listing);
            ExitCode::Success
        }
        Err(e) => formatter.fail("Failed to list objects", &e),
    }
}

fn print_listing(formatter: &Formatter, listing: &Listing) {
    if formatter.is_json() {
        formatter.json(listing);
        return;
    }

    for line in human_lines(listing) {
        formatter.println(&line);
    }
}

fn human_lines(listing: &Listing) -> Vec<String> {
    listing
        .folders
        .iter()
        .map(|folder| format!("{:>6} {folder}", "PRE"))
        .chain(listing.files.iter().cloned())
        .collect()
}

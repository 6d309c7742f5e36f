//! edit command - Change the ACL or headers of existing objects

use std::collections::HashMap;

use clap::Args;
use serde::Serialize;
use sm_core::{Acl, MetadataEdit};

use super::{Context, connect};
use crate::exit_code::ExitCode;

/// Edit object ACL and metadata
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Object key, or a prefix ending in `/`
    pub key: String,

    /// Apply to every key under the given prefix
    #[arg(short, long)]
    pub recursive: bool,

    /// Canned ACL (private, public-read, ...)
    #[arg(long)]
    pub acl: Option<Acl>,

    /// Content-Type header
    #[arg(long)]
    pub content_type: Option<String>,

    /// Cache-Control header
    #[arg(long)]
    pub cache_control: Option<String>,

    /// Cache lifetime in seconds, sent as `max-age` unless --cache-control is set
    #[arg(long)]
    pub ttl: Option<u64>,

    /// User metadata entry, repeatable
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub meta: Vec<(String, String)>,
}

impl EditArgs {
    fn to_edit(&self) -> MetadataEdit {
        MetadataEdit {
            acl: self.acl,
            content_type: self.content_type.clone(),
            cache_control: self.cache_control.clone(),
            ttl: self.ttl,
            metadata: (!self.meta.is_empty())
                .then(|| self.meta.iter().cloned().collect::<HashMap<_, _>>()),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

#[derive(Debug, Serialize)]
struct EditOutput<'a> {
    key: &'a str,
    edited: usize,
}

/// Execute the edit command
pub async fn execute(args: EditArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let edit = args.to_edit();

    if edit == MetadataEdit::default() {
        formatter.error("Nothing to change (pass --acl, --content-type, --cache-control, --ttl or --meta)");
        return ExitCode::UsageError;
    }

    let manager = match connect(ctx, &formatter).await {
        Ok(m) => m,
        Err(code) => return code,
    };

    let result = if args.recursive || sm_core::path::is_folder(&args.key) {
        manager.edit_objects(&args.key, &edit).await
    } else {
        manager.edit_object(&args.key, &edit).await.map(|()| 1)
    };

    match result {
        Ok(edited) => {
            if formatter.is_json() {
                formatter.json(&EditOutput {
                    key: &args.key,
                    edited,
                });
            } else if edited == 0 {
                formatter.warning(&format!("No objects found under {}", args.key));
            } else {
                formatter.success(&format!("Updated {edited} object(s)."));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail("Edit failed", &e),
    }
}

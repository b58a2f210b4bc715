//! Scripted driver for [`lockfree_hashmap::LockFreeHashMap`]: applies a
//! sequence of insert/remove/lookup operations and prints the bucket dump.
//!
//! Operations are either passed inline (`--op insert:5 --op remove:3`) or
//! read one-per-line from a file (`--ops-file path`), each line formatted
//! as `insert:<key>`, `remove:<key>`, or `lookup:<key>`.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use lockfree_hashmap::LockFreeHashMap;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Apply a scripted sequence of ops to a lock-free hash map and print its dump")]
struct Cli {
    /// Number of buckets in the map.
    #[arg(long, default_value_t = 16)]
    buckets: usize,

    /// Repeatable operation of the form `insert:<key>`, `remove:<key>`,
    /// or `lookup:<key>`.
    #[arg(long = "op")]
    ops: Vec<String>,

    /// Newline-delimited file of operations, same syntax as `--op`.
    #[arg(long)]
    ops_file: Option<PathBuf>,
}

fn apply_op(map: &LockFreeHashMap, op: &str) -> Result<()> {
    let (kind, rest) = op
        .split_once(':')
        .with_context(|| format!("malformed operation {op:?}, expected \"<kind>:<key>\""))?;
    let key: i64 = rest
        .trim()
        .parse()
        .with_context(|| format!("malformed key in operation {op:?}"))?;
    match kind {
        "insert" => {
            map.insert(key);
            info!(key, "inserted");
        }
        "remove" => match map.remove(key) {
            Ok(()) => info!(key, "removed"),
            Err(e) => info!(key, error = %e, "remove failed"),
        },
        "lookup" => info!(key, found = map.lookup(key), "looked up"),
        other => bail!("unknown operation kind {other:?}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let map = LockFreeHashMap::new(cli.buckets)
        .map_err(anyhow::Error::from)
        .context("failed to allocate map")?;

    for op in &cli.ops {
        apply_op(&map, op)?;
    }
    if let Some(path) = &cli.ops_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading ops file {}", path.display()))?;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            apply_op(&map, line)?;
        }
    }

    print!("{}", map.dump());
    Ok(())
}

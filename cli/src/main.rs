//! `harmonia` command-line front end.
//!
//! ```bash
//! # Issue a preview token or full link
//! harmonia encode 550e8400-e29b-41d4-a716-446655440000 --expires-in-hours 72
//! harmonia link P0001
//!
//! # Resolve a link a client pasted
//! harmonia resolve "https://harmonia.example/preview/eyJpZCI6..."
//!
//! # Inspect the on-disk cache
//! harmonia cache set auth_hint '{"email":"a@b.c","lastSignInAt":0}'
//! harmonia cache sweep
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod error;

use error::CliError;

#[derive(Parser, Debug)]
#[command(name = "harmonia")]
#[command(about = "Preview links and client cache tools for the harmonIA portal")]
#[command(version)]
struct Args {
    /// Directory holding config.toml and the cache database
    #[arg(long, global = true, env = "HARMONIA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a project id into a preview token
    Encode {
        project_id: String,

        /// Pre-assigned short code, returned as the token unchanged
        #[arg(long)]
        short_code: Option<String>,

        /// Link lifetime in hours
        #[arg(long)]
        expires_in_hours: Option<u32>,
    },

    /// Decode a preview token into its project id
    Decode { token: String },

    /// Build a full preview URL with the configured base URL and lifetime
    Link { project_id: String },

    /// Resolve a preview URL or path into its project id
    Resolve { url: String },

    /// Inspect or edit the client cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Show or create config.toml
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Print the cached JSON value for a key
    Get { key: String },

    /// Cache a JSON value under a key
    Set {
        key: String,
        json: String,

        /// Expire the value after this many seconds
        #[arg(long)]
        ttl_secs: Option<u64>,

        /// Copy the value into every backend, not just the first that accepts it
        #[arg(long)]
        redundant: bool,
    },

    /// Remove a key from every backend
    Rm { key: String },

    /// Drop expired entries
    Sweep,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write the default configuration if none exists
    Init,
}

/// `--data-dir` / `HARMONIA_DATA_DIR`, else `$HOME/.local/share/harmonia`.
fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".local").join("share").join("harmonia"))
        .ok_or(CliError::NoDataDir)
}

fn run(args: Args) -> Result<commands::Output, CliError> {
    let context = || commands::Context::load(resolve_data_dir(args.data_dir.clone())?);

    match args.command {
        Command::Encode {
            project_id,
            short_code,
            expires_in_hours,
        } => commands::encode(&project_id, short_code, expires_in_hours),
        Command::Decode { token } => commands::decode(&token),
        Command::Link { project_id } => commands::link(&context()?, &project_id),
        Command::Resolve { url } => commands::resolve(&context()?, &url),
        Command::Cache(command) => {
            let ctx = context()?;
            match command {
                CacheCommand::Get { key } => commands::cache_get(&ctx, &key),
                CacheCommand::Set {
                    key,
                    json,
                    ttl_secs,
                    redundant,
                } => commands::cache_set(&ctx, &key, &json, ttl_secs, redundant),
                CacheCommand::Rm { key } => commands::cache_rm(&ctx, &key),
                CacheCommand::Sweep => commands::cache_sweep(&ctx),
            }
        }
        Command::Config(command) => {
            let ctx = context()?;
            match command {
                ConfigCommand::Show => commands::config_show(&ctx),
                ConfigCommand::Init => commands::config_init(&ctx),
            }
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Args::parse()) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

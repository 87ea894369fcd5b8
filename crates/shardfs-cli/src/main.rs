// shardfs - Tenant-sharded file storage driver
// Copyright (C) 2025 shardfs Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

mod commands;
mod output;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use shardfs_config::{ConfigLoader, DriverConfig};
use shardfs_observability::{init_tracing_with_config, verbosity_filter, LogConfig, LogFormat};
use shardfs_storage::{BackendGateway, Tenant};
use std::io;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "shardfs")]
#[command(version, about = "Tenant-sharded file storage on an HTTP object store")]
#[command(
    long_about = "shardfs stores files for many (account, app) tenants in one object store
namespace. Every tenant sees its own isolated tree; paths cannot escape it."
)]
#[command(propagate_version = true)]
#[command(author = "shardfs Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, YAML or JSON); SHARDFS_* variables override it
    #[arg(short, long, global = true, value_name = "FILE", env = "SHARDFS_CONFIG")]
    config: Option<PathBuf>,

    /// Account identifier of the tenant
    #[arg(long, global = true, env = "SHARDFS_ACCOUNT")]
    account: Option<String>,

    /// Application identifier of the tenant
    #[arg(long, global = true, env = "SHARDFS_APP")]
    app: Option<String>,

    /// More log output (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a folder and any missing parents
    Mkdir(MkdirCmd),

    /// List a folder
    Ls(LsCmd),

    /// Download a file
    Get(GetCmd),

    /// Upload a file
    Put(PutCmd),

    /// Copy a single file
    Cp(CpCmd),

    /// Move (rename) a single file
    Mv(MvCmd),

    /// Delete a file or an empty folder
    Rm(RmCmd),

    /// Start a multipart upload session
    Upload(UploadCmd),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::error(&format!("Error: {e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let config = load_config(cli.config.as_ref()).await?;
    init_logging(&config, cli.verbose, cli.quiet)?;

    let tenant = tenant(&cli)?;
    let driver = shardfs_storage::connect(&config)?;
    debug!(tenant = %tenant, "session ready");

    let session = Session::new(driver, tenant, cli.json);
    dispatch(cli.command, &session).await
}

async fn dispatch<G: BackendGateway>(command: Commands, session: &Session<G>) -> Result<()> {
    match command {
        Commands::Mkdir(cmd) => cmd.execute(session).await,
        Commands::Ls(cmd) => cmd.execute(session).await,
        Commands::Get(cmd) => cmd.execute(session).await,
        Commands::Put(cmd) => cmd.execute(session).await,
        Commands::Cp(cmd) => cmd.execute(session).await,
        Commands::Mv(cmd) => cmd.execute(session).await,
        Commands::Rm(cmd) => cmd.execute(session).await,
        Commands::Upload(cmd) => cmd.execute(session).await,
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

async fn load_config(path: Option<&PathBuf>) -> Result<DriverConfig> {
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader
            .load_with_overrides(path)
            .await
            .with_context(|| format!("cannot load configuration from {}", path.display())),
        None => loader
            .load_from_env()
            .context("no --config given and the SHARDFS_* environment is incomplete"),
    }
}

fn init_logging(config: &DriverConfig, verbose: u8, quiet: bool) -> Result<()> {
    let format: LogFormat = config.logging.format.parse()?;
    let mut log = LogConfig::new()
        .with_format(format)
        .with_color(console::colors_enabled_stderr());

    if let Some(filter) = verbosity_filter(verbose, quiet) {
        log = log.with_level(filter);
    } else if std::env::var_os("RUST_LOG").is_none() {
        log = log.with_level(config.logging.level.to_lowercase());
    }
    init_tracing_with_config(log)?;
    Ok(())
}

fn tenant(cli: &Cli) -> Result<Tenant> {
    let account = cli
        .account
        .as_deref()
        .ok_or_else(|| anyhow!("--account (or SHARDFS_ACCOUNT) is required"))?;
    let app = cli
        .app
        .as_deref()
        .ok_or_else(|| anyhow!("--app (or SHARDFS_APP) is required"))?;
    Ok(Tenant::new(account, app)?)
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "shardfs", &mut io::stdout());
}

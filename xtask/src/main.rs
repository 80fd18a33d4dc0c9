// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Asset tooling for Tessera projects.
// Run with: cargo xtask assets <command>

mod commands;
mod helpers;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", version, about = "Asset tooling for Tessera projects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Commands for the asset database
    Assets {
        #[command(subcommand)]
        command: AssetsCommand,
    },
}

#[derive(Subcommand)]
enum AssetsCommand {
    /// Register every asset that has a sidecar and list the ones without
    Scan(ProjectArgs),
    /// Import every registered asset and report failures
    Check(ProjectArgs),
    /// Import every writable asset and write it back in canonical form
    Resave(ProjectArgs),
}

#[derive(Args)]
struct ProjectArgs {
    /// Project root; `Tessera.toml` is read from here if present
    #[arg(long, default_value = ".")]
    project: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Assets { command } => match command {
            AssetsCommand::Scan(args) => commands::assets::scan(&args.project),
            AssetsCommand::Check(args) => commands::assets::check(&args.project),
            AssetsCommand::Resave(args) => commands::assets::resave(&args.project),
        },
    }
}

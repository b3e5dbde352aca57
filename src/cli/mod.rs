pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "noteful")]
#[command(about = "Noteful CLI - administration for the Noteful API store")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply database migrations to DATABASE_URL")]
    Migrate,

    #[command(about = "Load users, folders, tags and notes from a YAML fixture")]
    Seed {
        #[arg(help = "Path to the fixture file")]
        file: PathBuf,
    },

    #[command(about = "Verify credentials and print a bearer token")]
    Token {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Password")]
        password: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::AppConfig::from_env()?;

    match cli.command {
        Commands::Migrate => commands::migrate::handle(&config, output_format).await,
        Commands::Seed { file } => commands::seed::handle(config, &file, output_format).await,
        Commands::Token { username, password } => {
            commands::token::handle(config, &username, &password, output_format).await
        }
    }
}

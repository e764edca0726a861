//! `gridline` - serve, check and export configured tables

mod app;
mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gridline_settings::Settings;

use crate::app::App;
use crate::commands::ExportRequest;

#[derive(Debug, Parser)]
#[command(name = "gridline", version, about = "Tabular data server")]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, env = "GRIDLINE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// SQLite database, overrides `database.path`
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve {
        /// Listen address, overrides `server.bind`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Validate every table and detect its column types
    Check,
    /// Export a table to a file
    Export {
        table: String,
        /// csv, xlsx or pdf
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Output file or directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        order: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        settings.database.path = database;
    }
    let _logging = logging::init(&settings.logging)?;

    let app = App::build(&settings)?;
    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            commands::serve(&app, &bind).await
        }
        Command::Check => commands::print_checks(&commands::check(&app).await),
        Command::Export {
            table,
            format,
            output,
            search,
            sort,
            order,
        } => {
            let request = ExportRequest {
                search,
                sort,
                order,
            };
            let path = commands::export(&app, &table, &format, &request, &output).await?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

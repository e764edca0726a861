//! Command implementations

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;

use gridline_interchange::{ExportBody, ExportFormat};
use gridline_services::RawParams;

use crate::app::App;

pub async fn serve(app: &App, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    tracing::info!(addr = %listener.local_addr()?, tables = app.tables.len(), "HTTP server listening");

    axum::serve(listener, gridline_http::router(app.state()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("HTTP server received shutdown signal");
}

/// Outcome of checking one table
#[derive(Debug)]
pub struct TableCheck {
    pub name: String,
    pub result: Result<Vec<(String, Option<String>)>>,
}

/// Prepare every table (validation and type detection) against the database
pub async fn check(app: &App) -> Vec<TableCheck> {
    let mut checks = Vec::with_capacity(app.tables.len());
    for name in app.tables.names() {
        let result = match app.tables.get(name) {
            Ok(table) => app
                .service
                .prepare(table.as_ref())
                .await
                .map(|descriptor| {
                    descriptor
                        .columns()
                        .iter()
                        .map(|c| (c.name.clone(), c.datatype.clone()))
                        .collect()
                })
                .map_err(anyhow::Error::from),
            Err(e) => Err(e.into()),
        };
        checks.push(TableCheck {
            name: name.to_string(),
            result,
        });
    }
    checks
}

pub fn print_checks(checks: &[TableCheck]) -> Result<()> {
    let mut failed = 0;
    for check in checks {
        match &check.result {
            Ok(columns) => {
                println!("{}: ok", check.name);
                for (name, datatype) in columns {
                    println!("  {:<24} {}", name, datatype.as_deref().unwrap_or("-"));
                }
            }
            Err(e) => {
                failed += 1;
                println!("{}: FAILED {:#}", check.name, e);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} tables failed", failed, checks.len());
    }
    Ok(())
}

/// Search and sort options of an export
#[derive(Debug, Default, Clone)]
pub struct ExportRequest {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ExportRequest {
    fn to_raw(&self) -> RawParams {
        let mut raw = HashMap::new();
        let entries = [("search", &self.search), ("sort", &self.sort), ("order", &self.order)];
        for (key, value) in entries {
            if let Some(value) = value {
                raw.insert(key.to_string(), value.clone());
            }
        }
        raw
    }
}

/// Export `table` to a file. Returns the written path.
///
/// `output` may be a directory, in which case the generated filename is used.
pub async fn export(
    app: &App,
    table: &str,
    format: &str,
    request: &ExportRequest,
    output: &Path,
) -> Result<PathBuf> {
    let format: ExportFormat = format.parse()?;
    let definition = app.tables.get(table)?;
    let payload = app
        .exports
        .export(definition.as_ref(), &request.to_raw(), format)
        .await?;

    let path = if output.is_dir() {
        output.join(&payload.filename)
    } else {
        output.to_path_buf()
    };
    let mut file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    match payload.body {
        ExportBody::Bytes(bytes) => file.write_all(&bytes)?,
        ExportBody::Stream(mut stream) => {
            while let Some(chunk) = stream.next().await {
                file.write_all(&chunk?)?;
            }
        }
    }
    file.flush()?;

    tracing::info!(table = %table, path = %path.display(), "export written");
    Ok(path)
}

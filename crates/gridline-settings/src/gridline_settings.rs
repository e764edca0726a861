//! Gridline Settings
//!
//! Server settings loaded from a TOML file:
//! - Listener and database
//! - Logging
//! - Table defaults, export options, templates and the type cache
//! - Enum and table definitions

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use gridline_core::{EnumDefinition, EnumRegistry};
use gridline_interchange::{DelimitedOptions, DocumentOptions};
use gridline_services::{TableDefaults, TableDefinition, TableRegistry, TypeCacheConfig};

mod settings_file;

pub use settings_file::*;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub defaults: TableDefaults,
    pub export: ExportSettings,
    pub cache: TypeCacheConfig,
    pub templates: TemplateSettings,
    pub enums: Vec<EnumDefinition>,
    pub tables: Vec<TableDefinition>,
}

impl Settings {
    /// Load settings from `explicit`, `GRIDLINE_CONFIG` or the per-user file
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_value = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_from(&resolve_settings_path(explicit, env_value)?)
    }

    pub fn load_from(source: &SettingsSource) -> Result<Self> {
        let path = source.path();
        if !path.exists() {
            if source.is_required() {
                bail!("Settings file not found: {}", path.display());
            }
            tracing::info!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid settings file {:?}", path))?;
        tracing::info!(
            path = %path.display(),
            tables = settings.tables.len(),
            enums = settings.enums.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).context("Failed to parse settings TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    /// Structural checks that do not need a database.
    ///
    /// Column-level validation happens when a table is first rendered.
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            bail!("database.path must not be empty");
        }

        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.name.as_str()) {
                bail!("Table '{}' is defined more than once", table.name);
            }
        }

        let known: HashSet<&str> = self.enums.iter().map(|e| e.name.as_str()).collect();
        for table in &self.tables {
            for column in &table.columns {
                if let Some(enum_type) = column.enum_type.as_deref()
                    && !known.contains(enum_type)
                {
                    tracing::warn!(
                        table = %table.name,
                        column = ?column.name,
                        enum_type = %enum_type,
                        "column references an undefined enum, raw values will be shown"
                    );
                }
            }
        }
        Ok(())
    }

    pub fn enum_registry(&self) -> EnumRegistry {
        EnumRegistry::from_definitions(self.enums.iter().cloned())
    }

    pub fn table_registry(&self) -> TableRegistry {
        TableRegistry::from_definitions(self.tables.iter().cloned())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite database path (`:memory:` and `file:` URIs accepted)
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "gridline.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directives; `RUST_LOG` takes precedence
    pub filter: String,
    pub console: bool,
    /// Daily-rotated JSON log files
    pub json_files: bool,
    /// Defaults to the per-user data directory
    pub log_dir: Option<PathBuf>,
    pub include_location: bool,
    pub spans: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info,gridline_services=debug".to_string(),
            console: true,
            json_files: false,
            log_dir: None,
            include_location: cfg!(debug_assertions),
            spans: false,
        }
    }
}

impl LoggingSettings {
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .or_else(|| logs_dir().ok())
            .unwrap_or_else(|| PathBuf::from("logs"))
    }
}

/// Converter looked up on `PATH` when `export.converter` is unset
pub const DEFAULT_CONVERTER: &str = "wkhtmltopdf";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    pub delimited: DelimitedOptions,
    pub document: DocumentOptions,
    /// HTML-to-PDF converter reading stdin and writing stdout
    /// (`wkhtmltopdf` compatible flags).
    ///
    /// When unset, `wkhtmltopdf` is used if it is on `PATH`. Without any
    /// converter the `pdf` export delivers the rendered HTML document
    /// (`text/html`, `.html`) instead of a PDF.
    pub converter: Option<PathBuf>,
}

impl ExportSettings {
    /// The configured converter, else [`DEFAULT_CONVERTER`] found on `PATH`
    pub fn resolved_converter(&self) -> Option<PathBuf> {
        self.converter
            .clone()
            .or_else(|| find_converter(std::env::var_os("PATH")))
    }
}

fn find_converter(search_path: Option<OsString>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    which::which_in(DEFAULT_CONVERTER, search_path, cwd).ok()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateSettings {
    /// Extra templates, selectable by name through `defaults.templates`
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridline_interchange::{Delimiter, Orientation};
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
[server]
bind = "0.0.0.0:9000"

[database]
path = "/var/lib/gridline/app.db"

[logging]
filter = "debug"
json_files = true

[defaults]
page_size = 50
pagination = "knp"

[export.delimited]
delimiter = "comma"
batch_size = 1000

[export.document]
orientation = "portrait"

[cache]
ttl_secs = 600

[templates]
dir = "/etc/gridline/templates"

[[enums]]
name = "UserStatus"
cases = [{ value = "active", label = "Active" }, { value = "banned" }]

[[tables]]
name = "users"
source = { table = "users", alias = "u" }

[[tables.columns]]
name = "name"
label = "Name"

[[tables.columns]]
name = "status"
label = "Status"
enum_type = "UserStatus"
"#;

    #[test]
    fn test_parse_full_settings() {
        let settings = Settings::from_toml_str(SAMPLE).unwrap();

        assert_eq!(settings.server.bind, "0.0.0.0:9000");
        assert_eq!(settings.database.path, "/var/lib/gridline/app.db");
        assert!(settings.logging.json_files);
        assert!(settings.logging.console);
        assert_eq!(settings.defaults.page_size, 50);
        assert_eq!(settings.defaults.pagination, "knp");
        assert!(settings.defaults.searchable);
        assert_eq!(settings.export.delimited.delimiter, Delimiter::Comma);
        assert_eq!(settings.export.delimited.batch_size, 1000);
        assert!(settings.export.delimited.include_headers);
        assert_eq!(settings.export.document.orientation, Orientation::Portrait);
        assert_eq!(settings.export.document.page_size, "A4");
        assert_eq!(settings.export.converter, None);
        assert_eq!(settings.cache.ttl_secs, Some(600));
        assert_eq!(settings.cache.max_entries, 256);
        assert_eq!(
            settings.templates.dir.as_deref(),
            Some(Path::new("/etc/gridline/templates"))
        );

        assert_eq!(settings.enum_registry().len(), 1);
        let tables = settings.table_registry();
        assert_eq!(tables.names(), vec!["users"]);
        assert_eq!(settings.tables[0].columns.len(), 2);
    }

    #[test]
    fn test_configured_converter_takes_precedence() {
        let export = ExportSettings {
            converter: Some("/opt/bin/html2pdf".into()),
            ..ExportSettings::default()
        };
        assert_eq!(
            export.resolved_converter(),
            Some(PathBuf::from("/opt/bin/html2pdf"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_default_converter_found_on_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_converter(Some(dir.path().into())), None);

        let program = dir.path().join(DEFAULT_CONVERTER);
        std::fs::write(&program, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = find_converter(Some(dir.path().into())).unwrap();
        assert_eq!(found.file_name(), program.file_name());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.server.bind, "127.0.0.1:8080");
        assert_eq!(settings.defaults.page_size, 25);
    }

    #[test]
    fn test_duplicate_tables_rejected() {
        let content = r#"
[[tables]]
name = "users"
source = { table = "users" }

[[tables]]
name = "users"
source = { table = "accounts" }
"#;
        let err = Settings::from_toml_str(content).unwrap_err();
        assert!(err.to_string().contains("more than once"), "{}", err);
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let err = Settings::from_toml_str("[database]\npath = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("database.path"), "{}", err);
    }

    #[test]
    fn test_missing_required_file_is_error() {
        let source = SettingsSource::Explicit("/nonexistent/gridline.toml".into());
        assert!(Settings::load_from(&source).is_err());

        let optional = SettingsSource::UserDefault("/nonexistent/gridline.toml".into());
        assert_eq!(Settings::load_from(&optional).unwrap(), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gridline.toml");

        let mut settings = Settings::default();
        settings.server.bind = "127.0.0.1:3000".to_string();
        settings.save(&path).unwrap();

        let loaded = Settings::load_from(&SettingsSource::Explicit(path)).unwrap();
        assert_eq!(loaded.server.bind, "127.0.0.1:3000");
        assert_eq!(loaded.defaults, settings.defaults);
    }
}

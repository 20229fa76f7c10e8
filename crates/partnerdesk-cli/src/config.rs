// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use partnerdesk_db::{Backend, DEFAULT_MYSQL_PORT, MySqlOptions, StoreTarget};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MYSQL_HOST: &str = "localhost";
const DEFAULT_MYSQL_USER: &str = "root";
const DEFAULT_MYSQL_DATABASE: &str = "zafir";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            database: Database::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Database {
    pub backend: Option<String>,
    pub path: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub enabled: Option<bool>,
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            path: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("PARTNERDESK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set PARTNERDESK_CONFIG_PATH to the config file"
            )
        })?;

        let app_dir = config_root.join(partnerdesk_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put settings under [database] and [logging]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let backend = self
            .backend()
            .with_context(|| format!("invalid [database] section in {}", path.display()))?;

        if let Some(db_path) = &self.database.path {
            partnerdesk_db::validate_db_path(db_path)?;
        }

        if self.database.port == Some(0) {
            bail!(
                "database.port in {} must be between 1 and 65535, got 0",
                path.display()
            );
        }

        if backend == Backend::MySql {
            for (key, value) in [
                ("host", &self.database.host),
                ("user", &self.database.user),
                ("name", &self.database.name),
            ] {
                if value.as_deref().is_some_and(|value| value.trim().is_empty()) {
                    bail!(
                        "database.{key} in {} must not be empty for the mysql backend",
                        path.display()
                    );
                }
            }
        }

        if let Some(level) = &self.logging.level
            && level.trim().is_empty()
        {
            bail!(
                "logging.level in {} must not be empty -- use a level such as \"info\" or \"debug\"",
                path.display()
            );
        }

        Ok(())
    }

    pub fn backend(&self) -> Result<Backend> {
        match self.database.backend.as_deref() {
            None => Ok(Backend::Sqlite),
            Some(raw) => Backend::parse(raw).ok_or_else(|| {
                anyhow!(
                    "unknown database.backend {raw:?}; expected one of: {}",
                    Backend::ALL.map(Backend::as_str).join(", ")
                )
            }),
        }
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => partnerdesk_db::default_db_path(),
        }
    }

    /// The password from `PARTNERDESK_DB_PASSWORD` wins over the file so it
    /// can stay out of the config.
    pub fn mysql_options(&self) -> MySqlOptions {
        let password = env::var("PARTNERDESK_DB_PASSWORD")
            .ok()
            .or_else(|| self.database.password.clone())
            .unwrap_or_default();
        MySqlOptions {
            host: self
                .database
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_MYSQL_HOST.to_owned()),
            port: self.database.port.unwrap_or(DEFAULT_MYSQL_PORT),
            user: self
                .database
                .user
                .clone()
                .unwrap_or_else(|| DEFAULT_MYSQL_USER.to_owned()),
            password,
            database: self
                .database
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_MYSQL_DATABASE.to_owned()),
        }
    }

    pub fn store_target(&self) -> Result<StoreTarget> {
        Ok(match self.backend()? {
            Backend::Sqlite => StoreTarget::Sqlite(self.db_path()?),
            Backend::MySql => StoreTarget::MySql(self.mysql_options()),
        })
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging.enabled.unwrap_or(true)
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.logging.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [logging].path to a writable log file")
        })?;
        let app_dir = data_root.join(partnerdesk_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create data directory {}", app_dir.display()))?;
        Ok(app_dir.join("partnerdesk.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# partnerdesk config\n# Place this file at: {}\n\nversion = 1\n\n[database]\n# \"sqlite\" or \"mysql\"\nbackend = \"sqlite\"\n# sqlite only. Default is the platform data dir (for example ~/.local/share/partnerdesk/partnerdesk.db)\n# path = \"/absolute/path/to/partnerdesk.db\"\n# mysql only. PARTNERDESK_DB_PASSWORD overrides password.\nhost = \"{}\"\nport = {}\nuser = \"{}\"\npassword = \"\"\nname = \"{}\"\n\n[logging]\nenabled = true\nlevel = \"{}\"\n# path = \"/absolute/path/to/partnerdesk.log\"\n",
            path.display(),
            DEFAULT_MYSQL_HOST,
            DEFAULT_MYSQL_PORT,
            DEFAULT_MYSQL_USER,
            DEFAULT_MYSQL_DATABASE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

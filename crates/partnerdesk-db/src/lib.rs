// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod demo;
mod mysql;
mod queries;
mod sqlite;

use anyhow::{Context, Result, anyhow, bail};
use partnerdesk_app::{
    Partner, PartnerFormInput, PartnerId, PartnerType, Product, ProductId, Request,
    RequestFormInput, RequestId, RequestSummary,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use mysql::{MySqlOptions, MySqlStore};
pub use sqlite::SqliteStore;

pub const APP_NAME: &str = "partnerdesk";
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Failure reported by a [`PartnerStore`]. Callers branch on the kind: a
/// connectivity failure at startup is fatal, everything else is shown to the
/// user and only aborts the operation in flight.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot reach the database ({context}): {message}")]
    Connectivity {
        context: &'static str,
        message: String,
    },
    #[error("{entity} {id} not found -- choose an existing {entity} and retry")]
    NotFound { entity: &'static str, id: i64 },
    #[error("database rejected {context}: {message}")]
    Constraint {
        context: &'static str,
        message: String,
    },
    #[error("{context} failed: {message}")]
    Query {
        context: &'static str,
        message: String,
    },
}

impl StoreError {
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    pub(crate) fn closed(context: &'static str) -> Self {
        Self::Connectivity {
            context,
            message: "connection already closed".to_owned(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPartner {
    pub partner_type: PartnerType,
    pub name: String,
    pub director_name: String,
    pub legal_address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub inn: Option<String>,
    pub rating: Option<i32>,
}

impl From<PartnerFormInput> for NewPartner {
    fn from(input: PartnerFormInput) -> Self {
        Self {
            partner_type: input.partner_type,
            name: input.name,
            director_name: input.director_name,
            legal_address: input.legal_address,
            phone: input.phone,
            email: input.email,
            inn: input.inn,
            rating: input.rating,
        }
    }
}

/// Column values for inserting or updating a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestWrite {
    pub product_id: ProductId,
    pub partner_id: PartnerId,
    pub quantity: i32,
}

impl From<RequestFormInput> for RequestWrite {
    fn from(input: RequestFormInput) -> Self {
        Self {
            product_id: input.product_id,
            partner_id: input.partner_id,
            quantity: input.quantity,
        }
    }
}

/// Data access for the partner request tables. Every write is a single
/// auto-committing statement; reads always return the current contents.
pub trait PartnerStore {
    fn backend(&self) -> Backend;

    fn list_request_summaries(&self) -> StoreResult<Vec<RequestSummary>>;

    fn list_products(&self) -> StoreResult<Vec<Product>>;

    fn list_partners(&self) -> StoreResult<Vec<Partner>>;

    fn get_request(&self, request_id: RequestId) -> StoreResult<Request>;

    fn create_partner(&self, partner: &NewPartner) -> StoreResult<PartnerId>;

    fn create_request(&self, request: &RequestWrite) -> StoreResult<RequestId>;

    fn update_request(&self, request_id: RequestId, request: &RequestWrite) -> StoreResult<()>;

    fn delete_request(&self, request_id: RequestId) -> StoreResult<()>;

    /// Releases the connection. Consumes the store so it cannot be used after.
    fn close(self: Box<Self>) -> StoreResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    MySql,
}

impl Backend {
    pub const ALL: [Self; 2] = [Self::Sqlite, Self::MySql];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::MySql => "mysql",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|backend| backend.as_str() == value)
    }
}

/// Where the process-wide store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    Sqlite(PathBuf),
    Memory,
    MySql(MySqlOptions),
}

/// Opens the store for `target`. SQLite databases are bootstrapped; MySQL
/// schemas are managed outside the application.
pub fn connect(target: &StoreTarget) -> Result<Box<dyn PartnerStore>> {
    match target {
        StoreTarget::Sqlite(path) => {
            let store = SqliteStore::open(path)?;
            store.bootstrap()?;
            Ok(Box::new(store))
        }
        StoreTarget::Memory => {
            let store = SqliteStore::open_memory()?;
            store.bootstrap()?;
            Ok(Box::new(store))
        }
        StoreTarget::MySql(options) => Ok(Box::new(MySqlStore::connect(options)?)),
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("PARTNERDESK_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!(
            "cannot resolve data directory; set PARTNERDESK_DB_PATH to a writable database path"
        )
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("partnerdesk.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

pub(crate) fn printable_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::{Backend, StoreError, validate_db_path};

    #[test]
    fn validate_db_path_accepts_plain_paths() {
        for path in [":memory:", "partnerdesk.db", "/tmp/data/partnerdesk.db", "C:\\db\\p.db"] {
            assert!(validate_db_path(path).is_ok(), "path {path:?}");
        }
    }

    #[test]
    fn validate_db_path_rejects_uris() {
        for path in [
            "",
            "mysql://root@localhost/zafir",
            "file:partnerdesk.db",
            "partnerdesk.db?mode=ro",
        ] {
            assert!(validate_db_path(path).is_err(), "path {path:?}");
        }
    }

    #[test]
    fn backend_parse_round_trips() {
        for backend in Backend::ALL {
            assert_eq!(Backend::parse(backend.as_str()), Some(backend));
        }
        assert_eq!(Backend::parse("postgres"), None);
    }

    #[test]
    fn not_found_message_is_actionable() {
        let error = StoreError::NotFound {
            entity: "request",
            id: 9,
        };
        assert_eq!(
            error.to_string(),
            "request 9 not found -- choose an existing request and retry"
        );
        assert!(!error.is_connectivity());
    }
}

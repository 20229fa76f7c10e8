// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{demo, queries};
use crate::{
    Backend, NewPartner, PartnerStore, RequestWrite, StoreError, StoreResult, printable_path,
    validate_db_path,
};
use anyhow::{Context, Result, bail};
use partnerdesk_app::{
    Partner, PartnerId, PartnerType, Product, ProductId, Request, RequestId, RequestSummary,
};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("products", &["product_id", "product_name", "min_price"]),
    (
        "partners",
        &[
            "partner_id",
            "partner_type_id",
            "partner_name",
            "director_name",
            "legal_address",
            "phone",
            "email",
            "inn",
            "rating",
        ],
    ),
    (
        "partner_product_requests",
        &["request_id", "product_id", "partner_id", "quantity"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_requests_product_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_requests_product_id ON partner_product_requests (product_id);",
    },
    RequiredIndex {
        name: "idx_requests_partner_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_requests_partner_id ON partner_product_requests (partner_id);",
    },
];


pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        validate_db_path(&printable_path(path))?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        info!(path = %path.display(), "opened sqlite store");
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the schema on an empty database, otherwise checks that every
    /// table and column the queries rely on is present.
    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
            info!("created partnerdesk schema");
        }

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    /// Products are reference data; the application never creates them, so
    /// this exists for seeding and tests.
    pub fn insert_product(&self, name: &str, min_price: f64) -> StoreResult<ProductId> {
        self.conn
            .execute(queries::INSERT_PRODUCT, params![name, min_price])
            .map_err(|err| map_error("insert product", err))?;
        Ok(ProductId::new(self.conn.last_insert_rowid()))
    }

    pub fn seed_demo_data(&self) -> Result<()> {
        let mut product_ids = Vec::with_capacity(demo::PRODUCTS.len());
        for product in &demo::PRODUCTS {
            product_ids.push(
                self.insert_product(product.name, product.min_price)
                    .with_context(|| format!("seed product {}", product.name))?,
            );
        }

        let mut partner_ids = Vec::with_capacity(demo::PARTNERS.len());
        for partner in &demo::PARTNERS {
            let row = NewPartner {
                partner_type: partner.partner_type,
                name: partner.name.to_owned(),
                director_name: partner.director_name.to_owned(),
                legal_address: partner.legal_address.map(str::to_owned),
                phone: partner.phone.map(str::to_owned),
                email: partner.email.map(str::to_owned),
                inn: partner.inn.map(str::to_owned),
                rating: partner.rating,
            };
            partner_ids.push(
                self.create_partner(&row)
                    .with_context(|| format!("seed partner {}", partner.name))?,
            );
        }

        for request in &demo::REQUESTS {
            self.create_request(&RequestWrite {
                product_id: product_ids[request.product],
                partner_id: partner_ids[request.partner],
                quantity: request.quantity,
            })
            .context("seed request")?;
        }

        info!(
            products = product_ids.len(),
            partners = partner_ids.len(),
            requests = demo::REQUESTS.len(),
            "seeded demo data"
        );
        Ok(())
    }
}

impl PartnerStore for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn list_request_summaries(&self) -> StoreResult<Vec<RequestSummary>> {
        debug!("list request summaries");
        query_all(&self.conn, "list request summaries", queries::LIST_REQUEST_SUMMARIES, |row| {
            Ok(RequestSummary {
                request_id: RequestId::new(row.get(0)?),
                quantity: row.get(1)?,
                product_id: ProductId::new(row.get(2)?),
                product_name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                min_price: row.get(4)?,
                partner_id: PartnerId::new(row.get(5)?),
                partner_type: row
                    .get::<_, Option<i64>>(6)?
                    .and_then(PartnerType::from_code),
                partner_name: row.get(7)?,
                director_name: row.get(8)?,
                legal_address: row.get(9)?,
                phone: row.get(10)?,
                rating: row.get(11)?,
            })
        })
    }

    fn list_products(&self) -> StoreResult<Vec<Product>> {
        debug!("list products");
        query_all(&self.conn, "list products", queries::LIST_PRODUCTS, |row| {
            Ok(Product {
                id: ProductId::new(row.get(0)?),
                name: row.get(1)?,
                min_price: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
            })
        })
    }

    fn list_partners(&self) -> StoreResult<Vec<Partner>> {
        debug!("list partners");
        query_all(&self.conn, "list partners", queries::LIST_PARTNERS, partner_from_row)
    }

    fn get_request(&self, request_id: RequestId) -> StoreResult<Request> {
        debug!(request_id = request_id.get(), "get request");
        self.conn
            .query_row(queries::GET_REQUEST, params![request_id.get()], |row| {
                Ok(Request {
                    id: RequestId::new(row.get(0)?),
                    product_id: ProductId::new(row.get(1)?),
                    partner_id: PartnerId::new(row.get(2)?),
                    quantity: row.get(3)?,
                })
            })
            .optional()
            .map_err(|err| map_error("get request", err))?
            .ok_or(StoreError::NotFound {
                entity: "request",
                id: request_id.get(),
            })
    }

    fn create_partner(&self, partner: &NewPartner) -> StoreResult<PartnerId> {
        debug!(name = %partner.name, "create partner");
        self.conn
            .execute(
                queries::INSERT_PARTNER,
                params![
                    partner.partner_type.code(),
                    partner.name,
                    partner.director_name,
                    partner.legal_address,
                    partner.phone,
                    partner.email,
                    partner.inn,
                    partner.rating,
                ],
            )
            .map_err(|err| map_error("insert partner", err))?;
        Ok(PartnerId::new(self.conn.last_insert_rowid()))
    }

    fn create_request(&self, request: &RequestWrite) -> StoreResult<RequestId> {
        debug!(
            product_id = request.product_id.get(),
            partner_id = request.partner_id.get(),
            quantity = request.quantity,
            "create request"
        );
        self.conn
            .execute(
                queries::INSERT_REQUEST,
                params![
                    request.product_id.get(),
                    request.partner_id.get(),
                    request.quantity,
                ],
            )
            .map_err(|err| map_error("insert request", err))?;
        Ok(RequestId::new(self.conn.last_insert_rowid()))
    }

    fn update_request(&self, request_id: RequestId, request: &RequestWrite) -> StoreResult<()> {
        debug!(request_id = request_id.get(), "update request");
        let rows_affected = self
            .conn
            .execute(
                queries::UPDATE_REQUEST,
                params![
                    request.product_id.get(),
                    request.partner_id.get(),
                    request.quantity,
                    request_id.get(),
                ],
            )
            .map_err(|err| map_error("update request", err))?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "request",
                id: request_id.get(),
            });
        }
        Ok(())
    }

    fn delete_request(&self, request_id: RequestId) -> StoreResult<()> {
        debug!(request_id = request_id.get(), "delete request");
        let rows_affected = self
            .conn
            .execute(queries::DELETE_REQUEST, params![request_id.get()])
            .map_err(|err| map_error("delete request", err))?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "request",
                id: request_id.get(),
            });
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> StoreResult<()> {
        let store = *self;
        store
            .conn
            .close()
            .map_err(|(_, err)| map_error("close database", err))?;
        info!("closed sqlite store");
        Ok(())
    }
}

fn partner_from_row(row: &Row<'_>) -> rusqlite::Result<Partner> {
    Ok(Partner {
        id: PartnerId::new(row.get(0)?),
        partner_type: row
            .get::<_, Option<i64>>(1)?
            .and_then(PartnerType::from_code),
        name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        director_name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        legal_address: row.get(4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
        inn: row.get(7)?,
        rating: row.get(8)?,
    })
}

fn query_all<T>(
    conn: &Connection,
    context: &'static str,
    sql: &str,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> StoreResult<Vec<T>> {
    let mut stmt = conn.prepare(sql).map_err(|err| map_error(context, err))?;
    let rows = stmt.query_map([], map).map_err(|err| map_error(context, err))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|err| map_error(context, err))
}

fn map_error(context: &'static str, err: rusqlite::Error) -> StoreError {
    let message = err.to_string();
    let mapped = match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => StoreError::Constraint { context, message },
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::NotADatabase
            | ErrorCode::PermissionDenied
            | ErrorCode::SystemIoFailure,
        ) => StoreError::Connectivity { context, message },
        _ => StoreError::Query { context, message },
    };
    warn!(error = %mapped, "sqlite statement failed");
    mapped
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point [database].path at a partnerdesk database or start from an empty file"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; migrate the database before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

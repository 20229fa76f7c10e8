// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::queries;
use crate::{Backend, NewPartner, PartnerStore, RequestWrite, StoreError, StoreResult};
use anyhow::{Context, Result};
use mysql_async::prelude::{FromValue, Queryable};
use mysql_async::{Conn, OptsBuilder, Params, Row, Value};
use partnerdesk_app::{
    Partner, PartnerId, PartnerType, Product, ProductId, Request, RequestId, RequestSummary,
};
use std::cell::{RefCell, RefMut};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

// Server error codes for foreign key and check violations.
const ER_ROW_IS_REFERENCED: u16 = 1451;
const ER_NO_REFERENCED_ROW: u16 = 1452;
const ER_CHECK_CONSTRAINT_VIOLATED: u16 = 3819;
const ER_BAD_NULL: u16 = 1048;
const ER_DUP_ENTRY: u16 = 1062;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// One long-lived MySQL connection driven by a private current-thread
/// runtime. Every call blocks until the server answers.
pub struct MySqlStore {
    runtime: Runtime,
    conn: RefCell<Option<Conn>>,
}

impl MySqlStore {
    pub fn connect(options: &MySqlOptions) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("start mysql runtime")?;
        let opts = OptsBuilder::default()
            .ip_or_hostname(options.host.clone())
            .tcp_port(options.port)
            .user(Some(options.user.clone()))
            .pass(Some(options.password.clone()))
            .db_name(Some(options.database.clone()))
            .client_found_rows(true);
        let conn = runtime
            .block_on(Conn::new(opts))
            .map_err(|err| map_error("connect", err))
            .with_context(|| {
                format!(
                    "connect to mysql at {}:{} as {} -- check [database] host, port and credentials",
                    options.host, options.port, options.user
                )
            })?;
        info!(
            host = %options.host,
            port = options.port,
            database = %options.database,
            "connected to mysql"
        );
        Ok(Self {
            runtime,
            conn: RefCell::new(Some(conn)),
        })
    }

    fn conn(&self, context: &'static str) -> StoreResult<RefMut<'_, Conn>> {
        RefMut::filter_map(self.conn.borrow_mut(), Option::as_mut)
            .map_err(|_| StoreError::closed(context))
    }

    fn select(&self, context: &'static str, sql: &str, params: Params) -> StoreResult<Vec<Row>> {
        let mut conn = self.conn(context)?;
        self.runtime
            .block_on(conn.exec::<Row, _, _>(sql, params))
            .map_err(|err| map_error(context, err))
    }

    /// Runs a write and returns `(affected_rows, last_insert_id)`.
    fn write(
        &self,
        context: &'static str,
        sql: &str,
        params: Params,
    ) -> StoreResult<(u64, Option<u64>)> {
        let mut conn = self.conn(context)?;
        self.runtime
            .block_on(conn.exec_drop(sql, params))
            .map_err(|err| map_error(context, err))?;
        Ok((conn.affected_rows(), conn.last_insert_id()))
    }
}

impl PartnerStore for MySqlStore {
    fn backend(&self) -> Backend {
        Backend::MySql
    }

    fn list_request_summaries(&self) -> StoreResult<Vec<RequestSummary>> {
        const CONTEXT: &str = "list request summaries";
        debug!("list request summaries");
        self.select(CONTEXT, queries::LIST_REQUEST_SUMMARIES, Params::Empty)?
            .into_iter()
            .map(|mut row| {
                Ok(RequestSummary {
                    request_id: RequestId::new(column(&mut row, 0, CONTEXT)?),
                    quantity: column(&mut row, 1, CONTEXT)?,
                    product_id: ProductId::new(column(&mut row, 2, CONTEXT)?),
                    product_name: column::<Option<String>>(&mut row, 3, CONTEXT)?
                        .unwrap_or_default(),
                    min_price: column(&mut row, 4, CONTEXT)?,
                    partner_id: PartnerId::new(column(&mut row, 5, CONTEXT)?),
                    partner_type: column::<Option<i64>>(&mut row, 6, CONTEXT)?
                        .and_then(PartnerType::from_code),
                    partner_name: column(&mut row, 7, CONTEXT)?,
                    director_name: column(&mut row, 8, CONTEXT)?,
                    legal_address: column(&mut row, 9, CONTEXT)?,
                    phone: column(&mut row, 10, CONTEXT)?,
                    rating: column(&mut row, 11, CONTEXT)?,
                })
            })
            .collect()
    }

    fn list_products(&self) -> StoreResult<Vec<Product>> {
        const CONTEXT: &str = "list products";
        debug!("list products");
        self.select(CONTEXT, queries::LIST_PRODUCTS, Params::Empty)?
            .into_iter()
            .map(|mut row| {
                Ok(Product {
                    id: ProductId::new(column(&mut row, 0, CONTEXT)?),
                    name: column::<Option<String>>(&mut row, 1, CONTEXT)?.unwrap_or_default(),
                    min_price: column::<Option<f64>>(&mut row, 2, CONTEXT)?.unwrap_or(0.0),
                })
            })
            .collect()
    }

    fn list_partners(&self) -> StoreResult<Vec<Partner>> {
        const CONTEXT: &str = "list partners";
        debug!("list partners");
        self.select(CONTEXT, queries::LIST_PARTNERS, Params::Empty)?
            .into_iter()
            .map(|mut row| {
                Ok(Partner {
                    id: PartnerId::new(column(&mut row, 0, CONTEXT)?),
                    partner_type: column::<Option<i64>>(&mut row, 1, CONTEXT)?
                        .and_then(PartnerType::from_code),
                    name: column::<Option<String>>(&mut row, 2, CONTEXT)?.unwrap_or_default(),
                    director_name: column::<Option<String>>(&mut row, 3, CONTEXT)?
                        .unwrap_or_default(),
                    legal_address: column(&mut row, 4, CONTEXT)?,
                    phone: column(&mut row, 5, CONTEXT)?,
                    email: column(&mut row, 6, CONTEXT)?,
                    inn: column(&mut row, 7, CONTEXT)?,
                    rating: column(&mut row, 8, CONTEXT)?,
                })
            })
            .collect()
    }

    fn get_request(&self, request_id: RequestId) -> StoreResult<Request> {
        const CONTEXT: &str = "get request";
        debug!(request_id = request_id.get(), "get request");
        let mut row = self
            .select(
                CONTEXT,
                queries::GET_REQUEST,
                Params::Positional(vec![Value::from(request_id.get())]),
            )?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound {
                entity: "request",
                id: request_id.get(),
            })?;
        Ok(Request {
            id: RequestId::new(column(&mut row, 0, CONTEXT)?),
            product_id: ProductId::new(column(&mut row, 1, CONTEXT)?),
            partner_id: PartnerId::new(column(&mut row, 2, CONTEXT)?),
            quantity: column(&mut row, 3, CONTEXT)?,
        })
    }

    fn create_partner(&self, partner: &NewPartner) -> StoreResult<PartnerId> {
        const CONTEXT: &str = "insert partner";
        debug!(name = %partner.name, "create partner");
        let params = Params::Positional(vec![
            Value::from(partner.partner_type.code()),
            Value::from(partner.name.clone()),
            Value::from(partner.director_name.clone()),
            Value::from(partner.legal_address.clone()),
            Value::from(partner.phone.clone()),
            Value::from(partner.email.clone()),
            Value::from(partner.inn.clone()),
            Value::from(partner.rating),
        ]);
        let (_, last_insert_id) = self.write(CONTEXT, queries::INSERT_PARTNER, params)?;
        inserted_id(CONTEXT, last_insert_id).map(PartnerId::new)
    }

    fn create_request(&self, request: &RequestWrite) -> StoreResult<RequestId> {
        const CONTEXT: &str = "insert request";
        debug!(
            product_id = request.product_id.get(),
            partner_id = request.partner_id.get(),
            quantity = request.quantity,
            "create request"
        );
        let params = Params::Positional(vec![
            Value::from(request.product_id.get()),
            Value::from(request.partner_id.get()),
            Value::from(request.quantity),
        ]);
        let (_, last_insert_id) = self.write(CONTEXT, queries::INSERT_REQUEST, params)?;
        inserted_id(CONTEXT, last_insert_id).map(RequestId::new)
    }

    fn update_request(&self, request_id: RequestId, request: &RequestWrite) -> StoreResult<()> {
        debug!(request_id = request_id.get(), "update request");
        let params = Params::Positional(vec![
            Value::from(request.product_id.get()),
            Value::from(request.partner_id.get()),
            Value::from(request.quantity),
            Value::from(request_id.get()),
        ]);
        let (affected_rows, _) = self.write("update request", queries::UPDATE_REQUEST, params)?;
        if affected_rows == 0 {
            return Err(StoreError::NotFound {
                entity: "request",
                id: request_id.get(),
            });
        }
        Ok(())
    }

    fn delete_request(&self, request_id: RequestId) -> StoreResult<()> {
        debug!(request_id = request_id.get(), "delete request");
        let params = Params::Positional(vec![Value::from(request_id.get())]);
        let (affected_rows, _) = self.write("delete request", queries::DELETE_REQUEST, params)?;
        if affected_rows == 0 {
            return Err(StoreError::NotFound {
                entity: "request",
                id: request_id.get(),
            });
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> StoreResult<()> {
        let store = *self;
        let Some(conn) = store.conn.into_inner() else {
            return Err(StoreError::closed("close connection"));
        };
        store
            .runtime
            .block_on(conn.disconnect())
            .map_err(|err| map_error("close connection", err))?;
        info!("closed mysql connection");
        Ok(())
    }
}

fn column<T: FromValue>(row: &mut Row, index: usize, context: &'static str) -> StoreResult<T> {
    match row.take_opt::<T, usize>(index) {
        Some(Ok(value)) => Ok(value),
        Some(Err(err)) => Err(StoreError::Query {
            context,
            message: format!("column {index}: {err}"),
        }),
        None => Err(StoreError::Query {
            context,
            message: format!("column {index} missing from result"),
        }),
    }
}

fn inserted_id(context: &'static str, last_insert_id: Option<u64>) -> StoreResult<i64> {
    last_insert_id
        .and_then(|id| i64::try_from(id).ok())
        .ok_or(StoreError::Query {
            context,
            message: "server did not report an inserted id".to_owned(),
        })
}

fn map_error(context: &'static str, err: mysql_async::Error) -> StoreError {
    let message = err.to_string();
    let mapped = match &err {
        mysql_async::Error::Server(server) => match server.code {
            ER_ROW_IS_REFERENCED | ER_NO_REFERENCED_ROW | ER_CHECK_CONSTRAINT_VIOLATED
            | ER_BAD_NULL | ER_DUP_ENTRY => StoreError::Constraint { context, message },
            _ => StoreError::Query { context, message },
        },
        mysql_async::Error::Io(_) | mysql_async::Error::Driver(_) => {
            StoreError::Connectivity { context, message }
        }
        _ => StoreError::Query { context, message },
    };
    warn!(error = %mapped, "mysql statement failed");
    mapped
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use partnerdesk_app::{
    EditorMode, FormPayload, Partner, Product, Request, RequestId, RequestSummary,
};
use partnerdesk_db::{NewPartner, PartnerStore, RequestWrite};
use tracing::info;

pub struct DbRuntime<'a> {
    store: &'a dyn PartnerStore,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a dyn PartnerStore) -> Self {
        Self { store }
    }
}

impl partnerdesk_tui::AppRuntime for DbRuntime<'_> {
    fn load_requests(&mut self) -> Result<Vec<RequestSummary>> {
        Ok(self.store.list_request_summaries()?)
    }

    fn load_products(&mut self) -> Result<Vec<Product>> {
        Ok(self.store.list_products()?)
    }

    fn load_partners(&mut self) -> Result<Vec<Partner>> {
        Ok(self.store.list_partners()?)
    }

    fn load_request(&mut self, request_id: RequestId) -> Result<Request> {
        Ok(self.store.get_request(request_id)?)
    }

    fn submit_form(&mut self, payload: &FormPayload) -> Result<()> {
        match payload {
            FormPayload::Request {
                mode: EditorMode::Create,
                input,
            } => {
                let request_id = self
                    .store
                    .create_request(&RequestWrite::from(*input))
                    .context("create request")?;
                info!(request_id = request_id.get(), "created request");
            }
            FormPayload::Request {
                mode: EditorMode::Edit(request_id),
                input,
            } => {
                self.store
                    .update_request(*request_id, &RequestWrite::from(*input))
                    .with_context(|| format!("update request {request_id}"))?;
                info!(request_id = request_id.get(), "updated request");
            }
            FormPayload::Partner(input) => {
                let partner_id = self
                    .store
                    .create_partner(&NewPartner::from(input.clone()))
                    .context("create partner")?;
                info!(partner_id = partner_id.get(), "created partner");
            }
        }
        Ok(())
    }

    fn delete_request(&mut self, request_id: RequestId) -> Result<()> {
        self.store
            .delete_request(request_id)
            .with_context(|| format!("delete request {request_id}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DbRuntime;
    use anyhow::Result;
    use partnerdesk_app::{
        EditorMode, FormPayload, PartnerType, ProductId, RequestFormInput, RequestId,
    };
    use partnerdesk_db::{NewPartner, PartnerStore, SqliteStore, StoreError};
    use partnerdesk_testkit::{fixture_partner, fixture_products};
    use partnerdesk_tui::AppRuntime;

    fn seeded_store() -> Result<(SqliteStore, Vec<ProductId>)> {
        let store = SqliteStore::open_memory()?;
        store.bootstrap()?;
        let mut products = Vec::new();
        for product in fixture_products() {
            products.push(store.insert_product(&product.name, product.min_price)?);
        }
        Ok((store, products))
    }

    #[test]
    fn create_request_payload_is_persisted() -> Result<()> {
        let (store, products) = seeded_store()?;
        let partner_id = store.create_partner(&NewPartner::from(fixture_partner("Mebel")))?;
        let mut runtime = DbRuntime::new(&store);

        runtime.submit_form(&FormPayload::Request {
            mode: EditorMode::Create,
            input: RequestFormInput {
                product_id: products[1],
                partner_id,
                quantity: 4,
            },
        })?;

        let rows = runtime.load_requests()?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, Some(4));
        assert_eq!(rows[0].product_id, products[1]);
        Ok(())
    }

    #[test]
    fn edit_payload_updates_existing_row() -> Result<()> {
        let (store, products) = seeded_store()?;
        let partner_id = store.create_partner(&NewPartner::from(fixture_partner("Mebel")))?;
        let mut runtime = DbRuntime::new(&store);
        runtime.submit_form(&FormPayload::Request {
            mode: EditorMode::Create,
            input: RequestFormInput {
                product_id: products[0],
                partner_id,
                quantity: 1,
            },
        })?;
        let request_id = runtime.load_requests()?[0].request_id;

        runtime.submit_form(&FormPayload::Request {
            mode: EditorMode::Edit(request_id),
            input: RequestFormInput {
                product_id: products[2],
                partner_id,
                quantity: 9,
            },
        })?;

        let request = runtime.load_request(request_id)?;
        assert_eq!(request.product_id, products[2]);
        assert_eq!(request.quantity, 9);
        assert_eq!(runtime.load_requests()?.len(), 1);
        Ok(())
    }

    #[test]
    fn partner_payload_is_persisted_with_type_code() -> Result<()> {
        let (store, _) = seeded_store()?;
        let mut runtime = DbRuntime::new(&store);
        let mut input = fixture_partner("Parket Dom");
        input.partner_type = PartnerType::Pao;
        runtime.submit_form(&FormPayload::Partner(input))?;

        let partners = runtime.load_partners()?;
        assert_eq!(partners.len(), 1);
        assert_eq!(partners[0].partner_type, Some(PartnerType::Pao));
        assert_eq!(partners[0].name, "Parket Dom");
        Ok(())
    }

    #[test]
    fn delete_of_missing_request_keeps_store_error() -> Result<()> {
        let (store, _) = seeded_store()?;
        let mut runtime = DbRuntime::new(&store);
        let error = runtime
            .delete_request(RequestId::new(77))
            .expect_err("nothing to delete");
        assert!(matches!(
            error.downcast_ref::<StoreError>(),
            Some(StoreError::NotFound { id: 77, .. })
        ));
        assert!(format!("{error:#}").contains("choose an existing request"));
        Ok(())
    }

    #[test]
    fn products_load_in_catalogue_order() -> Result<()> {
        let (store, products) = seeded_store()?;
        let mut runtime = DbRuntime::new(&store);
        let loaded = runtime
            .load_products()?
            .into_iter()
            .map(|product| product.id)
            .collect::<Vec<_>>();
        assert_eq!(loaded, products);
        assert_eq!(store.list_products()?.len(), 3);
        Ok(())
    }
}

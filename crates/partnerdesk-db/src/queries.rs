// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Statements shared by both backends. Both drivers bind `?` placeholders
//! positionally.

pub(crate) const LIST_REQUEST_SUMMARIES: &str = "
    SELECT
      r.request_id, r.quantity,
      p.product_id, p.product_name, p.min_price,
      pa.partner_id, pa.partner_type_id, pa.partner_name, pa.director_name,
      pa.legal_address, pa.phone, pa.rating
    FROM partner_product_requests r
    JOIN products p ON r.product_id = p.product_id
    JOIN partners pa ON r.partner_id = pa.partner_id
    ORDER BY r.request_id ASC
";

pub(crate) const LIST_PRODUCTS: &str = "
    SELECT product_id, product_name, min_price
    FROM products
    ORDER BY product_id ASC
";

pub(crate) const LIST_PARTNERS: &str = "
    SELECT
      partner_id, partner_type_id, partner_name, director_name,
      legal_address, phone, email, inn, rating
    FROM partners
    ORDER BY partner_id ASC
";

pub(crate) const GET_REQUEST: &str = "
    SELECT request_id, product_id, partner_id, quantity
    FROM partner_product_requests
    WHERE request_id = ?
";

pub(crate) const INSERT_PARTNER: &str = "
    INSERT INTO partners (
      partner_type_id, partner_name, director_name,
      legal_address, phone, email, inn, rating
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

pub(crate) const INSERT_PRODUCT: &str = "
    INSERT INTO products (product_name, min_price) VALUES (?, ?)
";

pub(crate) const INSERT_REQUEST: &str = "
    INSERT INTO partner_product_requests (product_id, partner_id, quantity)
    VALUES (?, ?, ?)
";

pub(crate) const UPDATE_REQUEST: &str = "
    UPDATE partner_product_requests
    SET product_id = ?, partner_id = ?, quantity = ?
    WHERE request_id = ?
";

pub(crate) const DELETE_REQUEST: &str = "
    DELETE FROM partner_product_requests WHERE request_id = ?
";

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::validation::format_money;
use crate::{NOT_AVAILABLE, RequestId, RequestSummary, partner_type_label};

pub const PHONE_PREFIX: &str = "+7 ";
pub const UNRATED: &str = "unrated";

/// Context-menu action on a single card. Carries the request it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    ViewProduct(RequestId),
    Edit(RequestId),
    Delete(RequestId),
}

impl CardAction {
    pub const fn menu(request_id: RequestId) -> [Self; 3] {
        [
            Self::ViewProduct(request_id),
            Self::Edit(request_id),
            Self::Delete(request_id),
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ViewProduct(_) => "view product",
            Self::Edit(_) => "edit",
            Self::Delete(_) => "delete",
        }
    }

    pub const fn request_id(self) -> RequestId {
        match self {
            Self::ViewProduct(id) | Self::Edit(id) | Self::Delete(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCard {
    pub request_id: RequestId,
    pub partner_type: String,
    pub partner_name: String,
    pub total_cost: String,
    pub legal_address: String,
    pub phone: String,
    pub rating: String,
}

impl RequestCard {
    pub fn from_summary(summary: &RequestSummary) -> Self {
        Self {
            request_id: summary.request_id,
            partner_type: partner_type_label(summary.partner_type).to_owned(),
            partner_name: or_not_available(summary.partner_name.as_deref()),
            total_cost: format_money(summary.total_cost()),
            legal_address: or_not_available(summary.legal_address.as_deref()),
            phone: format!(
                "{PHONE_PREFIX}{}",
                or_not_available(summary.phone.as_deref())
            ),
            rating: summary
                .rating
                .map_or_else(|| UNRATED.to_owned(), |rating| rating.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub product_name: String,
    pub min_price: f64,
    pub quantity: i32,
}

impl ProductDetail {
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("product: {}", self.product_name),
            format!("minimum partner price: {} rub", format_money(self.min_price)),
            format!("quantity requested: {}", self.quantity),
        ]
    }
}

/// The rendered request list. Every reload replaces the whole thing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestList {
    summaries: Vec<RequestSummary>,
    cards: Vec<RequestCard>,
    selected: usize,
}

impl RequestList {
    pub fn replace(&mut self, summaries: Vec<RequestSummary>) {
        self.cards = summaries.iter().map(RequestCard::from_summary).collect();
        self.summaries = summaries;
        self.selected = self.selected.min(self.cards.len().saturating_sub(1));
    }

    pub fn cards(&self) -> &[RequestCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_card(&self) -> Option<&RequestCard> {
        self.cards.get(self.selected)
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.cards.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.cards.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    pub fn select(&mut self, request_id: RequestId) -> bool {
        match self.index_of(request_id) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    pub fn index_of(&self, request_id: RequestId) -> Option<usize> {
        self.cards
            .iter()
            .position(|card| card.request_id == request_id)
    }

    /// Looks the product up in the rows from the last load; no query.
    pub fn product_detail(&self, request_id: RequestId) -> Option<ProductDetail> {
        self.summaries
            .iter()
            .find(|summary| summary.request_id == request_id)
            .map(|summary| ProductDetail {
                product_name: summary.product_name.clone(),
                min_price: summary.min_price.unwrap_or(0.0),
                quantity: summary.quantity.unwrap_or(0),
            })
    }
}

fn or_not_available(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_owned(),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::*;

/// Legal form of a partner company. Stored as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartnerType {
    Zao,
    Ooo,
    Pao,
    Oao,
}

impl PartnerType {
    pub const ALL: [Self; 4] = [Self::Zao, Self::Ooo, Self::Pao, Self::Oao];

    pub const fn code(self) -> i64 {
        match self {
            Self::Zao => 1,
            Self::Ooo => 2,
            Self::Pao => 3,
            Self::Oao => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Zao),
            2 => Some(Self::Ooo),
            3 => Some(Self::Pao),
            4 => Some(Self::Oao),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Zao => "ЗАО",
            Self::Ooo => "ООО",
            Self::Pao => "ПАО",
            Self::Oao => "ОАО",
        }
    }

    pub fn choice_label(self) -> String {
        format!("{} - {}", self.code(), self.label())
    }
}

pub fn partner_type_label(partner_type: Option<PartnerType>) -> &'static str {
    partner_type.map_or(NOT_AVAILABLE, PartnerType::label)
}

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub min_price: f64,
}

impl Product {
    pub fn choice_label(&self) -> String {
        format!("{} - {}", self.id, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub partner_type: Option<PartnerType>,
    pub name: String,
    pub director_name: String,
    pub legal_address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub inn: Option<String>,
    pub rating: Option<i32>,
}

impl Partner {
    pub fn choice_label(&self) -> String {
        format!("{} - {}", self.id, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub product_id: ProductId,
    pub partner_id: PartnerId,
    pub quantity: i32,
}

/// A request joined with its partner and product display fields.
///
/// Columns the join can leave empty are optional so a sparse legacy row still
/// renders; `total_cost` treats a missing price as 0.0 and a missing quantity
/// as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSummary {
    pub request_id: RequestId,
    pub quantity: Option<i32>,
    pub product_id: ProductId,
    pub product_name: String,
    pub min_price: Option<f64>,
    pub partner_id: PartnerId,
    pub partner_type: Option<PartnerType>,
    pub partner_name: Option<String>,
    pub director_name: Option<String>,
    pub legal_address: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<i32>,
}

impl RequestSummary {
    pub fn total_cost(&self) -> f64 {
        f64::from(self.quantity.unwrap_or(0)) * self.min_price.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{PartnerType, RequestSummary, partner_type_label};
    use crate::{PartnerId, ProductId, RequestId};

    fn summary(quantity: Option<i32>, min_price: Option<f64>) -> RequestSummary {
        RequestSummary {
            request_id: RequestId::new(1),
            quantity,
            product_id: ProductId::new(2),
            product_name: "Laminate".to_owned(),
            min_price,
            partner_id: PartnerId::new(3),
            partner_type: Some(PartnerType::Ooo),
            partner_name: Some("Stroy".to_owned()),
            director_name: None,
            legal_address: None,
            phone: None,
            rating: None,
        }
    }

    #[test]
    fn partner_type_codes_round_trip() {
        for partner_type in PartnerType::ALL {
            assert_eq!(PartnerType::from_code(partner_type.code()), Some(partner_type));
        }
        assert_eq!(PartnerType::from_code(0), None);
        assert_eq!(PartnerType::from_code(5), None);
    }

    #[test]
    fn partner_type_labels_match_codes() {
        assert_eq!(PartnerType::Zao.choice_label(), "1 - ЗАО");
        assert_eq!(PartnerType::Oao.choice_label(), "4 - ОАО");
        assert_eq!(partner_type_label(None), "N/A");
    }

    #[test]
    fn total_cost_multiplies_quantity_by_min_price() {
        assert_eq!(summary(Some(4), Some(2.5)).total_cost(), 10.0);
        assert_eq!(summary(Some(3), Some(1234.56)).total_cost(), 3.0 * 1234.56);
    }

    #[test]
    fn total_cost_defaults_missing_values_to_zero() {
        assert_eq!(summary(None, Some(99.0)).total_cost(), 0.0);
        assert_eq!(summary(Some(7), None).total_cost(), 0.0);
    }
}

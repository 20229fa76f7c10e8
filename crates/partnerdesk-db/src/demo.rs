// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Fixed catalogue loaded by `--demo`.

use partnerdesk_app::PartnerType;

pub(crate) struct DemoProduct {
    pub name: &'static str,
    pub min_price: f64,
}

pub(crate) struct DemoPartner {
    pub partner_type: PartnerType,
    pub name: &'static str,
    pub director_name: &'static str,
    pub legal_address: Option<&'static str>,
    pub phone: Option<&'static str>,
    pub email: Option<&'static str>,
    pub inn: Option<&'static str>,
    pub rating: Option<i32>,
}

/// Indexes into [`PRODUCTS`] and [`PARTNERS`].
pub(crate) struct DemoRequest {
    pub product: usize,
    pub partner: usize,
    pub quantity: i32,
}

pub(crate) const PRODUCTS: [DemoProduct; 8] = [
    DemoProduct {
        name: "Laminate oak",
        min_price: 1_250.0,
    },
    DemoProduct {
        name: "Parquet board ash",
        min_price: 2_780.5,
    },
    DemoProduct {
        name: "Engineered board walnut",
        min_price: 4_310.0,
    },
    DemoProduct {
        name: "Vinyl plank grey",
        min_price: 960.75,
    },
    DemoProduct {
        name: "Cork panel natural",
        min_price: 1_540.0,
    },
    DemoProduct {
        name: "Skirting board white",
        min_price: 185.9,
    },
    DemoProduct {
        name: "Underlay roll 3mm",
        min_price: 210.0,
    },
    DemoProduct {
        name: "Stair tread oak",
        min_price: 3_120.0,
    },
];

pub(crate) const PARTNERS: [DemoPartner; 6] = [
    DemoPartner {
        partner_type: PartnerType::Zao,
        name: "Stroymontazh",
        director_name: "Ivanov Sergey",
        legal_address: Some("Moscow, Lenina st. 12"),
        phone: Some("495 712 34 56"),
        email: Some("office@stroymontazh.ru"),
        inn: Some("7712345678"),
        rating: Some(8),
    },
    DemoPartner {
        partner_type: PartnerType::Ooo,
        name: "Parket Plus",
        director_name: "Petrova Olga",
        legal_address: Some("Saint Petersburg, Sadovaya st. 4"),
        phone: Some("812 223 11 90"),
        email: Some("sales@parketplus.ru"),
        inn: Some("7801234567"),
        rating: Some(10),
    },
    DemoPartner {
        partner_type: PartnerType::Pao,
        name: "Severny Les",
        director_name: "Sokolov Dmitry",
        legal_address: Some("Vologda, Naberezhnaya st. 7"),
        phone: Some("817 255 40 02"),
        email: None,
        inn: Some("3525012345"),
        rating: Some(5),
    },
    DemoPartner {
        partner_type: PartnerType::Oao,
        name: "Volga Interer",
        director_name: "Kuznetsova Anna",
        legal_address: Some("Samara, Gagarina st. 31"),
        phone: Some("846 990 12 12"),
        email: Some("info@volga-interer.ru"),
        inn: None,
        rating: Some(7),
    },
    DemoPartner {
        partner_type: PartnerType::Ooo,
        name: "Masterpol",
        director_name: "Lebedev Pavel",
        legal_address: None,
        phone: None,
        email: None,
        inn: None,
        rating: None,
    },
    DemoPartner {
        partner_type: PartnerType::Zao,
        name: "Sibirsky Klen",
        director_name: "Morozova Irina",
        legal_address: Some("Novosibirsk, Mira st. 55"),
        phone: Some("383 210 77 31"),
        email: Some("klen@sibklen.ru"),
        inn: Some("5401234567"),
        rating: Some(9),
    },
];

pub(crate) const REQUESTS: [DemoRequest; 14] = [
    DemoRequest {
        product: 0,
        partner: 0,
        quantity: 1_500,
    },
    DemoRequest {
        product: 5,
        partner: 0,
        quantity: 3_000,
    },
    DemoRequest {
        product: 1,
        partner: 1,
        quantity: 420,
    },
    DemoRequest {
        product: 2,
        partner: 1,
        quantity: 75,
    },
    DemoRequest {
        product: 6,
        partner: 1,
        quantity: 900,
    },
    DemoRequest {
        product: 3,
        partner: 2,
        quantity: 1_200,
    },
    DemoRequest {
        product: 7,
        partner: 2,
        quantity: 40,
    },
    DemoRequest {
        product: 4,
        partner: 3,
        quantity: 260,
    },
    DemoRequest {
        product: 0,
        partner: 3,
        quantity: 800,
    },
    DemoRequest {
        product: 5,
        partner: 4,
        quantity: 150,
    },
    DemoRequest {
        product: 3,
        partner: 4,
        quantity: 600,
    },
    DemoRequest {
        product: 1,
        partner: 5,
        quantity: 2_200,
    },
    DemoRequest {
        product: 2,
        partner: 5,
        quantity: 120,
    },
    DemoRequest {
        product: 6,
        partner: 5,
        quantity: 1_000,
    },
];

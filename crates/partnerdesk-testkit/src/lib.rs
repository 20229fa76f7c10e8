// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use partnerdesk_app::{PartnerFormInput, PartnerType};
use std::path::PathBuf;

const PRODUCT_KINDS: [&str; 10] = [
    "Laminate",
    "Parquet board",
    "Engineered board",
    "Vinyl plank",
    "Cork panel",
    "Skirting board",
    "Underlay roll",
    "Stair tread",
    "Threshold strip",
    "Floor adhesive",
];

const PRODUCT_FINISHES: [&str; 8] = [
    "oak", "ash", "walnut", "pine", "birch", "grey", "white", "smoked",
];

const COMPANY_ROOTS: [&str; 14] = [
    "Stroymontazh",
    "Parket Plus",
    "Mebelny Dvor",
    "Dom i Sad",
    "Severny Les",
    "Uralstroy",
    "Polservis",
    "Derevo Grupp",
    "Masterpol",
    "Volga Interer",
    "Remont Expert",
    "Tekhnostroy",
    "Laminat Center",
    "Sibirsky Klen",
];

const FIRST_NAMES: [&str; 12] = [
    "Ivan", "Olga", "Sergey", "Anna", "Dmitry", "Elena", "Pavel", "Irina", "Alexey", "Natalia",
    "Mikhail", "Tatiana",
];
const LAST_NAMES: [&str; 12] = [
    "Ivanov", "Petrova", "Sokolov", "Kuznetsova", "Orlov", "Volkova", "Lebedev", "Morozova",
    "Novikov", "Fedorova", "Popov", "Smirnova",
];

const CITIES: [&str; 10] = [
    "Moscow",
    "Saint Petersburg",
    "Kazan",
    "Yekaterinburg",
    "Novosibirsk",
    "Samara",
    "Perm",
    "Tver",
    "Kaluga",
    "Vologda",
];
const STREET_NAMES: [&str; 10] = [
    "Lenina",
    "Sovetskaya",
    "Mira",
    "Sadovaya",
    "Lesnaya",
    "Gagarina",
    "Pushkina",
    "Naberezhnaya",
    "Zavodskaya",
    "Molodezhnaya",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSeed {
    pub name: String,
    pub min_price: f64,
}

/// A request between the `product_index`-th product and the
/// `partner_index`-th partner of the same catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSeed {
    pub product_index: usize,
    pub partner_index: usize,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoCatalogue {
    pub products: Vec<ProductSeed>,
    pub partners: Vec<PartnerFormInput>,
    pub requests: Vec<RequestSeed>,
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone)]
pub struct PartnerFaker {
    rng: DeterministicRng,
}

impl PartnerFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn product(&mut self) -> ProductSeed {
        let kind = self.pick(&PRODUCT_KINDS);
        let finish = self.pick(&PRODUCT_FINISHES);
        let rubles = self.int_range_i32(150, 9_500);
        let kopecks = self.int_range_i32(0, 99);
        ProductSeed {
            name: format!("{kind} {finish}"),
            min_price: f64::from(rubles) + f64::from(kopecks) / 100.0,
        }
    }

    /// Fills every field. Use [`PartnerFaker::sparse_partner`] for a row with
    /// blank optionals.
    pub fn partner(&mut self) -> PartnerFormInput {
        let partner_type = PartnerType::ALL[self.rng.int_n(PartnerType::ALL.len())];
        let root = self.pick(&COMPANY_ROOTS);
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        PartnerFormInput {
            partner_type,
            name: root.to_owned(),
            director_name: format!("{last} {first}"),
            legal_address: Some(format!(
                "{}, {} st. {}",
                self.pick(&CITIES),
                self.pick(&STREET_NAMES),
                self.int_range_i32(1, 120),
            )),
            phone: Some(format!(
                "{:03} {:03} {:02} {:02}",
                self.int_range_i32(900, 999),
                self.int_range_i32(0, 999),
                self.int_range_i32(0, 99),
                self.int_range_i32(0, 99),
            )),
            email: Some(format!(
                "{}@{}.ru",
                last.to_ascii_lowercase(),
                root.to_ascii_lowercase().replace(' ', "-")
            )),
            inn: Some(format!("{:010}", self.int_range_i64(1_000_000_000, 9_999_999_999))),
            rating: Some(self.int_range_i32(1, 10)),
        }
    }

    pub fn sparse_partner(&mut self) -> PartnerFormInput {
        PartnerFormInput {
            legal_address: None,
            phone: None,
            email: None,
            inn: None,
            rating: None,
            ..self.partner()
        }
    }

    pub fn quantity(&mut self) -> i32 {
        self.int_range_i32(1, 5_000)
    }

    /// Products, partners and requests for bulk store tests. Roughly one
    /// partner in four leaves its optional columns blank.
    pub fn catalogue(
        &mut self,
        product_count: usize,
        partner_count: usize,
        request_count: usize,
    ) -> DemoCatalogue {
        let products = (0..product_count).map(|_| self.product()).collect();
        let partners = (0..partner_count)
            .map(|_| {
                if self.rng.int_n(4) == 0 {
                    self.sparse_partner()
                } else {
                    self.partner()
                }
            })
            .collect();
        let mut requests = Vec::with_capacity(request_count);
        if product_count > 0 && partner_count > 0 {
            for _ in 0..request_count {
                requests.push(RequestSeed {
                    product_index: self.rng.int_n(product_count),
                    partner_index: self.rng.int_n(partner_count),
                    quantity: self.quantity(),
                });
            }
        }
        DemoCatalogue {
            products,
            partners,
            requests,
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = i64::from(max) - i64::from(min) + 1;
        let offset = (self.rng.next_u64() % (span as u64)) as i64;
        (i64::from(min) + offset) as i32
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("partnerdesk.db");
    Ok((dir, db_path))
}

/// Fixed reference rows for tests that need known names and prices.
pub fn fixture_products() -> Vec<ProductSeed> {
    vec![
        ProductSeed {
            name: "Laminate oak".to_owned(),
            min_price: 1_000.0,
        },
        ProductSeed {
            name: "Parquet board ash".to_owned(),
            min_price: 2_500.5,
        },
        ProductSeed {
            name: "Skirting board white".to_owned(),
            min_price: 120.25,
        },
    ]
}

pub fn fixture_partner(name: &str) -> PartnerFormInput {
    PartnerFormInput {
        partner_type: PartnerType::Ooo,
        name: name.to_owned(),
        director_name: "Orlov Ivan".to_owned(),
        legal_address: Some("Moscow, Lenina st. 1".to_owned()),
        phone: Some("495 123 45 67".to_owned()),
        email: None,
        inn: None,
        rating: Some(7),
    }
}

pub fn product_kinds() -> &'static [&'static str] {
    &PRODUCT_KINDS
}

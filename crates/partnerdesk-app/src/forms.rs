// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::validation::{ValidationResult, optional_text, parse_optional_rating, parse_quantity};
use crate::{
    Partner, PartnerId, PartnerType, Product, ProductId, Request, RequestId, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Request,
    Partner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(RequestId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFormInput {
    pub product_id: ProductId,
    pub partner_id: PartnerId,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerFormInput {
    pub partner_type: PartnerType,
    pub name: String,
    pub director_name: String,
    pub legal_address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub inn: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Request {
        mode: EditorMode,
        input: RequestFormInput,
    },
    Partner(PartnerFormInput),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Request { .. } => FormKind::Request,
            Self::Partner(_) => FormKind::Partner,
        }
    }
}

/// Raw, unvalidated state of the request form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestDraft {
    pub product_id: Option<ProductId>,
    pub partner_id: Option<PartnerId>,
    pub quantity: String,
}

impl RequestDraft {
    pub fn validate(&self) -> ValidationResult<RequestFormInput> {
        let quantity = parse_quantity(&self.quantity)?;
        let (Some(product_id), Some(partner_id)) = (self.product_id, self.partner_id) else {
            return Err(ValidationError::MissingSelection);
        };
        Ok(RequestFormInput {
            product_id,
            partner_id,
            quantity,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    Product,
    Partner,
    Quantity,
}

impl RequestField {
    pub const ALL: [Self; 3] = [Self::Product, Self::Partner, Self::Quantity];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Partner => "partner",
            Self::Quantity => "quantity",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestEditor {
    pub mode: EditorMode,
    pub products: Vec<Product>,
    pub partners: Vec<Partner>,
    pub draft: RequestDraft,
    pub field: RequestField,
    pub error: Option<ValidationError>,
}

impl RequestEditor {
    pub fn open_create(products: Vec<Product>, partners: Vec<Partner>) -> Self {
        Self {
            mode: EditorMode::Create,
            products,
            partners,
            draft: RequestDraft::default(),
            field: RequestField::Product,
            error: None,
        }
    }

    /// Preselects the request's product and partner when they are still
    /// among the loaded choices; a dangling reference stays unselected.
    pub fn open_edit(request: &Request, products: Vec<Product>, partners: Vec<Partner>) -> Self {
        let product_id = products
            .iter()
            .any(|product| product.id == request.product_id)
            .then_some(request.product_id);
        let partner_id = partners
            .iter()
            .any(|partner| partner.id == request.partner_id)
            .then_some(request.partner_id);
        Self {
            mode: EditorMode::Edit(request.id),
            products,
            partners,
            draft: RequestDraft {
                product_id,
                partner_id,
                quantity: request.quantity.to_string(),
            },
            field: RequestField::Product,
            error: None,
        }
    }

    pub const fn title(&self) -> &'static str {
        match self.mode {
            EditorMode::Create => "create request",
            EditorMode::Edit(_) => "edit request",
        }
    }

    pub fn move_field(&mut self, delta: isize) {
        self.field = rotate(&RequestField::ALL, self.field, delta);
    }

    /// Steps the selection of the focused choice field through its options.
    pub fn cycle_choice(&mut self, delta: isize) {
        match self.field {
            RequestField::Product => {
                let ids = self.products.iter().map(|p| p.id).collect::<Vec<_>>();
                self.draft.product_id = step_choice(&ids, self.draft.product_id, delta);
            }
            RequestField::Partner => {
                let ids = self.partners.iter().map(|p| p.id).collect::<Vec<_>>();
                self.draft.partner_id = step_choice(&ids, self.draft.partner_id, delta);
            }
            RequestField::Quantity => {}
        }
    }

    pub fn push_char(&mut self, ch: char) {
        if self.field == RequestField::Quantity {
            self.draft.quantity.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if self.field == RequestField::Quantity {
            self.draft.quantity.pop();
        }
    }

    pub fn product_label(&self) -> String {
        self.draft
            .product_id
            .and_then(|id| self.products.iter().find(|product| product.id == id))
            .map(Product::choice_label)
            .unwrap_or_default()
    }

    pub fn partner_label(&self) -> String {
        self.draft
            .partner_id
            .and_then(|id| self.partners.iter().find(|partner| partner.id == id))
            .map(Partner::choice_label)
            .unwrap_or_default()
    }

    pub fn field_value(&self, field: RequestField) -> String {
        match field {
            RequestField::Product => self.product_label(),
            RequestField::Partner => self.partner_label(),
            RequestField::Quantity => self.draft.quantity.clone(),
        }
    }

    pub fn submit(&mut self) -> ValidationResult<FormPayload> {
        match self.draft.validate() {
            Ok(input) => {
                self.error = None;
                Ok(FormPayload::Request {
                    mode: self.mode,
                    input,
                })
            }
            Err(error) => {
                self.error = Some(error);
                Err(error)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartnerDraft {
    pub partner_type: Option<PartnerType>,
    pub name: String,
    pub director_name: String,
    pub legal_address: String,
    pub phone: String,
    pub email: String,
    pub inn: String,
    pub rating: String,
}

impl PartnerDraft {
    pub fn validate(&self) -> ValidationResult<PartnerFormInput> {
        let Some(partner_type) = self.partner_type else {
            return Err(ValidationError::MissingPartnerType);
        };
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingPartnerName);
        }
        let director_name = self.director_name.trim();
        if director_name.is_empty() {
            return Err(ValidationError::MissingDirectorName);
        }
        let rating = parse_optional_rating(&self.rating)?;

        Ok(PartnerFormInput {
            partner_type,
            name: name.to_owned(),
            director_name: director_name.to_owned(),
            legal_address: optional_text(&self.legal_address),
            phone: optional_text(&self.phone),
            email: optional_text(&self.email),
            inn: optional_text(&self.inn),
            rating,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerField {
    PartnerType,
    Name,
    DirectorName,
    LegalAddress,
    Phone,
    Email,
    Inn,
    Rating,
}

impl PartnerField {
    pub const ALL: [Self; 8] = [
        Self::PartnerType,
        Self::Name,
        Self::DirectorName,
        Self::LegalAddress,
        Self::Phone,
        Self::Email,
        Self::Inn,
        Self::Rating,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::PartnerType => "partner type",
            Self::Name => "partner name",
            Self::DirectorName => "director",
            Self::LegalAddress => "legal address",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Inn => "INN",
            Self::Rating => "rating",
        }
    }

    pub const fn required(self) -> bool {
        matches!(self, Self::PartnerType | Self::Name | Self::DirectorName)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerEditor {
    pub draft: PartnerDraft,
    pub field: PartnerField,
    pub error: Option<ValidationError>,
}

impl Default for PartnerEditor {
    fn default() -> Self {
        Self {
            draft: PartnerDraft::default(),
            field: PartnerField::PartnerType,
            error: None,
        }
    }
}

impl PartnerEditor {
    pub fn open() -> Self {
        Self::default()
    }

    pub const fn title(&self) -> &'static str {
        "create partner"
    }

    pub fn move_field(&mut self, delta: isize) {
        self.field = rotate(&PartnerField::ALL, self.field, delta);
    }

    pub fn cycle_choice(&mut self, delta: isize) {
        if self.field == PartnerField::PartnerType {
            self.draft.partner_type = step_choice(&PartnerType::ALL, self.draft.partner_type, delta);
        }
    }

    pub fn push_char(&mut self, ch: char) {
        if let Some(text) = self.text_mut(self.field) {
            text.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(text) = self.text_mut(self.field) {
            text.pop();
        }
    }

    pub fn field_value(&self, field: PartnerField) -> String {
        let draft = &self.draft;
        match field {
            PartnerField::PartnerType => draft
                .partner_type
                .map(PartnerType::choice_label)
                .unwrap_or_default(),
            PartnerField::Name => draft.name.clone(),
            PartnerField::DirectorName => draft.director_name.clone(),
            PartnerField::LegalAddress => draft.legal_address.clone(),
            PartnerField::Phone => draft.phone.clone(),
            PartnerField::Email => draft.email.clone(),
            PartnerField::Inn => draft.inn.clone(),
            PartnerField::Rating => draft.rating.clone(),
        }
    }

    pub fn submit(&mut self) -> ValidationResult<FormPayload> {
        match self.draft.validate() {
            Ok(input) => {
                self.error = None;
                Ok(FormPayload::Partner(input))
            }
            Err(error) => {
                self.error = Some(error);
                Err(error)
            }
        }
    }

    fn text_mut(&mut self, field: PartnerField) -> Option<&mut String> {
        let draft = &mut self.draft;
        match field {
            PartnerField::PartnerType => None,
            PartnerField::Name => Some(&mut draft.name),
            PartnerField::DirectorName => Some(&mut draft.director_name),
            PartnerField::LegalAddress => Some(&mut draft.legal_address),
            PartnerField::Phone => Some(&mut draft.phone),
            PartnerField::Email => Some(&mut draft.email),
            PartnerField::Inn => Some(&mut draft.inn),
            PartnerField::Rating => Some(&mut draft.rating),
        }
    }
}

fn rotate<T: Copy + PartialEq>(all: &[T], current: T, delta: isize) -> T {
    let index = all.iter().position(|item| *item == current).unwrap_or(0) as isize;
    let len = all.len() as isize;
    all[(index + delta).rem_euclid(len) as usize]
}

/// With nothing selected, a forward step picks the first option and a
/// backward step the last.
fn step_choice<T: Copy + PartialEq>(options: &[T], current: Option<T>, delta: isize) -> Option<T> {
    if options.is_empty() {
        return None;
    }
    let len = options.len() as isize;
    let next = match current.and_then(|value| options.iter().position(|option| *option == value)) {
        Some(index) => (index as isize + delta).rem_euclid(len),
        None if delta >= 0 => 0,
        None => len - 1,
    };
    Some(options[next as usize])
}

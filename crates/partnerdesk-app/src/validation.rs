// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::num::IntErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("quantity must be a positive whole number")]
    InvalidQuantity,
    #[error("quantity is too large -- enter at most {}", i32::MAX)]
    QuantityTooLarge,
    #[error("choose a product and a partner")]
    MissingSelection,
    #[error("partner type is required -- choose a type and retry")]
    MissingPartnerType,
    #[error("partner name is required -- enter a name and retry")]
    MissingPartnerName,
    #[error("director name is required -- enter a name and retry")]
    MissingDirectorName,
    #[error("rating must be a whole number")]
    InvalidRating,
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

pub fn parse_quantity(input: &str) -> ValidationResult<i32> {
    let value = input
        .trim()
        .parse::<i32>()
        .map_err(|err| match err.kind() {
            IntErrorKind::PosOverflow => ValidationError::QuantityTooLarge,
            _ => ValidationError::InvalidQuantity,
        })?;
    if value <= 0 {
        return Err(ValidationError::InvalidQuantity);
    }
    Ok(value)
}

pub fn parse_optional_rating(input: &str) -> ValidationResult<Option<i32>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidRating)
}

/// Trims the input; blank becomes `None` so the column is stored as NULL.
pub fn optional_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

pub fn format_money(value: f64) -> String {
    let cents = (value * 100.0).round();
    let (sign, cents) = if cents < 0.0 {
        ("-", -cents)
    } else {
        ("", cents)
    };
    let cents = cents as u64;
    format!("{sign}{}.{:02}", comma_format(cents / 100), cents % 100)
}

fn comma_format(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let mut chars = digits.chars().collect::<Vec<_>>();
    let mut count = 0usize;
    while let Some(ch) = chars.pop() {
        if count == 3 {
            out.push(',');
            count = 0;
        }
        out.push(ch);
        count += 1;
    }
    out.chars().rev().collect()
}

//! Generation profile: prompt template and sampling parameters shared by all
//! providers, plus boundary parsers for user-typed numbers.
//!
//! The registry setters store whatever they are handed. Text coming from a
//! form or a command line should go through [`parse_max_tokens`] and
//! [`parse_temperature`] first.

use crate::{Result, TldwError};

/// Upper bound accepted by [`parse_temperature`].
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Prompt template and sampling parameters used for every summary.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationProfile {
    pub custom_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Parse a max-tokens value typed by the user.
///
/// Rejects non-numeric input and zero.
pub fn parse_max_tokens(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    let value: u32 = trimmed.parse().map_err(|_| {
        TldwError::Validation(format!("max tokens must be a positive integer, got {trimmed:?}"))
    })?;
    if value == 0 {
        return Err(TldwError::Validation(
            "max tokens must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}

/// Parse a temperature typed by the user.
///
/// Rejects non-numeric and non-finite input and anything outside
/// `0.0..=MAX_TEMPERATURE`.
pub fn parse_temperature(input: &str) -> Result<f32> {
    let trimmed = input.trim();
    let value: f32 = trimmed.parse().map_err(|_| {
        TldwError::Validation(format!("temperature must be a number, got {trimmed:?}"))
    })?;
    if !value.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&value) {
        return Err(TldwError::Validation(format!(
            "temperature must be between 0 and {MAX_TEMPERATURE}, got {trimmed}"
        )));
    }
    Ok(value)
}

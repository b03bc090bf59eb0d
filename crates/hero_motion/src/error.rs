//! Variant validation errors

use thiserror::Error;

use crate::variant::VariantState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariantError {
    #[error("variant '{name}' has a non-finite {state} value")]
    NonFinite { name: String, state: VariantState },

    #[error("variant '{name}' animates different properties in hidden and visible")]
    PropertyMismatch { name: String },

    #[error("variant '{name}' uses a cubic bezier with x outside [0, 1]")]
    InvalidEasing { name: String },
}

pub type Result<T> = std::result::Result<T, VariantError>;

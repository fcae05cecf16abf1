//! Identity validation rules.
//!
//! Pure checks run before an identity is constructed. The first failing
//! rule wins, in the order email, CPF, age.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::config::{
    CPF_LENGTH, ERR_MSG_INVALID_AGE, ERR_MSG_INVALID_CPF, ERR_MSG_INVALID_EMAIL, MAX_AGE, MIN_AGE,
};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// One variant per rejected attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", ERR_MSG_INVALID_EMAIL)]
    InvalidEmail,

    #[error("{}", ERR_MSG_INVALID_CPF)]
    InvalidNationalId,

    #[error("{}", ERR_MSG_INVALID_AGE)]
    InvalidAge,
}

impl ValidationError {
    /// Request field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidEmail => "email",
            ValidationError::InvalidNationalId => "cpf",
            ValidationError::InvalidAge => "age",
        }
    }
}

/// Validate the attributes of a prospective identity.
pub fn validate_identity(email: &str, cpf: &str, age: i32) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_cpf(cpf)?;
    validate_age(age)
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn validate_age(age: i32) -> Result<(), ValidationError> {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        Ok(())
    } else {
        Err(ValidationError::InvalidAge)
    }
}

/// Strip everything but ASCII digits, e.g. `152.459.018-54` -> `15245901854`.
pub fn normalize_cpf(cpf: &str) -> String {
    cpf.chars().filter(char::is_ascii_digit).collect()
}

/// Validate a CPF, accepting punctuated or bare input.
pub fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    let digits: Vec<u32> = normalize_cpf(cpf)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != CPF_LENGTH {
        return Err(ValidationError::InvalidNationalId);
    }

    if digits.iter().all(|d| *d == digits[0]) {
        return Err(ValidationError::InvalidNationalId);
    }

    if check_digit(&digits[..9]) != digits[9] || check_digit(&digits[..10]) != digits[10] {
        return Err(ValidationError::InvalidNationalId);
    }

    Ok(())
}

/// Weighted mod-11 check digit. Weights run from `len + 1` down to 2.
fn check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();

    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

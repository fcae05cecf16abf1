//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.
//!
//! Contains: Entities, Value Objects, identity validation rules.

pub mod password;
pub mod user;
pub mod validation;

pub use password::Password;
pub use user::{NewIdentity, NewUser, User, UserResponse};
pub use validation::{
    normalize_cpf, validate_age, validate_cpf, validate_email, validate_identity, ValidationError,
};

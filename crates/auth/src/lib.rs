//! `gemcart-auth`: user accounts and self-service registration.
//!
//! This crate is intentionally decoupled from HTTP and storage. Sessions and
//! sign-in are handled by the external auth provider.

pub mod registration;
pub mod roles;
pub mod user;

pub use registration::{hash_password_with_cost, PasswordHashError, Registration, ValidRegistration, PASSWORD_HASH_COST};
pub use roles::Role;
pub use user::{PublicUser, User};

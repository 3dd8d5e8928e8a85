//! `gemcart-core`: shared building blocks for the storefront backend.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Entity, Record, RecordKind};
pub use error::{DomainError, DomainResult};
pub use id::EntityId;

//! Catalog domain module.
//!
//! Products, categories and testimonials as stored documents, together with the
//! typed payloads used to create them (drafts) and to change them (patches).
//! Pure domain logic: no IO, no HTTP, no storage.

pub mod category;
pub mod entity;
pub mod fields;
pub mod product;
pub mod testimonial;

pub use category::{Category, CategoryPatch, NewCategory};
pub use entity::CatalogEntity;
pub use fields::Amount;
pub use product::{NewProduct, Product, ProductAttributes, ProductPatch};
pub use testimonial::{NewTestimonial, Testimonial};

//! HTTP API for the storefront and its admin panel.

pub mod app;

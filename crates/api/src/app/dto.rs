use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use gemcart_catalog::{Category, Product};
use gemcart_core::{EntityId, RecordKind};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of a DELETE: `{ "id": "..." }`.
#[derive(Debug, Default, Deserialize)]
pub struct IdRequest {
    pub id: Option<String>,
}

/// Body of a PUT: the record id next to the patch fields.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest<P> {
    pub id: Option<String>,
    #[serde(flatten)]
    pub patch: P,
}

/// Id taken from a request body; 400 when absent or malformed.
pub fn require_id(raw: Option<&str>, kind: RecordKind) -> Result<EntityId, Response> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        errors::json_error(StatusCode::BAD_REQUEST, format!("{} ID is required", kind.label()))
    })?;
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, format!("Invalid {} ID format", kind.as_str()))
    })
}

// -------------------------
// Response mapping
// -------------------------

/// Category names by id, for populating product listings.
pub fn category_names(categories: &[Category]) -> HashMap<EntityId, &str> {
    categories.iter().map(|c| (c.id, c.name.as_str())).collect()
}

/// Product JSON with `category` populated as `{_id, name}` (or `null` when the
/// category no longer exists).
pub fn product_to_json(product: &Product, names: &HashMap<EntityId, &str>) -> Value {
    let mut value = serde_json::to_value(product).unwrap_or(Value::Null);
    if let Value::Object(fields) = &mut value {
        let category = match names.get(&product.category) {
            Some(name) => json!({ "_id": product.category, "name": name }),
            None => Value::Null,
        };
        fields.insert("category".to_string(), category);
    }
    value
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_products: usize,
    pub total_categories: usize,
    pub featured_products: usize,
    /// Newest five, category populated.
    pub recent_products: Vec<Value>,
    /// Every category, including empty ones, in listing order.
    pub products_per_category: Vec<CategoryCount>,
}

pub const RECENT_PRODUCTS: usize = 5;

/// `products` and `categories` are expected newest first, as stores list them.
pub fn dashboard(products: &[Product], categories: &[Category]) -> Dashboard {
    let names = category_names(categories);

    let mut counts: HashMap<EntityId, usize> = HashMap::new();
    for product in products {
        *counts.entry(product.category).or_default() += 1;
    }

    Dashboard {
        total_products: products.len(),
        total_categories: categories.len(),
        featured_products: products.iter().filter(|p| p.featured).count(),
        recent_products: products
            .iter()
            .take(RECENT_PRODUCTS)
            .map(|p| product_to_json(p, &names))
            .collect(),
        products_per_category: categories
            .iter()
            .map(|c| CategoryCount {
                id: c.id,
                name: c.name.clone(),
                count: counts.get(&c.id).copied().unwrap_or(0),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gemcart_catalog::{CatalogEntity, NewCategory, NewProduct};

    fn category(name: &str) -> Category {
        let draft = NewCategory {
            name: Some(name.to_string()),
            slug: Some(name.to_lowercase()),
            ..NewCategory::default()
        };
        Category::from_draft(EntityId::new(), draft, Utc::now()).unwrap()
    }

    fn product(slug: &str, category: EntityId, featured: bool) -> Product {
        let draft: NewProduct = serde_json::from_value(json!({
            "name": slug,
            "description": "silver",
            "price": 40,
            "images": ["https://host/shop/p.jpg"],
            "category": category.to_string(),
            "featured": featured,
            "slug": slug,
        }))
        .unwrap();
        Product::from_draft(EntityId::new(), draft, Utc::now()).unwrap()
    }

    #[test]
    fn require_id_distinguishes_missing_and_malformed() {
        let missing = require_id(None, RecordKind::Product).unwrap_err();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let blank = require_id(Some("  "), RecordKind::Category).unwrap_err();
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

        let malformed = require_id(Some("not-an-id"), RecordKind::Product).unwrap_err();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let id = EntityId::new();
        assert_eq!(require_id(Some(&id.to_string()), RecordKind::Product).unwrap(), id);
    }

    #[test]
    fn update_request_separates_id_from_patch() {
        let req: UpdateRequest<gemcart_catalog::CategoryPatch> =
            serde_json::from_value(json!({ "id": "abc", "name": "Rings", "image": null })).unwrap();
        assert_eq!(req.id.as_deref(), Some("abc"));
        assert_eq!(req.patch.name.as_deref(), Some("Rings"));
        assert_eq!(req.patch.image, Some(None));
        assert_eq!(req.patch.description, None);
    }

    #[test]
    fn products_are_populated_with_category_name() {
        let rings = category("Rings");
        let p = product("halo", rings.id, false);
        let orphan = product("orphan", EntityId::new(), false);
        let names = category_names(std::slice::from_ref(&rings));

        let json = product_to_json(&p, &names);
        assert_eq!(json["category"]["_id"], rings.id.to_string());
        assert_eq!(json["category"]["name"], "Rings");
        assert_eq!(json["slug"], "halo");

        assert!(product_to_json(&orphan, &names)["category"].is_null());
    }

    #[test]
    fn dashboard_counts_products() {
        let rings = category("Rings");
        let chains = category("Chains");
        let products: Vec<Product> = (0..7)
            .map(|i| product(&format!("ring-{i}"), rings.id, i % 3 == 0))
            .collect();
        let categories = vec![rings.clone(), chains.clone()];

        let d = dashboard(&products, &categories);

        assert_eq!(d.total_products, 7);
        assert_eq!(d.total_categories, 2);
        assert_eq!(d.featured_products, 3);
        assert_eq!(d.recent_products.len(), RECENT_PRODUCTS);
        assert_eq!(d.recent_products[0]["slug"], "ring-0");
        assert_eq!(d.products_per_category[0].count, 7);
        assert_eq!(d.products_per_category[1].name, "Chains");
        assert_eq!(d.products_per_category[1].count, 0);
    }
}

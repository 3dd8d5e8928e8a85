use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gemcart_core::{DomainError, DomainResult, Entity, EntityId, Record, RecordKind};

use crate::entity::CatalogEntity;
use crate::fields::{filled, non_blank, present, Amount};

const MISSING_FIELDS: &str =
    "Missing required fields (name, description, price, images, category, slug)";

/// Optional descriptive attributes of a piece of jewelry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemstone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purity: Option<String>,
}

impl ProductAttributes {
    /// Drop blank values; the admin form submits `""` for untouched inputs.
    fn normalized(self) -> Self {
        Self {
            material: filled(self.material),
            weight: filled(self.weight),
            dimensions: filled(self.dimensions),
            gemstone: filled(self.gemstone),
            purity: filled(self.purity),
        }
    }
}

/// A product listed in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    pub images: Vec<String>,
    /// Weak reference; checked when set, never afterwards.
    pub category: EntityId,
    pub in_stock: bool,
    pub featured: bool,
    #[serde(default)]
    pub attributes: ProductAttributes,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload for a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Amount>,
    pub discount_price: Option<Amount>,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub attributes: Option<ProductAttributes>,
    pub slug: Option<String>,
}

/// Allow-listed update fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Amount>,
    #[serde(default, deserialize_with = "present")]
    pub discount_price: Option<Option<Amount>>,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub attributes: Option<ProductAttributes>,
    pub slug: Option<String>,
}

fn parse_price(amount: &Amount) -> DomainResult<f64> {
    let price = amount.value("price")?;
    if price <= 0.0 {
        return Err(DomainError::validation("price must be greater than zero"));
    }
    Ok(price)
}

fn parse_discount(amount: Option<&Amount>) -> DomainResult<Option<f64>> {
    match amount {
        None => Ok(None),
        Some(a) if a.is_blank() => Ok(None),
        Some(a) => {
            let v = a.value("discountPrice")?;
            if v < 0.0 {
                return Err(DomainError::validation("discountPrice cannot be negative"));
            }
            Ok(Some(v))
        }
    }
}

fn parse_category(raw: &str) -> DomainResult<EntityId> {
    raw.parse()
        .map_err(|_| DomainError::validation("Invalid category ID format"))
}

fn filled_images(images: Vec<String>) -> Vec<String> {
    images.into_iter().filter(|s| !s.trim().is_empty()).collect()
}

impl Entity for Product {
    type Id = EntityId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Product {
    const KIND: RecordKind = RecordKind::Product;

    fn unique_key(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl CatalogEntity for Product {
    type Draft = NewProduct;
    type Patch = ProductPatch;

    fn from_draft(id: EntityId, draft: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        let images = draft.images.map(filled_images).unwrap_or_default();
        let price = draft.price.filter(|p| !p.is_blank());

        let (Some(name), Some(description), Some(price), Some(category), Some(slug)) = (
            filled(draft.name),
            filled(draft.description),
            price,
            filled(draft.category),
            filled(draft.slug),
        ) else {
            return Err(DomainError::validation(MISSING_FIELDS));
        };
        if images.is_empty() {
            return Err(DomainError::validation(MISSING_FIELDS));
        }

        Ok(Self {
            id,
            name,
            description,
            price: parse_price(&price)?,
            discount_price: parse_discount(draft.discount_price.as_ref())?,
            images,
            category: parse_category(&category)?,
            in_stock: draft.in_stock.unwrap_or(true),
            featured: draft.featured.unwrap_or(false),
            attributes: draft.attributes.unwrap_or_default().normalized(),
            slug,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        // Validate everything before touching `self`.
        let name = patch.name.map(|v| non_blank("name", v)).transpose()?;
        let description = patch.description.map(|v| non_blank("description", v)).transpose()?;
        let slug = patch.slug.map(|v| non_blank("slug", v)).transpose()?;
        let price = patch.price.as_ref().map(parse_price).transpose()?;
        let discount_price = patch
            .discount_price
            .as_ref()
            .map(|d| parse_discount(d.as_ref()))
            .transpose()?;
        let category = patch.category.as_deref().map(parse_category).transpose()?;
        let images = match patch.images.map(filled_images) {
            Some(images) if images.is_empty() => {
                return Err(DomainError::validation("images cannot be empty"));
            }
            other => other,
        };

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = slug {
            self.slug = v;
        }
        if let Some(v) = price {
            self.price = v;
        }
        if let Some(v) = discount_price {
            self.discount_price = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = images {
            self.images = v;
        }
        if let Some(v) = patch.in_stock {
            self.in_stock = v;
        }
        if let Some(v) = patch.featured {
            self.featured = v;
        }
        if let Some(v) = patch.attributes {
            self.attributes = v.normalized();
        }
        self.updated_at = now;
        Ok(())
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn media_refs(&self) -> Vec<&str> {
        self.images.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(category: EntityId) -> NewProduct {
        serde_json::from_value(json!({
            "name": "Sapphire Halo Ring",
            "description": "18k white gold ring with a halo of diamonds",
            "price": "1299.00",
            "discountPrice": "",
            "images": [
                "https://res.example.com/shop/products/halo-1.jpg",
                "https://res.example.com/shop/products/halo-2.jpg"
            ],
            "category": category.to_string(),
            "attributes": { "material": "18k white gold", "weight": "", "gemstone": "sapphire" },
            "slug": "sapphire-halo-ring",
            "sku": "not-allow-listed"
        }))
        .unwrap()
    }

    #[test]
    fn draft_builds_product_with_defaults() {
        let category = EntityId::new();
        let p = Product::from_draft(EntityId::new(), draft(category), Utc::now()).unwrap();

        assert_eq!(p.name, "Sapphire Halo Ring");
        assert_eq!(p.price, 1299.0);
        assert_eq!(p.discount_price, None);
        assert_eq!(p.category, category);
        assert!(p.in_stock);
        assert!(!p.featured);
        assert_eq!(p.attributes.material.as_deref(), Some("18k white gold"));
        assert_eq!(p.attributes.weight, None);
        assert_eq!(p.media_refs().len(), 2);
        assert_eq!(p.unique_key(), Some("sapphire-halo-ring"));
    }

    #[test]
    fn draft_without_images_is_missing_fields() {
        let mut d = draft(EntityId::new());
        d.images = Some(vec![]);
        let err = Product::from_draft(EntityId::new(), d, Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation(MISSING_FIELDS));
    }

    #[test]
    fn zero_price_counts_as_missing() {
        let mut d = draft(EntityId::new());
        d.price = Some(Amount::Number(0.0));
        let err = Product::from_draft(EntityId::new(), d, Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation(MISSING_FIELDS));
    }

    #[test]
    fn malformed_category_id_is_a_validation_error() {
        let mut d = draft(EntityId::new());
        d.category = Some("64f0c2a1b2".to_string());
        let err = Product::from_draft(EntityId::new(), d, Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("Invalid category ID format"));
    }

    #[test]
    fn patch_can_clear_discount_and_toggle_flags() {
        let mut d = draft(EntityId::new());
        d.discount_price = Some(Amount::Number(999.0));
        let mut p = Product::from_draft(EntityId::new(), d, Utc::now()).unwrap();
        assert_eq!(p.discount_price, Some(999.0));

        let patch: ProductPatch = serde_json::from_value(json!({
            "discountPrice": null,
            "featured": true,
            "inStock": false,
            "price": 1099
        }))
        .unwrap();
        p.apply_patch(patch, Utc::now()).unwrap();

        assert_eq!(p.discount_price, None);
        assert!(p.featured);
        assert!(!p.in_stock);
        assert_eq!(p.price, 1099.0);
        assert_eq!(p.name, "Sapphire Halo Ring");
    }

    #[test]
    fn rejected_patch_leaves_product_untouched() {
        let mut p = Product::from_draft(EntityId::new(), draft(EntityId::new()), Utc::now()).unwrap();
        let before = p.clone();
        let patch = ProductPatch {
            name: Some("Renamed".to_string()),
            images: Some(vec!["   ".to_string()]),
            ..ProductPatch::default()
        };

        let err = p.apply_patch(patch, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(p, before);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any positive finite price survives the draft unchanged.
            #[test]
            fn positive_prices_round_trip(price in 0.01f64..1_000_000.0) {
                let mut d = draft(EntityId::new());
                d.price = Some(Amount::Number(price));
                let p = Product::from_draft(EntityId::new(), d, Utc::now()).unwrap();
                prop_assert_eq!(p.price, price);
            }

            /// Property: negative prices never produce a product.
            #[test]
            fn negative_prices_are_rejected(price in -1_000_000.0f64..-0.01) {
                let mut d = draft(EntityId::new());
                d.price = Some(Amount::Number(price));
                prop_assert!(Product::from_draft(EntityId::new(), d, Utc::now()).is_err());
            }
        }
    }
}

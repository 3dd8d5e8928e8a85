use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gemcart_core::{DomainError, DomainResult, Entity, EntityId, Record, RecordKind};

use crate::fields::filled;

/// A customer testimonial shown on the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: String,
    pub review: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTestimonial {
    pub name: Option<String>,
    pub review: Option<String>,
    pub image: Option<String>,
}

impl NewTestimonial {
    pub fn into_testimonial(self, id: EntityId, now: DateTime<Utc>) -> DomainResult<Testimonial> {
        let (Some(name), Some(review)) = (filled(self.name), filled(self.review)) else {
            return Err(DomainError::validation("Missing required fields (name, review)"));
        };

        Ok(Testimonial {
            id,
            name,
            review,
            image: filled(self.image),
            created_at: now,
        })
    }
}

impl Entity for Testimonial {
    type Id = EntityId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Testimonial {
    const KIND: RecordKind = RecordKind::Testimonial;

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testimonial_requires_name_and_review() {
        let t = NewTestimonial {
            name: Some("Amelia".to_string()),
            review: None,
            image: None,
        };
        assert!(t.into_testimonial(EntityId::new(), Utc::now()).is_err());
    }

    #[test]
    fn testimonial_has_no_unique_key() {
        let t = NewTestimonial {
            name: Some("Amelia".to_string()),
            review: Some("The pendant arrived beautifully packed.".to_string()),
            image: Some(String::new()),
        }
        .into_testimonial(EntityId::new(), Utc::now())
        .unwrap();

        assert_eq!(t.unique_key(), None);
        assert_eq!(t.image, None);
    }
}

//! User account record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gemcart_core::{Entity, EntityId, Record, RecordKind};

use crate::registration::ValidRegistration;
use crate::Role;

/// A registered account. `email` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// What the API may reveal about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    /// New account with the default `user` role.
    pub fn register(
        id: EntityId,
        registration: ValidRegistration,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: registration.name,
            email: registration.email,
            password_hash,
            role: Role::User,
            created_at: now,
        }
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

impl Entity for User {
    type Id = EntityId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for User {
    const KIND: RecordKind = RecordKind::User;

    fn unique_key(&self) -> Option<&str> {
        Some(&self.email)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

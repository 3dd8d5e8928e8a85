use serde::{Deserialize, Serialize};

/// Account role. Self-registration always yields [`Role::User`]; admins are
/// provisioned through the auth provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_as_lowercase_strings() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        let admin: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(admin, Role::Admin);
        assert_eq!(Role::default().to_string(), "user");
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }
}

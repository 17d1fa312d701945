use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::users::permissions::DEFAULT_PERMISSIONS;
use crate::users::repo_types::{NewUser, User, UserChanges};

/// Request body for create and update. Absent and `null` fields both decode
/// to `None`, so the validator, not serde, reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub permissions: Option<String>,
}

impl UserPayload {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn age(&self) -> i64 {
        self.age.unwrap_or_default()
    }

    /// Row values for a create; empty permissions fall back to the default set.
    pub fn into_new_user(self) -> NewUser {
        let age = self.age();
        NewUser {
            username: self.username.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            age,
            permissions: non_empty(self.permissions)
                .unwrap_or_else(|| DEFAULT_PERMISSIONS.to_string()),
        }
    }

    /// Absent fields and zero values (empty strings, age 0) keep what is stored.
    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            username: non_empty(self.username),
            email: non_empty(self.email),
            age: self.age.filter(|age| *age != 0),
            permissions: non_empty(self.permissions),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Response for a successful create.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedUserResponse {
    pub ok: bool,
    pub user: User,
}

/// Response for a successful update or delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_decode_to_none() {
        let p: UserPayload = serde_json::from_str(r#"{"username":"testuser"}"#).unwrap();
        assert_eq!(p.username(), "testuser");
        assert_eq!(p.email(), "");
        assert_eq!(p.age(), 0);
        assert!(p.permissions.is_none());
    }

    #[test]
    fn null_fields_decode_like_missing_ones() {
        let p: UserPayload = serde_json::from_str(
            r#"{"username":null,"email":null,"age":null,"permissions":null}"#,
        )
        .unwrap();
        assert_eq!(p, UserPayload::default());
    }

    #[test]
    fn age_accepts_values_beyond_32_bits() {
        let p: UserPayload = serde_json::from_str(r#"{"age":5000000000}"#).unwrap();
        assert_eq!(p.age(), 5_000_000_000);
    }

    #[test]
    fn new_user_defaults_permissions() {
        for permissions in [None, Some(String::new())] {
            let p = UserPayload {
                username: Some("a".into()),
                email: Some("a@b".into()),
                age: Some(2),
                permissions,
            };
            assert_eq!(p.into_new_user().permissions, "PUT,DELETE");
        }
    }

    #[test]
    fn new_user_keeps_explicit_permissions() {
        let p = UserPayload {
            permissions: Some("DELETE".into()),
            ..Default::default()
        };
        assert_eq!(p.into_new_user().permissions, "DELETE");
    }

    #[test]
    fn changes_skip_zero_values() {
        let p = UserPayload {
            username: Some("renamed".into()),
            email: Some(String::new()),
            age: Some(0),
            permissions: None,
        };
        let c = p.into_changes();
        assert_eq!(c.username.as_deref(), Some("renamed"));
        assert!(c.email.is_none());
        assert!(c.age.is_none());
        assert!(c.permissions.is_none());
    }

    #[test]
    fn ok_response_shape() {
        let json = serde_json::to_value(OkResponse::ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true }));
    }
}

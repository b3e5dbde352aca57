use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::PasswordHasher;
use crate::database::models::{NewUser, User};
use crate::database::Store;
use crate::services::ServiceError;

pub const MIN_PASSWORD_BYTES: usize = 8;
pub const MAX_PASSWORD_BYTES: usize = 72;

/// A registration request whose fields are all strings.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub fullname: Option<String>,
}

impl Registration {
    /// Pull the registration fields out of a JSON body: required fields first, then types.
    pub fn from_json(body: &Value) -> Result<Self, ServiceError> {
        let object = body
            .as_object()
            .ok_or_else(|| ServiceError::validation("Request body must be a JSON object"))?;

        for field in ["username", "password"] {
            if !object.contains_key(field) {
                return Err(ServiceError::invalid_field(
                    format!("Missing '{}' in request body", field),
                    field,
                ));
            }
        }

        let username = string_field(body, "username")?.unwrap_or_default();
        let password = string_field(body, "password")?.unwrap_or_default();
        let mut fullname = string_field(body, "fullname")?;

        if fullname.is_none() {
            let first = string_field(body, "firstName")?;
            let last = string_field(body, "lastName")?;
            if let (Some(first), Some(last)) = (first, last) {
                fullname = Some(format!("{} {}", first, last));
            }
        }

        Ok(Self {
            username,
            password,
            fullname,
        })
    }
}

/// `Ok(None)` for absent or null, an error for anything but a string.
fn string_field(body: &Value, field: &str) -> Result<Option<String>, ServiceError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ServiceError::invalid_field(
            "Incorrect field type: expected string",
            field,
        )),
    }
}

/// Registration and credential checks
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
}

impl IdentityService {
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn register(&self, registration: Registration) -> Result<User, ServiceError> {
        let Registration {
            username,
            password,
            fullname,
        } = registration;

        for (field, value) in [("username", &username), ("password", &password)] {
            if value.trim() != value.as_str() {
                return Err(ServiceError::invalid_field(
                    "Either your password or username contain spaces!",
                    field,
                ));
            }
        }

        if username.is_empty() {
            return Err(ServiceError::invalid_field(
                "Username has to be at least 1 character!",
                "username",
            ));
        }

        if password.len() < MIN_PASSWORD_BYTES || password.len() > MAX_PASSWORD_BYTES {
            return Err(ServiceError::invalid_field(
                "Password does not meet required length. (At least 8 characters and no more than 72)",
                "password",
            ));
        }

        let fullname = fullname
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let password_hash = self.hasher.hash(&password).await?;

        let user = self
            .store
            .insert_user(NewUser {
                username,
                password_hash,
                fullname,
            })
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ServiceError::DuplicateUsername
                } else {
                    e.into()
                }
            })?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Exact username lookup plus bcrypt check. Unknown users and wrong passwords
    /// both come back as `InvalidCredentials`.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        let Some(user) = self.store.find_user_by_username(username).await? else {
            self.hasher.verify_dummy(password).await?;
            warn!("Login failed: no user named {}", username);
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            warn!("Login failed: wrong password for {}", username);
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn find_user(&self, id: uuid::Uuid) -> Result<User, ServiceError> {
        self.store
            .find_user_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BCRYPT_COST;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn service() -> IdentityService {
        let hasher = PasswordHasher::new(MIN_BCRYPT_COST).unwrap();
        IdentityService::new(Arc::new(MemoryStore::new()), hasher)
    }

    fn location(err: ServiceError) -> String {
        match err {
            ServiceError::InvalidField { location, .. } => location,
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn missing_fields_are_reported_before_types() {
        let err = Registration::from_json(&json!({ "username": 42 })).unwrap_err();
        assert_eq!(location(err), "password");
    }

    #[test]
    fn numbers_are_not_strings() {
        let err = Registration::from_json(&json!({ "username": "bob", "password": 12345678 })).unwrap_err();
        assert_eq!(location(err), "password");

        let err = Registration::from_json(&json!({ "username": "bob", "password": "password123", "fullname": 7 }))
            .unwrap_err();
        assert_eq!(location(err), "fullname");
    }

    #[test]
    fn first_and_last_name_build_fullname() {
        let reg = Registration::from_json(&json!({
            "username": "bob",
            "password": "password123",
            "firstName": "Bob",
            "lastName": "Loblaw"
        }))
        .unwrap();
        assert_eq!(reg.fullname.as_deref(), Some("Bob Loblaw"));
    }

    #[tokio::test]
    async fn register_rejects_padded_and_short_values() {
        let svc = service();
        let padded = Registration {
            username: " bob".into(),
            password: "password123".into(),
            fullname: None,
        };
        assert_eq!(location(svc.register(padded).await.unwrap_err()), "username");

        let short = Registration {
            username: "bob".into(),
            password: "short".into(),
            fullname: None,
        };
        assert_eq!(location(svc.register(short).await.unwrap_err()), "password");

        let long = Registration {
            username: "bob".into(),
            password: "x".repeat(73),
            fullname: None,
        };
        assert_eq!(location(svc.register(long).await.unwrap_err()), "password");
    }

    #[tokio::test]
    async fn register_then_verify() {
        let svc = service();
        let user = svc
            .register(Registration {
                username: "alice".into(),
                password: "password123".into(),
                fullname: Some("  Alice Liddell ".into()),
            })
            .await
            .unwrap();
        assert_eq!(user.fullname.as_deref(), Some("Alice Liddell"));
        assert_ne!(user.password_hash, "password123");

        let verified = svc.verify_credentials("alice", "password123").await.unwrap();
        assert_eq!(verified.id, user.id);

        assert!(matches!(
            svc.verify_credentials("alice", "wrong-password").await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.verify_credentials("nobody", "password123").await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_username_is_translated() {
        let svc = service();
        let reg = Registration {
            username: "alice".into(),
            password: "password123".into(),
            fullname: None,
        };
        svc.register(reg.clone()).await.unwrap();
        assert!(matches!(svc.register(reg).await, Err(ServiceError::DuplicateUsername)));
    }
}

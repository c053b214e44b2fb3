use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::access::{ResolvedIdentity, Role, RoleSet};
use crate::error::{AppError, AppResult};

/// Body of the identity endpoint.
///
/// Every field but `user` may be missing or `null`; both read as empty, so
/// `roles` becomes "no roles" and `is_super_admin` becomes `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPayload {
    pub user: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub personas: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_super_admin: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// The framework reports an anonymous caller as this user.
const GUEST_USER: &str = "Guest";

// RPC responses wrap the payload as {"message": {...}}.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Wrapped { message: IdentityPayload },
    Bare(IdentityPayload),
}

impl IdentityPayload {
    /// Decode either the bare object or the `{"message": ...}` envelope.
    pub fn from_json(body: &str) -> AppResult<Self> { Self::from_value(serde_json::from_str(body)?) }

    pub fn from_value(value: serde_json::Value) -> AppResult<Self> {
        let envelope: Envelope = serde_json::from_value(value)
            .map_err(|e| AppError::decode("identity_decode".to_string(), format!("unexpected identity body: {}", e)))?;
        Ok(match envelope {
            Envelope::Wrapped { message } => message,
            Envelope::Bare(p) => p,
        })
    }

    /// Reject the anonymous caller: an empty user or the framework's `Guest`.
    pub fn require_signed_in(self) -> AppResult<Self> {
        if self.user.trim().is_empty() || self.user == GUEST_USER {
            return Err(AppError::auth("not_logged_in", "no signed-in user"));
        }
        Ok(self)
    }

    /// Split role names into recognized roles and leftovers, in input order.
    pub fn partition_roles(&self) -> (RoleSet, Vec<String>) {
        let mut ignored = Vec::new();
        let mut known = Vec::new();
        for name in &self.roles {
            match Role::lookup(name) {
                Some(role) => known.push(role),
                None => ignored.push(name.clone()),
            }
        }
        (known.into_iter().collect(), ignored)
    }

    /// Unknown role names are dropped and logged.
    pub fn into_profile(self) -> UserProfile {
        let (roles, ignored_roles) = self.partition_roles();
        if !ignored_roles.is_empty() {
            warn!(target: "identity", user = %self.user, ignored = ?ignored_roles, "identity carries unrecognized roles");
        }
        UserProfile {
            identity: ResolvedIdentity::new(roles, self.is_super_admin),
            user: self.user,
            full_name: self.full_name,
            personas: self.personas,
            ignored_roles,
        }
    }

    /// Any unknown role name is a decode error.
    pub fn into_profile_strict(self) -> AppResult<UserProfile> {
        for name in &self.roles {
            if let Err(e) = name.parse::<Role>() {
                return Err(AppError::decode("unknown_role".to_string(), format!("user {}: {}", self.user, e)));
            }
        }
        Ok(self.into_profile())
    }

    pub fn into_profile_with(self, strict_roles: bool) -> AppResult<UserProfile> {
        if strict_roles { self.into_profile_strict() } else { Ok(self.into_profile()) }
    }
}

/// A signed-in user as the rest of the application sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user: String,
    pub full_name: String,
    /// Display-only; personas never grant capabilities.
    pub personas: Vec<String>,
    pub identity: ResolvedIdentity,
    pub ignored_roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_roles_are_empty() {
        let p = IdentityPayload::from_json(r#"{"user":"anna@parish.org"}"#).unwrap();
        assert!(p.roles.is_empty());
        assert!(!p.is_super_admin);
        let p = IdentityPayload::from_json(r#"{"user":"anna@parish.org","roles":null,"personas":null}"#).unwrap();
        assert!(p.roles.is_empty());
        assert!(p.personas.is_empty());
        let p = IdentityPayload::from_json(r#"{"user":"a","full_name":null,"roles":["Clerk"],"is_super_admin":null}"#).unwrap();
        assert!(!p.is_super_admin);
        assert!(p.full_name.is_empty());
        assert_eq!(p.roles, vec!["Clerk".to_string()]);
        let p = IdentityPayload::from_json(r#"{"message":{"user":"a","is_super_admin":null}}"#).unwrap();
        assert!(p.into_profile().identity.is_anonymous());
    }

    #[test]
    fn accepts_message_envelope() {
        let body = r#"{"message":{"user":"joe","full_name":"Joe Tobiah","roles":["Clerk"],"is_super_admin":false}}"#;
        let p = IdentityPayload::from_json(body).unwrap();
        assert_eq!(p.user, "joe");
        assert_eq!(p.full_name, "Joe Tobiah");
        assert_eq!(p.roles, vec!["Clerk".to_string()]);
    }

    #[test]
    fn missing_user_is_a_decode_error() {
        let err = IdentityPayload::from_json(r#"{"roles":["Clerk"]}"#).unwrap_err();
        assert!(matches!(err, AppError::Decode { .. }));
        let err = IdentityPayload::from_json("not json").unwrap_err();
        assert!(matches!(err, AppError::Decode { .. }));
    }

    #[test]
    fn guest_and_blank_users_are_not_signed_in() {
        for user in ["Guest", "", "  "] {
            let p = IdentityPayload { user: user.into(), roles: vec!["Clerk".into()], ..Default::default() };
            let err = p.require_signed_in().unwrap_err();
            assert!(err.is_auth());
            assert_eq!(err.code_str(), "not_logged_in");
        }
        let p = IdentityPayload { user: "guest.speaker@parish.org".into(), ..Default::default() };
        assert!(p.require_signed_in().is_ok());
    }

    #[test]
    fn lenient_profile_keeps_leftovers() {
        let p = IdentityPayload {
            user: "mary".into(),
            roles: vec!["Clerk".into(), "Choir Director".into(), "Parish Registrar".into()],
            ..Default::default()
        };
        let profile = p.into_profile();
        assert!(profile.identity.has_role(Role::Clerk));
        assert!(profile.identity.has_role(Role::Registrar));
        assert_eq!(profile.identity.roles().len(), 2);
        assert_eq!(profile.ignored_roles, vec!["Choir Director".to_string()]);
    }

    #[test]
    fn strict_profile_rejects_unknown_roles() {
        let p = IdentityPayload { user: "mary".into(), roles: vec!["Choir Director".into()], ..Default::default() };
        let err = p.clone().into_profile_with(true).unwrap_err();
        assert_eq!(err.code_str(), "unknown_role");
        assert!(err.message().contains("Choir Director"));
        assert!(p.into_profile_with(false).is_ok());
    }

    #[test]
    fn personas_do_not_grant_roles() {
        let p = IdentityPayload { user: "x".into(), personas: vec!["Clerk".into()], ..Default::default() };
        let profile = p.into_profile();
        assert!(profile.identity.is_anonymous());
        assert_eq!(profile.personas, vec!["Clerk".to_string()]);
    }
}

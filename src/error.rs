//! Unified application error model and mapping helpers.
//! The permission core never fails; these errors come from the identity
//! boundary (fetching, decoding, configuration) and the CLI front end.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// No valid session: the backend rejected the request.
    Auth { code: String, message: String },
    /// Network or server failure while talking to the backend.
    Transport { code: String, message: String },
    /// The backend answered but the body could not be understood.
    Decode { code: String, message: String },
    UserInput { code: String, message: String },
    Config { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Auth { code, .. }
            | AppError::Transport { code, .. }
            | AppError::Decode { code, .. }
            | AppError::UserInput { code, .. }
            | AppError::Config { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Auth { message, .. }
            | AppError::Transport { message, .. }
            | AppError::Decode { message, .. }
            | AppError::UserInput { message, .. }
            | AppError::Config { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn transport<S: Into<String>>(code: S, msg: S) -> Self { AppError::Transport { code: code.into(), message: msg.into() } }
    pub fn decode<S: Into<String>>(code: S, msg: S) -> Self { AppError::Decode { code: code.into(), message: msg.into() } }
    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn config<S: Into<String>>(code: S, msg: S) -> Self { AppError::Config { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    pub fn is_auth(&self) -> bool { matches!(self, AppError::Auth { .. }) }

    /// Process exit code for the CLI. 1 is reserved for a denied check.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::UserInput { .. } => 2,
            AppError::Config { .. } => 3,
            AppError::Auth { .. } => 4,
            AppError::Transport { .. } | AppError::Decode { .. } => 5,
            AppError::Internal { .. } => 70,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return AppError::Decode { code: "identity_decode".into(), message: err.to_string() };
        }
        let code = if err.is_timeout() { "identity_timeout" } else { "identity_transport" };
        AppError::Transport { code: code.into(), message: err.to_string() }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode { code: "identity_decode".into(), message: err.to_string() }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Default mapping: treat as Internal unless downcasted elsewhere
        match err.downcast::<AppError>() {
            Ok(app) => app,
            Err(other) => AppError::Internal { code: "internal".into(), message: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_never_collide_with_denied() {
        let all = [
            AppError::auth("a", "a"),
            AppError::transport("t", "t"),
            AppError::decode("d", "d"),
            AppError::user("u", "u"),
            AppError::config("c", "c"),
            AppError::internal("i", "i"),
        ];
        for e in all {
            assert_ne!(e.exit_code(), 0);
            assert_ne!(e.exit_code(), 1, "{e} uses the denied exit code");
        }
    }

    #[test]
    fn anyhow_round_trip_keeps_variant() {
        let wrapped = anyhow::Error::new(AppError::auth("session_expired", "login again"));
        let back = AppError::from(wrapped);
        assert!(back.is_auth());
        assert_eq!(back.to_string(), "session_expired: login again");

        let other = AppError::from(anyhow::anyhow!("boom"));
        assert_eq!(other.code_str(), "internal");
    }

    #[test]
    fn serializes_tagged() {
        let v = serde_json::to_value(AppError::transport("identity_transport", "refused")).unwrap();
        assert_eq!(v["type"], "transport");
        assert_eq!(v["code"], "identity_transport");
    }
}

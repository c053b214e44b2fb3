//! Command line front end: resolve the current identity and answer
//! authorization checks against it.

pub mod outputformatter;

use std::path::PathBuf;

use crate::access::{self, AuthorizationCheck, Capability, Requirement};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::identity::{HttpIdentityProvider, IdentityProvider, IdentitySession, LoadedIdentity, StaticIdentityProvider};

pub const USAGE: &str = "Usage:
  parish-access resolve [--identity <file>] [--json]
  parish-access check --check '<json>' [--identity <file>]
  parish-access explain <capability> [--identity <file>] [--json]
  parish-access whoami [--identity <file>]
  parish-access roles

Without --identity the identity is fetched from PARISH_IDENTITY_URL.
check exits 0 when allowed and 1 when denied.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Resolve { identity: Option<PathBuf>, json: bool },
    Check { check: String, identity: Option<PathBuf> },
    Explain { capability: Capability, identity: Option<PathBuf>, json: bool },
    Whoami { identity: Option<PathBuf> },
    Roles,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub exit_code: i32,
}

impl Outcome {
    fn ok(output: String) -> Self { Self { output, exit_code: 0 } }
}

fn usage_err(msg: String) -> AppError { AppError::user("usage".to_string(), msg) }

/// Parse arguments, excluding the program name.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> AppResult<Command> {
    let mut args = args.into_iter();
    let Some(sub) = args.next() else { return Ok(Command::Help) };
    let mut identity: Option<PathBuf> = None;
    let mut json = false;
    let mut check: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();
    while let Some(a) = args.next() {
        match a.as_str() {
            "--identity" | "-i" => {
                identity = Some(PathBuf::from(args.next().ok_or_else(|| usage_err("--identity needs a file".into()))?));
            }
            "--check" | "-c" => {
                check = Some(args.next().ok_or_else(|| usage_err("--check needs a JSON value".into()))?);
            }
            "--json" => json = true,
            "-h" | "--help" => return Ok(Command::Help),
            other if other.starts_with('-') => return Err(usage_err(format!("unknown flag {}", other))),
            _ => positional.push(a),
        }
    }
    match sub.as_str() {
        "resolve" => Ok(Command::Resolve { identity, json }),
        "check" => {
            let check = check.ok_or_else(|| usage_err("check requires --check '<json>'".into()))?;
            Ok(Command::Check { check, identity })
        }
        "explain" => {
            let name = positional.first().ok_or_else(|| usage_err("explain requires a capability name".into()))?;
            let capability = name.parse::<Capability>().map_err(|e| usage_err(e.to_string()))?;
            Ok(Command::Explain { capability, identity, json })
        }
        "whoami" => Ok(Command::Whoami { identity }),
        "roles" => Ok(Command::Roles),
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => Err(usage_err(format!("unknown command {}", other))),
    }
}

async fn load_with<P: IdentityProvider>(cfg: &Config, provider: &P) -> AppResult<std::sync::Arc<LoadedIdentity>> {
    IdentitySession::new(cfg).refresh(provider).await
}

async fn load_identity(cfg: &Config, file: Option<&PathBuf>) -> AppResult<std::sync::Arc<LoadedIdentity>> {
    match file {
        Some(path) => load_with(cfg, &StaticIdentityProvider::from_file(path)?).await,
        None => load_with(cfg, &HttpIdentityProvider::from_config(cfg)?).await,
    }
}

pub async fn run(cmd: Command, cfg: &Config) -> AppResult<Outcome> {
    match cmd {
        Command::Help => Ok(Outcome::ok(USAGE.to_string())),
        Command::Roles => Ok(Outcome::ok(outputformatter::roles_table())),
        Command::Resolve { identity, json } => {
            let loaded = load_identity(cfg, identity.as_ref()).await?;
            let output = if json {
                serde_json::to_string_pretty(&loaded.capabilities).map_err(|e| AppError::internal("json".to_string(), e.to_string()))?
            } else {
                outputformatter::capability_table(&loaded.capabilities)
            };
            Ok(Outcome::ok(output))
        }
        Command::Check { check, identity } => {
            let check: AuthorizationCheck<Requirement> = serde_json::from_str(&check)
                .map_err(|e| AppError::user("bad_check".to_string(), format!("invalid check: {}", e)))?;
            let loaded = load_identity(cfg, identity.as_ref()).await?;
            let view = access::AccessView::new(loaded.profile.identity.clone());
            let allowed = view.is_authorized(&check);
            tracing::debug!(target: "access", user = %loaded.profile.user, allowed, "check evaluated");
            Ok(Outcome {
                output: if allowed { "allowed".to_string() } else { "denied".to_string() },
                exit_code: if allowed { 0 } else { 1 },
            })
        }
        Command::Explain { capability, identity, json } => {
            let loaded = load_identity(cfg, identity.as_ref()).await?;
            let grant = access::explain(&loaded.profile.identity, capability);
            if json {
                let body = serde_json::json!({ "capability": capability, "grant": grant });
                let output = serde_json::to_string_pretty(&body).map_err(|e| AppError::internal("json".to_string(), e.to_string()))?;
                return Ok(Outcome::ok(output));
            }
            Ok(Outcome::ok(format!("{}: {}", capability, outputformatter::describe_grant(&grant))))
        }
        Command::Whoami { identity } => {
            let loaded = load_identity(cfg, identity.as_ref()).await?;
            let p = &loaded.profile;
            let roles: Vec<&str> = p.identity.roles().iter().map(|r| r.label()).collect();
            let mut lines = vec![
                format!("user:        {}", p.user),
                format!("full name:   {}", p.full_name),
                format!("roles:       {}", roles.join(", ")),
                format!("super admin: {}", p.identity.is_super_admin()),
            ];
            if !p.personas.is_empty() {
                lines.push(format!("personas:    {}", p.personas.join(", ")));
            }
            if !p.ignored_roles.is_empty() {
                lines.push(format!("ignored:     {}", p.ignored_roles.join(", ")));
            }
            Ok(Outcome::ok(lines.join("\n")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> { list.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_args(args(&[])).unwrap(), Command::Help);
        assert_eq!(parse_args(args(&["roles"])).unwrap(), Command::Roles);
        assert_eq!(
            parse_args(args(&["resolve", "--identity", "me.json", "--json"])).unwrap(),
            Command::Resolve { identity: Some(PathBuf::from("me.json")), json: true }
        );
        assert_eq!(
            parse_args(args(&["explain", "runPromotions"])).unwrap(),
            Command::Explain { capability: Capability::RunPromotions, identity: None, json: false }
        );
        assert_eq!(
            parse_args(args(&["explain", "--json", "manageUsers"])).unwrap(),
            Command::Explain { capability: Capability::ManageUsers, identity: None, json: true }
        );
    }

    #[test]
    fn rejects_bad_usage() {
        assert_eq!(parse_args(args(&["check"])).unwrap_err().code_str(), "usage");
        assert_eq!(parse_args(args(&["explain", "fly"])).unwrap_err().code_str(), "usage");
        assert_eq!(parse_args(args(&["resolve", "--verbose"])).unwrap_err().code_str(), "usage");
        assert_eq!(parse_args(args(&["frobnicate"])).unwrap_err().code_str(), "usage");
        assert!(parse_args(args(&["resolve", "--identity"])).is_err());
    }

    #[tokio::test]
    async fn roles_and_help_need_no_identity() {
        let cfg = Config::default();
        let out = run(Command::Roles, &cfg).await.unwrap();
        assert!(out.output.contains("PR Administrator"));
        let out = run(Command::Help, &cfg).await.unwrap();
        assert!(out.output.starts_with("Usage:"));
    }

    #[tokio::test]
    async fn resolve_without_source_is_config_error() {
        let err = run(Command::Resolve { identity: None, json: false }, &Config::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
    }
}

//! Declarative authorization checks and their evaluation.
//!
//! A check has four optional clauses, walked in a fixed order:
//!
//! 1. `requireAll`: any missing entry denies.
//! 2. `anyOf`: decides outright; allowed iff at least one entry holds.
//! 3. `requireOneOf`: same shape as `anyOf`, only reached when `anyOf` is empty.
//! 4. `requireNone`: any held entry denies.
//!
//! Empty clauses are skipped and falling through every clause allows. Because
//! `anyOf`/`requireOneOf` return directly, a `requireNone` next to either of
//! them is never consulted. Clauses are alternative modes, not one conjunction.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::capability::{Capability, CapabilityMap};
use super::evaluator;
use super::identity::ResolvedIdentity;
use super::role::{Role, RoleSet};

/// A context that can answer "does this entry hold?".
pub trait Holds<T> {
    fn holds(&self, item: &T) -> bool;
}

impl Holds<Capability> for CapabilityMap {
    fn holds(&self, item: &Capability) -> bool { self.get(*item) }
}

impl Holds<Role> for RoleSet {
    fn holds(&self, item: &Role) -> bool { self.contains(*item) }
}

impl Holds<Role> for ResolvedIdentity {
    fn holds(&self, item: &Role) -> bool { self.has_role(*item) }
}

impl Holds<Role> for [Role] {
    fn holds(&self, item: &Role) -> bool { self.contains(item) }
}

impl<T, C: Holds<T> + ?Sized> Holds<T> for &C {
    fn holds(&self, item: &T) -> bool { (**self).holds(item) }
}

/// Missing and `null` clauses both decode as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct AuthorizationCheck<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub require_all: Vec<T>,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub any_of: Vec<T>,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub require_one_of: Vec<T>,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub require_none: Vec<T>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> Default for AuthorizationCheck<T> {
    fn default() -> Self {
        Self { require_all: Vec::new(), any_of: Vec::new(), require_one_of: Vec::new(), require_none: Vec::new() }
    }
}

impl<T> AuthorizationCheck<T> {
    pub fn new() -> Self { Self::default() }

    pub fn require_all<I: IntoIterator<Item = T>>(mut self, items: I) -> Self {
        self.require_all.extend(items);
        self
    }

    pub fn any_of<I: IntoIterator<Item = T>>(mut self, items: I) -> Self {
        self.any_of.extend(items);
        self
    }

    pub fn require_one_of<I: IntoIterator<Item = T>>(mut self, items: I) -> Self {
        self.require_one_of.extend(items);
        self
    }

    pub fn require_none<I: IntoIterator<Item = T>>(mut self, items: I) -> Self {
        self.require_none.extend(items);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.require_all.is_empty() && self.any_of.is_empty() && self.require_one_of.is_empty() && self.require_none.is_empty()
    }

    pub fn evaluate<C: Holds<T> + ?Sized>(&self, context: &C) -> bool { evaluate(self, context) }
}

/// Evaluate `check` against `context`. Pure and total.
pub fn evaluate<T, C: Holds<T> + ?Sized>(check: &AuthorizationCheck<T>, context: &C) -> bool {
    if !check.require_all.is_empty() && !check.require_all.iter().all(|e| context.holds(e)) {
        return false;
    }
    if !check.any_of.is_empty() {
        return check.any_of.iter().any(|e| context.holds(e));
    }
    if !check.require_one_of.is_empty() {
        return check.require_one_of.iter().any(|e| context.holds(e));
    }
    if check.require_none.iter().any(|e| context.holds(e)) {
        return false;
    }
    true
}

/// Either a role or a capability, for checks that mix both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    Role(Role),
    Capability(Capability),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is neither a role nor a capability")]
pub struct RequirementParseError(pub String);

impl FromStr for Requirement {
    type Err = RequirementParseError;

    // role labels win over capability names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(role) = Role::lookup(s) {
            return Ok(Requirement::Role(role));
        }
        s.parse::<Capability>()
            .map(Requirement::Capability)
            .map_err(|_| RequirementParseError(s.trim().to_string()))
    }
}

impl Display for Requirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Requirement::Role(r) => Display::fmt(r, f),
            Requirement::Capability(c) => Display::fmt(c, f),
        }
    }
}

impl From<Role> for Requirement {
    fn from(role: Role) -> Self { Requirement::Role(role) }
}

impl From<Capability> for Requirement {
    fn from(cap: Capability) -> Self { Requirement::Capability(cap) }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Requirement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An identity together with its resolved capability map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessView {
    identity: ResolvedIdentity,
    capabilities: CapabilityMap,
}

impl AccessView {
    pub fn new(identity: ResolvedIdentity) -> Self {
        let capabilities = evaluator::resolve(&identity);
        Self { identity, capabilities }
    }

    pub fn identity(&self) -> &ResolvedIdentity { &self.identity }

    pub fn capabilities(&self) -> &CapabilityMap { &self.capabilities }

    pub fn has_role(&self, role: Role) -> bool { self.identity.has_role(role) }

    pub fn can(&self, cap: Capability) -> bool { self.capabilities.get(cap) }

    pub fn is_authorized<T>(&self, check: &AuthorizationCheck<T>) -> bool
    where
        Self: Holds<T>,
    {
        evaluate(check, self)
    }
}

impl From<ResolvedIdentity> for AccessView {
    fn from(identity: ResolvedIdentity) -> Self { Self::new(identity) }
}

impl Holds<Role> for AccessView {
    fn holds(&self, item: &Role) -> bool { self.identity.has_role(*item) }
}

impl Holds<Capability> for AccessView {
    fn holds(&self, item: &Capability) -> bool { self.capabilities.get(*item) }
}

impl Holds<Requirement> for AccessView {
    fn holds(&self, item: &Requirement) -> bool {
        match item {
            Requirement::Role(r) => self.identity.has_role(*r),
            Requirement::Capability(c) => self.capabilities.get(*c),
        }
    }
}

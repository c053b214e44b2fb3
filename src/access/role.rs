use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Parish roles assigned to a user by the backend. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Admin,
    Registrar,
    FinanceAdmin,
    SponsorshipCommittee,
    SchoolAdmin,
    PublicRelations,
    OfficeAdmin,
    Clerk,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized role '{0}'")]
pub struct RoleParseError(pub String);

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Admin,
        Role::Registrar,
        Role::FinanceAdmin,
        Role::SponsorshipCommittee,
        Role::SchoolAdmin,
        Role::PublicRelations,
        Role::OfficeAdmin,
        Role::Clerk,
    ];

    /// Label the backend uses on the wire.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Parish Administrator",
            Role::Registrar => "Parish Registrar",
            Role::FinanceAdmin => "Finance Administrator",
            Role::SponsorshipCommittee => "Sponsorship Committee",
            Role::SchoolAdmin => "School Administrator",
            Role::PublicRelations => "PR Administrator",
            Role::OfficeAdmin => "Office Administrator",
            Role::Clerk => "Clerk",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Role::Admin => &["Admin"],
            Role::Registrar => &["Registrar"],
            Role::FinanceAdmin => &["FinanceAdmin"],
            Role::SponsorshipCommittee => &["SponsorshipCommittee"],
            Role::SchoolAdmin => &["SchoolAdmin"],
            Role::PublicRelations => &["PublicRelations"],
            Role::OfficeAdmin => &["OfficeAdmin"],
            Role::Clerk => &["Parish Clerk"],
        }
    }

    /// Lenient lookup used where an unknown name must not be an error.
    pub fn lookup(name: &str) -> Option<Role> {
        ROLE_NAMES.get(&normalize(name)).copied()
    }
}

fn normalize(name: &str) -> String { name.trim().to_lowercase() }

// lowercased label or alias -> role
static ROLE_NAMES: Lazy<HashMap<String, Role>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for role in Role::ALL {
        m.insert(normalize(role.label()), role);
        for alias in role.aliases() {
            m.insert(normalize(alias), role);
        }
    }
    m
});

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::lookup(s).ok_or_else(|| RoleParseError(s.trim().to_string()))
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.label()) }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered, duplicate-free set of roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self { Self::default() }

    pub fn contains(&self, role: Role) -> bool { self.0.contains(&role) }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ { self.0.iter().copied() }

    pub fn is_subset(&self, other: &RoleSet) -> bool { self.0.is_subset(&other.0) }

    /// Returns a copy with `role` added.
    pub fn with(&self, role: Role) -> Self {
        let mut next = self.0.clone();
        next.insert(role);
        Self(next)
    }

    /// Returns a copy with `role` removed.
    pub fn without(&self, role: Role) -> Self {
        let mut next = self.0.clone();
        next.remove(&role);
        Self(next)
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self { Self(iter.into_iter().collect()) }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self { roles.into_iter().collect() }
}

impl<'a> IntoIterator for &'a RoleSet {
    type Item = Role;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, Role>>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter().copied() }
}

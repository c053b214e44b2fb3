use serde::Serialize;

use super::capability::{Capability, CapabilityMap};
use super::identity::ResolvedIdentity;
use super::role::Role;
use super::rules;

/// Resolve an identity into its full capability map.
///
/// Super admins get everything. Otherwise each held role's table is OR-merged
/// onto the all-denied map: a capability is granted when any held role grants
/// it, and an explicit `false` in one role never clears another role's grant.
pub fn resolve(identity: &ResolvedIdentity) -> CapabilityMap {
    if identity.is_super_admin() {
        return CapabilityMap::all_granted();
    }
    let mut map = CapabilityMap::all_denied();
    for role in identity.roles() {
        for &(cap, value) in rules::capabilities_for(role) {
            if value {
                map.grant(cap);
            }
        }
    }
    map
}

/// Resolve a list of raw role names as delivered by the backend.
/// Unknown names contribute nothing.
pub fn resolve_names<'a, I>(names: I, is_super_admin: bool) -> CapabilityMap
where
    I: IntoIterator<Item = &'a str>,
{
    let roles = names.into_iter().filter_map(Role::lookup).collect();
    resolve(&ResolvedIdentity::new(roles, is_super_admin))
}

/// Why a capability was granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "roles", rename_all = "snake_case")]
pub enum Grant {
    SuperAdmin,
    Roles(Vec<Role>),
    Denied,
}

impl Grant {
    pub fn is_granted(&self) -> bool { !matches!(self, Grant::Denied) }
}

pub fn explain(identity: &ResolvedIdentity, cap: Capability) -> Grant {
    if identity.is_super_admin() {
        return Grant::SuperAdmin;
    }
    let granting: Vec<Role> = identity.roles().iter().filter(|r| rules::role_grants(*r, cap)).collect();
    if granting.is_empty() { Grant::Denied } else { Grant::Roles(granting) }
}

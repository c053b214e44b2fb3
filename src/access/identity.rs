use serde::{Deserialize, Serialize};

use super::role::{Role, RoleSet};

/// Who the current user is, as far as permission evaluation cares.
///
/// Immutable: every grant/revoke returns a new value. The default value is
/// the anonymous identity (no roles, not super admin), used while the
/// session is loading or after logout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    #[serde(default)]
    roles: RoleSet,
    #[serde(default)]
    is_super_admin: bool,
}

impl ResolvedIdentity {
    pub fn new(roles: RoleSet, is_super_admin: bool) -> Self { Self { roles, is_super_admin } }

    pub fn anonymous() -> Self { Self::default() }

    pub fn super_admin() -> Self { Self { roles: RoleSet::new(), is_super_admin: true } }

    pub fn roles(&self) -> &RoleSet { &self.roles }

    pub fn is_super_admin(&self) -> bool { self.is_super_admin }

    pub fn has_role(&self, role: Role) -> bool { self.roles.contains(role) }

    pub fn is_anonymous(&self) -> bool { self.roles.is_empty() && !self.is_super_admin }

    pub fn with_role(&self, role: Role) -> Self {
        Self { roles: self.roles.with(role), is_super_admin: self.is_super_admin }
    }

    pub fn without_role(&self, role: Role) -> Self {
        Self { roles: self.roles.without(role), is_super_admin: self.is_super_admin }
    }

    pub fn with_super_admin(&self, is_super_admin: bool) -> Self {
        Self { roles: self.roles.clone(), is_super_admin }
    }
}

impl FromIterator<Role> for ResolvedIdentity {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self { Self::new(iter.into_iter().collect(), false) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_anonymous() {
        let id = ResolvedIdentity::default();
        assert!(id.is_anonymous());
        assert!(!id.is_super_admin());
        assert_eq!(id, ResolvedIdentity::anonymous());
    }

    #[test]
    fn grant_and_revoke_leave_original_untouched() {
        let clerk: ResolvedIdentity = [Role::Clerk].into_iter().collect();
        let promoted = clerk.with_role(Role::Registrar);
        assert!(!clerk.has_role(Role::Registrar));
        assert!(promoted.has_role(Role::Registrar));

        let demoted = promoted.without_role(Role::Clerk);
        assert!(promoted.has_role(Role::Clerk));
        assert!(!demoted.has_role(Role::Clerk));

        let boss = demoted.with_super_admin(true);
        assert!(boss.is_super_admin());
        assert!(!demoted.is_super_admin());
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let id: ResolvedIdentity = serde_json::from_str("{}").unwrap();
        assert!(id.is_anonymous());
        let id: ResolvedIdentity = serde_json::from_str(r#"{"roles":["Clerk"]}"#).unwrap();
        assert!(id.has_role(Role::Clerk));
    }
}

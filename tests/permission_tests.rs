//! Permission core laws, checked exhaustively over every subset of roles.

use parish_access::access::{
    evaluate, explain, resolve, rules, AuthorizationCheck, Capability, CapabilityMap, Grant, ResolvedIdentity, Role,
    RoleSet,
};

// All 2^8 role subsets.
fn all_role_sets() -> Vec<RoleSet> {
    (0u32..(1 << Role::ALL.len()))
        .map(|mask| Role::ALL.iter().enumerate().filter(|(i, _)| mask & (1 << i) != 0).map(|(_, r)| *r).collect())
        .collect()
}

#[test]
fn unmentioned_capabilities_are_denied_for_single_roles() {
    for role in Role::ALL {
        let map = resolve(&ResolvedIdentity::new(RoleSet::from([role]), false));
        for cap in Capability::ALL {
            let granted_by_table = rules::capabilities_for(role).iter().any(|(c, v)| *c == cap && *v);
            assert_eq!(map.get(cap), granted_by_table, "{role} / {cap}");
        }
    }
}

#[test]
fn super_admin_gets_everything_regardless_of_roles() {
    for roles in all_role_sets() {
        let map = resolve(&ResolvedIdentity::new(roles, true));
        assert_eq!(map, CapabilityMap::all_granted());
    }
}

#[test]
fn adding_roles_never_revokes() {
    let sets = all_role_sets();
    for small in &sets {
        let base = resolve(&ResolvedIdentity::new(small.clone(), false));
        for extra in Role::ALL {
            let bigger = small.with(extra);
            let grown = resolve(&ResolvedIdentity::new(bigger, false));
            assert!(base.is_subset_of(&grown), "adding {extra} to {small:?} revoked something");
        }
    }
}

#[test]
fn resolved_map_is_the_union_of_single_role_maps() {
    for roles in all_role_sets() {
        let combined = resolve(&ResolvedIdentity::new(roles.clone(), false));
        for cap in Capability::ALL {
            let any = roles.iter().any(|r| resolve(&ResolvedIdentity::new(RoleSet::from([r]), false)).get(cap));
            assert_eq!(combined.get(cap), any);
        }
    }
}

#[test]
fn resolve_and_evaluate_are_repeatable() {
    let id = ResolvedIdentity::new(RoleSet::from([Role::OfficeAdmin, Role::SchoolAdmin]), false);
    assert_eq!(resolve(&id), resolve(&id));
    let check = AuthorizationCheck::new().require_all([Capability::ViewSchools]).require_none([Capability::ManageUsers]);
    let map = resolve(&id);
    let first = evaluate(&check, &map);
    for _ in 0..10 {
        assert_eq!(evaluate(&check, &map), first);
    }
    assert!(first);
}

#[test]
fn require_all_pairs_over_every_context() {
    for roles in all_role_sets() {
        let map = resolve(&ResolvedIdentity::new(roles, false));
        let (a, b) = (Capability::ViewPayments, Capability::ManageHouseholds);
        let check = AuthorizationCheck::new().require_all([a, b]);
        assert_eq!(evaluate(&check, &map), map.get(a) && map.get(b));
    }
}

#[test]
fn require_none_alone_is_negation() {
    for roles in all_role_sets() {
        let check = AuthorizationCheck::new().require_none([Role::Clerk]);
        assert_eq!(evaluate(&check, &roles), !roles.contains(Role::Clerk));
    }
}

#[test]
fn clerk_scenario() {
    let map = resolve(&ResolvedIdentity::new(RoleSet::from([Role::Clerk]), false));
    assert!(map.get(Capability::ViewMembers));
    assert!(map.get(Capability::CreateMembers));
    assert!(map.get(Capability::EditCore));
    assert!(!map.get(Capability::ManagePayments));
}

#[test]
fn super_admin_without_roles_scenario() {
    let map = resolve(&ResolvedIdentity::new(RoleSet::new(), true));
    assert!(Capability::ALL.iter().all(|c| map.get(*c)));
}

#[test]
fn any_of_with_missing_role_scenario() -> anyhow::Result<()> {
    let check: AuthorizationCheck<Role> = serde_json::from_str(r#"{"anyOf":["PR Administrator"]}"#)?;
    let context: RoleSet = serde_json::from_str(r#"["Parish Registrar"]"#)?;
    assert!(!evaluate(&check, &context));
    let with_registrar = check.clone().any_of([Role::Registrar]);
    assert!(evaluate(&with_registrar, &context));
    Ok(())
}

#[test]
fn empty_clauses_scenario() -> anyhow::Result<()> {
    let check: AuthorizationCheck<Role> =
        serde_json::from_str(r#"{"requireAll":[],"anyOf":[],"requireNone":[],"requireOneOf":[]}"#)?;
    for roles in all_role_sets() {
        assert!(evaluate(&check, &roles));
    }
    Ok(())
}

#[test]
fn explain_agrees_with_resolve() {
    for roles in all_role_sets() {
        let id = ResolvedIdentity::new(roles, false);
        let map = resolve(&id);
        for cap in Capability::ALL {
            assert_eq!(explain(&id, cap).is_granted(), map.get(cap));
        }
    }
    assert_eq!(explain(&ResolvedIdentity::super_admin(), Capability::ManageUsers), Grant::SuperAdmin);
}

//! Static role -> capability table.
//!
//! Each role lists only the capabilities it touches; anything unlisted is
//! denied for that role. An explicit `false` entry documents a deliberate
//! denial and never revokes a grant made by another held role.

use super::capability::Capability::{self, *};
use super::role::Role;

pub type RoleOverrides = &'static [(Capability, bool)];

const ADMIN: RoleOverrides = &[
    (ViewMembers, true),
    (CreateMembers, true),
    (EditCore, true),
    (DeleteMembers, true),
    (ManageHouseholds, true),
    (ViewPayments, true),
    (ManagePayments, true),
    (ViewSponsorships, true),
    (ManageSponsorships, true),
    (ViewSchools, true),
    (ManageSchools, true),
    (RunPromotions, true),
    (ViewVolunteers, true),
    (ManageVolunteers, true),
    (ImportData, true),
    (ExportData, true),
    (ViewReports, true),
    (AccessAdminConsole, true),
    // user management is reserved to super admins
    (ManageUsers, false),
];

const REGISTRAR: RoleOverrides = &[
    (ViewMembers, true),
    (CreateMembers, true),
    (EditCore, true),
    (DeleteMembers, true),
    (ManageHouseholds, true),
    (ImportData, true),
    (ExportData, true),
    (ViewReports, true),
    (ViewSchools, true),
];

const FINANCE_ADMIN: RoleOverrides = &[
    (ViewMembers, true),
    (ViewPayments, true),
    (ManagePayments, true),
    (ViewSponsorships, true),
    (ExportData, true),
    (ViewReports, true),
];

const SPONSORSHIP_COMMITTEE: RoleOverrides = &[
    (ViewMembers, true),
    (ViewSponsorships, true),
    (ManageSponsorships, true),
    (ViewPayments, true),
];

const SCHOOL_ADMIN: RoleOverrides = &[
    (ViewMembers, true),
    (ViewSchools, true),
    (ManageSchools, true),
    (RunPromotions, true),
    (ViewVolunteers, true),
];

const PUBLIC_RELATIONS: RoleOverrides = &[
    (ViewMembers, true),
    (ViewVolunteers, true),
    (ManageVolunteers, true),
    (ExportData, true),
    (ViewReports, true),
];

const OFFICE_ADMIN: RoleOverrides = &[
    (ViewMembers, true),
    (CreateMembers, true),
    (EditCore, true),
    (ManageHouseholds, true),
    (ViewPayments, true),
    (ViewSponsorships, true),
    (ViewSchools, true),
    (ViewVolunteers, true),
    (ImportData, true),
    (ViewReports, true),
];

const CLERK: RoleOverrides = &[
    (ViewMembers, true),
    (CreateMembers, true),
    (EditCore, true),
    (ManagePayments, false),
    (DeleteMembers, false),
];

/// Override set for a role.
pub fn capabilities_for(role: Role) -> RoleOverrides {
    match role {
        Role::Admin => ADMIN,
        Role::Registrar => REGISTRAR,
        Role::FinanceAdmin => FINANCE_ADMIN,
        Role::SponsorshipCommittee => SPONSORSHIP_COMMITTEE,
        Role::SchoolAdmin => SCHOOL_ADMIN,
        Role::PublicRelations => PUBLIC_RELATIONS,
        Role::OfficeAdmin => OFFICE_ADMIN,
        Role::Clerk => CLERK,
    }
}

/// Override set for a raw role name. Unknown names get an empty set.
pub fn capabilities_for_name(name: &str) -> RoleOverrides {
    match Role::lookup(name) {
        Some(role) => capabilities_for(role),
        None => {
            tracing::debug!(target: "access", role = name, "no capability rules for unrecognized role");
            &[]
        }
    }
}

/// Whether `role`'s own table grants `cap`, ignoring every other role.
pub fn role_grants(role: Role, cap: Capability) -> bool {
    capabilities_for(role).iter().any(|(c, v)| *c == cap && *v)
}

/// Roles whose table grants `cap`.
pub fn roles_granting(cap: Capability) -> Vec<Role> {
    Role::ALL.into_iter().filter(|r| role_grants(*r, cap)).collect()
}

//! Role and capability evaluation core.
//! Everything here is pure: no I/O, no shared mutable state, no errors.

mod role;
mod capability;
mod identity;
mod check;
pub mod rules;
pub mod evaluator;

pub use role::{Role, RoleSet, RoleParseError};
pub use capability::{Capability, CapabilityMap, CapabilityParseError, CAPABILITY_COUNT};
pub use identity::ResolvedIdentity;
pub use evaluator::{resolve, explain, Grant};
pub use check::{evaluate, AccessView, AuthorizationCheck, Holds, Requirement, RequirementParseError};

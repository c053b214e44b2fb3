use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One permission flag controlling a screen or action in the parish console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    ViewMembers,
    CreateMembers,
    EditCore,
    DeleteMembers,
    ManageHouseholds,
    ViewPayments,
    ManagePayments,
    ViewSponsorships,
    ManageSponsorships,
    ViewSchools,
    ManageSchools,
    RunPromotions,
    ViewVolunteers,
    ManageVolunteers,
    ImportData,
    ExportData,
    ViewReports,
    AccessAdminConsole,
    ManageUsers,
}

pub const CAPABILITY_COUNT: usize = Capability::ALL.len();

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized capability '{0}'")]
pub struct CapabilityParseError(pub String);

impl Capability {
    /// Declaration order; `index()` is the position in this array.
    pub const ALL: [Capability; 19] = [
        Capability::ViewMembers,
        Capability::CreateMembers,
        Capability::EditCore,
        Capability::DeleteMembers,
        Capability::ManageHouseholds,
        Capability::ViewPayments,
        Capability::ManagePayments,
        Capability::ViewSponsorships,
        Capability::ManageSponsorships,
        Capability::ViewSchools,
        Capability::ManageSchools,
        Capability::RunPromotions,
        Capability::ViewVolunteers,
        Capability::ManageVolunteers,
        Capability::ImportData,
        Capability::ExportData,
        Capability::ViewReports,
        Capability::AccessAdminConsole,
        Capability::ManageUsers,
    ];

    pub fn index(self) -> usize { self as usize }

    /// camelCase flag name used by the front end.
    pub fn name(self) -> &'static str {
        match self {
            Capability::ViewMembers => "viewMembers",
            Capability::CreateMembers => "createMembers",
            Capability::EditCore => "editCore",
            Capability::DeleteMembers => "deleteMembers",
            Capability::ManageHouseholds => "manageHouseholds",
            Capability::ViewPayments => "viewPayments",
            Capability::ManagePayments => "managePayments",
            Capability::ViewSponsorships => "viewSponsorships",
            Capability::ManageSponsorships => "manageSponsorships",
            Capability::ViewSchools => "viewSchools",
            Capability::ManageSchools => "manageSchools",
            Capability::RunPromotions => "runPromotions",
            Capability::ViewVolunteers => "viewVolunteers",
            Capability::ManageVolunteers => "manageVolunteers",
            Capability::ImportData => "importData",
            Capability::ExportData => "exportData",
            Capability::ViewReports => "viewReports",
            Capability::AccessAdminConsole => "accessAdminConsole",
            Capability::ManageUsers => "manageUsers",
        }
    }
}

impl FromStr for Capability {
    type Err = CapabilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Capability::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CapabilityParseError(wanted.to_string()))
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Total map from every capability to a decision.
///
/// Backed by a fixed array indexed by [`Capability::index`], so there is no
/// way to construct a map with a missing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityMap([bool; CAPABILITY_COUNT]);

impl Default for CapabilityMap {
    fn default() -> Self { Self::all_denied() }
}

impl CapabilityMap {
    pub const fn all_denied() -> Self { Self([false; CAPABILITY_COUNT]) }

    pub const fn all_granted() -> Self { Self([true; CAPABILITY_COUNT]) }

    pub fn get(&self, cap: Capability) -> bool { self.0[cap.index()] }

    /// Returns a copy with `cap` set to `value`.
    pub fn with(mut self, cap: Capability, value: bool) -> Self {
        self.0[cap.index()] = value;
        self
    }

    /// OR-merge a single grant into the map. Never clears a flag.
    pub(crate) fn grant(&mut self, cap: Capability) { self.0[cap.index()] = true; }

    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        Capability::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn granted(&self) -> impl Iterator<Item = Capability> + '_ {
        self.iter().filter_map(|(c, v)| v.then_some(c))
    }

    pub fn count_granted(&self) -> usize { self.0.iter().filter(|v| **v).count() }

    /// True when every capability granted here is also granted in `other`.
    pub fn is_subset_of(&self, other: &CapabilityMap) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| !*a || *b)
    }
}

impl Serialize for CapabilityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CAPABILITY_COUNT))?;
        for (cap, value) in self.iter() {
            map.serialize_entry(cap.name(), &value)?;
        }
        map.end()
    }
}

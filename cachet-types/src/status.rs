//! Status enumerations for components and incidents.
//!
//! Both enumerations are small and closed. Consumers iterate `ALL` to
//! report every value, including those with no matching entity.

use std::fmt;

use thiserror::Error;

/// A numeric status code that does not map to any known status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid {kind} status code: {code}")]
pub struct InvalidStatus {
    /// Which enumeration rejected the code (`"component"` or `"incident"`).
    pub kind: &'static str,
    /// The rejected code.
    pub code: u8,
}

/// Health of a single component as reported by Cachet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
#[repr(u8)]
pub enum ComponentStatus {
    Unknown = 0,
    Operational = 1,
    PerformanceIssues = 2,
    PartialOutage = 3,
    MajorOutage = 4,
}

impl ComponentStatus {
    /// Every component status, in ascending code order.
    pub const ALL: [ComponentStatus; 5] = [
        ComponentStatus::Unknown,
        ComponentStatus::Operational,
        ComponentStatus::PerformanceIssues,
        ComponentStatus::PartialOutage,
        ComponentStatus::MajorOutage,
    ];

    /// The numeric code used by the Cachet API.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name, matching Cachet's `human_status`.
    pub const fn name(self) -> &'static str {
        match self {
            ComponentStatus::Unknown => "Unknown",
            ComponentStatus::Operational => "Operational",
            ComponentStatus::PerformanceIssues => "Performance Issues",
            ComponentStatus::PartialOutage => "Partial Outage",
            ComponentStatus::MajorOutage => "Major Outage",
        }
    }
}

impl TryFrom<u8> for ComponentStatus {
    type Error = InvalidStatus;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(InvalidStatus {
                kind: "component",
                code,
            })
    }
}

impl From<ComponentStatus> for u8 {
    fn from(status: ComponentStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle stage of an incident as reported by Cachet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
#[repr(u8)]
pub enum IncidentStatus {
    Scheduled = 0,
    Investigating = 1,
    Identified = 2,
    Watching = 3,
    Fixed = 4,
}

impl IncidentStatus {
    /// Every incident status, in ascending code order.
    pub const ALL: [IncidentStatus; 5] = [
        IncidentStatus::Scheduled,
        IncidentStatus::Investigating,
        IncidentStatus::Identified,
        IncidentStatus::Watching,
        IncidentStatus::Fixed,
    ];

    /// The numeric code used by the Cachet API.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name, matching Cachet's `human_status`.
    pub const fn name(self) -> &'static str {
        match self {
            IncidentStatus::Scheduled => "Scheduled",
            IncidentStatus::Investigating => "Investigating",
            IncidentStatus::Identified => "Identified",
            IncidentStatus::Watching => "Watching",
            IncidentStatus::Fixed => "Fixed",
        }
    }
}

impl TryFrom<u8> for IncidentStatus {
    type Error = InvalidStatus;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(InvalidStatus {
                kind: "incident",
                code,
            })
    }
}

impl From<IncidentStatus> for u8 {
    fn from(status: IncidentStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

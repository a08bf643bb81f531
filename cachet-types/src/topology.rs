//! Status page topology: component groups, components and incidents.

use crate::{ComponentStatus, IncidentStatus};

/// A named cluster of monitored components.
///
/// Groups are returned by Cachet in a stable order, and components keep the
/// order in which they appear inside their group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentGroup {
    /// Cachet identifier of the group.
    pub id: u64,

    /// Display name of the group, used as the `group_name` label.
    pub name: String,

    /// Enabled components belonging to this group.
    #[cfg_attr(feature = "serde", serde(default))]
    pub components: Vec<Component>,
}

impl ComponentGroup {
    /// Create an empty group.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            components: Vec::new(),
        }
    }

    /// Append a component to the group.
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Number of components in this group at the given status.
    pub fn count_with_status(&self, status: ComponentStatus) -> usize {
        self.components.iter().filter(|c| c.status == status).count()
    }
}

/// A monitored unit with a discrete health status.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    /// Identifier, unique within a scrape.
    pub id: u64,

    /// Display name, used as the `component_name` label.
    pub name: String,

    /// Current health.
    pub status: ComponentStatus,
}

impl Component {
    /// Create a component.
    pub fn new(id: u64, name: impl Into<String>, status: ComponentStatus) -> Self {
        Self {
            id,
            name: name.into(),
            status,
        }
    }
}

/// A recorded disruption, optionally tied to a component.
///
/// `component_id` is a weak reference: Cachet uses `0` for incidents with no
/// component, and an id may point at a component that no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Incident {
    /// Cachet identifier of the incident.
    pub id: u64,

    /// Id of the affected component, or `0` if none.
    #[cfg_attr(feature = "serde", serde(default))]
    pub component_id: u64,

    /// Lifecycle stage.
    pub status: IncidentStatus,
}

impl Incident {
    /// Create an incident.
    pub fn new(id: u64, component_id: u64, status: IncidentStatus) -> Self {
        Self {
            id,
            component_id,
            status,
        }
    }

    /// Whether this incident is attached to the given component.
    pub fn affects(&self, component: &Component) -> bool {
        self.component_id == component.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_with_status() {
        let group = ComponentGroup::new(1, "Core")
            .with_component(Component::new(1, "API", ComponentStatus::Operational))
            .with_component(Component::new(2, "DB", ComponentStatus::Operational))
            .with_component(Component::new(3, "Queue", ComponentStatus::MajorOutage));

        assert_eq!(group.count_with_status(ComponentStatus::Operational), 2);
        assert_eq!(group.count_with_status(ComponentStatus::MajorOutage), 1);
        assert_eq!(group.count_with_status(ComponentStatus::Unknown), 0);
    }

    #[test]
    fn test_incident_affects_by_id_only() {
        let api = Component::new(1, "API", ComponentStatus::Operational);
        let db = Component::new(2, "DB", ComponentStatus::Operational);
        let incident = Incident::new(10, 1, IncidentStatus::Identified);
        let orphan = Incident::new(11, 0, IncidentStatus::Identified);

        assert!(incident.affects(&api));
        assert!(!incident.affects(&db));
        assert!(!orphan.affects(&api));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_incident_without_component_defaults_to_zero() {
        let incident: Incident = serde_json::from_str(r#"{"id": 3, "status": 2}"#).unwrap();
        assert_eq!(incident.component_id, 0);
        assert_eq!(incident.status, IncidentStatus::Identified);
    }
}
